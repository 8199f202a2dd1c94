//! # donate-core
//!
//! The donation wizard: three steps, each with a form and a declarative rule
//! table, driven by a small state machine.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────┐  advance  ┌──────────┐  advance  ┌──────────┐  submit
//! │  Amount  │──────────▶│  Donor   │──────────▶│ Payment  │────────▶ payload
//! └──────────┘           └──────────┘           └──────────┘
//!       ▲                      ▲                      │
//!       └──────────── go_to (breadcrumb) ─────────────┘
//! ```
//!
//! [`WizardState`] is plain data: every transition takes it by reference and
//! returns the next state. Submitting the final step is the job of
//! `donate-payments`, which turns the state into a [`DonationPayload`].

pub mod currency;
pub mod error;
pub mod form;
pub mod gift;
pub mod payload;
pub mod session;
pub mod step;
pub mod theme;
pub mod validation;
pub mod wizard;

pub use currency::Currency;
pub use error::{Result, WizardError};
pub use form::{AmountSelection, DonorInfo, FieldSource, PaymentMode, PaymentSelection, StepValues};
pub use gift::GiftItem;
pub use payload::DonationPayload;
pub use session::{DonationSession, MemorySessionStore, SessionId, SessionStore, WizardChange};
pub use step::Step;
pub use validation::{FieldErrors, FieldRule, Rule};
pub use wizard::WizardState;

//! # donate-payments
//!
//! Payment adapters and the submission handler for the donation wizard.
//!
//! ## Payment modes
//!
//! ### 1. PayPal (redirect)
//!
//! **Flow:** payload persisted → donor redirected to PayPal → PayPal sends the
//! donor back to `/paypal/return?token=…` → thanks view.
//!
//! ### 2. Card (Stripe Elements)
//!
//! **Flow:** card details stay in Stripe's iframe; the page sends only a
//! PaymentMethod id, which is charged right away.
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │             Payment step               │
//! │  ┌────────────────────────────────┐    │
//! │  │   Stripe Elements (iframe)     │    │
//! │  │   Card Number: ████ ████ ████  │    │
//! │  └────────────────────────────────┘    │
//! └────────────────────────────────────────┘
//! ```
//!
//! Both paths announce themselves through a [`Notifier`] (Slack in
//! production).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use donate_payments::{DonationCheckout, LogNotifier, StripeCardGateway, SubmitRequest};
//!
//! let checkout = DonationCheckout::new(
//!     Some(Arc::new(StripeCardGateway::from_env()?)),
//!     None,
//!     Arc::new(LogNotifier),
//! );
//!
//! let submission = checkout.submit(&session_id, &wizard, request).await?;
//! // submission.wizard is the reset wizard; submission.outcome says what to show
//! ```

pub mod card;
mod checkout;
mod error;
mod notifier;
mod paypal;

pub use card::{CardGateway, CardHandle, ChargeReceipt, MockCardGateway, StripeCardGateway};
pub use checkout::{DonationCheckout, SubmitOutcome, SubmitRequest, Submission};
pub use error::{CARD_ERROR_FIELD, PaymentError, Result};
pub use notifier::{LogNotifier, Notifier, SlackNotifier};
pub use paypal::{
    MemoryPendingStore, PayPalConfig, PayPalGateway, PendingDonation, PendingStore, PendingToken,
};

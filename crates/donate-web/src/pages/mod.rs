//! Wizard Steps

mod amount;
mod donor;
mod payment;
mod thanks;

pub use amount::AmountPage;
pub use donor::DonorPage;
pub use payment::PaymentPage;
pub use thanks::ThanksNote;

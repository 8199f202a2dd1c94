//! Payment Error Types

use donate_core::{FieldErrors, WizardError};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Form field the card error banner is attached to
pub const CARD_ERROR_FIELD: &str = "stripeError";

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// The card gateway refused the charge; the donor can fix and resubmit
    #[error("Card declined: {0}")]
    Declined(String),

    /// Card payment requested without a card handle
    #[error("Missing card details")]
    MissingCard,

    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// PayPal redirect could not be prepared or confirmed
    #[error("PayPal error: {0}")]
    PayPal(String),

    /// Card payments are not configured on this server
    #[error("Card payments are not available")]
    CardUnavailable,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Wizard state was incomplete or invalid
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

impl PaymentError {
    /// Errors the donor can fix from the payment form; nothing else is retried
    pub fn is_recoverable(&self) -> bool {
        match self {
            PaymentError::Declined(_) | PaymentError::MissingCard => true,
            PaymentError::Wizard(e) => e.is_recoverable(),
            _ => false,
        }
    }

    /// Errors to show on the form, if this failure belongs there
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            PaymentError::Declined(message) => {
                Some(FieldErrors::single(CARD_ERROR_FIELD, message.clone()))
            }
            PaymentError::MissingCard => Some(FieldErrors::single(
                CARD_ERROR_FIELD,
                "Please enter your card details.",
            )),
            PaymentError::Wizard(e) => e.field_errors().cloned(),
            _ => None,
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::Declined(message) => message.clone(),
            PaymentError::MissingCard => "Please enter your card details.".into(),
            PaymentError::Stripe(_) => "Payment processing failed. Please try again.".into(),
            PaymentError::PayPal(_) => "We could not reach PayPal. Please try again.".into(),
            PaymentError::CardUnavailable => "Card payments are currently unavailable.".into(),
            PaymentError::Config(_) => "Service configuration error.".into(),
            PaymentError::Wizard(e) => e.user_message(),
            PaymentError::Storage(_) => "An error occurred processing your request.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use donate_core::Step;

    #[test]
    fn test_declined_maps_to_card_field() {
        let err = PaymentError::Declined("Your card has insufficient funds.".into());
        assert!(err.is_recoverable());
        let fields = err.field_errors().unwrap();
        assert_eq!(
            fields.get(CARD_ERROR_FIELD),
            Some("Your card has insufficient funds.")
        );
    }

    #[test]
    fn test_unexpected_errors_are_fatal() {
        let err = PaymentError::Stripe("connection reset".into());
        assert!(!err.is_recoverable());
        assert!(err.field_errors().is_none());

        let err = PaymentError::from(WizardError::MissingStep(Step::Donor));
        assert!(err.is_recoverable());
    }
}

//! Card payments
//!
//! The browser tokenizes card details with Stripe Elements and sends only the
//! resulting PaymentMethod id (the "card handle"). Gateways charge that handle
//! for a finished donation.

mod mock;
mod stripe;

pub use self::mock::MockCardGateway;
pub use self::stripe::StripeCardGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use donate_core::DonationPayload;

use crate::error::{PaymentError, Result};

/// Opaque, client-created reference to the donor's card
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardHandle(String);

impl CardHandle {
    pub fn new(handle: impl Into<String>) -> Result<Self> {
        let handle = handle.into();
        let trimmed = handle.trim();
        if trimmed.is_empty() {
            return Err(PaymentError::MissingCard);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A successful charge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeReceipt {
    /// Processor reference (PaymentIntent id for Stripe)
    pub reference: String,
    pub amount_minor: i64,
}

/// Card gateway trait (Strategy pattern)
///
/// `Err(PaymentError::Declined)` is the recoverable "card refused" outcome;
/// any other error is unexpected.
#[async_trait]
pub trait CardGateway: Send + Sync {
    /// Charge the card for the payload's amount
    async fn charge(&self, card: &CardHandle, payload: &DonationPayload) -> Result<ChargeReceipt>;

    /// Gateway name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_handle_rejects_blank() {
        assert!(matches!(CardHandle::new("   "), Err(PaymentError::MissingCard)));
        assert_eq!(CardHandle::new(" pm_123 ").unwrap().as_str(), "pm_123");
    }
}

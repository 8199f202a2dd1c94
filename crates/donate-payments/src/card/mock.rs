//! Mock Card Gateway
//!
//! For tests and local demos. Never talks to a processor.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use donate_core::DonationPayload;

use super::{CardGateway, CardHandle, ChargeReceipt};
use crate::error::{PaymentError, Result};

/// Handles starting with this prefix are declined
pub const DECLINE_PREFIX: &str = "pm_card_decline";

/// Deterministic card gateway
#[derive(Default)]
pub struct MockCardGateway {
    charges: AtomicUsize,
}

impl MockCardGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful charges so far
    pub fn charge_count(&self) -> usize {
        self.charges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CardGateway for MockCardGateway {
    async fn charge(&self, card: &CardHandle, payload: &DonationPayload) -> Result<ChargeReceipt> {
        if card.as_str().starts_with(DECLINE_PREFIX) {
            return Err(PaymentError::Declined("Your card was declined.".into()));
        }

        let amount_minor = payload
            .minor_units()
            .ok_or_else(|| {
                PaymentError::Stripe(format!("amount out of range: {}", payload.amount))
            })?;
        let n = self.charges.fetch_add(1, Ordering::SeqCst) + 1;

        Ok(ChargeReceipt {
            reference: format!("pi_mock_{n}"),
            amount_minor,
        })
    }

    fn name(&self) -> &str {
        "MockCard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use donate_core::{Currency, GiftItem, PaymentMode};
    use rust_decimal_macros::dec;

    fn payload() -> DonationPayload {
        DonationPayload {
            amount: dec!(25),
            currency: Currency::Usd,
            gift_item: GiftItem::Gift25,
            gift_item_label: GiftItem::Gift25.label().into(),
            donation: "$25.00".into(),
            donor: "Jane Doe".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            wants_to_be_anonymous: false,
            comment: None,
            postal_code: String::new(),
            payment_mode: PaymentMode::Stripe,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_mock_charge() {
        let gateway = MockCardGateway::new();
        let card = CardHandle::new("pm_card_visa").unwrap();

        let receipt = gateway.charge(&card, &payload()).await.unwrap();
        assert_eq!(receipt.amount_minor, 2500);
        assert_eq!(gateway.charge_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_decline() {
        let gateway = MockCardGateway::new();
        let card = CardHandle::new("pm_card_declined").unwrap();

        let result = gateway.charge(&card, &payload()).await;
        assert!(matches!(result, Err(PaymentError::Declined(_))));
        assert_eq!(gateway.charge_count(), 0);
    }
}

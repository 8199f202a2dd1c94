//! Stripe card gateway
//!
//! Creates and confirms a PaymentIntent in one call for the PaymentMethod the
//! browser created with Stripe Elements.

use std::collections::HashMap;

use async_trait::async_trait;
use stripe::{
    Client, CreatePaymentIntent, Currency as StripeCurrency, ErrorType, PaymentIntent,
    PaymentIntentStatus, PaymentMethodId, StripeError,
};

use donate_core::{Currency, DonationPayload};

use super::{CardGateway, CardHandle, ChargeReceipt};
use crate::error::{PaymentError, Result};

/// Stripe client wrapper
pub struct StripeCardGateway {
    client: Client,
}

impl StripeCardGateway {
    /// Create a new Stripe gateway
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;

        Ok(Self::new(&secret_key))
    }
}

#[async_trait]
impl CardGateway for StripeCardGateway {
    async fn charge(&self, card: &CardHandle, payload: &DonationPayload) -> Result<ChargeReceipt> {
        let amount_minor = payload
            .minor_units()
            .ok_or_else(|| {
                PaymentError::Stripe(format!("amount out of range: {}", payload.amount))
            })?;
        let payment_method = card
            .as_str()
            .parse::<PaymentMethodId>()
            .map_err(|_| PaymentError::Declined("Your card details are invalid.".into()))?;

        let description = payload.summary();
        let mut params = CreatePaymentIntent::new(amount_minor, stripe_currency(payload.currency));
        params.payment_method = Some(payment_method);
        params.payment_method_types = Some(vec!["card".to_string()]);
        params.confirm = Some(true);
        params.description = Some(&description);
        if !payload.wants_to_be_anonymous {
            params.receipt_email = Some(&payload.email);
        }

        // Metadata for the Stripe dashboard
        let mut metadata = HashMap::new();
        metadata.insert("donor".to_string(), payload.donor.clone());
        metadata.insert("gift_item".to_string(), payload.gift_item.code().to_string());
        if !payload.gift_item_label.is_empty() {
            metadata.insert("gift_item_label".to_string(), payload.gift_item_label.clone());
        }
        if !payload.postal_code.is_empty() {
            metadata.insert("postal_code".to_string(), payload.postal_code.clone());
        }
        params.metadata = Some(metadata);

        let intent = PaymentIntent::create(&self.client, params)
            .await
            .map_err(map_stripe_error)?;

        match intent.status {
            PaymentIntentStatus::Succeeded | PaymentIntentStatus::Processing => {
                tracing::info!(
                    payment_intent = %intent.id,
                    donation = %payload.donation,
                    "Card charge succeeded"
                );
                Ok(ChargeReceipt {
                    reference: intent.id.to_string(),
                    amount_minor,
                })
            }
            PaymentIntentStatus::RequiresAction => Err(PaymentError::Declined(
                "Your card requires additional authentication. Please use another card.".into(),
            )),
            status => {
                tracing::warn!(payment_intent = %intent.id, ?status, "Card charge not completed");
                Err(PaymentError::Declined("Your card was declined.".into()))
            }
        }
    }

    fn name(&self) -> &str {
        "Stripe"
    }
}

fn stripe_currency(currency: Currency) -> StripeCurrency {
    match currency {
        Currency::Usd => StripeCurrency::USD,
        Currency::Cad => StripeCurrency::CAD,
        Currency::Eur => StripeCurrency::EUR,
        Currency::Gbp => StripeCurrency::GBP,
    }
}

/// Card errors are the donor's to fix; everything else is unexpected
fn map_stripe_error(err: StripeError) -> PaymentError {
    match err {
        StripeError::Stripe(request) if matches!(request.error_type, ErrorType::Card) => {
            PaymentError::Declined(
                request
                    .message
                    .unwrap_or_else(|| "Your card was declined.".into()),
            )
        }
        other => PaymentError::Stripe(other.to_string()),
    }
}

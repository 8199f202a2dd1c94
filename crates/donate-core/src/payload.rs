//! Donation payload
//!
//! The merged, display-ready view of a finished wizard, assembled right
//! before a payment call.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::error::{Result, WizardError};
use crate::form::{PaymentMode, PaymentSelection, StepValues};
use crate::gift::GiftItem;
use crate::step::Step;
use crate::wizard::WizardState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationPayload {
    /// Resolved amount
    pub amount: Decimal,
    pub currency: Currency,
    pub gift_item: GiftItem,
    /// Empty for custom amounts
    pub gift_item_label: String,

    /// Formatted amount, e.g. `$25.00`
    pub donation: String,
    /// "Anonymous" or "First Last"
    pub donor: String,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub wants_to_be_anonymous: bool,
    pub comment: Option<String>,

    pub postal_code: String,
    pub payment_mode: PaymentMode,
    pub created_at: DateTime<Utc>,
}

impl DonationPayload {
    /// Merge the stored Amount and Donor steps with freshly submitted payment
    /// values
    pub fn build(state: &WizardState, payment: &PaymentSelection) -> Result<Self> {
        StepValues::Payment(payment.clone())
            .validate()
            .map_err(WizardError::Validation)?;

        let amount_values = state
            .amount_values()
            .ok_or(WizardError::MissingStep(Step::Amount))?;
        let donor = state
            .donor_values()
            .ok_or(WizardError::MissingStep(Step::Donor))?;

        let gift_item = amount_values
            .gift_item
            .ok_or_else(|| WizardError::InvalidAmount("no gift item selected".into()))?;
        let amount = amount_values.resolved_amount().ok_or_else(|| {
            WizardError::InvalidAmount(format!(
                "{:?} is not a valid donation amount",
                amount_values.custom_amount.as_deref().unwrap_or_default()
            ))
        })?;
        let currency = amount_values.currency.unwrap_or_default();

        Ok(Self {
            amount,
            currency,
            gift_item,
            gift_item_label: gift_item.label().to_string(),
            donation: currency.format(amount),
            donor: donor.display_name(),
            first_name: donor.first_name.trim().to_string(),
            last_name: donor.last_name.trim().to_string(),
            email: donor.email.trim().to_string(),
            wants_to_be_anonymous: donor.wants_to_be_anonymous,
            comment: amount_values.comment_text().map(String::from),
            postal_code: payment.postal_code.trim().to_string(),
            payment_mode: payment.payment_mode,
            created_at: Utc::now(),
        })
    }

    /// Amount in cents for card processors
    pub fn minor_units(&self) -> Option<i64> {
        self.currency.minor_units(self.amount)
    }

    /// One-line summary used in notifications and payment descriptions
    pub fn summary(&self) -> String {
        if self.gift_item_label.is_empty() {
            format!("{} from {}", self.donation, self.donor)
        } else {
            format!("{} ({}) from {}", self.donation, self.gift_item_label, self.donor)
        }
    }
}

//! Step Forms
//!
//! Field values for each wizard step, as submitted by the browser. Values are
//! kept close to what the form holds (for instance the custom amount stays
//! text until it is resolved) so that validation can report on exactly what
//! the donor typed.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::currency::{Currency, chargeable_amount};
use crate::gift::GiftItem;
use crate::step::Step;
use crate::validation::{self, FieldErrors};

/// Read access to a form's fields by name, used by validation rules
pub trait FieldSource {
    /// Textual value of a field; `None` when the field is empty or unknown
    fn field(&self, name: &str) -> Option<String>;
}

/// Amount step
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AmountSelection {
    pub gift_item: Option<GiftItem>,

    /// Only read when `gift_item` is `Custom`
    #[serde(deserialize_with = "text_or_number")]
    pub custom_amount: Option<String>,

    pub currency: Option<Currency>,
    pub wants_to_comment: bool,
    pub comment: String,
}

impl AmountSelection {
    /// Fresh form values
    pub fn initial() -> Self {
        Self {
            currency: Some(Currency::default()),
            ..Self::default()
        }
    }

    /// Parsed custom amount, if it is a number
    pub fn custom_amount_value(&self) -> Option<Decimal> {
        self.custom_amount
            .as_deref()
            .and_then(|raw| raw.trim().parse::<Decimal>().ok())
    }

    /// Amount the donor is giving: the preset's fixed value, or the custom
    /// amount when `Custom` is chosen, rounded to cents. `None` unless it is
    /// at least one cent and at most [`MAX_AMOUNT`](crate::currency::MAX_AMOUNT).
    pub fn resolved_amount(&self) -> Option<Decimal> {
        let amount = match self.gift_item? {
            GiftItem::Custom => self.custom_amount_value()?,
            preset => preset.amount()?,
        };
        chargeable_amount(amount)
    }

    /// Comment to attach, only when the donor opted in and wrote something
    pub fn comment_text(&self) -> Option<&str> {
        let comment = self.comment.trim();
        (self.wants_to_comment && !comment.is_empty()).then_some(comment)
    }
}

impl FieldSource for AmountSelection {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "giftItem" => self.gift_item.map(|g| g.code().to_string()),
            "customAmount" => self.custom_amount.clone(),
            "currency" => self.currency.map(|c| c.code().to_string()),
            "comment" => Some(self.comment.clone()),
            "wantsToComment" => Some(self.wants_to_comment.to_string()),
            _ => None,
        }
        .filter(|v| !v.trim().is_empty())
    }
}

/// Donor step
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonorInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub wants_to_be_anonymous: bool,
}

impl DonorInfo {
    /// "Anonymous" or "First Last"
    pub fn display_name(&self) -> String {
        if self.wants_to_be_anonymous {
            "Anonymous".to_string()
        } else {
            format!("{} {}", self.first_name.trim(), self.last_name.trim())
        }
    }
}

impl FieldSource for DonorInfo {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "firstName" => Some(self.first_name.clone()),
            "lastName" => Some(self.last_name.clone()),
            "email" => Some(self.email.clone()),
            "wantsToBeAnonymous" => Some(self.wants_to_be_anonymous.to_string()),
            _ => None,
        }
        .filter(|v| !v.trim().is_empty())
    }
}

/// Payment provider chosen on the last step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    #[default]
    #[serde(rename = "PAYPAL")]
    PayPal,
    #[serde(rename = "STRIPE")]
    Stripe,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 2] = [PaymentMode::PayPal, PaymentMode::Stripe];

    pub const fn label(self) -> &'static str {
        match self {
            PaymentMode::PayPal => "PayPal",
            PaymentMode::Stripe => "Card",
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Payment step
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentSelection {
    pub postal_code: String,
    pub payment_mode: PaymentMode,
}

impl FieldSource for PaymentSelection {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "postalCode" => Some(self.postal_code.clone()),
            "paymentMode" => Some(self.payment_mode.label().to_string()),
            _ => None,
        }
        .filter(|v| !v.trim().is_empty())
    }
}

/// Values of one step, tagged by the step they belong to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "lowercase")]
pub enum StepValues {
    Amount(AmountSelection),
    Donor(DonorInfo),
    Payment(PaymentSelection),
}

impl StepValues {
    /// Empty form for a step
    pub fn initial(step: Step) -> Self {
        match step {
            Step::Amount => StepValues::Amount(AmountSelection::initial()),
            Step::Donor => StepValues::Donor(DonorInfo::default()),
            Step::Payment => StepValues::Payment(PaymentSelection::default()),
        }
    }

    pub fn step(&self) -> Step {
        match self {
            StepValues::Amount(_) => Step::Amount,
            StepValues::Donor(_) => Step::Donor,
            StepValues::Payment(_) => Step::Payment,
        }
    }

    /// Run the step's rule table against these values
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let rules = validation::rules_for(self.step());
        match self {
            StepValues::Amount(values) => validation::validate(values, rules),
            StepValues::Donor(values) => validation::validate(values, rules),
            StepValues::Payment(values) => validation::validate(values, rules),
        }
    }
}

/// Accept `"12.50"`, `12.5` or `null` for a text field
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

//! Declarative field validation
//!
//! Each step owns a static table of [`FieldRule`]s. A rule is applied to one
//! field's value with the rest of the form available as siblings, and yields
//! an error message or nothing. Rules listed for a field must all pass; the
//! first failure is the one reported.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::chargeable_amount;
use crate::form::FieldSource;
use crate::gift::GiftItem;
use crate::step::Step;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email";
pub const NUMBER_MESSAGE: &str = "Please enter a valid number";
pub const AMOUNT_MESSAGE: &str = "Please select or enter an amount";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// A single check on a field value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Non-blank value
    Required,
    /// Value looks like an email address (empty passes; pair with `Required`)
    Email,
    /// Value parses as a number greater than zero
    PositiveNumber,
    /// A preset gift item, or `CUSTOM` with a `customAmount` sibling of at
    /// least one cent and at most `MAX_AMOUNT`
    GiftOrCustomAmount,
}

impl Rule {
    /// Check `value`, with the whole form available for sibling lookups
    pub fn check<F: FieldSource + ?Sized>(
        self,
        value: Option<&str>,
        siblings: &F,
        message: Option<&'static str>,
    ) -> Option<&'static str> {
        let passed = match self {
            Rule::Required => value.is_some_and(|v| !v.trim().is_empty()),
            Rule::Email => value.is_none_or(|v| EMAIL_PATTERN.is_match(v.trim())),
            Rule::PositiveNumber => is_positive_number(value),
            Rule::GiftOrCustomAmount => match value {
                Some(code) if code == GiftItem::Custom.code() => {
                    is_donation_amount(siblings.field("customAmount").as_deref())
                }
                Some(code) => GiftItem::from_code(code).is_some(),
                None => false,
            },
        };
        if passed {
            None
        } else {
            Some(message.unwrap_or_else(|| self.default_message()))
        }
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            Rule::Required => REQUIRED_MESSAGE,
            Rule::Email => EMAIL_MESSAGE,
            Rule::PositiveNumber => NUMBER_MESSAGE,
            Rule::GiftOrCustomAmount => AMOUNT_MESSAGE,
        }
    }
}

fn is_positive_number(value: Option<&str>) -> bool {
    value
        .and_then(|v| v.trim().parse::<Decimal>().ok())
        .is_some_and(|n| n > Decimal::ZERO)
}

fn is_donation_amount(value: Option<&str>) -> bool {
    value
        .and_then(|v| v.trim().parse::<Decimal>().ok())
        .and_then(chargeable_amount)
        .is_some()
}

/// Rules attached to one named field
#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub field: &'static str,
    pub rules: &'static [Rule],
    /// Overrides every rule's default message
    pub message: Option<&'static str>,
}

impl FieldRule {
    const fn new(field: &'static str, rules: &'static [Rule]) -> Self {
        Self {
            field,
            rules,
            message: None,
        }
    }

    const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

const AMOUNT_RULES: &[FieldRule] = &[
    FieldRule::new("currency", &[Rule::Required]),
    FieldRule::new("giftItem", &[Rule::GiftOrCustomAmount]).with_message(AMOUNT_MESSAGE),
];

const DONOR_RULES: &[FieldRule] = &[
    FieldRule::new("firstName", &[Rule::Required]),
    FieldRule::new("lastName", &[Rule::Required]),
    FieldRule::new("email", &[Rule::Required, Rule::Email]),
];

// Card details are checked by the card gateway.
const PAYMENT_RULES: &[FieldRule] = &[];

/// Rule table for a step
pub const fn rules_for(step: Step) -> &'static [FieldRule] {
    match step {
        Step::Amount => AMOUNT_RULES,
        Step::Donor => DONOR_RULES,
        Step::Payment => PAYMENT_RULES,
    }
}

/// Field name to error message
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single error attached to one field
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        f.write_str(&parts.join(", "))
    }
}

/// Apply a rule table to a form
pub fn validate<F: FieldSource + ?Sized>(form: &F, rules: &[FieldRule]) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    for field_rule in rules {
        let value = form.field(field_rule.field);
        let failure = field_rule
            .rules
            .iter()
            .find_map(|rule| rule.check(value.as_deref(), form, field_rule.message));

        if let Some(message) = failure {
            errors.insert(field_rule.field, message);
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::form::{AmountSelection, DonorInfo, PaymentSelection};

    fn donor(email: &str) -> DonorInfo {
        DonorInfo {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: email.into(),
            wants_to_be_anonymous: false,
        }
    }

    #[test]
    fn test_missing_email_is_required_error() {
        let errors = validate(&donor(""), rules_for(Step::Donor)).unwrap_err();
        assert_eq!(errors.get("email"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_malformed_email_is_format_error() {
        let errors = validate(&donor("a@b"), rules_for(Step::Donor)).unwrap_err();
        assert_eq!(errors.get("email"), Some(EMAIL_MESSAGE));

        assert!(validate(&donor("jane@x.com"), rules_for(Step::Donor)).is_ok());
    }

    #[test]
    fn test_names_required() {
        let errors = validate(&DonorInfo::default(), rules_for(Step::Donor)).unwrap_err();
        assert_eq!(errors.get("firstName"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("lastName"), Some(REQUIRED_MESSAGE));
        assert_eq!(errors.get("email"), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_custom_amount_must_be_chargeable() {
        let bad_inputs = [
            None,
            Some("0"),
            Some("-5"),
            Some("abc"),
            Some("  "),
            Some("0.001"),
            Some("1000000.01"),
            Some("1000000000000000000000000000"),
        ];
        for bad in bad_inputs {
            let form = AmountSelection {
                gift_item: Some(GiftItem::Custom),
                custom_amount: bad.map(String::from),
                ..AmountSelection::initial()
            };
            let errors = validate(&form, rules_for(Step::Amount)).unwrap_err();
            assert_eq!(errors.get("giftItem"), Some(AMOUNT_MESSAGE), "input {bad:?}");
        }

        let form = AmountSelection {
            gift_item: Some(GiftItem::Custom),
            custom_amount: Some("15".into()),
            ..AmountSelection::initial()
        };
        assert!(validate(&form, rules_for(Step::Amount)).is_ok());
    }

    #[test]
    fn test_amount_requires_gift_and_currency() {
        let form = AmountSelection::default();
        let errors = validate(&form, rules_for(Step::Amount)).unwrap_err();
        assert_eq!(errors.get("giftItem"), Some(AMOUNT_MESSAGE));
        assert_eq!(errors.get("currency"), Some(REQUIRED_MESSAGE));

        let form = AmountSelection {
            gift_item: Some(GiftItem::Gift25),
            currency: Some(Currency::Usd),
            ..AmountSelection::default()
        };
        assert!(validate(&form, rules_for(Step::Amount)).is_ok());
    }

    #[test]
    fn test_payment_step_has_no_client_rules() {
        assert!(validate(&PaymentSelection::default(), rules_for(Step::Payment)).is_ok());
    }

    #[test]
    fn test_field_errors_serialize_flat() {
        let errors = FieldErrors::single("stripeError", "Your card was declined.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"stripeError": "Your card was declined."}));
    }
}

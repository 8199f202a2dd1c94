//! Step Controller
//!
//! The wizard walks Amount → Donor → Payment. Transitions take the current
//! state by reference and hand back a new one, so a failed transition leaves
//! the caller's state untouched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::error::{Result, WizardError};
use crate::form::{AmountSelection, DonorInfo, PaymentSelection, StepValues};
use crate::step::Step;

/// Current step plus the values of every step submitted so far
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    current_step: Step,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    amount: Option<AmountSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    donor: Option<DonorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payment: Option<PaymentSelection>,
}

impl WizardState {
    /// Fresh wizard on the first step
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn amount_values(&self) -> Option<&AmountSelection> {
        self.amount.as_ref()
    }

    pub fn donor_values(&self) -> Option<&DonorInfo> {
        self.donor.as_ref()
    }

    /// Stored values of a step, if it was ever submitted
    pub fn stored(&self, step: Step) -> Option<StepValues> {
        match step {
            Step::Amount => self.amount.clone().map(StepValues::Amount),
            Step::Donor => self.donor.clone().map(StepValues::Donor),
            Step::Payment => self.payment.clone().map(StepValues::Payment),
        }
    }

    pub fn has_values(&self, step: Step) -> bool {
        match step {
            Step::Amount => self.amount.is_some(),
            Step::Donor => self.donor.is_some(),
            Step::Payment => self.payment.is_some(),
        }
    }

    /// Values to pre-fill a step's form with
    pub fn form_values(&self, step: Step) -> StepValues {
        self.stored(step).unwrap_or_else(|| StepValues::initial(step))
    }

    /// Resolved amount of the stored Amount step, for display on later steps
    pub fn amount(&self) -> Option<(Decimal, Currency)> {
        let amount = self.amount.as_ref()?;
        Some((amount.resolved_amount()?, amount.currency?))
    }

    /// Validate and store the current step's values, then move forward one step
    pub fn advance(&self, values: StepValues) -> Result<WizardState> {
        let step = values.step();
        if step != self.current_step {
            return Err(WizardError::StepMismatch {
                expected: self.current_step,
                actual: step,
            });
        }

        let Some(next) = step.next() else {
            return Err(WizardError::FinalStep(step));
        };

        values.validate().map_err(WizardError::Validation)?;

        let mut state = self.store(values);
        state.current_step = next;

        tracing::debug!(from = %step, to = %next, "Advanced wizard step");
        Ok(state)
    }

    /// Jump to a step without validation (header breadcrumb)
    pub fn go_to(&self, step: Step) -> WizardState {
        WizardState {
            current_step: step,
            ..self.clone()
        }
    }

    /// Store values for their step without moving or validating
    pub fn store(&self, values: StepValues) -> WizardState {
        let mut state = self.clone();
        match values {
            StepValues::Amount(v) => state.amount = Some(v),
            StepValues::Donor(v) => state.donor = Some(v),
            StepValues::Payment(v) => state.payment = Some(v),
        }
        state
    }

    /// Drop all values and return to the first step
    pub fn reset(&self) -> WizardState {
        WizardState::new()
    }
}

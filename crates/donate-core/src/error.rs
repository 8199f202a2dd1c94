//! Error Types

use thiserror::Error;

use crate::step::Step;
use crate::validation::FieldErrors;

/// Result type alias for wizard operations
pub type Result<T> = std::result::Result<T, WizardError>;

/// Wizard error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// One or more fields failed validation
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Values were submitted for a step that is not the current one
    #[error("Expected values for step {expected}, got {actual}")]
    StepMismatch { expected: Step, actual: Step },

    /// `advance` was called on the last step
    #[error("The {0} step is final; submit the donation instead")]
    FinalStep(Step),

    /// A step's values are required but were never submitted
    #[error("Step {0} has not been completed")]
    MissingStep(Step),

    /// Custom amount could not be resolved to a positive number
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Session lookup failed
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// A submission is already running for this session
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    /// Session store failure
    #[error("Session error: {0}")]
    Session(String),
}

impl WizardError {
    /// Errors the donor can fix by editing the form
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WizardError::Validation(_) | WizardError::InvalidAmount(_) | WizardError::MissingStep(_)
        )
    }

    /// Field errors to show inline, if any
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            WizardError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            WizardError::Validation(_) => "Please correct the highlighted fields.".into(),
            WizardError::StepMismatch { expected, .. } => {
                format!("Please complete the {} step first.", expected.title())
            }
            WizardError::FinalStep(_) => "Please choose a payment method to finish.".into(),
            WizardError::MissingStep(step) => {
                format!("Please complete the {} step first.", step.title())
            }
            WizardError::InvalidAmount(_) => "Please select or enter an amount.".into(),
            WizardError::SessionNotFound(_) => {
                "Your donation session has expired. Please start again.".into()
            }
            WizardError::SubmissionInFlight => {
                "Your donation is already being processed.".into()
            }
            WizardError::Session(_) => "An unexpected error occurred.".into(),
        }
    }
}

//! Wizard steps

use serde::{Deserialize, Serialize};

/// One screen of the donation wizard, in display order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Amount,
    Donor,
    Payment,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Amount, Step::Donor, Step::Payment];

    /// The first step of a fresh wizard
    pub const fn first() -> Self {
        Step::Amount
    }

    pub const fn index(self) -> usize {
        match self {
            Step::Amount => 0,
            Step::Donor => 1,
            Step::Payment => 2,
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Step::Amount => Some(Step::Donor),
            Step::Donor => Some(Step::Payment),
            Step::Payment => None,
        }
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            Step::Amount => None,
            Step::Donor => Some(Step::Amount),
            Step::Payment => Some(Step::Donor),
        }
    }

    pub const fn is_final(self) -> bool {
        self.next().is_none()
    }

    /// Breadcrumb label
    pub const fn title(self) -> &'static str {
        match self {
            Step::Amount => "Amount",
            Step::Donor => "Donor",
            Step::Payment => "Payment",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Step::Amount => "amount",
            Step::Donor => "donor",
            Step::Payment => "payment",
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::first()
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Currencies and donation amount formatting
//!
//! Amounts are `rust_decimal::Decimal` end to end.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Largest single donation accepted, in any currency
pub const MAX_AMOUNT: Decimal = dec!(1_000_000);

/// Amount rounded to cents, if it is above zero and within [`MAX_AMOUNT`]
pub fn chargeable_amount(amount: Decimal) -> Option<Decimal> {
    let cents = amount.round_dp(2);
    (cents > Decimal::ZERO && cents <= MAX_AMOUNT).then_some(cents)
}

/// Currencies a donor can give in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Cad,
    Eur,
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Cad, Currency::Eur, Currency::Gbp];

    /// ISO 4217 code
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Cad => "CAD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Cad => "CA$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Symbol followed by the amount with two decimals, e.g. `$25.00`
    pub fn format(self, amount: Decimal) -> String {
        format!("{}{:.2}", self.symbol(), amount.round_dp(2))
    }

    /// Amount in the smallest currency unit (all supported currencies use cents)
    pub fn minor_units(self, amount: Decimal) -> Option<i64> {
        amount.checked_mul(Decimal::ONE_HUNDRED)?.round().to_i64()
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

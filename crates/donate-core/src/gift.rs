//! Preset gift items

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A preset donation option, or `Custom` for a donor-entered amount
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GiftItem {
    #[serde(rename = "GIFT_10")]
    Gift10,
    #[serde(rename = "GIFT_25")]
    Gift25,
    #[serde(rename = "GIFT_50")]
    Gift50,
    #[serde(rename = "GIFT_100")]
    Gift100,
    #[serde(rename = "GIFT_250")]
    Gift250,
    #[serde(rename = "CUSTOM")]
    Custom,
}

impl GiftItem {
    pub const PRESETS: [GiftItem; 5] = [
        GiftItem::Gift10,
        GiftItem::Gift25,
        GiftItem::Gift50,
        GiftItem::Gift100,
        GiftItem::Gift250,
    ];

    /// Wire value used by the forms
    pub const fn code(self) -> &'static str {
        match self {
            GiftItem::Gift10 => "GIFT_10",
            GiftItem::Gift25 => "GIFT_25",
            GiftItem::Gift50 => "GIFT_50",
            GiftItem::Gift100 => "GIFT_100",
            GiftItem::Gift250 => "GIFT_250",
            GiftItem::Custom => "CUSTOM",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::PRESETS
            .into_iter()
            .chain(std::iter::once(GiftItem::Custom))
            .find(|g| g.code() == code)
    }

    /// Fixed amount of a preset; `None` for `Custom`
    pub fn amount(self) -> Option<Decimal> {
        match self {
            GiftItem::Gift10 => Some(dec!(10)),
            GiftItem::Gift25 => Some(dec!(25)),
            GiftItem::Gift50 => Some(dec!(50)),
            GiftItem::Gift100 => Some(dec!(100)),
            GiftItem::Gift250 => Some(dec!(250)),
            GiftItem::Custom => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            GiftItem::Gift10 => "Buy us a coffee",
            GiftItem::Gift25 => "Feed a volunteer",
            GiftItem::Gift50 => "Fund a workshop",
            GiftItem::Gift100 => "Sponsor a month of hosting",
            GiftItem::Gift250 => "Become a patron",
            GiftItem::Custom => "",
        }
    }

    pub const fn is_custom(self) -> bool {
        matches!(self, GiftItem::Custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_amounts() {
        assert_eq!(GiftItem::Gift25.amount(), Some(dec!(25)));
        assert_eq!(GiftItem::Custom.amount(), None);
        assert!(GiftItem::PRESETS.iter().all(|g| g.amount().is_some()));
    }

    #[test]
    fn test_codes_match_serde() {
        for item in GiftItem::PRESETS {
            let json = serde_json::to_string(&item).unwrap();
            assert_eq!(json, format!("\"{}\"", item.code()));
            assert_eq!(GiftItem::from_code(item.code()), Some(item));
        }
        assert_eq!(GiftItem::from_code("CUSTOM"), Some(GiftItem::Custom));
    }
}

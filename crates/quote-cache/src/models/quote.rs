use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Market metrics for one asset, as returned by the upstream provider.
///
/// The cache stores and returns this value verbatim; only the provider and
/// the caller interpret it. Metrics that were not requested are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Current price in the reference currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    /// Price change over the last 24 hours, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_24h: Option<Decimal>,

    /// Price change over the last week, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_1w: Option<Decimal>,

    /// Price change over the last 30 days, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_30d: Option<Decimal>,
}

impl Quote {
    /// Create a quote carrying only a price
    pub fn with_price(price: Decimal) -> Self {
        Self {
            price: Some(price),
            ..Default::default()
        }
    }
}

/// A metric that can be requested from the upstream provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "price")]
    Price,
    #[serde(rename = "priceChange24h")]
    PriceChange24h,
    #[serde(rename = "priceChange1w")]
    PriceChange1w,
    #[serde(rename = "priceChange30d")]
    PriceChange30d,
}

impl Field {
    /// All requestable fields, in wire order.
    pub const ALL: [Field; 4] = [
        Field::Price,
        Field::PriceChange24h,
        Field::PriceChange1w,
        Field::PriceChange30d,
    ];

    /// Name used on the wire (query parameters and response bodies).
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Price => "price",
            Field::PriceChange24h => "priceChange24h",
            Field::PriceChange1w => "priceChange1w",
            Field::PriceChange30d => "priceChange30d",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known [`Field`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown quote field: {0}")]
pub struct ParseFieldError(pub String);

impl FromStr for Field {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFieldError(s.to_string()))
    }
}

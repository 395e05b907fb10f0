use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single price observation: epoch-millis timestamp plus an exact decimal
/// price.
///
/// Within one series, samples are unique by timestamp and kept in strictly
/// increasing timestamp order. On the wire a sample is a compact
/// `[timestamp, price]` pair with the price as a decimal string; callers
/// depend on that shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i64, Decimal)", into = "(i64, Decimal)")]
pub struct PriceSample {
    pub timestamp: i64,
    pub price: Decimal,
}

impl PriceSample {
    pub fn new(timestamp: i64, price: Decimal) -> Self {
        Self { timestamp, price }
    }

    /// The compact `(timestamp, price)` shape used on the query surface.
    pub fn as_tuple(&self) -> (i64, Decimal) {
        (self.timestamp, self.price)
    }
}

impl From<(i64, Decimal)> for PriceSample {
    fn from((timestamp, price): (i64, Decimal)) -> Self {
        Self { timestamp, price }
    }
}

impl From<PriceSample> for (i64, Decimal) {
    fn from(sample: PriceSample) -> Self {
        sample.as_tuple()
    }
}

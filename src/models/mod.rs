mod address;
mod currency;
mod position;
mod sample;

pub use address::Address;
pub use currency::Currency;
pub use position::{AssetMetadata, EnrichedPosition, PositionRecord, StatsRecord};
pub use sample::PriceSample;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

pub(crate) fn parse_decimal(value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).with_context(|| format!("Invalid decimal value: {}", value))
}

pub(crate) fn decimal_to_string(value: Decimal) -> String {
    value.normalize().to_string()
}

use serde::{Deserialize, Serialize};

use super::Address;

/// Asset metadata served by the external metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub decimals: u32,
    pub name: String,
}

/// Per-asset aggregate statistics record, lazily created by the stats
/// provider. The shape is consumed, not owned, by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub address: Address,
    /// Total value locked, as a decimal string. Absent or empty counts as
    /// zero for summation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvl: Option<String>,
    /// Total value minted, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvm: Option<String>,
}

impl StatsRecord {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            tvl: None,
            tvm: None,
        }
    }

    pub fn with_tvl(mut self, tvl: impl Into<String>) -> Self {
        self.tvl = Some(tvl.into());
        self
    }

    pub fn with_tvm(mut self, tvm: impl Into<String>) -> Self {
        self.tvm = Some(tvm.into());
        self
    }
}

/// Raw position/contract record prior to enrichment.
///
/// Collateral and token amounts are raw fixed-point decimal strings, scaled
/// by the respective asset's decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_currency: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral_currency: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_position_collateral: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens_outstanding: Option<String>,
    #[serde(default)]
    pub expired: bool,
}

impl PositionRecord {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            token_currency: None,
            collateral_currency: None,
            total_position_collateral: None,
            total_tokens_outstanding: None,
            expired: false,
        }
    }
}

/// A position record joined with asset metadata and a derived
/// collateralization ratio.
///
/// Enrichment is best-effort: metadata fields are absent when a lookup leg
/// failed, and `gcr` falls back to the decimal-zero string when the ratio
/// could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedPosition {
    #[serde(flatten)]
    pub position: PositionRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_decimals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral_decimals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral_name: Option<String>,
    pub gcr: String,
}

impl EnrichedPosition {
    /// The passthrough shape for a record whose join produced nothing: raw
    /// position fields, no metadata, zero ratio.
    pub fn unenriched(position: PositionRecord) -> Self {
        Self {
            position,
            token_decimals: None,
            collateral_decimals: None,
            token_name: None,
            collateral_name: None,
            gcr: "0".to_string(),
        }
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::debug;

use super::gcr::calc_gcr;
use crate::models::{
    decimal_to_string, Address, AssetMetadata, EnrichedPosition, PositionRecord,
};

/// External source of asset metadata (decimals, display name).
#[async_trait::async_trait]
pub trait AssetMetadataProvider: Send + Sync {
    /// Fails when the address is unknown. Callers treat failure as "metadata
    /// unavailable", never as fatal.
    async fn get(&self, address: &Address) -> Result<AssetMetadata>;
}

/// In-memory metadata provider for tests and in-process composition.
#[derive(Default)]
pub struct MemoryMetadataProvider {
    entries: Mutex<HashMap<Address, AssetMetadata>>,
}

impl MemoryMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, address: Address, metadata: AssetMetadata) {
        let mut entries = self.entries.lock().await;
        entries.insert(address, metadata);
    }
}

#[async_trait::async_trait]
impl AssetMetadataProvider for MemoryMetadataProvider {
    async fn get(&self, address: &Address) -> Result<AssetMetadata> {
        let entries = self.entries.lock().await;
        entries
            .get(address)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no metadata for address {address}"))
    }
}

/// Joins position records with asset metadata and a derived collateralization
/// ratio.
///
/// Enrichment is best-effort in two stages: a metadata lookup that fails
/// leaves that leg's fields absent, and a ratio computation that faults
/// defaults to the decimal-zero string. The join itself never fails, so one
/// malformed record can never poison a listing.
pub struct EnrichmentJoiner {
    metadata: Arc<dyn AssetMetadataProvider>,
}

impl EnrichmentJoiner {
    pub fn new(metadata: Arc<dyn AssetMetadataProvider>) -> Self {
        Self { metadata }
    }

    pub async fn enrich(&self, record: &PositionRecord) -> EnrichedPosition {
        let token = self.lookup(record.token_currency.as_ref()).await;
        let collateral = self.lookup(record.collateral_currency.as_ref()).await;

        let mut enriched = EnrichedPosition::unenriched(record.clone());
        if let Some(metadata) = token {
            enriched.token_decimals = Some(metadata.decimals);
            enriched.token_name = Some(metadata.name);
        }
        if let Some(metadata) = collateral {
            enriched.collateral_decimals = Some(metadata.decimals);
            enriched.collateral_name = Some(metadata.name);
        }

        match calc_gcr(
            record.total_position_collateral.as_deref(),
            record.total_tokens_outstanding.as_deref(),
            enriched.collateral_decimals,
            enriched.token_decimals,
        ) {
            Ok(gcr) => enriched.gcr = decimal_to_string(gcr),
            Err(err) => {
                debug!(
                    address = %record.address,
                    error = %err,
                    "gcr unavailable, defaulting to zero"
                );
            }
        }

        enriched
    }

    async fn lookup(&self, address: Option<&Address>) -> Option<AssetMetadata> {
        let address = address?;
        match self.metadata.get(address).await {
            Ok(metadata) => Some(metadata),
            Err(err) => {
                debug!(address = %address, error = %err, "asset metadata unavailable");
                None
            }
        }
    }
}

const DEFAULT_CONCURRENCY: usize = 4;

/// Maps record collections through the joiner with bounded concurrency.
///
/// The pool size is fixed so a large listing cannot overwhelm the metadata
/// provider. Output order matches input order even though joins complete out
/// of order; a record whose join produced nothing comes back in its raw
/// pre-join shape with a zero ratio.
pub struct BulkListProjector {
    joiner: Arc<EnrichmentJoiner>,
    concurrency: usize,
}

impl BulkListProjector {
    pub fn new(joiner: Arc<EnrichmentJoiner>) -> Self {
        Self {
            joiner,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn project(&self, records: &[PositionRecord]) -> Vec<EnrichedPosition> {
        stream::iter(records.iter().cloned())
            .map(|record| {
                let joiner = Arc::clone(&self.joiner);
                async move { joiner.enrich(&record).await }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

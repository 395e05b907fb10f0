//! Shared query surface over the price book, aggregation engine, and
//! enrichment projector.
//!
//! Consumed by reporting endpoints; transport is out of scope here. Price
//! queries return bare `(timestamp, price)` tuples rather than named-field
//! records to keep serialized responses small - callers depend on that shape.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::PricebookConfig;
use crate::enrichment::{AssetMetadataProvider, BulkListProjector, EnrichmentJoiner};
use crate::error::PriceError;
use crate::models::{Address, Currency, EnrichedPosition, PositionRecord};
use crate::prices::PriceBook;
use crate::stats::{AddressRegistry, AggregationEngine, StatsField, StatsProvider};

/// Facade joining the store, aggregation, and enrichment layers.
///
/// Single-item queries surface typed [`PriceError`] faults verbatim. Batch
/// queries always return a complete result set of the same length as their
/// input, absorbing per-item faults into documented fallbacks.
pub struct QueryService {
    book: Arc<PriceBook>,
    aggregation: AggregationEngine,
    projector: BulkListProjector,
}

impl QueryService {
    pub fn new(
        book: Arc<PriceBook>,
        aggregation: AggregationEngine,
        projector: BulkListProjector,
    ) -> Self {
        Self {
            book,
            aggregation,
            projector,
        }
    }

    /// Wire the full query stack from configuration: currency partitions,
    /// stats-fetch concurrency, and enrichment concurrency all come from
    /// `config`; the external collaborators are supplied by the caller.
    pub fn from_config(
        config: &PricebookConfig,
        stats: Arc<dyn StatsProvider>,
        registry: Arc<dyn AddressRegistry>,
        metadata: Arc<dyn AssetMetadataProvider>,
    ) -> Self {
        let book = Arc::new(PriceBook::from_config(config));
        let aggregation =
            AggregationEngine::new(stats, registry).with_concurrency(config.stats_concurrency);
        let projector = BulkListProjector::new(Arc::new(EnrichmentJoiner::new(metadata)))
            .with_concurrency(config.enrich_concurrency);
        Self::new(book, aggregation, projector)
    }

    /// The underlying price book, shared with ingestion paths.
    pub fn book(&self) -> Arc<PriceBook> {
        Arc::clone(&self.book)
    }

    /// All samples for `address` with `start <= timestamp <= end`, in
    /// increasing order. `end = None` means "now".
    pub async fn historical_prices(
        &self,
        address: &Address,
        start: i64,
        end: Option<i64>,
        currency: Currency,
    ) -> Result<Vec<(i64, Decimal)>, PriceError> {
        let samples = self
            .book
            .range_by_timestamp(currency, address, start, end)
            .await?;
        Ok(samples.iter().map(|s| s.as_tuple()).collect())
    }

    /// Up to `length` samples beginning at the first sample with
    /// `timestamp >= start`.
    pub async fn windowed_prices(
        &self,
        address: &Address,
        start: i64,
        length: usize,
        currency: Currency,
    ) -> Result<Vec<(i64, Decimal)>, PriceError> {
        let samples = self
            .book
            .window_by_timestamp(currency, address, start, length)
            .await?;
        Ok(samples.iter().map(|s| s.as_tuple()).collect())
    }

    /// The most recent observation for `address`.
    pub async fn latest_price(
        &self,
        address: &Address,
        currency: Currency,
    ) -> Result<(i64, Decimal), PriceError> {
        let sample = self.book.latest(currency, address).await?;
        Ok(sample.as_tuple())
    }

    /// Exact decimal TVL sum across `addresses`, as a decimal string.
    /// Addresses without a stats record contribute zero.
    pub async fn sum_tvl(&self, addresses: &[Address], currency: Currency) -> String {
        debug!(count = addresses.len(), currency = %currency, "summing tvl");
        self.aggregation
            .sum(addresses, currency, StatsField::Tvl)
            .await
    }

    /// TVL sum over the full registered-address universe.
    pub async fn total_tvl(&self, currency: Currency) -> Result<String, PriceError> {
        self.aggregation.total_sum(currency, StatsField::Tvl).await
    }

    /// Best-effort enrichment of a record collection. The output has the same
    /// length and order as the input; records whose join produced nothing
    /// come back unenriched with a zero ratio.
    pub async fn list_enriched(&self, records: &[PositionRecord]) -> Vec<EnrichedPosition> {
        self.projector.project(records).await
    }
}

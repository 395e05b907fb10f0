#![allow(dead_code)]

use std::sync::Arc;

use pricebook::enrichment::{BulkListProjector, EnrichmentJoiner, MemoryMetadataProvider};
use pricebook::models::Currency;
use pricebook::prices::PriceBook;
use pricebook::queries::QueryService;
use pricebook::stats::{AggregationEngine, MemoryAddressRegistry, MemoryStatsProvider};

/// Installs a fmt subscriber once so `RUST_LOG` surfaces crate logs during
/// test runs. Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fully wired in-memory query stack for integration tests.
pub struct TestHarness {
    pub book: Arc<PriceBook>,
    pub stats: Arc<MemoryStatsProvider>,
    pub registry: Arc<MemoryAddressRegistry>,
    pub metadata: Arc<MemoryMetadataProvider>,
    pub service: QueryService,
}

pub fn harness(currencies: impl IntoIterator<Item = Currency>) -> TestHarness {
    init_tracing();

    let book = Arc::new(PriceBook::new(currencies));
    let stats = Arc::new(MemoryStatsProvider::new());
    let registry = Arc::new(MemoryAddressRegistry::new());
    let metadata = Arc::new(MemoryMetadataProvider::new());

    let aggregation = AggregationEngine::new(stats.clone(), registry.clone());
    let projector = BulkListProjector::new(Arc::new(EnrichmentJoiner::new(metadata.clone())));
    let service = QueryService::new(book.clone(), aggregation, projector);

    TestHarness {
        book,
        stats,
        registry,
        metadata,
        service,
    }
}

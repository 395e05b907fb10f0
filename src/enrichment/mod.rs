mod gcr;
mod joiner;

pub use gcr::calc_gcr;
pub use joiner::{
    AssetMetadataProvider, BulkListProjector, EnrichmentJoiner, MemoryMetadataProvider,
};

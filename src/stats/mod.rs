mod aggregation;
mod provider;

pub use aggregation::{AggregationEngine, StatsField};
pub use provider::{
    AddressRegistry, MemoryAddressRegistry, MemoryStatsProvider, StatsProvider,
};

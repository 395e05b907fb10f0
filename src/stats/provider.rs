use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::models::{Address, Currency, StatsRecord};

/// External source of per-(currency, address) aggregate statistics.
///
/// Creation is idempotent: repeated calls for the same key return the same
/// logical record. A freshly created record has no field values, which the
/// aggregation layer treats as zero.
#[async_trait::async_trait]
pub trait StatsProvider: Send + Sync {
    async fn get_or_create(&self, currency: Currency, address: &Address) -> Result<StatsRecord>;
}

/// Enumerable set of all addresses eligible for whole-universe aggregates.
#[async_trait::async_trait]
pub trait AddressRegistry: Send + Sync {
    async fn addresses(&self) -> Result<Vec<Address>>;
}

/// In-memory stats provider for tests and in-process composition.
#[derive(Default)]
pub struct MemoryStatsProvider {
    records: Mutex<HashMap<(Currency, Address), StatsRecord>>,
}

impl MemoryStatsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, currency: Currency, record: StatsRecord) {
        let mut records = self.records.lock().await;
        records.insert((currency, record.address.clone()), record);
    }
}

#[async_trait::async_trait]
impl StatsProvider for MemoryStatsProvider {
    async fn get_or_create(&self, currency: Currency, address: &Address) -> Result<StatsRecord> {
        let mut records = self.records.lock().await;
        let record = records
            .entry((currency, address.clone()))
            .or_insert_with(|| StatsRecord::new(address.clone()));
        Ok(record.clone())
    }
}

/// In-memory address registry.
#[derive(Default)]
pub struct MemoryAddressRegistry {
    addresses: Mutex<Vec<Address>>,
}

impl MemoryAddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, address: Address) {
        let mut addresses = self.addresses.lock().await;
        if !addresses.contains(&address) {
            addresses.push(address);
        }
    }
}

#[async_trait::async_trait]
impl AddressRegistry for MemoryAddressRegistry {
    async fn addresses(&self) -> Result<Vec<Address>> {
        let addresses = self.addresses.lock().await;
        Ok(addresses.clone())
    }
}

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use tracing::warn;

use super::{AddressRegistry, StatsProvider};
use crate::error::PriceError;
use crate::models::{decimal_to_string, parse_decimal, Address, Currency, StatsRecord};

/// Which stats field an aggregate sums over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsField {
    Tvl,
    Tvm,
}

const DEFAULT_CONCURRENCY: usize = 10;

/// Sums a stats field across many addresses using exact decimal arithmetic.
///
/// Floating point never enters the summation path, so the result is
/// independent of address count and fetch order. Per-address fetches run
/// concurrently up to a fixed bound; decimal addition commutes, so completion
/// order does not affect the total.
pub struct AggregationEngine {
    stats: Arc<dyn StatsProvider>,
    registry: Arc<dyn AddressRegistry>,
    concurrency: usize,
}

impl AggregationEngine {
    pub fn new(stats: Arc<dyn StatsProvider>, registry: Arc<dyn AddressRegistry>) -> Self {
        Self {
            stats,
            registry,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Exact decimal sum of `field` across `addresses`, as a decimal string.
    ///
    /// Records are fetched or lazily created through the stats provider. A
    /// missing or unparseable field value, or a failed per-address fetch,
    /// contributes zero, and a value that would overflow the running total is
    /// dropped; one bad address never aborts the aggregate. An empty address
    /// list sums to `"0"`.
    pub async fn sum(
        &self,
        addresses: &[Address],
        currency: Currency,
        field: StatsField,
    ) -> String {
        let total = stream::iter(addresses.iter().cloned())
            .map(|address| {
                let stats = Arc::clone(&self.stats);
                async move {
                    match stats.get_or_create(currency, &address).await {
                        Ok(record) => field_value(&record, field),
                        Err(err) => {
                            warn!(
                                address = %address,
                                error = %err,
                                "stats fetch failed, counting as zero"
                            );
                            Decimal::ZERO
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .fold(Decimal::ZERO, |sum, value| async move {
                match sum.checked_add(value) {
                    Some(total) => total,
                    None => {
                        warn!(
                            running_total = %sum,
                            value = %value,
                            "aggregate overflowed, dropping contribution"
                        );
                        sum
                    }
                }
            })
            .await;

        decimal_to_string(total)
    }

    /// Sum over the registry's full address universe.
    pub async fn total_sum(
        &self,
        currency: Currency,
        field: StatsField,
    ) -> Result<String, PriceError> {
        let addresses = self.registry.addresses().await.map_err(|err| {
            PriceError::Upstream(format!("address registry unavailable: {err}"))
        })?;
        Ok(self.sum(&addresses, currency, field).await)
    }
}

fn field_value(record: &StatsRecord, field: StatsField) -> Decimal {
    let raw = match field {
        StatsField::Tvl => record.tvl.as_deref(),
        StatsField::Tvm => record.tvm.as_deref(),
    };
    match raw {
        None => Decimal::ZERO,
        Some(value) if value.trim().is_empty() => Decimal::ZERO,
        Some(value) => parse_decimal(value).unwrap_or_else(|err| {
            warn!(
                address = %record.address,
                error = %err,
                "unparseable stats value, counting as zero"
            );
            Decimal::ZERO
        }),
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use super::fetcher::FetchedPrice;
use super::series::PriceSeries;
use crate::clock::{Clock, SystemClock};
use crate::config::PricebookConfig;
use crate::error::PriceError;
use crate::models::{Address, Currency, PriceSample};

#[derive(Debug, Default)]
struct Partition {
    history: HashMap<Address, PriceSeries>,
    latest: HashMap<Address, PriceSample>,
}

/// Currency-partitioned price store with a most-recent-sample cache.
///
/// Partitions are fixed at construction; per-address series are created
/// lazily on first append and never deleted. All mutation goes through
/// [`PriceBook::append`], which holds the partition lock for the duration of
/// a single insertion, so queries never observe a partially-appended sample.
pub struct PriceBook {
    partitions: HashMap<Currency, Mutex<Partition>>,
    clock: Arc<dyn Clock>,
}

impl PriceBook {
    pub fn new(currencies: impl IntoIterator<Item = Currency>) -> Self {
        let partitions = currencies
            .into_iter()
            .map(|currency| (currency, Mutex::new(Partition::default())))
            .collect();
        Self {
            partitions,
            clock: Arc::new(SystemClock),
        }
    }

    /// A book with one partition per configured currency.
    pub fn from_config(config: &PricebookConfig) -> Self {
        Self::new(config.currencies.iter().copied())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn partition(&self, currency: Currency) -> Result<&Mutex<Partition>, PriceError> {
        self.partitions
            .get(&currency)
            .ok_or_else(|| PriceError::InvalidCurrency {
                currency: currency.to_string(),
            })
    }

    /// Insert one sample for `(currency, address)`.
    ///
    /// The latest cache advances only when the new timestamp is strictly
    /// greater than the cached one; a late out-of-order sample merges into
    /// the series without regressing "latest". Returns whether the sample was
    /// newly inserted (`false` for an ignored duplicate timestamp).
    pub async fn append(
        &self,
        currency: Currency,
        address: &Address,
        sample: PriceSample,
    ) -> Result<bool, PriceError> {
        if sample.timestamp < 0 {
            return Err(PriceError::InvalidInput(
                "sample timestamp must be >= 0".to_string(),
            ));
        }

        let mut partition = self.partition(currency)?.lock().await;
        let inserted = partition
            .history
            .entry(address.clone())
            .or_default()
            .append(sample);

        if inserted {
            let slot = partition.latest.entry(address.clone()).or_insert(sample);
            if sample.timestamp > slot.timestamp {
                *slot = sample;
            }
        } else {
            debug!(
                currency = %currency,
                address = %address,
                timestamp = sample.timestamp,
                "skipping append: timestamp already present"
            );
        }

        Ok(inserted)
    }

    /// All samples with `start <= timestamp <= end`, in increasing order.
    /// `end = None` means "now".
    pub async fn range_by_timestamp(
        &self,
        currency: Currency,
        address: &Address,
        start: i64,
        end: Option<i64>,
    ) -> Result<Vec<PriceSample>, PriceError> {
        if start < 0 {
            return Err(PriceError::InvalidInput(
                "requires a start value >= 0".to_string(),
            ));
        }
        let end = end.unwrap_or_else(|| self.clock.now_millis());

        let partition = self.partition(currency)?.lock().await;
        let series = partition
            .history
            .get(address)
            .ok_or_else(|| PriceError::NoSeries {
                address: address.clone(),
            })?;
        Ok(series.range_by_timestamp(start, end).to_vec())
    }

    /// Up to `length` samples beginning at the first sample with
    /// `timestamp >= start`.
    pub async fn window_by_timestamp(
        &self,
        currency: Currency,
        address: &Address,
        start: i64,
        length: usize,
    ) -> Result<Vec<PriceSample>, PriceError> {
        if start < 0 {
            return Err(PriceError::InvalidInput(
                "requires a start value >= 0".to_string(),
            ));
        }

        let partition = self.partition(currency)?.lock().await;
        let series = partition
            .history
            .get(address)
            .ok_or_else(|| PriceError::NoSeries {
                address: address.clone(),
            })?;
        Ok(series.window_by_timestamp(start, length).to_vec())
    }

    /// The most recent sample observed for `(currency, address)`.
    pub async fn latest(
        &self,
        currency: Currency,
        address: &Address,
    ) -> Result<PriceSample, PriceError> {
        let partition = self.partition(currency)?.lock().await;
        partition
            .latest
            .get(address)
            .copied()
            .ok_or_else(|| PriceError::NoPrice {
                address: address.clone(),
            })
    }

    /// Addresses with at least one observed sample in the partition.
    pub async fn observed_addresses(
        &self,
        currency: Currency,
    ) -> Result<Vec<Address>, PriceError> {
        let partition = self.partition(currency)?.lock().await;
        Ok(partition.history.keys().cloned().collect())
    }

    /// Write a batch of fetched observations through the append path.
    /// Returns the number of newly inserted samples.
    pub async fn ingest(
        &self,
        currency: Currency,
        prices: &[FetchedPrice],
    ) -> Result<usize, PriceError> {
        let mut inserted = 0usize;
        for price in prices {
            let address = Address::new(&price.address);
            if self
                .append(currency, &address, PriceSample::new(price.timestamp, price.price))
                .await?
            {
                inserted += 1;
            }
        }
        debug!(
            currency = %currency,
            batch = prices.len(),
            inserted,
            "ingested price batch"
        );
        Ok(inserted)
    }
}

use crate::models::PriceSample;

/// Chronological price series for one (currency, address) pair.
///
/// Samples are unique by timestamp and kept in strictly increasing timestamp
/// order. An out-of-order append merges into sorted position; an append whose
/// timestamp is already present is ignored (first write wins), mirroring the
/// idempotent-store convention used elsewhere in the crate.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    samples: Vec<PriceSample>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Insert a sample, keeping the series strictly ordered by timestamp.
    ///
    /// Returns `false` when a sample with the same timestamp already exists.
    pub fn append(&mut self, sample: PriceSample) -> bool {
        match self
            .samples
            .binary_search_by_key(&sample.timestamp, |s| s.timestamp)
        {
            Ok(_) => false,
            Err(index) => {
                self.samples.insert(index, sample);
                true
            }
        }
    }

    /// All samples with `start <= timestamp <= end`, in increasing order.
    ///
    /// Both bounds are inclusive. Locates the start boundary by binary search
    /// then slices forward, so a query costs O(log n + k).
    pub fn range_by_timestamp(&self, start: i64, end: i64) -> &[PriceSample] {
        let lo = self.samples.partition_point(|s| s.timestamp < start);
        let hi = self.samples.partition_point(|s| s.timestamp <= end);
        &self.samples[lo..hi.max(lo)]
    }

    /// Up to `length` consecutive samples beginning at the first sample with
    /// `timestamp >= start`. A zero length yields an empty slice.
    pub fn window_by_timestamp(&self, start: i64, length: usize) -> &[PriceSample] {
        let lo = self.samples.partition_point(|s| s.timestamp < start);
        let hi = lo.saturating_add(length).min(self.samples.len());
        &self.samples[lo..hi]
    }

    /// The most recent sample by timestamp.
    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.last()
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }
}

use crate::models::Address;

/// Typed failures for the query surface.
///
/// Single-item queries surface these to the caller verbatim. Batch and
/// aggregate operations never propagate per-item faults; they swallow them
/// into documented fallbacks instead (zero for missing stats, unenriched
/// passthrough for failed joins).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PriceError {
    /// The currency symbol has no configured partition. Always fatal to the
    /// call: this is a contract violation, not a "no data" result.
    #[error("invalid currency: {currency}")]
    InvalidCurrency { currency: String },

    /// No price series exists yet for this address.
    #[error("no price series for address {address}")]
    NoSeries { address: Address },

    /// The (currency, address) pair has never been observed.
    #[error("no price for address {address}")]
    NoPrice { address: Address },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Failure from an external collaborator, with a human-readable cause.
    #[error("upstream fault: {0}")]
    Upstream(String),
}

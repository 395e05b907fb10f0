use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::Currency;
use crate::prices::DEFAULT_API_BASE;

/// Library configuration, typically loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricebookConfig {
    /// Currency partitions to create at startup.
    pub currencies: Vec<Currency>,
    /// Bounded parallelism for per-address stats fetches.
    pub stats_concurrency: usize,
    /// Bounded parallelism for enrichment joins.
    pub enrich_concurrency: usize,
    /// Base URL for the upstream price API.
    pub price_api_base: String,
}

impl Default for PricebookConfig {
    fn default() -> Self {
        Self {
            currencies: vec![Currency::Usd],
            stats_concurrency: 10,
            enrich_concurrency: 4,
            price_api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl PricebookConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse pricebook config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_a_usd_partition() {
        let config = PricebookConfig::default();
        assert_eq!(config.currencies, vec![Currency::Usd]);
        assert!(config.stats_concurrency > 0);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config = PricebookConfig::from_toml(
            r#"
            currencies = ["usd", "eur"]
            stats_concurrency = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.currencies, vec![Currency::Usd, Currency::Eur]);
        assert_eq!(config.stats_concurrency, 2);
        assert_eq!(config.enrich_concurrency, 4);
        assert_eq!(config.price_api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn rejects_unknown_currency_symbols() {
        assert!(PricebookConfig::from_toml(r#"currencies = ["zzz"]"#).is_err());
    }
}

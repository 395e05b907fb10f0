//! Upstream REST price fetcher.
//!
//! Thin client over a CoinGecko-style token price API. Contract addresses are
//! case-insensitive: requests go out lowercased (the API returns lowercase
//! keys) and results are mapped back to the caller's original casing. Any
//! transport or HTTP fault is translated into a single descriptive
//! [`PriceError::Upstream`].

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::PricebookConfig;
use crate::error::PriceError;
use crate::models::Currency;

pub const DEFAULT_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Asset platform the contract addresses live on.
const PLATFORM: &str = "ethereum";

/// One raw observation returned by the upstream fetcher, ready for
/// [`PriceBook::ingest`](super::PriceBook::ingest).
///
/// `address` carries the caller's original casing; `timestamp` is epoch
/// millis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPrice {
    pub address: String,
    pub timestamp: i64,
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
struct SpotPriceEntry {
    #[serde(default)]
    last_updated_at: Option<i64>,
    #[serde(flatten)]
    prices: HashMap<String, Decimal>,
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(i64, Decimal)>,
}

pub struct PriceFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl PriceFetcher {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }

    /// A fetcher pointed at the configured API base.
    pub fn from_config(config: &PricebookConfig) -> Self {
        Self::new().with_base_url(config.price_api_base.as_str())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Spot prices for a set of contract addresses in one call.
    ///
    /// Addresses are deduplicated by lowercase form before the request; each
    /// result carries the first-seen original casing for its address.
    /// Requires at least one non-empty address. Addresses the API has no
    /// price for are simply absent from the result.
    pub async fn contract_prices(
        &self,
        addresses: &[String],
        currency: Currency,
    ) -> Result<Vec<FetchedPrice>, PriceError> {
        let mut lookup: HashMap<String, &str> = HashMap::new();
        for raw in addresses {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            lookup.entry(trimmed.to_lowercase()).or_insert(trimmed);
        }
        if lookup.is_empty() {
            return Err(PriceError::InvalidInput(
                "must supply at least 1 contract address".to_string(),
            ));
        }

        let mut keys: Vec<&str> = lookup.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let url = format!(
            "{}/simple/token_price/{}?contract_addresses={}&vs_currencies={}&include_last_updated_at=true",
            self.base_url,
            PLATFORM,
            keys.join(","),
            currency
        );

        let body: HashMap<String, SpotPriceEntry> = self.call(&url).await?;
        debug!(requested = keys.len(), returned = body.len(), "fetched spot prices");

        let mut results = Vec::with_capacity(body.len());
        for (key, entry) in body {
            let Some(original) = lookup.get(key.as_str()) else {
                continue;
            };
            let Some(price) = entry.prices.get(currency.as_str()).copied() else {
                continue;
            };
            // The API reports last update in unix seconds.
            let timestamp = entry.last_updated_at.unwrap_or(0).saturating_mul(1000);
            results.push(FetchedPrice {
                address: (*original).to_string(),
                timestamp,
                price,
            });
        }
        Ok(results)
    }

    /// Historic prices for one contract between `from` and `to`, both epoch
    /// millis. Bounds are floored to unix seconds for the API; returned
    /// timestamps are epoch millis.
    pub async fn historic_contract_prices(
        &self,
        contract: &str,
        from: i64,
        to: i64,
        currency: Currency,
    ) -> Result<Vec<FetchedPrice>, PriceError> {
        let contract = contract.trim();
        if contract.is_empty() {
            return Err(PriceError::InvalidInput(
                "requires a contract address".to_string(),
            ));
        }
        if from < 0 || to < from {
            return Err(PriceError::InvalidInput(
                "requires 0 <= from <= to".to_string(),
            ));
        }

        let url = format!(
            "{}/coins/{}/contract/{}/market_chart/range?vs_currency={}&from={}&to={}",
            self.base_url,
            PLATFORM,
            contract.to_lowercase(),
            currency,
            from / 1000,
            to / 1000
        );

        let body: MarketChartResponse = self.call(&url).await?;
        Ok(body
            .prices
            .into_iter()
            .map(|(timestamp, price)| FetchedPrice {
                address: contract.to_string(),
                timestamp,
                price,
            })
            .collect())
    }

    async fn call<T: DeserializeOwned>(&self, url: &str) -> Result<T, PriceError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|err| PriceError::Upstream(format!("price api request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PriceError::Upstream(format!(
                "price api error: {status} - {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|err| PriceError::Upstream(format!("malformed price api response: {err}")))
    }
}

impl Default for PriceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

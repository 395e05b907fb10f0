use anyhow::Result;
use pricebook::error::PriceError;
use pricebook::models::{Address, Currency};
use pricebook::prices::{PriceBook, PriceFetcher};
use rust_decimal_macros::dec;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SPOT_BODY: &str = r#"{
    "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa": {
        "usd": 400.25,
        "last_updated_at": 1640995200
    },
    "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb": {
        "usd": 9,
        "last_updated_at": 1640995260
    }
}"#;

#[tokio::test]
async fn contract_prices_dedupes_and_preserves_caller_casing() -> Result<()> {
    let server = MockServer::start().await;
    let fetcher = PriceFetcher::new().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/simple/token_price/ethereum"))
        .and(query_param(
            "contract_addresses",
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa,0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        ))
        .and(query_param("vs_currencies", "usd"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SPOT_BODY, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    // Mixed casing plus an outright duplicate; one request goes out.
    let addresses = vec![
        "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string(),
        "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_string(),
        "0xBBbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbBB".to_string(),
    ];
    let mut prices = fetcher.contract_prices(&addresses, Currency::Usd).await?;
    prices.sort_by(|a, b| a.address.cmp(&b.address));

    assert_eq!(prices.len(), 2);
    // First-seen casing survives the round trip.
    assert_eq!(
        prices[0].address,
        "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
    );
    assert_eq!(prices[0].timestamp, 1640995200000);
    assert_eq!(prices[0].price, dec!(400.25));
    assert_eq!(
        prices[1].address,
        "0xBBbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbBB"
    );
    Ok(())
}

#[tokio::test]
async fn http_failures_become_a_single_upstream_fault() -> Result<()> {
    let server = MockServer::start().await;
    let fetcher = PriceFetcher::new().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/simple/token_price/ethereum"))
        .respond_with(
            ResponseTemplate::new(429).set_body_string("{\"error\":\"rate limited\"}"),
        )
        .mount(&server)
        .await;

    let err = fetcher
        .contract_prices(&["0xaa".to_string()], Currency::Usd)
        .await
        .unwrap_err();
    match err {
        PriceError::Upstream(message) => {
            assert!(message.contains("429"));
            assert!(message.contains("rate limited"));
        }
        other => panic!("expected upstream fault, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn empty_address_list_fails_without_http() -> Result<()> {
    let server = MockServer::start().await;
    let fetcher = PriceFetcher::new().with_base_url(server.uri());

    let err = fetcher
        .contract_prices(&[], Currency::Usd)
        .await
        .unwrap_err();
    assert!(matches!(err, PriceError::InvalidInput(_)));

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "expected no HTTP requests");
    Ok(())
}

#[tokio::test]
async fn historic_prices_convert_millis_bounds_to_seconds() -> Result<()> {
    let server = MockServer::start().await;
    let fetcher = PriceFetcher::new().with_base_url(server.uri());

    let body = r#"{"prices": [[1640995200000, 400.25], [1640998800000, 401.5]]}"#;
    Mock::given(method("GET"))
        .and(path(
            "/coins/ethereum/contract/0xaaaa/market_chart/range",
        ))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("from", "1640995200"))
        .and(query_param("to", "1640998800"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let prices = fetcher
        .historic_contract_prices("0xAAAA", 1640995200000, 1640998800999, Currency::Usd)
        .await?;

    assert_eq!(prices.len(), 2);
    assert_eq!(prices[0].timestamp, 1640995200000);
    assert_eq!(prices[0].price, dec!(400.25));
    assert_eq!(prices[0].address, "0xAAAA");
    Ok(())
}

#[tokio::test]
async fn fetched_batch_flows_into_the_price_book() -> Result<()> {
    let server = MockServer::start().await;
    let fetcher = PriceFetcher::new().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/simple/token_price/ethereum"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SPOT_BODY, "application/json"))
        .mount(&server)
        .await;

    let addresses = vec![
        "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string(),
        "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB".to_string(),
    ];
    let fetched = fetcher.contract_prices(&addresses, Currency::Usd).await?;

    let book = PriceBook::new([Currency::Usd]);
    let inserted = book.ingest(Currency::Usd, &fetched).await?;
    assert_eq!(inserted, 2);

    let latest = book
        .latest(
            Currency::Usd,
            &Address::new("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
        )
        .await?;
    assert_eq!(latest.timestamp, 1640995200000);
    assert_eq!(latest.price, dec!(400.25));

    // Re-ingesting the same batch is a no-op.
    assert_eq!(book.ingest(Currency::Usd, &fetched).await?, 0);
    Ok(())
}

use candle_history::{
    models::{request_params::BarsRequestParams, timeframe::TimeFrame},
    providers::{
        DataProvider,
        alpaca_rest::{AlpacaProvider, AlpacaSettings, Feed},
    },
};
use chrono::{Duration, Utc};
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore]
async fn test_alpaca_provider_fetch_bars() {
    // This test requires APCA_API_KEY_ID and APCA_API_SECRET_KEY to be set in the environment.
    if std::env::var("APCA_API_KEY_ID").is_err() || std::env::var("APCA_API_SECRET_KEY").is_err() {
        println!("Skipping test_alpaca_provider_fetch_bars: API keys not set.");
        return;
    }

    let settings = AlpacaSettings {
        feed: Some(Feed::Iex),
        ..AlpacaSettings::default()
    };
    let provider = AlpacaProvider::new(settings).expect("Failed to create AlpacaProvider");

    let params = BarsRequestParams {
        symbol: "AAPL".to_string(),
        timeframe: TimeFrame::day(),
        start: Utc::now() - Duration::days(10),
        end: Utc::now() - Duration::days(1),
    };

    let result = provider.fetch_bars(params.clone()).await;
    assert!(result.is_ok(), "fetch_bars returned an error: {:?}", result.err());

    let candles = result.unwrap();
    assert!(!candles.is_empty(), "Expected to fetch at least one bar for AAPL");
    assert!(candles.len() <= 10, "Expected at most one daily bar per day");

    // Requested ascending.
    for pair in candles.windows(2) {
        assert!(pair[0].timestamp < pair[1].timestamp);
    }
    for candle in &candles {
        assert!(candle.timestamp >= params.start && candle.timestamp <= params.end);
        assert!(candle.low <= candle.high);
    }
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_alpaca_provider_paginates_intraday() {
    if std::env::var("APCA_API_KEY_ID").is_err() || std::env::var("APCA_API_SECRET_KEY").is_err() {
        println!("Skipping test_alpaca_provider_paginates_intraday: API keys not set.");
        return;
    }

    let settings = AlpacaSettings {
        feed: Some(Feed::Iex),
        ..AlpacaSettings::default()
    };
    let provider = AlpacaProvider::new(settings).expect("Failed to create AlpacaProvider");

    // Two months of minute bars span more than one page.
    let end = Utc::now() - Duration::days(1);
    let params = BarsRequestParams {
        symbol: "SPY".to_string(),
        timeframe: TimeFrame::minutes(1).unwrap(),
        start: end - Duration::days(60),
        end,
    };

    let candles = provider.fetch_bars(params).await.expect("fetch_bars failed");
    assert!(candles.len() > 10_000, "expected pagination, got {} bars", candles.len());
}

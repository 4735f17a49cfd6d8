//! 시장 데이터 로더 통합 테스트.
//!
//! 원격 API는 mockito 서버로, 정적 데이터와 파일 캐시는 임시 디렉토리로 대체합니다.

use mockito::{Matcher, Server};
use screener_core::{Instrument, Market, ScreenerConfig};
use screener_data::{
    CacheEntry, CacheStorage, DataError, DataOrigin, FileStorage, ManualClock, MarketCache,
    MarketDataLoader, MarketSources, MemoryStorage,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const NOW: i64 = 1_705_300_000_000;

fn config(data_dir: &Path, api_url: &str) -> ScreenerConfig {
    let mut config = ScreenerConfig::default();
    config.sources.data_dir = data_dir.to_path_buf();
    config.sources.stock_api.base_url = format!("{}/query", api_url);
    config.sources.stock_api.symbols = vec!["AAPL".to_string(), "MSFT".to_string()];
    config.sources.crypto_api.base_url = format!("{}/api/v3", api_url);
    config.sources.crypto_api.coin_ids = vec!["bitcoin".to_string(), "ethereum".to_string()];
    config.retry.base_delay_ms = 10;
    config
}

fn loader_with(
    config: &ScreenerConfig,
    storage: Arc<dyn CacheStorage>,
) -> (MarketDataLoader, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(NOW));
    let cache = MarketCache::new(storage, clock.clone(), config.cache.ttl());
    let sources = MarketSources::from_config(config).unwrap();
    (MarketDataLoader::new(cache, sources, clock.clone()), clock)
}

fn write(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}

fn workspace_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

#[tokio::test]
async fn test_korean_static_record_is_normalized_and_cached() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "korean-stocks.json",
        r#"{"stocks":[{"id":"005930","price":70000,"change":-1.2}]}"#,
    );
    let config = config(dir.path(), "http://127.0.0.1:9");
    let (loader, _) = loader_with(&config, Arc::new(MemoryStorage::new()));

    let records = loader.load("korean").await.unwrap();
    assert_eq!(
        records,
        vec![Instrument {
            id: "005930".to_string(),
            name: String::new(),
            symbol: String::new(),
            price: 70000.0,
            change: -1.2,
            volume: 0.0,
            market_cap: 0.0,
            high: None,
            low: None,
        }]
    );

    // 파일을 지워도 캐시에서 반환
    std::fs::remove_file(dir.path().join("korean-stocks.json")).unwrap();
    let snapshot = loader.load_snapshot(Market::Korean).await.unwrap();
    assert_eq!(snapshot.origin, DataOrigin::Cache);
    assert_eq!(snapshot.instruments, records);
}

#[tokio::test]
async fn test_rate_limited_api_falls_back_to_static_and_caches() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/simple/price")
        .match_query(Matcher::Any)
        .with_status(429)
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "crypto-list.json",
        r#"{"cryptos":[
            {"id":"bitcoin","name":"Bitcoin","symbol":"BTC","price":43250.5,"change":2.45,"volume24h":28000000000},
            {"id":"ethereum","name":"Ethereum","symbol":"ETH","price":2280.1,"change":-0.3,"volume24h":12000000000}
        ]}"#,
    );
    let config = config(dir.path(), &server.url());
    let (loader, clock) = loader_with(&config, Arc::new(MemoryStorage::new()));

    let snapshot = loader.load_snapshot(Market::Crypto).await.unwrap();
    assert_eq!(snapshot.origin, DataOrigin::StaticFile);
    assert_eq!(snapshot.instruments.len(), 2);
    assert_eq!(snapshot.instruments[0].volume, 28_000_000_000.0);

    clock.advance(60_000);
    let cached = loader.load_snapshot(Market::Crypto).await.unwrap();
    assert_eq!(cached.origin, DataOrigin::Cache);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_stale_file_cache_entry_triggers_fresh_fetch() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/simple/price")
        .match_query(Matcher::UrlEncoded(
            "ids".into(),
            "bitcoin,ethereum".into(),
        ))
        .with_status(200)
        .with_body(
            r#"{"bitcoin":{"usd":43250.5,"usd_24h_change":1.1,"usd_24h_vol":2.8e10,"usd_market_cap":8.4e11},
                "ethereum":{"usd":2280.1,"usd_24h_change":-0.4,"usd_24h_vol":1.2e10,"usd_market_cap":2.7e11}}"#,
        )
        .create_async()
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let cache_dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(cache_dir.path()));
    let stale = CacheEntry {
        timestamp: NOW - 400_000,
        content: vec![],
    };
    storage
        .set(
            &Market::Crypto.cache_key(),
            serde_json::to_string(&stale).unwrap(),
        )
        .await
        .unwrap();

    let config = config(data_dir.path(), &server.url());
    let (loader, _) = loader_with(&config, storage.clone());

    let snapshot = loader.load_snapshot(Market::Crypto).await.unwrap();
    assert_eq!(snapshot.origin, DataOrigin::Remote("coingecko".to_string()));
    let symbols: Vec<&str> = snapshot
        .instruments
        .iter()
        .map(|i| i.symbol.as_str())
        .collect();
    assert_eq!(symbols, vec!["BTC", "ETH"]);
    assert_eq!(snapshot.instruments[1].volume, 1.2e10);

    let entry = loader.cache().entry(Market::Crypto).await.unwrap().unwrap();
    assert_eq!(entry.timestamp, NOW);
    assert_eq!(entry.content.len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_partial_batch_failure_keeps_other_symbols() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/query")
        .match_query(Matcher::UrlEncoded("symbol".into(), "AAPL".into()))
        .with_status(200)
        .with_body(
            r#"{"Global Quote":{"01. symbol":"AAPL","05. price":"189.84","06. volume":"52345678","09. change percent":"1.2500%"}}"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/query")
        .match_query(Matcher::UrlEncoded("symbol".into(), "MSFT".into()))
        .with_status(200)
        .with_body(r#"{"Information":"rate limit"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), &server.url());
    let (loader, _) = loader_with(&config, Arc::new(MemoryStorage::new()));

    let snapshot = loader.load_snapshot(Market::Us).await.unwrap();
    assert_eq!(
        snapshot.origin,
        DataOrigin::Remote("alpha_vantage".to_string())
    );
    assert_eq!(snapshot.instruments.len(), 1);
    assert_eq!(snapshot.instruments[0].change, 1.25);
    assert_eq!(snapshot.instruments[0].market_cap, 0.0);
}

#[tokio::test]
async fn test_total_failure_is_unavailable_naming_market() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/query")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), &server.url());
    let (loader, _) = loader_with(&config, Arc::new(MemoryStorage::new()));

    let err = loader.load("us").await.unwrap_err();
    assert!(matches!(
        &err,
        DataError::Unavailable { market: Market::Us, reason } if reason.contains("us-stocks.json")
    ));
    assert!(err.to_string().contains("us"));
}

#[tokio::test]
async fn test_unknown_market_touches_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), &server.url());
    let storage = Arc::new(MemoryStorage::new());
    let (loader, _) = loader_with(&config, storage.clone());

    let err = loader.load("forex").await.unwrap_err();
    assert!(matches!(err, DataError::UnknownMarket(ref id) if id == "forex"));
    assert!(storage.is_empty().await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_bundled_datasets_load_without_network() {
    let mut config = ScreenerConfig::default();
    config.sources.data_dir = workspace_data_dir();
    config.sources.stock_api.enabled = false;
    config.sources.crypto_api.enabled = false;
    let (loader, _) = loader_with(&config, Arc::new(MemoryStorage::new()));

    let korean = loader.load_market_data(Market::Korean).await.unwrap();
    assert!(korean.iter().any(|i| i.name == "삼성전자"));

    let us = loader.load_market_data(Market::Us).await.unwrap();
    assert_eq!(us.len(), 6);

    let crypto = loader.load_market_data(Market::Crypto).await.unwrap();
    assert!(crypto.iter().all(|i| i.volume > 0.0));
    assert_eq!(loader.invalidate_all_caches().await.unwrap(), 3);
}

#[tokio::test]
async fn test_from_config_uses_file_cache_dir() {
    let cache_dir = tempfile::tempdir().unwrap();
    let mut config = ScreenerConfig::default();
    config.sources.data_dir = workspace_data_dir();
    config.cache.dir = Some(cache_dir.path().to_path_buf());

    let loader = MarketDataLoader::from_config(&config).unwrap();
    let records = loader.load("KOREAN").await.unwrap();
    assert!(!records.is_empty());
    assert!(cache_dir.path().join("stocks_korean_cache.json").exists());

    assert!(loader.invalidate_cache(Market::Korean).await.unwrap());
    assert!(!cache_dir.path().join("stocks_korean_cache.json").exists());
}

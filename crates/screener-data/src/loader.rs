//! 시장 데이터 로더.
//!
//! 조회 순서:
//! 1. 시장 캐시 (TTL 내 항목이면 그대로 반환, 네트워크 없음)
//! 2. 원격 API (us/crypto, 재시도 및 동시 요청 제한 적용)
//! 3. 번들 정적 파일
//!
//! 원격 API가 빈 결과를 주면 오류와 동일하게 정적 파일로 넘어갑니다.
//! 비어 있지 않은 결과만 캐시에 저장하며, 캐시 쓰기 실패는 로드를 실패시키지 않습니다.

use chrono::{DateTime, Utc};
use screener_core::{Instrument, Market, ScreenerConfig};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::cache::{CacheStorage, FileStorage, MarketCache, MemoryStorage};
use crate::clock::{Clock, SystemClock};
use crate::error::{DataError, Result};
use crate::normalize::normalize;
use crate::source::{MarketSource, MarketSources};

/// 데이터 출처.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    /// 유효한 캐시 항목
    Cache,
    /// 원격 API (제공자 이름)
    Remote(String),
    /// 번들 정적 파일
    StaticFile,
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataOrigin::Cache => f.write_str("cache"),
            DataOrigin::Remote(provider) => write!(f, "remote:{}", provider),
            DataOrigin::StaticFile => f.write_str("static_file"),
        }
    }
}

/// 로드 결과와 출처.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub market: Market,
    pub instruments: Vec<Instrument>,
    pub origin: DataOrigin,
    pub loaded_at: DateTime<Utc>,
}

/// 시장 데이터 로더.
#[derive(Clone)]
pub struct MarketDataLoader {
    cache: MarketCache,
    sources: Arc<MarketSources>,
    clock: Arc<dyn Clock>,
}

impl MarketDataLoader {
    pub fn new(cache: MarketCache, sources: MarketSources, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            sources: Arc::new(sources),
            clock,
        }
    }

    /// 설정으로부터 로더를 구성합니다.
    ///
    /// `cache.dir`이 지정되면 파일 캐시, 아니면 메모리 캐시를 사용합니다.
    pub fn from_config(config: &ScreenerConfig) -> Result<Self> {
        let storage: Arc<dyn CacheStorage> = match &config.cache.dir {
            Some(dir) => Arc::new(FileStorage::new(dir)),
            None => Arc::new(MemoryStorage::new()),
        };
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = MarketCache::new(storage, clock.clone(), config.cache.ttl());
        let sources = MarketSources::from_config(config)?;

        info!(
            ttl_ms = config.cache.ttl_ms,
            persistent = config.cache.dir.is_some(),
            "시장 데이터 로더 초기화"
        );
        Ok(Self::new(cache, sources, clock))
    }

    pub fn cache(&self) -> &MarketCache {
        &self.cache
    }

    /// 시장 식별자 문자열로 로드합니다.
    ///
    /// 알 수 없는 식별자는 I/O 없이 즉시 `UnknownMarket`을 반환합니다.
    pub async fn load(&self, market_id: &str) -> Result<Vec<Instrument>> {
        let market: Market = market_id.parse()?;
        self.load_market_data(market).await
    }

    /// 시장의 정규화된 종목 목록을 로드합니다.
    pub async fn load_market_data(&self, market: Market) -> Result<Vec<Instrument>> {
        Ok(self.load_snapshot(market).await?.instruments)
    }

    /// 종목 목록과 함께 데이터 출처를 반환합니다.
    #[instrument(skip(self), fields(market = %market))]
    pub async fn load_snapshot(&self, market: Market) -> Result<MarketSnapshot> {
        if let Some(instruments) = self.cache.get(market).await {
            return Ok(self.snapshot(market, instruments, DataOrigin::Cache));
        }

        let route = self.sources.route(market)?;
        let mut failures: Vec<String> = Vec::new();

        if let Some(remote) = &route.remote {
            match self.fetch_remote(market, remote.as_ref()).await {
                Ok(instruments) => {
                    self.store(market, &instruments).await;
                    let origin = DataOrigin::Remote(remote.name().to_string());
                    return Ok(self.snapshot(market, instruments, origin));
                }
                Err(e) => {
                    if e.is_recoverable() {
                        warn!(provider = remote.name(), error = %e, "원격 API 실패, 정적 데이터로 폴백");
                    } else {
                        error!(provider = remote.name(), error = %e, "원격 API 오류, 정적 데이터로 폴백");
                    }
                    failures.push(format!("{}: {}", remote.name(), e));
                }
            }
        }

        match route.fallback.fetch().await {
            Ok(raw) => {
                let instruments = normalize(market, raw);
                if instruments.is_empty() {
                    warn!(path = %route.fallback.path().display(), "정적 데이터가 비어 있음");
                } else {
                    self.store(market, &instruments).await;
                }
                Ok(self.snapshot(market, instruments, DataOrigin::StaticFile))
            }
            Err(e) => {
                failures.push(format!("{}: {}", route.fallback.name(), e));
                let reason = failures.join("; ");
                error!(reason = %reason, "모든 데이터 소스 실패");
                Err(DataError::Unavailable { market, reason })
            }
        }
    }

    /// 시장 캐시를 무효화합니다. 항목이 있었으면 `true`.
    pub async fn invalidate_cache(&self, market: Market) -> Result<bool> {
        let removed = self.cache.invalidate(market).await?;
        info!(market = %market, removed = removed, "캐시 무효화");
        Ok(removed)
    }

    /// 모든 시장 캐시를 무효화합니다.
    pub async fn invalidate_all_caches(&self) -> Result<usize> {
        let removed = self.cache.invalidate_all().await?;
        info!(removed = removed, "전체 캐시 무효화");
        Ok(removed)
    }

    /// 캐시를 비우고 다시 로드합니다.
    pub async fn refresh(&self, market: Market) -> Result<MarketSnapshot> {
        self.invalidate_cache(market).await?;
        self.load_snapshot(market).await
    }

    /// 원격 결과를 정규화합니다. 빈 결과는 오류로 취급합니다.
    async fn fetch_remote(
        &self,
        market: Market,
        remote: &dyn MarketSource,
    ) -> Result<Vec<Instrument>> {
        let raw = remote.fetch().await?;
        let instruments = normalize(market, raw);
        if instruments.is_empty() {
            return Err(DataError::MalformedData(format!(
                "{}: 사용 가능한 레코드 없음",
                remote.name()
            )));
        }
        Ok(instruments)
    }

    async fn store(&self, market: Market, instruments: &[Instrument]) {
        if let Err(e) = self.cache.put(market, instruments).await {
            warn!(market = %market, error = %e, "캐시 저장 실패");
        }
    }

    fn snapshot(
        &self,
        market: Market,
        instruments: Vec<Instrument>,
        origin: DataOrigin,
    ) -> MarketSnapshot {
        let loaded_at = DateTime::<Utc>::from_timestamp_millis(self.clock.now_millis())
            .unwrap_or_else(Utc::now);
        info!(
            market = %market,
            origin = %origin,
            count = instruments.len(),
            "시장 데이터 로드 완료"
        );
        MarketSnapshot {
            market,
            instruments,
            origin,
            loaded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::source::{MarketRoute, StaticFileSource};
    use async_trait::async_trait;
    use screener_core::RawInstrument;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeSource {
        records: Option<Vec<RawInstrument>>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn returning(ids: &[&str]) -> Arc<Self> {
            let records = ids
                .iter()
                .map(|id| RawInstrument {
                    id: Some(id.to_string()),
                    price: Some(10.0),
                    ..Default::default()
                })
                .collect();
            Arc::new(Self {
                records: Some(records),
                calls: AtomicUsize::new(0),
            })
        }

        fn rate_limited() -> Arc<Self> {
            Arc::new(Self {
                records: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch(&self) -> Result<Vec<RawInstrument>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.records.clone().ok_or_else(|| DataError::RateLimited {
                provider: "fake".to_string(),
                message: "limit".to_string(),
            })
        }
    }

    fn write_static(dir: &Path, name: &str, body: &str) -> StaticFileSource {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        StaticFileSource::new(Market::Us, path)
    }

    fn loader(route: MarketRoute) -> (MarketDataLoader, Arc<ManualClock>, Arc<MemoryStorage>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let storage = Arc::new(MemoryStorage::new());
        let cache = MarketCache::new(storage.clone(), clock.clone(), Duration::from_millis(300_000));
        let sources = MarketSources::new().with_route(Market::Us, route);
        (MarketDataLoader::new(cache, sources, clock.clone()), clock, storage)
    }

    #[tokio::test]
    async fn test_remote_result_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let remote = FakeSource::returning(&["AAPL", "MSFT"]);
        let fallback = write_static(dir.path(), "us.json", r#"{"stocks":[]}"#);
        let (loader, clock, _) = loader(MarketRoute::with_remote(remote.clone(), fallback));

        let first = loader.load_snapshot(Market::Us).await.unwrap();
        assert_eq!(first.origin, DataOrigin::Remote("fake".to_string()));
        assert_eq!(first.origin.to_string(), "remote:fake");
        assert_eq!(first.instruments.len(), 2);

        clock.advance(299_999);
        let second = loader.load_snapshot(Market::Us).await.unwrap();
        assert_eq!(second.origin, DataOrigin::Cache);
        assert_eq!(second.instruments, first.instruments);
        assert_eq!(remote.calls(), 1);

        clock.advance(1);
        loader.load_market_data(Market::Us).await.unwrap();
        assert_eq!(remote.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_remote_result_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let remote = FakeSource::returning(&[]);
        let fallback = write_static(
            dir.path(),
            "us.json",
            r#"{"stocks":[{"id":"AAPL","price":189.84}]}"#,
        );
        let (loader, _, _) = loader(MarketRoute::with_remote(remote.clone(), fallback));

        let snapshot = loader.load_snapshot(Market::Us).await.unwrap();
        assert_eq!(snapshot.origin, DataOrigin::StaticFile);
        assert_eq!(snapshot.instruments[0].id, "AAPL");
        assert_eq!(remote.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_static_result_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = write_static(dir.path(), "us.json", r#"{"stocks":[]}"#);
        let (loader, _, storage) = loader(MarketRoute::static_only(fallback));

        assert!(loader.load_market_data(Market::Us).await.unwrap().is_empty());
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_total_failure_names_market() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = StaticFileSource::new(Market::Us, dir.path().join("missing.json"));
        let (loader, _, _) = loader(MarketRoute::with_remote(FakeSource::rate_limited(), fallback));

        let err = loader.load_market_data(Market::Us).await.unwrap_err();
        match &err {
            DataError::Unavailable { market, reason } => {
                assert_eq!(*market, Market::Us);
                assert!(reason.contains("fake"));
                assert!(reason.contains("static_file"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("us "));
    }

    #[tokio::test]
    async fn test_unknown_market_and_missing_route() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = write_static(dir.path(), "us.json", r#"{"stocks":[]}"#);
        let (loader, _, _) = loader(MarketRoute::static_only(fallback));

        assert!(matches!(
            loader.load("nasdaq").await,
            Err(DataError::UnknownMarket(id)) if id == "nasdaq"
        ));
        assert!(matches!(
            loader.load("crypto").await,
            Err(DataError::UnknownMarket(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let remote = FakeSource::returning(&["AAPL"]);
        let fallback = write_static(dir.path(), "us.json", r#"{"stocks":[]}"#);
        let (loader, _, _) = loader(MarketRoute::with_remote(remote.clone(), fallback));

        loader.load("US").await.unwrap();
        let snapshot = loader.refresh(Market::Us).await.unwrap();

        assert_eq!(snapshot.origin, DataOrigin::Remote("fake".to_string()));
        assert_eq!(remote.calls(), 2);
        assert_eq!(loader.invalidate_all_caches().await.unwrap(), 1);
        assert!(!loader.invalidate_cache(Market::Us).await.unwrap());
    }
}

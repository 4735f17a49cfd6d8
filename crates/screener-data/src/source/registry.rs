//! 시장 → 데이터 소스 라우팅.
//!
//! 라우팅 테이블은 생성 후 바뀌지 않습니다.
//! 한국 시장은 원격 API 없이 정적 파일만 사용합니다.

use screener_core::{market_span, Market, ScreenerConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::{CryptoPriceApi, MarketSource, StaticFileSource, StockQuoteApi};
use crate::error::{DataError, Result};
use crate::http::HttpClient;
use crate::pool::BoundedPool;
use crate::retry::RetryPolicy;

/// 한 시장의 소스 구성.
#[derive(Clone)]
pub struct MarketRoute {
    /// 원격 API (없으면 정적 파일만 사용)
    pub remote: Option<Arc<dyn MarketSource>>,
    /// 최종 폴백
    pub fallback: StaticFileSource,
}

impl MarketRoute {
    pub fn static_only(fallback: StaticFileSource) -> Self {
        Self {
            remote: None,
            fallback,
        }
    }

    pub fn with_remote(remote: Arc<dyn MarketSource>, fallback: StaticFileSource) -> Self {
        Self {
            remote: Some(remote),
            fallback,
        }
    }
}

/// 시장별 소스 라우팅 테이블.
#[derive(Clone, Default)]
pub struct MarketSources {
    routes: HashMap<Market, MarketRoute>,
}

impl MarketSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정으로부터 기본 라우팅을 구성합니다.
    ///
    /// - korean: 정적 파일
    /// - us: 주식 시세 API (활성화 시) → 정적 파일
    /// - crypto: 코인 가격 API (활성화 시) → 정적 파일
    pub fn from_config(config: &ScreenerConfig) -> Result<Self> {
        let http = HttpClient::new(&config.http)?;
        let retry = RetryPolicy::from(&config.retry);
        let sources = &config.sources;

        let mut registry = Self::new();
        for market in Market::ALL {
            let _span = market_span!("register_route", market).entered();
            let fallback = StaticFileSource::new(market, sources.static_path(market));
            let remote: Option<Arc<dyn MarketSource>> = match market {
                _ if !market.has_remote_source() => None,
                Market::Us if sources.stock_api.enabled => Some(Arc::new(StockQuoteApi::new(
                    http.clone(),
                    &sources.stock_api,
                    retry.clone(),
                    BoundedPool::new(config.pool.max_concurrent),
                ))),
                Market::Crypto if sources.crypto_api.enabled => Some(Arc::new(
                    CryptoPriceApi::new(http.clone(), &sources.crypto_api, retry.clone()),
                )),
                _ => None,
            };

            info!(
                market = %market,
                remote = remote.as_ref().map(|r| r.name()).unwrap_or("-"),
                fallback = %fallback.path().display(),
                "데이터 소스 등록"
            );
            registry.insert(
                market,
                MarketRoute {
                    remote,
                    fallback,
                },
            );
        }

        Ok(registry)
    }

    /// 라우트를 추가한 새 테이블을 반환합니다.
    pub fn with_route(mut self, market: Market, route: MarketRoute) -> Self {
        self.insert(market, route);
        self
    }

    pub fn insert(&mut self, market: Market, route: MarketRoute) {
        self.routes.insert(market, route);
    }

    /// 시장의 라우트를 조회합니다.
    pub fn route(&self, market: Market) -> Result<&MarketRoute> {
        self.routes
            .get(&market)
            .ok_or_else(|| DataError::UnknownMarket(market.to_string()))
    }
}

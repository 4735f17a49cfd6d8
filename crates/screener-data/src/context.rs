//! 스크리너 세션 상태.
//!
//! 현재 시장, 로드된 종목, 정렬 설정, 검색어를 호출자가 소유하는 값 하나로 묶습니다.

use chrono::{DateTime, Utc};
use screener_core::{Instrument, Market};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::loader::{DataOrigin, MarketDataLoader, MarketSnapshot};
use crate::query::{search_instruments, sort_instruments, SortField};

/// 정렬 설정. 기본값은 변동률 내림차순.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub field: SortField,
    pub ascending: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            field: SortField::Change,
            ascending: false,
        }
    }
}

/// 스크리너 세션.
#[derive(Debug, Clone)]
pub struct ScreenerContext {
    market: Market,
    instruments: Vec<Instrument>,
    sort: SortConfig,
    query: String,
    origin: Option<DataOrigin>,
    loaded_at: Option<DateTime<Utc>>,
}

impl Default for ScreenerContext {
    fn default() -> Self {
        Self::new(Market::Korean)
    }
}

impl ScreenerContext {
    pub fn new(market: Market) -> Self {
        Self {
            market,
            instruments: Vec::new(),
            sort: SortConfig::default(),
            query: String::new(),
            origin: None,
            loaded_at: None,
        }
    }

    pub fn market(&self) -> Market {
        self.market
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// 마지막 로드의 데이터 출처.
    pub fn origin(&self) -> Option<&DataOrigin> {
        self.origin.as_ref()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// 로드된 전체 종목 (현재 정렬 순서).
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// 시장을 전환하고 데이터를 로드합니다.
    ///
    /// 로드에 실패하면 이전 종목 목록을 비우고 오류를 반환합니다.
    pub async fn display_market(
        &mut self,
        loader: &MarketDataLoader,
        market: Market,
    ) -> Result<usize> {
        self.market = market;
        let result = loader.load_snapshot(market).await;
        self.apply_snapshot(result)
    }

    /// 현재 시장의 캐시를 비우고 다시 로드합니다.
    pub async fn refresh(&mut self, loader: &MarketDataLoader) -> Result<usize> {
        let result = loader.refresh(self.market).await;
        self.apply_snapshot(result)
    }

    /// 검색어를 설정합니다.
    pub fn apply_filter(&mut self, query: impl Into<String>) {
        self.query = query.into();
        debug!(query = %self.query, "검색어 변경");
    }

    /// 정렬 기준을 바꾸고 목록을 다시 정렬합니다.
    pub fn set_sort(&mut self, field: SortField, ascending: bool) {
        self.sort = SortConfig { field, ascending };
        sort_instruments(&mut self.instruments, field, ascending);
    }

    /// 검색어가 적용된 종목 목록.
    pub fn visible(&self) -> Vec<&Instrument> {
        search_instruments(&self.instruments, &self.query)
    }

    /// 심볼로 종목을 찾습니다 (대소문자 무시).
    pub fn find_by_symbol(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|item| item.symbol.eq_ignore_ascii_case(symbol))
    }

    fn apply_snapshot(&mut self, result: Result<MarketSnapshot>) -> Result<usize> {
        match result {
            Ok(snapshot) => {
                self.instruments = snapshot.instruments;
                sort_instruments(&mut self.instruments, self.sort.field, self.sort.ascending);
                self.origin = Some(snapshot.origin);
                self.loaded_at = Some(snapshot.loaded_at);
                Ok(self.instruments.len())
            }
            Err(e) => {
                warn!(market = %self.market, error = %e, "시장 전환 실패, 목록 초기화");
                self.instruments.clear();
                self.origin = None;
                self.loaded_at = None;
                Err(e)
            }
        }
    }
}

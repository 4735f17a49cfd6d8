//! 시장별 종목 목록 캐시.
//!
//! 항목은 `{timestamp, content}` JSON으로 저장되며, 읽는 시점에
//! 경과 시간이 TTL 이상이거나 계산할 수 없으면 만료로 보고 삭제합니다.
//! 파싱할 수 없는 항목도 삭제 후 미스로 처리합니다.

use screener_core::{Instrument, Market};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::storage::CacheStorage;
use crate::clock::Clock;
use crate::error::Result;

/// 캐시 항목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// 저장 시각 (epoch 밀리초)
    pub timestamp: i64,
    /// 정규화된 종목 목록
    pub content: Vec<Instrument>,
}

impl CacheEntry {
    /// `now` 시점의 경과 시간(밀리초). 오버플로하거나 미래 시각이면 `None`.
    pub fn age_millis(&self, now_millis: i64) -> Option<i64> {
        now_millis.checked_sub(self.timestamp).filter(|age| *age >= 0)
    }

    /// `now` 시점에 아직 유효한지 확인합니다.
    ///
    /// 경과 시간을 계산할 수 없는 항목은 만료로 봅니다.
    pub fn is_fresh(&self, now_millis: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.age_millis(now_millis).is_some_and(|age| age < ttl_ms)
    }
}

/// TTL이 적용된 시장별 캐시.
#[derive(Clone)]
pub struct MarketCache {
    storage: Arc<dyn CacheStorage>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl MarketCache {
    pub fn new(storage: Arc<dyn CacheStorage>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            storage,
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 저장된 항목을 TTL 판정 없이 읽습니다.
    pub async fn entry(&self, market: Market) -> Result<Option<CacheEntry>> {
        let blob = self.storage.get(&market.cache_key()).await?;
        match blob {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// 유효한 캐시 내용을 가져옵니다.
    ///
    /// 만료되었거나 손상된 항목은 삭제되고 `None`이 반환됩니다.
    /// 저장소 읽기 실패도 미스로 처리합니다.
    pub async fn get(&self, market: Market) -> Option<Vec<Instrument>> {
        let key = market.cache_key();

        let entry = match self.entry(market).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!(market = %market, error = %e, "캐시 읽기 실패, 항목 제거");
                self.evict(market).await;
                return None;
            }
        };

        let now = self.clock.now_millis();
        if entry.is_fresh(now, self.ttl) {
            debug!(
                market = %market,
                age_ms = entry.age_millis(now).unwrap_or_default(),
                count = entry.content.len(),
                "캐시 적중"
            );
            return Some(entry.content);
        }

        debug!(
            market = %market,
            key = %key,
            age_ms = ?entry.age_millis(now),
            "만료된 캐시 제거"
        );
        self.evict(market).await;
        None
    }

    /// 현재 시각으로 새 항목을 저장합니다.
    pub async fn put(&self, market: Market, content: &[Instrument]) -> Result<()> {
        let entry = CacheEntry {
            timestamp: self.clock.now_millis(),
            content: content.to_vec(),
        };
        let json = serde_json::to_string(&entry)?;
        self.storage.set(&market.cache_key(), json).await?;

        debug!(market = %market, count = content.len(), "캐시 저장");
        Ok(())
    }

    /// 시장 캐시를 무효화합니다.
    pub async fn invalidate(&self, market: Market) -> Result<bool> {
        self.storage.remove(&market.cache_key()).await
    }

    /// 모든 시장 캐시를 무효화합니다. 삭제된 항목 수를 반환합니다.
    pub async fn invalidate_all(&self) -> Result<usize> {
        let mut removed = 0;
        for market in Market::ALL {
            if self.invalidate(market).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn evict(&self, market: Market) {
        if let Err(e) = self.storage.remove(&market.cache_key()).await {
            warn!(market = %market, error = %e, "캐시 항목 제거 실패");
        }
    }
}

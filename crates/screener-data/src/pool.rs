//! 동시 요청 수를 제한하는 작업 풀.
//!
//! 배치 요청(여러 심볼 동시 조회)은 고정 크기 세마포어로 제한됩니다.
//! 대기 중인 작업은 진행 중인 작업 하나가 끝나야 시작됩니다.
//! 개별 작업 실패는 배치를 중단시키지 않고 `None`으로 기록됩니다.

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{DataError, Result};

/// 배치 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// 총 작업 수
    pub total: usize,
    /// 성공 수
    pub success: usize,
    /// 실패 수
    pub errors: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl BatchStats {
    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "배치 완료"
        );
    }
}

/// 배치 결과.
///
/// `items`는 입력 순서를 유지하며, 실패한 키의 값은 `None`입니다.
#[derive(Debug)]
pub struct BatchOutcome<K, V> {
    pub items: Vec<(K, Option<V>)>,
    pub stats: BatchStats,
}

impl<K, V> BatchOutcome<K, V> {
    /// 성공한 값만 입력 순서대로 반환합니다.
    pub fn into_values(self) -> Vec<V> {
        self.items.into_iter().filter_map(|(_, v)| v).collect()
    }

    /// 실패한 키 목록.
    pub fn failed_keys(&self) -> Vec<&K> {
        self.items
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k)
            .collect()
    }
}

/// 세마포어 기반 작업 풀.
#[derive(Debug, Clone)]
pub struct BoundedPool {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl BoundedPool {
    /// 동시 실행 상한을 지정해 생성합니다 (최소 1).
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// 동시 실행 상한.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 키마다 작업 하나를 실행합니다.
    ///
    /// 최대 `limit`개의 작업만 동시에 진행됩니다.
    pub async fn run_batch<K, V, F, Fut>(
        &self,
        operation: &str,
        keys: Vec<K>,
        f: F,
    ) -> BatchOutcome<K, V>
    where
        K: Clone + Display,
        F: Fn(K) -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let started = Instant::now();
        let total = keys.len();

        let mut tasks: FuturesUnordered<_> = keys
            .into_iter()
            .enumerate()
            .map(|(index, key)| {
                let semaphore = self.semaphore.clone();
                let task = f(key.clone());
                async move {
                    let result = match semaphore.acquire_owned().await {
                        Ok(_permit) => task.await,
                        Err(_) => Err(DataError::Network("작업 풀이 닫혔습니다".to_string())),
                    };
                    (index, key, result)
                }
            })
            .collect();

        let mut slots: Vec<Option<(K, Option<V>)>> = (0..total).map(|_| None).collect();
        let mut stats = BatchStats {
            total,
            ..Default::default()
        };

        while let Some((index, key, result)) = tasks.next().await {
            let value = match result {
                Ok(value) => {
                    stats.success += 1;
                    Some(value)
                }
                Err(e) => {
                    warn!(operation = operation, key = %key, error = %e, "배치 작업 실패");
                    stats.errors += 1;
                    None
                }
            };
            slots[index] = Some((key, value));
        }

        stats.elapsed = started.elapsed();
        debug!(operation = operation, limit = self.limit, "배치 종료");

        BatchOutcome {
            items: slots.into_iter().flatten().collect(),
            stats,
        }
    }
}

impl Default for BoundedPool {
    fn default() -> Self {
        Self::new(3)
    }
}

//! 재시도 정책.
//!
//! 일시적인 네트워크 실패에 대해 지수 백오프로 재시도합니다.
//! 기본값은 최대 2회 시도, 첫 대기 1초, 배수 2.0 (1초, 2초, ...)입니다.

use screener_core::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{DataError, Result};

/// 재시도 정책 값 객체.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 최대 시도 횟수 (첫 시도 포함)
    pub max_attempts: u32,
    /// 첫 재시도 전 대기 시간
    pub base_delay: Duration,
    /// 재시도마다 곱해지는 배수
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
        }
    }
}

impl RetryPolicy {
    /// `attempt`번째 시도가 실패한 뒤의 대기 시간.
    ///
    /// 표현 범위를 넘으면 `Duration::MAX`, 배수가 음수이거나 NaN이면 `base_delay`입니다.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        if secs.is_nan() || secs < 0.0 {
            return self.base_delay;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

/// 재시도 가능한 오류([`DataError::is_retryable`])에 대해서만 재시도합니다.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    with_retry_if(policy, label, DataError::is_retryable, op).await
}

/// 조건을 만족하는 오류에 대해서만 재시도합니다.
pub async fn with_retry_if<T, F, Fut, P>(
    policy: &RetryPolicy,
    label: &str,
    should_retry: P,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&DataError) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && should_retry(&e) => {
                let delay = policy.delay_for(attempt);
                debug!(
                    label = label,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "재시도 예정"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if attempt > 1 {
                    warn!(label = label, attempts = attempt, error = %e, "재시도 후 최종 실패");
                }
                return Err(e);
            }
        }
    }
}

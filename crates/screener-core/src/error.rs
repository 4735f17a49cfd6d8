//! 스크리너 핵심 에러 타입.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 알 수 없는 시장 식별자
    #[error("알 수 없는 시장: {0}")]
    UnknownMarket(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

//! 데이터 모듈 오류 타입.

use screener_core::{CoreError, Market};
use thiserror::Error;

/// 데이터 로딩 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP 요청/연결/타임아웃 오류
    #[error("Network error: {0}")]
    Network(String),

    /// 제공자의 요청 한도 초과 응답 ("Note", "Error Message" 등)
    #[error("Rate limited by {provider}: {message}")]
    RateLimited { provider: String, message: String },

    /// 예상하지 못한 JSON 구조
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// 알 수 없는 시장 식별자
    #[error("Unknown market: {0}")]
    UnknownMarket(String),

    /// 캐시 저장소 오류
    #[error("Storage error: {0}")]
    Storage(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(String),

    /// 모든 경로 실패
    #[error("{market} 데이터를 로드할 수 없습니다: {reason}")]
    Unavailable { market: Market, reason: String },
}

impl DataError {
    /// 재시도 가능한 오류인지 확인.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DataError::Network(_))
    }

    /// 정적 데이터 폴백으로 복구 가능한 오류인지 확인.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DataError::Network(_) | DataError::RateLimited { .. } | DataError::MalformedData(_)
        )
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataError::MalformedData(err.to_string())
        } else {
            DataError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::MalformedData(err.to_string())
    }
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::Storage(err.to_string())
    }
}

impl From<CoreError> for DataError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownMarket(id) => DataError::UnknownMarket(id),
            CoreError::Config(msg) => DataError::Config(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

//! 설정 관리.
//!
//! 이 모듈은 스크리너 설정을 정의하고 관리합니다.
//! 모든 섹션은 기본값을 가지므로 설정 파일에는 바꿀 값만 적으면 됩니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::types::Market;

/// 스크리너 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScreenerConfig {
    /// 캐시 설정
    pub cache: CacheConfig,
    /// 재시도 정책 설정
    pub retry: RetryConfig,
    /// 동시 요청 제한 설정
    pub pool: PoolConfig,
    /// 데이터 소스 설정
    pub sources: SourcesConfig,
    /// HTTP 클라이언트 설정
    pub http: HttpConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 캐시 유효 기간 (밀리초)
    pub ttl_ms: u64,
    /// 캐시 파일 디렉토리 (없으면 메모리 캐시)
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 300_000,
            dir: None,
        }
    }
}

impl CacheConfig {
    /// TTL을 Duration으로 반환
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// 재시도 정책 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 최대 시도 횟수 (첫 시도 포함)
    pub max_attempts: u32,
    /// 첫 재시도 전 대기 시간 (밀리초)
    pub base_delay_ms: u64,
    /// 재시도마다 곱해지는 배수
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}

/// 동시 요청 제한 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// 배치 내 동시 요청 수 상한
    pub max_concurrent: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_concurrent: 3 }
    }
}

/// 데이터 소스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// 번들 정적 JSON 디렉토리
    pub data_dir: PathBuf,
    /// 미국 주식 시세 API
    pub stock_api: StockApiConfig,
    /// 암호화폐 가격 API
    pub crypto_api: CryptoApiConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            stock_api: StockApiConfig::default(),
            crypto_api: CryptoApiConfig::default(),
        }
    }
}

impl SourcesConfig {
    /// 시장별 정적 데이터 파일 경로.
    pub fn static_path(&self, market: Market) -> PathBuf {
        let file = match market {
            Market::Korean => "korean-stocks.json",
            Market::Us => "us-stocks.json",
            Market::Crypto => "crypto-list.json",
        };
        self.data_dir.join(file)
    }
}

/// 주식 시세 API 설정 (Alpha Vantage `GLOBAL_QUOTE`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StockApiConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// API 엔드포인트
    pub base_url: String,
    /// API 키
    pub api_key: String,
    /// 조회할 티커 목록
    pub symbols: Vec<String>,
}

impl Default for StockApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://www.alphavantage.co/query".to_string(),
            api_key: "demo".to_string(),
            symbols: ["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "TSLA"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// 암호화폐 가격 API 설정 (CoinGecko `simple/price`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CryptoApiConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// API 베이스 URL
    pub base_url: String,
    /// 조회할 코인 ID 목록
    pub coin_ids: Vec<String>,
    /// 가격 기준 통화
    pub vs_currency: String,
}

impl Default for CryptoApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            coin_ids: [
                "bitcoin",
                "ethereum",
                "binancecoin",
                "cardano",
                "solana",
                "ripple",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            vs_currency: "usd".to_string(),
        }
    }
}

/// HTTP 클라이언트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// User-Agent 헤더
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("screener/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    /// 요청 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ScreenerConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("SCREENER")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// `.env`와 환경 변수만으로 설정을 로드합니다.
    pub fn from_env() -> CoreResult<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("SCREENER")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 값 범위를 검증합니다.
    pub fn validate(&self) -> CoreResult<()> {
        if self.cache.ttl_ms == 0 {
            return Err(CoreError::Config("cache.ttl_ms는 0보다 커야 합니다".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(CoreError::Config(
                "retry.max_attempts는 1 이상이어야 합니다".to_string(),
            ));
        }
        let multiplier = self.retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(CoreError::Config(
                "retry.backoff_multiplier는 1.0 이상의 유한한 값이어야 합니다".to_string(),
            ));
        }
        if self.pool.max_concurrent == 0 {
            return Err(CoreError::Config(
                "pool.max_concurrent는 1 이상이어야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}

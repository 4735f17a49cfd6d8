//! 데이터 소스 모듈.
//!
//! 시장 데이터를 가져오는 소스들을 정의합니다.
//!
//! ## 주식 시세 API
//! - `StockQuoteApi`: Alpha Vantage `GLOBAL_QUOTE` (티커별 요청, 배치 동시성 제한)
//!
//! ## 코인 가격 API
//! - `CryptoPriceApi`: CoinGecko `simple/price` (코인 ID 목록 단일 요청)
//!
//! ## 정적 데이터
//! - `StaticFileSource`: 번들 JSON 파일 (모든 시장의 최종 폴백)
//!
//! ## 라우팅
//! - `MarketSources`: 시장 → (원격 API, 정적 파일) 불변 매핑

pub mod alpha_vantage;
pub mod coingecko;
pub mod registry;
pub mod static_file;

use async_trait::async_trait;
use screener_core::{parse_numeric_str, RawInstrument};
use serde_json::Value;

use crate::error::Result;

pub use alpha_vantage::StockQuoteApi;
pub use coingecko::CryptoPriceApi;
pub use registry::{MarketRoute, MarketSources};
pub use static_file::StaticFileSource;

/// 종목 레코드 소스 트레잇.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// 로그와 스냅샷에 표시할 소스 이름.
    fn name(&self) -> &str;

    /// 소스 형태의 레코드를 가져옵니다.
    async fn fetch(&self) -> Result<Vec<RawInstrument>>;
}

/// JSON 값에서 숫자를 꺼냅니다 (숫자 문자열 허용).
pub(crate) fn json_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }
}

//! 미국 주식 시세 API (Alpha Vantage `GLOBAL_QUOTE`).
//!
//! 티커마다 요청 하나를 보내며, 배치 내 동시 요청 수는 작업 풀로 제한됩니다.
//! 각 요청은 재시도 정책으로 감싸집니다.
//!
//! ## 응답 예시
//! ```text
//! {"Global Quote": {"01. symbol": "AAPL", "03. high": "191.05", "04. low": "188.10",
//!                   "05. price": "189.84", "06. volume": "52345678",
//!                   "09. change percent": "1.2500%"}}
//! ```
//! 요청 한도에 걸리면 `Note`, `Information`, `Error Message` 중 하나만 담긴 본문이 옵니다.

use async_trait::async_trait;
use screener_core::{RawInstrument, StockApiConfig};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{json_number, MarketSource};
use crate::error::{DataError, Result};
use crate::http::HttpClient;
use crate::pool::{BatchOutcome, BoundedPool};
use crate::retry::{with_retry, RetryPolicy};

const PROVIDER: &str = "alpha_vantage";

/// 요청 한도/오류 안내 필드.
const NOTICE_FIELDS: [&str; 3] = ["Note", "Information", "Error Message"];

/// 주식 시세 API 클라이언트.
pub struct StockQuoteApi {
    http: HttpClient,
    base_url: String,
    api_key: String,
    symbols: Vec<String>,
    retry: RetryPolicy,
    pool: BoundedPool,
}

impl StockQuoteApi {
    pub fn new(
        http: HttpClient,
        config: &StockApiConfig,
        retry: RetryPolicy,
        pool: BoundedPool,
    ) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            symbols: config.symbols.clone(),
            retry,
            pool,
        }
    }

    /// 조회 대상 티커 목록.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// 티커 하나의 시세를 조회합니다 (재시도 포함).
    #[instrument(skip(self))]
    pub async fn fetch_quote(&self, symbol: &str) -> Result<RawInstrument> {
        with_retry(&self.retry, symbol, || self.request_quote(symbol)).await
    }

    /// 여러 티커를 동시 요청 제한 하에 조회합니다.
    ///
    /// 실패한 티커는 `None`으로 기록되고 나머지 결과에는 영향을 주지 않습니다.
    pub async fn fetch_batch(&self, symbols: Vec<String>) -> BatchOutcome<String, RawInstrument> {
        self.pool
            .run_batch(PROVIDER, symbols, |symbol| async move {
                self.fetch_quote(&symbol).await
            })
            .await
    }

    async fn request_quote(&self, symbol: &str) -> Result<RawInstrument> {
        let query = [
            ("function", "GLOBAL_QUOTE".to_string()),
            ("symbol", symbol.to_string()),
            ("apikey", self.api_key.clone()),
        ];
        let body = self.http.get_json(PROVIDER, &self.base_url, &query).await?;
        parse_global_quote(symbol, &body)
    }
}

/// `GLOBAL_QUOTE` 응답을 레코드로 변환합니다.
fn parse_global_quote(symbol: &str, body: &Value) -> Result<RawInstrument> {
    if let Some(message) = NOTICE_FIELDS
        .iter()
        .find_map(|field| body.get(*field).and_then(Value::as_str))
    {
        return Err(DataError::RateLimited {
            provider: PROVIDER.to_string(),
            message: message.to_string(),
        });
    }

    let quote = body
        .get("Global Quote")
        .and_then(Value::as_object)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            DataError::MalformedData(format!("{}: Global Quote 없음 ({})", PROVIDER, symbol))
        })?;

    let price = json_number(quote.get("05. price")).ok_or_else(|| {
        DataError::MalformedData(format!("{}: 가격 없음 ({})", PROVIDER, symbol))
    })?;

    let ticker = quote
        .get("01. symbol")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(symbol)
        .to_string();

    debug!(symbol = %ticker, price = price, "시세 파싱");

    Ok(RawInstrument {
        id: Some(symbol.to_string()),
        name: Some(ticker.clone()),
        symbol: Some(ticker),
        price: Some(price),
        change: json_number(quote.get("09. change percent")),
        volume: json_number(quote.get("06. volume")),
        volume_24h: None,
        market_cap: Some(0.0),
        high: json_number(quote.get("03. high")),
        low: json_number(quote.get("04. low")),
    })
}

#[async_trait]
impl MarketSource for StockQuoteApi {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch(&self) -> Result<Vec<RawInstrument>> {
        let outcome = self.fetch_batch(self.symbols.clone()).await;
        outcome.stats.log_summary("미국 주식 시세 조회");
        Ok(outcome.into_values())
    }
}

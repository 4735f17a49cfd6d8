//! 암호화폐 가격 API (CoinGecko `simple/price`).
//!
//! 코인 ID 목록을 쉼표로 묶어 한 번에 조회합니다 (인증 불필요).
//! 응답에 없는 코인은 건너뜁니다.

use async_trait::async_trait;
use screener_core::{CryptoApiConfig, RawInstrument};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{json_number, MarketSource};
use crate::error::{DataError, Result};
use crate::http::HttpClient;
use crate::retry::{with_retry, RetryPolicy};

const PROVIDER: &str = "coingecko";

/// 코인 ID → 표시 이름.
pub fn coin_name(coin_id: &str) -> String {
    match coin_id {
        "bitcoin" => "Bitcoin",
        "ethereum" => "Ethereum",
        "binancecoin" => "Binance Coin",
        "cardano" => "Cardano",
        "solana" => "Solana",
        "ripple" => "Ripple",
        other => other,
    }
    .to_string()
}

/// 코인 ID → 티커 심볼.
pub fn coin_symbol(coin_id: &str) -> String {
    match coin_id {
        "bitcoin" => "BTC".to_string(),
        "ethereum" => "ETH".to_string(),
        "binancecoin" => "BNB".to_string(),
        "cardano" => "ADA".to_string(),
        "solana" => "SOL".to_string(),
        "ripple" => "XRP".to_string(),
        other => other.to_uppercase(),
    }
}

/// 코인 가격 API 클라이언트.
pub struct CryptoPriceApi {
    http: HttpClient,
    base_url: String,
    coin_ids: Vec<String>,
    vs_currency: String,
    retry: RetryPolicy,
}

impl CryptoPriceApi {
    pub fn new(http: HttpClient, config: &CryptoApiConfig, retry: RetryPolicy) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            coin_ids: config.coin_ids.clone(),
            vs_currency: config.vs_currency.to_lowercase(),
            retry,
        }
    }

    /// 코인 목록의 가격을 조회합니다 (재시도 포함).
    #[instrument(skip(self), fields(count = coin_ids.len()))]
    pub async fn fetch_prices(&self, coin_ids: &[String]) -> Result<Vec<RawInstrument>> {
        if coin_ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/simple/price", self.base_url);
        let query = [
            ("ids", coin_ids.join(",")),
            ("vs_currencies", self.vs_currency.clone()),
            ("include_market_cap", "true".to_string()),
            ("include_24hr_vol", "true".to_string()),
            ("include_24hr_change", "true".to_string()),
        ];

        let body = with_retry(&self.retry, PROVIDER, || {
            self.http.get_json(PROVIDER, &url, &query)
        })
        .await?;

        parse_simple_price(&body, coin_ids, &self.vs_currency)
    }
}

/// 요청 한도 초과 등 오류 본문을 확인합니다.
///
/// `{"status": {"error_code": 429, "error_message": "..."}}` 또는 `{"error": "..."}`
fn error_message(body: &Value) -> Option<String> {
    if let Some(status) = body.get("status") {
        if status.get("error_code").is_some() {
            let message = status
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or("error_code 응답");
            return Some(message.to_string());
        }
    }
    body.get("error").map(|e| match e.as_str() {
        Some(s) => s.to_string(),
        None => e.to_string(),
    })
}

fn parse_simple_price(body: &Value, coin_ids: &[String], vs: &str) -> Result<Vec<RawInstrument>> {
    if let Some(message) = error_message(body) {
        return Err(DataError::RateLimited {
            provider: PROVIDER.to_string(),
            message,
        });
    }

    let prices = body
        .as_object()
        .ok_or_else(|| DataError::MalformedData(format!("{}: 객체가 아닌 응답", PROVIDER)))?;

    let change_key = format!("{}_24h_change", vs);
    let volume_key = format!("{}_24h_vol", vs);
    let market_cap_key = format!("{}_market_cap", vs);

    let records = coin_ids
        .iter()
        .filter_map(|coin_id| {
            let Some(data) = prices.get(coin_id) else {
                debug!(coin = %coin_id, "응답에 코인 없음");
                return None;
            };
            Some(RawInstrument {
                id: Some(coin_id.clone()),
                name: Some(coin_name(coin_id)),
                symbol: Some(coin_symbol(coin_id)),
                price: json_number(data.get(vs)),
                change: json_number(data.get(&change_key)),
                volume: None,
                volume_24h: json_number(data.get(&volume_key)),
                market_cap: json_number(data.get(&market_cap_key)),
                high: None,
                low: None,
            })
        })
        .collect();

    Ok(records)
}

#[async_trait]
impl MarketSource for CryptoPriceApi {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch(&self) -> Result<Vec<RawInstrument>> {
        self.fetch_prices(&self.coin_ids).await
    }
}

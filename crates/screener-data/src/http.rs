//! 원격 API 호출용 HTTP 클라이언트.

use reqwest::{Client, StatusCode};
use screener_core::HttpConfig;
use serde_json::Value;
use tracing::debug;

use crate::error::{DataError, Result};

/// JSON GET 요청 전용 클라이언트.
///
/// 상태 코드를 오류 분류로 변환합니다:
/// - 429 → `RateLimited`
/// - 그 외 비정상 상태 → `Network` (재시도 대상)
/// - JSON이 아닌 본문 → `MalformedData`
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DataError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { client })
    }

    /// 쿼리 파라미터와 함께 GET 요청을 보내고 JSON 본문을 반환합니다.
    pub async fn get_json(
        &self,
        provider: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        debug!(provider = provider, status = status.as_u16(), "API 응답 수신");

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                provider: provider.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }
        if !status.is_success() {
            return Err(DataError::Network(format!(
                "{} HTTP {}",
                provider,
                status.as_u16()
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| DataError::MalformedData(format!("{} 응답 파싱 실패: {}", provider, e)))
    }
}

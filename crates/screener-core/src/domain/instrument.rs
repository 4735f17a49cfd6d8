//! 종목(Instrument) 레코드.
//!
//! 데이터 소스마다 필드 이름과 값 형식이 다르기 때문에 두 단계로 나눕니다:
//! - [`RawInstrument`]: 소스 형태 그대로의 레코드 (모든 필드 선택적)
//! - [`Instrument`]: 정규화된 레코드 (스크리너가 사용하는 단일 형태)

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 정규화된 종목 레코드.
///
/// `price >= 0`을 보장하며, 거래량은 `volume` 하나로 통일됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    /// 종목 식별자 (종목 코드, 티커, 코인 ID)
    pub id: String,
    /// 종목명
    #[serde(default)]
    pub name: String,
    /// 표시용 심볼
    #[serde(default)]
    pub symbol: String,
    /// 현재가
    pub price: f64,
    /// 전일 대비 변동률 (%)
    pub change: f64,
    /// 거래량 (암호화폐는 24시간 거래량)
    pub volume: f64,
    /// 시가총액
    pub market_cap: f64,
    /// 고가
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    /// 저가
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
}

/// 소스 형태의 종목 레코드.
///
/// 정적 JSON, 주식 시세 API, 코인 가격 API가 모두 이 형태로 변환됩니다.
/// 숫자 필드는 숫자 또는 숫자 문자열(`"70000"`, `"1.25%"`)을 허용합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInstrument {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub change: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume: Option<f64>,
    #[serde(
        rename = "volume24h",
        alias = "volume_24h",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub volume_24h: Option<f64>,
    #[serde(
        rename = "marketCap",
        alias = "market_cap",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub high: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub low: Option<f64>,
}

/// 번들 정적 데이터 파일.
///
/// 주식 파일은 `stocks`, 암호화폐 파일은 `cryptos` 배열을 사용합니다.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticDataset {
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub stocks: Option<Vec<RawInstrument>>,
    #[serde(default)]
    pub cryptos: Option<Vec<RawInstrument>>,
}

impl StaticDataset {
    /// 레코드 배열을 꺼냅니다 (`stocks` 우선, 없으면 `cryptos`).
    pub fn into_records(self) -> Option<Vec<RawInstrument>> {
        self.stocks.or(self.cryptos)
    }
}

/// 숫자 문자열 파싱.
///
/// 앞뒤 공백, 천 단위 구분자(`,`), 끝의 `%`를 허용합니다.
pub fn parse_numeric_str(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok()
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_numeric_str(&s),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_str() {
        assert_eq!(parse_numeric_str("70000"), Some(70000.0));
        assert_eq!(parse_numeric_str("1,234,567"), Some(1234567.0));
        assert_eq!(parse_numeric_str("-1.2500%"), Some(-1.25));
        assert_eq!(parse_numeric_str("  "), None);
        assert_eq!(parse_numeric_str("N/A"), None);
    }

    #[test]
    fn test_raw_instrument_accepts_mixed_shapes() {
        let raw: RawInstrument = serde_json::from_str(
            r#"{"id":"bitcoin","price":"43250.5","change":-1.2,"volume24h":28000000000,"market_cap":null}"#,
        )
        .unwrap();

        assert_eq!(raw.id.as_deref(), Some("bitcoin"));
        assert_eq!(raw.price, Some(43250.5));
        assert_eq!(raw.change, Some(-1.2));
        assert_eq!(raw.volume, None);
        assert_eq!(raw.volume_24h, Some(28_000_000_000.0));
        assert_eq!(raw.market_cap, None);
    }

    #[test]
    fn test_raw_instrument_numeric_id() {
        let raw: RawInstrument = serde_json::from_str(r#"{"id":5930,"price":70000}"#).unwrap();
        assert_eq!(raw.id.as_deref(), Some("5930"));
    }

    #[test]
    fn test_static_dataset_prefers_stocks() {
        let dataset: StaticDataset = serde_json::from_str(
            r#"{"market":"korean","currency":"KRW","stocks":[{"id":"005930"}],"cryptos":[]}"#,
        )
        .unwrap();
        assert_eq!(dataset.into_records().map(|r| r.len()), Some(1));

        let dataset: StaticDataset =
            serde_json::from_str(r#"{"cryptos":[{"id":"bitcoin"},{"id":"ethereum"}]}"#).unwrap();
        assert_eq!(dataset.into_records().map(|r| r.len()), Some(2));

        let dataset: StaticDataset = serde_json::from_str(r#"{"lastUpdate":"x"}"#).unwrap();
        assert!(dataset.into_records().is_none());
    }

    #[test]
    fn test_instrument_serializes_camel_case() {
        let instrument = Instrument {
            id: "005930".to_string(),
            name: "삼성전자".to_string(),
            symbol: "005930".to_string(),
            price: 70000.0,
            change: -1.2,
            volume: 0.0,
            market_cap: 0.0,
            high: None,
            low: None,
        };

        let json = serde_json::to_value(&instrument).unwrap();
        assert_eq!(json["marketCap"], 0.0);
        assert!(json.get("high").is_none());
    }
}

//! 소스 레코드 정규화.
//!
//! 소스마다 다른 필드 이름과 값 형식을 [`Instrument`] 하나로 통일합니다.
//!
//! - 거래량: `volume` 우선, 없으면 `volume24h`, 둘 다 없으면 0
//! - 누락되었거나 유한하지 않은 숫자 필드는 0
//! - 누락된 `name`/`symbol`은 빈 문자열, 누락된 `id`는 `symbol`로 대체
//! - 음수 가격 또는 식별자가 없는 레코드는 제외

use screener_core::{Instrument, Market, RawInstrument};
use tracing::{debug, warn};

/// 레코드를 제외한 이유.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// `id`와 `symbol`이 모두 없음
    MissingId,
    /// 음수 가격
    NegativePrice(f64),
}

/// 레코드 목록을 정규화합니다. 제외된 레코드 수는 로그로 남깁니다.
pub fn normalize(market: Market, raw: Vec<RawInstrument>) -> Vec<Instrument> {
    let total = raw.len();
    let mut rejected = 0usize;

    let instruments: Vec<Instrument> = raw
        .into_iter()
        .filter_map(|record| match normalize_record(record) {
            Ok(instrument) => Some(instrument),
            Err(reason) => {
                debug!(market = %market, reason = ?reason, "레코드 제외");
                rejected += 1;
                None
            }
        })
        .collect();

    if rejected > 0 {
        warn!(
            market = %market,
            total = total,
            rejected = rejected,
            "정규화 중 일부 레코드 제외"
        );
    }

    instruments
}

/// 레코드 하나를 정규화합니다.
pub fn normalize_record(raw: RawInstrument) -> Result<Instrument, Rejection> {
    let symbol = non_empty(raw.symbol);
    let id = non_empty(raw.id)
        .or_else(|| symbol.clone())
        .ok_or(Rejection::MissingId)?;

    let price = finite_or_zero(raw.price);
    if price < 0.0 {
        return Err(Rejection::NegativePrice(price));
    }

    Ok(Instrument {
        id,
        name: raw.name.unwrap_or_default(),
        symbol: symbol.unwrap_or_default(),
        price,
        change: finite_or_zero(raw.change),
        volume: finite_or_zero(raw.volume.or(raw.volume_24h)),
        market_cap: finite_or_zero(raw.market_cap),
        high: raw.high.filter(|v| v.is_finite()),
        low: raw.low.filter(|v| v.is_finite()),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

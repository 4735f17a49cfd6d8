//! 종목 검색 및 정렬.

use screener_core::Instrument;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// 정렬 기준 필드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Symbol,
    Price,
    Change,
    Volume,
    MarketCap,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Symbol => "symbol",
            SortField::Price => "price",
            SortField::Change => "change",
            SortField::Volume => "volume",
            SortField::MarketCap => "marketCap",
        }
    }

    /// 두 종목을 이 필드 기준으로 비교합니다 (오름차순).
    pub fn compare(&self, a: &Instrument, b: &Instrument) -> Ordering {
        match self {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Symbol => a.symbol.cmp(&b.symbol),
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::Change => a.change.total_cmp(&b.change),
            SortField::Volume => a.volume.total_cmp(&b.volume),
            SortField::MarketCap => a.market_cap.total_cmp(&b.market_cap),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "symbol" => Ok(SortField::Symbol),
            "price" => Ok(SortField::Price),
            "change" => Ok(SortField::Change),
            "volume" => Ok(SortField::Volume),
            "marketcap" | "market_cap" => Ok(SortField::MarketCap),
            _ => Err(DataError::Config(format!("알 수 없는 정렬 필드: {}", s))),
        }
    }
}

/// 이름 또는 심볼에 검색어가 포함된 종목을 반환합니다 (대소문자 무시).
///
/// 빈 검색어는 전체 목록을 반환합니다.
pub fn search_instruments<'a>(items: &'a [Instrument], query: &str) -> Vec<&'a Instrument> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|item| {
            item.name.to_lowercase().contains(&needle)
                || item.symbol.to_lowercase().contains(&needle)
        })
        .collect()
}

/// 안정 정렬. 같은 값의 종목은 기존 순서를 유지합니다.
pub fn sort_instruments(items: &mut [Instrument], field: SortField, ascending: bool) {
    items.sort_by(|a, b| {
        let ordering = field.compare(a, b);
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

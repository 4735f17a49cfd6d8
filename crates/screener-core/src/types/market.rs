//! 시장 식별자 정의.
//!
//! 스크리너가 다루는 시장은 세 가지입니다:
//! - `korean` - 한국 주식 (정적 데이터 전용)
//! - `us` - 미국 주식 (주식 시세 API → 정적 데이터 폴백)
//! - `crypto` - 암호화폐 (코인 가격 API → 정적 데이터 폴백)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 시장 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// 한국 주식 시장
    Korean,
    /// 미국 주식 시장
    Us,
    /// 암호화폐 시장
    Crypto,
}

impl Market {
    /// 지원하는 모든 시장.
    pub const ALL: [Market; 3] = [Market::Korean, Market::Us, Market::Crypto];

    /// 식별자 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Korean => "korean",
            Market::Us => "us",
            Market::Crypto => "crypto",
        }
    }

    /// 시장별 캐시 키.
    pub fn cache_key(&self) -> String {
        format!("stocks_{}_cache", self.as_str())
    }

    /// 표시 통화 코드.
    pub fn currency(&self) -> &'static str {
        match self {
            Market::Korean => "KRW",
            Market::Us | Market::Crypto => "USD",
        }
    }

    /// 원격 API가 구성되는 시장인지 확인합니다.
    pub fn has_remote_source(&self) -> bool {
        !matches!(self, Market::Korean)
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "korean" => Ok(Market::Korean),
            "us" => Ok(Market::Us),
            "crypto" => Ok(Market::Crypto),
            _ => Err(CoreError::UnknownMarket(s.to_string())),
        }
    }
}

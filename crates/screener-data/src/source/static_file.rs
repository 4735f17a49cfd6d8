//! 번들 정적 JSON 데이터 소스.

use async_trait::async_trait;
use screener_core::{Market, RawInstrument, StaticDataset};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::MarketSource;
use crate::error::{DataError, Result};

/// 시장별 정적 데이터 파일.
///
/// 주식 파일은 `{"stocks": [...]}`, 암호화폐 파일은 `{"cryptos": [...]}` 형태입니다.
#[derive(Debug, Clone)]
pub struct StaticFileSource {
    market: Market,
    path: PathBuf,
}

impl StaticFileSource {
    pub fn new(market: Market, path: impl Into<PathBuf>) -> Self {
        Self {
            market,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MarketSource for StaticFileSource {
    fn name(&self) -> &str {
        "static_file"
    }

    async fn fetch(&self) -> Result<Vec<RawInstrument>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DataError::Storage(format!("{} 읽기 실패: {}", self.path.display(), e))
        })?;

        let dataset: StaticDataset = serde_json::from_str(&content).map_err(|e| {
            DataError::MalformedData(format!("{} 파싱 실패: {}", self.path.display(), e))
        })?;

        let records = dataset.into_records().ok_or_else(|| {
            DataError::MalformedData(format!(
                "{}: stocks/cryptos 배열 없음",
                self.path.display()
            ))
        })?;

        debug!(
            market = %self.market,
            path = %self.path.display(),
            count = records.len(),
            "정적 데이터 로드"
        );
        Ok(records)
    }
}

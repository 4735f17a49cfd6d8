//! 캐싱 레이어.
//!
//! - Storage: 키-값 blob 저장소 (메모리, 파일)
//! - Market 캐시: 시장별 `{timestamp, content}` 항목과 TTL 판정

pub mod market_cache;
pub mod storage;

pub use market_cache::{CacheEntry, MarketCache};
pub use storage::{CacheStorage, FileStorage, MemoryStorage};

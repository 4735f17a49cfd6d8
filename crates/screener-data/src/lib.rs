//! 시장 데이터 로딩 및 스크리너 상태 관리.
//!
//! 이 crate는 다음을 제공합니다:
//! - 시장 데이터 로더 (캐시 → 원격 API → 정적 파일 폴백)
//! - TTL 캐시 (메모리/파일 저장소)
//! - 재시도 정책 및 동시 요청 제한 작업 풀
//! - 주식 시세/코인 가격 API 어댑터
//! - 소스 레코드 정규화
//! - 종목 검색/정렬 및 스크리너 세션 컨텍스트

pub mod cache;
pub mod clock;
pub mod context;
pub mod error;
pub mod http;
pub mod loader;
pub mod normalize;
pub mod pool;
pub mod query;
pub mod retry;
pub mod source;

pub use error::{DataError, Result};
pub use loader::{DataOrigin, MarketDataLoader, MarketSnapshot};

// 캐시 재내보내기
pub use cache::{CacheEntry, CacheStorage, FileStorage, MarketCache, MemoryStorage};
pub use clock::{Clock, ManualClock, SystemClock};

// 재시도/작업 풀 재내보내기
pub use pool::{BatchOutcome, BatchStats, BoundedPool};
pub use retry::{with_retry, with_retry_if, RetryPolicy};

// 데이터 소스 재내보내기
pub use source::{
    CryptoPriceApi, MarketRoute, MarketSource, MarketSources, StaticFileSource, StockQuoteApi,
};

pub use context::{ScreenerContext, SortConfig};
pub use normalize::{normalize, normalize_record, Rejection};
pub use query::{search_instruments, sort_instruments, SortField};

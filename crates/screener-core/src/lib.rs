//! # Screener Core
//!
//! 시장 스크리너의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 스크리너 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시장 식별자 (`Market`)
//! - 종목 레코드 (정규화 전/후)
//! - 설정 관리
//! - 로깅 인프라
//! - 화면 표시용 수치 포맷팅

pub mod config;
pub mod display;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;

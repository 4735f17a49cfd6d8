//! 기본 타입 정의.

pub mod market;

pub use market::Market;

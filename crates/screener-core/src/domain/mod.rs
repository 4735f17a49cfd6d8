//! 도메인 모델.

pub mod instrument;

pub use instrument::{parse_numeric_str, Instrument, RawInstrument, StaticDataset};

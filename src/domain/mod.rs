//! Core domain types and logic.

pub mod ohlcv;
pub mod quote;
pub mod period;
pub mod indicator;
pub mod metrics;
pub mod symbols;
pub mod report;
pub mod analysis;
pub mod error;

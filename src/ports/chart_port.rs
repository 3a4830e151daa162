//! Chart rendering port trait.

use std::path::PathBuf;

use crate::domain::error::StockError;
use crate::domain::ohlcv::PriceSeries;

pub trait ChartPort {
    /// Candlestick markup for `series`.
    fn render(&self, series: &PriceSeries, title: &str) -> Result<String, StockError>;

    /// Render and persist, returning the written path.
    fn save(&self, series: &PriceSeries, title: &str) -> Result<PathBuf, StockError>;
}

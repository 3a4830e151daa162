//! Market data access port trait.

use crate::domain::error::StockError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::period::LookbackPeriod;
use crate::domain::quote::QuoteSnapshot;

pub trait MarketDataPort {
    /// Named quote fields for `symbol`; fields the provider omits stay `None`.
    fn fetch_quote(&self, symbol: &str) -> Result<QuoteSnapshot, StockError>;

    /// Daily bars over `period`, sorted by date. May be empty.
    fn fetch_history(
        &self,
        symbol: &str,
        period: LookbackPeriod,
    ) -> Result<PriceSeries, StockError>;
}

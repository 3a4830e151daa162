#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use stockscope::domain::error::StockError;
pub use stockscope::domain::ohlcv::{PriceBar, PriceSeries};
use stockscope::domain::period::LookbackPeriod;
use stockscope::domain::quote::QuoteSnapshot;
use stockscope::ports::market_data_port::MarketDataPort;
use stockscope::ports::symbol_directory_port::SymbolDirectoryPort;

pub struct MockMarketData {
    pub quotes: HashMap<String, QuoteSnapshot>,
    pub bars: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    /// Periods whose history request fails for every symbol.
    pub failing_periods: Vec<LookbackPeriod>,
    pub requests: RefCell<Vec<(String, LookbackPeriod)>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            quotes: HashMap::new(),
            bars: HashMap::new(),
            errors: HashMap::new(),
            failing_periods: Vec::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_quote(mut self, quote: QuoteSnapshot) -> Self {
        self.quotes.insert(quote.symbol.clone(), quote);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn failing_for(mut self, period: LookbackPeriod) -> Self {
        self.failing_periods.push(period);
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_quote(&self, symbol: &str) -> Result<QuoteSnapshot, StockError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StockError::network(symbol, reason));
        }
        Ok(self
            .quotes
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| QuoteSnapshot::new(symbol)))
    }

    fn fetch_history(
        &self,
        symbol: &str,
        period: LookbackPeriod,
    ) -> Result<PriceSeries, StockError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), period));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StockError::network(symbol, reason));
        }
        if self.failing_periods.contains(&period) {
            return Err(StockError::network(symbol, format!("{period} unavailable")));
        }
        let bars = self.bars.get(symbol).cloned().unwrap_or_default();
        let mut series = PriceSeries::new(symbol, bars);
        if let Some(start) = series.bars.last().and_then(|b| period.start_from(b.date)) {
            series.bars.retain(|b| b.date >= start);
        }
        Ok(series)
    }
}

pub struct MockSymbolDirectory {
    pub result: Result<Vec<String>, String>,
}

impl MockSymbolDirectory {
    pub fn with_symbols(symbols: &[&str]) -> Self {
        Self {
            result: Ok(symbols.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(reason.to_string()),
        }
    }
}

impl SymbolDirectoryPort for MockSymbolDirectory {
    fn fetch_symbols(&self) -> Result<Vec<String>, StockError> {
        self.result
            .clone()
            .map_err(|reason| StockError::network("directory", reason))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Daily bars with closes rising by `step` from `start_price`.
pub fn generate_bars(start_date: &str, count: usize, start_price: f64, step: f64) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = start_price + i as f64 * step;
            PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: close - step / 2.0,
                high: close.max(close - step / 2.0) + 1.0,
                low: close.min(close - step / 2.0) - 1.0,
                close,
                volume: 1000 + i as u64,
            }
        })
        .collect()
}

pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        })
        .collect()
}

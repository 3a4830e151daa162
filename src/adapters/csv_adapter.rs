//! CSV file data adapter for offline use.
//!
//! Reads `<SYMBOL>.csv` files (header `date,open,high,low,close,volume`) from
//! one directory and serves them as both market data and symbol directory.

use crate::domain::error::StockError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::domain::period::LookbackPeriod;
use crate::domain::quote::QuoteSnapshot;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::symbol_directory_port::SymbolDirectoryPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_all(&self, symbol: &str) -> Result<PriceSeries, StockError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            StockError::network(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record =
                result.map_err(|e| StockError::network(symbol, format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| StockError::network(symbol, "missing date column"))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                StockError::network(symbol, format!("invalid date format: {}", e))
            })?;

            bars.push(PriceBar {
                date,
                open: field(&record, 1, "open", symbol)?,
                high: field(&record, 2, "high", symbol)?,
                low: field(&record, 3, "low", symbol)?,
                close: field(&record, 4, "close", symbol)?,
                volume: field(&record, 5, "volume", symbol)?,
            });
        }

        Ok(PriceSeries::new(symbol, bars))
    }
}

fn field<T>(record: &csv::StringRecord, index: usize, name: &str, symbol: &str) -> Result<T, StockError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| StockError::network(symbol, format!("missing {} column", name)))?
        .trim()
        .parse()
        .map_err(|e| StockError::network(symbol, format!("invalid {} value: {}", name, e)))
}

impl MarketDataPort for CsvAdapter {
    fn fetch_quote(&self, symbol: &str) -> Result<QuoteSnapshot, StockError> {
        let series = self.read_all(symbol)?;
        let year = match series.bars.last() {
            Some(last) => {
                let start = LookbackPeriod::OneYear.start_from(last.date);
                series
                    .bars
                    .iter()
                    .filter(|b| start.is_none_or(|s| b.date >= s))
                    .collect::<Vec<_>>()
            }
            None => Vec::new(),
        };

        Ok(QuoteSnapshot {
            current_price: series.last_close(),
            previous_close: series.previous_close(),
            fifty_two_week_high: year.iter().map(|b| b.high).reduce(f64::max),
            fifty_two_week_low: year.iter().map(|b| b.low).reduce(f64::min),
            ..QuoteSnapshot::new(symbol)
        })
    }

    fn fetch_history(
        &self,
        symbol: &str,
        period: LookbackPeriod,
    ) -> Result<PriceSeries, StockError> {
        let mut series = self.read_all(symbol)?;
        if let Some(start) = series.bars.last().and_then(|b| period.start_from(b.date)) {
            series.bars.retain(|b| b.date >= start);
        }
        Ok(series)
    }
}

impl SymbolDirectoryPort for CsvAdapter {
    fn fetch_symbols(&self) -> Result<Vec<String>, StockError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            StockError::network(
                "directory",
                format!("failed to read directory {}: {}", self.base_path.display(), e),
            )
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                StockError::network("directory", format!("directory entry error: {}", e))
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

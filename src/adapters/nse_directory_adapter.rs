//! Exchange equity list adapter.
//!
//! Downloads the NSE `EQUITY_L.csv` listing and qualifies each `SYMBOL`
//! entry with the configured exchange suffix.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::adapters::yahoo_adapter::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::domain::error::StockError;
use crate::domain::symbols::{qualify, DEFAULT_SUFFIX};
use crate::ports::config_port::ConfigPort;
use crate::ports::symbol_directory_port::SymbolDirectoryPort;

pub const DEFAULT_DIRECTORY_URL: &str =
    "https://archives.nseindia.com/content/equities/EQUITY_L.csv";

const SYMBOL_COLUMN: &str = "SYMBOL";

pub struct NseDirectoryAdapter {
    http: Client,
    url: String,
    suffix: String,
}

impl NseDirectoryAdapter {
    pub fn new(
        url: &str,
        suffix: &str,
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, StockError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| StockError::network("directory", format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            url: url.to_string(),
            suffix: suffix.to_string(),
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockError> {
        let url = config
            .get_string("symbols", "directory_url")
            .unwrap_or_else(|| DEFAULT_DIRECTORY_URL.to_string());
        let suffix = config
            .get_string("symbols", "suffix")
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string());
        let user_agent = config
            .get_string("provider", "user_agent")
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let timeout_secs = config.get_int("provider", "timeout_secs", DEFAULT_TIMEOUT_SECS as i64);
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs as u64));

        Self::new(&url, &suffix, &user_agent, timeout)
    }
}

impl SymbolDirectoryPort for NseDirectoryAdapter {
    fn fetch_symbols(&self) -> Result<Vec<String>, StockError> {
        tracing::debug!(url = %self.url, "downloading symbol directory");
        let body = self
            .http
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| StockError::network("directory", e))?;

        parse_directory_csv(&body, &self.suffix)
    }
}

/// Symbols from the `SYMBOL` column, in file order, suffix-qualified.
pub fn parse_directory_csv(content: &str, suffix: &str) -> Result<Vec<String>, StockError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| StockError::network("directory", format!("CSV parse error: {e}")))?;
    let column = headers
        .iter()
        .position(|h| h == SYMBOL_COLUMN)
        .ok_or_else(|| StockError::network("directory", "missing SYMBOL column"))?;

    let mut symbols = Vec::new();
    for record in rdr.records() {
        let record =
            record.map_err(|e| StockError::network("directory", format!("CSV parse error: {e}")))?;
        match record.get(column) {
            Some(symbol) if !symbol.is_empty() => symbols.push(qualify(symbol, suffix)),
            _ => {}
        }
    }
    Ok(symbols)
}

//! Yahoo Finance market data adapter.
//!
//! History and the core quote fields come from the v8 chart endpoint; market
//! cap, trailing P/E, sector and the previous session's close come from the
//! v10 quoteSummary endpoint. quoteSummary needs a session cookie and a crumb,
//! which are fetched once per quote. All requests are blocking.

use std::time::Duration;

use chrono::DateTime;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::error::StockError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::domain::period::LookbackPeriod;
use crate::domain::quote::QuoteSnapshot;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Any response from this host sets the session cookie the crumb is tied to.
pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";

/// The chart range used when only the quote fields are needed.
const QUOTE_RANGE: &str = "5d";
const SUMMARY_MODULES: &str = "price,summaryDetail,assetProfile";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ChartMeta {
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    /// Only present on single-day ranges; `chartPreviousClose` is the close
    /// before the requested window and is never a substitute.
    previous_close: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// A rejected request (bad or missing crumb) answers with a `finance` error
/// object instead of `quoteSummary`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    #[serde(default)]
    quote_summary: Option<SummaryEnvelope>,
    #[serde(default)]
    finance: Option<FinanceEnvelope>,
}

#[derive(Debug, Deserialize)]
struct FinanceEnvelope {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    result: Option<Vec<SummaryData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryData {
    price: SummaryPrice,
    summary_detail: SummaryDetail,
    asset_profile: AssetProfile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryPrice {
    long_name: Option<String>,
    market_cap: RawValue,
    regular_market_price: RawValue,
    regular_market_previous_close: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryDetail {
    market_cap: RawValue,
    #[serde(rename = "trailingPE")]
    trailing_pe: RawValue,
    previous_close: RawValue,
    fifty_two_week_high: RawValue,
    fifty_two_week_low: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AssetProfile {
    sector: Option<String>,
}

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`, or `{}` when absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawValue {
    raw: Option<f64>,
}

pub struct YahooAdapter {
    http: Client,
    base_url: String,
    cookie_url: String,
}

impl YahooAdapter {
    /// `timeout` of `None` waits indefinitely.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, StockError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| StockError::network("provider", format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie_url: DEFAULT_COOKIE_URL.to_string(),
        })
    }

    pub fn with_cookie_url(mut self, cookie_url: &str) -> Self {
        self.cookie_url = cookie_url.to_string();
        self
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockError> {
        let base_url = config
            .get_string("provider", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let user_agent = config
            .get_string("provider", "user_agent")
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let timeout_secs = config.get_int("provider", "timeout_secs", DEFAULT_TIMEOUT_SECS as i64);
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs as u64));

        let adapter = Self::new(&base_url, &user_agent, timeout)?;
        Ok(match config.get_string("provider", "cookie_url") {
            Some(cookie_url) => adapter.with_cookie_url(&cookie_url),
            None => adapter,
        })
    }

    /// `segments` are percent-encoded individually, so a `/` in a symbol
    /// stays inside its segment.
    fn endpoint(&self, segments: &[&str], symbol: &str) -> Result<Url, StockError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StockError::network(symbol, format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| StockError::network(symbol, "base url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn chart_url(&self, symbol: &str, range: &str) -> Result<Url, StockError> {
        let mut url = self.endpoint(&["v8", "finance", "chart", symbol], symbol)?;
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("interval", "1d");
        Ok(url)
    }

    fn summary_url(&self, symbol: &str, crumb: Option<&str>) -> Result<Url, StockError> {
        let mut url = self.endpoint(&["v10", "finance", "quoteSummary", symbol], symbol)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("modules", SUMMARY_MODULES);
            if let Some(crumb) = crumb {
                query.append_pair("crumb", crumb);
            }
        }
        Ok(url)
    }

    fn crumb_url(&self, symbol: &str) -> Result<Url, StockError> {
        self.endpoint(&["v1", "test", "getcrumb"], symbol)
    }

    /// Prime the cookie store, then ask for the crumb bound to that cookie.
    fn fetch_crumb(&self, symbol: &str) -> Result<String, StockError> {
        // The cookie host answers 404; only its Set-Cookie header matters.
        if let Err(e) = self.http.get(&self.cookie_url).send() {
            tracing::debug!(error = %e, "cookie request failed");
        }

        let url = self.crumb_url(symbol)?;
        tracing::debug!(%url, "GET");
        let body = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| StockError::network(symbol, format!("crumb request failed: {e}")))?;
        parse_crumb(&body).ok_or_else(|| StockError::network(symbol, "no crumb returned"))
    }

    fn fetch_summary(&self, symbol: &str) -> Result<QuoteSnapshot, StockError> {
        let crumb = match self.fetch_crumb(symbol) {
            Ok(crumb) => Some(crumb),
            Err(e) => {
                tracing::debug!(symbol, error = %e, "requesting quote summary without a crumb");
                None
            }
        };
        let url = self.summary_url(symbol, crumb.as_deref())?;
        let body = self.get_text(url, symbol)?;
        parse_summary(&body, symbol)
    }

    /// Response body regardless of status; Yahoo reports bad symbols as JSON errors.
    fn get_text(&self, url: Url, symbol: &str) -> Result<String, StockError> {
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| StockError::network(symbol, e))?;
        let status = response.status();
        let body = response.text().map_err(|e| StockError::network(symbol, e))?;
        if !status.is_success() && !body.trim_start().starts_with('{') {
            return Err(StockError::network(symbol, format!("HTTP {status}")));
        }
        Ok(body)
    }

    fn fetch_chart(&self, symbol: &str, range: &str) -> Result<(QuoteSnapshot, PriceSeries), StockError> {
        let url = self.chart_url(symbol, range)?;
        let body = self.get_text(url, symbol)?;
        parse_chart(&body, symbol)
    }
}

fn parse_chart(json: &str, symbol: &str) -> Result<(QuoteSnapshot, PriceSeries), StockError> {
    let response: ChartResponse = serde_json::from_str(json)
        .map_err(|e| StockError::network(symbol, format!("parse error: {e}")))?;

    if let Some(error) = response.chart.error {
        return Err(StockError::network(
            symbol,
            format!("API error [{}]: {}", error.code, error.description),
        ));
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| StockError::network(symbol, "no data returned"))?;

    let meta = data.meta;
    let quote_data = data
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(data.timestamp.len());
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let open = quote_data.open.get(i).copied().flatten();
        let high = quote_data.high.get(i).copied().flatten();
        let low = quote_data.low.get(i).copied().flatten();
        let close = quote_data.close.get(i).copied().flatten();
        let volume = quote_data.volume.get(i).copied().flatten().unwrap_or(0);

        // Bars with any missing price are holidays or halted sessions.
        let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + meta.gmtoffset, 0).map(|dt| dt.date_naive())
        else {
            continue;
        };

        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    let series = PriceSeries::new(symbol, bars);
    // The last bar is the current session, so the one before it closed the previous one.
    let prior_bar_close = series
        .len()
        .checked_sub(2)
        .and_then(|i| series.bars.get(i))
        .map(|bar| bar.close);
    let quote = QuoteSnapshot {
        long_name: meta.long_name.or(meta.short_name),
        current_price: meta.regular_market_price,
        previous_close: meta.previous_close.or(prior_bar_close),
        fifty_two_week_high: meta.fifty_two_week_high,
        fifty_two_week_low: meta.fifty_two_week_low,
        ..QuoteSnapshot::new(symbol)
    };

    Ok((quote, series))
}

fn parse_summary(json: &str, symbol: &str) -> Result<QuoteSnapshot, StockError> {
    let response: SummaryResponse = serde_json::from_str(json)
        .map_err(|e| StockError::network(symbol, format!("parse error: {e}")))?;

    let Some(envelope) = response.quote_summary else {
        return Err(match response.finance.and_then(|f| f.error) {
            Some(error) => StockError::network(
                symbol,
                format!("API error [{}]: {}", error.code, error.description),
            ),
            None => StockError::network(symbol, "no summary returned"),
        });
    };

    if let Some(error) = envelope.error {
        return Err(StockError::network(
            symbol,
            format!("API error [{}]: {}", error.code, error.description),
        ));
    }

    let data = envelope
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| StockError::network(symbol, "no summary returned"))?;

    Ok(QuoteSnapshot {
        long_name: data.price.long_name,
        sector: data.asset_profile.sector,
        current_price: data.price.regular_market_price.raw,
        previous_close: data
            .summary_detail
            .previous_close
            .raw
            .or(data.price.regular_market_previous_close.raw),
        fifty_two_week_high: data.summary_detail.fifty_two_week_high.raw,
        fifty_two_week_low: data.summary_detail.fifty_two_week_low.raw,
        market_cap: data.price.market_cap.raw.or(data.summary_detail.market_cap.raw),
        trailing_pe: data.summary_detail.trailing_pe.raw,
        ..QuoteSnapshot::new(symbol)
    })
}

/// A crumb is a short opaque token; an HTML or JSON body means the request was refused.
fn parse_crumb(body: &str) -> Option<String> {
    let crumb = body.trim();
    let valid = !crumb.is_empty()
        && crumb.len() <= 64
        && !crumb.contains(|c: char| c.is_whitespace() || matches!(c, '<' | '{'));
    valid.then(|| crumb.to_string())
}

/// Chart fields first, gaps filled from the summary. The previous close is
/// the exception: the summary's is the last session's close, while the chart
/// only approximates it from its bars.
fn combine(chart: QuoteSnapshot, summary: QuoteSnapshot) -> QuoteSnapshot {
    let previous_close = summary.previous_close.or(chart.previous_close);
    QuoteSnapshot {
        previous_close,
        ..chart.merge(summary)
    }
}

impl MarketDataPort for YahooAdapter {
    fn fetch_quote(&self, symbol: &str) -> Result<QuoteSnapshot, StockError> {
        let (quote, _) = self.fetch_chart(symbol, QUOTE_RANGE)?;

        match self.fetch_summary(symbol) {
            Ok(summary) => Ok(combine(quote, summary)),
            Err(e) => {
                tracing::warn!(symbol, error = %e, "quote summary unavailable; fundamentals omitted");
                Ok(quote)
            }
        }
    }

    fn fetch_history(
        &self,
        symbol: &str,
        period: LookbackPeriod,
    ) -> Result<PriceSeries, StockError> {
        let (_, series) = self.fetch_chart(symbol, period.as_str())?;
        tracing::debug!(symbol, %period, bars = series.len(), "chart history parsed");
        Ok(series)
    }
}

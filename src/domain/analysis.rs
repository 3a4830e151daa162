//! Fetch-and-compute pipelines behind the `analyze` and `dashboard` commands.

use crate::domain::error::StockError;
use crate::domain::indicator::IndicatorType;
use crate::domain::metrics::{
    listing_summary, DerivedMetrics, ListingSummary, MetricsConfig, Trend, EMA_PERIOD, RSI_PERIOD,
    SMA_PERIOD,
};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::period::LookbackPeriod;
use crate::domain::quote::{format_market_cap_crore, pe_rating_label, QuoteSnapshot};
use crate::domain::report::{fmt_opt, ReportData};
use crate::ports::market_data_port::MarketDataPort;

#[derive(Debug, Clone, Copy)]
pub struct AnalysisConfig {
    pub history_period: LookbackPeriod,
    pub chart_period: LookbackPeriod,
    pub dashboard_period: LookbackPeriod,
    pub metrics: MetricsConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            history_period: LookbackPeriod::SixMonths,
            chart_period: LookbackPeriod::FifteenDays,
            dashboard_period: LookbackPeriod::OneYear,
            metrics: MetricsConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StockAnalysis {
    pub symbol: String,
    pub quote: QuoteSnapshot,
    pub history: PriceSeries,
    pub metrics: DerivedMetrics,
    pub listing: ListingSummary,
}

pub fn analyze(
    port: &dyn MarketDataPort,
    symbol: &str,
    config: &AnalysisConfig,
) -> Result<StockAnalysis, StockError> {
    let quote = port.fetch_quote(symbol)?;
    let history = port.fetch_history(symbol, config.history_period)?;
    tracing::info!(symbol, bars = history.len(), period = %config.history_period, "history fetched");

    if history.is_empty() {
        return Err(StockError::InsufficientData {
            symbol: symbol.to_string(),
            bars: 0,
            minimum: 1,
        });
    }

    let full_history = match port.fetch_history(symbol, LookbackPeriod::Max) {
        Ok(series) => series,
        Err(e) => {
            tracing::warn!(symbol, error = %e, "full history unavailable; listing details omitted");
            PriceSeries::empty(symbol)
        }
    };

    let metrics = DerivedMetrics::compute(&history, Some(&quote), &config.metrics);
    let current = quote.current_price.or_else(|| history.last_close());
    let listing = listing_summary(&full_history, current);

    Ok(StockAnalysis {
        symbol: symbol.to_string(),
        quote,
        history,
        metrics,
        listing,
    })
}

fn rupees(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("₹{v}"),
        None => "N/A".to_string(),
    }
}

pub fn build_report_data(analysis: &StockAnalysis) -> ReportData {
    let quote = &analysis.quote;
    let metrics = &analysis.metrics;
    let listing = &analysis.listing;
    let current = quote
        .current_price
        .or_else(|| analysis.history.last_close());

    let listing_date = listing
        .date
        .map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let pe = quote
        .trailing_pe
        .map(|pe| format!("{pe:.2}"))
        .unwrap_or_else(|| "N/A".to_string());

    let trend = match metrics.trend {
        Some(Trend::Up) => "UP TREND",
        Some(Trend::Down) => "DOWN TREND",
        None => "N/A",
    };

    let performance: Vec<String> = metrics
        .returns
        .iter()
        .map(|r| format!("{} : {} %", r.label, fmt_opt(r.pct, 2)))
        .collect();

    let score = metrics
        .score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    ReportData::new()
        .section(
            "STOCK REPORT",
            [
                format!("Stock : {}", analysis.symbol),
                format!("Current Price : {}", rupees(current)),
                format!("Momentum : {} %", fmt_opt(metrics.momentum, 2)),
            ],
        )
        .section(
            "LISTING DETAILS",
            [
                format!("Listing Date : {listing_date}"),
                format!("Listing Price : {}", rupees(listing.price)),
                format!("Return Since Listing : {} %", fmt_opt(listing.return_pct, 2)),
            ],
        )
        .section(
            "FUNDAMENTALS",
            [
                format!("Market Cap : {}", format_market_cap_crore(quote.market_cap)),
                format!("P/E Ratio : {pe} ({})", pe_rating_label(quote.trailing_pe)),
            ],
        )
        .section(
            "TECHNICALS",
            [
                format!("{} : {}", IndicatorType::Sma(SMA_PERIOD), fmt_opt(metrics.latest_sma(), 2)),
                format!("{} : {}", IndicatorType::Ema(EMA_PERIOD), fmt_opt(metrics.latest_ema(), 2)),
                format!("{} : {}", IndicatorType::Rsi(RSI_PERIOD), fmt_opt(metrics.latest_rsi(), 2)),
                format!("Trend : {trend}"),
            ],
        )
        .section("PERFORMANCE", performance)
        .section(
            "RECOMMENDATION FOR BUYING",
            [
                format!("Overall Score : {score} %"),
                "Heuristic: +40 close above SMA(20), +40 close above EMA(20), +20 RSI(14) below 70"
                    .to_string(),
            ],
        )
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub quote: QuoteSnapshot,
    pub history: PriceSeries,
    pub trend: Option<Trend>,
}

pub fn dashboard(
    port: &dyn MarketDataPort,
    symbol: &str,
    period: LookbackPeriod,
) -> Result<Dashboard, StockError> {
    let quote = port.fetch_quote(symbol)?;
    let history = port.fetch_history(symbol, period)?;
    tracing::info!(symbol, bars = history.len(), %period, "dashboard data fetched");

    if history.len() < 2 {
        return Err(StockError::InsufficientData {
            symbol: symbol.to_string(),
            bars: history.len(),
            minimum: 2,
        });
    }

    let trend = crate::domain::metrics::trend(&history);
    Ok(Dashboard {
        quote,
        history,
        trend,
    })
}

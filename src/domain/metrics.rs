//! Derived metrics calculator.
//!
//! Produces momentum, SMA(20), EMA(20), RSI(14), the composite buy score,
//! trailing returns and the trend flag for one price series. Every field
//! degrades to `None` on insufficient data or an arithmetic fault; the
//! calculator itself never fails.

use std::fmt;

use crate::domain::indicator::ema::{calculate_ema, EmaSeed};
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::quote::QuoteSnapshot;

pub const SMA_PERIOD: usize = 20;
pub const EMA_PERIOD: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const RSI_OVERBOUGHT: f64 = 70.0;

pub const SCORE_ABOVE_SMA: u8 = 40;
pub const SCORE_ABOVE_EMA: u8 = 40;
pub const SCORE_RSI_NOT_OVERBOUGHT: u8 = 20;
pub const SCORE_MAX: u8 = 100;

/// Trailing return windows in trading days with their report labels.
pub const TRAILING_WINDOWS: [(usize, &str); 3] =
    [(21, "1 Month"), (63, "3 Month"), (126, "6 Month")];

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsConfig {
    pub ema_seed: EmaSeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "UP TREND"),
            Trend::Down => write!(f, "DOWN TREND"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrailingReturn {
    pub bars: usize,
    pub label: &'static str,
    pub pct: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct DerivedMetrics {
    pub momentum: Option<f64>,
    pub sma: IndicatorSeries,
    pub ema: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub score: Option<u8>,
    pub returns: Vec<TrailingReturn>,
    pub trend: Option<Trend>,
}

impl DerivedMetrics {
    /// Current and previous close come from the quote when present, else from the series.
    pub fn compute(
        series: &PriceSeries,
        quote: Option<&QuoteSnapshot>,
        config: &MetricsConfig,
    ) -> Self {
        let current = quote
            .and_then(|q| q.current_price)
            .or_else(|| series.last_close());
        let previous = quote
            .and_then(|q| q.previous_close)
            .or_else(|| series.previous_close());

        let sma = calculate_sma(&series.bars, SMA_PERIOD);
        let ema = calculate_ema(&series.bars, EMA_PERIOD, config.ema_seed);
        let rsi = calculate_rsi(&series.bars, RSI_PERIOD);

        let score = score_from_latest(series.last_close(), sma.latest(), ema.latest(), rsi.latest());

        let closes = series.closes();
        let returns = TRAILING_WINDOWS
            .iter()
            .map(|&(bars, label)| TrailingReturn {
                bars,
                label,
                pct: trailing_return(&closes, bars),
            })
            .collect();

        Self {
            momentum: momentum(current, previous),
            sma,
            ema,
            rsi,
            score,
            returns,
            trend: trend(series),
        }
    }

    pub fn latest_sma(&self) -> Option<f64> {
        self.sma.latest()
    }

    pub fn latest_ema(&self) -> Option<f64> {
        self.ema.latest()
    }

    pub fn latest_rsi(&self) -> Option<f64> {
        self.rsi.latest()
    }

    pub fn trailing(&self, bars: usize) -> Option<f64> {
        self.returns
            .iter()
            .find(|r| r.bars == bars)
            .and_then(|r| r.pct)
    }
}

/// Round to 2 decimals; non-finite input is not available.
pub fn round2(value: f64) -> Option<f64> {
    value.is_finite().then(|| (value * 100.0).round() / 100.0)
}

fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 || !from.is_finite() || !to.is_finite() {
        return None;
    }
    round2((to - from) / from * 100.0)
}

/// (current - previous) / previous * 100, rounded to 2 decimals.
pub fn momentum(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    pct_change(previous?, current?)
}

/// Percentage return from `closes[len - window]` to the last close.
pub fn trailing_return(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    let reference = closes[closes.len() - window];
    pct_change(reference, *closes.last()?)
}

/// Heuristic 0-100 buy score. Not a validated trading signal.
pub fn composite_score(close: f64, sma: f64, ema: f64, rsi: f64) -> u8 {
    let mut score: u8 = 0;
    if close > sma {
        score += SCORE_ABOVE_SMA;
    }
    if close > ema {
        score += SCORE_ABOVE_EMA;
    }
    if rsi < RSI_OVERBOUGHT {
        score += SCORE_RSI_NOT_OVERBOUGHT;
    }
    score.min(SCORE_MAX)
}

pub fn score_from_latest(
    close: Option<f64>,
    sma: Option<f64>,
    ema: Option<f64>,
    rsi: Option<f64>,
) -> Option<u8> {
    Some(composite_score(close?, sma?, ema?, rsi?))
}

pub fn trend(series: &PriceSeries) -> Option<Trend> {
    let last = series.last_close()?;
    let previous = series.previous_close()?;
    Some(if last > previous { Trend::Up } else { Trend::Down })
}

/// Listing details taken from the first bar of the full history.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSummary {
    pub date: Option<chrono::NaiveDate>,
    pub price: Option<f64>,
    pub return_pct: Option<f64>,
}

pub fn listing_summary(full_history: &PriceSeries, current: Option<f64>) -> ListingSummary {
    let first = full_history.first();
    let price = first.and_then(|b| round2(b.open));
    ListingSummary {
        date: first.map(|b| b.date),
        price,
        return_pct: price.and_then(|p| pct_change(p, current?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceBar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series_from(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            "TEST.NS",
            closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PriceBar {
                    date: start + chrono::Duration::days(i as i64),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10_000,
                })
                .collect(),
        )
    }

    #[test]
    fn momentum_basic() {
        assert_eq!(momentum(Some(110.0), Some(100.0)), Some(10.0));
        assert_eq!(momentum(Some(99.0), Some(100.0)), Some(-1.0));
    }

    #[test]
    fn momentum_rounds_to_two_decimals() {
        assert_eq!(momentum(Some(100.0), Some(3.0)), Some(3233.33));
    }

    #[test]
    fn momentum_not_available_without_previous() {
        assert_eq!(momentum(Some(110.0), Some(0.0)), None);
        assert_eq!(momentum(Some(110.0), None), None);
        assert_eq!(momentum(None, Some(100.0)), None);
    }

    #[test]
    fn trailing_return_exact_window() {
        let mut closes = vec![100.0; 21];
        closes[20] = 121.0;
        assert_eq!(trailing_return(&closes, 21), Some(21.0));
    }

    #[test]
    fn trailing_return_short_series() {
        let closes = vec![100.0; 20];
        assert_eq!(trailing_return(&closes, 21), None);
        assert_eq!(trailing_return(&[], 21), None);
        assert_eq!(trailing_return(&closes, 0), None);
    }

    #[test]
    fn trailing_return_zero_reference() {
        let mut closes = vec![0.0; 21];
        closes[20] = 5.0;
        assert_eq!(trailing_return(&closes, 21), None);
    }

    #[test]
    fn composite_score_components() {
        assert_eq!(composite_score(110.0, 100.0, 100.0, 50.0), 100);
        assert_eq!(composite_score(110.0, 100.0, 120.0, 50.0), 60);
        assert_eq!(composite_score(90.0, 100.0, 100.0, 50.0), 20);
        assert_eq!(composite_score(90.0, 100.0, 100.0, 70.0), 0);
        assert_eq!(composite_score(110.0, 100.0, 100.0, 75.0), 80);
    }

    #[test]
    fn score_requires_all_inputs() {
        assert_eq!(score_from_latest(Some(1.0), Some(1.0), None, Some(50.0)), None);
        assert_eq!(score_from_latest(Some(2.0), Some(1.0), Some(1.0), Some(50.0)), Some(100));
    }

    #[test]
    fn trend_up_and_down() {
        assert_eq!(trend(&series_from(&[10.0, 11.0])), Some(Trend::Up));
        assert_eq!(trend(&series_from(&[10.0, 10.0])), Some(Trend::Down));
        assert_eq!(trend(&series_from(&[10.0])), None);
        assert_eq!(Trend::Up.to_string(), "UP TREND");
    }

    #[test]
    fn compute_on_short_series_marks_fields_unavailable() {
        let series = series_from(&[100.0, 101.0, 102.0]);
        let metrics = DerivedMetrics::compute(&series, None, &MetricsConfig::default());

        assert_eq!(metrics.latest_sma(), None);
        assert_eq!(metrics.latest_ema(), None);
        assert_eq!(metrics.latest_rsi(), None);
        assert_eq!(metrics.score, None);
        assert!(metrics.returns.iter().all(|r| r.pct.is_none()));
        assert_eq!(metrics.momentum, Some(0.99));
    }

    #[test]
    fn compute_on_empty_series() {
        let metrics =
            DerivedMetrics::compute(&PriceSeries::empty("X"), None, &MetricsConfig::default());
        assert_eq!(metrics.momentum, None);
        assert_eq!(metrics.score, None);
        assert_eq!(metrics.trend, None);
        assert_eq!(metrics.returns.len(), 3);
    }

    #[test]
    fn compute_prefers_quote_prices_for_momentum() {
        let series = series_from(&[100.0, 101.0]);
        let quote = QuoteSnapshot {
            current_price: Some(110.0),
            previous_close: Some(100.0),
            ..QuoteSnapshot::new("TEST.NS")
        };
        let metrics = DerivedMetrics::compute(&series, Some(&quote), &MetricsConfig::default());
        assert_eq!(metrics.momentum, Some(10.0));
    }

    #[test]
    fn compute_rising_series_full_score() {
        let closes: Vec<f64> = (0..130).map(|i| 100.0 + i as f64).collect();
        let series = series_from(&closes);
        let metrics = DerivedMetrics::compute(&series, None, &MetricsConfig::default());

        // Steady gains: close above both averages, RSI pinned at 100.
        assert_relative_eq!(metrics.latest_rsi().unwrap(), 100.0);
        assert_eq!(metrics.score, Some(80));
        assert_eq!(metrics.trailing(21), Some(round2(229.0 / 209.0 * 100.0 - 100.0).unwrap()));
        assert!(metrics.trailing(126).is_some());
        assert_eq!(metrics.trend, Some(Trend::Up));
    }

    #[test]
    fn ema_seed_config_is_honoured() {
        let series = series_from(&[100.0, 101.0, 102.0]);
        let config = MetricsConfig {
            ema_seed: EmaSeed::FirstClose,
        };
        let metrics = DerivedMetrics::compute(&series, None, &config);
        assert!(metrics.latest_ema().is_some());
        assert_eq!(metrics.latest_sma(), None);
        assert_eq!(metrics.score, None);
    }

    #[test]
    fn listing_summary_from_first_bar() {
        let series = series_from(&[50.0, 60.0, 70.0]);
        let listing = listing_summary(&series, Some(99.0));

        assert_eq!(listing.date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(listing.price, Some(49.5));
        assert_eq!(listing.return_pct, Some(100.0));
    }

    #[test]
    fn listing_summary_empty_history() {
        let listing = listing_summary(&PriceSeries::empty("X"), Some(10.0));
        assert_eq!(listing.date, None);
        assert_eq!(listing.price, None);
        assert_eq!(listing.return_pct, None);
    }
}

//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//!
//! Two seedings are supported:
//! - `EmaSeed::Sma`: seed with the SMA of the first n closes; first (n-1) bars are invalid.
//! - `EmaSeed::FirstClose`: seed with the first close; every bar is valid.

use std::fmt;
use std::str::FromStr;

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmaSeed {
    #[default]
    Sma,
    FirstClose,
}

impl FromStr for EmaSeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sma" => Ok(EmaSeed::Sma),
            "first_close" => Ok(EmaSeed::FirstClose),
            other => Err(format!("unknown ema seed '{other}' (expected sma or first_close)")),
        }
    }
}

impl fmt::Display for EmaSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmaSeed::Sma => write!(f, "sma"),
            EmaSeed::FirstClose => write!(f, "first_close"),
        }
    }
}

pub fn calculate_ema(bars: &[PriceBar], period: usize, seed: EmaSeed) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Ema(period));
    }

    let values = match seed {
        EmaSeed::Sma => sma_seeded(bars, period),
        EmaSeed::FirstClose => first_close_seeded(bars, period),
    };

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

fn smoothing(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

fn sma_seeded(bars: &[PriceBar], period: usize) -> Vec<IndicatorPoint> {
    let k = smoothing(period);
    let mut values = Vec::with_capacity(bars.len());
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < period - 1 {
            sum += bar.close;
            values.push(IndicatorPoint::invalid(bar.date));
        } else if i == period - 1 {
            sum += bar.close;
            ema = sum / period as f64;
            values.push(IndicatorPoint::valid(bar.date, ema));
        } else {
            ema = bar.close * k + ema * (1.0 - k);
            values.push(IndicatorPoint::valid(bar.date, ema));
        }
    }

    values
}

fn first_close_seeded(bars: &[PriceBar], period: usize) -> Vec<IndicatorPoint> {
    let k = smoothing(period);
    let mut ema = bars[0].close;

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i > 0 {
                ema = bar.close * k + ema * (1.0 - k);
            }
            IndicatorPoint::valid(bar.date, ema)
        })
        .collect()
}

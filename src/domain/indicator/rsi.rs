//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses simple rolling means over the trailing n price changes:
//! - avg_gain = mean of max(change, 0)
//! - avg_loss = mean of max(-change, 0)
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are invalid (need n price changes).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < 2 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values: bars.iter().map(|b| IndicatorPoint::invalid(b.date)).collect(),
        };
    }

    let mut gains: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    for pair in bars.windows(2) {
        let change = pair[1].close - pair[0].close;
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let mut values = Vec::with_capacity(bars.len());
    values.push(IndicatorPoint::invalid(bars[0].date));

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;

    for (i, bar) in bars.iter().enumerate().skip(1) {
        let idx = i - 1;
        gain_sum += gains[idx];
        loss_sum += losses[idx];
        if idx >= period {
            gain_sum -= gains[idx - period];
            loss_sum -= losses[idx - period];
        }

        if idx + 1 < period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        // Rolling sums drift below zero by rounding error on flat stretches.
        let avg_gain = (gain_sum / period as f64).max(0.0);
        let avg_loss = (loss_sum / period as f64).max(0.0);
        values.push(IndicatorPoint::valid(bar.date, rsi_value(avg_gain, avg_loss)));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= f64::EPSILON {
        return 100.0;
    }
    let rsi = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));
    rsi.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bar(date: NaiveDate, close: f64) -> PriceBar {
        PriceBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        }
    }

    fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| make_bar(start + chrono::Duration::days(i as i64), c))
            .collect()
    }

    #[test]
    fn rsi_empty_bars() {
        let series = calculate_rsi(&[], 14);
        assert_eq!(series.values.len(), 0);
    }

    #[test]
    fn rsi_single_bar() {
        let series = calculate_rsi(&make_bars(&[100.0]), 14);
        assert_eq!(series.values.len(), 1);
        assert!(!series.values[0].valid);
    }

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let series = calculate_rsi(&make_bars(&closes), 14);

        assert_eq!(series.values.len(), 15);
        for i in 0..14 {
            assert!(!series.values[i].valid, "Bar {} should be invalid", i);
        }
        assert!(series.values[14].valid, "Bar 14 should be valid");
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&make_bars(&closes), 14);
        assert_relative_eq!(series.latest().unwrap(), 100.0);
    }

    #[test]
    fn rsi_flat_prices_use_zero_loss_policy() {
        let series = calculate_rsi(&make_bars(&[50.0; 16]), 14);
        assert_relative_eq!(series.latest().unwrap(), 100.0);
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&make_bars(&closes), 14);
        assert_relative_eq!(series.latest().unwrap(), 0.0);
    }

    #[test]
    fn rsi_uses_simple_trailing_window() {
        // 14 changes of +1 followed by one change of -7:
        // trailing window = 13 gains of 1 and a loss of 7.
        let mut closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        closes.push(107.0);
        let series = calculate_rsi(&make_bars(&closes), 14);

        let avg_gain = 13.0 / 14.0;
        let avg_loss = 7.0 / 14.0;
        let expected = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
        assert_relative_eq!(series.latest().unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn rsi_in_range() {
        let closes: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        let series = calculate_rsi(&make_bars(&closes), 14);

        for point in series.values.iter().filter(|p| p.valid) {
            assert!((0.0..=100.0).contains(&point.value), "RSI {} out of range", point.value);
        }
    }

    #[test]
    fn rsi_zero_period() {
        let series = calculate_rsi(&make_bars(&[100.0, 101.0]), 0);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn rsi_indicator_type() {
        let series = calculate_rsi(&make_bars(&[100.0]), 14);
        assert_eq!(series.indicator_type, IndicatorType::Rsi(14));
    }
}

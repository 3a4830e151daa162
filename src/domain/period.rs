//! Named lookback windows understood by the market data provider.

use chrono::{Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookbackPeriod {
    FifteenDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    Max,
}

impl LookbackPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookbackPeriod::FifteenDays => "15d",
            LookbackPeriod::OneMonth => "1mo",
            LookbackPeriod::ThreeMonths => "3mo",
            LookbackPeriod::SixMonths => "6mo",
            LookbackPeriod::OneYear => "1y",
            LookbackPeriod::Max => "max",
        }
    }

    /// First calendar date inside the window ending at `end`; `None` for `max`.
    pub fn start_from(&self, end: NaiveDate) -> Option<NaiveDate> {
        match self {
            LookbackPeriod::FifteenDays => end.checked_sub_signed(chrono::Duration::days(15)),
            LookbackPeriod::OneMonth => end.checked_sub_months(Months::new(1)),
            LookbackPeriod::ThreeMonths => end.checked_sub_months(Months::new(3)),
            LookbackPeriod::SixMonths => end.checked_sub_months(Months::new(6)),
            LookbackPeriod::OneYear => end.checked_sub_months(Months::new(12)),
            LookbackPeriod::Max => None,
        }
    }
}

impl FromStr for LookbackPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "15d" => Ok(LookbackPeriod::FifteenDays),
            "1mo" => Ok(LookbackPeriod::OneMonth),
            "3mo" => Ok(LookbackPeriod::ThreeMonths),
            "6mo" => Ok(LookbackPeriod::SixMonths),
            "1y" => Ok(LookbackPeriod::OneYear),
            "max" => Ok(LookbackPeriod::Max),
            other => Err(format!(
                "unknown period '{other}' (expected 15d, 1mo, 3mo, 6mo, 1y or max)"
            )),
        }
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_agree() {
        for p in [
            LookbackPeriod::FifteenDays,
            LookbackPeriod::OneMonth,
            LookbackPeriod::ThreeMonths,
            LookbackPeriod::SixMonths,
            LookbackPeriod::OneYear,
            LookbackPeriod::Max,
        ] {
            assert_eq!(p.as_str().parse::<LookbackPeriod>().unwrap(), p);
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("2w".parse::<LookbackPeriod>().is_err());
        assert_eq!(" 6MO ".parse::<LookbackPeriod>().unwrap(), LookbackPeriod::SixMonths);
    }

    #[test]
    fn start_from_subtracts_window() {
        let end = NaiveDate::from_ymd_opt(2024, 8, 31).unwrap();
        assert_eq!(
            LookbackPeriod::SixMonths.start_from(end),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            LookbackPeriod::FifteenDays.start_from(end),
            NaiveDate::from_ymd_opt(2024, 8, 16)
        );
        assert_eq!(LookbackPeriod::Max.start_from(end), None);
    }
}

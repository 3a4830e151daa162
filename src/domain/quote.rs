//! Quote snapshot and display formatting for quote fields.

/// Point-in-time named fields for a symbol. Absent fields are `None`, never zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSnapshot {
    pub symbol: String,
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
}

impl QuoteSnapshot {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Fill every absent field from `other`, keeping the fields already present.
    pub fn merge(mut self, other: QuoteSnapshot) -> Self {
        self.long_name = self.long_name.or(other.long_name);
        self.sector = self.sector.or(other.sector);
        self.current_price = self.current_price.or(other.current_price);
        self.previous_close = self.previous_close.or(other.previous_close);
        self.fifty_two_week_high = self.fifty_two_week_high.or(other.fifty_two_week_high);
        self.fifty_two_week_low = self.fifty_two_week_low.or(other.fifty_two_week_low);
        self.market_cap = self.market_cap.or(other.market_cap);
        self.trailing_pe = self.trailing_pe.or(other.trailing_pe);
        self
    }
}

const CRORE: f64 = 1e7;
const LAKH: f64 = 1e5;

/// Dashboard market cap: crore above 1e7, lakh above 1e5, rupees otherwise.
pub fn format_market_cap_indian(value: Option<f64>) -> String {
    match value {
        None => "NA".to_string(),
        Some(v) if v >= CRORE => format!("{:.2} Cr", v / CRORE),
        Some(v) if v >= LAKH => format!("{:.2} Lakh", v / LAKH),
        Some(v) => format!("{:.2} ₹", v),
    }
}

/// Report market cap, always in crore.
pub fn format_market_cap_crore(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("₹{:.2} Cr", v / CRORE),
        _ => "N/A".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeRating {
    Excellent,
    Good,
    Poor,
}

impl PeRating {
    pub fn from_pe(pe: Option<f64>) -> Option<Self> {
        match pe {
            Some(pe) if pe > 0.0 && pe < 20.0 => Some(PeRating::Excellent),
            Some(pe) if pe > 0.0 && pe <= 35.0 => Some(PeRating::Good),
            Some(pe) if pe > 35.0 => Some(PeRating::Poor),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PeRating::Excellent => "Excellent",
            PeRating::Good => "Good",
            PeRating::Poor => "Poor",
        }
    }
}

pub fn pe_rating_label(pe: Option<f64>) -> &'static str {
    PeRating::from_pe(pe).map(PeRating::label).unwrap_or("N/A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_cap_indian_units() {
        assert_eq!(format_market_cap_indian(None), "NA");
        assert_eq!(format_market_cap_indian(Some(1.5e12)), "150000.00 Cr");
        assert_eq!(format_market_cap_indian(Some(1e7)), "1.00 Cr");
        assert_eq!(format_market_cap_indian(Some(2.5e5)), "2.50 Lakh");
        assert_eq!(format_market_cap_indian(Some(999.0)), "999.00 ₹");
    }

    #[test]
    fn market_cap_crore_for_report() {
        assert_eq!(format_market_cap_crore(Some(1.234e10)), "₹1234.00 Cr");
        assert_eq!(format_market_cap_crore(None), "N/A");
    }

    #[test]
    fn pe_rating_bands() {
        assert_eq!(pe_rating_label(None), "N/A");
        assert_eq!(pe_rating_label(Some(0.0)), "N/A");
        assert_eq!(pe_rating_label(Some(-4.0)), "N/A");
        assert_eq!(pe_rating_label(Some(19.99)), "Excellent");
        assert_eq!(pe_rating_label(Some(20.0)), "Good");
        assert_eq!(pe_rating_label(Some(35.0)), "Good");
        assert_eq!(pe_rating_label(Some(35.01)), "Poor");
    }

    #[test]
    fn merge_keeps_present_fields() {
        let chart = QuoteSnapshot {
            current_price: Some(101.0),
            long_name: Some("Tata Consultancy".into()),
            ..QuoteSnapshot::new("TCS.NS")
        };
        let summary = QuoteSnapshot {
            current_price: Some(99.0),
            market_cap: Some(1e12),
            sector: Some("Technology".into()),
            ..QuoteSnapshot::new("TCS.NS")
        };
        let merged = chart.merge(summary);
        assert_eq!(merged.current_price, Some(101.0));
        assert_eq!(merged.market_cap, Some(1e12));
        assert_eq!(merged.sector.as_deref(), Some("Technology"));
        assert_eq!(merged.trailing_pe, None);
    }
}

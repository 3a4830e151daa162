//! Report generation port trait.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::domain::error::StockError;
use crate::domain::report::ReportData;

/// Port for writing analysis reports.
pub trait ReportPort {
    /// Write exactly one document for `symbol` and return its path.
    fn write(
        &self,
        symbol: &str,
        data: &ReportData,
        chart_svg: Option<&str>,
        generated_at: NaiveDateTime,
    ) -> Result<PathBuf, StockError>;
}

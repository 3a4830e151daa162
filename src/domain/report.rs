//! Report data: ordered titled sections of display lines.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportData {
    pub sections: Vec<ReportSection>,
}

impl ReportData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section<I, S>(mut self, title: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.push(ReportSection {
            title: title.to_string(),
            lines: lines.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn get(&self, title: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.title == title)
    }
}

/// Console layout: title, a dashed rule, then one line per entry.
impl fmt::Display for ReportData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}", section.title)?;
            writeln!(f, "{}", "-".repeat(60))?;
            for line in &section.lines {
                writeln!(f, "{line}")?;
            }
        }
        Ok(())
    }
}

/// Optional value rendering with a fixed number of decimals.
pub fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "N/A".to_string(),
    }
}

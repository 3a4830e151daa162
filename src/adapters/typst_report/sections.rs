//! Typst markup for the report header and the titled sections.
//!
//! Each `"Label : Value"` line becomes a two-column table row; lines without
//! a separator are emitted as a paragraph after the table.

use chrono::NaiveDateTime;

use crate::domain::report::{ReportData, ReportSection};

const SEPARATOR: &str = " : ";

/// Characters with markup meaning in Typst content blocks.
const SPECIAL: &[char] = &[
    '\\', '#', '$', '*', '_', '`', '<', '>', '@', '[', ']', '~', '/', '=', '-', '+', '"',
];

/// Replace the rupee sign and backslash-escape Typst markup characters.
pub fn escape_markup(text: &str) -> String {
    let text = text.replace('₹', "Rs.");
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn render_header(author: &str, generated_at: NaiveDateTime) -> String {
    format!(
        "*Author:* {} #h(1fr) *Date:* {} ({}) #h(1fr) *Time:* {}\n",
        escape_markup(author),
        generated_at.format("%d-%m-%Y"),
        generated_at.format("%A"),
        generated_at.format("%H:%M:%S"),
    )
}

fn render_section(section: &ReportSection) -> String {
    let mut rows = String::new();
    let mut notes = Vec::new();

    for line in &section.lines {
        match line.split_once(SEPARATOR) {
            Some((label, value)) => rows.push_str(&format!(
                "  [{}], [{}],\n",
                escape_markup(label.trim()),
                escape_markup(value.trim())
            )),
            None => notes.push(escape_markup(line)),
        }
    }

    let mut output = format!("== {}\n\n", escape_markup(&section.title));
    if !rows.is_empty() {
        output.push_str("#table(\n  columns: (auto, 1fr),\n  stroke: none,\n");
        output.push_str(&rows);
        output.push_str(")\n\n");
    }
    for note in notes {
        output.push_str(&format!("_{note}_\n\n"));
    }
    output
}

pub fn render_sections(data: &ReportData) -> String {
    data.sections.iter().map(render_section).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn escape_replaces_rupee_and_specials() {
        assert_eq!(escape_markup("₹1,234.5"), "Rs.1,234.5");
        assert_eq!(escape_markup("P/E #1 *x*"), "P\\/E \\#1 \\*x\\*");
        assert_eq!(escape_markup("02-01-2023"), "02\\-01\\-2023");
    }

    #[test]
    fn header_has_date_weekday_and_time() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();
        let header = render_header("Stock Analysis", at);
        assert!(header.contains("*Date:* 15-03-2024"));
        assert!(header.contains("(Friday)"));
        assert!(header.contains("09:05:07"));
        assert!(header.contains("Stock Analysis"));
    }

    #[test]
    fn section_lines_become_table_rows() {
        let data = ReportData::new().section(
            "STOCK REPORT",
            ["Stock : TCS.NS", "Current Price : ₹110"],
        );
        let out = render_sections(&data);
        assert!(out.starts_with("== STOCK REPORT\n"));
        assert!(out.contains("#table("));
        assert!(out.contains("[Stock], [TCS.NS],"));
        assert!(out.contains("[Current Price], [Rs.110],"));
        assert!(!out.contains('₹'));
    }

    #[test]
    fn lines_without_separator_become_notes() {
        let data = ReportData::new().section("RECOMMENDATION FOR BUYING", ["Heuristic only"]);
        let out = render_sections(&data);
        assert!(!out.contains("#table("));
        assert!(out.contains("_Heuristic only_"));
    }
}

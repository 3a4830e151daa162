//! Typst report generation.
//!
//! Reads a Typst template (either the built-in default or a custom file via
//! `[report] template_path`), resolves all `{{PLACEHOLDER}}` markers using the
//! helpers in `sections` and `chart_svg`, and writes the final `.typ` file.

pub mod chart_svg;
pub mod default_template;
pub mod sections;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::domain::error::StockError;
use crate::domain::report::ReportData;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_AUTHOR: &str = "Stock Analysis";
const DEFAULT_FOLDER: &str = "Stock Analysis";

/// Context for resolving template placeholders.
pub struct ReportContext<'a> {
    pub symbol: &'a str,
    pub data: &'a ReportData,
    pub chart_svg: Option<&'a str>,
    pub author: &'a str,
    pub generated_at: NaiveDateTime,
}

/// Wrap SVG markup in a Typst `image.decode` call.
fn typst_image(svg: &str) -> String {
    format!(
        "#image.decode(\n\"{}\",\n  width: 100%,\n)",
        svg.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    )
}

/// Resolve all `{{PLACEHOLDER}}`s in `template` and return Typst markup.
pub fn resolve(template: &str, ctx: &ReportContext) -> String {
    let title = sections::escape_markup(&format!("{} Stock Analysis", ctx.symbol));
    let chart = match ctx.chart_svg {
        Some(svg) if !svg.is_empty() => typst_image(svg),
        _ => "_No chart data._".to_string(),
    };

    template
        .replace("{{TITLE}}", &title)
        .replace("{{HEADER}}", &sections::render_header(ctx.author, ctx.generated_at))
        .replace("{{SECTIONS}}", &sections::render_sections(ctx.data))
        .replace("{{CHART}}", &chart)
}

/// `"{symbol} - Stock Analysis - {dd-mm-YYYY HH-MM-SS}.typ"`
pub fn report_file_name(symbol: &str, generated_at: NaiveDateTime) -> String {
    format!(
        "{} - Stock Analysis - {}.typ",
        symbol.replace(['/', '\\'], "_"),
        generated_at.format("%d-%m-%Y %H-%M-%S")
    )
}

/// `~/Desktop/Stock Analysis`, or a `Stock Analysis` folder under the
/// working directory when no home directory is known.
pub fn default_output_dir() -> PathBuf {
    match std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        Some(home) if !home.is_empty() => Path::new(&home).join("Desktop").join(DEFAULT_FOLDER),
        _ => std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_FOLDER),
    }
}

/// `override_dir`, else `[report] output_dir`, else the default folder.
pub fn configured_output_dir(config: &dyn ConfigPort, override_dir: Option<PathBuf>) -> PathBuf {
    override_dir
        .or_else(|| config.get_string("report", "output_dir").map(PathBuf::from))
        .unwrap_or_else(default_output_dir)
}

pub struct TypstReportAdapter {
    output_dir: PathBuf,
    author: String,
    template: Option<String>,
}

impl TypstReportAdapter {
    pub fn new(output_dir: PathBuf, author: &str, template: Option<String>) -> Self {
        Self {
            output_dir,
            author: author.to_string(),
            template,
        }
    }

    /// `output_dir` overrides `[report] output_dir`; a configured template
    /// that cannot be read is an I/O error.
    pub fn from_config(
        config: &dyn ConfigPort,
        output_dir: Option<PathBuf>,
    ) -> Result<Self, StockError> {
        let output_dir = configured_output_dir(config, output_dir);
        let author = config
            .get_string("report", "author")
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
        let template = match config.get_string("report", "template_path") {
            Some(path) => Some(fs::read_to_string(&path).map_err(|e| {
                StockError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to read template {path}: {e}"),
                ))
            })?),
            None => None,
        };

        Ok(Self::new(output_dir, &author, template))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(
        &self,
        symbol: &str,
        data: &ReportData,
        chart_svg: Option<&str>,
        generated_at: NaiveDateTime,
    ) -> Result<PathBuf, StockError> {
        let template = self
            .template
            .as_deref()
            .unwrap_or_else(|| default_template::template());

        let ctx = ReportContext {
            symbol,
            data,
            chart_svg,
            author: &self.author,
            generated_at,
        };
        let typst_content = resolve(template, &ctx);

        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(report_file_name(symbol, generated_at));
        fs::write(&path, typst_content)?;

        tracing::info!(path = %path.display(), "report written");
        Ok(path)
    }
}

//! CLI definition and dispatch.

use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::{get_parsed, FileConfigAdapter};
use crate::adapters::nse_directory_adapter::NseDirectoryAdapter;
use crate::adapters::typst_report::chart_svg::SvgChartAdapter;
use crate::adapters::typst_report::{configured_output_dir, TypstReportAdapter};
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::analysis::{self, build_report_data, AnalysisConfig, Dashboard};
use crate::domain::error::StockError;
use crate::domain::indicator::ema::EmaSeed;
use crate::domain::metrics::MetricsConfig;
use crate::domain::period::LookbackPeriod;
use crate::domain::quote::format_market_cap_indian;
use crate::domain::report::ReportData;
use crate::domain::symbols::{load_symbols, suggest, DEFAULT_SUFFIX, DEFAULT_SUGGESTION_LIMIT};
use crate::ports::chart_port::ChartPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::symbol_directory_port::SymbolDirectoryPort;

pub const DEFAULT_DASHBOARD_SYMBOL: &str = "TCS.NS";

#[derive(Parser, Debug)]
#[command(name = "stockscope", about = "Stock analysis reports and dashboards")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Read `<SYMBOL>.csv` files from this folder instead of the network
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Folder for reports and charts
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute metrics for a symbol and write a Typst report
    Analyze {
        #[arg(short, long)]
        symbol: Option<String>,
    },
    /// Print a quote dashboard and save a one-year candlestick chart
    Dashboard {
        #[arg(short, long, default_value = DEFAULT_DASHBOARD_SYMBOL)]
        symbol: String,
    },
    /// List symbols matching a query
    Symbols {
        #[arg(short, long)]
        query: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(code) => code,
        Err(e) => report_error(&e),
    }
}

/// The single place errors reach the user: a friendly line, then the raw error.
fn report_error(err: &StockError) -> ExitCode {
    tracing::debug!(error = ?err, "command failed");
    eprintln!("{}", err.user_message());
    eprintln!("error: {err}");
    err.into()
}

fn execute(cli: Cli) -> Result<ExitCode, StockError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Analyze { symbol } => {
            let Some(symbol) = symbol.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
            else {
                eprintln!("warning: select stock (pass --symbol)");
                return Ok(ExitCode::from(2));
            };
            let analysis_config = build_analysis_config(&config)?;
            let market = build_market_data(&config, cli.data_dir.as_deref())?;
            let report = TypstReportAdapter::from_config(&config, cli.output_dir.clone())?;
            let chart = SvgChartAdapter::new(report.output_dir().to_path_buf(), true);

            let path = run_analyze_pipeline(
                market.as_ref(),
                &report,
                &chart,
                &symbol,
                &analysis_config,
                Local::now().naive_local(),
            )?;
            eprintln!("\nReport written to: {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Dashboard { symbol } => {
            let analysis_config = build_analysis_config(&config)?;
            let market = build_market_data(&config, cli.data_dir.as_deref())?;
            let chart = SvgChartAdapter::new(configured_output_dir(&config, cli.output_dir), true);

            let (dashboard, path) = run_dashboard_pipeline(
                market.as_ref(),
                &chart,
                symbol.trim(),
                analysis_config.dashboard_period,
            )?;
            print!("{}", dashboard_report(&dashboard));
            eprintln!("\nChart written to: {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Symbols { query, limit } => {
            let suffix = config
                .get_string("symbols", "suffix")
                .unwrap_or_else(|| DEFAULT_SUFFIX.to_string());
            let limit = limit.unwrap_or_else(|| suggestion_limit(&config));
            let directory = build_symbol_directory(&config, cli.data_dir.as_deref())?;

            let symbols = load_symbols(directory.as_ref(), &suffix);
            for symbol in suggest(&symbols, query.as_deref().unwrap_or(""), limit) {
                println!("{symbol}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// No path means an empty configuration where every key takes its default.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, StockError> {
    match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, StockError> {
    let defaults = AnalysisConfig::default();
    Ok(AnalysisConfig {
        history_period: get_parsed(config, "analysis", "history_period", defaults.history_period)?,
        chart_period: get_parsed(config, "analysis", "chart_period", defaults.chart_period)?,
        dashboard_period: get_parsed(
            config,
            "analysis",
            "dashboard_period",
            defaults.dashboard_period,
        )?,
        metrics: MetricsConfig {
            ema_seed: get_parsed(config, "metrics", "ema_seed", EmaSeed::default())?,
        },
    })
}

pub fn suggestion_limit(config: &dyn ConfigPort) -> usize {
    let limit = config.get_int("symbols", "suggestion_limit", DEFAULT_SUGGESTION_LIMIT as i64);
    usize::try_from(limit).unwrap_or(DEFAULT_SUGGESTION_LIMIT)
}

fn build_market_data(
    config: &dyn ConfigPort,
    data_dir: Option<&Path>,
) -> Result<Box<dyn MarketDataPort>, StockError> {
    match data_dir {
        Some(dir) => Ok(Box::new(CsvAdapter::new(dir.to_path_buf()))),
        None => Ok(Box::new(YahooAdapter::from_config(config)?)),
    }
}

fn build_symbol_directory(
    config: &dyn ConfigPort,
    data_dir: Option<&Path>,
) -> Result<Box<dyn SymbolDirectoryPort>, StockError> {
    match data_dir {
        Some(dir) => Ok(Box::new(CsvAdapter::new(dir.to_path_buf()))),
        None => Ok(Box::new(NseDirectoryAdapter::from_config(config)?)),
    }
}

/// Fetch, compute, print and write the report. The chart is embedded in the
/// report; a chart that cannot be fetched or drawn is left out with a warning.
pub fn run_analyze_pipeline(
    market: &dyn MarketDataPort,
    report: &dyn ReportPort,
    chart: &dyn ChartPort,
    symbol: &str,
    config: &AnalysisConfig,
    generated_at: NaiveDateTime,
) -> Result<PathBuf, StockError> {
    let analysis = analysis::analyze(market, symbol, config)?;
    let data = build_report_data(&analysis);
    print!("{data}");

    let title = format!("{symbol} - {} Candlestick", config.chart_period);
    let chart_svg = market
        .fetch_history(symbol, config.chart_period)
        .and_then(|series| chart.render(&series, &title));
    let chart_svg = match chart_svg {
        Ok(svg) => Some(svg),
        Err(e) => {
            tracing::warn!(symbol, error = %e, "chart omitted from report");
            None
        }
    };

    report.write(symbol, &data, chart_svg.as_deref(), generated_at)
}

pub fn run_dashboard_pipeline(
    market: &dyn MarketDataPort,
    chart: &dyn ChartPort,
    symbol: &str,
    period: LookbackPeriod,
) -> Result<(Dashboard, PathBuf), StockError> {
    let dashboard = analysis::dashboard(market, symbol, period)?;
    let title = format!("{symbol} - {period} Candlestick");
    let path = chart.save(&dashboard.history, &title)?;
    Ok((dashboard, path))
}

/// Console layout of the dashboard; absent fields print as `NA`.
pub fn dashboard_report(dashboard: &Dashboard) -> ReportData {
    let quote = &dashboard.quote;
    let rupees = |value: Option<f64>| {
        value
            .map(|v| format!("₹{v:.2}"))
            .unwrap_or_else(|| "NA".to_string())
    };
    let trend = dashboard
        .trend
        .map(|t| t.to_string())
        .unwrap_or_else(|| "NA".to_string());

    ReportData::new()
        .section(
            "BASIC INFO",
            [
                format!("Name : {}", quote.long_name.as_deref().unwrap_or("NA")),
                format!("Symbol : {}", quote.symbol),
                format!("Sector : {}", quote.sector.as_deref().unwrap_or("NA")),
            ],
        )
        .section(
            "MARKET CAP",
            [format!("Market Cap : {}", format_market_cap_indian(quote.market_cap))],
        )
        .section(
            "PRICE INFO",
            [
                format!("Current Price : {}", rupees(quote.current_price)),
                format!("52W High : {}", rupees(quote.fifty_two_week_high)),
                format!("52W Low : {}", rupees(quote.fifty_two_week_low)),
                format!("Previous Close : {}", rupees(quote.previous_close)),
            ],
        )
        .section("TREND METER", [format!("Trend : {trend}")])
}

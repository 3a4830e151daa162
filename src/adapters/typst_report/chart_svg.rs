//! SVG candlestick charts, standalone or embedded in reports.

use std::fs;
use std::path::PathBuf;

use chrono::Local;

use crate::domain::error::StockError;
use crate::domain::ohlcv::PriceSeries;
use crate::ports::chart_port::ChartPort;

const WIDTH: f64 = 800.0;
const PRICE_HEIGHT: f64 = 360.0;
const VOLUME_HEIGHT: f64 = 100.0;
const PAD_LEFT: f64 = 70.0;
const PAD_RIGHT: f64 = 20.0;
const PAD_TOP: f64 = 40.0;
const PAD_BOTTOM: f64 = 30.0;
const BODY_RATIO: f64 = 0.6;

const BULL_COLOR: &str = "#26a69a";
const BEAR_COLOR: &str = "#ef5350";

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Candlestick SVG for `series`; empty when there are no bars.
///
/// Green candles close at or above their open, red ones below it. With
/// `volume` set, a volume panel is drawn under the price panel.
pub fn generate_candlestick_svg(series: &PriceSeries, title: &str, volume: bool) -> String {
    let bars = &series.bars;
    if bars.is_empty() {
        return String::new();
    }

    let max_high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let min_low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let range = if max_high - min_low > 0.0 {
        max_high - min_low
    } else {
        1.0
    };

    let plot_width = WIDTH - PAD_LEFT - PAD_RIGHT;
    let plot_height = PRICE_HEIGHT - PAD_TOP - PAD_BOTTOM;
    let height = if volume {
        PRICE_HEIGHT + VOLUME_HEIGHT
    } else {
        PRICE_HEIGHT
    };

    let slot = plot_width / bars.len() as f64;
    let body_width = (slot * BODY_RATIO).max(1.0);
    let y = |price: f64| PAD_TOP + (max_high - price) / range * plot_height;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {WIDTH:.0} {height:.0}\">\n"
    );
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{WIDTH:.0}\" height=\"{height:.0}\" fill=\"white\"/>\n"
    ));
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"24\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"16\" font-weight=\"bold\">{}</text>\n",
        WIDTH / 2.0,
        xml_escape(title)
    ));

    // Price axis labels
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-family=\"sans-serif\" font-size=\"11\">{:.2}</text>\n",
        PAD_LEFT - 6.0,
        y(max_high) + 4.0,
        max_high
    ));
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-family=\"sans-serif\" font-size=\"11\">{:.2}</text>\n",
        PAD_LEFT - 6.0,
        y(min_low) + 4.0,
        min_low
    ));
    svg.push_str(&format!(
        "<line x1=\"{PAD_LEFT:.1}\" y1=\"{PAD_TOP:.1}\" x2=\"{PAD_LEFT:.1}\" y2=\"{:.1}\" stroke=\"#999\" stroke-width=\"1\"/>\n",
        PAD_TOP + plot_height
    ));

    for (i, bar) in bars.iter().enumerate() {
        let color = if bar.is_bullish() { BULL_COLOR } else { BEAR_COLOR };
        let center = PAD_LEFT + slot * (i as f64 + 0.5);
        let body_top = y(bar.open.max(bar.close));
        let body_height = (y(bar.open.min(bar.close)) - body_top).max(1.0);

        svg.push_str(&format!(
            "<line class=\"wick\" x1=\"{center:.2}\" y1=\"{:.2}\" x2=\"{center:.2}\" y2=\"{:.2}\" stroke=\"{color}\" stroke-width=\"1\"/>\n",
            y(bar.high),
            y(bar.low)
        ));
        svg.push_str(&format!(
            "<rect class=\"candle\" x=\"{:.2}\" y=\"{body_top:.2}\" width=\"{body_width:.2}\" height=\"{body_height:.2}\" fill=\"{color}\"/>\n",
            center - body_width / 2.0
        ));
    }

    // Date labels under the price panel
    let label_y = PAD_TOP + plot_height + 18.0;
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        svg.push_str(&format!(
            "<text x=\"{PAD_LEFT:.1}\" y=\"{label_y:.1}\" font-family=\"sans-serif\" font-size=\"11\">{}</text>\n",
            first.date.format("%d-%m-%Y")
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{label_y:.1}\" text-anchor=\"end\" font-family=\"sans-serif\" font-size=\"11\">{}</text>\n",
            WIDTH - PAD_RIGHT,
            last.date.format("%d-%m-%Y")
        ));
    }

    if volume {
        let max_volume = bars.iter().map(|b| b.volume).max().unwrap_or(0);
        let panel_bottom = height - 10.0;
        let panel_height = VOLUME_HEIGHT - 20.0;
        if max_volume > 0 {
            for (i, bar) in bars.iter().enumerate() {
                let color = if bar.is_bullish() { BULL_COLOR } else { BEAR_COLOR };
                let bar_height = bar.volume as f64 / max_volume as f64 * panel_height;
                svg.push_str(&format!(
                    "<rect class=\"volume\" x=\"{:.2}\" y=\"{:.2}\" width=\"{body_width:.2}\" height=\"{bar_height:.2}\" fill=\"{color}\" fill-opacity=\"0.5\"/>\n",
                    PAD_LEFT + slot * (i as f64 + 0.5) - body_width / 2.0,
                    panel_bottom - bar_height
                ));
            }
        }
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-family=\"sans-serif\" font-size=\"11\">Volume</text>\n",
            PAD_LEFT - 6.0,
            panel_bottom - panel_height / 2.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Writes candlestick charts as `.svg` files into one folder.
pub struct SvgChartAdapter {
    output_dir: PathBuf,
    volume: bool,
}

impl SvgChartAdapter {
    pub fn new(output_dir: PathBuf, volume: bool) -> Self {
        Self { output_dir, volume }
    }
}

impl ChartPort for SvgChartAdapter {
    fn render(&self, series: &PriceSeries, title: &str) -> Result<String, StockError> {
        let svg = generate_candlestick_svg(series, title, self.volume);
        if svg.is_empty() {
            return Err(StockError::render(format!(
                "no bars to chart for {}",
                series.symbol
            )));
        }
        Ok(svg)
    }

    fn save(&self, series: &PriceSeries, title: &str) -> Result<PathBuf, StockError> {
        let svg = self.render(series, title)?;
        fs::create_dir_all(&self.output_dir)?;

        let stamp = Local::now().format("%d-%m-%Y %H-%M-%S");
        let file_name = format!("{} - Candlestick - {stamp}.svg", series.symbol.replace(['/', '\\'], "_"));
        let path = self.output_dir.join(file_name);
        fs::write(&path, svg)?;

        tracing::info!(path = %path.display(), bars = series.len(), "chart written");
        Ok(path)
    }
}

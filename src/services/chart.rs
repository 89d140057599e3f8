use chrono::{DateTime, Duration, Utc};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontTransform, TextStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::data::types::{CurrencyPair, PricePoint};
use crate::error::ChartError;

/// A rendered chart: the file on disk plus its PNG bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartArtifact {
    pub path: PathBuf,
    pub file_name: String,
    pub png: Vec<u8>,
}

pub trait ChartRenderer: Send + Sync {
    /// Blocking render; callers on the async runtime use `spawn_blocking`.
    fn render(
        &self,
        ticker: &str,
        history: &[PricePoint],
        pair: &CurrencyPair,
    ) -> Result<ChartArtifact, ChartError>;
}

/// Line chart of daily closes rendered with the plotters bitmap backend.
///
/// Every render gets its own file (`<TICKER>_<uuid>.png`), so concurrent
/// requests never overwrite each other.
#[derive(Clone, Debug)]
pub struct PlottersRenderer {
    dir: PathBuf,
    width: u32,
    height: u32,
}

impl PlottersRenderer {
    pub fn new(dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            dir: dir.into(),
            width,
            height,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_for(&self, ticker: &str) -> (String, PathBuf) {
        let file_name = chart_file_name(ticker);
        let path = self.dir.join(&file_name);
        (file_name, path)
    }

    fn draw(
        &self,
        path: &Path,
        ticker: &str,
        history: &[PricePoint],
        pair: &CurrencyPair,
    ) -> Result<(), ChartError> {
        let draw_err = |e: &dyn std::fmt::Display| ChartError::Drawing(e.to_string());

        let backend = BitMapBackend::new(path, (self.width, self.height));
        let root = backend.into_drawing_area();
        root.fill(&WHITE).map_err(|e| draw_err(&e))?;

        let (x_min, x_max) = time_range(history);
        let (y_min, y_max) = price_range(history);

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Stock Prices for {}", ticker),
                ("sans-serif", 24).into_font(),
            )
            .margin(15)
            .x_label_area_size(70)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| draw_err(&e))?;

        // Dates run vertically under the axis, anchored at the tick.
        let x_label_style = TextStyle::from(("sans-serif", 12).into_font())
            .transform(FontTransform::Rotate90)
            .pos(Pos::new(HPos::Left, VPos::Center));

        chart
            .configure_mesh()
            .x_labels(history.len().clamp(2, 10))
            .x_label_formatter(&|d: &DateTime<Utc>| d.format("%Y-%m-%d").to_string())
            .x_label_style(x_label_style)
            .y_label_formatter(&|v: &f64| format!("{:.2}", v))
            .x_desc("Date")
            .y_desc(format!("Closing Price ({})", pair.base))
            .draw()
            .map_err(|e| draw_err(&e))?;

        chart
            .draw_series(
                LineSeries::new(history.iter().map(|p| (p.timestamp, p.close)), &BLUE)
                    .point_size(4),
            )
            .map_err(|e| draw_err(&e))?;

        root.present().map_err(|e| draw_err(&e))?;
        Ok(())
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(
        &self,
        ticker: &str,
        history: &[PricePoint],
        pair: &CurrencyPair,
    ) -> Result<ChartArtifact, ChartError> {
        if history.is_empty() {
            return Err(ChartError::NoData {
                ticker: ticker.to_string(),
            });
        }

        fs::create_dir_all(&self.dir)?;
        let (file_name, path) = self.slot_for(ticker);

        // The backend is dropped inside `draw`, so the file is complete here.
        if let Err(e) = self.draw(&path, ticker, history, pair) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        let png = fs::read(&path)?;
        info!(
            "🖼️ [CHART] Rendered {} ({} points, {} bytes) -> {}",
            ticker,
            history.len(),
            png.len(),
            path.display()
        );

        Ok(ChartArtifact {
            path,
            file_name,
            png,
        })
    }
}

/// `<TICKER>_<uuid>.png`, with anything outside `[A-Z0-9.-]` replaced.
pub fn chart_file_name(ticker: &str) -> String {
    let safe: String = ticker
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_{}.png", safe, Uuid::new_v4().simple())
}

/// X bounds; a single point is widened by half a day on each side.
pub(crate) fn time_range(history: &[PricePoint]) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = history.first().map(|p| p.timestamp).unwrap_or_else(Utc::now);
    let last = history.last().map(|p| p.timestamp).unwrap_or(first);
    if last <= first {
        (first - Duration::hours(12), first + Duration::hours(12))
    } else {
        (first, last)
    }
}

/// Y bounds padded by 10% of the spread (or 1% of the price when flat).
pub(crate) fn price_range(history: &[PricePoint]) -> (f64, f64) {
    let min = history.iter().map(|p| p.close).fold(f64::INFINITY, f64::min);
    let max = history
        .iter()
        .map(|p| p.close)
        .fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let spread = max - min;
    let padding = if spread > 0.0 {
        spread * 0.1
    } else {
        (max.abs() * 0.01).max(0.01)
    };
    ((min - padding).max(0.0), max + padding)
}

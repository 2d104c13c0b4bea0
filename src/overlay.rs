//! Multi-year overlay series.
//!
//! Splits a monthly series into year windows of `step_size` consecutive years,
//! advanced one year at a time, and lines every window up on one categorical
//! month axis so the years can be compared against each other. One window may
//! be highlighted; the others are drawn as translucent background lines.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VizError};
use crate::figure::{Axes, LineSeries};
use crate::series::{validate_date_format, MonthlySeries};
use crate::ticks::show_all_xticks;

/// Default alpha for windows that are not highlighted
pub const DEFAULT_BACKGROUND_ALPHA: f64 = 0.3;

/// Default line width for overlay lines
pub const DEFAULT_LINE_WIDTH: u32 = 3;

/// Display emphasis of one window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    Highlighted,
    Background,
}

/// Options for [`build_overlay_with`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayOptions {
    /// Number of consecutive years per window
    pub step_size: usize,
    /// Terminal year of the window to highlight
    #[serde(default)]
    pub highlight_year: Option<i32>,
    /// strftime pattern for the shared x-axis labels
    pub label_format: String,
    #[serde(default = "default_background_alpha")]
    pub background_alpha: f64,
    #[serde(default = "default_line_width")]
    pub line_width: u32,
}

fn default_background_alpha() -> f64 {
    DEFAULT_BACKGROUND_ALPHA
}

fn default_line_width() -> u32 {
    DEFAULT_LINE_WIDTH
}

impl OverlayOptions {
    pub fn new(step_size: usize, highlight_year: Option<i32>, label_format: &str) -> Self {
        Self {
            step_size,
            highlight_year,
            label_format: label_format.to_string(),
            background_alpha: DEFAULT_BACKGROUND_ALPHA,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.step_size == 0 {
            return Err(VizError::config("Step size must be a positive number of years"));
        }
        if !(0.0..=1.0).contains(&self.background_alpha) {
            return Err(VizError::config(format!(
                "Background alpha must be within [0, 1], got {}",
                self.background_alpha
            )));
        }
        if self.line_width == 0 {
            return Err(VizError::config("Line width must be positive"));
        }
        validate_date_format(&self.label_format)
    }
}

/// One year window re-indexed onto the shared month axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayWindow {
    pub start_year: i32,
    pub end_year: i32,
    /// `"{start} -> {end}"`, or just the year for single-year windows
    pub label: String,
    pub emphasis: Emphasis,
    pub alpha: f64,
    pub line_width: u32,
    /// One slot per shared label; `None` where the window has no observation
    pub values: Vec<Option<f64>>,
}

impl OverlayWindow {
    pub fn is_highlighted(&self) -> bool {
        self.emphasis == Emphasis::Highlighted
    }
}

/// Result of [`build_overlay`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    /// Name of the source series
    pub name: String,
    pub windows: Vec<OverlayWindow>,
    /// Shared categorical x-axis labels, taken from the last window
    pub labels: Vec<String>,
}

impl Overlay {
    pub fn highlighted(&self) -> Option<&OverlayWindow> {
        self.windows.iter().find(|w| w.is_highlighted())
    }

    /// Turn the overlay into an axes with one line per window and every month tick shown
    pub fn into_axes(self) -> Axes {
        let mut axes = Axes::new().y_label(&self.name);
        for window in self.windows {
            axes = axes.line(
                LineSeries::categorical(&window.label, window.values)
                    .alpha(window.alpha)
                    .line_width(window.line_width),
            );
        }
        axes.xticks(show_all_xticks(&self.labels))
    }
}

/// Build a year-over-year overlay.
///
/// `highlight_year` names the terminal year of the window to emphasize.
pub fn build_overlay(
    series: &MonthlySeries,
    step_size: usize,
    highlight_year: Option<i32>,
    label_format: &str,
) -> Result<Overlay> {
    build_overlay_with(
        series,
        &OverlayOptions::new(step_size, highlight_year, label_format),
    )
}

/// Build a year-over-year overlay with explicit options.
///
/// Windows cover `years[i] ..= years[i + step_size - 1]`. The shared axis is
/// the months of the last window; every window is placed on it by its
/// `(year offset, month)` position, so a partial first year leaves leading
/// gaps instead of shifting values left.
pub fn build_overlay_with(series: &MonthlySeries, options: &OverlayOptions) -> Result<Overlay> {
    options.validate()?;
    let step = options.step_size;

    let years = series.distinct_years();
    if years.len() <= step {
        return Err(VizError::config(format!(
            "Step size {} needs more than {} distinct years, series '{}' has {}",
            step,
            step,
            series.name(),
            years.len()
        )));
    }

    let last_start = years[years.len() - step];
    let last_end = years[years.len() - 1];
    let axis = series.years_slice(last_start, last_end);
    let labels = MonthlySeries::format_dates(axis, &options.label_format)?;
    let slots: Vec<(i32, u32)> = axis
        .iter()
        .map(|o| (o.month.year() - last_start, o.month.month0()))
        .collect();

    let lookup = series.by_year_month();
    let window_count = years.len() - step + 1;
    let mut windows = Vec::with_capacity(window_count);

    for i in 0..window_count {
        let start_year = years[i];
        let end_year = years[i + step - 1];
        let highlighted = options.highlight_year == Some(end_year);

        let values = slots
            .iter()
            .map(|&(offset, month0)| lookup.get(&(start_year + offset, month0)).copied())
            .collect();

        let label = if step != 1 {
            format!("{} -> {}", start_year, end_year)
        } else {
            format!("{}", start_year)
        };

        windows.push(OverlayWindow {
            start_year,
            end_year,
            label,
            emphasis: if highlighted {
                Emphasis::Highlighted
            } else {
                Emphasis::Background
            },
            alpha: if highlighted {
                1.0
            } else {
                options.background_alpha
            },
            line_width: options.line_width,
            values,
        });
    }

    debug!(
        series = %series.name(),
        step_size = step,
        windows = windows.len(),
        axis_len = labels.len(),
        highlight_year = ?options.highlight_year,
        "Built overlay windows"
    );

    Ok(Overlay {
        name: series.name().to_string(),
        windows,
        labels,
    })
}

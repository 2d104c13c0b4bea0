//! Figure and axes builders.
//!
//! Plot helpers never draw directly. They accumulate line series, polygon
//! fills, legends, ticks and annotations on an [`Axes`]; a [`Figure`] arranges
//! axes in a grid and [`Figure::finish`] freezes everything into a
//! [`RenderDescriptor`] that can be serialized or rasterized by
//! [`crate::render`].

use geo::{BoundingRect, Polygon, Rect};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::colormaps::cycle_color;
use crate::error::{Result, VizError};
use crate::legend::Legend;
use crate::ticks::{linear_ticks, TickFormatter, TickSpec};

/// Default figure size in inches
pub const DEFAULT_FIGSIZE: (f64, f64) = (10.0, 5.0);

/// Number of generated ticks on an axis without explicit ticks
pub const DEFAULT_TICK_COUNT: usize = 5;

/// Visible data window of an axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewLimits {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl ViewLimits {
    pub fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Self { x, y }
    }

    /// Smallest window covering both
    pub fn union(&self, other: &ViewLimits) -> ViewLimits {
        ViewLimits {
            x: (self.x.0.min(other.x.0), self.x.1.max(other.x.1)),
            y: (self.y.0.min(other.y.0), self.y.1.max(other.y.1)),
        }
    }

    /// Widen zero-width ranges so the window can be mapped to pixels
    fn widened(self) -> ViewLimits {
        let widen = |(lo, hi): (f64, f64)| {
            if hi > lo {
                (lo, hi)
            } else {
                (lo - 0.5, hi + 0.5)
            }
        };
        ViewLimits {
            x: widen(self.x),
            y: widen(self.y),
        }
    }
}

impl From<Rect<f64>> for ViewLimits {
    fn from(rect: Rect<f64>) -> Self {
        ViewLimits {
            x: (rect.min().x, rect.max().x),
            y: (rect.min().y, rect.max().y),
        }
    }
}

/// A line drawn through `(x[i], y[i])`; missing y values break the line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<Option<f64>>,
    /// Assigned from the tab10 cycle when the series is added to an axes
    pub color: Option<[u8; 3]>,
    pub alpha: f64,
    pub line_width: u32,
}

impl LineSeries {
    /// Series on a categorical axis: x positions `0..values.len()`
    pub fn categorical(label: &str, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.to_string(),
            x: (0..values.len()).map(|i| i as f64).collect(),
            y: values,
            color: None,
            alpha: 1.0,
            line_width: 1,
        }
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn line_width(mut self, width: u32) -> Self {
        self.line_width = width;
        self
    }

    pub fn color(mut self, color: [u8; 3]) -> Self {
        self.color = Some(color);
        self
    }

    /// Last non-missing y value
    pub fn last_value(&self) -> Option<f64> {
        self.y.iter().rev().flatten().copied().find(|v| v.is_finite())
    }

    fn extent(&self) -> Option<ViewLimits> {
        let points = self
            .x
            .iter()
            .zip(&self.y)
            .filter_map(|(&x, y)| y.map(|y| (x, y)))
            .filter(|(x, y)| x.is_finite() && y.is_finite());

        points.fold(None, |acc: Option<ViewLimits>, (x, y)| {
            let point = ViewLimits::new((x, x), (y, y));
            Some(match acc {
                Some(limits) => limits.union(&point),
                None => point,
            })
        })
    }
}

/// Polygons colored by value through a named continuous colormap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillLayer {
    pub name: String,
    pub colormap: String,
    pub polygons: Vec<(Polygon<f64>, f64)>,
}

impl FillLayer {
    pub fn new(name: &str, colormap: &str) -> Self {
        Self {
            name: name.to_string(),
            colormap: colormap.to_string(),
            polygons: Vec::new(),
        }
    }

    pub fn polygons(mut self, polygons: impl IntoIterator<Item = (Polygon<f64>, f64)>) -> Self {
        self.polygons.extend(polygons);
        self
    }

    /// Range of finite values in the layer
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.polygons
            .iter()
            .map(|(_, v)| *v)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
                None => Some((v, v)),
            })
    }

    fn extent(&self) -> Option<ViewLimits> {
        self.polygons
            .iter()
            .filter_map(|(polygon, _)| polygon.bounding_rect())
            .map(ViewLimits::from)
            .reduce(|a, b| a.union(&b))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Text placed at a data coordinate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub align: Align,
    pub vertical_align: VerticalAlign,
}

/// Visibility of the four axes borders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spines {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Spines {
    pub fn all(visible: bool) -> Self {
        Self {
            top: visible,
            right: visible,
            bottom: visible,
            left: visible,
        }
    }
}

/// Tick, label, spine and grid visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisStyle {
    pub x_ticks: bool,
    pub y_ticks: bool,
    pub x_tick_labels: bool,
    pub y_tick_labels: bool,
    pub spines: Spines,
    pub grid: bool,
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            x_ticks: true,
            y_ticks: true,
            x_tick_labels: true,
            y_tick_labels: true,
            spines: Spines::all(true),
            grid: false,
        }
    }
}

/// One plotting area
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axes {
    title: Option<String>,
    x_label: Option<String>,
    y_label: Option<String>,
    lines: Vec<LineSeries>,
    fills: Vec<FillLayer>,
    legend: Option<Legend>,
    x_ticks: Option<TickSpec>,
    y_formatter: TickFormatter,
    annotations: Vec<Annotation>,
    limits: Option<ViewLimits>,
    style: AxisStyle,
}

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn x_label(mut self, label: &str) -> Self {
        self.x_label = Some(label.to_string());
        self
    }

    pub fn y_label(mut self, label: &str) -> Self {
        self.y_label = Some(label.to_string());
        self
    }

    /// Add a line, giving it the next cycle color if it has none
    pub fn line(mut self, line: LineSeries) -> Self {
        self.push_line(line);
        self
    }

    pub fn push_line(&mut self, mut line: LineSeries) {
        if line.color.is_none() {
            line.color = Some(cycle_color(self.lines.len()));
        }
        self.lines.push(line);
    }

    pub fn fill(mut self, layer: FillLayer) -> Self {
        self.fills.push(layer);
        self
    }

    pub fn xticks(mut self, ticks: TickSpec) -> Self {
        self.x_ticks = Some(ticks);
        self
    }

    pub fn y_formatter(mut self, formatter: TickFormatter) -> Self {
        self.y_formatter = formatter;
        self
    }

    pub fn limits(mut self, limits: ViewLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn grid(mut self, grid: bool) -> Self {
        self.style.grid = grid;
        self
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn clear_axis_labels(&mut self) {
        self.x_label = None;
        self.y_label = None;
    }

    pub fn set_limits(&mut self, limits: ViewLimits) {
        self.limits = Some(limits);
    }

    pub fn set_legend(&mut self, legend: Option<Legend>) {
        self.legend = legend;
    }

    pub fn annotate(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub fn style_mut(&mut self) -> &mut AxisStyle {
        &mut self.style
    }

    pub fn lines(&self) -> &[LineSeries] {
        &self.lines
    }

    pub fn fills(&self) -> &[FillLayer] {
        &self.fills
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    pub fn x_ticks(&self) -> Option<&TickSpec> {
        self.x_ticks.as_ref()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn style(&self) -> &AxisStyle {
        &self.style
    }

    pub fn get_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn get_limits(&self) -> Option<ViewLimits> {
        self.limits
    }

    /// Data window covering every line, fill and annotation
    pub fn data_extent(&self) -> Option<ViewLimits> {
        let annotations = self
            .annotations
            .iter()
            .map(|a| ViewLimits::new((a.x, a.x), (a.y, a.y)));

        self.lines
            .iter()
            .filter_map(LineSeries::extent)
            .chain(self.fills.iter().filter_map(FillLayer::extent))
            .chain(annotations)
            .reduce(|a, b| a.union(&b))
    }
}

/// A grid of axes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: Option<String>,
    /// Width and height in inches
    pub size: (f64, f64),
    pub rows: usize,
    pub cols: usize,
    pub share_x: bool,
    pub share_y: bool,
    axes: Vec<Axes>,
}

/// One finalized panel of a [`RenderDescriptor`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub row: usize,
    pub col: usize,
    pub limits: ViewLimits,
    /// Evenly spaced y ticks labeled with the axes' formatter
    pub y_ticks: TickSpec,
    pub axes: Axes,
}

/// Frozen figure, ready to serialize or rasterize
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderDescriptor {
    pub title: Option<String>,
    pub size: (f64, f64),
    pub rows: usize,
    pub cols: usize,
    pub panels: Vec<Panel>,
}

impl RenderDescriptor {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Figure {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            title: None,
            size: DEFAULT_FIGSIZE,
            rows,
            cols,
            share_x: false,
            share_y: false,
            axes: Vec::new(),
        }
    }

    /// A figure holding a single axes
    pub fn single(axes: Axes) -> Self {
        Self::new(1, 1).with_axes(axes)
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.size = (width, height);
        self
    }

    pub fn shared(mut self, share_x: bool, share_y: bool) -> Self {
        self.share_x = share_x;
        self.share_y = share_y;
        self
    }

    /// Append an axes in row-major order
    pub fn with_axes(mut self, axes: Axes) -> Self {
        self.axes.push(axes);
        self
    }

    pub fn axes(&self) -> &[Axes] {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut [Axes] {
        &mut self.axes
    }

    /// Resolve view limits and freeze the figure.
    ///
    /// Axes without explicit limits get their data extent; shared axes take
    /// the union over all panels.
    pub fn finish(self) -> Result<RenderDescriptor> {
        if self.rows == 0 || self.cols == 0 {
            return Err(VizError::config("Figure needs at least one row and one column"));
        }
        if self.axes.len() > self.rows * self.cols {
            return Err(VizError::config(format!(
                "{} axes do not fit a {}x{} grid",
                self.axes.len(),
                self.rows,
                self.cols
            )));
        }
        if !(self.size.0 > 0.0 && self.size.1 > 0.0) {
            return Err(VizError::config("Figure size must be positive"));
        }

        let fallback = ViewLimits::new((0.0, 1.0), (0.0, 1.0));
        let resolved: Vec<ViewLimits> = self
            .axes
            .iter()
            .map(|a| a.limits.or_else(|| a.data_extent()).unwrap_or(fallback))
            .collect();
        let shared = resolved.iter().copied().reduce(|a, b| a.union(&b));

        let panels = self
            .axes
            .into_iter()
            .zip(resolved)
            .enumerate()
            .map(|(i, (axes, mut limits))| {
                if let Some(shared) = shared {
                    if self.share_x && axes.limits.is_none() {
                        limits.x = shared.x;
                    }
                    if self.share_y && axes.limits.is_none() {
                        limits.y = shared.y;
                    }
                }
                let limits = limits.widened();
                Panel {
                    row: i / self.cols,
                    col: i % self.cols,
                    limits,
                    y_ticks: linear_ticks(limits.y, DEFAULT_TICK_COUNT, axes.y_formatter),
                    axes,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            rows = self.rows,
            cols = self.cols,
            panels = panels.len(),
            "Finalized figure"
        );

        Ok(RenderDescriptor {
            title: self.title,
            size: self.size,
            rows: self.rows,
            cols: self.cols,
            panels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, Rect};

    #[test]
    fn test_lines_get_cycle_colors() {
        let axes = Axes::new()
            .line(LineSeries::categorical("a", vec![Some(1.0)]))
            .line(LineSeries::categorical("b", vec![Some(2.0)]).color([1, 2, 3]))
            .line(LineSeries::categorical("c", vec![Some(3.0)]));
        assert_eq!(axes.lines()[0].color, Some(cycle_color(0)));
        assert_eq!(axes.lines()[1].color, Some([1, 2, 3]));
        assert_eq!(axes.lines()[2].color, Some(cycle_color(2)));
    }

    #[test]
    fn test_last_value_skips_gaps() {
        let line = LineSeries::categorical("a", vec![Some(1.0), Some(4.0), None]);
        assert_eq!(line.last_value(), Some(4.0));
        assert_eq!(LineSeries::categorical("b", vec![None]).last_value(), None);
    }

    #[test]
    fn test_data_extent_covers_lines_and_fills() {
        let square = Rect::new(coord! { x: 10.0, y: -5.0 }, coord! { x: 12.0, y: -1.0 }).to_polygon();
        let axes = Axes::new()
            .line(LineSeries::categorical("a", vec![Some(2.0), None, Some(8.0)]))
            .fill(FillLayer::new("v", "viridis").polygons([(square, 1.0)]));

        let extent = axes.data_extent().unwrap();
        assert_eq!(extent.x, (0.0, 12.0));
        assert_eq!(extent.y, (-5.0, 8.0));
    }

    #[test]
    fn test_finish_resolves_limits() {
        let descriptor = Figure::single(
            Axes::new().line(LineSeries::categorical("flat", vec![Some(3.0), Some(3.0)])),
        )
        .finish()
        .unwrap();

        let panel = &descriptor.panels[0];
        assert_eq!(panel.limits.x, (0.0, 1.0));
        // Flat line gets a widened y range
        assert_eq!(panel.limits.y, (2.5, 3.5));
        assert_eq!(panel.y_ticks.positions.len(), DEFAULT_TICK_COUNT);
        assert_eq!(panel.y_ticks.labels[0], "2.5");
    }

    #[test]
    fn test_finish_shares_axes() {
        let left = Axes::new().line(LineSeries::categorical("a", vec![Some(0.0), Some(1.0)]));
        let right = Axes::new().line(LineSeries::categorical("b", vec![Some(5.0), Some(9.0), Some(7.0)]));
        let descriptor = Figure::new(1, 2)
            .shared(true, true)
            .with_axes(left)
            .with_axes(right)
            .finish()
            .unwrap();

        assert_eq!(descriptor.panels[0].limits, descriptor.panels[1].limits);
        assert_eq!(descriptor.panels[0].limits.y, (0.0, 9.0));
        assert_eq!(descriptor.panels[1].col, 1);
    }

    #[test]
    fn test_finish_rejects_overfull_grid() {
        let figure = Figure::new(1, 1).with_axes(Axes::new()).with_axes(Axes::new());
        assert!(figure.finish().is_err());
        assert!(Figure::new(0, 1).finish().is_err());
    }

    #[test]
    fn test_y_formatter_labels_ticks() {
        let axes = Axes::new()
            .line(LineSeries::categorical("sales", vec![Some(0.0), Some(40_000.0)]))
            .y_formatter(TickFormatter::Comma);
        let descriptor = Figure::single(axes).finish().unwrap();
        assert_eq!(
            descriptor.panels[0].y_ticks.labels,
            vec!["0", "10,000", "20,000", "30,000", "40,000"]
        );
    }

    #[test]
    fn test_descriptor_serializes() {
        let json = Figure::single(Axes::new().title("t"))
            .finish()
            .unwrap()
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["panels"][0]["axes"]["title"], "t");
    }
}

//! Grid-of-subplots layout.
//!
//! Splits grouped data into one panel per group, arranged row-major in a
//! `rows × cols` grid with shared axes and a single legend.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use crate::error::{Result, VizError};
use crate::figure::{Axes, Figure, DEFAULT_FIGSIZE};

/// Which panel keeps its legend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPlacement {
    /// Last panel of the last row
    #[default]
    Lower,
    /// Last panel of the first row
    Upper,
    None,
}

impl FromStr for LegendPlacement {
    type Err = VizError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lower" => Ok(LegendPlacement::Lower),
            "upper" => Ok(LegendPlacement::Upper),
            "none" => Ok(LegendPlacement::None),
            _ => Err(VizError::invalid(
                "legend_loc",
                format!("Invalid legend placement: {}. Must be one of: lower, upper, none", s),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    pub rows: usize,
    pub cols: usize,
    #[serde(default = "default_figsize")]
    pub figsize: (f64, f64),
    #[serde(default)]
    pub legend: LegendPlacement,
}

fn default_figsize() -> (f64, f64) {
    DEFAULT_FIGSIZE
}

impl GridOptions {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            figsize: DEFAULT_FIGSIZE,
            legend: LegendPlacement::Lower,
        }
    }
}

/// One cell of the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridPanel {
    pub row: usize,
    pub col: usize,
    pub group: String,
    pub show_legend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub figsize: (f64, f64),
    pub panels: Vec<GridPanel>,
}

/// Lay out one panel per distinct group value (first-seen order).
///
/// The number of distinct groups must be exactly `rows * cols`.
pub fn grid_layout<I, S>(groups: I, options: &GridOptions) -> Result<GridLayout>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if options.rows == 0 || options.cols == 0 {
        return Err(VizError::config("Grid needs at least one row and one column"));
    }

    let mut seen = HashSet::new();
    let unique: Vec<String> = groups
        .into_iter()
        .filter_map(|g| {
            let g = g.as_ref().to_string();
            seen.insert(g.clone()).then_some(g)
        })
        .collect();

    if unique.len() != options.rows * options.cols {
        return Err(VizError::config(format!(
            "{} distinct groups cannot be arranged as {}x{}",
            unique.len(),
            options.rows,
            options.cols
        )));
    }

    let panels = unique
        .into_iter()
        .enumerate()
        .map(|(i, group)| {
            let (row, col) = (i / options.cols, i % options.cols);
            let last_col = col + 1 == options.cols;
            let show_legend = match options.legend {
                LegendPlacement::Lower => last_col && row + 1 == options.rows,
                LegendPlacement::Upper => last_col && row == 0,
                LegendPlacement::None => false,
            };
            GridPanel {
                row,
                col,
                group,
                show_legend,
            }
        })
        .collect();

    Ok(GridLayout {
        rows: options.rows,
        cols: options.cols,
        figsize: options.figsize,
        panels,
    })
}

impl GridLayout {
    pub fn panel(&self, row: usize, col: usize) -> Option<&GridPanel> {
        self.panels.iter().find(|p| p.row == row && p.col == col)
    }

    /// Partition records by panel group
    pub fn subsets<'a, T, F>(&self, records: &'a [T], group_of: F) -> Vec<(&GridPanel, Vec<&'a T>)>
    where
        F: Fn(&T) -> &str,
    {
        self.panels
            .iter()
            .map(|panel| {
                let rows = records
                    .iter()
                    .filter(|r| group_of(*r) == panel.group)
                    .collect();
                (panel, rows)
            })
            .collect()
    }

    /// Draw every panel with `draw` and assemble a shared-axes figure.
    ///
    /// Each panel is titled with its group, has its axis labels cleared and
    /// grid lines on; legends are dropped except on the legend panel.
    pub fn into_figure<F>(self, mut draw: F) -> Result<Figure>
    where
        F: FnMut(&GridPanel) -> Result<Axes>,
    {
        let mut figure = Figure::new(self.rows, self.cols)
            .size(self.figsize.0, self.figsize.1)
            .shared(true, true);

        for panel in &self.panels {
            let mut axes = draw(panel)?.grid(true);
            axes.set_title(Some(panel.group.clone()));
            axes.clear_axis_labels();
            if !panel.show_legend {
                axes.set_legend(None);
            }
            figure = figure.with_axes(axes);
        }
        Ok(figure)
    }
}

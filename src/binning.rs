//! Point-to-polygon spatial binning.
//!
//! Counts points on a `bins × bins` grid spanning their bounding box and turns
//! every occupied cell into a rectangle carrying its count, ready to be drawn as
//! a choropleth.

use geo::{coord, Area, BoundingRect, Point, Polygon, Rect};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, VizError};
use crate::figure::{Axes, FillLayer};

/// Largest accepted bin count along each axis
pub const MAX_BINS: usize = 4096;

/// Options for [`bin_points_with`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinOptions {
    /// Number of bins along each axis
    pub bins: usize,
    /// Cells with exactly this count are dropped
    #[serde(default)]
    pub mask: u64,
    /// Attribute name the count is published under
    #[serde(default = "default_value_name")]
    pub value_name: String,
}

fn default_value_name() -> String {
    "value".to_string()
}

impl BinOptions {
    pub fn new(bins: usize) -> Self {
        Self {
            bins,
            mask: 0,
            value_name: default_value_name(),
        }
    }
}

/// One emitted histogram cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinCell {
    /// Column along x
    pub ix: usize,
    /// Row along y
    pub iy: usize,
    pub polygon: Polygon<f64>,
    pub value: u64,
}

/// Binned points as polygons
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choropleth {
    pub value_name: String,
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    /// Full histogram indexed `[ix, iy]`, masked cells included
    #[serde(skip)]
    pub counts: Array2<u64>,
    pub cells: Vec<BinCell>,
}

impl Choropleth {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Summed area of all emitted polygons
    pub fn total_area(&self) -> f64 {
        self.cells.iter().map(|c| c.polygon.unsigned_area()).sum()
    }

    /// Smallest and largest emitted value
    pub fn value_range(&self) -> Option<(u64, u64)> {
        let min = self.cells.iter().map(|c| c.value).min()?;
        let max = self.cells.iter().map(|c| c.value).max()?;
        Some((min, max))
    }

    /// Bounding box of the whole grid
    pub fn extent(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.x_edges[0], y: self.y_edges[0] },
            coord! { x: self.x_edges[self.x_edges.len() - 1], y: self.y_edges[self.y_edges.len() - 1] },
        )
    }

    /// Export as a GeoJSON FeatureCollection with the count under `value_name`
    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .cells
            .iter()
            .map(|cell| {
                let mut properties = JsonObject::new();
                properties.insert(self.value_name.clone(), cell.value.into());
                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(geojson::Value::from(&cell.polygon))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    /// Fill layer for an axes, colored by `colormap`
    pub fn to_fill_layer(&self, colormap: &str) -> FillLayer {
        FillLayer::new(&self.value_name, colormap).polygons(
            self.cells
                .iter()
                .map(|c| (c.polygon.clone(), c.value as f64)),
        )
    }

    /// Axes holding this choropleth with limits set to the grid extent
    pub fn into_axes(self, colormap: &str) -> Axes {
        let extent = self.extent();
        Axes::new()
            .fill(self.to_fill_layer(colormap))
            .limits(extent.into())
    }
}

/// Equal-width bin edges; a zero-width range is widened to `[v - 0.5, v + 0.5]`
fn bin_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins).map(|k| lo + k as f64 * width).collect();
    edges[bins] = hi;
    edges
}

/// Bin index of `v`; bins are half-open except the last, which includes its right edge
fn bin_index(edges: &[f64], v: f64) -> usize {
    let bins = edges.len() - 1;
    let upper = edges.partition_point(|&e| e <= v);
    upper.saturating_sub(1).min(bins - 1)
}

/// Bin points into polygons with the default options and a custom `mask`/`value_name`
pub fn bin_points(
    points: &[Point<f64>],
    bins: usize,
    mask: u64,
    value_name: &str,
) -> Result<Choropleth> {
    bin_points_with(
        points,
        &BinOptions {
            bins,
            mask,
            value_name: value_name.to_string(),
        },
    )
}

/// Bin points into `bins × bins` rectangles, dropping cells whose count equals the mask
pub fn bin_points_with(points: &[Point<f64>], options: &BinOptions) -> Result<Choropleth> {
    if options.bins == 0 {
        return Err(VizError::config("Bin count must be positive"));
    }
    if options.bins > MAX_BINS {
        return Err(VizError::config(format!(
            "Bin count {} exceeds the maximum of {}",
            options.bins, MAX_BINS
        )));
    }
    if options.value_name.is_empty() {
        return Err(VizError::invalid("value_name", "Value name cannot be empty"));
    }
    if points.is_empty() {
        return Err(VizError::EmptyInput {
            message: "Cannot bin an empty point set".to_string(),
        });
    }
    if let Some(bad) = points.iter().find(|p| !p.x().is_finite() || !p.y().is_finite()) {
        return Err(VizError::invalid(
            "points",
            format!("Non-finite coordinate ({}, {})", bad.x(), bad.y()),
        ));
    }

    let bounds = geo::MultiPoint::from(points.to_vec())
        .bounding_rect()
        .ok_or_else(|| VizError::EmptyInput {
            message: "Point set has no bounding box".to_string(),
        })?;

    let x_edges = bin_edges(bounds.min().x, bounds.max().x, options.bins);
    let y_edges = bin_edges(bounds.min().y, bounds.max().y, options.bins);

    let mut counts = Array2::<u64>::zeros((options.bins, options.bins));
    for p in points {
        counts[[bin_index(&x_edges, p.x()), bin_index(&y_edges, p.y())]] += 1;
    }

    let mut cells = Vec::new();
    for ix in 0..options.bins {
        for iy in 0..options.bins {
            let value = counts[[ix, iy]];
            if value == options.mask {
                continue;
            }
            let polygon = Rect::new(
                coord! { x: x_edges[ix], y: y_edges[iy] },
                coord! { x: x_edges[ix + 1], y: y_edges[iy + 1] },
            )
            .to_polygon();
            cells.push(BinCell {
                ix,
                iy,
                polygon,
                value,
            });
        }
    }

    debug!(
        points = points.len(),
        bins = options.bins,
        mask = options.mask,
        emitted = cells.len(),
        "Binned points into polygons"
    );

    Ok(Choropleth {
        value_name: options.value_name.clone(),
        x_edges,
        y_edges,
        counts,
        cells,
    })
}

/// Read points from CSV with an `x,y` (or `lon,lat`) header
pub fn points_from_csv_reader<R: Read>(reader: R) -> Result<Vec<Point<f64>>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut points = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let field_at = |i: usize| -> Result<f64> {
            let field = record.get(i).unwrap_or("");
            field.parse::<f64>().map_err(|_| {
                VizError::invalid("csv", format!("Row {}: invalid coordinate '{}'", line + 1, field))
            })
        };
        points.push(Point::new(field_at(0)?, field_at(1)?));
    }
    Ok(points)
}

pub fn points_from_csv_path(path: &Path) -> Result<Vec<Point<f64>>> {
    let file = std::fs::File::open(path)?;
    points_from_csv_reader(file)
}

//! Map helpers: bounds, zooming to a region, map cleanup and polygon labels.

use geo::{BoundingRect, Centroid, Geometry, Polygon};
use geojson::GeoJson;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Result, VizError};
use crate::figure::{Align, Annotation, Axes, Spines, VerticalAlign, ViewLimits};

/// Padding added around a zoomed region per unit of zoom, in map units
pub const ZOOM_PADDING: f64 = 0.01;

/// Default annotation text size
pub const DEFAULT_TEXT_SIZE: f64 = 10.0;

/// A map region: a geometry with string attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub properties: BTreeMap<String, String>,
    pub geometry: Geometry<f64>,
}

impl Region {
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            properties: BTreeMap::new(),
            geometry,
        }
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Read regions from a GeoJSON FeatureCollection, stringifying scalar properties
pub fn regions_from_geojson(text: &str) -> Result<Vec<Region>> {
    let collection = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => geojson::FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        },
        GeoJson::Geometry(_) => {
            return Err(VizError::invalid(
                "geojson",
                "Expected a Feature or FeatureCollection, found a bare geometry",
            ))
        }
    };

    collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let properties = feature
                .properties
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| {
                    let v = match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (k, v)
                })
                .collect();
            feature.geometry.map(|geometry| {
                Geometry::<f64>::try_from(geometry).map(|geometry| Region {
                    properties,
                    geometry,
                })
            })
        })
        .map(|region| region.map_err(VizError::from))
        .collect()
}

/// Overall bounds as `((min_x, max_x), (min_y, max_y))`
pub fn get_bounds<'a, I>(geometries: I) -> Result<((f64, f64), (f64, f64))>
where
    I: IntoIterator<Item = &'a Geometry<f64>>,
{
    let limits = geometries
        .into_iter()
        .filter_map(|g| g.bounding_rect())
        .map(ViewLimits::from)
        .reduce(|a, b| a.union(&b))
        .ok_or_else(|| VizError::EmptyInput {
            message: "No geometry with a bounding box".to_string(),
        })?;
    Ok((limits.x, limits.y))
}

/// Set the axes limits to the regions whose `column` equals `value`, padded by
/// `ZOOM_PADDING * zoom` on every side
pub fn zoom_to_region(
    axes: &mut Axes,
    regions: &[Region],
    column: &str,
    value: &str,
    zoom: f64,
) -> Result<ViewLimits> {
    let matching = regions
        .iter()
        .filter(|r| r.property(column) == Some(value))
        .map(|r| &r.geometry);

    let ((min_x, max_x), (min_y, max_y)) = get_bounds(matching).map_err(|_| {
        VizError::DataNotFound {
            message: format!("No region with {} = {}", column, value),
        }
    })?;

    let pad = ZOOM_PADDING * zoom;
    let limits = ViewLimits::new((min_x - pad, max_x + pad), (min_y - pad, max_y + pad));
    debug!(column = column, value = value, zoom = zoom, limits = ?limits, "Zoomed to region");
    axes.set_limits(limits);
    Ok(limits)
}

/// Remove ticks, tick labels and all four spines
pub fn clean_map(axes: &mut Axes) {
    let style = axes.style_mut();
    style.x_ticks = false;
    style.y_ticks = false;
    style.x_tick_labels = false;
    style.y_tick_labels = false;
    style.spines = Spines::all(false);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelOptions {
    pub size: f64,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_TEXT_SIZE,
        }
    }
}

/// Centered label at the centroid of a polygon, or of each part of a multipolygon.
///
/// Returns the number of labels placed.
pub fn label_polygon(
    axes: &mut Axes,
    label: &str,
    geometry: &Geometry<f64>,
    options: &LabelOptions,
) -> Result<usize> {
    let parts: Vec<&Polygon<f64>> = match geometry {
        Geometry::Polygon(polygon) => vec![polygon],
        Geometry::MultiPolygon(multi) => multi.0.iter().collect(),
        _ => {
            return Err(VizError::invalid(
                "geometry",
                "Only polygons and multipolygons can be labeled",
            ))
        }
    };

    let mut placed = 0;
    for centroid in parts.iter().filter_map(|p| p.centroid()) {
        axes.annotate(Annotation {
            text: label.to_string(),
            x: centroid.x(),
            y: centroid.y(),
            size: options.size,
            align: Align::Center,
            vertical_align: VerticalAlign::Center,
        });
        placed += 1;
    }
    Ok(placed)
}

/// Parse a bounding box string "min_x,min_y,max_x,max_y" into view limits
pub fn parse_bbox(bbox: &str) -> Result<ViewLimits> {
    let parts: Vec<&str> = bbox.split(',').collect();
    if parts.len() != 4 {
        return Err(VizError::invalid(
            "bbox",
            "Bounding box must be in format 'min_x,min_y,max_x,max_y'",
        ));
    }

    let names = ["min_x", "min_y", "max_x", "max_y"];
    let mut values = [0.0f64; 4];
    for (i, part) in parts.iter().enumerate() {
        values[i] = part
            .trim()
            .parse::<f64>()
            .map_err(|_| VizError::invalid("bbox", format!("Invalid {}: {}", names[i], part)))?;
    }
    let [min_x, min_y, max_x, max_y] = values;

    if min_x > max_x || min_y > max_y {
        return Err(VizError::invalid(
            "bbox",
            format!(
                "Minimum must not exceed maximum: x {}..{}, y {}..{}",
                min_x, max_x, min_y, max_y
            ),
        ));
    }

    Ok(ViewLimits::new((min_x, max_x), (min_y, max_y)))
}

//! Rasterization of a [`RenderDescriptor`] to PNG or JPEG.
//!
//! Polygon fills are painted pixel by pixel through their colormap, then line
//! series, grid, spines, ticks and legend swatches are drawn on top with
//! plotters. Text (titles, labels, tick labels, annotations) stays in the
//! descriptor and is not rasterized.

mod lines;
mod raster;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::{Result, VizError};
use crate::figure::{RenderDescriptor, ViewLimits};

pub use raster::fill_layer;

/// Pixels per inch of figure size
pub const DEFAULT_DPI: u32 = 100;

/// Largest accepted image edge in pixels
pub const MAX_IMAGE_EDGE: u32 = 8192;

/// Fraction of a panel cell left empty on each side
const PANEL_MARGIN: f64 = 0.08;

/// Share of the plot width given up to an outside legend
const OUTSIDE_LEGEND_WIDTH: f64 = 0.15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = VizError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            _ => Err(VizError::invalid(
                "format",
                format!("Unsupported format: {}. Must be one of: png, jpeg", s),
            )),
        }
    }
}

/// Output settings for [`render_png`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_dpi() -> u32 {
    DEFAULT_DPI
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            format: OutputFormat::Png,
        }
    }
}

impl RenderConfig {
    /// Pixel dimensions for a figure size given in inches
    pub fn pixel_size(&self, size: (f64, f64)) -> Result<(u32, u32)> {
        let to_pixels = |inches: f64| -> Result<u32> {
            let pixels = (inches * self.dpi as f64).round();
            if pixels < 1.0 || pixels > MAX_IMAGE_EDGE as f64 {
                return Err(VizError::invalid(
                    "size",
                    format!(
                        "Figure edge of {} inches at {} dpi is outside 1..={} pixels",
                        inches, self.dpi, MAX_IMAGE_EDGE
                    ),
                ));
            }
            Ok(pixels as u32)
        };
        Ok((to_pixels(size.0)?, to_pixels(size.1)?))
    }
}

/// Pixel rectangle of one panel's plotting area
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlotArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PlotArea {
    /// Area of the panel at (`row`, `col`) within a `rows × cols` image grid
    fn for_cell(image: (u32, u32), rows: usize, cols: usize, row: usize, col: usize, outside_legend: bool) -> Self {
        let cell_w = image.0 as f64 / cols as f64;
        let cell_h = image.1 as f64 / rows as f64;
        let margin_x = (cell_w * PANEL_MARGIN).max(1.0);
        let margin_y = (cell_h * PANEL_MARGIN).max(1.0);

        let mut width = (cell_w - 2.0 * margin_x).max(1.0);
        if outside_legend {
            width = (width * (1.0 - OUTSIDE_LEGEND_WIDTH)).max(1.0);
        }
        Self {
            x: (col as f64 * cell_w + margin_x) as u32,
            y: (row as f64 * cell_h + margin_y) as u32,
            width: width as u32,
            height: ((cell_h - 2.0 * margin_y).max(1.0)) as u32,
        }
    }

    /// Pixel position of a data coordinate, y axis pointing up
    pub fn to_pixel(&self, limits: &ViewLimits, x: f64, y: f64) -> (f64, f64) {
        let fx = (x - limits.x.0) / (limits.x.1 - limits.x.0);
        let fy = (y - limits.y.0) / (limits.y.1 - limits.y.0);
        (
            self.x as f64 + fx * self.width as f64,
            self.y as f64 + (1.0 - fy) * self.height as f64,
        )
    }

    /// Data coordinate of a pixel position
    pub fn to_data(&self, limits: &ViewLimits, px: f64, py: f64) -> (f64, f64) {
        let fx = (px - self.x as f64) / self.width as f64;
        let fy = 1.0 - (py - self.y as f64) / self.height as f64;
        (
            limits.x.0 + fx * (limits.x.1 - limits.x.0),
            limits.y.0 + fy * (limits.y.1 - limits.y.0),
        )
    }
}

pub(crate) fn render_err<E: std::fmt::Display>(error: E) -> VizError {
    VizError::Render {
        message: error.to_string(),
    }
}

/// Rasterize the descriptor into an RGB image
pub fn render_image(descriptor: &RenderDescriptor, config: &RenderConfig) -> Result<RgbImage> {
    let (width, height) = config.pixel_size(descriptor.size)?;
    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    let areas: Vec<PlotArea> = descriptor
        .panels
        .iter()
        .map(|panel| {
            let outside = panel
                .axes
                .legend()
                .map(|l| l.anchor.is_some())
                .unwrap_or(false);
            PlotArea::for_cell(
                (width, height),
                descriptor.rows,
                descriptor.cols,
                panel.row,
                panel.col,
                outside,
            )
        })
        .collect();

    let mut painted = 0;
    for (panel, area) in descriptor.panels.iter().zip(&areas) {
        for layer in panel.axes.fills() {
            painted += fill_layer(&mut img, area, &panel.limits, layer)?;
        }
    }

    lines::draw_panels(&mut img, &descriptor.panels, &areas)?;

    debug!(
        width = width,
        height = height,
        panels = descriptor.panels.len(),
        filled_pixels = painted,
        "Rasterized figure"
    );
    Ok(img)
}

/// Rasterize and encode the descriptor in the configured format
pub fn render_png(descriptor: &RenderDescriptor, config: &RenderConfig) -> Result<Vec<u8>> {
    let start = Instant::now();
    let img = render_image(descriptor, config)?;

    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut buffer, config.format.image_format())?;
    let bytes = buffer.into_inner();

    info!(
        format = config.format.extension(),
        bytes = bytes.len(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Figure encoded"
    );
    Ok(bytes)
}

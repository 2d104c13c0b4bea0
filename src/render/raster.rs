//! Per-pixel polygon fill.

use geo::{BoundingRect, Intersects, Point};
use image::{Rgb, RgbImage};

use super::PlotArea;
use crate::colormaps::get_colormap;
use crate::error::Result;
use crate::figure::{FillLayer, ViewLimits};

/// Paint every polygon of `layer` whose area covers a pixel center.
///
/// Colors are normalized over the layer's own value range and alpha-blended
/// onto the image. Returns the number of pixels painted.
pub fn fill_layer(
    img: &mut RgbImage,
    area: &PlotArea,
    limits: &ViewLimits,
    layer: &FillLayer,
) -> Result<usize> {
    let colormap = get_colormap(&layer.colormap)?;
    let Some((min_val, max_val)) = layer.value_range() else {
        return Ok(0);
    };

    let x_end = (area.x + area.width).min(img.width());
    let y_end = (area.y + area.height).min(img.height());
    let mut painted = 0;

    for (polygon, value) in &layer.polygons {
        if !value.is_finite() {
            continue;
        }
        let Some(rect) = polygon.bounding_rect() else {
            continue;
        };

        // Pixel window of the polygon's bounding box, clipped to the plot area
        let (left, bottom) = area.to_pixel(limits, rect.min().x, rect.min().y);
        let (right, top) = area.to_pixel(limits, rect.max().x, rect.max().y);
        let px_start = left.floor().max(area.x as f64) as u32;
        let py_start = top.floor().max(area.y as f64) as u32;
        let px_stop = (right.ceil().max(0.0) as u32).min(x_end);
        let py_stop = (bottom.ceil().max(0.0) as u32).min(y_end);

        let [r, g, b, a] = colormap.map(*value, min_val, max_val);
        let alpha = a as f64 / 255.0;

        for py in py_start..py_stop {
            for px in px_start..px_stop {
                let (x, y) = area.to_data(limits, px as f64 + 0.5, py as f64 + 0.5);
                if !polygon.intersects(&Point::new(x, y)) {
                    continue;
                }
                let pixel = img.get_pixel_mut(px, py);
                let blend = |under: u8, over: u8| {
                    (under as f64 * (1.0 - alpha) + over as f64 * alpha).round() as u8
                };
                *pixel = Rgb([blend(pixel[0], r), blend(pixel[1], g), blend(pixel[2], b)]);
                painted += 1;
            }
        }
    }

    Ok(painted)
}

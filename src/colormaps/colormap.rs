//! Colormap trait and utilities.
//!
//! This module defines the common interface for all continuous colormaps.

use crate::error::{Result, VizError};

/// Trait for color mapping implementations
pub trait Colormap {
    /// Map a normalized value (0.0 to 1.0) to an RGBA color
    fn map_normalized(&self, value: f64) -> [u8; 4];

    /// Map a value to an RGBA color given the data range
    fn map(&self, value: f64, min: f64, max: f64) -> [u8; 4] {
        let normalized = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.map_normalized(normalized)
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// Names accepted by [`get_colormap`]
pub const COLORMAP_NAMES: &[&str] = &[
    "viridis", "plasma", "inferno", "magma", "cividis", "blues", "reds", "coolwarm", "rdbu",
    "seismic",
];

/// Get a colormap by name
pub fn get_colormap(name: &str) -> Result<Box<dyn Colormap>> {
    use super::{diverging::*, sequential::Sequential};

    match name.to_lowercase().as_str() {
        "viridis" => Ok(Box::new(Sequential::viridis())),
        "plasma" => Ok(Box::new(Sequential::plasma())),
        "inferno" => Ok(Box::new(Sequential::inferno())),
        "magma" => Ok(Box::new(Sequential::magma())),
        "cividis" => Ok(Box::new(Sequential::cividis())),
        "blues" => Ok(Box::new(Sequential::blues())),
        "reds" => Ok(Box::new(Sequential::reds())),
        "coolwarm" => Ok(Box::new(Coolwarm)),
        "rdbu" => Ok(Box::new(RdBu)),
        "seismic" => Ok(Box::new(Seismic)),
        _ => Err(VizError::InvalidParameter {
            param: "colormap".to_string(),
            message: format!(
                "Unknown colormap: {}. Must be one of: {}",
                name,
                COLORMAP_NAMES.join(", ")
            ),
        }),
    }
}

/// Linear interpolation between two colors
pub fn lerp_color(c1: [u8; 3], c2: [u8; 3], t: f64) -> [u8; 3] {
    [
        (c1[0] as f64 * (1.0 - t) + c2[0] as f64 * t) as u8,
        (c1[1] as f64 * (1.0 - t) + c2[1] as f64 * t) as u8,
        (c1[2] as f64 * (1.0 - t) + c2[2] as f64 * t) as u8,
    ]
}

/// Piecewise-linear lookup into an evenly spaced color table
pub fn table_lookup(colors: &[[u8; 3]], value: f64) -> [u8; 4] {
    let last = colors.len() - 1;
    let position = value.clamp(0.0, 1.0) * last as f64;
    let index = position.floor() as usize;

    if index >= last {
        let [r, g, b] = colors[last];
        return [r, g, b, 255];
    }

    let rgb = lerp_color(colors[index], colors[index + 1], position - index as f64);
    [rgb[0], rgb[1], rgb[2], 255]
}

/// Parse `#rrggbb` into its components
pub fn parse_hex_color(hex: &str) -> Result<[u8; 3]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(VizError::invalid("color", format!("Invalid hex color: {}", hex)));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| VizError::invalid("color", format!("Invalid hex color: {}", hex)))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// Format an RGB triple as `#rrggbb`
pub fn to_hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

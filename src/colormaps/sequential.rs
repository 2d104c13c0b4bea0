//! Sequential colormaps (single-direction progression).
//!
//! These colormaps are suitable for counts and other data that progresses from
//! low to high, which is what binned choropleths produce.

use colorgrad::Gradient;

use super::colormap::Colormap;

/// A sequential colormap backed by a `colorgrad` preset gradient
pub struct Sequential {
    name: &'static str,
    gradient: Gradient,
}

impl Sequential {
    /// Viridis colormap - perceptually uniform, colorblind-friendly
    pub fn viridis() -> Self {
        Self {
            name: "viridis",
            gradient: colorgrad::viridis(),
        }
    }

    pub fn plasma() -> Self {
        Self {
            name: "plasma",
            gradient: colorgrad::plasma(),
        }
    }

    pub fn inferno() -> Self {
        Self {
            name: "inferno",
            gradient: colorgrad::inferno(),
        }
    }

    pub fn magma() -> Self {
        Self {
            name: "magma",
            gradient: colorgrad::magma(),
        }
    }

    /// Cividis colormap - colorblind-friendly alternative to viridis
    pub fn cividis() -> Self {
        Self {
            name: "cividis",
            gradient: colorgrad::cividis(),
        }
    }

    pub fn blues() -> Self {
        Self {
            name: "blues",
            gradient: colorgrad::blues(),
        }
    }

    pub fn reds() -> Self {
        Self {
            name: "reds",
            gradient: colorgrad::reds(),
        }
    }
}

impl Colormap for Sequential {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        self.gradient.at(value.clamp(0.0, 1.0)).to_rgba8()
    }

    fn name(&self) -> &str {
        self.name
    }
}

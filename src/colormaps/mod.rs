//! Colormap implementations.
//!
//! Continuous colormaps color choropleth fills; the categorical palette colors
//! line series and grouped data.

pub mod categorical;
pub mod colormap;
pub mod diverging;
pub mod sequential;

pub use categorical::{build_colormap, cycle_color, CategoricalColormap, TAB10};
pub use colormap::{get_colormap, parse_hex_color, to_hex_color, Colormap, COLORMAP_NAMES};

// Re-export commonly used colormaps
pub use diverging::{Coolwarm, RdBu, Seismic};
pub use sequential::Sequential;

//! # dataviz
//!
//! Plotting conveniences for monthly time series and point data.
//!
//! Plot helpers build a [`Figure`] out of [`figure::Axes`] without drawing
//! anything; [`Figure::finish`] freezes it into a serializable
//! [`RenderDescriptor`] which [`render::render_png`] can rasterize.
//!
//! ## Key Features
//!
//! - **Multi-year overlays**: one line per year window on a shared month axis,
//!   with an optional highlighted window
//! - **Choropleth binning**: points counted on a regular grid and emitted as
//!   polygons or GeoJSON
//! - **Legends and grids**: legend ordering and outside placement, grids of
//!   panels with shared axes
//! - **Map helpers**: bounds, region zoom, map cleanup and polygon labels

pub mod binning;
pub mod colormaps;
pub mod commands;
pub mod config;
pub mod error;
pub mod figure;
pub mod geoutil;
pub mod grid;
pub mod legend;
pub mod logging;
pub mod overlay;
pub mod render;
pub mod series;
pub mod ticks;

pub use binning::{bin_points, bin_points_with, BinOptions, Choropleth};
pub use config::Config;
pub use error::{Result, VizError};
pub use figure::{Axes, Figure, RenderDescriptor};
pub use legend::{custom_legend, LegendOptions};
pub use logging::{
    generate_operation_id, init_tracing, log_error, log_operation_end, log_operation_start,
    log_timed_operation,
};
pub use overlay::{build_overlay, build_overlay_with, Overlay, OverlayOptions};
pub use series::MonthlySeries;

//! Configuration management for dataviz.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::binning::MAX_BINS;
use crate::colormaps::COLORMAP_NAMES;
use crate::error::{Result, VizError};
use crate::figure::DEFAULT_FIGSIZE;
use crate::legend::{LegendOrder, OutsideLocation};
use crate::overlay::{DEFAULT_BACKGROUND_ALPHA, DEFAULT_LINE_WIDTH};
use crate::render::{OutputFormat, RenderConfig, DEFAULT_DPI};
use crate::series::validate_date_format;

/// Command-line arguments for dataviz
#[derive(Parser, Debug)]
#[command(name = "dataviz")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to JSON configuration file
    #[arg(short, long, env = "DATAVIZ_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DATAVIZ_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Pixels per inch of figure size
    #[arg(long, env = "DATAVIZ_DPI", global = true)]
    pub dpi: Option<u32>,

    /// Image format (png or jpeg)
    #[arg(long, env = "DATAVIZ_FORMAT", global = true)]
    pub format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Overlay the years of a monthly series on one month axis
    Overlay(OverlayArgs),
    /// Bin points into a grid of counted rectangles
    Choropleth(ChoroplethArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct OverlayArgs {
    /// CSV file with a `date,<name>` header
    pub input: PathBuf,

    /// Consecutive years per window
    #[arg(long, env = "DATAVIZ_STEP_SIZE")]
    pub step_size: Option<usize>,

    /// Terminal year of the window to highlight
    #[arg(long)]
    pub highlight_year: Option<i32>,

    /// strftime pattern for the month axis labels
    #[arg(long, env = "DATAVIZ_LABEL_FORMAT")]
    pub label_format: Option<String>,

    /// Legend order (default, reverse, desc)
    #[arg(long)]
    pub legend_order: Option<String>,

    /// Put the legend outside the axes (lower, center, upper)
    #[arg(long)]
    pub legend_outside: Option<String>,

    /// Write the render descriptor as JSON here
    #[arg(long)]
    pub out_json: Option<PathBuf>,

    /// Write the rendered image here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ChoroplethArgs {
    /// CSV file with `x,y` columns
    pub input: PathBuf,

    /// Bins along each axis
    #[arg(long, env = "DATAVIZ_BINS")]
    pub bins: Option<usize>,

    /// Drop cells with exactly this count
    #[arg(long)]
    pub mask: Option<u64>,

    /// Attribute name for the counts
    #[arg(long)]
    pub value_name: Option<String>,

    /// Continuous colormap name
    #[arg(long, env = "DATAVIZ_COLORMAP")]
    pub colormap: Option<String>,

    /// View window as "min_x,min_y,max_x,max_y"
    #[arg(long)]
    pub bbox: Option<String>,

    /// GeoJSON regions to label and zoom into
    #[arg(long)]
    pub regions: Option<PathBuf>,

    /// Region property used as each region's label
    #[arg(long, requires = "regions")]
    pub label_column: Option<String>,

    /// Zoom to regions matching "column=value"
    #[arg(long, requires = "regions")]
    pub zoom: Option<String>,

    /// Padding multiplier for --zoom
    #[arg(long, default_value = "1.0")]
    pub zoom_factor: f64,

    /// Write the cells as a GeoJSON FeatureCollection here
    #[arg(long)]
    pub out_geojson: Option<PathBuf>,

    /// Write the render descriptor as JSON here
    #[arg(long)]
    pub out_json: Option<PathBuf>,

    /// Write the rendered image here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Defaults for the overlay command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default = "default_step_size")]
    pub step_size: usize,

    #[serde(default = "default_label_format")]
    pub label_format: String,

    #[serde(default = "default_background_alpha")]
    pub background_alpha: f64,

    #[serde(default = "default_line_width")]
    pub line_width: u32,

    /// default, reverse or desc
    #[serde(default = "default_legend_order")]
    pub legend_order: String,

    /// lower, center or upper; inside the axes when unset
    #[serde(default)]
    pub legend_outside: Option<String>,
}

/// Defaults for the choropleth command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinningConfig {
    #[serde(default = "default_bins")]
    pub bins: usize,

    #[serde(default)]
    pub mask: u64,

    #[serde(default = "default_value_name")]
    pub value_name: String,

    #[serde(default = "default_colormap")]
    pub colormap: String,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Image output settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Figure size in inches
    #[serde(default = "default_figsize")]
    pub figsize: (f64, f64),

    #[serde(default)]
    pub overlay: OverlayConfig,

    #[serde(default)]
    pub binning: BinningConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Command)> {
        Self::from_args(Args::parse())
    }

    /// Resolve configuration from parsed arguments
    pub fn from_args(args: Args) -> Result<(Self, Command)> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if let Some(log_level) = args.log_level {
            config.log_level = log_level;
        }
        if let Some(dpi) = args.dpi {
            config.render.dpi = dpi;
        }
        if let Some(format) = &args.format {
            config.render.format = format.parse()?;
        }
        config.apply_command(&args.command);

        Ok((config, args.command))
    }

    fn apply_command(&mut self, command: &Command) {
        match command {
            Command::Overlay(args) => {
                let overlay = &mut self.overlay;
                if let Some(step_size) = args.step_size {
                    overlay.step_size = step_size;
                }
                if let Some(label_format) = &args.label_format {
                    overlay.label_format = label_format.clone();
                }
                if let Some(order) = &args.legend_order {
                    overlay.legend_order = order.clone();
                }
                if args.legend_outside.is_some() {
                    overlay.legend_outside = args.legend_outside.clone();
                }
            }
            Command::Choropleth(args) => {
                let binning = &mut self.binning;
                if let Some(bins) = args.bins {
                    binning.bins = bins;
                }
                if let Some(mask) = args.mask {
                    binning.mask = mask;
                }
                if let Some(value_name) = &args.value_name {
                    binning.value_name = value_name.clone();
                }
                if let Some(colormap) = &args.colormap {
                    binning.colormap = colormap.clone();
                }
            }
        }
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.render = other.render;
        self.figsize = other.figsize;
        self.overlay = other.overlay;
        self.binning = other.binning;
        self.log_level = other.log_level;
    }

    /// Legend order parsed from the overlay settings
    pub fn legend_order(&self) -> Result<LegendOrder> {
        self.overlay.legend_order.parse()
    }

    /// Outside legend location parsed from the overlay settings
    pub fn legend_outside(&self) -> Result<Option<OutsideLocation>> {
        self.overlay
            .legend_outside
            .as_deref()
            .map(str::parse::<OutsideLocation>)
            .transpose()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(VizError::config(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.log_level
                )));
            }
        }

        if self.render.dpi == 0 {
            return Err(VizError::config("DPI must be positive"));
        }
        self.render.pixel_size(self.figsize)?;

        let overlay = &self.overlay;
        if overlay.step_size == 0 {
            return Err(VizError::config("Step size must be a positive number of years"));
        }
        if !(0.0..=1.0).contains(&overlay.background_alpha) {
            return Err(VizError::config(format!(
                "Background alpha must be within [0, 1], got {}",
                overlay.background_alpha
            )));
        }
        if overlay.line_width == 0 {
            return Err(VizError::config("Line width must be positive"));
        }
        validate_date_format(&overlay.label_format)?;
        self.legend_order()?;
        self.legend_outside()?;

        let binning = &self.binning;
        if binning.bins == 0 {
            return Err(VizError::config("Bin count must be positive"));
        }
        if binning.bins > MAX_BINS {
            return Err(VizError::config(format!(
                "Bin count {} exceeds the maximum of {}",
                binning.bins, MAX_BINS
            )));
        }
        if binning.value_name.is_empty() {
            return Err(VizError::config("Value name cannot be empty"));
        }
        if !COLORMAP_NAMES.contains(&binning.colormap.to_lowercase().as_str()) {
            return Err(VizError::config(format!(
                "Invalid colormap: {}. Must be one of: {}",
                binning.colormap,
                COLORMAP_NAMES.join(", ")
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            figsize: default_figsize(),
            overlay: OverlayConfig::default(),
            binning: BinningConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            step_size: default_step_size(),
            label_format: default_label_format(),
            background_alpha: default_background_alpha(),
            line_width: default_line_width(),
            legend_order: default_legend_order(),
            legend_outside: None,
        }
    }
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            bins: default_bins(),
            mask: 0,
            value_name: default_value_name(),
            colormap: default_colormap(),
        }
    }
}

// Default value functions for serde
fn default_figsize() -> (f64, f64) {
    DEFAULT_FIGSIZE
}

fn default_step_size() -> usize {
    1
}

fn default_label_format() -> String {
    "%b".to_string()
}

fn default_background_alpha() -> f64 {
    DEFAULT_BACKGROUND_ALPHA
}

fn default_line_width() -> u32 {
    DEFAULT_LINE_WIDTH
}

fn default_legend_order() -> String {
    "default".to_string()
}

fn default_bins() -> usize {
    10
}

fn default_value_name() -> String {
    "value".to_string()
}

fn default_colormap() -> String {
    "viridis".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.render.dpi, DEFAULT_DPI);
        assert_eq!(config.render.format, OutputFormat::Png);
        assert_eq!(config.figsize, (10.0, 5.0));
        assert_eq!(config.overlay.step_size, 1);
        assert_eq!(config.overlay.label_format, "%b");
        assert_eq!(config.binning.bins, 10);
        assert_eq!(config.binning.colormap, "viridis");
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_merge() {
        let mut config1 = Config::default();
        let mut config2 = Config::default();

        config2.overlay.step_size = 3;
        config2.binning.mask = 1;

        config1.merge(config2);

        assert_eq!(config1.overlay.step_size, 3);
        assert_eq!(config1.binning.mask, 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"overlay": {"step_size": 2}, "render": {"format": "jpeg"}}"#)
                .unwrap();
        assert_eq!(config.overlay.step_size, 2);
        assert_eq!(config.overlay.label_format, "%b");
        assert_eq!(config.render.format, OutputFormat::Jpeg);
        assert_eq!(config.render.dpi, DEFAULT_DPI);
        assert_eq!(config.binning.bins, 10);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"overlay": {{"step_size": 2, "label_format": "%m"}}, "log_level": "debug"}}"#)
            .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = Args::try_parse_from([
            "dataviz",
            "--config",
            &path,
            "overlay",
            "series.csv",
            "--step-size",
            "4",
        ])
        .unwrap();
        let (config, command) = Config::from_args(args).unwrap();

        assert_eq!(config.overlay.step_size, 4);
        assert_eq!(config.overlay.label_format, "%m");
        assert_eq!(config.log_level, "debug");
        assert!(matches!(command, Command::Overlay(ref a) if a.input == PathBuf::from("series.csv")));
    }

    #[test]
    fn test_choropleth_args() {
        let args = Args::try_parse_from([
            "dataviz",
            "choropleth",
            "points.csv",
            "--bins",
            "25",
            "--mask",
            "0",
            "--colormap",
            "blues",
            "--format",
            "jpeg",
        ])
        .unwrap();
        let (config, _) = Config::from_args(args).unwrap();
        assert_eq!(config.binning.bins, 25);
        assert_eq!(config.binning.colormap, "blues");
        assert_eq!(config.render.format, OutputFormat::Jpeg);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        // Test invalid log level
        let mut config = Config::default();
        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.render.dpi = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.overlay.step_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.overlay.background_alpha = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.overlay.legend_order = "sideways".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.overlay.legend_outside = Some("left".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.binning.bins = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.binning.bins = 100_000;
        assert!(matches!(
            config.validate(),
            Err(VizError::Configuration { .. })
        ));
        config.binning.bins = MAX_BINS;
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.binning.colormap = "rainbow".to_string();
        assert!(config.validate().is_err());
    }
}

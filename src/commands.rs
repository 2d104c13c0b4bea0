//! The `overlay` and `choropleth` commands.
//!
//! Each command reads its CSV input, builds a figure with the resolved
//! configuration and writes the requested artifacts.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, info_span};

use crate::binning::{bin_points_with, points_from_csv_path, BinOptions};
use crate::config::{ChoroplethArgs, Command, Config, OverlayArgs};
use crate::error::{Result, VizError};
use crate::figure::{Figure, RenderDescriptor};
use crate::geoutil::{clean_map, label_polygon, parse_bbox, regions_from_geojson, zoom_to_region, LabelOptions};
use crate::legend::{custom_legend, LegendOptions};
use crate::logging::{
    generate_operation_id, log_operation_end, log_operation_start, log_output_written,
    log_timed_operation,
};
use crate::overlay::{build_overlay_with, OverlayOptions};
use crate::render::render_png;
use crate::series::MonthlySeries;

/// What a command produced
#[derive(Debug)]
pub struct CommandOutput {
    pub descriptor: RenderDescriptor,
    /// Files written, in the order they were written
    pub written: Vec<PathBuf>,
}

/// Run a parsed command against a validated configuration
pub fn run(config: &Config, command: &Command) -> Result<CommandOutput> {
    let operation_id = generate_operation_id();
    let (name, result) = match command {
        Command::Overlay(args) => {
            let _span = info_span!("overlay", operation_id = %operation_id).entered();
            ("overlay", run_overlay(config, args))
        }
        Command::Choropleth(args) => {
            let _span = info_span!("choropleth", operation_id = %operation_id).entered();
            ("choropleth", run_choropleth(config, args))
        }
    };
    if let Ok(output) = &result {
        info!(command = name, files = output.written.len(), "Command finished");
    }
    result
}

pub fn run_overlay(config: &Config, args: &OverlayArgs) -> Result<CommandOutput> {
    let start = Instant::now();
    log_operation_start("overlay", Some(&args.input.display().to_string()));

    let series = MonthlySeries::from_csv_path(&args.input)?;
    let options = OverlayOptions {
        step_size: config.overlay.step_size,
        highlight_year: args.highlight_year,
        label_format: config.overlay.label_format.clone(),
        background_alpha: config.overlay.background_alpha,
        line_width: config.overlay.line_width,
    };
    let overlay = log_timed_operation("build_overlay", || build_overlay_with(&series, &options))?;

    let mut axes = overlay.into_axes();
    custom_legend(
        &mut axes,
        &LegendOptions {
            outside: config.legend_outside()?,
            order: config.legend_order()?,
            ..Default::default()
        },
    )?;

    let descriptor = Figure::single(axes)
        .title(series.name())
        .size(config.figsize.0, config.figsize.1)
        .finish()?;
    let written = write_outputs(config, &descriptor, args.out_json.as_deref(), args.output.as_deref())?;

    log_operation_end("overlay", start, true);
    Ok(CommandOutput { descriptor, written })
}

/// Split "column=value"
fn parse_zoom(zoom: &str) -> Result<(&str, &str)> {
    zoom.split_once('=')
        .filter(|(column, value)| !column.is_empty() && !value.is_empty())
        .ok_or_else(|| VizError::invalid("zoom", format!("Expected column=value, got '{}'", zoom)))
}

pub fn run_choropleth(config: &Config, args: &ChoroplethArgs) -> Result<CommandOutput> {
    let start = Instant::now();
    log_operation_start("choropleth", Some(&args.input.display().to_string()));

    let points = points_from_csv_path(&args.input)?;
    let options = BinOptions {
        bins: config.binning.bins,
        mask: config.binning.mask,
        value_name: config.binning.value_name.clone(),
    };
    let choropleth = log_timed_operation("bin_points", || bin_points_with(&points, &options))?;

    let mut written = Vec::new();
    if let Some(path) = &args.out_geojson {
        let text = serde_json::to_string(&choropleth.to_geojson())?;
        std::fs::write(path, &text)?;
        log_output_written("geojson", path, text.len());
        written.push(path.clone());
    }

    let mut axes = choropleth.into_axes(&config.binning.colormap);
    clean_map(&mut axes);

    if let Some(path) = &args.regions {
        let regions = regions_from_geojson(&std::fs::read_to_string(path)?)?;
        info!(regions = regions.len(), "Loaded regions");

        if let Some(column) = &args.label_column {
            for region in &regions {
                if let Some(label) = region.property(column) {
                    label_polygon(&mut axes, label, &region.geometry, &LabelOptions::default())?;
                }
            }
        }
        if let Some(zoom) = &args.zoom {
            let (column, value) = parse_zoom(zoom)?;
            zoom_to_region(&mut axes, &regions, column, value, args.zoom_factor)?;
        }
    }
    // An explicit window beats a region zoom
    if let Some(bbox) = &args.bbox {
        axes.set_limits(parse_bbox(bbox)?);
    }

    let descriptor = Figure::single(axes)
        .size(config.figsize.0, config.figsize.1)
        .finish()?;
    written.extend(write_outputs(
        config,
        &descriptor,
        args.out_json.as_deref(),
        args.output.as_deref(),
    )?);

    log_operation_end("choropleth", start, true);
    Ok(CommandOutput { descriptor, written })
}

fn write_outputs(
    config: &Config,
    descriptor: &RenderDescriptor,
    json_path: Option<&Path>,
    image_path: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if let Some(path) = json_path {
        let json = descriptor.to_json()?;
        std::fs::write(path, &json)?;
        log_output_written("descriptor", path, json.len());
        written.push(path.to_path_buf());
    }

    if let Some(path) = image_path {
        let bytes = log_timed_operation("render", || render_png(descriptor, &config.render))?;
        std::fs::write(path, &bytes)?;
        log_output_written(config.render.format.extension(), path, bytes.len());
        written.push(path.to_path_buf());
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_zoom() {
        assert_eq!(parse_zoom("name=north").unwrap(), ("name", "north"));
        assert_eq!(parse_zoom("code=a=b").unwrap(), ("code", "a=b"));
        assert!(parse_zoom("north").is_err());
        assert!(parse_zoom("=north").is_err());
    }
}

//! Line series, grid, spines, ticks and legend swatches via plotters.

use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::{render_err, PlotArea};
use crate::error::Result;
use crate::figure::{LineSeries as Line, Panel, DEFAULT_TICK_COUNT};
use crate::ticks::{linear_ticks, TickFormatter};

const AXIS_COLOR: RGBColor = RGBColor(38, 38, 38);
const GRID_COLOR: RGBColor = RGBColor(176, 176, 176);
const TICK_LENGTH: i32 = 4;
const SWATCH_LENGTH: i32 = 20;
const SWATCH_SPACING: i32 = 12;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Draw the non-fill content of every panel onto `img`
pub(super) fn draw_panels(img: &mut RgbImage, panels: &[Panel], areas: &[PlotArea]) -> Result<()> {
    let size = img.dimensions();
    let buffer: &mut [u8] = img;
    let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();

    for (panel, area) in panels.iter().zip(areas) {
        draw_panel(&root, panel, area)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

/// Consecutive non-missing points of a line
fn segments(line: &Line) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (&x, y) in line.x.iter().zip(&line.y) {
        match y {
            Some(y) if y.is_finite() => current.push((x, *y)),
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn draw_panel(root: &Area, panel: &Panel, area: &PlotArea) -> Result<()> {
    let limits = &panel.limits;
    let axes = &panel.axes;
    let style = axes.style();

    let plot = root.clone().shrink(
        (area.x as i32, area.y as i32),
        (area.width as i32, area.height as i32),
    );
    let mut chart = ChartBuilder::on(&plot)
        .build_cartesian_2d(limits.x.0..limits.x.1, limits.y.0..limits.y.1)
        .map_err(render_err)?;

    let x_ticks: Vec<f64> = match axes.x_ticks() {
        Some(spec) => spec.positions.clone(),
        None => linear_ticks(limits.x, DEFAULT_TICK_COUNT, TickFormatter::Plain).positions,
    };
    let y_ticks = &panel.y_ticks.positions;

    if style.grid {
        let grid_style = GRID_COLOR.stroke_width(1);
        let verticals = x_ticks
            .iter()
            .map(|&x| PathElement::new(vec![(x, limits.y.0), (x, limits.y.1)], grid_style));
        let horizontals = y_ticks
            .iter()
            .map(|&y| PathElement::new(vec![(limits.x.0, y), (limits.x.1, y)], grid_style));
        chart
            .draw_series(verticals.chain(horizontals))
            .map_err(render_err)?;
    }

    for line in axes.lines() {
        let [r, g, b] = line.color.unwrap_or([0, 0, 0]);
        let line_style = RGBColor(r, g, b)
            .mix(line.alpha.clamp(0.0, 1.0))
            .stroke_width(line.line_width.max(1));
        for segment in segments(line) {
            chart
                .draw_series(LineSeries::new(segment, line_style))
                .map_err(render_err)?;
        }
    }

    draw_frame(root, panel, area, &x_ticks, y_ticks)?;
    draw_legend_swatches(root, panel, area)?;
    Ok(())
}

/// Spines and outward tick marks, in image pixel coordinates
fn draw_frame(root: &Area, panel: &Panel, area: &PlotArea, x_ticks: &[f64], y_ticks: &[f64]) -> Result<()> {
    let style = panel.axes.style();
    let axis_style = AXIS_COLOR.stroke_width(1);

    let left = area.x as i32;
    let top = area.y as i32;
    let right = left + area.width as i32;
    let bottom = top + area.height as i32;

    let spines = [
        (style.spines.top, [(left, top), (right, top)]),
        (style.spines.right, [(right, top), (right, bottom)]),
        (style.spines.bottom, [(left, bottom), (right, bottom)]),
        (style.spines.left, [(left, top), (left, bottom)]),
    ];
    for (visible, path) in spines {
        if visible {
            root.draw(&PathElement::new(path.to_vec(), axis_style))
                .map_err(render_err)?;
        }
    }

    if style.x_ticks {
        for &x in x_ticks {
            let (px, _) = area.to_pixel(&panel.limits, x, panel.limits.y.0);
            let px = px.round() as i32;
            root.draw(&PathElement::new(
                vec![(px, bottom), (px, bottom + TICK_LENGTH)],
                axis_style,
            ))
            .map_err(render_err)?;
        }
    }
    if style.y_ticks {
        for &y in y_ticks {
            let (_, py) = area.to_pixel(&panel.limits, panel.limits.x.0, y);
            let py = py.round() as i32;
            root.draw(&PathElement::new(
                vec![(left - TICK_LENGTH, py), (left, py)],
                axis_style,
            ))
            .map_err(render_err)?;
        }
    }
    Ok(())
}

/// One short colored stroke per legend entry, stacked downwards from the
/// legend anchor
fn draw_legend_swatches(root: &Area, panel: &Panel, area: &PlotArea) -> Result<()> {
    let Some(legend) = panel.axes.legend() else {
        return Ok(());
    };

    let right = (area.x + area.width) as i32;
    let top = area.y as i32;
    let height = area.height as i32;
    let stack = SWATCH_SPACING * legend.entries.len() as i32;

    let (x0, y0) = match legend.anchor {
        // Anchored outside the right edge, anchor y in axes fractions
        Some((_, ay)) => {
            let anchor_y = top + ((1.0 - ay) * height as f64) as i32;
            let y0 = if ay >= 1.0 {
                anchor_y
            } else if ay <= 0.0 {
                anchor_y - stack
            } else {
                anchor_y - stack / 2
            };
            (right + SWATCH_SPACING, y0)
        }
        None => (right - SWATCH_LENGTH - SWATCH_SPACING, top + SWATCH_SPACING),
    };

    for (i, entry) in legend.entries.iter().enumerate() {
        let [r, g, b] = entry.color;
        let swatch_style = RGBColor(r, g, b)
            .mix(entry.alpha.clamp(0.0, 1.0))
            .stroke_width(legend.line_width);
        let y = y0 + SWATCH_SPACING * i as i32;
        root.draw(&PathElement::new(
            vec![(x0, y), (x0 + SWATCH_LENGTH, y)],
            swatch_style,
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

//! Test data generation utilities.
//!
//! This module writes CSV and GeoJSON fixtures with known patterns for the
//! dataviz integration tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::path::Path;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Writes a monthly series CSV with a `date,<name>` header.
///
/// # Arguments
///
/// * `path` - Where the CSV is saved
/// * `name` - Header of the value column, which becomes the series name
/// * `start` - First `(year, month)` of the series
/// * `months` - Number of consecutive months
/// * `value` - Value for the i-th month
pub fn create_monthly_series_csv<F>(
    path: &Path,
    name: &str,
    start: (i32, u32),
    months: usize,
    value: F,
) -> Result<()>
where
    F: Fn(usize) -> f64,
{
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["date", name])?;

    let first = start.0 * 12 + start.1 as i32 - 1;
    for i in 0..months {
        let ordinal = first + i as i32;
        let date = format!("{:04}-{:02}-01", ordinal / 12, ordinal % 12 + 1);
        wtr.write_record([date, value(i).to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes three full years (2020-2022) of a seasonal series: each month's value
/// is `month_index + 100 * year_index`.
pub fn create_three_year_series_csv(path: &Path) -> Result<()> {
    create_monthly_series_csv(path, "visitors", (2020, 1), 36, |i| {
        ((i % 12) + 100 * (i / 12)) as f64
    })
}

/// Uniformly random points inside `[0, 1) x [0, 1)`, seeded for repeatability
pub fn random_points(count: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| (rng.gen::<f64>(), rng.gen::<f64>())).collect()
}

/// Writes points as an `x,y` CSV
pub fn create_points_csv(path: &Path, points: &[(f64, f64)]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["x", "y"])?;
    for (x, y) in points {
        wtr.write_record([x.to_string(), y.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes two unit-square districts, "west" at `[0, 0.5]` and "east" at
/// `[0.5, 1]` along x, as a GeoJSON FeatureCollection with a `name` property.
pub fn create_districts_geojson(path: &Path) -> Result<()> {
    let text = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"name": "west"},
      "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [0.5, 0], [0.5, 1], [0, 1], [0, 0]]]}
    },
    {
      "type": "Feature",
      "properties": {"name": "east"},
      "geometry": {"type": "Polygon", "coordinates": [[[0.5, 0], [1, 0], [1, 1], [0.5, 1], [0.5, 0]]]}
    }
  ]
}"#;
    let mut file = std::fs::File::create(path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

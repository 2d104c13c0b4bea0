//! Month-level time series.
//!
//! A [`MonthlySeries`] holds exactly one observation per calendar month, sorted
//! ascending with no gaps. The overlay builder relies on this to line up years
//! month by month.

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, VizError};

/// A single monthly observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// First day of the observed month
    pub month: NaiveDate,
    /// Observed value
    pub value: f64,
}

/// An ordered, gap-free monthly time series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySeries {
    name: String,
    observations: Vec<Observation>,
}

/// Short description of a series, used by the inspection tool and in logs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub name: String,
    pub observations: usize,
    pub first_month: NaiveDate,
    pub last_month: NaiveDate,
    pub distinct_years: Vec<i32>,
    /// True when the first year does not start in January
    pub partial_first_year: bool,
    /// True when the last year does not end in December
    pub partial_last_year: bool,
    pub min_value: f64,
    pub max_value: f64,
}

/// Months since year zero; consecutive months differ by exactly one.
fn month_ordinal(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// Truncate a date to the first day of its month
fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Parse a month stamp written as `YYYY-MM-DD` or `YYYY-MM`
pub fn parse_month(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    let parsed = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d"))
        .map_err(|_| VizError::invalid("date", format!("Unrecognized month stamp: {}", text)))?;
    Ok(first_of_month(parsed))
}

/// Check that a strftime pattern only contains recognized specifiers
pub fn validate_date_format(format: &str) -> Result<()> {
    if format.is_empty() {
        return Err(VizError::invalid("label_format", "Date format cannot be empty"));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(VizError::invalid(
            "label_format",
            format!("Invalid date format: {}", format),
        ));
    }
    Ok(())
}

/// Format a date, reporting unsupported specifiers (e.g. time zones) as errors
pub fn format_date(date: NaiveDate, format: &str) -> Result<String> {
    validate_date_format(format)?;
    let mut out = String::new();
    write!(out, "{}", date.format(format)).map_err(|_| {
        VizError::invalid(
            "label_format",
            format!("Date format {} cannot be applied to a calendar date", format),
        )
    })?;
    Ok(out)
}

impl MonthlySeries {
    /// Build a series from `(month, value)` pairs.
    ///
    /// Dates are truncated to the first of their month. Fails when the input is
    /// empty, unsorted, has a gap, or repeats a month.
    pub fn new(name: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        let name = name.into();
        if points.is_empty() {
            return Err(VizError::EmptyInput {
                message: format!("Series '{}' has no observations", name),
            });
        }

        let observations: Vec<Observation> = points
            .into_iter()
            .map(|(month, value)| Observation {
                month: first_of_month(month),
                value,
            })
            .collect();

        for pair in observations.windows(2) {
            let step = month_ordinal(pair[1].month) - month_ordinal(pair[0].month);
            if step != 1 {
                return Err(VizError::InvalidSeries {
                    message: format!(
                        "Series '{}' must advance one month per observation, but {} follows {}",
                        name, pair[1].month, pair[0].month
                    ),
                });
            }
        }

        Ok(Self { name, observations })
    }

    /// Load a series from CSV with a `date,<name>` header.
    ///
    /// The header of the second column becomes the series name.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let name = rdr
            .headers()?
            .get(1)
            .map(str::to_string)
            .ok_or_else(|| VizError::invalid("csv", "Expected two columns: date,value"))?;

        let mut points = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record?;
            let date = record
                .get(0)
                .ok_or_else(|| VizError::invalid("csv", format!("Row {} has no date", line + 1)))?;
            let value = record
                .get(1)
                .ok_or_else(|| VizError::invalid("csv", format!("Row {} has no value", line + 1)))?;
            let value = value.parse::<f64>().map_err(|_| {
                VizError::invalid("csv", format!("Row {}: invalid value {}", line + 1, value))
            })?;
            points.push((parse_month(date)?, value));
        }

        debug!(name = %name, rows = points.len(), "Parsed monthly series");
        Self::new(name, points)
    }

    /// Load a series from a CSV file on disk
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn first(&self) -> &Observation {
        &self.observations[0]
    }

    pub fn last(&self) -> &Observation {
        &self.observations[self.observations.len() - 1]
    }

    /// Sorted distinct years present in the series
    pub fn distinct_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.observations.iter().map(|o| o.month.year()).collect();
        years.dedup();
        years
    }

    /// Observations whose year falls in `start..=end`
    pub fn years_slice(&self, start: i32, end: i32) -> &[Observation] {
        let lo = self
            .observations
            .partition_point(|o| o.month.year() < start);
        let hi = self
            .observations
            .partition_point(|o| o.month.year() <= end);
        &self.observations[lo..hi.max(lo)]
    }

    /// Lookup table keyed by `(year, month0)`
    pub fn by_year_month(&self) -> HashMap<(i32, u32), f64> {
        self.observations
            .iter()
            .map(|o| ((o.month.year(), o.month.month0()), o.value))
            .collect()
    }

    /// Format every timestamp in `observations` with a strftime pattern
    pub fn format_dates(observations: &[Observation], format: &str) -> Result<Vec<String>> {
        observations
            .iter()
            .map(|o| format_date(o.month, format))
            .collect()
    }

    pub fn summary(&self) -> SeriesSummary {
        let (min_value, max_value) = self
            .observations
            .iter()
            .map(|o| o.value)
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        SeriesSummary {
            name: self.name.clone(),
            observations: self.len(),
            first_month: self.first().month,
            last_month: self.last().month,
            distinct_years: self.distinct_years(),
            partial_first_year: self.first().month.month() != 1,
            partial_last_year: self.last().month.month() != 12,
            min_value,
            max_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn test_new_accepts_contiguous_months() {
        let series = MonthlySeries::new(
            "sales",
            vec![(date(2020, 11), 1.0), (date(2020, 12), 2.0), (date(2021, 1), 3.0)],
        )
        .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.distinct_years(), vec![2020, 2021]);
    }

    #[test]
    fn test_new_rejects_gaps_and_disorder() {
        let gap = MonthlySeries::new("x", vec![(date(2020, 1), 1.0), (date(2020, 3), 2.0)]);
        assert!(matches!(gap, Err(VizError::InvalidSeries { .. })));

        let backwards = MonthlySeries::new("x", vec![(date(2020, 2), 1.0), (date(2020, 1), 2.0)]);
        assert!(backwards.is_err());

        let repeated = MonthlySeries::new("x", vec![(date(2020, 2), 1.0), (date(2020, 2), 2.0)]);
        assert!(repeated.is_err());

        assert!(matches!(
            MonthlySeries::new("x", vec![]),
            Err(VizError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_dates_are_truncated_to_month() {
        let series = MonthlySeries::new(
            "x",
            vec![
                (NaiveDate::from_ymd_opt(2020, 1, 31).unwrap(), 1.0),
                (NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(), 2.0),
            ],
        )
        .unwrap();
        assert_eq!(series.first().month, date(2020, 1));
        assert_eq!(series.last().month, date(2020, 2));
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2021-03-15").unwrap(), date(2021, 3));
        assert_eq!(parse_month("2021-03").unwrap(), date(2021, 3));
        assert!(parse_month("March 2021").is_err());
    }

    #[test]
    fn test_years_slice() {
        let points = (0..36)
            .map(|i| (date(2020 + i / 12, (i % 12) as u32 + 1), i as f64))
            .collect();
        let series = MonthlySeries::new("x", points).unwrap();

        let slice = series.years_slice(2021, 2021);
        assert_eq!(slice.len(), 12);
        assert_eq!(slice[0].value, 12.0);

        assert_eq!(series.years_slice(2021, 2022).len(), 24);
        assert!(series.years_slice(2030, 2031).is_empty());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date(2021, 3), "%b").unwrap(), "Mar");
        assert_eq!(format_date(date(2021, 3), "%Y-%m").unwrap(), "2021-03");
        assert!(format_date(date(2021, 3), "%Q").is_err());
        assert!(format_date(date(2021, 3), "").is_err());
    }

    #[test]
    fn test_from_csv_reader() {
        let csv = "date,visitors\n2020-01-01,10\n2020-02,11.5\n2020-03-01, 12\n";
        let series = MonthlySeries::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(series.name(), "visitors");
        assert_eq!(series.len(), 3);
        assert_eq!(series.last().value, 12.0);

        let bad = "date,visitors\n2020-01-01,ten\n";
        assert!(MonthlySeries::from_csv_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_summary_flags_partial_years() {
        let points = (0..14)
            .map(|i| {
                let ordinal = 2020 * 12 + 5 + i;
                (date(ordinal / 12, (ordinal % 12) as u32 + 1), i as f64)
            })
            .collect();
        let series = MonthlySeries::new("x", points).unwrap();
        let summary = series.summary();
        assert!(summary.partial_first_year);
        assert!(summary.partial_last_year);
        assert_eq!(summary.distinct_years, vec![2020, 2021]);
        assert_eq!(summary.min_value, 0.0);
        assert_eq!(summary.max_value, 13.0);
    }
}

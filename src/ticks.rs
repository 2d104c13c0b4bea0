//! Tick helpers.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::VizError;

/// Explicit tick positions with one label each
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSpec {
    pub positions: Vec<f64>,
    pub labels: Vec<String>,
    /// Label rotation in degrees
    pub rotation: f64,
}

/// How numeric tick values are turned into text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickFormatter {
    #[default]
    Plain,
    /// Integer part with thousands separators
    Comma,
}

impl TickFormatter {
    pub fn format(&self, value: f64) -> String {
        match self {
            TickFormatter::Plain => format!("{}", value),
            TickFormatter::Comma => comma_format(value),
        }
    }
}

impl FromStr for TickFormatter {
    type Err = VizError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(TickFormatter::Plain),
            "comma" => Ok(TickFormatter::Comma),
            _ => Err(VizError::invalid(
                "tick_formatter",
                format!("Unknown tick formatter: {}. Must be one of: plain, comma", s),
            )),
        }
    }
}

/// One tick per label at positions `0..labels.len()`, labels kept horizontal
pub fn show_all_xticks<S: AsRef<str>>(labels: &[S]) -> TickSpec {
    TickSpec {
        positions: (0..labels.len()).map(|i| i as f64).collect(),
        labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
        rotation: 0.0,
    }
}

/// `count` evenly spaced ticks across `range`, both ends included, labeled by `formatter`
pub fn linear_ticks(range: (f64, f64), count: usize, formatter: TickFormatter) -> TickSpec {
    let positions: Vec<f64> = match count {
        0 => Vec::new(),
        1 => vec![range.0],
        _ => {
            let step = (range.1 - range.0) / (count - 1) as f64;
            (0..count).map(|i| range.0 + step * i as f64).collect()
        }
    };
    TickSpec {
        labels: positions.iter().map(|&v| formatter.format(v)).collect(),
        positions,
        rotation: 0.0,
    }
}

/// Truncate to an integer and group thousands with commas: `1234567.8` → `"1,234,567"`
pub fn comma_format(value: f64) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }
    let truncated = format!("{:.0}", value.trunc());
    let (negative, digits) = match truncated.strip_prefix('-') {
        Some(digits) => (digits != "0", digits),
        None => (false, truncated.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_format() {
        assert_eq!(comma_format(0.0), "0");
        assert_eq!(comma_format(999.0), "999");
        assert_eq!(comma_format(1000.0), "1,000");
        assert_eq!(comma_format(1_234_567.8), "1,234,567");
        assert_eq!(comma_format(-1234.9), "-1,234");
        assert_eq!(comma_format(-0.5), "0");
        assert_eq!(comma_format(100_000.0), "100,000");
        assert_eq!(comma_format(1e20), "100,000,000,000,000,000,000");
        assert_eq!(comma_format(-1e19), "-10,000,000,000,000,000,000");
    }

    #[test]
    fn test_show_all_xticks() {
        let ticks = show_all_xticks(&["Jan", "Feb", "Mar"]);
        assert_eq!(ticks.positions, vec![0.0, 1.0, 2.0]);
        assert_eq!(ticks.labels, vec!["Jan", "Feb", "Mar"]);
        assert_eq!(ticks.rotation, 0.0);

        let empty: [&str; 0] = [];
        assert!(show_all_xticks(&empty).positions.is_empty());
    }

    #[test]
    fn test_linear_ticks() {
        let ticks = linear_ticks((0.0, 4000.0), 5, TickFormatter::Comma);
        assert_eq!(ticks.positions, vec![0.0, 1000.0, 2000.0, 3000.0, 4000.0]);
        assert_eq!(ticks.labels, vec!["0", "1,000", "2,000", "3,000", "4,000"]);
        assert!(linear_ticks((0.0, 1.0), 0, TickFormatter::Plain).positions.is_empty());
    }

    #[test]
    fn test_formatter_from_str() {
        assert_eq!("comma".parse::<TickFormatter>().unwrap(), TickFormatter::Comma);
        assert_eq!(TickFormatter::Comma.format(12345.0), "12,345");
        assert_eq!(TickFormatter::Plain.format(2.5), "2.5");
        assert!("sci".parse::<TickFormatter>().is_err());
    }
}

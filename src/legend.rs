//! Legend placement and ordering.
//!
//! A legend can be pinned just outside the right edge of the axes and its
//! entries reordered: reversed, sorted by each line's final value, or put in an
//! explicit label order.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, VizError};
use crate::figure::Axes;

/// Default legend line width
pub const DEFAULT_LEGEND_LINE_WIDTH: u32 = 2;

/// Entry order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendOrder {
    /// Order the series were added in
    #[default]
    Default,
    Reverse,
    /// Descending by each series' last value
    Descending,
    /// Exactly these labels, in this order
    Explicit(Vec<String>),
}

impl FromStr for LegendOrder {
    type Err = VizError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(LegendOrder::Default),
            "reverse" => Ok(LegendOrder::Reverse),
            "desc" => Ok(LegendOrder::Descending),
            _ => Err(VizError::invalid(
                "order",
                format!("Invalid legend order: {}. Must be one of: default, reverse, desc", s),
            )),
        }
    }
}

/// Placement just outside the right edge of the axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutsideLocation {
    Lower,
    Center,
    Upper,
}

impl OutsideLocation {
    /// Legend corner that is anchored
    pub fn loc(&self) -> &'static str {
        match self {
            OutsideLocation::Lower => "lower left",
            OutsideLocation::Center => "center left",
            OutsideLocation::Upper => "upper left",
        }
    }

    /// Anchor point in axes coordinates
    pub fn anchor(&self) -> (f64, f64) {
        match self {
            OutsideLocation::Lower => (1.0, 0.0),
            OutsideLocation::Center => (1.0, 0.5),
            OutsideLocation::Upper => (1.0, 1.0),
        }
    }
}

impl FromStr for OutsideLocation {
    type Err = VizError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lower" => Ok(OutsideLocation::Lower),
            "center" => Ok(OutsideLocation::Center),
            "upper" => Ok(OutsideLocation::Upper),
            _ => Err(VizError::invalid(
                "outside_loc",
                format!(
                    "Invalid legend location: {}. Must be one of: lower, center, upper",
                    s
                ),
            )),
        }
    }
}

/// Options for [`custom_legend`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendOptions {
    /// `None` keeps the legend inside the axes
    #[serde(default)]
    pub outside: Option<OutsideLocation>,
    #[serde(default)]
    pub order: LegendOrder,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_line_width")]
    pub line_width: u32,
}

fn default_line_width() -> u32 {
    DEFAULT_LEGEND_LINE_WIDTH
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self {
            outside: None,
            order: LegendOrder::Default,
            title: String::new(),
            line_width: DEFAULT_LEGEND_LINE_WIDTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: [u8; 3],
    pub alpha: f64,
    pub last_value: Option<f64>,
}

/// A placed, ordered legend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub entries: Vec<LegendEntry>,
    /// Anchored corner, `"best"` when inside the axes
    pub loc: String,
    /// Anchor in axes coordinates for outside placement
    pub anchor: Option<(f64, f64)>,
    pub title: String,
    pub line_width: u32,
}

impl Legend {
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }
}

/// Reorder legend entries
pub fn order_entries(mut entries: Vec<LegendEntry>, order: &LegendOrder) -> Result<Vec<LegendEntry>> {
    match order {
        LegendOrder::Default => Ok(entries),
        LegendOrder::Reverse => {
            entries.reverse();
            Ok(entries)
        }
        LegendOrder::Descending => {
            // Series without a value go last
            entries.sort_by(|a, b| {
                let a = a.last_value.unwrap_or(f64::NEG_INFINITY);
                let b = b.last_value.unwrap_or(f64::NEG_INFINITY);
                b.total_cmp(&a)
            });
            Ok(entries)
        }
        LegendOrder::Explicit(labels) => labels
            .iter()
            .map(|label| {
                entries
                    .iter()
                    .find(|e| &e.label == label)
                    .cloned()
                    .ok_or_else(|| {
                        VizError::invalid("order", format!("No legend entry labeled '{}'", label))
                    })
            })
            .collect(),
    }
}

/// Build a legend from the labeled lines of `axes` and attach it
pub fn custom_legend(axes: &mut Axes, options: &LegendOptions) -> Result<()> {
    let entries: Vec<LegendEntry> = axes
        .lines()
        .iter()
        .filter(|line| !line.label.is_empty())
        .map(|line| LegendEntry {
            label: line.label.clone(),
            color: line.color.unwrap_or([0, 0, 0]),
            alpha: line.alpha,
            last_value: line.last_value(),
        })
        .collect();

    if entries.is_empty() {
        return Err(VizError::DataNotFound {
            message: "Axes has no labeled series to put in a legend".to_string(),
        });
    }
    if options.line_width == 0 {
        return Err(VizError::config("Legend line width must be positive"));
    }

    let entries = order_entries(entries, &options.order)?;
    let (loc, anchor) = match options.outside {
        Some(outside) => (outside.loc().to_string(), Some(outside.anchor())),
        None => ("best".to_string(), None),
    };

    axes.set_legend(Some(Legend {
        entries,
        loc,
        anchor,
        title: options.title.clone(),
        line_width: options.line_width,
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::LineSeries;
    use pretty_assertions::assert_eq;

    fn axes() -> Axes {
        Axes::new()
            .line(LineSeries::categorical("2020", vec![Some(1.0), Some(5.0)]))
            .line(LineSeries::categorical("2021", vec![Some(2.0), Some(9.0)]))
            .line(LineSeries::categorical("2022", vec![Some(3.0), None]))
    }

    #[test]
    fn test_default_and_reverse() {
        let mut axes = axes();
        custom_legend(&mut axes, &LegendOptions::default()).unwrap();
        let legend = axes.legend().unwrap();
        assert_eq!(legend.labels(), vec!["2020", "2021", "2022"]);
        assert_eq!(legend.loc, "best");
        assert_eq!(legend.anchor, None);
        assert_eq!(legend.line_width, 2);

        let options = LegendOptions {
            order: LegendOrder::Reverse,
            ..Default::default()
        };
        custom_legend(&mut axes, &options).unwrap();
        assert_eq!(axes.legend().unwrap().labels(), vec!["2022", "2021", "2020"]);
    }

    #[test]
    fn test_descending_uses_last_value() {
        let mut axes = axes();
        let options = LegendOptions {
            order: LegendOrder::Descending,
            ..Default::default()
        };
        custom_legend(&mut axes, &options).unwrap();
        // 2022's last value is its last non-missing one: 3.0
        assert_eq!(axes.legend().unwrap().labels(), vec!["2021", "2020", "2022"]);
    }

    #[test]
    fn test_explicit_order() {
        let mut axes = axes();
        let options = LegendOptions {
            order: LegendOrder::Explicit(vec!["2022".into(), "2020".into()]),
            ..Default::default()
        };
        custom_legend(&mut axes, &options).unwrap();
        assert_eq!(axes.legend().unwrap().labels(), vec!["2022", "2020"]);

        let options = LegendOptions {
            order: LegendOrder::Explicit(vec!["1999".into()]),
            ..Default::default()
        };
        assert!(custom_legend(&mut axes, &options).is_err());
    }

    #[test]
    fn test_outside_locations() {
        let mut axes = axes();
        for (location, loc, anchor) in [
            (OutsideLocation::Lower, "lower left", (1.0, 0.0)),
            (OutsideLocation::Center, "center left", (1.0, 0.5)),
            (OutsideLocation::Upper, "upper left", (1.0, 1.0)),
        ] {
            let options = LegendOptions {
                outside: Some(location),
                title: "Year".to_string(),
                ..Default::default()
            };
            custom_legend(&mut axes, &options).unwrap();
            let legend = axes.legend().unwrap();
            assert_eq!(legend.loc, loc);
            assert_eq!(legend.anchor, Some(anchor));
            assert_eq!(legend.title, "Year");
        }
    }

    #[test]
    fn test_parse_options() {
        assert_eq!("desc".parse::<LegendOrder>().unwrap(), LegendOrder::Descending);
        assert!("ascending".parse::<LegendOrder>().is_err());
        assert_eq!("upper".parse::<OutsideLocation>().unwrap(), OutsideLocation::Upper);
        assert!("left".parse::<OutsideLocation>().is_err());
    }

    #[test]
    fn test_empty_axes_has_no_legend() {
        let mut axes = Axes::new();
        assert!(custom_legend(&mut axes, &LegendOptions::default()).is_err());
        assert!(axes.legend().is_none());
    }
}

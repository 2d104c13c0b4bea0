//! Categorical colormaps.
//!
//! Assigns each distinct category a color from the ten-color "tab10" palette,
//! in the order the categories are first seen.

use serde::Serialize;
use std::collections::HashSet;

use super::colormap::to_hex_color;
use crate::error::{Result, VizError};

/// The tab10 qualitative palette
pub const TAB10: [[u8; 3]; 10] = [
    [0x1f, 0x77, 0xb4], // blue
    [0xff, 0x7f, 0x0e], // orange
    [0x2c, 0xa0, 0x2c], // green
    [0xd6, 0x27, 0x28], // red
    [0x94, 0x67, 0xbd], // purple
    [0x8c, 0x56, 0x4b], // brown
    [0xe3, 0x77, 0xc2], // pink
    [0x7f, 0x7f, 0x7f], // gray
    [0xbc, 0xbd, 0x22], // olive
    [0x17, 0xbe, 0xcf], // cyan
];

/// Color for the `index`-th series when none was assigned
pub fn cycle_color(index: usize) -> [u8; 3] {
    TAB10[index % TAB10.len()]
}

/// Category → color assignments, in first-seen order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalColormap {
    entries: Vec<(String, [u8; 3])>,
}

impl CategoricalColormap {
    pub fn get(&self, category: &str) -> Option<[u8; 3]> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, color)| *color)
    }

    pub fn entries(&self) -> &[(String, [u8; 3])] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with colors as `#rrggbb`
    pub fn to_hex(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(name, color)| (name.clone(), to_hex_color(*color)))
            .collect()
    }
}

/// Map each distinct value to a tab10 color.
///
/// Fails with a configuration error when there are 10 or more distinct values.
pub fn build_colormap<I, S>(values: I) -> Result<CategoricalColormap>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for value in values {
        let value = value.as_ref();
        if seen.insert(value.to_string()) {
            unique.push(value.to_string());
        }
    }

    if unique.len() >= TAB10.len() {
        return Err(VizError::config(format!(
            "Categorical colormap supports fewer than {} categories, got {}",
            TAB10.len(),
            unique.len()
        )));
    }

    Ok(CategoricalColormap {
        entries: unique
            .into_iter()
            .zip(TAB10.iter().copied())
            .collect(),
    })
}

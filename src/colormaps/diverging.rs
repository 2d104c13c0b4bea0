//! Diverging colormaps (two-hue progression with center).
//!
//! Used for choropleths of change (e.g. year-over-year differences) where the
//! midpoint of the value range carries meaning.

use super::colormap::{table_lookup, Colormap};

/// Coolwarm colormap - blue to red through white
pub struct Coolwarm;

impl Colormap for Coolwarm {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        // Blue to white to red, for signed deviations from a baseline
        let colors: &[[u8; 3]] = &[
            [59, 76, 192], // Dark blue
            [68, 90, 204],
            [77, 104, 215],
            [87, 117, 225],
            [98, 130, 234],
            [108, 142, 241],
            [119, 154, 247],
            [130, 165, 251],
            [141, 176, 254],
            [152, 185, 255],
            [163, 194, 255],
            [174, 201, 253],
            [184, 208, 249],
            [194, 213, 244],
            [204, 217, 238],
            [213, 219, 230],
            [221, 221, 221], // White/gray in the middle
            [229, 216, 209],
            [236, 211, 197],
            [241, 204, 185],
            [245, 196, 173],
            [247, 187, 160],
            [247, 177, 148],
            [247, 166, 135],
            [244, 154, 123],
            [241, 141, 111],
            [236, 127, 99],
            [229, 112, 88],
            [222, 96, 77],
            [213, 80, 66],
            [203, 62, 56],
            [192, 40, 47], // Dark red
        ];

        table_lookup(colors, value)
    }

    fn name(&self) -> &str {
        "coolwarm"
    }
}

/// RdBu colormap - red to blue (reversed coolwarm)
pub struct RdBu;

impl Colormap for RdBu {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        let colors: &[[u8; 3]] = &[
            [192, 40, 47], // Dark red
            [203, 62, 56],
            [213, 80, 66],
            [222, 96, 77],
            [229, 112, 88],
            [236, 127, 99],
            [241, 141, 111],
            [244, 154, 123],
            [247, 166, 135],
            [247, 177, 148],
            [247, 187, 160],
            [245, 196, 173],
            [241, 204, 185],
            [236, 211, 197],
            [229, 216, 209],
            [221, 221, 221], // White/gray in the middle
            [213, 219, 230],
            [204, 217, 238],
            [194, 213, 244],
            [184, 208, 249],
            [174, 201, 253],
            [163, 194, 255],
            [152, 185, 255],
            [141, 176, 254],
            [130, 165, 251],
            [119, 154, 247],
            [108, 142, 241],
            [98, 130, 234],
            [87, 117, 225],
            [77, 104, 215],
            [68, 90, 204],
            [59, 76, 192], // Dark blue
        ];

        table_lookup(colors, value)
    }

    fn name(&self) -> &str {
        "rdbu"
    }
}

/// Seismic colormap - blue-white-red for anomalies
pub struct Seismic;

impl Colormap for Seismic {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        let colors: &[[u8; 3]] = &[
            [0, 0, 127], // Dark blue
            [0, 0, 191],
            [0, 63, 255],
            [0, 127, 255],
            [0, 191, 255],
            [127, 223, 255],
            [191, 239, 255],
            [255, 255, 255], // White in the middle
            [255, 239, 191],
            [255, 223, 127],
            [255, 191, 0],
            [255, 127, 0],
            [255, 63, 0],
            [191, 0, 0],
            [127, 0, 0], // Dark red
        ];

        table_lookup(colors, value)
    }

    fn name(&self) -> &str {
        "seismic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coolwarm_ends_and_center() {
        let blue = Coolwarm.map_normalized(0.0);
        let red = Coolwarm.map_normalized(1.0);
        assert!(blue[2] > blue[0]);
        assert!(red[0] > red[2]);

        let middle = Coolwarm.map_normalized(0.5);
        assert!(middle.iter().take(3).all(|&c| c > 200));
    }

    #[test]
    fn test_rdbu_mirrors_coolwarm_ends() {
        assert_eq!(RdBu.map_normalized(0.0), Coolwarm.map_normalized(1.0));
        assert_eq!(RdBu.map_normalized(1.0), Coolwarm.map_normalized(0.0));
    }

    #[test]
    fn test_seismic_middle_is_white() {
        assert_eq!(Seismic.map_normalized(0.5), [255, 255, 255, 255]);
        assert_eq!(Seismic.name(), "seismic");
    }
}

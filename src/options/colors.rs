use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Palette constants for entity, point and helper-geometry coloring.
///
/// Id palettes never generate hues below 20° or above 340°, so
/// [`unmatched`](Self::unmatched) stays unambiguous as long as it is kept in
/// that red band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorOptions {
    /// Number of distinct hues in the id palette.
    pub palette_size: u32,
    /// Saturation of palette colors.
    pub saturation: f32,
    /// Value (brightness) of palette colors.
    pub value: f32,
    /// Hue in degrees used when a cloud has exactly one point.
    pub single_point_hue: f32,
    /// Sentinel color for map geometry with no counterpart.
    pub unmatched: Rgb,
    /// Color for negative ids and clouds without usable embedded colors.
    pub neutral: Rgb,
    /// Color of correspondence line segments.
    pub match_line: Rgb,
    /// Fallback color for dense clouds.
    pub dense_default: Rgb,
    /// X axis helper color.
    pub axis_x: Rgb,
    /// Y axis helper color.
    pub axis_y: Rgb,
    /// Z axis helper color.
    pub axis_z: Rgb,
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            palette_size: 18,
            saturation: 0.8,
            value: 0.9,
            single_point_hue: 120.0,
            unmatched: [1.0, 0.0, 0.0],
            neutral: [0.5, 0.5, 0.5],
            match_line: [1.0, 1.0, 0.0],
            dense_default: [0.0, 0.0, 1.0],
            axis_x: [1.0, 0.2, 0.2],
            axis_y: [0.2, 1.0, 0.2],
            axis_z: [0.2, 0.4, 1.0],
        }
    }
}

impl ColorOptions {
    /// Axis helper colors in x, y, z order.
    #[must_use]
    pub fn axis_colors(&self) -> [Rgb; 3] {
        [self.axis_x, self.axis_y, self.axis_z]
    }

    /// Out-of-range fields, as `colors.<field>: <reason>` lines.
    pub(super) fn problems(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.palette_size == 0 {
            out.push("colors.palette_size: must be at least 1".to_owned());
        }
        for (name, v) in [("saturation", self.saturation), ("value", self.value)] {
            if !(0.0..=1.0).contains(&v) {
                out.push(format!("colors.{name}: {v} is outside [0, 1]"));
            }
        }
        if !(0.0..360.0).contains(&self.single_point_hue) {
            out.push(format!(
                "colors.single_point_hue: {} is outside [0, 360)",
                self.single_point_hue
            ));
        }
        let rgbs = [
            ("unmatched", self.unmatched),
            ("neutral", self.neutral),
            ("match_line", self.match_line),
            ("dense_default", self.dense_default),
            ("axis_x", self.axis_x),
            ("axis_y", self.axis_y),
            ("axis_z", self.axis_z),
        ];
        for (name, rgb) in rgbs {
            if !rgb.iter().all(|c| (0.0..=1.0).contains(c)) {
                out.push(format!("colors.{name}: {rgb:?} has a channel outside [0, 1]"));
            }
        }
        out
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The axis helper is never shorter than this multiple of `axis_length`.
const AXIS_FLOOR_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Display toggles and the visual de-overlap offset.
pub struct DisplayOptions {
    /// Translation added to transformed clouds so they do not sit on top of
    /// the map. Purely visual.
    #[schemars(title = "Transformed Offset")]
    pub offset: [f64; 3],
    /// Whether dense correspondence lines are built.
    #[schemars(title = "Show Match Lines")]
    pub show_match_lines: bool,
    /// Whether the initial (pre-optimization) transform is also shown.
    #[schemars(title = "Show Initial Transform")]
    pub show_initial_transform: bool,
    /// Whether matched/unmatched id lists are written after each frame.
    #[schemars(title = "Export Id Lists")]
    pub export_id_lists: bool,
    /// Base length of the coordinate axis helper.
    #[schemars(title = "Axis Length")]
    pub axis_length: f64,
    /// Axis length as a fraction of the map cloud extent.
    #[schemars(title = "Axis Scale")]
    pub axis_scale: f64,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            offset: [0.0, 0.0, 10.0],
            show_match_lines: true,
            show_initial_transform: false,
            export_id_lists: true,
            axis_length: 8.0,
            axis_scale: 0.15,
        }
    }
}

impl DisplayOptions {
    /// The offset as a vector.
    #[must_use]
    pub fn offset_vec(&self) -> glam::DVec3 {
        glam::DVec3::from_array(self.offset)
    }

    /// Axis helper length for a cloud with the given largest extent:
    /// `extent * axis_scale`, floored at `1.5 * axis_length`.
    #[must_use]
    pub fn axis_length_for(&self, extent: f64) -> f64 {
        (extent * self.axis_scale).max(self.axis_length * AXIS_FLOOR_FACTOR)
    }

    /// Out-of-range fields, as `display.<field>: <reason>` lines.
    pub(super) fn problems(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.offset.iter().all(|c| c.is_finite()) {
            out.push(format!("display.offset: {:?} is not finite", self.offset));
        }
        if !(self.axis_length.is_finite() && self.axis_length > 0.0) {
            out.push(format!(
                "display.axis_length: {} must be positive",
                self.axis_length
            ));
        }
        if !(self.axis_scale.is_finite() && self.axis_scale >= 0.0) {
            out.push(format!(
                "display.axis_scale: {} must be non-negative",
                self.axis_scale
            ));
        }
        out
    }
}

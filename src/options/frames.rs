use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::TransformName;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Frames", inline)]
#[serde(default)]
/// Frame sequencing options.
pub struct FrameOptions {
    /// Frame displayed map-only, with no transform or matching.
    #[schemars(title = "Baseline Frame")]
    pub baseline_frame_id: u32,
    /// Transform used to build transformed entities and propagate colors.
    #[schemars(skip)]
    pub transform: TransformName,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            baseline_frame_id: 0,
            transform: TransformName::Opt,
        }
    }
}

impl FrameOptions {
    /// Whether `frame_id` is the baseline frame.
    #[must_use]
    pub fn is_baseline(&self, frame_id: u32) -> bool {
        frame_id == self.baseline_frame_id
    }
}

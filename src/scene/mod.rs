//! Authoritative scene: named geometry with visible/hidden state.
//!
//! Every displayed object is identified by a [`GeometryId`] and lives in
//! exactly one of two sets inside the [`Registry`]: *visible* (attached to
//! the renderer) or *hidden* (kept off-scene together with the colors it
//! was last shown with).

mod key;
mod registry;

pub use key::{entity_stem, parse_stem, EntityKey, GeometryId, Role};
pub use registry::{CapturedColors, Registry, COLOR_TOLERANCE};

use crate::color::Rgb;
use crate::geometry::{LineGeometry, PointSet};
use crate::source::PlaneMetadata;

/// Drawable content of one registry entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A point cloud.
    Points(PointSet),
    /// Line segments.
    Lines(LineGeometry),
}

impl Geometry {
    /// Number of colorable elements: points, or segments.
    #[must_use]
    pub fn element_count(&self) -> usize {
        match self {
            Self::Points(p) => p.len(),
            Self::Lines(l) => l.len(),
        }
    }

    /// Colors embedded in the geometry, if they cover every element.
    #[must_use]
    pub fn embedded_colors(&self) -> Option<&[Rgb]> {
        match self {
            Self::Points(p) => p.colors(),
            Self::Lines(l) => Some(l.colors()),
        }
    }

    /// The point cloud, if this is one.
    #[must_use]
    pub fn as_points(&self) -> Option<&PointSet> {
        match self {
            Self::Points(p) => Some(p),
            Self::Lines(_) => None,
        }
    }

    /// The line set, if this is one.
    #[must_use]
    pub fn as_lines(&self) -> Option<&LineGeometry> {
        match self {
            Self::Lines(l) => Some(l),
            Self::Points(_) => None,
        }
    }
}

/// Metadata kept alongside a geometry, visible or hidden.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryInfo {
    /// Frame the geometry was loaded for.
    pub frame_id: Option<u32>,
    /// Plane sidecar of ground/plane entities.
    pub plane: Option<PlaneMetadata>,
}

impl GeometryInfo {
    /// Info for geometry of `frame_id`.
    #[must_use]
    pub fn for_frame(frame_id: u32) -> Self {
        Self {
            frame_id: Some(frame_id),
            plane: None,
        }
    }
}

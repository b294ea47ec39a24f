//! Where frame data comes from.
//!
//! [`DataSource`] is the seam between the frame pipeline and storage.
//! [`DirectorySource`] reads the optimizer's on-disk layout;
//! [`MemorySource`] holds everything in memory for embedding and tests.

mod debug_txt;
mod directory;
mod memory;
mod metadata;
mod ply;

use std::fmt;

pub use debug_txt::{AxisCost, DebugInfo, IterationCost};
pub use directory::DirectorySource;
pub use memory::MemorySource;
pub use metadata::{Abc, PlaneMetadata, PlaneParam};
pub use ply::read_ply;

use crate::error::MatchVizError;
use crate::geometry::{PointSet, RigidTransform, TransformName};
use crate::matching::{EntityKind, MatchTable};
use crate::scene::entity_stem;

/// Which half of a frame directory an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// The local observation.
    Frame,
    /// The reference map.
    Map,
}

impl Side {
    /// Directory name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frame => "frame",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects one point set within a frame side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    /// Classification.
    pub kind: EntityKind,
    /// Local id, `None` for the dense cloud.
    pub local_id: Option<i64>,
}

impl EntityRef {
    /// The dense cloud.
    pub const DENSE: Self = Self {
        kind: EntityKind::Dense,
        local_id: None,
    };

    /// A ground patch.
    #[must_use]
    pub const fn ground(id: i64) -> Self {
        Self {
            kind: EntityKind::Ground,
            local_id: Some(id),
        }
    }

    /// A plane patch.
    #[must_use]
    pub const fn plane(id: i64) -> Self {
        Self {
            kind: EntityKind::Plane,
            local_id: Some(id),
        }
    }

    /// File stem: `dense_cloud` or `{kind}_{id}`.
    #[must_use]
    pub fn stem(&self) -> String {
        entity_stem(self.kind, self.local_id)
    }
}

/// Typed access to per-frame data.
///
/// `Ok(None)` means "not there", which the pipeline treats as a
/// degradation. `Err` is reserved for data that exists but cannot be read.
pub trait DataSource {
    /// Frame ids with data, ascending.
    fn available_frames(&self) -> Result<Vec<u32>, MatchVizError>;

    /// Entities present on one side of a frame, sorted.
    fn list_entities(
        &self,
        frame_id: u32,
        side: Side,
    ) -> Result<Vec<EntityRef>, MatchVizError>;

    /// Points of one entity.
    fn load_points(
        &self,
        frame_id: u32,
        side: Side,
        entity: EntityRef,
    ) -> Result<PointSet, MatchVizError>;

    /// Sidecar metadata of one entity, if any.
    fn load_metadata(
        &self,
        frame_id: u32,
        side: Side,
        entity: EntityRef,
    ) -> Result<Option<PlaneMetadata>, MatchVizError>;

    /// The frame's optimizer log, if any.
    fn load_debug_info(
        &self,
        frame_id: u32,
    ) -> Result<Option<DebugInfo>, MatchVizError>;

    /// The frame's correspondence table, if any.
    fn load_match_table(
        &self,
        frame_id: u32,
    ) -> Result<Option<MatchTable>, MatchVizError>;

    /// One named transform of the frame, if the optimizer log has it.
    fn load_transform(
        &self,
        frame_id: u32,
        name: TransformName,
    ) -> Result<Option<RigidTransform>, MatchVizError> {
        Ok(self
            .load_debug_info(frame_id)?
            .map(|info| info.transform(name)))
    }
}

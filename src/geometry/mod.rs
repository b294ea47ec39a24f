//! Point sets, rigid transforms and line geometry.

mod lines;
mod point_set;
mod transform;

pub use lines::{axis_lines, build_match_lines, LineGeometry, MatchLines};
pub use point_set::PointSet;
pub use transform::{
    apply_offset, apply_transform, compose_transform, quaternion_to_matrix,
    Quaternion, RigidTransform, TransformDelta, TransformName,
};

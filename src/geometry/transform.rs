//! Rigid-body transforms: quaternion → rotation matrix, homogeneous point
//! transformation, and the purely visual axis offset.

use std::fmt;

use glam::{DMat3, DMat4, DVec3, DVec4};
use serde::{Deserialize, Serialize};

/// Quaternion magnitudes at or below this are treated as zero.
const DEGENERATE_NORM: f64 = 1e-12;

/// A rotation quaternion in `(w, x, y, z)` order, as written by the
/// optimizer. Not necessarily unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    /// Scalar part.
    pub w: f64,
    /// First vector component.
    pub x: f64,
    /// Second vector component.
    pub y: f64,
    /// Third vector component.
    pub z: f64,
}

impl Quaternion {
    /// The identity rotation.
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Build a quaternion from `(w, x, y, z)`.
    #[must_use]
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Euclidean magnitude.
    #[must_use]
    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z)
            .sqrt()
    }

    /// Unit-length copy, or `None` when the magnitude is (numerically) zero.
    #[must_use]
    pub fn normalized(&self) -> Option<Self> {
        let n = self.norm();
        if !n.is_finite() || n <= DEGENERATE_NORM {
            return None;
        }
        Some(Self::new(self.w / n, self.x / n, self.y / n, self.z / n))
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Convert a quaternion to a 3×3 rotation matrix.
///
/// The quaternion is normalized first. A zero (or non-finite) quaternion has
/// no defined rotation and maps to the identity matrix.
#[must_use]
pub fn quaternion_to_matrix(q: Quaternion) -> DMat3 {
    let Some(Quaternion { w, x, y, z }) = q.normalized() else {
        return DMat3::IDENTITY;
    };

    let m00 = 1.0 - 2.0 * (y * y + z * z);
    let m01 = 2.0 * (x * y - w * z);
    let m02 = 2.0 * (x * z + w * y);
    let m10 = 2.0 * (x * y + w * z);
    let m11 = 1.0 - 2.0 * (x * x + z * z);
    let m12 = 2.0 * (y * z - w * x);
    let m20 = 2.0 * (x * z - w * y);
    let m21 = 2.0 * (y * z + w * x);
    let m22 = 1.0 - 2.0 * (x * x + y * y);

    // glam is column-major
    DMat3::from_cols(
        DVec3::new(m00, m10, m20),
        DVec3::new(m01, m11, m21),
        DVec3::new(m02, m12, m22),
    )
}

/// Embed a rotation and translation into a 4×4 homogeneous matrix with
/// bottom row `(0, 0, 0, 1)`.
#[must_use]
pub fn compose_transform(q: Quaternion, t: DVec3) -> DMat4 {
    let r = quaternion_to_matrix(q);
    DMat4::from_cols(
        r.x_axis.extend(0.0),
        r.y_axis.extend(0.0),
        r.z_axis.extend(0.0),
        t.extend(1.0),
    )
}

/// Apply a homogeneous transform to every point: append `w = 1`, multiply,
/// drop `w`.
///
/// One pass over the slice with no per-point allocation; clouds of 10⁶
/// points are expected here.
#[must_use]
pub fn apply_transform(t: &DMat4, points: &[DVec3]) -> Vec<DVec3> {
    points
        .iter()
        .map(|p| (*t * DVec4::new(p.x, p.y, p.z, 1.0)).truncate())
        .collect()
}

/// Shift every point by a constant vector.
///
/// Used after [`apply_transform`] to separate a transformed cloud from the
/// map cloud on screen. The offset never becomes part of a
/// [`RigidTransform`].
pub fn apply_offset(points: &mut [DVec3], offset: DVec3) {
    if offset == DVec3::ZERO {
        return;
    }
    for p in points {
        *p += offset;
    }
}

/// The two pose estimates recorded per frame by the optimizer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
)]
pub enum TransformName {
    /// Pose before optimization.
    #[serde(rename = "T_init_w_b")]
    Init,
    /// Pose after optimization.
    #[default]
    #[serde(rename = "T_opt_w_b")]
    Opt,
}

impl TransformName {
    /// Both transform names, initial first.
    pub const ALL: [Self; 2] = [Self::Init, Self::Opt];

    /// The name used in files and geometry names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "T_init_w_b",
            Self::Opt => "T_opt_w_b",
        }
    }

    /// Parse the on-disk spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.as_str() == s)
    }
}

impl fmt::Display for TransformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rigid transform stored as rotation quaternion plus translation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RigidTransform {
    /// Rotation, normalized on use.
    pub rotation: Quaternion,
    /// Translation applied after rotation.
    pub translation: DVec3,
}

impl RigidTransform {
    /// Build from rotation and translation.
    #[must_use]
    pub const fn new(rotation: Quaternion, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// 4×4 homogeneous matrix for this transform.
    #[must_use]
    pub fn matrix(&self) -> DMat4 {
        compose_transform(self.rotation, self.translation)
    }

    /// 4×4 matrix of the inverse transform (`Rᵀ`, `-Rᵀt`).
    #[must_use]
    pub fn inverse_matrix(&self) -> DMat4 {
        let rt = quaternion_to_matrix(self.rotation).transpose();
        let t = -(rt * self.translation);
        DMat4::from_cols(
            rt.x_axis.extend(0.0),
            rt.y_axis.extend(0.0),
            rt.z_axis.extend(0.0),
            t.extend(1.0),
        )
    }

    /// Component-wise change from `self` to `other`.
    #[must_use]
    pub fn delta_to(&self, other: &Self) -> TransformDelta {
        TransformDelta {
            rotation: [
                other.rotation.w - self.rotation.w,
                other.rotation.x - self.rotation.x,
                other.rotation.y - self.rotation.y,
                other.rotation.z - self.rotation.z,
            ],
            translation: other.translation - self.translation,
        }
    }
}

/// Difference between two transforms, as reported for the optimizer's
/// initial vs optimized pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformDelta {
    /// `(w, x, y, z)` quaternion component differences.
    pub rotation: [f64; 4],
    /// Translation difference.
    pub translation: DVec3,
}

impl TransformDelta {
    /// Length of the translation change.
    #[must_use]
    pub fn translation_norm(&self) -> f64 {
        self.translation.length()
    }
}

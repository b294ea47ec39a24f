use glam::{DMat4, DVec3};

use super::transform::{apply_offset, apply_transform};
use crate::color::Rgb;

/// An ordered cloud of points with optional per-point normals and colors.
///
/// When present, `normals` and `colors` have exactly one entry per point.
/// Constructors drop attribute arrays whose length does not match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<DVec3>,
    normals: Option<Vec<DVec3>>,
    colors: Option<Vec<Rgb>>,
}

impl PointSet {
    /// Cloud with positions only.
    #[must_use]
    pub fn new(points: Vec<DVec3>) -> Self {
        Self {
            points,
            normals: None,
            colors: None,
        }
    }

    /// Attach per-point normals. Ignored when the length differs.
    #[must_use]
    pub fn with_normals(mut self, normals: Vec<DVec3>) -> Self {
        if normals.len() == self.points.len() {
            self.normals = Some(normals);
        } else {
            log::debug!(
                "dropping {} normals for a cloud of {} points",
                normals.len(),
                self.points.len()
            );
        }
        self
    }

    /// Attach per-point colors. Ignored when the length differs.
    #[must_use]
    pub fn with_colors(mut self, colors: Vec<Rgb>) -> Self {
        self.set_colors(colors);
        self
    }

    /// Replace the per-point colors. Ignored when the length differs.
    pub fn set_colors(&mut self, colors: Vec<Rgb>) {
        if colors.len() == self.points.len() {
            self.colors = Some(colors);
        }
    }

    /// Give every point the same normal.
    pub fn set_uniform_normal(&mut self, normal: DVec3) {
        self.normals = Some(vec![normal; self.points.len()]);
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the cloud has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point positions.
    #[must_use]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Per-point normals, if any.
    #[must_use]
    pub fn normals(&self) -> Option<&[DVec3]> {
        self.normals.as_deref()
    }

    /// Per-point colors, if any.
    #[must_use]
    pub fn colors(&self) -> Option<&[Rgb]> {
        self.colors.as_deref()
    }

    /// A copy moved by `transform` and then shifted by `offset`.
    ///
    /// Colors are not carried over; normals are replaced by `+Z`, which is
    /// what transformed patches are shaded with.
    #[must_use]
    pub fn transformed(&self, transform: &DMat4, offset: DVec3) -> Self {
        let mut points = apply_transform(transform, &self.points);
        apply_offset(&mut points, offset);
        let mut out = Self::new(points);
        out.set_uniform_normal(DVec3::Z);
        out
    }

    /// Axis-aligned bounds, `None` for an empty cloud.
    #[must_use]
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    /// Largest side of the bounding box, 0 for an empty cloud.
    #[must_use]
    pub fn max_extent(&self) -> f64 {
        self.bounds()
            .map_or(0.0, |(lo, hi)| (hi - lo).max_element())
    }

    /// Index and distance of the point closest to `target`.
    #[must_use]
    pub fn nearest(&self, target: DVec3) -> Option<(usize, f64)> {
        self.points
            .iter()
            .map(|p| p.distance_squared(target))
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, d2)| (i, d2.sqrt()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Quaternion, RigidTransform};

    fn square() -> PointSet {
        PointSet::new(vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.5),
        ])
    }

    #[test]
    fn mismatched_attributes_are_dropped() {
        let cloud = square()
            .with_colors(vec![[1.0, 1.0, 1.0]])
            .with_normals(vec![DVec3::Z; 4]);
        assert!(cloud.colors().is_none());
        assert_eq!(cloud.normals().map(<[DVec3]>::len), Some(4));
    }

    #[test]
    fn bounds_and_extent() {
        let cloud = square();
        let (lo, hi) = cloud.bounds().unwrap();
        assert_eq!(lo, DVec3::ZERO);
        assert_eq!(hi, DVec3::new(2.0, 1.0, 0.5));
        assert_eq!(cloud.max_extent(), 2.0);
        assert!(PointSet::default().bounds().is_none());
        assert_eq!(PointSet::default().max_extent(), 0.0);
    }

    #[test]
    fn transformed_copy_applies_offset_and_flat_normals() {
        let tf = RigidTransform::new(
            Quaternion::IDENTITY,
            DVec3::new(1.0, 0.0, 0.0),
        );
        let moved = square()
            .with_colors(vec![[0.0; 3]; 4])
            .transformed(&tf.matrix(), DVec3::new(0.0, 0.0, 10.0));
        assert_eq!(moved.points()[1], DVec3::new(3.0, 0.0, 10.0));
        assert!(moved.colors().is_none());
        assert!(moved.normals().unwrap().iter().all(|n| *n == DVec3::Z));
    }

    #[test]
    fn nearest_point() {
        let (idx, dist) = square().nearest(DVec3::new(2.1, 0.9, 0.0)).unwrap();
        assert_eq!(idx, 2);
        assert!((dist - 0.1_f64.hypot(0.1)).abs() < 1e-12);
        assert!(PointSet::default().nearest(DVec3::ZERO).is_none());
    }
}

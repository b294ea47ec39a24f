//! Segment geometry: dense correspondence lines and the axis helper.

use glam::DVec3;

use crate::color::Rgb;
use crate::matching::PointMatch;

/// A set of independent two-point segments with one color per segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineGeometry {
    /// Segment endpoints; segment `k` is `vertices[2k]..vertices[2k + 1]`.
    vertices: Vec<DVec3>,
    colors: Vec<Rgb>,
}

impl LineGeometry {
    /// Empty line set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one segment.
    pub fn push(&mut self, a: DVec3, b: DVec3, color: Rgb) {
        self.vertices.push(a);
        self.vertices.push(b);
        self.colors.push(color);
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Iterate segments as `(start, end, color)`.
    pub fn segments(&self) -> impl Iterator<Item = (DVec3, DVec3, Rgb)> + '_ {
        self.vertices
            .chunks_exact(2)
            .zip(&self.colors)
            .map(|(pair, c)| (pair[0], pair[1], *c))
    }

    /// Per-segment colors.
    #[must_use]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Flat endpoint list, two per segment.
    #[must_use]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Overwrite every segment color.
    pub fn fill(&mut self, color: Rgb) {
        self.colors.fill(color);
    }
}

/// Output of [`build_match_lines`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchLines {
    /// One segment per usable correspondence.
    pub lines: LineGeometry,
    /// Correspondences dropped for a negative or out-of-range index.
    pub skipped: usize,
}

/// Join matched point pairs with line segments.
///
/// Segment `k` runs from `transformed[cur]` to `map[other]`. A
/// correspondence is used only if both indices are in range, so the output
/// never has more segments than there are correspondences.
#[must_use]
pub fn build_match_lines(
    transformed: &[DVec3],
    map: &[DVec3],
    matches: &[PointMatch],
    color: Rgb,
) -> MatchLines {
    let mut lines = LineGeometry::new();
    let mut skipped = 0;
    for m in matches {
        let from = m.frame_index().and_then(|i| transformed.get(i));
        let to = m.map_index().and_then(|j| map.get(j));
        match (from, to) {
            (Some(a), Some(b)) => lines.push(*a, *b, color),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        log::debug!(
            "match lines: {} built, {skipped} correspondences out of range",
            lines.len()
        );
    }
    MatchLines { lines, skipped }
}

/// Three segments from `origin` along +X, +Y and +Z.
#[must_use]
pub fn axis_lines(origin: DVec3, length: f64, colors: [Rgb; 3]) -> LineGeometry {
    let mut lines = LineGeometry::new();
    for (dir, color) in [DVec3::X, DVec3::Y, DVec3::Z].into_iter().zip(colors) {
        lines.push(origin, origin + dir * length, color);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const YELLOW: Rgb = [1.0, 1.0, 0.0];

    fn cloud(n: usize, z: f64) -> Vec<DVec3> {
        (0..n).map(|i| DVec3::new(i as f64, 0.0, z)).collect()
    }

    #[test]
    fn only_in_range_pairs_become_segments() {
        let transformed = cloud(3, 10.0);
        let map = cloud(500, 0.0);
        let matches = [
            PointMatch::new(0, 10),
            PointMatch::new(1, -1),
            PointMatch::new(2, 999_999),
        ];
        let out = build_match_lines(&transformed, &map, &matches, YELLOW);
        assert_eq!(out.lines.len(), 1);
        assert_eq!(out.skipped, 2);

        let (a, b, c) = out.lines.segments().next().unwrap();
        assert_eq!(a, DVec3::new(0.0, 0.0, 10.0));
        assert_eq!(b, DVec3::new(10.0, 0.0, 0.0));
        assert_eq!(c, YELLOW);
    }

    #[test]
    fn frame_index_out_of_range_is_skipped() {
        let out = build_match_lines(
            &cloud(2, 0.0),
            &cloud(2, 0.0),
            &[PointMatch::new(5, 0), PointMatch::new(-3, 1)],
            YELLOW,
        );
        assert!(out.lines.is_empty());
        assert_eq!(out.skipped, 2);
    }

    #[test]
    fn axis_helper_has_three_colored_segments() {
        let colors = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let axes = axis_lines(DVec3::ZERO, 8.0, colors);
        assert_eq!(axes.len(), 3);
        assert_eq!(axes.vertices()[5], DVec3::new(0.0, 0.0, 8.0));
        assert_eq!(axes.colors(), &colors);
    }
}

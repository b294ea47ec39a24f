use std::hash::Hash;

use rustc_hash::FxHashMap;

use super::Rgb;
use crate::matching::PointMatch;

/// Sentinel color for map geometry that has no counterpart.
pub const UNMATCHED: Rgb = [1.0, 0.0, 0.0];

/// Colors of transformed frame geometry, keyed by whatever identifies the
/// source (entity key, point index).
#[derive(Debug, Clone)]
pub struct ColorTable<K> {
    colors: FxHashMap<K, Rgb>,
    unmatched: Rgb,
}

impl<K: Eq + Hash> Default for ColorTable<K> {
    fn default() -> Self {
        Self::new(UNMATCHED)
    }
}

impl<K: Eq + Hash> ColorTable<K> {
    /// Empty table whose lookups miss to `unmatched`.
    #[must_use]
    pub fn new(unmatched: Rgb) -> Self {
        Self {
            colors: FxHashMap::default(),
            unmatched,
        }
    }

    /// Record the color of a source.
    pub fn insert(&mut self, key: K, color: Rgb) {
        let _ = self.colors.insert(key, color);
    }

    /// Color of a source, if recorded.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<Rgb> {
        self.colors.get(key).copied()
    }

    /// Number of recorded sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color a target inherits from its matched source. A target with no
    /// source, or whose source was never colored, gets the unmatched
    /// sentinel.
    #[must_use]
    pub fn propagate(&self, source: Option<&K>) -> Rgb {
        source
            .and_then(|k| self.colors.get(k).copied())
            .unwrap_or(self.unmatched)
    }
}

/// Per-point colors for a map cloud of `map_len` points.
///
/// Each valid match paints map point `other` with the color of transformed
/// point `cur`. Everything else, including matches whose `cur` has no
/// color, stays `unmatched`.
#[must_use]
pub fn propagate_point_colors(
    map_len: usize,
    matches: &[PointMatch],
    source_colors: &[Rgb],
    unmatched: Rgb,
) -> Vec<Rgb> {
    let mut colors = vec![unmatched; map_len];
    for m in matches {
        let Some(other) = m.map_index().filter(|&j| j < map_len) else {
            continue;
        };
        if let Some(c) = m.frame_index().and_then(|i| source_colors.get(i)) {
            colors[other] = *c;
        }
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_misses_are_red() {
        let mut table = ColorTable::default();
        table.insert(2_i64, [0.1, 0.2, 0.3]);
        assert_eq!(table.propagate(Some(&2)), [0.1, 0.2, 0.3]);
        assert_eq!(table.propagate(Some(&9)), UNMATCHED);
        assert_eq!(table.propagate(None), UNMATCHED);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn point_colors_follow_matches() {
        let source = vec![[0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let matches = [
            PointMatch::new(0, 3),
            PointMatch::new(1, -1),
            PointMatch::new(1, 99),
            PointMatch::new(7, 1),
        ];
        let colors = propagate_point_colors(4, &matches, &source, UNMATCHED);
        assert_eq!(colors[3], [0.0, 1.0, 0.0]);
        assert_eq!(colors[0], UNMATCHED);
        assert_eq!(colors[1], UNMATCHED);
        assert_eq!(colors[2], UNMATCHED);
    }
}

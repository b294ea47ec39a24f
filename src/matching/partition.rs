use rustc_hash::FxHashSet;

use super::{EntityKind, MatchTable};

/// Matched/unmatched split of one planar kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanarPartition {
    /// Frame ids that appear as `cur` of some match.
    pub matched_frame_ids: Vec<i64>,
    /// Map ids that appear as `other` of some match.
    pub matched_map_ids: Vec<i64>,
    /// Map ids present on disk that no match points at.
    pub unmatched_map_ids: Vec<i64>,
}

impl PlanarPartition {
    /// Split `map_ids` of `kind` by the table's planar matches.
    ///
    /// Outputs are sorted ascending and deduplicated.
    #[must_use]
    pub fn compute(
        table: &MatchTable,
        kind: EntityKind,
        map_ids: &[i64],
    ) -> Self {
        let mut frame: Vec<i64> =
            table.planar_for(kind).map(|m| m.cur_id).collect();
        frame.sort_unstable();
        frame.dedup();

        let targets: FxHashSet<i64> = table
            .planar
            .iter()
            .filter(|m| m.other_kind == kind)
            .map(|m| m.other_id)
            .collect();
        let mut matched: Vec<i64> = targets.iter().copied().collect();
        matched.sort_unstable();

        let mut unmatched: Vec<i64> = map_ids
            .iter()
            .copied()
            .filter(|id| !targets.contains(id))
            .collect();
        unmatched.sort_unstable();
        unmatched.dedup();

        Self {
            matched_frame_ids: frame,
            matched_map_ids: matched,
            unmatched_map_ids: unmatched,
        }
    }
}

/// Split of a map dense cloud's point indices by dense correspondences.
///
/// `matched` and `unmatched` are disjoint and together cover `0..len`
/// exactly. `matched_to_plane` has no population rule and is always
/// empty; it is kept so consumers can report it explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DensePartition {
    /// Map point indices hit by at least one valid match, ascending.
    pub matched: Vec<usize>,
    /// Map point indices never hit, ascending.
    pub unmatched: Vec<usize>,
    /// Always empty.
    pub matched_to_plane: Vec<usize>,
}

impl DensePartition {
    /// Partition `0..map_len` with a single mask pass.
    #[must_use]
    pub fn compute(table: &MatchTable, map_len: usize) -> Self {
        let mut hit = vec![false; map_len];
        for m in table.valid_dense() {
            if let Some(slot) = m.map_index().and_then(|j| hit.get_mut(j)) {
                *slot = true;
            }
        }
        let (matched, unmatched): (Vec<usize>, Vec<usize>) =
            (0..map_len).partition(|&j| hit[j]);
        Self {
            matched,
            unmatched,
            matched_to_plane: Vec::new(),
        }
    }

    /// Number of map points covered.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }
}

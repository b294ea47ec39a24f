//! Correspondence data: entity kinds, planar and dense matches, the
//! `match.json` wire format, and matched/unmatched partitioning.

mod partition;
mod table;

use std::fmt;

pub use partition::{DensePartition, PlanarPartition};
use serde::{Deserialize, Serialize};
pub use table::MatchTable;

/// Classification of a point set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// The per-frame dense cloud. One per frame and side.
    Dense,
    /// A segmented ground patch.
    Ground,
    /// A segmented planar patch.
    Plane,
}

impl EntityKind {
    /// All kinds.
    pub const ALL: [Self; 3] = [Self::Dense, Self::Ground, Self::Plane];
    /// Kinds that carry a local id.
    pub const PLANAR: [Self; 2] = [Self::Ground, Self::Plane];

    /// File-stem / name spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dense => "dense_cloud",
            Self::Ground => "ground",
            Self::Plane => "plane",
        }
    }

    /// Parse the name spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Kind for a `match.json` type code (`1` plane, `2` ground).
    #[must_use]
    pub const fn from_match_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Plane),
            2 => Some(Self::Ground),
            _ => None,
        }
    }

    /// Whether entities of this kind carry a local id.
    #[must_use]
    pub const fn is_planar(self) -> bool {
        !matches!(self, Self::Dense)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planar correspondence: frame entity `cur` ↔ map entity `other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanarMatch {
    /// Kind of the frame-side entity.
    pub cur_kind: EntityKind,
    /// Local id of the frame-side entity.
    pub cur_id: i64,
    /// Kind of the map-side entity.
    pub other_kind: EntityKind,
    /// Local id of the map-side entity. Always `>= 0` once in a
    /// [`MatchTable`].
    pub other_id: i64,
    /// Optimizer axis tag, carried through unchanged.
    pub axis: i64,
}

/// One dense correspondence: frame point `cur` ↔ map point `other`.
///
/// A negative `other` means "no match" and is kept only so callers can
/// count it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct PointMatch {
    /// Index into the frame (transformed) dense cloud.
    #[serde(rename = "cur_id")]
    pub cur: i64,
    /// Index into the map dense cloud, negative for none.
    #[serde(rename = "other_id")]
    pub other: i64,
}

impl PointMatch {
    /// Build a correspondence.
    #[must_use]
    pub const fn new(cur: i64, other: i64) -> Self {
        Self { cur, other }
    }

    /// Whether this is an actual match (`other >= 0`).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.other >= 0
    }

    /// Frame-side index, `None` when negative.
    #[must_use]
    pub fn frame_index(&self) -> Option<usize> {
        usize::try_from(self.cur).ok()
    }

    /// Map-side index, `None` when negative.
    #[must_use]
    pub fn map_index(&self) -> Option<usize> {
        usize::try_from(self.other).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes() {
        assert_eq!(EntityKind::from_match_code(1), Some(EntityKind::Plane));
        assert_eq!(EntityKind::from_match_code(2), Some(EntityKind::Ground));
        assert_eq!(EntityKind::from_match_code(0), None);
        assert_eq!(EntityKind::parse("dense_cloud"), Some(EntityKind::Dense));
        assert_eq!(EntityKind::parse("dense"), None);
        assert!(!EntityKind::Dense.is_planar());
    }

    #[test]
    fn point_match_indices() {
        let m = PointMatch::new(4, -1);
        assert!(!m.is_valid());
        assert_eq!(m.frame_index(), Some(4));
        assert_eq!(m.map_index(), None);
    }
}

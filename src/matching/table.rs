use serde::Deserialize;

use super::{EntityKind, PlanarMatch, PointMatch};

/// The parsed correspondence table of one frame.
///
/// Planar entries with an unknown type code, a bare integer `cur_id` or a
/// negative `other_id` are dropped while parsing and counted in
/// [`malformed`](Self::malformed). Dense entries are kept as written;
/// [`valid_dense`](Self::valid_dense) filters them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchTable {
    /// Planar correspondences.
    pub planar: Vec<PlanarMatch>,
    /// Dense point correspondences, including invalid ones.
    pub dense: Vec<PointMatch>,
    /// Planar entries dropped while parsing.
    pub malformed: usize,
}

// -- match.json wire format --

#[derive(Deserialize)]
struct RawMatchFile {
    #[serde(default)]
    plane_match_infos: Vec<RawPlaneMatch>,
    #[serde(default)]
    dense_pt_match_infos: Vec<PointMatch>,
}

#[derive(Deserialize)]
struct RawPlaneMatch {
    cur_id: RawId,
    other_id: RawId,
    #[serde(default)]
    axis: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Typed { a: i64, b: i64 },
    Bare(i64),
}

impl RawPlaneMatch {
    fn resolve(&self) -> Option<PlanarMatch> {
        let RawId::Typed { a, b: cur_id } = self.cur_id else {
            return None;
        };
        let cur_kind = EntityKind::from_match_code(a)?;
        let (other_kind, other_id) = match self.other_id {
            RawId::Typed { a, b } => (EntityKind::from_match_code(a)?, b),
            RawId::Bare(b) => (cur_kind, b),
        };
        (other_id >= 0).then_some(PlanarMatch {
            cur_kind,
            cur_id,
            other_kind,
            other_id,
            axis: self.axis,
        })
    }
}

impl MatchTable {
    /// Parse the contents of a `match.json` file.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: RawMatchFile = serde_json::from_str(text)?;
        let mut table = Self {
            dense: raw.dense_pt_match_infos,
            ..Self::default()
        };
        for entry in &raw.plane_match_infos {
            match entry.resolve() {
                Some(m) => table.planar.push(m),
                None => table.malformed += 1,
            }
        }
        if table.malformed > 0 {
            log::debug!(
                "match table: dropped {} planar entries",
                table.malformed
            );
        }
        Ok(table)
    }

    /// Whether the table holds no correspondences at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.planar.is_empty() && self.dense.is_empty()
    }

    /// Dense correspondences with `other >= 0`.
    pub fn valid_dense(&self) -> impl Iterator<Item = &PointMatch> + '_ {
        self.dense.iter().filter(|m| m.is_valid())
    }

    /// Planar correspondences whose frame side is `kind`.
    pub fn planar_for(
        &self,
        kind: EntityKind,
    ) -> impl Iterator<Item = &PlanarMatch> + '_ {
        self.planar.iter().filter(move |m| m.cur_kind == kind)
    }

    /// The planar match for a frame entity, if any. Later entries win.
    #[must_use]
    pub fn match_for_frame(
        &self,
        kind: EntityKind,
        local_id: i64,
    ) -> Option<&PlanarMatch> {
        self.planar
            .iter()
            .rev()
            .find(|m| m.cur_kind == kind && m.cur_id == local_id)
    }

    /// The planar match whose map side is `(kind, local_id)`. Later entries
    /// win.
    #[must_use]
    pub fn match_for_map(
        &self,
        kind: EntityKind,
        local_id: i64,
    ) -> Option<&PlanarMatch> {
        self.planar
            .iter()
            .rev()
            .find(|m| m.other_kind == kind && m.other_id == local_id)
    }
}

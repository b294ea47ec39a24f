use std::path::{Path, PathBuf};

use super::{
    read_ply, DataSource, DebugInfo, EntityRef, PlaneMetadata, Side,
};
use crate::error::MatchVizError;
use crate::geometry::PointSet;
use crate::matching::MatchTable;
use crate::scene::parse_stem;

const DEBUG_FILE: &str = "debug.txt";
const MATCH_FILE: &str = "match.json";

/// Reads `<root>/<frame_id>/{frame,map}/*.ply`, their `.json` sidecars,
/// `<root>/<frame_id>/debug.txt` and `<root>/<frame_id>/match.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn frame_dir(&self, frame_id: u32) -> PathBuf {
        self.root.join(frame_id.to_string())
    }

    fn side_dir(&self, frame_id: u32, side: Side) -> PathBuf {
        self.frame_dir(frame_id).join(side.as_str())
    }

    fn entity_path(
        &self,
        frame_id: u32,
        side: Side,
        entity: EntityRef,
        ext: &str,
    ) -> PathBuf {
        self.side_dir(frame_id, side)
            .join(format!("{}.{ext}", entity.stem()))
    }

    /// Read a file that may legitimately be absent.
    fn read_optional(path: &Path) -> Result<Option<String>, MatchVizError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MatchVizError::Io(e)),
        }
    }
}

impl DataSource for DirectorySource {
    fn available_frames(&self) -> Result<Vec<u32>, MatchVizError> {
        let mut frames: Vec<u32> = std::fs::read_dir(&self.root)?
            .flatten()
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str()?.parse().ok())
            .collect();
        frames.sort_unstable();
        Ok(frames)
    }

    fn list_entities(
        &self,
        frame_id: u32,
        side: Side,
    ) -> Result<Vec<EntityRef>, MatchVizError> {
        let dir = self.side_dir(frame_id, side);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no {side} directory for frame {frame_id}");
                return Ok(Vec::new());
            }
            Err(e) => return Err(MatchVizError::Io(e)),
        };
        let mut refs: Vec<EntityRef> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "ply"))
            .filter_map(|p| {
                let stem = p.file_stem()?.to_str()?;
                let parsed = parse_stem(stem);
                if parsed.is_none() {
                    log::debug!("ignoring {}", p.display());
                }
                parsed
            })
            .map(|(kind, local_id)| EntityRef { kind, local_id })
            .collect();
        refs.sort_unstable();
        Ok(refs)
    }

    fn load_points(
        &self,
        frame_id: u32,
        side: Side,
        entity: EntityRef,
    ) -> Result<PointSet, MatchVizError> {
        read_ply(&self.entity_path(frame_id, side, entity, "ply"))
    }

    fn load_metadata(
        &self,
        frame_id: u32,
        side: Side,
        entity: EntityRef,
    ) -> Result<Option<PlaneMetadata>, MatchVizError> {
        let path = self.entity_path(frame_id, side, entity, "json");
        Self::read_optional(&path)?
            .map(|text| {
                PlaneMetadata::from_json(&text)
                    .map_err(|source| MatchVizError::Json { path, source })
            })
            .transpose()
    }

    fn load_debug_info(
        &self,
        frame_id: u32,
    ) -> Result<Option<DebugInfo>, MatchVizError> {
        let path = self.frame_dir(frame_id).join(DEBUG_FILE);
        Self::read_optional(&path)?
            .map(|text| {
                DebugInfo::parse(&text)
                    .map_err(|reason| MatchVizError::DebugInfo { path, reason })
            })
            .transpose()
    }

    fn load_match_table(
        &self,
        frame_id: u32,
    ) -> Result<Option<MatchTable>, MatchVizError> {
        let path = self.frame_dir(frame_id).join(MATCH_FILE);
        Self::read_optional(&path)?
            .map(|text| {
                MatchTable::from_json(&text)
                    .map_err(|source| MatchVizError::Json { path, source })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::geometry::TransformName;
    use crate::matching::EntityKind;

    const PLY_HEADER: &str = "ply\nformat ascii 1.0\nelement vertex 2\n\
property float x\nproperty float y\nproperty float z\nend_header\n";

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let cloud = format!("{PLY_HEADER}0 0 0\n1 1 1\n");
        for rel in [
            "1/frame/dense_cloud.ply",
            "1/frame/plane_2.ply",
            "1/frame/ground_0.ply",
            "1/map/plane_5.ply",
            "1/map/plane_10.ply",
        ] {
            write(root, rel, &cloud);
        }
        write(root, "1/frame/notes.ply", &cloud);
        write(root, "1/frame/plane_2.json", r#"{"radius": 2.0}"#);
        write(root, "1/map/plane_5.json", "{not json");
        write(
            root,
            "1/debug.txt",
            "T_init_w_b = t(xyz) = 0 0 0, q(wxyz) = 1 0 0 0\n\
             T_opt_w_b = t(xyz) = 1 0 0, q(wxyz) = 1 0 0 0\n",
        );
        write(root, "1/match.json", r#"{"plane_match_infos": []}"#);
        write(root, "2/debug.txt", "T_init_w_b = t(xyz) = 0 0 0, q(wxyz) = 1 0 0 0\n");
        std::fs::create_dir_all(root.join("0")).unwrap();
        std::fs::create_dir_all(root.join("scratch")).unwrap();
        dir
    }

    #[test]
    fn lists_numeric_frames() {
        let dir = fixture();
        let src = DirectorySource::new(dir.path());
        assert_eq!(src.available_frames().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn lists_entities_sorted_by_kind_then_id() {
        let dir = fixture();
        let src = DirectorySource::new(dir.path());
        assert_eq!(
            src.list_entities(1, Side::Frame).unwrap(),
            vec![EntityRef::DENSE, EntityRef::ground(0), EntityRef::plane(2)]
        );
        assert_eq!(
            src.list_entities(1, Side::Map).unwrap(),
            vec![EntityRef::plane(5), EntityRef::plane(10)]
        );
        assert!(src.list_entities(0, Side::Map).unwrap().is_empty());
    }

    #[test]
    fn loads_points_and_sidecars() {
        let dir = fixture();
        let src = DirectorySource::new(dir.path());
        let cloud = src.load_points(1, Side::Frame, EntityRef::plane(2)).unwrap();
        assert_eq!(cloud.points()[1], DVec3::ONE);

        let meta = src
            .load_metadata(1, Side::Frame, EntityRef::plane(2))
            .unwrap()
            .unwrap();
        assert_eq!(meta.radius, 2.0);
        assert!(src
            .load_metadata(1, Side::Frame, EntityRef::ground(0))
            .unwrap()
            .is_none());
        assert!(matches!(
            src.load_metadata(1, Side::Map, EntityRef::plane(5)),
            Err(MatchVizError::Json { .. })
        ));
    }

    #[test]
    fn transforms_and_match_tables() {
        let dir = fixture();
        let src = DirectorySource::new(dir.path());
        let opt = src.load_transform(1, TransformName::Opt).unwrap().unwrap();
        assert_eq!(opt.translation, DVec3::X);
        assert!(src.load_transform(0, TransformName::Opt).unwrap().is_none());
        assert!(matches!(
            src.load_debug_info(2),
            Err(MatchVizError::DebugInfo { .. })
        ));

        let table = src.load_match_table(1).unwrap().unwrap();
        assert!(table.is_empty());
        assert!(src.load_match_table(2).unwrap().is_none());
    }

    #[test]
    fn missing_ply_is_an_error() {
        let dir = fixture();
        let src = DirectorySource::new(dir.path());
        let missing = EntityRef {
            kind: EntityKind::Ground,
            local_id: Some(9),
        };
        assert!(src.load_points(1, Side::Map, missing).is_err());
    }
}

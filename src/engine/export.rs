//! Matched/unmatched map point id lists.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::MatchViewer;
use crate::error::MatchVizError;
use crate::renderer::Renderer;
use crate::source::DataSource;

/// Files written by [`MatchViewer::export_id_lists`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdListFiles {
    /// Map dense point indices hit by a correspondence.
    pub matched: PathBuf,
    /// Map dense point indices never hit.
    pub unmatched: PathBuf,
}

/// Write `ids` to `path`, one per line, largest first.
pub fn write_id_list(path: &Path, ids: &[usize]) -> Result<(), MatchVizError> {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let mut out = BufWriter::new(File::create(path)?);
    for id in sorted {
        writeln!(out, "{id}")?;
    }
    out.flush()?;
    Ok(())
}

impl<S: DataSource, R: Renderer> MatchViewer<S, R> {
    /// Write the dense partition of the current frame into `dir` as
    /// `matched_map_dense_cloud_points_{frame}.txt` and
    /// `unmatched_map_dense_cloud_points_{frame}.txt`.
    ///
    /// `Ok(None)` when the frame has no dense partition (baseline frame,
    /// missing transform or no map dense cloud).
    pub fn export_id_lists(
        &self,
        dir: &Path,
    ) -> Result<Option<IdListFiles>, MatchVizError> {
        let Some((frame_id, partition)) = self
            .context
            .as_ref()
            .and_then(|c| Some((c.frame_id, c.partition.as_ref()?)))
        else {
            log::debug!("no dense partition to export");
            return Ok(None);
        };

        let files = IdListFiles {
            matched: dir
                .join(format!("matched_map_dense_cloud_points_{frame_id}.txt")),
            unmatched: dir
                .join(format!("unmatched_map_dense_cloud_points_{frame_id}.txt")),
        };
        write_id_list(&files.matched, &partition.matched)?;
        write_id_list(&files.unmatched, &partition.unmatched)?;
        log::info!(
            "frame {frame_id}: exported {} matched / {} unmatched map point ids to {}",
            partition.matched.len(),
            partition.unmatched.len(),
            dir.display()
        );
        Ok(Some(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_util::viewer;

    #[test]
    fn id_lists_are_descending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.txt");
        write_id_list(&path, &[3, 10, 0, 7]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "10\n7\n3\n0\n");

        write_id_list(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn exports_the_current_partition() {
        let dir = tempfile::tempdir().unwrap();
        let mut v = viewer();
        let _ = v.load_frame(1).unwrap();
        let files = v.export_id_lists(dir.path()).unwrap().unwrap();

        assert!(files
            .matched
            .ends_with("matched_map_dense_cloud_points_1.txt"));
        assert_eq!(std::fs::read_to_string(&files.matched).unwrap(), "3\n1\n");
        assert_eq!(std::fs::read_to_string(&files.unmatched).unwrap(), "2\n0\n");
    }

    #[test]
    fn baseline_frame_has_nothing_to_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut v = viewer();
        let _ = v.load_frame(0).unwrap();
        assert!(v.export_id_lists(dir.path()).unwrap().is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn unwritable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut v = viewer();
        let _ = v.load_frame(1).unwrap();
        let missing = dir.path().join("does/not/exist");
        assert!(matches!(
            v.export_id_lists(&missing),
            Err(MatchVizError::Io(_))
        ));
    }
}

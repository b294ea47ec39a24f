//! The viewer's interactive vocabulary.
//!
//! Key bindings, a GUI or a script all drive the viewer the same way: by
//! building a [`ViewerCommand`] and handing it to
//! [`MatchViewer::execute`](super::MatchViewer::execute).
//!
//! ```ignore
//! viewer.execute(ViewerCommand::NextFrame)?;
//! viewer.execute(ViewerCommand::ToggleKind { kind: EntityKind::Plane })?;
//! ```

use std::path::PathBuf;

use super::MatchViewer;
use crate::error::MatchVizError;
use crate::matching::EntityKind;
use crate::renderer::Renderer;
use crate::source::DataSource;

/// A discrete or parameterized operation the viewer can perform.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    // ── Frames ──
    /// Display one frame.
    LoadFrame {
        /// Frame to display.
        frame_id: u32,
    },
    /// Step to the next available frame.
    NextFrame,
    /// Step to the previous available frame.
    PreviousFrame,

    // ── Visibility ──
    /// Toggle every entity of one kind.
    ToggleKind {
        /// Kind to toggle.
        kind: EntityKind,
    },
    /// Toggle the dense correspondence lines.
    ToggleMatchLines,
    /// Show or hide all representations of one planar match.
    SetMatchVisible {
        /// Frame-side kind.
        kind: EntityKind,
        /// Frame-side local id.
        local_id: i64,
        /// Target state.
        visible: bool,
    },

    // ── Layout ──
    /// Move transformed geometry to a new display offset.
    SetOffset {
        /// Offset added after the transform.
        offset: [f64; 3],
    },

    // ── Output ──
    /// Write matched/unmatched map point ids of the current frame.
    ExportIdLists {
        /// Target directory.
        dir: PathBuf,
    },
}

impl<S: DataSource, R: Renderer> MatchViewer<S, R> {
    /// Execute one command. Errors come only from the data source or the
    /// filesystem.
    pub fn execute(&mut self, cmd: ViewerCommand) -> Result<(), MatchVizError> {
        log::debug!("execute {cmd:?}");
        match cmd {
            ViewerCommand::LoadFrame { frame_id } => {
                let _ = self.load_frame(frame_id)?;
            }
            ViewerCommand::NextFrame => {
                let _ = self.next_frame()?;
            }
            ViewerCommand::PreviousFrame => {
                let _ = self.previous_frame()?;
            }
            ViewerCommand::ToggleKind { kind } => {
                let _ = self.toggle_kind(kind);
            }
            ViewerCommand::ToggleMatchLines => {
                let _ = self.toggle_match_lines();
            }
            ViewerCommand::SetMatchVisible {
                kind,
                local_id,
                visible,
            } => {
                let _ = self.set_match_visible(kind, local_id, visible);
            }
            ViewerCommand::SetOffset { offset } => self.set_offset(offset),
            ViewerCommand::ExportIdLists { dir } => {
                let _ = self.export_id_lists(&dir)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_util::viewer;
    use crate::engine::FrameState;
    use crate::scene::GeometryId;

    #[test]
    fn commands_drive_the_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let mut v = viewer();
        v.execute(ViewerCommand::NextFrame).unwrap();
        v.execute(ViewerCommand::NextFrame).unwrap();
        assert_eq!(v.current_frame(), Some(1));
        assert_eq!(v.state(), FrameState::Rendered);

        v.execute(ViewerCommand::ToggleMatchLines).unwrap();
        assert!(v
            .registry()
            .is_hidden(GeometryId::MatchLines { frame_id: 1 }));

        v.execute(ViewerCommand::ExportIdLists {
            dir: dir.path().to_path_buf(),
        })
        .unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);

        v.execute(ViewerCommand::LoadFrame { frame_id: 0 }).unwrap();
        assert_eq!(v.state(), FrameState::MapOnlyRendered);
    }

    #[test]
    fn unknown_frame_surfaces_as_error() {
        let mut v = viewer();
        assert!(v
            .execute(ViewerCommand::LoadFrame { frame_id: 42 })
            .is_err());
    }
}

//! Interactive operations on the frame on screen: frame stepping, offset
//! changes, visibility toggles and point picking.

use glam::DVec3;

use super::{FrameReport, MatchViewer};
use crate::color::Rgb;
use crate::error::MatchVizError;
use crate::matching::EntityKind;
use crate::renderer::Renderer;
use crate::scene::GeometryId;
use crate::source::DataSource;

/// Everything known about one picked point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// Geometry the point belongs to.
    pub id: GeometryId,
    /// Boundary name of that geometry.
    pub name: String,
    /// Index of the point in its cloud.
    pub index: usize,
    /// Position as displayed.
    pub position: DVec3,
    /// Normal, if the cloud has normals.
    pub normal: Option<DVec3>,
    /// Displayed color, if the geometry is registered with colors.
    pub color: Option<Rgb>,
}

impl<S: DataSource, R: Renderer> MatchViewer<S, R> {
    /// Load the next available frame. At the last frame nothing happens
    /// and `Ok(None)` is returned.
    pub fn next_frame(
        &mut self,
    ) -> Result<Option<&FrameReport>, MatchVizError> {
        let frames = self.source.available_frames()?;
        let target = match self.current_frame() {
            Some(cur) => frames.into_iter().find(|&f| f > cur),
            None => frames.first().copied(),
        };
        self.step_to(target)
    }

    /// Load the previous available frame. At the first frame nothing
    /// happens and `Ok(None)` is returned.
    pub fn previous_frame(
        &mut self,
    ) -> Result<Option<&FrameReport>, MatchVizError> {
        let frames = self.source.available_frames()?;
        let target = match self.current_frame() {
            Some(cur) => frames.into_iter().rev().find(|&f| f < cur),
            None => frames.first().copied(),
        };
        self.step_to(target)
    }

    fn step_to(
        &mut self,
        target: Option<u32>,
    ) -> Result<Option<&FrameReport>, MatchVizError> {
        match target {
            Some(frame_id) => self.load_frame(frame_id).map(Some),
            None => {
                log::info!("no frame to step to from {:?}", self.current_frame());
                Ok(None)
            }
        }
    }

    /// Change the display offset of transformed geometry and rebuild it
    /// from the cached frame data.
    pub fn set_offset(&mut self, offset: [f64; 3]) {
        self.options.display.offset = offset;
        let placement = self.place_transformed();
        log::debug!(
            "offset {offset:?}: rebuilt {} transformed entities, {} lines",
            placement.transformed,
            placement.lines
        );
    }

    /// Toggle every entity of `kind` in the current frame. Returns whether
    /// the group is now shown.
    pub fn toggle_kind(&mut self, kind: EntityKind) -> bool {
        self.current_frame()
            .is_some_and(|frame_id| self.registry.toggle_kind(kind, frame_id))
    }

    /// Toggle the match lines of the current frame. `None` if there are
    /// none.
    pub fn toggle_match_lines(&mut self) -> Option<bool> {
        let frame_id = self.current_frame()?;
        self.registry.toggle(GeometryId::MatchLines { frame_id })
    }

    /// Show or hide every representation of the planar match whose frame
    /// side is `(kind, local_id)`. Returns how many geometries changed.
    pub fn set_match_visible(
        &mut self,
        kind: EntityKind,
        local_id: i64,
        visible: bool,
    ) -> usize {
        let Some(ctx) = self.context.as_ref() else {
            return 0;
        };
        let Some(m) = ctx.table.match_for_frame(kind, local_id).copied() else {
            log::debug!("{kind} {local_id} has no match in frame {}", ctx.frame_id);
            return 0;
        };
        let frame_id = ctx.frame_id;
        self.registry.set_match_visible(&m, frame_id, visible)
    }

    /// Resolve the renderer's next pending selection.
    pub fn pick_point(&mut self) -> Option<PointRecord> {
        let hit = self.registry.renderer_mut().pick()?;
        let Some(id) = GeometryId::parse(&hit.name) else {
            log::debug!("pick on unknown geometry {}", hit.name);
            return None;
        };
        let record = self.point_record(id, hit.index)?;
        log::info!(
            "picked {}[{}] at {:.4?} color {:?}",
            record.name,
            record.index,
            record.position,
            record.color
        );
        Some(record)
    }

    /// Closest visible point to `target` over every visible cloud, with
    /// its distance.
    #[must_use]
    pub fn nearest_point(&self, target: DVec3) -> Option<(PointRecord, f64)> {
        let (id, index, distance) = self
            .registry
            .visible_ids()
            .into_iter()
            .filter_map(|id| {
                let points = self.registry.geometry(id)?.as_points()?;
                let (index, distance) = points.nearest(target)?;
                Some((id, index, distance))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))?;
        Some((self.point_record(id, index)?, distance))
    }

    fn point_record(&self, id: GeometryId, index: usize) -> Option<PointRecord> {
        let cloud = self.registry.geometry(id)?.as_points()?;
        let position = *cloud.points().get(index)?;
        Some(PointRecord {
            id,
            name: id.name(),
            index,
            position,
            normal: cloud.normals().and_then(|n| n.get(index)).copied(),
            color: self
                .registry
                .colors(id)
                .and_then(|c| c.get(index).copied()),
        })
    }
}

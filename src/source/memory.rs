use std::collections::BTreeMap;

use super::{DataSource, DebugInfo, EntityRef, PlaneMetadata, Side};
use crate::error::MatchVizError;
use crate::geometry::PointSet;
use crate::matching::MatchTable;

#[derive(Debug, Clone, Default)]
struct FrameRecord {
    clouds: BTreeMap<(Side, EntityRef), PointSet>,
    metadata: BTreeMap<(Side, EntityRef), PlaneMetadata>,
    debug: Option<DebugInfo>,
    matches: Option<MatchTable>,
}

/// Frame data held in memory.
///
/// ```ignore
/// let mut src = MemorySource::default();
/// src.insert_points(1, Side::Frame, EntityRef::plane(2), cloud);
/// src.set_match_table(1, table);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    frames: BTreeMap<u32, FrameRecord>,
}

impl MemorySource {
    fn frame_mut(&mut self, frame_id: u32) -> &mut FrameRecord {
        self.frames.entry(frame_id).or_default()
    }

    /// Declare a frame with no data.
    pub fn add_frame(&mut self, frame_id: u32) {
        let _ = self.frame_mut(frame_id);
    }

    /// Store the points of one entity.
    pub fn insert_points(
        &mut self,
        frame_id: u32,
        side: Side,
        entity: EntityRef,
        cloud: PointSet,
    ) {
        let _ = self.frame_mut(frame_id).clouds.insert((side, entity), cloud);
    }

    /// Store sidecar metadata of one entity.
    pub fn insert_metadata(
        &mut self,
        frame_id: u32,
        side: Side,
        entity: EntityRef,
        metadata: PlaneMetadata,
    ) {
        let _ = self
            .frame_mut(frame_id)
            .metadata
            .insert((side, entity), metadata);
    }

    /// Store the optimizer log of a frame.
    pub fn set_debug_info(&mut self, frame_id: u32, info: DebugInfo) {
        self.frame_mut(frame_id).debug = Some(info);
    }

    /// Store the correspondence table of a frame.
    pub fn set_match_table(&mut self, frame_id: u32, table: MatchTable) {
        self.frame_mut(frame_id).matches = Some(table);
    }

    fn frame(&self, frame_id: u32) -> Result<&FrameRecord, MatchVizError> {
        self.frames
            .get(&frame_id)
            .ok_or(MatchVizError::UnknownFrame(frame_id))
    }
}

impl DataSource for MemorySource {
    fn available_frames(&self) -> Result<Vec<u32>, MatchVizError> {
        Ok(self.frames.keys().copied().collect())
    }

    fn list_entities(
        &self,
        frame_id: u32,
        side: Side,
    ) -> Result<Vec<EntityRef>, MatchVizError> {
        Ok(self
            .frame(frame_id)?
            .clouds
            .keys()
            .filter(|(s, _)| *s == side)
            .map(|(_, e)| *e)
            .collect())
    }

    fn load_points(
        &self,
        frame_id: u32,
        side: Side,
        entity: EntityRef,
    ) -> Result<PointSet, MatchVizError> {
        self.frame(frame_id)?
            .clouds
            .get(&(side, entity))
            .cloned()
            .ok_or_else(|| {
                MatchVizError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{side}/{} of frame {frame_id}", entity.stem()),
                ))
            })
    }

    fn load_metadata(
        &self,
        frame_id: u32,
        side: Side,
        entity: EntityRef,
    ) -> Result<Option<PlaneMetadata>, MatchVizError> {
        Ok(self
            .frame(frame_id)?
            .metadata
            .get(&(side, entity))
            .copied())
    }

    fn load_debug_info(
        &self,
        frame_id: u32,
    ) -> Result<Option<DebugInfo>, MatchVizError> {
        Ok(self.frame(frame_id)?.debug.clone())
    }

    fn load_match_table(
        &self,
        frame_id: u32,
    ) -> Result<Option<MatchTable>, MatchVizError> {
        Ok(self.frame(frame_id)?.matches.clone())
    }
}

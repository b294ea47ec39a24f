//! Frame loading: data source → transform → matching → coloring →
//! registry.

use std::fmt;

use glam::DVec3;

use super::MatchViewer;
use crate::color::{
    distinct_point_colors, propagate_point_colors, ColorTable, Rgb,
};
use crate::error::MatchVizError;
use crate::geometry::{
    axis_lines, build_match_lines, PointSet, RigidTransform, TransformDelta,
    TransformName,
};
use crate::matching::{
    DensePartition, EntityKind, MatchTable, PlanarPartition, PointMatch,
};
use crate::renderer::Renderer;
use crate::scene::{
    EntityKey, Geometry, GeometryId, GeometryInfo, Registry, Role,
};
use crate::source::{DataSource, DebugInfo, EntityRef, PlaneMetadata, Side};

/// Where the frame pipeline got to.
///
/// A full load walks `Empty → FrameLoaded → Transformed → Matched →
/// MapLoadedAndColored → Rendered`. Without a transform the
/// `Transformed` and `Matched` steps are skipped. The baseline frame goes
/// straight from `Empty` to `MapOnlyRendered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    /// Nothing loaded.
    #[default]
    Empty,
    /// Frame-side entities read.
    FrameLoaded,
    /// Transformed representations computed.
    Transformed,
    /// Correspondence table resolved.
    Matched,
    /// Map-side entities read and colored.
    MapLoadedAndColored,
    /// Everything registered.
    Rendered,
    /// Baseline frame: map only.
    MapOnlyRendered,
}

/// A recoverable problem met while loading a frame. None of these stop
/// the frame from being shown.
#[derive(Debug, Clone, PartialEq)]
pub enum Degradation {
    /// The transform is missing; frame entities are shown untransformed
    /// and nothing is matched.
    MissingTransform {
        /// Transform that was looked for.
        name: TransformName,
    },
    /// No `match.json`; every map entity is unmatched.
    MissingMatchTable,
    /// `match.json` holds no correspondences; every map entity is
    /// unmatched.
    EmptyMatchTable,
    /// Correspondences dropped for bad type codes or indices.
    MalformedCorrespondences {
        /// Which part of the table they came from.
        section: &'static str,
        /// How many were dropped.
        count: usize,
    },
    /// An entity with zero points, treated as absent.
    EmptyPointSet {
        /// Side it was on.
        side: Side,
        /// Which entity.
        entity: EntityRef,
    },
    /// An entity that failed to load and was skipped.
    SkippedEntity {
        /// Side it was on.
        side: Side,
        /// Which entity.
        entity: EntityRef,
        /// Why.
        reason: String,
    },
    /// A frame-level file exists but could not be read.
    UnreadableSource {
        /// Which file.
        what: &'static str,
        /// Why.
        reason: String,
    },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTransform { name } => {
                write!(f, "missing transform {name}, showing raw frame clouds")
            }
            Self::MissingMatchTable => {
                f.write_str("missing match table, map is unmatched")
            }
            Self::EmptyMatchTable => {
                f.write_str("empty match table, map is unmatched")
            }
            Self::MalformedCorrespondences { section, count } => {
                write!(f, "{count} malformed entries in {section}")
            }
            Self::EmptyPointSet { side, entity } => {
                write!(f, "{side}/{} has no points", entity.stem())
            }
            Self::SkippedEntity {
                side,
                entity,
                reason,
            } => write!(f, "skipped {side}/{}: {reason}", entity.stem()),
            Self::UnreadableSource { what, reason } => {
                write!(f, "unreadable {what}: {reason}")
            }
        }
    }
}

/// Outcome of one frame load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Frame that was loaded.
    pub frame_id: u32,
    /// States passed through, in order.
    pub trace: Vec<FrameState>,
    /// Recoverable problems, in the order they were met.
    pub degradations: Vec<Degradation>,
    /// Frame-side entities loaded.
    pub frame_entities: usize,
    /// Map-side entities loaded.
    pub map_entities: usize,
    /// Transformed entities built.
    pub transformed_entities: usize,
    /// Planar matched/unmatched split per kind.
    pub planar: Vec<(EntityKind, PlanarPartition)>,
    /// Dense matched/unmatched split of the map cloud.
    pub dense: Option<DensePartition>,
    /// Correspondence segments built.
    pub match_lines: usize,
    /// Change between the initial and optimized pose.
    pub transform_delta: Option<TransformDelta>,
    /// Optimizer cost before the first and after the last iteration.
    pub cost: Option<(f64, f64)>,
}

impl FrameReport {
    /// Last state reached.
    #[must_use]
    pub fn final_state(&self) -> FrameState {
        self.trace.last().copied().unwrap_or_default()
    }

    fn advance(&mut self, state: FrameState) {
        log::debug!("frame {}: {state:?}", self.frame_id);
        self.trace.push(state);
    }

    fn degrade(&mut self, d: Degradation) {
        log::warn!("frame {}: {d}", self.frame_id);
        self.degradations.push(d);
    }
}

pub(super) struct LoadedEntity {
    pub(super) entity: EntityRef,
    pub(super) cloud: PointSet,
    pub(super) metadata: Option<PlaneMetadata>,
}

/// Everything loaded for the frame on screen.
pub(super) struct FrameContext {
    pub(super) frame_id: u32,
    pub(super) frame_entities: Vec<LoadedEntity>,
    /// Primary transform first.
    pub(super) transforms: Vec<(TransformName, RigidTransform)>,
    pub(super) table: MatchTable,
    pub(super) planar_colors: ColorTable<(EntityKind, i64)>,
    pub(super) dense_colors: Vec<Rgb>,
    pub(super) map_dense: Option<Vec<DVec3>>,
    pub(super) partition: Option<DensePartition>,
}

impl FrameContext {
    fn frame_dense(&self) -> Option<&LoadedEntity> {
        self.frame_entities
            .iter()
            .find(|e| e.entity.kind == EntityKind::Dense)
    }
}

#[derive(Debug, Default)]
pub(super) struct Placement {
    pub(super) transformed: usize,
    pub(super) lines: usize,
    pub(super) skipped: usize,
}

/// Register `geometry`, keeping `id` hidden if it was hidden before. A new
/// id starts hidden unless `default_visible`.
fn replace_keeping_visibility<R: Renderer>(
    registry: &mut Registry<R>,
    id: GeometryId,
    geometry: Geometry,
    color: Option<Rgb>,
    info: GeometryInfo,
    default_visible: bool,
) {
    let hidden = if registry.contains(id) {
        registry.is_hidden(id)
    } else {
        !default_visible
    };
    registry.register(id, geometry, color, info);
    if hidden {
        let _ = registry.hide(id);
    }
}

impl<S: DataSource, R: Renderer> MatchViewer<S, R> {
    /// Tear down the current frame and display `frame_id`.
    ///
    /// Only an unknown frame id or an unreadable frame list is an error;
    /// everything else degrades and is listed in the returned report.
    pub fn load_frame(
        &mut self,
        frame_id: u32,
    ) -> Result<&FrameReport, MatchVizError> {
        if !self.source.available_frames()?.contains(&frame_id) {
            return Err(MatchVizError::UnknownFrame(frame_id));
        }
        self.teardown();

        let mut report = FrameReport {
            frame_id,
            ..FrameReport::default()
        };
        report.advance(FrameState::Empty);
        if self.options.frames.is_baseline(frame_id) {
            self.load_baseline(frame_id, &mut report);
        } else {
            self.load_matched(frame_id, &mut report);
        }
        self.state = report.final_state();

        log::info!(
            "frame {frame_id}: {:?}, {} frame / {} map / {} transformed \
             entities, {} match lines, {} degradations",
            self.state,
            report.frame_entities,
            report.map_entities,
            report.transformed_entities,
            report.match_lines,
            report.degradations.len(),
        );
        Ok(self.report.insert(report))
    }

    fn teardown(&mut self) {
        self.registry.clear_frame();
        self.context = None;
        self.state = FrameState::Empty;
    }

    fn load_baseline(&mut self, frame_id: u32, report: &mut FrameReport) {
        let map = self.load_side(frame_id, Side::Map, report);
        report.map_entities = map.len();
        let extent = max_extent(&map);
        for e in map {
            let color = self.id_color(e.entity);
            self.register_loaded(frame_id, Role::Map, e, Some(color));
        }
        self.ensure_axis(extent);
        self.context = Some(FrameContext {
            frame_id,
            frame_entities: Vec::new(),
            transforms: Vec::new(),
            table: MatchTable::default(),
            planar_colors: ColorTable::new(self.options.colors.unmatched),
            dense_colors: Vec::new(),
            map_dense: None,
            partition: None,
        });
        report.advance(FrameState::MapOnlyRendered);
    }

    fn load_matched(&mut self, frame_id: u32, report: &mut FrameReport) {
        let frame_entities = self.load_side(frame_id, Side::Frame, report);
        report.frame_entities = frame_entities.len();
        report.advance(FrameState::FrameLoaded);

        let debug = match self.source.load_debug_info(frame_id) {
            Ok(debug) => debug,
            Err(e) => {
                report.degrade(Degradation::UnreadableSource {
                    what: "debug.txt",
                    reason: e.to_string(),
                });
                None
            }
        };
        if let Some(info) = &debug {
            report.transform_delta = Some(info.delta());
            report.cost = info.cost_summary();
        }
        let transforms = self.select_transforms(debug.as_ref(), report);
        let (planar_colors, dense_colors) = self.frame_colors(&frame_entities);

        let matched = !transforms.is_empty();
        let table = if matched {
            report.advance(FrameState::Transformed);
            let table = self.load_table(frame_id, report);
            report.advance(FrameState::Matched);
            table
        } else {
            // untransformed frame clouds stand in for the transformed ones
            for e in &frame_entities {
                let color = self.id_color(e.entity);
                let raw = LoadedEntity {
                    entity: e.entity,
                    cloud: e.cloud.clone(),
                    metadata: e.metadata,
                };
                self.register_loaded(frame_id, Role::Frame, raw, Some(color));
            }
            MatchTable::default()
        };

        let mut ctx = FrameContext {
            frame_id,
            frame_entities,
            transforms,
            table,
            planar_colors,
            dense_colors,
            map_dense: None,
            partition: None,
        };
        let map = self.load_side(frame_id, Side::Map, report);
        report.map_entities = map.len();
        let extent = max_extent(&map);
        if matched {
            report.planar = planar_partitions(&ctx.table, &map);
        }
        self.register_map(&mut ctx, map, matched);
        report.dense.clone_from(&ctx.partition);
        report.advance(FrameState::MapLoadedAndColored);

        self.context = Some(ctx);
        let placement = self.place_transformed();
        report.transformed_entities = placement.transformed;
        report.match_lines = placement.lines;
        if placement.skipped > 0 {
            report.degrade(Degradation::MalformedCorrespondences {
                section: "dense_pt_match_infos",
                count: placement.skipped,
            });
        }
        self.ensure_axis(extent);
        report.advance(FrameState::Rendered);
    }

    /// Id colors of the frame's planar entities and distinct colors for
    /// the points of its dense cloud.
    fn frame_colors(
        &self,
        frame_entities: &[LoadedEntity],
    ) -> (ColorTable<(EntityKind, i64)>, Vec<Rgb>) {
        let mut planar = ColorTable::new(self.options.colors.unmatched);
        let mut dense = Vec::new();
        for e in frame_entities {
            match e.entity.local_id {
                Some(id) => {
                    planar.insert((e.entity.kind, id), self.palette.color(id));
                }
                None => {
                    dense = distinct_point_colors(e.cloud.len(), &self.palette);
                }
            }
        }
        (planar, dense)
    }

    /// Color map entities after the frame entities they match and register
    /// them. Without a transform nothing is matched and id colors are used.
    fn register_map(
        &mut self,
        ctx: &mut FrameContext,
        map: Vec<LoadedEntity>,
        matched: bool,
    ) {
        let unmatched = self.options.colors.unmatched;
        for mut e in map {
            let color = match (matched, e.entity.local_id) {
                (false, _) => Some(self.id_color(e.entity)),
                (true, Some(id)) => {
                    let source = ctx
                        .table
                        .match_for_map(e.entity.kind, id)
                        .map(|m| (m.cur_kind, m.cur_id));
                    Some(ctx.planar_colors.propagate(source.as_ref()))
                }
                (true, None) => {
                    let len = e.cloud.len();
                    e.cloud.set_colors(propagate_point_colors(
                        len,
                        &ctx.table.dense,
                        &ctx.dense_colors,
                        unmatched,
                    ));
                    ctx.partition = Some(DensePartition::compute(&ctx.table, len));
                    ctx.map_dense = Some(e.cloud.points().to_vec());
                    None
                }
            };
            self.register_loaded(ctx.frame_id, Role::Map, e, color);
        }
    }

    /// Primary transform, plus the initial one when configured.
    fn select_transforms(
        &self,
        debug: Option<&DebugInfo>,
        report: &mut FrameReport,
    ) -> Vec<(TransformName, RigidTransform)> {
        let primary = self.options.frames.transform;
        let Some(info) = debug else {
            report.degrade(Degradation::MissingTransform { name: primary });
            return Vec::new();
        };
        let mut out = vec![(primary, info.transform(primary))];
        if self.options.display.show_initial_transform
            && primary != TransformName::Init
        {
            out.push((TransformName::Init, info.init));
        }
        out
    }

    fn load_table(&self, frame_id: u32, report: &mut FrameReport) -> MatchTable {
        let table = match self.source.load_match_table(frame_id) {
            Ok(Some(table)) => table,
            Ok(None) => {
                report.degrade(Degradation::MissingMatchTable);
                return MatchTable::default();
            }
            Err(e) => {
                report.degrade(Degradation::UnreadableSource {
                    what: "match.json",
                    reason: e.to_string(),
                });
                report.degrade(Degradation::MissingMatchTable);
                return MatchTable::default();
            }
        };
        if table.is_empty() {
            report.degrade(Degradation::EmptyMatchTable);
        }
        if table.malformed > 0 {
            report.degrade(Degradation::MalformedCorrespondences {
                section: "plane_match_infos",
                count: table.malformed,
            });
        }
        table
    }

    fn load_side(
        &self,
        frame_id: u32,
        side: Side,
        report: &mut FrameReport,
    ) -> Vec<LoadedEntity> {
        let refs = match self.source.list_entities(frame_id, side) {
            Ok(refs) => refs,
            Err(e) => {
                report.degrade(Degradation::UnreadableSource {
                    what: side.as_str(),
                    reason: e.to_string(),
                });
                return Vec::new();
            }
        };

        let mut loaded = Vec::with_capacity(refs.len());
        for entity in refs {
            let cloud = match self.source.load_points(frame_id, side, entity) {
                Ok(cloud) if cloud.is_empty() => {
                    report.degrade(Degradation::EmptyPointSet { side, entity });
                    continue;
                }
                Ok(cloud) => cloud,
                Err(e) => {
                    report.degrade(Degradation::SkippedEntity {
                        side,
                        entity,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let metadata = if entity.kind.is_planar() {
                self.source
                    .load_metadata(frame_id, side, entity)
                    .unwrap_or_else(|e| {
                        log::warn!(
                            "frame {frame_id}: ignoring metadata of {side}/{}: {e}",
                            entity.stem()
                        );
                        None
                    })
            } else {
                None
            };
            log::debug!(
                "frame {frame_id}: loaded {side}/{} ({} points)",
                entity.stem(),
                cloud.len()
            );
            loaded.push(LoadedEntity {
                entity,
                cloud,
                metadata,
            });
        }
        loaded
    }

    /// Id-palette color, or the dense fallback for dense clouds.
    fn id_color(&self, entity: EntityRef) -> Rgb {
        entity.local_id.map_or(self.options.colors.dense_default, |id| {
            self.palette.color(id)
        })
    }

    fn register_loaded(
        &mut self,
        frame_id: u32,
        role: Role,
        e: LoadedEntity,
        color: Option<Rgb>,
    ) {
        let key = EntityKey::frame(e.entity.kind, e.entity.local_id).with(role);
        let info = GeometryInfo {
            frame_id: Some(frame_id),
            plane: e.metadata,
        };
        self.registry
            .register(key.into(), Geometry::Points(e.cloud), color, info);
    }

    fn ensure_axis(&mut self, extent: f64) {
        if self.registry.contains(GeometryId::Axis) {
            return;
        }
        let length = self.options.display.axis_length_for(extent);
        let axes =
            axis_lines(DVec3::ZERO, length, self.options.colors.axis_colors());
        self.registry.register(
            GeometryId::Axis,
            Geometry::Lines(axes),
            None,
            GeometryInfo::default(),
        );
    }

    /// (Re)build transformed entities and match lines of the current frame
    /// from the cached context at the current offset. Hidden geometry
    /// stays hidden.
    pub(super) fn place_transformed(&mut self) -> Placement {
        let mut placement = Placement::default();
        let Some(ctx) = self.context.as_ref() else {
            return placement;
        };
        let offset = self.options.display.offset_vec();
        let neutral = self.options.colors.neutral;
        let mut primary_dense: Option<Vec<DVec3>> = None;

        for (slot, (name, tf)) in ctx.transforms.iter().enumerate() {
            let matrix = tf.matrix();
            for e in &ctx.frame_entities {
                let key = EntityKey::transformed(
                    ctx.frame_id,
                    *name,
                    e.entity.kind,
                    e.entity.local_id,
                );
                let mut cloud = e.cloud.transformed(&matrix, offset);
                let color = match e.entity.local_id {
                    Some(id) => Some(
                        ctx.planar_colors
                            .get(&(e.entity.kind, id))
                            .unwrap_or(neutral),
                    ),
                    None => {
                        if slot == 0 {
                            primary_dense = Some(cloud.points().to_vec());
                        }
                        cloud.set_colors(ctx.dense_colors.clone());
                        None
                    }
                };
                let info = GeometryInfo {
                    frame_id: Some(ctx.frame_id),
                    plane: e.metadata,
                };
                replace_keeping_visibility(
                    &mut self.registry,
                    key.into(),
                    Geometry::Points(cloud),
                    color,
                    info,
                    true,
                );
                placement.transformed += 1;
            }
        }

        let valid: Vec<PointMatch> = ctx.table.valid_dense().copied().collect();
        if let (Some(moved), Some(map), false) =
            (primary_dense, ctx.map_dense.as_ref(), valid.is_empty())
        {
            let built = build_match_lines(
                &moved,
                map,
                &valid,
                self.options.colors.match_line,
            );
            placement.lines = built.lines.len();
            placement.skipped = built.skipped;
            replace_keeping_visibility(
                &mut self.registry,
                GeometryId::MatchLines {
                    frame_id: ctx.frame_id,
                },
                Geometry::Lines(built.lines),
                None,
                GeometryInfo::for_frame(ctx.frame_id),
                self.options.display.show_match_lines,
            );
        }
        placement
    }
}

fn planar_partitions(
    table: &MatchTable,
    map: &[LoadedEntity],
) -> Vec<(EntityKind, PlanarPartition)> {
    EntityKind::PLANAR
        .into_iter()
        .map(|kind| {
            let ids: Vec<i64> = map
                .iter()
                .filter(|e| e.entity.kind == kind)
                .filter_map(|e| e.entity.local_id)
                .collect();
            (kind, PlanarPartition::compute(table, kind, &ids))
        })
        .collect()
}

fn max_extent(entities: &[LoadedEntity]) -> f64 {
    entities
        .iter()
        .map(|e| e.cloud.max_extent())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::color::{IdPalette, UNMATCHED};
    use crate::engine::test_util::{three_match_viewer, viewer, viewer_with};
    use crate::options::{ColorOptions, DisplayOptions, Options};
    use crate::renderer::RecordingRenderer;
    use crate::source::DirectorySource;

    fn map(kind: EntityKind, id: Option<i64>) -> GeometryId {
        EntityKey::map(kind, id).into()
    }

    fn opt(frame_id: u32, kind: EntityKind, id: Option<i64>) -> GeometryId {
        EntityKey::transformed(frame_id, TransformName::Opt, kind, id).into()
    }

    fn palette() -> IdPalette {
        IdPalette::from_options(&ColorOptions::default())
    }

    #[test]
    fn baseline_frame_shows_the_map_only() {
        let mut v = viewer();
        let report = v.load_frame(0).unwrap().clone();
        assert_eq!(report.trace, vec![FrameState::Empty, FrameState::MapOnlyRendered]);
        assert_eq!(v.state(), FrameState::MapOnlyRendered);
        assert_eq!(report.map_entities, 3);

        let reg = v.registry();
        assert_eq!(
            reg.uniform_color(map(EntityKind::Plane, Some(5))),
            Some(palette().color(5))
        );
        assert_eq!(
            reg.uniform_color(map(EntityKind::Dense, None)),
            Some(ColorOptions::default().dense_default)
        );
        assert!(reg.is_visible(GeometryId::Axis));
        // small map: the floor of 1.5 * axis_length wins
        let axis = reg
            .geometry(GeometryId::Axis)
            .and_then(Geometry::as_lines)
            .unwrap();
        let (from, to, _) = axis.segments().next().unwrap();
        assert_eq!(to - from, DVec3::new(12.0, 0.0, 0.0));
        for id in reg.visible_ids() {
            assert_ne!(reg.uniform_color(id), Some(UNMATCHED), "{id}");
        }
    }

    #[test]
    fn matched_frame_propagates_colors_to_the_map() {
        let mut v = viewer();
        let report = v.load_frame(1).unwrap().clone();
        assert_eq!(
            report.trace,
            vec![
                FrameState::Empty,
                FrameState::FrameLoaded,
                FrameState::Transformed,
                FrameState::Matched,
                FrameState::MapLoadedAndColored,
                FrameState::Rendered,
            ]
        );

        let reg = v.registry();
        let plane2 = reg.uniform_color(opt(1, EntityKind::Plane, Some(2)));
        assert_eq!(plane2, Some(palette().color(2)));
        assert_eq!(reg.uniform_color(map(EntityKind::Plane, Some(5))), plane2);
        assert_eq!(
            reg.uniform_color(map(EntityKind::Plane, Some(6))),
            Some(UNMATCHED)
        );
        // raw frame clouds are replaced by their transformed versions
        assert!(!reg.contains(EntityKey::frame(EntityKind::Plane, Some(2)).into()));

        let source = distinct_point_colors(3, &palette());
        let colors = reg.colors(map(EntityKind::Dense, None)).unwrap();
        assert_eq!(colors, vec![UNMATCHED, source[0], UNMATCHED, source[2]]);
        assert_eq!(
            reg.colors(opt(1, EntityKind::Dense, None)).unwrap(),
            source
        );

        let dense = report.dense.unwrap();
        assert_eq!(dense.matched, vec![1, 3]);
        assert_eq!(dense.unmatched, vec![0, 2]);
        let (kind, planes) = &report.planar[1];
        assert_eq!(*kind, EntityKind::Plane);
        assert_eq!(planes.matched_map_ids, vec![5]);
        assert_eq!(planes.unmatched_map_ids, vec![6]);
        assert_eq!(report.match_lines, 2);
        assert!(report.degradations.contains(
            &Degradation::MalformedCorrespondences {
                section: "dense_pt_match_infos",
                count: 1,
            }
        ));
    }

    #[test]
    fn every_planar_match_carries_its_source_color() {
        let mut v = three_match_viewer();
        let report = v.load_frame(1).unwrap().clone();
        assert!(report.degradations.is_empty(), "{:?}", report.degradations);

        let reg = v.registry();
        for (cur, other) in [(2, 5), (3, 6), (4, 7)] {
            let source = reg.uniform_color(opt(1, EntityKind::Plane, Some(cur)));
            assert_eq!(source, Some(palette().color(cur)));
            assert_eq!(
                reg.uniform_color(map(EntityKind::Plane, Some(other))),
                source,
                "map plane {other}"
            );
        }
        assert_eq!(
            reg.uniform_color(map(EntityKind::Plane, Some(8))),
            Some(UNMATCHED)
        );
        // same local id as a matched plane, but a different kind
        assert_eq!(
            reg.uniform_color(map(EntityKind::Ground, Some(5))),
            Some(UNMATCHED)
        );

        let (_, ground) = &report.planar[0];
        assert!(ground.matched_map_ids.is_empty());
        assert_eq!(ground.unmatched_map_ids, vec![5]);
        let (_, planes) = &report.planar[1];
        assert_eq!(planes.matched_map_ids, vec![5, 6, 7]);
        assert_eq!(planes.unmatched_map_ids, vec![8]);
    }

    #[test]
    fn debug_txt_without_initial_pose_is_read_once() {
        const PLY: &str = "ply\nformat ascii 1.0\nelement vertex 1\n\
property float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n";
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for rel in ["1/frame/plane_2.ply", "1/map/plane_5.ply"] {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, PLY).unwrap();
        }
        std::fs::write(
            root.join("1/debug.txt"),
            "T_opt_w_b = t(xyz) = 1 0 0, q(wxyz) = 1 0 0 0\n",
        )
        .unwrap();

        let options = Options {
            display: DisplayOptions {
                show_initial_transform: true,
                ..DisplayOptions::default()
            },
            ..Options::default()
        };
        let mut v = MatchViewer::with_options(
            DirectorySource::new(root),
            RecordingRenderer::default(),
            options,
        );
        let report = v.load_frame(1).unwrap();
        assert_eq!(report.degradations.len(), 2, "{:?}", report.degradations);
        assert!(matches!(
            &report.degradations[0],
            Degradation::UnreadableSource { what: "debug.txt", .. }
        ));
        assert_eq!(
            report.degradations[1],
            Degradation::MissingTransform {
                name: TransformName::Opt
            }
        );
        assert!(report.transform_delta.is_none());
    }

    #[test]
    fn transformed_points_include_the_display_offset() {
        let mut v = viewer();
        let _ = v.load_frame(1).unwrap();
        let g = v
            .registry()
            .geometry(opt(1, EntityKind::Plane, Some(2)))
            .and_then(Geometry::as_points)
            .unwrap();
        assert_eq!(g.points()[0], DVec3::new(1.0, 0.0, 10.0));
        assert_eq!(g.normals().unwrap()[0], DVec3::Z);

        let lines = v
            .registry()
            .geometry(GeometryId::MatchLines { frame_id: 1 })
            .and_then(Geometry::as_lines)
            .unwrap();
        let (from, to, _) = lines.segments().next().unwrap();
        assert_eq!(from, DVec3::new(1.0, 0.0, 11.0));
        assert_eq!(to, DVec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn missing_transform_shows_raw_frame_clouds() {
        let mut v = viewer();
        let report = v.load_frame(2).unwrap().clone();
        assert_eq!(
            report.degradations,
            vec![Degradation::MissingTransform {
                name: TransformName::Opt
            }]
        );
        assert_eq!(
            report.trace,
            vec![
                FrameState::Empty,
                FrameState::FrameLoaded,
                FrameState::MapLoadedAndColored,
                FrameState::Rendered,
            ]
        );
        let reg = v.registry();
        assert_eq!(
            reg.uniform_color(EntityKey::frame(EntityKind::Plane, Some(2)).into()),
            Some(palette().color(2))
        );
        assert_eq!(
            reg.uniform_color(map(EntityKind::Plane, Some(6))),
            Some(palette().color(6))
        );
        assert!(reg.derived(EntityKind::Plane, 2).is_empty());
        assert!(!reg.contains(GeometryId::MatchLines { frame_id: 2 }));
        assert!(report.dense.is_none());
    }

    #[test]
    fn missing_match_table_leaves_the_map_red() {
        let mut v = viewer();
        let report = v.load_frame(3).unwrap().clone();
        assert!(report.degradations.contains(&Degradation::MissingMatchTable));
        let reg = v.registry();
        assert_eq!(
            reg.uniform_color(map(EntityKind::Plane, Some(5))),
            Some(UNMATCHED)
        );
        assert_eq!(
            reg.uniform_color(map(EntityKind::Dense, None)),
            Some(UNMATCHED)
        );
        assert!(reg.contains(opt(3, EntityKind::Plane, Some(2))));
        assert_eq!(report.dense.unwrap().unmatched, vec![0, 1, 2, 3]);
    }

    #[test]
    fn unknown_frame_is_an_error() {
        let mut v = viewer();
        assert!(matches!(
            v.load_frame(9),
            Err(MatchVizError::UnknownFrame(9))
        ));
        assert_eq!(v.state(), FrameState::Empty);
        assert!(v.current_frame().is_none());
    }

    #[test]
    fn switching_frames_tears_down_the_previous_one() {
        let mut v = viewer();
        let _ = v.load_frame(1).unwrap();
        let _ = v.load_frame(0).unwrap();
        let reg = v.registry();
        assert!(reg.derived(EntityKind::Plane, 1).is_empty());
        assert!(!reg.contains(GeometryId::MatchLines { frame_id: 1 }));
        assert!(reg.contains(GeometryId::Axis));
        assert_eq!(reg.len(), 4);
        assert_eq!(v.current_frame(), Some(0));
    }

    #[test]
    fn options_control_lines_and_initial_transform() {
        let mut options = Options::default();
        options.display.show_match_lines = false;
        options.display.show_initial_transform = true;
        let mut v = viewer_with(options);
        let _ = v.load_frame(1).unwrap();

        let reg = v.registry();
        assert!(reg.is_hidden(GeometryId::MatchLines { frame_id: 1 }));
        let init: GeometryId = EntityKey::transformed(
            1,
            TransformName::Init,
            EntityKind::Plane,
            Some(2),
        )
        .into();
        assert!(reg.is_visible(init));
        assert_eq!(reg.derived(EntityKind::Plane, 1).len(), 2);
        assert_eq!(v.report().unwrap().transformed_entities, 4);
    }
}

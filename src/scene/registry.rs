use rustc_hash::FxHashMap;

use super::{EntityKey, Geometry, GeometryId, GeometryInfo, Role};
use crate::color::{clamp_rgb, rgb_approx_eq, Rgb};
use crate::matching::{EntityKind, PlanarMatch};
use crate::renderer::Renderer;

/// Per-channel tolerance under which a color array is captured as one
/// uniform color.
pub const COLOR_TOLERANCE: f32 = 1e-6;

const NEUTRAL_GRAY: Rgb = [0.5, 0.5, 0.5];

/// Colors remembered for a hidden geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum CapturedColors {
    /// Every element had the same color.
    Uniform(Rgb),
    /// One color per element.
    PerElement(Vec<Rgb>),
}

impl CapturedColors {
    /// Collapse `colors` to a single color when all entries agree within
    /// [`COLOR_TOLERANCE`].
    #[must_use]
    pub fn capture(colors: &[Rgb]) -> Self {
        match colors.first() {
            Some(&first)
                if colors
                    .iter()
                    .all(|c| rgb_approx_eq(*c, first, COLOR_TOLERANCE)) =>
            {
                Self::Uniform(first)
            }
            Some(_) => Self::PerElement(colors.to_vec()),
            None => Self::PerElement(Vec::new()),
        }
    }

    /// Expand back to one color per element.
    #[must_use]
    pub fn expand(&self, count: usize) -> Vec<Rgb> {
        match self {
            Self::Uniform(c) => vec![*c; count],
            Self::PerElement(v) => v.clone(),
        }
    }
}

struct VisibleEntry {
    geometry: Geometry,
    colors: Vec<Rgb>,
    info: GeometryInfo,
}

struct HiddenEntry {
    geometry: Geometry,
    colors: CapturedColors,
    info: GeometryInfo,
}

/// Owned store of named geometry with show/hide semantics.
///
/// A [`GeometryId`] is in at most one of the visible and hidden sets.
/// Visible entries are mirrored into the renderer immediately; hidden ones
/// are kept here with their resolved colors so showing them again restores
/// exactly what was on screen.
pub struct Registry<R> {
    renderer: R,
    neutral: Rgb,
    visible: FxHashMap<GeometryId, VisibleEntry>,
    hidden: FxHashMap<GeometryId, HiddenEntry>,
    /// Monotonically increasing generation; bumped on any mutation.
    generation: u64,
    /// Generation that was last consumed by the render pump.
    rendered_generation: u64,
}

impl<R: Renderer> Registry<R> {
    /// Empty registry drawing into `renderer`.
    #[must_use]
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            neutral: NEUTRAL_GRAY,
            visible: FxHashMap::default(),
            hidden: FxHashMap::default(),
            generation: 0,
            rendered_generation: 0,
        }
    }

    /// Use `color` for geometry registered without a usable color.
    #[must_use]
    pub fn with_neutral(mut self, color: Rgb) -> Self {
        self.neutral = clamp_rgb(color);
        self
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the renderer.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    // -- Generation tracking --

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether anything changed since the last `mark_rendered()`.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.generation != self.rendered_generation
    }

    /// Mark the current generation as drawn.
    pub fn mark_rendered(&mut self) {
        self.rendered_generation = self.generation;
    }

    // -- Registration --

    /// Add `geometry` as visible under `id`, replacing any previous entry
    /// of that id.
    ///
    /// An explicit `color` fills every element (clamped to `[0, 1]`).
    /// Otherwise the geometry's own colors are used when they cover every
    /// element, and the neutral gray when they don't.
    pub fn register(
        &mut self,
        id: GeometryId,
        geometry: Geometry,
        color: Option<Rgb>,
        info: GeometryInfo,
    ) {
        let _ = self.remove(id);
        let count = geometry.element_count();
        let colors = match (color, geometry.embedded_colors()) {
            (Some(c), _) => vec![clamp_rgb(c); count],
            (None, Some(embedded)) if embedded.len() == count => {
                embedded.iter().copied().map(clamp_rgb).collect()
            }
            (None, _) => vec![self.neutral; count],
        };
        let name = id.name();
        log::debug!("register {name} ({count} elements)");
        self.renderer.add(&name, &geometry, &colors);
        let _ = self.visible.insert(
            id,
            VisibleEntry {
                geometry,
                colors,
                info,
            },
        );
        self.invalidate();
    }

    /// Drop `id` from whichever set holds it. Returns whether it existed.
    pub fn remove(&mut self, id: GeometryId) -> bool {
        if self.visible.remove(&id).is_some() {
            self.renderer.remove(&id.name());
        } else if self.hidden.remove(&id).is_none() {
            return false;
        }
        self.invalidate();
        true
    }

    // -- Visibility --

    /// Move a visible geometry to the hidden set. No-op (returning `false`)
    /// if it is already hidden or unknown.
    pub fn hide(&mut self, id: GeometryId) -> bool {
        let Some(entry) = self.visible.remove(&id) else {
            return false;
        };
        self.renderer.remove(&id.name());
        let _ = self.hidden.insert(
            id,
            HiddenEntry {
                colors: CapturedColors::capture(&entry.colors),
                geometry: entry.geometry,
                info: entry.info,
            },
        );
        self.invalidate();
        true
    }

    /// Move a hidden geometry back on screen with the colors it had. No-op
    /// (returning `false`) if it is already visible or unknown.
    pub fn show(&mut self, id: GeometryId) -> bool {
        let Some(entry) = self.hidden.remove(&id) else {
            return false;
        };
        let colors = entry.colors.expand(entry.geometry.element_count());
        self.renderer.add(&id.name(), &entry.geometry, &colors);
        let _ = self.visible.insert(
            id,
            VisibleEntry {
                geometry: entry.geometry,
                colors,
                info: entry.info,
            },
        );
        self.invalidate();
        true
    }

    /// [`show`](Self::show) or [`hide`](Self::hide).
    pub fn set_visible(&mut self, id: GeometryId, visible: bool) -> bool {
        if visible {
            self.show(id)
        } else {
            self.hide(id)
        }
    }

    /// Flip one geometry. Returns the new state, `None` if unknown.
    pub fn toggle(&mut self, id: GeometryId) -> Option<bool> {
        if self.hide(id) {
            Some(false)
        } else if self.show(id) {
            Some(true)
        } else {
            None
        }
    }

    /// Toggle every entity of `kind`: frame and map representations, plus
    /// the transformed representations of `frame_id`.
    ///
    /// If any of them is visible, all are hidden and `false` is returned.
    /// Otherwise, if any is hidden, all are shown and `true` is returned.
    /// With no such entity at all, nothing happens and `false` is returned.
    pub fn toggle_kind(&mut self, kind: EntityKind, frame_id: u32) -> bool {
        let in_group = |id: &GeometryId| {
            id.entity().is_some_and(|k| {
                k.kind == kind
                    && (matches!(k.role, Role::Frame | Role::Map)
                        || k.is_derived_from(frame_id))
            })
        };
        let visible: Vec<GeometryId> =
            self.visible.keys().copied().filter(in_group).collect();
        if !visible.is_empty() {
            for id in visible {
                let _ = self.hide(id);
            }
            log::debug!("toggle {kind}: hidden");
            return false;
        }
        let hidden: Vec<GeometryId> =
            self.hidden.keys().copied().filter(in_group).collect();
        if hidden.is_empty() {
            return false;
        }
        for id in hidden {
            let _ = self.show(id);
        }
        log::debug!("toggle {kind}: shown");
        true
    }

    /// Show or hide every representation of one planar match together: the
    /// frame entity, each of its transformed versions for `frame_id`, and
    /// the map entity. Returns how many geometries changed state.
    pub fn set_match_visible(
        &mut self,
        m: &PlanarMatch,
        frame_id: u32,
        visible: bool,
    ) -> usize {
        let frame = EntityKey::frame(m.cur_kind, Some(m.cur_id));
        let mut ids: Vec<GeometryId> = vec![
            frame.into(),
            EntityKey::map(m.other_kind, Some(m.other_id)).into(),
        ];
        ids.extend(
            self.derived(m.cur_kind, frame_id)
                .into_iter()
                .filter(|k| k.local_id == Some(m.cur_id))
                .map(GeometryId::from),
        );
        ids.into_iter()
            .filter(|id| self.set_visible(*id, visible))
            .count()
    }

    /// Remove everything except persistent helpers.
    pub fn clear_frame(&mut self) {
        let doomed: Vec<GeometryId> = self
            .visible
            .keys()
            .chain(self.hidden.keys())
            .copied()
            .filter(|id| !id.is_persistent())
            .collect();
        for id in &doomed {
            let _ = self.remove(*id);
        }
        log::debug!("cleared {} geometries", doomed.len());
    }

    // -- Queries --

    /// Transformed entities of `kind` derived from `frame_id`, in either
    /// set, sorted.
    #[must_use]
    pub fn derived(&self, kind: EntityKind, frame_id: u32) -> Vec<EntityKey> {
        let mut keys: Vec<EntityKey> = self
            .visible
            .keys()
            .chain(self.hidden.keys())
            .filter_map(GeometryId::entity)
            .filter(|k| k.kind == kind && k.is_derived_from(frame_id))
            .copied()
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Whether `id` is on screen.
    #[must_use]
    pub fn is_visible(&self, id: GeometryId) -> bool {
        self.visible.contains_key(&id)
    }

    /// Whether `id` is held off-screen.
    #[must_use]
    pub fn is_hidden(&self, id: GeometryId) -> bool {
        self.hidden.contains_key(&id)
    }

    /// Whether `id` is known at all.
    #[must_use]
    pub fn contains(&self, id: GeometryId) -> bool {
        self.is_visible(id) || self.is_hidden(id)
    }

    /// Visible ids, sorted.
    #[must_use]
    pub fn visible_ids(&self) -> Vec<GeometryId> {
        let mut ids: Vec<GeometryId> = self.visible.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Hidden ids, sorted.
    #[must_use]
    pub fn hidden_ids(&self) -> Vec<GeometryId> {
        let mut ids: Vec<GeometryId> = self.hidden.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Total number of geometries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.visible.len() + self.hidden.len()
    }

    /// Whether the registry holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Geometry of `id`, visible or hidden.
    #[must_use]
    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.visible
            .get(&id)
            .map(|e| &e.geometry)
            .or_else(|| self.hidden.get(&id).map(|e| &e.geometry))
    }

    /// Metadata of `id`, visible or hidden.
    #[must_use]
    pub fn info(&self, id: GeometryId) -> Option<&GeometryInfo> {
        self.visible
            .get(&id)
            .map(|e| &e.info)
            .or_else(|| self.hidden.get(&id).map(|e| &e.info))
    }

    /// Resolved per-element colors of `id`, visible or hidden.
    #[must_use]
    pub fn colors(&self, id: GeometryId) -> Option<Vec<Rgb>> {
        if let Some(e) = self.visible.get(&id) {
            return Some(e.colors.clone());
        }
        self.hidden
            .get(&id)
            .map(|e| e.colors.expand(e.geometry.element_count()))
    }

    /// The single color of `id` if all of its elements share one.
    #[must_use]
    pub fn uniform_color(&self, id: GeometryId) -> Option<Rgb> {
        let captured = match (self.visible.get(&id), self.hidden.get(&id)) {
            (Some(e), _) => CapturedColors::capture(&e.colors),
            (None, Some(e)) => e.colors.clone(),
            (None, None) => return None,
        };
        match captured {
            CapturedColors::Uniform(c) => Some(c),
            CapturedColors::PerElement(_) => None,
        }
    }
}

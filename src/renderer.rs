//! The drawing seam.
//!
//! The registry pushes every visibility change through [`Renderer`]
//! immediately, so an implementation only has to mirror `add`/`remove` into
//! whatever it draws with. [`RecordingRenderer`] keeps the attached scene
//! in memory and is what the command-line driver and the tests use.

use std::collections::{BTreeMap, VecDeque};

use crate::color::Rgb;
use crate::scene::Geometry;

/// A point the user selected on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickHit {
    /// Name of the geometry that was hit.
    pub name: String,
    /// Element index within it.
    pub index: usize,
}

/// Something that can draw named geometry.
pub trait Renderer {
    /// Attach `geometry` under `name` with one color per element. Replaces
    /// anything attached under the same name.
    fn add(&mut self, name: &str, geometry: &Geometry, colors: &[Rgb]);

    /// Detach `name`. Unknown names are ignored.
    fn remove(&mut self, name: &str);

    /// Take the next pending user selection, if any.
    fn pick(&mut self) -> Option<PickHit>;
}

/// What a [`RecordingRenderer`] holds for one attached name.
#[derive(Debug, Clone, PartialEq)]
pub struct Attached {
    /// The geometry as handed over.
    pub geometry: Geometry,
    /// Its per-element colors.
    pub colors: Vec<Rgb>,
}

/// In-memory renderer: remembers what is attached and replays queued picks.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    attached: BTreeMap<String, Attached>,
    picks: VecDeque<PickHit>,
    adds: usize,
    removes: usize,
}

impl RecordingRenderer {
    /// Queue a selection to be returned by [`Renderer::pick`].
    pub fn queue_pick(&mut self, name: impl Into<String>, index: usize) {
        self.picks.push_back(PickHit {
            name: name.into(),
            index,
        });
    }

    /// Whether `name` is attached.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attached.contains_key(name)
    }

    /// What is attached under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Attached> {
        self.attached.get(name)
    }

    /// Colors attached under `name`.
    #[must_use]
    pub fn colors_of(&self, name: &str) -> Option<&[Rgb]> {
        self.attached.get(name).map(|a| a.colors.as_slice())
    }

    /// Attached names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.attached.keys().cloned().collect()
    }

    /// Number of attached geometries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attached.len()
    }

    /// Whether nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    /// Total `add` and `remove` calls received.
    #[must_use]
    pub fn call_counts(&self) -> (usize, usize) {
        (self.adds, self.removes)
    }
}

impl Renderer for RecordingRenderer {
    fn add(&mut self, name: &str, geometry: &Geometry, colors: &[Rgb]) {
        self.adds += 1;
        let _ = self.attached.insert(
            name.to_owned(),
            Attached {
                geometry: geometry.clone(),
                colors: colors.to_vec(),
            },
        );
    }

    fn remove(&mut self, name: &str) {
        self.removes += 1;
        let _ = self.attached.remove(name);
    }

    fn pick(&mut self) -> Option<PickHit> {
        self.picks.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::geometry::PointSet;

    #[test]
    fn mirrors_adds_and_removes() {
        let mut r = RecordingRenderer::default();
        let g = Geometry::Points(PointSet::new(vec![DVec3::ZERO]));
        r.add("plane_1", &g, &[[0.0, 1.0, 0.0]]);
        r.add("plane_1", &g, &[[1.0, 1.0, 0.0]]);
        r.add("map_plane_1", &g, &[[0.0, 0.0, 1.0]]);
        r.remove("map_plane_1");
        r.remove("unknown");

        assert_eq!(r.names(), vec!["plane_1".to_owned()]);
        assert_eq!(r.colors_of("plane_1"), Some(&[[1.0, 1.0, 0.0]][..]));
        assert_eq!(r.call_counts(), (3, 2));
    }

    #[test]
    fn picks_are_replayed_in_order() {
        let mut r = RecordingRenderer::default();
        r.queue_pick("dense_cloud", 3);
        r.queue_pick("map_dense_cloud", 0);
        assert_eq!(r.pick().map(|h| h.index), Some(3));
        assert_eq!(r.pick().map(|h| h.name), Some("map_dense_cloud".to_owned()));
        assert!(r.pick().is_none());
    }
}

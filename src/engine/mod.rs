//! The match viewer: frame sequencing, coloring and interaction on top of
//! a [`DataSource`] and a [`Renderer`].
//!
//! [`MatchViewer`] owns the [`Registry`] (and through it the renderer) and
//! caches what it loaded for the current frame, so offset changes and
//! visibility toggles never go back to the data source.

pub mod command;
mod export;
mod interaction;
mod pipeline;

pub use command::ViewerCommand;
pub use export::{write_id_list, IdListFiles};
pub use interaction::PointRecord;
pub use pipeline::{Degradation, FrameReport, FrameState};

use self::pipeline::FrameContext;
use crate::color::IdPalette;
use crate::options::Options;
use crate::renderer::Renderer;
use crate::scene::Registry;
use crate::source::DataSource;

/// Correspondence viewer over one data source.
pub struct MatchViewer<S, R> {
    source: S,
    registry: Registry<R>,
    options: Options,
    palette: IdPalette,
    /// Data of the frame on screen, kept for rebuilds.
    context: Option<FrameContext>,
    state: FrameState,
    report: Option<FrameReport>,
}

impl<S: DataSource, R: Renderer> MatchViewer<S, R> {
    /// Viewer with default options.
    pub fn new(source: S, renderer: R) -> Self {
        Self::with_options(source, renderer, Options::default())
    }

    /// Viewer with the given options.
    pub fn with_options(source: S, renderer: R, options: Options) -> Self {
        let palette = IdPalette::from_options(&options.colors);
        let registry = Registry::new(renderer).with_neutral(options.colors.neutral);
        Self {
            source,
            registry,
            options,
            palette,
            context: None,
            state: FrameState::Empty,
            report: None,
        }
    }

    /// The data source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The geometry registry.
    #[must_use]
    pub fn registry(&self) -> &Registry<R> {
        &self.registry
    }

    /// Mutable access to the registry, e.g. for `mark_rendered()`.
    pub fn registry_mut(&mut self) -> &mut Registry<R> {
        &mut self.registry
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Pipeline state of the current frame.
    #[must_use]
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Frame on screen, if any.
    #[must_use]
    pub fn current_frame(&self) -> Option<u32> {
        self.context.as_ref().map(|c| c.frame_id)
    }

    /// Report of the last frame load.
    #[must_use]
    pub fn report(&self) -> Option<&FrameReport> {
        self.report.as_ref()
    }
}

// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Correspondence-driven point-cloud visualization core for debugging a
//! pose-optimization pipeline.
//!
//! Given the per-frame output of the optimizer (segmented plane/ground
//! patches, a dense cloud, the optimized frame-to-map transform and a sparse
//! correspondence table), matchviz computes transformed point positions,
//! colors that encode match status, and a visibility registry that keeps
//! frame, map and transformed representations of an entity in sync.
//!
//! # Key entry points
//!
//! - [`engine::MatchViewer`] - loads frames and drives interaction
//! - [`scene::Registry`] - named geometry with visible/hidden state
//! - [`source::DataSource`] - where frame data comes from
//! - [`renderer::Renderer`] - where geometry goes
//! - [`options::Options`] - runtime configuration (colors, display, frames)
//!
//! # Pipeline
//!
//! For every frame the viewer pulls typed data from the source, moves the
//! frame entities into the map frame, resolves the match table, colors map
//! entities after the frame entities they match (red when unmatched), builds
//! correspondence lines and registers everything. The baseline frame
//! (frame `0` unless configured otherwise) shows the map alone.

pub mod color;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod matching;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod source;

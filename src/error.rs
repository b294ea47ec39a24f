//! Crate-level error types.

use std::fmt;
use std::path::PathBuf;

/// Errors produced by the matchviz crate.
///
/// Only I/O-boundary failures surface as errors. Missing transforms, missing
/// match tables and stale correspondences are degradations handled inside
/// the frame pipeline and never reach this type.
#[derive(Debug)]
pub enum MatchVizError {
    /// Generic I/O failure.
    Io(std::io::Error),
    /// A PLY file could not be decoded.
    Ply {
        /// File that failed to decode.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },
    /// A JSON sidecar (`match.json`, plane metadata) failed to parse.
    Json {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// A `debug.txt` file was present but incomplete or malformed.
    DebugInfo {
        /// File that failed to parse.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// The requested frame does not exist in the data source.
    UnknownFrame(u32),
}

impl fmt::Display for MatchVizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Ply { path, reason } => {
                write!(f, "PLY error in {}: {reason}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON error in {}: {source}", path.display())
            }
            Self::DebugInfo { path, reason } => {
                write!(f, "debug info error in {}: {reason}", path.display())
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::UnknownFrame(id) => write!(f, "frame {id} does not exist"),
        }
    }
}

impl std::error::Error for MatchVizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MatchVizError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

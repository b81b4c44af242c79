use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by voiceprint operations.
#[derive(Debug, Error)]
pub enum VoiceprintError {
    #[error("voiceprint: invalid input: {0}")]
    Validation(String),

    #[error("voiceprint: command {name:?} not found")]
    NotFound { name: String },

    #[error("voiceprint: store has no trained commands")]
    EmptyStore,

    #[error("voiceprint: dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("voiceprint: persist {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("voiceprint: codec {}: {source}", .path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl VoiceprintError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}

use std::io;
use std::path::PathBuf;

use dronevox_voiceprint::VoiceprintError;
use thiserror::Error;

use crate::action::ActionToken;

/// Errors returned by binding, sequencing and mission operations.
#[derive(Debug, Error)]
pub enum FlightError {
    #[error("flight: invalid input: {0}")]
    Validation(String),

    #[error("flight: voice command {name:?} is not trained")]
    UnknownCommand { name: String },

    #[error("flight: unsupported action {token:?}")]
    UnsupportedAction { token: String },

    #[error("flight: no action given for {name:?} and no default mapping exists")]
    AmbiguousBinding { name: String },

    #[error("flight: voice command {name:?} is not bound to an action")]
    NotBound { name: String },

    #[error("flight: cannot connect to {channel}")]
    Connect { channel: String },

    #[error("flight: send {action} failed at step {step} on {channel} ({sent} step(s) sent)")]
    Transmission {
        channel: String,
        step: usize,
        action: ActionToken,
        sent: usize,
    },

    #[error("flight: persist {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("flight: flight plan: {0}")]
    Format(String),

    #[error(transparent)]
    Voiceprint(#[from] VoiceprintError),
}

impl FlightError {
    /// Reports whether the error came from the command channel.
    pub fn is_transmission(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Transmission { .. })
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Maps a store miss to [`FlightError::UnknownCommand`].
    pub(crate) fn from_lookup(err: VoiceprintError) -> Self {
        match err {
            VoiceprintError::NotFound { name } => Self::UnknownCommand { name },
            other => Self::Voiceprint(other),
        }
    }
}

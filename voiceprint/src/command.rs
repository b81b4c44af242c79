use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sequential identifier of a trained command. Never reused within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(pub u64);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd_{:03}", self.0)
    }
}

/// One step of a movement sequence: an action label held for a duration.
///
/// The label is not validated against an action vocabulary here; the
/// store only guarantees it is non-empty and that the duration is positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementStep {
    pub action: String,
    pub duration_ms: u64,
}

impl MovementStep {
    pub fn new(action: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            action: action.into(),
            duration_ms,
        }
    }

    /// Reports whether the step has a non-empty label and a positive duration.
    pub fn is_well_formed(&self) -> bool {
        !self.action.trim().is_empty() && self.duration_ms > 0
    }
}

impl fmt::Display for MovementStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.action, self.duration_ms)
    }
}

/// A trained voice command, keyed by name in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceCommand {
    pub id: CommandId,

    /// Trained phrase. Unique within the store.
    pub name: String,

    /// Element-wise mean of `sample_features`.
    pub fingerprint: Vec<f32>,

    /// Raw per-sample vectors that produced the fingerprint, in sample order.
    pub sample_features: Vec<Vec<f32>>,

    /// Ordered movement steps; may be empty.
    #[serde(default)]
    pub movement_sequence: Vec<MovementStep>,

    pub created_at: DateTime<Utc>,

    /// Always equals `sample_features.len()`.
    pub sample_count: usize,
}

impl VoiceCommand {
    /// Reports whether the command has a movement sequence attached.
    pub fn has_sequence(&self) -> bool {
        !self.movement_sequence.is_empty()
    }
}

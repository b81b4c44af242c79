//! Voice command fingerprints and nearest-match recognition.
//!
//! # Architecture
//!
//! 1. [`FeatureExtractor::extract`]: PCM16 mono audio -> fixed-length feature vector
//! 2. [`VoiceprintStore::train`]: N samples -> mean fingerprint, persisted by command name
//! 3. [`Recognizer::recognize`]: query fingerprint -> ranked `(name, score, confidence)` list
//!
//! # Scoring
//!
//! Similarity is `1 / (1 + d)` with `d` the Euclidean distance between
//! fingerprints. Identical vectors score 1.0; scores never increase with
//! distance. Tiers default to:
//!
//! ```text
//! score > 0.7       high
//! 0.5 < score <= 0.7 medium
//! score <= 0.5      low
//! ```
//!
//! # Persistence
//!
//! The store is a single pretty-printed JSON file rewritten atomically
//! (temp file + rename) after every create or delete.

mod command;
mod error;
mod extractor;
mod recognizer;
mod similarity;
mod store;
pub mod synth;

pub use command::{CommandId, MovementStep, VoiceCommand};
pub use error::VoiceprintError;
pub use extractor::{pcm16_to_f32, FeatureExtractor, FrameStatsExtractor, DEFAULT_FEATURE_COUNT};
pub use recognizer::{Confidence, RecognitionMatch, Recognizer, RecognizerConfig};
pub use similarity::{euclidean_distance, mean, similarity};
pub use store::{StoreConfig, VoiceprintStore, DEFAULT_SAMPLES_PER_COMMAND};

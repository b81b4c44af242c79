use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::command::{CommandId, VoiceCommand};
use crate::similarity::similarity;
use crate::store::VoiceprintStore;
use crate::VoiceprintError;

/// Confidence tier of a recognition score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Configuration for [`Recognizer`].
#[derive(Debug, Clone, Copy)]
pub struct RecognizerConfig {
    /// Scores above this are [`Confidence::High`] (default: 0.7).
    pub high_threshold: f32,
    /// Scores above this (and not high) are [`Confidence::Medium`] (default: 0.5).
    pub medium_threshold: f32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.7,
            medium_threshold: 0.5,
        }
    }
}

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionMatch {
    pub name: String,
    pub id: CommandId,
    /// Similarity in (0, 1]; 1.0 means identical fingerprints.
    pub score: f32,
    pub confidence: Confidence,
}

/// Ranks stored fingerprints against a query fingerprint.
///
/// The score is `1 / (1 + d)` where `d` is the Euclidean distance, so it is
/// maximal for identical vectors and never increases with distance.
/// Ties keep store insertion order.
#[derive(Debug, Clone, Default)]
pub struct Recognizer {
    cfg: RecognizerConfig,
}

impl Recognizer {
    /// Creates a Recognizer. Thresholds outside [0, 1], or a medium
    /// threshold above the high one, fall back to the defaults.
    pub fn new(cfg: RecognizerConfig) -> Self {
        let in_range = |t: f32| (0.0..=1.0).contains(&t);
        let cfg = if in_range(cfg.high_threshold)
            && in_range(cfg.medium_threshold)
            && cfg.medium_threshold <= cfg.high_threshold
        {
            cfg
        } else {
            RecognizerConfig::default()
        };
        Self { cfg }
    }

    pub fn config(&self) -> RecognizerConfig {
        self.cfg
    }

    /// Maps a score to its confidence tier.
    pub fn tier(&self, score: f32) -> Confidence {
        if score > self.cfg.high_threshold {
            Confidence::High
        } else if score > self.cfg.medium_threshold {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Ranks every command in `store` against `query`, best first.
    pub fn recognize(
        &self,
        query: &[f32],
        store: &VoiceprintStore,
    ) -> Result<Vec<RecognitionMatch>, VoiceprintError> {
        self.rank(query, &store.list())
    }

    /// Extracts the fingerprint of `audio` with the store's extractor and ranks it.
    pub fn recognize_audio(
        &self,
        audio: &[u8],
        store: &VoiceprintStore,
    ) -> Result<Vec<RecognitionMatch>, VoiceprintError> {
        let query = store.extractor().extract(audio)?;
        self.recognize(&query, store)
    }

    /// Ranks `commands` (in insertion order) against `query`, best first.
    pub fn rank(
        &self,
        query: &[f32],
        commands: &[VoiceCommand],
    ) -> Result<Vec<RecognitionMatch>, VoiceprintError> {
        let Some(first) = commands.first() else {
            return Err(VoiceprintError::EmptyStore);
        };
        let dim = first.fingerprint.len();
        if query.len() != dim {
            return Err(VoiceprintError::DimensionMismatch {
                expected: dim,
                got: query.len(),
            });
        }

        let mut matches: Vec<RecognitionMatch> = commands
            .iter()
            .map(|c| {
                let score = similarity(query, &c.fingerprint);
                RecognitionMatch {
                    name: c.name.clone(),
                    id: c.id,
                    score,
                    confidence: self.tier(score),
                }
            })
            .collect();

        // Stable sort: equal scores stay in insertion order.
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));

        if let Some(best) = matches.first() {
            debug!(
                best = %best.name,
                score = best.score,
                confidence = %best.confidence,
                candidates = matches.len(),
                "voiceprint: recognized"
            );
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{FeatureExtractor, StoreConfig};

    /// Interprets each byte as one feature.
    struct BytesExtractor;

    impl FeatureExtractor for BytesExtractor {
        fn extract(&self, audio: &[u8]) -> Result<Vec<f32>, VoiceprintError> {
            let mut v: Vec<f32> = audio.iter().take(2).map(|&b| b as f32 / 10.0).collect();
            v.resize(2, 0.0);
            Ok(v)
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn store_with(entries: &[(&str, [f32; 2])]) -> VoiceprintStore {
        let store = VoiceprintStore::in_memory(StoreConfig::default(), Arc::new(BytesExtractor));
        for (name, fp) in entries {
            store.train_features(name, vec![fp.to_vec(); 4], &[]).unwrap();
        }
        store
    }

    #[test]
    fn tiers_follow_thresholds() {
        let r = Recognizer::default();
        assert_eq!(r.tier(0.71), Confidence::High);
        assert_eq!(r.tier(0.7), Confidence::Medium);
        assert_eq!(r.tier(0.51), Confidence::Medium);
        assert_eq!(r.tier(0.5), Confidence::Low);
        assert_eq!(r.tier(0.1), Confidence::Low);
    }

    #[test]
    fn custom_thresholds() {
        let r = Recognizer::new(RecognizerConfig {
            high_threshold: 0.9,
            medium_threshold: 0.2,
        });
        assert_eq!(r.tier(0.8), Confidence::Medium);
        assert_eq!(r.tier(0.3), Confidence::Medium);
    }

    #[test]
    fn invalid_thresholds_fall_back_to_defaults() {
        let r = Recognizer::new(RecognizerConfig {
            high_threshold: 0.4,
            medium_threshold: 0.6,
        });
        assert_eq!(r.config().high_threshold, 0.7);
        assert_eq!(r.config().medium_threshold, 0.5);
    }

    #[test]
    fn single_command_matches_itself_with_max_score() {
        let store = store_with(&[("a", [0.4, 0.9])]);
        let fp = store.get("a").unwrap().fingerprint;
        let results = Recognizer::default().recognize(&fp, &store).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "a");
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[0].confidence, Confidence::High);
    }

    #[test]
    fn ranks_by_descending_score() {
        let store = store_with(&[("far", [9.0, 9.0]), ("near", [1.0, 1.1]), ("mid", [2.0, 2.0])]);
        let results = Recognizer::default().recognize(&[1.0, 1.0], &store).unwrap();
        let order: Vec<&str> = results.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(order, vec!["near", "mid", "far"]);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn ties_keep_insertion_order() {
        let store = store_with(&[("second", [1.0, 0.0]), ("first", [-1.0, 0.0])]);
        let results = Recognizer::default().recognize(&[0.0, 0.0], &store).unwrap();
        assert_eq!(results[0].score, results[1].score);
        assert_eq!(results[0].name, "second");
        assert_eq!(results[1].name, "first");
    }

    #[test]
    fn nan_query_ranks_without_panicking() {
        let store = store_with(&[("a", [1.0, 0.0]), ("b", [0.0, 1.0])]);
        let results = Recognizer::default().recognize(&[f32::NAN, 0.0], &store).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|m| m.confidence == Confidence::Low));
    }

    #[test]
    fn empty_store_is_an_error() {
        let store = store_with(&[]);
        let err = Recognizer::default().recognize(&[0.0, 0.0], &store).unwrap_err();
        assert!(matches!(err, VoiceprintError::EmptyStore));
    }

    #[test]
    fn query_dimension_must_match() {
        let store = store_with(&[("a", [0.0, 0.0])]);
        let err = Recognizer::default().recognize(&[0.0], &store).unwrap_err();
        assert!(matches!(
            err,
            VoiceprintError::DimensionMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn recognize_audio_uses_store_extractor() {
        let store = store_with(&[("a", [0.1, 0.2]), ("b", [2.0, 2.0])]);
        let results = Recognizer::default()
            .recognize_audio(&[1, 2], &store)
            .unwrap();
        assert_eq!(results[0].name, "a");
        assert_eq!(results[0].score, 1.0);
    }
}

use crate::VoiceprintError;

/// Feature count of the reference extractor.
pub const DEFAULT_FEATURE_COUNT: usize = 13;

/// Turns one audio sample into a fixed-length feature vector.
///
/// The input audio is PCM16 signed little-endian, mono. The output length
/// is always [`FeatureExtractor::dimension`], including for empty input,
/// which yields a zero vector instead of an error.
///
/// # Thread Safety
///
/// Implementations must be safe for concurrent use.
pub trait FeatureExtractor: Send + Sync {
    /// Computes the feature vector of one audio sample.
    fn extract(&self, audio: &[u8]) -> Result<Vec<f32>, VoiceprintError>;

    /// Returns the length of every vector produced by [`FeatureExtractor::extract`].
    fn dimension(&self) -> usize;
}

/// Time-domain frame statistics over equal contiguous segments of the sample.
///
/// The first `ceil(d/2)` features are segment RMS energies (normalized to
/// full scale), the remaining ones are segment zero-crossing rates. This is
/// a deterministic stand-in for a spectral front end, not a replacement.
#[derive(Debug, Clone)]
pub struct FrameStatsExtractor {
    dimension: usize,
}

impl FrameStatsExtractor {
    /// Creates an extractor producing `dimension` features.
    /// A zero dimension falls back to [`DEFAULT_FEATURE_COUNT`].
    pub fn new(dimension: usize) -> Self {
        let dimension = if dimension == 0 {
            DEFAULT_FEATURE_COUNT
        } else {
            dimension
        };
        Self { dimension }
    }
}

impl Default for FrameStatsExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_FEATURE_COUNT)
    }
}

impl FeatureExtractor for FrameStatsExtractor {
    fn extract(&self, audio: &[u8]) -> Result<Vec<f32>, VoiceprintError> {
        let samples = pcm16_to_f32(audio);
        let mut features = vec![0.0f32; self.dimension];
        if samples.is_empty() {
            return Ok(features);
        }

        let energy_bands = self.dimension.div_ceil(2);
        let zcr_bands = self.dimension - energy_bands;

        for (band, slot) in features[..energy_bands].iter_mut().enumerate() {
            let seg = segment(&samples, band, energy_bands);
            if !seg.is_empty() {
                let sum: f64 = seg.iter().map(|&s| (s as f64) * (s as f64)).sum();
                *slot = (sum / seg.len() as f64).sqrt() as f32;
            }
        }

        for (band, slot) in features[energy_bands..].iter_mut().enumerate() {
            let seg = segment(&samples, band, zcr_bands);
            if seg.len() > 1 {
                let crossings = seg
                    .windows(2)
                    .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
                    .count();
                *slot = crossings as f32 / (seg.len() - 1) as f32;
            }
        }

        Ok(features)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Returns the `band`-th of `bands` equal contiguous slices of `samples`.
fn segment(samples: &[f32], band: usize, bands: usize) -> &[f32] {
    let start = band * samples.len() / bands;
    let end = (band + 1) * samples.len() / bands;
    &samples[start..end]
}

/// Decodes PCM16 little-endian bytes to samples in [-1, 1]. A trailing odd byte is ignored.
pub fn pcm16_to_f32(audio: &[u8]) -> Vec<f32> {
    audio
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
        .collect()
}

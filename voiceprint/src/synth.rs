//! Synthetic utterances for exercising training and recognition without a microphone.
//!
//! Each phrase gets a deterministic fundamental in [220, 320) Hz; every take
//! adds a little pitch jitter and noise so repeated samples are close but
//! not identical.

use std::f64::consts::PI;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for [`utterance`].
#[derive(Debug, Clone)]
pub struct UtteranceConfig {
    pub sample_rate: u32,
    pub duration: Duration,
    /// Peak amplitude of the additive noise, relative to the tone.
    pub noise: f32,
    /// Maximum pitch deviation between takes, in Hz.
    pub jitter_hz: f64,
}

impl Default for UtteranceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            duration: Duration::from_secs(2),
            noise: 0.05,
            jitter_hz: 2.0,
        }
    }
}

/// Returns the fundamental frequency assigned to `phrase`.
pub fn phrase_pitch(phrase: &str) -> f64 {
    220.0 + (fnv1a(phrase.to_lowercase().as_bytes()) % 1000) as f64 / 10.0
}

/// Renders take number `take` of `phrase` as PCM16 little-endian mono audio.
pub fn utterance(phrase: &str, take: u64, cfg: &UtteranceConfig) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(fnv1a(phrase.as_bytes()) ^ take.wrapping_mul(0x9e37_79b9));
    let jitter = if cfg.jitter_hz > 0.0 {
        rng.gen_range(-cfg.jitter_hz..cfg.jitter_hz)
    } else {
        0.0
    };
    let freq = phrase_pitch(phrase) + jitter;

    let n = (cfg.duration.as_secs_f64() * cfg.sample_rate as f64) as usize;
    let mut signal: Vec<f32> = (0..n)
        .map(|i| {
            let t = i as f64 / cfg.sample_rate as f64;
            let tone = 0.7 * (2.0 * PI * freq * t).sin()
                + 0.3 * (2.0 * PI * freq * 2.0 * t).sin()
                + 0.1 * (2.0 * PI * freq * 3.0 * t).sin();
            let noise = if cfg.noise > 0.0 {
                rng.gen_range(-cfg.noise..cfg.noise)
            } else {
                0.0
            };
            tone as f32 * envelope(i, n) + noise
        })
        .collect();

    let peak = signal.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
    if peak > 0.0 {
        for s in &mut signal {
            *s /= peak;
        }
    }

    signal
        .iter()
        .flat_map(|&s| ((s * 32767.0) as i16).to_le_bytes())
        .collect()
}

/// Attack 10%, decay 20% down to 0.7, sustain 0.7, release over the last 10%.
fn envelope(i: usize, n: usize) -> f32 {
    let attack = n / 10;
    let decay = n / 5;
    let release = n / 10;
    if i < attack {
        i as f32 / attack as f32
    } else if i < attack + decay {
        1.0 - 0.3 * (i - attack) as f32 / decay as f32
    } else if i + release < n {
        0.7
    } else {
        0.7 * (n - i) as f32 / release.max(1) as f32
    }
}

fn fnv1a(data: &[u8]) -> u64 {
    data.iter().fold(0xcbf2_9ce4_8422_2325u64, |h, &b| {
        (h ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeatureExtractor, FrameStatsExtractor, similarity};

    fn short() -> UtteranceConfig {
        UtteranceConfig {
            duration: Duration::from_millis(250),
            ..Default::default()
        }
    }

    #[test]
    fn length_matches_duration() {
        let audio = utterance("взлет", 0, &short());
        assert_eq!(audio.len(), 4000 * 2);
    }

    #[test]
    fn same_take_is_deterministic() {
        assert_eq!(utterance("up", 3, &short()), utterance("up", 3, &short()));
    }

    #[test]
    fn takes_differ() {
        assert_ne!(utterance("up", 0, &short()), utterance("up", 1, &short()));
    }

    #[test]
    fn pitch_is_in_range_and_case_insensitive() {
        for phrase in ["takeoff", "посадка", "rotate left", ""] {
            let p = phrase_pitch(phrase);
            assert!((220.0..320.0).contains(&p), "{phrase}: {p}");
        }
        assert_eq!(phrase_pitch("Взлет"), phrase_pitch("взлет"));
    }

    #[test]
    fn clean_takes_share_a_fingerprint_and_phrases_differ() {
        let ext = FrameStatsExtractor::default();
        let cfg = UtteranceConfig {
            noise: 0.0,
            jitter_hz: 0.0,
            ..Default::default()
        };
        let a0 = ext.extract(&utterance("forward", 0, &cfg)).unwrap();
        let a1 = ext.extract(&utterance("forward", 1, &cfg)).unwrap();
        assert_eq!(similarity(&a0, &a1), 1.0);

        let other = ["back", "left", "right", "up", "down"]
            .into_iter()
            .max_by(|x, y| {
                let gx = (phrase_pitch(x) - phrase_pitch("forward")).abs();
                let gy = (phrase_pitch(y) - phrase_pitch("forward")).abs();
                gx.total_cmp(&gy)
            })
            .unwrap();
        let b = ext.extract(&utterance(other, 0, &cfg)).unwrap();
        assert!(similarity(&a0, &b) < 1.0);
    }
}

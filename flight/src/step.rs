//! Parsing of `ACTION:DURATION` movement steps into typed [`Step`]s.
//!
//! Malformed input never fails the parse. Steps with an unsupported action
//! or without a separator are skipped, a malformed duration falls back to
//! the parser's default; each case is reported as a [`StepWarning`].

use std::fmt;

use dronevox_voiceprint::MovementStep;
use tracing::warn;

use crate::action::{ActionCatalog, ActionToken};

/// Duration used when a step's duration is missing or not a positive integer.
pub const DEFAULT_STEP_DURATION_MS: u64 = 1000;

/// A validated movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub action: ActionToken,
    pub duration_ms: u64,
}

impl Step {
    pub fn new(action: ActionToken, duration_ms: u64) -> Self {
        Self {
            action,
            duration_ms,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.action, self.duration_ms)
    }
}

impl From<Step> for MovementStep {
    fn from(step: Step) -> Self {
        MovementStep::new(step.action.as_str(), step.duration_ms)
    }
}

/// A recoverable problem found while parsing step `index` (0-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepWarning {
    MissingSeparator { index: usize, raw: String },
    UnsupportedAction { index: usize, token: String },
    DefaultedDuration { index: usize, raw: String },
}

impl fmt::Display for StepWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator { index, raw } => {
                write!(f, "step {index}: {raw:?} has no ':' separator, skipped")
            }
            Self::UnsupportedAction { index, token } => {
                write!(f, "step {index}: unsupported action {token:?}, skipped")
            }
            Self::DefaultedDuration { index, raw } => {
                write!(f, "step {index}: duration {raw:?} is not a positive integer, using default")
            }
        }
    }
}

/// Result of parsing a movement sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSteps {
    pub steps: Vec<Step>,
    pub warnings: Vec<StepWarning>,
}

/// Turns raw or stored movement steps into validated [`Step`]s.
#[derive(Debug, Clone)]
pub struct StepParser {
    catalog: ActionCatalog,
    default_duration_ms: u64,
}

impl StepParser {
    pub fn new(catalog: ActionCatalog) -> Self {
        Self::with_default_duration(catalog, DEFAULT_STEP_DURATION_MS)
    }

    /// Creates a parser with a custom fallback duration (0 means the default).
    pub fn with_default_duration(catalog: ActionCatalog, default_duration_ms: u64) -> Self {
        let default_duration_ms = if default_duration_ms > 0 {
            default_duration_ms
        } else {
            DEFAULT_STEP_DURATION_MS
        };
        Self {
            catalog,
            default_duration_ms,
        }
    }

    pub fn default_duration_ms(&self) -> u64 {
        self.default_duration_ms
    }

    /// Parses `ACTION:DURATION` strings, splitting each on its first ':'.
    pub fn parse<S: AsRef<str>>(&self, raw: &[S]) -> ParsedSteps {
        let mut out = ParsedSteps::default();
        for (index, entry) in raw.iter().enumerate() {
            let entry = entry.as_ref();
            let Some((action, duration)) = entry.split_once(':') else {
                out.push_warning(StepWarning::MissingSeparator {
                    index,
                    raw: entry.to_string(),
                });
                continue;
            };
            if let Some(step) = self.step(index, action, duration, &mut out) {
                out.steps.push(step);
            }
        }
        out
    }

    /// Validates the actions of stored movement steps.
    pub fn from_movements(&self, movements: &[MovementStep]) -> ParsedSteps {
        let mut out = ParsedSteps::default();
        for (index, m) in movements.iter().enumerate() {
            let duration = m.duration_ms.to_string();
            if let Some(step) = self.step(index, &m.action, &duration, &mut out) {
                out.steps.push(step);
            }
        }
        out
    }

    fn step(
        &self,
        index: usize,
        action: &str,
        duration: &str,
        out: &mut ParsedSteps,
    ) -> Option<Step> {
        let action = match self.catalog.parse(action) {
            Ok(a) => a,
            Err(_) => {
                out.push_warning(StepWarning::UnsupportedAction {
                    index,
                    token: action.trim().to_uppercase(),
                });
                return None;
            }
        };
        let duration_ms = match duration.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => ms,
            _ => {
                out.push_warning(StepWarning::DefaultedDuration {
                    index,
                    raw: duration.to_string(),
                });
                self.default_duration_ms
            }
        };
        Some(Step::new(action, duration_ms))
    }
}

impl Default for StepParser {
    fn default() -> Self {
        Self::new(ActionCatalog::new())
    }
}

impl ParsedSteps {
    fn push_warning(&mut self, warning: StepWarning) {
        warn!("flight: {warning}");
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_steps() {
        let parsed = StepParser::default().parse(&["TAKEOFF:2000", "forward: 500 ", " up :100"]);
        assert_eq!(
            parsed.steps,
            vec![
                Step::new(ActionToken::Takeoff, 2000),
                Step::new(ActionToken::Forward, 500),
                Step::new(ActionToken::Up, 100),
            ]
        );
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn unsupported_action_is_skipped_with_warning() {
        let parsed = StepParser::default().parse(&["FLIP:100", "LAND:300"]);
        assert_eq!(parsed.steps, vec![Step::new(ActionToken::Land, 300)]);
        assert_eq!(
            parsed.warnings,
            vec![StepWarning::UnsupportedAction {
                index: 0,
                token: "FLIP".into()
            }]
        );
    }

    #[test]
    fn malformed_duration_uses_default() {
        let parsed = StepParser::default().parse(&["HOVER:soon", "LEFT:-5", "RIGHT:0", "DOWN:"]);
        assert!(parsed.steps.iter().all(|s| s.duration_ms == DEFAULT_STEP_DURATION_MS));
        assert_eq!(parsed.steps.len(), 4);
        assert_eq!(parsed.warnings.len(), 4);
    }

    #[test]
    fn missing_separator_is_skipped() {
        let parsed = StepParser::default().parse(&["HOVER", "STOP:10"]);
        assert_eq!(parsed.steps, vec![Step::new(ActionToken::Stop, 10)]);
        assert!(matches!(
            parsed.warnings[0],
            StepWarning::MissingSeparator { index: 0, .. }
        ));
    }

    #[test]
    fn splits_on_first_separator_only() {
        let parsed = StepParser::default().parse(&["UP:100:extra"]);
        assert_eq!(parsed.steps, vec![Step::new(ActionToken::Up, DEFAULT_STEP_DURATION_MS)]);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn custom_default_duration() {
        let parser = StepParser::with_default_duration(ActionCatalog::new(), 250);
        let parsed = parser.parse(&["ARM:x"]);
        assert_eq!(parsed.steps, vec![Step::new(ActionToken::Arm, 250)]);
        assert_eq!(
            StepParser::with_default_duration(ActionCatalog::new(), 0).default_duration_ms(),
            DEFAULT_STEP_DURATION_MS
        );
    }

    #[test]
    fn stored_movements_are_validated() {
        let movements = vec![
            MovementStep::new("FORWARD", 100),
            MovementStep::new("SOMERSAULT", 100),
            MovementStep::new("rotate_right", 900),
        ];
        let parsed = StepParser::default().from_movements(&movements);
        assert_eq!(
            parsed.steps,
            vec![
                Step::new(ActionToken::Forward, 100),
                Step::new(ActionToken::RotateRight, 900),
            ]
        );
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn step_converts_to_movement() {
        let m: MovementStep = Step::new(ActionToken::RotateLeft, 700).into();
        assert_eq!(m, MovementStep::new("ROTATE_LEFT", 700));
    }
}

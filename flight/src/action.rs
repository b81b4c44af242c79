//! Actuator directive vocabulary and the default phrase table.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::FlightError;

/// A supported actuator directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionToken {
    Takeoff,
    Land,
    Hover,
    Stop,
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    RotateLeft,
    RotateRight,
    Arm,
    Disarm,
}

impl ActionToken {
    /// Every directive, in catalog order.
    pub const ALL: [ActionToken; 14] = [
        Self::Takeoff,
        Self::Land,
        Self::Hover,
        Self::Stop,
        Self::Forward,
        Self::Back,
        Self::Left,
        Self::Right,
        Self::Up,
        Self::Down,
        Self::RotateLeft,
        Self::RotateRight,
        Self::Arm,
        Self::Disarm,
    ];

    /// Wire form of the directive (e.g. `"ROTATE_LEFT"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Takeoff => "TAKEOFF",
            Self::Land => "LAND",
            Self::Hover => "HOVER",
            Self::Stop => "STOP",
            Self::Forward => "FORWARD",
            Self::Back => "BACK",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::RotateLeft => "ROTATE_LEFT",
            Self::RotateRight => "ROTATE_RIGHT",
            Self::Arm => "ARM",
            Self::Disarm => "DISARM",
        }
    }
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionToken {
    type Err = FlightError;

    /// Parses a wire token, ignoring surrounding whitespace and case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == upper)
            .ok_or_else(|| FlightError::UnsupportedAction {
                token: s.to_string(),
            })
    }
}

/// Default phrase table: spoken phrase (lower case) -> directive.
pub const DEFAULT_PHRASES: &[(&str, ActionToken)] = &[
    ("взлет", ActionToken::Takeoff),
    ("посадка", ActionToken::Land),
    ("зависни", ActionToken::Hover),
    ("стоп", ActionToken::Stop),
    ("вперед", ActionToken::Forward),
    ("назад", ActionToken::Back),
    ("влево", ActionToken::Left),
    ("вправо", ActionToken::Right),
    ("вверх", ActionToken::Up),
    ("вниз", ActionToken::Down),
    ("поворот влево", ActionToken::RotateLeft),
    ("поворот вправо", ActionToken::RotateRight),
    ("включить", ActionToken::Arm),
    ("выключить", ActionToken::Disarm),
    ("takeoff", ActionToken::Takeoff),
    ("land", ActionToken::Land),
    ("hover", ActionToken::Hover),
    ("stop", ActionToken::Stop),
    ("forward", ActionToken::Forward),
    ("back", ActionToken::Back),
    ("left", ActionToken::Left),
    ("right", ActionToken::Right),
    ("up", ActionToken::Up),
    ("down", ActionToken::Down),
    ("rotate left", ActionToken::RotateLeft),
    ("rotate right", ActionToken::RotateRight),
    ("arm", ActionToken::Arm),
    ("disarm", ActionToken::Disarm),
];

/// The closed set of directives plus an immutable phrase -> directive table.
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    phrases: HashMap<String, ActionToken>,
}

impl ActionCatalog {
    /// Creates a catalog with [`DEFAULT_PHRASES`].
    pub fn new() -> Self {
        Self::with_phrases(DEFAULT_PHRASES.iter().copied())
    }

    /// Creates a catalog with a custom phrase table. Phrases are matched case-insensitively.
    pub fn with_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = (S, ActionToken)>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|(p, a)| (normalize_phrase(p.as_ref()), a))
            .collect();
        Self { phrases }
    }

    /// Every supported directive.
    pub fn actions(&self) -> &'static [ActionToken] {
        &ActionToken::ALL
    }

    /// Reports whether `token` names a supported directive.
    pub fn is_supported(&self, token: &str) -> bool {
        token.parse::<ActionToken>().is_ok()
    }

    /// Parses `token` into a directive.
    pub fn parse(&self, token: &str) -> Result<ActionToken, FlightError> {
        token.parse()
    }

    /// Looks up the default directive for a spoken phrase.
    pub fn default_action(&self, phrase: &str) -> Option<ActionToken> {
        self.phrases.get(&normalize_phrase(phrase)).copied()
    }

    /// Returns the phrase table sorted by phrase.
    pub fn phrases(&self) -> Vec<(&str, ActionToken)> {
        let mut out: Vec<(&str, ActionToken)> =
            self.phrases.iter().map(|(p, a)| (p.as_str(), *a)).collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_phrase(phrase: &str) -> String {
    phrase.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_through_wire_form() {
        for a in ActionToken::ALL {
            assert_eq!(a.as_str().parse::<ActionToken>().unwrap(), a);
        }
    }

    #[test]
    fn token_parse_is_case_insensitive() {
        assert_eq!(" rotate_left ".parse::<ActionToken>().unwrap(), ActionToken::RotateLeft);
        assert_eq!("Land".parse::<ActionToken>().unwrap(), ActionToken::Land);
    }

    #[test]
    fn unknown_token_is_unsupported() {
        let err = "BARREL_ROLL".parse::<ActionToken>().unwrap_err();
        assert!(matches!(err, FlightError::UnsupportedAction { token } if token == "BARREL_ROLL"));
    }

    #[test]
    fn serde_uses_wire_form() {
        let json = serde_json::to_string(&ActionToken::RotateRight).unwrap();
        assert_eq!(json, "\"ROTATE_RIGHT\"");
    }

    #[test]
    fn catalog_supports_exactly_the_vocabulary() {
        let cat = ActionCatalog::new();
        assert_eq!(cat.actions().len(), 14);
        assert!(cat.is_supported("TAKEOFF"));
        assert!(cat.is_supported("disarm"));
        assert!(!cat.is_supported("FLIP"));
        assert!(!cat.is_supported(""));
    }

    #[test]
    fn default_phrases_are_case_insensitive() {
        let cat = ActionCatalog::new();
        assert_eq!(cat.default_action("Взлет"), Some(ActionToken::Takeoff));
        assert_eq!(cat.default_action("поворот вправо"), Some(ActionToken::RotateRight));
        assert_eq!(cat.default_action("  HOVER "), Some(ActionToken::Hover));
        assert_eq!(cat.default_action("do a flip"), None);
    }

    #[test]
    fn custom_phrase_table_replaces_defaults() {
        let cat = ActionCatalog::with_phrases([("Lift Off", ActionToken::Takeoff)]);
        assert_eq!(cat.default_action("lift off"), Some(ActionToken::Takeoff));
        assert_eq!(cat.default_action("takeoff"), None);
        assert_eq!(cat.phrases(), vec![("lift off", ActionToken::Takeoff)]);
    }
}

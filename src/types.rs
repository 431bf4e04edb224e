//! Shared types used across modules
//!
//! This module contains types that are used by the node model, the
//! progression machine and the command line host.

use serde::{Deserialize, Serialize};

/// One of the four fixed macro-phases of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Foundation,
    Concept,
    /// Assessment, shown to learners as "A.C.E"
    #[serde(alias = "assessment")]
    Ace,
    Exit,
}

impl Stage {
    /// All stages in traversal order
    pub const ALL: [Stage; 4] = [Stage::Foundation, Stage::Concept, Stage::Ace, Stage::Exit];

    /// Position of this stage in traversal order
    pub fn index(self) -> usize {
        match self {
            Stage::Foundation => 0,
            Stage::Concept => 1,
            Stage::Ace => 2,
            Stage::Exit => 3,
        }
    }

    /// Stage at a traversal position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Learner-facing stage label
    pub fn label(self) -> &'static str {
        match self {
            Stage::Foundation => "Foundation",
            Stage::Concept => "Concept",
            Stage::Ace => "A.C.E",
            Stage::Exit => "Exit",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Foundation => write!(f, "foundation"),
            Stage::Concept => write!(f, "concept"),
            Stage::Ace => write!(f, "ace"),
            Stage::Exit => write!(f, "exit"),
        }
    }
}

/// An answer value: an option index, a number or free text.
///
/// Equality is exact. `Index(1)` never equals `Text("1")`, and text is
/// compared without trimming or case folding. Non-negative integers in a
/// document are indices; negative or fractional numbers are `Number`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Index(usize),
    Number(serde_json::Number),
    Text(String),
}

impl AnswerValue {
    /// Parse raw learner input into the same shape as an answer key.
    ///
    /// Index keys take unsigned input as an index and number keys take
    /// numeric input as a number; everything else stays text.
    pub fn parse_like(key: Option<&AnswerValue>, input: &str) -> Self {
        match key {
            Some(AnswerValue::Index(_)) => match input.parse::<usize>() {
                Ok(index) => AnswerValue::Index(index),
                Err(_) => AnswerValue::Text(input.to_string()),
            },
            Some(AnswerValue::Number(_)) => match input.parse::<serde_json::Number>() {
                Ok(number) => AnswerValue::Number(number),
                Err(_) => AnswerValue::Text(input.to_string()),
            },
            _ => AnswerValue::Text(input.to_string()),
        }
    }
}

impl From<usize> for AnswerValue {
    fn from(index: usize) -> Self {
        AnswerValue::Index(index)
    }
}

impl From<&str> for AnswerValue {
    fn from(text: &str) -> Self {
        AnswerValue::Text(text.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(text: String) -> Self {
        AnswerValue::Text(text)
    }
}

impl std::fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerValue::Index(index) => write!(f, "#{}", index),
            AnswerValue::Number(number) => write!(f, "{}", number),
            AnswerValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// How corrections are phrased to the learner.
///
/// Only `GentleGuide` has content today; the other two are accepted and
/// carried through but behave the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectionPreference {
    #[default]
    GentleGuide,
    DirectCorrect,
    ChallengeMode,
}

impl std::fmt::Display for CorrectionPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrectionPreference::GentleGuide => write!(f, "GENTLE_GUIDE"),
            CorrectionPreference::DirectCorrect => write!(f, "DIRECT_CORRECT"),
            CorrectionPreference::ChallengeMode => write!(f, "CHALLENGE_MODE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::Foundation.next(), Some(Stage::Concept));
        assert_eq!(Stage::Ace.next(), Some(Stage::Exit));
        assert_eq!(Stage::Exit.next(), None);
        assert_eq!(Stage::Foundation.previous(), None);
        assert_eq!(Stage::Exit.previous(), Some(Stage::Ace));
    }

    #[test]
    fn test_stage_serde_names() {
        assert_eq!(serde_json::to_string(&Stage::Ace).unwrap(), "\"ace\"");
        let parsed: Stage = serde_json::from_str("\"assessment\"").unwrap();
        assert_eq!(parsed, Stage::Ace);
    }

    #[test]
    fn test_answer_value_exact_equality() {
        assert_ne!(AnswerValue::Index(1), AnswerValue::Text("1".to_string()));
        assert_ne!(AnswerValue::from("Paris"), AnswerValue::from("paris"));
        assert_ne!(AnswerValue::from("Paris"), AnswerValue::from(" Paris"));
    }

    #[test]
    fn test_answer_value_untagged() {
        let index: AnswerValue = serde_json::from_str("2").unwrap();
        let text: AnswerValue = serde_json::from_str("\"2\"").unwrap();
        assert_eq!(index, AnswerValue::Index(2));
        assert_eq!(text, AnswerValue::Text("2".to_string()));
    }

    #[test]
    fn test_parse_like_key() {
        let key = AnswerValue::Index(0);
        assert_eq!(AnswerValue::parse_like(Some(&key), "3"), AnswerValue::Index(3));
        assert_eq!(AnswerValue::parse_like(Some(&key), "c"), AnswerValue::from("c"));
        assert_eq!(AnswerValue::parse_like(None, "3"), AnswerValue::from("3"));

        let key: AnswerValue = serde_json::from_str("-3").unwrap();
        assert_eq!(AnswerValue::parse_like(Some(&key), "-3"), key);
        assert_eq!(AnswerValue::parse_like(Some(&key), "-x"), AnswerValue::from("-x"));
    }

    #[test]
    fn test_answer_value_numbers() {
        let negative: AnswerValue = serde_json::from_str("-3").unwrap();
        let fraction: AnswerValue = serde_json::from_str("0.5").unwrap();
        assert!(matches!(negative, AnswerValue::Number(_)));
        assert!(matches!(fraction, AnswerValue::Number(_)));
        assert_eq!(fraction.to_string(), "0.5");
        assert_ne!(fraction, AnswerValue::from("0.5"));
        assert_eq!(serde_json::to_string(&negative).unwrap(), "-3");
    }

    #[test]
    fn test_correction_preference_names() {
        let parsed: CorrectionPreference = serde_json::from_str("\"CHALLENGE_MODE\"").unwrap();
        assert_eq!(parsed, CorrectionPreference::ChallengeMode);
        assert_eq!(CorrectionPreference::default(), CorrectionPreference::GentleGuide);
    }
}

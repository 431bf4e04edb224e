//! Session summarizer - builds the finished-session record at a terminal transition

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ledger::{Response, ResponseLedger};
use crate::types::Stage;

/// Incorrect answers at which the session is flagged as fatigued
pub const FATIGUE_THRESHOLD: usize = 3;

/// Minimum incorrect answers before a completed session needs support
pub const NEEDS_SUPPORT_THRESHOLD: usize = 2;

/// Immutable record handed to the caller when a session ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedSession {
    pub session_id: String,
    pub node_id: String,
    /// `exit` for normal completion, `ace` for an early exit
    pub stage: Stage,
    pub frame_index: usize,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub responses: Vec<Response>,
    pub total_correct: usize,
    pub total_incorrect: usize,
    pub fatigue_detected: bool,
    pub needs_support: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_early_from_ace: Option<bool>,
}

/// How the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Advanced past the last Exit frame
    Completed,
    /// Repair attempt missed; left Assessment early
    EarlyExit { frame_index: usize },
}

/// Identity and timing of the session being summarized
#[derive(Debug, Clone)]
pub struct SessionMeta<'a> {
    pub session_id: &'a str,
    pub node_id: &'a str,
    pub started_at: DateTime<Utc>,
}

/// Aggregates a ledger into a [`FinishedSession`]
pub struct SessionSummarizer;

impl SessionSummarizer {
    pub fn summarize(
        meta: SessionMeta<'_>,
        ledger: &ResponseLedger,
        termination: Termination,
        last_frame_index: usize,
    ) -> FinishedSession {
        let total_correct = ledger.correct_count();
        let total_incorrect = ledger.incorrect_count();
        let fatigue_detected = total_incorrect >= FATIGUE_THRESHOLD;

        let (stage, frame_index, needs_support, exit_early_from_ace) = match termination {
            Termination::Completed => (
                Stage::Exit,
                last_frame_index,
                needs_support(total_correct, total_incorrect),
                None,
            ),
            Termination::EarlyExit { frame_index } => (Stage::Ace, frame_index, true, Some(true)),
        };

        let finished = FinishedSession {
            session_id: meta.session_id.to_string(),
            node_id: meta.node_id.to_string(),
            stage,
            frame_index,
            started_at: meta.started_at,
            ended_at: Utc::now(),
            responses: ledger.responses().to_vec(),
            total_correct,
            total_incorrect,
            fatigue_detected,
            needs_support,
            exit_early_from_ace,
        };

        info!(
            "Session {} finished at {} frame {}: correct={} incorrect={} fatigue={} needs_support={}",
            finished.session_id,
            finished.stage,
            finished.frame_index,
            total_correct,
            total_incorrect,
            fatigue_detected,
            needs_support
        );

        finished
    }
}

/// Needs-support heuristic for a normally completed session
pub fn needs_support(total_correct: usize, total_incorrect: usize) -> bool {
    total_incorrect >= NEEDS_SUPPORT_THRESHOLD && total_incorrect >= total_correct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnswerValue;

    fn ledger(results: &[bool]) -> ResponseLedger {
        let mut ledger = ResponseLedger::new();
        for (i, &is_correct) in results.iter().enumerate() {
            ledger.record(Response {
                frame_id: format!("q{}", i),
                stage: Stage::Ace,
                user_answer: AnswerValue::Index(0),
                is_correct,
                attempt_count: 1,
                timestamp: Utc::now(),
            });
        }
        ledger
    }

    fn meta() -> SessionMeta<'static> {
        SessionMeta {
            session_id: "s1",
            node_id: "n1",
            started_at: Utc::now(),
        }
    }

    #[test]
    fn test_needs_support_heuristic() {
        assert!(!needs_support(5, 1));
        assert!(needs_support(1, 2));
        assert!(needs_support(2, 2));
        assert!(!needs_support(3, 2));
        assert!(!needs_support(0, 1));
    }

    #[test]
    fn test_completed_summary() {
        let finished =
            SessionSummarizer::summarize(meta(), &ledger(&[true, false, false]), Termination::Completed, 4);
        assert_eq!(finished.stage, Stage::Exit);
        assert_eq!(finished.frame_index, 4);
        assert_eq!(finished.total_correct, 1);
        assert_eq!(finished.total_incorrect, 2);
        assert!(!finished.fatigue_detected);
        assert!(finished.needs_support);
        assert_eq!(finished.exit_early_from_ace, None);
        assert_eq!(finished.responses.len(), 3);
    }

    #[test]
    fn test_fatigue_threshold() {
        let finished = SessionSummarizer::summarize(
            meta(),
            &ledger(&[false, false, false, true, true, true, true]),
            Termination::Completed,
            0,
        );
        assert!(finished.fatigue_detected);
        assert!(!finished.needs_support);
    }

    #[test]
    fn test_early_exit_always_needs_support() {
        let finished = SessionSummarizer::summarize(
            meta(),
            &ledger(&[true, true, true, true, false]),
            Termination::EarlyExit { frame_index: 2 },
            9,
        );
        assert_eq!(finished.stage, Stage::Ace);
        assert_eq!(finished.frame_index, 2);
        assert!(finished.needs_support);
        assert_eq!(finished.exit_early_from_ace, Some(true));
    }

    #[test]
    fn test_serialized_shape() {
        let finished = SessionSummarizer::summarize(meta(), &ledger(&[true]), Termination::Completed, 0);
        let value = serde_json::to_value(&finished).unwrap();
        assert_eq!(value["stage"], "exit");
        assert_eq!(value["totalCorrect"], 1);
        assert!(value.get("exitEarlyFromAce").is_none());
    }
}

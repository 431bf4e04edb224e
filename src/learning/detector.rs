//! Remediation detector - decides when a wrong answer opens the Support Lock
//!
//! The check is a pure function of the committed ledger plus the response that
//! just came in, so it gives the same answer whether it runs before or after
//! that response is committed.

use super::ledger::{Response, ResponseLedger};
use crate::node::Frame;
use crate::types::Stage;

/// Wrong Assessment answers needed before the Support Lock opens
pub const REMEDIATION_THRESHOLD: usize = 2;

/// Would recording `pending` for `frame` fire remediation?
pub fn would_trigger(
    ledger: &ResponseLedger,
    frame: &Frame,
    pending: &Response,
    support_lock_used: bool,
) -> bool {
    if support_lock_used
        || pending.is_correct
        || frame.stage != Stage::Ace
        || !frame.kind.counts_toward_remediation()
    {
        return false;
    }

    wrong_assessment_count(ledger, pending) >= REMEDIATION_THRESHOLD
}

/// Wrong Assessment answers, counting `pending` as committed
pub fn wrong_assessment_count(ledger: &ResponseLedger, pending: &Response) -> usize {
    ledger.count_where_with(pending, |r| r.stage == Stage::Ace && !r.is_correct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{FrameContent, FrameKind};
    use crate::types::AnswerValue;
    use chrono::Utc;

    fn frame(id: &str, kind: FrameKind, stage: Stage) -> Frame {
        Frame {
            id: id.to_string(),
            kind,
            stage,
            order: 0,
            content: FrameContent {
                correct_answer: Some(AnswerValue::from("A")),
                ..Default::default()
            },
        }
    }

    fn wrong(frame: &Frame) -> Response {
        Response {
            frame_id: frame.id.clone(),
            stage: frame.stage,
            user_answer: AnswerValue::from("X"),
            is_correct: false,
            attempt_count: 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_single_wrong_answer_never_triggers() {
        let ledger = ResponseLedger::new();
        let q1 = frame("q1", FrameKind::Mcq, Stage::Ace);
        assert!(!would_trigger(&ledger, &q1, &wrong(&q1), false));
    }

    #[test]
    fn test_second_wrong_assessment_answer_triggers() {
        let mut ledger = ResponseLedger::new();
        let q1 = frame("q1", FrameKind::Mcq, Stage::Ace);
        let q2 = frame("q2", FrameKind::Numerical, Stage::Ace);
        ledger.record(wrong(&q1));
        assert!(would_trigger(&ledger, &q2, &wrong(&q2), false));
        assert!(!would_trigger(&ledger, &q2, &wrong(&q2), true));
    }

    #[test]
    fn test_wrong_answers_in_other_stages_do_not_count() {
        let mut ledger = ResponseLedger::new();
        let c1 = frame("c1", FrameKind::Mcq, Stage::Concept);
        let c2 = frame("c2", FrameKind::Mcq, Stage::Concept);
        ledger.record(wrong(&c1));
        ledger.record(wrong(&c2));

        let q1 = frame("q1", FrameKind::Mcq, Stage::Ace);
        assert!(!would_trigger(&ledger, &q1, &wrong(&q1), false));
    }

    #[test]
    fn test_recall_frames_do_not_trigger() {
        let mut ledger = ResponseLedger::new();
        let q1 = frame("q1", FrameKind::Mcq, Stage::Ace);
        ledger.record(wrong(&q1));
        let r1 = frame("r1", FrameKind::Recall, Stage::Ace);
        assert!(!would_trigger(&ledger, &r1, &wrong(&r1), false));
    }

    #[test]
    fn test_reanswering_same_frame_counts_once() {
        let mut ledger = ResponseLedger::new();
        let q1 = frame("q1", FrameKind::Mcq, Stage::Ace);
        ledger.record(wrong(&q1));
        let mut again = wrong(&q1);
        again.attempt_count = 2;
        assert_eq!(wrong_assessment_count(&ledger, &again), 1);
        assert!(!would_trigger(&ledger, &q1, &again, false));
    }
}

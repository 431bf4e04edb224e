//! Read-only presentation snapshot
//!
//! Everything a renderer needs to draw the current screen, computed from a
//! [`Session`] without touching it. Progress here is frame traversal, not
//! mastery.

use serde::Serialize;

use super::ledger::Response;
use super::machine::Session;
use super::support_lock::SupportLockPhase;
use crate::node::Frame;
use crate::types::{CorrectionPreference, Stage};

/// Support Lock details for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportLockView {
    pub phase: SupportLockPhase,
    pub acknowledgment: Option<String>,
    pub reteach_index: usize,
    pub reteach_count: usize,
}

/// Snapshot of a session for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub session_id: String,
    pub node_id: String,
    pub skill_goal: String,
    pub stage: Stage,
    pub stage_label: String,
    pub frame_index: usize,
    pub stage_frame_count: usize,
    /// Frame on screen; the lock's frame while it is active
    pub frame: Option<Frame>,
    pub support_lock: Option<SupportLockView>,
    /// Recorded answer for the main frame, kept when revisited
    pub response: Option<Response>,
    pub show_result: bool,
    pub session_progress: u8,
    pub stage_progress: u8,
    pub can_go_back: bool,
    pub can_advance: bool,
    pub can_answer: bool,
    pub finished: bool,
    pub correction_preference: CorrectionPreference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foundation_max_duration_seconds: Option<u32>,
}

impl Presentation {
    pub fn of(session: &Session) -> Self {
        let cursor = session.cursor();
        let lock = session.support_lock();
        let node = session.node();

        let support_lock = match (lock.active, lock.phase) {
            (true, Some(phase)) => Some(SupportLockView {
                phase,
                acknowledgment: lock.acknowledgment().map(str::to_string),
                reteach_index: lock.reteach_index,
                reteach_count: lock.reteach_frames().len(),
            }),
            _ => None,
        };

        let response = session
            .current_frame()
            .and_then(|frame| session.ledger().get(&frame.id))
            .cloned();

        let show_result = support_lock.is_none()
            && response.is_some()
            && session.current_frame().map(Frame::requires_answer).unwrap_or(false);

        Self {
            session_id: session.id().to_string(),
            node_id: node.id.clone(),
            skill_goal: node.skill_goal.clone(),
            stage: cursor.stage,
            stage_label: cursor.stage.label().to_string(),
            frame_index: cursor.frame_index,
            stage_frame_count: session.store().stage_len(cursor.stage),
            frame: session.visible_frame(),
            support_lock,
            response,
            show_result,
            session_progress: session_progress(session),
            stage_progress: stage_progress(session),
            can_go_back: session.can_go_back(),
            can_advance: session.can_advance(),
            can_answer: session.can_answer(),
            finished: session.is_finished(),
            correction_preference: session.correction_preference(),
            foundation_max_duration_seconds: node.foundation_max_duration_seconds,
        }
    }
}

/// Distinct frames answered over all frames in the node, as a rounded percentage
pub fn session_progress(session: &Session) -> u8 {
    percent(session.ledger().len(), session.store().total_frames())
}

/// Position within the current stage, as a rounded percentage
pub fn stage_progress(session: &Session) -> u8 {
    let cursor = session.cursor();
    percent(cursor.frame_index + 1, session.store().stage_len(cursor.stage))
}

fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{FrameContent, FrameKind, Node};
    use crate::types::AnswerValue;

    fn frame(id: &str, kind: FrameKind, stage: Stage, key: Option<&str>) -> Frame {
        Frame {
            id: id.to_string(),
            kind,
            stage,
            order: 0,
            content: FrameContent {
                correct_answer: key.map(AnswerValue::from),
                ..Default::default()
            },
        }
    }

    fn session() -> Session {
        Session::new(Node {
            id: "n".to_string(),
            skill_goal: "Goal".to_string(),
            foundation_max_duration_seconds: Some(60),
            frames: vec![
                frame("f1", FrameKind::What, Stage::Foundation, None),
                frame("f2", FrameKind::Recall, Stage::Foundation, Some("r")),
                frame("f3", FrameKind::Definition, Stage::Foundation, None),
                frame("q1", FrameKind::Mcq, Stage::Ace, Some("A")),
                frame("q2", FrameKind::Mcq, Stage::Ace, Some("B")),
                frame("x1", FrameKind::Summary, Stage::Exit, None),
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn test_initial_snapshot() {
        let view = Presentation::of(&session());
        assert_eq!(view.stage, Stage::Foundation);
        assert_eq!(view.stage_label, "Foundation");
        assert_eq!(view.stage_frame_count, 3);
        assert_eq!(view.stage_progress, 33);
        assert_eq!(view.session_progress, 0);
        assert!(!view.can_go_back);
        assert!(view.can_advance);
        assert!(!view.show_result);
        assert_eq!(view.frame.map(|f| f.id), Some("f1".to_string()));
        assert_eq!(view.foundation_max_duration_seconds, Some(60));
    }

    #[test]
    fn test_sticky_answer_is_visible_on_return() {
        let mut session = session();
        session.advance().unwrap();
        assert!(!Presentation::of(&session).can_advance);
        session.answer(AnswerValue::from("r")).unwrap();

        let view = Presentation::of(&session);
        assert!(view.show_result);
        assert_eq!(view.session_progress, 17);

        session.advance().unwrap();
        session.go_back().unwrap();
        let view = Presentation::of(&session);
        assert_eq!(view.response.map(|r| r.user_answer), Some(AnswerValue::from("r")));
        assert!(view.show_result);
    }

    #[test]
    fn test_support_lock_view() {
        let mut session = session();
        for _ in 0..3 {
            if session.current_frame().map(Frame::requires_answer).unwrap_or(false) {
                session.answer(AnswerValue::from("r")).unwrap();
            }
            session.advance().unwrap();
        }
        session.answer(AnswerValue::from("X")).unwrap();
        session.advance().unwrap();
        session.answer(AnswerValue::from("X")).unwrap();

        let view = Presentation::of(&session);
        let lock = view.support_lock.expect("lock is active");
        assert_eq!(lock.phase, SupportLockPhase::Acknowledgment);
        assert_eq!(lock.reteach_count, 1);
        assert!(lock.acknowledgment.is_some());
        assert_eq!(view.frame.map(|f| f.kind), Some(FrameKind::AceAck));
        assert!(!view.show_result);
        assert!(!view.can_go_back);
        assert!(view.can_advance);
        assert!(!view.can_answer);
    }
}

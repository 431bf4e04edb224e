//! Support Lock - the remediation sub-flow
//!
//! Three phases, strictly forward: acknowledgment, micro-reteach, repair
//! attempt. Content is synthesized from the frame that opened the lock. The
//! wording here is learner-facing and must stay non-punitive.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::node::{Frame, FrameContent, FrameKind};
use crate::types::Stage;

/// Acknowledgment phrases, chosen by index modulo the bank size
pub const ACKNOWLEDGMENT_PHRASES: &[&str] = &[
    "Let's take a closer look at this together.",
    "Good thinking so far. Here's another way to see it.",
    "This one is worth a second look.",
    "Let's slow down and build this step by step.",
];

/// Bridge shown after the explanation, before the repair question
const BRIDGE_TEXT: &str = "Keep that idea in hand. Next is a question very much like the one you just saw.";

const RETEACH_TITLE: &str = "A closer look";
const BRIDGE_TITLE: &str = "Ready when you are";

/// Phase of an active Support Lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupportLockPhase {
    Acknowledgment,
    MicroReteach,
    RepairAttempt,
}

impl std::fmt::Display for SupportLockPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupportLockPhase::Acknowledgment => write!(f, "acknowledgment"),
            SupportLockPhase::MicroReteach => write!(f, "micro-reteach"),
            SupportLockPhase::RepairAttempt => write!(f, "repair-attempt"),
        }
    }
}

/// Everything the builder synthesizes for one lock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportLockContent {
    pub acknowledgment: String,
    /// One or two frames
    pub reteach_frames: Vec<Frame>,
    pub repair_frame: Frame,
}

/// Build the lock content for `trigger`
pub fn build_support_lock(trigger: &Frame, acknowledgment_index: usize) -> SupportLockContent {
    let acknowledgment =
        ACKNOWLEDGMENT_PHRASES[acknowledgment_index % ACKNOWLEDGMENT_PHRASES.len()].to_string();

    let mut reteach_frames = Vec::with_capacity(2);
    if let Some(explanation) = trigger.content.explanation.as_deref() {
        reteach_frames.push(derive_reteach(trigger, explanation));
    }
    reteach_frames.push(derive_bridge(trigger));

    SupportLockContent {
        acknowledgment,
        reteach_frames,
        repair_frame: derive_repair(trigger),
    }
}

/// Repackage the trigger's explanation as a standalone content frame
fn derive_reteach(trigger: &Frame, explanation: &str) -> Frame {
    Frame {
        id: format!("{}-reteach-1", trigger.id),
        kind: FrameKind::AceReteach,
        stage: Stage::Ace,
        order: trigger.order,
        content: FrameContent {
            title: Some(RETEACH_TITLE.to_string()),
            body: Some(explanation.to_string()),
            formula: trigger.content.formula.clone(),
            image_url: trigger.content.image_url.clone(),
            ..Default::default()
        },
    }
}

fn derive_bridge(trigger: &Frame) -> Frame {
    Frame {
        id: format!("{}-reteach-2", trigger.id),
        kind: FrameKind::AceReteach,
        stage: Stage::Ace,
        order: trigger.order,
        content: FrameContent {
            title: Some(BRIDGE_TITLE.to_string()),
            body: Some(BRIDGE_TEXT.to_string()),
            ..Default::default()
        },
    }
}

/// Shallow copy of the trigger under a derived id; same kind and answer key
fn derive_repair(trigger: &Frame) -> Frame {
    Frame {
        id: format!("{}-repair", trigger.id),
        ..trigger.clone()
    }
}

/// Remediation state nested in one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportLockState {
    pub active: bool,
    /// Sticky: once true it stays true for the session
    pub used: bool,
    pub phase: Option<SupportLockPhase>,
    pub triggered_by_frame_id: Option<String>,
    pub content: Option<SupportLockContent>,
    pub reteach_index: usize,
    pub repair_correct: Option<bool>,
}

/// What a continue action did inside the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockContinue {
    /// Moved to another reteach frame or into a new phase
    Moved(SupportLockPhase),
    /// Already at the repair question; an answer is needed
    AwaitingRepair,
}

impl SupportLockState {
    /// Open the lock. Panics if it was used before in this session.
    pub fn engage(&mut self, trigger_id: &str, content: SupportLockContent) {
        assert!(!self.used, "support lock engaged twice in one session");
        debug!(
            "Support lock engaged by {} ({} reteach frames)",
            trigger_id,
            content.reteach_frames.len()
        );
        *self = SupportLockState {
            active: true,
            used: true,
            phase: Some(SupportLockPhase::Acknowledgment),
            triggered_by_frame_id: Some(trigger_id.to_string()),
            content: Some(content),
            reteach_index: 0,
            repair_correct: None,
        };
    }

    /// Handle the continue action for the current phase
    pub fn continue_action(&mut self) -> LockContinue {
        match self.phase {
            Some(SupportLockPhase::Acknowledgment) => {
                self.enter(SupportLockPhase::MicroReteach);
                self.reteach_index = 0;
                LockContinue::Moved(SupportLockPhase::MicroReteach)
            }
            Some(SupportLockPhase::MicroReteach) => {
                if self.reteach_index + 1 < self.reteach_frames().len() {
                    self.reteach_index += 1;
                    LockContinue::Moved(SupportLockPhase::MicroReteach)
                } else {
                    self.enter(SupportLockPhase::RepairAttempt);
                    LockContinue::Moved(SupportLockPhase::RepairAttempt)
                }
            }
            Some(SupportLockPhase::RepairAttempt) => LockContinue::AwaitingRepair,
            None => panic!("continue on an inactive support lock"),
        }
    }

    /// Close the lock after a successful repair; `used` stays set
    pub fn release(&mut self) {
        *self = SupportLockState {
            used: true,
            ..Default::default()
        };
    }

    pub fn reteach_frames(&self) -> &[Frame] {
        self.content
            .as_ref()
            .map(|c| c.reteach_frames.as_slice())
            .unwrap_or(&[])
    }

    pub fn current_reteach_frame(&self) -> Option<&Frame> {
        self.reteach_frames().get(self.reteach_index)
    }

    pub fn repair_frame(&self) -> Option<&Frame> {
        self.content.as_ref().map(|c| &c.repair_frame)
    }

    pub fn acknowledgment(&self) -> Option<&str> {
        self.content.as_ref().map(|c| c.acknowledgment.as_str())
    }

    /// The acknowledgment rendered as a frame
    pub fn acknowledgment_frame(&self) -> Option<Frame> {
        let trigger_id = self.triggered_by_frame_id.as_deref()?;
        let text = self.acknowledgment()?;
        Some(Frame {
            id: format!("{}-ack", trigger_id),
            kind: FrameKind::AceAck,
            stage: Stage::Ace,
            order: 0,
            content: FrameContent {
                body: Some(text.to_string()),
                ..Default::default()
            },
        })
    }

    /// Frame to show for the current phase
    pub fn current_frame(&self) -> Option<Frame> {
        if !self.active {
            return None;
        }
        match self.phase? {
            SupportLockPhase::Acknowledgment => self.acknowledgment_frame(),
            SupportLockPhase::MicroReteach => self.current_reteach_frame().cloned(),
            SupportLockPhase::RepairAttempt => self.repair_frame().cloned(),
        }
    }

    fn enter(&mut self, next: SupportLockPhase) {
        if let Some(current) = self.phase {
            assert!(
                next > current,
                "support lock phase moved backward from {} to {}",
                current,
                next
            );
        }
        debug!("Support lock phase -> {}", next);
        self.phase = Some(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnswerValue;

    fn trigger(explanation: Option<&str>) -> Frame {
        Frame {
            id: "q3".to_string(),
            kind: FrameKind::Mcq,
            stage: Stage::Ace,
            order: 3,
            content: FrameContent {
                question: Some("Which is larger?".to_string()),
                options: Some(vec!["A".to_string(), "B".to_string(), "C".to_string()]),
                correct_answer: Some(AnswerValue::from("C")),
                explanation: explanation.map(str::to_string),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_builder_with_explanation() {
        let content = build_support_lock(&trigger(Some("Compare the denominators.")), 0);
        assert_eq!(content.reteach_frames.len(), 2);
        assert_eq!(content.reteach_frames[0].id, "q3-reteach-1");
        assert_eq!(
            content.reteach_frames[0].content.body.as_deref(),
            Some("Compare the denominators.")
        );
        assert_eq!(content.reteach_frames[0].kind, FrameKind::AceReteach);
        assert_eq!(content.reteach_frames[1].id, "q3-reteach-2");
    }

    #[test]
    fn test_builder_without_explanation() {
        let content = build_support_lock(&trigger(None), 0);
        assert_eq!(content.reteach_frames.len(), 1);
        assert_eq!(content.reteach_frames[0].id, "q3-reteach-2");
    }

    #[test]
    fn test_repair_frame_is_derived_copy() {
        let original = trigger(None);
        let content = build_support_lock(&original, 0);
        assert_eq!(content.repair_frame.id, "q3-repair");
        assert_eq!(content.repair_frame.kind, FrameKind::Mcq);
        assert_eq!(content.repair_frame.content, original.content);
        assert_eq!(original.id, "q3");
    }

    #[test]
    fn test_acknowledgment_rotates() {
        let frame = trigger(None);
        let n = ACKNOWLEDGMENT_PHRASES.len();
        assert_eq!(build_support_lock(&frame, 1).acknowledgment, ACKNOWLEDGMENT_PHRASES[1]);
        assert_eq!(build_support_lock(&frame, n + 2).acknowledgment, ACKNOWLEDGMENT_PHRASES[2]);
    }

    #[test]
    fn test_learner_wording_is_gentle() {
        let forbidden = ["wrong", "incorrect", "fail", "mistake", "error", "bad"];
        let texts = ACKNOWLEDGMENT_PHRASES
            .iter()
            .chain([BRIDGE_TEXT, RETEACH_TITLE, BRIDGE_TITLE].iter());
        for text in texts {
            let lower = text.to_lowercase();
            for word in forbidden {
                assert!(!lower.contains(word), "'{}' contains '{}'", text, word);
            }
        }
    }

    #[test]
    fn test_phase_flow() {
        let mut state = SupportLockState::default();
        state.engage("q3", build_support_lock(&trigger(Some("x")), 0));
        assert!(state.active && state.used);
        assert_eq!(state.phase, Some(SupportLockPhase::Acknowledgment));
        assert_eq!(state.current_frame().map(|f| f.kind), Some(FrameKind::AceAck));

        assert_eq!(state.continue_action(), LockContinue::Moved(SupportLockPhase::MicroReteach));
        assert_eq!(state.current_frame().map(|f| f.id), Some("q3-reteach-1".to_string()));
        assert_eq!(state.continue_action(), LockContinue::Moved(SupportLockPhase::MicroReteach));
        assert_eq!(state.reteach_index, 1);
        assert_eq!(state.continue_action(), LockContinue::Moved(SupportLockPhase::RepairAttempt));
        assert_eq!(state.current_frame().map(|f| f.id), Some("q3-repair".to_string()));
        assert_eq!(state.continue_action(), LockContinue::AwaitingRepair);

        state.release();
        assert!(!state.active);
        assert!(state.used);
        assert!(state.content.is_none());
        assert!(state.current_frame().is_none());
    }

    #[test]
    #[should_panic(expected = "engaged twice")]
    fn test_engage_twice_panics() {
        let mut state = SupportLockState::default();
        state.engage("q3", build_support_lock(&trigger(None), 0));
        state.release();
        state.engage("q4", build_support_lock(&trigger(None), 0));
    }
}

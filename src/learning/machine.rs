//! Progression state machine
//!
//! Drives one learner through Foundation, Concept, Assessment and Exit for a
//! single node, opening the Support Lock when Assessment answers show a gap.
//!
//! A [`Session`] is owned by the caller. Every transition runs to completion
//! before returning, and each returns a [`Step`] describing what changed or a
//! [`Refusal`] when the action is not available. Two terminal states exist:
//! normal completion after the last Exit frame, and early exit after a missed
//! repair attempt. Both produce exactly one [`FinishedSession`].

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::detector::would_trigger;
use super::ledger::{Response, ResponseLedger};
use super::summary::{FinishedSession, SessionMeta, SessionSummarizer, Termination};
use super::support_lock::{build_support_lock, LockContinue, SupportLockPhase, SupportLockState};
use crate::config::SessionConfig;
use crate::error::{EngineError, Refusal};
use crate::hooks::{HookContext, HookPoint, HookRegistry};
use crate::node::{Frame, FrameStore, Node};
use crate::types::{AnswerValue, CorrectionPreference, Stage};

/// Position in the main progression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub stage: Stage,
    pub frame_index: usize,
}

/// Result of recording an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub frame_id: String,
    pub is_correct: bool,
    pub attempt_count: u32,
    /// Answerable frames show their result after an answer
    pub show_result: bool,
    /// This answer opened the Support Lock
    pub support_lock_engaged: bool,
}

/// What a transition did
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The main cursor moved
    Moved(Cursor),
    Answered(AnswerOutcome),
    /// The Support Lock is now in this phase
    SupportLock(SupportLockPhase),
    /// Nothing to do (going back from the very first frame)
    Unchanged,
    Finished(FinishedSession),
}

/// One learner's pass through one node
pub struct Session {
    id: String,
    store: FrameStore,
    ledger: ResponseLedger,
    support_lock: SupportLockState,
    cursor: Cursor,
    config: SessionConfig,
    started_at: DateTime<Utc>,
    finished: Option<FinishedSession>,
    hooks: HookRegistry,
}

impl Session {
    /// Start a session with default settings
    pub fn new(node: Node) -> Result<Self, EngineError> {
        Self::with_config(node, SessionConfig::default())
    }

    /// Start a session at the first frame of the first stage that has frames
    pub fn with_config(node: Node, config: SessionConfig) -> Result<Self, EngineError> {
        node.validate()?;
        let store = FrameStore::new(node);
        let stage = store
            .next_populated(Stage::Foundation)
            .ok_or_else(|| EngineError::EmptyNode(store.node().id.clone()))?;

        let session = Self {
            id: uuid::Uuid::new_v4().to_string(),
            store,
            ledger: ResponseLedger::new(),
            support_lock: SupportLockState::default(),
            cursor: Cursor { stage, frame_index: 0 },
            config,
            started_at: Utc::now(),
            finished: None,
            hooks: HookRegistry::new(),
        };

        info!(
            "Session {} started on node '{}' at {}",
            session.id,
            session.store.node().id,
            stage
        );
        Ok(session)
    }

    /// Register hooks before the first transition, then call this to announce the start
    pub fn announce_start(&self) {
        let ctx = self
            .hook_context(HookPoint::OnSessionStart)
            .with_data("node_id", serde_json::json!(self.store.node().id))
            .with_data("stage", serde_json::json!(self.cursor.stage));
        self.hooks.fire(&ctx);
    }

    // ----- transitions -----

    /// Record an answer for the current frame.
    ///
    /// While the Support Lock is active this routes to the repair attempt.
    pub fn answer(&mut self, value: AnswerValue) -> Result<Step, Refusal> {
        self.ensure_running()?;
        if self.support_lock.active {
            return self.answer_repair(value);
        }

        let frame = self.current_frame().cloned().ok_or(Refusal::NoCurrentFrame)?;
        let is_correct = frame.evaluate(&value);
        let response = Response {
            frame_id: frame.id.clone(),
            stage: frame.stage,
            user_answer: value,
            is_correct,
            attempt_count: self.ledger.next_attempt(&frame.id),
            timestamp: Utc::now(),
        };

        let trigger = would_trigger(&self.ledger, &frame, &response, self.support_lock.used);
        let attempt_count = response.attempt_count;
        self.ledger.record(response);

        debug!(
            "Answer on {} (attempt {}): correct={}",
            frame.id, attempt_count, is_correct
        );
        let ctx = self
            .hook_context(HookPoint::OnAnswerRecorded)
            .with_data("frame_id", serde_json::json!(frame.id))
            .with_data("is_correct", serde_json::json!(is_correct))
            .with_data("attempt_count", serde_json::json!(attempt_count));
        self.hooks.fire(&ctx);

        if trigger {
            self.engage_support_lock(&frame);
        }

        let show_result = frame.requires_answer();
        Ok(Step::Answered(AnswerOutcome {
            frame_id: frame.id,
            is_correct,
            attempt_count,
            show_result,
            support_lock_engaged: trigger,
        }))
    }

    /// Continue / Complete.
    ///
    /// While the Support Lock is active this routes to the lock's continue.
    pub fn advance(&mut self) -> Result<Step, Refusal> {
        self.ensure_running()?;
        if self.support_lock.active {
            return self.continue_support_lock();
        }

        let frame = self.current_frame().ok_or(Refusal::NoCurrentFrame)?;
        if frame.requires_answer() && self.ledger.get(&frame.id).is_none() {
            debug!("Advance refused: {} needs an answer", frame.id);
            return Err(Refusal::AnswerRequired {
                frame_id: frame.id.clone(),
            });
        }

        Ok(self.step_forward())
    }

    /// Step back one frame. Recorded answers stay in place.
    pub fn go_back(&mut self) -> Result<Step, Refusal> {
        self.ensure_running()?;
        if self.support_lock.active {
            return Ok(Step::Unchanged);
        }

        if self.cursor.frame_index > 0 {
            self.cursor.frame_index -= 1;
            debug!("Back to {} frame {}", self.cursor.stage, self.cursor.frame_index);
            return Ok(Step::Moved(self.cursor));
        }

        let previous = self
            .cursor
            .stage
            .previous()
            .and_then(|stage| self.store.previous_populated(stage));
        match previous {
            Some(stage) => {
                self.cursor = Cursor {
                    stage,
                    frame_index: self.store.stage_len(stage) - 1,
                };
                info!("Back to stage {}", stage);
                Ok(Step::Moved(self.cursor))
            }
            None => Ok(Step::Unchanged),
        }
    }

    /// Continue inside the Support Lock
    pub fn continue_support_lock(&mut self) -> Result<Step, Refusal> {
        self.ensure_running()?;
        if !self.support_lock.active {
            return Err(Refusal::SupportLockInactive);
        }

        match self.support_lock.continue_action() {
            LockContinue::Moved(phase) => {
                let ctx = self
                    .hook_context(HookPoint::OnSupportLockPhase)
                    .with_data("phase", serde_json::json!(phase))
                    .with_data("reteach_index", serde_json::json!(self.support_lock.reteach_index));
                self.hooks.fire(&ctx);
                Ok(Step::SupportLock(phase))
            }
            LockContinue::AwaitingRepair => Err(Refusal::AnswerRequired {
                frame_id: self
                    .support_lock
                    .repair_frame()
                    .map(|f| f.id.clone())
                    .unwrap_or_default(),
            }),
        }
    }

    /// Answer the repair question.
    ///
    /// The repair response is checked on its own and never enters the ledger.
    /// A correct answer resumes silently past the trigger frame; a miss ends
    /// the session early.
    pub fn answer_repair(&mut self, value: AnswerValue) -> Result<Step, Refusal> {
        self.ensure_running()?;
        if !self.support_lock.active {
            return Err(Refusal::SupportLockInactive);
        }
        if self.support_lock.phase != Some(SupportLockPhase::RepairAttempt) {
            return Err(Refusal::NoAnswerExpected);
        }

        let repair_correct = self
            .support_lock
            .repair_frame()
            .map(|frame| frame.evaluate(&value))
            .unwrap_or(false);
        self.support_lock.repair_correct = Some(repair_correct);
        debug!("Repair attempt: correct={}", repair_correct);

        if repair_correct {
            let trigger = self.support_lock.triggered_by_frame_id.clone();
            self.support_lock.release();
            info!("Support lock released after repair of {:?}", trigger);
            let ctx = self
                .hook_context(HookPoint::OnSilentUnlock)
                .with_data("trigger_frame_id", serde_json::json!(trigger));
            self.hooks.fire(&ctx);
            Ok(self.step_forward())
        } else {
            info!(
                "Repair missed; leaving assessment early at frame {}",
                self.cursor.frame_index
            );
            Ok(self.finish(Termination::EarlyExit {
                frame_index: self.cursor.frame_index,
            }))
        }
    }

    /// Pause request from the host UI. Notifies hooks only.
    pub fn pause(&self) {
        debug!("Pause requested for session {}", self.id);
        let ctx = self
            .hook_context(HookPoint::OnPause)
            .with_data("stage", serde_json::json!(self.cursor.stage))
            .with_data("frame_index", serde_json::json!(self.cursor.frame_index));
        self.hooks.fire(&ctx);
    }

    // ----- queries -----

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn node(&self) -> &Node {
        self.store.node()
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn ledger(&self) -> &ResponseLedger {
        &self.ledger
    }

    pub fn support_lock(&self) -> &SupportLockState {
        &self.support_lock
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn correction_preference(&self) -> CorrectionPreference {
        self.config.correction_preference
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    pub fn finished(&self) -> Option<&FinishedSession> {
        self.finished.as_ref()
    }

    /// The main-progression frame under the cursor; `None` once finished
    pub fn current_frame(&self) -> Option<&Frame> {
        if self.is_finished() {
            return None;
        }
        self.store.frame_at(self.cursor.stage, self.cursor.frame_index)
    }

    /// The frame the learner sees: the lock's frame while it is active
    pub fn visible_frame(&self) -> Option<Frame> {
        if self.is_finished() {
            return None;
        }
        if self.support_lock.active {
            return self.support_lock.current_frame();
        }
        self.current_frame().cloned()
    }

    pub fn can_advance(&self) -> bool {
        if self.is_finished() {
            return false;
        }
        if self.support_lock.active {
            return self.support_lock.phase != Some(SupportLockPhase::RepairAttempt);
        }
        match self.current_frame() {
            Some(frame) => !frame.requires_answer() || self.ledger.get(&frame.id).is_some(),
            None => false,
        }
    }

    pub fn can_go_back(&self) -> bool {
        if self.is_finished() || self.support_lock.active {
            return false;
        }
        self.cursor.frame_index > 0
            || self
                .cursor
                .stage
                .previous()
                .and_then(|stage| self.store.previous_populated(stage))
                .is_some()
    }

    pub fn can_answer(&self) -> bool {
        if self.is_finished() {
            return false;
        }
        if self.support_lock.active {
            return self.support_lock.phase == Some(SupportLockPhase::RepairAttempt);
        }
        self.current_frame().is_some()
    }

    /// Register observers for session events
    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    // ----- internals -----

    fn ensure_running(&self) -> Result<(), Refusal> {
        if self.is_finished() {
            debug!("Action refused: session {} already finished", self.id);
            return Err(Refusal::SessionFinished);
        }
        Ok(())
    }

    /// Move forward one frame with no answer guard
    fn step_forward(&mut self) -> Step {
        if self.cursor.frame_index + 1 < self.store.stage_len(self.cursor.stage) {
            self.cursor.frame_index += 1;
            debug!("Forward to {} frame {}", self.cursor.stage, self.cursor.frame_index);
            return Step::Moved(self.cursor);
        }

        let next = self
            .cursor
            .stage
            .next()
            .and_then(|stage| self.store.next_populated(stage));
        match next {
            Some(stage) => {
                self.cursor = Cursor { stage, frame_index: 0 };
                info!("Entering stage {}", stage);
                Step::Moved(self.cursor)
            }
            None => self.finish(Termination::Completed),
        }
    }

    fn engage_support_lock(&mut self, trigger: &Frame) {
        let acknowledgment_index = self
            .config
            .acknowledgment_index
            .unwrap_or_else(|| self.ledger.len());
        let content = build_support_lock(trigger, acknowledgment_index);
        self.support_lock.engage(&trigger.id, content);

        info!("Support lock opened by {}", trigger.id);
        let ctx = self
            .hook_context(HookPoint::OnSupportLockEnter)
            .with_data("trigger_frame_id", serde_json::json!(trigger.id))
            .with_data(
                "reteach_frames",
                serde_json::json!(self.support_lock.reteach_frames().len()),
            );
        self.hooks.fire(&ctx);
    }

    fn finish(&mut self, termination: Termination) -> Step {
        let node_id = self.store.node().id.clone();
        let finished = SessionSummarizer::summarize(
            SessionMeta {
                session_id: &self.id,
                node_id: &node_id,
                started_at: self.started_at,
            },
            &self.ledger,
            termination,
            self.cursor.frame_index,
        );
        self.finished = Some(finished.clone());

        let record = serde_json::to_value(&finished).unwrap_or(serde_json::Value::Null);
        let ctx = self
            .hook_context(HookPoint::OnSessionEnd)
            .with_data("finished_session", record);
        self.hooks.fire(&ctx);

        Step::Finished(finished)
    }

    fn hook_context(&self, point: HookPoint) -> HookContext {
        HookContext::new(point, &self.id)
    }
}

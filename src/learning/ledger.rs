//! Response Ledger - one current response per frame for a single session
//!
//! Upserts by frame id and keeps first-answered order. Attempt counts are
//! stored as given; the caller computes them with [`ResponseLedger::next_attempt`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{AnswerValue, Stage};

/// A learner's latest answer to one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Weak reference into the frame store
    pub frame_id: String,
    /// Stage of the frame when answered
    pub stage: Stage,
    pub user_answer: AnswerValue,
    pub is_correct: bool,
    pub attempt_count: u32,
    pub timestamp: DateTime<Utc>,
}

/// Session-owned record of responses
#[derive(Debug, Clone, Default)]
pub struct ResponseLedger {
    entries: Vec<Response>,
}

impl ResponseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the response for its frame
    pub fn record(&mut self, response: Response) {
        match self.position(&response.frame_id) {
            Some(position) => {
                let existing = &self.entries[position];
                assert!(
                    response.attempt_count >= existing.attempt_count,
                    "attempt count for frame '{}' went from {} to {}",
                    response.frame_id,
                    existing.attempt_count,
                    response.attempt_count
                );
                debug!(
                    "Ledger update: {} attempt {} correct={}",
                    response.frame_id, response.attempt_count, response.is_correct
                );
                self.entries[position] = response;
            }
            None => {
                debug!(
                    "Ledger insert: {} correct={}",
                    response.frame_id, response.is_correct
                );
                self.entries.push(response);
            }
        }
    }

    pub fn get(&self, frame_id: &str) -> Option<&Response> {
        self.entries.iter().find(|r| r.frame_id == frame_id)
    }

    /// Attempt number the next answer to `frame_id` should carry
    pub fn next_attempt(&self, frame_id: &str) -> u32 {
        self.get(frame_id).map(|r| r.attempt_count).unwrap_or(0) + 1
    }

    /// Count committed responses matching `predicate`
    pub fn count_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&Response) -> bool,
    {
        self.entries.iter().filter(|r| predicate(r)).count()
    }

    /// Count as if `pending` were already recorded, without recording it
    pub fn count_where_with<P>(&self, pending: &Response, predicate: P) -> usize
    where
        P: Fn(&Response) -> bool,
    {
        let committed = self
            .entries
            .iter()
            .filter(|r| r.frame_id != pending.frame_id)
            .filter(|r| predicate(r))
            .count();
        committed + usize::from(predicate(pending))
    }

    pub fn correct_count(&self) -> usize {
        self.count_where(|r| r.is_correct)
    }

    pub fn incorrect_count(&self) -> usize {
        self.count_where(|r| !r.is_correct)
    }

    pub fn responses(&self) -> &[Response] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, frame_id: &str) -> Option<usize> {
        self.entries.iter().position(|r| r.frame_id == frame_id)
    }
}

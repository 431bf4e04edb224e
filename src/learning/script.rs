//! Scripted replay of learner actions
//!
//! A script is a JSON list of actions applied to a session in order, used for
//! non-interactive runs and end-to-end checks.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::machine::{Session, Step};
use super::summary::FinishedSession;
use crate::error::Refusal;
use crate::types::AnswerValue;

/// One learner action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    Answer { value: AnswerValue },
    Continue,
    Back,
    Pause,
}

/// A script stopped on an action the session refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("action {index} ({action}) was refused: {refusal}")]
pub struct ScriptRefused {
    pub index: usize,
    pub action: String,
    pub refusal: Refusal,
}

/// Load a script file
pub fn load_script(path: &Path) -> Result<Vec<Action>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let actions: Vec<Action> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse script {}", path.display()))?;
    Ok(actions)
}

/// Apply one action
pub fn apply(session: &mut Session, action: &Action) -> std::result::Result<Option<Step>, Refusal> {
    match action {
        Action::Answer { value } => session.answer(value.clone()).map(Some),
        Action::Continue => session.advance().map(Some),
        Action::Back => session.go_back().map(Some),
        Action::Pause => {
            session.pause();
            Ok(None)
        }
    }
}

/// Run actions until they run out or the session finishes.
///
/// Returns the finished record if the script reached a terminal state.
pub fn run_script(
    session: &mut Session,
    actions: &[Action],
) -> std::result::Result<Option<FinishedSession>, ScriptRefused> {
    for (index, action) in actions.iter().enumerate() {
        match apply(session, action) {
            Ok(Some(Step::Finished(finished))) => {
                debug!("Script finished the session at action {}", index);
                return Ok(Some(finished));
            }
            Ok(_) => {}
            Err(refusal) => {
                return Err(ScriptRefused {
                    index,
                    action: describe(action),
                    refusal,
                })
            }
        }
    }
    Ok(session.finished().cloned())
}

fn describe(action: &Action) -> String {
    match action {
        Action::Answer { value } => format!("answer {}", value),
        Action::Continue => "continue".to_string(),
        Action::Back => "back".to_string(),
        Action::Pause => "pause".to_string(),
    }
}

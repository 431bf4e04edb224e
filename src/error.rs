//! Error types for node loading and session guards

use thiserror::Error;

/// Errors raised while building a node or a session from authored data
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("node '{0}' has no frames")]
    EmptyNode(String),

    #[error("frame id '{0}' appears more than once")]
    DuplicateFrameId(String),

    #[error("frame '{frame_id}' uses kind '{kind}', which only the Support Lock may create")]
    ReservedFrameKind { frame_id: String, kind: String },

    #[error("failed to parse node document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A transition the session declined to perform.
///
/// These come from ordinary UI flow (a disabled button, a late click) and
/// never change session state. Each one can be checked before calling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Refusal {
    #[error("answer to continue (frame '{frame_id}')")]
    AnswerRequired { frame_id: String },

    #[error("there is no current frame")]
    NoCurrentFrame,

    #[error("the session has already finished")]
    SessionFinished,

    #[error("no answer is expected right now")]
    NoAnswerExpected,

    #[error("the support lock is not active")]
    SupportLockInactive,
}

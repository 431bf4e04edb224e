//! Learn Engine - Adaptive micro-lesson progression
//!
//! Plays a learning node through four fixed stages:
//! - Foundation and Concept frames introduce and explain the skill
//! - A.C.E (Assessment) frames check understanding and can open the Support Lock
//! - Exit frames close the node
//!
//! Two wrong Assessment answers open a one-time Support Lock: a gentle
//! acknowledgment, a short reteach and one repair attempt. A correct repair
//! resumes the node silently; a wrong one ends the session early.
//!
//! # Example
//!
//! ```ignore
//! use learn_engine::{AnswerValue, Node, Session};
//!
//! let node = Node::from_file("fractions.json".as_ref())?;
//! let mut session = Session::new(node)?;
//! session.advance()?;
//! session.answer(AnswerValue::Index(1))?;
//! ```

pub mod types;
pub mod error;
pub mod node;
pub mod learning; // Ledger, Support Lock, state machine, summaries
pub mod hooks;    // Lifecycle hook system
pub mod config;
pub mod cli;

// Re-export commonly used types for convenience
pub use types::{AnswerValue, CorrectionPreference, Stage};
pub use error::{EngineError, Refusal};
pub use node::{Frame, FrameKind, Node};
pub use learning::{FinishedSession, Presentation, Session, Step};
pub use config::EngineConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Adaptive micro-lesson engine", NAME, VERSION)
}

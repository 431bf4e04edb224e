//! Adaptive progression engine
//!
//! Records answers, runs the four-stage state machine, opens the Support
//! Lock when Assessment answers show a gap, and summarizes the session.

pub mod ledger;
pub mod detector;
pub mod support_lock;
pub mod summary;
pub mod machine;
pub mod presentation;
pub mod script;

pub use ledger::{Response, ResponseLedger};
pub use detector::{would_trigger, REMEDIATION_THRESHOLD};
pub use support_lock::{build_support_lock, SupportLockContent, SupportLockPhase, SupportLockState};
pub use summary::{FinishedSession, SessionSummarizer, Termination};
pub use machine::{AnswerOutcome, Cursor, Session, Step};
pub use presentation::Presentation;
pub use script::{run_script, Action};

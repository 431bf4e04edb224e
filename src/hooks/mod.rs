//! Lifecycle Hook System - observers at key session events
//!
//! Lets the host react to session start, recorded answers, the Support Lock,
//! pause requests and completion without reaching into the state machine.
//! Hooks are registered with priorities and fire in order. They observe only:
//! nothing a hook returns changes a transition.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Points in the session where hooks can fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    OnSessionStart,
    OnAnswerRecorded,
    OnSupportLockEnter,
    OnSupportLockPhase,
    OnSilentUnlock,
    OnPause,
    /// Fires exactly once, carrying the finished-session record
    OnSessionEnd,
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookPoint::OnSessionStart => write!(f, "on_session_start"),
            HookPoint::OnAnswerRecorded => write!(f, "on_answer_recorded"),
            HookPoint::OnSupportLockEnter => write!(f, "on_support_lock_enter"),
            HookPoint::OnSupportLockPhase => write!(f, "on_support_lock_phase"),
            HookPoint::OnSilentUnlock => write!(f, "on_silent_unlock"),
            HookPoint::OnPause => write!(f, "on_pause"),
            HookPoint::OnSessionEnd => write!(f, "on_session_end"),
        }
    }
}

/// Context passed to hook handlers
#[derive(Debug, Clone)]
pub struct HookContext {
    pub hook_point: HookPoint,
    pub data: HashMap<String, serde_json::Value>,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

impl HookContext {
    pub fn new(hook_point: HookPoint, session_id: &str) -> Self {
        Self {
            hook_point,
            data: HashMap::new(),
            session_id: session_id.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }
}

/// What a hook reports back
#[derive(Debug, Clone)]
pub enum HookAction {
    Continue,
    /// Log a message through the host's subscriber
    Log(String),
}

/// Type alias for hook handler functions
pub type HookFn = Arc<dyn Fn(&HookContext) -> Result<Option<HookAction>> + Send + Sync>;

struct RegisteredHook {
    name: String,
    priority: i32,
    handler: HookFn,
}

/// Per-session hook registry
pub struct HookRegistry {
    hooks: HashMap<HookPoint, Vec<RegisteredHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    /// Register a hook at a specific point
    pub fn register(&mut self, point: HookPoint, name: &str, priority: i32, handler: HookFn) {
        let hooks = self.hooks.entry(point).or_default();
        hooks.push(RegisteredHook {
            name: name.to_string(),
            priority,
            handler,
        });
        // Lower priority fires first; stable for equal priorities
        hooks.sort_by_key(|h| h.priority);

        debug!("Registered hook '{}' at {} with priority {}", name, point, priority);
    }

    /// Unregister a hook by name
    pub fn unregister(&mut self, point: HookPoint, name: &str) -> bool {
        match self.hooks.get_mut(&point) {
            Some(hooks) => {
                let before = hooks.len();
                hooks.retain(|h| h.name != name);
                let removed = hooks.len() < before;
                if removed {
                    debug!("Unregistered hook '{}' from {}", name, point);
                }
                removed
            }
            None => false,
        }
    }

    /// Fire all hooks for a point. Handler errors are logged and skipped.
    pub fn fire(&self, context: &HookContext) -> Vec<HookAction> {
        let point = context.hook_point;
        let mut actions = Vec::new();

        if let Some(hooks) = self.hooks.get(&point) {
            for hook in hooks {
                match (hook.handler)(context) {
                    Ok(Some(action)) => {
                        debug!("Hook '{}' at {} returned {:?}", hook.name, point, action);
                        actions.push(action);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Hook '{}' at {} failed: {}", hook.name, point, e);
                    }
                }
            }
        }

        process_log_actions(&actions);
        actions
    }

    pub fn has_hooks(&self, point: HookPoint) -> bool {
        self.hooks.get(&point).map(|h| !h.is_empty()).unwrap_or(false)
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.values().map(|v| v.len()).sum()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.hook_count())
            .finish()
    }
}

/// Process log actions
pub fn process_log_actions(actions: &[HookAction]) {
    for action in actions {
        if let HookAction::Log(msg) = action {
            info!("[Hook] {}", msg);
        }
    }
}

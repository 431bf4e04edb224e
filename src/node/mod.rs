//! Nodes: one atomic skill's authored frames
//!
//! A node is loaded once, validated, and never mutated afterwards.

pub mod frame;
pub mod store;

pub use frame::{AnswerableFrame, ContentFrame, Frame, FrameContent, FrameKind, FrameView};
pub use store::FrameStore;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::error::EngineError;

/// One atomic learning skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub skill_goal: String,
    /// Suggested Foundation duration for the surrounding UI; not enforced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foundation_max_duration_seconds: Option<u32>,
    pub frames: Vec<Frame>,
}

impl Node {
    /// Parse and validate a node document
    pub fn from_json_str(json: &str) -> std::result::Result<Self, EngineError> {
        let node: Node = serde_json::from_str(json)?;
        node.validate()?;
        Ok(node)
    }

    /// Load and validate a node document from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read node file {}", path.display()))?;
        let node = Self::from_json_str(&contents)
            .with_context(|| format!("Invalid node file {}", path.display()))?;
        debug!("Loaded node '{}' with {} frames", node.id, node.frames.len());
        Ok(node)
    }

    /// Check the authored data can drive a session
    pub fn validate(&self) -> std::result::Result<(), EngineError> {
        if self.frames.is_empty() {
            return Err(EngineError::EmptyNode(self.id.clone()));
        }

        let mut seen = HashSet::new();
        for frame in &self.frames {
            if !seen.insert(frame.id.as_str()) {
                return Err(EngineError::DuplicateFrameId(frame.id.clone()));
            }
            if frame.kind.is_support_lock_only() {
                return Err(EngineError::ReservedFrameKind {
                    frame_id: frame.id.clone(),
                    kind: frame.kind.to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn frame(&self, id: &str) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stage;

    const NODE_JSON: &str = r#"{
        "id": "frac-compare",
        "skillGoal": "Compare two fractions",
        "foundationMaxDurationSeconds": 90,
        "frames": [
            { "id": "f1", "type": "what", "stage": "foundation", "order": 1, "title": "Fractions" },
            { "id": "q1", "type": "mcq", "stage": "ace", "order": 1,
              "question": "Larger?", "options": ["1/2", "1/3"], "correctAnswer": 0 }
        ]
    }"#;

    #[test]
    fn test_parse_node() {
        let node = Node::from_json_str(NODE_JSON).unwrap();
        assert_eq!(node.skill_goal, "Compare two fractions");
        assert_eq!(node.foundation_max_duration_seconds, Some(90));
        assert_eq!(node.total_frames(), 2);
        assert_eq!(node.frame("q1").map(|f| f.stage), Some(Stage::Ace));
    }

    #[test]
    fn test_rejects_empty_node() {
        let err = Node::from_json_str(r#"{"id":"n","skillGoal":"g","frames":[]}"#).unwrap_err();
        assert!(matches!(err, EngineError::EmptyNode(_)));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"{"id":"n","skillGoal":"g","frames":[
            {"id":"a","type":"what","stage":"foundation"},
            {"id":"a","type":"what","stage":"concept"}]}"#;
        let err = Node::from_json_str(json).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateFrameId(id) if id == "a"));
    }

    #[test]
    fn test_rejects_support_lock_kinds() {
        let json = r#"{"id":"n","skillGoal":"g","frames":[
            {"id":"a","type":"ace-ack","stage":"ace"}]}"#;
        let err = Node::from_json_str(json).unwrap_err();
        assert!(matches!(err, EngineError::ReservedFrameKind { .. }));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.json");
        std::fs::write(&path, NODE_JSON).unwrap();
        let node = Node::from_file(&path).unwrap();
        assert_eq!(node.id, "frac-compare");

        assert!(Node::from_file(&dir.path().join("missing.json")).is_err());
    }
}

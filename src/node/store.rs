//! Frame store: a node's frames partitioned by stage
//!
//! Buckets keep the authored array order. The store is read-only.

use super::{Frame, Node};
use crate::types::Stage;

/// Stage-partitioned, immutable view over a node's frames
#[derive(Debug, Clone)]
pub struct FrameStore {
    node: Node,
    /// Indices into `node.frames`, one bucket per stage
    buckets: [Vec<usize>; 4],
}

impl FrameStore {
    pub fn new(node: Node) -> Self {
        let mut buckets: [Vec<usize>; 4] = Default::default();
        for (position, frame) in node.frames.iter().enumerate() {
            buckets[frame.stage.index()].push(position);
        }
        Self { node, buckets }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Frames of one stage in authored order
    pub fn frames_for_stage(&self, stage: Stage) -> impl Iterator<Item = &Frame> + '_ {
        self.buckets[stage.index()]
            .iter()
            .map(move |&position| self.checked(stage, position))
    }

    /// `None` means the stage is exhausted at `index`
    pub fn frame_at(&self, stage: Stage, index: usize) -> Option<&Frame> {
        self.buckets[stage.index()]
            .get(index)
            .map(|&position| self.checked(stage, position))
    }

    pub fn stage_len(&self, stage: Stage) -> usize {
        self.buckets[stage.index()].len()
    }

    pub fn total_frames(&self) -> usize {
        self.node.frames.len()
    }

    /// First stage at or after `from` that has frames
    pub fn next_populated(&self, from: Stage) -> Option<Stage> {
        Stage::ALL[from.index()..]
            .iter()
            .copied()
            .find(|&stage| self.stage_len(stage) > 0)
    }

    /// Last stage at or before `from` that has frames
    pub fn previous_populated(&self, from: Stage) -> Option<Stage> {
        Stage::ALL[..=from.index()]
            .iter()
            .rev()
            .copied()
            .find(|&stage| self.stage_len(stage) > 0)
    }

    fn checked(&self, stage: Stage, position: usize) -> &Frame {
        let frame = &self.node.frames[position];
        assert_eq!(
            frame.stage, stage,
            "frame '{}' is in the {} bucket but declares stage {}",
            frame.id, stage, frame.stage
        );
        frame
    }
}

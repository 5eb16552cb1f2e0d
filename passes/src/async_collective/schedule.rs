//! Sequence splicing for scheduled computations.

use std::collections::HashMap;

use tessera_ir::NodeId;

/// Nodes that took the place of one rewritten collective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplacedAsync {
    pub start: NodeId,
    /// Node that replaced the collective in the graph.
    pub done: NodeId,
    /// Send completion marker of a permute tracked in two halves.
    pub send_done: Option<NodeId>,
}

impl ReplacedAsync {
    pub fn new(start: NodeId, done: NodeId) -> Self {
        Self { start, done, send_done: None }
    }

    /// Nodes in schedule order.
    pub fn sequence(&self) -> impl Iterator<Item = NodeId> {
        [self.start, self.done].into_iter().chain(self.send_done)
    }
}

/// Copy `sequence`, emitting each rewritten node's replacements in its place.
pub(crate) fn splice_sequence(sequence: &[NodeId], replaced: &HashMap<NodeId, ReplacedAsync>) -> Vec<NodeId> {
    let extra: usize = replaced.values().map(|pair| pair.sequence().count() - 1).sum();
    let mut spliced = Vec::with_capacity(sequence.len() + extra);
    for id in sequence {
        match replaced.get(id) {
            Some(pair) => spliced.extend(pair.sequence()),
            None => spliced.push(*id),
        }
    }
    spliced
}

//! Candidate selection.

use tessera_ir::{Computation, NodeId};

use super::config::{AsyncCollectiveConfig, CollectiveKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub id: NodeId,
    pub kind: CollectiveKind,
}

/// Collectives of `computation` accepted by their family predicate, in iteration order.
///
/// The result is a snapshot: nodes added while rewriting are never candidates.
pub(crate) fn select_candidates(computation: &Computation, config: &AsyncCollectiveConfig) -> Vec<Candidate> {
    computation
        .nodes()
        .filter_map(|(id, node)| {
            let kind = config.should_convert(node);
            if kind.is_none() && node.op().is_sync_collective() {
                tracing::trace!(node = node.name(), opcode = %node.opcode(), "collective rejected by predicate");
            }
            kind.map(|kind| Candidate { id, kind })
        })
        .collect()
}

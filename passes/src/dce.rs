//! Dead code elimination.
//!
//! A node is dead when nothing consumes it and removing it is unobservable:
//! it is not the root, not a parameter, has no side effect and no control
//! successors. Removal cascades to operands that become dead. Scheduled
//! computations drop removed nodes from their sequence.

use std::collections::HashSet;

use snafu::ResultExt;
use tessera_ir::{Computation, ComputationId, ExecutionThreads, Node, NodeId, Op, Program};

use crate::error::*;
use crate::pass::ModulePass;

#[derive(Debug, Clone, Copy, Default)]
pub struct DeadCodeElimination;

impl DeadCodeElimination {
    /// Remove dead nodes from one computation. Returns the removed handles.
    pub fn run_on_computation(&self, computation: &mut Computation) -> Result<Vec<NodeId>> {
        let mut removed = Vec::new();
        // Consumers come before producers, so one sweep sees every cascade.
        for id in computation.post_order().into_iter().rev() {
            let Ok(node) = computation.node(id) else { continue };
            if computation.root() == Some(id) || !is_removable(node) {
                continue;
            }
            tracing::trace!(computation = computation.name(), node = node.name(), "removing dead node");
            computation.remove_node(id).context(IrSnafu { context: format!("removing dead node {id}") })?;
            removed.push(id);
        }
        Ok(removed)
    }

    fn run_on(&self, program: &mut Program, id: ComputationId) -> Result<bool> {
        let computation =
            program.computation_mut(id).context(IrSnafu { context: format!("eliminating dead code in {id}") })?;
        let removed = self.run_on_computation(computation)?;
        if removed.is_empty() {
            return Ok(false);
        }
        tracing::debug!(computation = computation.name(), removed = removed.len(), "eliminated dead nodes");

        if let Some(schedule) = program.schedule_mut()
            && let Some(sequence) = schedule.sequence(id)
        {
            let removed: HashSet<NodeId> = removed.into_iter().collect();
            let kept = sequence.iter().copied().filter(|node| !removed.contains(node)).collect();
            schedule.set_sequence(id, kept);
        }
        Ok(true)
    }
}

fn is_removable(node: &Node) -> bool {
    node.users().is_empty()
        && !node.has_side_effect()
        && node.control_successors().is_empty()
        && !matches!(node.op(), Op::Parameter { .. })
}

impl ModulePass for DeadCodeElimination {
    fn name(&self) -> &str {
        "dce"
    }

    #[tracing::instrument(skip_all, fields(program = program.name()))]
    fn run(&self, program: &mut Program, threads: &ExecutionThreads) -> Result<bool> {
        let mut changed = false;
        for id in program.nonfusion_computations(threads) {
            changed |= self.run_on(program, id)?;
        }
        Ok(changed)
    }
}

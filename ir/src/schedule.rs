//! Explicit per-computation execution order.
//!
//! A [`Schedule`] maps computations to a total order over their live nodes.
//! Unscheduled computations are simply absent. Passes that add or remove
//! nodes in a scheduled computation must update its sequence so that
//! [`Schedule::verify`] keeps holding.

use std::collections::{BTreeMap, HashMap, HashSet};

use snafu::ensure;

use crate::error::*;
use crate::program::Program;
use crate::types::{ComputationId, NodeId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    sequences: BTreeMap<ComputationId, Vec<NodeId>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule every computation of `program` in post order.
    pub fn post_order(program: &Program) -> Self {
        let sequences = program.computations().map(|(id, computation)| (id, computation.post_order())).collect();
        Self { sequences }
    }

    pub fn is_computation_scheduled(&self, id: ComputationId) -> bool {
        self.sequences.contains_key(&id)
    }

    pub fn sequence(&self, id: ComputationId) -> Option<&[NodeId]> {
        self.sequences.get(&id).map(Vec::as_slice)
    }

    pub fn set_sequence(&mut self, id: ComputationId, sequence: Vec<NodeId>) {
        self.sequences.insert(id, sequence);
    }

    pub fn remove(&mut self, id: ComputationId) -> Option<Vec<NodeId>> {
        self.sequences.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComputationId, &[NodeId])> {
        self.sequences.iter().map(|(id, sequence)| (*id, sequence.as_slice()))
    }

    /// Check every sequence against its computation.
    ///
    /// A valid sequence lists each live node exactly once, and places every
    /// node after its operands and control predecessors.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn verify(&self, program: &Program) -> Result<()> {
        for (&id, sequence) in &self.sequences {
            let computation = program.computation(id)?;
            let name = computation.name();

            let mut position: HashMap<NodeId, usize> = HashMap::with_capacity(sequence.len());
            for (index, &node) in sequence.iter().enumerate() {
                ensure!(
                    computation.contains(node),
                    ScheduleUnknownNodeSnafu { computation: name.to_string(), id: node }
                );
                ensure!(
                    position.insert(node, index).is_none(),
                    ScheduleDuplicateNodeSnafu { computation: name.to_string(), node: computation.node(node)?.name() }
                );
            }
            ensure!(
                sequence.len() == computation.node_count(),
                ScheduleLengthMismatchSnafu {
                    computation: name.to_string(),
                    expected: computation.node_count(),
                    actual: sequence.len(),
                }
            );

            let mut placed: HashSet<NodeId> = HashSet::with_capacity(sequence.len());
            for &node in sequence {
                let current = computation.node(node)?;
                for &dependency in current.operands().iter().chain(current.control_predecessors()) {
                    ensure!(
                        placed.contains(&dependency),
                        ScheduleOrderViolationSnafu {
                            computation: name.to_string(),
                            node: current.name(),
                            dependency: computation.node(dependency)?.name(),
                        }
                    );
                }
                placed.insert(node);
            }
        }
        Ok(())
    }
}

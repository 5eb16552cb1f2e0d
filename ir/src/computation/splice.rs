//! Graph splicing: rewiring uses and replacing nodes in place.
//!
//! Every operation here takes `&mut Computation` and finishes before
//! returning, so no caller can observe a state where some consumers see the
//! old node and others the new one.

use smallvec::SmallVec;
use snafu::ensure;

use crate::computation::Computation;
use crate::error::*;
use crate::node::Node;
use crate::shape::Shape;
use crate::shape_inference::infer_async_start_shape;
use crate::types::NodeId;

impl Computation {
    /// Point every consumer of `old` at `new`. The root designation follows.
    ///
    /// `new` itself keeps consuming `old` if it already did, so wrapping a
    /// node (`old -> f(old)`) does not create a cycle.
    pub fn replace_all_uses_with(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        self.node(new)?;
        if old == new {
            return Ok(());
        }

        let users = std::mem::take(&mut self.node_mut(old)?.users);
        let mut kept: SmallVec<[NodeId; 4]> = SmallVec::new();
        for user in users {
            if user == new {
                kept.push(user);
                continue;
            }
            let consumer = self.node_mut(user)?;
            for operand in consumer.operands.iter_mut().filter(|operand| **operand == old) {
                *operand = new;
            }
            let replacement = self.node_mut(new)?;
            if !replacement.users.contains(&user) {
                replacement.users.push(user);
            }
        }
        self.node_mut(old)?.users = kept;

        if self.root == Some(old) {
            self.root = Some(new);
        }
        Ok(())
    }

    /// Replace `old` by the existing node `new` and remove `old`.
    ///
    /// - Shapes must match exactly.
    /// - Consumers and the root designation move to `new`.
    /// - Control predecessors and successors of `old` move to `new`.
    /// - `new` inherits `old`'s metadata if it has no op name, and `old`'s
    ///   frontend attributes if it has none.
    /// - `new` takes `old`'s position in iteration order.
    ///
    /// # Errors
    /// Returns error if either node is not live, shapes differ, or `new`
    /// consumes `old` (which would keep `old` alive).
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let old_node = self.node(old)?;
        let new_node = self.node(new)?;
        ensure!(
            old_node.shape == new_node.shape,
            ReplacementShapeMismatchSnafu {
                node: old_node.name.clone(),
                replacement: new_node.name.clone(),
                expected: old_node.shape.clone(),
                actual: new_node.shape.clone(),
            }
        );
        ensure!(
            old == new || !new_node.operands.contains(&old),
            NodeHasUsersSnafu { node: old_node.name.clone(), users: old_node.users.len() }
        );
        if old == new {
            return Ok(());
        }

        let inherit_metadata = new_node.metadata.op_name.is_empty();
        let inherit_attributes = new_node.frontend_attributes.is_empty();
        let (metadata, attributes) = (old_node.metadata.clone(), old_node.frontend_attributes.clone());
        let predecessors: SmallVec<[NodeId; 2]> = old_node.control_predecessors.clone();
        let successors: SmallVec<[NodeId; 2]> = old_node.control_successors.clone();
        tracing::trace!(old = old_node.name(), new = new_node.name(), computation = %self.name, "replacing node");

        let replacement = self.node_mut(new)?;
        if inherit_metadata {
            replacement.metadata = metadata;
        }
        if inherit_attributes {
            replacement.frontend_attributes = attributes;
        }

        self.replace_all_uses_with(old, new)?;
        for predecessor in predecessors.into_iter().filter(|p| *p != new) {
            self.add_control_dependency(predecessor, new)?;
        }
        for successor in successors.into_iter().filter(|s| *s != new) {
            self.add_control_dependency(new, successor)?;
        }

        self.order.retain(|id| *id != new);
        if let Some(position) = self.order.iter().position(|id| *id == old) {
            self.order.insert(position, new);
        }
        self.remove_node(old)
    }

    /// Add `node` and replace `old` with it. Returns the new node's handle.
    pub fn replace_with_new_node(&mut self, old: NodeId, node: Node) -> Result<NodeId> {
        let id = self.add_node(node)?;
        self.replace_node(old, id)?;
        Ok(id)
    }

    /// Split `id` into a generic `async-start` / `async-done` pair wrapping its operation.
    ///
    /// The start consumes the original operands and produces
    /// `((operands...), output, context_shapes...)`; the done consumes the start
    /// and produces the original shape. Metadata and backend configuration are
    /// copied to both. Control predecessors move to the start, control
    /// successors to the done. Returns the done node, whose first operand is
    /// the start.
    pub fn create_async_pair(&mut self, id: NodeId, context_shapes: &[Shape]) -> Result<NodeId> {
        let original = self.node(id)?.clone();
        let operand_shapes =
            original.operands.iter().map(|&operand| Ok(self.node(operand)?.shape())).collect::<Result<Vec<_>>>()?;
        let start_shape = infer_async_start_shape(&operand_shapes, &original.shape, context_shapes);

        let start = self.add_node(
            Node::async_start(original.op.clone(), start_shape, original.operands.iter().copied())
                .with_metadata(original.metadata.clone())
                .with_backend_config(original.backend_config.clone()),
        )?;
        let done = self.add_node(
            Node::async_done(original.op.clone(), original.shape.clone(), start)
                .with_metadata(original.metadata.clone())
                .with_backend_config(original.backend_config.clone()),
        )?;

        for &predecessor in &original.control_predecessors {
            self.add_control_dependency(predecessor, start)?;
        }
        for &successor in &original.control_successors {
            self.add_control_dependency(done, successor)?;
        }
        self.drop_all_control_deps(id)?;
        self.replace_node(id, done)?;
        Ok(done)
    }
}

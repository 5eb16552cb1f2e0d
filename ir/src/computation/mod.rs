//! Computations: node arenas forming a dataflow DAG.
//!
//! Nodes live in slots indexed by [`NodeId`]. Removing a node empties its slot
//! for good, so handles held by passes never alias a different node. A
//! separate iteration order lists the live nodes; replacements take over the
//! position of the node they replace.
//!
//! # Module Organization
//!
//! - [`splice`] - Use rewiring, replacement and the generic async expansion
//! - [`traversal`] - Post-order traversal over data and control edges
//! - [`tree`] - Text and tree rendering

pub mod splice;
pub mod traversal;
pub mod tree;

use std::collections::HashSet;

use smallvec::SmallVec;
use snafu::{OptionExt, ensure};

use crate::error::*;
use crate::node::Node;
use crate::types::NodeId;

#[derive(Debug, Clone)]
pub struct Computation {
    name: String,
    execution_thread: String,
    is_fusion: bool,
    slots: Vec<Option<Node>>,
    order: Vec<NodeId>,
    root: Option<NodeId>,
    names: HashSet<String>,
}

impl Computation {
    pub const MAIN_THREAD: &'static str = "main";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            execution_thread: Self::MAIN_THREAD.to_string(),
            is_fusion: false,
            slots: Vec::new(),
            order: Vec::new(),
            root: None,
            names: HashSet::new(),
        }
    }

    pub fn with_execution_thread(mut self, thread: impl Into<String>) -> Self {
        self.execution_thread = thread.into();
        self
    }

    /// Mark as the body of a fusion; such computations are skipped by module-level passes.
    pub fn into_fusion(mut self) -> Self {
        self.is_fusion = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn execution_thread(&self) -> &str {
        &self.execution_thread
    }

    pub fn is_fusion(&self) -> bool {
        self.is_fusion
    }

    // =========================================================================
    // Node access
    // =========================================================================

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.slots
            .get(id.index())
            .and_then(Option::as_ref)
            .with_context(|| UnknownNodeSnafu { id, computation: self.name.clone() })
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        let computation = &self.name;
        self.slots
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .with_context(|| UnknownNodeSnafu { id, computation: computation.clone() })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.get(id.index()).is_some_and(Option::is_some)
    }

    /// Live nodes in iteration order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.order.iter().filter_map(|&id| self.slots[id.index()].as_ref().map(|node| (id, node)))
    }

    /// Snapshot of live node handles in iteration order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        self.root = Some(id);
        Ok(())
    }

    pub fn users(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(self.node(id)?.users())
    }

    /// Find a live node by name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes().find(|(_, node)| node.name() == name).map(|(id, _)| id)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Append a node and register it as a user of its operands.
    ///
    /// The node is detached first: any use list or control edges it carries
    /// from elsewhere are dropped. Unnamed nodes are named `<opcode>.<id>`.
    ///
    /// # Errors
    /// Returns error if an operand is not a live node of this computation.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeId> {
        for &operand in node.operands() {
            self.node(operand)?;
        }

        let id = NodeId(self.slots.len() as u32);
        node.detach();
        if node.name.is_empty() || self.names.contains(&node.name) {
            node.name = format!("{}.{}", node.op.name(), id.0);
        }
        self.names.insert(node.name.clone());

        let operands: SmallVec<[NodeId; 4]> = node.operands.clone();
        self.slots.push(Some(node));
        self.order.push(id);
        for operand in operands {
            self.add_user(operand, id);
        }
        Ok(id)
    }

    /// Add the root node, or replace the current root designation.
    pub fn add_root(&mut self, node: Node) -> Result<NodeId> {
        let id = self.add_node(node)?;
        self.root = Some(id);
        Ok(id)
    }

    /// Require `from` to execute before `to`. Duplicate edges are ignored.
    ///
    /// # Errors
    /// Returns error if either node is not live or `from == to`.
    pub fn add_control_dependency(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        ensure!(from != to, SelfControlDependencySnafu { node: self.node(from)?.name.clone() });
        self.node(to)?;

        let source = self.node_mut(from)?;
        if !source.control_successors.contains(&to) {
            source.control_successors.push(to);
        }
        let target = self.node_mut(to)?;
        if !target.control_predecessors.contains(&from) {
            target.control_predecessors.push(from);
        }
        Ok(())
    }

    /// Remove every control edge touching `id`.
    pub fn drop_all_control_deps(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id)?;
        let predecessors = std::mem::take(&mut node.control_predecessors);
        let successors = std::mem::take(&mut node.control_successors);
        for predecessor in predecessors {
            self.node_mut(predecessor)?.control_successors.retain(|s| *s != id);
        }
        for successor in successors {
            self.node_mut(successor)?.control_predecessors.retain(|p| *p != id);
        }
        Ok(())
    }

    /// Remove a node that nothing consumes.
    ///
    /// The node is unregistered from its operands' use lists and its control
    /// edges are dropped. Its handle is never reused.
    ///
    /// # Errors
    /// Returns error if the node is not live, still has users, or is the root.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        ensure!(node.users.is_empty(), NodeHasUsersSnafu { node: node.name.clone(), users: node.users.len() });
        ensure!(
            self.root != Some(id),
            RootRemovalSnafu { node: node.name.clone(), computation: self.name.clone() }
        );

        self.drop_all_control_deps(id)?;
        let operands: SmallVec<[NodeId; 4]> = self.node(id)?.operands.clone();
        for operand in operands {
            if let Some(Some(operand_node)) = self.slots.get_mut(operand.index()) {
                operand_node.users.retain(|user| *user != id);
            }
        }
        if let Some(removed) = self.slots[id.index()].take() {
            self.names.remove(&removed.name);
        }
        self.order.retain(|live| *live != id);
        Ok(())
    }

    fn add_user(&mut self, operand: NodeId, user: NodeId) {
        if let Some(Some(node)) = self.slots.get_mut(operand.index())
            && !node.users.contains(&user)
        {
            node.users.push(user);
        }
    }
}

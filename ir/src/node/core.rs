//! Node struct and attribute accessors.

use smallvec::SmallVec;

use crate::op::{Op, Opcode};
use crate::shape::Shape;
use crate::types::{BackendConfig, FrontendAttributes, NodeId, OpMetadata};

/// Operation in a computation's dataflow graph.
///
/// A freshly constructed node is detached: it becomes part of a graph when
/// passed to [`Computation::add_node`](crate::Computation::add_node), which
/// assigns its [`NodeId`] and registers it as a user of its operands. Use lists
/// and control edges are owned by the computation and only change through its
/// methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) op: Op,
    pub(crate) shape: Shape,
    pub(crate) operands: SmallVec<[NodeId; 4]>,
    pub(crate) metadata: OpMetadata,
    pub(crate) backend_config: BackendConfig,
    pub(crate) frontend_attributes: FrontendAttributes,
    /// Observable effect beyond the output value; such nodes are never dead.
    pub(crate) has_side_effect: bool,

    // Bookkeeping maintained by the owning computation.
    pub(crate) users: SmallVec<[NodeId; 4]>,
    pub(crate) control_predecessors: SmallVec<[NodeId; 2]>,
    pub(crate) control_successors: SmallVec<[NodeId; 2]>,
}

impl Node {
    /// Create a detached node.
    pub fn new(op: Op, shape: Shape, operands: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            name: String::new(),
            op,
            shape,
            operands: operands.into_iter().collect(),
            metadata: OpMetadata::default(),
            backend_config: BackendConfig::default(),
            frontend_attributes: FrontendAttributes::default(),
            has_side_effect: false,
            users: SmallVec::new(),
            control_predecessors: SmallVec::new(),
            control_successors: SmallVec::new(),
        }
    }

    /// Set the node name. Empty names are filled in by the computation.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_metadata(mut self, metadata: OpMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_backend_config(mut self, config: BackendConfig) -> Self {
        self.backend_config = config;
        self
    }

    pub fn with_frontend_attributes(mut self, attributes: FrontendAttributes) -> Self {
        self.frontend_attributes = attributes;
        self
    }

    // =========================================================================
    // Operation and shape
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn opcode(&self) -> Opcode {
        self.op.opcode()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    // =========================================================================
    // Graph edges
    // =========================================================================

    pub fn operands(&self) -> &[NodeId] {
        &self.operands
    }

    pub fn operand(&self, index: usize) -> Option<NodeId> {
        self.operands.get(index).copied()
    }

    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// Distinct nodes that consume this node's output, in first-use order.
    pub fn users(&self) -> &[NodeId] {
        &self.users
    }

    /// Nodes that must execute before this one without a data dependency.
    pub fn control_predecessors(&self) -> &[NodeId] {
        &self.control_predecessors
    }

    /// Nodes that must execute after this one without a data dependency.
    pub fn control_successors(&self) -> &[NodeId] {
        &self.control_successors
    }

    pub fn has_control_dependencies(&self) -> bool {
        !self.control_predecessors.is_empty() || !self.control_successors.is_empty()
    }

    // =========================================================================
    // Metadata, configuration and attributes
    // =========================================================================

    pub fn metadata(&self) -> &OpMetadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: OpMetadata) {
        self.metadata = metadata;
    }

    pub fn backend_config(&self) -> &BackendConfig {
        &self.backend_config
    }

    pub fn set_backend_config(&mut self, config: BackendConfig) {
        self.backend_config = config;
    }

    pub fn copy_backend_config_from(&mut self, other: &Node) {
        self.backend_config = other.backend_config.clone();
    }

    pub fn frontend_attributes(&self) -> &FrontendAttributes {
        &self.frontend_attributes
    }

    pub fn frontend_attributes_mut(&mut self) -> &mut FrontendAttributes {
        &mut self.frontend_attributes
    }

    pub fn has_disjoint_read_write_regions(&self) -> bool {
        self.frontend_attributes.get(FrontendAttributes::DISJOINT_READ_WRITE_REGIONS) == Some("true")
    }

    pub fn set_disjoint_read_write_regions(&mut self) {
        self.frontend_attributes.insert(FrontendAttributes::DISJOINT_READ_WRITE_REGIONS, "true");
    }

    pub fn has_side_effect(&self) -> bool {
        self.has_side_effect
    }

    pub fn set_side_effect(&mut self, has_side_effect: bool) {
        self.has_side_effect = has_side_effect;
    }

    /// Drop graph bookkeeping so the node can be inserted as a fresh node.
    pub(crate) fn detach(&mut self) {
        self.users.clear();
        self.control_predecessors.clear();
        self.control_successors.clear();
    }
}

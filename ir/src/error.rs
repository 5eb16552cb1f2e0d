use snafu::Snafu;

use crate::{ComputationId, NodeId, Shape};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    // =========================================================================
    // Graph structure
    // =========================================================================
    /// Node handle does not name a live node of the computation.
    #[snafu(display("node {id} is not a live node of computation {computation}"))]
    UnknownNode { id: NodeId, computation: String },

    /// Computation handle does not belong to the program.
    #[snafu(display("computation {id} does not exist in program {program}"))]
    UnknownComputation { id: ComputationId, program: String },

    /// Replacement must produce exactly the shape its consumers expect.
    #[snafu(display("cannot replace {node} ({expected}) with {replacement} of different shape {actual}"))]
    ReplacementShapeMismatch { node: String, replacement: String, expected: Shape, actual: Shape },

    /// Node still has data consumers.
    #[snafu(display("cannot remove {node}: it still has {users} user(s)"))]
    NodeHasUsers { node: String, users: usize },

    /// Root of a computation can only be replaced, never removed.
    #[snafu(display("cannot remove {node}: it is the root of computation {computation}"))]
    RootRemoval { node: String, computation: String },

    /// Control edges must connect two distinct nodes.
    #[snafu(display("control dependency from {node} to itself"))]
    SelfControlDependency { node: String },

    // =========================================================================
    // Shape inference
    // =========================================================================
    /// Operation received an unsupported number of operands.
    #[snafu(display("{op} expects {expected} operand(s), got {actual}"))]
    InvalidOperandCount { op: &'static str, expected: &'static str, actual: usize },

    /// Array shape required.
    #[snafu(display("expected array shape for {context}, got {shape}"))]
    ExpectedArray { context: &'static str, shape: Shape },

    /// Array or tuple-of-arrays shape required.
    #[snafu(display("expected array or tuple of arrays for {context}, got {shape}"))]
    ExpectedArrayOrTuple { context: &'static str, shape: Shape },

    /// Input and output buffers of an in-place operation disagree.
    #[snafu(display("{context}: element types of {lhs} and {rhs} are incompatible"))]
    ElementTypeMismatch { context: &'static str, lhs: Shape, rhs: Shape },

    /// Slice offsets must be integer arrays or tuples of integer arrays.
    #[snafu(display("operand {index} must hold integer offsets, got {shape}"))]
    InvalidOffsetShape { index: usize, shape: Shape },

    // =========================================================================
    // Schedule
    // =========================================================================
    /// Sequence length differs from the number of live nodes.
    #[snafu(display("schedule for {computation} has {actual} entries, computation has {expected} nodes"))]
    ScheduleLengthMismatch { computation: String, expected: usize, actual: usize },

    /// Sequence references a node that is not live.
    #[snafu(display("schedule for {computation} references unknown node {id}"))]
    ScheduleUnknownNode { computation: String, id: NodeId },

    /// Sequence lists the same node twice.
    #[snafu(display("schedule for {computation} lists {node} more than once"))]
    ScheduleDuplicateNode { computation: String, node: String },

    /// Node scheduled before one of its data or control dependencies.
    #[snafu(display("schedule for {computation} places {node} before its dependency {dependency}"))]
    ScheduleOrderViolation { computation: String, node: String, dependency: String },
}

//! Dataflow graph IR for the tessera compiler.
//!
//! A [`Program`] owns [`Computation`]s; a computation owns an arena of
//! [`Node`]s connected through operand [`NodeId`] handles. Programs may carry a
//! [`Schedule`], an explicit total order per computation that passes must keep
//! consistent when they rewrite the graph.
//!
//! # Module Organization
//!
//! - [`types`] - Identifiers, collective attributes, metadata and configuration payloads
//! - [`op`] - Operation enum and opcode vocabulary
//! - [`shape`] - Array / tuple / token shapes
//! - [`shape_inference`] - Shape rules for asynchronous start operations
//! - [`node`] - Node struct, constructors and rendering
//! - [`computation`] - Node arena, use lists, control edges and graph splicing
//! - [`program`] - Computation collection and execution thread filtering
//! - [`schedule`] - Per-computation sequences and their verification
//! - [`error`] - Error types and result handling

pub mod computation;
pub mod error;
pub mod node;
pub mod op;
pub mod prelude;
pub mod program;
pub mod schedule;
pub mod shape;
pub mod shape_inference;
pub mod types;


pub use computation::Computation;
pub use error::{Error, Result};
pub use node::Node;
pub use op::{AllGatherAttrs, AllReduceAttrs, AllToAllAttrs, CollectivePermuteAttrs, Op, Opcode};
pub use program::{ExecutionThreads, Program};
pub use schedule::Schedule;
pub use shape::Shape;
pub use types::{
    BackendConfig, CollectiveOpts, ComputationId, ConstValue, FrontendAttributes, NodeId, OpMetadata, ReplicaGroup,
    SourceTargetPair,
};

pub use tessera_dtype::ElementType;

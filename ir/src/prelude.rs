//! Common imports for building and rewriting graphs.
//!
//! ```rust,ignore
//! use tessera_ir::prelude::*;
//! ```

// Graph containers
pub use crate::computation::Computation;
pub use crate::node::Node;
pub use crate::program::{ExecutionThreads, Program};
pub use crate::schedule::Schedule;

// Operations
pub use crate::op::{AllGatherAttrs, AllReduceAttrs, AllToAllAttrs, CollectivePermuteAttrs, Op, Opcode};

// Shapes and attributes
pub use crate::shape::Shape;
pub use crate::types::{
    BackendConfig, CollectiveOpts, ComputationId, ConstValue, FrontendAttributes, NodeId, OpMetadata, ReplicaGroup,
    SourceTargetPair,
};

pub use tessera_dtype::ElementType;

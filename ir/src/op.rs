//! Operation enum and opcode vocabulary.
//!
//! [`Op`] carries the per-operation attributes; operands live on the
//! [`Node`](crate::Node) as a flat handle list so that use rewiring does not
//! depend on the operation kind. [`Opcode`] is the fieldless tag used for
//! dispatch and rendering.

use std::borrow::Cow;

use crate::types::{CollectiveOpts, ComputationId, ConstValue, SourceTargetPair};

/// Attributes of `all-reduce` and `all-reduce-start`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllReduceAttrs {
    /// Reduction computation applied elementwise across participants.
    pub to_apply: ComputationId,
    pub collective: CollectiveOpts,
}

/// Attributes of `all-gather` and `all-gather-start`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllGatherAttrs {
    pub dimension: i64,
    pub collective: CollectiveOpts,
}

/// Attributes of `collective-permute` and `collective-permute-start`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CollectivePermuteAttrs {
    pub source_target_pairs: Vec<SourceTargetPair>,
    /// Per-slice sizes of the in-place (four operand) form; empty otherwise.
    pub slice_sizes: Vec<Vec<i64>>,
    pub channel_id: Option<i64>,
}

/// Attributes of `all-to-all`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllToAllAttrs {
    /// Array form splits along this dimension; tuple form has none.
    pub split_dimension: Option<i64>,
    pub collective: CollectiveOpts,
}

/// Operation performed by a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    // Leaves
    Parameter { number: usize },
    Constant(ConstValue),

    // Elementwise
    Add,
    Multiply,
    Maximum,

    // Tuples
    Tuple,
    GetTupleElement { index: usize },

    // All-reduce family
    AllReduce(AllReduceAttrs),
    AllReduceStart(AllReduceAttrs),
    AllReduceDone,

    // All-gather family
    AllGather(AllGatherAttrs),
    AllGatherStart(AllGatherAttrs),
    AllGatherDone,

    // Collective-permute family
    CollectivePermute(CollectivePermuteAttrs),
    CollectivePermuteStart(CollectivePermuteAttrs),
    CollectivePermuteDone,

    // All-to-all, made asynchronous through the generic async wrapper
    AllToAll(AllToAllAttrs),

    // Generic asynchronous wrapper around a synchronous operation
    AsyncStart { wrapped: Box<Op> },
    AsyncDone { wrapped: Box<Op> },

    // Opaque call into the backend
    CustomCall { target: String },
}

/// Fieldless operation tag. Renders in kebab case (`all-reduce-start`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::IntoStaticStr, strum::EnumIter, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Opcode {
    Parameter,
    Constant,
    Add,
    Multiply,
    Maximum,
    Tuple,
    GetTupleElement,
    AllReduce,
    AllReduceStart,
    AllReduceDone,
    AllGather,
    AllGatherStart,
    AllGatherDone,
    CollectivePermute,
    CollectivePermuteStart,
    CollectivePermuteDone,
    AllToAll,
    AsyncStart,
    AsyncDone,
    CustomCall,
}

impl Op {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Parameter { .. } => Opcode::Parameter,
            Self::Constant(_) => Opcode::Constant,
            Self::Add => Opcode::Add,
            Self::Multiply => Opcode::Multiply,
            Self::Maximum => Opcode::Maximum,
            Self::Tuple => Opcode::Tuple,
            Self::GetTupleElement { .. } => Opcode::GetTupleElement,
            Self::AllReduce(_) => Opcode::AllReduce,
            Self::AllReduceStart(_) => Opcode::AllReduceStart,
            Self::AllReduceDone => Opcode::AllReduceDone,
            Self::AllGather(_) => Opcode::AllGather,
            Self::AllGatherStart(_) => Opcode::AllGatherStart,
            Self::AllGatherDone => Opcode::AllGatherDone,
            Self::CollectivePermute(_) => Opcode::CollectivePermute,
            Self::CollectivePermuteStart(_) => Opcode::CollectivePermuteStart,
            Self::CollectivePermuteDone => Opcode::CollectivePermuteDone,
            Self::AllToAll(_) => Opcode::AllToAll,
            Self::AsyncStart { .. } => Opcode::AsyncStart,
            Self::AsyncDone { .. } => Opcode::AsyncDone,
            Self::CustomCall { .. } => Opcode::CustomCall,
        }
    }

    /// Display name. Async wrappers are named after the wrapped operation
    /// (`all-to-all-start`, `all-to-all-done`).
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            Self::AsyncStart { wrapped } => Cow::Owned(format!("{}-start", wrapped.opcode())),
            Self::AsyncDone { wrapped } => Cow::Owned(format!("{}-done", wrapped.opcode())),
            other => Cow::Borrowed(other.opcode().into()),
        }
    }

    /// Operation wrapped by an async start/done pair.
    pub fn wrapped(&self) -> Option<&Op> {
        match self {
            Self::AsyncStart { wrapped } | Self::AsyncDone { wrapped } => Some(wrapped),
            _ => None,
        }
    }

    /// Shared grouping attributes of all-reduce, all-gather and all-to-all (including start forms).
    pub fn collective_opts(&self) -> Option<&CollectiveOpts> {
        match self {
            Self::AllReduce(attrs) | Self::AllReduceStart(attrs) => Some(&attrs.collective),
            Self::AllGather(attrs) | Self::AllGatherStart(attrs) => Some(&attrs.collective),
            Self::AllToAll(attrs) => Some(&attrs.collective),
            Self::AsyncStart { wrapped } | Self::AsyncDone { wrapped } => wrapped.collective_opts(),
            _ => None,
        }
    }

    pub fn channel_id(&self) -> Option<i64> {
        match self {
            Self::CollectivePermute(attrs) | Self::CollectivePermuteStart(attrs) => attrs.channel_id,
            other => other.collective_opts().and_then(|opts| opts.channel_id),
        }
    }

    /// Synchronous collective that has an asynchronous counterpart.
    pub fn is_sync_collective(&self) -> bool {
        matches!(self, Self::AllReduce(_) | Self::AllGather(_) | Self::CollectivePermute(_) | Self::AllToAll(_))
    }

    pub fn is_async_start(&self) -> bool {
        matches!(
            self,
            Self::AllReduceStart(_) | Self::AllGatherStart(_) | Self::CollectivePermuteStart(_) | Self::AsyncStart { .. }
        )
    }

    pub fn is_async_done(&self) -> bool {
        matches!(
            self,
            Self::AllReduceDone | Self::AllGatherDone | Self::CollectivePermuteDone | Self::AsyncDone { .. }
        )
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

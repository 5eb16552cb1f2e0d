//! Node constructors, one per opcode.
//!
//! Every constructor takes the output shape explicitly; shape derivation is
//! the caller's job (see [`shape_inference`](crate::shape_inference)).

use crate::node::Node;
use crate::op::{AllGatherAttrs, AllReduceAttrs, AllToAllAttrs, CollectivePermuteAttrs, Op};
use crate::shape::Shape;
use crate::types::{CollectiveOpts, ComputationId, ConstValue, NodeId, SourceTargetPair};
use tessera_dtype::ElementType;

impl Node {
    // =========================================================================
    // Leaves
    // =========================================================================

    pub fn parameter(number: usize, shape: Shape) -> Self {
        Self::new(Op::Parameter { number }, shape, [])
    }

    /// Scalar constant.
    pub fn constant(value: ConstValue, element: ElementType) -> Self {
        Self::new(Op::Constant(value), Shape::scalar(element), [])
    }

    // =========================================================================
    // Elementwise and tuples
    // =========================================================================

    pub fn add(shape: Shape, lhs: NodeId, rhs: NodeId) -> Self {
        Self::new(Op::Add, shape, [lhs, rhs])
    }

    pub fn multiply(shape: Shape, lhs: NodeId, rhs: NodeId) -> Self {
        Self::new(Op::Multiply, shape, [lhs, rhs])
    }

    pub fn maximum(shape: Shape, lhs: NodeId, rhs: NodeId) -> Self {
        Self::new(Op::Maximum, shape, [lhs, rhs])
    }

    pub fn tuple(shape: Shape, elements: impl IntoIterator<Item = NodeId>) -> Self {
        Self::new(Op::Tuple, shape, elements)
    }

    pub fn get_tuple_element(shape: Shape, operand: NodeId, index: usize) -> Self {
        Self::new(Op::GetTupleElement { index }, shape, [operand])
    }

    // =========================================================================
    // All-reduce
    // =========================================================================

    pub fn all_reduce(
        shape: Shape,
        operands: impl IntoIterator<Item = NodeId>,
        to_apply: ComputationId,
        collective: CollectiveOpts,
    ) -> Self {
        Self::new(Op::AllReduce(AllReduceAttrs { to_apply, collective }), shape, operands)
    }

    pub fn all_reduce_start(
        shape: Shape,
        operands: impl IntoIterator<Item = NodeId>,
        to_apply: ComputationId,
        collective: CollectiveOpts,
    ) -> Self {
        Self::new(Op::AllReduceStart(AllReduceAttrs { to_apply, collective }), shape, operands)
    }

    pub fn all_reduce_done(shape: Shape, start: NodeId) -> Self {
        Self::new(Op::AllReduceDone, shape, [start])
    }

    // =========================================================================
    // All-gather
    // =========================================================================

    pub fn all_gather(
        shape: Shape,
        operands: impl IntoIterator<Item = NodeId>,
        dimension: i64,
        collective: CollectiveOpts,
    ) -> Self {
        Self::new(Op::AllGather(AllGatherAttrs { dimension, collective }), shape, operands)
    }

    pub fn all_gather_start(
        shape: Shape,
        operands: impl IntoIterator<Item = NodeId>,
        dimension: i64,
        collective: CollectiveOpts,
    ) -> Self {
        Self::new(Op::AllGatherStart(AllGatherAttrs { dimension, collective }), shape, operands)
    }

    pub fn all_gather_done(shape: Shape, start: NodeId) -> Self {
        Self::new(Op::AllGatherDone, shape, [start])
    }

    // =========================================================================
    // Collective permute
    // =========================================================================

    pub fn collective_permute(
        shape: Shape,
        operand: NodeId,
        source_target_pairs: Vec<SourceTargetPair>,
        channel_id: Option<i64>,
    ) -> Self {
        let attrs = CollectivePermuteAttrs { source_target_pairs, slice_sizes: Vec::new(), channel_id };
        Self::new(Op::CollectivePermute(attrs), shape, [operand])
    }

    /// In-place form writing slices of `input` into `output` at the given offsets.
    #[allow(clippy::too_many_arguments)]
    pub fn collective_permute_in_place(
        shape: Shape,
        input: NodeId,
        output: NodeId,
        input_offsets: NodeId,
        output_offsets: NodeId,
        source_target_pairs: Vec<SourceTargetPair>,
        slice_sizes: Vec<Vec<i64>>,
        channel_id: Option<i64>,
    ) -> Self {
        let attrs = CollectivePermuteAttrs { source_target_pairs, slice_sizes, channel_id };
        Self::new(Op::CollectivePermute(attrs), shape, [input, output, input_offsets, output_offsets])
    }

    pub fn collective_permute_start(
        shape: Shape,
        operand: NodeId,
        source_target_pairs: Vec<SourceTargetPair>,
        channel_id: Option<i64>,
    ) -> Self {
        let attrs = CollectivePermuteAttrs { source_target_pairs, slice_sizes: Vec::new(), channel_id };
        Self::new(Op::CollectivePermuteStart(attrs), shape, [operand])
    }

    #[allow(clippy::too_many_arguments)]
    pub fn collective_permute_start_in_place(
        shape: Shape,
        input: NodeId,
        output: NodeId,
        input_offsets: NodeId,
        output_offsets: NodeId,
        source_target_pairs: Vec<SourceTargetPair>,
        slice_sizes: Vec<Vec<i64>>,
        channel_id: Option<i64>,
    ) -> Self {
        let attrs = CollectivePermuteAttrs { source_target_pairs, slice_sizes, channel_id };
        Self::new(Op::CollectivePermuteStart(attrs), shape, [input, output, input_offsets, output_offsets])
    }

    pub fn collective_permute_done(shape: Shape, start: NodeId) -> Self {
        Self::new(Op::CollectivePermuteDone, shape, [start])
    }

    // =========================================================================
    // All-to-all and generic async
    // =========================================================================

    pub fn all_to_all(
        shape: Shape,
        operands: impl IntoIterator<Item = NodeId>,
        split_dimension: Option<i64>,
        collective: CollectiveOpts,
    ) -> Self {
        Self::new(Op::AllToAll(AllToAllAttrs { split_dimension, collective }), shape, operands)
    }

    pub fn async_start(wrapped: Op, shape: Shape, operands: impl IntoIterator<Item = NodeId>) -> Self {
        Self::new(Op::AsyncStart { wrapped: Box::new(wrapped) }, shape, operands)
    }

    pub fn async_done(wrapped: Op, shape: Shape, start: NodeId) -> Self {
        Self::new(Op::AsyncDone { wrapped: Box::new(wrapped) }, shape, [start])
    }

    // =========================================================================
    // Custom calls
    // =========================================================================

    pub fn custom_call(shape: Shape, operands: impl IntoIterator<Item = NodeId>, target: impl Into<String>) -> Self {
        Self::new(Op::CustomCall { target: target.into() }, shape, operands)
    }
}

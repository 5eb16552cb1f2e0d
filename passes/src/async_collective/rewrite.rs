//! Per-family rewriters.
//!
//! Each rewriter turns one synchronous collective into its start/done form,
//! copies metadata and backend configuration onto the start, and splices the
//! completion node into the graph in place of the original.

use snafu::{OptionExt, ResultExt};
use tessera_ir::shape_inference::{context_shape, infer_all_gather_start_shape, infer_collective_permute_start_shape};
use tessera_ir::{Computation, Node, NodeId, Op, Opcode, Shape};

use super::config::{AsyncCollectiveConfig, CollectiveKind};
use super::schedule::ReplacedAsync;
use crate::error::*;

/// Custom call target completing the receive half of a tracked permute.
pub const CP_RECV_DONE_TARGET: &str = "$cp_recv_done";
/// Custom call target completing the send half of a tracked permute.
pub const CP_SEND_DONE_TARGET: &str = "$cp_send_done";

/// Rewrite rule for one collective family.
pub trait AsyncRewriter {
    /// Replace the collective `id` with its asynchronous form.
    ///
    /// # Errors
    /// Returns error if `id` is not a live node of the expected family, if a
    /// start shape cannot be inferred, or if splicing fails.
    fn rewrite(&self, computation: &mut Computation, id: NodeId, config: &AsyncCollectiveConfig)
    -> Result<ReplacedAsync>;
}

pub struct ReduceRewriter;
pub struct GatherRewriter;
pub struct PermuteRewriter;
pub struct AllToAllRewriter;

impl CollectiveKind {
    pub fn rewriter(self) -> &'static dyn AsyncRewriter {
        match self {
            Self::AllReduce => &ReduceRewriter,
            Self::AllGather => &GatherRewriter,
            Self::CollectivePermute => &PermuteRewriter,
            Self::AllToAll => &AllToAllRewriter,
        }
    }
}

// ============================================================================
// ALL-REDUCE
// ============================================================================

impl AsyncRewriter for ReduceRewriter {
    fn rewrite(&self, computation: &mut Computation, id: NodeId, _: &AsyncCollectiveConfig) -> Result<ReplacedAsync> {
        let original = snapshot(computation, id)?;
        let Op::AllReduce(attrs) = original.op() else {
            return unexpected(&original, Opcode::AllReduce);
        };

        let start = Node::all_reduce_start(
            original.shape().clone(),
            original.operands().iter().copied(),
            attrs.to_apply,
            attrs.collective.clone(),
        )
        .with_metadata(original.metadata().clone())
        .with_backend_config(original.backend_config().clone());
        let start = computation.add_node(start).with_context(|_| IrSnafu { context: replacing(&original) })?;

        let done = computation
            .replace_with_new_node(id, Node::all_reduce_done(original.shape().clone(), start))
            .with_context(|_| IrSnafu { context: replacing(&original) })?;
        Ok(ReplacedAsync::new(start, done))
    }
}

// ============================================================================
// ALL-GATHER
// ============================================================================

impl AsyncRewriter for GatherRewriter {
    fn rewrite(&self, computation: &mut Computation, id: NodeId, _: &AsyncCollectiveConfig) -> Result<ReplacedAsync> {
        let original = snapshot(computation, id)?;
        let Op::AllGather(attrs) = original.op() else {
            return unexpected(&original, Opcode::AllGather);
        };

        let operand_shapes = operand_shapes(computation, &original)?;
        let operand_shapes: Vec<&Shape> = operand_shapes.iter().collect();
        let start_shape = infer_all_gather_start_shape(&operand_shapes, original.shape());

        let start = Node::all_gather_start(
            start_shape,
            original.operands().iter().copied(),
            attrs.dimension,
            attrs.collective.clone(),
        )
        .with_metadata(original.metadata().clone())
        .with_backend_config(original.backend_config().clone());
        let start = computation.add_node(start).with_context(|_| IrSnafu { context: replacing(&original) })?;

        let done = computation
            .replace_with_new_node(id, Node::all_gather_done(original.shape().clone(), start))
            .with_context(|_| IrSnafu { context: replacing(&original) })?;
        Ok(ReplacedAsync::new(start, done))
    }
}

// ============================================================================
// COLLECTIVE-PERMUTE
// ============================================================================

impl AsyncRewriter for PermuteRewriter {
    fn rewrite(
        &self,
        computation: &mut Computation,
        id: NodeId,
        config: &AsyncCollectiveConfig,
    ) -> Result<ReplacedAsync> {
        let original = snapshot(computation, id)?;
        let Op::CollectivePermute(attrs) = original.op() else {
            return unexpected(&original, Opcode::CollectivePermute);
        };
        let start = match *original.operands() {
            [operand] => {
                let operand_shape = computation
                    .node(operand)
                    .with_context(|_| IrSnafu { context: replacing(&original) })?
                    .shape()
                    .clone();
                let shape =
                    Shape::tuple([operand_shape, original.shape().clone(), context_shape(), context_shape()]);
                Node::collective_permute_start(shape, operand, attrs.source_target_pairs.clone(), attrs.channel_id)
            }
            [input, output, input_offsets, output_offsets] => {
                let operand_shapes = operand_shapes(computation, &original)?;
                let operand_shapes: Vec<&Shape> = operand_shapes.iter().collect();
                let shape = infer_collective_permute_start_shape(&operand_shapes)
                    .context(ShapeInferenceSnafu { node: original.name() })?;
                let mut start = Node::collective_permute_start_in_place(
                    shape,
                    input,
                    output,
                    input_offsets,
                    output_offsets,
                    attrs.source_target_pairs.clone(),
                    attrs.slice_sizes.clone(),
                    attrs.channel_id,
                );
                if original.has_disjoint_read_write_regions() {
                    start.set_disjoint_read_write_regions();
                }
                start
            }
            ref operands => panic!(
                "collective-permute {} has {} operands, expected 1 or 4",
                original.name(),
                operands.len()
            ),
        };
        let start =
            start.with_metadata(original.metadata().clone()).with_backend_config(original.backend_config().clone());
        let start = computation.add_node(start).with_context(|_| IrSnafu { context: replacing(&original) })?;

        if !config.tracks_send_recv_separately(&original) {
            let done = computation
                .replace_with_new_node(id, Node::collective_permute_done(original.shape().clone(), start))
                .with_context(|_| IrSnafu { context: replacing(&original) })?;
            return Ok(ReplacedAsync::new(start, done));
        }

        let mut recv_done = Node::custom_call(original.shape().clone(), [start], CP_RECV_DONE_TARGET);
        recv_done.set_side_effect(true);
        let mut send_done = Node::custom_call(Shape::token(), [start], CP_SEND_DONE_TARGET);
        send_done.set_side_effect(true);

        let recv_done = computation.add_node(recv_done).with_context(|_| IrSnafu { context: replacing(&original) })?;
        let send_done = computation.add_node(send_done).with_context(|_| IrSnafu { context: replacing(&original) })?;
        computation
            .add_control_dependency(recv_done, send_done)
            .with_context(|_| IrSnafu { context: replacing(&original) })?;
        computation.replace_node(id, recv_done).with_context(|_| IrSnafu { context: replacing(&original) })?;
        Ok(ReplacedAsync { start, done: recv_done, send_done: Some(send_done) })
    }
}

// ============================================================================
// ALL-TO-ALL
// ============================================================================

impl AsyncRewriter for AllToAllRewriter {
    fn rewrite(&self, computation: &mut Computation, id: NodeId, _: &AsyncCollectiveConfig) -> Result<ReplacedAsync> {
        let original = snapshot(computation, id)?;
        if !matches!(original.op(), Op::AllToAll(_)) {
            return unexpected(&original, Opcode::AllToAll);
        }

        let done = computation
            .create_async_pair(id, &[context_shape(), context_shape()])
            .with_context(|_| IrSnafu { context: replacing(&original) })?;
        let start = computation
            .node(done)
            .with_context(|_| IrSnafu { context: replacing(&original) })?
            .operand(0)
            .context(MissingAsyncStartSnafu { node: original.name() })?;
        Ok(ReplacedAsync::new(start, done))
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn snapshot(computation: &Computation, id: NodeId) -> Result<Node> {
    computation.node(id).cloned().context(IrSnafu { context: format!("looking up collective {id}") })
}

fn operand_shapes(computation: &Computation, node: &Node) -> Result<Vec<Shape>> {
    node.operands()
        .iter()
        .map(|&operand| {
            let operand = computation.node(operand).with_context(|_| IrSnafu { context: replacing(node) })?;
            Ok(operand.shape().clone())
        })
        .collect()
}

fn replacing(node: &Node) -> String {
    format!("replacing {}", node.to_short_string())
}

fn unexpected<T>(node: &Node, expected: Opcode) -> Result<T> {
    UnexpectedOpcodeSnafu { node: node.name(), expected, actual: node.opcode() }.fail()
}

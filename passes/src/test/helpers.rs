//! Programs with one of each collective family.

use tessera_ir::test::helpers::{add_reduction, f32_array, pairwise_opts, s32_array};
use std::collections::HashMap;

use tessera_ir::{Computation, ComputationId, Node, NodeId, OpMetadata, Opcode, Program, Schedule, Shape};

use crate::async_collective::rewrite::CP_SEND_DONE_TARGET;
use crate::{AsyncCollectiveConfig, AsyncCollectiveCreator, CollectiveKind, ModulePass};

/// Handles of the entry computation built by [`collectives_program`].
#[derive(Debug, Clone, Copy)]
pub struct Collectives {
    pub entry: ComputationId,
    pub param: NodeId,
    pub all_reduce: NodeId,
    pub all_gather: NodeId,
    pub permute: NodeId,
    pub all_to_all: NodeId,
    pub root: NodeId,
}

impl Collectives {
    pub fn get(&self, kind: CollectiveKind) -> NodeId {
        match kind {
            CollectiveKind::AllReduce => self.all_reduce,
            CollectiveKind::AllGather => self.all_gather,
            CollectiveKind::CollectivePermute => self.permute,
            CollectiveKind::AllToAll => self.all_to_all,
        }
    }
}

/// `p0 -> all-reduce -> all-gather -> collective-permute -> all-to-all`,
/// rooted at a tuple of all four collectives.
pub fn collectives_program(scheduled: bool) -> (Program, Collectives) {
    let mut program = Program::new("collectives");
    let sum = add_reduction(&mut program);
    let mut entry = Computation::new("entry");

    let param = entry.add_node(Node::parameter(0, f32_array([8])).with_name("p0")).unwrap();
    let all_reduce = entry
        .add_node(
            Node::all_reduce(f32_array([8]), [param], sum, pairwise_opts())
                .with_name("ar")
                .with_metadata(OpMetadata::named("model/ar"))
                .with_backend_config([("priority", "high")].into_iter().collect()),
        )
        .unwrap();
    let all_gather = entry
        .add_node(
            Node::all_gather(f32_array([16]), [all_reduce], 0, pairwise_opts())
                .with_name("ag")
                .with_metadata(OpMetadata::named("model/ag")),
        )
        .unwrap();
    let permute = entry
        .add_node(
            Node::collective_permute(f32_array([16]), all_gather, vec![(0, 1), (1, 0)], Some(3))
                .with_name("cp")
                .with_metadata(OpMetadata::named("model/cp"))
                .with_backend_config([("stream", "1")].into_iter().collect()),
        )
        .unwrap();
    let all_to_all = entry
        .add_node(Node::all_to_all(f32_array([16]), [permute], Some(0), pairwise_opts()).with_name("a2a"))
        .unwrap();
    let root_shape = Shape::tuple([f32_array([8]), f32_array([16]), f32_array([16]), f32_array([16])]);
    let root = entry
        .add_root(Node::tuple(root_shape, [all_reduce, all_gather, permute, all_to_all]).with_name("out"))
        .unwrap();

    let entry = program.add_entry_computation(entry);
    if scheduled {
        program.set_schedule(Schedule::post_order(&program));
    }
    (program, Collectives { entry, param, all_reduce, all_gather, permute, all_to_all, root })
}

/// Entry computation with one four-operand collective permute as root.
pub fn in_place_permute_program(
    scheduled: bool,
    input: Shape,
    output: Shape,
    offsets: Shape,
    disjoint: bool,
) -> (Program, ComputationId, NodeId) {
    let mut program = Program::new("in_place");
    let mut entry = Computation::new("entry");
    let input_id = entry.add_node(Node::parameter(0, input).with_name("input")).unwrap();
    let output_id = entry.add_node(Node::parameter(1, output.clone()).with_name("output")).unwrap();
    let input_offsets = entry.add_node(Node::parameter(2, offsets.clone()).with_name("input_offsets")).unwrap();
    let output_offsets = entry.add_node(Node::parameter(3, offsets).with_name("output_offsets")).unwrap();
    let mut permute = Node::collective_permute_in_place(
        output,
        input_id,
        output_id,
        input_offsets,
        output_offsets,
        vec![(0, 1), (1, 2), (2, 0)],
        vec![vec![4]],
        Some(7),
    )
    .with_name("cp")
    .with_metadata(OpMetadata::named("model/cp_in_place"));
    if disjoint {
        permute.set_disjoint_read_write_regions();
    }
    let permute = entry.add_root(permute).unwrap();
    let entry = program.add_entry_computation(entry);
    if scheduled {
        program.set_schedule(Schedule::post_order(&program));
    }
    (program, entry, permute)
}

/// Offsets accepted by the in-place permute shape rule.
pub fn offsets() -> Shape {
    s32_array([1])
}

/// Run the pass with every node of `kinds` converted.
pub fn convert(program: &mut Program, kinds: &[CollectiveKind], track_send_recv_separately: bool) -> bool {
    let pass = AsyncCollectiveCreator::new(AsyncCollectiveConfig::for_kinds(kinds, track_send_recv_separately));
    pass.run(program, &Default::default()).unwrap()
}

/// Live nodes of `computation` with the given opcode.
pub fn with_opcode(computation: &Computation, opcode: Opcode) -> Vec<NodeId> {
    computation.nodes().filter(|(_, node)| node.opcode() == opcode).map(|(id, _)| id).collect()
}

/// Check that `after` is `before` with every removed entry replaced by a
/// start/completion run, and that each completion keeps the original shape.
///
/// `shapes` holds the output shape of every node of `before`.
pub fn assert_spliced(computation: &Computation, before: &[NodeId], after: &[NodeId], shapes: &HashMap<NodeId, Shape>) {
    let mut j = 0;
    for &id in before {
        if computation.contains(id) {
            assert_eq!(after.get(j), Some(&id), "live node {id} moved in the schedule");
            j += 1;
            continue;
        }
        let start = after[j];
        let done = after[j + 1];
        assert!(computation.node(start).unwrap().op().is_async_start(), "{start} is not a start");
        let done_node = computation.node(done).unwrap();
        assert_eq!(done_node.operands(), &[start]);
        assert_eq!(done_node.shape(), &shapes[&id]);
        j += 2;
        if let Some(&next) = after.get(j)
            && let tessera_ir::Op::CustomCall { target } = computation.node(next).unwrap().op()
            && target == CP_SEND_DONE_TARGET
            && computation.node(next).unwrap().operands() == [start]
        {
            j += 1;
        }
    }
    assert_eq!(j, after.len(), "schedule has trailing entries");
}

/// Output shape of every live node.
pub fn shapes_of(computation: &Computation) -> HashMap<NodeId, Shape> {
    computation.nodes().map(|(id, node)| (id, node.shape().clone())).collect()
}

use crate::error::Error;
use crate::shape_inference::context_shape;
use crate::test::helpers::{assert_use_lists_consistent, diamond, f32_array, pairwise_opts, u32_scalar};
use crate::{Computation, FrontendAttributes, Node, OpMetadata, Opcode, Shape};

#[test]
fn test_replace_all_uses_with_moves_consumers_and_root() {
    let (mut computation, [p0, add, mul]) = diamond();
    let other = computation.add_node(Node::parameter(1, f32_array([4])).with_name("p1")).unwrap();
    computation.replace_all_uses_with(p0, other).unwrap();

    assert!(computation.users(p0).unwrap().is_empty());
    assert_eq!(computation.users(other).unwrap(), &[add, mul]);
    assert_eq!(computation.node(add).unwrap().operands(), &[other, other]);
    assert_use_lists_consistent(&computation);

    let wrapper = computation.add_node(Node::add(f32_array([4]), mul, mul)).unwrap();
    computation.replace_all_uses_with(mul, wrapper).unwrap();
    assert_eq!(computation.root(), Some(wrapper));
    assert_eq!(computation.users(mul).unwrap(), &[wrapper]);
}

#[test]
fn test_replace_node_takes_position_and_removes_old() {
    let (mut computation, [p0, add, mul]) = diamond();
    let replacement = computation.add_node(Node::multiply(f32_array([4]), p0, p0).with_name("square")).unwrap();
    computation.replace_node(add, replacement).unwrap();

    assert!(!computation.contains(add));
    assert_eq!(computation.node_ids(), vec![p0, replacement, mul]);
    assert_eq!(computation.node(mul).unwrap().operands(), &[replacement, p0]);
    assert_use_lists_consistent(&computation);
}

#[test]
fn test_replace_node_shape_mismatch() {
    let (mut computation, [p0, add, _]) = diamond();
    let wrong = computation.add_node(Node::parameter(1, f32_array([8]))).unwrap();
    let err = computation.replace_node(add, wrong).unwrap_err();
    assert!(matches!(err, Error::ReplacementShapeMismatch { .. }), "{err}");
    assert!(computation.contains(add));
    assert_eq!(computation.users(p0).unwrap().len(), 2);
}

#[test]
fn test_replace_node_rejects_consumer_of_old() {
    let (mut computation, [_, add, _]) = diamond();
    let wrapper = computation.add_node(Node::add(f32_array([4]), add, add)).unwrap();
    let err = computation.replace_node(add, wrapper).unwrap_err();
    assert!(matches!(err, Error::NodeHasUsers { .. }), "{err}");
}

#[test]
fn test_replace_root() {
    let (mut computation, [p0, _, mul]) = diamond();
    let replacement = computation.add_node(Node::add(f32_array([4]), p0, p0)).unwrap();
    computation.replace_node(mul, replacement).unwrap();
    assert_eq!(computation.root(), Some(replacement));
}

#[test]
fn test_replace_node_inherits_metadata_and_attributes() {
    let mut computation = Computation::new("c");
    let p0 = computation.add_node(Node::parameter(0, f32_array([4]))).unwrap();
    let attributes: FrontendAttributes = [("stage", "1")].into_iter().collect();
    let old = computation
        .add_root(
            Node::add(f32_array([4]), p0, p0)
                .with_metadata(OpMetadata::named("model/add"))
                .with_frontend_attributes(attributes.clone()),
        )
        .unwrap();
    let fresh = computation.replace_with_new_node(old, Node::multiply(f32_array([4]), p0, p0)).unwrap();
    let fresh = computation.node(fresh).unwrap();
    assert_eq!(fresh.metadata().op_name, "model/add");
    assert_eq!(fresh.frontend_attributes(), &attributes);

    let named = computation.root().unwrap();
    let kept = computation
        .replace_with_new_node(
            named,
            Node::maximum(f32_array([4]), p0, p0).with_metadata(OpMetadata::named("model/max")),
        )
        .unwrap();
    assert_eq!(computation.node(kept).unwrap().metadata().op_name, "model/max");
}

#[test]
fn test_replace_node_transfers_control_edges() {
    let (mut computation, [p0, add, mul]) = diamond();
    let before = computation.add_node(Node::parameter(1, f32_array([4])).with_name("before")).unwrap();
    let after = computation.add_node(Node::parameter(2, f32_array([4])).with_name("after")).unwrap();
    computation.add_control_dependency(before, add).unwrap();
    computation.add_control_dependency(add, after).unwrap();

    let replacement = computation.add_node(Node::multiply(f32_array([4]), p0, p0)).unwrap();
    computation.replace_node(add, replacement).unwrap();

    let node = computation.node(replacement).unwrap();
    assert_eq!(node.control_predecessors(), &[before]);
    assert_eq!(node.control_successors(), &[after]);
    assert_eq!(computation.node(before).unwrap().control_successors(), &[replacement]);
    assert_eq!(computation.node(after).unwrap().control_predecessors(), &[replacement]);
    assert_eq!(computation.users(replacement).unwrap(), &[mul]);
    assert_use_lists_consistent(&computation);
}

#[test]
fn test_create_async_pair() {
    let mut computation = Computation::new("c");
    let shape = f32_array([8, 8]);
    let p0 = computation.add_node(Node::parameter(0, shape.clone())).unwrap();
    let fence = computation.add_node(Node::parameter(1, u32_scalar()).with_name("fence")).unwrap();
    let a2a = computation
        .add_node(
            Node::all_to_all(shape.clone(), [p0], Some(0), pairwise_opts())
                .with_name("a2a")
                .with_metadata(OpMetadata::named("model/a2a"))
                .with_backend_config([("stream", "2")].into_iter().collect()),
        )
        .unwrap();
    let consumer = computation.add_root(Node::add(shape.clone(), a2a, a2a).with_name("consumer")).unwrap();
    computation.add_control_dependency(fence, a2a).unwrap();
    computation.add_control_dependency(a2a, consumer).unwrap();

    let done = computation.create_async_pair(a2a, &[context_shape(), context_shape()]).unwrap();
    let done_node = computation.node(done).unwrap();
    let start = done_node.operand(0).unwrap();
    let start_node = computation.node(start).unwrap();

    assert_eq!(start_node.opcode(), Opcode::AsyncStart);
    assert_eq!(start_node.op().name(), "all-to-all-start");
    assert_eq!(done_node.op().name(), "all-to-all-done");
    assert_eq!(
        start_node.shape(),
        &Shape::tuple([Shape::tuple([shape.clone()]), shape.clone(), u32_scalar(), u32_scalar()])
    );
    assert_eq!(done_node.shape(), &shape);
    assert_eq!(start_node.operands(), &[p0]);

    assert_eq!(start_node.metadata().op_name, "model/a2a");
    assert_eq!(done_node.metadata().op_name, "model/a2a");
    assert_eq!(start_node.backend_config().get("stream"), Some("2"));
    assert_eq!(done_node.backend_config().get("stream"), Some("2"));

    assert_eq!(start_node.control_predecessors(), &[fence]);
    assert!(done_node.control_predecessors().is_empty());
    assert_eq!(done_node.control_successors(), &[consumer]);

    assert!(!computation.contains(a2a));
    assert_eq!(computation.node(consumer).unwrap().operands(), &[done, done]);
    assert_use_lists_consistent(&computation);
}

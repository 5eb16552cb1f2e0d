use tessera_ir::test::helpers::{assert_use_lists_consistent, f32_array};
use tessera_ir::{Computation, ExecutionThreads, Node, Opcode, Program, Schedule};

use crate::test::helpers::{collectives_program, convert, with_opcode};
use crate::{CollectiveKind, DeadCodeElimination, ModulePass};

#[test]
fn test_removes_unused_chain() {
    let mut computation = Computation::new("c");
    let p0 = computation.add_node(Node::parameter(0, f32_array([4]))).unwrap();
    let p1 = computation.add_node(Node::parameter(1, f32_array([4]))).unwrap();
    let dead = computation.add_node(Node::add(f32_array([4]), p0, p1)).unwrap();
    let dead_user = computation.add_node(Node::multiply(f32_array([4]), dead, dead)).unwrap();
    let root = computation.add_root(Node::maximum(f32_array([4]), p0, p0)).unwrap();

    let removed = DeadCodeElimination.run_on_computation(&mut computation).unwrap();

    assert_eq!(removed.len(), 2);
    assert!(!computation.contains(dead) && !computation.contains(dead_user));
    assert!(computation.contains(p1), "parameters are kept");
    assert_eq!(computation.node_ids(), vec![p0, p1, root]);
    assert_use_lists_consistent(&computation);
}

#[test]
fn test_keeps_side_effects_and_control_successors() {
    let mut computation = Computation::new("c");
    let p0 = computation.add_node(Node::parameter(0, f32_array([4]))).unwrap();
    let mut marker = Node::custom_call(f32_array([4]), [p0], "$marker");
    marker.set_side_effect(true);
    let marker = computation.add_node(marker).unwrap();
    let ordered = computation.add_node(Node::add(f32_array([4]), p0, p0)).unwrap();
    let root = computation.add_root(Node::multiply(f32_array([4]), p0, p0)).unwrap();
    computation.add_control_dependency(ordered, root).unwrap();

    let removed = DeadCodeElimination.run_on_computation(&mut computation).unwrap();

    assert!(removed.is_empty());
    assert!(computation.contains(marker) && computation.contains(ordered));
}

#[test]
fn test_tracked_permute_markers_survive() {
    let (mut program, handles) = collectives_program(true);
    assert!(convert(&mut program, &[CollectiveKind::CollectivePermute], true));

    let changed = DeadCodeElimination.run(&mut program, &ExecutionThreads::all()).unwrap();

    assert!(!changed);
    let computation = program.computation(handles.entry).unwrap();
    assert_eq!(with_opcode(computation, Opcode::CustomCall).len(), 2);
    program.schedule().unwrap().verify(&program).unwrap();
}

#[test]
fn test_schedule_drops_removed_nodes() {
    let mut program = Program::new("p");
    let mut computation = Computation::new("entry");
    let p0 = computation.add_node(Node::parameter(0, f32_array([4]))).unwrap();
    let dead = computation.add_node(Node::add(f32_array([4]), p0, p0)).unwrap();
    let root = computation.add_root(Node::multiply(f32_array([4]), p0, p0)).unwrap();
    let entry = program.add_entry_computation(computation);
    program.set_schedule(Schedule::post_order(&program));

    assert!(DeadCodeElimination.run(&mut program, &ExecutionThreads::all()).unwrap());

    let schedule = program.schedule().unwrap();
    assert_eq!(schedule.sequence(entry).unwrap(), &[p0, root]);
    assert!(!schedule.sequence(entry).unwrap().contains(&dead));
    schedule.verify(&program).unwrap();
}

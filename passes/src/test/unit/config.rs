use std::str::FromStr;

use test_case::test_case;

use tessera_ir::test::helpers::{f32_array, pairwise_opts};
use tessera_ir::{ComputationId, Node, NodeId};

use crate::async_collective::config::parse_kinds;
use crate::async_collective::{always, predicate};
use crate::{AsyncCollectiveConfig, CollectiveKind};

fn all_reduce() -> Node {
    Node::all_reduce(f32_array([4]), [NodeId::from_raw(0)], ComputationId::from_raw(0), pairwise_opts())
}

fn permute() -> Node {
    Node::collective_permute(f32_array([4]), NodeId::from_raw(0), vec![(0, 1)], None)
}

#[test_case(CollectiveKind::AllReduce, "all-reduce")]
#[test_case(CollectiveKind::AllGather, "all-gather")]
#[test_case(CollectiveKind::CollectivePermute, "collective-permute")]
#[test_case(CollectiveKind::AllToAll, "all-to-all")]
fn test_kind_spelling(kind: CollectiveKind, spelling: &str) {
    assert_eq!(kind.to_string(), spelling);
    assert_eq!(CollectiveKind::from_str(spelling).unwrap(), kind);
}

#[test_case("", &[] ; "empty")]
#[test_case("all-reduce", &[CollectiveKind::AllReduce] ; "single")]
#[test_case(" all-gather , all-to-all ", &[CollectiveKind::AllGather, CollectiveKind::AllToAll] ; "padded list")]
#[test_case("all-reduce,all-reduce", &[CollectiveKind::AllReduce] ; "duplicates")]
#[test_case("all-reduce,bogus", &[CollectiveKind::AllReduce] ; "unknown skipped")]
#[test_case("ALL", &CollectiveKind::ALL ; "all")]
fn test_parse_kinds(value: &str, expected: &[CollectiveKind]) {
    assert_eq!(parse_kinds(value), expected);
}

#[test]
fn test_default_converts_nothing() {
    let config = AsyncCollectiveConfig::default();
    assert_eq!(config.should_convert(&all_reduce()), None);
    assert_eq!(config.should_convert(&permute()), None);
    assert!(!config.tracks_send_recv_separately(&permute()));
}

#[test]
fn test_for_kinds() {
    let config = AsyncCollectiveConfig::for_kinds(&[CollectiveKind::CollectivePermute], true);
    assert_eq!(config.should_convert(&permute()), Some(CollectiveKind::CollectivePermute));
    assert_eq!(config.should_convert(&all_reduce()), None);
    assert!(config.tracks_send_recv_separately(&permute()));
}

#[test]
fn test_non_collectives_are_never_selected() {
    let config = AsyncCollectiveConfig::for_kinds(&CollectiveKind::ALL, false);
    let add = Node::add(f32_array([4]), NodeId::from_raw(0), NodeId::from_raw(1));
    assert_eq!(config.should_convert(&add), None);
    assert_eq!(CollectiveKind::of(add.op()), None);
}

#[test]
fn test_builder_predicates() {
    let config = AsyncCollectiveConfig::builder()
        .convert_all_reduce(predicate(|node| node.op().channel_id().is_some()))
        .track_send_recv_separately(always())
        .build();
    assert_eq!(config.should_convert(&all_reduce()), Some(CollectiveKind::AllReduce));
    assert_eq!(config.should_convert(&permute()), None);
    assert!(config.tracks_send_recv_separately(&permute()));
    assert_eq!(format!("{config:?}"), "AsyncCollectiveConfig { .. }");
}

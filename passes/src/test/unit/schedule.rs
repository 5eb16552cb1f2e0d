use std::collections::HashMap;

use tessera_ir::NodeId;

use crate::async_collective::ReplacedAsync;
use crate::async_collective::schedule::splice_sequence;

fn ids(raw: &[u32]) -> Vec<NodeId> {
    raw.iter().copied().map(NodeId::from_raw).collect()
}

#[test]
fn test_splice_replaces_in_place() {
    let sequence = ids(&[0, 1, 2, 3]);
    let replaced = HashMap::from([
        (NodeId::from_raw(1), ReplacedAsync::new(NodeId::from_raw(10), NodeId::from_raw(11))),
        (NodeId::from_raw(3), ReplacedAsync::new(NodeId::from_raw(12), NodeId::from_raw(13))),
    ]);
    assert_eq!(splice_sequence(&sequence, &replaced), ids(&[0, 10, 11, 2, 12, 13]));
}

#[test]
fn test_splice_emits_send_marker_after_receive() {
    let sequence = ids(&[0, 1, 2]);
    let pair =
        ReplacedAsync { start: NodeId::from_raw(5), done: NodeId::from_raw(6), send_done: Some(NodeId::from_raw(7)) };
    let replaced = HashMap::from([(NodeId::from_raw(1), pair)]);
    assert_eq!(splice_sequence(&sequence, &replaced), ids(&[0, 5, 6, 7, 2]));
    assert_eq!(pair.sequence().collect::<Vec<_>>(), ids(&[5, 6, 7]));
}

#[test]
fn test_splice_without_replacements_copies() {
    let sequence = ids(&[4, 2, 9]);
    assert_eq!(splice_sequence(&sequence, &HashMap::new()), sequence);
}

#[test]
fn test_entries_missing_from_sequence_are_ignored() {
    let sequence = ids(&[0, 2]);
    let replaced = HashMap::from([(NodeId::from_raw(1), ReplacedAsync::new(NodeId::from_raw(3), NodeId::from_raw(4)))]);
    assert_eq!(splice_sequence(&sequence, &replaced), sequence);
}

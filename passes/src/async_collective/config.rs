//! Conversion predicates for the async collective creator.
//!
//! Provides typed configuration with bon builders. Supports both explicit
//! configuration and environment variable fallbacks.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bon::bon;
use tessera_ir::{Node, Op};

/// Decision function over a candidate node.
pub type NodePredicate = Arc<dyn Fn(&Node) -> bool + Send + Sync>;

/// Wrap a closure as a [`NodePredicate`].
pub fn predicate(f: impl Fn(&Node) -> bool + Send + Sync + 'static) -> NodePredicate {
    Arc::new(f)
}

/// Predicate rejecting every node.
pub fn never() -> NodePredicate {
    predicate(|_| false)
}

/// Predicate accepting every node.
pub fn always() -> NodePredicate {
    predicate(|_| true)
}

// ============================================================================
// COLLECTIVE FAMILIES
// ============================================================================

/// Synchronous collective family with an asynchronous counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumString, strum::IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum CollectiveKind {
    AllReduce,
    AllGather,
    CollectivePermute,
    AllToAll,
}

impl CollectiveKind {
    pub const ALL: [CollectiveKind; 4] = [Self::AllReduce, Self::AllGather, Self::CollectivePermute, Self::AllToAll];

    /// Family of a synchronous collective operation.
    pub fn of(op: &Op) -> Option<Self> {
        match op {
            Op::AllReduce(_) => Some(Self::AllReduce),
            Op::AllGather(_) => Some(Self::AllGather),
            Op::CollectivePermute(_) => Some(Self::CollectivePermute),
            Op::AllToAll(_) => Some(Self::AllToAll),
            _ => None,
        }
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Which collectives to convert, and how to complete converted permutes.
///
/// Every predicate defaults to "never".
#[derive(Clone)]
pub struct AsyncCollectiveConfig {
    pub convert_all_reduce: NodePredicate,
    pub convert_all_gather: NodePredicate,
    pub convert_collective_permute: NodePredicate,
    pub convert_all_to_all: NodePredicate,
    /// Complete a converted permute with separate receive and send markers
    /// instead of a single done node.
    pub track_send_recv_separately: NodePredicate,
}

impl Default for AsyncCollectiveConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[bon]
impl AsyncCollectiveConfig {
    /// Create a configuration with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(default = never())] convert_all_reduce: NodePredicate,
        #[builder(default = never())] convert_all_gather: NodePredicate,
        #[builder(default = never())] convert_collective_permute: NodePredicate,
        #[builder(default = never())] convert_all_to_all: NodePredicate,
        #[builder(default = never())] track_send_recv_separately: NodePredicate,
    ) -> Self {
        Self {
            convert_all_reduce,
            convert_all_gather,
            convert_collective_permute,
            convert_all_to_all,
            track_send_recv_separately,
        }
    }

    /// Convert every node of the listed families unconditionally.
    pub fn for_kinds(kinds: &[CollectiveKind], track_send_recv_separately: bool) -> Self {
        let enabled = |kind| if kinds.contains(&kind) { always() } else { never() };
        Self {
            convert_all_reduce: enabled(CollectiveKind::AllReduce),
            convert_all_gather: enabled(CollectiveKind::AllGather),
            convert_collective_permute: enabled(CollectiveKind::CollectivePermute),
            convert_all_to_all: enabled(CollectiveKind::AllToAll),
            track_send_recv_separately: if track_send_recv_separately { always() } else { never() },
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `TESSERA_ASYNC_COLLECTIVES` - Comma separated families to convert
    ///   (`all-reduce`, `all-gather`, `collective-permute`, `all-to-all`), or
    ///   `all` (default: none)
    /// * `TESSERA_CP_TRACK_SEND_RECV` - Track permute send and receive completion separately if set
    pub fn from_env() -> Self {
        let kinds = std::env::var("TESSERA_ASYNC_COLLECTIVES").map(|value| parse_kinds(&value)).unwrap_or_default();
        let track = std::env::var("TESSERA_CP_TRACK_SEND_RECV").is_ok();
        Self::for_kinds(&kinds, track)
    }

    /// Predicate of one family.
    pub fn predicate(&self, kind: CollectiveKind) -> &NodePredicate {
        match kind {
            CollectiveKind::AllReduce => &self.convert_all_reduce,
            CollectiveKind::AllGather => &self.convert_all_gather,
            CollectiveKind::CollectivePermute => &self.convert_collective_permute,
            CollectiveKind::AllToAll => &self.convert_all_to_all,
        }
    }

    /// Family of `node` if it is a synchronous collective its predicate accepts.
    pub fn should_convert(&self, node: &Node) -> Option<CollectiveKind> {
        CollectiveKind::of(node.op()).filter(|&kind| (self.predicate(kind))(node))
    }

    pub fn tracks_send_recv_separately(&self, node: &Node) -> bool {
        (self.track_send_recv_separately)(node)
    }
}

impl fmt::Debug for AsyncCollectiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncCollectiveConfig").finish_non_exhaustive()
    }
}

/// Parse a comma separated family list. Unknown entries are skipped with a warning.
pub(crate) fn parse_kinds(value: &str) -> Vec<CollectiveKind> {
    let mut kinds = Vec::new();
    for entry in value.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        if entry.eq_ignore_ascii_case("all") {
            return CollectiveKind::ALL.to_vec();
        }
        match CollectiveKind::from_str(entry) {
            Ok(kind) if !kinds.contains(&kind) => kinds.push(kind),
            Ok(_) => {}
            Err(_) => tracing::warn!(entry, "ignoring unknown collective family"),
        }
    }
    kinds
}

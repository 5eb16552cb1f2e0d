//! Identifiers and attribute payloads shared across the IR.

use std::collections::BTreeMap;

use smallvec::SmallVec;

// =========================================================================
// Handles
// =========================================================================

/// Stable handle to a node inside its owning computation.
///
/// Handles are never reused: once a node is removed its id stays dead, so it
/// is safe to use as a map key across graph rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("#{_0}")]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Handle with the given slot index. Only meaningful for the computation that issued it.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Position of the node's slot in the computation arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable handle to a computation inside its owning program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("computation#{_0}")]
pub struct ComputationId(pub(crate) u32);

impl ComputationId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// =========================================================================
// Constants
// =========================================================================

/// Scalar literal held by a constant node.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display)]
pub enum ConstValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

// =========================================================================
// Collective attributes
// =========================================================================

/// Set of replicas that take part in one instance of a collective.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ReplicaGroup {
    pub replica_ids: SmallVec<[i64; 8]>,
}

impl ReplicaGroup {
    pub fn new(replica_ids: impl IntoIterator<Item = i64>) -> Self {
        Self { replica_ids: replica_ids.into_iter().collect() }
    }
}

impl std::fmt::Display for ReplicaGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.replica_ids.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{id}")?;
        }
        write!(f, "}}")
    }
}

/// `(source, target)` replica pair of a collective permute.
pub type SourceTargetPair = (i64, i64);

/// Attributes common to every grouped collective (all-reduce, all-gather, all-to-all).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, bon::Builder)]
pub struct CollectiveOpts {
    #[builder(default)]
    pub replica_groups: Vec<ReplicaGroup>,
    #[builder(default)]
    pub constrain_layout: bool,
    pub channel_id: Option<i64>,
    #[builder(default)]
    pub use_global_device_ids: bool,
}

// =========================================================================
// Metadata and configuration
// =========================================================================

/// Debug information attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OpMetadata {
    pub op_type: String,
    pub op_name: String,
    pub source_file: String,
    pub source_line: u32,
}

impl OpMetadata {
    pub fn named(op_name: impl Into<String>) -> Self {
        Self { op_name: op_name.into(), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Opaque backend configuration, stored as key-value pairs.
///
/// The IR never interprets these entries; passes only copy them between nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BackendConfig(BTreeMap<String, String>);

impl BackendConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BackendConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Frontend attributes: string annotations set by the program producer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FrontendAttributes(BTreeMap<String, String>);

impl FrontendAttributes {
    /// Marks an in-place collective permute whose source and destination slices never overlap.
    pub const DISJOINT_READ_WRITE_REGIONS: &'static str = "_disjoint_read_write_regions";

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FrontendAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

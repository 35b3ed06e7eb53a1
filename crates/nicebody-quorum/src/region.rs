//! Validators and the regions that group them.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use nicebody_topology::{RegionId, Tags};
use serde::{Deserialize, Serialize};

/// Identifier of a node (validator or not).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node id.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The node name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A group of validators sharing one quorum configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    /// Region name
    pub id: RegionId,
    /// Locality used to rank neighbors
    pub tags: Tags,
    /// Validators living in the region
    pub validators: BTreeSet<NodeId>,
}

impl Region {
    /// Create a region from its validators.
    pub fn new<I, V>(id: impl Into<RegionId>, tags: Tags, validators: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<NodeId>,
    {
        Self {
            id: id.into(),
            tags,
            validators: validators.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of validators in the region.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether the region has no validators.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

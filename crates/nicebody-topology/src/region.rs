//! Region identifiers.

use std::borrow::Borrow;
use std::fmt;

/// Name of a region, ordered lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RegionId(pub String);

impl RegionId {
    /// Create a region id.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The region name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RegionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for RegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// An unordered pair of regions, stored with the smaller id first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegionPair {
    pub first: RegionId,
    pub second: RegionId,
}

impl RegionPair {
    /// Create the canonical pair for two regions, in either order.
    pub fn new(a: RegionId, b: RegionId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Whether `region` is one end of this pair.
    pub fn contains(&self, region: &RegionId) -> bool {
        &self.first == region || &self.second == region
    }

    /// The other end of the pair, if `region` is one of its ends.
    pub fn other(&self, region: &RegionId) -> Option<&RegionId> {
        if &self.first == region {
            Some(&self.second)
        } else if &self.second == region {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl fmt::Display for RegionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

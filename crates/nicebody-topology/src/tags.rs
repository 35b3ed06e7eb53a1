//! Region tags and the tag distance metric.
//!
//! ```text
//! same ring position:  (len - i) / (len * 10)   i = first mismatching tail index
//! other position:      arc / 10                 arc = shorter way round the ring
//! ```
//!
//! A same-position pair is therefore never farther than `0.1`, and a
//! cross-position pair never nearer than `0.1`.

use crate::{Distance, Result, TopologyError, DISTANCE_SCALE, RING_HALF, RING_SIZE};

/// Hierarchical locality descriptor of a region.
///
/// `tags[0]` is the ring position, the rest refine it from coarse to fine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<u8>", into = "Vec<u8>"))]
pub struct Tags(Vec<u8>);

impl Tags {
    /// Build tags, checking that the ring position is present and on the ring.
    pub fn new(tags: Vec<u8>) -> Result<Self> {
        let position = *tags.first().ok_or(TopologyError::EmptyTags)?;
        if position >= RING_SIZE {
            return Err(TopologyError::RingOutOfRange {
                position,
                ring_size: RING_SIZE,
            });
        }
        Ok(Self(tags))
    }

    /// Position on the locality ring.
    pub fn ring(&self) -> u8 {
        self.0[0]
    }

    /// Finer-grained hierarchy below the ring position.
    pub fn hierarchy(&self) -> &[u8] {
        &self.0[1..]
    }

    /// All tags, ring position first.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Distance between two tag vectors, in `[0, 1)`.
    pub fn distance(&self, other: &Self) -> Distance {
        if self.ring() == other.ring() {
            let (num, den) = hierarchy_mismatch(self.hierarchy(), other.hierarchy());
            return Distance::new(num, den * DISTANCE_SCALE);
        }

        Distance::new(ring_arc(self.ring(), other.ring()) as u32, DISTANCE_SCALE)
    }
}

impl TryFrom<Vec<u8>> for Tags {
    type Error = TopologyError;

    fn try_from(tags: Vec<u8>) -> Result<Self> {
        Self::new(tags)
    }
}

impl From<Tags> for Vec<u8> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

/// Shorter arc between two ring positions.
fn ring_arc(a: u8, b: u8) -> u8 {
    let d = a.abs_diff(b);
    if d > RING_HALF {
        RING_SIZE - a.max(b) + a.min(b)
    } else {
        d
    }
}

/// Mismatch ratio `1 - i/len` of two hierarchies as a `(num, den)` fraction.
///
/// The shorter hierarchy is padded with "no value", so a missing level is a
/// mismatch. Empty hierarchies on both sides compare as identical.
fn hierarchy_mismatch(a: &[u8], b: &[u8]) -> (u32, u32) {
    let len = a.len().max(b.len());
    if len == 0 {
        return (0, 1);
    }
    let first_mismatch = (0..len)
        .find(|&i| a.get(i) != b.get(i))
        .unwrap_or(len);
    ((len - first_mismatch) as u32, len as u32)
}

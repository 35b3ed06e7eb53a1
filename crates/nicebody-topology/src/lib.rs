//! Nice Body Region Topology
//!
//! Regions are placed by a short vector of tags. The first tag is a position
//! on a ring of [`RING_SIZE`] slots, the remaining tags describe a finer
//! hierarchy inside that position (datacenter, rack, ...).
//!
//! # Tag Distance
//!
//! Two regions on different ring positions are as far apart as the shorter
//! arc between them. Two regions on the same position are compared by how
//! deep their hierarchies agree, scaled into the first tenth of the range so
//! that any same-position pair is nearer than any cross-position pair.
//!
//! # Distance Index
//!
//! [`DistanceIndex`] computes every unordered pair once and answers "which
//! regions are nearest to this one", grouping equidistant regions so the
//! caller can break ties however it likes.

mod distance;
mod error;
mod index;
mod region;
mod tags;

pub use distance::Distance;
pub use error::{Result, TopologyError};
pub use index::{DistanceGroup, DistanceIndex};
pub use region::{RegionId, RegionPair};
pub use tags::Tags;

/// Number of slots on the locality ring (`tags[0]` ranges over `0..RING_SIZE`).
pub const RING_SIZE: u8 = 10;

/// Longest possible arc between two ring positions.
pub const RING_HALF: u8 = RING_SIZE / 2;

/// Scale applied to every raw distance so results land in `[0, 1)`.
pub const DISTANCE_SCALE: u32 = RING_SIZE as u32;

const _: () = assert!(RING_HALF * 2 == RING_SIZE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farthest_ring_distance_below_one() {
        let a = Tags::new(vec![0]).unwrap();
        let b = Tags::new(vec![RING_HALF]).unwrap();
        let d = a.distance(&b);
        assert_eq!(d, Distance::new(RING_HALF as u32, DISTANCE_SCALE));
        assert!(d < Distance::ONE);
    }
}

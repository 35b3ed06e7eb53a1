//! Nearest-region ranking.
//!
//! The index is symmetric by construction: a pair is stored once under its
//! canonical [`RegionPair`] key and looked up the same way from either end.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Distance, RegionId, RegionPair, Tags};

/// All regions at one distance from some origin region.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DistanceGroup {
    /// Distance shared by every region in the group
    pub distance: Distance,
    /// Equidistant regions, in id order
    pub regions: BTreeSet<RegionId>,
}

/// Pairwise tag distances between a fixed set of regions.
#[derive(Debug, Clone, Default)]
pub struct DistanceIndex {
    regions: BTreeSet<RegionId>,
    distances: BTreeMap<RegionPair, Distance>,
}

impl DistanceIndex {
    /// Compute the distance of every unordered pair of regions once.
    pub fn new<'a, I>(regions: I) -> Self
    where
        I: IntoIterator<Item = (&'a RegionId, &'a Tags)>,
    {
        let tagged: BTreeMap<&RegionId, &Tags> = regions.into_iter().collect();
        let names: Vec<&RegionId> = tagged.keys().copied().collect();

        let mut distances = BTreeMap::new();
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                let d = tagged[a].distance(tagged[b]);
                distances.insert(RegionPair::new((*a).clone(), (*b).clone()), d);
            }
        }

        Self {
            regions: names.into_iter().cloned().collect(),
            distances,
        }
    }

    /// Number of indexed regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the index holds no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Indexed regions in id order.
    pub fn regions(&self) -> impl Iterator<Item = &RegionId> {
        self.regions.iter()
    }

    /// Distance between two indexed regions.
    pub fn distance(&self, a: &RegionId, b: &RegionId) -> Option<Distance> {
        if a == b {
            return self.regions.contains(a).then_some(Distance::ZERO);
        }
        self.distances
            .get(&RegionPair::new(a.clone(), b.clone()))
            .copied()
    }

    /// Every other region grouped by distance from `region`, nearest first.
    ///
    /// Unknown regions have no neighbors.
    pub fn groups(&self, region: &RegionId) -> Vec<DistanceGroup> {
        let mut by_distance: BTreeMap<Distance, BTreeSet<RegionId>> = BTreeMap::new();
        for (pair, distance) in &self.distances {
            if let Some(other) = pair.other(region) {
                by_distance
                    .entry(*distance)
                    .or_default()
                    .insert(other.clone());
            }
        }

        by_distance
            .into_iter()
            .map(|(distance, regions)| DistanceGroup { distance, regions })
            .collect()
    }
}

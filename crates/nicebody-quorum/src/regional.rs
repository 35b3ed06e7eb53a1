//! Regional quorum orchestration.
//!
//! Regions are visited in id order. Each one is composed with one region
//! from each of its `near_region_count` nearest distance groups, on the
//! *current* working quorums: a region composed earlier in the walk brings
//! everything it has absorbed so far into later pairs.
//!
//! The result is a sparse, small-world-like graph of roughly
//! `regions × near_region_count` links instead of a full mesh.

use std::collections::{BTreeMap, BTreeSet};

use nicebody_topology::{DistanceIndex, RegionId, RegionPair};
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::compose::{compose_pair, PairComposition};
use crate::error::{Error, Result};
use crate::region::{NodeId, Region};

/// Number of near regions each region connects to unless configured.
pub const DEFAULT_NEAR_REGIONS: usize = 2;

/// Global composition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalParameters {
    /// Failures every quorum must tolerate (`F`)
    pub failure: usize,
    /// Nearest distance groups each region is composed with
    pub near_region_count: usize,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            failure: 1,
            near_region_count: DEFAULT_NEAR_REGIONS,
        }
    }
}

impl GlobalParameters {
    /// Create parameters, rejecting a failure bound below one.
    pub fn new(failure: usize, near_region_count: usize) -> Result<Self> {
        if failure < 1 {
            return Err(Error::InvalidFailure(failure));
        }
        Ok(Self {
            failure,
            near_region_count,
        })
    }

    /// Limit the near region count to the other `region_count - 1` regions.
    pub fn clamped(self, region_count: usize) -> Self {
        let max = region_count.saturating_sub(1);
        if self.near_region_count > max {
            warn!(
                requested = self.near_region_count,
                clamped = max,
                "near region count exceeds the number of other regions"
            );
            return Self {
                near_region_count: max,
                ..self
            };
        }
        self
    }
}

/// Final quorum of every region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuorumAssignment(BTreeMap<RegionId, BTreeSet<NodeId>>);

impl QuorumAssignment {
    /// Start every region from its own validators.
    pub fn from_regions(regions: &BTreeMap<RegionId, Region>) -> Self {
        Self(
            regions
                .iter()
                .map(|(id, region)| (id.clone(), region.validators.clone()))
                .collect(),
        )
    }

    /// Quorum of `region`.
    pub fn get(&self, region: &RegionId) -> Option<&BTreeSet<NodeId>> {
        self.0.get(region)
    }

    /// Regions with their quorums, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&RegionId, &BTreeSet<NodeId>)> {
        self.0.iter()
    }

    pub fn regions(&self) -> impl Iterator<Item = &RegionId> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn quorum(&self, region: &RegionId) -> Result<&BTreeSet<NodeId>> {
        self.0
            .get(region)
            .ok_or_else(|| Error::UnknownRegion(region.clone()))
    }

    fn replace(&mut self, region: &RegionId, quorum: BTreeSet<NodeId>) {
        self.0.insert(region.clone(), quorum);
    }
}

/// A finished composition: final quorums plus the pairs that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Composition {
    pub assignment: QuorumAssignment,
    /// Every composed pair, in composition order
    pub links: Vec<PairComposition>,
}

impl Composition {
    /// Regions composed directly with `region`.
    pub fn neighbors(&self, region: &RegionId) -> BTreeSet<RegionId> {
        self.links
            .iter()
            .filter_map(|link| link.pair().other(region).cloned())
            .collect()
    }

    /// The composition of `pair`, if it was composed.
    pub fn link(&self, pair: &RegionPair) -> Option<&PairComposition> {
        self.links.iter().find(|link| &link.pair() == pair)
    }
}

/// Composes every region with its near regions.
#[derive(Debug)]
pub struct RegionalQuorum<'a> {
    regions: &'a BTreeMap<RegionId, Region>,
    params: GlobalParameters,
}

impl<'a> RegionalQuorum<'a> {
    pub fn new(regions: &'a BTreeMap<RegionId, Region>, params: GlobalParameters) -> Result<Self> {
        let params = GlobalParameters::new(params.failure, params.near_region_count)?;
        Ok(Self {
            regions,
            params: params.clamped(regions.len()),
        })
    }

    /// Effective parameters after clamping.
    pub fn params(&self) -> GlobalParameters {
        self.params
    }

    /// Compose all regions, breaking distance ties with `rng`.
    ///
    /// All or nothing: the first pair that cannot be composed aborts the run.
    pub fn compose<R>(&self, index: &DistanceIndex, rng: &mut R) -> Result<Composition>
    where
        R: Rng + ?Sized,
    {
        let mut assignment = QuorumAssignment::from_regions(self.regions);
        let mut connected: BTreeSet<RegionPair> = BTreeSet::new();
        let mut links = Vec::new();

        for region in self.regions.keys() {
            let groups = index.groups(region);
            for group in groups.iter().take(self.params.near_region_count) {
                let Some(near) = group.regions.iter().choose(rng) else {
                    continue;
                };

                let pair = RegionPair::new(region.clone(), near.clone());
                if connected.contains(&pair) {
                    continue;
                }

                debug!(%pair, distance = %group.distance, "composing near regions");
                let link = compose_pair(
                    region,
                    assignment.quorum(region)?,
                    near,
                    assignment.quorum(near)?,
                    self.params.failure,
                )
                .map_err(|e| {
                    error!(%pair, "failed to compose quorums");
                    Error::CompositionFailed {
                        pair: pair.clone(),
                        source: Box::new(e),
                    }
                })?;

                assignment.replace(region, link.quorum_a.clone());
                assignment.replace(near, link.quorum_b.clone());
                connected.insert(pair);
                links.push(link);
            }
        }

        info!(
            regions = assignment.len(),
            links = links.len(),
            "regional quorums composed"
        );
        Ok(Composition { assignment, links })
    }
}

/// Compose `regions` with a distance index built from their tags and a
/// random source seeded with `seed`.
///
/// Regions are identified by their map keys throughout.
pub fn compose(
    regions: &BTreeMap<RegionId, Region>,
    params: GlobalParameters,
    seed: u64,
) -> Result<Composition> {
    let index = DistanceIndex::new(regions.iter().map(|(id, r)| (id, &r.tags)));
    let mut rng = StdRng::seed_from_u64(seed);
    RegionalQuorum::new(regions, params)?.compose(&index, &mut rng)
}

//! Pairwise quorum composition.
//!
//! Among the candidates that pass all three stages, the composer picks the
//! one adding the least trust:
//!
//! ```text
//! min (safety_a + safety_b, |ra ∩ C|, liveness_a + liveness_b)
//! ```
//!
//! i.e. the tightest safety margin, then the fewest of `a`'s own validators,
//! then the tightest liveness margin. Ties keep enumeration order.

use std::collections::BTreeSet;

use nicebody_topology::{RegionId, RegionPair};
use serde::Serialize;
use tracing::{debug, error};

use crate::commons::{AvailableCommons, Candidate};
use crate::error::{Error, Result};
use crate::region::NodeId;
use crate::threshold::Margins;

/// Ordering key of a candidate; smaller is better.
pub type SelectionKey = (i64, usize, i64);

/// Selection key of `candidate` relative to side `a`'s working quorum.
pub fn selection_key(ra: &BTreeSet<NodeId>, candidate: &Candidate) -> SelectionKey {
    (
        candidate.margins.safety.sum(),
        ra.intersection(&candidate.members).count(),
        candidate.margins.liveness.sum(),
    )
}

/// Pick the first candidate with the smallest [`selection_key`].
pub fn select<'c>(ra: &BTreeSet<NodeId>, candidates: &'c [Candidate]) -> Option<&'c Candidate> {
    candidates.iter().min_by_key(|c| selection_key(ra, c))
}

/// Outcome of composing one pair of regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairComposition {
    pub region_a: RegionId,
    pub region_b: RegionId,
    /// Validators both regions now trust
    pub common: BTreeSet<NodeId>,
    /// Size of the union of both working quorums before merging
    pub union: usize,
    pub margins: Margins,
    /// `ra ∪ common`
    pub quorum_a: BTreeSet<NodeId>,
    /// `rb ∪ common`
    pub quorum_b: BTreeSet<NodeId>,
}

impl PairComposition {
    pub fn pair(&self) -> RegionPair {
        RegionPair::new(self.region_a.clone(), self.region_b.clone())
    }
}

/// Compose the working quorums `ra` of `region_a` and `rb` of `region_b`.
///
/// Fails if any filter stage leaves no candidate; failures are not retried.
pub fn compose_pair(
    region_a: &RegionId,
    ra: &BTreeSet<NodeId>,
    region_b: &RegionId,
    rb: &BTreeSet<NodeId>,
    failure: usize,
) -> Result<PairComposition> {
    let commons = AvailableCommons::new(region_a, ra, region_b, rb, failure);
    let candidates = commons.safety_candidates().map_err(|e| {
        error!(pair = %commons.pair(), error = %e, "commons not found");
        e
    })?;

    let chosen = select(ra, candidates).ok_or_else(|| Error::NoCandidateSatisfiesSafety {
        pair: commons.pair().clone(),
        examined: 0,
    })?;

    debug!(
        pair = %commons.pair(),
        common = ?chosen.members,
        safety = chosen.margins.safety.sum(),
        liveness = chosen.margins.liveness.sum(),
        "common selected"
    );

    Ok(PairComposition {
        region_a: region_a.clone(),
        region_b: region_b.clone(),
        common: chosen.members.clone(),
        union: commons.union_len(),
        margins: chosen.margins,
        quorum_a: ra.union(&chosen.members).cloned().collect(),
        quorum_b: rb.union(&chosen.members).cloned().collect(),
    })
}

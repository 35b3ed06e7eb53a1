//! Candidate common validator sets between two regions.
//!
//! [`AvailableCommons`] enumerates block unions of the pair's validators
//! and narrows them down in three stages:
//!
//! 1. **min size**: both quorums, once the candidate is merged in, keep at
//!    least `3F + 1` validators;
//! 2. **liveness**: at least `F` validators of the union stay outside the
//!    candidate;
//! 3. **safety**: the candidate is large enough that any two quorums of the
//!    pair intersect in an honest validator.
//!
//! Each stage reads the previous stage's survivors and is computed at most
//! once per instance.

use std::cell::OnceCell;
use std::cmp::Reverse;
use std::collections::BTreeSet;

use nicebody_topology::{RegionId, RegionPair};
use tracing::{debug, error, trace};

use crate::blocks::{self, MAX_BLOCKS_PER_SIDE};
use crate::error::{Error, Result};
use crate::region::NodeId;
use crate::threshold::{min_quorum_size, Margins};

/// A candidate common set with its margins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub members: BTreeSet<NodeId>,
    pub margins: Margins,
}

impl Candidate {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Survivors of one stage and how many candidates the stage looked at.
#[derive(Debug, Default)]
struct Stage {
    examined: usize,
    survivors: Vec<Candidate>,
}

/// Candidate common sets for one pair of working quorums.
pub struct AvailableCommons<'a> {
    pair: RegionPair,
    region_a: &'a RegionId,
    region_b: &'a RegionId,
    ra: &'a BTreeSet<NodeId>,
    rb: &'a BTreeSet<NodeId>,
    failure: usize,
    min_size: usize,
    union: usize,

    min_size_stage: OnceCell<Stage>,
    liveness_stage: OnceCell<Stage>,
    safety_stage: OnceCell<Stage>,
}

impl<'a> AvailableCommons<'a> {
    pub fn new(
        region_a: &'a RegionId,
        ra: &'a BTreeSet<NodeId>,
        region_b: &'a RegionId,
        rb: &'a BTreeSet<NodeId>,
        failure: usize,
    ) -> Self {
        Self {
            pair: RegionPair::new(region_a.clone(), region_b.clone()),
            region_a,
            region_b,
            ra,
            rb,
            failure,
            min_size: min_quorum_size(failure),
            union: ra.union(rb).count(),
            min_size_stage: OnceCell::new(),
            liveness_stage: OnceCell::new(),
            safety_stage: OnceCell::new(),
        }
    }

    pub fn pair(&self) -> &RegionPair {
        &self.pair
    }

    /// Size of the union of both working quorums.
    pub fn union_len(&self) -> usize {
        self.union
    }

    /// Every block union of the pair, fewest blocks first.
    ///
    /// Side `a` is cut into blocks first, then the validators of `b` that
    /// `a` does not already have.
    pub fn candidates(&self) -> impl Iterator<Item = BTreeSet<NodeId>> + 'a {
        let side_a: Vec<&NodeId> = self.ra.iter().collect();
        let side_b: Vec<&NodeId> = self.rb.difference(self.ra).collect();

        debug!(
            pair = %self.pair,
            a = side_a.len(),
            b = side_b.len(),
            "partitioning validators into blocks"
        );

        let mut all = blocks::partition(&side_a, MAX_BLOCKS_PER_SIDE);
        all.extend(blocks::partition(&side_b, MAX_BLOCKS_PER_SIDE));

        blocks::combinations(all).map(|members| members.into_iter().cloned().collect())
    }

    /// Candidates that keep both quorums at or above `3F + 1`.
    pub fn min_size_candidates(&self) -> Result<&[Candidate]> {
        self.check_base_sizes()?;
        let stage = self.min_size_stage.get_or_init(|| self.filter_min_size());
        if stage.survivors.is_empty() {
            return Err(Error::NoCandidateSatisfiesMinSize {
                pair: self.pair.clone(),
                examined: stage.examined,
            });
        }
        Ok(&stage.survivors)
    }

    /// Min-size survivors that leave at least `F` validators outside.
    pub fn liveness_candidates(&self) -> Result<&[Candidate]> {
        let previous = self.min_size_candidates()?;
        let stage = self.liveness_stage.get_or_init(|| {
            self.filter_stage(previous, "liveness", |c| {
                trace!(
                    pair = %self.pair,
                    check = "|U| - |C| - F >= 0",
                    union = self.union,
                    common = c.len(),
                    failure = self.failure,
                    margin = c.margins.liveness.a,
                    "liveness check"
                );
                c.margins.liveness.holds()
            })
        });
        if stage.survivors.is_empty() {
            return Err(Error::NoCandidateSatisfiesLiveness {
                pair: self.pair.clone(),
                examined: stage.examined,
            });
        }
        Ok(&stage.survivors)
    }

    /// Liveness survivors large enough to guarantee quorum intersection.
    pub fn safety_candidates(&self) -> Result<&[Candidate]> {
        let previous = self.liveness_candidates()?;
        let stage = self.safety_stage.get_or_init(|| {
            self.filter_stage(previous, "safety", |c| {
                trace!(
                    pair = %self.pair,
                    check = "2|C| - |U| - 1 - F >= 0",
                    union = self.union,
                    common = c.len(),
                    failure = self.failure,
                    margin = c.margins.safety.a,
                    "safety check"
                );
                c.margins.safety.holds()
            })
        });
        if stage.survivors.is_empty() {
            return Err(Error::NoCandidateSatisfiesSafety {
                pair: self.pair.clone(),
                examined: stage.examined,
            });
        }
        Ok(&stage.survivors)
    }

    fn check_base_sizes(&self) -> Result<()> {
        for (region, quorum) in [(self.region_a, self.ra), (self.region_b, self.rb)] {
            if quorum.len() < self.min_size {
                error!(
                    pair = %self.pair,
                    %region,
                    size = quorum.len(),
                    min_size = self.min_size,
                    "region is below the minimum quorum size"
                );
                return Err(Error::InsufficientRegionSize {
                    pair: self.pair.clone(),
                    region: region.clone(),
                    size: quorum.len(),
                    min_size: self.min_size,
                });
            }
        }
        Ok(())
    }

    fn filter_min_size(&self) -> Stage {
        let existing: BTreeSet<&NodeId> = self.ra.intersection(self.rb).collect();
        let mut stage = Stage::default();

        for members in self.candidates() {
            stage.examined += 1;

            // Commons already shared by the pair stay shared.
            if !existing.iter().all(|v| members.contains(*v)) {
                trace!(pair = %self.pair, common = ?members, "drops existing commons");
                continue;
            }

            let quorum_a = self.ra.union(&members).count();
            let quorum_b = self.rb.union(&members).count();
            let margins = Margins::evaluate(
                quorum_a,
                quorum_b,
                self.union,
                members.len(),
                self.failure,
            );

            trace!(
                pair = %self.pair,
                check = "|Q ∪ C| >= 3F + 1",
                quorum_a,
                quorum_b,
                min_size = self.min_size,
                valid = margins.min_size.holds(),
                common = ?members,
                "min size check"
            );
            if !margins.min_size.holds() {
                continue;
            }

            stage.survivors.push(Candidate { members, margins });
        }

        self.log_stage("min size", &stage);
        stage
    }

    fn filter_stage<P>(&self, previous: &[Candidate], name: &str, mut keep: P) -> Stage
    where
        P: FnMut(&Candidate) -> bool,
    {
        let mut ordered: Vec<&Candidate> = previous.iter().collect();
        ordered.sort_by_key(|c| Reverse(c.len()));

        let survivors: Vec<Candidate> = ordered
            .into_iter()
            .filter(|c| keep(c))
            .cloned()
            .collect();
        let stage = Stage {
            examined: previous.len(),
            survivors,
        };

        self.log_stage(name, &stage);
        stage
    }

    fn log_stage(&self, name: &str, stage: &Stage) {
        if stage.survivors.is_empty() {
            error!(
                pair = %self.pair,
                stage = name,
                examined = stage.examined,
                "no common set passes"
            );
        } else {
            debug!(
                pair = %self.pair,
                stage = name,
                examined = stage.examined,
                passed = stage.survivors.len(),
                "common sets pass"
            );
        }
    }
}

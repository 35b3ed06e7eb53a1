//! Per-node quorum records.
//!
//! Every node (validator or not) inherits its region's quorum, split into
//! the validators of its own region and the validators it shares with each
//! other region.

use std::collections::{BTreeMap, BTreeSet};

use nicebody_topology::RegionId;
use serde::Serialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::region::{NodeId, Region};
use crate::regional::QuorumAssignment;

/// Quorum configuration of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeQuorumRecord {
    pub node: NodeId,
    pub region: RegionId,
    /// Validators of the node's own region kept in its quorum
    pub extra: BTreeSet<NodeId>,
    /// Validators shared with each other region, keyed by that region
    pub shared: BTreeMap<RegionId, BTreeSet<NodeId>>,
}

impl NodeQuorumRecord {
    /// Every validator named by the record.
    pub fn all_validators(&self) -> BTreeSet<NodeId> {
        self.shared
            .values()
            .flatten()
            .chain(&self.extra)
            .cloned()
            .collect()
    }
}

/// Project region quorums onto `nodes` (node -> region).
///
/// Records come back sorted by node id.
pub fn project(
    assignment: &QuorumAssignment,
    regions: &BTreeMap<RegionId, Region>,
    nodes: &BTreeMap<NodeId, RegionId>,
) -> Result<Vec<NodeQuorumRecord>> {
    nodes
        .iter()
        .map(|(node, region)| {
            let quorum = assignment
                .get(region)
                .ok_or_else(|| Error::UnknownRegion(region.clone()))?;
            let original = regions
                .get(region)
                .ok_or_else(|| Error::UnknownRegion(region.clone()))?;

            let shared: BTreeMap<_, BTreeSet<NodeId>> = assignment
                .iter()
                .filter(|(other, _)| *other != region)
                .map(|(other, q)| (other.clone(), quorum.intersection(q).cloned().collect()))
                .collect();

            trace!(%node, %region, "projected node quorum");
            Ok(NodeQuorumRecord {
                node: node.clone(),
                region: region.clone(),
                extra: original.validators.intersection(quorum).cloned().collect(),
                shared,
            })
        })
        .collect()
}

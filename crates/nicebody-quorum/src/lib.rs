//! Nice Body Regional Quorum Composition
//!
//! Builds quorum slices for a federated Byzantine agreement network whose
//! validators are grouped into regions.
//!
//! # Model
//!
//! Every region starts out trusting only its own validators. Each region is
//! then paired with its nearest regions (by tag distance) and the two agree
//! on a set of *common* validators `C` that both add to their quorums. With
//! `F` tolerated failures and `U` the union of both quorums, `C` must satisfy:
//!
//! - min size: both quorums keep at least `3F + 1` validators
//! - liveness: `|U| - |C| >= F`
//! - safety: `2|C| - |U| - 1 >= F`
//!
//! Among the feasible sets the one adding the least trust is chosen. Quorums
//! only grow, and a region composed early carries what it absorbed into its
//! later pairs.
//!
//! # Search
//!
//! Candidates are unions of at most six contiguous blocks per side, so a
//! pair never examines more than `2^12` sets regardless of region sizes.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use nicebody_quorum::{compose, GlobalParameters, Region};
//! use nicebody_topology::Tags;
//!
//! let mut regions = BTreeMap::new();
//! for (name, ring) in [("east", 0u8), ("west", 1)] {
//!     let validators = (1..=4).map(|i| format!("{}-{}", name, i));
//!     let region = Region::new(name, Tags::new(vec![ring]).unwrap(), validators);
//!     regions.insert(region.id.clone(), region);
//! }
//!
//! let params = GlobalParameters::new(1, 1).unwrap();
//! let composed = compose(&regions, params, 7).unwrap();
//! assert_eq!(composed.links.len(), 1);
//! ```

pub mod blocks;
mod commons;
mod compose;
mod error;
mod projection;
mod region;
mod regional;
mod report;
mod threshold;

pub use commons::{AvailableCommons, Candidate};
pub use compose::{compose_pair, select, selection_key, PairComposition, SelectionKey};
pub use error::{Error, Result};
pub use projection::{project, NodeQuorumRecord};
pub use region::{NodeId, Region};
pub use regional::{
    compose, Composition, GlobalParameters, QuorumAssignment, RegionalQuorum,
    DEFAULT_NEAR_REGIONS,
};
pub use report::{Check, CheckKind, Connection, RegionReport, VerificationReport};
pub use threshold::{
    liveness_margin, min_quorum_size, min_size_margin, safety_margin, MarginPair, Margins,
};

pub use nicebody_topology::{DistanceIndex, RegionId, RegionPair, Tags};

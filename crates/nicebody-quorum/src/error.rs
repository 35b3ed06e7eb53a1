//! Error types for nicebody-quorum.

use nicebody_topology::{RegionId, RegionPair};
use thiserror::Error;

/// Result type for quorum composition.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing or projecting quorums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The failure bound must tolerate at least one failure.
    #[error("failure bound must be at least 1, got {0}")]
    InvalidFailure(usize),

    /// A region is already too small to survive `F` failures.
    #[error("region {region} of pair {pair} has {size} validators, needs at least {min_size}")]
    InsufficientRegionSize {
        pair: RegionPair,
        region: RegionId,
        size: usize,
        min_size: usize,
    },

    /// Every candidate left one side below the minimum quorum size.
    #[error("no common set of pair {pair} satisfies the minimum size ({examined} examined)")]
    NoCandidateSatisfiesMinSize { pair: RegionPair, examined: usize },

    /// Every remaining candidate leaves fewer than `F` validators outside the commons.
    #[error("no common set of pair {pair} keeps liveness ({examined} examined)")]
    NoCandidateSatisfiesLiveness { pair: RegionPair, examined: usize },

    /// Every remaining candidate is too small to guarantee quorum intersection.
    #[error("no common set of pair {pair} guarantees safety ({examined} examined)")]
    NoCandidateSatisfiesSafety { pair: RegionPair, examined: usize },

    /// A pairwise composition failed, so the whole composition did.
    #[error("failed to compose quorums for {pair}: {source}")]
    CompositionFailed {
        pair: RegionPair,
        #[source]
        source: Box<Error>,
    },

    /// The region is not part of the composition.
    #[error("unknown region: {0}")]
    UnknownRegion(RegionId),
}

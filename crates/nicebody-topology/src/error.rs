//! Error types for nicebody-topology.

use thiserror::Error;

/// Result type for topology operations.
pub type Result<T> = std::result::Result<T, TopologyError>;

/// Errors raised while building region tags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// A region needs at least its ring position.
    #[error("tags must contain at least the ring position")]
    EmptyTags,

    /// The ring position does not fit on the ring.
    #[error("ring position {position} is out of range, must be below {ring_size}")]
    RingOutOfRange { position: u8, ring_size: u8 },
}

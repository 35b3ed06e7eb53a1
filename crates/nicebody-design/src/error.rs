//! Error types for nicebody-design.

use std::path::PathBuf;

use nicebody_topology::TopologyError;
use thiserror::Error;

/// Result type for design loading.
pub type Result<T> = std::result::Result<T, DesignError>;

/// Errors that can occur while loading or resolving a design.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("failed to read design {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid design document: {0}")]
    Json(#[from] serde_json::Error),

    /// A region lists an instance the design does not define.
    #[error("region {region} references unknown instance {instance}")]
    UnknownInstance { region: String, instance: String },

    /// An instance lists a node the design does not define.
    #[error("instance {instance} references unknown node {node}")]
    UnknownNode { instance: String, node: String },

    #[error("instance {instance} is claimed by regions {first} and {second}")]
    DuplicateInstance {
        instance: String,
        first: String,
        second: String,
    },

    #[error("node {node} is claimed by instances {first} and {second}")]
    DuplicateNode {
        node: String,
        first: String,
        second: String,
    },

    #[error("invalid tags for region {region}: {source}")]
    Tags {
        region: String,
        #[source]
        source: TopologyError,
    },

    #[error(transparent)]
    Parameters(#[from] nicebody_quorum::Error),
}

//! Nice Body Network Designs
//!
//! A design describes a network as regions made of instances (machines),
//! which in turn host nodes:
//!
//! ```json
//! {
//!   "network": { "failure": 1, "connected_regions": 3 },
//!   "regions": { "seoul": { "tags": [0, 1], "instances": ["s1"] } },
//!   "instances": { "s1": { "nodes": ["s1-a", "s1-b"] } },
//!   "nodes": { "s1-a": { "validator": true }, "s1-b": {} }
//! }
//! ```
//!
//! Loading resolves the references between the sections into the
//! [`Region`](nicebody_quorum::Region)s and node placements the quorum
//! composer works on. Nothing beyond reference resolution is validated.

mod design;
mod error;

pub use design::{Design, InstanceDesign, NetworkDesign, NodeDesign, RegionDesign};
pub use error::{DesignError, Result};

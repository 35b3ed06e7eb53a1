//! The design document and its resolution into regions.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use nicebody_quorum::{GlobalParameters, NodeId, Region};
use nicebody_topology::{RegionId, Tags};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DesignError, Result};

fn default_failure() -> usize {
    1
}

fn default_connected_regions() -> usize {
    3
}

fn default_validator() -> bool {
    true
}

/// Network-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDesign {
    /// Failures every quorum must tolerate
    #[serde(default = "default_failure")]
    pub failure: usize,
    /// Near regions each region is composed with
    #[serde(default = "default_connected_regions")]
    pub connected_regions: usize,
}

impl Default for NetworkDesign {
    fn default() -> Self {
        Self {
            failure: default_failure(),
            connected_regions: default_connected_regions(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDesign {
    #[serde(default)]
    pub tags: Vec<u8>,
    #[serde(default)]
    pub instances: Vec<String>,
}

/// A machine hosting one or more nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDesign {
    #[serde(default)]
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDesign {
    /// Non-validators follow their region's quorum without voting in it
    #[serde(default = "default_validator")]
    pub validator: bool,
}

impl Default for NodeDesign {
    fn default() -> Self {
        Self {
            validator: default_validator(),
        }
    }
}

/// A network design: regions made of instances made of nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Design {
    #[serde(default)]
    pub network: NetworkDesign,
    #[serde(default)]
    pub regions: BTreeMap<String, RegionDesign>,
    #[serde(default)]
    pub instances: BTreeMap<String, InstanceDesign>,
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeDesign>,
}

/// Where a node lives.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Placement<'a> {
    instance: &'a str,
    region: &'a str,
}

impl Design {
    /// Parse a design from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse the design at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| DesignError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let design = Self::from_json_str(&json)?;
        debug!(
            path = %path.display(),
            regions = design.regions.len(),
            nodes = design.nodes.len(),
            "design loaded"
        );
        Ok(design)
    }

    /// Composition parameters from the `network` section.
    pub fn parameters(&self) -> Result<GlobalParameters> {
        Ok(GlobalParameters::new(
            self.network.failure,
            self.network.connected_regions,
        )?)
    }

    /// Regions with their validators.
    pub fn regions(&self) -> Result<BTreeMap<RegionId, Region>> {
        let placements = self.placements()?;

        let mut validators: BTreeMap<&str, BTreeSet<NodeId>> = BTreeMap::new();
        for (node, placement) in &placements {
            if self.nodes.get(*node).map_or(false, |n| n.validator) {
                validators
                    .entry(placement.region)
                    .or_default()
                    .insert(NodeId::from(*node));
            }
        }

        self.regions
            .iter()
            .map(|(name, region)| {
                let tags = Tags::new(region.tags.clone()).map_err(|source| DesignError::Tags {
                    region: name.clone(),
                    source,
                })?;
                let members = validators.remove(name.as_str()).unwrap_or_default();
                if members.is_empty() {
                    warn!(region = %name, "region has no validators");
                }
                let region = Region::new(name.as_str(), tags, members);
                Ok((region.id.clone(), region))
            })
            .collect()
    }

    /// Region of every node placed in a region, validators or not.
    pub fn node_regions(&self) -> Result<BTreeMap<NodeId, RegionId>> {
        Ok(self
            .placements()?
            .into_iter()
            .map(|(node, placement)| (NodeId::from(node), RegionId::from(placement.region)))
            .collect())
    }

    /// Instance hosting every node placed in a region.
    pub fn node_instances(&self) -> Result<BTreeMap<NodeId, String>> {
        Ok(self
            .placements()?
            .into_iter()
            .map(|(node, placement)| (NodeId::from(node), placement.instance.to_string()))
            .collect())
    }

    /// Resolve every region -> instance -> node reference.
    fn placements(&self) -> Result<BTreeMap<&str, Placement<'_>>> {
        let mut instance_regions: BTreeMap<&str, &str> = BTreeMap::new();
        for (region, design) in &self.regions {
            for instance in &design.instances {
                if !self.instances.contains_key(instance) {
                    return Err(DesignError::UnknownInstance {
                        region: region.clone(),
                        instance: instance.clone(),
                    });
                }
                if let Some(first) = instance_regions.insert(instance, region) {
                    return Err(DesignError::DuplicateInstance {
                        instance: instance.clone(),
                        first: first.to_string(),
                        second: region.clone(),
                    });
                }
            }
        }

        let mut placements: BTreeMap<&str, Placement<'_>> = BTreeMap::new();
        for (instance, design) in &self.instances {
            let Some(region) = instance_regions.get(instance.as_str()) else {
                warn!(%instance, "instance belongs to no region");
                continue;
            };
            for node in &design.nodes {
                if !self.nodes.contains_key(node) {
                    return Err(DesignError::UnknownNode {
                        instance: instance.clone(),
                        node: node.clone(),
                    });
                }
                let placement = Placement { instance, region };
                if let Some(first) = placements.insert(node, placement) {
                    return Err(DesignError::DuplicateNode {
                        node: node.clone(),
                        first: first.instance.to_string(),
                        second: instance.clone(),
                    });
                }
            }
        }

        for node in self.nodes.keys() {
            if !placements.contains_key(node.as_str()) {
                warn!(%node, "node is not placed in any instance");
            }
        }
        Ok(placements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "network": { "failure": 1, "connected_regions": 1 },
        "regions": {
            "seoul": { "tags": [0, 1], "instances": ["s1", "s2"] },
            "tokyo": { "tags": [1, 1], "instances": ["t1"] }
        },
        "instances": {
            "s1": { "nodes": ["s-a", "s-b"] },
            "s2": { "nodes": ["s-c", "s-d", "s-watch"] },
            "t1": { "nodes": ["t-a", "t-b", "t-c", "t-d"] }
        },
        "nodes": {
            "s-a": {}, "s-b": {}, "s-c": {}, "s-d": {},
            "s-watch": { "validator": false },
            "t-a": {}, "t-b": {}, "t-c": {}, "t-d": {}
        }
    }"#;

    #[test]
    fn defaults_apply_when_absent() {
        let design = Design::from_json_str(r#"{ "nodes": { "n": {} } }"#).unwrap();
        assert_eq!(design.network, NetworkDesign::default());
        assert_eq!(design.network.failure, 1);
        assert_eq!(design.network.connected_regions, 3);
        assert!(design.nodes["n"].validator);
        assert!(design.regions.is_empty());
    }

    #[test]
    fn regions_hold_validators_only() {
        let design = Design::from_json_str(SAMPLE).unwrap();
        let regions = design.regions().unwrap();

        let seoul = &regions[&RegionId::from("seoul")];
        assert_eq!(seoul.len(), 4);
        assert!(!seoul.validators.contains(&NodeId::from("s-watch")));
        assert_eq!(seoul.tags.as_slice(), &[0, 1]);
        assert_eq!(regions[&RegionId::from("tokyo")].len(), 4);
    }

    #[test]
    fn node_regions_include_non_validators() {
        let design = Design::from_json_str(SAMPLE).unwrap();
        let nodes = design.node_regions().unwrap();
        assert_eq!(nodes.len(), 9);
        assert_eq!(nodes[&NodeId::from("s-watch")], RegionId::from("seoul"));
    }

    #[test]
    fn node_instances_follow_placement() {
        let design = Design::from_json_str(SAMPLE).unwrap();
        let instances = design.node_instances().unwrap();
        assert_eq!(instances.len(), 9);
        assert_eq!(instances[&NodeId::from("s-a")], "s1");
        assert_eq!(instances[&NodeId::from("s-watch")], "s2");
        assert_eq!(instances[&NodeId::from("t-d")], "t1");
    }

    #[test]
    fn parameters_follow_network() {
        let design = Design::from_json_str(SAMPLE).unwrap();
        let params = design.parameters().unwrap();
        assert_eq!(params.failure, 1);
        assert_eq!(params.near_region_count, 1);
    }

    #[test]
    fn zero_failure_is_rejected() {
        let design = Design::from_json_str(r#"{ "network": { "failure": 0 } }"#).unwrap();
        assert!(matches!(
            design.parameters(),
            Err(DesignError::Parameters(nicebody_quorum::Error::InvalidFailure(0)))
        ));
    }

    #[test]
    fn unknown_instance() {
        let json = r#"{ "regions": { "r": { "tags": [0], "instances": ["ghost"] } } }"#;
        let design = Design::from_json_str(json).unwrap();
        assert!(matches!(
            design.regions(),
            Err(DesignError::UnknownInstance { ref instance, .. }) if instance == "ghost"
        ));
    }

    #[test]
    fn unknown_node() {
        let json = r#"{
            "regions": { "r": { "tags": [0], "instances": ["i"] } },
            "instances": { "i": { "nodes": ["ghost"] } }
        }"#;
        let design = Design::from_json_str(json).unwrap();
        assert!(matches!(
            design.node_regions(),
            Err(DesignError::UnknownNode { ref node, .. }) if node == "ghost"
        ));
    }

    #[test]
    fn instance_in_two_regions() {
        let json = r#"{
            "regions": {
                "a": { "tags": [0], "instances": ["i"] },
                "b": { "tags": [1], "instances": ["i"] }
            },
            "instances": { "i": {} }
        }"#;
        let design = Design::from_json_str(json).unwrap();
        assert!(matches!(
            design.regions(),
            Err(DesignError::DuplicateInstance { ref first, ref second, .. })
                if first == "a" && second == "b"
        ));
    }

    #[test]
    fn node_in_two_instances() {
        let json = r#"{
            "regions": { "r": { "tags": [0], "instances": ["i", "j"] } },
            "instances": { "i": { "nodes": ["n"] }, "j": { "nodes": ["n"] } },
            "nodes": { "n": {} }
        }"#;
        let design = Design::from_json_str(json).unwrap();
        assert!(matches!(
            design.regions(),
            Err(DesignError::DuplicateNode { ref node, .. }) if node == "n"
        ));
    }

    #[test]
    fn empty_tags_are_rejected() {
        let json = r#"{ "regions": { "r": {} } }"#;
        let design = Design::from_json_str(json).unwrap();
        assert!(matches!(
            design.regions(),
            Err(DesignError::Tags { ref region, .. }) if region == "r"
        ));
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(
            Design::from_json_str("{ not json"),
            Err(DesignError::Json(_))
        ));
    }
}

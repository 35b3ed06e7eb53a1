//! End-to-end composition scenarios.

use std::collections::{BTreeMap, BTreeSet};

use nicebody_quorum::{
    compose, liveness_margin, min_quorum_size, project, safety_margin, Composition, Error,
    GlobalParameters, NodeId, Region, RegionId, RegionPair, Tags, VerificationReport,
};

fn region(name: &str, tags: &[u8], validators: usize) -> Region {
    Region::new(
        name,
        Tags::new(tags.to_vec()).unwrap(),
        (1..=validators).map(|i| format!("{}-{}", name, i)),
    )
}

fn regions(list: Vec<Region>) -> BTreeMap<RegionId, Region> {
    list.into_iter().map(|r| (r.id.clone(), r)).collect()
}

fn node_regions(regions: &BTreeMap<RegionId, Region>) -> BTreeMap<NodeId, RegionId> {
    regions
        .values()
        .flat_map(|r| r.validators.iter().map(move |v| (v.clone(), r.id.clone())))
        .collect()
}

/// Every invariant a successful composition guarantees.
fn assert_invariants(regions: &BTreeMap<RegionId, Region>, composed: &Composition, failure: usize) {
    for (id, quorum) in composed.assignment.iter() {
        assert!(quorum.len() >= min_quorum_size(failure), "{} too small", id);
        assert!(quorum.is_superset(&regions[id].validators), "{} lost validators", id);
    }
    for link in &composed.links {
        let c = link.common.len();
        assert!(liveness_margin(link.union, c, failure) >= 0, "{} not live", link.pair());
        assert!(safety_margin(link.union, c, failure) >= 0, "{} not safe", link.pair());
        assert!(link.common.is_subset(&link.quorum_a));
        assert!(link.common.is_subset(&link.quorum_b));
    }
}

#[test]
fn two_minimal_regions_with_same_tags() {
    let rs = regions(vec![region("a", &[0], 4), region("b", &[0], 4)]);
    let composed = compose(&rs, GlobalParameters::default(), 0).unwrap();

    assert_eq!(composed.links.len(), 1);
    let link = &composed.links[0];
    let expected: BTreeSet<NodeId> = ["a-1", "b-1", "b-2", "b-3", "b-4"]
        .into_iter()
        .map(NodeId::from)
        .collect();
    assert_eq!(link.common, expected);
    assert_eq!(link.union, 8);
    assert_eq!(link.margins.safety.a, 0);
    assert_eq!(link.margins.safety.b, 0);
    assert_invariants(&rs, &composed, 1);
}

#[test]
fn three_regions_all_connected() {
    let rs = regions(vec![
        region("r0", &[0], 7),
        region("r1", &[1], 7),
        region("r2", &[3], 7),
    ]);
    let composed = compose(&rs, GlobalParameters::new(1, 2).unwrap(), 0).unwrap();

    assert_eq!(composed.links.len(), 3);
    for id in rs.keys() {
        assert_eq!(composed.neighbors(id).len(), 2, "{} neighbors", id);
    }

    // r0 is composed first and absorbs r1 before meeting r2
    let first = &composed.links[0];
    assert_eq!(first.pair(), RegionPair::new("r0".into(), "r1".into()));
    assert_eq!(first.common.len(), 8);
    assert_invariants(&rs, &composed, 1);
}

#[test]
fn undersized_region_fails_everything() {
    let rs = regions(vec![region("big", &[0], 7), region("small", &[1], 3)]);
    let err = compose(&rs, GlobalParameters::default(), 0).unwrap_err();

    match err {
        Error::CompositionFailed { pair, source } => {
            assert_eq!(pair, RegionPair::new("big".into(), "small".into()));
            assert_eq!(
                *source,
                Error::InsufficientRegionSize {
                    pair: RegionPair::new("big".into(), "small".into()),
                    region: "small".into(),
                    size: 3,
                    min_size: 4,
                }
            );
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn higher_failure_bound() {
    let rs = regions(vec![
        region("north", &[2, 0], 10),
        region("south", &[2, 1], 10),
    ]);
    let composed = compose(&rs, GlobalParameters::new(3, 1).unwrap(), 0).unwrap();
    assert_eq!(composed.links.len(), 1);
    assert_invariants(&rs, &composed, 3);
}

#[test]
fn projection_covers_every_node() {
    let rs = regions(vec![
        region("r0", &[0], 7),
        region("r1", &[1], 7),
        region("r2", &[3], 7),
    ]);
    let composed = compose(&rs, GlobalParameters::new(1, 2).unwrap(), 0).unwrap();

    let mut nodes = node_regions(&rs);
    nodes.insert("r2-observer".into(), "r2".into());
    let records = project(&composed.assignment, &rs, &nodes).unwrap();

    assert_eq!(records.len(), nodes.len());
    for record in &records {
        assert_eq!(nodes[&record.node], record.region);
        assert!(record.extra.is_subset(&rs[&record.region].validators));
        assert_eq!(
            &record.all_validators(),
            composed.assignment.get(&record.region).unwrap()
        );
    }
}

#[test]
fn projection_lists_disjoint_regions_as_empty() {
    // Two clusters far apart on the ring: {r0, r1} and {r2, r3}
    let rs = regions(vec![
        region("r0", &[0], 4),
        region("r1", &[1], 4),
        region("r2", &[5], 4),
        region("r3", &[6], 4),
    ]);
    let composed = compose(&rs, GlobalParameters::new(1, 1).unwrap(), 0).unwrap();
    assert_eq!(composed.links.len(), 2);

    let records = project(&composed.assignment, &rs, &node_regions(&rs)).unwrap();
    assert_eq!(records.len(), 16);

    for record in &records {
        let others: BTreeSet<&RegionId> = rs.keys().filter(|id| **id != record.region).collect();
        let keys: BTreeSet<&RegionId> = record.shared.keys().collect();
        assert_eq!(keys, others, "{} shared keys", record.node);

        let partner = composed.neighbors(&record.region);
        for (other, shared) in &record.shared {
            assert_eq!(shared.is_empty(), !partner.contains(other), "{} with {}", record.node, other);
        }
    }
}

#[test]
fn report_of_composed_network() {
    let rs = regions(vec![
        region("r0", &[0], 7),
        region("r1", &[1], 7),
        region("r2", &[3], 7),
    ]);
    let composed = compose(&rs, GlobalParameters::new(1, 2).unwrap(), 0).unwrap();
    let report = VerificationReport::new(&rs, &composed.assignment, 1).unwrap();

    assert_eq!(report.regions.len(), 3);
    for region in &report.regions {
        assert_eq!(region.connected.len(), 2);
    }
    let text = report.to_string();
    assert!(text.contains("* connected with \"r1\""));
}

#[test]
fn same_seed_reproduces_composition() {
    // r1 and r9 sit at the same distance from r0
    let rs = regions(vec![
        region("r0", &[0], 5),
        region("r1", &[1], 5),
        region("r9", &[9], 5),
    ]);
    let params = GlobalParameters::new(1, 1).unwrap();
    for seed in [0, 1, 99] {
        assert_eq!(compose(&rs, params, seed), compose(&rs, params, seed));
    }
}

#[test]
fn composition_serializes() {
    let rs = regions(vec![region("a", &[0], 4), region("b", &[1], 4)]);
    let composed = compose(&rs, GlobalParameters::default(), 0).unwrap();
    let json = serde_json::to_value(&composed).unwrap();

    assert_eq!(json["assignment"]["b"].as_array().unwrap().len(), 5);
    assert_eq!(json["links"][0]["region_a"], "a");
    assert_eq!(json["links"][0]["union"], 8);
}

//! Synthetic networks for trying out parameters.

use std::collections::BTreeMap;

use nicebody_quorum::Region;
use nicebody_topology::{RegionId, Tags, TopologyError, RING_SIZE};

/// Regions `r0..rN` where region `i` has `sizes[i]` validators.
///
/// Validators are named `r<i>-<j>` with `j` zero padded one digit wider
/// than the largest size. Region `i` sits at ring position `i % 10` with
/// hierarchy `[i / 10]`.
pub fn regions(sizes: &[usize]) -> Result<BTreeMap<RegionId, Region>, TopologyError> {
    let width = sizes
        .iter()
        .map(|n| n.to_string().len())
        .max()
        .unwrap_or(0)
        + 1;

    sizes
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            let ring = (i % RING_SIZE as usize) as u8;
            let level = u8::try_from(i / RING_SIZE as usize).unwrap_or(u8::MAX);
            let tags = Tags::new(vec![ring, level])?;
            let validators = (0..n).map(|j| format!("r{}-{:0width$}", i, j, width = width));
            let region = Region::new(format!("r{}", i), tags, validators);
            Ok((region.id.clone(), region))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nicebody_quorum::NodeId;

    #[test]
    fn names_and_tags() {
        let rs = regions(&[4, 12]).unwrap();
        assert_eq!(rs.len(), 2);

        let r1 = &rs[&RegionId::from("r1")];
        assert_eq!(r1.len(), 12);
        assert!(r1.validators.contains(&NodeId::from("r1-011")));
        assert!(rs[&RegionId::from("r0")].validators.contains(&NodeId::from("r0-000")));
        assert_eq!(r1.tags.as_slice(), &[1, 0]);
    }

    #[test]
    fn eleventh_region_moves_up_a_level() {
        let rs = regions(&[4; 11]).unwrap();
        assert_eq!(rs[&RegionId::from("r10")].tags.as_slice(), &[0, 1]);
    }
}

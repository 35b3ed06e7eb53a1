//! Verification report of a composed assignment.
//!
//! Unlike composition, which checks liveness and safety against the union of
//! a pair, the report checks every connected pair against each side's own
//! final quorum, so it shows how much slack each region really has.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use nicebody_topology::RegionId;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::region::{NodeId, Region};
use crate::regional::QuorumAssignment;

/// Which inequality a [`Check`] evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// `|Q| - |C| >= F`
    Liveness,
    /// `2|C| - |Q| - 1 >= F`
    Safety,
}

/// One inequality evaluated for one side of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub kind: CheckKind,
    /// Side whose quorum the check uses
    pub region: RegionId,
    pub quorum: usize,
    pub common: usize,
    pub failure: usize,
    /// Left-hand side of the inequality
    pub value: i64,
    pub passed: bool,
}

impl Check {
    fn new(
        kind: CheckKind,
        region: &RegionId,
        quorum: usize,
        common: usize,
        failure: usize,
    ) -> Self {
        let (q, c) = (quorum as i64, common as i64);
        let value = match kind {
            CheckKind::Liveness => q - c,
            CheckKind::Safety => 2 * c - q - 1,
        };
        Self {
            kind,
            region: region.clone(),
            quorum,
            common,
            failure,
            value,
            passed: value >= failure as i64,
        }
    }

    fn label(&self) -> String {
        match self.kind {
            CheckKind::Liveness => format!(">   liveness({})", self.region),
            CheckKind::Safety => format!(">   safety({})", self.region),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CheckKind::Liveness => write!(
                f,
                "{} - {} = {} >= {}",
                self.quorum, self.common, self.value, self.failure
            ),
            CheckKind::Safety => write!(
                f,
                "2 * {} - {} - 1 = {} >= {}",
                self.common, self.quorum, self.value, self.failure
            ),
        }
    }
}

/// A region sharing validators with the reported one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub region: RegionId,
    pub commons: BTreeSet<NodeId>,
    /// Own side first, then the connected side
    pub liveness: [Check; 2],
    pub safety: [Check; 2],
}

impl Connection {
    fn checks(&self) -> impl Iterator<Item = &Check> {
        self.liveness.iter().chain(&self.safety)
    }
}

/// Report of one region's final quorum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionReport {
    pub region: RegionId,
    pub validators: BTreeSet<NodeId>,
    /// Union of everything shared with any other region
    pub commons: BTreeSet<NodeId>,
    /// Own validators shared with nobody
    pub extra: BTreeSet<NodeId>,
    pub connected: Vec<Connection>,
}

impl RegionReport {
    /// Build the report of `region` from the whole assignment.
    pub fn new(region: &Region, assignment: &QuorumAssignment, failure: usize) -> Result<Self> {
        let quorum = assignment
            .get(&region.id)
            .ok_or_else(|| Error::UnknownRegion(region.id.clone()))?;

        let mut commons = BTreeSet::new();
        let mut connected = Vec::new();
        for (other, other_quorum) in assignment.iter() {
            if *other == region.id {
                continue;
            }
            let shared: BTreeSet<NodeId> = quorum.intersection(other_quorum).cloned().collect();
            if shared.is_empty() {
                continue;
            }

            let c = shared.len();
            commons.extend(shared.iter().cloned());
            connected.push(Connection {
                region: other.clone(),
                liveness: [
                    Check::new(CheckKind::Liveness, &region.id, quorum.len(), c, failure),
                    Check::new(CheckKind::Liveness, other, other_quorum.len(), c, failure),
                ],
                safety: [
                    Check::new(CheckKind::Safety, &region.id, quorum.len(), c, failure),
                    Check::new(CheckKind::Safety, other, other_quorum.len(), c, failure),
                ],
                commons: shared,
            });
        }

        Ok(Self {
            region: region.id.clone(),
            validators: quorum.clone(),
            extra: region.validators.difference(&commons).cloned().collect(),
            commons,
            connected,
        })
    }

    /// Every check of every connection passes.
    pub fn passed(&self) -> bool {
        self.connected
            .iter()
            .flat_map(|connection| connection.checks())
            .all(|check| check.passed)
    }

    fn rows(&self) -> Vec<[String; 3]> {
        let mut rows = vec![
            row("name", self.region.to_string(), String::new()),
            row("validators", join(&self.validators), self.validators.len().to_string()),
            row("commons(superset)", join(&self.commons), self.commons.len().to_string()),
            row("extra", join(&self.extra), self.extra.len().to_string()),
        ];
        for connection in &self.connected {
            rows.push(row(
                &format!("* connected with \"{}\"", connection.region),
                String::new(),
                String::new(),
            ));
            rows.push(row(">   commons", join(&connection.commons), String::new()));
            for check in connection.checks() {
                rows.push([check.label(), check.to_string(), check.passed.to_string()]);
            }
        }
        rows
    }
}

impl fmt::Display for RegionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_grid(f, &self.rows())
    }
}

/// Report of every region, in id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub failure: usize,
    pub regions: Vec<RegionReport>,
}

impl VerificationReport {
    pub fn new(
        regions: &BTreeMap<RegionId, Region>,
        assignment: &QuorumAssignment,
        failure: usize,
    ) -> Result<Self> {
        let regions = regions
            .values()
            .map(|region| RegionReport::new(region, assignment, failure))
            .collect::<Result<_>>()?;
        Ok(Self { failure, regions })
    }

    pub fn passed(&self) -> bool {
        self.regions.iter().all(RegionReport::passed)
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, region) in self.regions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", region)?;
        }
        Ok(())
    }
}

fn row(label: &str, value: String, note: String) -> [String; 3] {
    [label.to_string(), value, note]
}

fn join(nodes: &BTreeSet<NodeId>) -> String {
    nodes
        .iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_grid(f: &mut fmt::Formatter<'_>, rows: &[[String; 3]]) -> fmt::Result {
    let mut widths = [0usize; 3];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border: String = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let border = format!("+{}+", border);

    writeln!(f, "{}", border)?;
    for row in rows {
        write!(f, "|")?;
        for (width, cell) in widths.iter().zip(row) {
            write!(f, " {:<width$} |", cell, width = width)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", border)?;
    }
    Ok(())
}

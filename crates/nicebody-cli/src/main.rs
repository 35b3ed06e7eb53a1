//! Nice Body CLI
//!
//! Composes regional quorums for a network design, or for a synthetic
//! network described on the command line, and prints the result.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use nicebody_design::Design;
use nicebody_quorum::{
    compose, project, Composition, GlobalParameters, NodeId, NodeQuorumRecord, Region,
    VerificationReport, DEFAULT_NEAR_REGIONS,
};
use nicebody_topology::RegionId;
use serde::Serialize;
use tracing::{debug, error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod synthetic;

#[derive(Parser)]
#[command(name = "nice-body")]
#[command(about = "Compose regional quorums for an FBA network", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose quorums for a design document
    Make {
        /// Design JSON file
        design: PathBuf,

        /// Seed for breaking distance ties
        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Compose quorums for generated regions
    Synthetic {
        /// Failures to tolerate
        #[arg(value_name = "F")]
        failure: usize,

        /// Validators in each region
        #[arg(value_name = "NR", required = true)]
        sizes: Vec<usize>,

        /// Near regions to connect each region to
        #[arg(long, default_value_t = DEFAULT_NEAR_REGIONS)]
        near: usize,

        /// Seed for breaking distance ties
        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// A node record with the instance hosting the node.
#[derive(Serialize)]
struct NodeOutput<'a> {
    instance: Option<&'a str>,
    #[serde(flatten)]
    record: &'a NodeQuorumRecord,
}

/// Everything `make` prints as JSON.
#[derive(Serialize)]
struct MakeOutput<'a> {
    #[serde(flatten)]
    composition: &'a Composition,
    nodes: Vec<NodeOutput<'a>>,
}

fn node_outputs<'a>(
    records: &'a [NodeQuorumRecord],
    instances: &'a BTreeMap<NodeId, String>,
) -> Vec<NodeOutput<'a>> {
    records
        .iter()
        .map(|record| NodeOutput {
            instance: instances.get(&record.node).map(String::as_str),
            record,
        })
        .collect()
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "nice_body=debug,nicebody=debug"
    } else {
        "nice_body=info,nicebody=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Make {
            design,
            seed,
            format,
        } => {
            let design = Design::load(&design)?;
            let regions = design.regions()?;
            let nodes = design.node_regions()?;
            let instances = design.node_instances()?;
            let params = design.parameters()?;

            let composed = compose_checked(&regions, params, seed)?;
            let records = project(&composed.assignment, &regions, &nodes)?;

            match format {
                Format::Text => {
                    print_report(&regions, &composed, params.failure)?;
                    for node in node_outputs(&records, &instances) {
                        print_node(&node);
                    }
                }
                Format::Json => {
                    let output = MakeOutput {
                        composition: &composed,
                        nodes: node_outputs(&records, &instances),
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
        }
        Commands::Synthetic {
            failure,
            sizes,
            near,
            seed,
            format,
        } => {
            if failure < 1 {
                warn!(failure, "failure bound is too low");
            }
            let regions = synthetic::regions(&sizes)?;
            debug!(regions = regions.len(), "synthetic regions created");

            let params = GlobalParameters {
                failure,
                near_region_count: near,
            };
            let composed = compose_checked(&regions, params, seed)?;

            match format {
                Format::Text => print_report(&regions, &composed, failure)?,
                Format::Json => println!("{}", serde_json::to_string_pretty(&composed)?),
            }
        }
    }
    Ok(())
}

fn compose_checked(
    regions: &BTreeMap<RegionId, Region>,
    params: GlobalParameters,
    seed: u64,
) -> nicebody_quorum::Result<Composition> {
    debug!(
        failure = params.failure,
        near = params.near_region_count,
        seed,
        "composing quorums"
    );
    compose(regions, params, seed)
}

fn print_report(
    regions: &BTreeMap<RegionId, Region>,
    composed: &Composition,
    failure: usize,
) -> nicebody_quorum::Result<()> {
    let report = VerificationReport::new(regions, &composed.assignment, failure)?;
    println!("{}", report);
    if !report.passed() {
        warn!("some connected regions fail the per-quorum checks");
    }
    Ok(())
}

fn print_node(node: &NodeOutput<'_>) {
    let record = node.record;
    println!(
        "{} ({}, {})",
        record.node,
        record.region,
        node.instance.unwrap_or("-")
    );
    println!("  extra: {}", join(record.extra.iter()));
    for (region, shared) in &record.shared {
        if !shared.is_empty() {
            println!("  {}: {}", region, join(shared.iter()));
        }
    }
}

fn join<'a, T: std::fmt::Display + 'a>(items: impl Iterator<Item = &'a T>) -> String {
    items.map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn synthetic_arguments() {
        let cli = Cli::try_parse_from(["nice-body", "-v", "synthetic", "1", "7", "7", "7", "--near", "2"])
            .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Synthetic {
                failure,
                sizes,
                near,
                seed,
                format,
            } => {
                assert_eq!(failure, 1);
                assert_eq!(sizes, vec![7, 7, 7]);
                assert_eq!(near, 2);
                assert_eq!(seed, 0);
                assert_eq!(format, Format::Text);
            }
            _ => panic!("expected synthetic"),
        }
    }

    #[test]
    fn synthetic_needs_region_sizes() {
        assert!(Cli::try_parse_from(["nice-body", "synthetic", "1"]).is_err());
    }

    #[test]
    fn make_arguments() {
        let cli = Cli::try_parse_from(["nice-body", "make", "design.json", "--format", "json", "--seed", "9"])
            .unwrap();
        match cli.command {
            Commands::Make {
                design,
                seed,
                format,
            } => {
                assert_eq!(design, PathBuf::from("design.json"));
                assert_eq!(seed, 9);
                assert_eq!(format, Format::Json);
            }
            _ => panic!("expected make"),
        }
    }

    #[test]
    fn node_output_carries_instance() {
        let record = NodeQuorumRecord {
            node: NodeId::from("s-a"),
            region: RegionId::from("seoul"),
            extra: Default::default(),
            shared: Default::default(),
        };
        let mut instances = BTreeMap::new();
        instances.insert(NodeId::from("s-a"), "s1".to_string());

        let records = [record];
        let outputs = node_outputs(&records, &instances);
        let json = serde_json::to_value(&outputs[0]).unwrap();
        assert_eq!(json["instance"], "s1");
        assert_eq!(json["node"], "s-a");
        assert_eq!(json["region"], "seoul");
    }

    #[test]
    fn synthetic_run_succeeds() {
        let result = run(Commands::Synthetic {
            failure: 1,
            sizes: vec![7, 7, 7],
            near: 2,
            seed: 0,
            format: Format::Json,
        });
        assert!(result.is_ok());
    }

    #[test]
    fn undersized_region_fails() {
        let result = run(Commands::Synthetic {
            failure: 1,
            sizes: vec![7, 3],
            near: 1,
            seed: 0,
            format: Format::Text,
        });
        assert!(result.is_err());
    }
}

//! Worm defense CLI binary.
//!
//! Simulates a worm spreading through a network, optionally contained by a
//! competing inoculation process.
//!
//! # Commands
//!
//! - `defend` - Worm propagation competing with inoculation
//! - `propagate` - Worm propagation only
//! - `generate` - Write a random graph as an edge list

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use worm_defense::{
    config::{Config, SimulationConfig},
    graph::{read_edge_list, write_edge_list, GraphModel},
    simulation::{run, SimulationReport},
    VERSION,
};

#[derive(Parser)]
#[command(name = "worm")]
#[command(version = VERSION)]
#[command(
    about = "Simulate the spread of a worm through a network by randomly infecting neighboring nodes",
    long_about = None
)]
struct Cli {
    /// Config file (default: <config dir>/worm-defense/config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Worm propagation competing with inoculation
    Defend {
        /// Path to the network edge list
        edge_list: PathBuf,

        /// Probability that an infected node infects a neighbor (default: 0.5)
        infection_probability: Option<f64>,

        /// Node the infection starts from (default: 1)
        infection_start: Option<String>,

        /// Probability that an inoculated node inoculates a neighbor (default: 0.5)
        inoculation_probability: Option<f64>,

        /// Node the inoculation starts from (default: 1)
        inoculation_start: Option<String>,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Worm propagation without inoculation
    Propagate {
        /// Path to the network edge list
        edge_list: PathBuf,

        /// Probability that an infected node infects a neighbor (default: 0.5)
        probability: Option<f64>,

        /// Node the infection starts from (default: 1)
        start_node: Option<String>,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Generate a random graph edge list
    Generate {
        /// Graph model (erdos-renyi, barabasi-albert, watts-strogatz)
        model: String,

        /// Number of nodes
        #[arg(short, long)]
        nodes: Option<usize>,

        /// Edge probability (Erdős–Rényi) or rewiring probability (Watts–Strogatz)
        #[arg(short = 'p', long)]
        edge_probability: Option<f64>,

        /// Edges per new node (Barabási–Albert)
        #[arg(short = 'm', long)]
        attachment: Option<usize>,

        /// Ring neighbors per node (Watts–Strogatz)
        #[arg(short = 'k', long)]
        ring_neighbors: Option<usize>,

        /// Generation seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output file or directory (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column delimiter (default: the configured edge-list delimiter)
        #[arg(long)]
        delimiter: Option<char>,
    },
}

#[derive(Args)]
struct RunOptions {
    /// Edge-list column delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// Give up after this many periods
    #[arg(long)]
    max_periods: Option<usize>,

    /// Do not cap the number of periods
    #[arg(long, conflicts_with = "max_periods")]
    unbounded: bool,

    /// Seed for the per-step trials (default: entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Output the report as JSON
    #[arg(long)]
    json: bool,
}

impl RunOptions {
    fn apply(&self, sim: &mut SimulationConfig) {
        if let Some(delimiter) = self.delimiter {
            sim.delimiter = delimiter;
        }
        if self.unbounded {
            sim.max_periods = None;
        } else if let Some(max) = self.max_periods {
            sim.max_periods = Some(max);
        }
        if let Some(seed) = self.seed {
            sim.seed = Some(seed);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::load(cli.config)?;

    match cli.command {
        Commands::Defend {
            edge_list,
            infection_probability,
            infection_start,
            inoculation_probability,
            inoculation_start,
            options,
        } => {
            let mut sim = config.simulation;
            if let Some(p) = infection_probability {
                sim.infection_probability = p;
            }
            if let Some(node) = infection_start {
                sim.infection_start = node;
            }
            if let Some(p) = inoculation_probability {
                sim.inoculation_probability = p;
            }
            if let Some(node) = inoculation_start {
                sim.inoculation_start = Some(node);
            }
            if sim.inoculation_start.is_none() {
                sim.inoculation_start = SimulationConfig::default().inoculation_start;
            }
            options.apply(&mut sim);
            cmd_simulate(&edge_list, &sim, options.json)
        },

        Commands::Propagate {
            edge_list,
            probability,
            start_node,
            options,
        } => {
            let mut sim = config.simulation;
            if let Some(p) = probability {
                sim.infection_probability = p;
            }
            if let Some(node) = start_node {
                sim.infection_start = node;
            }
            sim.inoculation_start = None;
            options.apply(&mut sim);
            cmd_simulate(&edge_list, &sim, options.json)
        },

        Commands::Generate {
            model,
            nodes,
            edge_probability,
            attachment,
            ring_neighbors,
            seed,
            output,
            delimiter,
        } => {
            let mut generator = config.generator;
            if let Some(nodes) = nodes {
                generator.nodes = nodes;
            }
            if let Some(p) = edge_probability {
                generator.edge_probability = p;
            }
            if let Some(m) = attachment {
                generator.attachment = m;
            }
            if let Some(k) = ring_neighbors {
                generator.ring_neighbors = k;
            }
            if let Some(seed) = seed {
                generator.seed = seed;
            }

            let delimiter = output_delimiter(delimiter, &config.simulation);
            let model: GraphModel = model.parse()?;
            let mut rng = StdRng::seed_from_u64(generator.seed);
            let network = model.generate(&generator, &mut rng)?;
            tracing::info!(
                "Generated {} graph: {} nodes, {} edges (seed {})",
                model,
                network.node_count(),
                network.edge_count(),
                generator.seed
            );

            match output {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(model.file_name(generator.nodes))
                    } else {
                        path
                    };
                    let file = File::create(&path)?;
                    write_edge_list(&network, BufWriter::new(file), delimiter)?;
                    eprintln!("Edge list written to {}", path.display());
                },
                None => write_edge_list(&network, io::stdout().lock(), delimiter)?,
            }
            Ok(())
        },
    }
}

/// `generate` writes with the same delimiter `defend` and `propagate` read
fn output_delimiter(flag: Option<char>, sim: &SimulationConfig) -> char {
    flag.unwrap_or(sim.delimiter)
}

fn cmd_simulate(edge_list: &Path, sim: &SimulationConfig, json: bool) -> anyhow::Result<()> {
    let network = read_edge_list(edge_list, sim.delimiter)?;
    let params = sim.to_params();

    // Graph generation is seeded; per-step trials only when asked to be
    let mut rng: Box<dyn RngCore> = match sim.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };

    let report = run(&network, &params, &mut rng)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, params.inoculation_start().is_some());
    }

    // A cut-off run is still printed in full, then exits non-zero
    report.into_converged()?;
    Ok(())
}

fn print_report(report: &SimulationReport<String>, with_inoculation: bool) {
    println!("Number of nodes in network graph: {}", report.node_count);
    println!("Final count of infected nodes: {}", report.final_infected());
    if with_inoculation {
        println!("Final count of inoculated nodes: {}", report.final_inoculated());
    }
    println!("Time periods: {} ({})", report.periods, report.termination);

    println!();
    if with_inoculation {
        println!("Infection and inoculation over time:");
        for record in &report.history {
            println!("{record}");
        }
    } else {
        println!("Infection over time:");
        for record in &report.history {
            println!("({}, {})", record.period, record.infected);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_delimiter_defaults_to_config() {
        let cli = Cli::try_parse_from(["worm", "generate", "ba"]).unwrap();
        let Commands::Generate { delimiter, .. } = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(delimiter, None);

        let cli = Cli::try_parse_from(["worm", "generate", "ba", "--delimiter", ";"]).unwrap();
        let Commands::Generate { delimiter, .. } = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(delimiter, Some(';'));

        let sim = SimulationConfig {
            delimiter: '\t',
            ..SimulationConfig::default()
        };
        assert_eq!(output_delimiter(None, &sim), '\t');
        assert_eq!(output_delimiter(Some(';'), &sim), ';');
    }

    #[test]
    fn test_run_options_override_config() {
        let cli =
            Cli::try_parse_from(["worm", "propagate", "edges.csv", "0.3", "5", "--seed", "7"])
                .unwrap();
        let Commands::Propagate {
            probability,
            start_node,
            options,
            ..
        } = cli.command
        else {
            panic!("expected propagate");
        };
        assert_eq!(probability, Some(0.3));
        assert_eq!(start_node.as_deref(), Some("5"));

        let mut sim = SimulationConfig::default();
        options.apply(&mut sim);
        assert_eq!(sim.seed, Some(7));
        assert_eq!(sim.max_periods, Some(10_000));
        assert_eq!(sim.delimiter, ',');
    }
}

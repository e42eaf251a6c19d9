//! # Worm Defense - Network Contagion vs. Inoculation
//!
//! Discrete-time simulation of a worm spreading across a network while a
//! competing inoculation process tries to contain it. Feed in a graph, pick
//! start nodes and spread probabilities, and observe how the infected and
//! inoculated counts evolve period by period until the process settles.
//!
//! ## Features
//!
//! - **Three-state nodes**: Susceptible / Infected / Inoculated, with
//!   inoculation absorbing and curative
//! - **Faithful stepping rule**: period-start snapshot of sources, live
//!   check of targets, in-place updates
//! - **Bounded runs**: stall detection plus an optional period cutoff, with
//!   the partial trace kept in the report
//! - **Graph plumbing**: delimited edge-list I/O and Erdős–Rényi,
//!   Barabási–Albert and Watts–Strogatz generators
//! - **CLI**: the `worm` binary runs simulations and generates graphs
//!
//! ## Overview
//!
//! ```text
//!  edge list ──> Network ──┐
//!                          ├──> Simulation ──step──> ... ──> SimulationReport
//!  SimulationParams ───────┘        │                          (history + final states)
//!                                   └── rng (seeded or entropy)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rand::thread_rng;
//! use worm_defense::{parse_edge_list, run, SimulationParams};
//!
//! let network = parse_edge_list("1,2\n2,3\n3,4\n", ',')?;
//! let params = SimulationParams::defense("1".to_string(), 0.5, "4".to_string(), 0.5)
//!     .with_max_periods(10_000);
//!
//! let report = run(&network, &params, &mut thread_rng())?;
//! println!("{} after {} periods", report.termination, report.periods);
//! for record in &report.history {
//!     println!("{record}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`graph`]: Network model, edge-list I/O and random graph generators
//! - [`simulation`]: Node states, history and the simulation engine
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod error;
pub mod graph;
pub mod simulation;

// Re-exports for convenience
pub use config::{Config, GeneratorConfig, SimulationConfig};
pub use error::{NonConvergenceReason, Result, WormError};
pub use graph::{parse_edge_list, read_edge_list, write_edge_list, GraphModel, Network, NodeId};
pub use simulation::{
    run, History, HistoryRecord, NodeState, Simulation, SimulationParams, SimulationReport,
    Termination,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

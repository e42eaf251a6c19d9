//! Worm propagation and inoculation simulation.
//!
//! # State Machine
//!
//! Every node carries exactly one [`NodeState`]:
//!
//! ```text
//!     [Susceptible] ──infection──> [Infected]
//!          │                           │
//!          │ inoculation               │ inoculation (cures)
//!          v                           v
//!     [Inoculated] <───────────────────┘
//!       (absorbing)
//! ```
//!
//! # Run Lifecycle
//!
//! | Phase          | What happens                                              |
//! |----------------|-----------------------------------------------------------|
//! | Validate       | probabilities in `[0, 1]`, start nodes in the network     |
//! | Initialize     | infect the infection start, then inoculate the inoculation start |
//! | Period         | snapshot, record counts, infection pass, inoculation pass |
//! | Terminate      | infected set empty or covering every node                 |
//! | Final snapshot | one more record after the loop                            |
//!
//! A run that executes `P` periods has `P + 1` history records.
//!
//! # Non-convergence
//!
//! Some inputs never terminate: with zero probabilities, or when the worm
//! is walled off by inoculated nodes that can no longer spread. The engine
//! cuts these runs off instead of looping, either because a period changed
//! nothing and no transition remains possible
//! ([`Stalled`](crate::error::NonConvergenceReason::Stalled)) or because the
//! optional period cutoff was hit. The run still returns its report, with
//! [`Termination::NotConverged`], its history and the final node states;
//! [`SimulationReport::into_converged`] turns it into
//! [`WormError::NonConvergence`](crate::error::WormError).
//!
//! # Usage
//!
//! ```rust,ignore
//! use rand::thread_rng;
//! use worm_defense::graph::Network;
//! use worm_defense::simulation::{run, SimulationParams};
//!
//! let network = Network::from_edges([(1, 2), (2, 3), (3, 4)])?;
//! let params = SimulationParams::defense(1, 0.5, 4, 0.5).with_max_periods(1_000);
//! let report = run(&network, &params, &mut thread_rng())?;
//!
//! for record in &report.history {
//!     println!("{record}");
//! }
//! ```

mod engine;
mod history;
mod state;

pub use engine::{
    run, NodeOutcome, Simulation, SimulationParams, SimulationReport, SimulationState,
    StepOutcome, Termination,
};
pub use history::{History, HistoryRecord};
pub use state::{NodeState, StateStore};

//! Worm defense error types.
//!
//! Every failure is local to a single call: a run owns its state, so an
//! error never leaves a shared graph or another run half-mutated.
//!
//! A cut-off run is not an error by itself: the engine returns its full
//! report. `NonConvergence` is what
//! [`SimulationReport::into_converged`](crate::simulation::SimulationReport::into_converged)
//! produces for callers that want to treat it as one.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Worm defense errors.
#[derive(Error, Debug)]
pub enum WormError {
    /// A probability or start node was rejected before any work was done.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A node lookup referenced a node that is not part of the graph.
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// An edge cannot be added to a simple undirected graph.
    #[error("Invalid edge: {0}")]
    InvalidEdge(String),

    /// A node state change that would leave the absorbing state.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// The simulation was cut off before reaching a terminal state.
    #[error("Simulation did not converge after {periods} periods ({infected} nodes still infected): {reason}")]
    NonConvergence {
        /// Period counter when the run was stopped.
        periods: usize,
        /// Live infected count when the run was stopped.
        infected: usize,
        /// Why the run was stopped.
        reason: NonConvergenceReason,
    },

    /// Malformed edge-list input.
    #[error("Edge list error on line {line}: {message}")]
    EdgeList {
        /// 1-based line number in the input.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a run was reported as non-convergent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonConvergenceReason {
    /// The caller-supplied period cutoff was reached.
    PeriodLimit,
    /// No remaining transition has a non-zero probability, so the infected
    /// count can never reach 0 or the node total.
    Stalled,
}

impl fmt::Display for NonConvergenceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonConvergenceReason::PeriodLimit => write!(f, "period limit reached"),
            NonConvergenceReason::Stalled => write!(f, "no further transition is possible"),
        }
    }
}

/// Result type alias for worm defense operations
pub type Result<T> = std::result::Result<T, WormError>;

impl From<toml::de::Error> for WormError {
    fn from(err: toml::de::Error) -> Self {
        WormError::Config(err.to_string())
    }
}

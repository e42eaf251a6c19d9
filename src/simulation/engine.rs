//! Discrete-time simulation engine.
//!
//! Each period takes a snapshot of the infected and inoculated sources,
//! records the counts, then runs two passes over the snapshot:
//!
//! 1. **Infection**: every susceptible neighbor of an infected source gets
//!    one Bernoulli trial with the infection probability.
//! 2. **Inoculation**: every not-yet-inoculated neighbor of an inoculated
//!    source gets one Bernoulli trial with the inoculation probability,
//!    curing any infection (including one acquired earlier in the period).
//!
//! Sources come from the snapshot; targets are checked against the live
//! store, so a node infected earlier in a pass is not tried again by later
//! sources in the same pass. Updates are applied in place, not
//! copy-then-apply: the order of sources and neighbors affects the outcome
//! and is kept deterministic.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::history::{History, HistoryRecord};
use super::state::{NodeState, StateStore};
use crate::error::{NonConvergenceReason, Result, WormError};
use crate::graph::{Network, NodeId, NodeIndex};

/// Parameters of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams<N> {
    infection_probability: f64,
    infection_start: N,
    inoculation_probability: f64,
    inoculation_start: Option<N>,
    max_periods: Option<usize>,
}

impl<N: NodeId> SimulationParams<N> {
    /// Worm propagation only: start at `infection_start`, spread with
    /// `infection_probability`, no inoculation and no period cutoff.
    pub fn new(infection_start: N, infection_probability: f64) -> Self {
        Self {
            infection_probability,
            infection_start,
            inoculation_probability: 0.0,
            inoculation_start: None,
            max_periods: None,
        }
    }

    /// Worm propagation competing with inoculation.
    pub fn defense(
        infection_start: N,
        infection_probability: f64,
        inoculation_start: N,
        inoculation_probability: f64,
    ) -> Self {
        Self::new(infection_start, infection_probability)
            .with_inoculation(inoculation_start, inoculation_probability)
    }

    /// Start inoculation at `start`, spreading with `probability`
    pub fn with_inoculation(mut self, start: N, probability: f64) -> Self {
        self.inoculation_start = Some(start);
        self.inoculation_probability = probability;
        self
    }

    /// Cut the run off with [`NonConvergenceReason::PeriodLimit`] once the
    /// period counter reaches `max`
    pub fn with_max_periods(mut self, max: usize) -> Self {
        self.max_periods = Some(max);
        self
    }

    /// Infection probability
    pub fn infection_probability(&self) -> f64 {
        self.infection_probability
    }

    /// Infection start node
    pub fn infection_start(&self) -> &N {
        &self.infection_start
    }

    /// Inoculation probability (0 when inoculation is disabled)
    pub fn inoculation_probability(&self) -> f64 {
        self.inoculation_probability
    }

    /// Inoculation start node, if inoculation is enabled
    pub fn inoculation_start(&self) -> Option<&N> {
        self.inoculation_start.as_ref()
    }

    /// Period cutoff
    pub fn max_periods(&self) -> Option<usize> {
        self.max_periods
    }

    /// Check probabilities and resolve start nodes against `network`.
    pub fn validate(&self, network: &Network<N>) -> Result<(NodeIndex, Option<NodeIndex>)> {
        check_probability("infection probability", self.infection_probability)?;
        check_probability("inoculation probability", self.inoculation_probability)?;

        let infection = resolve_start(network, "infection", &self.infection_start)?;
        let inoculation = self
            .inoculation_start
            .as_ref()
            .map(|node| resolve_start(network, "inoculation", node))
            .transpose()?;

        Ok((infection, inoculation))
    }
}

fn check_probability(name: &str, p: f64) -> Result<()> {
    // NaN fails `contains` as well
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(WormError::InvalidParameter(format!(
            "{name} must be within [0, 1], got {p}"
        )))
    }
}

fn resolve_start<N: NodeId>(network: &Network<N>, what: &str, node: &N) -> Result<NodeIndex> {
    network.index_of(node).map_err(|_| {
        WormError::InvalidParameter(format!("{what} start node {node:?} is not in the network"))
    })
}

/// One Bernoulli trial. `p == 0` never succeeds, `p == 1` always does.
fn trial<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < p
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No node is infected any more
    Extinguished,
    /// Every node is infected
    Saturated,
    /// The run was cut off with the infected count strictly between 0 and
    /// the node total
    NotConverged(NonConvergenceReason),
}

impl Termination {
    /// Check whether the run reached one of the two terminal states
    pub fn is_converged(&self) -> bool {
        !matches!(self, Termination::NotConverged(_))
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Extinguished => write!(f, "extinguished"),
            Termination::Saturated => write!(f, "saturated"),
            Termination::NotConverged(reason) => write!(f, "not converged: {reason}"),
        }
    }
}

/// Transitions applied during one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Susceptible nodes that became infected
    pub newly_infected: usize,
    /// Nodes that became inoculated
    pub newly_inoculated: usize,
    /// Of `newly_inoculated`, how many were infected before
    pub cured: usize,
}

impl StepOutcome {
    /// Check whether the period changed no node
    pub fn is_quiet(&self) -> bool {
        self.newly_infected == 0 && self.newly_inoculated == 0
    }
}

/// Mutable state owned by a single run.
#[derive(Debug, Clone)]
pub struct SimulationState {
    states: StateStore,
    period: usize,
    history: History,
}

impl SimulationState {
    fn new(node_count: usize) -> Self {
        Self {
            states: StateStore::new(node_count),
            period: 0,
            history: History::new(),
        }
    }

    /// Per-node states
    pub fn states(&self) -> &StateStore {
        &self.states
    }

    /// Current period counter
    pub fn period(&self) -> usize {
        self.period
    }

    /// Records taken so far
    pub fn history(&self) -> &History {
        &self.history
    }

    fn snapshot(&mut self) {
        self.history.push(HistoryRecord::new(
            self.period,
            self.states.infected_count(),
            self.states.inoculated_count(),
        ));
    }
}

/// Final state of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeOutcome<N> {
    /// Node identifier
    pub node: N,
    /// State at the end of the run
    pub state: NodeState,
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport<N> {
    /// Why the run stopped
    pub termination: Termination,
    /// Number of periods executed
    pub periods: usize,
    /// Total nodes in the network
    pub node_count: usize,
    /// One record per executed period plus the final snapshot
    pub history: History,
    /// Final state of every node, in network order
    pub final_states: Vec<NodeOutcome<N>>,
}

impl<N: NodeId> SimulationReport<N> {
    /// Infected count at the end of the run
    pub fn final_infected(&self) -> usize {
        self.history.last().map_or(0, |r| r.infected)
    }

    /// Inoculated count at the end of the run
    pub fn final_inoculated(&self) -> usize {
        self.history.last().map_or(0, |r| r.inoculated)
    }

    /// Final state of `node`
    pub fn state_of(&self, node: &N) -> Option<NodeState> {
        self.final_states
            .iter()
            .find(|o| &o.node == node)
            .map(|o| o.state)
    }

    /// Nodes that ended in `state`, in network order
    pub fn nodes_in(&self, state: NodeState) -> Vec<&N> {
        self.final_states
            .iter()
            .filter(|o| o.state == state)
            .map(|o| &o.node)
            .collect()
    }

    /// Turn a cut-off run into [`WormError::NonConvergence`], passing
    /// converged reports through unchanged.
    pub fn into_converged(self) -> Result<Self> {
        match self.termination {
            Termination::NotConverged(reason) => Err(WormError::NonConvergence {
                periods: self.periods,
                infected: self.final_infected(),
                reason,
            }),
            _ => Ok(self),
        }
    }
}

/// A run in progress over a borrowed network.
///
/// [`Simulation::run`] drives it to completion; [`Simulation::step`] is
/// exposed for callers that want to observe every period.
#[derive(Debug)]
pub struct Simulation<'g, N> {
    network: &'g Network<N>,
    infection_probability: f64,
    inoculation_probability: f64,
    max_periods: Option<usize>,
    state: SimulationState,
}

impl<'g, N: NodeId> Simulation<'g, N> {
    /// Validate `params` and initialize node states.
    ///
    /// The infection start is infected first, then the inoculation start is
    /// inoculated. When both are the same node it ends up inoculated and not
    /// infected: inoculation clears infection at initialization exactly as
    /// it does during a period.
    pub fn new(network: &'g Network<N>, params: &SimulationParams<N>) -> Result<Self> {
        let (infection_start, inoculation_start) = params.validate(network)?;

        let mut state = SimulationState::new(network.node_count());
        state.states.set_infected(infection_start)?;
        if let Some(idx) = inoculation_start {
            state.states.set_inoculated(idx);
        }

        tracing::info!(
            "Starting simulation on {} nodes: infection p={} from {:?}, inoculation p={} from {:?}",
            network.node_count(),
            params.infection_probability,
            params.infection_start,
            params.inoculation_probability,
            params.inoculation_start
        );

        Ok(Self {
            network,
            infection_probability: params.infection_probability,
            inoculation_probability: params.inoculation_probability,
            max_periods: params.max_periods,
            state,
        })
    }

    /// Run state so far
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Current state of `node`
    pub fn node_state(&self, node: &N) -> Result<NodeState> {
        let idx = self.network.index_of(node)?;
        Ok(self.state.states.get(idx))
    }

    /// Check the termination predicate against the live infected count
    pub fn termination(&self) -> Option<Termination> {
        let infected = self.state.states.infected_count();
        if infected == 0 {
            Some(Termination::Extinguished)
        } else if infected >= self.network.node_count() {
            Some(Termination::Saturated)
        } else {
            None
        }
    }

    /// Execute one period: snapshot, record, infection pass, inoculation
    /// pass, advance the counter.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<StepOutcome> {
        let network = self.network;
        let infected = self.state.states.infected_nodes();
        let inoculated = self.state.states.inoculated_nodes();
        self.state.snapshot();

        let mut outcome = StepOutcome::default();

        for &source in &infected {
            for target in network.neighbor_indices(source) {
                if self.state.states.get(target).is_susceptible()
                    && trial(rng, self.infection_probability)
                {
                    self.state.states.set_infected(target)?;
                    outcome.newly_infected += 1;
                }
            }
        }

        for &source in &inoculated {
            for target in network.neighbor_indices(source) {
                let current = self.state.states.get(target);
                if !current.is_inoculated() && trial(rng, self.inoculation_probability) {
                    self.state.states.set_inoculated(target);
                    outcome.newly_inoculated += 1;
                    if current.is_infected() {
                        outcome.cured += 1;
                    }
                }
            }
        }

        tracing::debug!(
            "Period {}: {} infected, {} inoculated (+{} infected, +{} inoculated, {} cured)",
            self.state.period,
            self.state.states.infected_count(),
            self.state.states.inoculated_count(),
            outcome.newly_infected,
            outcome.newly_inoculated,
            outcome.cured
        );

        self.state.period += 1;
        Ok(outcome)
    }

    /// Check whether any transition still has a non-zero probability.
    ///
    /// Makes no random draws.
    pub fn can_progress(&self) -> bool {
        let states = &self.state.states;
        let infection_open = self.infection_probability > 0.0
            && states.iter().any(|(idx, state)| {
                state.is_infected()
                    && self
                        .network
                        .neighbor_indices(idx)
                        .any(|n| states.get(n).is_susceptible())
            });
        if infection_open {
            return true;
        }

        self.inoculation_probability > 0.0
            && states.iter().any(|(idx, state)| {
                state.is_inoculated()
                    && self
                        .network
                        .neighbor_indices(idx)
                        .any(|n| !states.get(n).is_inoculated())
            })
    }

    /// Run until the infected set is empty or covers the whole network.
    ///
    /// A run cut off by the period limit, or by a period that changed
    /// nothing with no further transition possible, still returns its
    /// report with [`Termination::NotConverged`]. Use
    /// [`SimulationReport::into_converged`] to treat that as an error.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> Result<SimulationReport<N>> {
        let termination = loop {
            if let Some(termination) = self.termination() {
                break termination;
            }

            if let Some(max) = self.max_periods {
                if self.state.period >= max {
                    break self.not_converged(NonConvergenceReason::PeriodLimit);
                }
            }

            let outcome = self.step(rng)?;
            if outcome.is_quiet() && !self.can_progress() {
                break self.not_converged(NonConvergenceReason::Stalled);
            }
        };

        self.state.snapshot();

        tracing::info!(
            "Simulation {} after {} periods: {} infected, {} inoculated",
            termination,
            self.state.period,
            self.state.states.infected_count(),
            self.state.states.inoculated_count()
        );

        Ok(self.into_report(termination))
    }

    fn not_converged(&self, reason: NonConvergenceReason) -> Termination {
        tracing::warn!(
            "Simulation stopped without converging after {} periods ({} infected): {}",
            self.state.period,
            self.state.states.infected_count(),
            reason
        );
        Termination::NotConverged(reason)
    }

    fn into_report(self, termination: Termination) -> SimulationReport<N> {
        let final_states = self
            .state
            .states
            .iter()
            .map(|(idx, state)| NodeOutcome {
                node: self.network.node(idx).clone(),
                state,
            })
            .collect();

        SimulationReport {
            termination,
            periods: self.state.period,
            node_count: self.network.node_count(),
            history: self.state.history,
            final_states,
        }
    }
}

/// Validate, initialize and run a simulation in one call.
pub fn run<N, R>(
    network: &Network<N>,
    params: &SimulationParams<N>,
    rng: &mut R,
) -> Result<SimulationReport<N>>
where
    N: NodeId,
    R: Rng + ?Sized,
{
    Simulation::new(network, params)?.run(rng)
}

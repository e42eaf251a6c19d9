//! Per-node state store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WormError};
use crate::graph::NodeIndex;

/// State of a single node.
///
/// `Inoculated` is absorbing: no operation on [`StateStore`] moves a node
/// out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// Never infected or inoculated
    #[default]
    Susceptible,
    /// Spreading the worm
    Infected,
    /// Immune, and cured if it was infected
    Inoculated,
}

impl NodeState {
    /// Check if infected
    pub fn is_infected(&self) -> bool {
        matches!(self, NodeState::Infected)
    }

    /// Check if inoculated
    pub fn is_inoculated(&self) -> bool {
        matches!(self, NodeState::Inoculated)
    }

    /// Check if susceptible
    pub fn is_susceptible(&self) -> bool {
        matches!(self, NodeState::Susceptible)
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeState::Susceptible => "susceptible",
            NodeState::Infected => "infected",
            NodeState::Inoculated => "inoculated",
        };
        f.write_str(name)
    }
}

/// Node states overlaid on a network, indexed by [`NodeIndex`].
///
/// Indices must come from the network the store was sized for; a foreign
/// index panics like an out-of-bounds slice access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStore {
    states: Vec<NodeState>,
    infected: usize,
    inoculated: usize,
}

impl StateStore {
    /// Create a store with every node `Susceptible`
    pub fn new(node_count: usize) -> Self {
        Self {
            states: vec![NodeState::Susceptible; node_count],
            infected: 0,
            inoculated: 0,
        }
    }

    /// Number of nodes tracked
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if the store tracks no nodes
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Current state of `idx`
    pub fn get(&self, idx: NodeIndex) -> NodeState {
        self.states[idx.index()]
    }

    /// Infect a susceptible node.
    ///
    /// Re-infecting an infected node is a no-op; infecting an inoculated
    /// node is an [`WormError::InvalidTransition`].
    pub fn set_infected(&mut self, idx: NodeIndex) -> Result<()> {
        let slot = &mut self.states[idx.index()];
        match *slot {
            NodeState::Susceptible => {
                *slot = NodeState::Infected;
                self.infected += 1;
                Ok(())
            },
            NodeState::Infected => Ok(()),
            NodeState::Inoculated => Err(WormError::InvalidTransition(format!(
                "node #{} is inoculated and cannot be infected",
                idx.index()
            ))),
        }
    }

    /// Inoculate a node from any state, clearing an infection.
    ///
    /// Returns `true` if the node was not already inoculated.
    pub fn set_inoculated(&mut self, idx: NodeIndex) -> bool {
        let slot = &mut self.states[idx.index()];
        match *slot {
            NodeState::Inoculated => false,
            previous => {
                if previous == NodeState::Infected {
                    self.infected -= 1;
                }
                *slot = NodeState::Inoculated;
                self.inoculated += 1;
                true
            },
        }
    }

    /// Snapshot of all infected nodes, in index order
    pub fn infected_nodes(&self) -> Vec<NodeIndex> {
        self.nodes_in(NodeState::Infected)
    }

    /// Snapshot of all inoculated nodes, in index order
    pub fn inoculated_nodes(&self) -> Vec<NodeIndex> {
        self.nodes_in(NodeState::Inoculated)
    }

    /// Live infected count
    pub fn infected_count(&self) -> usize {
        self.infected
    }

    /// Live inoculated count
    pub fn inoculated_count(&self) -> usize {
        self.inoculated
    }

    /// Iterate `(index, state)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, NodeState)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(i, state)| (NodeIndex::new(i), *state))
    }

    fn nodes_in(&self, wanted: NodeState) -> Vec<NodeIndex> {
        self.iter()
            .filter(|(_, state)| *state == wanted)
            .map(|(idx, _)| idx)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn test_new_store_is_susceptible() {
        let store = StateStore::new(3);
        assert_eq!(store.len(), 3);
        assert!(store.iter().all(|(_, s)| s.is_susceptible()));
        assert_eq!(store.infected_count(), 0);
        assert_eq!(store.inoculated_count(), 0);
    }

    #[test]
    fn test_infect_then_inoculate() {
        let mut store = StateStore::new(3);
        store.set_infected(idx(1)).unwrap();
        assert_eq!(store.get(idx(1)), NodeState::Infected);
        assert_eq!(store.infected_nodes(), vec![idx(1)]);

        assert!(store.set_inoculated(idx(1)));
        assert_eq!(store.get(idx(1)), NodeState::Inoculated);
        assert!(store.infected_nodes().is_empty());
        assert_eq!(store.inoculated_nodes(), vec![idx(1)]);
        assert_eq!(store.infected_count(), 0);
        assert_eq!(store.inoculated_count(), 1);
    }

    #[test]
    fn test_reinfect_is_noop() {
        let mut store = StateStore::new(2);
        store.set_infected(idx(0)).unwrap();
        store.set_infected(idx(0)).unwrap();
        assert_eq!(store.infected_count(), 1);
    }

    #[test]
    fn test_inoculated_is_absorbing() {
        let mut store = StateStore::new(2);
        assert!(store.set_inoculated(idx(0)));
        assert!(!store.set_inoculated(idx(0)));

        let err = store.set_infected(idx(0)).unwrap_err();
        assert!(matches!(err, WormError::InvalidTransition(_)));
        assert_eq!(store.get(idx(0)), NodeState::Inoculated);
        assert_eq!(store.inoculated_count(), 1);
    }

    #[test]
    fn test_counts_match_snapshots() {
        let mut store = StateStore::new(5);
        store.set_infected(idx(0)).unwrap();
        store.set_infected(idx(2)).unwrap();
        store.set_infected(idx(4)).unwrap();
        store.set_inoculated(idx(2));
        store.set_inoculated(idx(3));

        assert_eq!(store.infected_count(), store.infected_nodes().len());
        assert_eq!(store.inoculated_count(), store.inoculated_nodes().len());
        assert_eq!(store.infected_nodes(), vec![idx(0), idx(4)]);
        assert_eq!(store.inoculated_nodes(), vec![idx(2), idx(3)]);
    }

    #[test]
    fn test_state_display_and_serde() {
        assert_eq!(NodeState::Inoculated.to_string(), "inoculated");
        assert_eq!(
            serde_json::to_string(&NodeState::Infected).unwrap(),
            "\"infected\""
        );
    }
}

//! Network graph model.
//!
//! An undirected, unweighted simple graph with stable node identities,
//! backed by [`petgraph`]. The simulation engine only ever reads from a
//! [`Network`]; building one is the job of the edge-list loader
//! ([`edgelist`]) or one of the random-graph generators ([`generate`]).
//!
//! # Identity and ordering
//!
//! Nodes are opaque identifiers of any `Clone + Eq + Hash + Debug` type.
//! Each identifier is assigned a dense [`NodeIndex`] on first sight, and
//! [`Network::nodes`] iterates in that first-seen order. Neighbor order is
//! fixed by edge insertion order, so two networks built from the same edge
//! sequence iterate identically and a seeded run reproduces its trace.
//!
//! ```rust,ignore
//! use worm_defense::graph::Network;
//!
//! let network = Network::from_edges([(1, 2), (2, 3)])?;
//! assert_eq!(network.node_count(), 3);
//! assert_eq!(network.neighbors(&2)?.len(), 2);
//! ```

pub mod edgelist;
pub mod generate;

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;

use crate::error::{Result, WormError};

pub use edgelist::{parse_edge_list, read_edge_list, write_edge_list, DEFAULT_DELIMITER};
pub use generate::{barabasi_albert, erdos_renyi, watts_strogatz, GraphModel};
pub use petgraph::graph::NodeIndex;

/// Bounds every node identifier satisfies.
pub trait NodeId: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> NodeId for T {}

/// Undirected simple graph keyed by caller-chosen node identifiers.
#[derive(Debug, Clone)]
pub struct Network<N> {
    graph: UnGraph<N, ()>,
    index: HashMap<N, NodeIndex>,
}

impl<N> Default for Network<N> {
    fn default() -> Self {
        Self {
            graph: UnGraph::default(),
            index: HashMap::new(),
        }
    }
}

impl<N: NodeId> Network<N> {
    /// Create an empty network
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a network from a sequence of undirected edges.
    ///
    /// Duplicate edges (in either direction) are collapsed; self-loops are
    /// rejected.
    pub fn from_edges<I>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, N)>,
    {
        let mut network = Self::new();
        for (a, b) in edges {
            network.add_edge(a, b)?;
        }
        Ok(network)
    }

    /// Add a node, returning its index. Adding an existing node is a no-op.
    pub fn add_node(&mut self, node: N) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(node, idx);
        idx
    }

    /// Add an undirected edge, creating missing endpoints.
    ///
    /// Returns `false` if the edge was already present.
    pub fn add_edge(&mut self, a: N, b: N) -> Result<bool> {
        if a == b {
            return Err(WormError::InvalidEdge(format!(
                "self-loop on node {a:?} is not allowed"
            )));
        }

        let a = self.add_node(a);
        let b = self.add_node(b);
        if self.graph.find_edge(a, b).is_some() {
            return Ok(false);
        }
        self.graph.add_edge(a, b, ());
        Ok(true)
    }

    /// Check whether a node exists
    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Resolve a node identifier to its dense index.
    pub fn index_of(&self, node: &N) -> Result<NodeIndex> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| WormError::UnknownNode(format!("{node:?}")))
    }

    /// Get the identifier stored at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this network.
    pub fn node(&self, idx: NodeIndex) -> &N {
        &self.graph[idx]
    }

    /// Iterate node identifiers in first-seen order
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Iterate node indices in first-seen order
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check whether the network has no nodes
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Neighbors of `node`.
    pub fn neighbors(&self, node: &N) -> Result<Vec<&N>> {
        let idx = self.index_of(node)?;
        Ok(self
            .graph
            .neighbors(idx)
            .map(|n| &self.graph[n])
            .collect())
    }

    /// Neighbor indices of `idx`, in the network's fixed iteration order.
    pub fn neighbor_indices(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    /// Degree of `node`.
    pub fn degree(&self, node: &N) -> Result<usize> {
        let idx = self.index_of(node)?;
        Ok(self.graph.neighbors(idx).count())
    }

    /// Check whether `a` and `b` are adjacent. Unknown nodes are never adjacent.
    pub fn contains_edge(&self, a: &N, b: &N) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Iterate edges as endpoint pairs, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N)> + '_ {
        self.graph
            .edge_references()
            .map(move |e| (&self.graph[e.source()], &self.graph[e.target()]))
    }
}

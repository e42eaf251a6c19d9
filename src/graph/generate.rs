//! Random graph generators.
//!
//! Three classic models, each producing a [`Network<usize>`] with nodes
//! `0..n`. Generators take the rng explicitly; callers that want
//! reproducible graphs pass a seeded one (the default generator seed is 15).
//!
//! | Model             | Parameters        | Shape                              |
//! |-------------------|-------------------|------------------------------------|
//! | `ErdosRenyi`      | `n`, `p`          | every pair joined with probability p |
//! | `BarabasiAlbert`  | `n`, `m`          | preferential attachment, m edges per new node |
//! | `WattsStrogatz`   | `n`, `k`, `p`     | ring lattice with rewiring         |

use std::fmt;
use std::str::FromStr;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::seq::SliceRandom;
use rand::Rng;

use super::Network;
use crate::config::GeneratorConfig;
use crate::error::{Result, WormError};

/// Random graph model selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphModel {
    /// G(n, p) random graph
    ErdosRenyi,
    /// Preferential attachment
    BarabasiAlbert,
    /// Small-world ring with rewiring
    WattsStrogatz,
}

impl GraphModel {
    /// All models, in the order the generator tool emits them
    pub const ALL: [GraphModel; 3] = [
        GraphModel::ErdosRenyi,
        GraphModel::BarabasiAlbert,
        GraphModel::WattsStrogatz,
    ];

    /// Kebab-case name, also used in generated file names
    pub fn name(&self) -> &'static str {
        match self {
            GraphModel::ErdosRenyi => "erdos-renyi",
            GraphModel::BarabasiAlbert => "barabasi-albert",
            GraphModel::WattsStrogatz => "watts-strogatz",
        }
    }

    /// Conventional edge-list file name for a graph of `nodes` nodes
    pub fn file_name(&self, nodes: usize) -> String {
        format!("edgelist-{}-{nodes}.csv", self.name())
    }

    /// Generate a graph with this model using `config`'s parameters
    pub fn generate<R: Rng + ?Sized>(
        &self,
        config: &GeneratorConfig,
        rng: &mut R,
    ) -> Result<Network<usize>> {
        match self {
            GraphModel::ErdosRenyi => erdos_renyi(config.nodes, config.edge_probability, rng),
            GraphModel::BarabasiAlbert => barabasi_albert(config.nodes, config.attachment, rng),
            GraphModel::WattsStrogatz => watts_strogatz(
                config.nodes,
                config.ring_neighbors,
                config.edge_probability,
                rng,
            ),
        }
    }
}

impl fmt::Display for GraphModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GraphModel {
    type Err = WormError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "erdos-renyi" | "er" | "gnp" => Ok(GraphModel::ErdosRenyi),
            "barabasi-albert" | "ba" => Ok(GraphModel::BarabasiAlbert),
            "watts-strogatz" | "ws" | "small-world" => Ok(GraphModel::WattsStrogatz),
            _ => Err(WormError::InvalidParameter(format!(
                "unknown graph model: {s} (use erdos-renyi, barabasi-albert, watts-strogatz)"
            ))),
        }
    }
}

fn check_probability(name: &str, p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(WormError::InvalidParameter(format!(
            "{name} must be within [0, 1], got {p}"
        )))
    }
}

fn empty_graph(n: usize) -> (UnGraph<usize, ()>, Vec<NodeIndex>) {
    let mut graph = UnGraph::new_undirected();
    let nodes: Vec<NodeIndex> = (0..n).map(|i| graph.add_node(i)).collect();
    (graph, nodes)
}

fn into_network(graph: &UnGraph<usize, ()>) -> Result<Network<usize>> {
    let mut network = Network::new();
    for idx in graph.node_indices() {
        network.add_node(graph[idx]);
    }
    for edge in graph.edge_references() {
        network.add_edge(graph[edge.source()], graph[edge.target()])?;
    }
    Ok(network)
}

/// G(n, p): each of the `n(n-1)/2` pairs is joined independently with
/// probability `p`.
pub fn erdos_renyi<R: Rng + ?Sized>(n: usize, p: f64, rng: &mut R) -> Result<Network<usize>> {
    check_probability("edge probability", p)?;

    let (mut graph, nodes) = empty_graph(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen::<f64>() < p {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
    }

    into_network(&graph)
}

/// Preferential attachment: a star with hub `0` and leaves `1..=m` seeds
/// the graph, then every new node attaches to `m` distinct existing nodes
/// chosen with probability proportional to their degree.
///
/// The graph has `(n - m) * m` edges and is connected.
pub fn barabasi_albert<R: Rng + ?Sized>(n: usize, m: usize, rng: &mut R) -> Result<Network<usize>> {
    if m == 0 || m >= n {
        return Err(WormError::InvalidParameter(format!(
            "attachment count must satisfy 1 <= m < n, got m={m}, n={n}"
        )));
    }

    let (mut graph, nodes) = empty_graph(n);
    // Each node appears once per incident edge, which makes uniform
    // sampling from this list degree-proportional.
    let mut repeated: Vec<usize> = std::iter::repeat(0).take(m).collect();
    for leaf in 1..=m {
        graph.add_edge(nodes[0], nodes[leaf], ());
        repeated.push(leaf);
    }

    let mut targets: Vec<usize> = Vec::with_capacity(m);
    for source in (m + 1)..n {
        targets.clear();
        while targets.len() < m {
            if let Some(&candidate) = repeated.choose(rng) {
                if !targets.contains(&candidate) {
                    targets.push(candidate);
                }
            }
        }

        for &target in &targets {
            graph.add_edge(nodes[source], nodes[target], ());
        }
        repeated.extend(targets.iter().copied());
        repeated.extend(std::iter::repeat(source).take(m));
    }

    into_network(&graph)
}

/// Small-world graph: a ring where every node is joined to its `k / 2`
/// nearest neighbors on each side, after which each lattice edge
/// `(u, u + j)` is rewired to a random new endpoint with probability `p`.
pub fn watts_strogatz<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    p: f64,
    rng: &mut R,
) -> Result<Network<usize>> {
    check_probability("rewiring probability", p)?;
    if k >= n {
        return Err(WormError::InvalidParameter(format!(
            "ring neighbors must be smaller than node count, got k={k}, n={n}"
        )));
    }

    let (mut graph, nodes) = empty_graph(n);
    let half_k = k / 2;
    for i in 0..n {
        for j in 1..=half_k {
            let neighbor = (i + j) % n;
            if graph.find_edge(nodes[i], nodes[neighbor]).is_none() {
                graph.add_edge(nodes[i], nodes[neighbor], ());
            }
        }
    }

    for j in 1..=half_k {
        for u in 0..n {
            if rng.gen::<f64>() >= p {
                continue;
            }
            let v = (u + j) % n;
            let Some(edge) = graph.find_edge(nodes[u], nodes[v]) else {
                continue;
            };
            // Fully connected nodes have nowhere to rewire to
            if graph.neighbors(nodes[u]).count() >= n - 1 {
                continue;
            }

            let mut w = rng.gen_range(0..n);
            while w == u || graph.find_edge(nodes[u], nodes[w]).is_some() {
                w = rng.gen_range(0..n);
            }
            graph.remove_edge(edge);
            graph.add_edge(nodes[u], nodes[w], ());
        }
    }

    into_network(&graph)
}

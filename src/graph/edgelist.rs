//! Delimited edge-list reading and writing.
//!
//! Format: one undirected edge per line, two node tokens separated by a
//! delimiter (`,` by default). No header. Columns after the second are
//! ignored, blank lines are skipped and `#` starts a comment.
//!
//! Parsing is strict: a non-blank line with fewer than two node tokens, or
//! a self-loop, fails with [`WormError::EdgeList`] carrying its 1-based line
//! number instead of being skipped.
//!
//! ```text
//! 0,4
//! 0,7
//! 1,4   # trailing comments are fine
//! ```

use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use super::{Network, NodeId};
use crate::error::{Result, WormError};

/// Default column delimiter
pub const DEFAULT_DELIMITER: char = ',';

/// Parse an edge list into a network of string node identifiers.
pub fn parse_edge_list(input: &str, delimiter: char) -> Result<Network<String>> {
    let mut network = Network::new();

    for (lineno, raw) in input.lines().enumerate() {
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split(delimiter).map(str::trim);
        let (a, b) = match (tokens.next(), tokens.next()) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => (a, b),
            _ => {
                return Err(WormError::EdgeList {
                    line: lineno + 1,
                    message: format!("expected two node identifiers separated by {delimiter:?}"),
                })
            },
        };

        network
            .add_edge(a.to_string(), b.to_string())
            .map_err(|e| WormError::EdgeList {
                line: lineno + 1,
                message: e.to_string(),
            })?;
    }

    Ok(network)
}

/// Read an edge-list file.
pub fn read_edge_list(path: impl AsRef<Path>, delimiter: char) -> Result<Network<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let network = parse_edge_list(&content, delimiter)?;

    tracing::info!(
        "Loaded network from {}: {} nodes, {} edges",
        path.display(),
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

/// Write every edge of `network` as one delimited line.
///
/// Isolated nodes have no edge and are therefore not written.
pub fn write_edge_list<N, W>(network: &Network<N>, mut writer: W, delimiter: char) -> Result<()>
where
    N: NodeId + Display,
    W: Write,
{
    for (a, b) in network.edges() {
        writeln!(writer, "{a}{delimiter}{b}")?;
    }
    writer.flush()?;
    Ok(())
}

//! Path resolution: finds the one playable Input → Effect* → Output chain.
//!
//! Resolution runs on every Play(). It never mutates the graph and ignores
//! every node not reachable from the chosen Input, even if those nodes would
//! form a valid chain on their own.

use std::collections::HashSet;

use thiserror::Error;

use super::node::{Node, NodeId, NodeKind};
use super::store::GraphStore;

/// Why no playable path could be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No Input node has its source set.
    #[error("nothing to play: no input node with a source")]
    NoInput,
    /// The chain from the chosen Input ends before reaching an Output.
    #[error("nothing to play to: chain from {input} never reaches an output")]
    NoOutput {
        /// The Input the walk started from.
        input: NodeId,
    },
    /// Following `next` revisited a node before reaching an Output.
    #[error("loop detected at {0}")]
    CycleDetected(NodeId),
}

/// An ordered `[Input, Effect*, Output]` snapshot, valid for one Play().
///
/// Holds copies of the nodes so the compiler never borrows the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    nodes: Vec<Node>,
}

impl ResolvedPath {
    /// The Input node (first element).
    pub fn input(&self) -> &Node {
        &self.nodes[0]
    }

    /// The Output node (last element).
    pub fn output(&self) -> &Node {
        &self.nodes[self.nodes.len() - 1]
    }

    /// The Effect nodes between Input and Output, in path order.
    pub fn effects(&self) -> &[Node] {
        &self.nodes[1..self.nodes.len() - 1]
    }

    /// All nodes in path order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node ids in path order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(Node::id).collect()
    }

    /// Number of nodes on the path (always at least 2).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a resolved path holds at least an Input and an Output.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Resolves the playable path through `graph`.
///
/// Starts at the first Input (registration order) whose source is set, then
/// follows `next` links, appending each node. Fails with
/// [`ResolveError::CycleDetected`] if a node is revisited before an Output,
/// and with [`ResolveError::NoOutput`] if the chain simply ends.
pub fn resolve_playable_path(graph: &GraphStore) -> Result<ResolvedPath, ResolveError> {
    let start = graph
        .nodes()
        .iter()
        .find(|n| n.kind() == NodeKind::Input && n.source().is_some())
        .ok_or(ResolveError::NoInput)?;

    let mut visited = HashSet::from([start.id()]);
    let mut path = vec![start.clone()];
    let mut cursor = start.next();

    while let Some(id) = cursor {
        if !visited.insert(id) {
            tracing::warn!(node = %id, "loop detected while resolving path");
            return Err(ResolveError::CycleDetected(id));
        }
        let node = graph.node(id).ok_or(ResolveError::NoOutput { input: start.id() })?;
        path.push(node.clone());
        if node.kind() == NodeKind::Output {
            tracing::debug!(nodes = path.len(), "resolved playable path");
            return Ok(ResolvedPath { nodes: path });
        }
        cursor = node.next();
    }

    Err(ResolveError::NoOutput { input: start.id() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EffectArgsError, EffectCatalog};
    use crate::graph::NodeParams;

    struct AnyEffect;

    impl EffectCatalog for AnyEffect {
        fn contains(&self, _name: &str) -> bool {
            true
        }
        fn check_args(&self, _name: &str, _args: &[String]) -> Result<(), EffectArgsError> {
            Ok(())
        }
    }

    fn input_with_source(graph: &mut GraphStore, source: &str) -> NodeId {
        let id = graph.add_input_node();
        graph
            .set_parameters(id, NodeParams::input(source), &AnyEffect)
            .unwrap();
        id
    }

    #[test]
    fn test_empty_graph_has_no_input() {
        assert_eq!(
            resolve_playable_path(&GraphStore::new()),
            Err(ResolveError::NoInput)
        );
    }

    #[test]
    fn test_input_without_source_is_skipped() {
        let mut graph = GraphStore::new();
        let bare = graph.add_input_node();
        let output = graph.add_output_node();
        graph.connect(bare, output).unwrap();
        assert_eq!(resolve_playable_path(&graph), Err(ResolveError::NoInput));
    }

    #[test]
    fn test_input_effect_output_in_order() {
        let mut graph = GraphStore::new();
        let input = input_with_source(&mut graph, "a.wav");
        let fx = graph.add_effect_node("reverb");
        let output = graph.add_output_node();
        graph.connect(input, fx).unwrap();
        graph.connect(fx, output).unwrap();

        let path = resolve_playable_path(&graph).unwrap();
        assert_eq!(path.ids(), vec![input, fx, output]);
        assert_eq!(path.input().id(), input);
        assert_eq!(path.output().id(), output);
        assert_eq!(path.effects().len(), 1);
    }

    #[test]
    fn test_first_sourced_input_wins_even_if_unconnected() {
        let mut graph = GraphStore::new();
        let first = input_with_source(&mut graph, "a.wav");
        let second = input_with_source(&mut graph, "b.wav");
        let output = graph.add_output_node();
        graph.connect(second, output).unwrap();

        assert_eq!(
            resolve_playable_path(&graph),
            Err(ResolveError::NoOutput { input: first })
        );
    }

    #[test]
    fn test_cycle_between_effects() {
        let mut graph = GraphStore::new();
        let input = input_with_source(&mut graph, "a.wav");
        let a = graph.add_effect_node("echo");
        let b = graph.add_effect_node("vol");
        graph.add_output_node();
        graph.connect(input, a).unwrap();
        graph.connect(a, b).unwrap();
        graph.connect(b, a).unwrap();

        assert_eq!(
            resolve_playable_path(&graph),
            Err(ResolveError::CycleDetected(a))
        );
    }

    #[test]
    fn test_unreachable_output_is_ignored() {
        let mut graph = GraphStore::new();
        let input = input_with_source(&mut graph, "a.wav");
        let fx = graph.add_effect_node("vol");
        graph.add_output_node();
        graph.connect(input, fx).unwrap();

        assert_eq!(
            resolve_playable_path(&graph),
            Err(ResolveError::NoOutput { input })
        );
    }
}

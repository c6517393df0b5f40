//! Property-based tests for graph editing and path resolution.
//!
//! Graphs are generated from random node kinds and random link attempts, so
//! they are freely disconnected, multi-input, and cyclic.

use podstudio_core::graph::{
    GraphError, GraphStore, NodeId, NodeKind, NodeParams, ResolveError, resolve_playable_path,
};
use podstudio_core::{EffectArgsError, EffectCatalog};
use proptest::prelude::*;

struct AnyEffect;

impl EffectCatalog for AnyEffect {
    fn contains(&self, _name: &str) -> bool {
        true
    }
    fn check_args(&self, _name: &str, _args: &[String]) -> Result<(), EffectArgsError> {
        Ok(())
    }
}

fn kind_strategy() -> impl Strategy<Value = NodeKind> {
    prop_oneof![
        Just(NodeKind::Input),
        Just(NodeKind::Output),
        Just(NodeKind::Effect),
        Just(NodeKind::Effect),
    ]
}

/// Builds a graph from kinds, link attempts (indices modulo node count), and
/// which Input nodes get a source.
fn build(kinds: &[NodeKind], links: &[(usize, usize)], sourced: &[bool]) -> GraphStore {
    let mut graph = GraphStore::new();
    let ids: Vec<NodeId> = kinds.iter().map(|&k| graph.add_node(k)).collect();
    for (i, &id) in ids.iter().enumerate() {
        if kinds[i] == NodeKind::Input && sourced.get(i).copied().unwrap_or(false) {
            graph
                .set_parameters(id, NodeParams::input(format!("track{i}.wav")), &AnyEffect)
                .unwrap();
        }
    }
    for &(a, b) in links {
        let _ = graph.connect(ids[a % ids.len()], ids[b % ids.len()]);
    }
    graph
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Without a sourced Input, resolution always fails with NoInput.
    #[test]
    fn no_sourced_input_means_no_input(
        kinds in prop::collection::vec(kind_strategy(), 1..12),
        links in prop::collection::vec((0usize..12, 0usize..12), 0..20),
    ) {
        let graph = build(&kinds, &links, &[]);
        prop_assert_eq!(resolve_playable_path(&graph), Err(ResolveError::NoInput));
    }

    /// A resolved path starts at the first sourced Input, follows `next`
    /// links, ends at the first Output reached, and never repeats a node.
    #[test]
    fn resolved_paths_are_well_formed(
        kinds in prop::collection::vec(kind_strategy(), 1..12),
        links in prop::collection::vec((0usize..12, 0usize..12), 0..20),
        sourced in prop::collection::vec(any::<bool>(), 12),
    ) {
        let graph = build(&kinds, &links, &sourced);
        let first = graph
            .nodes()
            .iter()
            .find(|n| n.kind() == NodeKind::Input && n.source().is_some())
            .map(|n| n.id());

        match resolve_playable_path(&graph) {
            Ok(path) => {
                let nodes = path.nodes();
                prop_assert_eq!(Some(nodes[0].id()), first);
                prop_assert_eq!(nodes[nodes.len() - 1].kind(), NodeKind::Output);
                for pair in nodes.windows(2) {
                    prop_assert_eq!(pair[0].next(), Some(pair[1].id()));
                }
                for node in path.effects() {
                    prop_assert_eq!(node.kind(), NodeKind::Effect);
                }
                let mut ids = path.ids();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), path.len());
            }
            Err(ResolveError::NoInput) => prop_assert!(first.is_none()),
            Err(ResolveError::NoOutput { input }) => prop_assert_eq!(Some(input), first),
            Err(ResolveError::CycleDetected(_)) => prop_assert!(first.is_some()),
        }
    }

    /// A chain that loops back onto one of its own effects is always a cycle.
    #[test]
    fn looping_chain_is_cycle(effects in 1usize..8, back in 0usize..8) {
        let mut graph = GraphStore::new();
        let input = graph.add_input_node();
        graph.set_parameters(input, NodeParams::input("a.wav"), &AnyEffect).unwrap();
        let chain: Vec<NodeId> = (0..effects).map(|_| graph.add_effect_node("vol")).collect();
        graph.add_output_node();

        graph.connect(input, chain[0]).unwrap();
        for pair in chain.windows(2) {
            graph.connect(pair[0], pair[1]).unwrap();
        }
        let last = chain[effects - 1];
        let target = chain[back % effects];
        if last != target {
            graph.connect(last, target).unwrap();
            prop_assert_eq!(
                resolve_playable_path(&graph),
                Err(ResolveError::CycleDetected(target))
            );
        }
    }

    /// Links out of Outputs and into Inputs are rejected and change nothing.
    #[test]
    fn invalid_links_leave_graph_unchanged(
        kinds in prop::collection::vec(kind_strategy(), 2..10),
        links in prop::collection::vec((0usize..10, 0usize..10), 0..10),
        other in 0usize..10,
    ) {
        let mut graph = build(&kinds, &links, &[]);
        let before = graph.nodes().to_vec();
        let x = graph.nodes()[other % graph.len()].id();

        let outputs: Vec<NodeId> = graph.nodes().iter()
            .filter(|n| n.kind() == NodeKind::Output).map(|n| n.id()).collect();
        let inputs: Vec<NodeId> = graph.nodes().iter()
            .filter(|n| n.kind() == NodeKind::Input).map(|n| n.id()).collect();

        for out in outputs {
            let is_invalid_link = matches!(graph.connect(out, x), Err(GraphError::InvalidLink { .. }));
            prop_assert!(is_invalid_link);
        }
        for inp in inputs {
            let is_invalid_link = matches!(graph.connect(x, inp), Err(GraphError::InvalidLink { .. }));
            prop_assert!(is_invalid_link);
        }
        prop_assert_eq!(graph.nodes(), &before[..]);
    }
}

//! Podstudio Core - the signal-chain graph and the effect traits it compiles to.
//!
//! This crate holds everything about a signal chain that does not touch a
//! native audio handle:
//!
//! # Core Abstractions
//!
//! ## Effect System
//!
//! - [`Effect`] - Object-safe mono effect trait
//! - [`ChannelBank`] - One effect instance per channel, driven over interleaved buffers
//! - [`EffectCatalog`] - Read-only view of the named effect handlers a graph may use
//!
//! ## Graph
//!
//! - [`GraphStore`] - Arena of nodes, each with at most one outgoing link
//! - [`resolve_playable_path`] - Walks Input → Effect* → Output, detecting cycles
//!
//! # Example
//!
//! ```rust
//! use podstudio_core::graph::{GraphStore, NodeKind, resolve_playable_path};
//!
//! let mut graph = GraphStore::new();
//! let input = graph.add_input_node();
//! let output = graph.add_output_node();
//! graph.connect(input, output).unwrap();
//!
//! // No source set yet: nothing to play.
//! assert!(resolve_playable_path(&graph).is_err());
//! assert_eq!(graph.find_first_by_kind(NodeKind::Input).unwrap().id(), input);
//! ```

pub mod catalog;
pub mod effect;
pub mod graph;

pub use catalog::{EffectArgsError, EffectCatalog};
pub use effect::{ChannelBank, Effect};
pub use graph::{
    GraphError, GraphStore, Node, NodeId, NodeKind, NodeParams, ResolveError, ResolvedPath,
    resolve_playable_path,
};

//! Signal-chain graph: nodes, single outgoing links, and path resolution.
//!
//! The graph is edited freely on the controller thread. It may be
//! disconnected, contain unreachable nodes, or hold several Input and Output
//! nodes; none of that is an error while editing. Validity is only checked
//! when a path is resolved for playback.
//!
//! # Architecture
//!
//! - [`GraphStore`] - arena of [`Node`]s indexed by stable [`NodeId`]. A link is
//!   the optional `next` id on the source node, so each node has at most one
//!   outgoing link.
//! - [`resolve_playable_path`] - follows `next` from the first Input whose
//!   source is set until an Output is reached, tracking visited ids to detect
//!   cycles.
//!
//! # Example
//!
//! ```rust
//! use podstudio_core::graph::{GraphStore, NodeKind, resolve_playable_path};
//!
//! let mut graph = GraphStore::new();
//! let input = graph.add_input_node();
//! let reverb = graph.add_effect_node("reverb");
//! let output = graph.add_output_node();
//! graph.connect(input, reverb)?;
//! graph.connect(reverb, output)?;
//! # Ok::<(), podstudio_core::GraphError>(())
//! ```

pub mod node;
pub mod resolve;
pub mod store;

pub use node::{Node, NodeId, NodeKind, NodeParams};
pub use resolve::{ResolveError, ResolvedPath, resolve_playable_path};
pub use store::{GraphError, GraphStore};

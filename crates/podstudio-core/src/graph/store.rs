//! Graph storage: node arena, link mutation, and parameter validation.
//!
//! [`GraphStore`] owns every node. Nodes are never removed, so a [`NodeId`]
//! is a direct index into the arena and stays valid for the life of the store.
//! Every mutation is all-or-nothing: a failed call leaves the graph unchanged.

use thiserror::Error;

use crate::catalog::EffectCatalog;

use super::node::{Node, NodeId, NodeKind, NodeParams};

/// Errors returned synchronously by graph edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The specified node was not found in the graph.
    #[error("{0} not found")]
    NodeNotFound(NodeId),

    /// The link is structurally invalid.
    #[error("invalid link {from} -> {to}: {reason}")]
    InvalidLink {
        /// Source node.
        from: NodeId,
        /// Destination node.
        to: NodeId,
        /// Which rule the link breaks.
        reason: &'static str,
    },

    /// The parameters were rejected for this node.
    #[error("invalid parameters for {node}: {reason}")]
    InvalidParameters {
        /// Node being edited.
        node: NodeId,
        /// Why the parameters were rejected.
        reason: String,
    },
}

/// Arena of signal-chain nodes with single outgoing links.
///
/// # Usage
///
/// 1. Add nodes: [`add_input_node()`](Self::add_input_node),
///    [`add_effect_node()`](Self::add_effect_node),
///    [`add_output_node()`](Self::add_output_node)
/// 2. Link them: [`connect()`](Self::connect)
/// 3. Fill in parameters: [`set_parameters()`](Self::set_parameters)
/// 4. Resolve for playback: [`resolve_playable_path()`](super::resolve_playable_path)
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
}

impl GraphStore {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Node mutations ---

    /// Adds a node of `kind` with unset parameters. Always succeeds.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        self.push(NodeParams::unset(kind))
    }

    /// Adds an Input node with no source selected.
    pub fn add_input_node(&mut self) -> NodeId {
        self.add_node(NodeKind::Input)
    }

    /// Adds an Output node with no device selected.
    pub fn add_output_node(&mut self) -> NodeId {
        self.add_node(NodeKind::Output)
    }

    /// Adds an Effect node named `name` with no arguments.
    ///
    /// The name is not checked here; an unknown name surfaces when the chain
    /// is compiled. Use [`set_parameters()`](Self::set_parameters) for a
    /// validated edit.
    pub fn add_effect_node(&mut self, name: &str) -> NodeId {
        self.push(NodeParams::Effect {
            name: Some(name.to_string()),
            args: Vec::new(),
        })
    }

    fn push(&mut self, params: NodeParams) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        tracing::debug!(node = %id, kind = params.kind().name(), "graph_add");
        self.nodes.push(Node::new(id, params));
        id
    }

    /// Links `from` to `to`, replacing any previous outgoing link of `from`.
    ///
    /// Returns an error if:
    /// - Either node doesn't exist
    /// - `from == to`
    /// - `from` is an Output node (outputs cannot forward)
    /// - `to` is an Input node (inputs cannot receive)
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        let from_kind = self.get(from)?.kind();
        let to_kind = self.get(to)?.kind();

        let reason = if from == to {
            Some("a node cannot link to itself")
        } else if from_kind == NodeKind::Output {
            Some("output nodes cannot forward")
        } else if to_kind == NodeKind::Input {
            Some("input nodes cannot receive")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(GraphError::InvalidLink { from, to, reason });
        }

        let node = &mut self.nodes[from.0 as usize];
        let previous = node.next.replace(to);
        match previous {
            Some(old) if old != to => {
                tracing::debug!(%from, %to, replaced = %old, "graph_connect");
            }
            _ => tracing::debug!(%from, %to, "graph_connect"),
        }
        Ok(())
    }

    /// Removes the outgoing link of `from`, if any.
    ///
    /// Returns the previously linked node.
    pub fn disconnect(&mut self, from: NodeId) -> Result<Option<NodeId>, GraphError> {
        self.get(from)?;
        let previous = self.nodes[from.0 as usize].next.take();
        if let Some(to) = previous {
            tracing::debug!(%from, %to, "graph_disconnect");
        }
        Ok(previous)
    }

    /// Replaces a node's parameters after validating them for its kind.
    ///
    /// - Input requires a non-empty source
    /// - Output requires a non-empty device identifier
    /// - Effect requires a name known to `catalog` and an argument list it accepts
    pub fn set_parameters(
        &mut self,
        id: NodeId,
        params: NodeParams,
        catalog: &dyn EffectCatalog,
    ) -> Result<(), GraphError> {
        let kind = self.get(id)?.kind();
        let invalid = |reason: String| GraphError::InvalidParameters { node: id, reason };

        if params.kind() != kind {
            return Err(invalid(format!(
                "{} parameters given to {} node",
                params.kind().name(),
                kind.name()
            )));
        }

        match &params {
            NodeParams::Input { source } => {
                if source.as_deref().is_none_or(|s| s.trim().is_empty()) {
                    return Err(invalid("input source must be a non-empty path".into()));
                }
            }
            NodeParams::Output { device } => {
                if device.as_deref().is_none_or(|d| d.trim().is_empty()) {
                    return Err(invalid("output device must be named".into()));
                }
            }
            NodeParams::Effect { name, args } => {
                let Some(name) = name.as_deref() else {
                    return Err(invalid("effect name must be set".into()));
                };
                if !catalog.contains(name) {
                    return Err(invalid(format!("unknown effect '{name}'")));
                }
                catalog
                    .check_args(name, args)
                    .map_err(|e| invalid(format!("{name}: {e}")))?;
            }
        }

        tracing::debug!(node = %id, params = ?params, "graph_set_parameters");
        self.nodes[id.0 as usize].params = params;
        Ok(())
    }

    // --- Queries ---

    /// All nodes in registration order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// First node of `kind` in registration order.
    pub fn find_first_by_kind(&self, kind: NodeKind) -> Option<&Node> {
        self.nodes.iter().find(|n| n.kind() == kind)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn get(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.node(id).ok_or(GraphError::NodeNotFound(id))
    }
}

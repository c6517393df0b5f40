//! Graph node types.
//!
//! Each node has a [`NodeId`], kind-specific [`NodeParams`], and an optional
//! `next` link to exactly one downstream node.

use std::fmt;

/// Unique identifier for a node in the graph.
///
/// Node IDs are assigned sequentially and never reused within a graph instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// The role of a node in the signal chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Reads audio from a source (file path).
    Input,
    /// Writes audio to a device.
    Output,
    /// Applies a named effect with positional arguments.
    Effect,
}

impl NodeKind {
    /// Lowercase label used in logs and stage descriptions.
    pub const fn name(self) -> &'static str {
        match self {
            NodeKind::Input => "input",
            NodeKind::Output => "output",
            NodeKind::Effect => "effect",
        }
    }
}

/// Kind-specific node parameters.
///
/// Freshly added nodes start with fields unset; a later
/// [`set_parameters`](crate::GraphStore::set_parameters) call fills them in
/// (for example after a file or effect picker).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeParams {
    /// Input node: the source to read.
    Input {
        /// Source path, unset until chosen.
        source: Option<String>,
    },
    /// Output node: the device to write to.
    Output {
        /// Device identifier, unset means "use the configured default".
        device: Option<String>,
    },
    /// Effect node: registry name and argument list.
    Effect {
        /// Effect handler name, unset until chosen.
        name: Option<String>,
        /// Positional arguments passed to the effect factory.
        args: Vec<String>,
    },
}

impl NodeParams {
    /// Default (unset) parameters for a node of `kind`.
    pub fn unset(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Input => NodeParams::Input { source: None },
            NodeKind::Output => NodeParams::Output { device: None },
            NodeKind::Effect => NodeParams::Effect {
                name: None,
                args: Vec::new(),
            },
        }
    }

    /// Input parameters with `source` set.
    pub fn input(source: impl Into<String>) -> Self {
        NodeParams::Input {
            source: Some(source.into()),
        }
    }

    /// Output parameters with `device` set.
    pub fn output(device: impl Into<String>) -> Self {
        NodeParams::Output {
            device: Some(device.into()),
        }
    }

    /// Effect parameters with `name` and `args` set.
    pub fn effect<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NodeParams::Effect {
            name: Some(name.into()),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The node kind these parameters belong to.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeParams::Input { .. } => NodeKind::Input,
            NodeParams::Output { .. } => NodeKind::Output,
            NodeParams::Effect { .. } => NodeKind::Effect,
        }
    }
}

/// A vertex in the signal-chain graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) params: NodeParams,
    pub(crate) next: Option<NodeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, params: NodeParams) -> Self {
        Self {
            id,
            params,
            next: None,
        }
    }

    /// This node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// This node's kind.
    pub fn kind(&self) -> NodeKind {
        self.params.kind()
    }

    /// Current parameters.
    pub fn params(&self) -> &NodeParams {
        &self.params
    }

    /// The single downstream node, if linked.
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// Input source, if this is an Input node with its source set.
    pub fn source(&self) -> Option<&str> {
        match &self.params {
            NodeParams::Input { source } => source.as_deref(),
            _ => None,
        }
    }

    /// Output device, if this is an Output node with its device set.
    pub fn device(&self) -> Option<&str> {
        match &self.params {
            NodeParams::Output { device } => device.as_deref(),
            _ => None,
        }
    }

    /// Effect name and arguments, if this is an Effect node.
    pub fn effect(&self) -> Option<(Option<&str>, &[String])> {
        match &self.params {
            NodeParams::Effect { name, args } => Some((name.as_deref(), args.as_slice())),
            _ => None,
        }
    }

    /// Short label: the source, device, or effect name, falling back to the kind.
    pub fn label(&self) -> &str {
        match &self.params {
            NodeParams::Input { source } => source.as_deref().unwrap_or("input"),
            NodeParams::Output { device } => device.as_deref().unwrap_or("output"),
            NodeParams::Effect { name, .. } => name.as_deref().unwrap_or("(null-fx)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_params_match_kind() {
        for kind in [NodeKind::Input, NodeKind::Output, NodeKind::Effect] {
            assert_eq!(NodeParams::unset(kind).kind(), kind);
        }
    }

    #[test]
    fn test_node_accessors() {
        let node = Node::new(NodeId(3), NodeParams::effect("reverb", ["50"]));
        assert_eq!(node.kind(), NodeKind::Effect);
        assert_eq!(node.effect(), Some((Some("reverb"), &["50".to_string()][..])));
        assert_eq!(node.source(), None);
        assert_eq!(node.label(), "reverb");
        assert_eq!(node.id().to_string(), "node#3");
    }

    #[test]
    fn test_labels_fall_back_to_kind() {
        let input = Node::new(NodeId(0), NodeParams::unset(NodeKind::Input));
        let fx = Node::new(NodeId(1), NodeParams::unset(NodeKind::Effect));
        assert_eq!(input.label(), "input");
        assert_eq!(fx.label(), "(null-fx)");
    }
}

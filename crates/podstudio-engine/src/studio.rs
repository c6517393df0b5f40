//! The editor-facing facade: graph edits plus transport.

use std::path::Path;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use podstudio_config::{BackendKind, StudioConfig};
use podstudio_core::{GraphError, GraphStore, NodeId, NodeParams};
use podstudio_io::{AudioBackend, CpalBackend, CpalOptions, MemoryBackend};
use podstudio_registry::{EffectDescriptor, EffectRegistry};

use crate::{ChainCompiler, PlayError, PlaybackEngine, PlaybackEvent, Status};

/// One graph, one registry, one engine.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use podstudio_config::StudioConfig;
/// use podstudio_core::NodeParams;
/// use podstudio_engine::{Status, Studio};
/// use podstudio_io::{MemoryBackend, SignalSpec};
/// use podstudio_registry::EffectRegistry;
///
/// let backend = MemoryBackend::new();
/// backend.add_source("a.wav", SignalSpec::new(8000, 1), vec![0.0; 64]);
///
/// let mut studio = Studio::new(
///     Arc::new(backend),
///     Arc::new(EffectRegistry::new()),
///     &StudioConfig::default(),
/// );
/// let input = studio.add_input_node();
/// let output = studio.add_output_node();
/// studio.set_parameters(input, NodeParams::input("a.wav")).unwrap();
/// studio.connect(input, output).unwrap();
///
/// assert_eq!(studio.status(), Status::Idle);
/// studio.play().unwrap();
/// ```
pub struct Studio {
    graph: GraphStore,
    registry: Arc<EffectRegistry>,
    engine: PlaybackEngine,
    config: StudioConfig,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("nodes", &self.graph.len())
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Create a studio over an explicit backend and registry.
    pub fn new(
        backend: Arc<dyn AudioBackend>,
        registry: Arc<EffectRegistry>,
        config: &StudioConfig,
    ) -> Self {
        let compiler = ChainCompiler::new(
            backend,
            Arc::clone(&registry),
            config.audio.output_device.clone(),
        );
        Self {
            graph: GraphStore::new(),
            registry,
            engine: PlaybackEngine::new(compiler, config.audio.buffer_frames),
            config: config.clone(),
        }
    }

    /// Create a studio with the backend named in `config` and the built-in
    /// effects.
    pub fn from_config(config: &StudioConfig) -> Self {
        let backend: Arc<dyn AudioBackend> = match config.audio.backend {
            BackendKind::Cpal => Arc::new(CpalBackend::new(CpalOptions {
                queue_depth: config.audio.queue_depth,
            })),
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
        };
        let registry = Arc::new(EffectRegistry::new());
        for effect in registry.all_effects() {
            tracing::info!(
                effect = effect.name,
                usage = effect.usage,
                flags = %effect.flags,
                "effect handler"
            );
        }
        Self::new(backend, registry, config)
    }

    /// Add an Input node with no source.
    pub fn add_input_node(&mut self) -> NodeId {
        self.graph.add_input_node()
    }

    /// Add an Output node with no device.
    pub fn add_output_node(&mut self) -> NodeId {
        self.graph.add_output_node()
    }

    /// Add an Effect node named `name`. The name is checked when it is set
    /// through [`set_parameters`](Self::set_parameters) or at compile time.
    pub fn add_effect_node(&mut self, name: &str) -> NodeId {
        self.graph.add_effect_node(name)
    }

    /// Link `from` to `to`, replacing any previous link from `from`.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.graph.connect(from, to)
    }

    /// Remove the link out of `from`.
    pub fn disconnect(&mut self, from: NodeId) -> Result<Option<NodeId>, GraphError> {
        self.graph.disconnect(from)
    }

    /// Replace a node's parameters, validated against the registry.
    pub fn set_parameters(&mut self, node: NodeId, params: NodeParams) -> Result<(), GraphError> {
        self.graph.set_parameters(node, params, self.registry.as_ref())
    }

    /// The graph being edited.
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Effects offered when naming an Effect node.
    pub fn effect_menu(&self) -> Vec<&EffectDescriptor> {
        self.registry.menu_entries(self.config.menu.effect_entries)
    }

    /// Whether `path` passes the source file filter.
    pub fn accepts_source(&self, path: &Path) -> bool {
        self.config.input.accepts(path)
    }

    /// Start playing the graph. Never blocks on streaming.
    pub fn play(&mut self) -> Result<(), PlayError> {
        self.engine.play(&self.graph)
    }

    /// Request cancellation of the current session.
    pub fn stop(&self) {
        self.engine.stop();
    }

    /// Current transport state.
    pub fn status(&self) -> Status {
        self.engine.status()
    }

    /// Playback notifications.
    pub fn events(&self) -> Receiver<PlaybackEvent> {
        self.engine.events()
    }

    /// Stop, wait for and release any session.
    pub fn dispose(&mut self) {
        self.engine.dispose();
    }

    /// The engine, for compiling without playing.
    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }
}

//! Turns a resolved path into an owning, executable chain.
//!
//! Acquisition order is input stream, output stream, then effect stages.
//! Every acquired handle is an owned value local to [`ChainCompiler::compile`]
//! until the chain is assembled, so an early return drops exactly what was
//! acquired so far and nothing else.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use podstudio_core::{ChannelBank, EffectArgsError, NodeId, ResolvedPath};
use podstudio_io::{AudioBackend, InputStream, OutputStream, SignalSpec};
use podstudio_registry::{CreateError, EffectRegistry};
use thiserror::Error;

use crate::RuntimeError;

/// Failure to build a chain. Nothing acquired during the attempt outlives it.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The Input node's source could not be opened.
    #[error("cannot open input '{path}' ({node}): {cause}")]
    OpenInputFailed {
        /// Input node.
        node: NodeId,
        /// Source it names.
        path: String,
        /// Backend failure.
        #[source]
        cause: podstudio_io::Error,
    },

    /// The Output node's device could not be opened.
    #[error("cannot open output '{device}' ({node}): {cause}")]
    OpenOutputFailed {
        /// Output node.
        node: NodeId,
        /// Device it names (or the configured default).
        device: String,
        /// Backend failure.
        #[source]
        cause: podstudio_io::Error,
    },

    /// An Effect node names no registered effect.
    #[error("unknown effect '{name}' ({node})")]
    UnknownEffect {
        /// Effect node.
        node: NodeId,
        /// Name as set on the node, or its placeholder label.
        name: String,
    },

    /// The registry rejected an Effect node's arguments.
    #[error("invalid arguments for '{name}' ({node}): {cause}")]
    InvalidEffectArgs {
        /// Effect node.
        node: NodeId,
        /// Effect name.
        name: String,
        /// What was wrong.
        #[source]
        cause: EffectArgsError,
    },
}

/// One step of a compiled pipeline, for display and inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Reads from the input stream.
    Read(String),
    /// Applies a named effect with its arguments.
    Effect {
        /// Effect name.
        name: String,
        /// Positional arguments.
        args: Vec<String>,
    },
    /// Writes to the output stream.
    Write(String),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Read(source) => write!(f, "read {source}"),
            Stage::Effect { name, args } if args.is_empty() => f.write_str(name),
            Stage::Effect { name, args } => write!(f, "{name} {}", args.join(" ")),
            Stage::Write(device) => write!(f, "write {device}"),
        }
    }
}

/// How a streaming run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamEnd {
    Finished,
    Cancelled,
}

/// Opened streams plus instantiated effect stages, in path order.
///
/// Owned by exactly one party at a time: the compiler's caller, then the
/// streaming worker, then the engine again for [`release`](Self::release).
pub struct CompiledChain {
    input: Box<dyn InputStream>,
    effects: Vec<ChannelBank>,
    output: Box<dyn OutputStream>,
    stages: Vec<Stage>,
    spec: SignalSpec,
}

impl CompiledChain {
    /// The pipeline: `read`, each effect, `write`.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Format negotiated from the input stream.
    pub fn spec(&self) -> SignalSpec {
        self.spec
    }

    /// Release every handle. Consuming `self` makes a second release
    /// impossible.
    pub fn release(self) {
        tracing::info!(
            input = %self.input.description(),
            output = %self.output.description(),
            effects = self.effects.len(),
            "released"
        );
    }

    /// Stream until end of input, cancellation or an I/O failure.
    ///
    /// `cancel` is checked once per buffer.
    pub(crate) fn pump(
        &mut self,
        cancel: &AtomicBool,
        buffer_frames: usize,
    ) -> Result<StreamEnd, RuntimeError> {
        let mut buf = vec![0.0_f32; self.spec.samples_for(buffer_frames).max(1)];
        let mut frames: u64 = 0;
        loop {
            if cancel.load(Ordering::Acquire) {
                tracing::debug!(frames, "cancel observed");
                return Ok(StreamEnd::Cancelled);
            }
            let n = self
                .input
                .read(&mut buf)
                .map_err(|cause| RuntimeError::io("read", cause))?;
            if n == 0 {
                self.output
                    .finish()
                    .map_err(|cause| RuntimeError::io("finish", cause))?;
                tracing::debug!(frames, "end of input");
                return Ok(StreamEnd::Finished);
            }
            let block = &mut buf[..n];
            for stage in &mut self.effects {
                stage.process_interleaved(block);
            }
            self.output
                .write(block)
                .map_err(|cause| RuntimeError::io("write", cause))?;
            frames += (n / usize::from(self.spec.channels.max(1))) as u64;
        }
    }
}

impl fmt::Debug for CompiledChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledChain")
            .field("stages", &self.stages)
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

/// Builds [`CompiledChain`]s against a backend and an effect registry.
#[derive(Clone)]
pub struct ChainCompiler {
    backend: Arc<dyn AudioBackend>,
    registry: Arc<EffectRegistry>,
    default_device: String,
}

impl fmt::Debug for ChainCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainCompiler")
            .field("backend", &self.backend.name())
            .field("default_device", &self.default_device)
            .finish_non_exhaustive()
    }
}

impl ChainCompiler {
    /// Create a compiler. `default_device` is used for Output nodes with no
    /// device set.
    pub fn new(
        backend: Arc<dyn AudioBackend>,
        registry: Arc<EffectRegistry>,
        default_device: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            registry,
            default_device: default_device.into(),
        }
    }

    /// The backend streams are opened on.
    pub fn backend(&self) -> &Arc<dyn AudioBackend> {
        &self.backend
    }

    /// The registry effects are created from.
    pub fn registry(&self) -> &Arc<EffectRegistry> {
        &self.registry
    }

    /// Open streams and instantiate effects for `path`.
    pub fn compile(&self, path: &ResolvedPath) -> Result<CompiledChain, CompileError> {
        let input_node = path.input();
        let output_node = path.output();

        let source = input_node.source().unwrap_or_default().to_string();
        let input = self
            .backend
            .open_read(&source)
            .map_err(|cause| CompileError::OpenInputFailed {
                node: input_node.id(),
                path: source.clone(),
                cause,
            })?;
        let spec = input.spec();
        tracing::debug!(node = %input_node.id(), source = %source, %spec, "input opened");

        let device = output_node
            .device()
            .unwrap_or(self.default_device.as_str())
            .to_string();
        let output = self
            .backend
            .open_write(&device, spec)
            .map_err(|cause| CompileError::OpenOutputFailed {
                node: output_node.id(),
                device: device.clone(),
                cause,
            })?;
        tracing::debug!(node = %output_node.id(), device = %device, "output opened");

        let mut stages = Vec::with_capacity(path.len());
        stages.push(Stage::Read(source));
        let mut effects = Vec::with_capacity(path.effects().len());
        for node in path.effects() {
            let Some((Some(name), args)) = node.effect() else {
                return Err(CompileError::UnknownEffect {
                    node: node.id(),
                    name: node.label().to_string(),
                });
            };
            let bank = self
                .registry
                .create(name, args, spec.sample_rate, spec.channels)
                .map_err(|err| match err {
                    CreateError::UnknownEffect(name) => CompileError::UnknownEffect {
                        node: node.id(),
                        name,
                    },
                    CreateError::InvalidArgs { name, source } => CompileError::InvalidEffectArgs {
                        node: node.id(),
                        name,
                        cause: source,
                    },
                })?;
            effects.push(bank);
            stages.push(Stage::Effect {
                name: name.to_string(),
                args: args.to_vec(),
            });
        }
        stages.push(Stage::Write(device));

        Ok(CompiledChain {
            input,
            effects,
            output,
            stages,
            spec,
        })
    }
}

//! Building a linear chain from arguments, and the `check` command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use podstudio_config::StudioConfig;
use podstudio_core::{NodeParams, resolve_playable_path};
use podstudio_engine::Studio;

use super::common::parse_effect_spec;

#[derive(Args)]
pub struct ChainArgs {
    /// Input audio file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Effect with positional arguments, e.g. "reverb 50" (repeatable, applied in order)
    #[arg(short, long = "effect", value_name = "EFFECT")]
    pub effects: Vec<String>,

    /// Output device name, or a .wav path to render to
    #[arg(short, long, value_name = "DEVICE")]
    pub output: Option<String>,
}

/// Build Input -> Effect* -> Output in a fresh studio.
pub fn build(args: &ChainArgs, config: &StudioConfig) -> anyhow::Result<Studio> {
    if !config.input.accepts(&args.input) {
        anyhow::bail!(
            "{} is not a supported input (extensions: {})",
            args.input.display(),
            config.input.extensions.join(", ")
        );
    }

    let mut studio = Studio::from_config(config);
    let input = studio.add_input_node();
    studio.set_parameters(input, NodeParams::input(args.input.to_string_lossy()))?;

    let mut last = input;
    for spec in &args.effects {
        let (name, effect_args) = parse_effect_spec(spec)?;
        let node = studio.add_effect_node(&name);
        studio
            .set_parameters(node, NodeParams::effect(name, effect_args))
            .with_context(|| format!("effect \"{spec}\""))?;
        studio.connect(last, node)?;
        last = node;
    }

    let output = studio.add_output_node();
    if let Some(device) = &args.output {
        studio.set_parameters(output, NodeParams::output(device.as_str()))?;
    }
    studio.connect(last, output)?;
    Ok(studio)
}

/// Resolve and compile, print the pipeline, release without streaming.
pub fn check(args: &ChainArgs, config: &StudioConfig) -> anyhow::Result<()> {
    let studio = build(args, config)?;
    let path = resolve_playable_path(studio.graph())?;
    let chain = studio.engine().compiler().compile(&path)?;

    println!("Chain OK ({})", chain.spec());
    for (index, stage) in chain.stages().iter().enumerate() {
        println!("  {index}: {stage}");
    }
    chain.release();
    Ok(())
}

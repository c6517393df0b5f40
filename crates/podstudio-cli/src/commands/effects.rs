//! Effect listing and information command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use podstudio_config::StudioConfig;
use podstudio_registry::EffectRegistry;

#[derive(Args)]
pub struct EffectsArgs {
    /// Show details for a specific effect
    #[arg(value_name = "EFFECT")]
    effect: Option<String>,
}

pub fn run(args: &EffectsArgs, config: &StudioConfig) -> anyhow::Result<()> {
    let registry = EffectRegistry::new();

    if let Some(name) = &args.effect {
        let effect = registry
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown effect: {name}"))?;

        println!("{}", effect.name);
        println!("{}", "=".repeat(effect.name.len()));
        println!();
        println!("{}", effect.description);
        println!();
        println!("  Usage:     {}", effect.usage);
        println!("  Category:  {}", effect.category.name());
        println!("  Flags:     {}", effect.flags);
        println!();
        println!("Example usage:");
        println!();
        println!("  podstudio play input.wav -e \"{}\"", effect.usage.replace(['[', ']'], ""));
        return Ok(());
    }

    println!("Available Effects");
    println!("=================\n");
    println!("  {:10}  {:14}  {}", "Name", "Flags", "Usage");
    println!("  {:10}  {:14}  {}", "----", "-----", "-----");
    let menu = config.menu.effect_entries;
    for (index, effect) in registry.all_effects().iter().enumerate() {
        let marker = if index < menu { "" } else { "  (not in menu)" };
        println!(
            "  {:10}  {:14}  {}{marker}",
            effect.name,
            effect.flags.to_string(),
            effect.usage
        );
    }
    println!();
    println!("Use 'podstudio effects <name>' for details.");
    Ok(())
}

//! Helpers shared by commands.

use std::path::Path;

use anyhow::Context;
use podstudio_config::StudioConfig;

/// Load `path`, or the user config (defaults when absent).
pub fn load_config(path: Option<&Path>) -> anyhow::Result<StudioConfig> {
    match path {
        Some(path) => StudioConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => StudioConfig::load_or_default().context("loading user config"),
    }
}

/// Split `"reverb 50 30"` into a name and its arguments.
pub fn parse_effect_spec(spec: &str) -> anyhow::Result<(String, Vec<String>)> {
    let mut parts = spec.split_whitespace();
    let name = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("empty effect specification"))?;
    Ok((name.to_string(), parts.map(str::to_string).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_args() {
        let (name, args) = parse_effect_spec("  reverb 50   30 ").unwrap();
        assert_eq!(name, "reverb");
        assert_eq!(args, ["50", "30"]);
    }

    #[test]
    fn rejects_blank_spec() {
        assert!(parse_effect_spec("   ").is_err());
    }
}

//! Effect registry and factory for podstudio signal chains.
//!
//! The registry maps effect names to descriptors and factories. Chains are
//! assembled at runtime from names typed by the user (`reverb 50 30`), so the
//! registry is also the authority on which names and argument lists are valid.
//!
//! # Example
//!
//! ```rust
//! use podstudio_registry::EffectRegistry;
//!
//! let registry = EffectRegistry::new();
//!
//! for effect in registry.all_effects() {
//!     println!("{:<10} {}", effect.name, effect.usage);
//! }
//!
//! let args = vec!["50".to_string()];
//! let mut bank = registry.create("reverb", &args, 48000, 2).unwrap();
//! let mut frame = [0.5_f32, -0.5];
//! bank.process_interleaved(&mut frame);
//! ```

pub mod args;
pub mod builtin;
mod dsp;

use std::fmt;

use podstudio_core::{ChannelBank, EffectArgsError, EffectCatalog};
use thiserror::Error;

pub use args::{EffectArgs, db_to_linear};
pub use builtin::BoxedEffect;

/// Sample rate used when an argument list is checked without a stream.
const VALIDATION_SAMPLE_RATE: f32 = 48000.0;

/// Category of audio effect for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectCategory {
    /// Distortion and saturation effects
    Distortion,
    /// Modulation effects (tremolo)
    Modulation,
    /// Time-based effects (echo, reverb)
    TimeBased,
    /// Filter effects (lowpass, highpass)
    Filter,
    /// Utility effects (volume, gain)
    Utility,
}

impl EffectCategory {
    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            EffectCategory::Distortion => "Distortion",
            EffectCategory::Modulation => "Modulation",
            EffectCategory::TimeBased => "Time-Based",
            EffectCategory::Filter => "Filter",
            EffectCategory::Utility => "Utility",
        }
    }
}

/// Behaviour hints for an effect, used by listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EffectFlags(u8);

impl EffectFlags {
    /// No notable behaviour.
    pub const NONE: Self = Self(0);
    /// Changes overall level.
    pub const MODIFIES_GAIN: Self = Self(1);
    /// Output continues after input stops.
    pub const ADDS_TAIL: Self = Self(1 << 1);
    /// Time-varying modulation.
    pub const MODULATES: Self = Self(1 << 2);
    /// Shapes the frequency response.
    pub const FILTERS: Self = Self(1 << 3);

    const NAMES: [(Self, &'static str); 4] = [
        (Self::MODIFIES_GAIN, "gain"),
        (Self::ADDS_TAIL, "tail"),
        (Self::MODULATES, "mod"),
        (Self::FILTERS, "filter"),
    ];

    /// Returns true if every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for EffectFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for EffectFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Describes an effect in the registry.
#[derive(Debug, Clone)]
pub struct EffectDescriptor {
    /// Unique name typed by users (lowercase, no spaces).
    pub name: &'static str,
    /// Positional argument synopsis, e.g. `gain [dB (0)]`.
    pub usage: &'static str,
    /// Brief description of the effect.
    pub description: &'static str,
    /// Category for organization.
    pub category: EffectCategory,
    /// Behaviour hints.
    pub flags: EffectFlags,
}

/// Factory function type for creating one mono effect instance.
pub type EffectFactory = fn(&[String], f32) -> Result<BoxedEffect, EffectArgsError>;

/// Failure to build a stage from a name and argument list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CreateError {
    /// No effect is registered under this name.
    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    /// The effect rejected its arguments.
    #[error("invalid arguments for {name}: {source}")]
    InvalidArgs {
        /// Effect name.
        name: String,
        /// What was wrong with the arguments.
        #[source]
        source: EffectArgsError,
    },
}

struct RegistryEntry {
    descriptor: EffectDescriptor,
    factory: EffectFactory,
}

/// Registry of all available audio effects.
///
/// Entries keep registration order; [`menu_entries`](Self::menu_entries)
/// exposes the first few for quick-pick menus.
pub struct EffectRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.descriptor.name))
            .finish()
    }
}

impl EffectRegistry {
    /// Create a new registry with all built-in effects registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(8),
        };
        registry.register_builtin_effects();
        registry
    }

    /// Create a registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn register_builtin_effects(&mut self) {
        self.register(
            EffectDescriptor {
                name: "vol",
                usage: "vol [factor|NdB (1)]",
                description: "Volume change as a linear factor or in dB",
                category: EffectCategory::Utility,
                flags: EffectFlags::MODIFIES_GAIN,
            },
            builtin::vol,
        );
        self.register(
            EffectDescriptor {
                name: "gain",
                usage: "gain [dB (0)]",
                description: "Fixed gain in decibels",
                category: EffectCategory::Utility,
                flags: EffectFlags::MODIFIES_GAIN,
            },
            builtin::gain,
        );
        self.register(
            EffectDescriptor {
                name: "lowpass",
                usage: "lowpass [frequency Hz (3000)]",
                description: "One-pole lowpass filter",
                category: EffectCategory::Filter,
                flags: EffectFlags::FILTERS,
            },
            builtin::lowpass,
        );
        self.register(
            EffectDescriptor {
                name: "highpass",
                usage: "highpass [frequency Hz (100)]",
                description: "One-pole highpass filter",
                category: EffectCategory::Filter,
                flags: EffectFlags::FILTERS,
            },
            builtin::highpass,
        );
        self.register(
            EffectDescriptor {
                name: "echo",
                usage: "echo [delay ms (300)] [decay (0.4)] [mix (0.5)]",
                description: "Feedback echo",
                category: EffectCategory::TimeBased,
                flags: EffectFlags::ADDS_TAIL,
            },
            builtin::echo,
        );
        self.register(
            EffectDescriptor {
                name: "tremolo",
                usage: "tremolo [speed Hz (5)] [depth% (40)]",
                description: "Sine amplitude modulation",
                category: EffectCategory::Modulation,
                flags: EffectFlags::MODULATES,
            },
            builtin::tremolo,
        );
        self.register(
            EffectDescriptor {
                name: "reverb",
                usage: "reverb [reverberance% (50)] [hf-damping% (50)] [wet-gain dB (0)]",
                description: "Comb and allpass room reverb",
                category: EffectCategory::TimeBased,
                flags: EffectFlags::ADDS_TAIL | EffectFlags::FILTERS,
            },
            builtin::reverb,
        );
        self.register(
            EffectDescriptor {
                name: "overdrive",
                usage: "overdrive [gain dB (20)] [colour (20)]",
                description: "Soft-clipping overdrive",
                category: EffectCategory::Distortion,
                flags: EffectFlags::MODIFIES_GAIN,
            },
            builtin::overdrive,
        );
    }

    /// Register an effect. A later registration under an existing name
    /// replaces the earlier one in place.
    pub fn register(&mut self, descriptor: EffectDescriptor, factory: EffectFactory) {
        let entry = RegistryEntry {
            descriptor,
            factory,
        };
        match self
            .entries
            .iter_mut()
            .find(|e| e.descriptor.name == entry.descriptor.name)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Get all registered effect descriptors in registration order.
    pub fn all_effects(&self) -> Vec<&EffectDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Get effects in a specific category.
    pub fn effects_in_category(&self, category: EffectCategory) -> Vec<&EffectDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// The first `count` effects, for quick-pick menus.
    pub fn menu_entries(&self, count: usize) -> Vec<&EffectDescriptor> {
        self.entries
            .iter()
            .take(count)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Get an effect descriptor by name.
    pub fn get(&self, name: &str) -> Option<&EffectDescriptor> {
        self.entry(name).map(|e| &e.descriptor)
    }

    fn entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.descriptor.name == name)
    }

    /// Build one stage for a stream of `channels` interleaved channels.
    ///
    /// The factory runs once per channel so every channel gets independent
    /// state. A zero channel count is treated as mono.
    pub fn create(
        &self,
        name: &str,
        args: &[String],
        sample_rate: u32,
        channels: u16,
    ) -> Result<ChannelBank, CreateError> {
        let entry = self
            .entry(name)
            .ok_or_else(|| CreateError::UnknownEffect(name.to_string()))?;
        if sample_rate == 0 {
            return Err(CreateError::InvalidArgs {
                name: name.to_string(),
                source: EffectArgsError::Invalid("sample rate must be non-zero".into()),
            });
        }
        let instances = (0..channels.max(1))
            .map(|_| (entry.factory)(args, sample_rate as f32))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| CreateError::InvalidArgs {
                name: name.to_string(),
                source,
            })?;
        tracing::debug!(effect = name, channels, "effect_created");
        Ok(ChannelBank::new(instances))
    }

    /// Get the number of registered effects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EffectCatalog for EffectRegistry {
    fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    fn check_args(&self, name: &str, args: &[String]) -> Result<(), EffectArgsError> {
        let Some(entry) = self.entry(name) else {
            return Err(EffectArgsError::Invalid(format!("unknown effect: {name}")));
        };
        (entry.factory)(args, VALIDATION_SAMPLE_RATE).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podstudio_core::Effect;

    fn owned(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_registry_creation() {
        let registry = EffectRegistry::new();
        assert_eq!(registry.len(), 8);
        assert!(!registry.is_empty());
        assert!(EffectRegistry::empty().is_empty());
    }

    #[test]
    fn test_builtin_order() {
        let registry = EffectRegistry::new();
        let names: Vec<_> = registry.all_effects().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            [
                "vol",
                "gain",
                "lowpass",
                "highpass",
                "echo",
                "tremolo",
                "reverb",
                "overdrive"
            ]
        );
    }

    #[test]
    fn test_menu_entries_takes_prefix() {
        let registry = EffectRegistry::new();
        let menu: Vec<_> = registry.menu_entries(3).iter().map(|d| d.name).collect();
        assert_eq!(menu, ["vol", "gain", "lowpass"]);
        assert_eq!(registry.menu_entries(100).len(), 8);
    }

    #[test]
    fn test_get_effect() {
        let registry = EffectRegistry::new();
        let reverb = registry.get("reverb").unwrap();
        assert_eq!(reverb.category, EffectCategory::TimeBased);
        assert!(reverb.flags.contains(EffectFlags::ADDS_TAIL));
        assert!(reverb.usage.starts_with("reverb "));
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_effects_by_category() {
        let registry = EffectRegistry::new();
        let filters: Vec<_> = registry
            .effects_in_category(EffectCategory::Filter)
            .iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(filters, ["lowpass", "highpass"]);
    }

    #[test]
    fn test_create_one_instance_per_channel() {
        let registry = EffectRegistry::new();
        let bank = registry.create("echo", &owned(&["10"]), 44100, 2).unwrap();
        assert_eq!(bank.channels(), 2);
        let mono = registry.create("echo", &[], 44100, 0).unwrap();
        assert_eq!(mono.channels(), 1);
    }

    #[test]
    fn test_create_errors() {
        let registry = EffectRegistry::new();
        assert_eq!(
            registry.create("flanger", &[], 48000, 2).unwrap_err(),
            CreateError::UnknownEffect("flanger".into())
        );
        let err = registry
            .create("gain", &owned(&["x"]), 48000, 2)
            .unwrap_err();
        assert!(matches!(err, CreateError::InvalidArgs { ref name, .. } if name == "gain"));
    }

    #[test]
    fn test_create_at_degenerate_sample_rates() {
        let registry = EffectRegistry::new();
        let err = registry.create("lowpass", &owned(&["200"]), 0, 1).unwrap_err();
        assert!(matches!(
            err,
            CreateError::InvalidArgs { source: EffectArgsError::Invalid(_), .. }
        ));

        let mut bank = registry.create("lowpass", &owned(&["200"]), 1, 1).unwrap();
        let mut block = [1.0, -1.0, 0.5];
        bank.process_interleaved(&mut block);
        assert!(block.iter().all(|y| y.is_finite()));
    }

    #[test]
    fn test_catalog_validation() {
        let registry = EffectRegistry::new();
        assert!(registry.contains("reverb"));
        assert!(!registry.contains("Reverb"));
        assert!(registry.check_args("reverb", &owned(&["50", "30", "-3"])).is_ok());
        assert!(registry.check_args("reverb", &owned(&["50", "30", "-3", "1"])).is_err());
        assert!(registry.check_args("missing", &[]).is_err());
    }

    struct Invert;

    impl Effect for Invert {
        fn process(&mut self, input: f32) -> f32 {
            -input
        }

        fn reset(&mut self) {}
    }

    #[test]
    fn test_custom_registration_and_replacement() {
        let mut registry = EffectRegistry::empty();
        let descriptor = EffectDescriptor {
            name: "invert",
            usage: "invert",
            description: "Polarity flip",
            category: EffectCategory::Utility,
            flags: EffectFlags::NONE,
        };
        registry.register(descriptor.clone(), |_, _| Ok(Box::new(Invert)));
        registry.register(descriptor, |_, _| Ok(Box::new(Invert)));
        assert_eq!(registry.len(), 1);

        let mut bank = registry.create("invert", &[], 48000, 1).unwrap();
        let mut buf = [0.25_f32];
        bank.process_interleaved(&mut buf);
        assert_eq!(buf, [-0.25]);
    }

    #[test]
    fn test_flags_display() {
        assert_eq!(EffectFlags::NONE.to_string(), "-");
        assert_eq!(
            (EffectFlags::ADDS_TAIL | EffectFlags::FILTERS).to_string(),
            "tail|filter"
        );
    }
}

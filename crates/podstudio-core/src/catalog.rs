//! The seam between the graph and whatever supplies named effects.
//!
//! [`GraphStore::set_parameters`](crate::GraphStore::set_parameters) validates
//! an Effect node's name and argument list against an [`EffectCatalog`]. The
//! registry crate implements it; tests can supply their own.

use thiserror::Error;

/// Read-only view of the named effect handlers a graph may reference.
pub trait EffectCatalog {
    /// Whether a handler with this exact name exists.
    fn contains(&self, name: &str) -> bool;

    /// Check that `args` would be accepted by the named handler.
    ///
    /// Only called for names where [`contains`](Self::contains) is true.
    fn check_args(&self, name: &str, args: &[String]) -> Result<(), EffectArgsError>;
}

/// Why an effect rejected its positional argument list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectArgsError {
    /// More positional arguments than the effect accepts.
    #[error("too many arguments: expected at most {max}, got {got}")]
    TooMany {
        /// Maximum accepted.
        max: usize,
        /// Number supplied.
        got: usize,
    },

    /// An argument could not be parsed as a number.
    #[error("argument {index} ('{value}') is not a number")]
    NotANumber {
        /// Zero-based argument position.
        index: usize,
        /// The offending text.
        value: String,
    },

    /// A numeric argument fell outside the accepted range.
    #[error("argument {index} ({value}) out of range {min}..={max}")]
    OutOfRange {
        /// Zero-based argument position.
        index: usize,
        /// Parsed value.
        value: f32,
        /// Inclusive lower bound.
        min: f32,
        /// Inclusive upper bound.
        max: f32,
    },

    /// Any other effect-specific complaint.
    #[error("{0}")]
    Invalid(String),
}

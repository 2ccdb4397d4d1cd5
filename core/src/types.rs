use thiserror::Error;

use crate::registry::RegistryError;
use crate::stream::StreamError;

/// Unified marshaling error covering stream framing, registry setup, chain
/// structure and configuration.
/// - `#[from]` conversions enable `?` across the layers.
/// - Any of these aborts the operation; no partially decoded instance escapes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarshalError {
    /// Byte-level framing or primitive decode failure.
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A level found a slice written for another type.
    #[error("unexpected slice: expected {expected}, found {found}")]
    UnexpectedSlice { expected: &'static str, found: String },

    /// The last-slice flag disagrees with the reader's chain.
    #[error("slice chain mismatch at {type_id}: expected last={expected_last}, found last={found_last}")]
    ChainMismatch {
        type_id: &'static str,
        expected_last: bool,
        found_last: bool,
    },

    /// No slice of the exception names a registered type.
    #[error("no known ancestor for exception {most_derived}")]
    NoKnownAncestor { most_derived: String },

    #[error("exception has more than {max} slices")]
    TooManySlices { max: usize },

    #[error("invalid marshal config: {0}")]
    InvalidConfig(String),
}

use thiserror::Error;

use ff_energy::{ParamError, SequenceError, LOOP_MIN};
use ff_structure::StructureError;

/// Shortest sequence the engine accepts.
pub const MIN_SEQUENCE_LENGTH: usize = 2 * LOOP_MIN + 1;

#[derive(Debug, Error)]
pub enum FoldError {
    #[error("Invalid sequence: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Sequence of length {0} is too short, need at least {min} nucleotides", min = MIN_SEQUENCE_LENGTH)]
    TooShort(usize),

    #[error("Pairing constraints cover {found} positions, but the sequence has {expected}")]
    ConstraintLength { expected: usize, found: usize },

    #[error("Energy parameters: {0}")]
    Param(#[from] ParamError),

    #[error("Structure: {0}")]
    Structure(#[from] StructureError),

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

//! Error types surfaced by the generator

use thiserror::Error;

use crate::catalog::OperandRole;

/// Instruction catalog could not be loaded
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Malformed catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate mnemonic in catalog: {0}")]
    DuplicateMnemonic(String),

    #[error("{mnemonic}: {field} value 0x{value:x} does not fit in {bits} bits")]
    FieldWidth { mnemonic: String, field: &'static str, value: u32, bits: u32 },
}

/// Generation configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Category weight table is empty")]
    NoWeights,

    #[error("Weight `{key}` must be a finite non-negative number, got {value}")]
    InvalidWeight { key: String, value: f64 },

    #[error("Probability `{key}` must be within [0, 1], got {value}")]
    InvalidProbability { key: &'static str, value: f64 },
}

/// Instruction could not be packed into a machine word
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("{mnemonic}: operand {role:?} required by the operand pattern is not populated")]
    MissingOperand { mnemonic: String, role: OperandRole },
}

/// Sequence generation aborted
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Instruction {index} cannot be encoded")]
    Encode {
        index: usize,
        #[source]
        source: EncodeError,
    },
}

//! Generation manifest

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identity string written into every manifest
pub const GENERATOR_NAME: &str = "RV32I Random Test Generator";

/// Record of how a sequence was produced
///
/// Together with the catalog and configuration, `seed` and `length` are enough to
/// regenerate the same program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub generator: String,
    pub version: String,
    /// Wall-clock creation time; filled in by whoever writes the files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub seed: u64,
    pub length: usize,
    pub weights: BTreeMap<String, f64>,
    pub backward_branches: u32,
    /// Branches and jumps whose target did not fit and got the fallback offset
    #[serde(default)]
    pub offset_fallbacks: usize,
    /// Instructions of an unsupported format emitted as NOP
    #[serde(default)]
    pub nop_substitutions: usize,
}

impl Manifest {
    pub fn new(seed: u64, length: usize, weights: BTreeMap<String, f64>) -> Self {
        Self {
            generator: GENERATOR_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: None,
            seed,
            length,
            weights,
            backward_branches: 0,
            offset_fallbacks: 0,
            nop_substitutions: 0,
        }
    }

    pub fn set_timestamp(&mut self, timestamp: impl Into<String>) {
        self.timestamp = Some(timestamp.into());
    }
}

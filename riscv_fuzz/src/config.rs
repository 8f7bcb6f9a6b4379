//! Generation configuration
//!
//! Mirrors the JSON document the front end loads. Every top-level key is required;
//! a handful of window bounds added later have defaults so older documents still load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Relative likelihood of each weight class (`alu_logic`, `load`, `branch`, ...)
    pub weights: BTreeMap<String, f64>,
    pub immediates: ImmediateConfig,
    pub branch_offsets: BranchOffsets,
    pub hazards: HazardConfig,
    pub register_policy: RegisterPolicy,
    pub loops: LoopConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmediateConfig {
    pub arith: ArithImmediates,
    pub memory_offset: MemoryOffsets,
    pub upper20: UpperImmediates,
}

/// Bucket weights for 12-bit arithmetic immediates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithImmediates {
    pub small: f64,
    pub boundary: f64,
    pub medium: f64,
    pub random_full: f64,
    pub special_pattern: f64,
    pub boundary_values: Vec<i32>,
    pub special_values: Vec<i32>,
}

/// Bucket weights and windows for load/store offsets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryOffsets {
    pub near_zero: f64,
    pub small_range: f64,
    pub mid_range: f64,
    pub far_range: f64,
    #[serde(default = "default_small_range_min")]
    pub small_range_min: i32,
    pub small_range_max: i32,
    #[serde(default = "default_mid_range_min")]
    pub mid_range_min: i32,
    pub mid_range_max: i32,
    #[serde(default = "default_far_range_min")]
    pub far_range_min: i32,
    pub far_range_max: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpperImmediates {
    /// Probability of deriving the immediate from one of `symbolic_bases`
    pub symbolic_fraction: f64,
    pub symbolic_bases: Vec<u64>,
}

/// Distance buckets for branch and jump targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchOffsets {
    pub near: f64,
    pub mid: f64,
    pub far: f64,
    pub near_max_bytes: u32,
    pub mid_max_bytes: u32,
    pub far_max_bytes: u32,
    #[serde(default = "default_allow_backward")]
    pub allow_backward: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardConfig {
    pub raw_dependency_prob: f64,
    pub waw_repeat_prob: f64,
    pub load_use_prob: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterPolicy {
    pub sp_usage_fraction_in_memory_ops: f64,
    pub ra_usage_fraction_in_jal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Upper bound on backward branches per sequence
    pub max_backward_depth: u32,
}

fn default_small_range_min() -> i32 {
    4
}

fn default_mid_range_min() -> i32 {
    64
}

fn default_far_range_min() -> i32 {
    256
}

fn default_allow_backward() -> bool {
    true
}

impl GenerationConfig {
    /// Parse and validate a configuration document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weights.is_empty() {
            return Err(ConfigError::NoWeights);
        }
        for (key, &value) in &self.weights {
            check_weight(key, value)?;
        }

        let arith = &self.immediates.arith;
        let mem = &self.immediates.memory_offset;
        let br = &self.branch_offsets;
        let bucket_weights = [
            ("immediates.arith.small", arith.small),
            ("immediates.arith.boundary", arith.boundary),
            ("immediates.arith.medium", arith.medium),
            ("immediates.arith.random_full", arith.random_full),
            ("immediates.arith.special_pattern", arith.special_pattern),
            ("immediates.memory_offset.near_zero", mem.near_zero),
            ("immediates.memory_offset.small_range", mem.small_range),
            ("immediates.memory_offset.mid_range", mem.mid_range),
            ("immediates.memory_offset.far_range", mem.far_range),
            ("branch_offsets.near", br.near),
            ("branch_offsets.mid", br.mid),
            ("branch_offsets.far", br.far),
        ];
        for (key, value) in bucket_weights {
            check_weight(key, value)?;
        }

        let probabilities = [
            ("immediates.upper20.symbolic_fraction", self.immediates.upper20.symbolic_fraction),
            ("hazards.raw_dependency_prob", self.hazards.raw_dependency_prob),
            ("hazards.waw_repeat_prob", self.hazards.waw_repeat_prob),
            ("hazards.load_use_prob", self.hazards.load_use_prob),
            (
                "register_policy.sp_usage_fraction_in_memory_ops",
                self.register_policy.sp_usage_fraction_in_memory_ops,
            ),
            (
                "register_policy.ra_usage_fraction_in_jal",
                self.register_policy.ra_usage_fraction_in_jal,
            ),
        ];
        for (key, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { key, value });
            }
        }

        Ok(())
    }
}

fn check_weight(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidWeight { key: key.to_string(), value })
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let weights = [
            ("alu_logic", 0.45),
            ("load", 0.12),
            ("store", 0.10),
            ("branch", 0.12),
            ("jump", 0.05),
            ("upper", 0.06),
            ("pseudo_nop", 0.04),
            ("fence", 0.03),
            ("ecall_ebreak", 0.03),
        ]
        .into_iter()
        .map(|(key, weight)| (key.to_string(), weight))
        .collect();

        Self {
            weights,
            immediates: ImmediateConfig {
                arith: ArithImmediates {
                    small: 0.2,
                    boundary: 0.15,
                    medium: 0.3,
                    random_full: 0.25,
                    special_pattern: 0.1,
                    boundary_values: vec![-2048, -2047, -1, 0, 1, 2046, 2047],
                    special_values: vec![0x555, -0x556, 0x0FF, -0x100, 0x333, 0x7F0],
                },
                memory_offset: MemoryOffsets {
                    near_zero: 0.3,
                    small_range: 0.4,
                    mid_range: 0.2,
                    far_range: 0.1,
                    small_range_min: default_small_range_min(),
                    small_range_max: 64,
                    mid_range_min: default_mid_range_min(),
                    mid_range_max: 256,
                    far_range_min: default_far_range_min(),
                    far_range_max: 2048,
                },
                upper20: UpperImmediates {
                    symbolic_fraction: 0.3,
                    symbolic_bases: vec![
                        0x8000_0000,
                        0x1000_0000,
                        0x2000_0000,
                        0x0001_0000,
                        0xFFFF_F000,
                    ],
                },
            },
            branch_offsets: BranchOffsets {
                near: 0.6,
                mid: 0.3,
                far: 0.1,
                near_max_bytes: 64,
                mid_max_bytes: 512,
                far_max_bytes: 2048,
                allow_backward: true,
            },
            hazards: HazardConfig {
                raw_dependency_prob: 0.3,
                waw_repeat_prob: 0.1,
                load_use_prob: 0.2,
            },
            register_policy: RegisterPolicy {
                sp_usage_fraction_in_memory_ops: 0.5,
                ra_usage_fraction_in_jal: 0.7,
            },
            loops: LoopConfig { max_backward_depth: 4 },
        }
    }
}

//! Control-flow target resolution
//!
//! Branch and jump displacements depend on the distance between source and target,
//! so they are fixed in two separate stages:
//!
//! 1. While the sequence is synthesized, [`TargetSelector`] draws a *symbolic* target
//!    index for every label-bearing instruction.
//! 2. Once the whole sequence exists, [`assign_labels`] names every distinct target and
//!    [`resolve_offsets`] turns each target index into a PC-relative byte offset.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{BranchOffsets, GenerationConfig};
use crate::instruction::{Instruction, InstructionFormat};
use crate::rng::StimulusRng;

/// Sequence index → label name, ordered by index
pub type LabelMap = BTreeMap<usize, String>;

/// Offset substituted when the chosen target does not fit the format's window
pub const FALLBACK_OFFSET: i32 = 4;

/// Size of one program word in bytes
pub const WORD_BYTES: i64 = 4;

pub fn label_name(index: usize) -> String {
    format!("L{index}")
}

/// Pass 1: chooses symbolic branch/jump targets and caps backward branches
#[derive(Debug, Clone)]
pub struct TargetSelector {
    offsets: BranchOffsets,
    max_backward_depth: u32,
    backward_taken: u32,
}

impl TargetSelector {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            offsets: config.branch_offsets.clone(),
            max_backward_depth: config.loops.max_backward_depth,
            backward_taken: 0,
        }
    }

    /// Backward targets chosen so far
    pub fn backward_taken(&self) -> u32 {
        self.backward_taken
    }

    /// Target index for the instruction at `index` in a sequence of `length`
    ///
    /// Falls back to `index` itself (a self-loop) when there is no room to move. The
    /// last instruction always self-loops without drawing from `rng`.
    pub fn select(&mut self, index: usize, length: usize, rng: &mut StimulusRng) -> usize {
        if index + 1 >= length {
            return index;
        }
        let max_dist = self.max_distance(rng);

        let backward_allowed = self.offsets.allow_backward
            && index > 0
            && self.backward_taken < self.max_backward_depth;
        if backward_allowed && rng.chance(0.5) {
            let reach = max_dist.min(index);
            if reach > 0 {
                let distance = rng.between(1, reach as i64) as usize;
                self.backward_taken += 1;
                return index - distance;
            }
        }

        let room = length.saturating_sub(index + 1);
        let reach = max_dist.min(room);
        if reach == 0 {
            return index;
        }
        let distance = rng.between(1, reach as i64) as usize;
        (index + distance).min(length - 1)
    }

    /// Max distance in instructions of a weighted near/mid/far bucket
    fn max_distance(&self, rng: &mut StimulusRng) -> usize {
        let buckets = [
            (self.offsets.near, self.offsets.near_max_bytes),
            (self.offsets.mid, self.offsets.mid_max_bytes),
            (self.offsets.far, self.offsets.far_max_bytes),
        ];
        let weights = buckets.map(|(weight, _)| weight);
        let max_bytes =
            rng.weighted(&weights).map_or(self.offsets.near_max_bytes, |i| buckets[i].1);
        (max_bytes as i64 / WORD_BYTES) as usize
    }
}

/// Pass 2a: names every distinct target and attaches the name to its sources
pub fn assign_labels(sequence: &mut [Instruction]) -> LabelMap {
    let mut labels = LabelMap::new();
    for inst in sequence.iter_mut() {
        if let Some(target) = inst.target {
            let name = labels.entry(target).or_insert_with(|| label_name(target));
            inst.label = Some(name.clone());
        }
    }
    labels
}

/// Pass 2b: converts target indices into byte offsets
///
/// Out-of-window offsets are replaced by [`FALLBACK_OFFSET`]. Returns how many
/// instructions needed the fallback.
pub fn resolve_offsets(sequence: &mut [Instruction]) -> usize {
    let mut fallbacks = 0;
    for (index, inst) in sequence.iter_mut().enumerate() {
        let Some(target) = inst.target else {
            continue;
        };
        let offset = (target as i64 - index as i64) * WORD_BYTES;
        if offset_fits(inst.format(), offset) {
            inst.imm = Some(offset as i32);
        } else {
            debug!(
                "{} at {index}: offset {offset} to L{target} out of range, using {FALLBACK_OFFSET}",
                inst.mnemonic()
            );
            inst.imm = Some(FALLBACK_OFFSET);
            fallbacks += 1;
        }
    }
    fallbacks
}

/// Whether `offset` is encodable as the target displacement of `format`
pub fn offset_fits(format: InstructionFormat, offset: i64) -> bool {
    match format.offset_limit() {
        Some(limit) => offset.abs() < limit && offset % 2 == 0,
        None => match format.immediate_range() {
            Some((low, high)) => (low..=high).contains(&offset),
            None => true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn branch_at(catalog: &Catalog, mnemonic: &str, target: usize) -> Instruction {
        let mut inst = Instruction::new(catalog.get(mnemonic).unwrap().clone());
        inst.target = Some(target);
        inst
    }

    #[test]
    fn test_last_instruction_self_loops() {
        let mut config = GenerationConfig::default();
        config.branch_offsets.allow_backward = false;
        let mut selector = TargetSelector::new(&config);
        let mut rng = StimulusRng::from_seed(5);
        for _ in 0..32 {
            assert_eq!(selector.select(9, 10, &mut rng), 9);
        }
        assert_eq!(selector.backward_taken(), 0);
    }

    #[test]
    fn test_last_instruction_never_goes_backward() {
        let config = GenerationConfig::default();
        assert!(config.branch_offsets.allow_backward);
        for seed in 0..200 {
            let mut selector = TargetSelector::new(&config);
            let mut rng = StimulusRng::from_seed(seed);
            let mut untouched = StimulusRng::from_seed(seed);
            assert_eq!(selector.select(9, 10, &mut rng), 9);
            assert_eq!(selector.backward_taken(), 0);
            assert_eq!(rng.between(0, 1 << 30), untouched.between(0, 1 << 30));
        }
    }

    #[test]
    fn test_forward_targets_stay_in_window() {
        let mut config = GenerationConfig::default();
        config.branch_offsets.allow_backward = false;
        let mut selector = TargetSelector::new(&config);
        let mut rng = StimulusRng::from_seed(9);
        for index in 0..99 {
            let target = selector.select(index, 100, &mut rng);
            assert!(target > index && target < 100);
            assert!(target - index <= 2048 / 4);
        }
    }

    #[test]
    fn test_backward_cap() {
        let mut config = GenerationConfig::default();
        config.loops.max_backward_depth = 3;
        let mut selector = TargetSelector::new(&config);
        let mut rng = StimulusRng::from_seed(2);
        let backward = (1..500).filter(|&i| selector.select(i, 500, &mut rng) < i).count();
        assert_eq!(backward, 3);
        assert_eq!(selector.backward_taken(), 3);
    }

    #[test]
    fn test_zero_distance_buckets_self_loop() {
        let mut config = GenerationConfig::default();
        config.branch_offsets.near_max_bytes = 0;
        config.branch_offsets.mid_max_bytes = 2;
        config.branch_offsets.far_max_bytes = 3;
        let mut selector = TargetSelector::new(&config);
        let mut rng = StimulusRng::from_seed(4);
        for index in 0..20 {
            assert_eq!(selector.select(index, 20, &mut rng), index);
        }
    }

    #[test]
    fn test_labels_and_offsets() {
        let catalog = Catalog::rv32i();
        let mut seq: Vec<Instruction> = (0..6).map(|_| Instruction::nop()).collect();
        seq[1] = branch_at(&catalog, "BEQ", 4);
        seq[5] = branch_at(&catalog, "JAL", 0);
        seq[3] = branch_at(&catalog, "BNE", 4);

        let labels = assign_labels(&mut seq);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[&0], "L0");
        assert_eq!(labels[&4], "L4");
        assert_eq!(seq[3].label.as_deref(), Some("L4"));

        assert_eq!(resolve_offsets(&mut seq), 0);
        assert_eq!(seq[1].imm, Some(12));
        assert_eq!(seq[3].imm, Some(4));
        assert_eq!(seq[5].imm, Some(-20));
        assert_eq!(seq[0].imm, Some(0));
    }

    #[test]
    fn test_out_of_range_branch_falls_back() {
        let catalog = Catalog::rv32i();
        let mut seq: Vec<Instruction> = (0..1100).map(|_| Instruction::nop()).collect();
        seq[0] = branch_at(&catalog, "BLT", 1024);
        seq[1] = branch_at(&catalog, "JAL", 1099);
        assign_labels(&mut seq);

        assert_eq!(resolve_offsets(&mut seq), 1);
        assert_eq!(seq[0].imm, Some(FALLBACK_OFFSET));
        assert_eq!(seq[1].imm, Some(4392));
    }

    #[test]
    fn test_offset_fits() {
        assert!(offset_fits(InstructionFormat::B, 4092));
        assert!(offset_fits(InstructionFormat::B, -4092));
        assert!(!offset_fits(InstructionFormat::B, 4096));
        assert!(!offset_fits(InstructionFormat::B, -4096));
        assert!(offset_fits(InstructionFormat::J, (1 << 20) - 4));
        assert!(!offset_fits(InstructionFormat::J, 1 << 20));
        assert!(offset_fits(InstructionFormat::I, -2048));
        assert!(!offset_fits(InstructionFormat::I, 2048));
    }
}

//! Operand synthesis
//!
//! Picks a mnemonic by weighted category and fills every role of its operand pattern
//! with a concrete value drawn from the configured distributions. Branch and jump
//! targets are only recorded symbolically here; see [`crate::resolver`].

use std::sync::Arc;

use tracing::debug;

use crate::catalog::{Catalog, Category, InstructionMetadata, OperandRole};
use crate::config::{ArithImmediates, GenerationConfig, MemoryOffsets, UpperImmediates};
use crate::instruction::Instruction;
use crate::resolver::TargetSelector;
use crate::rng::StimulusRng;

/// Stack pointer, preferred as the base of memory operands
pub const SP: u8 = 2;
/// Return address register, preferred as the link register of `jal`
pub const RA: u8 = 1;

/// Weight class used when the weight table yields nothing
pub const DEFAULT_WEIGHT_CLASS: &str = "alu_logic";

/// `fence iorw, iorw`: pred and succ both cover I, O, R and W
pub const FENCE_IORW_IORW: i32 = 0x0FF;

const IMM12_MIN: i64 = -2048;
const IMM12_MAX: i64 = 2047;
const UPPER20_MASK: u64 = 0xF_FFFF;

/// Catalog categories a configuration weight class draws from
pub fn catalog_categories(weight_class: &str) -> &'static [Category] {
    match weight_class {
        "alu_logic" => &[Category::Alu, Category::Compare],
        "load" => &[Category::Load],
        "store" => &[Category::Store],
        "branch" => &[Category::Branch],
        "jump" => &[Category::Jump],
        "upper" => &[Category::Upper],
        "system" | "fence" | "ecall_ebreak" => &[Category::System],
        "pseudo_nop" => &[Category::Pseudo],
        _ => &[Category::Alu],
    }
}

#[derive(Debug)]
pub struct OperandSynthesizer<'a> {
    catalog: &'a Catalog,
    config: &'a GenerationConfig,
    weight_classes: Vec<&'a str>,
    class_weights: Vec<f64>,
}

impl<'a> OperandSynthesizer<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a GenerationConfig) -> Self {
        let (weight_classes, class_weights): (Vec<&'a str>, Vec<f64>) =
            config.weights.iter().map(|(class, &weight)| (class.as_str(), weight)).unzip();
        Self { catalog, config, weight_classes, class_weights }
    }

    /// Draw a fresh instruction for position `index` of a `length`-long sequence
    pub fn synthesize(
        &self,
        index: usize,
        length: usize,
        rng: &mut StimulusRng,
        targets: &mut TargetSelector,
    ) -> Instruction {
        let meta = self.choose_metadata(rng);
        let mut inst = Instruction::new(Arc::clone(&meta));

        for &role in &meta.operand_pattern {
            match role {
                OperandRole::Rd => {
                    inst.rd = Some(if meta.mnemonic.eq_ignore_ascii_case("JAL")
                        && rng.chance(self.config.register_policy.ra_usage_fraction_in_jal)
                    {
                        RA
                    } else {
                        rng.register()
                    });
                }
                OperandRole::Rs1 => inst.rs1 = Some(rng.register()),
                OperandRole::Rs2 => inst.rs2 = Some(rng.register()),
                OperandRole::Imm => inst.imm = Some(self.arith_immediate(rng)),
                OperandRole::Shamt => inst.shamt = Some(rng.between(0, 31) as u8),
                OperandRole::Imm20 => inst.imm = Some(self.upper_immediate(rng)),
                OperandRole::MemoryOffset => {
                    inst.rs1 = Some(self.memory_base(rng));
                    inst.imm = Some(self.memory_offset(rng));
                }
                OperandRole::Label => inst.target = Some(targets.select(index, length, rng)),
                OperandRole::PredSucc => inst.imm = Some(FENCE_IORW_IORW),
                OperandRole::Unsupported => {
                    debug!("{}: operand role without a generator left unset", meta.mnemonic);
                }
            }
        }

        inst
    }

    fn choose_metadata(&self, rng: &mut StimulusRng) -> Arc<InstructionMetadata> {
        let class = rng
            .weighted(&self.class_weights)
            .map_or(DEFAULT_WEIGHT_CLASS, |i| self.weight_classes[i]);
        let categories = catalog_categories(class);
        let category = rng.pick(categories).copied().unwrap_or(Category::Alu);

        match rng.pick(self.catalog.in_category(category)) {
            Some(meta) => Arc::clone(meta),
            None => {
                debug!("no {category:?} instructions in catalog, falling back to ADDI");
                Arc::clone(self.catalog.fallback())
            }
        }
    }

    fn arith_immediate(&self, rng: &mut StimulusRng) -> i32 {
        let arith: &ArithImmediates = &self.config.immediates.arith;
        let weights =
            [arith.small, arith.boundary, arith.medium, arith.special_pattern, arith.random_full];
        let value = match rng.weighted(&weights) {
            Some(0) => rng.between(-1, 1),
            Some(1) => rng.pick(&arith.boundary_values).copied().unwrap_or(0) as i64,
            Some(2) => rng.between(-32, 32),
            Some(3) => rng.pick(&arith.special_values).copied().unwrap_or(0) as i64,
            _ => rng.between(IMM12_MIN, IMM12_MAX),
        };
        value.clamp(IMM12_MIN, IMM12_MAX) as i32
    }

    fn memory_base(&self, rng: &mut StimulusRng) -> u8 {
        if rng.chance(self.config.register_policy.sp_usage_fraction_in_memory_ops) {
            SP
        } else {
            rng.between(1, 31) as u8
        }
    }

    fn memory_offset(&self, rng: &mut StimulusRng) -> i32 {
        let mem: &MemoryOffsets = &self.config.immediates.memory_offset;
        let weights = [mem.near_zero, mem.small_range, mem.mid_range, mem.far_range];
        let offset = match rng.weighted(&weights) {
            Some(1) => aligned_in_window(rng, mem.small_range_min, mem.small_range_max),
            Some(2) => aligned_in_window(rng, mem.mid_range_min, mem.mid_range_max),
            Some(3) => aligned_in_window(rng, mem.far_range_min, mem.far_range_max),
            _ => 0,
        };
        offset.clamp(IMM12_MIN, IMM12_MAX) as i32
    }

    fn upper_immediate(&self, rng: &mut StimulusRng) -> i32 {
        let upper: &UpperImmediates = &self.config.immediates.upper20;
        if rng.chance(upper.symbolic_fraction) {
            if let Some(&base) = rng.pick(&upper.symbolic_bases) {
                return ((base >> 12) & UPPER20_MASK) as i32;
            }
        }
        rng.between(0, UPPER20_MASK as i64) as i32
    }
}

/// Multiple of 4 in `[min, max)`, stepping from `min`; `min` when the window is empty
fn aligned_in_window(rng: &mut StimulusRng, min: i32, max: i32) -> i64 {
    let (min, max) = (min as i64, max as i64);
    let steps = (max - min + 3) / 4;
    if steps <= 0 {
        return min;
    }
    min + 4 * rng.between(0, steps - 1)
}

//! Pipeline hazard injection
//!
//! After an instruction is synthesized it is patched against its predecessor so that
//! data dependencies show up far more often than uniform register choice would give.
//! The three checks run in a fixed order (RAW, WAW, load-use); a later check may
//! overwrite what an earlier one wrote, which produces compound hazards.

use tracing::debug;

use crate::config::HazardConfig;
use crate::instruction::Instruction;
use crate::rng::StimulusRng;

/// Which hazards were applied to one instruction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectedHazards {
    pub raw: bool,
    pub waw: bool,
    pub load_use: bool,
}

impl InjectedHazards {
    pub fn any(&self) -> bool {
        self.raw || self.waw || self.load_use
    }
}

#[derive(Debug, Clone)]
pub struct HazardInjector {
    config: HazardConfig,
    last_rd: Option<u8>,
    last_was_load: bool,
}

impl HazardInjector {
    pub fn new(config: &HazardConfig) -> Self {
        Self { config: config.clone(), last_rd: None, last_was_load: false }
    }

    /// Patch `current` against `previous`; does nothing for the first instruction
    pub fn inject(
        &self,
        current: &mut Instruction,
        previous: Option<&Instruction>,
        rng: &mut StimulusRng,
    ) -> InjectedHazards {
        let mut applied = InjectedHazards::default();
        let Some(previous) = previous else {
            return applied;
        };

        if rng.chance(self.config.raw_dependency_prob) {
            if let Some(rd) = previous.rd.filter(|&rd| rd != 0) {
                if current.rs1.is_some() {
                    current.rs1 = Some(rd);
                    applied.raw = true;
                } else if current.rs2.is_some() {
                    current.rs2 = Some(rd);
                    applied.raw = true;
                }
            }
        }

        if rng.chance(self.config.waw_repeat_prob) {
            if let (Some(rd), Some(_)) = (previous.rd, current.rd) {
                current.rd = Some(rd);
                applied.waw = true;
            }
        }

        if self.last_was_load && rng.chance(self.config.load_use_prob) {
            if let (Some(rd), Some(_)) = (self.last_rd, current.rs1) {
                current.rs1 = Some(rd);
                applied.load_use = true;
            }
        }

        if applied.any() {
            debug!("{}: injected {:?}", current.mnemonic(), applied);
        }
        applied
    }

    /// Track `inst` as the predecessor of the next instruction
    pub fn record(&mut self, inst: &Instruction) {
        self.last_rd = inst.rd;
        self.last_was_load = inst.is_load();
    }
}

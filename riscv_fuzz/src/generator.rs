//! Sequence generation
//!
//! Drives the whole pipeline for one program:
//!
//! 1. synthesize each instruction in order, patching it against its predecessor for
//!    hazards and drawing symbolic branch/jump targets,
//! 2. name the targets and turn them into byte offsets,
//! 3. encode and render every instruction, then build the listings and the manifest.

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::GenerationConfig;
use crate::encoder::encode;
use crate::error::GenerateError;
use crate::hazard::HazardInjector;
use crate::instruction::{Instruction, InstructionFormat};
use crate::manifest::Manifest;
use crate::render::{assembly_listing, binary_listing, hex_listing, render};
use crate::resolver::{assign_labels, resolve_offsets, LabelMap, TargetSelector};
use crate::rng::StimulusRng;
use crate::synth::OperandSynthesizer;

/// A generated program together with its listings
#[derive(Debug, Clone)]
pub struct GeneratedProgram {
    pub instructions: Vec<Instruction>,
    pub labels: LabelMap,
    /// Assembly listing with label lines interspersed
    pub assembly: Vec<String>,
    /// One lower-case 8-digit hex word per instruction
    pub hex: Vec<String>,
    pub manifest: Manifest,
}

impl GeneratedProgram {
    /// One 32-character binary string per instruction
    pub fn binary(&self) -> Vec<String> {
        binary_listing(&self.instructions)
    }

    pub fn words(&self) -> impl Iterator<Item = u32> + '_ {
        self.instructions.iter().map(|inst| inst.raw)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Generator {
    catalog: Catalog,
    config: GenerationConfig,
    rng: StimulusRng,
}

impl Generator {
    /// Generator seeded from system entropy
    pub fn new(catalog: Catalog, config: GenerationConfig) -> Self {
        Self::with_rng(catalog, config, StimulusRng::from_entropy())
    }

    pub fn with_seed(catalog: Catalog, config: GenerationConfig, seed: u64) -> Self {
        Self::with_rng(catalog, config, StimulusRng::from_seed(seed))
    }

    pub fn with_rng(catalog: Catalog, config: GenerationConfig, rng: StimulusRng) -> Self {
        Self { catalog, config, rng }
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate a program of `length` instructions
    ///
    /// The random stream continues across calls, so only the first call after
    /// construction is reproducible from the seed alone.
    pub fn generate(&mut self, length: usize) -> Result<GeneratedProgram, GenerateError> {
        info!("Generating {length} RV32I instructions (seed {})", self.rng.seed());

        let synth = OperandSynthesizer::new(&self.catalog, &self.config);
        let mut targets = TargetSelector::new(&self.config);
        let mut hazards = HazardInjector::new(&self.config.hazards);

        let mut sequence: Vec<Instruction> = Vec::with_capacity(length);
        for index in 0..length {
            let mut inst = synth.synthesize(index, length, &mut self.rng, &mut targets);
            hazards.inject(&mut inst, sequence.last(), &mut self.rng);
            hazards.record(&inst);
            sequence.push(inst);
        }

        let labels = assign_labels(&mut sequence);
        let offset_fallbacks = resolve_offsets(&mut sequence);

        let mut nop_substitutions = 0;
        for (index, inst) in sequence.iter_mut().enumerate() {
            inst.raw = encode(inst).map_err(|source| GenerateError::Encode { index, source })?;
            if inst.format() == InstructionFormat::Unsupported {
                nop_substitutions += 1;
                inst.assembly = "nop".to_string();
            } else {
                inst.assembly = render(inst, &labels);
            }
        }

        if nop_substitutions > 0 {
            debug!("{nop_substitutions} instructions of unsupported format emitted as NOP");
        }
        debug!(
            "{} labels, {} backward branches, {offset_fallbacks} offset fallbacks",
            labels.len(),
            targets.backward_taken()
        );

        let mut manifest = Manifest::new(self.rng.seed(), length, self.config.weights.clone());
        manifest.backward_branches = targets.backward_taken();
        manifest.offset_fallbacks = offset_fallbacks;
        manifest.nop_substitutions = nop_substitutions;

        let assembly = assembly_listing(&sequence, &labels);
        let hex = hex_listing(&sequence);

        Ok(GeneratedProgram { instructions: sequence, labels, assembly, hex, manifest })
    }
}

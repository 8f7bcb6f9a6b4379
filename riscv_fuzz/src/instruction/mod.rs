//! RV32I instruction types and definitions

pub mod formats;
pub mod opcodes;

pub use formats::*;
pub use opcodes::*;

use std::fmt;
use std::sync::Arc;

use crate::catalog::{Category, InstructionMetadata, OperandRole};

/// One program word of a generated sequence
///
/// Created empty by the synthesizer, register fields patched by the hazard injector,
/// `imm` and `label` fixed by the resolver, `raw` and `assembly` filled by the encoder
/// and renderer. Fields the operand pattern does not name stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub meta: Arc<InstructionMetadata>,
    pub rd: Option<u8>,
    pub rs1: Option<u8>,
    pub rs2: Option<u8>,
    /// Arithmetic value, memory/branch byte offset or upper-immediate bits
    pub imm: Option<i32>,
    pub shamt: Option<u8>,
    /// Symbolic target: index of the instruction a branch or jump lands on
    pub target: Option<usize>,
    pub label: Option<String>,
    pub raw: u32,
    pub assembly: String,
}

impl Instruction {
    pub fn new(meta: Arc<InstructionMetadata>) -> Self {
        Self {
            meta,
            rd: None,
            rs1: None,
            rs2: None,
            imm: None,
            shamt: None,
            target: None,
            label: None,
            raw: 0,
            assembly: String::new(),
        }
    }

    /// `addi x0, x0, 0`
    pub fn nop() -> Self {
        let mut nop = Self::new(Arc::new(InstructionMetadata::addi()));
        nop.rd = Some(0);
        nop.rs1 = Some(0);
        nop.imm = Some(0);
        nop
    }

    pub fn mnemonic(&self) -> &str {
        &self.meta.mnemonic
    }

    pub fn format(&self) -> InstructionFormat {
        self.meta.format
    }

    pub fn category(&self) -> Category {
        self.meta.category
    }

    pub fn is_load(&self) -> bool {
        self.meta.category == Category::Load
    }

    /// Whether the operand pattern carries a PC-relative target
    pub fn has_label(&self) -> bool {
        self.meta.has_role(OperandRole::Label)
    }

    /// First role of the operand pattern whose value has not been populated
    pub fn missing_operand(&self) -> Option<OperandRole> {
        self.meta.operand_pattern.iter().copied().find(|role| match role {
            OperandRole::Rd => self.rd.is_none(),
            OperandRole::Rs1 => self.rs1.is_none(),
            OperandRole::Rs2 => self.rs2.is_none(),
            OperandRole::Imm | OperandRole::Imm20 | OperandRole::PredSucc => self.imm.is_none(),
            OperandRole::Shamt => self.shamt.is_none(),
            OperandRole::Label => self.imm.is_none(),
            OperandRole::MemoryOffset => self.imm.is_none() || self.rs1.is_none(),
            OperandRole::Unsupported => true,
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.assembly.is_empty() {
            write!(f, "{} (format={:?})", self.mnemonic(), self.format())
        } else {
            write!(f, "{}", self.assembly)
        }
    }
}

//! RV32I instruction formats (types)
//!
//! Every 32-bit RV32I instruction uses one of six encoding layouts. The generator
//! picks *what* to emit from the catalog; the format decides *how* the operands are
//! packed into the word.
//!
//! ## Format Patterns
//!
//! ### R-Type (Register-Register)
//!
//! - Bits 31-25: funct7
//! - Bits 24-20: rs2
//! - Bits 19-15: rs1
//! - Bits 14-12: funct3
//! - Bits 11-7:  rd
//! - Bits 6-0:   opcode
//!
//! **Examples**: `add x1, x2, x3`, `sltu x5, x6, x7`
//!
//! ### I-Type (Immediate)
//!
//! - Bits 31-20: imm[11:0]
//! - Bits 19-15: rs1
//! - Bits 14-12: funct3
//! - Bits 11-7:  rd
//! - Bits 6-0:   opcode
//!
//! **Examples**: `addi x1, x2, 100`, `lw x1, 8(x2)`, `jalr x1, x2, 4`, `ecall`
//!
//! Shift-immediates (`slli`, `srli`, `srai`) reuse the R-type upper layout: funct7 sits
//! in bits 31-25 and the 5-bit shift amount replaces rs2 in bits 24-20.
//!
//! ### S-Type (Store)
//!
//! - Bits 31-25: imm[11:5]
//! - Bits 24-20: rs2
//! - Bits 19-15: rs1
//! - Bits 14-12: funct3
//! - Bits 11-7:  imm[4:0]
//! - Bits 6-0:   opcode
//!
//! ### B-Type (Branch)
//!
//! - Bit 31:     imm[12]
//! - Bits 30-25: imm[10:5]
//! - Bits 24-20: rs2
//! - Bits 19-15: rs1
//! - Bits 14-12: funct3
//! - Bits 11-8:  imm[4:1]
//! - Bit 7:      imm[11]
//! - Bits 6-0:   opcode
//!
//! **Note**: 13-bit signed, 2-byte aligned offset (±4 KiB)
//!
//! ### U-Type (Upper Immediate)
//!
//! - Bits 31-12: imm[31:12]
//! - Bits 11-7:  rd
//! - Bits 6-0:   opcode
//!
//! ### J-Type (Jump)
//!
//! - Bit 31:     imm[20]
//! - Bits 30-21: imm[10:1]
//! - Bit 20:     imm[11]
//! - Bits 19-12: imm[19:12]
//! - Bits 11-7:  rd
//! - Bits 6-0:   opcode
//!
//! **Note**: 21-bit signed, 2-byte aligned offset (±1 MiB)

use std::fmt;

use serde::{Deserialize, Serialize};

/// RV32I instruction format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionFormat {
    /// R-type: register-register operations (add, sub, etc.)
    R,

    /// I-type: immediate operations, loads, jalr, system and fence
    I,

    /// S-type: store operations (sw, sb, sh)
    S,

    /// B-type: conditional branches (beq, bne, etc.)
    B,

    /// U-type: upper immediate operations (lui, auipc)
    U,

    /// J-type: unconditional jumps (jal)
    J,

    /// Any format name the catalog uses that RV32I does not define.
    /// Encoded as a NOP.
    #[serde(other)]
    Unsupported,
}

impl InstructionFormat {
    /// Maximum absolute byte offset (exclusive) a label-bearing instruction of this
    /// format can encode, or `None` if the format carries no PC-relative target.
    pub fn offset_limit(self) -> Option<i64> {
        match self {
            InstructionFormat::B => Some(1 << 12),
            InstructionFormat::J => Some(1 << 20),
            _ => None,
        }
    }

    /// Inclusive range of the signed immediate as stored in the instruction word
    pub fn immediate_range(self) -> Option<(i64, i64)> {
        match self {
            InstructionFormat::I | InstructionFormat::S => Some((-2048, 2047)),
            InstructionFormat::B => Some((-4096, 4094)),
            InstructionFormat::U => Some((0, 0xFFFFF)),
            InstructionFormat::J => Some((-(1 << 20), (1 << 20) - 2)),
            InstructionFormat::R | InstructionFormat::Unsupported => None,
        }
    }
}

impl fmt::Display for InstructionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstructionFormat::R => "R-type (register-register)",
            InstructionFormat::I => "I-type (immediate/load)",
            InstructionFormat::S => "S-type (store)",
            InstructionFormat::B => "B-type (branch)",
            InstructionFormat::U => "U-type (upper immediate)",
            InstructionFormat::J => "J-type (jump)",
            InstructionFormat::Unsupported => "unsupported",
        };
        write!(f, "{}", name)
    }
}

//! Field decoder
//!
//! The inverse of [`crate::encoder`], restricted to what a known format implies: given
//! a raw word and the format it was encoded with, recover the register numbers and the
//! immediate. Used to check that every generated word carries exactly the operands that
//! were chosen for it.
//!
//! **Example**
//!
//! [0000000 | 00011 | 00010 | 000 | 00001 | 0110011]
//! [funct7  | rs2   | rs1   |funct3| rd   | opcode ]
//!
//! - opcode `0110011` is OP, so the word is R-type
//! - `funct3 = 000` with `funct7 = 0000000` selects `add`
//! - the word is `add x1, x2, x3`
//!
//! `funct3`, `rd`, `rs1` and `rs2` sit at the same bit positions in every format that
//! has them, so the [`FieldExtractor`] accessors do not need the format.

pub mod utils;

pub use utils::*;

use crate::catalog::ImmediateKind;
use crate::instruction::InstructionFormat;

/// Utility trait for field extraction from instruction words
pub trait FieldExtractor {
    /// Extract opcode (bits [6:0])
    fn opcode(&self) -> u8;

    /// Extract rd field (bits [11:7])
    fn rd(&self) -> u8;

    /// Extract rs1 field (bits [19:15])
    fn rs1(&self) -> u8;

    /// Extract rs2 field (bits [24:20])
    fn rs2(&self) -> u8;

    /// Extract funct3 field (bits [14:12])
    fn funct3(&self) -> u8;

    /// Extract funct7 field (bits [31:25])
    fn funct7(&self) -> u8;
}

impl FieldExtractor for u32 {
    fn opcode(&self) -> u8 {
        (*self & 0x7F) as u8
    }

    fn rd(&self) -> u8 {
        ((*self >> 7) & 0x1F) as u8
    }

    fn rs1(&self) -> u8 {
        ((*self >> 15) & 0x1F) as u8
    }

    fn rs2(&self) -> u8 {
        ((*self >> 20) & 0x1F) as u8
    }

    fn funct3(&self) -> u8 {
        ((*self >> 12) & 0x7) as u8
    }

    fn funct7(&self) -> u8 {
        ((*self >> 25) & 0x7F) as u8
    }
}

/// Operand fields present in a word of a given format
///
/// Fields the format does not carry are `None`. For shift-immediates `imm` is `None`
/// and the amount is in `shamt`; for U-type `imm` holds the 20 upper bits unshifted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodedFields {
    pub opcode: u8,
    pub funct3: Option<u8>,
    pub funct7: Option<u8>,
    pub rd: Option<u8>,
    pub rs1: Option<u8>,
    pub rs2: Option<u8>,
    pub imm: Option<i32>,
    pub shamt: Option<u8>,
}

/// Split `word` into the fields `format` defines
pub fn decode_fields(word: u32, format: InstructionFormat, kind: ImmediateKind) -> DecodedFields {
    let mut fields = DecodedFields { opcode: word.opcode(), ..DecodedFields::default() };

    match format {
        InstructionFormat::R => {
            fields.funct3 = Some(word.funct3());
            fields.funct7 = Some(word.funct7());
            fields.rd = Some(word.rd());
            fields.rs1 = Some(word.rs1());
            fields.rs2 = Some(word.rs2());
        }
        InstructionFormat::I => {
            fields.funct3 = Some(word.funct3());
            fields.rd = Some(word.rd());
            fields.rs1 = Some(word.rs1());
            if kind == ImmediateKind::Shamt5 {
                fields.funct7 = Some(word.funct7());
                fields.shamt = Some(extract_shamt(word));
            } else {
                fields.imm = Some(extract_i_immediate(word));
            }
        }
        InstructionFormat::S => {
            fields.funct3 = Some(word.funct3());
            fields.rs1 = Some(word.rs1());
            fields.rs2 = Some(word.rs2());
            fields.imm = Some(extract_s_immediate(word));
        }
        InstructionFormat::B => {
            fields.funct3 = Some(word.funct3());
            fields.rs1 = Some(word.rs1());
            fields.rs2 = Some(word.rs2());
            fields.imm = Some(extract_b_immediate(word));
        }
        InstructionFormat::U => {
            fields.rd = Some(word.rd());
            fields.imm = Some(extract_u_immediate(word));
        }
        InstructionFormat::J => {
            fields.rd = Some(word.rd());
            fields.imm = Some(extract_j_immediate(word));
        }
        InstructionFormat::Unsupported => {}
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_extractor() {
        // add x1, x2, x3
        let inst = 0x0031_00B3u32;
        assert_eq!(inst.opcode(), 0x33);
        assert_eq!(inst.rd(), 1);
        assert_eq!(inst.rs1(), 2);
        assert_eq!(inst.rs2(), 3);
        assert_eq!(inst.funct3(), 0);
        assert_eq!(inst.funct7(), 0);
    }

    #[test]
    fn test_decode_r_and_shift() {
        let add = decode_fields(0x0031_00B3, InstructionFormat::R, ImmediateKind::None);
        assert_eq!((add.rd, add.rs1, add.rs2, add.imm), (Some(1), Some(2), Some(3), None));

        let srai = decode_fields(0x4031_5093, InstructionFormat::I, ImmediateKind::Shamt5);
        assert_eq!(srai.shamt, Some(3));
        assert_eq!(srai.funct7, Some(0x20));
        assert_eq!(srai.imm, None);
    }

    #[test]
    fn test_decode_memory_and_control_flow() {
        let sw = decode_fields(0xFE11_2E23, InstructionFormat::S, ImmediateKind::Plain);
        assert_eq!((sw.rs1, sw.rs2, sw.imm, sw.rd), (Some(2), Some(1), Some(-4), None));

        let beq = decode_fields(0xFE20_8CE3, InstructionFormat::B, ImmediateKind::Plain);
        assert_eq!((beq.rs1, beq.rs2, beq.imm), (Some(1), Some(2), Some(-8)));

        let jal = decode_fields(0xFFDF_F06F, InstructionFormat::J, ImmediateKind::Plain);
        assert_eq!((jal.rd, jal.imm), (Some(0), Some(-4)));
    }

    #[test]
    fn test_decode_unsupported_is_opcode_only() {
        let fields =
            decode_fields(0x0000_0013, InstructionFormat::Unsupported, ImmediateKind::Plain);
        assert_eq!(fields, DecodedFields { opcode: 0x13, ..DecodedFields::default() });
    }
}

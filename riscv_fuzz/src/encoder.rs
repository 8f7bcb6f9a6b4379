//! RV32I format encoder
//!
//! Packs a fully resolved [`Instruction`] into its 32-bit machine word. Each format has
//! its own packing function; every field is masked to its width before it is shifted
//! into place.
//!
//! ```text
//! R  [ funct7 | rs2 | rs1 | funct3 | rd | opcode ]
//! I  [ imm[11:0]    | rs1 | funct3 | rd | opcode ]
//! S  [ imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode ]
//! B  [ imm[12|10:5] | rs2 | rs1 | funct3 | imm[4:1|11] | opcode ]
//! U  [ imm[31:12]                      | rd | opcode ]
//! J  [ imm[20|10:1|11|19:12]           | rd | opcode ]
//! ```

use tracing::warn;

use crate::catalog::ImmediateKind;
use crate::error::EncodeError;
use crate::instruction::{Instruction, InstructionFormat};

/// `addi x0, x0, 0`
pub const NOP: u32 = 0x0000_0013;

const ECALL_IMM: u32 = 0;
const EBREAK_IMM: u32 = 1;

/// Encode one instruction
///
/// Fails only when a role of the operand pattern was never populated, which means the
/// catalog describes an operand no generator can produce. Unsupported formats become
/// [`NOP`].
pub fn encode(inst: &Instruction) -> Result<u32, EncodeError> {
    if let Some(role) = inst.missing_operand() {
        return Err(EncodeError::MissingOperand { mnemonic: inst.mnemonic().to_string(), role });
    }

    let word = match inst.format() {
        InstructionFormat::R => encode_r(inst),
        InstructionFormat::I => match inst.meta.immed_kind {
            ImmediateKind::Shamt5 => encode_i_shift(inst),
            _ if is_system_call(inst) => encode_i_system(inst),
            _ => encode_i(inst),
        },
        InstructionFormat::S => encode_s(inst),
        InstructionFormat::B => encode_b(inst),
        InstructionFormat::U => encode_u(inst),
        InstructionFormat::J => encode_j(inst),
        InstructionFormat::Unsupported => {
            warn!("{}: unsupported instruction format, emitting NOP", inst.mnemonic());
            NOP
        }
    };
    Ok(word)
}

fn is_system_call(inst: &Instruction) -> bool {
    let mnemonic = inst.mnemonic();
    mnemonic.eq_ignore_ascii_case("ECALL") || mnemonic.eq_ignore_ascii_case("EBREAK")
}

#[inline]
fn reg(value: Option<u8>) -> u32 {
    u32::from(value.unwrap_or(0)) & 0x1F
}

#[inline]
fn imm(inst: &Instruction) -> u32 {
    inst.imm.unwrap_or(0) as u32
}

#[inline]
fn opcode(inst: &Instruction) -> u32 {
    inst.meta.opcode & 0x7F
}

#[inline]
fn funct3(inst: &Instruction) -> u32 {
    inst.meta.funct3.unwrap_or(0) & 0x7
}

#[inline]
fn funct7(inst: &Instruction) -> u32 {
    inst.meta.funct7.unwrap_or(0) & 0x7F
}

fn encode_r(inst: &Instruction) -> u32 {
    (funct7(inst) << 25)
        | (reg(inst.rs2) << 20)
        | (reg(inst.rs1) << 15)
        | (funct3(inst) << 12)
        | (reg(inst.rd) << 7)
        | opcode(inst)
}

fn encode_i(inst: &Instruction) -> u32 {
    ((imm(inst) & 0xFFF) << 20)
        | (reg(inst.rs1) << 15)
        | (funct3(inst) << 12)
        | (reg(inst.rd) << 7)
        | opcode(inst)
}

fn encode_i_shift(inst: &Instruction) -> u32 {
    let shamt = u32::from(inst.shamt.unwrap_or(0)) & 0x1F;
    (funct7(inst) << 25)
        | (shamt << 20)
        | (reg(inst.rs1) << 15)
        | (funct3(inst) << 12)
        | (reg(inst.rd) << 7)
        | opcode(inst)
}

fn encode_i_system(inst: &Instruction) -> u32 {
    let sys_imm =
        if inst.mnemonic().eq_ignore_ascii_case("EBREAK") { EBREAK_IMM } else { ECALL_IMM };
    (sys_imm << 20)
        | (reg(inst.rs1) << 15)
        | (funct3(inst) << 12)
        | (reg(inst.rd) << 7)
        | opcode(inst)
}

fn encode_s(inst: &Instruction) -> u32 {
    let imm = imm(inst);
    let imm_11_5 = (imm >> 5) & 0x7F;
    let imm_4_0 = imm & 0x1F;
    (imm_11_5 << 25)
        | (reg(inst.rs2) << 20)
        | (reg(inst.rs1) << 15)
        | (funct3(inst) << 12)
        | (imm_4_0 << 7)
        | opcode(inst)
}

fn encode_b(inst: &Instruction) -> u32 {
    let offset = imm(inst);
    let imm_12 = (offset >> 12) & 0x1;
    let imm_11 = (offset >> 11) & 0x1;
    let imm_10_5 = (offset >> 5) & 0x3F;
    let imm_4_1 = (offset >> 1) & 0xF;
    (imm_12 << 31)
        | (imm_10_5 << 25)
        | (reg(inst.rs2) << 20)
        | (reg(inst.rs1) << 15)
        | (funct3(inst) << 12)
        | (imm_4_1 << 8)
        | (imm_11 << 7)
        | opcode(inst)
}

fn encode_u(inst: &Instruction) -> u32 {
    ((imm(inst) & 0xF_FFFF) << 12) | (reg(inst.rd) << 7) | opcode(inst)
}

fn encode_j(inst: &Instruction) -> u32 {
    let offset = imm(inst);
    let imm_20 = (offset >> 20) & 0x1;
    let imm_19_12 = (offset >> 12) & 0xFF;
    let imm_11 = (offset >> 11) & 0x1;
    let imm_10_1 = (offset >> 1) & 0x3FF;
    (imm_20 << 31)
        | (imm_10_1 << 21)
        | (imm_11 << 20)
        | (imm_19_12 << 12)
        | (reg(inst.rd) << 7)
        | opcode(inst)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{Catalog, InstructionMetadata, OperandRole};

    fn build(mnemonic: &str, f: impl FnOnce(&mut Instruction)) -> Instruction {
        let catalog = Catalog::rv32i();
        let mut inst = Instruction::new(catalog.get(mnemonic).unwrap().clone());
        f(&mut inst);
        inst
    }

    #[test]
    fn test_addi_x5_x0_0() {
        let inst = build("ADDI", |i| {
            i.rd = Some(5);
            i.rs1 = Some(0);
            i.imm = Some(0);
        });
        assert_eq!(encode(&inst).unwrap(), 0x0000_0293);
    }

    #[test]
    fn test_known_words() {
        // add x3, x1, x2
        let add = build("ADD", |i| {
            i.rd = Some(3);
            i.rs1 = Some(1);
            i.rs2 = Some(2);
        });
        assert_eq!(encode(&add).unwrap(), 0x0020_81B3);

        // sub x5, x6, x7
        let sub = build("SUB", |i| {
            i.rd = Some(5);
            i.rs1 = Some(6);
            i.rs2 = Some(7);
        });
        assert_eq!(encode(&sub).unwrap(), 0x4073_02B3);

        // addi x1, x0, -1
        let addi = build("ADDI", |i| {
            i.rd = Some(1);
            i.rs1 = Some(0);
            i.imm = Some(-1);
        });
        assert_eq!(encode(&addi).unwrap(), 0xFFF0_0093);

        // srai x1, x2, 3
        let srai = build("SRAI", |i| {
            i.rd = Some(1);
            i.rs1 = Some(2);
            i.shamt = Some(3);
        });
        assert_eq!(encode(&srai).unwrap(), 0x4031_5093);

        // lw x1, 8(x2)
        let lw = build("LW", |i| {
            i.rd = Some(1);
            i.rs1 = Some(2);
            i.imm = Some(8);
        });
        assert_eq!(encode(&lw).unwrap(), 0x0081_2083);

        // sw x1, -4(x2)
        let sw = build("SW", |i| {
            i.rs2 = Some(1);
            i.rs1 = Some(2);
            i.imm = Some(-4);
        });
        assert_eq!(encode(&sw).unwrap(), 0xFE11_2E23);

        // beq x1, x2, -8
        let beq = build("BEQ", |i| {
            i.rs1 = Some(1);
            i.rs2 = Some(2);
            i.imm = Some(-8);
        });
        assert_eq!(encode(&beq).unwrap(), 0xFE20_8CE3);

        // lui x5, 0x12345
        let lui = build("LUI", |i| {
            i.rd = Some(5);
            i.imm = Some(0x12345);
        });
        assert_eq!(encode(&lui).unwrap(), 0x1234_52B7);

        // jal x1, 2048
        let jal = build("JAL", |i| {
            i.rd = Some(1);
            i.imm = Some(2048);
        });
        assert_eq!(encode(&jal).unwrap(), 0x0010_00EF);

        // jal x0, -4
        let jal_back = build("JAL", |i| {
            i.rd = Some(0);
            i.imm = Some(-4);
        });
        assert_eq!(encode(&jal_back).unwrap(), 0xFFDF_F06F);
    }

    #[test]
    fn test_system_and_fence() {
        assert_eq!(encode(&build("ECALL", |_| {})).unwrap(), 0x0000_0073);
        assert_eq!(encode(&build("EBREAK", |_| {})).unwrap(), 0x0010_0073);
        assert_eq!(encode(&build("FENCE.I", |_| {})).unwrap(), 0x0000_100F);
        assert_eq!(encode(&build("NOP", |_| {})).unwrap(), NOP);

        let fence = build("FENCE", |i| i.imm = Some(crate::synth::FENCE_IORW_IORW));
        assert_eq!(encode(&fence).unwrap(), 0x0FF0_000F);
    }

    #[test]
    fn test_unsupported_format_is_nop() {
        let mut meta = InstructionMetadata::addi();
        meta.format = InstructionFormat::Unsupported;
        meta.operand_pattern.clear();
        let inst = Instruction::new(Arc::new(meta));
        assert_eq!(encode(&inst).unwrap(), NOP);
    }

    #[test]
    fn test_missing_operand_rejected() {
        let inst = build("ADD", |i| {
            i.rd = Some(1);
            i.rs1 = Some(2);
        });
        assert_eq!(
            encode(&inst),
            Err(EncodeError::MissingOperand { mnemonic: "ADD".to_string(), role: OperandRole::Rs2 })
        );
    }

    #[test]
    fn test_fields_are_masked() {
        // Out-of-width immediates must not bleed into neighbouring fields
        let addi = build("ADDI", |i| {
            i.rd = Some(0);
            i.rs1 = Some(0);
            i.imm = Some(0x1FFF);
        });
        assert_eq!(encode(&addi).unwrap(), 0xFFF0_0013);

        let lui = build("LUI", |i| {
            i.rd = Some(0);
            i.imm = Some(-1);
        });
        assert_eq!(encode(&lui).unwrap(), 0xFFFF_F037);
    }
}

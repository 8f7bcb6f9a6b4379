//! Utility functions for pulling immediates back out of instruction words

/// Sign-extend a value of specified bit width to i32
pub fn sign_extend(value: u32, width: u8) -> i32 {
    let shift = 32 - u32::from(width);
    ((value << shift) as i32) >> shift
}

/// Extract immediate value for I-type instructions
pub fn extract_i_immediate(inst: u32) -> i32 {
    sign_extend((inst >> 20) & 0xFFF, 12)
}

/// Extract the 5-bit shift amount of `slli`/`srli`/`srai`
pub fn extract_shamt(inst: u32) -> u8 {
    ((inst >> 20) & 0x1F) as u8
}

/// Extract immediate value for S-type instructions
pub fn extract_s_immediate(inst: u32) -> i32 {
    let imm_11_5 = (inst >> 25) & 0x7F;
    let imm_4_0 = (inst >> 7) & 0x1F;
    sign_extend((imm_11_5 << 5) | imm_4_0, 12)
}

/// Extract the byte offset of a B-type instruction
pub fn extract_b_immediate(inst: u32) -> i32 {
    let imm_12 = (inst >> 31) & 0x1;
    let imm_11 = (inst >> 7) & 0x1;
    let imm_10_5 = (inst >> 25) & 0x3F;
    let imm_4_1 = (inst >> 8) & 0xF;

    let imm = (imm_12 << 12) | (imm_11 << 11) | (imm_10_5 << 5) | (imm_4_1 << 1);
    sign_extend(imm, 13)
}

/// Extract the 20 upper-immediate bits of a U-type instruction, unshifted
pub fn extract_u_immediate(inst: u32) -> i32 {
    (inst >> 12) as i32
}

/// Extract the byte offset of a J-type instruction
pub fn extract_j_immediate(inst: u32) -> i32 {
    let imm_20 = (inst >> 31) & 0x1;
    let imm_19_12 = (inst >> 12) & 0xFF;
    let imm_11 = (inst >> 20) & 0x1;
    let imm_10_1 = (inst >> 21) & 0x3FF;

    let imm = (imm_20 << 20) | (imm_19_12 << 12) | (imm_11 << 11) | (imm_10_1 << 1);
    sign_extend(imm, 21)
}

//! RV32I opcode definitions
//!
//! Opcodes are the lower 7 bits of a 32-bit instruction. They determine the major
//! instruction class; funct3/funct7 then pick the exact operation.
//!
//! ### Major Instruction Classes (bits [6:2])
//!
//! - `00000` → LOAD     - Load from memory
//! - `00011` → MISC-MEM - Memory ordering (fence, fence.i)
//! - `00100` → OP-IMM   - Arithmetic with immediate
//! - `00101` → AUIPC    - Add upper immediate to PC
//! - `01000` → STORE    - Store to memory
//! - `01100` → OP       - Register-register ops
//! - `01101` → LUI      - Load upper immediate
//! - `11000` → BRANCH   - Conditional branches
//! - `11001` → JALR     - Jump and link register
//! - `11011` → JAL      - Jump and link
//! - `11100` → SYSTEM   - ecall, ebreak
//!
//! Every standard 32-bit instruction ends in `11`.

/// RV32I opcodes (bits [6:0] of 32-bit instructions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Load instructions (lb, lh, lw, lbu, lhu)
    Load = 0b0000011,

    /// Memory ordering instructions (fence, fence.i)
    MiscMem = 0b0001111,

    /// Immediate arithmetic/logic operations (addi, slti, xori, etc.)
    OpImm = 0b0010011,

    /// Add upper immediate to PC (auipc)
    Auipc = 0b0010111,

    /// Store instructions (sb, sh, sw)
    Store = 0b0100011,

    /// Register-register operations (add, sub, etc.)
    Op = 0b0110011,

    /// Load upper immediate (lui)
    Lui = 0b0110111,

    /// Branch instructions (beq, bne, blt, etc.)
    Branch = 0b1100011,

    /// Jump and link register (jalr)
    Jalr = 0b1100111,

    /// Jump and link (jal)
    Jal = 0b1101111,

    /// System instructions (ecall, ebreak)
    System = 0b1110011,
}

impl Opcode {
    /// Get the numeric value as u32
    pub fn value_u32(self) -> u32 {
        self as u32
    }
}

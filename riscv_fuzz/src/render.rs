//! Assembly text and listings

use crate::catalog::OperandRole;
use crate::instruction::Instruction;
use crate::resolver::LabelMap;

/// Placeholder for a label-bearing instruction whose target was never named
pub const UNRESOLVED_LABEL: &str = "L_?";

/// Mnemonics rendered without operands
const BARE_MNEMONICS: [&str; 4] = ["ecall", "ebreak", "fence", "fence.i"];

/// Assembly text of one instruction, e.g. `addi x5, x0, 0` or `sw x1, -4(x2)`
pub fn render(inst: &Instruction, labels: &LabelMap) -> String {
    let mnemonic = inst.mnemonic().to_ascii_lowercase();
    if BARE_MNEMONICS.contains(&mnemonic.as_str()) {
        return mnemonic;
    }

    let operands: Vec<String> = inst
        .meta
        .operand_pattern
        .iter()
        .filter_map(|role| match role {
            OperandRole::Rd => Some(register(inst.rd)),
            OperandRole::Rs1 => Some(register(inst.rs1)),
            OperandRole::Rs2 => Some(register(inst.rs2)),
            OperandRole::Imm => Some(inst.imm.unwrap_or(0).to_string()),
            OperandRole::Shamt => Some(inst.shamt.unwrap_or(0).to_string()),
            OperandRole::Imm20 => Some(format!("0x{:x}", inst.imm.unwrap_or(0))),
            OperandRole::Label => Some(label(inst, labels)),
            OperandRole::MemoryOffset => {
                Some(format!("{}({})", inst.imm.unwrap_or(0), register(inst.rs1)))
            }
            OperandRole::PredSucc => Some("iorw, iorw".to_string()),
            OperandRole::Unsupported => None,
        })
        .collect();

    if operands.is_empty() {
        mnemonic
    } else {
        format!("{mnemonic} {}", operands.join(", "))
    }
}

fn register(reg: Option<u8>) -> String {
    format!("x{}", reg.unwrap_or(0))
}

fn label(inst: &Instruction, labels: &LabelMap) -> String {
    inst.label
        .clone()
        .or_else(|| inst.target.and_then(|target| labels.get(&target).cloned()))
        .unwrap_or_else(|| UNRESOLVED_LABEL.to_string())
}

/// Listing with `L<i>:` lines before labelled instructions and the raw word as a comment
pub fn assembly_listing(sequence: &[Instruction], labels: &LabelMap) -> Vec<String> {
    let mut lines = Vec::with_capacity(sequence.len() + labels.len());
    for (index, inst) in sequence.iter().enumerate() {
        if let Some(name) = labels.get(&index) {
            lines.push(format!("{name}:"));
        }
        lines.push(format!("    {:<30}  # 0x{:08x}", inst.assembly, inst.raw));
    }
    lines
}

/// One 8-digit lower-case hex word per instruction
pub fn hex_listing(sequence: &[Instruction]) -> Vec<String> {
    sequence.iter().map(|inst| format!("{:08x}", inst.raw)).collect()
}

/// One 32-character `0`/`1` string per instruction, MSB first
pub fn binary_listing(sequence: &[Instruction]) -> Vec<String> {
    sequence.iter().map(|inst| format!("{:032b}", inst.raw)).collect()
}

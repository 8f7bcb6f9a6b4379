//! Instruction catalog
//!
//! The catalog maps every mnemonic the generator may emit to its static metadata:
//! format, category, fixed opcode/funct fields and the ordered operand pattern.
//! It is built once and shared read-only for the whole run.
//!
//! Catalog documents are JSON arrays of records:
//!
//! ```json
//! { "mnemonic": "ADDI", "format": "I", "category": "alu",
//!   "opcode": "0x13", "funct3": "0x0", "funct7": null,
//!   "operand_pattern": ["rd", "rs1", "imm"], "immed_kind": "plain" }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::instruction::{InstructionFormat, Opcode};

/// Mnemonic every catalog gap falls back to
pub const FALLBACK_MNEMONIC: &str = "ADDI";

/// Functional grouping of instructions, as weighted by the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Alu,
    Compare,
    Load,
    Store,
    Branch,
    Jump,
    Upper,
    System,
    Pseudo,
}

/// Role of one operand slot in an instruction's assembly syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum OperandRole {
    #[serde(rename = "rd")]
    Rd,
    #[serde(rename = "rs1")]
    Rs1,
    #[serde(rename = "rs2")]
    Rs2,
    /// Signed 12-bit arithmetic immediate
    #[serde(rename = "imm")]
    Imm,
    /// 20-bit upper immediate
    #[serde(rename = "imm20")]
    Imm20,
    #[serde(rename = "shamt")]
    Shamt,
    /// PC-relative branch or jump target
    #[serde(rename = "label")]
    Label,
    /// `offset(base)` memory operand; fills both imm and rs1
    #[serde(rename = "imm(rs1)", alias = "offset(rs1)")]
    MemoryOffset,
    /// Fence predecessor/successor sets
    #[serde(rename = "pred_succ")]
    PredSucc,
    /// A role name no operand generator knows
    #[serde(other)]
    Unsupported,
}

/// How the immediate field of an I-type instruction is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImmediateKind {
    /// 5-bit shift amount with funct7 in the upper bits
    Shamt5,
    None,
    /// Any other kind name reads as a plain immediate
    #[default]
    #[serde(other)]
    Plain,
}

/// Static description of one mnemonic
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstructionMetadata {
    pub mnemonic: String,
    pub format: InstructionFormat,
    pub category: Category,
    #[serde(deserialize_with = "de_field_bits")]
    pub opcode: u32,
    #[serde(default, deserialize_with = "de_optional_field_bits")]
    pub funct3: Option<u32>,
    #[serde(default, deserialize_with = "de_optional_field_bits")]
    pub funct7: Option<u32>,
    pub operand_pattern: Vec<OperandRole>,
    #[serde(default)]
    pub immed_kind: ImmediateKind,
}

impl InstructionMetadata {
    /// `ADDI rd, rs1, imm`, the record used when the catalog cannot serve a category
    pub fn addi() -> Self {
        meta(
            "ADDI",
            InstructionFormat::I,
            Category::Alu,
            Opcode::OpImm,
            Some(0b000),
            None,
            &[OperandRole::Rd, OperandRole::Rs1, OperandRole::Imm],
            ImmediateKind::Plain,
        )
    }

    pub fn has_role(&self, role: OperandRole) -> bool {
        self.operand_pattern.contains(&role)
    }

    fn check_widths(&self) -> Result<(), CatalogError> {
        let fields = [
            ("opcode", Some(self.opcode), 7),
            ("funct3", self.funct3, 3),
            ("funct7", self.funct7, 7),
        ];
        for (field, value, bits) in fields {
            if let Some(value) = value {
                if value >> bits != 0 {
                    return Err(CatalogError::FieldWidth {
                        mnemonic: self.mnemonic.clone(),
                        field,
                        value,
                        bits,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Read-only collection of instruction metadata, indexed by mnemonic and category
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<Arc<InstructionMetadata>>,
    by_mnemonic: HashMap<String, usize>,
    by_category: HashMap<Category, Vec<Arc<InstructionMetadata>>>,
    fallback: Arc<InstructionMetadata>,
}

impl Catalog {
    /// Build a catalog from metadata records, rejecting duplicates and oversized fields
    pub fn new(records: Vec<InstructionMetadata>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            record.check_widths()?;
            if !seen.insert(record.mnemonic.to_ascii_uppercase()) {
                return Err(CatalogError::DuplicateMnemonic(record.mnemonic.clone()));
            }
        }
        Ok(Self::index(records))
    }

    fn index(records: Vec<InstructionMetadata>) -> Self {
        let mut entries = Vec::with_capacity(records.len());
        let mut by_mnemonic = HashMap::with_capacity(records.len());
        let mut by_category: HashMap<Category, Vec<Arc<InstructionMetadata>>> = HashMap::new();

        for record in records {
            let record = Arc::new(record);
            by_mnemonic.insert(record.mnemonic.to_ascii_uppercase(), entries.len());
            by_category.entry(record.category).or_default().push(Arc::clone(&record));
            entries.push(record);
        }

        let fallback = by_mnemonic
            .get(FALLBACK_MNEMONIC)
            .map(|&idx| Arc::clone(&entries[idx]))
            .unwrap_or_else(|| Arc::new(InstructionMetadata::addi()));

        Self { entries, by_mnemonic, by_category, fallback }
    }

    /// Parse a JSON array of metadata records
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<InstructionMetadata> = serde_json::from_str(json)?;
        Self::new(records)
    }

    /// The complete RV32I base instruction set plus `NOP` and `FENCE.I`
    pub fn rv32i() -> Self {
        use ImmediateKind::{None as NoImm, Plain, Shamt5};
        use InstructionFormat::{B, I, J, R, S, U};
        use OperandRole::*;

        let rrr: &[OperandRole] = &[Rd, Rs1, Rs2];
        let rri: &[OperandRole] = &[Rd, Rs1, Imm];
        let shift: &[OperandRole] = &[Rd, Rs1, Shamt];
        let load: &[OperandRole] = &[Rd, MemoryOffset];
        let store: &[OperandRole] = &[Rs2, MemoryOffset];
        let branch: &[OperandRole] = &[Rs1, Rs2, Label];
        let fence: &[OperandRole] = &[PredSucc];

        let records = vec![
            meta("ADD", R, Category::Alu, Opcode::Op, Some(0b000), Some(0x00), rrr, NoImm),
            meta("SUB", R, Category::Alu, Opcode::Op, Some(0b000), Some(0x20), rrr, NoImm),
            meta("SLL", R, Category::Alu, Opcode::Op, Some(0b001), Some(0x00), rrr, NoImm),
            meta("XOR", R, Category::Alu, Opcode::Op, Some(0b100), Some(0x00), rrr, NoImm),
            meta("SRL", R, Category::Alu, Opcode::Op, Some(0b101), Some(0x00), rrr, NoImm),
            meta("SRA", R, Category::Alu, Opcode::Op, Some(0b101), Some(0x20), rrr, NoImm),
            meta("OR", R, Category::Alu, Opcode::Op, Some(0b110), Some(0x00), rrr, NoImm),
            meta("AND", R, Category::Alu, Opcode::Op, Some(0b111), Some(0x00), rrr, NoImm),
            meta("SLT", R, Category::Compare, Opcode::Op, Some(0b010), Some(0x00), rrr, NoImm),
            meta("SLTU", R, Category::Compare, Opcode::Op, Some(0b011), Some(0x00), rrr, NoImm),
            meta("ADDI", I, Category::Alu, Opcode::OpImm, Some(0b000), None, rri, Plain),
            meta("XORI", I, Category::Alu, Opcode::OpImm, Some(0b100), None, rri, Plain),
            meta("ORI", I, Category::Alu, Opcode::OpImm, Some(0b110), None, rri, Plain),
            meta("ANDI", I, Category::Alu, Opcode::OpImm, Some(0b111), None, rri, Plain),
            meta("SLLI", I, Category::Alu, Opcode::OpImm, Some(0b001), Some(0x00), shift, Shamt5),
            meta("SRLI", I, Category::Alu, Opcode::OpImm, Some(0b101), Some(0x00), shift, Shamt5),
            meta("SRAI", I, Category::Alu, Opcode::OpImm, Some(0b101), Some(0x20), shift, Shamt5),
            meta("SLTI", I, Category::Compare, Opcode::OpImm, Some(0b010), None, rri, Plain),
            meta("SLTIU", I, Category::Compare, Opcode::OpImm, Some(0b011), None, rri, Plain),
            meta("LB", I, Category::Load, Opcode::Load, Some(0b000), None, load, Plain),
            meta("LH", I, Category::Load, Opcode::Load, Some(0b001), None, load, Plain),
            meta("LW", I, Category::Load, Opcode::Load, Some(0b010), None, load, Plain),
            meta("LBU", I, Category::Load, Opcode::Load, Some(0b100), None, load, Plain),
            meta("LHU", I, Category::Load, Opcode::Load, Some(0b101), None, load, Plain),
            meta("SB", S, Category::Store, Opcode::Store, Some(0b000), None, store, Plain),
            meta("SH", S, Category::Store, Opcode::Store, Some(0b001), None, store, Plain),
            meta("SW", S, Category::Store, Opcode::Store, Some(0b010), None, store, Plain),
            meta("BEQ", B, Category::Branch, Opcode::Branch, Some(0b000), None, branch, Plain),
            meta("BNE", B, Category::Branch, Opcode::Branch, Some(0b001), None, branch, Plain),
            meta("BLT", B, Category::Branch, Opcode::Branch, Some(0b100), None, branch, Plain),
            meta("BGE", B, Category::Branch, Opcode::Branch, Some(0b101), None, branch, Plain),
            meta("BLTU", B, Category::Branch, Opcode::Branch, Some(0b110), None, branch, Plain),
            meta("BGEU", B, Category::Branch, Opcode::Branch, Some(0b111), None, branch, Plain),
            meta("JAL", J, Category::Jump, Opcode::Jal, None, None, &[Rd, Label], Plain),
            meta("JALR", I, Category::Jump, Opcode::Jalr, Some(0b000), None, rri, Plain),
            meta("LUI", U, Category::Upper, Opcode::Lui, None, None, &[Rd, Imm20], Plain),
            meta("AUIPC", U, Category::Upper, Opcode::Auipc, None, None, &[Rd, Imm20], Plain),
            meta("FENCE", I, Category::System, Opcode::MiscMem, Some(0b000), None, fence, NoImm),
            meta("FENCE.I", I, Category::System, Opcode::MiscMem, Some(0b001), None, &[], NoImm),
            meta("ECALL", I, Category::System, Opcode::System, Some(0b000), None, &[], NoImm),
            meta("EBREAK", I, Category::System, Opcode::System, Some(0b000), None, &[], NoImm),
            meta("NOP", I, Category::Pseudo, Opcode::OpImm, Some(0b000), None, &[], NoImm),
        ];

        Self::index(records)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<InstructionMetadata>> {
        self.entries.iter()
    }

    /// Look up a mnemonic (case-insensitive)
    pub fn get(&self, mnemonic: &str) -> Option<&Arc<InstructionMetadata>> {
        self.by_mnemonic.get(&mnemonic.to_ascii_uppercase()).map(|&idx| &self.entries[idx])
    }

    /// All records of one category, in catalog order
    pub fn in_category(&self, category: Category) -> &[Arc<InstructionMetadata>] {
        self.by_category.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `ADDI` from this catalog, or the built-in record when the catalog lacks one
    pub fn fallback(&self) -> &Arc<InstructionMetadata> {
        &self.fallback
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::rv32i()
    }
}

#[allow(clippy::too_many_arguments)]
fn meta(
    mnemonic: &str,
    format: InstructionFormat,
    category: Category,
    opcode: Opcode,
    funct3: Option<u32>,
    funct7: Option<u32>,
    pattern: &[OperandRole],
    immed_kind: ImmediateKind,
) -> InstructionMetadata {
    InstructionMetadata {
        mnemonic: mnemonic.to_string(),
        format,
        category,
        opcode: opcode.value_u32(),
        funct3,
        funct7,
        operand_pattern: pattern.to_vec(),
        immed_kind,
    }
}

/// Field values appear either as integers or as hex strings (`"0x33"`, `"33"`)
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldBits {
    Number(u32),
    Text(String),
}

fn parse_field_bits<E: de::Error>(raw: FieldBits) -> Result<Option<u32>, E> {
    match raw {
        FieldBits::Number(value) => Ok(Some(value)),
        FieldBits::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let digits = trimmed
                .strip_prefix("0x")
                .or_else(|| trimmed.strip_prefix("0X"))
                .unwrap_or(trimmed);
            u32::from_str_radix(digits, 16)
                .map(Some)
                .map_err(|_| E::custom(format!("invalid field value `{text}`")))
        }
    }
}

fn de_field_bits<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    parse_field_bits(FieldBits::deserialize(deserializer)?)?
        .ok_or_else(|| de::Error::custom("opcode must not be empty"))
}

fn de_optional_field_bits<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u32>, D::Error> {
    match Option::<FieldBits>::deserialize(deserializer)? {
        Some(raw) => parse_field_bits(raw),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rv32i_catalog_contents() {
        let catalog = Catalog::rv32i();
        assert_eq!(catalog.len(), 42);
        assert_eq!(catalog.in_category(Category::Branch).len(), 6);
        assert_eq!(catalog.in_category(Category::Load).len(), 5);
        assert_eq!(catalog.fallback().mnemonic, "ADDI");

        let sra = catalog.get("sra").unwrap();
        assert_eq!(sra.funct7, Some(0x20));
        assert_eq!(sra.opcode, 0x33);
    }

    #[test]
    fn test_parse_hex_strings_and_nulls() {
        let json = r#"[
            {"mnemonic": "SRAI", "format": "I", "category": "alu", "opcode": "0x13",
             "funct3": "0x5", "funct7": "0x20", "operand_pattern": ["rd", "rs1", "shamt"],
             "immed_kind": "shamt5"},
            {"mnemonic": "LUI", "format": "U", "category": "upper", "opcode": 55,
             "funct3": null, "funct7": "", "operand_pattern": ["rd", "imm20"],
             "immed_kind": "imm20"}
        ]"#;
        let catalog = Catalog::from_json_str(json).unwrap();

        let srai = catalog.get("SRAI").unwrap();
        assert_eq!(srai.opcode, 0x13);
        assert_eq!(srai.funct3, Some(5));
        assert_eq!(srai.funct7, Some(0x20));
        assert_eq!(srai.immed_kind, ImmediateKind::Shamt5);

        let lui = catalog.get("LUI").unwrap();
        assert_eq!(lui.opcode, 0x37);
        assert_eq!(lui.funct3, None);
        assert_eq!(lui.funct7, None);
        assert_eq!(lui.immed_kind, ImmediateKind::Plain);
    }

    #[test]
    fn test_immediate_kind_names() {
        let kinds: Vec<ImmediateKind> =
            serde_json::from_str(r#"["shamt5", "none", "plain", "imm20", "csr"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![
                ImmediateKind::Shamt5,
                ImmediateKind::None,
                ImmediateKind::Plain,
                ImmediateKind::Plain,
                ImmediateKind::Plain,
            ]
        );
    }

    #[test]
    fn test_fallback_without_addi() {
        let json = r#"[{"mnemonic": "ADD", "format": "R", "category": "alu", "opcode": "0x33",
            "funct3": "0x0", "funct7": "0x0", "operand_pattern": ["rd", "rs1", "rs2"]}]"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(**catalog.fallback(), InstructionMetadata::addi());
        assert!(catalog.in_category(Category::Load).is_empty());
    }

    #[test]
    fn test_unknown_operand_role() {
        let json = r#"[{"mnemonic": "CSRRW", "format": "I", "category": "system",
            "opcode": "0x73", "funct3": "0x1", "operand_pattern": ["rd", "csr", "rs1"]}]"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        let csrrw = catalog.get("csrrw").unwrap();
        assert_eq!(
            csrrw.operand_pattern,
            vec![OperandRole::Rd, OperandRole::Unsupported, OperandRole::Rs1]
        );
    }

    #[test]
    fn test_rejects_duplicates_and_wide_fields() {
        let dup = r#"[
            {"mnemonic": "ADD", "format": "R", "category": "alu", "opcode": "0x33", "operand_pattern": []},
            {"mnemonic": "add", "format": "R", "category": "alu", "opcode": "0x33", "operand_pattern": []}
        ]"#;
        assert!(matches!(Catalog::from_json_str(dup), Err(CatalogError::DuplicateMnemonic(_))));

        let wide = r#"[{"mnemonic": "ADD", "format": "R", "category": "alu", "opcode": "0x33",
            "funct3": "0x8", "operand_pattern": []}]"#;
        assert!(matches!(
            Catalog::from_json_str(wide),
            Err(CatalogError::FieldWidth { field: "funct3", .. })
        ));

        assert!(matches!(Catalog::from_json_str("{"), Err(CatalogError::Parse(_))));
    }
}

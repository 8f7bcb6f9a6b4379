//! Property-based tests using proptest.
//!
//! Random seeds and lengths drive the whole generator; random operands drive the
//! encoder directly.

use proptest::prelude::*;
use riscv_fuzz::{
    decode_fields, encode, Catalog, GenerationConfig, Generator, Instruction, InstructionFormat,
};

// ── Strategies ──────────────────────────────────────────────────────────

fn arb_register() -> impl Strategy<Value = u8> {
    0u8..32
}

/// A mnemonic of the built-in catalog with a plain 12-bit immediate
fn arb_imm12_mnemonic() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "ADDI", "XORI", "ORI", "ANDI", "SLTI", "SLTIU", "JALR", "LB", "LH", "LW", "LBU", "LHU",
    ])
}

fn arb_branch_mnemonic() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["BEQ", "BNE", "BLT", "BGE", "BLTU", "BGEU"])
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn generation_is_deterministic(seed in any::<u64>(), length in 0usize..200) {
        let config = GenerationConfig::default();
        let first =
            Generator::with_seed(Catalog::rv32i(), config.clone(), seed).generate(length).unwrap();
        let second = Generator::with_seed(Catalog::rv32i(), config, seed).generate(length).unwrap();
        prop_assert_eq!(&first.hex, &second.hex);
        prop_assert_eq!(&first.assembly, &second.assembly);
        prop_assert_eq!(first.hex.len(), length);
        prop_assert_eq!(first.manifest.seed, seed);
    }

    #[test]
    fn backward_branches_never_exceed_cap(seed in any::<u64>(), depth in 0u32..6) {
        let mut config = GenerationConfig::default();
        config.loops.max_backward_depth = depth;
        let program = Generator::with_seed(Catalog::rv32i(), config, seed).generate(150).unwrap();
        prop_assert!(program.manifest.backward_branches <= depth);
    }

    #[test]
    fn imm12_words_decode_to_operands(
        mnemonic in arb_imm12_mnemonic(),
        rd in arb_register(),
        rs1 in arb_register(),
        imm in -2048i32..=2047,
    ) {
        let catalog = Catalog::rv32i();
        let meta = catalog.get(mnemonic).unwrap();
        let mut inst = Instruction::new(meta.clone());
        inst.rd = Some(rd);
        inst.rs1 = Some(rs1);
        inst.imm = Some(imm);

        let word = encode(&inst).unwrap();
        let fields = decode_fields(word, InstructionFormat::I, meta.immed_kind);
        prop_assert_eq!(fields.rd, Some(rd));
        prop_assert_eq!(fields.rs1, Some(rs1));
        prop_assert_eq!(fields.imm, Some(imm));
    }

    #[test]
    fn branch_offsets_decode_exactly(
        mnemonic in arb_branch_mnemonic(),
        rs1 in arb_register(),
        rs2 in arb_register(),
        halfwords in -2048i32..2048,
    ) {
        let catalog = Catalog::rv32i();
        let meta = catalog.get(mnemonic).unwrap();
        let mut inst = Instruction::new(meta.clone());
        inst.rs1 = Some(rs1);
        inst.rs2 = Some(rs2);
        inst.imm = Some(halfwords * 2);

        let word = encode(&inst).unwrap();
        let fields = decode_fields(word, InstructionFormat::B, meta.immed_kind);
        prop_assert_eq!(fields.imm, Some(halfwords * 2));
        prop_assert_eq!((fields.rs1, fields.rs2), (Some(rs1), Some(rs2)));
    }

    #[test]
    fn jump_offsets_decode_exactly(rd in arb_register(), halfwords in -(1i32 << 19)..(1i32 << 19)) {
        let catalog = Catalog::rv32i();
        let mut inst = Instruction::new(catalog.get("JAL").unwrap().clone());
        inst.rd = Some(rd);
        inst.imm = Some(halfwords * 2);

        let word = encode(&inst).unwrap();
        let fields = decode_fields(word, InstructionFormat::J, inst.meta.immed_kind);
        prop_assert_eq!(fields.imm, Some(halfwords * 2));
        prop_assert_eq!(fields.rd, Some(rd));
    }
}

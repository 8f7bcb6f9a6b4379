//! RV32I random instruction stream generator
//!
//! Produces weighted-random, hazard-dense RV32I programs for exercising a pipelined
//! core. Each program is available as assembly text and as raw 32-bit words.
//!
//! Some terminology used throughout the crate:
//!
//! - **Catalog**: one [`InstructionMetadata`] record per supported mnemonic, holding its
//!   format, opcode/funct fields and the ordered *operand pattern* (`rd, rs1, imm`, ...).
//! - **Weight class**: a key of the configuration's weight table (`alu_logic`, `load`,
//!   `branch`, ...). Each class maps to one or more catalog categories.
//! - **Instruction format**: how the fields are laid out in the 32-bit word. RV32I has
//!   R, I, S, B, U and J; see [`instruction::formats`].
//!
//! **Example**
//!
//! ```
//! use riscv_fuzz::{Catalog, GenerationConfig, Generator};
//!
//! let mut generator = Generator::with_seed(Catalog::rv32i(), GenerationConfig::default(), 42);
//! let program = generator.generate(16).unwrap();
//! assert_eq!(program.hex.len(), 16);
//! ```
//!
//! Generation runs in two passes. While instructions are synthesized, branches and
//! jumps only record the *index* they will land on. Once the full sequence exists the
//! targets are named `L<index>` and converted into byte offsets, which is why a label can
//! point forward.

pub mod catalog;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod generator;
pub mod hazard;
pub mod instruction;
pub mod manifest;
pub mod render;
pub mod resolver;
pub mod rng;
pub mod synth;

// Re-export the main types and functions
pub use catalog::{Catalog, Category, ImmediateKind, InstructionMetadata, OperandRole};
pub use config::GenerationConfig;
pub use decoder::{decode_fields, DecodedFields, FieldExtractor};
pub use encoder::{encode, NOP};
pub use error::*;
pub use generator::{GeneratedProgram, Generator};
pub use instruction::*;
pub use manifest::Manifest;
pub use resolver::LabelMap;
pub use rng::StimulusRng;

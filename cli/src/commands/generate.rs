use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use riscv_fuzz::{Catalog, GeneratedProgram, GenerationConfig, Generator};
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Options of the program generator
#[derive(clap::Args, Debug)]
pub struct Generate {
    /// Number of instructions to generate
    #[clap(short = 'n', long, default_value_t = 100)]
    num_instructions: usize,

    /// Prefix of the output files
    #[clap(short = 'o', long, default_value = "test")]
    output: String,

    /// Directory the output files are written to
    #[clap(long, default_value = "tests")]
    out_dir: PathBuf,

    /// Seed for reproducible output; drawn from system entropy when omitted
    #[clap(long, env = "RISCV_FUZZ_SEED")]
    seed: Option<u64>,

    /// Instruction catalog JSON; the built-in RV32I catalog when omitted
    #[clap(long)]
    metadata: Option<PathBuf>,

    /// Generation configuration JSON; built-in defaults when omitted
    #[clap(long)]
    config: Option<PathBuf>,
}

impl Generate {
    pub fn run(&self) -> Result<()> {
        let catalog = self.load_catalog()?;
        let config = self.load_config()?;

        let mut generator = match self.seed {
            Some(seed) => Generator::with_seed(catalog, config, seed),
            None => Generator::new(catalog, config),
        };
        let mut program = generator
            .generate(self.num_instructions)
            .context("Failed to generate instruction sequence")?;

        program.manifest.set_timestamp(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string());

        let written = write_outputs(&program, &self.out_dir, &self.output)?;
        for path in &written {
            info!("Wrote {}", path.display());
        }
        info!("Generation complete: {} instructions", self.num_instructions);

        Ok(())
    }

    fn load_catalog(&self) -> Result<Catalog> {
        let Some(path) = &self.metadata else {
            return Ok(Catalog::rv32i());
        };
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Catalog::from_json_str(&json)
            .with_context(|| format!("Invalid catalog {}", path.display()))
    }

    fn load_config(&self) -> Result<GenerationConfig> {
        let Some(path) = &self.config else {
            return Ok(GenerationConfig::default());
        };
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        GenerationConfig::from_json_str(&json)
            .with_context(|| format!("Invalid configuration {}", path.display()))
    }
}

/// Write `<prefix>.S`, `<prefix>.hex`, `<prefix>.bin` and `<prefix>_manifest.json`
pub fn write_outputs(program: &GeneratedProgram, dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let asm_path = dir.join(format!("{prefix}.S"));
    write_lines(&asm_path, &assembly_file(program))?;

    let hex_path = dir.join(format!("{prefix}.hex"));
    write_lines(&hex_path, &program.hex)?;

    let bin_path = dir.join(format!("{prefix}.bin"));
    write_lines(&bin_path, &program.binary())?;

    let manifest_path = dir.join(format!("{prefix}_manifest.json"));
    let manifest = serde_json::to_string_pretty(&program.manifest)
        .context("Failed to serialize manifest")?;
    fs::write(&manifest_path, manifest)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    Ok(vec![asm_path, hex_path, bin_path, manifest_path])
}

/// Complete assembly source: header comments, `_start` entry and the listing
fn assembly_file(program: &GeneratedProgram) -> Vec<String> {
    let manifest = &program.manifest;
    let mut lines = vec![
        "# Auto-generated RISC-V RV32I test".to_string(),
        format!("# Generated: {}", manifest.timestamp.as_deref().unwrap_or("unknown")),
        format!("# Seed: {}", manifest.seed),
        format!("# Instructions: {}", manifest.length),
        String::new(),
        ".text".to_string(),
        ".globl _start".to_string(),
        "_start:".to_string(),
    ];
    lines.extend(program.assembly.iter().cloned());
    lines.push(String::new());
    lines.push("# End of test".to_string());
    lines
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut file =
        fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    for line in lines {
        writeln!(file, "{line}").with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

use commands::Generate;

#[derive(Parser)]
#[command(name = "riscv-fuzz", version, about = "Generate random RV32I test programs")]
struct Cli {
    #[command(flatten)]
    generate: Generate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides the default `info` level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();

    cli.generate.run()
}

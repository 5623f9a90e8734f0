//! cmdgen - protocol command code generator
//!
//! Reads a YAML command schema and writes one `cmd_<category>.rs` file per
//! category with request builders, response accessors and enums.

use anyhow::Context;
use clap::Parser;
use cmdgen_cli::{GenerateOptions, GeneratorConfig, run};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "cmdgen")]
#[command(author, version, about = "Generate Rust command builders from a protocol schema", long_about = None)]
struct Cli {
    /// Path to the YAML command schema
    #[arg(default_value = "./commands.yaml")]
    input: PathBuf,

    /// Output directory for generated files
    #[arg(default_value = "../src/lr2021/cmd")]
    output_dir: PathBuf,

    /// Generator settings (TOML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Parse every generated file as Rust before writing
    #[arg(long)]
    verify: bool,

    /// Generate and report without writing files
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    println!("Loading schema: {}", cli.input.display());
    let summary = run(&GenerateOptions {
        input: cli.input,
        output_dir: cli.output_dir,
        config,
        verify: cli.verify,
        dry_run: cli.dry_run,
    })?;

    for (path, report) in summary.files.iter().zip(&summary.reports) {
        let verb = if cli.dry_run { "Would write" } else { "Generated" };
        println!(
            "✓ {verb} {} ({} functions, {} structs, {} enums)",
            path.display(),
            report.functions,
            report.structs,
            report.enums
        );
    }

    let skipped: Vec<&str> = summary.skipped_commands().collect();
    if !skipped.is_empty() {
        println!("Skipped (variable length parameters): {}", skipped.join(", "));
    }
    if summary.conflict_count() > 0 {
        println!("Enum conflicts: {} (first definition kept)", summary.conflict_count());
    }

    println!("Code generation completed successfully!");
    Ok(())
}

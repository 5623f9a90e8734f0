//! Whole-schema generation driver
//!
//! Loads the schema, renders every category in memory, optionally parses each
//! rendered file with `syn`, and only then creates the output directory and
//! writes the files. Loading, generation and verification errors leave the
//! output directory untouched; a write error can leave earlier files behind.

use crate::codegen::{CategoryOutput, CategoryReport, generate_category};
use crate::config::GeneratorConfig;
use anyhow::{Context, Result};
use cmdgen_schema::{Schema, load_schema};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Inputs of one generator run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub config: GeneratorConfig,
    /// Parse every generated file with `syn` before writing.
    pub verify: bool,
    /// Render and report, but write nothing.
    pub dry_run: bool,
}

/// What a run produced.
#[derive(Debug, Clone, Default)]
pub struct GenerateSummary {
    /// Files written, or that would have been written on a dry run.
    pub files: Vec<PathBuf>,
    pub reports: Vec<CategoryReport>,
}

impl GenerateSummary {
    pub fn skipped_commands(&self) -> impl Iterator<Item = &str> {
        self.reports
            .iter()
            .flat_map(|r| r.skipped.iter().map(String::as_str))
    }

    pub fn conflict_count(&self) -> usize {
        self.reports.iter().map(|r| r.conflicts.len()).sum()
    }
}

/// Render every category of `schema`, in schema order.
pub fn generate_all(schema: &Schema, config: &GeneratorConfig) -> Result<Vec<CategoryOutput>> {
    schema
        .categories
        .iter()
        .map(|category| {
            generate_category(category, config)
                .with_context(|| format!("Failed to generate category '{}'", category.name))
        })
        .collect()
}

/// Check that a generated file parses as Rust.
pub fn verify(output: &CategoryOutput) -> Result<()> {
    syn::parse_file(&output.content)
        .with_context(|| format!("Generated {} is not valid Rust", output.file_name))?;
    Ok(())
}

/// Run the generator end to end.
pub fn run(options: &GenerateOptions) -> Result<GenerateSummary> {
    options.config.validate()?;

    info!(input = %options.input.display(), "loading schema");
    let schema = load_schema(&options.input)
        .with_context(|| format!("Failed to load schema: {}", options.input.display()))?;
    debug!(
        categories = schema.categories.len(),
        commands = schema.command_count(),
        "schema loaded"
    );

    let outputs = generate_all(&schema, &options.config)?;

    if options.verify {
        for output in &outputs {
            verify(output)?;
            debug!(file = %output.file_name, "verified");
        }
    }

    if !options.dry_run {
        fs::create_dir_all(&options.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                options.output_dir.display()
            )
        })?;
    }

    let mut summary = GenerateSummary::default();
    for output in outputs {
        let path = options.output_dir.join(&output.file_name);
        if !options.dry_run {
            fs::write(&path, &output.content)
                .with_context(|| format!("Failed to write generated file: {}", path.display()))?;
            info!(path = %path.display(), "wrote category file");
        }
        summary.files.push(path);
        summary.reports.push(output.report);
    }

    Ok(summary)
}

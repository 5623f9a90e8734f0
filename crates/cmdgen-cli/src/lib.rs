//! cmdgen - Command/response protocol code generator
//!
//! Turns a YAML protocol schema (see [`cmdgen_schema`]) into one Rust source
//! file per command category:
//! - [`codegen`] renders enums, request builders and response structs
//! - [`config`] holds the project-specific names and override tables
//! - [`generate`] drives a whole run: load, generate, verify, write

pub mod codegen;
pub mod config;
pub mod generate;

pub use codegen::{CategoryOutput, CategoryReport, CodegenError, generate_category};
pub use config::{ConfigError, GeneratorConfig};
pub use generate::{GenerateOptions, GenerateSummary, run};

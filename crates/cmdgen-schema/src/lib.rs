//! cmdgen-schema - Protocol command schema model and bit layout rules
//!
//! This crate provides the data side of the command generator:
//! - [`Schema`], [`Category`], [`Command`], [`Field`] and [`BytePosition`] model types
//! - [`load_schema`] / [`parse_schema`] to build a validated model from YAML
//! - [`layout`] for the pack/unpack plans shared by every code generator
//! - [`SchemaError`] for load and validation failures

pub mod layout;
mod error;
mod loader;
mod model;

pub use error::{Location, SchemaError, SchemaResult, Section, Violation};
pub use loader::{load_schema, parse_command, parse_schema};
pub use model::{BytePosition, Category, Command, EnumVariant, Field, Schema, Variant};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BytePosition, Category, Command, EnumVariant, Field, Schema, SchemaError, SchemaResult,
        Variant, load_schema, parse_schema,
    };
}

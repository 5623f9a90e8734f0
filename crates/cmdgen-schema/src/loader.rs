//! YAML schema document -> validated protocol model.
//!
//! The document shape is `categories -> <category> -> commands -> <Command>`.
//! Mappings keep their declaration order, which drives the order of the
//! generated code. Loading stops at the first invalid entry.

use crate::error::{Location, SchemaError, SchemaResult, Section, Violation};
use crate::layout::OPCODE_LEN;
use crate::model::{BytePosition, Category, Command, EnumVariant, Field, Schema};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    categories: Option<Mapping>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default)]
    commands: Option<Mapping>,
}

#[derive(Debug, Deserialize)]
struct RawCommand {
    opcode: Option<i64>,
    description: Option<String>,
    #[serde(default)]
    parameters: Option<Vec<Value>>,
    #[serde(default)]
    status_fields: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: Option<String>,
    bit_width: Option<i64>,
    description: Option<String>,
    #[serde(default)]
    byte_positions: Option<Vec<Value>>,
    #[serde(default)]
    signed: bool,
    #[serde(default)]
    optional: bool,
    #[serde(default, rename = "enum")]
    variants: Option<Mapping>,
}

/// Load and validate a schema file.
pub fn load_schema(path: &Path) -> SchemaResult<Schema> {
    let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_schema(&text)
}

/// Parse and validate a schema document.
pub fn parse_schema(text: &str) -> SchemaResult<Schema> {
    let doc: RawDocument = serde_yaml::from_str(text)?;

    let mut categories = Vec::new();
    for (key, value) in doc.categories.unwrap_or_default() {
        let name = key_to_string(&key);
        let category = parse_category(&name, value).map_err(|e| e.in_category(&name))?;
        debug!(
            category = %category.name,
            commands = category.commands.len(),
            "loaded category"
        );
        categories.push(category);
    }

    Ok(Schema { categories })
}

fn parse_category(name: &str, value: Value) -> SchemaResult<Category> {
    if value.is_null() {
        return Ok(Category::new(name, Vec::new()));
    }
    let raw: RawCategory =
        serde_yaml::from_value(value).map_err(|source| SchemaError::Malformed {
            location: Location::default(),
            source,
        })?;

    let commands = raw
        .commands
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| parse_command(&key_to_string(&key), &value))
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(Category::new(name, commands))
}

/// Parse one command entry, validating every field it declares.
pub fn parse_command(name: &str, value: &Value) -> SchemaResult<Command> {
    let location = Location::for_command(name);
    let raw: RawCommand =
        serde_yaml::from_value(value.clone()).map_err(|source| SchemaError::Malformed {
            location: location.clone(),
            source,
        })?;

    let opcode = raw.opcode.ok_or_else(|| {
        SchemaError::invalid(location.clone(), Violation::MissingProperty("opcode"))
    })?;
    let opcode = u16::try_from(opcode).map_err(|_| {
        SchemaError::invalid(location.clone(), Violation::OpcodeOutOfRange(opcode))
    })?;
    let description = raw.description.ok_or_else(|| {
        SchemaError::invalid(location.clone(), Violation::MissingProperty("description"))
    })?;

    let mut command = Command::new(name, opcode).with_description(description);

    for entry in raw.parameters.unwrap_or_default() {
        let field = parse_field(&entry, &location, Section::Parameter)?;
        if let Some(index) = field.min_byte_index().filter(|&i| i < OPCODE_LEN) {
            return Err(SchemaError::invalid(
                location.at_field(Section::Parameter, Some(&field.name)),
                Violation::OverlapsOpcode(index),
            ));
        }
        command.parameters.push(field);
    }
    for entry in raw.status_fields.unwrap_or_default() {
        let field = parse_field(&entry, &location, Section::StatusField)?;
        command.status_fields.push(field);
    }

    Ok(command)
}

fn parse_field(entry: &Value, command: &Location, section: Section) -> SchemaResult<Field> {
    let unnamed = command.at_field(section, entry.get("name").and_then(Value::as_str));
    let raw: RawField =
        serde_yaml::from_value(entry.clone()).map_err(|source| SchemaError::Malformed {
            location: unnamed.clone(),
            source,
        })?;

    let name = raw
        .name
        .ok_or_else(|| SchemaError::invalid(unnamed.clone(), Violation::MissingProperty("name")))?;
    let location = command.at_field(section, Some(&name));
    let fail = |violation| SchemaError::invalid(location.clone(), violation);

    let bit_width = raw
        .bit_width
        .ok_or_else(|| fail(Violation::MissingProperty("bit_width")))?;
    if bit_width < 0 {
        return Err(fail(Violation::NegativeBitWidth(bit_width)));
    }
    let bit_width = u32::try_from(bit_width)
        .map_err(|_| fail(Violation::BitWidthTooLarge(bit_width.unsigned_abs())))?;
    let description = raw
        .description
        .ok_or_else(|| fail(Violation::MissingProperty("description")))?;

    let byte_positions = raw
        .byte_positions
        .unwrap_or_default()
        .iter()
        .map(parse_byte_position)
        .collect::<Result<Vec<_>, _>>()
        .map_err(&fail)?;

    let variants = match raw.variants {
        Some(mapping) => parse_variants(mapping).map_err(&fail)?,
        None => Vec::new(),
    };

    let field = Field::new(name, bit_width, byte_positions)
        .map_err(&fail)?
        .with_signed(raw.signed)
        .with_optional(raw.optional)
        .with_description(description)
        .with_variants(variants);

    Ok(field)
}

/// Parse a `[byte_index, bit_range]` pair.
fn parse_byte_position(value: &Value) -> Result<BytePosition, Violation> {
    let malformed = || Violation::MalformedBytePosition(render(value));

    let pair = value.as_sequence().ok_or_else(malformed)?;
    let [index, range] = pair.as_slice() else {
        return Err(malformed());
    };
    let byte_index = index
        .as_u64()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(malformed)?;

    match range {
        Value::String(range) => BytePosition::parse(byte_index, range),
        Value::Number(bit) => BytePosition::parse(byte_index, &bit.to_string()),
        _ => Err(malformed()),
    }
}

fn parse_variants(mapping: Mapping) -> Result<Vec<EnumVariant>, Violation> {
    mapping
        .into_iter()
        .map(|(key, value)| {
            let name = key_to_string(&key);
            match value.as_i64() {
                Some(value) => Ok(EnumVariant::new(name, value)),
                None => Err(Violation::InvalidEnumValue { variant: name }),
            }
        })
        .collect()
}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => render(other),
    }
}

fn render(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{value:?}"))
}

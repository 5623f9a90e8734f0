//! Error types for schema loading and validation

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Error type for schema loading
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema file could not be read
    #[error("failed to read schema {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML
    #[error("failed to parse schema document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An entry has the wrong shape (e.g. a string where a number is expected)
    #[error("{location}: malformed entry: {source}")]
    Malformed {
        location: Location,
        #[source]
        source: serde_yaml::Error,
    },

    /// An entry parsed but breaks a model invariant
    #[error("{location}: {violation}")]
    Invalid {
        location: Location,
        violation: Violation,
    },
}

impl SchemaError {
    pub(crate) fn invalid(location: Location, violation: Violation) -> Self {
        SchemaError::Invalid {
            location,
            violation,
        }
    }

    /// Attach the category name to the error location.
    pub fn in_category(self, category: &str) -> Self {
        match self {
            SchemaError::Invalid {
                location,
                violation,
            } => SchemaError::Invalid {
                location: location.with_category(category),
                violation,
            },
            SchemaError::Malformed { location, source } => SchemaError::Malformed {
                location: location.with_category(category),
                source,
            },
            other => other,
        }
    }

    /// The violated invariant, if this is a validation error.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            SchemaError::Invalid { violation, .. } => Some(violation),
            _ => None,
        }
    }

    /// Where in the document the error was found, if known.
    pub fn location(&self) -> Option<&Location> {
        match self {
            SchemaError::Invalid { location, .. } | SchemaError::Malformed { location, .. } => {
                Some(location)
            }
            _ => None,
        }
    }
}

/// Which list of a command a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Parameter,
    StatusField,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Parameter => write!(f, "parameter"),
            Section::StatusField => write!(f, "status_field"),
        }
    }
}

/// Position of an entry inside the schema document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub category: Option<String>,
    pub command: Option<String>,
    pub section: Option<Section>,
    pub field: Option<String>,
}

impl Location {
    /// Location of a whole command.
    pub fn for_command(name: &str) -> Self {
        Self {
            command: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Narrow the location to a field of the command.
    pub fn at_field(&self, section: Section, name: Option<&str>) -> Self {
        Self {
            section: Some(section),
            field: name.map(str::to_string),
            ..self.clone()
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(category) = &self.category {
            parts.push(format!("category '{category}'"));
        }
        if let Some(command) = &self.command {
            parts.push(format!("command '{command}'"));
        }
        match (&self.section, &self.field) {
            (Some(section), Some(field)) => parts.push(format!("{section} '{field}'")),
            (Some(section), None) => parts.push(section.to_string()),
            _ => {}
        }
        if parts.is_empty() {
            write!(f, "schema")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

/// A broken schema invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("missing required property '{0}'")]
    MissingProperty(&'static str),

    #[error("bit_width cannot be negative (got {0})")]
    NegativeBitWidth(i64),

    #[error("bit_width {0} is larger than 64 bits")]
    BitWidthTooLarge(u64),

    #[error("bit_width ({declared}) doesn't match byte_positions total ({actual})")]
    WidthMismatch { declared: u32, actual: u32 },

    #[error("invalid bit range '{range}' (MSB < LSB)")]
    InvertedBitRange { range: String },

    #[error("bit index {bit} is outside of a byte")]
    BitOutOfByte { bit: u32 },

    #[error("malformed bit range '{0}'")]
    MalformedBitRange(String),

    #[error("invalid byte position format: {0}")]
    MalformedBytePosition(String),

    #[error("variable length field should not have byte_positions")]
    VariableLengthWithPositions,

    #[error("opcode {0:#x} does not fit in 16 bits")]
    OpcodeOutOfRange(i64),

    #[error("enum variant '{variant}' must have an integer value")]
    InvalidEnumValue { variant: String },

    #[error("byte {0} overlaps the opcode")]
    OverlapsOpcode(usize),
}

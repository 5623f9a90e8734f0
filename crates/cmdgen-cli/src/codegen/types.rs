//! Rust type selection for schema fields.

use super::naming::enum_type_name;
use cmdgen_schema::Field;
use cmdgen_schema::layout::storage_bits;
use std::collections::BTreeMap;
use std::fmt;

/// The Rust type a field is exposed as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    /// A generated (or shared) enum.
    Enum(String),
    /// Variable-length placeholder, never packed.
    Bytes,
    Bool,
    Int { bits: u32, signed: bool },
}

impl RustType {
    /// Pick the type for `field`. `remap` redirects enum names to shared types.
    pub fn for_field(field: &Field, remap: &BTreeMap<String, String>) -> Self {
        if field.is_enum() {
            RustType::Enum(enum_type_name(&field.name, remap))
        } else if field.is_variable_length() {
            RustType::Bytes
        } else if field.bit_width == 1 {
            RustType::Bool
        } else {
            RustType::int(field.bit_width, field.signed)
        }
    }

    /// Smallest integer holding `bit_width` bits.
    pub fn int(bit_width: u32, signed: bool) -> Self {
        RustType::Int {
            bits: storage_bits(bit_width),
            signed,
        }
    }

    /// Unsigned integer used to accumulate the raw bits of `field`.
    pub fn raw(field: &Field) -> Self {
        RustType::int(field.bit_width, false)
    }

    pub fn is_u8(&self) -> bool {
        matches!(
            self,
            RustType::Int {
                bits: 8,
                signed: false
            }
        )
    }
}

impl fmt::Display for RustType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RustType::Enum(name) => f.write_str(name),
            RustType::Bytes => f.write_str("&[u8]"),
            RustType::Bool => f.write_str("bool"),
            RustType::Int { bits, signed } => {
                write!(f, "{}{bits}", if *signed { 'i' } else { 'u' })
            }
        }
    }
}

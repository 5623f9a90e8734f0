//! Code generation from a protocol command schema.
//!
//! This module renders the Rust API of one command category: enums for
//! enumerated fields, a request builder per command and a response struct per
//! command that has status fields.
//!
//! # Architecture
//!
//! The generator works on the validated model from [`cmdgen_schema`]:
//!
//! ```text
//! commands.yaml
//!     ↓
//!  [Loader]
//!     ↓
//!   Schema (Category → Command → Field)
//!     ↓
//!  [Bit layout plans]
//!     ↓
//!  ├─→ [Enum Emitter]      → pub enum ...
//!  ├─→ [Request Generator] → pub fn ..._req / ..._cmd
//!  └─→ [Response Generator] → pub struct ...Rsp
//!     ↓
//!  [File Emitter] → cmd_<category>.rs
//! ```
//!
//! Every bit operation is derived from the plans in [`cmdgen_schema::layout`],
//! the same plans whose evaluators are exercised by the schema crate tests.
//!
//! # Generated code
//!
//! For a parameter `temp` with `bit_width: 12` at `[[2, "7:4"], [3, "7:0"]]`:
//!
//! ```text
//! cmd[2] |= (((temp >> 8) & 0xF) << 4) as u8;
//! cmd[3] |= temp as u8;
//! ```
//!
//! and for a signed status field at `[[3, "7:4"], [4, "7:0"]]`:
//!
//! ```text
//! let raw = self.0[4] as u16 |
//!     ((self.0[3] >> 4) as u16) << 8;
//! if (self.0[3] & 0x80) != 0 { raw.wrapping_sub(0x1000) as i16 } else { raw as i16 }
//! ```
//!
//! # See Also
//!
//! - [`naming`] for identifier conventions
//! - [`overrides`] for the per-command special cases
//! - [`file`] for the layout of a generated file

pub mod enums;
pub mod expr;
pub mod file;
pub mod naming;
pub mod overrides;
pub mod request;
pub mod response;
pub mod types;

pub use enums::{EnumConflict, EnumRegistry, Registration};
pub use file::{CategoryOutput, CategoryReport, generate_category};
pub use request::{generate_request, request_fn_name};
pub use response::{generate_response, response_struct_name};
pub use types::RustType;

use thiserror::Error;

/// Errors raised while rendering code for a valid schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// A parameter writes past the end of the request buffer.
    ///
    /// The request holds two opcode bytes plus the whole bytes of each
    /// parameter, so a lone parameter must start at byte 2. A 12-bit value
    /// at `[[3, "7:4"], [4, "7:0"]]` gets a 4-byte request and fails here;
    /// the run stops rather than emit code indexing out of bounds.
    #[error(
        "{function}: parameter '{field}' writes byte {byte_index} but the request holds {len} bytes"
    )]
    PositionOutOfBuffer {
        function: String,
        field: String,
        byte_index: usize,
        len: usize,
    },

    /// A saturating constructor names a variant the enum does not declare
    #[error("saturating enum {enum_name}: unknown variant '{variant}'")]
    UnknownSaturatingVariant { enum_name: String, variant: String },

    /// A saturating constructor variant has a code that is not a byte
    #[error("saturating enum {enum_name}: variant '{variant}' value {value} does not fit in u8")]
    SaturatingValueOutOfRange {
        enum_name: String,
        variant: String,
        value: i64,
    },
}

/// Append `text` as `///` doc lines at `indent`.
pub(crate) fn push_doc(code: &mut String, indent: &str, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            code.push_str(&format!("{indent}///\n"));
        } else {
            code.push_str(&format!("{indent}/// {line}\n"));
        }
    }
}

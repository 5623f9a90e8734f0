//! Per-command exceptions to the generic pack/unpack rules.
//!
//! Each table is keyed by schema names: `(command, field)` for requests and
//! accessors, `command` for display formatting. Anything not listed here goes
//! through the generic generators.

/// Replacement for the generic packing of one request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOverride {
    /// Always set `mask` in byte `byte_index` and drop the parameter from the signature.
    ForceBits {
        byte_index: usize,
        mask: u8,
        note: &'static str,
    },
}

/// Replacement for the generic accessor of one status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorOverride {
    /// Hand the field's bytes to the configured interrupt decoder.
    InterruptFlags,
    /// Build the field's enum with its saturating `new(val: u8)` constructor.
    SaturatingEnum,
}

/// `defmt::Format` implementation for a response struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOverride {
    pub format: &'static str,
    pub args: &'static [&'static str],
}

const REQUEST_OVERRIDES: &[((&str, &str), RequestOverride)] = &[(
    ("GetTemp", "temp_format"),
    RequestOverride::ForceBits {
        byte_index: 2,
        mask: 0x08,
        note: "Force format to Celsius",
    },
)];

const ACCESSOR_OVERRIDES: &[((&str, &str), AccessorOverride)] = &[
    (("GetStatus", "intr"), AccessorOverride::InterruptFlags),
    (
        ("GetZwavePacketStatus", "last_detect"),
        AccessorOverride::SaturatingEnum,
    ),
];

const DISPLAY_OVERRIDES: &[(&str, DisplayOverride)] = &[
    (
        "GetTemp",
        DisplayOverride {
            format: "{}.{:02}",
            args: &["self.0[2] as i8", "(self.0[3] as u16 * 100) >> 8"],
        },
    ),
    (
        "GetVersion",
        DisplayOverride {
            format: "{:02x}.{:02x}",
            args: &["self.major()", "self.minor()"],
        },
    ),
];

pub fn request_override(command: &str, field: &str) -> Option<RequestOverride> {
    REQUEST_OVERRIDES
        .iter()
        .find(|((c, f), _)| *c == command && *f == field)
        .map(|(_, o)| *o)
}

pub fn accessor_override(command: &str, field: &str) -> Option<AccessorOverride> {
    ACCESSOR_OVERRIDES
        .iter()
        .find(|((c, f), _)| *c == command && *f == field)
        .map(|(_, o)| *o)
}

pub fn display_override(command: &str) -> Option<DisplayOverride> {
    DISPLAY_OVERRIDES
        .iter()
        .find(|(c, _)| *c == command)
        .map(|(_, o)| *o)
}

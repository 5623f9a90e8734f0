//! Protocol model: byte positions, fields, commands and categories.
//!
//! The model is built once per generation run by the loader and is read-only
//! afterwards. Constructors validate their invariants, so a [`Field`] obtained
//! from [`Field::new`] always has consistent widths.

use crate::error::Violation;
use std::fmt;

/// Bits `msb..=lsb` of one byte of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BytePosition {
    byte_index: usize,
    msb: u8,
    lsb: u8,
}

impl BytePosition {
    /// Create a position covering bits `msb..=lsb` of byte `byte_index`.
    pub fn new(byte_index: usize, msb: u8, lsb: u8) -> Result<Self, Violation> {
        if msb < lsb {
            return Err(Violation::InvertedBitRange {
                range: format!("{msb}:{lsb}"),
            });
        }
        if msb > 7 {
            return Err(Violation::BitOutOfByte { bit: msb.into() });
        }
        Ok(Self {
            byte_index,
            msb,
            lsb,
        })
    }

    /// Create a position covering a single bit.
    pub fn bit(byte_index: usize, bit: u8) -> Result<Self, Violation> {
        Self::new(byte_index, bit, bit)
    }

    /// Parse a bit range written as `"msb:lsb"` or as a single bit index.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdgen_schema::BytePosition;
    ///
    /// let pos = BytePosition::parse(3, "7:4").unwrap();
    /// assert_eq!((pos.msb(), pos.lsb()), (7, 4));
    /// assert_eq!(pos.width(), 4);
    ///
    /// let bit = BytePosition::parse(2, "3").unwrap();
    /// assert_eq!(bit.width(), 1);
    /// ```
    pub fn parse(byte_index: usize, range: &str) -> Result<Self, Violation> {
        let (msb, lsb) = match range.split_once(':') {
            Some((msb, lsb)) => (parse_bit(msb, range)?, parse_bit(lsb, range)?),
            None => {
                let bit = parse_bit(range, range)?;
                (bit, bit)
            }
        };
        if msb < lsb {
            return Err(Violation::InvertedBitRange {
                range: range.to_string(),
            });
        }
        let msb = u8::try_from(msb).map_err(|_| Violation::BitOutOfByte { bit: msb })?;
        let lsb = u8::try_from(lsb).map_err(|_| Violation::BitOutOfByte { bit: lsb })?;
        Self::new(byte_index, msb, lsb)
    }

    pub fn byte_index(&self) -> usize {
        self.byte_index
    }

    pub fn msb(&self) -> u8 {
        self.msb
    }

    pub fn lsb(&self) -> u8 {
        self.lsb
    }

    /// Number of bits covered.
    pub fn width(&self) -> u32 {
        u32::from(self.msb - self.lsb) + 1
    }

    /// True when the position covers bits `7:0`.
    pub fn fills_byte(&self) -> bool {
        self.msb == 7 && self.lsb == 0
    }

    /// Right-aligned mask covering [`width`](Self::width) bits.
    pub fn mask(&self) -> u8 {
        ((1u16 << self.width()) - 1) as u8
    }
}

impl fmt::Display for BytePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.msb == self.lsb {
            write!(f, "[{}, {}]", self.byte_index, self.msb)
        } else {
            write!(f, "[{}, {}:{}]", self.byte_index, self.msb, self.lsb)
        }
    }
}

fn parse_bit(text: &str, range: &str) -> Result<u32, Violation> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| Violation::MalformedBitRange(range.to_string()))
}

/// A named value of an enumerated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub value: i64,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A request parameter or response status field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name as written in the schema.
    pub name: String,

    /// Total width in bits. Zero marks a variable-length field.
    pub bit_width: u32,

    /// Whether the value is two's complement.
    pub signed: bool,

    /// Segments holding the value, most-significant segment first.
    pub byte_positions: Vec<BytePosition>,

    /// Free-form description, used for doc comments.
    pub description: String,

    /// Optional fields only appear in the advanced variant.
    pub optional: bool,

    /// Named values, in declaration order, when the field is enumerated.
    pub variants: Option<Vec<EnumVariant>>,
}

impl Field {
    /// Create a field and check its width invariants.
    pub fn new(
        name: impl Into<String>,
        bit_width: u32,
        byte_positions: Vec<BytePosition>,
    ) -> Result<Self, Violation> {
        let field = Self {
            name: name.into(),
            bit_width,
            signed: false,
            byte_positions,
            description: String::new(),
            optional: false,
            variants: None,
        };
        field.validate()?;
        Ok(field)
    }

    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach enumerated values. An empty list leaves the field plain.
    pub fn with_variants(mut self, variants: Vec<EnumVariant>) -> Self {
        self.variants = if variants.is_empty() {
            None
        } else {
            Some(variants)
        };
        self
    }

    /// Check that the declared width matches the byte positions.
    pub fn validate(&self) -> Result<(), Violation> {
        if self.bit_width > 64 {
            return Err(Violation::BitWidthTooLarge(self.bit_width.into()));
        }
        if self.bit_width == 0 {
            if !self.byte_positions.is_empty() {
                return Err(Violation::VariableLengthWithPositions);
            }
            return Ok(());
        }
        let actual: u32 = self.byte_positions.iter().map(BytePosition::width).sum();
        if actual != self.bit_width {
            return Err(Violation::WidthMismatch {
                declared: self.bit_width,
                actual,
            });
        }
        Ok(())
    }

    pub fn is_variable_length(&self) -> bool {
        self.bit_width == 0
    }

    pub fn is_enum(&self) -> bool {
        self.variants.is_some()
    }

    /// A single bit without named values, handled as a boolean.
    pub fn is_flag(&self) -> bool {
        self.bit_width == 1 && !self.is_enum()
    }

    /// Bytes reserved for this field in a request buffer.
    pub fn byte_len(&self) -> usize {
        self.bit_width.div_ceil(8) as usize
    }

    /// Exactly one position and at most one byte wide.
    pub fn is_single_segment(&self) -> bool {
        self.byte_positions.len() == 1 && self.bit_width <= 8
    }

    pub fn max_byte_index(&self) -> Option<usize> {
        self.byte_positions.iter().map(BytePosition::byte_index).max()
    }

    pub fn min_byte_index(&self) -> Option<usize> {
        self.byte_positions.iter().map(BytePosition::byte_index).min()
    }
}

/// Which generated entry point a field list is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Optional fields elided.
    Base,
    /// Every field included.
    Advanced,
}

impl Variant {
    pub fn is_advanced(&self) -> bool {
        matches!(self, Variant::Advanced)
    }

    /// Whether `field` takes part in this variant.
    pub fn includes(&self, field: &Field) -> bool {
        self.is_advanced() || !field.optional
    }
}

/// A protocol command: an opcode, its request parameters and response fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub opcode: u16,
    pub description: String,
    pub parameters: Vec<Field>,
    pub status_fields: Vec<Field>,
}

impl Command {
    pub fn new(name: impl Into<String>, opcode: u16) -> Self {
        Self {
            name: name.into(),
            opcode,
            description: String::new(),
            parameters: Vec::new(),
            status_fields: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameter(mut self, field: Field) -> Self {
        self.parameters.push(field);
        self
    }

    pub fn with_status_field(mut self, field: Field) -> Self {
        self.status_fields.push(field);
        self
    }

    /// Opcode as transmitted: high byte first.
    pub fn opcode_bytes(&self) -> [u8; 2] {
        self.opcode.to_be_bytes()
    }

    /// Commands without status fields are fire-and-forget.
    pub fn has_response(&self) -> bool {
        !self.status_fields.is_empty()
    }

    pub fn has_optional_parameters(&self) -> bool {
        self.parameters.iter().any(|p| p.optional)
    }

    pub fn has_optional_status_fields(&self) -> bool {
        self.status_fields.iter().any(|f| f.optional)
    }

    pub fn variable_length_parameters(&self) -> impl Iterator<Item = &Field> {
        self.parameters.iter().filter(|p| p.is_variable_length())
    }

    /// A command with any variable-length parameter is not generated at all.
    pub fn is_skipped(&self) -> bool {
        self.variable_length_parameters().next().is_some()
    }

    pub fn parameters_for(&self, variant: Variant) -> Vec<&Field> {
        self.parameters
            .iter()
            .filter(|p| variant.includes(p))
            .collect()
    }

    pub fn status_fields_for(&self, variant: Variant) -> Vec<&Field> {
        self.status_fields
            .iter()
            .filter(|f| variant.includes(f))
            .collect()
    }

    /// Request variants to generate: always base, advanced when a parameter is optional.
    pub fn request_variants(&self) -> Vec<Variant> {
        if self.has_optional_parameters() {
            vec![Variant::Base, Variant::Advanced]
        } else {
            vec![Variant::Base]
        }
    }

    /// Response variants to generate; empty for fire-and-forget commands.
    pub fn response_variants(&self) -> Vec<Variant> {
        match (self.has_response(), self.has_optional_status_fields()) {
            (false, _) => Vec::new(),
            (true, false) => vec![Variant::Base],
            (true, true) => vec![Variant::Base, Variant::Advanced],
        }
    }
}

/// A group of commands emitted into one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub commands: Vec<Command>,
}

impl Category {
    pub fn new(name: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            name: name.into(),
            commands,
        }
    }

    /// Whether any generated command has a response struct.
    pub fn has_responses(&self) -> bool {
        self.commands
            .iter()
            .any(|c| c.has_response() && !c.is_skipped())
    }
}

/// A whole schema document, categories in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub categories: Vec<Category>,
}

impl Schema {
    pub fn command_count(&self) -> usize {
        self.categories.iter().map(|c| c.commands.len()).sum()
    }
}

#[cfg(test)]
#[path = "model/model_tests.rs"]
mod model_tests;

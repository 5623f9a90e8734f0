//! Bit layout plans shared by request packing and response unpacking.
//!
//! A plan lists the per-byte operations that move a field value into or out
//! of a buffer. Code generators render plans as Rust expressions; the
//! evaluators here ([`pack_into`], [`unpack_raw`], [`decode_signed`]) apply
//! the very same plans to real buffers, which keeps the mask and shift rules
//! testable without compiling generated code.
//!
//! # Rules
//!
//! Packing walks byte positions in declaration order (most-significant
//! segment first):
//!
//! ```text
//! buf[byte] |= ((value >> value_shift) & mask) << lsb
//! ```
//!
//! Unpacking walks them in reverse (least-significant segment first):
//!
//! ```text
//! raw |= ((buf[byte] >> lsb) & mask) << acc_shift
//! ```

use crate::model::Field;

/// Bytes taken by the opcode at the start of every request.
pub const OPCODE_LEN: usize = 2;

/// Bytes taken by the generic status at the start of every response.
pub const STATUS_LEN: usize = 2;

/// One segment of a request value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackStep {
    pub byte_index: usize,
    pub lsb: u8,
    pub width: u32,
    /// Right shift selecting this segment out of the full value.
    pub value_shift: u32,
}

impl PackStep {
    pub fn mask(&self) -> u8 {
        segment_mask(self.width)
    }

    /// A full-byte segment needs no mask once truncated to `u8`.
    pub fn needs_mask(&self) -> bool {
        self.width < 8
    }
}

/// One segment of a response value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackStep {
    pub byte_index: usize,
    pub msb: u8,
    pub lsb: u8,
    pub width: u32,
    /// Left shift placing this segment in the accumulated value.
    pub acc_shift: u32,
}

impl UnpackStep {
    pub fn mask(&self) -> u8 {
        segment_mask(self.width)
    }

    /// When the segment reaches bit 7 the right shift already clears the upper bits.
    pub fn needs_mask(&self) -> bool {
        self.msb != 7
    }
}

/// How a signed value is recovered from its raw unsigned bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignExtension {
    /// The field is exactly as wide as its storage type.
    Reinterpret,
    /// Subtract `1 << width` when bit `bit` of byte `byte_index` is set.
    TopBit {
        byte_index: usize,
        bit: u8,
        width: u32,
    },
}

/// Width in bits of the smallest integer holding `bit_width` bits.
pub fn storage_bits(bit_width: u32) -> u32 {
    match bit_width {
        0..=8 => 8,
        9..=16 => 16,
        17..=32 => 32,
        _ => 64,
    }
}

fn segment_mask(width: u32) -> u8 {
    ((1u16 << width.min(8)) - 1) as u8
}

/// Segments of `field` in packing order.
pub fn pack_plan(field: &Field) -> Vec<PackStep> {
    let mut consumed = 0;
    field
        .byte_positions
        .iter()
        .map(|pos| {
            consumed += pos.width();
            PackStep {
                byte_index: pos.byte_index(),
                lsb: pos.lsb(),
                width: pos.width(),
                value_shift: field.bit_width.saturating_sub(consumed),
            }
        })
        .collect()
}

/// Segments of `field` in unpacking order (least-significant first).
pub fn unpack_plan(field: &Field) -> Vec<UnpackStep> {
    let mut acc_shift = 0;
    field
        .byte_positions
        .iter()
        .rev()
        .map(|pos| {
            let step = UnpackStep {
                byte_index: pos.byte_index(),
                msb: pos.msb(),
                lsb: pos.lsb(),
                width: pos.width(),
                acc_shift,
            };
            acc_shift += pos.width();
            step
        })
        .collect()
}

/// Sign handling for `field`, or `None` when it decodes as unsigned.
///
/// The sign bit is read from the first declared position: schemas list
/// segments most-significant first.
pub fn sign_extension(field: &Field) -> Option<SignExtension> {
    if !field.signed || field.bit_width <= 1 || field.is_enum() {
        return None;
    }
    if field.bit_width == storage_bits(field.bit_width) {
        return Some(SignExtension::Reinterpret);
    }
    let first = field.byte_positions.first()?;
    Some(SignExtension::TopBit {
        byte_index: first.byte_index(),
        bit: first.msb(),
        width: field.bit_width,
    })
}

/// Request size: opcode plus whole bytes for every fixed-width parameter.
pub fn request_len<'a>(parameters: impl IntoIterator<Item = &'a Field>) -> usize {
    OPCODE_LEN
        + parameters
            .into_iter()
            .filter(|p| !p.is_variable_length())
            .map(Field::byte_len)
            .sum::<usize>()
}

/// Response size: up to the highest byte read, never below the status bytes.
pub fn response_len<'a>(fields: impl IntoIterator<Item = &'a Field>) -> usize {
    fields
        .into_iter()
        .flat_map(|f| f.byte_positions.iter())
        .map(|pos| pos.byte_index())
        .fold(STATUS_LEN - 1, usize::max)
        + 1
}

/// OR `value` into `buf` following the packing plan of `field`.
///
/// Signed values are passed as their two's complement bits (`v as u64`).
///
/// # Panics
///
/// Panics if a position lies beyond `buf`.
pub fn pack_into(field: &Field, value: u64, buf: &mut [u8]) {
    for step in pack_plan(field) {
        let segment = (value >> step.value_shift) & u64::from(step.mask());
        buf[step.byte_index] |= (segment << step.lsb) as u8;
    }
}

/// Collect the raw unsigned bits of `field` from `buf`.
///
/// # Panics
///
/// Panics if a position lies beyond `buf`.
pub fn unpack_raw(field: &Field, buf: &[u8]) -> u64 {
    unpack_plan(field).iter().fold(0, |raw, step| {
        let segment = (buf[step.byte_index] >> step.lsb) & step.mask();
        raw | (u64::from(segment) << step.acc_shift)
    })
}

/// Decode `field` from `buf` as a signed value.
///
/// # Panics
///
/// Panics if a position lies beyond `buf`.
pub fn decode_signed(field: &Field, buf: &[u8]) -> i64 {
    let raw = unpack_raw(field, buf);
    match sign_extension(field) {
        Some(SignExtension::TopBit {
            byte_index,
            bit,
            width,
        }) => {
            if buf[byte_index] & (1 << bit) != 0 {
                raw.wrapping_sub(1u64 << width) as i64
            } else {
                raw as i64
            }
        }
        Some(SignExtension::Reinterpret) => reinterpret(raw, field.bit_width),
        None => raw as i64,
    }
}

fn reinterpret(raw: u64, bits: u32) -> i64 {
    match bits {
        8 => i64::from(raw as u8 as i8),
        16 => i64::from(raw as u16 as i16),
        32 => i64::from(raw as u32 as i32),
        _ => raw as i64,
    }
}

//! Minimal Rust expression builder for generated bit arithmetic.
//!
//! Rust binds `as` tighter than `<<`, `<<` tighter than `&`, and `&` tighter
//! than `|`, so a naive string template like `x & 0xF << 4` silently shifts
//! the mask instead of the masked value. [`Expr`] remembers the outermost
//! operator of what it holds and parenthesizes operands that are not atoms.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Atom,
    Cast,
    Shift,
    And,
    Or,
    Compare,
}

/// A rendered expression and its outermost operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    text: String,
    kind: Kind,
}

impl Expr {
    /// A path, literal or index expression that never needs parentheses.
    pub fn atom(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: Kind::Atom,
        }
    }

    /// `self.0[index]`
    pub fn response_byte(index: usize) -> Self {
        Self::atom(format!("self.0[{index}]"))
    }

    fn operand(&self) -> String {
        if self.kind == Kind::Atom {
            self.text.clone()
        } else {
            format!("({})", self.text)
        }
    }

    fn binary(lhs: String, op: &str, rhs: String, kind: Kind) -> Self {
        Self {
            text: format!("{lhs} {op} {rhs}"),
            kind,
        }
    }

    pub fn cast(self, ty: &str) -> Self {
        Self {
            text: format!("{} as {ty}", self.operand()),
            kind: Kind::Cast,
        }
    }

    /// `self >> amount`, or `self` unchanged when `amount` is zero.
    pub fn shr(self, amount: u32) -> Self {
        if amount == 0 {
            return self;
        }
        Self::binary(self.operand(), ">>", amount.to_string(), Kind::Shift)
    }

    /// `self << amount`, or `self` unchanged when `amount` is zero.
    pub fn shl(self, amount: u32) -> Self {
        if amount == 0 {
            return self;
        }
        Self::binary(self.operand(), "<<", amount.to_string(), Kind::Shift)
    }

    pub fn mask(self, mask: u64) -> Self {
        Self::binary(self.operand(), "&", hex(mask), Kind::And)
    }

    pub fn is_nonzero(self) -> Self {
        Self::binary(self.operand(), "!=", "0".to_string(), Kind::Compare)
    }

    /// OR the terms together, one term per line after the first.
    ///
    /// Returns `None` for an empty list.
    pub fn or_lines(terms: Vec<Expr>, indent: &str) -> Option<Self> {
        let single = terms.len() == 1;
        let mut terms = terms.into_iter();
        let first = terms.next()?;
        if single {
            return Some(first);
        }
        let mut text = first.or_operand();
        for term in terms {
            text.push_str(&format!(" |\n{indent}{}", term.or_operand()));
        }
        Some(Self {
            text,
            kind: Kind::Or,
        })
    }

    fn or_operand(&self) -> String {
        match self.kind {
            Kind::Compare => format!("({})", self.text),
            _ => self.text.clone(),
        }
    }

    pub fn is_atom(&self) -> bool {
        self.kind == Kind::Atom
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Upper-case hexadecimal literal without padding: `0xF`, `0x1000`.
pub fn hex(value: u64) -> String {
    format!("0x{value:X}")
}

/// Upper-case two-digit byte literal: `0x08`.
pub fn hex_byte(value: u8) -> String {
    format!("0x{value:02X}")
}

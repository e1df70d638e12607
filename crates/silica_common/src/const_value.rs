//! Constant values and Verilog literal parsing.
//!
//! A [`ConstValue`] pairs an unsigned value with an explicit bit width and
//! gives LSB-first access to its bits. Literal text like `4'b0101` or `8'hFF`
//! is parsed by [`parse_verilog_literal`]; `x`/`z` digits are treated as `0`
//! for synthesis, which is a documented lossy simplification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A sized constant value.
///
/// Values wider than 64 bits are truncated to their low 64 bits; bits above
/// bit 63 read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstValue {
    /// The unsigned value (low 64 bits).
    pub value: u64,
    /// The bit width, at least 1.
    pub width: u32,
}

impl ConstValue {
    /// Creates a constant, masking the value to `width` bits.
    pub fn new(value: u64, width: u32) -> Self {
        let width = width.max(1);
        let masked = if width >= 64 {
            value
        } else {
            value & ((1u64 << width) - 1)
        };
        Self {
            value: masked,
            width,
        }
    }

    /// Returns bit `i` (LSB is bit 0). Bits at or above the width are zero.
    pub fn bit(&self, i: u32) -> bool {
        if i >= self.width || i >= 64 {
            false
        } else {
            (self.value >> i) & 1 != 0
        }
    }

    /// Returns the bits of this constant, LSB first, `width` entries long.
    pub fn bits_lsb_first(&self) -> Vec<bool> {
        (0..self.width).map(|i| self.bit(i)).collect()
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'d{}", self.width, self.value)
    }
}

/// Error produced when literal text cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid literal `{text}`: {reason}")]
pub struct LiteralError {
    /// The offending literal text.
    pub text: String,
    /// Why it could not be parsed.
    pub reason: String,
}

impl LiteralError {
    fn new(text: &str, reason: impl Into<String>) -> Self {
        Self {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parses a Verilog numeric literal.
///
/// Handles plain decimal (`42`), sized literals (`4'b1010`, `8'hFF`,
/// `32'd100`, `8'o17`), unsized based literals (`'b1`, `'hFF`), underscore
/// separators, and an optional `s`/`S` signed marker after the tick.
/// `x`, `z`, and `?` digits are read as `0`.
///
/// Returns the value and the declared width, if one was written.
pub fn parse_verilog_literal(text: &str) -> Result<(u64, Option<u32>), LiteralError> {
    let trimmed: String = text.chars().filter(|c| *c != '_').collect();

    let Some(tick) = trimmed.find('\'') else {
        let value = trimmed
            .parse::<u64>()
            .map_err(|_| LiteralError::new(text, "not a decimal number"))?;
        return Ok((value, None));
    };

    let width = if tick == 0 {
        None
    } else {
        Some(
            trimmed[..tick]
                .parse::<u32>()
                .map_err(|_| LiteralError::new(text, "invalid width prefix"))?,
        )
    };
    if width == Some(0) {
        return Err(LiteralError::new(text, "zero width"));
    }

    let mut rest = &trimmed[tick + 1..];
    if rest.starts_with('s') || rest.starts_with('S') {
        rest = &rest[1..];
    }
    let Some(base_char) = rest.chars().next() else {
        return Err(LiteralError::new(text, "missing base"));
    };
    let radix = match base_char.to_ascii_lowercase() {
        'b' => 2,
        'o' => 8,
        'd' => 10,
        'h' => 16,
        _ => return Err(LiteralError::new(text, format!("unknown base `{base_char}`"))),
    };

    // x/z/? digits read as 0.
    let digits: String = rest[1..]
        .chars()
        .map(|c| match c {
            'x' | 'X' | 'z' | 'Z' | '?' => '0',
            other => other,
        })
        .collect();
    if digits.is_empty() {
        return Err(LiteralError::new(text, "missing digits"));
    }

    let value = u64::from_str_radix(&digits, radix)
        .map_err(|_| LiteralError::new(text, format!("invalid base-{radix} digits")))?;
    Ok((value, width))
}

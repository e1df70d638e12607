//! Signal definitions.

use serde::{Deserialize, Serialize};

/// Name of the shared constant-0 wire created during bit-blasting.
pub const CONST0: &str = "CONST0";

/// Name of the shared constant-1 wire created during bit-blasting.
pub const CONST1: &str = "CONST1";

/// A named wire or register.
///
/// The name is the signal's sole identity and must be unique within its
/// [`Module`](crate::Module). Widths start at 1 and may only widen as
/// inference observes wider uses; they never narrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Unique name within the owning module.
    pub name: String,
    /// Bit width, at least 1.
    pub width: u32,
    /// Whether this signal is a primary input.
    pub is_input: bool,
    /// Whether this signal is a primary output.
    pub is_output: bool,
    /// Whether this signal is a register (may also be an output).
    pub is_reg: bool,
}

impl Signal {
    /// Creates a plain wire of the given width.
    pub fn wire(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width: width.max(1),
            is_input: false,
            is_output: false,
            is_reg: false,
        }
    }

    /// Widens this signal to at least `width`. Widths never narrow.
    pub fn widen(&mut self, width: u32) {
        if width > self.width {
            self.width = width;
        }
    }
}

/// The name of bit `i` of a multi-bit signal after bit-blasting (LSB = 0).
pub fn bit_name(base: &str, i: u32) -> String {
    format!("{base}_{i}")
}

/// The name of element `i` of a declared register-file array.
pub fn element_name(base: &str, i: u32) -> String {
    format!("{base}_e{i}")
}

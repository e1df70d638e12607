//! Gate definitions — operation nodes of the netlist.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed vocabulary of gate operations.
///
/// Behavioral operations (`Add`, `Eq`, `Buf`, `DffEnRst`, and any `And`/`Or`/
/// `Mux` over multi-bit signals) exist only before bit-blasting. After
/// bit-blasting every gate is one of the 1-bit primitives for which
/// [`is_primitive`](GateOp::is_primitive) returns true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateOp {
    /// Vector addition, modulo the output width.
    Add,
    /// Equality comparison, 1-bit result.
    Eq,
    /// AND; logical (1-bit result) pre-blast, 2-input primitive post-blast.
    And,
    /// OR; logical (1-bit result) pre-blast, 2-input primitive post-blast.
    Or,
    /// Exclusive OR primitive.
    Xor,
    /// Inverter primitive.
    Not,
    /// Pass-through buffer driving a named target (behavioral only).
    Buf,
    /// 2-input multiplexer. Inputs `[sel, d0, d1]`; sel=0 passes d0.
    Mux,
    /// Behavioral register with enable and synchronous reset.
    /// Inputs `[next, old, enable, reset_value, reset, clock]`.
    DffEnRst,
    /// 1-bit rising-edge D flip-flop. Inputs `[d, clk]`.
    Dff,
}

impl GateOp {
    /// Whether this operation may appear in a bit-blasted netlist.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            GateOp::And | GateOp::Or | GateOp::Xor | GateOp::Not | GateOp::Mux | GateOp::Dff
        )
    }

    /// The required input count for a primitive, if fixed.
    pub fn primitive_arity(self) -> Option<usize> {
        match self {
            GateOp::And | GateOp::Or | GateOp::Xor | GateOp::Dff => Some(2),
            GateOp::Not => Some(1),
            GateOp::Mux => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateOp::Add => "ADD",
            GateOp::Eq => "EQ",
            GateOp::And => "AND",
            GateOp::Or => "OR",
            GateOp::Xor => "XOR",
            GateOp::Not => "NOT",
            GateOp::Buf => "BUF",
            GateOp::Mux => "MUX",
            GateOp::DffEnRst => "DFF_EN_RST",
            GateOp::Dff => "DFF",
        };
        f.write_str(s)
    }
}

/// An operation node referencing its signals by name.
///
/// A gate never owns its signals; the names resolve through the owning
/// [`Module`](crate::Module). Input order is semantically significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    /// The operation.
    pub op: GateOp,
    /// Ordered input signal names.
    pub inputs: Vec<String>,
    /// The single output signal name.
    pub output: String,
}

impl Gate {
    /// Creates a gate.
    pub fn new<S: Into<String>>(op: GateOp, inputs: Vec<S>, output: impl Into<String>) -> Self {
        Self {
            op,
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: output.into(),
        }
    }
}

//! Bit-blasting: multi-bit netlist → single-bit primitive netlist.
//!
//! Every signal of width `W > 1` gains `W` shadow 1-bit signals, and every
//! behavioral or vector gate is rewritten into a tree of the six 1-bit
//! primitives (AND, OR, XOR, NOT, MUX, DFF). The module is rewritten
//! destructively: its gate sequence is replaced wholesale and its signal
//! mapping only grows.

#![warn(missing_docs)]

mod bits;
mod lower;

use bits::Blaster;
use silica_netlist::Module;

/// An error raised while bit-blasting.
#[derive(Debug, thiserror::Error)]
pub enum BlastError {
    /// A gate whose shape is invalid for its operation — a fatal defect in
    /// an earlier stage, never silently ignored.
    #[error("malformed {op} gate: {reason}")]
    MalformedGate {
        /// The gate operation.
        op: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Rewrites `module` in place so that every gate is a 1-bit primitive.
pub fn bit_blast(module: &mut Module) -> Result<(), BlastError> {
    let gates = std::mem::take(&mut module.gates);
    let lowered = {
        let mut blaster = Blaster::new(module);
        blaster.expand_all();
        for gate in &gates {
            blaster.lower_gate(gate)?;
        }
        blaster.out
    };
    module.gates = lowered;
    Ok(())
}

//! The shared netlist model for the Silica synthesis pipeline.
//!
//! This crate defines [`Signal`], [`Gate`], and [`Module`] — the data
//! structures every pipeline stage consumes and produces. A `Module` is
//! created empty by the elaborator, destructively rewritten by the
//! bit-blaster, and read by the BLIF exporter.

#![warn(missing_docs)]

pub mod gate;
pub mod module;
pub mod signal;

pub use gate::{Gate, GateOp};
pub use module::{MemoryInfo, Module, ValidationError};
pub use signal::{bit_name, element_name, Signal, CONST0, CONST1};

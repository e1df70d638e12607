//! Shared foundational types for the Silica logic synthesizer.
//!
//! This crate provides the constant-value representation used by the
//! elaborator and bit-blaster, Verilog literal parsing, and the namespaced
//! temporary-name generator shared by all netlist-producing stages.

#![warn(missing_docs)]

pub mod const_value;
pub mod namegen;

pub use const_value::{parse_verilog_literal, ConstValue, LiteralError};
pub use namegen::NameGen;

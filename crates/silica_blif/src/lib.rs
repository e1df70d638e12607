//! BLIF export: fully bit-blasted netlist → two-level-logic text.
//!
//! Each primitive has exactly one fixed sum-of-products encoding; this is a
//! direct, total mapping with no optimization. Output is deterministic:
//! port lists are sorted and gates are emitted in module order, so exporting
//! the same module twice yields byte-identical text.

#![warn(missing_docs)]

use silica_netlist::{GateOp, Module, CONST0, CONST1};
use std::fmt::Write;

/// An error raised while encoding a netlist as BLIF.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A gate operation with no BLIF encoding reached the exporter — the
    /// module was not fully bit-blasted.
    #[error("cannot export non-primitive gate {op}")]
    UnsupportedGate {
        /// The offending operation.
        op: String,
    },

    /// A primitive gate with the wrong input count.
    #[error("{op} expects {expected} inputs, found {found}")]
    MalformedGate {
        /// The gate operation.
        op: String,
        /// The required arity.
        expected: usize,
        /// The actual input count.
        found: usize,
    },
}

/// Renders a bit-blasted module as BLIF text.
///
/// Only width-1 non-constant signals are eligible as primary ports; a wider
/// leftover signal is excluded from the port list (its shadow bits carry the
/// roles). Constant covers are emitted only when the shared constant wires
/// are present.
pub fn export_blif(module: &Module) -> Result<String, ExportError> {
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for signal in module.signals.values() {
        if signal.name == CONST0 || signal.name == CONST1 {
            continue;
        }
        if signal.width != 1 || module.constant(&signal.name).is_some() {
            continue;
        }
        if signal.is_input {
            inputs.push(signal.name.as_str());
        }
        if signal.is_output {
            outputs.push(signal.name.as_str());
        }
    }
    inputs.sort_unstable();
    outputs.sort_unstable();

    let mut text = String::new();
    let out = &mut text;
    writeln!(out, ".model {}", module.name).ok();
    write_port_list(out, ".inputs", &inputs);
    write_port_list(out, ".outputs", &outputs);
    writeln!(out).ok();

    if module.signal(CONST0).is_some() {
        writeln!(out, ".names {CONST0}").ok();
        writeln!(out).ok();
    }
    if module.signal(CONST1).is_some() {
        writeln!(out, ".names {CONST1}").ok();
        writeln!(out, "1").ok();
        writeln!(out).ok();
    }

    for gate in &module.gates {
        let expected = gate
            .op
            .primitive_arity()
            .ok_or_else(|| ExportError::UnsupportedGate {
                op: gate.op.to_string(),
            })?;
        if gate.inputs.len() != expected {
            return Err(ExportError::MalformedGate {
                op: gate.op.to_string(),
                expected,
                found: gate.inputs.len(),
            });
        }

        let names = gate.inputs.join(" ");
        match gate.op {
            GateOp::And => {
                writeln!(out, ".names {names} {}", gate.output).ok();
                writeln!(out, "11 1").ok();
            }
            GateOp::Or => {
                writeln!(out, ".names {names} {}", gate.output).ok();
                writeln!(out, "1- 1").ok();
                writeln!(out, "-1 1").ok();
            }
            GateOp::Xor => {
                writeln!(out, ".names {names} {}", gate.output).ok();
                writeln!(out, "01 1").ok();
                writeln!(out, "10 1").ok();
            }
            GateOp::Not => {
                writeln!(out, ".names {names} {}", gate.output).ok();
                writeln!(out, "0 1").ok();
            }
            GateOp::Mux => {
                // [sel, d0, d1]: sel=0 passes d0, sel=1 passes d1.
                writeln!(out, ".names {names} {}", gate.output).ok();
                writeln!(out, "01- 1").ok();
                writeln!(out, "1-1 1").ok();
            }
            GateOp::Dff => {
                writeln!(
                    out,
                    ".latch {} {} re {}",
                    gate.inputs[0], gate.output, gate.inputs[1]
                )
                .ok();
            }
            // Everything without a fixed arity was rejected above.
            _ => unreachable!(),
        }
        writeln!(out).ok();
    }

    writeln!(out, ".end").ok();
    Ok(text)
}

fn write_port_list(out: &mut String, keyword: &str, names: &[&str]) {
    if names.is_empty() {
        writeln!(out, "{keyword}").ok();
    } else {
        writeln!(out, "{keyword} {}", names.join(" ")).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_common::ConstValue;
    use silica_netlist::Gate;

    fn one_gate_module(op: GateOp, inputs: Vec<&str>, output: &str) -> Module {
        let mut module = Module::new("t");
        for name in inputs.iter() {
            module.get_or_create_with(name, 1, true, false, false);
        }
        module.get_or_create_with(output, 1, false, true, false);
        module.add_gate(Gate::new(op, inputs, output));
        module
    }

    #[test]
    fn and_cover() {
        let text = export_blif(&one_gate_module(GateOp::And, vec!["a", "b"], "y")).unwrap();
        assert!(text.contains(".names a b y\n11 1\n"));
    }

    #[test]
    fn or_cover() {
        let text = export_blif(&one_gate_module(GateOp::Or, vec!["a", "b"], "y")).unwrap();
        assert!(text.contains(".names a b y\n1- 1\n-1 1\n"));
    }

    #[test]
    fn xor_cover() {
        let text = export_blif(&one_gate_module(GateOp::Xor, vec!["a", "b"], "y")).unwrap();
        assert!(text.contains(".names a b y\n01 1\n10 1\n"));
    }

    #[test]
    fn not_cover() {
        let text = export_blif(&one_gate_module(GateOp::Not, vec!["a"], "y")).unwrap();
        assert!(text.contains(".names a y\n0 1\n"));
    }

    #[test]
    fn mux_cover() {
        let text =
            export_blif(&one_gate_module(GateOp::Mux, vec!["s", "d0", "d1"], "y")).unwrap();
        assert!(text.contains(".names s d0 d1 y\n01- 1\n1-1 1\n"));
    }

    #[test]
    fn dff_emits_rising_edge_latch() {
        let text = export_blif(&one_gate_module(GateOp::Dff, vec!["d", "clk"], "q")).unwrap();
        assert!(text.contains(".latch d q re clk\n"));
        assert!(!text.contains(".names d"));
    }

    #[test]
    fn header_and_sorted_ports() {
        let mut module = Module::new("top");
        module.get_or_create_with("zeta", 1, true, false, false);
        module.get_or_create_with("alpha", 1, true, false, false);
        module.get_or_create_with("y", 1, false, true, false);
        let text = export_blif(&module).unwrap();
        assert!(text.starts_with(".model top\n.inputs alpha zeta\n.outputs y\n"));
        assert!(text.ends_with(".end\n"));
    }

    #[test]
    fn constant_covers_only_when_present() {
        let module = Module::new("t");
        let text = export_blif(&module).unwrap();
        assert!(!text.contains("CONST0"));
        assert!(!text.contains("CONST1"));

        let mut module = Module::new("t");
        module.get_or_create(CONST0, 1);
        module.get_or_create(CONST1, 1);
        let text = export_blif(&module).unwrap();
        assert!(text.contains(".names CONST0\n\n"));
        assert!(text.contains(".names CONST1\n1\n"));
    }

    #[test]
    fn wide_leftover_and_constants_are_not_ports() {
        let mut module = Module::new("t");
        module.get_or_create_with("bus", 8, true, false, false);
        module.const_signal(ConstValue::new(1, 1));
        module.get_or_create_with("a", 1, true, false, false);
        let text = export_blif(&module).unwrap();
        assert!(text.contains(".inputs a\n"));
        assert!(!text.contains("bus"));
        assert!(!text.contains("const_1_1"));
    }

    #[test]
    fn non_primitive_gate_is_rejected() {
        let module = one_gate_module(GateOp::Add, vec!["a", "b"], "y");
        assert!(matches!(
            export_blif(&module),
            Err(ExportError::UnsupportedGate { op }) if op == "ADD"
        ));
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let module = one_gate_module(GateOp::And, vec!["a", "b", "c"], "y");
        assert!(matches!(
            export_blif(&module),
            Err(ExportError::MalformedGate {
                expected: 2,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn export_is_deterministic() {
        let mut module = Module::new("t");
        module.get_or_create_with("a", 1, true, false, false);
        module.get_or_create_with("b", 1, true, false, false);
        module.get_or_create_with("y", 1, false, true, false);
        module.get_or_create("t0", 1);
        module.add_gate(Gate::new(GateOp::Xor, vec!["a", "b"], "t0"));
        module.add_gate(Gate::new(GateOp::Not, vec!["t0"], "y"));
        let first = export_blif(&module).unwrap();
        let second = export_blif(&module).unwrap();
        assert_eq!(first, second);
    }
}

//! The module — root container of the netlist.

use crate::gate::Gate;
use crate::signal::Signal;
use serde::{Deserialize, Serialize};
use silica_common::ConstValue;
use std::collections::BTreeMap;

/// Shape of a declared register-file array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Number of elements.
    pub depth: u32,
    /// Element width in bits.
    pub width: u32,
}

/// A flattened single-module netlist.
///
/// Signals are keyed by name (the sole identity). Gate order is a valid
/// evaluation order for combinational chains; stages only append gates or
/// replace the whole sequence, never reorder it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The module name.
    pub name: String,
    /// All signals, keyed by name. Iteration order is lexicographic, which
    /// keeps per-target lowering and debug dumps deterministic.
    pub signals: BTreeMap<String, Signal>,
    /// All gates, in emission order.
    pub gates: Vec<Gate>,
    /// The constant pool: pooled constant signal name → its value.
    /// Identical `(value, width)` literals share one signal.
    pub constants: BTreeMap<String, ConstValue>,
    /// Register-file metadata, keyed by array name. Elements live in
    /// `signals` under [`element_name`](crate::element_name)s.
    pub memories: BTreeMap<String, MemoryInfo>,
}

impl Module {
    /// Creates an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signals: BTreeMap::new(),
            gates: Vec::new(),
            constants: BTreeMap::new(),
            memories: BTreeMap::new(),
        }
    }

    /// Looks up a signal by name.
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.get(name)
    }

    /// Looks up a signal mutably by name.
    pub fn signal_mut(&mut self, name: &str) -> Option<&mut Signal> {
        self.signals.get_mut(name)
    }

    /// Inserts a signal. The name must not already be declared.
    pub fn add_signal(&mut self, signal: Signal) {
        debug_assert!(
            !self.signals.contains_key(&signal.name),
            "duplicate signal `{}`",
            signal.name
        );
        self.signals.insert(signal.name.clone(), signal);
    }

    /// Returns the signal with the given name, creating a wire of `width` if
    /// it does not exist, and widening it to `width` if it does.
    pub fn get_or_create(&mut self, name: &str, width: u32) -> &mut Signal {
        let sig = self
            .signals
            .entry(name.to_string())
            .or_insert_with(|| Signal::wire(name, width));
        sig.widen(width);
        sig
    }

    /// Like [`get_or_create`](Self::get_or_create), additionally OR-merging
    /// the role flags into the signal.
    pub fn get_or_create_with(
        &mut self,
        name: &str,
        width: u32,
        is_input: bool,
        is_output: bool,
        is_reg: bool,
    ) -> &mut Signal {
        let sig = self.get_or_create(name, width);
        sig.is_input |= is_input;
        sig.is_output |= is_output;
        sig.is_reg |= is_reg;
        sig
    }

    /// Returns the pooled constant signal for `value`, creating it on first
    /// use. Identical `(value, width)` pairs always share one signal.
    pub fn const_signal(&mut self, value: ConstValue) -> String {
        let name = format!("const_{}_{}", value.value, value.width);
        if !self.signals.contains_key(&name) {
            self.add_signal(Signal::wire(name.clone(), value.width));
            self.constants.insert(name.clone(), value);
        }
        name
    }

    /// Returns the pooled value behind a constant signal, if `name` is one.
    pub fn constant(&self, name: &str) -> Option<ConstValue> {
        self.constants.get(name).copied()
    }

    /// Returns the register-file metadata for `name`, if it is an array.
    pub fn memory(&self, name: &str) -> Option<MemoryInfo> {
        self.memories.get(name).copied()
    }

    /// Appends a gate.
    pub fn add_gate(&mut self, gate: Gate) {
        self.gates.push(gate);
    }

    /// Checks the structural netlist invariants: every signal referenced by
    /// a gate exists, and no signal is written by more than one gate.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut written: BTreeMap<&str, usize> = BTreeMap::new();
        for gate in &self.gates {
            for name in gate.inputs.iter().chain(std::iter::once(&gate.output)) {
                if !self.signals.contains_key(name) {
                    return Err(ValidationError::UnknownSignal {
                        signal: name.clone(),
                        op: gate.op.to_string(),
                    });
                }
            }
            *written.entry(gate.output.as_str()).or_default() += 1;
        }
        for (name, count) in written {
            if count > 1 {
                return Err(ValidationError::MultipleWriters {
                    signal: name.to_string(),
                    count,
                });
            }
        }
        Ok(())
    }
}

/// A violated netlist invariant.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A gate references a signal that is not declared in the module.
    #[error("gate {op} references undeclared signal `{signal}`")]
    UnknownSignal {
        /// The undeclared signal name.
        signal: String,
        /// The referencing gate's operation.
        op: String,
    },
    /// A signal is driven by more than one gate.
    #[error("signal `{signal}` is written by {count} gates")]
    MultipleWriters {
        /// The multiply-driven signal.
        signal: String,
        /// How many gates drive it.
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{Gate, GateOp};

    #[test]
    fn get_or_create_widens_never_narrows() {
        let mut m = Module::new("top");
        m.get_or_create("a", 1);
        m.get_or_create("a", 8);
        assert_eq!(m.signal("a").unwrap().width, 8);
        m.get_or_create("a", 4);
        assert_eq!(m.signal("a").unwrap().width, 8);
    }

    #[test]
    fn role_flags_merge() {
        let mut m = Module::new("top");
        m.get_or_create_with("q", 4, false, true, false);
        m.get_or_create_with("q", 4, false, false, true);
        let q = m.signal("q").unwrap();
        assert!(q.is_output && q.is_reg && !q.is_input);
    }

    #[test]
    fn constant_pool_deduplicates() {
        let mut m = Module::new("top");
        let a = m.const_signal(ConstValue::new(5, 4));
        let b = m.const_signal(ConstValue::new(5, 4));
        assert_eq!(a, b);
        assert_eq!(m.constants.len(), 1);
        assert_eq!(m.constant(&a), Some(ConstValue::new(5, 4)));
    }

    #[test]
    fn constant_pool_distinguishes_widths() {
        let mut m = Module::new("top");
        let a = m.const_signal(ConstValue::new(1, 1));
        let b = m.const_signal(ConstValue::new(1, 8));
        assert_ne!(a, b);
        assert_eq!(m.constants.len(), 2);
    }

    #[test]
    fn non_constant_signal_has_no_pool_entry() {
        let mut m = Module::new("top");
        m.get_or_create("a", 1);
        assert_eq!(m.constant("a"), None);
    }

    #[test]
    fn validate_accepts_well_formed() {
        let mut m = Module::new("top");
        m.get_or_create("a", 1);
        m.get_or_create("b", 1);
        m.get_or_create("y", 1);
        m.add_gate(Gate::new(GateOp::And, vec!["a", "b"], "y"));
        assert!(m.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_signal() {
        let mut m = Module::new("top");
        m.get_or_create("a", 1);
        m.get_or_create("y", 1);
        m.add_gate(Gate::new(GateOp::And, vec!["a", "ghost"], "y"));
        assert!(matches!(
            m.validate(),
            Err(ValidationError::UnknownSignal { signal, .. }) if signal == "ghost"
        ));
    }

    #[test]
    fn validate_rejects_multiple_writers() {
        let mut m = Module::new("top");
        m.get_or_create("a", 1);
        m.get_or_create("y", 1);
        m.add_gate(Gate::new(GateOp::Not, vec!["a"], "y"));
        m.add_gate(Gate::new(GateOp::Buf, vec!["a"], "y"));
        assert!(matches!(
            m.validate(),
            Err(ValidationError::MultipleWriters { signal, count: 2 }) if signal == "y"
        ));
    }

    #[test]
    fn memory_metadata_lookup() {
        let mut m = Module::new("top");
        m.memories.insert("mem".into(), MemoryInfo { depth: 4, width: 8 });
        assert_eq!(m.memory("mem"), Some(MemoryInfo { depth: 4, width: 8 }));
        assert_eq!(m.memory("other"), None);
    }

    #[test]
    fn serde_roundtrip() {
        let mut m = Module::new("top");
        m.get_or_create_with("clk", 1, true, false, false);
        m.add_gate(Gate::new(GateOp::Dff, vec!["d", "clk"], "q"));
        let json = serde_json::to_string(&m).unwrap();
        let restored: Module = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.name, "top");
        assert_eq!(restored.gates.len(), 1);
        assert_eq!(restored.signals.len(), 1);
    }

    #[test]
    fn signal_iteration_is_sorted() {
        let mut m = Module::new("top");
        m.get_or_create("zeta", 1);
        m.get_or_create("alpha", 1);
        let names: Vec<_> = m.signals.keys().cloned().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}

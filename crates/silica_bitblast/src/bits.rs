//! Bit expansion: shadow 1-bit signals for every multi-bit signal.

use crate::BlastError;
use silica_common::NameGen;
use silica_netlist::{bit_name, Gate, Module, Signal, CONST0, CONST1};
use std::collections::HashMap;

/// Working state of one bit-blasting run.
pub(crate) struct Blaster<'a> {
    pub(crate) module: &'a mut Module,
    pub(crate) names: NameGen,
    pub(crate) out: Vec<Gate>,
    bits: HashMap<String, Vec<String>>,
}

impl<'a> Blaster<'a> {
    pub(crate) fn new(module: &'a mut Module) -> Self {
        Self {
            module,
            names: NameGen::new("b"),
            out: Vec::new(),
            bits: HashMap::new(),
        }
    }

    /// Eagerly creates shadow bit signals for every declared non-constant
    /// signal, so gate rewriting always hits the memo.
    pub(crate) fn expand_all(&mut self) {
        let names: Vec<String> = self.module.signals.keys().cloned().collect();
        for name in names {
            if self.module.constant(&name).is_some() {
                continue;
            }
            self.expand_signal(&name);
        }
    }

    fn expand_signal(&mut self, name: &str) {
        if self.bits.contains_key(name) {
            return;
        }
        let template = self
            .module
            .signal(name)
            .cloned()
            .unwrap_or_else(|| Signal::wire(name, 1));
        if template.width == 1 {
            self.bits.insert(name.to_string(), vec![name.to_string()]);
            return;
        }
        let mut shadow = Vec::with_capacity(template.width as usize);
        for i in 0..template.width {
            let bn = bit_name(name, i);
            if self.module.signal(&bn).is_none() {
                self.module.add_signal(Signal {
                    name: bn.clone(),
                    width: 1,
                    is_input: template.is_input,
                    is_output: template.is_output,
                    is_reg: template.is_reg,
                });
            }
            shadow.push(bn);
        }
        self.bits.insert(name.to_string(), shadow);
    }

    /// The shared constant wire for a bit value, created lazily.
    pub(crate) fn const_bit(&mut self, value: bool) -> String {
        let name = if value { CONST1 } else { CONST0 };
        if self.module.signal(name).is_none() {
            self.module.add_signal(Signal::wire(name, 1));
        }
        name.to_string()
    }

    /// The 1-bit signal names carrying `name`, LSB first.
    ///
    /// Pooled constants materialize as references to the shared
    /// `CONST0`/`CONST1` wires, never private per-bit constants.
    pub(crate) fn bits_of(&mut self, name: &str) -> Vec<String> {
        if let Some(value) = self.module.constant(name) {
            return value
                .bits_lsb_first()
                .into_iter()
                .map(|b| self.const_bit(b))
                .collect();
        }
        self.expand_signal(name);
        self.bits[name].clone()
    }

    /// A single-bit view of `name`; an error if it is wider than 1 bit.
    pub(crate) fn single_bit(&mut self, name: &str, op: &str) -> Result<String, BlastError> {
        let bits = self.bits_of(name);
        if bits.len() != 1 {
            return Err(BlastError::MalformedGate {
                op: op.to_string(),
                reason: format!("control signal `{name}` is {} bits wide", bits.len()),
            });
        }
        Ok(bits.into_iter().next().unwrap())
    }

    /// Zero-pads `bits` on the high end (or truncates) to exactly `width`.
    pub(crate) fn pad(&mut self, mut bits: Vec<String>, width: usize) -> Vec<String> {
        while bits.len() < width {
            bits.push(self.const_bit(false));
        }
        bits.truncate(width);
        bits
    }

    /// Allocates a fresh 1-bit temporary.
    pub(crate) fn fresh(&mut self, class: &str) -> String {
        let name = self.names.fresh(class);
        self.module.add_signal(Signal::wire(name.clone(), 1));
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_common::ConstValue;

    #[test]
    fn expansion_creates_lsb_first_shadows() {
        let mut module = Module::new("t");
        module.get_or_create_with("q", 4, false, true, true);
        let mut blaster = Blaster::new(&mut module);
        blaster.expand_all();
        let bits = blaster.bits_of("q");
        assert_eq!(bits, vec!["q_0", "q_1", "q_2", "q_3"]);
        let b0 = blaster.module.signal("q_0").unwrap();
        assert_eq!(b0.width, 1);
        assert!(b0.is_output && b0.is_reg);
    }

    #[test]
    fn width_one_signal_is_its_own_bit() {
        let mut module = Module::new("t");
        module.get_or_create("a", 1);
        let mut blaster = Blaster::new(&mut module);
        assert_eq!(blaster.bits_of("a"), vec!["a"]);
    }

    #[test]
    fn constants_share_the_two_global_wires() {
        let mut module = Module::new("t");
        let five = module.const_signal(ConstValue::new(5, 4));
        let mut blaster = Blaster::new(&mut module);
        let bits = blaster.bits_of(&five);
        assert_eq!(bits, vec![CONST1, CONST0, CONST1, CONST0]);
        assert!(blaster.module.signal(CONST0).is_some());
        assert!(blaster.module.signal(CONST1).is_some());
    }

    #[test]
    fn const_wires_created_lazily() {
        let mut module = Module::new("t");
        module.get_or_create("a", 1);
        let mut blaster = Blaster::new(&mut module);
        blaster.expand_all();
        assert!(blaster.module.signal(CONST0).is_none());
        blaster.const_bit(false);
        assert!(blaster.module.signal(CONST0).is_some());
        assert!(blaster.module.signal(CONST1).is_none());
    }

    #[test]
    fn pad_extends_high_end_with_zero() {
        let mut module = Module::new("t");
        module.get_or_create("a", 2);
        let mut blaster = Blaster::new(&mut module);
        let bits = blaster.bits_of("a");
        let padded = blaster.pad(bits, 4);
        assert_eq!(padded, vec!["a_0", "a_1", CONST0, CONST0]);
    }

    #[test]
    fn single_bit_rejects_wide_signal() {
        let mut module = Module::new("t");
        module.get_or_create("en", 2);
        let mut blaster = Blaster::new(&mut module);
        assert!(blaster.single_bit("en", "DFF_EN_RST").is_err());
    }
}

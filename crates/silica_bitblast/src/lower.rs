//! Per-gate lowering recipes: behavioral and vector gates into 1-bit
//! primitives.

use crate::bits::Blaster;
use crate::BlastError;
use silica_netlist::{Gate, GateOp};

impl Blaster<'_> {
    pub(crate) fn lower_gate(&mut self, gate: &Gate) -> Result<(), BlastError> {
        match gate.op {
            GateOp::Add => self.lower_add(gate),
            GateOp::DffEnRst => self.lower_dff_en_rst(gate),
            GateOp::Eq => self.lower_eq(gate),
            GateOp::And | GateOp::Or => self.lower_logical(gate),
            GateOp::Not => self.lower_not(gate),
            GateOp::Buf => self.lower_buf(gate),
            GateOp::Mux => self.lower_mux(gate),
            GateOp::Xor => self.lower_bitwise_passthrough(gate),
            GateOp::Dff => self.lower_dff(gate),
        }
    }

    fn emit(&mut self, op: GateOp, inputs: Vec<String>, output: String) {
        self.out.push(Gate { op, inputs, output });
    }

    fn arity(&self, gate: &Gate, expected: usize) -> Result<(), BlastError> {
        if gate.inputs.len() != expected {
            return Err(BlastError::MalformedGate {
                op: gate.op.to_string(),
                reason: format!("expected {expected} inputs, found {}", gate.inputs.len()),
            });
        }
        Ok(())
    }

    /// Ripple-carry expansion. Operands are zero-padded to the output width
    /// and the final carry-out is discarded — arithmetic is modulo `2^W`.
    fn lower_add(&mut self, gate: &Gate) -> Result<(), BlastError> {
        self.arity(gate, 2)?;
        let out_bits = self.bits_of(&gate.output);
        let w = out_bits.len();
        let a = self.bits_of(&gate.inputs[0]);
        let a = self.pad(a, w);
        let b = self.bits_of(&gate.inputs[1]);
        let b = self.pad(b, w);

        let mut carry = self.const_bit(false);
        for i in 0..w {
            // sum = a ^ b ^ carry; bit 0 has no carry-in so one XOR suffices.
            let half = if i == 0 {
                out_bits[0].clone()
            } else {
                self.fresh("xor")
            };
            self.emit(
                GateOp::Xor,
                vec![a[i].clone(), b[i].clone()],
                half.clone(),
            );
            if i > 0 {
                self.emit(
                    GateOp::Xor,
                    vec![half, carry.clone()],
                    out_bits[i].clone(),
                );
            }

            // carry_out = majority(a, b, carry)
            let ab = self.fresh("and");
            self.emit(GateOp::And, vec![a[i].clone(), b[i].clone()], ab.clone());
            let ac = self.fresh("and");
            self.emit(GateOp::And, vec![a[i].clone(), carry.clone()], ac.clone());
            let bc = self.fresh("and");
            self.emit(GateOp::And, vec![b[i].clone(), carry.clone()], bc.clone());
            let partial = self.fresh("or");
            self.emit(GateOp::Or, vec![ab, ac], partial.clone());
            let next_carry = self.fresh("or");
            self.emit(GateOp::Or, vec![partial, bc], next_carry.clone());
            carry = next_carry;
        }
        Ok(())
    }

    /// Per bit: an enable mux (hold when disabled), a reset mux (reset has
    /// priority), then a 1-bit edge-triggered storage element.
    fn lower_dff_en_rst(&mut self, gate: &Gate) -> Result<(), BlastError> {
        self.arity(gate, 6)?;
        let op = gate.op.to_string();
        let q_bits = self.bits_of(&gate.output);
        let w = q_bits.len();

        let next = self.bits_of(&gate.inputs[0]);
        let next = self.pad(next, w);
        let old = self.bits_of(&gate.inputs[1]);
        let old = self.pad(old, w);
        let reset_value = self.bits_of(&gate.inputs[3]);
        let reset_value = self.pad(reset_value, w);

        let enable = self.single_bit(&gate.inputs[2], &op)?;
        let reset = self.single_bit(&gate.inputs[4], &op)?;
        let clock = self.single_bit(&gate.inputs[5], &op)?;

        for i in 0..w {
            let held = self.fresh("mux");
            self.emit(
                GateOp::Mux,
                vec![enable.clone(), old[i].clone(), next[i].clone()],
                held.clone(),
            );
            let resolved = self.fresh("mux");
            self.emit(
                GateOp::Mux,
                vec![reset.clone(), held, reset_value[i].clone()],
                resolved.clone(),
            );
            self.emit(GateOp::Dff, vec![resolved, clock.clone()], q_bits[i].clone());
        }
        Ok(())
    }

    /// Equality: per-bit XNOR folded by an AND chain into the 1-bit output.
    fn lower_eq(&mut self, gate: &Gate) -> Result<(), BlastError> {
        self.arity(gate, 2)?;
        let out = self.single_bit(&gate.output, "EQ")?;
        let a = self.bits_of(&gate.inputs[0]);
        let b = self.bits_of(&gate.inputs[1]);
        let w = a.len().max(b.len());
        let a = self.pad(a, w);
        let b = self.pad(b, w);

        let mut acc: Option<String> = None;
        for i in 0..w {
            let diff = self.fresh("xor");
            self.emit(GateOp::Xor, vec![a[i].clone(), b[i].clone()], diff.clone());
            let last = i == w - 1;
            let same = if last && acc.is_none() {
                out.clone()
            } else {
                self.fresh("not")
            };
            self.emit(GateOp::Not, vec![diff], same.clone());
            acc = Some(match acc {
                None => same,
                Some(prev) => {
                    let folded = if last { out.clone() } else { self.fresh("and") };
                    self.emit(GateOp::And, vec![prev, same], folded.clone());
                    folded
                }
            });
        }
        Ok(())
    }

    /// Logical AND/OR: wide operands are OR-reduced to a truth bit first.
    fn lower_logical(&mut self, gate: &Gate) -> Result<(), BlastError> {
        self.arity(gate, 2)?;
        let out = self.single_bit(&gate.output, &gate.op.to_string())?;
        let a = self.reduce_to_bool(&gate.inputs[0]);
        let b = self.reduce_to_bool(&gate.inputs[1]);
        self.emit(gate.op, vec![a, b], out);
        Ok(())
    }

    fn lower_not(&mut self, gate: &Gate) -> Result<(), BlastError> {
        self.arity(gate, 1)?;
        let out = self.single_bit(&gate.output, "NOT")?;
        let a = self.reduce_to_bool(&gate.inputs[0]);
        self.emit(GateOp::Not, vec![a], out);
        Ok(())
    }

    /// A behavioral buffer becomes a per-bit self-AND, keeping the
    /// post-blast vocabulary closed over the six primitives.
    fn lower_buf(&mut self, gate: &Gate) -> Result<(), BlastError> {
        self.arity(gate, 1)?;
        let out_bits = self.bits_of(&gate.output);
        let w = out_bits.len();
        let a = self.bits_of(&gate.inputs[0]);
        let a = self.pad(a, w);
        for i in 0..w {
            self.emit(
                GateOp::And,
                vec![a[i].clone(), a[i].clone()],
                out_bits[i].clone(),
            );
        }
        Ok(())
    }

    /// A vector mux widens to one 1-bit mux per output bit, sharing the
    /// select line.
    fn lower_mux(&mut self, gate: &Gate) -> Result<(), BlastError> {
        self.arity(gate, 3)?;
        let sel = self.single_bit(&gate.inputs[0], "MUX")?;
        let out_bits = self.bits_of(&gate.output);
        let w = out_bits.len();
        let d0 = self.bits_of(&gate.inputs[1]);
        let d0 = self.pad(d0, w);
        let d1 = self.bits_of(&gate.inputs[2]);
        let d1 = self.pad(d1, w);
        for i in 0..w {
            self.emit(
                GateOp::Mux,
                vec![sel.clone(), d0[i].clone(), d1[i].clone()],
                out_bits[i].clone(),
            );
        }
        Ok(())
    }

    /// XOR only ever appears over 1-bit signals; rewrite it onto the bit
    /// views so constant operands land on the shared constant wires.
    fn lower_bitwise_passthrough(&mut self, gate: &Gate) -> Result<(), BlastError> {
        self.arity(gate, 2)?;
        let op = gate.op.to_string();
        let out = self.single_bit(&gate.output, &op)?;
        let a = self.single_bit(&gate.inputs[0], &op)?;
        let b = self.single_bit(&gate.inputs[1], &op)?;
        self.emit(gate.op, vec![a, b], out);
        Ok(())
    }

    fn lower_dff(&mut self, gate: &Gate) -> Result<(), BlastError> {
        self.arity(gate, 2)?;
        let d = self.single_bit(&gate.inputs[0], "DFF")?;
        let clock = self.single_bit(&gate.inputs[1], "DFF")?;
        let q = self.single_bit(&gate.output, "DFF")?;
        self.emit(GateOp::Dff, vec![d, clock], q);
        Ok(())
    }

    /// The truth value of a signal: itself if 1 bit, otherwise an OR
    /// reduction of its bits.
    fn reduce_to_bool(&mut self, name: &str) -> String {
        let bits = self.bits_of(name);
        let mut acc = bits[0].clone();
        for bit in &bits[1..] {
            let folded = self.fresh("or");
            self.emit(GateOp::Or, vec![acc, bit.clone()], folded.clone());
            acc = folded;
        }
        acc
    }
}

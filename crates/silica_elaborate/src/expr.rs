//! The expression compiler.
//!
//! Lowers a language-level expression into a DAG of gates producing one
//! result signal. The caller receives the result signal's name plus the
//! gates needed to compute it, in evaluation order; gates are only committed
//! to the module when the enclosing construct actually uses the result.

use crate::const_eval::{eval_const, ParamEnv};
use crate::errors::ElabError;
use silica_common::{ConstValue, NameGen};
use silica_netlist::{element_name, Gate, GateOp, Module, Signal};
use silica_verilog_parser::ast::{BinaryOp, Expr, UnaryOp};

/// Default width for unsized integer literals with no width expectation.
pub(crate) const UNSIZED_WIDTH: u32 = 32;

/// Shared state for expression and statement lowering within one module.
pub(crate) struct LowerCtx<'a> {
    pub module: &'a mut Module,
    pub names: &'a mut NameGen,
    pub params: &'a ParamEnv,
}

impl LowerCtx<'_> {
    /// Allocates a fresh temporary wire of the given class and width.
    pub(crate) fn fresh(&mut self, class: &str, width: u32) -> String {
        let name = self.names.fresh(class);
        self.module.add_signal(Signal::wire(name.clone(), width));
        name
    }

    /// The current width of a signal, defaulting to 1 if undeclared.
    pub(crate) fn width_of(&self, name: &str) -> u32 {
        self.module.signal(name).map_or(1, |s| s.width)
    }

    /// Compiles an expression, returning the result signal and the gates
    /// that compute it. `width_hint` is the width expected by the consumer;
    /// it is propagated into arithmetic but not comparisons or logicals.
    pub(crate) fn compile_expr(
        &mut self,
        expr: &Expr,
        width_hint: Option<u32>,
    ) -> Result<(String, Vec<Gate>), ElabError> {
        match expr {
            Expr::Identifier(name) => self.compile_identifier(name, width_hint),
            Expr::Literal { value, width } => {
                let w = width.or(width_hint).unwrap_or(UNSIZED_WIDTH);
                let sig = self.module.const_signal(ConstValue::new(*value, w));
                Ok((sig, Vec::new()))
            }
            Expr::Unary {
                op: UnaryOp::LNot,
                operand,
            } => {
                let (a, mut gates) = self.compile_expr(operand, None)?;
                let out = self.fresh("not", 1);
                gates.push(Gate::new(GateOp::Not, vec![a], out.clone()));
                Ok((out, gates))
            }
            Expr::Binary { op, lhs, rhs } => self.compile_binary(*op, lhs, rhs, width_hint),
            Expr::Replicate { count, value } => {
                let n = eval_const(count, self.params)?;
                if n <= 0 {
                    return Err(ElabError::unsupported("non-positive replication count"));
                }
                // Approximated as an all-zero constant of the replicated
                // width; general replication is not implemented.
                let total = n as u32 * self.static_width(value);
                let sig = self.module.const_signal(ConstValue::new(0, total));
                Ok((sig, Vec::new()))
            }
            Expr::Index { base, index } => self.compile_indexed_read(base, index),
        }
    }

    fn compile_identifier(
        &mut self,
        name: &str,
        width_hint: Option<u32>,
    ) -> Result<(String, Vec<Gate>), ElabError> {
        if let Some(value) = self.params.get(name) {
            let w = width_hint.unwrap_or(UNSIZED_WIDTH);
            let sig = self.module.const_signal(ConstValue::new(*value as u64, w));
            return Ok((sig, Vec::new()));
        }
        if self.module.memory(name).is_some() {
            return Err(ElabError::unsupported(format!(
                "whole-array reference to `{name}`"
            )));
        }
        self.module.get_or_create(name, width_hint.unwrap_or(1));
        Ok((name.to_string(), Vec::new()))
    }

    fn compile_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        width_hint: Option<u32>,
    ) -> Result<(String, Vec<Gate>), ElabError> {
        let (gate_op, class) = match op {
            BinaryOp::Add => (GateOp::Add, "add"),
            BinaryOp::Eq | BinaryOp::Ne => (GateOp::Eq, "eq"),
            BinaryOp::LAnd => (GateOp::And, "and"),
            BinaryOp::LOr => (GateOp::Or, "or"),
            BinaryOp::Sub => {
                // Subtraction is only supported where it constant-folds
                // (parameter arithmetic like `WIDTH - 1`).
                let value = eval_const(
                    &Expr::Binary {
                        op,
                        lhs: Box::new(lhs.clone()),
                        rhs: Box::new(rhs.clone()),
                    },
                    self.params,
                )
                .map_err(|_| ElabError::unsupported("non-constant subtraction"))?;
                let w = width_hint.unwrap_or(UNSIZED_WIDTH);
                let sig = self.module.const_signal(ConstValue::new(value as u64, w));
                return Ok((sig, Vec::new()));
            }
        };

        // Width hints propagate into arithmetic only; comparisons and
        // logicals always produce width 1.
        let operand_hint = if gate_op == GateOp::Add {
            width_hint
        } else {
            None
        };
        let (a, mut gates) = self.compile_expr(lhs, operand_hint)?;
        let (b, b_gates) = self.compile_expr(rhs, operand_hint)?;
        gates.extend(b_gates);

        let out_width = if gate_op == GateOp::Add {
            width_hint.unwrap_or_else(|| self.width_of(&a).max(self.width_of(&b)))
        } else {
            1
        };
        let out = self.fresh(class, out_width);
        gates.push(Gate::new(gate_op, vec![a, b], out.clone()));

        if op == BinaryOp::Ne {
            let inverted = self.fresh("not", 1);
            gates.push(Gate::new(GateOp::Not, vec![out], inverted.clone()));
            return Ok((inverted, gates));
        }
        Ok((out, gates))
    }

    /// Lowers `base[index]` over a register file into a linear selector
    /// chain: seeded with element 0, each step muxes in element `i` when the
    /// index equals `i`. Cost and depth are O(depth).
    fn compile_indexed_read(
        &mut self,
        base: &str,
        index: &Expr,
    ) -> Result<(String, Vec<Gate>), ElabError> {
        let Some(info) = self.module.memory(base) else {
            return Err(ElabError::unsupported(format!(
                "indexed read of non-array `{base}`"
            )));
        };
        let (idx, mut gates) = self.compile_expr(index, None)?;
        let idx_width = self.width_of(&idx);

        let mut chain = element_name(base, 0);
        for i in 1..info.depth {
            let label = self
                .module
                .const_signal(ConstValue::new(i as u64, idx_width));
            let hit = self.fresh("eq", 1);
            gates.push(Gate::new(GateOp::Eq, vec![idx.clone(), label], hit.clone()));
            let mux = self.fresh("mux", info.width);
            gates.push(Gate::new(
                GateOp::Mux,
                vec![hit, chain, element_name(base, i)],
                mux.clone(),
            ));
            chain = mux;
        }
        Ok((chain, gates))
    }

    /// The statically-known width of an expression, without compiling it.
    fn static_width(&self, expr: &Expr) -> u32 {
        match expr {
            Expr::Identifier(name) => self.width_of(name),
            Expr::Literal { width, .. } => width.unwrap_or(1),
            _ => 1,
        }
    }
}

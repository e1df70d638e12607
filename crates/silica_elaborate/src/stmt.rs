//! The statement lowerer.
//!
//! Walks a statement tree once per target signal, threading the target's
//! "current value" like single-assignment form: sequencing feeds one
//! statement's result into the next, and control flow forks lower both arms
//! from the same incoming value, merged by a multiplexer only when the arms
//! actually disagree.

use crate::errors::ElabError;
use crate::expr::LowerCtx;
use silica_common::ConstValue;
use silica_netlist::{element_name, Gate, GateOp};
use silica_verilog_parser::ast::Statement;

impl LowerCtx<'_> {
    /// Lowers `stmt` with respect to `target`, starting from `current`.
    ///
    /// Returns the signal holding the target's value after the statement,
    /// plus the gates emitted along the way. A statement that never writes
    /// the target returns `current` unchanged with no gates.
    pub(crate) fn lower_statement(
        &mut self,
        stmt: &Statement,
        target: &str,
        current: String,
    ) -> Result<(String, Vec<Gate>), ElabError> {
        match stmt {
            Statement::Block(stmts) => {
                let mut current = current;
                let mut gates = Vec::new();
                for s in stmts {
                    let (next, g) = self.lower_statement(s, target, current)?;
                    gates.extend(g);
                    current = next;
                }
                Ok((current, gates))
            }

            Statement::Assign {
                target: written,
                index,
                value,
                ..
            } => match index {
                None if written == target => {
                    let hint = self.width_of(target);
                    self.compile_expr(value, Some(hint))
                }
                Some(idx_expr) => self.lower_element_write(written, idx_expr, value, target, current),
                None => Ok((current, Vec::new())),
            },

            Statement::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let (cond_sig, mut gates) = self.compile_expr(cond, None)?;
                let (then_sig, then_g) =
                    self.lower_statement(then_branch, target, current.clone())?;
                gates.extend(then_g);
                let (else_sig, else_g) = match else_branch {
                    Some(e) => self.lower_statement(e, target, current)?,
                    // No else-branch: the target holds its incoming value.
                    None => (current, Vec::new()),
                };
                gates.extend(else_g);

                if then_sig == else_sig {
                    // The branch had no effect on this target.
                    return Ok((then_sig, gates));
                }
                let width = self.width_of(&then_sig).max(self.width_of(&else_sig));
                let mux = self.fresh("mux", width);
                gates.push(Gate::new(
                    GateOp::Mux,
                    vec![cond_sig, else_sig, then_sig],
                    mux.clone(),
                ));
                Ok((mux, gates))
            }

            Statement::Case {
                subject,
                arms,
                default,
            } => {
                let (subj, mut gates) = self.compile_expr(subject, None)?;
                let subj_width = self.width_of(&subj);

                let (mut chain, default_g) = match default {
                    Some(d) => self.lower_statement(d, target, current.clone())?,
                    None => (current.clone(), Vec::new()),
                };
                gates.extend(default_g);

                // Fold arms last-declared-first so the first declared arm's
                // mux ends up outermost, preserving first-match priority.
                for arm in arms.iter().rev() {
                    let mut cond: Option<String> = None;
                    for label in &arm.labels {
                        let (value, value_g) = self.compile_expr(label, Some(subj_width))?;
                        gates.extend(value_g);
                        let hit = self.fresh("eq", 1);
                        gates.push(Gate::new(
                            GateOp::Eq,
                            vec![subj.clone(), value],
                            hit.clone(),
                        ));
                        cond = Some(match cond {
                            None => hit,
                            Some(prev) => {
                                let any = self.fresh("or", 1);
                                gates.push(Gate::new(GateOp::Or, vec![prev, hit], any.clone()));
                                any
                            }
                        });
                    }
                    let cond =
                        cond.ok_or_else(|| ElabError::unsupported("case arm without labels"))?;

                    let (arm_sig, arm_g) =
                        self.lower_statement(&arm.body, target, current.clone())?;
                    gates.extend(arm_g);

                    if arm_sig != chain {
                        let width = self.width_of(&arm_sig).max(self.width_of(&chain));
                        let mux = self.fresh("mux", width);
                        gates.push(Gate::new(
                            GateOp::Mux,
                            vec![cond, chain, arm_sig],
                            mux.clone(),
                        ));
                        chain = mux;
                    }
                }
                Ok((chain, gates))
            }
        }
    }

    /// Lowers `written[idx] = value` with respect to one register-file
    /// element target: the element takes the value when the index decodes to
    /// it, and holds its incoming value otherwise.
    fn lower_element_write(
        &mut self,
        written: &str,
        idx_expr: &silica_verilog_parser::ast::Expr,
        value: &silica_verilog_parser::ast::Expr,
        target: &str,
        current: String,
    ) -> Result<(String, Vec<Gate>), ElabError> {
        let Some(info) = self.module.memory(written) else {
            if written == target {
                return Err(ElabError::unsupported(format!(
                    "bit-select assignment to `{written}`"
                )));
            }
            return Ok((current, Vec::new()));
        };
        let Some(i) = (0..info.depth).find(|i| element_name(written, *i) == target) else {
            return Ok((current, Vec::new()));
        };

        let (idx, mut gates) = self.compile_expr(idx_expr, None)?;
        let idx_width = self.width_of(&idx);
        let label = self
            .module
            .const_signal(ConstValue::new(i as u64, idx_width));
        let hit = self.fresh("eq", 1);
        gates.push(Gate::new(GateOp::Eq, vec![idx, label], hit.clone()));

        let (val, value_g) = self.compile_expr(value, Some(info.width))?;
        gates.extend(value_g);

        let mux = self.fresh("mux", info.width);
        gates.push(Gate::new(GateOp::Mux, vec![hit, current, val], mux.clone()));
        Ok((mux, gates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::const_eval::ParamEnv;
    use silica_common::NameGen;
    use silica_netlist::{MemoryInfo, Module, Signal};
    use silica_verilog_parser::ast::Expr;

    struct Rig {
        module: Module,
        names: NameGen,
        params: ParamEnv,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                module: Module::new("t"),
                names: NameGen::new("e"),
                params: ParamEnv::new(),
            }
        }

        fn lower(&mut self, stmt: &Statement, target: &str) -> (String, Vec<Gate>) {
            let mut cx = LowerCtx {
                module: &mut self.module,
                names: &mut self.names,
                params: &self.params,
            };
            cx.lower_statement(stmt, target, target.to_string()).unwrap()
        }
    }

    fn assign(target: &str, value: Expr) -> Statement {
        Statement::Assign {
            target: target.into(),
            index: None,
            value,
            nonblocking: false,
        }
    }

    #[test]
    fn sequencing_threads_current_value() {
        let mut rig = Rig::new();
        rig.module.get_or_create("y", 1);
        let stmt = Statement::Block(vec![
            assign("y", Expr::ident("a")),
            assign("y", Expr::ident("b")),
        ]);
        let (result, gates) = rig.lower(&stmt, "y");
        // Last assignment wins; no gates needed for plain copies.
        assert_eq!(result, "b");
        assert!(gates.is_empty());
    }

    #[test]
    fn unrelated_assignment_passes_through() {
        let mut rig = Rig::new();
        rig.module.get_or_create("y", 1);
        let stmt = assign("other", Expr::ident("a"));
        let (result, gates) = rig.lower(&stmt, "y");
        assert_eq!(result, "y");
        assert!(gates.is_empty());
    }

    #[test]
    fn if_without_else_holds_value() {
        let mut rig = Rig::new();
        rig.module.get_or_create("y", 1);
        let stmt = Statement::If {
            cond: Expr::ident("c"),
            then_branch: Box::new(assign("y", Expr::ident("a"))),
            else_branch: None,
        };
        let (result, gates) = rig.lower(&stmt, "y");
        let mux = gates.iter().find(|g| g.op == GateOp::Mux).unwrap();
        // sel=0 (condition false) passes the held value, sel=1 the new one.
        assert_eq!(mux.inputs, vec!["c", "y", "a"]);
        assert_eq!(result, mux.output);
    }

    #[test]
    fn mux_elided_when_branches_agree() {
        let mut rig = Rig::new();
        rig.module.get_or_create("y", 1);
        let stmt = Statement::If {
            cond: Expr::ident("c"),
            then_branch: Box::new(assign("other", Expr::ident("a"))),
            else_branch: Some(Box::new(assign("other", Expr::ident("b")))),
        };
        let (result, gates) = rig.lower(&stmt, "y");
        assert_eq!(result, "y");
        assert!(gates.iter().all(|g| g.op != GateOp::Mux));
    }

    #[test]
    fn case_first_declared_arm_is_outermost() {
        let mut rig = Rig::new();
        rig.module.get_or_create("y", 1);
        rig.module.get_or_create("sel", 2);
        // Overlapping labels: both arms match sel == 1. Verilog first-match
        // priority means arm `a` must win.
        let stmt = Statement::Case {
            subject: Expr::ident("sel"),
            arms: vec![
                silica_verilog_parser::ast::CaseArm {
                    labels: vec![Expr::Literal {
                        value: 1,
                        width: Some(2),
                    }],
                    body: assign("y", Expr::ident("a")),
                },
                silica_verilog_parser::ast::CaseArm {
                    labels: vec![Expr::Literal {
                        value: 1,
                        width: Some(2),
                    }],
                    body: assign("y", Expr::ident("b")),
                },
            ],
            default: Some(Box::new(assign("y", Expr::ident("c")))),
        };
        let (result, gates) = rig.lower(&stmt, "y");
        let muxes: Vec<_> = gates.iter().filter(|g| g.op == GateOp::Mux).collect();
        assert_eq!(muxes.len(), 2);
        // The final (outermost) mux selects the first declared arm's value
        // when its label matches, overriding the inner chain.
        let outer = muxes.last().unwrap();
        assert_eq!(result, outer.output);
        assert_eq!(outer.inputs[2], "a");
        assert_eq!(outer.inputs[1], muxes[0].output);
        assert_eq!(muxes[0].inputs[2], "b");
        assert_eq!(muxes[0].inputs[1], "c");
    }

    #[test]
    fn multi_label_arm_conditions_are_ored() {
        let mut rig = Rig::new();
        rig.module.get_or_create("y", 1);
        rig.module.get_or_create("sel", 2);
        let stmt = Statement::Case {
            subject: Expr::ident("sel"),
            arms: vec![silica_verilog_parser::ast::CaseArm {
                labels: vec![
                    Expr::Literal {
                        value: 0,
                        width: Some(2),
                    },
                    Expr::Literal {
                        value: 1,
                        width: Some(2),
                    },
                ],
                body: assign("y", Expr::ident("a")),
            }],
            default: None,
        };
        let (_, gates) = rig.lower(&stmt, "y");
        assert_eq!(gates.iter().filter(|g| g.op == GateOp::Eq).count(), 2);
        assert_eq!(gates.iter().filter(|g| g.op == GateOp::Or).count(), 1);
        let or = gates.iter().find(|g| g.op == GateOp::Or).unwrap();
        let mux = gates.iter().find(|g| g.op == GateOp::Mux).unwrap();
        assert_eq!(mux.inputs[0], or.output);
    }

    #[test]
    fn element_write_decodes_index() {
        let mut rig = Rig::new();
        rig.module
            .memories
            .insert("mem".into(), MemoryInfo { depth: 4, width: 8 });
        for i in 0..4 {
            rig.module
                .add_signal(Signal::wire(element_name("mem", i), 8));
        }
        rig.module.get_or_create("addr", 2);
        rig.module.get_or_create("d", 8);
        let stmt = Statement::Assign {
            target: "mem".into(),
            index: Some(Expr::ident("addr")),
            value: Expr::ident("d"),
            nonblocking: true,
        };
        let target = element_name("mem", 2);
        let (result, gates) = rig.lower(&stmt, &target);
        let eq = gates.iter().find(|g| g.op == GateOp::Eq).unwrap();
        assert_eq!(eq.inputs[0], "addr");
        assert_eq!(rig.module.constant(&eq.inputs[1]), Some(ConstValue::new(2, 2)));
        let mux = gates.iter().find(|g| g.op == GateOp::Mux).unwrap();
        assert_eq!(mux.inputs, vec![eq.output.clone(), target, "d".to_string()]);
        assert_eq!(result, mux.output);
    }

    #[test]
    fn bit_select_write_is_unsupported() {
        let mut rig = Rig::new();
        rig.module.get_or_create("y", 4);
        let stmt = Statement::Assign {
            target: "y".into(),
            index: Some(Expr::Literal {
                value: 0,
                width: None,
            }),
            value: Expr::ident("a"),
            nonblocking: false,
        };
        let mut cx = LowerCtx {
            module: &mut rig.module,
            names: &mut rig.names,
            params: &rig.params,
        };
        assert!(matches!(
            cx.lower_statement(&stmt, "y", "y".to_string()),
            Err(ElabError::UnsupportedConstruct { .. })
        ));
    }
}

//! Constant expression evaluation.
//!
//! Parameter values, range bounds, and replication counts must fold to
//! integers at elaboration time. Logical operators fold to 0/1.

use crate::errors::ElabError;
use silica_verilog_parser::ast::{BinaryOp, Expr, UnaryOp};
use std::collections::BTreeMap;

/// The parameter environment: parameter name → resolved integer value.
pub type ParamEnv = BTreeMap<String, i64>;

/// Folds a constant expression to an integer.
pub fn eval_const(expr: &Expr, params: &ParamEnv) -> Result<i64, ElabError> {
    match expr {
        Expr::Literal { value, .. } => Ok(*value as i64),
        Expr::Identifier(name) => params
            .get(name)
            .copied()
            .ok_or_else(|| ElabError::UndefinedParameter { name: name.clone() }),
        Expr::Unary {
            op: UnaryOp::LNot,
            operand,
        } => Ok((eval_const(operand, params)? == 0) as i64),
        Expr::Binary { op, lhs, rhs } => {
            let a = eval_const(lhs, params)?;
            let b = eval_const(rhs, params)?;
            Ok(match op {
                BinaryOp::Add => a.wrapping_add(b),
                BinaryOp::Sub => a.wrapping_sub(b),
                BinaryOp::Eq => (a == b) as i64,
                BinaryOp::Ne => (a != b) as i64,
                BinaryOp::LAnd => (a != 0 && b != 0) as i64,
                BinaryOp::LOr => (a != 0 || b != 0) as i64,
            })
        }
        Expr::Replicate { .. } | Expr::Index { .. } => Err(ElabError::unsupported(
            "replication or indexed read in constant expression",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, i64)]) -> ParamEnv {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    fn lit(value: u64) -> Expr {
        Expr::Literal { value, width: None }
    }

    #[test]
    fn folds_width_minus_one() {
        let expr = binary(BinaryOp::Sub, Expr::ident("WIDTH"), lit(1));
        assert_eq!(eval_const(&expr, &env(&[("WIDTH", 8)])).unwrap(), 7);
    }

    #[test]
    fn folds_logical_ops_to_bool() {
        let expr = binary(BinaryOp::LAnd, lit(3), lit(0));
        assert_eq!(eval_const(&expr, &env(&[])).unwrap(), 0);
        let expr = binary(BinaryOp::LOr, lit(3), lit(0));
        assert_eq!(eval_const(&expr, &env(&[])).unwrap(), 1);
    }

    #[test]
    fn unknown_identifier_is_an_error() {
        let err = eval_const(&Expr::ident("DEPTH"), &env(&[])).unwrap_err();
        assert!(matches!(err, ElabError::UndefinedParameter { name } if name == "DEPTH"));
    }

    #[test]
    fn unary_not() {
        let expr = Expr::Unary {
            op: UnaryOp::LNot,
            operand: Box::new(lit(0)),
        };
        assert_eq!(eval_const(&expr, &env(&[])).unwrap(), 1);
    }
}

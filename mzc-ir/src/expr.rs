//! Expressions
//!
//! Expressions are already type-checked by the front end. Literals carry
//! their declared type; for fixed-point types the literal value is the raw
//! container value (e.g. 1.5 in 8.8 is 384).

use mzc_common::ScalarType;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::{BinaryOp, FunctionId};

/// A typed literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub value: i64,
    pub ty: ScalarType,
}

impl Literal {
    pub fn new(value: i64, ty: ScalarType) -> Self {
        Self { value, ty }
    }

    /// Fixed-point literal for `numerator / denominator`
    pub fn fixed(numerator: i64, denominator: i64, ty: ScalarType) -> Option<Self> {
        let raw = ty.fixed_point()?.raw_from_ratio(numerator, denominator)?;
        Some(Self::new(raw, ty))
    }
}

/// Call target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    /// Resolved through the mangler
    Function(FunctionId),
    /// A symbol the front end mangled itself
    Symbol(String),
}

impl fmt::Display for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callee::Function(id) => write!(f, "{}::{}", id.module, id.name),
            Callee::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}

/// Expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Literal(Literal),

    /// Read of a local or parameter
    Local(String),

    /// Read of a module-level constant
    Constant(String),

    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    Cast {
        value: Box<Expr>,
        ty: ScalarType,
    },

    Call {
        callee: Callee,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn literal(value: i64, ty: ScalarType) -> Self {
        Expr::Literal(Literal::new(value, ty))
    }

    pub fn local(name: &str) -> Self {
        Expr::Local(name.to_string())
    }

    pub fn constant(name: &str) -> Self {
        Expr::Constant(name.to_string())
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn cast(value: Expr, ty: ScalarType) -> Self {
        Expr::Cast { value: Box::new(value), ty }
    }

    pub fn call(callee: FunctionId, args: Vec<Expr>) -> Self {
        Expr::Call { callee: Callee::Function(callee), args }
    }

    pub fn call_symbol(symbol: &str, args: Vec<Expr>) -> Self {
        Expr::Call { callee: Callee::Symbol(symbol.to_string()), args }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}:{}", lit.value, lit.ty),
            Expr::Local(name) => write!(f, "{name}"),
            Expr::Constant(name) => write!(f, "const {name}"),
            Expr::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Expr::Cast { value, ty } => write!(f, "({value} as {ty})"),
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

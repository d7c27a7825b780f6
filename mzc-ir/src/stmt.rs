//! Statements
//!
//! Function bodies are ordered statement lists. Control flow is structured:
//! `Branch` and `Loop` own nested statement lists.

use mzc_common::ScalarType;
use serde::{Deserialize, Serialize};
use crate::Expr;

/// Output requests routed to the print/runtime support library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Print {
    /// Print a numeric value with the printer matching its type
    Value(Expr),
    /// Print a `u8` as a character
    Char(Expr),
    Newline,
    /// Print a string constant
    Str(String),
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    /// Declare a local, optionally initialising it
    Let {
        name: String,
        ty: ScalarType,
        #[serde(default)]
        init: Option<Expr>,
    },

    Assign {
        name: String,
        value: Expr,
    },

    /// Evaluate for side effects and discard the value
    Expr(Expr),

    Return(Option<Expr>),

    Branch {
        condition: Expr,
        then_block: Vec<Statement>,
        #[serde(default)]
        else_block: Vec<Statement>,
    },

    /// Pre-tested loop: runs `body` while `condition` is non-zero
    Loop {
        condition: Expr,
        body: Vec<Statement>,
    },

    Print(Print),
}

impl Statement {
    pub fn let_(name: &str, ty: ScalarType, init: Option<Expr>) -> Self {
        Statement::Let { name: name.to_string(), ty, init }
    }

    pub fn assign(name: &str, value: Expr) -> Self {
        Statement::Assign { name: name.to_string(), value }
    }

    pub fn ret(value: Expr) -> Self {
        Statement::Return(Some(value))
    }

    pub fn branch(condition: Expr, then_block: Vec<Statement>, else_block: Vec<Statement>) -> Self {
        Statement::Branch { condition, then_block, else_block }
    }

    pub fn while_(condition: Expr, body: Vec<Statement>) -> Self {
        Statement::Loop { condition, body }
    }

    pub fn print(value: Expr) -> Self {
        Statement::Print(Print::Value(value))
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, Statement::Return(_))
    }
}

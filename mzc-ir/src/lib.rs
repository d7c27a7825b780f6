//! MinZ C Backend - Function Descriptors
//!
//! This crate defines the input of the backend: the typed, already checked
//! function descriptors the front end produces. Everything is serde
//! serialisable so units can be handed over as JSON.
//!
//! ## Architecture
//!
//! - `ops` - Binary operators
//! - `expr` - Expressions, literals and call targets
//! - `stmt` - Statements, including structured control flow
//! - `function` - Function identities and descriptors
//! - `unit` - Translation units and module constants
//! - `builder` - Programmatic construction
//! - `samples` - Built-in sample units

pub use self::ops::BinaryOp;
pub use self::expr::{Callee, Expr, Literal};
pub use self::stmt::{Print, Statement};
pub use self::function::{FunctionDecl, FunctionId, Param};
pub use self::unit::{ConstantDecl, Unit};
pub use self::builder::FunctionBuilder;

mod ops;
mod expr;
mod stmt;
mod function;
mod unit;
mod builder;
pub mod samples;

#[cfg(test)]
mod tests;

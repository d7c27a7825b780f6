//! Function builder
//!
//! Provides a fluent way to construct function descriptors programmatically.
//! Used by tests and by the driver's built-in samples.

use mzc_common::ScalarType;
use crate::{Expr, FunctionDecl, FunctionId, Print, Statement};

/// Builder for one function descriptor
pub struct FunctionBuilder {
    function: FunctionDecl,
}

impl FunctionBuilder {
    pub fn new(path: &str, module: &str, name: &str) -> Self {
        Self {
            function: FunctionDecl::new(path, module, name, None),
        }
    }

    pub fn param(mut self, name: &str, ty: ScalarType) -> Self {
        self.function.add_param(name, ty);
        self
    }

    pub fn returns(mut self, ty: ScalarType) -> Self {
        self.function.return_type = Some(ty);
        self
    }

    pub fn external(mut self) -> Self {
        self.function.is_external = true;
        self
    }

    pub fn stmt(mut self, statement: Statement) -> Self {
        self.function.add_statement(statement);
        self
    }

    pub fn let_(self, name: &str, ty: ScalarType, init: Expr) -> Self {
        self.stmt(Statement::let_(name, ty, Some(init)))
    }

    pub fn assign(self, name: &str, value: Expr) -> Self {
        self.stmt(Statement::assign(name, value))
    }

    pub fn print(self, value: Expr) -> Self {
        self.stmt(Statement::Print(Print::Value(value)))
    }

    pub fn ret(self, value: Expr) -> Self {
        self.stmt(Statement::ret(value))
    }

    /// Identity of the function built so far
    pub fn id(&self) -> FunctionId {
        self.function.id()
    }

    pub fn build(self) -> FunctionDecl {
        self.function
    }
}

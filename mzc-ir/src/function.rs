//! Function descriptors
//!
//! A `FunctionDecl` is what the front end hands over for every source
//! function: its identity, typed parameters, return type and body.

use mzc_common::{ScalarType, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::Statement;

/// Full identity of a function, the input of name mangling
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionId {
    /// Absolute path of the directory holding the module
    pub path: String,
    pub module: String,
    pub name: String,
    pub param_types: Vec<ScalarType>,
}

impl FunctionId {
    pub fn new(path: &str, module: &str, name: &str, param_types: Vec<ScalarType>) -> Self {
        Self {
            path: path.to_string(),
            module: module.to_string(),
            name: name.to_string(),
            param_types,
        }
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() {
            write!(f, "{}::", self.path)?;
        }
        write!(f, "{}::{}(", self.module, self.name)?;
        for (i, ty) in self.param_types.iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            write!(f, "{ty}")?;
        }
        write!(f, ")")
    }
}

/// A typed function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: ScalarType,
}

impl Param {
    pub fn new(name: &str, ty: ScalarType) -> Self {
        Self { name: name.to_string(), ty }
    }
}

/// Function handed over by the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub path: String,
    pub module: String,
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    /// `None` for functions returning nothing
    #[serde(default)]
    pub return_type: Option<ScalarType>,
    #[serde(default)]
    pub body: Vec<Statement>,
    /// Declared here, defined in another unit
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl FunctionDecl {
    pub fn new(path: &str, module: &str, name: &str, return_type: Option<ScalarType>) -> Self {
        Self {
            path: path.to_string(),
            module: module.to_string(),
            name: name.to_string(),
            params: Vec::new(),
            return_type,
            body: Vec::new(),
            is_external: false,
            location: None,
        }
    }

    pub fn add_param(&mut self, name: &str, ty: ScalarType) {
        self.params.push(Param::new(name, ty));
    }

    pub fn add_statement(&mut self, statement: Statement) {
        self.body.push(statement);
    }

    pub fn param_types(&self) -> Vec<ScalarType> {
        self.params.iter().map(|p| p.ty).collect()
    }

    pub fn id(&self) -> FunctionId {
        FunctionId::new(&self.path, &self.module, &self.name, self.param_types())
    }
}

//! Translation units
//!
//! A `Unit` is everything emitted into one C file: its functions in
//! declaration order and the module-level read-only constants they may use.

use mzc_common::ScalarType;
use serde::{Deserialize, Serialize};
use crate::{FunctionDecl, FunctionId};

/// Module-level read-only constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantDecl {
    pub name: String,
    pub ty: ScalarType,
    pub value: i64,
}

impl ConstantDecl {
    pub fn new(name: &str, ty: ScalarType, value: i64) -> Self {
        Self { name: name.to_string(), ty, value }
    }
}

/// A complete translation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    #[serde(default)]
    pub constants: Vec<ConstantDecl>,
}

impl Unit {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            functions: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn add_function(&mut self, function: FunctionDecl) {
        self.functions.push(function);
    }

    pub fn add_constant(&mut self, constant: ConstantDecl) {
        self.constants.push(constant);
    }

    /// Functions with the given source name, in declaration order
    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FunctionDecl> + 'a {
        self.functions.iter().filter(move |f| f.name == name)
    }

    pub fn get_function(&self, id: &FunctionId) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| &f.id() == id)
    }

    pub fn get_constant(&self, name: &str) -> Option<&ConstantDecl> {
        self.constants.iter().find(|c| c.name == name)
    }
}

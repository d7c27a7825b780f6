//! Local slots and definite assignment
//!
//! Tracks every local and parameter of the function being lowered, plus
//! which of them are assigned on every path reaching the current point.
//! Reading a slot outside that set is an `UnboundLocal` error.

use std::collections::{BTreeSet, HashMap};
use mzc_common::{CompilerError, ScalarType};
use crate::mangle::is_identifier;
use super::ops::LocalInfo;

/// Slots assigned on every path reaching a program point
pub type DefinedSet = BTreeSet<usize>;

#[derive(Debug)]
pub struct LocalTable {
    function: String,
    slots: Vec<LocalInfo>,
    index: HashMap<String, usize>,
    defined: DefinedSet,
}

impl LocalTable {
    pub fn new(function: &str) -> Self {
        Self {
            function: function.to_string(),
            slots: Vec::new(),
            index: HashMap::new(),
            defined: DefinedSet::new(),
        }
    }

    /// Parameters are bound on entry
    pub fn declare_param(&mut self, name: &str, ty: ScalarType) -> Result<(), CompilerError> {
        let slot = self.insert(name, ty, true)?;
        self.defined.insert(slot);
        Ok(())
    }

    /// Declare a local. Re-declaring a name with the same type reuses its
    /// slot and makes it unassigned again; a different type is an error.
    pub fn declare_local(&mut self, name: &str, ty: ScalarType) -> Result<(), CompilerError> {
        if let Some(&slot) = self.index.get(name) {
            let existing = &self.slots[slot];
            if existing.is_param || existing.ty != ty {
                return Err(CompilerError::DuplicateLocal {
                    function: self.function.clone(),
                    local: name.to_string(),
                });
            }
            self.defined.remove(&slot);
            return Ok(());
        }
        self.insert(name, ty, false)?;
        Ok(())
    }

    fn insert(&mut self, name: &str, ty: ScalarType, is_param: bool) -> Result<usize, CompilerError> {
        if !is_identifier(name) {
            return Err(CompilerError::InvalidIdentifier { name: name.to_string() });
        }
        if self.index.contains_key(name) {
            return Err(CompilerError::DuplicateLocal {
                function: self.function.clone(),
                local: name.to_string(),
            });
        }
        let slot = self.slots.len();
        self.slots.push(LocalInfo { name: name.to_string(), ty, is_param, read: false });
        self.index.insert(name.to_string(), slot);
        Ok(slot)
    }

    fn slot(&self, name: &str) -> Result<usize, CompilerError> {
        self.index.get(name).copied().ok_or_else(|| CompilerError::UnknownLocal {
            function: self.function.clone(),
            local: name.to_string(),
        })
    }

    /// Type of a declared slot
    pub fn type_of(&self, name: &str) -> Result<ScalarType, CompilerError> {
        Ok(self.slots[self.slot(name)?].ty)
    }

    /// Record a read; the slot must be definitely assigned
    pub fn read(&mut self, name: &str) -> Result<ScalarType, CompilerError> {
        let slot = self.slot(name)?;
        if !self.defined.contains(&slot) {
            return Err(CompilerError::UnboundLocal {
                function: self.function.clone(),
                local: name.to_string(),
            });
        }
        self.slots[slot].read = true;
        Ok(self.slots[slot].ty)
    }

    /// Record an assignment
    pub fn assign(&mut self, name: &str) -> Result<ScalarType, CompilerError> {
        let slot = self.slot(name)?;
        self.defined.insert(slot);
        Ok(self.slots[slot].ty)
    }

    /// Snapshot of the assigned set, taken before entering a nested block
    pub fn snapshot(&self) -> DefinedSet {
        self.defined.clone()
    }

    pub fn restore(&mut self, defined: DefinedSet) {
        self.defined = defined;
    }

    pub fn into_slots(self) -> Vec<LocalInfo> {
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_requires_assignment() {
        let mut locals = LocalTable::new("main");
        locals.declare_param("a", ScalarType::U8).unwrap();
        locals.declare_local("x", ScalarType::U16).unwrap();

        assert_eq!(locals.read("a").unwrap(), ScalarType::U8);
        assert!(matches!(locals.read("x"), Err(CompilerError::UnboundLocal { .. })));
        locals.assign("x").unwrap();
        assert_eq!(locals.read("x").unwrap(), ScalarType::U16);
        assert!(matches!(locals.read("nope"), Err(CompilerError::UnknownLocal { .. })));
    }

    #[test]
    fn test_redeclaration() {
        let mut locals = LocalTable::new("f");
        locals.declare_param("a", ScalarType::U8).unwrap();
        locals.declare_local("i", ScalarType::U8).unwrap();
        locals.assign("i").unwrap();

        // same type: slot reused but unassigned again
        locals.declare_local("i", ScalarType::U8).unwrap();
        assert!(matches!(locals.read("i"), Err(CompilerError::UnboundLocal { .. })));

        assert!(matches!(locals.declare_local("i", ScalarType::U16), Err(CompilerError::DuplicateLocal { .. })));
        assert!(matches!(locals.declare_local("a", ScalarType::U8), Err(CompilerError::DuplicateLocal { .. })));
        assert!(matches!(locals.declare_param("a", ScalarType::U8), Err(CompilerError::DuplicateLocal { .. })));
        assert!(matches!(locals.declare_local("2x", ScalarType::U8), Err(CompilerError::InvalidIdentifier { .. })));
        assert_eq!(locals.into_slots().len(), 2);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut locals = LocalTable::new("f");
        locals.declare_local("x", ScalarType::U8).unwrap();
        let before = locals.snapshot();
        locals.assign("x").unwrap();
        assert!(locals.read("x").is_ok());
        locals.restore(before);
        assert!(locals.read("x").is_err());
    }
}

//! Virtual register allocation
//!
//! Registers are named `r1`, `r2`, ... in allocation order. Every call to
//! `allocate` hands out the next number, whether or not the register ends
//! up written, so numbering inside a function is strictly increasing and
//! reproducible. The allocator is reset at the start of every function.

use std::fmt;
use mzc_common::ScalarType;

/// First register number of every function
pub const FIRST_REGISTER: u32 = 1;

/// A function-scoped virtual register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualRegister(u32);

impl VirtualRegister {
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for VirtualRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Allocation record of one register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterInfo {
    pub reg: VirtualRegister,
    pub ty: ScalarType,
    /// Some operation stores into the register
    pub written: bool,
    /// Some operation reads the register
    pub read: bool,
}

/// Per-function register allocator
#[derive(Debug, Default)]
pub struct RegisterAllocator {
    registers: Vec<RegisterInfo>,
}

impl RegisterAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next register
    pub fn allocate(&mut self, ty: ScalarType) -> VirtualRegister {
        let reg = VirtualRegister(FIRST_REGISTER + self.registers.len() as u32);
        self.registers.push(RegisterInfo { reg, ty, written: false, read: false });
        reg
    }

    /// Start numbering again for the next function
    pub fn reset(&mut self) {
        self.registers.clear();
    }

    fn info_mut(&mut self, reg: VirtualRegister) -> &mut RegisterInfo {
        &mut self.registers[(reg.0 - FIRST_REGISTER) as usize]
    }

    pub fn mark_written(&mut self, reg: VirtualRegister) {
        self.info_mut(reg).written = true;
    }

    pub fn mark_read(&mut self, reg: VirtualRegister) {
        self.info_mut(reg).read = true;
    }

    /// Type of a register handed out by this allocator
    pub fn type_of(&self, reg: VirtualRegister) -> ScalarType {
        self.registers[(reg.0 - FIRST_REGISTER) as usize].ty
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    pub fn registers(&self) -> &[RegisterInfo] {
        &self.registers
    }

    /// Finish the session and return the allocation table
    pub fn take(&mut self) -> Vec<RegisterInfo> {
        std::mem::take(&mut self.registers)
    }
}

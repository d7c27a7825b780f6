//! MinZ C Backend
//!
//! Turns typed function descriptors into portable C99. The pipeline is
//! two stages: `lower` flattens every function into virtual-register
//! operations (mangling symbols and checking locals on the way), and
//! `emit` writes the lowered unit as text.

pub mod options;
pub mod mangle;
pub mod regalloc;
pub mod runtime;
pub mod lower;
pub mod emit;

pub use options::{CodegenOptions, ManglingMode, OverflowPolicy, RuntimeMode};
pub use mangle::{MangledSymbol, Mangler};
pub use regalloc::{RegisterAllocator, VirtualRegister};
pub use lower::{lower_unit, LoweredFunction, LoweredUnit};
pub use emit::CEmitter;

use log::info;
use mzc_common::{CompilerError, Diagnostic};
use mzc_ir::Unit;

/// Generated C text and the non-fatal findings collected on the way
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedUnit {
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lower and emit a unit
pub fn generate_c(unit: &Unit, options: &CodegenOptions) -> Result<GeneratedUnit, CompilerError> {
    info!("Generating C for unit '{}'", unit.name);
    let lowered = lower_unit(unit, options)?;
    let code = CEmitter::new(&lowered, options).emit()?;
    Ok(GeneratedUnit {
        code,
        diagnostics: lowered.diagnostics,
    })
}

/// Generate with the default options
pub fn generate_c_default(unit: &Unit) -> Result<GeneratedUnit, CompilerError> {
    generate_c(unit, &CodegenOptions::default())
}

#[cfg(test)]
mod tests;

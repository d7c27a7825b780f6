//! C emitter
//!
//! Writes a lowered unit as one C99 translation unit, in this order:
//! banner, includes, scalar typedefs, the string type, runtime helpers,
//! string constants, function prototypes, function definitions and the
//! optional `main` wrapper. Prototypes precede every definition so call
//! order within the unit does not matter. Output contains no timestamps
//! and iterates only ordered collections, so it is byte-for-byte
//! reproducible.

pub mod c_expr;
mod function;
mod preamble;

pub use function::{alias_prototype, signature, FunctionWriter};

use std::fmt::Write;
use log::debug;
use mzc_common::CompilerError;
use crate::lower::LoweredUnit;
use crate::mangle::string_constant_name;
use crate::options::CodegenOptions;

pub struct CEmitter<'a> {
    unit: &'a LoweredUnit,
    options: &'a CodegenOptions,
    output: String,
}

impl<'a> CEmitter<'a> {
    pub fn new(unit: &'a LoweredUnit, options: &'a CodegenOptions) -> Self {
        Self {
            unit,
            options,
            output: String::new(),
        }
    }

    pub fn emit(mut self) -> Result<String, CompilerError> {
        debug!("Emitting C for unit '{}'", self.unit.name);

        if self.options.banner {
            self.emit_banner()?;
        }
        preamble::write_includes(&mut self.output)?;
        preamble::write_types(&mut self.output)?;
        preamble::write_runtime(&mut self.output, self.options.runtime)?;
        self.emit_string_constants()?;
        self.emit_declarations()?;
        self.emit_definitions()?;
        self.emit_entry_wrapper()?;

        debug!("Emitted {} bytes for unit '{}'", self.output.len(), self.unit.name);
        Ok(self.output)
    }

    fn emit_banner(&mut self) -> Result<(), CompilerError> {
        writeln!(self.output, "// MinZ C generated code")?;
        writeln!(self.output, "// Unit: {}", self.unit.name)?;
        writeln!(self.output, "// Target: Standard C (C99)")?;
        writeln!(self.output)?;
        Ok(())
    }

    fn emit_string_constants(&mut self) -> Result<(), CompilerError> {
        let mut any = false;
        for function in &self.unit.functions {
            for (index, text) in function.strings.iter().enumerate() {
                if !any {
                    writeln!(self.output, "// String constants")?;
                    any = true;
                }
                writeln!(
                    self.output,
                    "static const String {} = {{ {}u, \"{}\" }};",
                    string_constant_name(&function.symbol, index),
                    text.len(),
                    c_expr::escape_string(text)
                )?;
            }
        }
        if any {
            writeln!(self.output)?;
        }
        Ok(())
    }

    fn emit_declarations(&mut self) -> Result<(), CompilerError> {
        if self.unit.functions.is_empty() && self.unit.aliases.is_empty() {
            return Ok(());
        }
        writeln!(self.output, "// Function declarations")?;
        for function in &self.unit.functions {
            writeln!(self.output, "{};", signature(function))?;
        }
        for alias in self.unit.aliases.values() {
            writeln!(self.output, "{};", alias_prototype(alias))?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn emit_definitions(&mut self) -> Result<(), CompilerError> {
        for function in self.unit.functions.iter().filter(|f| !f.is_external) {
            FunctionWriter::new(function, self.options).write(&mut self.output)?;
            writeln!(self.output)?;
        }
        Ok(())
    }

    fn emit_entry_wrapper(&mut self) -> Result<(), CompilerError> {
        let Some(entry) = &self.unit.entry else {
            return Ok(());
        };
        writeln!(self.output, "int main(void) {{")?;
        match entry.return_type {
            Some(_) => writeln!(self.output, "    return (int){}();", entry.symbol)?,
            None => {
                writeln!(self.output, "    {}();", entry.symbol)?;
                writeln!(self.output, "    return 0;")?;
            }
        }
        writeln!(self.output, "}}")?;
        Ok(())
    }
}

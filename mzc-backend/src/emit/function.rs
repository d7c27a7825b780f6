//! C text of one lowered function

use std::fmt::{self, Write};
use mzc_common::ScalarType;
use crate::lower::{LoweredFunction, Op, RuntimeArg, Signature};
use crate::mangle::{local_name, string_constant_name};
use crate::options::CodegenOptions;
use crate::regalloc::VirtualRegister;
use super::c_expr;

fn return_type_text(ty: Option<ScalarType>) -> &'static str {
    ty.map_or("void", |ty| ty.c_alias())
}

/// `u8 sym(u8 v_a, u8 v_b)`
pub fn signature(function: &LoweredFunction) -> String {
    let params = if function.params.is_empty() {
        "void".to_string()
    } else {
        function
            .params
            .iter()
            .map(|p| format!("{} {}", p.ty.c_alias(), local_name(&p.name)))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{} {}({})", return_type_text(function.return_type), function.symbol, params)
}

/// Prototype with unnamed parameters, used for call-site aliases
pub fn alias_prototype(signature: &Signature) -> String {
    let params = if signature.params.is_empty() {
        "void".to_string()
    } else {
        signature.params.iter().map(|ty| ty.c_alias()).collect::<Vec<_>>().join(", ")
    };
    format!("{} {}({})", return_type_text(signature.return_type), signature.symbol, params)
}

/// Writes the definition of one function
pub struct FunctionWriter<'f> {
    function: &'f LoweredFunction,
    options: &'f CodegenOptions,
}

impl<'f> FunctionWriter<'f> {
    pub fn new(function: &'f LoweredFunction, options: &'f CodegenOptions) -> Self {
        Self { function, options }
    }

    fn ty(&self, reg: VirtualRegister) -> Result<ScalarType, fmt::Error> {
        self.function.register_type(reg).ok_or(fmt::Error)
    }

    pub fn write(&self, out: &mut String) -> fmt::Result {
        let function = self.function;
        writeln!(out, "// {}", function.name)?;
        writeln!(out, "{} {{", signature(function))?;

        let mut header = false;
        for local in function.locals.iter().filter(|l| !l.is_param) {
            writeln!(out, "    {} {} = 0;", local.ty.c_alias(), local_name(&local.name))?;
            header = true;
        }
        let declared: Vec<_> = function
            .registers
            .iter()
            .filter(|info| info.written || self.options.declare_reserved_registers)
            .collect();
        for info in &declared {
            writeln!(out, "    {} {} = 0;", info.ty.c_alias(), info.reg)?;
            header = true;
        }
        for local in function.locals.iter().filter(|l| !l.read) {
            writeln!(out, "    (void){};", local_name(&local.name))?;
            header = true;
        }
        for info in declared.iter().filter(|info| !info.read) {
            writeln!(out, "    (void){};", info.reg)?;
            header = true;
        }
        if header && !function.ops.is_empty() {
            writeln!(out)?;
        }

        self.write_ops(out, &function.ops, 1)?;
        writeln!(out, "}}")
    }

    fn write_ops(&self, out: &mut String, ops: &[Op], depth: usize) -> fmt::Result {
        let pad = "    ".repeat(depth);
        for op in ops {
            match op {
                Op::LoadConst { dest, value } => {
                    writeln!(out, "{pad}{dest} = {};", c_expr::literal(*value))?;
                }
                Op::LoadLocal { dest, local } => {
                    writeln!(out, "{pad}{dest} = {};", local_name(local))?;
                }
                Op::Copy { dest, src } | Op::Cast { dest, src } => {
                    let text = c_expr::cast(self.ty(*src)?, self.ty(*dest)?, &src.to_string());
                    writeln!(out, "{pad}{dest} = {text};")?;
                }
                Op::StoreLocal { local, src } => {
                    let target = self.function.local(local).map(|l| l.ty).ok_or(fmt::Error)?;
                    let text = c_expr::cast(self.ty(*src)?, target, &src.to_string());
                    writeln!(out, "{pad}{} = {text};", local_name(local))?;
                }
                Op::Binary { dest, op, lhs, rhs } => {
                    let text = c_expr::binary(*op, self.ty(*lhs)?, self.ty(*dest)?, &lhs.to_string(), &rhs.to_string());
                    writeln!(out, "{pad}{dest} = {text};")?;
                }
                Op::Call { dest, callee, args } => {
                    let args = args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                    match dest {
                        Some(dest) => writeln!(out, "{pad}{dest} = {callee}({args});")?,
                        None => writeln!(out, "{pad}{callee}({args});")?,
                    }
                }
                Op::Runtime { function, arg } => match arg {
                    Some(RuntimeArg::Register(reg)) => writeln!(out, "{pad}{function}({reg});")?,
                    Some(RuntimeArg::Str(index)) => {
                        let name = string_constant_name(&self.function.symbol, *index);
                        writeln!(out, "{pad}{function}(&{name});")?;
                    }
                    None => writeln!(out, "{pad}{function}();")?,
                },
                Op::Return(Some(reg)) => writeln!(out, "{pad}return {reg};")?,
                Op::Return(None) => writeln!(out, "{pad}return;")?,
                Op::Branch { cond, then_ops, else_ops } => {
                    writeln!(out, "{pad}if ({cond}) {{")?;
                    self.write_ops(out, then_ops, depth + 1)?;
                    if !else_ops.is_empty() {
                        writeln!(out, "{pad}}} else {{")?;
                        self.write_ops(out, else_ops, depth + 1)?;
                    }
                    writeln!(out, "{pad}}}")?;
                }
                Op::Loop { cond_ops, cond, body } => {
                    writeln!(out, "{pad}while (1) {{")?;
                    self.write_ops(out, cond_ops, depth + 1)?;
                    writeln!(out, "{pad}    if (!{cond}) break;")?;
                    self.write_ops(out, body, depth + 1)?;
                    writeln!(out, "{pad}}}")?;
                }
            }
        }
        Ok(())
    }
}

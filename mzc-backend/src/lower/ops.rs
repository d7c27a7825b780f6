//! Lowered form of a function
//!
//! Lowering flattens every expression into register operations. Control
//! flow stays structured so the emitter can write plain `if`/`while`.

use std::fmt;
use mzc_common::ScalarType;
use mzc_ir::{BinaryOp, Param};
use crate::mangle::MangledSymbol;
use crate::regalloc::{RegisterInfo, VirtualRegister};
use crate::runtime::RuntimeFn;

/// Argument of a runtime call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeArg {
    Register(VirtualRegister),
    /// Index into the function's string table
    Str(usize),
}

/// One register-level operation
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// `dest = value`, value already wrapped to the register's type
    LoadConst { dest: VirtualRegister, value: i64 },
    LoadLocal { dest: VirtualRegister, local: String },
    /// `dest = src`, converting when the types differ
    Copy { dest: VirtualRegister, src: VirtualRegister },
    StoreLocal { local: String, src: VirtualRegister },
    Binary {
        dest: VirtualRegister,
        op: BinaryOp,
        lhs: VirtualRegister,
        rhs: VirtualRegister,
    },
    Cast { dest: VirtualRegister, src: VirtualRegister },
    /// `dest` is `None` when the result is discarded
    Call {
        dest: Option<VirtualRegister>,
        callee: MangledSymbol,
        args: Vec<VirtualRegister>,
    },
    Runtime { function: RuntimeFn, arg: Option<RuntimeArg> },
    Return(Option<VirtualRegister>),
    Branch {
        cond: VirtualRegister,
        then_ops: Vec<Op>,
        else_ops: Vec<Op>,
    },
    /// `cond_ops` are re-evaluated before every iteration
    Loop {
        cond_ops: Vec<Op>,
        cond: VirtualRegister,
        body: Vec<Op>,
    },
}

impl fmt::Display for Op {
    /// Single-line form; nested operation lists are summarised
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::LoadConst { dest, value } => write!(f, "{dest} = {value}"),
            Op::LoadLocal { dest, local } => write!(f, "{dest} = {local}"),
            Op::Copy { dest, src } => write!(f, "{dest} = {src}"),
            Op::StoreLocal { local, src } => write!(f, "{local} = {src}"),
            Op::Binary { dest, op, lhs, rhs } => write!(f, "{dest} = {lhs} {op} {rhs}"),
            Op::Cast { dest, src } => write!(f, "{dest} = cast {src}"),
            Op::Call { dest, callee, args } => {
                if let Some(dest) = dest {
                    write!(f, "{dest} = ")?;
                }
                write!(f, "call {callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Op::Runtime { function, arg } => match arg {
                Some(RuntimeArg::Register(reg)) => write!(f, "{function}({reg})"),
                Some(RuntimeArg::Str(index)) => write!(f, "{function}(str{index})"),
                None => write!(f, "{function}()"),
            },
            Op::Return(Some(reg)) => write!(f, "return {reg}"),
            Op::Return(None) => write!(f, "return"),
            Op::Branch { cond, then_ops, else_ops } => {
                write!(f, "if {cond} [{} ops] else [{} ops]", then_ops.len(), else_ops.len())
            }
            Op::Loop { cond_ops, cond, body } => {
                write!(f, "loop [{} ops] while {cond} [{} ops]", cond_ops.len(), body.len())
            }
        }
    }
}

/// A local or parameter slot of the lowered function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalInfo {
    pub name: String,
    pub ty: ScalarType,
    pub is_param: bool,
    /// Some operation loads the slot
    pub read: bool,
}

/// Output of function lowering, input of the emitter
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredFunction {
    /// Source name, for comments
    pub name: String,
    pub symbol: MangledSymbol,
    pub params: Vec<Param>,
    pub return_type: Option<ScalarType>,
    /// Defined in another unit; only a prototype is emitted
    pub is_external: bool,
    pub registers: Vec<RegisterInfo>,
    /// Locals in declaration order, parameters first
    pub locals: Vec<LocalInfo>,
    /// String constants referenced by `RuntimeArg::Str`
    pub strings: Vec<String>,
    pub ops: Vec<Op>,
}

impl LoweredFunction {
    /// Lowered form of a function declared but not defined here
    pub fn external(name: &str, symbol: MangledSymbol, params: Vec<Param>, return_type: Option<ScalarType>) -> Self {
        Self {
            name: name.to_string(),
            symbol,
            params,
            return_type,
            is_external: true,
            registers: Vec::new(),
            locals: Vec::new(),
            strings: Vec::new(),
            ops: Vec::new(),
        }
    }

    pub fn register_type(&self, reg: VirtualRegister) -> Option<ScalarType> {
        self.registers.iter().find(|info| info.reg == reg).map(|info| info.ty)
    }

    pub fn local(&self, name: &str) -> Option<&LocalInfo> {
        self.locals.iter().find(|local| local.name == name)
    }

    fn fmt_ops(&self, f: &mut fmt::Formatter<'_>, ops: &[Op], depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        for op in ops {
            match op {
                Op::Branch { cond, then_ops, else_ops } => {
                    writeln!(f, "{indent}if {cond}:")?;
                    self.fmt_ops(f, then_ops, depth + 1)?;
                    if !else_ops.is_empty() {
                        writeln!(f, "{indent}else:")?;
                        self.fmt_ops(f, else_ops, depth + 1)?;
                    }
                }
                Op::Loop { cond_ops, cond, body } => {
                    writeln!(f, "{indent}loop:")?;
                    self.fmt_ops(f, cond_ops, depth + 1)?;
                    writeln!(f, "{indent}  break unless {cond}")?;
                    self.fmt_ops(f, body, depth + 1)?;
                }
                other => writeln!(f, "{indent}{other}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for LoweredFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function {} (", self.symbol)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            write!(f, "{}: {}", param.name, param.ty)?;
        }
        write!(f, ")")?;
        if let Some(ty) = self.return_type {
            write!(f, " -> {ty}")?;
        }
        if self.is_external {
            return writeln!(f, " external");
        }
        writeln!(f)?;
        for info in &self.registers {
            write!(f, "  reg {}: {}", info.reg, info.ty)?;
            match (info.written, info.read) {
                (false, _) => writeln!(f, " (reserved)")?,
                (true, false) => writeln!(f, " (unread)")?,
                (true, true) => writeln!(f)?,
            }
        }
        self.fmt_ops(f, &self.ops, 1)
    }
}

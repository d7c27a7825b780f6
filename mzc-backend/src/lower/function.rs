//! Function Lowering - Handles lowering of one function
//!
//! A function goes through three states: the prologue reserves one
//! register per parameter, statement lowering turns the body into
//! register operations, and the epilogue checks that a value-returning
//! function cannot fall off its end. The register allocator and local
//! table are owned by the lowering and never shared between functions.

use std::collections::BTreeMap;
use log::{debug, info, trace};
use mzc_common::{CompilerError, Diagnostic, ScalarType};
use mzc_ir::{Expr, FunctionDecl, FunctionId, Print, Statement};
use crate::mangle::MangledSymbol;
use crate::regalloc::{RegisterAllocator, VirtualRegister};
use crate::runtime::RuntimeFn;
use super::locals::LocalTable;
use super::ops::{LoweredFunction, Op, RuntimeArg};
use super::LoweringContext;

/// Where the lowering of a function currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoweringState {
    Prologue,
    Statements,
    Epilogue,
}

/// Whether control can continue past a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continues,
    Returns,
}

/// Result of lowering one function
#[derive(Debug)]
pub struct LoweringOutput {
    pub function: LoweredFunction,
    /// Call-site spellings that differ from the definition's symbol
    pub aliases: BTreeMap<MangledSymbol, FunctionId>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lowering session for one function
pub struct FunctionLowering<'a> {
    pub(super) ctx: &'a LoweringContext<'a>,
    pub(super) function: &'a FunctionDecl,
    /// `module::name`, used in error messages
    pub(super) name: String,
    symbol: MangledSymbol,
    state: LoweringState,
    pub(super) regs: RegisterAllocator,
    pub(super) locals: LocalTable,
    strings: Vec<String>,
    pub(super) aliases: BTreeMap<MangledSymbol, FunctionId>,
    pub(super) diagnostics: Vec<Diagnostic>,
}

impl<'a> FunctionLowering<'a> {
    pub fn new(ctx: &'a LoweringContext<'a>, function: &'a FunctionDecl) -> Result<Self, CompilerError> {
        let symbol = ctx.mangler.resolve(&function.id())?;
        let name = format!("{}::{}", function.module, function.name);
        Ok(Self {
            ctx,
            function,
            locals: LocalTable::new(&name),
            name,
            symbol,
            state: LoweringState::Prologue,
            regs: RegisterAllocator::new(),
            strings: Vec::new(),
            aliases: BTreeMap::new(),
            diagnostics: Vec::new(),
        })
    }

    /// Run the whole lowering and hand back the lowered function
    pub fn lower(mut self) -> Result<LoweringOutput, CompilerError> {
        let function = self.function;
        info!("Lowering function '{}' as {}", self.name, self.symbol);

        self.regs.reset();
        self.prologue()?;

        self.state = LoweringState::Statements;
        let mut ops = Vec::new();
        let flow = self.lower_block(&function.body, &mut ops)?;

        self.state = LoweringState::Epilogue;
        self.epilogue(flow)?;

        debug!("Function '{}' uses {} registers and {} ops", self.name, self.regs.len(), ops.len());

        let lowered = LoweredFunction {
            name: function.name.clone(),
            symbol: self.symbol,
            params: function.params.clone(),
            return_type: function.return_type,
            is_external: false,
            registers: self.regs.take(),
            locals: self.locals.into_slots(),
            strings: self.strings,
            ops,
        };
        Ok(LoweringOutput {
            function: lowered,
            aliases: self.aliases,
            diagnostics: self.diagnostics,
        })
    }

    fn prologue(&mut self) -> Result<(), CompilerError> {
        assert_eq!(self.state, LoweringState::Prologue, "Prologue must run first");
        let function = self.function;
        for param in &function.params {
            self.locals.declare_param(&param.name, param.ty)?;
            let reg = self.regs.allocate(param.ty);
            trace!("  Reserved {} for parameter '{}'", reg, param.name);
        }
        Ok(())
    }

    fn epilogue(&mut self, flow: Flow) -> Result<(), CompilerError> {
        assert_eq!(self.state, LoweringState::Epilogue, "Epilogue must run after the body");
        if self.function.return_type.is_some() && flow != Flow::Returns {
            return Err(CompilerError::MissingReturn { function: self.name.clone() });
        }
        Ok(())
    }

    /// Allocate a register that the next pushed op writes
    pub(super) fn define(&mut self, ty: ScalarType) -> VirtualRegister {
        let reg = self.regs.allocate(ty);
        self.regs.mark_written(reg);
        reg
    }

    pub(super) fn use_reg(&mut self, reg: VirtualRegister) {
        self.regs.mark_read(reg);
    }

    pub(super) fn lower_block(&mut self, statements: &[Statement], ops: &mut Vec<Op>) -> Result<Flow, CompilerError> {
        for (i, statement) in statements.iter().enumerate() {
            if self.lower_statement(statement, ops)? == Flow::Returns {
                let skipped = statements.len() - i - 1;
                if skipped > 0 {
                    debug!("  Skipping {} unreachable statement(s) after return in '{}'", skipped, self.name);
                }
                return Ok(Flow::Returns);
            }
        }
        Ok(Flow::Continues)
    }

    fn lower_statement(&mut self, statement: &Statement, ops: &mut Vec<Op>) -> Result<Flow, CompilerError> {
        debug_assert_eq!(self.state, LoweringState::Statements);
        trace!("  Lowering statement {:?}", statement);

        match statement {
            Statement::Let { name, ty, init } => {
                self.locals.declare_local(name, *ty)?;
                let slot = self.regs.allocate(*ty);
                trace!("  Reserved {} for local '{}'", slot, name);
                if let Some(init) = init {
                    let value = self.lower_expr(init, ops)?;
                    self.store_local(name, value, ops)?;
                }
            }

            Statement::Assign { name, value } => {
                self.locals.type_of(name)?;
                let value = self.lower_expr(value, ops)?;
                self.store_local(name, value, ops)?;
            }

            Statement::Expr(Expr::Call { callee, args }) => {
                self.lower_call(callee, args, false, ops)?;
            }

            Statement::Expr(expr) => {
                let reg = self.lower_expr(expr, ops)?;
                trace!("  Discarding {}", reg);
            }

            Statement::Return(value) => {
                let reg = match (value, self.function.return_type) {
                    (Some(expr), Some(_)) => {
                        let reg = self.lower_expr(expr, ops)?;
                        self.use_reg(reg);
                        Some(reg)
                    }
                    (None, None) => None,
                    (None, Some(_)) => {
                        return Err(CompilerError::MissingReturn { function: self.name.clone() });
                    }
                    (Some(_), None) => {
                        return Err(CompilerError::InternalError {
                            message: format!("{} returns a value but declares no return type", self.name),
                        });
                    }
                };
                ops.push(Op::Return(reg));
                return Ok(Flow::Returns);
            }

            Statement::Branch { condition, then_block, else_block } => {
                let cond = self.lower_expr(condition, ops)?;
                self.use_reg(cond);

                let entry = self.locals.snapshot();
                let mut then_ops = Vec::new();
                let then_flow = self.lower_block(then_block, &mut then_ops)?;
                let after_then = self.locals.snapshot();

                self.locals.restore(entry);
                let mut else_ops = Vec::new();
                let else_flow = self.lower_block(else_block, &mut else_ops)?;
                let after_else = self.locals.snapshot();

                // A local is assigned after the branch only if every arm
                // that falls through assigns it
                let joined = match (then_flow, else_flow) {
                    (Flow::Returns, _) => after_else,
                    (_, Flow::Returns) => after_then,
                    _ => after_then.intersection(&after_else).copied().collect(),
                };
                self.locals.restore(joined);

                ops.push(Op::Branch { cond, then_ops, else_ops });
                if then_flow == Flow::Returns && else_flow == Flow::Returns {
                    return Ok(Flow::Returns);
                }
            }

            Statement::Loop { condition, body } => {
                let entry = self.locals.snapshot();

                let mut cond_ops = Vec::new();
                let cond = self.lower_expr(condition, &mut cond_ops)?;
                self.use_reg(cond);

                let mut body_ops = Vec::new();
                self.lower_block(body, &mut body_ops)?;

                // The body may run zero times
                self.locals.restore(entry);
                ops.push(Op::Loop { cond_ops, cond, body: body_ops });
            }

            Statement::Print(print) => self.lower_print(print, ops)?,
        }

        Ok(Flow::Continues)
    }

    fn lower_print(&mut self, print: &Print, ops: &mut Vec<Op>) -> Result<(), CompilerError> {
        match print {
            Print::Value(expr) => {
                let reg = self.lower_expr(expr, ops)?;
                let ty = self.regs.type_of(reg);
                let function = RuntimeFn::printer_for(ty).ok_or_else(|| CompilerError::NoRuntimeSupport {
                    function: self.name.clone(),
                    ty,
                })?;
                self.use_reg(reg);
                ops.push(Op::Runtime { function, arg: Some(RuntimeArg::Register(reg)) });
            }
            Print::Char(expr) => {
                let reg = self.lower_expr(expr, ops)?;
                self.use_reg(reg);
                ops.push(Op::Runtime { function: RuntimeFn::PrintChar, arg: Some(RuntimeArg::Register(reg)) });
            }
            Print::Newline => {
                ops.push(Op::Runtime { function: RuntimeFn::PrintNewline, arg: None });
            }
            Print::Str(text) => {
                if text.len() > u16::MAX as usize {
                    return Err(CompilerError::WidthOverflow {
                        function: self.name.clone(),
                        value: text.len() as i64,
                        ty: ScalarType::U16,
                    });
                }
                let index = self.strings.len();
                self.strings.push(text.clone());
                ops.push(Op::Runtime { function: RuntimeFn::PrintString, arg: Some(RuntimeArg::Str(index)) });
            }
        }
        Ok(())
    }

    fn store_local(&mut self, name: &str, src: VirtualRegister, ops: &mut Vec<Op>) -> Result<(), CompilerError> {
        self.locals.assign(name)?;
        self.use_reg(src);
        ops.push(Op::StoreLocal { local: name.to_string(), src });
        Ok(())
    }
}

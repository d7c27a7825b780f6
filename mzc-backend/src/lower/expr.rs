//! Expression lowering
//!
//! Every expression node lands in a fresh register. Call arguments are
//! evaluated left to right and then bound, one register per argument,
//! immediately before the call.

use log::{trace, warn};
use mzc_common::{CompilerError, Diagnostic, ScalarType};
use mzc_ir::{Callee, Expr};
use crate::mangle::MangledSymbol;
use crate::options::OverflowPolicy;
use crate::regalloc::VirtualRegister;
use super::function::FunctionLowering;
use super::ops::Op;
use super::Signature;

impl<'a> FunctionLowering<'a> {
    pub(super) fn lower_expr(&mut self, expr: &Expr, ops: &mut Vec<Op>) -> Result<VirtualRegister, CompilerError> {
        match expr {
            Expr::Literal(lit) => {
                let value = self.check_literal(lit.value, lit.ty)?;
                let dest = self.define(lit.ty);
                ops.push(Op::LoadConst { dest, value });
                Ok(dest)
            }

            Expr::Local(name) => {
                let ty = self.locals.read(name)?;
                let dest = self.define(ty);
                ops.push(Op::LoadLocal { dest, local: name.clone() });
                Ok(dest)
            }

            Expr::Constant(name) => {
                let ctx = self.ctx;
                let constant = ctx.constants.get(name.as_str()).ok_or_else(|| CompilerError::UnknownConstant {
                    function: self.name.clone(),
                    name: name.clone(),
                })?;
                let value = self.check_literal(constant.value, constant.ty)?;
                let dest = self.define(constant.ty);
                ops.push(Op::LoadConst { dest, value });
                Ok(dest)
            }

            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.lower_expr(lhs, ops)?;
                let rhs = self.lower_expr(rhs, ops)?;
                self.use_reg(lhs);
                self.use_reg(rhs);
                let ty = if op.is_comparison() {
                    ScalarType::U8
                } else {
                    self.regs.type_of(lhs)
                };
                let dest = self.define(ty);
                ops.push(Op::Binary { dest, op: *op, lhs, rhs });
                Ok(dest)
            }

            Expr::Cast { value, ty } => {
                let src = self.lower_expr(value, ops)?;
                self.use_reg(src);
                let dest = self.define(*ty);
                ops.push(Op::Cast { dest, src });
                Ok(dest)
            }

            Expr::Call { callee, args } => {
                self.lower_call(callee, args, true, ops)?.ok_or_else(|| CompilerError::InternalError {
                    message: format!("in {}: {} returns nothing but its value is used", self.name, callee),
                })
            }
        }
    }

    /// Lower a call. With `capture` the result lands in a fresh register;
    /// without it the result register is only reserved.
    pub(super) fn lower_call(
        &mut self,
        callee: &Callee,
        args: &[Expr],
        capture: bool,
        ops: &mut Vec<Op>,
    ) -> Result<Option<VirtualRegister>, CompilerError> {
        let (symbol, signature) = self.resolve_callee(callee)?;
        if args.len() != signature.params.len() {
            return Err(CompilerError::ArityMismatch {
                function: self.name.clone(),
                callee: callee.to_string(),
                expected: signature.params.len(),
                found: args.len(),
            });
        }

        let mut evaluated = Vec::with_capacity(args.len());
        for arg in args {
            evaluated.push(self.lower_expr(arg, ops)?);
        }

        let mut bound = Vec::with_capacity(evaluated.len());
        for (src, &ty) in evaluated.into_iter().zip(&signature.params) {
            self.use_reg(src);
            let dest = self.define(ty);
            self.use_reg(dest);
            ops.push(Op::Copy { dest, src });
            bound.push(dest);
        }

        let dest = match (signature.return_type, capture) {
            (Some(ty), true) => Some(self.define(ty)),
            (Some(ty), false) => {
                let reserved = self.regs.allocate(ty);
                trace!("  Result of {} discarded, {} stays unwritten", symbol, reserved);
                None
            }
            (None, _) => None,
        };

        ops.push(Op::Call { dest, callee: symbol, args: bound });
        Ok(dest)
    }

    fn resolve_callee(&mut self, callee: &Callee) -> Result<(MangledSymbol, &'a Signature), CompilerError> {
        let ctx = self.ctx;
        match callee {
            Callee::Function(id) => {
                let signature = ctx
                    .signatures
                    .get(id)
                    .ok_or_else(|| CompilerError::UnknownFunction { name: id.to_string() })?;
                Ok((signature.symbol.clone(), signature))
            }
            Callee::Symbol(raw) => {
                let resolved = ctx.mangler.resolve_symbol(raw)?;
                let signature = ctx
                    .signatures
                    .get(&resolved.target)
                    .ok_or_else(|| CompilerError::UnknownFunction { name: raw.clone() })?;
                if resolved.is_alias {
                    self.aliases.insert(resolved.symbol.clone(), resolved.target);
                }
                Ok((resolved.symbol, signature))
            }
        }
    }

    /// Range-check a literal against its type. Out-of-range values either
    /// abort or are wrapped with a warning, depending on the options.
    fn check_literal(&mut self, value: i64, ty: ScalarType) -> Result<i64, CompilerError> {
        if ty.fits(value) {
            return Ok(value);
        }
        match self.ctx.options.overflow {
            OverflowPolicy::Error => Err(CompilerError::WidthOverflow {
                function: self.name.clone(),
                value,
                ty,
            }),
            OverflowPolicy::Warn => {
                let wrapped = ty.wrap(value);
                warn!("In {}: literal {} does not fit in {}, wrapping to {}", self.name, value, ty, wrapped);
                self.diagnostics.push(
                    Diagnostic::warning(
                        format!("in {}: literal {} does not fit in {}", self.name, value, ty),
                        self.function.location.clone(),
                    )
                    .with_note(format!("the value wraps to {wrapped}")),
                );
                Ok(wrapped)
            }
        }
    }
}

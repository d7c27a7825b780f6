//! C expression text
//!
//! Width emulation happens here. Arithmetic is carried out in a 32-bit
//! (or, for fixed-point products and quotients, 64-bit) C type and the
//! result is narrowed back to the destination type. Narrowing into `u24`
//! masks to 24 bits; narrowing into `i24` also sign-extends bit 23, so a
//! 24-bit register always holds a value in its declared range.

use mzc_common::ScalarType;
use mzc_ir::BinaryOp;

/// Name of the shift macro of a fixed-point type, e.g. `F8_8_SHIFT`
pub fn shift_macro(ty: ScalarType) -> String {
    format!("{}_SHIFT", ty.c_alias().to_uppercase())
}

/// Convert `expr` to `ty`, wrapping to the type's logical width
pub fn narrow(ty: ScalarType, expr: &str) -> String {
    match ty {
        ScalarType::U24 => format!("(u24)((uint32_t)({expr}) & 0xFFFFFFu)"),
        ScalarType::I24 => {
            format!("(i24)((int32_t)(((uint32_t)({expr}) & 0xFFFFFFu) ^ 0x800000u) - 0x800000)")
        }
        _ => format!("({})({expr})", ty.c_alias()),
    }
}

/// C text of an already wrapped constant
pub fn literal(value: i64) -> String {
    if value == i32::MIN as i64 {
        // -2147483648 is a negated unsigned constant in C
        "(-2147483647 - 1)".to_string()
    } else if value > i32::MAX as i64 {
        format!("{value}u")
    } else {
        value.to_string()
    }
}

/// Operand cast for operations whose result depends on signedness
fn ordered(ty: ScalarType, operand: &str) -> String {
    if ty.is_signed() {
        format!("(int32_t){operand}")
    } else {
        format!("(uint32_t){operand}")
    }
}

/// Right-hand side of `dest = lhs op rhs`.
///
/// `operand_ty` is the type of both operands, `result_ty` the type of the
/// destination register (`u8` for comparisons).
pub fn binary(op: BinaryOp, operand_ty: ScalarType, result_ty: ScalarType, lhs: &str, rhs: &str) -> String {
    let sym = op.symbol();

    if operand_ty.is_fixed_point() {
        let shift = shift_macro(operand_ty);
        match op {
            BinaryOp::Mul => {
                return narrow(
                    result_ty,
                    &format!("((int64_t){lhs} * (int64_t){rhs}) / ((int64_t)1 << {shift})"),
                );
            }
            BinaryOp::Div => {
                return narrow(
                    result_ty,
                    &format!("((int64_t){lhs} * ((int64_t)1 << {shift})) / (int64_t){rhs}"),
                );
            }
            _ => {}
        }
    }

    let inner = match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => {
            format!("(uint32_t){lhs} {sym} (uint32_t){rhs}")
        }
        BinaryOp::Shl => format!("(uint32_t){lhs} << ((uint32_t){rhs} & 31u)"),
        BinaryOp::Shr => format!("{} >> ((uint32_t){rhs} & 31u)", ordered(operand_ty, lhs)),
        BinaryOp::Div | BinaryOp::Rem => {
            format!("{} {sym} {}", ordered(operand_ty, lhs), ordered(operand_ty, rhs))
        }
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            return format!("(u8)({} {sym} {})", ordered(operand_ty, lhs), ordered(operand_ty, rhs));
        }
    };
    narrow(result_ty, &inner)
}

/// Right-hand side of a conversion from `from` to `to`
pub fn cast(from: ScalarType, to: ScalarType, src: &str) -> String {
    if from == to {
        return src.to_string();
    }
    match (from.shift(), to.shift()) {
        (None, None) => narrow(to, &ordered(from, src)),
        (None, Some(_)) => narrow(to, &format!("(int64_t){src} * ((int64_t)1 << {})", shift_macro(to))),
        // Truncates toward zero
        (Some(_), None) => narrow(to, &format!("(int64_t){src} / ((int64_t)1 << {})", shift_macro(from))),
        (Some(from_shift), Some(to_shift)) => {
            let (from_macro, to_macro) = (shift_macro(from), shift_macro(to));
            if to_shift >= from_shift {
                narrow(to, &format!("(int64_t){src} * ((int64_t)1 << ({to_macro} - {from_macro}))"))
            } else {
                narrow(to, &format!("(int64_t){src} / ((int64_t)1 << ({from_macro} - {to_macro}))"))
            }
        }
    }
}

/// Body of a C string literal; non-printable bytes become octal escapes
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\r' => out.push_str("\\r"),
            // keeps trigraphs out of the output
            b'?' => out.push_str("\\?"),
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out
}

//! Fixed preamble of every generated file: includes, scalar typedefs,
//! fixed-point shift macros, the string type and the runtime helpers.

use std::fmt::{self, Write};
use mzc_common::ScalarType;
use crate::options::RuntimeMode;
use crate::runtime::{RuntimeFn, RuntimeParam};
use super::c_expr::shift_macro;

pub fn write_includes(out: &mut String) -> fmt::Result {
    writeln!(out, "#include <stdint.h>")?;
    writeln!(out, "#include <stdio.h>")?;
    writeln!(out)
}

pub fn write_types(out: &mut String) -> fmt::Result {
    writeln!(out, "// Scalar types")?;
    for ty in ScalarType::ALL.iter().filter(|ty| !ty.is_fixed_point()) {
        write!(out, "typedef {} {};", ty.c_container(), ty.c_alias())?;
        match ty {
            ScalarType::U24 => writeln!(out, " // 24-bit, upper byte kept zero")?,
            ScalarType::I24 => writeln!(out, " // 24-bit, upper byte kept sign-extended")?,
            _ => writeln!(out)?,
        }
    }
    writeln!(out)?;

    writeln!(out, "// Fixed-point types (raw scaled integers)")?;
    for ty in ScalarType::ALL.iter().filter(|ty| ty.is_fixed_point()) {
        writeln!(out, "typedef {} {};", ty.c_container(), ty.c_alias())?;
    }
    for ty in ScalarType::ALL.iter().filter(|ty| ty.is_fixed_point()) {
        if let Some(shift) = ty.shift() {
            writeln!(out, "#define {} {}", shift_macro(*ty), shift)?;
        }
    }
    writeln!(out)?;

    writeln!(out, "// String type (length-prefixed)")?;
    writeln!(out, "typedef struct {{")?;
    writeln!(out, "    uint16_t len;")?;
    writeln!(out, "    const char* data;")?;
    writeln!(out, "}} String;")?;
    writeln!(out)
}

pub fn write_runtime(out: &mut String, mode: RuntimeMode) -> fmt::Result {
    match mode {
        RuntimeMode::Extern => {
            writeln!(out, "// Runtime support (linked separately)")?;
            for function in RuntimeFn::all() {
                writeln!(out, "{};", function.c_prototype())?;
            }
        }
        RuntimeMode::Inline => {
            writeln!(out, "// Runtime support")?;
            for function in RuntimeFn::all() {
                writeln!(out, "{} {{", function.c_prototype())?;
                write_runtime_body(out, function)?;
                writeln!(out, "}}")?;
                writeln!(out)?;
            }
        }
    }
    writeln!(out)
}

fn write_runtime_body(out: &mut String, function: RuntimeFn) -> fmt::Result {
    match function {
        RuntimeFn::PrintChar => writeln!(out, "    putchar(value);"),
        RuntimeFn::PrintNewline => writeln!(out, "    putchar('\\n');"),
        RuntimeFn::PrintString => {
            writeln!(out, "    if (str && str->data) {{")?;
            writeln!(out, "        printf(\"%.*s\", (int)str->len, str->data);")?;
            writeln!(out, "    }}")
        }
        RuntimeFn::PrintFixed(ty) => {
            let shift = shift_macro(ty);
            writeln!(out, "    int64_t raw = value;")?;
            writeln!(out, "    if (raw < 0) {{")?;
            writeln!(out, "        putchar('-');")?;
            writeln!(out, "        raw = -raw;")?;
            writeln!(out, "    }}")?;
            writeln!(
                out,
                "    printf(\"%lld.%04lld\", (long long)(raw >> {shift}), \
                 (long long)(((raw & (((int64_t)1 << {shift}) - 1)) * 10000) >> {shift}));"
            )
        }
        other => match other.param() {
            RuntimeParam::Scalar(ty) if ty == ScalarType::U24 => {
                writeln!(out, "    printf(\"%lu\", (unsigned long)value);")
            }
            RuntimeParam::Scalar(ty) if ty.is_signed() => writeln!(out, "    printf(\"%d\", (int)value);"),
            _ => writeln!(out, "    printf(\"%u\", (unsigned)value);"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_section() {
        let mut out = String::new();
        write_types(&mut out).unwrap();
        assert!(out.contains("typedef uint32_t u24; // 24-bit, upper byte kept zero\n"));
        assert!(out.contains("typedef int32_t i24;"));
        assert!(out.contains("typedef int16_t f8_8;\n"));
        assert!(out.contains("typedef int32_t f8_16;\n"));
        assert!(out.contains("#define F_16_SHIFT 16\n"));
        assert!(out.contains("} String;\n"));
    }

    #[test]
    fn test_runtime_modes() {
        let mut inline = String::new();
        write_runtime(&mut inline, RuntimeMode::Inline).unwrap();
        assert!(inline.contains("void print_u8(u8 value) {\n    printf(\"%u\", (unsigned)value);\n}"));
        assert!(inline.contains("void print_u24(u24 value) {\n    printf(\"%lu\", (unsigned long)value);\n}"));
        assert!(inline.contains("void print_i16(i16 value) {\n    printf(\"%d\", (int)value);\n}"));
        assert!(inline.contains("void print_f8_8(f8_8 value) {"));

        let mut external = String::new();
        write_runtime(&mut external, RuntimeMode::Extern).unwrap();
        assert!(external.contains("void print_newline(void);\n"));
        assert!(!external.contains("printf"));
    }
}

//! Print/runtime support ABI
//!
//! Generated code calls a small fixed set of output helpers. The table
//! below is the single source of their names and parameter types; the
//! emitter either defines them inline or only declares them.

use std::fmt;
use mzc_common::ScalarType;

/// One runtime support function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuntimeFn {
    PrintChar,
    PrintU8,
    PrintU8Decimal,
    PrintU16,
    PrintU24,
    PrintI8,
    PrintI16,
    PrintNewline,
    PrintString,
    /// Integer-only decimal printer for one fixed-point format
    PrintFixed(ScalarType),
}

/// Parameter of a runtime function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeParam {
    None,
    Scalar(ScalarType),
    /// `const String*`
    StringRef,
}

impl RuntimeFn {
    /// Every runtime function in preamble order
    pub fn all() -> Vec<RuntimeFn> {
        let mut all = vec![
            RuntimeFn::PrintChar,
            RuntimeFn::PrintU8,
            RuntimeFn::PrintU8Decimal,
            RuntimeFn::PrintU16,
            RuntimeFn::PrintU24,
            RuntimeFn::PrintI8,
            RuntimeFn::PrintI16,
            RuntimeFn::PrintNewline,
            RuntimeFn::PrintString,
        ];
        all.extend(
            ScalarType::ALL
                .iter()
                .filter(|ty| ty.is_fixed_point())
                .map(|&ty| RuntimeFn::PrintFixed(ty)),
        );
        all
    }

    /// Printer for a numeric value of type `ty`, if the runtime has one
    pub fn printer_for(ty: ScalarType) -> Option<RuntimeFn> {
        match ty {
            ScalarType::U8 => Some(RuntimeFn::PrintU8),
            ScalarType::U16 => Some(RuntimeFn::PrintU16),
            ScalarType::U24 => Some(RuntimeFn::PrintU24),
            ScalarType::I8 => Some(RuntimeFn::PrintI8),
            ScalarType::I16 => Some(RuntimeFn::PrintI16),
            ScalarType::U32 | ScalarType::I24 | ScalarType::I32 => None,
            fixed => Some(RuntimeFn::PrintFixed(fixed)),
        }
    }

    pub fn name(&self) -> String {
        match self {
            RuntimeFn::PrintChar => "print_char".to_string(),
            RuntimeFn::PrintU8 => "print_u8".to_string(),
            RuntimeFn::PrintU8Decimal => "print_u8_decimal".to_string(),
            RuntimeFn::PrintU16 => "print_u16".to_string(),
            RuntimeFn::PrintU24 => "print_u24".to_string(),
            RuntimeFn::PrintI8 => "print_i8".to_string(),
            RuntimeFn::PrintI16 => "print_i16".to_string(),
            RuntimeFn::PrintNewline => "print_newline".to_string(),
            RuntimeFn::PrintString => "print_string".to_string(),
            RuntimeFn::PrintFixed(ty) => format!("print_{}", ty.c_alias()),
        }
    }

    pub fn param(&self) -> RuntimeParam {
        match self {
            RuntimeFn::PrintChar | RuntimeFn::PrintU8 | RuntimeFn::PrintU8Decimal => {
                RuntimeParam::Scalar(ScalarType::U8)
            }
            RuntimeFn::PrintU16 => RuntimeParam::Scalar(ScalarType::U16),
            RuntimeFn::PrintU24 => RuntimeParam::Scalar(ScalarType::U24),
            RuntimeFn::PrintI8 => RuntimeParam::Scalar(ScalarType::I8),
            RuntimeFn::PrintI16 => RuntimeParam::Scalar(ScalarType::I16),
            RuntimeFn::PrintNewline => RuntimeParam::None,
            RuntimeFn::PrintString => RuntimeParam::StringRef,
            RuntimeFn::PrintFixed(ty) => RuntimeParam::Scalar(*ty),
        }
    }

    /// C prototype without the trailing semicolon
    pub fn c_prototype(&self) -> String {
        match self.param() {
            RuntimeParam::None => format!("void {}(void)", self.name()),
            RuntimeParam::Scalar(ty) => format!("void {}({} value)", self.name(), ty.c_alias()),
            RuntimeParam::StringRef => format!("void {}(const String* str)", self.name()),
        }
    }
}

impl fmt::Display for RuntimeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printer_selection() {
        assert_eq!(RuntimeFn::printer_for(ScalarType::U8), Some(RuntimeFn::PrintU8));
        assert_eq!(RuntimeFn::printer_for(ScalarType::U24), Some(RuntimeFn::PrintU24));
        assert_eq!(RuntimeFn::printer_for(ScalarType::I32), None);
        assert_eq!(RuntimeFn::printer_for(ScalarType::F8p8).map(|f| f.name()), Some("print_f8_8".to_string()));
    }

    #[test]
    fn test_prototypes() {
        assert_eq!(RuntimeFn::PrintU8.c_prototype(), "void print_u8(u8 value)");
        assert_eq!(RuntimeFn::PrintNewline.c_prototype(), "void print_newline(void)");
        assert_eq!(RuntimeFn::PrintString.c_prototype(), "void print_string(const String* str)");
    }

    #[test]
    fn test_table_is_complete() {
        let all = RuntimeFn::all();
        assert_eq!(all.len(), 14);
        assert_eq!(all[0], RuntimeFn::PrintChar);
        // every printer the lowering can pick is in the table
        for ty in ScalarType::ALL {
            if let Some(printer) = RuntimeFn::printer_for(ty) {
                assert!(all.contains(&printer), "{ty}");
            }
        }
    }
}

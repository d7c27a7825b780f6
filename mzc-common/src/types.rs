//! Scalar type and width model
//!
//! This module defines the fixed set of scalar types the backend understands
//! and the storage-width emulation rules that go with them. Nothing here
//! performs code generation; it only classifies types and reports widths,
//! shifts and value ranges to the lowering engine and the emitter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing an unknown scalar type name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown scalar type '{0}'")]
pub struct UnknownScalarType(pub String);

/// Fixed-point layout: an integer container with an implicit binary point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedPointFormat {
    /// Integer bits plus fraction bits
    pub total_bits: u8,
    /// Number of bits after the binary point (the shift constant)
    pub fraction_bits: u8,
    pub signed: bool,
}

impl FixedPointFormat {
    pub const fn new(total_bits: u8, fraction_bits: u8, signed: bool) -> Self {
        Self { total_bits, fraction_bits, signed }
    }

    pub fn integer_bits(&self) -> u8 {
        self.total_bits - self.fraction_bits
    }

    /// Raw container value of `numerator / denominator`, truncated toward zero.
    ///
    /// Computed with integers only.
    pub fn raw_from_ratio(&self, numerator: i64, denominator: i64) -> Option<i64> {
        if denominator == 0 {
            return None;
        }
        numerator
            .checked_mul(1i64 << self.fraction_bits)
            .map(|scaled| scaled / denominator)
    }
}

/// Scalar types supported by the backend
///
/// 24-bit types have no native C counterpart; they live in a 32-bit container
/// whose upper byte is kept zero-extended (`u24`) or sign-extended (`i24`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    U8,
    U16,
    /// 24-bit unsigned, emulated in a 32-bit container
    U24,
    U32,
    I8,
    I16,
    /// 24-bit signed, emulated in a 32-bit container
    I24,
    I32,
    /// 8.8 fixed-point in a 16-bit container
    #[serde(rename = "f8_8")]
    F8p8,
    /// .8 fixed-point in a 16-bit container
    #[serde(rename = "f_8")]
    Fp8,
    /// .16 fixed-point in a 16-bit container
    #[serde(rename = "f_16")]
    Fp16,
    /// 16.8 fixed-point in a 32-bit container
    #[serde(rename = "f16_8")]
    F16p8,
    /// 8.16 fixed-point in a 32-bit container
    #[serde(rename = "f8_16")]
    F8p16,
}

impl ScalarType {
    /// Every scalar type, in preamble order
    pub const ALL: [ScalarType; 13] = [
        ScalarType::U8,
        ScalarType::U16,
        ScalarType::U24,
        ScalarType::U32,
        ScalarType::I8,
        ScalarType::I16,
        ScalarType::I24,
        ScalarType::I32,
        ScalarType::F8p8,
        ScalarType::Fp8,
        ScalarType::Fp16,
        ScalarType::F16p8,
        ScalarType::F8p16,
    ];

    /// Storage width of the container in bits: always 8, 16 or 32
    pub fn width(&self) -> u8 {
        match self {
            ScalarType::U8 | ScalarType::I8 => 8,
            ScalarType::U16 | ScalarType::I16 => 16,
            ScalarType::U24 | ScalarType::I24 => 32,
            ScalarType::U32 | ScalarType::I32 => 32,
            ScalarType::F8p8 | ScalarType::Fp8 | ScalarType::Fp16 => 16,
            ScalarType::F16p8 | ScalarType::F8p16 => 32,
        }
    }

    /// Number of bits the type logically holds
    pub fn logical_bits(&self) -> u8 {
        match self.fixed_point() {
            Some(format) => format.total_bits,
            None => match self {
                ScalarType::U24 | ScalarType::I24 => 24,
                _ => self.width(),
            },
        }
    }

    pub fn is_signed(&self) -> bool {
        !matches!(
            self,
            ScalarType::U8 | ScalarType::U16 | ScalarType::U24 | ScalarType::U32
        )
    }

    pub fn is_fixed_point(&self) -> bool {
        self.fixed_point().is_some()
    }

    pub fn fixed_point(&self) -> Option<FixedPointFormat> {
        match self {
            ScalarType::F8p8 => Some(FixedPointFormat::new(16, 8, true)),
            ScalarType::Fp8 => Some(FixedPointFormat::new(8, 8, true)),
            ScalarType::Fp16 => Some(FixedPointFormat::new(16, 16, true)),
            ScalarType::F16p8 => Some(FixedPointFormat::new(24, 8, true)),
            ScalarType::F8p16 => Some(FixedPointFormat::new(24, 16, true)),
            _ => None,
        }
    }

    /// Fraction bit count used for scaling conversions
    pub fn shift(&self) -> Option<u8> {
        self.fixed_point().map(|format| format.fraction_bits)
    }

    /// Name of the typedef emitted in the preamble
    pub fn c_alias(&self) -> &'static str {
        match self {
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U24 => "u24",
            ScalarType::U32 => "u32",
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I24 => "i24",
            ScalarType::I32 => "i32",
            ScalarType::F8p8 => "f8_8",
            ScalarType::Fp8 => "f_8",
            ScalarType::Fp16 => "f_16",
            ScalarType::F16p8 => "f16_8",
            ScalarType::F8p16 => "f8_16",
        }
    }

    /// The `<stdint.h>` type backing the alias
    pub fn c_container(&self) -> &'static str {
        match (self.width(), self.is_signed()) {
            (8, false) => "uint8_t",
            (8, true) => "int8_t",
            (16, false) => "uint16_t",
            (16, true) => "int16_t",
            (_, false) => "uint32_t",
            (_, true) => "int32_t",
        }
    }

    /// Short name used in mangled parameter suffixes
    pub fn mangle_name(&self) -> &'static str {
        self.c_alias()
    }

    /// Bits that survive wraparound: the logical width for integers, the
    /// container width for fixed-point raw values
    fn wrap_bits(&self) -> u32 {
        if self.is_fixed_point() {
            self.width() as u32
        } else {
            self.logical_bits() as u32
        }
    }

    pub fn min_value(&self) -> i64 {
        if self.is_signed() {
            -(1i64 << (self.wrap_bits() - 1))
        } else {
            0
        }
    }

    pub fn max_value(&self) -> i64 {
        if self.is_signed() {
            (1i64 << (self.wrap_bits() - 1)) - 1
        } else {
            (1i64 << self.wrap_bits()) - 1
        }
    }

    /// Whether `value` is inside the declared range
    pub fn fits(&self, value: i64) -> bool {
        value >= self.min_value() && value <= self.max_value()
    }

    /// Reduce `value` modulo the type's width, reinterpreting the sign bit
    /// for signed types. `U8.wrap(300) == 44`.
    pub fn wrap(&self, value: i64) -> i64 {
        let bits = self.wrap_bits();
        let modulus = 1i64 << bits;
        let low = value & (modulus - 1);
        if self.is_signed() && low & (1i64 << (bits - 1)) != 0 {
            low - modulus
        } else {
            low
        }
    }

    /// Bit pattern stored in the container, extended to 32 bits
    pub fn to_container(&self, value: i64) -> u32 {
        self.wrap(value) as u32
    }

    /// Value read back from a container bit pattern
    pub fn from_container(&self, bits: u32) -> i64 {
        self.wrap(bits as i64)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.c_alias())
    }
}

impl FromStr for ScalarType {
    type Err = UnknownScalarType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarType::ALL
            .iter()
            .copied()
            .find(|ty| ty.c_alias() == s)
            .ok_or_else(|| UnknownScalarType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_are_native_containers() {
        for ty in ScalarType::ALL {
            assert!(matches!(ty.width(), 8 | 16 | 32), "{ty} has width {}", ty.width());
            assert_eq!(ty.width(), ty.width());
        }
        assert_eq!(ScalarType::U24.width(), 32);
        assert_eq!(ScalarType::U24.logical_bits(), 24);
        assert_eq!(ScalarType::F16p8.width(), 32);
    }

    #[test]
    fn test_fixed_point_shifts() {
        assert_eq!(ScalarType::F8p8.shift(), Some(8));
        assert_eq!(ScalarType::Fp8.shift(), Some(8));
        assert_eq!(ScalarType::Fp16.shift(), Some(16));
        assert_eq!(ScalarType::F16p8.shift(), Some(8));
        assert_eq!(ScalarType::F8p16.shift(), Some(16));
        assert_eq!(ScalarType::U16.shift(), None);
        assert!(!ScalarType::I32.is_fixed_point());
        assert_eq!(ScalarType::F8p16.fixed_point().unwrap().integer_bits(), 8);
    }

    #[test]
    fn test_u8_addition_wraps() {
        assert_eq!(ScalarType::U8.wrap(100 + 200), 44);
        assert_eq!(ScalarType::U8.wrap(10 + 20), 30);
        assert_eq!(ScalarType::I8.wrap(127 + 1), -128);
        assert_eq!(ScalarType::U16.wrap(-1), 65535);
    }

    #[test]
    fn test_24_bit_round_trip() {
        let unsigned = [0, 1, 0x7F_FFFF, 0x80_0000, 0xFF_FFFF];
        for v in unsigned {
            let bits = ScalarType::U24.to_container(v);
            assert_eq!(bits & 0xFF00_0000, 0);
            assert_eq!(ScalarType::U24.from_container(bits), v);
        }

        let signed = [-(1 << 23), -1, 0, 1, (1 << 23) - 1];
        for v in signed {
            let bits = ScalarType::I24.to_container(v);
            assert_eq!(ScalarType::I24.from_container(bits), v);
        }
        // upper byte is a sign extension
        assert_eq!(ScalarType::I24.to_container(-1), 0xFFFF_FFFF);
    }

    #[test]
    fn test_ranges() {
        assert_eq!(ScalarType::U24.max_value(), 0xFF_FFFF);
        assert_eq!(ScalarType::I24.min_value(), -(1 << 23));
        assert!(ScalarType::U8.fits(255));
        assert!(!ScalarType::U8.fits(256));
        assert!(!ScalarType::I16.fits(-32769));
        assert_eq!(ScalarType::F8p8.max_value(), i16::MAX as i64);
    }

    #[test]
    fn test_fixed_point_ratio() {
        let format = ScalarType::F8p8.fixed_point().unwrap();
        assert_eq!(format.raw_from_ratio(3, 2), Some(384));
        assert_eq!(format.raw_from_ratio(-1, 4), Some(-64));
        assert_eq!(format.raw_from_ratio(1, 0), None);
    }

    #[test]
    fn test_names_round_trip() {
        for ty in ScalarType::ALL {
            assert_eq!(ty.c_alias().parse::<ScalarType>(), Ok(ty));
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.c_alias()));
        }
        assert!("u64".parse::<ScalarType>().is_err());
    }

    #[test]
    fn test_containers() {
        assert_eq!(ScalarType::U24.c_container(), "uint32_t");
        assert_eq!(ScalarType::I24.c_container(), "int32_t");
        assert_eq!(ScalarType::Fp8.c_container(), "int16_t");
        assert_eq!(ScalarType::F8p16.c_container(), "int32_t");
    }
}

//! Code generation options
//!
//! Options can be built in code or loaded from JSON by the driver. Every
//! field has a default, so a partial JSON object is a valid configuration.

use mzc_common::CompilerError;
use serde::{Deserialize, Serialize};

/// How path and module components are sanitised when mangling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManglingMode {
    /// Every non-identifier character becomes `_`; raw call-site symbols must
    /// already be in this form
    #[default]
    Canonical,
    /// Only path separators are replaced; hyphens and other characters are
    /// kept verbatim and raw call-site symbols pass through unchanged
    Legacy,
}

/// Whether the print/runtime support functions are defined in the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeMode {
    /// Emit full definitions so the unit is self-contained
    #[default]
    Inline,
    /// Emit prototypes only; the runtime is linked separately
    Extern,
}

/// What to do with a literal outside its declared type's range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Record a warning and emit the wrapped value
    #[default]
    Warn,
    /// Abort emission of the unit
    Error,
}

/// Options for C generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenOptions {
    pub mangling: ManglingMode,
    /// Separator placed before every parameter type in a mangled symbol
    pub param_delimiter: char,
    pub runtime: RuntimeMode,
    /// Source name of the start function wrapped by the C `main`; `None`
    /// disables the wrapper
    pub entry_point: Option<String>,
    pub overflow: OverflowPolicy,
    /// Declare every allocated register, including reserved slots that are
    /// never written
    pub declare_reserved_registers: bool,
    /// Emit the leading comment block
    pub banner: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            mangling: ManglingMode::Canonical,
            param_delimiter: '$',
            runtime: RuntimeMode::Inline,
            entry_point: Some("main".to_string()),
            overflow: OverflowPolicy::Warn,
            declare_reserved_registers: false,
            banner: true,
        }
    }
}

impl CodegenOptions {
    /// Options reproducing the historical symbol spelling
    pub fn legacy() -> Self {
        Self {
            mangling: ManglingMode::Legacy,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), CompilerError> {
        let d = self.param_delimiter;
        if d.is_ascii_alphanumeric() || d == '_' || d.is_whitespace() || !d.is_ascii() {
            return Err(CompilerError::InvalidOption {
                message: format!("parameter delimiter '{d}' must be an ASCII non-identifier character"),
            });
        }
        if matches!(d, '/' | '\\') {
            return Err(CompilerError::InvalidOption {
                message: format!("parameter delimiter '{d}' collides with path separators"),
            });
        }
        if let Some(entry) = &self.entry_point {
            if entry.is_empty() {
                return Err(CompilerError::InvalidOption {
                    message: "entry point name is empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

//! MinZ C Backend - Common Types and Utilities
//!
//! This crate contains the scalar type model, error definitions, and
//! diagnostics shared by the descriptor crate, the backend and the driver.

pub mod error;
pub mod types;
pub mod source_loc;

pub use error::{CompilerError, Diagnostic, ErrorReporter, Severity};
pub use types::{FixedPointFormat, ScalarType, UnknownScalarType};
pub use source_loc::SourceLocation;

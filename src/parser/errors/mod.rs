//! Parser error handling module
//!
//! - Categorized error codes for filtering and documentation
//! - Context-aware error messages
//! - Line/column diagnostics for reporting

mod codes;
mod context;
mod diagnostic;
mod error;

pub use codes::ErrorCode;
pub use context::ParseContext;
pub use diagnostic::Diagnostic;
pub use error::{Severity, SyntaxError, SyntaxErrorBuilder};

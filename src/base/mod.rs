//! Foundation types for the KerML/SysML front end.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Name`], [`Interner`] - String interning
//! - [`SourceUnit`], [`Language`] - Source identity and dialect detection
//!
//! This module has NO dependencies on other crate modules.

mod intern;
mod position;
mod source;

pub use intern::{Interner, Name, is_plain_identifier};
pub use position::{LineCol, LineIndex};
pub use source::{KERML_EXTENSION, Language, SYSML_EXTENSION, SourceUnit};

// Re-export text-size types for convenience
pub use text_size::{self, TextRange, TextSize};

//! # kerml
//!
//! Front end for the KerML and SysML v2 textual notations: lexing,
//! error-recovering parsing into a lossless CST, and lowering into an
//! arena model of elements, relationships and expressions.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project   → directory discovery, parallel multi-file parsing
//!   ↓
//! syntax    → arena model, builder, walker, relationship graph, printer
//!   ↓
//! parser    → Logos lexer, recursive-descent parser, diagnostics
//!   ↓
//! base      → Primitives (SourceUnit, Name interning, LineIndex)
//! ```
//!
//! ```
//! let result = kerml::parse("package P { part def A; part a : A; }", "model.sysml");
//! assert!(result.success);
//! assert_eq!(result.model.top_level().len(), 1);
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → project)
// ============================================================================

/// Foundation types: SourceUnit, Name interning, TextRange
pub mod base;

/// Parser: Logos lexer, recursive-descent parser, diagnostics
pub mod parser;

/// Syntax: arena model, builder, traversal, relationship graph
pub mod syntax;

/// Project loading: file discovery, parallel parsing
pub mod project;

mod error;

// Re-export commonly needed items
pub use parser::{Diagnostic, ErrorCode, Severity, keywords};

pub use error::{Error, Result};
pub use syntax::{
    ExpressionResult, Model, ParseOptions, ParseResult, parse, parse_expression, parse_with,
};

// Re-export foundation types
pub use base::{Interner, Language, LineCol, LineIndex, Name, SourceUnit, TextRange, TextSize};

pub use tokio_util::sync::CancellationToken;

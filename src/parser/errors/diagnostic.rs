//! User-facing diagnostics with line/column positions.

use std::fmt;

use smol_str::SmolStr;

use super::codes::ErrorCode;
use super::error::{Severity, SyntaxError};
use crate::base::LineIndex;

/// A reported problem, positioned for humans.
///
/// `line` and `column` are one-based; `column` and `length` count
/// characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    pub source_unit: SmolStr,
    pub line: u32,
    pub column: u32,
    pub length: u32,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn from_syntax_error(error: &SyntaxError, unit: &SmolStr, index: &LineIndex) -> Self {
        let (line, column) = index.line_col(error.range.start()).one_based();
        Self {
            severity: error.severity,
            code: error.code,
            message: error.message.clone(),
            source_unit: unit.clone(),
            line,
            column,
            length: index.char_len(error.range),
            hint: error.hint.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}[{}]: {}",
            self.source_unit,
            self.line,
            self.column,
            self.severity.as_str(),
            self.code,
            self.message
        )
    }
}

//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical and literal errors
//! - E02xx: Structural errors (braces, semicolons)
//! - E03xx: Declaration errors (definitions, usages)
//! - E04xx: Expression errors
//! - E05xx: Import/alias errors
//! - E06xx: Relationship errors
//! - E07xx: Action/state errors
//! - E08xx: Requirement/view errors
//! - E09xx: Generic errors and aborted parses
//!
//! Warnings use W{category}{number} with the same categories.

use std::fmt;

/// Error codes for parser diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical and literal errors
    // =========================================================================
    /// Invalid or unexpected character in source
    E0101,
    /// Unterminated string literal
    E0102,
    /// Unterminated block comment or note
    E0103,
    /// Invalid numeric literal (overflow, non-finite real)
    E0104,
    /// Unterminated quoted name
    E0105,

    // =========================================================================
    // E02xx: Structural errors (braces, semicolons, delimiters)
    // =========================================================================
    /// Missing semicolon
    E0201,
    /// Unclosed brace `{`
    E0202,
    /// Unclosed parenthesis `(`
    E0203,
    /// Unclosed bracket `[`
    E0204,
    /// Unexpected closing delimiter
    E0205,

    // =========================================================================
    // E03xx: Declaration errors
    // =========================================================================
    /// Missing identifier/name
    E0301,
    /// Missing type after a typing operator
    E0305,
    /// Invalid usage declaration
    E0306,
    /// Missing body (neither `;` nor `{`)
    E0307,

    // =========================================================================
    // E04xx: Expression errors
    // =========================================================================
    /// Result expression where no result is allowed
    E0401,
    /// Missing operand after an operator
    E0402,
    /// Unclosed argument list
    E0404,
    /// Invalid argument list
    E0405,
    /// Missing expression where expected
    E0406,

    // =========================================================================
    // E05xx: Import/alias errors
    // =========================================================================
    /// Invalid import path
    E0501,
    /// Invalid alias declaration
    E0503,
    /// Invalid filter expression
    E0504,

    // =========================================================================
    // E06xx: Relationship errors
    // =========================================================================
    /// Invalid relationship target
    E0601,
    /// Missing relationship operand
    E0602,
    /// More than one conjugation on a type
    E0603,

    // =========================================================================
    // E07xx: Action/state errors
    // =========================================================================
    /// Invalid action body element
    E0701,
    /// Invalid state body element
    E0702,
    /// Invalid transition syntax
    E0703,

    // =========================================================================
    // E08xx: Requirement/view errors
    // =========================================================================
    /// Invalid requirement body element
    E0801,

    // =========================================================================
    // E09xx: Generic errors
    // =========================================================================
    /// Unexpected token in current context
    E0901,
    /// Expected a specific token
    E0902,
    /// Nesting exceeded the configured depth
    E0903,
    /// Parse cancelled by the caller
    E0904,

    // =========================================================================
    // W03xx: Warnings
    // =========================================================================
    /// Duplicate member name in one namespace
    W0301,
    /// Deprecated syntax
    W0302,
}

impl ErrorCode {
    /// Get the string representation of the error code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexical
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0103 => "E0103",
            Self::E0104 => "E0104",
            Self::E0105 => "E0105",
            // Structural
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0204 => "E0204",
            Self::E0205 => "E0205",
            // Declaration
            Self::E0301 => "E0301",
            Self::E0305 => "E0305",
            Self::E0306 => "E0306",
            Self::E0307 => "E0307",
            // Expression
            Self::E0401 => "E0401",
            Self::E0402 => "E0402",
            Self::E0404 => "E0404",
            Self::E0405 => "E0405",
            Self::E0406 => "E0406",
            // Import
            Self::E0501 => "E0501",
            Self::E0503 => "E0503",
            Self::E0504 => "E0504",
            // Relationship
            Self::E0601 => "E0601",
            Self::E0602 => "E0602",
            Self::E0603 => "E0603",
            // Action/state
            Self::E0701 => "E0701",
            Self::E0702 => "E0702",
            Self::E0703 => "E0703",
            // Requirement
            Self::E0801 => "E0801",
            // Generic
            Self::E0901 => "E0901",
            Self::E0902 => "E0902",
            Self::E0903 => "E0903",
            Self::E0904 => "E0904",
            // Warnings
            Self::W0301 => "W0301",
            Self::W0302 => "W0302",
        }
    }

    /// Get a short description of the error category
    pub fn category_description(&self) -> &'static str {
        match self {
            Self::E0101 | Self::E0102 | Self::E0103 | Self::E0105 => "lexical error",
            Self::E0104 => "literal error",
            Self::E0201 | Self::E0202 | Self::E0203 | Self::E0204 | Self::E0205 => {
                "structural error"
            }
            Self::E0301 | Self::E0305 | Self::E0306 | Self::E0307 => "declaration error",
            Self::E0401 | Self::E0402 | Self::E0404 | Self::E0405 | Self::E0406 => {
                "expression error"
            }
            Self::E0501 | Self::E0503 | Self::E0504 => "import error",
            Self::E0601 | Self::E0602 | Self::E0603 => "relationship error",
            Self::E0701 | Self::E0702 | Self::E0703 => "action/state error",
            Self::E0801 => "requirement error",
            Self::E0901 | Self::E0902 => "syntax error",
            Self::E0903 => "recursion limit",
            Self::E0904 => "cancelled",
            Self::W0301 | Self::W0302 => "warning",
        }
    }

    /// Get the default message template for this error code
    pub fn default_message(&self) -> &'static str {
        match self {
            // Lexical
            Self::E0101 => "invalid character",
            Self::E0102 => "unterminated string literal",
            Self::E0103 => "unterminated comment",
            Self::E0104 => "invalid numeric literal",
            Self::E0105 => "unterminated quoted name",
            // Structural
            Self::E0201 => "missing semicolon",
            Self::E0202 => "unclosed brace",
            Self::E0203 => "unclosed parenthesis",
            Self::E0204 => "unclosed bracket",
            Self::E0205 => "unexpected closing delimiter",
            // Declaration
            Self::E0301 => "missing identifier",
            Self::E0305 => "missing type",
            Self::E0306 => "invalid usage declaration",
            Self::E0307 => "missing body",
            // Expression
            Self::E0401 => "result expression not allowed here",
            Self::E0402 => "missing operand",
            Self::E0404 => "unclosed argument list",
            Self::E0405 => "invalid argument",
            Self::E0406 => "expected expression",
            // Import
            Self::E0501 => "invalid import path",
            Self::E0503 => "invalid alias",
            Self::E0504 => "invalid filter expression",
            // Relationship
            Self::E0601 => "invalid relationship target",
            Self::E0602 => "missing relationship operand",
            Self::E0603 => "a type can have at most one conjugation",
            // Action/state
            Self::E0701 => "invalid action body element",
            Self::E0702 => "invalid state body element",
            Self::E0703 => "invalid transition syntax",
            // Requirement
            Self::E0801 => "invalid requirement body element",
            // Generic
            Self::E0901 => "unexpected token",
            Self::E0902 => "expected token",
            Self::E0903 => "recursion limit exceeded",
            Self::E0904 => "cancellation requested",
            // Warnings
            Self::W0301 => "duplicate member name",
            Self::W0302 => "deprecated syntax",
        }
    }

    /// Check if this is a structural error (delimiter-related)
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::E0201 | Self::E0202 | Self::E0203 | Self::E0204 | Self::E0205
        )
    }

    /// Check if this code is a warning
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::W0301 | Self::W0302)
    }

    /// Check if parsing of the unit stops at this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::E0101 | Self::E0102 | Self::E0103 | Self::E0105 | Self::E0903 | Self::E0904
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::E0201.as_str(), "E0201");
        assert_eq!(ErrorCode::E0903.as_str(), "E0903");
        assert_eq!(ErrorCode::W0302.as_str(), "W0302");
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::E0603), "E0603");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::E0201.category_description(), "structural error");
        assert_eq!(ErrorCode::E0104.category_description(), "literal error");
        assert_eq!(ErrorCode::E0603.category_description(), "relationship error");
    }

    #[test]
    fn test_fatal_and_warning_codes() {
        assert!(ErrorCode::E0101.is_fatal());
        assert!(ErrorCode::E0904.is_fatal());
        assert!(!ErrorCode::E0902.is_fatal());
        assert!(ErrorCode::W0301.is_warning());
        assert!(!ErrorCode::E0301.is_warning());
    }
}

//! Syntax error types
//!
//! A [`SyntaxError`] is what the parser and builder record internally: a
//! code, a byte range, and optionally what was expected and what was found.
//! They are turned into line/column [`Diagnostic`](super::Diagnostic)s once
//! the parse is over.

use rowan::{TextRange, TextSize};

use super::codes::ErrorCode;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum Severity {
    /// A hard error; the unit does not parse successfully
    #[default]
    Error,
    /// Reported but does not affect success
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A syntax error with its location and context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Human-readable error message
    pub message: String,
    /// Source location
    pub range: TextRange,
    /// Categorized error code
    pub code: ErrorCode,
    pub severity: Severity,
    /// Descriptions of the tokens that would have been accepted
    pub expected: Vec<String>,
    /// Description of the token actually found
    pub found: Option<String>,
    /// Optional suggestion for fixing the error
    pub hint: Option<String>,
}

impl SyntaxError {
    /// Create a new syntax error with minimal information
    pub fn new(message: impl Into<String>, range: TextRange, code: ErrorCode) -> Self {
        let severity = if code.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        };
        Self {
            message: message.into(),
            range,
            code,
            severity,
            expected: Vec::new(),
            found: None,
            hint: None,
        }
    }

    /// Create an error at a specific offset with zero-width range
    pub fn at_offset(message: impl Into<String>, offset: TextSize, code: ErrorCode) -> Self {
        Self::new(message, TextRange::empty(offset), code)
    }

    pub fn builder(code: ErrorCode) -> SyntaxErrorBuilder {
        SyntaxErrorBuilder::new(code)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }

    /// Format the error for display
    pub fn format(&self) -> String {
        let mut result = format!("{}: {}", self.code, self.message);
        if let Some(hint) = &self.hint {
            result.push_str(&format!("\n  hint: {}", hint));
        }
        result
    }
}

/// Builder for syntax errors with expected/found context
pub struct SyntaxErrorBuilder {
    code: ErrorCode,
    message: Option<String>,
    range: Option<TextRange>,
    expected: Vec<String>,
    found: Option<String>,
    hint: Option<String>,
}

impl SyntaxErrorBuilder {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: None,
            range: None,
            expected: Vec::new(),
            found: None,
            hint: None,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn expected(mut self, what: impl Into<String>) -> Self {
        self.expected.push(what.into());
        self
    }

    pub fn found(mut self, what: impl Into<String>) -> Self {
        self.found = Some(what.into());
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Build the syntax error
    ///
    /// Without an explicit message, one is composed from the expected and
    /// found descriptions, falling back to the code's default message.
    pub fn build(self) -> SyntaxError {
        let message = match (self.message, self.expected.as_slice(), &self.found) {
            (Some(message), _, _) => message,
            (None, [], Some(found)) => format!("unexpected {found}"),
            (None, [], None) => self.code.default_message().to_string(),
            (None, expected, found) => {
                let expected = join_alternatives(expected);
                match found {
                    Some(found) => format!("expected {expected}, found {found}"),
                    None => format!("expected {expected}"),
                }
            }
        };
        let mut error = SyntaxError::new(
            message,
            self.range
                .unwrap_or_else(|| TextRange::empty(TextSize::new(0))),
            self.code,
        );
        error.expected = self.expected;
        error.found = self.found;
        error.hint = self.hint;
        error
    }
}

fn join_alternatives(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_new() {
        let err = SyntaxError::new(
            "expected ';'",
            TextRange::new(TextSize::new(10), TextSize::new(11)),
            ErrorCode::E0201,
        );

        assert_eq!(err.message, "expected ';'");
        assert_eq!(err.code, ErrorCode::E0201);
        assert_eq!(err.severity, Severity::Error);
        assert!(err.hint.is_none());
    }

    #[test]
    fn test_warning_codes_get_warning_severity() {
        let err = SyntaxError::at_offset("deprecated", TextSize::new(0), ErrorCode::W0302);
        assert_eq!(err.severity, Severity::Warning);
        assert!(!err.is_error());
    }

    #[test]
    fn test_builder_composes_message() {
        let err = SyntaxError::builder(ErrorCode::E0902)
            .expected("';'")
            .expected("'{'")
            .found("'part'")
            .build();
        assert_eq!(err.message, "expected ';' or '{', found 'part'");
        assert_eq!(err.expected.len(), 2);
        assert_eq!(err.found.as_deref(), Some("'part'"));
    }

    #[test]
    fn test_builder_three_alternatives() {
        let err = SyntaxError::builder(ErrorCode::E0902)
            .expected("name")
            .expected("'::'")
            .expected("';'")
            .build();
        assert_eq!(err.message, "expected name, '::' or ';'");
    }

    #[test]
    fn test_builder_defaults() {
        let err = SyntaxError::builder(ErrorCode::E0201).build();
        assert_eq!(err.message, "missing semicolon");
    }

    #[test]
    fn test_format_error() {
        let err = SyntaxError::new(
            "deprecated 'readonly'",
            TextRange::empty(TextSize::new(10)),
            ErrorCode::W0302,
        )
        .with_hint("use 'constant'");

        let formatted = err.format();
        assert!(formatted.contains("W0302"));
        assert!(formatted.contains("hint: use 'constant'"));
    }
}

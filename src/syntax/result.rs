//! Parse entry points and their results.

use rowan::GreenNode;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::builder::{build, build_expression};
use super::model::{Element, ExprId, Model};
use crate::base::{Language, LineIndex, SourceUnit};
use crate::parser::{
    DEFAULT_MAX_DEPTH, Diagnostic, Parse, ParserConfig, SyntaxError, SyntaxNode,
    parse_expression_green, parse_green,
};

/// Options for one parse.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Overrides the language detected from the unit name
    pub language: Option<Language>,
    /// Maximum nesting of members and expressions
    pub max_depth: u32,
    /// Polled at every nesting level and body member
    pub cancel: Option<CancellationToken>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            language: None,
            max_depth: DEFAULT_MAX_DEPTH,
            cancel: None,
        }
    }
}

impl ParseOptions {
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn resolve_unit(&self, unit: impl Into<SourceUnit>) -> SourceUnit {
        let mut unit = unit.into();
        if let Some(language) = self.language {
            unit.language = language;
        }
        unit
    }

    fn config(&self, language: Language) -> ParserConfig<'_> {
        ParserConfig {
            language,
            max_depth: self.max_depth,
            cancel: self.cancel.as_ref(),
        }
    }
}

/// The outcome of parsing one unit.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub unit: SourceUnit,
    pub model: Model,
    /// Lossless syntax tree of the whole input
    pub green: GreenNode,
    /// Ordered by position
    pub diagnostics: Vec<Diagnostic>,
    /// No diagnostic has error severity
    pub success: bool,
}

impl ParseResult {
    pub fn root_namespace(&self) -> &Element {
        self.model.element(self.model.root())
    }

    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }
}

/// The outcome of parsing a lone expression.
#[derive(Debug, Clone)]
pub struct ExpressionResult {
    pub unit: SourceUnit,
    /// Holds the expression and any body elements it owns
    pub model: Model,
    pub expr: Option<ExprId>,
    pub green: GreenNode,
    pub diagnostics: Vec<Diagnostic>,
    pub success: bool,
}

/// Parse a unit with default options.
pub fn parse(source: &str, unit: impl Into<SourceUnit>) -> ParseResult {
    parse_with(source, unit, &ParseOptions::default())
}

/// Parse a unit.
///
/// A lexer error, the recursion limit or cancellation leaves the model with
/// only its empty root namespace.
pub fn parse_with(source: &str, unit: impl Into<SourceUnit>, options: &ParseOptions) -> ParseResult {
    let unit = options.resolve_unit(unit);
    debug!(unit = %unit, language = %unit.language, len = source.len(), "parsing unit");

    let parse = parse_green(source, options.config(unit.language));
    let fatal = is_fatal(&parse);
    let (model, build_errors) = if fatal {
        (Model::new(), Vec::new())
    } else {
        build(&parse.syntax(), unit.language)
    };
    let diagnostics = diagnostics(source, &unit, parse.errors, build_errors);
    let success = !diagnostics.iter().any(Diagnostic::is_error);

    debug!(
        unit = %unit,
        elements = model.elements.len(),
        diagnostics = diagnostics.len(),
        success,
        "parsed unit"
    );
    ParseResult {
        unit,
        model,
        green: parse.green,
        diagnostics,
        success,
    }
}

/// Parse `source` as one expression.
pub fn parse_expression(
    source: &str,
    unit: impl Into<SourceUnit>,
    options: &ParseOptions,
) -> ExpressionResult {
    let unit = options.resolve_unit(unit);
    let parse = parse_expression_green(source, options.config(unit.language));
    let (model, expr, build_errors) = if is_fatal(&parse) {
        (Model::new(), None, Vec::new())
    } else {
        build_expression(&parse.syntax(), unit.language)
    };
    let diagnostics = diagnostics(source, &unit, parse.errors, build_errors);
    let success = expr.is_some() && !diagnostics.iter().any(Diagnostic::is_error);
    debug!(unit = %unit, success, "parsed expression");
    ExpressionResult {
        unit,
        model,
        expr,
        green: parse.green,
        diagnostics,
        success,
    }
}

fn is_fatal(parse: &Parse) -> bool {
    parse.errors.iter().any(|e| e.code.is_fatal())
}

fn diagnostics(
    source: &str,
    unit: &SourceUnit,
    mut errors: Vec<SyntaxError>,
    build_errors: Vec<SyntaxError>,
) -> Vec<Diagnostic> {
    errors.extend(build_errors);
    errors.sort_by_key(|e| e.range.start());
    let index = LineIndex::new(source);
    errors
        .iter()
        .map(|e| Diagnostic::from_syntax_error(e, &unit.name, &index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorCode;

    #[test]
    fn test_language_from_unit_name() {
        let result = parse("class C;", "lib.kerml");
        assert!(result.success, "{:?}", result.diagnostics);
        assert_eq!(result.unit.language, Language::KerML);

        let result = parse("class C;", "lib.sysml");
        assert!(!result.success);
    }

    #[test]
    fn test_language_override() {
        let options = ParseOptions::default().with_language(Language::KerML);
        let result = parse_with("class C;", "unit", &options);
        assert!(result.success);
    }

    #[test]
    fn test_warning_does_not_fail() {
        let result = parse("package P { part a; part a; }", "dup.sysml");
        assert!(result.success);
        assert_eq!(result.warnings().count(), 1);
        assert_eq!(result.diagnostics[0].code, ErrorCode::W0301);
    }

    #[test]
    fn test_lex_error_empties_model() {
        let result = parse("package P { part a; } §", "bad.sysml");
        assert!(!result.success);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.root_namespace().members.is_empty());
        assert_eq!(result.model.elements.len(), 1);
    }

    #[test]
    fn test_cancelled_parse() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let options = ParseOptions::default().with_cancel(cancel);
        let result = parse_with("package P { part a; }", "c.sysml", &options);
        assert!(!result.success);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, ErrorCode::E0904);
        assert!(result.root_namespace().members.is_empty());
    }
}

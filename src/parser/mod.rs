//! Rowan-based parser for KerML and SysML v2
//!
//! This module turns source text into a lossless CST using:
//! - **logos** for fast lexing
//! - **rowan** for the CST (Concrete Syntax Tree)
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Parser → GreenNode tree (immutable, cheap to clone)
//!     ↓
//! SyntaxNode (rowan) → CST with parent pointers
//!     ↓
//! AST layer → Typed wrappers over SyntaxNode
//!     ↓
//! Model builder (crate::syntax) → arena model
//! ```

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
pub mod errors;
pub(crate) mod grammar;
pub mod keywords;
pub mod lexer;
pub mod rule_parser;
mod syntax_kind;

pub use errors::{Diagnostic, ErrorCode, ParseContext, Severity, SyntaxError, SyntaxErrorBuilder};
pub use lexer::{LexError, LexErrorKind, Lexer, Token, lex, tokenize};
pub use parser::{Abort, PResult, Parser, ParserConfig};
pub use syntax_kind::{KerMLLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};

use crate::base::Language;

/// Default nesting limit for one parse.
pub const DEFAULT_MAX_DEPTH: u32 = 128;

/// A parsed green tree and the syntax errors found on the way.
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// No error-severity problems were recorded.
    pub fn ok(&self) -> bool {
        !self.errors.iter().any(SyntaxError::is_error)
    }
}

/// Lex and parse a whole unit into a green tree.
///
/// A lexer error stops the unit: the tree then holds the tokens lexed so
/// far plus the unlexable rest inside one `ERROR` node, and the lex error is
/// the only error reported.
pub fn parse_green(source: &str, config: ParserConfig<'_>) -> Parse {
    parse_entry(source, config, grammar::parse_source_file)
}

/// Lex and parse a lone expression; the tree root is still `SOURCE_FILE`.
pub fn parse_expression_green(source: &str, config: ParserConfig<'_>) -> Parse {
    parse_entry(source, config, grammar::parse_expression_unit)
}

fn parse_entry(
    source: &str,
    config: ParserConfig<'_>,
    entry: fn(&mut Parser<'_>) -> PResult,
) -> Parse {
    let (tokens, lex_error) = lex(source, config.language);
    if let Some(error) = lex_error {
        return lex_failure(source, &tokens, &error);
    }

    let mut parser = Parser::new(&tokens, TextSize::of(source), config);
    // Every abort is absorbed by the body loops and the entry rule.
    let _ = entry(&mut parser);
    let (green, errors) = parser.finish();
    Parse { green, errors }
}

fn lex_failure(source: &str, tokens: &[Token<'_>], error: &LexError) -> Parse {
    let mut builder = rowan::GreenNodeBuilder::new();
    builder.start_node(SyntaxKind::SOURCE_FILE.into());
    builder.start_node(SyntaxKind::ERROR.into());
    for token in tokens {
        builder.token(token.kind.into(), token.text);
    }
    let rest = &source[usize::from(error.offset)..];
    if !rest.is_empty() {
        builder.token(SyntaxKind::ERROR.into(), rest);
    }
    builder.finish_node();
    builder.finish_node();

    let end = TextSize::of(source);
    let start = error.offset.min(end);
    let len = error
        .unexpected
        .len_utf8()
        .min(usize::from(end - start));
    let range = TextRange::at(start, TextSize::from(len as u32));
    let syntax_error = SyntaxError::new(error.message(), range, error.kind.code());
    Parse {
        green: builder.finish(),
        errors: vec![syntax_error],
    }
}

/// Parse a KerML unit with default limits.
pub fn parse_kerml(source: &str) -> Parse {
    parse_green(source, default_config(Language::KerML))
}

/// Parse a SysML unit with default limits.
pub fn parse_sysml(source: &str) -> Parse {
    parse_green(source, default_config(Language::SysML))
}

fn default_config(language: Language) -> ParserConfig<'static> {
    ParserConfig {
        language,
        max_depth: DEFAULT_MAX_DEPTH,
        cancel: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_is_lossless() {
        let source = "package P {\n  // note\n  part def A :> B; /* c */\n}\n";
        let parse = parse_sysml(source);
        assert!(parse.ok(), "{:?}", parse.errors);
        assert_eq!(parse.syntax().text().to_string(), source);
    }

    #[test]
    fn test_expression_entry_rejects_trailing_tokens() {
        let config = default_config(Language::KerML);
        let parse = parse_expression_green("a + b c", config);
        assert_eq!(parse.errors.len(), 1);
        assert_eq!(parse.errors[0].code, ErrorCode::E0901);
        assert_eq!(parse.syntax().text().to_string(), "a + b c");

        let parse = parse_expression_green("1 + 2 * 3", default_config(Language::KerML));
        assert!(parse.ok());
    }

    #[test]
    fn test_lex_failure_keeps_all_text() {
        let source = "package P { § }";
        let parse = parse_sysml(source);
        assert_eq!(parse.errors.len(), 1);
        assert_eq!(parse.errors[0].code, ErrorCode::E0101);
        assert_eq!(parse.syntax().text().to_string(), source);
    }
}

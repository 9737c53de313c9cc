//! Recursive descent parser core
//!
//! Builds a rowan GreenNode tree from tokens. Trivia is attached lazily:
//! pending whitespace and notes are flushed into the tree right before the
//! next token or node start, so element nodes begin at their first
//! significant token.
//!
//! Grammar functions return [`PResult`]. A syntax error records exactly one
//! [`SyntaxError`] and unwinds to the nearest body loop, which wraps the
//! partial member in an `ERROR` node and resynchronises.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::errors::{ErrorCode, ParseContext, SyntaxError};
use super::lexer::Token;
use super::syntax_kind::SyntaxKind;
use crate::base::Language;

/// Why a grammar function stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abort {
    /// A syntax error was recorded; the enclosing member is dropped
    Syntax,
    /// Nesting went past the configured depth
    RecursionLimit,
    /// The caller cancelled the parse
    Cancelled,
}

impl Abort {
    /// Fatal aborts unwind the whole unit instead of a single member.
    pub fn is_fatal(self) -> bool {
        !matches!(self, Self::Syntax)
    }
}

pub type PResult<T = ()> = Result<T, Abort>;

/// Where a member started, for recovery.
#[derive(Debug, Clone, Copy)]
pub struct Marker {
    checkpoint: Checkpoint,
    open: usize,
    depth: u32,
    contexts: usize,
    pos: usize,
}

/// Limits and context for one parse.
#[derive(Debug, Clone)]
pub struct ParserConfig<'c> {
    pub language: Language,
    pub max_depth: u32,
    pub cancel: Option<&'c CancellationToken>,
}

/// The parser state
pub struct Parser<'t> {
    tokens: &'t [Token<'t>],
    pos: usize,
    /// Positions of the non-trivia tokens
    significant: Vec<usize>,
    /// Entry in `significant` of the first token at or after `pos`
    next: usize,
    end: TextSize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    open: usize,
    depth: u32,
    max_depth: u32,
    cancel: Option<&'t CancellationToken>,
    language: Language,
    contexts: Vec<ParseContext>,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token<'t>], source_len: TextSize, config: ParserConfig<'t>) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
            .map(|(idx, _)| idx)
            .collect();
        Self {
            tokens,
            pos: 0,
            significant,
            next: 0,
            end: source_len,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            open: 0,
            depth: 0,
            max_depth: config.max_depth,
            cancel: config.cancel,
            language: config.language,
            contexts: Vec::new(),
        }
    }

    /// Close the tree. Every token must have been consumed.
    pub fn finish(self) -> (GreenNode, Vec<SyntaxError>) {
        (self.builder.finish(), self.errors)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    /// Index of the n-th significant token from the cursor.
    fn significant(&self, n: usize) -> Option<usize> {
        self.significant.get(self.next + n).copied()
    }

    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.significant(n)
            .map(|idx| self.tokens[idx].kind)
            .unwrap_or(SyntaxKind::EOF)
    }

    pub fn current_text(&self) -> &'t str {
        self.nth_text(0)
    }

    pub fn nth_text(&self, n: usize) -> &'t str {
        self.significant(n).map(|idx| self.tokens[idx].text).unwrap_or("")
    }

    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    pub fn at_eof(&self) -> bool {
        self.at(SyntaxKind::EOF)
    }

    /// Range of the current significant token, or an empty range at the end.
    pub fn current_range(&self) -> TextRange {
        match self.significant(0) {
            Some(idx) => {
                let token = &self.tokens[idx];
                TextRange::at(token.offset, TextSize::of(token.text))
            }
            None => TextRange::empty(self.end),
        }
    }

    /// Cursor position, for progress checks.
    pub fn position(&self) -> usize {
        self.pos
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    /// Push the token under the cursor into the tree.
    fn advance(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            if !token.kind.is_trivia() {
                self.next += 1;
            }
            self.pos += 1;
        }
    }

    fn flush_trivia(&mut self) {
        let stop = self.significant(0).unwrap_or(self.tokens.len());
        while self.pos < stop {
            self.advance();
        }
    }

    /// Consume the current significant token.
    pub fn bump(&mut self) {
        self.flush_trivia();
        self.advance();
    }

    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: SyntaxKind) -> PResult {
        if self.eat(kind) {
            Ok(())
        } else {
            let code = match kind {
                SyntaxKind::SEMICOLON => ErrorCode::E0201,
                SyntaxKind::R_BRACE => ErrorCode::E0202,
                SyntaxKind::R_PAREN => ErrorCode::E0203,
                SyntaxKind::R_BRACKET => ErrorCode::E0204,
                SyntaxKind::IDENT => ErrorCode::E0301,
                _ => ErrorCode::E0902,
            };
            Err(self.error_expected(code, &[kind.describe()]))
        }
    }

    /// Consume everything that is left, including trailing trivia.
    pub fn bump_rest(&mut self) {
        while self.pos < self.tokens.len() {
            self.advance();
        }
    }

    // =========================================================================
    // Node building
    // =========================================================================

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind.into());
        self.open += 1;
    }

    pub fn finish_node(&mut self) {
        self.builder.finish_node();
        self.open -= 1;
    }

    pub fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
        self.open += 1;
    }

    /// Remember where a member starts.
    pub fn marker(&mut self) -> Marker {
        let checkpoint = self.checkpoint();
        Marker {
            checkpoint,
            open: self.open,
            depth: self.depth,
            contexts: self.contexts.len(),
            pos: self.pos,
        }
    }

    /// Trailing trivia goes to the innermost open node.
    pub fn finish_source(&mut self) {
        self.flush_trivia();
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn found_description(&self) -> String {
        match self.current() {
            kind @ (SyntaxKind::IDENT
            | SyntaxKind::INTEGER
            | SyntaxKind::REAL
            | SyntaxKind::STRING) => {
                let text = self.current_text();
                if text.chars().count() > 24 {
                    kind.describe()
                } else {
                    format!("'{text}'")
                }
            }
            other => other.describe(),
        }
    }

    fn push_error(&mut self, error: SyntaxError) {
        trace!(code = %error.code, message = %error.message, "syntax error");
        self.errors.push(error);
    }

    /// Record an error at the current token and abort the member.
    pub fn error(&mut self, code: ErrorCode, message: impl Into<String>) -> Abort {
        let range = self.current_range();
        self.push_error(SyntaxError::new(message, range, code));
        Abort::Syntax
    }

    /// Record an error over an explicit range and abort the member.
    pub fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, range: TextRange) -> Abort {
        self.push_error(SyntaxError::new(message, range, code));
        Abort::Syntax
    }

    /// Record "expected X, found Y" and abort the member.
    pub fn error_expected(&mut self, code: ErrorCode, expected: &[String]) -> Abort {
        let mut builder = SyntaxError::builder(code)
            .range(self.current_range())
            .found(self.found_description());
        for item in expected {
            builder = builder.expected(item.clone());
        }
        let error = builder.build();
        self.push_error(error);
        Abort::Syntax
    }

    /// Record "unexpected Y <context>" and abort the member.
    pub fn error_unexpected(&mut self, code: ErrorCode) -> Abort {
        let context = self.context();
        let message = format!(
            "unexpected {} {}, expected {}",
            self.found_description(),
            context.description(),
            context.expected_description()
        );
        let error = SyntaxError::builder(code)
            .message(message)
            .range(self.current_range())
            .found(self.found_description())
            .build();
        self.push_error(error);
        Abort::Syntax
    }

    /// Record a warning at the current token; parsing continues.
    pub fn warning(&mut self, code: ErrorCode, message: impl Into<String>, hint: Option<&str>) {
        let mut warning = SyntaxError::new(message, self.current_range(), code);
        if let Some(hint) = hint {
            warning = warning.with_hint(hint);
        }
        self.push_error(warning);
    }

    // =========================================================================
    // Limits
    // =========================================================================

    /// Fail with `Cancelled` once the caller's token fires.
    pub fn check_cancelled(&mut self) -> PResult {
        if self.cancel.is_some_and(|token| token.is_cancelled()) {
            let range = self.current_range();
            self.push_error(SyntaxError::new(
                "parse cancelled",
                range,
                ErrorCode::E0904,
            ));
            return Err(Abort::Cancelled);
        }
        Ok(())
    }

    /// Go one nesting level deeper; pair with [`Parser::leave`].
    ///
    /// Nodes opened in a loop count as levels too, since the tree they build
    /// is as deep as a recursive one.
    pub fn enter(&mut self) -> PResult {
        self.check_cancelled()?;
        if self.depth >= self.max_depth {
            let message = format!("nesting exceeds the maximum depth of {}", self.max_depth);
            let range = self.current_range();
            self.push_error(SyntaxError::new(message, range, ErrorCode::E0903));
            return Err(Abort::RecursionLimit);
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self, levels: u32) {
        self.depth -= levels;
    }

    /// Run `f` one nesting level deeper.
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.enter()?;
        let result = f(self);
        self.leave(1);
        result
    }

    // =========================================================================
    // Contexts
    // =========================================================================

    pub fn context(&self) -> ParseContext {
        self.contexts.last().copied().unwrap_or(ParseContext::TopLevel)
    }

    pub fn with_context<T>(
        &mut self,
        context: ParseContext,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        self.contexts.push(context);
        let result = f(self);
        self.contexts.pop();
        result
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    /// Wrap everything since `marker` in an `ERROR` node and skip to the next
    /// statement boundary.
    ///
    /// Consumes through the next `;`, stops before `}`, skips one balanced
    /// `{...}` block, or stops at end of input. At least one token is
    /// consumed when the member itself consumed nothing.
    pub fn recover(&mut self, marker: Marker) {
        while self.open > marker.open {
            self.finish_node();
        }
        self.depth = marker.depth;
        self.contexts.truncate(marker.contexts);
        self.start_node_at(marker.checkpoint, SyntaxKind::ERROR);

        let start = self.pos;
        loop {
            match self.current() {
                SyntaxKind::EOF => break,
                SyntaxKind::SEMICOLON => {
                    self.bump();
                    break;
                }
                SyntaxKind::R_BRACE => {
                    if start == marker.pos {
                        self.bump();
                    }
                    break;
                }
                SyntaxKind::L_BRACE => {
                    self.skip_balanced();
                    break;
                }
                _ => self.bump(),
            }
        }
        self.finish_node();
        trace!(skipped = self.pos - marker.pos, "recovered from syntax error");
    }

    /// Close everything and put the rest of the input under `ERROR`.
    pub fn abandon(&mut self, marker: Marker) {
        while self.open > marker.open {
            self.finish_node();
        }
        self.start_node_at(marker.checkpoint, SyntaxKind::ERROR);
        self.bump_rest();
        self.finish_node();
    }

    fn skip_balanced(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current() {
                SyntaxKind::EOF => break,
                SyntaxKind::L_BRACE => depth += 1,
                SyntaxKind::R_BRACE => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        break;
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer;

    fn with_parser<R>(input: &str, f: impl FnOnce(&mut Parser<'_>) -> R) -> R {
        let (tokens, err) = lexer::lex(input, Language::SysML);
        assert!(err.is_none());
        let config = ParserConfig {
            language: Language::SysML,
            max_depth: 4,
            cancel: None,
        };
        let mut parser = Parser::new(&tokens, TextSize::of(input), config);
        f(&mut parser)
    }

    #[test]
    fn test_lookahead_skips_trivia() {
        with_parser("part /* x */ // note\n a ;", |p| {
            assert_eq!(p.current(), SyntaxKind::PART_KW);
            assert_eq!(p.nth(1), SyntaxKind::REGULAR_COMMENT);
            assert_eq!(p.nth(2), SyntaxKind::IDENT);
            assert_eq!(p.nth_text(2), "a");
            assert_eq!(p.nth(4), SyntaxKind::EOF);
        });
    }

    #[test]
    fn test_expect_records_one_error() {
        let (tokens, _) = lexer::lex("part", Language::SysML);
        let config = ParserConfig {
            language: Language::SysML,
            max_depth: 4,
            cancel: None,
        };
        let mut p = Parser::new(&tokens, TextSize::new(4), config);
        p.start_node(SyntaxKind::SOURCE_FILE);
        p.bump();
        assert_eq!(p.expect(SyntaxKind::SEMICOLON), Err(Abort::Syntax));
        p.finish_source();
        p.finish_node();
        let (green, errors) = p.finish();
        assert_eq!(green.kind(), SyntaxKind::SOURCE_FILE.into());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::E0201);
        assert_eq!(errors[0].message, "expected ';', found end of input");
    }

    #[test]
    fn test_nested_depth_limit() {
        with_parser("x", |p| {
            fn dive(p: &mut Parser<'_>, levels: u32) -> PResult {
                if levels == 0 {
                    return Ok(());
                }
                p.nested(|p| dive(p, levels - 1))
            }
            assert_eq!(dive(p, 4), Ok(()));
            assert_eq!(dive(p, 5), Err(Abort::RecursionLimit));
        });
    }

    #[test]
    fn test_cancelled_token_aborts() {
        let token = CancellationToken::new();
        token.cancel();
        let (tokens, _) = lexer::lex("x", Language::SysML);
        let mut parser = Parser::new(
            &tokens,
            TextSize::new(1),
            ParserConfig {
                language: Language::SysML,
                max_depth: 8,
                cancel: Some(&token),
            },
        );
        assert_eq!(parser.nested(|_| Ok(())), Err(Abort::Cancelled));
        assert!(Abort::Cancelled.is_fatal());
        assert!(!Abort::Syntax.is_fatal());
    }

    #[test]
    fn test_lookahead_follows_the_cursor() {
        let input = "a /* c */\n  // note\n b\t;   ";
        let (tokens, _) = lexer::lex(input, Language::SysML);
        let config = ParserConfig {
            language: Language::SysML,
            max_depth: 4,
            cancel: None,
        };
        let mut p = Parser::new(&tokens, TextSize::of(input), config);
        p.start_node(SyntaxKind::SOURCE_FILE);
        p.bump();
        assert_eq!(p.current(), SyntaxKind::REGULAR_COMMENT);
        p.bump();
        assert_eq!(p.current_text(), "b");
        assert_eq!(p.nth(1), SyntaxKind::SEMICOLON);
        p.bump();
        p.bump();
        assert!(p.at_eof());
        assert_eq!(p.current_range(), TextRange::empty(TextSize::of(input)));
        p.finish_source();
        p.finish_node();
        let (green, _) = p.finish();
        assert_eq!(crate::parser::SyntaxNode::new_root(green).text().to_string(), input);
    }

    #[test]
    fn test_enter_and_leave_share_the_depth_budget() {
        with_parser("x", |p| {
            for _ in 0..3 {
                assert_eq!(p.enter(), Ok(()));
            }
            assert_eq!(p.nested(|_| Ok(())), Ok(()));
            assert_eq!(p.enter(), Ok(()));
            assert_eq!(p.enter(), Err(Abort::RecursionLimit));
            p.leave(4);
            assert_eq!(p.nested(|_| Ok(())), Ok(()));
        });
    }
}

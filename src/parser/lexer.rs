//! Logos-based lexer for KerML and SysML
//!
//! Fast tokenization using the logos crate. Identifiers are classified as
//! keywords afterwards, against the reserved words of the unit's language.

use super::keywords;
use super::syntax_kind::SyntaxKind;
use crate::base::Language;
use crate::parser::errors::ErrorCode;
use logos::Logos;
use rowan::TextSize;

/// A token with its kind, text, and position
///
/// `line` and `column` are one-based; `column` counts characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
    pub line: u32,
    pub column: u32,
}

/// Why the lexer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, thiserror::Error)]
pub enum LexErrorKind {
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("unterminated quoted name")]
    UnterminatedName,
}

impl LexErrorKind {
    pub fn code(self) -> ErrorCode {
        match self {
            Self::UnexpectedCharacter => ErrorCode::E0101,
            Self::UnterminatedString => ErrorCode::E0102,
            Self::UnterminatedComment => ErrorCode::E0103,
            Self::UnterminatedName => ErrorCode::E0105,
        }
    }
}

/// A lexical error. The token stream ends here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} {unexpected:?} at line {line}, column {column}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub offset: TextSize,
    pub line: u32,
    pub column: u32,
    /// The character the failing token starts with.
    pub unexpected: char,
}

impl LexError {
    pub fn message(&self) -> String {
        match self.kind {
            LexErrorKind::UnexpectedCharacter => {
                format!("unexpected character {:?}", self.unexpected)
            }
            other => other.to_string(),
        }
    }
}

/// Lexer wrapping the logos-generated tokenizer
///
/// Yields tokens lazily; after the first error it yields nothing more.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    language: Language,
    line: u32,
    column: u32,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, language: Language) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            language,
            line: 1,
            column: 1,
            failed: false,
        }
    }

    fn advance_position(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.inner.span().start as u32);
        let (line, column) = (self.line, self.column);

        match logos_token {
            Ok(token) => {
                self.advance_position(text);
                let kind = match token {
                    LogosToken::Ident => {
                        keywords::lookup(text, self.language).unwrap_or(SyntaxKind::IDENT)
                    }
                    other => other.into(),
                };
                Some(Ok(Token {
                    kind,
                    text,
                    offset,
                    line,
                    column,
                }))
            }
            Err(kind) => {
                self.failed = true;
                Some(Err(LexError {
                    kind,
                    offset,
                    line,
                    column,
                    unexpected: text.chars().next().unwrap_or('\0'),
                }))
            }
        }
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

/// Start lazily tokenizing `input`.
pub fn tokenize(input: &str, language: Language) -> Lexer<'_> {
    Lexer::new(input, language)
}

/// Tokenize everything up to the first error.
///
/// On failure the tokens lexed before the error are returned alongside it.
pub fn lex(input: &str, language: Language) -> (Vec<Token<'_>>, Option<LexError>) {
    let mut tokens = Vec::new();
    for item in Lexer::new(input, language) {
        match item {
            Ok(token) => tokens.push(token),
            Err(err) => return (tokens, Some(err)),
        }
    }
    (tokens, None)
}

fn delimited(
    lex: &mut logos::Lexer<'_, LogosToken>,
    close: char,
    error: LexErrorKind,
) -> Result<(), LexErrorKind> {
    let rest = lex.remainder();
    let mut escaped = false;
    for (idx, ch) in rest.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == close {
            lex.bump(idx + ch.len_utf8());
            return Ok(());
        }
    }
    lex.bump(rest.len());
    Err(error)
}

fn string_body(lex: &mut logos::Lexer<'_, LogosToken>) -> Result<(), LexErrorKind> {
    delimited(lex, '"', LexErrorKind::UnterminatedString)
}

fn quoted_name(lex: &mut logos::Lexer<'_, LogosToken>) -> Result<(), LexErrorKind> {
    delimited(lex, '\'', LexErrorKind::UnterminatedName)
}

fn backtick_name(lex: &mut logos::Lexer<'_, LogosToken>) -> Result<(), LexErrorKind> {
    delimited(lex, '`', LexErrorKind::UnterminatedName)
}

fn comment_body(lex: &mut logos::Lexer<'_, LogosToken>) -> Result<(), LexErrorKind> {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(())
        }
        None => {
            lex.bump(rest.len());
            Err(LexErrorKind::UnterminatedComment)
        }
    }
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(error = LexErrorKind)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//([^*\n][^\n]*)?")]
    LineNote,

    #[token("//*", comment_body)]
    BlockNote,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[token("/*", comment_body)]
    RegularComment,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[token("'", quoted_name)]
    #[token("`", backtick_name)]
    UnrestrictedName,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]*\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Real,

    #[token("\"", string_body)]
    String,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("::>")]
    ColonColonGt,
    #[token(":>>")]
    ColonGtGt,
    #[token(":>")]
    ColonGt,
    #[token("::")]
    ColonColon,
    #[token(":=")]
    ColonEq,
    #[token("..")]
    DotDot,
    #[token(".?")]
    DotQuestion,
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    BangEqEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("@@")]
    AtAt,
    #[token("**")]
    StarStar,
    #[token("??")]
    QuestionQuestion,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("@")]
    At,
    #[token("#")]
    Hash,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("?")]
    Question,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token("$")]
    Dollar,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        use LogosToken::*;
        match token {
            // Trivia
            Whitespace => SyntaxKind::WHITESPACE,
            LineNote => SyntaxKind::LINE_NOTE,
            BlockNote => SyntaxKind::BLOCK_NOTE,

            // Literals
            RegularComment => SyntaxKind::REGULAR_COMMENT,
            Ident | UnrestrictedName => SyntaxKind::IDENT,
            Integer => SyntaxKind::INTEGER,
            Real => SyntaxKind::REAL,
            String => SyntaxKind::STRING,

            // Multi-char punctuation
            ColonColonGt => SyntaxKind::COLON_COLON_GT,
            ColonGtGt => SyntaxKind::COLON_GT_GT,
            ColonGt => SyntaxKind::COLON_GT,
            ColonColon => SyntaxKind::COLON_COLON,
            ColonEq => SyntaxKind::COLON_EQ,
            DotDot => SyntaxKind::DOT_DOT,
            DotQuestion => SyntaxKind::DOT_QUESTION,
            EqEqEq => SyntaxKind::EQ_EQ_EQ,
            BangEqEq => SyntaxKind::BANG_EQ_EQ,
            EqEq => SyntaxKind::EQ_EQ,
            BangEq => SyntaxKind::BANG_EQ,
            LtEq => SyntaxKind::LT_EQ,
            GtEq => SyntaxKind::GT_EQ,
            Arrow => SyntaxKind::ARROW,
            FatArrow => SyntaxKind::FAT_ARROW,
            AtAt => SyntaxKind::AT_AT,
            StarStar => SyntaxKind::STAR_STAR,
            QuestionQuestion => SyntaxKind::QUESTION_QUESTION,

            // Single-char punctuation
            LBrace => SyntaxKind::L_BRACE,
            RBrace => SyntaxKind::R_BRACE,
            LBracket => SyntaxKind::L_BRACKET,
            RBracket => SyntaxKind::R_BRACKET,
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            Semicolon => SyntaxKind::SEMICOLON,
            Colon => SyntaxKind::COLON,
            Dot => SyntaxKind::DOT,
            Comma => SyntaxKind::COMMA,
            Eq => SyntaxKind::EQ,
            Lt => SyntaxKind::LT,
            Gt => SyntaxKind::GT,
            At => SyntaxKind::AT,
            Hash => SyntaxKind::HASH,
            Star => SyntaxKind::STAR,
            Plus => SyntaxKind::PLUS,
            Minus => SyntaxKind::MINUS,
            Slash => SyntaxKind::SLASH,
            Percent => SyntaxKind::PERCENT,
            Caret => SyntaxKind::CARET,
            Tilde => SyntaxKind::TILDE,
            Question => SyntaxKind::QUESTION,
            Pipe => SyntaxKind::PIPE,
            Amp => SyntaxKind::AMP,
            Dollar => SyntaxKind::DOLLAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str, language: Language) -> Vec<SyntaxKind> {
        tokenize(input, language)
            .map(|t| t.map(|t| t.kind))
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
            .into_iter()
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn test_lex_package() {
        assert_eq!(
            kinds("package Test;", Language::SysML),
            vec![SyntaxKind::PACKAGE_KW, SyntaxKind::IDENT, SyntaxKind::SEMICOLON]
        );
    }

    #[test]
    fn test_keywords_depend_on_language() {
        assert_eq!(
            kinds("class part", Language::KerML),
            vec![SyntaxKind::CLASS_KW, SyntaxKind::IDENT]
        );
        assert_eq!(
            kinds("class part", Language::SysML),
            vec![SyntaxKind::IDENT, SyntaxKind::PART_KW]
        );
    }

    #[test]
    fn test_lex_relationship_operators() {
        assert_eq!(
            kinds(":> :>> ::> :: := => ~", Language::SysML),
            vec![
                SyntaxKind::COLON_GT,
                SyntaxKind::COLON_GT_GT,
                SyntaxKind::COLON_COLON_GT,
                SyntaxKind::COLON_COLON,
                SyntaxKind::COLON_EQ,
                SyntaxKind::FAT_ARROW,
                SyntaxKind::TILDE,
            ]
        );
    }

    #[test]
    fn test_lex_multiplicity_range() {
        assert_eq!(
            kinds("[0..*]", Language::SysML),
            vec![
                SyntaxKind::L_BRACKET,
                SyntaxKind::INTEGER,
                SyntaxKind::DOT_DOT,
                SyntaxKind::STAR,
                SyntaxKind::R_BRACKET,
            ]
        );
    }

    #[test]
    fn test_lex_numbers() {
        assert_eq!(
            kinds("42 3.14 .5 1e10 2.5E-3", Language::KerML),
            vec![
                SyntaxKind::INTEGER,
                SyntaxKind::REAL,
                SyntaxKind::REAL,
                SyntaxKind::REAL,
                SyntaxKind::REAL,
            ]
        );
    }

    #[test]
    fn test_notes_are_trivia_comments_are_not() {
        let tokens: Vec<_> = tokenize("// note\n//* block note */ /* doc */ x", Language::SysML)
            .map(Result::unwrap)
            .collect();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::LINE_NOTE,
                SyntaxKind::WHITESPACE,
                SyntaxKind::BLOCK_NOTE,
                SyntaxKind::WHITESPACE,
                SyntaxKind::REGULAR_COMMENT,
                SyntaxKind::WHITESPACE,
                SyntaxKind::IDENT,
            ]
        );
        assert_eq!(tokens[4].text, "/* doc */");
    }

    #[test]
    fn test_unrestricted_names() {
        let tokens: Vec<_> = tokenize("'my name' `other`", Language::SysML)
            .map(Result::unwrap)
            .collect();
        assert_eq!(tokens[0].kind, SyntaxKind::IDENT);
        assert_eq!(tokens[0].text, "'my name'");
        assert_eq!(tokens[2].kind, SyntaxKind::IDENT);
        assert_eq!(tokens[2].text, "`other`");
    }

    #[test]
    fn test_string_with_escapes() {
        let tokens: Vec<_> = tokenize(r#""say \"hi\"""#, Language::SysML)
            .map(Result::unwrap)
            .collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, SyntaxKind::STRING);
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens: Vec<_> = tokenize("package\n  P;", Language::SysML)
            .map(Result::unwrap)
            .collect();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!(tokens[2].text, "P");
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
        assert_eq!(tokens[2].offset, TextSize::new(10));
    }

    #[test]
    fn test_unexpected_character_stops_stream() {
        let items: Vec<_> = tokenize("part ! x", Language::SysML).collect();
        let err = items
            .iter()
            .find_map(|item| item.as_ref().err())
            .expect("expected a lex error");
        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter);
        assert_eq!(err.unexpected, '!');
        assert_eq!((err.line, err.column), (1, 6));
        // fused after the error
        assert!(items.last().unwrap().is_err());
    }

    #[test]
    fn test_unterminated_forms() {
        let (_, err) = lex("x = \"abc", Language::SysML);
        assert_eq!(err.unwrap().kind, LexErrorKind::UnterminatedString);

        let (_, err) = lex("/* never closed", Language::SysML);
        assert_eq!(err.unwrap().kind, LexErrorKind::UnterminatedComment);

        let (tokens, err) = lex("part 'open", Language::SysML);
        assert_eq!(err.unwrap().kind, LexErrorKind::UnterminatedName);
        assert_eq!(tokens[0].kind, SyntaxKind::PART_KW);
    }

    #[test]
    fn test_lex_error_codes() {
        assert_eq!(LexErrorKind::UnexpectedCharacter.code(), ErrorCode::E0101);
        assert_eq!(LexErrorKind::UnterminatedComment.code(), ErrorCode::E0103);
    }
}

//! Typed wrappers over the untyped rowan CST.
//!
//! Each struct wraps a `SyntaxNode` of one kind and exposes its children.
//! The model builder reads the tree through these wrappers and the token
//! helpers below.

use smol_str::SmolStr;

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

macro_rules! first_child_method {
    ($name:ident, $type:ident) => {
        #[doc = concat!("Get the first `", stringify!($type), "` child of this node.")]
        pub fn $name(&self) -> Option<$type> {
            self.0.children().find_map($type::cast)
        }
    };
}

macro_rules! has_token_method {
    ($name:ident, $kind:ident) => {
        #[doc = concat!("Check if this node has the `", stringify!($kind), "` token.")]
        pub fn $name(&self) -> bool {
            has_token(&self.0, SyntaxKind::$kind)
        }
    };
}

// ============================================================================
// Token helpers
// ============================================================================

/// Whether `node` has a direct child token of `kind`.
pub fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    direct_tokens(node).any(|t| t.kind() == kind)
}

/// Direct child tokens of `node`, trivia excluded.
pub fn direct_tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + '_ {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
}

/// Keyword kinds among the direct child tokens, in source order.
pub fn keyword_kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
    direct_tokens(node)
        .map(|t| t.kind())
        .filter(|kind| kind.is_keyword())
        .collect()
}

/// Child nodes that appear after the first direct `keyword` token.
pub fn children_after(node: &SyntaxNode, keyword: SyntaxKind) -> Vec<SyntaxNode> {
    let mut seen = false;
    let mut found = Vec::new();
    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Token(t) if t.kind() == keyword => seen = true,
            rowan::NodeOrToken::Node(n) if seen => found.push(n),
            _ => {}
        }
    }
    found
}

/// Resolve escape sequences in a quoted body.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{8}'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('f') => out.push('\u{c}'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// The name an IDENT token spells: unrestricted names lose their quotes.
pub fn name_text(token: &SyntaxToken) -> SmolStr {
    let text = token.text();
    match text.chars().next() {
        Some(quote @ ('\'' | '`')) if text.len() >= 2 && text.ends_with(quote) => {
            SmolStr::new(unescape(&text[1..text.len() - 1]))
        }
        _ => SmolStr::new(text),
    }
}

/// The value of a STRING token.
pub fn string_value(text: &str) -> String {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        unescape(&text[1..text.len() - 1])
    } else {
        text.to_string()
    }
}

/// Body of a `/* ... */` comment with delimiters and `*` margins removed.
pub fn comment_text(raw: &str) -> String {
    let inner = raw
        .strip_prefix("/*")
        .and_then(|s| s.strip_suffix("*/"))
        .unwrap_or(raw);
    let lines: Vec<&str> = inner
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            match trimmed.strip_prefix('*') {
                Some(rest) => rest.trim_start(),
                None => trimmed,
            }
        })
        .collect();
    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

// ============================================================================
// Names and references
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);
ast_node!(NamespaceBody, NAMESPACE_BODY);

impl NamespaceBody {
    /// Member nodes; recovered `ERROR` nodes are skipped.
    pub fn members(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children().filter(|n| n.kind() != SyntaxKind::ERROR)
    }
}

ast_node!(Name, NAME);

impl Name {
    pub fn text(&self) -> Option<SmolStr> {
        direct_tokens(&self.0)
            .find(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| name_text(&t))
    }
}

ast_node!(ShortName, SHORT_NAME);

impl ShortName {
    pub fn text(&self) -> Option<SmolStr> {
        direct_tokens(&self.0)
            .find(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| name_text(&t))
    }
}

ast_node!(QualifiedName, QUALIFIED_NAME);

impl QualifiedName {
    /// Name segments, unquoted.
    pub fn segments(&self) -> Vec<SmolStr> {
        direct_tokens(&self.0)
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| name_text(&t))
            .collect()
    }

    // `$::` anchors the path at the root namespace
    has_token_method!(is_global, DOLLAR);
}

ast_node!(FeatureChain, FEATURE_CHAIN);

impl FeatureChain {
    pub fn parts(&self) -> impl Iterator<Item = QualifiedName> + '_ {
        self.0.children().filter_map(QualifiedName::cast)
    }
}

/// A reference written as a qualified name or a dotted chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceNode {
    Name(QualifiedName),
    Chain(FeatureChain),
}

impl ReferenceNode {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::QUALIFIED_NAME => QualifiedName::cast(node).map(Self::Name),
            SyntaxKind::FEATURE_CHAIN => FeatureChain::cast(node).map(Self::Chain),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Name(name) => name.syntax(),
            Self::Chain(chain) => chain.syntax(),
        }
    }

    /// One path per chain segment; a plain name is a single path.
    pub fn paths(&self) -> Vec<Vec<SmolStr>> {
        match self {
            Self::Name(name) => vec![name.segments()],
            Self::Chain(chain) => chain.parts().map(|part| part.segments()).collect(),
        }
    }

    pub fn is_global(&self) -> bool {
        match self {
            Self::Name(name) => name.is_global(),
            Self::Chain(chain) => chain.parts().next().is_some_and(|part| part.is_global()),
        }
    }
}

/// Reference children of `node`, in order.
pub fn references(node: &SyntaxNode) -> Vec<ReferenceNode> {
    node.children().filter_map(ReferenceNode::cast).collect()
}

// ============================================================================
// Declarations
// ============================================================================

ast_node!(Multiplicity, MULTIPLICITY);

impl Multiplicity {
    /// Bound expressions: one for `[n]`, two for `[l..u]`.
    pub fn bounds(&self) -> Vec<SyntaxNode> {
        self.0.children().filter(|n| n.kind().is_expr()).collect()
    }

    has_token_method!(is_range, DOT_DOT);
}

ast_node!(FeatureValue, FEATURE_VALUE);

impl FeatureValue {
    has_token_method!(is_default, DEFAULT_KW);
    has_token_method!(is_initial, COLON_EQ);

    pub fn expression(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind().is_expr())
    }
}

ast_node!(ConnectorEnd, CONNECTOR_END);

impl ConnectorEnd {
    first_child_method!(name, Name);

    pub fn reference(&self) -> Option<ReferenceNode> {
        self.0.children().find_map(ReferenceNode::cast)
    }

    pub fn multiplicity(&self) -> Option<Multiplicity> {
        self.0.children().find_map(Multiplicity::cast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_text_strips_margins() {
        let raw = "/*\n * First line\n *   indented\n */";
        assert_eq!(comment_text(raw), "First line\nindented");
        assert_eq!(comment_text("/* inline */"), "inline");
        assert_eq!(comment_text("/**/"), "");
    }

    #[test]
    fn test_string_value_unescapes() {
        assert_eq!(string_value(r#""a\"b\n""#), "a\"b\n");
        assert_eq!(string_value(r#""""#), "");
    }

    #[test]
    fn test_unescape_keeps_unknown_escapes() {
        assert_eq!(unescape(r"it\'s"), "it's");
        assert_eq!(unescape(r"back\\slash"), "back\\slash");
    }
}

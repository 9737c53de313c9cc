//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! One enum serves both KerML and SysML; which keywords a unit can actually
//! produce is decided by the lexer from the unit's language.

/// All syntax kinds (tokens and nodes) for KerML and SysML
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (packages, definitions, usages, expressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and notes - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_NOTE,          // // note
    BLOCK_NOTE,         // //* note */

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,              // identifier, 'unrestricted name' or `backticked name`
    INTEGER,            // 42
    REAL,               // 3.14, .5, 1e3
    STRING,             // "hello"
    REGULAR_COMMENT,    // /* comment body */ (significant: owned by comment elements)

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,            // {
    R_BRACE,            // }
    L_BRACKET,          // [
    R_BRACKET,          // ]
    L_PAREN,            // (
    R_PAREN,            // )
    SEMICOLON,          // ;
    COLON,              // :
    COLON_COLON,        // ::
    COLON_GT,           // :>  (specializes/subsets)
    COLON_GT_GT,        // :>> (redefines)
    COLON_COLON_GT,     // ::> (references)
    COLON_EQ,           // :=
    DOT,                // .
    DOT_DOT,            // ..
    DOT_QUESTION,       // .?
    COMMA,              // ,
    EQ,                 // =
    EQ_EQ,              // ==
    EQ_EQ_EQ,           // ===
    BANG_EQ,            // !=
    BANG_EQ_EQ,         // !==
    LT,                 // <
    GT,                 // >
    LT_EQ,              // <=
    GT_EQ,              // >=
    ARROW,              // ->
    FAT_ARROW,          // =>  (crosses)
    AT,                 // @
    AT_AT,              // @@
    HASH,               // #
    STAR,               // *
    STAR_STAR,          // **
    PLUS,               // +
    MINUS,              // -
    SLASH,              // /
    PERCENT,            // %
    CARET,              // ^
    TILDE,              // ~
    QUESTION,           // ?
    QUESTION_QUESTION,  // ??
    PIPE,               // |
    AMP,                // &
    DOLLAR,             // $

    // =========================================================================
    // KEYWORDS (alphabetical; reserved per language in `keywords`)
    // =========================================================================
    ABOUT_KW,
    ABSTRACT_KW,
    ACCEPT_KW,
    ACTION_KW,
    ACTOR_KW,
    AFTER_KW,
    ALIAS_KW,
    ALL_KW,
    ALLOCATE_KW,
    ALLOCATION_KW,
    ANALYSIS_KW,
    AND_KW,
    AS_KW,
    ASSERT_KW,
    ASSIGN_KW,
    ASSOC_KW,
    ASSUME_KW,
    AT_KW,
    ATTRIBUTE_KW,
    BEHAVIOR_KW,
    BIND_KW,
    BINDING_KW,
    BOOL_KW,
    BY_KW,
    CALC_KW,
    CASE_KW,
    CHAINS_KW,
    CLASS_KW,
    CLASSIFIER_KW,
    COMMENT_KW,
    COMPOSITE_KW,
    CONCERN_KW,
    CONJUGATE_KW,
    CONJUGATES_KW,
    CONJUGATION_KW,
    CONNECT_KW,
    CONNECTION_KW,
    CONNECTOR_KW,
    CONSTANT_KW,
    CONSTRAINT_KW,
    CROSSES_KW,
    DATATYPE_KW,
    DECIDE_KW,
    DEF_KW,
    DEFAULT_KW,
    DEFINED_KW,
    DEPENDENCY_KW,
    DERIVED_KW,
    DIFFERENCES_KW,
    DISJOINING_KW,
    DISJOINT_KW,
    DO_KW,
    DOC_KW,
    ELSE_KW,
    END_KW,
    ENTRY_KW,
    ENUM_KW,
    EVENT_KW,
    EXHIBIT_KW,
    EXIT_KW,
    EXPOSE_KW,
    EXPR_KW,
    FALSE_KW,
    FEATURE_KW,
    FEATURED_KW,
    FEATURING_KW,
    FILTER_KW,
    FIRST_KW,
    FLOW_KW,
    FOR_KW,
    FORK_KW,
    FRAME_KW,
    FROM_KW,
    FUNCTION_KW,
    HASTYPE_KW,
    IF_KW,
    IMPLIES_KW,
    IMPORT_KW,
    IN_KW,
    INCLUDE_KW,
    INDIVIDUAL_KW,
    INOUT_KW,
    INTERACTION_KW,
    INTERFACE_KW,
    INTERSECTS_KW,
    INV_KW,
    INVERSE_KW,
    INVERTING_KW,
    ISTYPE_KW,
    ITEM_KW,
    JOIN_KW,
    LANGUAGE_KW,
    LIBRARY_KW,
    LOCALE_KW,
    LOOP_KW,
    MEMBER_KW,
    MERGE_KW,
    MESSAGE_KW,
    META_KW,
    METACLASS_KW,
    METADATA_KW,
    MULTIPLICITY_KW,
    NAMESPACE_KW,
    NEW_KW,
    NONUNIQUE_KW,
    NOT_KW,
    NULL_KW,
    OBJECTIVE_KW,
    OCCURRENCE_KW,
    OF_KW,
    OR_KW,
    ORDERED_KW,
    OUT_KW,
    PACKAGE_KW,
    PARALLEL_KW,
    PART_KW,
    PERFORM_KW,
    PORT_KW,
    PORTION_KW,
    PREDICATE_KW,
    PRIVATE_KW,
    PROTECTED_KW,
    PUBLIC_KW,
    READONLY_KW,
    REDEFINES_KW,
    REDEFINITION_KW,
    REF_KW,
    REFERENCES_KW,
    RENDER_KW,
    RENDERING_KW,
    REP_KW,
    REQUIRE_KW,
    REQUIREMENT_KW,
    RETURN_KW,
    SATISFY_KW,
    SEND_KW,
    SNAPSHOT_KW,
    SPECIALIZATION_KW,
    SPECIALIZES_KW,
    STAKEHOLDER_KW,
    STANDARD_KW,
    STATE_KW,
    STEP_KW,
    STRUCT_KW,
    SUBCLASSIFIER_KW,
    SUBJECT_KW,
    SUBSET_KW,
    SUBSETS_KW,
    SUBTYPE_KW,
    SUCCESSION_KW,
    TERMINATE_KW,
    THEN_KW,
    TIMESLICE_KW,
    TO_KW,
    TRANSITION_KW,
    TRUE_KW,
    TYPE_KW,
    TYPED_KW,
    TYPING_KW,
    UNIONS_KW,
    UNTIL_KW,
    USE_KW,
    VAR_KW,
    VARIANT_KW,
    VARIATION_KW,
    VERIFICATION_KW,
    VERIFY_KW,
    VIA_KW,
    VIEW_KW,
    VIEWPOINT_KW,
    WHEN_KW,
    WHILE_KW,
    XOR_KW,
    // =========================================================================
    // NODES - Structure
    // =========================================================================
    SOURCE_FILE,
    NAMESPACE_BODY,
    NAME,
    SHORT_NAME,
    QUALIFIED_NAME,
    FEATURE_CHAIN,
    PREFIX_METADATA,

    // Namespace members
    PACKAGE,
    LIBRARY_PACKAGE,
    NAMESPACE_DECL,
    IMPORT,
    FILTER_CONDITION,
    FILTER_MEMBER,
    ALIAS_MEMBER,
    DEPENDENCY,
    RELATIONSHIP_DECL,
    RESULT_EXPRESSION,

    // Annotations
    COMMENT_ELEMENT,
    DOCUMENTATION,
    TEXTUAL_REP,
    METADATA_USAGE,
    ABOUT_CLAUSE,

    // Types and features
    DEFINITION,
    USAGE,
    MULTIPLICITY,
    FEATURE_VALUE,

    // Relationship clauses
    SPECIALIZATION,
    CONJUGATION,
    DISJOINING,
    UNIONING,
    INTERSECTING,
    DIFFERENCING,
    TYPING,
    SUBSETTING,
    REFERENCE_SUBSETTING,
    CROSS_SUBSETTING,
    REDEFINITION,
    FEATURING,
    INVERTING,
    CHAINING,

    // Connectors
    CONNECTOR_PART,
    CONNECTOR_END,
    FLOW_PAYLOAD,

    // Behavior
    ACCEPT_PART,
    PAYLOAD,
    TRIGGER,
    VIA_CLAUSE,
    SEND_PART,
    TO_CLAUSE,
    ASSIGN_PART,
    CONDITION,
    ELSE_BRANCH,
    UNTIL_CLAUSE,
    FOR_VARIABLE,
    TRANSITION_SOURCE,
    GUARD,
    EFFECT,
    SUCCESSION_TARGET,
    BY_CLAUSE,

    // =========================================================================
    // NODES - Expressions
    // =========================================================================
    CONDITIONAL_EXPR,
    BINARY_EXPR,
    UNARY_EXPR,
    CLASSIFICATION_EXPR,
    CAST_EXPR,
    EXTENT_EXPR,
    LITERAL_EXPR,
    NULL_EXPR,
    NAME_EXPR,
    PAREN_EXPR,
    SEQUENCE_EXPR,
    INVOCATION_EXPR,
    INSTANTIATION_EXPR,
    ARGUMENT_LIST,
    ARGUMENT,
    FEATURE_CHAIN_EXPR,
    METADATA_ACCESS_EXPR,
    INDEX_EXPR,
    BRACKET_EXPR,
    COLLECT_EXPR,
    SELECT_EXPR,
    ARROW_EXPR,
    BODY_EXPR,

    // Special
    ERROR,
    /// End of input; never stored in a tree
    EOF,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or note)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_NOTE | Self::BLOCK_NOTE)
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::ABOUT_KW as u16) && (self as u16) <= (Self::XOR_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::DOLLAR as u16)
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::INTEGER | Self::REAL | Self::STRING | Self::TRUE_KW | Self::FALSE_KW
        )
    }

    /// Check if this is an expression node
    ///
    /// Argument lists and arguments sit among the expression kinds but are
    /// not expressions themselves.
    pub fn is_expr(self) -> bool {
        (self as u16) >= (Self::CONDITIONAL_EXPR as u16)
            && (self as u16) <= (Self::BODY_EXPR as u16)
            && !matches!(self, Self::ARGUMENT_LIST | Self::ARGUMENT)
    }

    /// Human-readable rendering for error messages: `'part'`, `';'`, `identifier`.
    pub fn describe(self) -> String {
        if self.is_keyword() {
            if let Some(text) = super::keywords::text_of(self) {
                return format!("'{text}'");
            }
        }
        if let Some(text) = self.punct_text() {
            return format!("'{text}'");
        }
        match self {
            Self::IDENT => "identifier".to_string(),
            Self::INTEGER => "integer literal".to_string(),
            Self::REAL => "real literal".to_string(),
            Self::STRING => "string literal".to_string(),
            Self::REGULAR_COMMENT => "comment body".to_string(),
            Self::EOF => "end of input".to_string(),
            other => format!("{other:?}"),
        }
    }

    /// Source text of a punctuation kind.
    pub fn punct_text(self) -> Option<&'static str> {
        let text = match self {
            Self::L_BRACE => "{",
            Self::R_BRACE => "}",
            Self::L_BRACKET => "[",
            Self::R_BRACKET => "]",
            Self::L_PAREN => "(",
            Self::R_PAREN => ")",
            Self::SEMICOLON => ";",
            Self::COLON => ":",
            Self::COLON_COLON => "::",
            Self::COLON_GT => ":>",
            Self::COLON_GT_GT => ":>>",
            Self::COLON_COLON_GT => "::>",
            Self::COLON_EQ => ":=",
            Self::DOT => ".",
            Self::DOT_DOT => "..",
            Self::DOT_QUESTION => ".?",
            Self::COMMA => ",",
            Self::EQ => "=",
            Self::EQ_EQ => "==",
            Self::EQ_EQ_EQ => "===",
            Self::BANG_EQ => "!=",
            Self::BANG_EQ_EQ => "!==",
            Self::LT => "<",
            Self::GT => ">",
            Self::LT_EQ => "<=",
            Self::GT_EQ => ">=",
            Self::ARROW => "->",
            Self::FAT_ARROW => "=>",
            Self::AT => "@",
            Self::AT_AT => "@@",
            Self::HASH => "#",
            Self::STAR => "*",
            Self::STAR_STAR => "**",
            Self::PLUS => "+",
            Self::MINUS => "-",
            Self::SLASH => "/",
            Self::PERCENT => "%",
            Self::CARET => "^",
            Self::TILDE => "~",
            Self::QUESTION => "?",
            Self::QUESTION_QUESTION => "??",
            Self::PIPE => "|",
            Self::AMP => "&",
            Self::DOLLAR => "$",
            _ => return None,
        };
        Some(text)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KerMLLanguage {}

impl rowan::Language for KerMLLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<KerMLLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<KerMLLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<KerMLLanguage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_range() {
        assert!(SyntaxKind::ABOUT_KW.is_keyword());
        assert!(SyntaxKind::PART_KW.is_keyword());
        assert!(SyntaxKind::XOR_KW.is_keyword());
        assert!(!SyntaxKind::IDENT.is_keyword());
        assert!(!SyntaxKind::SOURCE_FILE.is_keyword());
    }

    #[test]
    fn test_rowan_roundtrip() {
        for kind in [SyntaxKind::WHITESPACE, SyntaxKind::USAGE, SyntaxKind::EOF] {
            let raw: rowan::SyntaxKind = kind.into();
            assert_eq!(SyntaxKind::from(raw), kind);
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(SyntaxKind::SEMICOLON.describe(), "';'");
        assert_eq!(SyntaxKind::PART_KW.describe(), "'part'");
        assert_eq!(SyntaxKind::IDENT.describe(), "identifier");
        assert_eq!(SyntaxKind::EOF.describe(), "end of input");
    }

    #[test]
    fn test_classification() {
        assert!(SyntaxKind::LINE_NOTE.is_trivia());
        assert!(!SyntaxKind::REGULAR_COMMENT.is_trivia());
        assert!(SyntaxKind::TRUE_KW.is_literal());
        assert!(SyntaxKind::ARROW_EXPR.is_expr());
        assert!(!SyntaxKind::ARGUMENT_LIST.is_expr());
        assert!(!SyntaxKind::USAGE.is_expr());
        assert!(SyntaxKind::DOLLAR.is_punct());
    }
}

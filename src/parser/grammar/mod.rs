//! Grammar rules for KerML and SysML
//!
//! One function family per nonterminal group. Every function takes the
//! [`Parser`] and returns [`PResult`]; element functions receive the
//! checkpoint taken before the member's visibility and prefix keywords so
//! those tokens end up inside the element node.
//!
//! ```text
//! SourceFile      = Member*
//! Member          = Visibility? PrefixMetadata* ( NamespaceMember
//!                 | Definition | Usage | Relationship | Annotation )
//! Body            = ';' | '{' Member* '}'
//! ```

mod behavior;
mod connectors;
mod definitions;
pub mod expressions;
mod namespace;
mod relationships;
mod requirements;
mod usages;

pub(super) use crate::parser::errors::{ErrorCode, ParseContext};
pub(super) use crate::parser::parser::{Abort, PResult, Parser};
pub(super) use crate::parser::syntax_kind::SyntaxKind;
pub(super) use rowan::Checkpoint;

pub(super) use self::expressions::{can_start_expression, parse_expression};
pub(super) use self::relationships::{ClauseOwner, parse_clauses, parse_multiplicity};

/// SourceFile = Member*
pub fn parse_source_file(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::SOURCE_FILE);
    let marker = p.marker();
    match parse_members(p, SyntaxKind::EOF) {
        Ok(()) => {}
        Err(abort) => {
            debug_assert!(abort.is_fatal());
            p.abandon(marker);
        }
    }
    p.finish_source();
    p.finish_node();
    Ok(())
}

/// ExpressionUnit = OwnedExpression EOF
///
/// A failed expression leaves no partial node: the whole input goes under
/// `ERROR`, as does anything after a complete expression.
pub fn parse_expression_unit(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::SOURCE_FILE);
    let marker = p.marker();
    let parsed = if can_start_expression(p.current()) {
        parse_expression(p)
    } else {
        Err(p.error_expected(ErrorCode::E0406, &["expression".to_string()]))
    };
    match parsed {
        Ok(()) if p.at_eof() => {}
        Ok(()) => {
            let found = p.current().describe();
            let _ = p.error(ErrorCode::E0901, format!("unexpected {found} after expression"));
            let rest = p.marker();
            p.abandon(rest);
        }
        Err(_) => p.abandon(marker),
    }
    p.finish_source();
    p.finish_node();
    Ok(())
}

/// Member* up to `terminator`, recovering from malformed members.
///
/// Fatal aborts are passed on; everything else is wrapped in `ERROR`.
pub(super) fn parse_members(p: &mut Parser<'_>, terminator: SyntaxKind) -> PResult {
    while !p.at(terminator) && !p.at_eof() {
        p.check_cancelled()?;
        let marker = p.marker();
        match namespace::parse_member(p) {
            Ok(()) => {}
            Err(abort) if abort.is_fatal() => return Err(abort),
            Err(_) => p.recover(marker),
        }
    }
    Ok(())
}

/// Body = ';' | '{' Member* '}'
pub(super) fn parse_body(p: &mut Parser<'_>, context: ParseContext) -> PResult {
    match p.current() {
        SyntaxKind::SEMICOLON => {
            p.bump();
            Ok(())
        }
        SyntaxKind::L_BRACE => parse_braced_body(p, context),
        _ => Err(p.error_expected(
            ErrorCode::E0307,
            &["';'".to_string(), "'{'".to_string()],
        )),
    }
}

/// '{' Member* '}' as a NAMESPACE_BODY node
pub(super) fn parse_braced_body(p: &mut Parser<'_>, context: ParseContext) -> PResult {
    p.nested(|p| {
        p.start_node(SyntaxKind::NAMESPACE_BODY);
        p.expect(SyntaxKind::L_BRACE)?;
        p.with_context(context, |p| parse_members(p, SyntaxKind::R_BRACE))?;
        p.expect(SyntaxKind::R_BRACE)?;
        p.finish_node();
        Ok(())
    })
}

// =============================================================================
// Names
// =============================================================================

/// Whether the next tokens form `<name>` or a name.
pub(super) fn at_identification(p: &Parser<'_>) -> bool {
    p.at(SyntaxKind::IDENT) || at_short_name(p)
}

fn at_short_name(p: &Parser<'_>) -> bool {
    p.at(SyntaxKind::LT) && p.nth(1) == SyntaxKind::IDENT && p.nth(2) == SyntaxKind::GT
}

/// Identification = ('<' ShortName '>')? Name?
pub(super) fn parse_identification(p: &mut Parser<'_>) -> PResult {
    if at_short_name(p) {
        p.start_node(SyntaxKind::SHORT_NAME);
        p.bump();
        p.bump();
        p.bump();
        p.finish_node();
    }
    if p.at(SyntaxKind::IDENT) {
        p.start_node(SyntaxKind::NAME);
        p.bump();
        p.finish_node();
    }
    Ok(())
}

/// Whether a qualified name starts here.
pub(super) fn at_qualified_name(p: &Parser<'_>) -> bool {
    p.at(SyntaxKind::IDENT) || (p.at(SyntaxKind::DOLLAR) && p.nth(1) == SyntaxKind::COLON_COLON)
}

/// QualifiedName = ('$' '::')? Name ('::' Name)*
///
/// Stops in front of `::*` and `::**` so imports can take the wildcard.
pub(super) fn parse_qualified_name(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::QUALIFIED_NAME);
    if p.at(SyntaxKind::DOLLAR) {
        p.bump();
        p.expect(SyntaxKind::COLON_COLON)?;
    }
    if !p.at(SyntaxKind::IDENT) {
        return Err(p.error_expected(ErrorCode::E0902, &["name".to_string()]));
    }
    p.bump();
    while p.at(SyntaxKind::COLON_COLON) && p.nth(1) == SyntaxKind::IDENT {
        p.bump();
        p.bump();
    }
    p.finish_node();
    Ok(())
}

/// Reference = QualifiedName ('.' QualifiedName)*
///
/// More than one segment produces a FEATURE_CHAIN node.
pub(super) fn parse_reference(p: &mut Parser<'_>) -> PResult {
    if !at_qualified_name(p) {
        return Err(p.error_expected(ErrorCode::E0601, &["name".to_string()]));
    }
    let cp = p.checkpoint();
    parse_qualified_name(p)?;
    if p.at(SyntaxKind::DOT) && p.nth(1) == SyntaxKind::IDENT {
        p.start_node_at(cp, SyntaxKind::FEATURE_CHAIN);
        while p.at(SyntaxKind::DOT) && p.nth(1) == SyntaxKind::IDENT {
            p.bump();
            parse_qualified_name(p)?;
        }
        p.finish_node();
    }
    Ok(())
}

/// Reference (',' Reference)*
pub(super) fn parse_reference_list(p: &mut Parser<'_>) -> PResult {
    parse_reference(p)?;
    while p.eat(SyntaxKind::COMMA) {
        parse_reference(p)?;
    }
    Ok(())
}

impl expressions::ExpressionParser for Parser<'_> {
    fn current(&self) -> SyntaxKind {
        Parser::current(self)
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        Parser::nth(self, n)
    }

    fn current_text(&self) -> &str {
        Parser::current_text(self)
    }

    fn bump(&mut self) {
        Parser::bump(self)
    }

    fn expect(&mut self, kind: SyntaxKind) -> PResult {
        Parser::expect(self, kind)
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        Parser::start_node(self, kind)
    }

    fn finish_node(&mut self) {
        Parser::finish_node(self)
    }

    fn checkpoint(&mut self) -> Checkpoint {
        Parser::checkpoint(self)
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        Parser::start_node_at(self, checkpoint, kind)
    }

    fn error(&mut self, code: ErrorCode, message: String) -> Abort {
        Parser::error(self, code, message)
    }

    fn error_expected(&mut self, code: ErrorCode, expected: &[String]) -> Abort {
        Parser::error_expected(self, code, expected)
    }

    fn nested_expr(&mut self, f: fn(&mut Self) -> PResult) -> PResult {
        self.nested(f)
    }

    fn enter_nesting(&mut self) -> PResult {
        self.enter()
    }

    fn leave_nesting(&mut self, levels: u32) {
        self.leave(levels)
    }

    fn parse_qualified_name(&mut self) -> PResult {
        parse_qualified_name(self)
    }

    fn parse_expression_body(&mut self) -> PResult {
        parse_braced_body(self, ParseContext::FunctionBody)
    }
}

// =============================================================================
// Keyword groups
// =============================================================================

pub(super) const VISIBILITY: &[SyntaxKind] = &[
    SyntaxKind::PUBLIC_KW,
    SyntaxKind::PRIVATE_KW,
    SyntaxKind::PROTECTED_KW,
];

/// KerML classifier keywords
pub(super) const KERML_TYPE_KEYWORDS: &[SyntaxKind] = &[
    SyntaxKind::TYPE_KW,
    SyntaxKind::CLASSIFIER_KW,
    SyntaxKind::CLASS_KW,
    SyntaxKind::DATATYPE_KW,
    SyntaxKind::STRUCT_KW,
    SyntaxKind::ASSOC_KW,
    SyntaxKind::BEHAVIOR_KW,
    SyntaxKind::FUNCTION_KW,
    SyntaxKind::PREDICATE_KW,
    SyntaxKind::INTERACTION_KW,
    SyntaxKind::METACLASS_KW,
];

/// KerML feature keywords
pub(super) const KERML_FEATURE_KEYWORDS: &[SyntaxKind] = &[
    SyntaxKind::FEATURE_KW,
    SyntaxKind::STEP_KW,
    SyntaxKind::EXPR_KW,
    SyntaxKind::BOOL_KW,
    SyntaxKind::INV_KW,
    SyntaxKind::CONNECTOR_KW,
    SyntaxKind::BINDING_KW,
    SyntaxKind::SUCCESSION_KW,
];

/// SysML keywords that name a definition or usage kind
pub(super) const SYSML_KIND_KEYWORDS: &[SyntaxKind] = &[
    SyntaxKind::ATTRIBUTE_KW,
    SyntaxKind::ENUM_KW,
    SyntaxKind::OCCURRENCE_KW,
    SyntaxKind::ITEM_KW,
    SyntaxKind::PART_KW,
    SyntaxKind::PORT_KW,
    SyntaxKind::CONNECTION_KW,
    SyntaxKind::INTERFACE_KW,
    SyntaxKind::ALLOCATION_KW,
    SyntaxKind::FLOW_KW,
    SyntaxKind::ACTION_KW,
    SyntaxKind::STATE_KW,
    SyntaxKind::CALC_KW,
    SyntaxKind::CONSTRAINT_KW,
    SyntaxKind::REQUIREMENT_KW,
    SyntaxKind::CONCERN_KW,
    SyntaxKind::CASE_KW,
    SyntaxKind::ANALYSIS_KW,
    SyntaxKind::VERIFICATION_KW,
    SyntaxKind::USE_KW,
    SyntaxKind::VIEW_KW,
    SyntaxKind::VIEWPOINT_KW,
    SyntaxKind::RENDERING_KW,
    SyntaxKind::METADATA_KW,
];

/// SysML usage-only kind keywords
pub(super) const SYSML_USAGE_ONLY_KEYWORDS: &[SyntaxKind] = &[
    SyntaxKind::MESSAGE_KW,
    SyntaxKind::EVENT_KW,
    SyntaxKind::SNAPSHOT_KW,
    SyntaxKind::TIMESLICE_KW,
    SyntaxKind::SUBJECT_KW,
    SyntaxKind::ACTOR_KW,
    SyntaxKind::STAKEHOLDER_KW,
    SyntaxKind::OBJECTIVE_KW,
    SyntaxKind::TRANSITION_KW,
];

/// Body context for a definition or usage, from its kind keywords.
pub(super) fn context_for_kind(kinds: &[SyntaxKind]) -> ParseContext {
    use SyntaxKind::*;
    let mut context = ParseContext::TypeBody;
    for kind in kinds {
        context = match kind {
            STATE_KW => return ParseContext::StateBody,
            CALC_KW | FUNCTION_KW | PREDICATE_KW | EXPR_KW | BOOL_KW | INV_KW | CONSTRAINT_KW
            | ASSERT_KW | ASSUME_KW | REQUIRE_KW => ParseContext::FunctionBody,
            REQUIREMENT_KW | CONCERN_KW | CASE_KW | VIEWPOINT_KW | OBJECTIVE_KW | SATISFY_KW
            | VERIFY_KW | FRAME_KW => ParseContext::RequirementBody,
            ACTION_KW | BEHAVIOR_KW | STEP_KW | INTERACTION_KW | PERFORM_KW | ENTRY_KW | DO_KW
            | EXIT_KW | IF_KW | WHILE_KW | LOOP_KW | FOR_KW | ELSE_KW => ParseContext::ActionBody,
            _ => continue,
        };
    }
    context
}

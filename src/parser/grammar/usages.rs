//! Feature declarations: KerML features, SysML usages, parameters,
//! enumeration values and result expressions.

use super::*;

/// Control nodes that parse like plain usages.
const CONTROL_NODE_KEYWORDS: &[SyntaxKind] = &[
    SyntaxKind::DECIDE_KW,
    SyntaxKind::FORK_KW,
    SyntaxKind::JOIN_KW,
    SyntaxKind::MERGE_KW,
];

pub(super) fn at_usage_keyword(p: &Parser<'_>) -> bool {
    p.at_any(SYSML_KIND_KEYWORDS)
        || p.at_any(SYSML_USAGE_ONLY_KEYWORDS)
        || p.at_any(KERML_FEATURE_KEYWORDS)
        || p.at_any(CONTROL_NODE_KEYWORDS)
}

/// Tokens that may follow the name of a usage declared without a keyword.
fn continues_implicit_usage(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::COLON
            | SyntaxKind::COLON_GT
            | SyntaxKind::COLON_GT_GT
            | SyntaxKind::COLON_COLON_GT
            | SyntaxKind::FAT_ARROW
            | SyntaxKind::L_BRACKET
            | SyntaxKind::SEMICOLON
            | SyntaxKind::EQ
            | SyntaxKind::COLON_EQ
            | SyntaxKind::L_BRACE
            | SyntaxKind::TILDE
            | SyntaxKind::DEFAULT_KW
            | SyntaxKind::TYPED_KW
            | SyntaxKind::DEFINED_KW
            | SyntaxKind::SUBSETS_KW
            | SyntaxKind::REDEFINES_KW
            | SyntaxKind::REFERENCES_KW
            | SyntaxKind::CROSSES_KW
            | SyntaxKind::SPECIALIZES_KW
            | SyntaxKind::ORDERED_KW
            | SyntaxKind::NONUNIQUE_KW
    )
}

/// `x : T;`, `<s> x;` or `:>> x = 1;` with no kind keyword.
fn at_implicit_usage(p: &Parser<'_>) -> bool {
    if p.at(SyntaxKind::LT) {
        return at_identification(p);
    }
    if p.at(SyntaxKind::IDENT) {
        return continues_implicit_usage(p.nth(1));
    }
    matches!(
        p.current(),
        SyntaxKind::COLON
            | SyntaxKind::COLON_GT
            | SyntaxKind::COLON_GT_GT
            | SyntaxKind::COLON_COLON_GT
            | SyntaxKind::REDEFINES_KW
            | SyntaxKind::SUBSETS_KW
            | SyntaxKind::REFERENCES_KW
    )
}

/// Everything that is not a namespace-level member: definitions, usages,
/// behavior nodes, successions and result expressions.
pub(super) fn parse_definition_or_usage(
    p: &mut Parser<'_>,
    cp: Checkpoint,
    has_visibility: bool,
) -> PResult {
    let prefixed = definitions::parse_prefixes(p)?;
    if definitions::at_definition(p) {
        return definitions::parse_definition(p, cp);
    }

    match p.current() {
        _ if behavior::at_behavior_usage(p) => behavior::parse_behavior_usage(p, cp),
        kind if requirements::at_performed_usage(p, kind) => {
            requirements::parse_performed_usage(p, cp)
        }
        SyntaxKind::CONNECT_KW
        | SyntaxKind::BIND_KW
        | SyntaxKind::ALLOCATE_KW
        | SyntaxKind::FIRST_KW => connectors::parse_connector_shorthand(p, cp),
        SyntaxKind::THEN_KW | SyntaxKind::ELSE_KW => connectors::parse_succession_shorthand(p, cp),
        _ if at_usage_keyword(p) => parse_usage(p, cp),
        _ if prefixed || at_implicit_usage(p) => parse_usage(p, cp),
        kind if !has_visibility
            && p.context().allows_result_expression()
            && can_start_expression(kind) =>
        {
            parse_result_expression(p, cp)
        }
        _ => {
            let code = p.context().member_error_code();
            Err(p.error_unexpected(code))
        }
    }
}

/// Usage = Prefix* UsageKeyword* UsageDeclaration Body
pub(super) fn parse_usage(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::USAGE);
    let kinds = parse_kind_keywords(p);
    parse_usage_declaration(p, &kinds)?;
    parse_body(p, context_for_kind(&kinds))?;
    p.finish_node();
    Ok(())
}

/// Consume usage kind keywords (`use case`, `succession flow`, ...).
pub(super) fn parse_kind_keywords(p: &mut Parser<'_>) -> Vec<SyntaxKind> {
    let mut kinds = Vec::new();
    while at_usage_keyword(p) {
        kinds.push(p.current());
        p.bump();
    }
    kinds
}

/// UsageDeclaration = Identification? Clauses 'parallel'? ConnectorPart? FeatureValue?
///
/// Connector kinds may skip the declaration and start with their ends
/// (`flow a.x to b.y`).
pub(super) fn parse_usage_declaration(p: &mut Parser<'_>, kinds: &[SyntaxKind]) -> PResult {
    let bare_ends = connectors::takes_bare_ends(p, kinds);
    if !bare_ends {
        parse_identification(p)?;
        parse_clauses(p, ClauseOwner::Feature)?;
        p.eat(SyntaxKind::PARALLEL_KW);
    }
    if bare_ends || connectors::at_connector_part(p, kinds) {
        connectors::parse_connector_part(p, kinds)?;
    }
    parse_feature_value(p)
}

/// FeatureValue = ('=' | ':=' | 'default' ('=' | ':=')?) OwnedExpression
pub(super) fn parse_feature_value(p: &mut Parser<'_>) -> PResult {
    if !p.at_any(&[SyntaxKind::EQ, SyntaxKind::COLON_EQ, SyntaxKind::DEFAULT_KW]) {
        return Ok(());
    }
    p.start_node(SyntaxKind::FEATURE_VALUE);
    if p.eat(SyntaxKind::DEFAULT_KW) {
        if !p.eat(SyntaxKind::EQ) {
            p.eat(SyntaxKind::COLON_EQ);
        }
    } else if !p.eat(SyntaxKind::EQ) {
        p.expect(SyntaxKind::COLON_EQ)?;
    }
    if !can_start_expression(p.current()) {
        return Err(p.error_expected(ErrorCode::E0406, &["expression".to_string()]));
    }
    parse_expression(p)?;
    p.finish_node();
    Ok(())
}

/// ResultExpression = OwnedExpression, last in a function-like body
fn parse_result_expression(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::RESULT_EXPRESSION);
    parse_expression(p)?;
    p.finish_node();
    if !p.at(SyntaxKind::R_BRACE) {
        return Err(p.error(
            ErrorCode::E0401,
            "a result expression must be the last member of its body",
        ));
    }
    Ok(())
}

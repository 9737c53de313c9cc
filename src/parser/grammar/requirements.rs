//! Usages that refer to another element: perform, exhibit, include,
//! satisfy, verify, constraint roles (assert, require, assume), frame and
//! render.

use super::usages::{at_usage_keyword, parse_feature_value, parse_kind_keywords, parse_usage_declaration};
use super::*;

const PERFORM_KEYWORDS: &[SyntaxKind] = &[
    SyntaxKind::PERFORM_KW,
    SyntaxKind::EXHIBIT_KW,
    SyntaxKind::INCLUDE_KW,
    SyntaxKind::SATISFY_KW,
    SyntaxKind::VERIFY_KW,
    SyntaxKind::ASSERT_KW,
    SyntaxKind::REQUIRE_KW,
    SyntaxKind::ASSUME_KW,
    SyntaxKind::FRAME_KW,
    SyntaxKind::RENDER_KW,
];

pub(super) fn at_performed_usage(p: &Parser<'_>, kind: SyntaxKind) -> bool {
    PERFORM_KEYWORDS.contains(&kind)
        || (kind == SyntaxKind::NOT_KW
            && matches!(p.nth(1), SyntaxKind::SATISFY_KW | SyntaxKind::ASSERT_KW))
}

/// PerformedUsage = 'not'? RoleKeyword 'not'? PerformedTail ('by' Reference)? Body
pub(super) fn parse_performed_usage(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::USAGE);
    p.eat(SyntaxKind::NOT_KW);
    let role = p.current();
    p.bump();
    p.eat(SyntaxKind::NOT_KW);

    let mut kinds = vec![role];
    kinds.extend(parse_performed_tail(p)?);

    if matches!(role, SyntaxKind::SATISFY_KW | SyntaxKind::VERIFY_KW) && p.at(SyntaxKind::BY_KW) {
        p.start_node(SyntaxKind::BY_CLAUSE);
        p.bump();
        parse_reference(p)?;
        p.finish_node();
    }

    parse_body(p, context_for_kind(&kinds))?;
    p.finish_node();
    Ok(())
}

/// PerformedTail = UsageKeyword+ UsageDeclaration | Reference Clauses FeatureValue?
///
/// Returns the usage kind keywords, empty when the tail is a reference.
pub(super) fn parse_performed_tail(p: &mut Parser<'_>) -> PResult<Vec<SyntaxKind>> {
    if at_usage_keyword(p) {
        let kinds = parse_kind_keywords(p);
        parse_usage_declaration(p, &kinds)?;
        return Ok(kinds);
    }
    if !at_qualified_name(p) {
        return Err(p.error_expected(
            ErrorCode::E0601,
            &["usage keyword".to_string(), "name".to_string()],
        ));
    }
    p.start_node(SyntaxKind::REFERENCE_SUBSETTING);
    parse_reference(p)?;
    p.finish_node();
    parse_clauses(p, ClauseOwner::Feature)?;
    parse_feature_value(p)?;
    Ok(Vec::new())
}

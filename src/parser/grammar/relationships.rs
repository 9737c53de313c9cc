//! Relationship clauses on types and features, multiplicities, and the
//! standalone relationship declarations.

use super::*;

/// Whether the clauses belong to a type or a feature.
///
/// `:>` means specialization on a type and subsetting on a feature, and only
/// types take conjugation or set-operation clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClauseOwner {
    Type,
    Feature,
}

/// Keywords that start a standalone relationship declaration.
pub(super) const RELATIONSHIP_DECL_KEYWORDS: &[SyntaxKind] = &[
    SyntaxKind::SPECIALIZATION_KW,
    SyntaxKind::SUBTYPE_KW,
    SyntaxKind::SUBCLASSIFIER_KW,
    SyntaxKind::SUBSET_KW,
    SyntaxKind::REDEFINITION_KW,
    SyntaxKind::TYPING_KW,
    SyntaxKind::CONJUGATION_KW,
    SyntaxKind::CONJUGATE_KW,
    SyntaxKind::DISJOINING_KW,
    SyntaxKind::DISJOINT_KW,
    SyntaxKind::INVERTING_KW,
    SyntaxKind::INVERSE_KW,
    SyntaxKind::FEATURING_KW,
];

/// Clauses = (Specialization | Conjugation | Disjoining | Unioning
///     | Intersecting | Differencing | Typing | Subsetting | References
///     | Crosses | Redefinition | Featuring | Inverting | Chaining
///     | Multiplicity | 'ordered' | 'nonunique')*
pub(crate) fn parse_clauses(p: &mut Parser<'_>, owner: ClauseOwner) -> PResult {
    let mut conjugated = false;
    loop {
        match p.current() {
            SyntaxKind::COLON_GT | SyntaxKind::SPECIALIZES_KW => {
                let kind = match owner {
                    ClauseOwner::Type => SyntaxKind::SPECIALIZATION,
                    ClauseOwner::Feature => SyntaxKind::SUBSETTING,
                };
                parse_list_clause(p, kind, 1)?;
            }
            SyntaxKind::TILDE | SyntaxKind::CONJUGATES_KW if owner == ClauseOwner::Type => {
                if conjugated {
                    return Err(p.error(
                        ErrorCode::E0603,
                        "a type can have at most one conjugation",
                    ));
                }
                conjugated = true;
                parse_single_clause(p, SyntaxKind::CONJUGATION, 1)?;
            }
            SyntaxKind::DISJOINT_KW if p.nth(1) == SyntaxKind::FROM_KW => {
                parse_list_clause(p, SyntaxKind::DISJOINING, 2)?;
            }
            SyntaxKind::UNIONS_KW => parse_list_clause(p, SyntaxKind::UNIONING, 1)?,
            SyntaxKind::INTERSECTS_KW => parse_list_clause(p, SyntaxKind::INTERSECTING, 1)?,
            SyntaxKind::DIFFERENCES_KW => parse_list_clause(p, SyntaxKind::DIFFERENCING, 1)?,
            SyntaxKind::COLON => parse_typing(p, 1)?,
            SyntaxKind::TYPED_KW | SyntaxKind::DEFINED_KW if p.nth(1) == SyntaxKind::BY_KW => {
                parse_typing(p, 2)?;
            }
            SyntaxKind::SUBSETS_KW => parse_list_clause(p, SyntaxKind::SUBSETTING, 1)?,
            SyntaxKind::COLON_COLON_GT | SyntaxKind::REFERENCES_KW => {
                parse_single_clause(p, SyntaxKind::REFERENCE_SUBSETTING, 1)?;
            }
            SyntaxKind::FAT_ARROW | SyntaxKind::CROSSES_KW => {
                parse_single_clause(p, SyntaxKind::CROSS_SUBSETTING, 1)?;
            }
            SyntaxKind::COLON_GT_GT | SyntaxKind::REDEFINES_KW => {
                parse_list_clause(p, SyntaxKind::REDEFINITION, 1)?;
            }
            SyntaxKind::FEATURED_KW if p.nth(1) == SyntaxKind::BY_KW => {
                parse_list_clause(p, SyntaxKind::FEATURING, 2)?;
            }
            SyntaxKind::INVERSE_KW if p.nth(1) == SyntaxKind::OF_KW => {
                parse_single_clause(p, SyntaxKind::INVERTING, 2)?;
            }
            SyntaxKind::CHAINS_KW => parse_single_clause(p, SyntaxKind::CHAINING, 1)?,
            SyntaxKind::L_BRACKET => parse_multiplicity(p)?,
            SyntaxKind::ORDERED_KW | SyntaxKind::NONUNIQUE_KW => p.bump(),
            _ => return Ok(()),
        }
    }
}

/// `keyword_tokens` operator tokens followed by a reference list.
fn parse_list_clause(p: &mut Parser<'_>, kind: SyntaxKind, keyword_tokens: usize) -> PResult {
    p.start_node(kind);
    for _ in 0..keyword_tokens {
        p.bump();
    }
    parse_clause_targets(p)?;
    p.finish_node();
    Ok(())
}

/// `keyword_tokens` operator tokens followed by exactly one reference.
fn parse_single_clause(p: &mut Parser<'_>, kind: SyntaxKind, keyword_tokens: usize) -> PResult {
    p.start_node(kind);
    for _ in 0..keyword_tokens {
        p.bump();
    }
    clause_target(p)?;
    p.finish_node();
    Ok(())
}

/// Typing = (':' | 'typed' 'by' | 'defined' 'by') '~'? Reference (',' '~'? Reference)*
fn parse_typing(p: &mut Parser<'_>, keyword_tokens: usize) -> PResult {
    p.start_node(SyntaxKind::TYPING);
    for _ in 0..keyword_tokens {
        p.bump();
    }
    loop {
        p.eat(SyntaxKind::TILDE);
        if !at_qualified_name(p) {
            return Err(p.error_expected(ErrorCode::E0305, &["type name".to_string()]));
        }
        parse_reference(p)?;
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.finish_node();
    Ok(())
}

fn parse_clause_targets(p: &mut Parser<'_>) -> PResult {
    clause_target(p)?;
    while p.eat(SyntaxKind::COMMA) {
        clause_target(p)?;
    }
    Ok(())
}

fn clause_target(p: &mut Parser<'_>) -> PResult {
    if !at_qualified_name(p) {
        return Err(p.error_expected(ErrorCode::E0602, &["relationship target".to_string()]));
    }
    parse_reference(p)
}

/// Multiplicity = '[' (Bound '..')? Bound ']'
///
/// Bounds parse at the additive level so `..` separates them.
pub(crate) fn parse_multiplicity(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::MULTIPLICITY);
    p.bump();
    parse_bound(p)?;
    if p.eat(SyntaxKind::DOT_DOT) {
        parse_bound(p)?;
    }
    p.expect(SyntaxKind::R_BRACKET)?;
    p.finish_node();
    Ok(())
}

fn parse_bound(p: &mut Parser<'_>) -> PResult {
    if !can_start_expression(p.current()) {
        return Err(p.error_expected(
            ErrorCode::E0406,
            &["multiplicity bound".to_string()],
        ));
    }
    expressions::parse_bound_expression(p)
}

/// RelationshipDeclaration =
///     ('specialization' Identification)? ('subtype' | 'subclassifier' | 'subset'
///         | 'redefinition' | 'typing') Reference Operator Reference Body
///   | ('conjugation' Identification)? 'conjugate' Reference ('~' | 'conjugates') Reference Body
///   | ('disjoining' Identification)? 'disjoint' Reference 'from' Reference Body
///   | ('inverting' Identification)? 'inverse' Reference 'of' Reference Body
///   | 'featuring' (Identification 'of')? Reference 'by' Reference Body
pub(super) fn parse_relationship_decl(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::RELATIONSHIP_DECL);

    let lead = p.current();
    match lead {
        SyntaxKind::SPECIALIZATION_KW
        | SyntaxKind::CONJUGATION_KW
        | SyntaxKind::DISJOINING_KW
        | SyntaxKind::INVERTING_KW => {
            p.bump();
            parse_identification(p)?;
        }
        SyntaxKind::FEATURING_KW => {
            p.bump();
            if at_identification(p) && p.nth(1) == SyntaxKind::OF_KW {
                parse_identification(p)?;
                p.bump();
            }
            parse_relationship_sides(p, SyntaxKind::FEATURING, &[SyntaxKind::BY_KW])?;
            parse_body(p, ParseContext::NamespaceBody)?;
            p.finish_node();
            return Ok(());
        }
        _ => {}
    }

    let (kind, operators): (SyntaxKind, &[SyntaxKind]) = match p.current() {
        SyntaxKind::SUBTYPE_KW | SyntaxKind::SUBCLASSIFIER_KW | SyntaxKind::TYPING_KW => {
            let kind = if p.at(SyntaxKind::TYPING_KW) {
                SyntaxKind::TYPING
            } else {
                SyntaxKind::SPECIALIZATION
            };
            (kind, &[SyntaxKind::COLON_GT, SyntaxKind::SPECIALIZES_KW, SyntaxKind::COLON, SyntaxKind::TYPED_KW])
        }
        SyntaxKind::SUBSET_KW => (
            SyntaxKind::SUBSETTING,
            &[SyntaxKind::COLON_GT, SyntaxKind::SUBSETS_KW],
        ),
        SyntaxKind::REDEFINITION_KW => (
            SyntaxKind::REDEFINITION,
            &[SyntaxKind::COLON_GT_GT, SyntaxKind::REDEFINES_KW],
        ),
        SyntaxKind::CONJUGATE_KW => (
            SyntaxKind::CONJUGATION,
            &[SyntaxKind::TILDE, SyntaxKind::CONJUGATES_KW],
        ),
        SyntaxKind::DISJOINT_KW => (SyntaxKind::DISJOINING, &[SyntaxKind::FROM_KW]),
        SyntaxKind::INVERSE_KW => (SyntaxKind::INVERTING, &[SyntaxKind::OF_KW]),
        _ => {
            return Err(p.error_expected(
                ErrorCode::E0602,
                &[
                    "'subclassifier'".to_string(),
                    "'subset'".to_string(),
                    "'redefinition'".to_string(),
                ],
            ));
        }
    };
    if lead == SyntaxKind::SPECIALIZATION_KW
        && !matches!(
            kind,
            SyntaxKind::SPECIALIZATION
                | SyntaxKind::SUBSETTING
                | SyntaxKind::REDEFINITION
                | SyntaxKind::TYPING
        )
    {
        return Err(p.error_unexpected(ErrorCode::E0602));
    }
    p.bump();
    parse_relationship_sides(p, kind, operators)?;
    parse_body(p, ParseContext::NamespaceBody)?;
    p.finish_node();
    Ok(())
}

/// Reference Operator Reference, wrapped in a `kind` clause node.
fn parse_relationship_sides(
    p: &mut Parser<'_>,
    kind: SyntaxKind,
    operators: &[SyntaxKind],
) -> PResult {
    p.start_node(kind);
    clause_target(p)?;
    if !p.at_any(operators) {
        let expected: Vec<String> = operators.iter().map(|op| op.describe()).collect();
        return Err(p.error_expected(ErrorCode::E0602, &expected));
    }
    if p.at(SyntaxKind::TYPED_KW) {
        p.bump();
        p.expect(SyntaxKind::BY_KW)?;
    } else {
        p.bump();
    }
    clause_target(p)?;
    p.finish_node();
    Ok(())
}

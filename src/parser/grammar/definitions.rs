//! Declaration prefixes and type declarations: KerML classifiers and
//! SysML definitions.

use super::namespace::parse_prefix_metadata;
use super::*;

/// Modifier keywords that may precede a definition or usage.
const PREFIX_KEYWORDS: &[SyntaxKind] = &[
    SyntaxKind::ABSTRACT_KW,
    SyntaxKind::VARIATION_KW,
    SyntaxKind::VARIANT_KW,
    SyntaxKind::INDIVIDUAL_KW,
    SyntaxKind::CONSTANT_KW,
    SyntaxKind::DERIVED_KW,
    SyntaxKind::END_KW,
    SyntaxKind::COMPOSITE_KW,
    SyntaxKind::PORTION_KW,
    SyntaxKind::VAR_KW,
    SyntaxKind::REF_KW,
    SyntaxKind::IN_KW,
    SyntaxKind::OUT_KW,
    SyntaxKind::INOUT_KW,
    SyntaxKind::RETURN_KW,
];

/// Prefix = ('abstract' | 'variation' | 'variant' | 'individual' | 'readonly'
///     | 'constant' | 'derived' | 'end' | 'composite' | 'portion' | 'var'
///     | 'ref' | 'in' | 'out' | 'inout' | 'return' | 'then' | PrefixMetadata)*
///
/// `then` is a prefix only when no name follows; `then x;` is a succession.
/// Returns whether anything was consumed.
pub(super) fn parse_prefixes(p: &mut Parser<'_>) -> PResult<bool> {
    let start = p.position();
    loop {
        match p.current() {
            SyntaxKind::READONLY_KW => {
                p.warning(
                    ErrorCode::W0302,
                    "'readonly' is deprecated",
                    Some("use 'constant'"),
                );
                p.bump();
            }
            SyntaxKind::THEN_KW if !matches!(p.nth(1), SyntaxKind::IDENT | SyntaxKind::DOLLAR) => {
                p.bump();
            }
            SyntaxKind::HASH => parse_prefix_metadata(p)?,
            kind if PREFIX_KEYWORDS.contains(&kind) => p.bump(),
            _ => break,
        }
    }
    Ok(p.position() != start)
}

/// Whether a classifier or definition starts at the cursor.
pub(super) fn at_definition(p: &Parser<'_>) -> bool {
    if p.at_any(KERML_TYPE_KEYWORDS) {
        return true;
    }
    let kinds = (0..)
        .take_while(|&n| SYSML_KIND_KEYWORDS.contains(&p.nth(n)))
        .count();
    kinds > 0 && p.nth(kinds) == SyntaxKind::DEF_KW
}

/// Definition = Prefix* TypeKeyword+ 'def'? 'all'? Identification Clauses 'parallel'? Body
///
/// SysML definitions end their keywords with `def`; KerML classifiers use
/// their own keyword and may mark themselves sufficient with `all`.
pub(super) fn parse_definition(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::DEFINITION);

    let mut kinds = Vec::new();
    while p.at_any(KERML_TYPE_KEYWORDS) || p.at_any(SYSML_KIND_KEYWORDS) {
        kinds.push(p.current());
        p.bump();
    }
    p.eat(SyntaxKind::DEF_KW);
    p.eat(SyntaxKind::ALL_KW);

    parse_identification(p)?;
    parse_clauses(p, ClauseOwner::Type)?;
    p.eat(SyntaxKind::PARALLEL_KW);
    parse_body(p, context_for_kind(&kinds))?;

    p.finish_node();
    Ok(())
}

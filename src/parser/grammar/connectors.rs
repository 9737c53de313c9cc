//! Connector parts: connections, bindings, successions, flows, messages
//! and allocations, plus the `then`/`else`/`first` succession shorthands.

use super::*;

const CONNECTOR_KINDS: &[SyntaxKind] = &[
    SyntaxKind::CONNECTOR_KW,
    SyntaxKind::CONNECTION_KW,
    SyntaxKind::INTERFACE_KW,
    SyntaxKind::ALLOCATION_KW,
    SyntaxKind::BINDING_KW,
    SyntaxKind::SUCCESSION_KW,
    SyntaxKind::FLOW_KW,
    SyntaxKind::MESSAGE_KW,
];

fn is_connector_kind(kinds: &[SyntaxKind]) -> bool {
    kinds.iter().any(|kind| CONNECTOR_KINDS.contains(kind))
}

/// Whether a connector usage starts directly with its ends, with no
/// declaration in front (`binding x = y`, `succession a then b`).
///
/// Scans the current statement for the keyword that ends a declaration.
pub(super) fn takes_bare_ends(p: &Parser<'_>, kinds: &[SyntaxKind]) -> bool {
    if !is_connector_kind(kinds) || !at_qualified_name(p) {
        return false;
    }
    let mut depth = 0usize;
    for n in 0.. {
        match p.nth(n) {
            SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET => {
                if depth == 0 && p.nth(n) == SyntaxKind::L_PAREN {
                    return false;
                }
                depth += 1;
            }
            SyntaxKind::R_PAREN | SyntaxKind::R_BRACKET => depth = depth.saturating_sub(1),
            SyntaxKind::FROM_KW
            | SyntaxKind::FIRST_KW
            | SyntaxKind::CONNECT_KW
            | SyntaxKind::BIND_KW
            | SyntaxKind::ALLOCATE_KW
            | SyntaxKind::OF_KW
                if depth == 0 =>
            {
                return false;
            }
            SyntaxKind::TO_KW | SyntaxKind::THEN_KW | SyntaxKind::EQ if depth == 0 => return true,
            SyntaxKind::SEMICOLON | SyntaxKind::L_BRACE | SyntaxKind::EOF => return false,
            _ => {}
        }
    }
    false
}

/// Whether a connector part follows the usage declaration.
pub(super) fn at_connector_part(p: &Parser<'_>, kinds: &[SyntaxKind]) -> bool {
    match p.current() {
        SyntaxKind::CONNECT_KW
        | SyntaxKind::BIND_KW
        | SyntaxKind::ALLOCATE_KW
        | SyntaxKind::FIRST_KW => true,
        SyntaxKind::FROM_KW | SyntaxKind::OF_KW | SyntaxKind::L_PAREN | SyntaxKind::TO_KW => {
            is_connector_kind(kinds)
        }
        _ => false,
    }
}

/// ConnectorPart =
///     'connect' Ends | 'bind' End '=' End | 'allocate' Ends
///   | 'first' End ('then' End)? | 'from' End 'to' End
///   | 'of' (End '=' End | FlowPayload ('from' End)? 'to' End)
///   | '(' End (',' End)* ')' | End ('to' | 'then' | '=') End
/// Ends = '(' End (',' End)* ')' | End 'to' End
pub(super) fn parse_connector_part(p: &mut Parser<'_>, kinds: &[SyntaxKind]) -> PResult {
    p.start_node(SyntaxKind::CONNECTOR_PART);
    match p.current() {
        SyntaxKind::CONNECT_KW | SyntaxKind::ALLOCATE_KW => {
            p.bump();
            parse_ends(p)?;
        }
        SyntaxKind::BIND_KW => {
            p.bump();
            parse_connector_end(p)?;
            p.expect(SyntaxKind::EQ)?;
            parse_connector_end(p)?;
        }
        SyntaxKind::FIRST_KW => {
            p.bump();
            parse_connector_end(p)?;
            if p.eat(SyntaxKind::THEN_KW) {
                parse_connector_end(p)?;
            }
        }
        SyntaxKind::FROM_KW => {
            p.bump();
            parse_connector_end(p)?;
            p.expect(SyntaxKind::TO_KW)?;
            parse_connector_end(p)?;
        }
        SyntaxKind::OF_KW if kinds.contains(&SyntaxKind::BINDING_KW) => {
            p.bump();
            parse_connector_end(p)?;
            p.expect(SyntaxKind::EQ)?;
            parse_connector_end(p)?;
        }
        SyntaxKind::OF_KW => {
            p.bump();
            parse_flow_payload(p)?;
            if p.eat(SyntaxKind::FROM_KW) {
                parse_connector_end(p)?;
            }
            if p.eat(SyntaxKind::TO_KW) {
                parse_connector_end(p)?;
            }
        }
        SyntaxKind::L_PAREN => parse_end_list(p)?,
        SyntaxKind::TO_KW => {
            p.bump();
            parse_connector_end(p)?;
        }
        _ => {
            parse_connector_end(p)?;
            if !p.at_any(&[SyntaxKind::TO_KW, SyntaxKind::THEN_KW, SyntaxKind::EQ]) {
                return Err(p.error_expected(
                    ErrorCode::E0602,
                    &["'to'".to_string(), "'then'".to_string(), "'='".to_string()],
                ));
            }
            p.bump();
            parse_connector_end(p)?;
        }
    }
    p.finish_node();
    Ok(())
}

fn parse_ends(p: &mut Parser<'_>) -> PResult {
    if p.at(SyntaxKind::L_PAREN) {
        return parse_end_list(p);
    }
    parse_connector_end(p)?;
    p.expect(SyntaxKind::TO_KW)?;
    parse_connector_end(p)
}

/// '(' End (',' End)* ')'
fn parse_end_list(p: &mut Parser<'_>) -> PResult {
    p.bump();
    parse_connector_end(p)?;
    while p.eat(SyntaxKind::COMMA) {
        parse_connector_end(p)?;
    }
    p.expect(SyntaxKind::R_PAREN)
}

/// ConnectorEnd = Multiplicity? (Name ('::>' | 'references'))? Reference Multiplicity?
fn parse_connector_end(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::CONNECTOR_END);
    if p.at(SyntaxKind::L_BRACKET) {
        parse_multiplicity(p)?;
    }
    if p.at(SyntaxKind::IDENT)
        && matches!(p.nth(1), SyntaxKind::COLON_COLON_GT | SyntaxKind::REFERENCES_KW)
    {
        p.start_node(SyntaxKind::NAME);
        p.bump();
        p.finish_node();
        p.bump();
    }
    if !at_qualified_name(p) {
        return Err(p.error_expected(ErrorCode::E0602, &["connector end".to_string()]));
    }
    parse_reference(p)?;
    if p.at(SyntaxKind::L_BRACKET) {
        parse_multiplicity(p)?;
    }
    p.finish_node();
    Ok(())
}

/// FlowPayload = (Name ':')? QualifiedName Multiplicity?
fn parse_flow_payload(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::FLOW_PAYLOAD);
    if p.at(SyntaxKind::IDENT) && p.nth(1) == SyntaxKind::COLON {
        p.start_node(SyntaxKind::NAME);
        p.bump();
        p.finish_node();
        p.bump();
    }
    if !at_qualified_name(p) {
        return Err(p.error_expected(ErrorCode::E0305, &["payload type".to_string()]));
    }
    p.start_node(SyntaxKind::TYPING);
    parse_reference(p)?;
    p.finish_node();
    if p.at(SyntaxKind::L_BRACKET) {
        parse_multiplicity(p)?;
    }
    p.finish_node();
    Ok(())
}

/// `connect a to b;`, `bind x = y;`, `allocate f to c;`, `first a then b;`
pub(super) fn parse_connector_shorthand(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::USAGE);
    parse_connector_part(p, &[])?;
    parse_body(p, ParseContext::TypeBody)?;
    p.finish_node();
    Ok(())
}

/// Succession shorthand: ('then' | 'else') Reference Body
pub(super) fn parse_succession_shorthand(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::USAGE);
    p.bump();
    parse_succession_target(p)?;
    parse_body(p, ParseContext::ActionBody)?;
    p.finish_node();
    Ok(())
}

/// SUCCESSION_TARGET = Reference
pub(super) fn parse_succession_target(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::SUCCESSION_TARGET);
    if !at_qualified_name(p) {
        return Err(p.error_expected(ErrorCode::E0703, &["succession target".to_string()]));
    }
    parse_reference(p)?;
    p.finish_node();
    Ok(())
}

//! Action and state nodes: accept, send, assign, if, loops, terminate,
//! transitions and state entry/do/exit actions.

use super::requirements::parse_performed_tail;
use super::usages::{at_usage_keyword, parse_kind_keywords};
use super::*;

const BEHAVIOR_KEYWORDS: &[SyntaxKind] = &[
    SyntaxKind::ACCEPT_KW,
    SyntaxKind::SEND_KW,
    SyntaxKind::ASSIGN_KW,
    SyntaxKind::IF_KW,
    SyntaxKind::WHILE_KW,
    SyntaxKind::LOOP_KW,
    SyntaxKind::FOR_KW,
    SyntaxKind::TERMINATE_KW,
    SyntaxKind::TRANSITION_KW,
    SyntaxKind::ENTRY_KW,
    SyntaxKind::DO_KW,
    SyntaxKind::EXIT_KW,
];

/// Whether an action or state node starts here.
///
/// In bodies that take a result expression, a leading `if` is a
/// conditional expression rather than an if action.
pub(super) fn at_behavior_usage(p: &Parser<'_>) -> bool {
    match p.current() {
        SyntaxKind::IF_KW => !p.context().allows_result_expression(),
        kind => BEHAVIOR_KEYWORDS.contains(&kind),
    }
}

pub(super) fn parse_behavior_usage(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::USAGE);
    match p.current() {
        SyntaxKind::ACCEPT_KW => {
            p.bump();
            parse_accept_part(p)?;
            parse_transition_tail(p)?;
            parse_body(p, ParseContext::ActionBody)?;
        }
        SyntaxKind::SEND_KW => {
            p.bump();
            parse_send_part(p)?;
            parse_body(p, ParseContext::ActionBody)?;
        }
        SyntaxKind::ASSIGN_KW => {
            p.bump();
            parse_assign_part(p)?;
            parse_body(p, ParseContext::ActionBody)?;
        }
        SyntaxKind::IF_KW => parse_if(p)?,
        SyntaxKind::WHILE_KW | SyntaxKind::LOOP_KW => parse_loop(p)?,
        SyntaxKind::FOR_KW => parse_for(p)?,
        SyntaxKind::TERMINATE_KW => {
            p.bump();
            if can_start_expression(p.current()) && !p.at(SyntaxKind::L_BRACE) {
                parse_expression(p)?;
            }
            parse_body(p, ParseContext::ActionBody)?;
        }
        SyntaxKind::TRANSITION_KW => parse_transition(p)?,
        _ => parse_state_action(p)?,
    }
    p.finish_node();
    Ok(())
}

/// AcceptPart = (Trigger | Payload) ('via' OwnedExpression)?
/// Trigger = ('at' | 'after' | 'when') OwnedExpression
/// Payload = Name Clauses | QualifiedName Multiplicity?
fn parse_accept_part(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::ACCEPT_PART);
    match p.current() {
        SyntaxKind::AT_KW | SyntaxKind::AFTER_KW | SyntaxKind::WHEN_KW => {
            p.start_node(SyntaxKind::TRIGGER);
            p.bump();
            parse_expression(p)?;
            p.finish_node();
        }
        _ => {
            p.start_node(SyntaxKind::PAYLOAD);
            if p.at(SyntaxKind::IDENT) && p.nth(1) == SyntaxKind::COLON {
                parse_identification(p)?;
                parse_clauses(p, ClauseOwner::Feature)?;
            } else if at_qualified_name(p) {
                p.start_node(SyntaxKind::TYPING);
                parse_reference(p)?;
                p.finish_node();
                if p.at(SyntaxKind::L_BRACKET) {
                    parse_multiplicity(p)?;
                }
            } else {
                return Err(p.error_expected(
                    ErrorCode::E0703,
                    &["payload".to_string(), "'at'".to_string(), "'when'".to_string()],
                ));
            }
            p.finish_node();
        }
    }
    if p.at(SyntaxKind::VIA_KW) {
        p.start_node(SyntaxKind::VIA_CLAUSE);
        p.bump();
        parse_expression(p)?;
        p.finish_node();
    }
    p.finish_node();
    Ok(())
}

/// SendPart = OwnedExpression? ('via' OwnedExpression)? ('to' OwnedExpression)?
fn parse_send_part(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::SEND_PART);
    if can_start_expression(p.current()) && !p.at(SyntaxKind::L_BRACE) {
        parse_expression(p)?;
    }
    if p.at(SyntaxKind::VIA_KW) {
        p.start_node(SyntaxKind::VIA_CLAUSE);
        p.bump();
        parse_expression(p)?;
        p.finish_node();
    }
    if p.at(SyntaxKind::TO_KW) {
        p.start_node(SyntaxKind::TO_CLAUSE);
        p.bump();
        parse_expression(p)?;
        p.finish_node();
    }
    p.finish_node();
    Ok(())
}

/// AssignPart = Reference ':=' OwnedExpression
fn parse_assign_part(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::ASSIGN_PART);
    parse_reference(p)?;
    p.expect(SyntaxKind::COLON_EQ)?;
    parse_expression(p)?;
    p.finish_node();
    Ok(())
}

/// If = 'if' Condition ('then' Reference Body | ActionBody ElseBranch?)
/// ElseBranch = 'else' (If | ActionBody)
fn parse_if(p: &mut Parser<'_>) -> PResult {
    p.bump();
    parse_condition(p)?;
    if p.eat(SyntaxKind::THEN_KW) {
        connectors::parse_succession_target(p)?;
        return parse_body(p, ParseContext::ActionBody);
    }
    parse_braced_body(p, ParseContext::ActionBody)?;
    if p.at(SyntaxKind::ELSE_KW) {
        p.start_node(SyntaxKind::ELSE_BRANCH);
        p.bump();
        if p.at(SyntaxKind::IF_KW) {
            p.nested(|p| {
                p.start_node(SyntaxKind::USAGE);
                parse_if(p)?;
                p.finish_node();
                Ok(())
            })?;
        } else {
            parse_braced_body(p, ParseContext::ActionBody)?;
        }
        p.finish_node();
    }
    Ok(())
}

fn parse_condition(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::CONDITION);
    if !can_start_expression(p.current()) {
        return Err(p.error_expected(ErrorCode::E0406, &["condition".to_string()]));
    }
    parse_expression(p)?;
    p.finish_node();
    Ok(())
}

/// Loop = ('while' Condition | 'loop') ActionBody ('until' OwnedExpression ';')?
fn parse_loop(p: &mut Parser<'_>) -> PResult {
    if p.at(SyntaxKind::WHILE_KW) {
        p.bump();
        parse_condition(p)?;
    } else {
        p.bump();
    }
    parse_braced_body(p, ParseContext::ActionBody)?;
    if p.at(SyntaxKind::UNTIL_KW) {
        p.start_node(SyntaxKind::UNTIL_CLAUSE);
        p.bump();
        parse_expression(p)?;
        p.finish_node();
        p.expect(SyntaxKind::SEMICOLON)?;
    }
    Ok(())
}

/// For = 'for' Name Clauses 'in' Condition ActionBody
fn parse_for(p: &mut Parser<'_>) -> PResult {
    p.bump();
    p.start_node(SyntaxKind::FOR_VARIABLE);
    if !at_identification(p) {
        return Err(p.error_expected(ErrorCode::E0301, &["loop variable".to_string()]));
    }
    parse_identification(p)?;
    parse_clauses(p, ClauseOwner::Feature)?;
    p.finish_node();
    p.expect(SyntaxKind::IN_KW)?;
    parse_condition(p)?;
    parse_braced_body(p, ParseContext::ActionBody)
}

/// Transition = 'transition' (Identification? 'first')? Reference AcceptPart?
///     TransitionTail Body
///
/// The target (`then`) is required.
fn parse_transition(p: &mut Parser<'_>) -> PResult {
    p.bump();
    if at_identification(p) && !p.at(SyntaxKind::FIRST_KW) && named_transition(p) {
        parse_identification(p)?;
    }
    if p.at(SyntaxKind::FIRST_KW) || at_qualified_name(p) {
        p.start_node(SyntaxKind::TRANSITION_SOURCE);
        p.eat(SyntaxKind::FIRST_KW);
        parse_reference(p)?;
        p.finish_node();
    }
    if p.eat(SyntaxKind::ACCEPT_KW) {
        parse_accept_part(p)?;
    }
    if !parse_transition_tail(p)? {
        return Err(p.error_expected(ErrorCode::E0703, &["'then'".to_string()]));
    }
    parse_body(p, ParseContext::StateBody)
}

/// `transition t first s ...` names the transition; `transition s then t` does not.
fn named_transition(p: &Parser<'_>) -> bool {
    let after_name = if p.at(SyntaxKind::LT) { 3 } else { 0 };
    let next = if p.nth(after_name) == SyntaxKind::IDENT {
        p.nth(after_name + 1)
    } else {
        p.nth(after_name)
    };
    next == SyntaxKind::FIRST_KW
}

/// TransitionTail = ('if' OwnedExpression)? ('do' Effect)? ('then' Reference)?
///
/// Returns whether a target was parsed.
fn parse_transition_tail(p: &mut Parser<'_>) -> PResult<bool> {
    if p.at(SyntaxKind::IF_KW) {
        p.start_node(SyntaxKind::GUARD);
        p.bump();
        parse_expression(p)?;
        p.finish_node();
    }
    if p.at(SyntaxKind::DO_KW) {
        parse_effect(p)?;
    }
    if p.eat(SyntaxKind::THEN_KW) {
        connectors::parse_succession_target(p)?;
        return Ok(true);
    }
    Ok(false)
}

/// Effect = 'do' (SendNode | AssignNode | UsageKeyword+ Identification Clauses ActionBody? | Reference)
fn parse_effect(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::EFFECT);
    p.bump();
    match p.current() {
        SyntaxKind::SEND_KW => {
            p.start_node(SyntaxKind::USAGE);
            p.bump();
            parse_send_part(p)?;
            p.finish_node();
        }
        SyntaxKind::ASSIGN_KW => {
            p.start_node(SyntaxKind::USAGE);
            p.bump();
            parse_assign_part(p)?;
            p.finish_node();
        }
        _ if at_usage_keyword(p) => {
            p.start_node(SyntaxKind::USAGE);
            let kinds = parse_kind_keywords(p);
            parse_identification(p)?;
            parse_clauses(p, ClauseOwner::Feature)?;
            if p.at(SyntaxKind::L_BRACE) {
                parse_braced_body(p, context_for_kind(&kinds))?;
            }
            p.finish_node();
        }
        _ => {
            if !at_qualified_name(p) {
                return Err(p.error_expected(ErrorCode::E0703, &["effect action".to_string()]));
            }
            parse_reference(p)?;
        }
    }
    p.finish_node();
    Ok(())
}

/// StateAction = ('entry' | 'do' | 'exit') (';' | SendNode | AssignNode
///     | AcceptNode | PerformedTail)
fn parse_state_action(p: &mut Parser<'_>) -> PResult {
    p.bump();
    match p.current() {
        SyntaxKind::SEMICOLON => {
            p.bump();
            Ok(())
        }
        SyntaxKind::SEND_KW => {
            p.bump();
            parse_send_part(p)?;
            parse_body(p, ParseContext::ActionBody)
        }
        SyntaxKind::ASSIGN_KW => {
            p.bump();
            parse_assign_part(p)?;
            parse_body(p, ParseContext::ActionBody)
        }
        SyntaxKind::ACCEPT_KW => {
            p.bump();
            parse_accept_part(p)?;
            parse_body(p, ParseContext::ActionBody)
        }
        _ => {
            let kinds = parse_performed_tail(p)?;
            let context = if kinds.is_empty() {
                ParseContext::ActionBody
            } else {
                context_for_kind(&kinds)
            };
            parse_body(p, context)
        }
    }
}

use super::*;

/// PrimaryExpression = BaseExpression PostfixOperation*
///
/// PostfixOperation =
///     '.' QualifiedName            (feature chain)
///     | '.' 'metadata'             (metadata access, on names only)
///     | '.' '{' Body '}'           (collect)
///     | '.?' '{' Body '}'          (select)
///     | '->' QualifiedName (ArgumentList | '{' Body '}' | QualifiedName)
///     | '#' '(' OwnedExpression ')'
///     | '[' OwnedExpression ']'
///     | ArgumentList               (invocation, directly on a name)
pub(super) fn parse_primary_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    let mut wrapped = 0;
    let result = parse_postfix_operations(p, &mut wrapped);
    p.leave_nesting(wrapped);
    result
}

/// Each postfix operation wraps the node before it, one level per wrap.
fn parse_postfix_operations<P: ExpressionParser>(p: &mut P, wrapped: &mut u32) -> PResult {
    let cp = p.checkpoint();
    let mut on_name = parse_base_expression(p)?;

    loop {
        if !starts_postfix(p, on_name) {
            break;
        }
        p.enter_nesting()?;
        *wrapped += 1;
        match p.current() {
            SyntaxKind::DOT => match p.nth(1) {
                SyntaxKind::L_BRACE => {
                    p.start_node_at(cp, SyntaxKind::COLLECT_EXPR);
                    p.bump();
                    p.parse_expression_body()?;
                    p.finish_node();
                }
                SyntaxKind::METADATA_KW if on_name => {
                    p.start_node_at(cp, SyntaxKind::METADATA_ACCESS_EXPR);
                    p.bump();
                    p.bump();
                    p.finish_node();
                }
                SyntaxKind::IDENT | SyntaxKind::DOLLAR => {
                    p.start_node_at(cp, SyntaxKind::FEATURE_CHAIN_EXPR);
                    p.bump();
                    p.parse_qualified_name()?;
                    p.finish_node();
                }
                _ => {
                    p.bump();
                    return Err(p.error_expected(
                        ErrorCode::E0902,
                        &["feature name".to_string(), "'{'".to_string()],
                    ));
                }
            },
            SyntaxKind::DOT_QUESTION => {
                p.start_node_at(cp, SyntaxKind::SELECT_EXPR);
                p.bump();
                if !p.at(SyntaxKind::L_BRACE) {
                    return Err(p.error_expected(ErrorCode::E0902, &["'{'".to_string()]));
                }
                p.parse_expression_body()?;
                p.finish_node();
            }
            SyntaxKind::ARROW => {
                p.start_node_at(cp, SyntaxKind::ARROW_EXPR);
                p.bump();
                p.parse_qualified_name()?;
                parse_arrow_argument(p)?;
                p.finish_node();
            }
            SyntaxKind::HASH if p.nth(1) == SyntaxKind::L_PAREN => {
                p.start_node_at(cp, SyntaxKind::INDEX_EXPR);
                p.bump();
                p.bump();
                parse_expression(p)?;
                p.expect(SyntaxKind::R_PAREN)?;
                p.finish_node();
            }
            SyntaxKind::L_BRACKET => {
                p.start_node_at(cp, SyntaxKind::BRACKET_EXPR);
                p.bump();
                parse_expression(p)?;
                p.expect(SyntaxKind::R_BRACKET)?;
                p.finish_node();
            }
            SyntaxKind::L_PAREN if on_name => {
                p.start_node_at(cp, SyntaxKind::INVOCATION_EXPR);
                parse_argument_list(p)?;
                p.finish_node();
            }
            _ => break,
        }
        on_name = false;
    }
    Ok(())
}

fn starts_postfix<P: ExpressionParser>(p: &P, on_name: bool) -> bool {
    match p.current() {
        SyntaxKind::DOT | SyntaxKind::DOT_QUESTION | SyntaxKind::ARROW | SyntaxKind::L_BRACKET => {
            true
        }
        SyntaxKind::HASH => p.nth(1) == SyntaxKind::L_PAREN,
        SyntaxKind::L_PAREN => on_name,
        _ => false,
    }
}

/// The operand after `->f`: arguments, a body, or a function reference.
fn parse_arrow_argument<P: ExpressionParser>(p: &mut P) -> PResult {
    match p.current() {
        SyntaxKind::L_PAREN => parse_argument_list(p),
        SyntaxKind::L_BRACE => {
            p.start_node(SyntaxKind::BODY_EXPR);
            p.parse_expression_body()?;
            p.finish_node();
            Ok(())
        }
        SyntaxKind::IDENT | SyntaxKind::DOLLAR => {
            p.start_node(SyntaxKind::NAME_EXPR);
            p.parse_qualified_name()?;
            p.finish_node();
            Ok(())
        }
        _ => Err(p.error_expected(
            ErrorCode::E0902,
            &[
                "'('".to_string(),
                "'{'".to_string(),
                "function name".to_string(),
            ],
        )),
    }
}

/// BaseExpression =
///     LiteralExpression | NullExpression | FeatureReference
///     | '(' SequenceExpression ')' | 'new' QualifiedName ArgumentList
///     | '{' Body '}'
///
/// Returns whether the base was a plain name (invocable).
fn parse_base_expression<P: ExpressionParser>(p: &mut P) -> PResult<bool> {
    match p.current() {
        SyntaxKind::INTEGER => {
            check_integer(p)?;
            parse_literal(p);
            Ok(false)
        }
        SyntaxKind::REAL => {
            check_real(p)?;
            parse_literal(p);
            Ok(false)
        }
        SyntaxKind::STRING | SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW | SyntaxKind::STAR => {
            parse_literal(p);
            Ok(false)
        }
        SyntaxKind::NULL_KW => {
            p.start_node(SyntaxKind::NULL_EXPR);
            p.bump();
            p.finish_node();
            Ok(false)
        }
        SyntaxKind::L_PAREN if p.nth(1) == SyntaxKind::R_PAREN => {
            p.start_node(SyntaxKind::NULL_EXPR);
            p.bump();
            p.bump();
            p.finish_node();
            Ok(false)
        }
        SyntaxKind::L_PAREN => {
            parse_sequence_or_paren(p)?;
            Ok(false)
        }
        SyntaxKind::NEW_KW => {
            p.start_node(SyntaxKind::INSTANTIATION_EXPR);
            p.bump();
            p.parse_qualified_name()?;
            if !p.at(SyntaxKind::L_PAREN) {
                return Err(p.error_expected(ErrorCode::E0902, &["'('".to_string()]));
            }
            parse_argument_list(p)?;
            p.finish_node();
            Ok(false)
        }
        SyntaxKind::L_BRACE => {
            p.start_node(SyntaxKind::BODY_EXPR);
            p.parse_expression_body()?;
            p.finish_node();
            Ok(false)
        }
        SyntaxKind::IDENT | SyntaxKind::DOLLAR => {
            p.start_node(SyntaxKind::NAME_EXPR);
            p.parse_qualified_name()?;
            p.finish_node();
            Ok(true)
        }
        _ => Err(p.error_expected(ErrorCode::E0406, &["expression".to_string()])),
    }
}

fn parse_literal<P: ExpressionParser>(p: &mut P) {
    p.start_node(SyntaxKind::LITERAL_EXPR);
    p.bump();
    p.finish_node();
}

/// Integer literals must fit in 64 bits.
fn check_integer<P: ExpressionParser>(p: &mut P) -> PResult {
    if p.current_text().parse::<u64>().is_err() {
        let message = format!("integer literal {} does not fit in 64 bits", p.current_text());
        return Err(p.error(ErrorCode::E0104, message));
    }
    Ok(())
}

/// Real literals must be finite doubles.
fn check_real<P: ExpressionParser>(p: &mut P) -> PResult {
    let finite = p
        .current_text()
        .parse::<f64>()
        .is_ok_and(|value| value.is_finite());
    if !finite {
        let message = format!("real literal {} is not a finite number", p.current_text());
        return Err(p.error(ErrorCode::E0104, message));
    }
    Ok(())
}

/// '(' OwnedExpression ')' or '(' OwnedExpression (',' OwnedExpression)* ','? ')'
///
/// A trailing comma makes a one-element sequence.
fn parse_sequence_or_paren<P: ExpressionParser>(p: &mut P) -> PResult {
    let cp = p.checkpoint();
    p.bump(); // (
    parse_expression(p)?;
    let mut sequence = false;
    while p.at(SyntaxKind::COMMA) {
        sequence = true;
        p.bump();
        if p.at(SyntaxKind::R_PAREN) {
            break;
        }
        parse_expression(p)?;
    }
    p.expect(SyntaxKind::R_PAREN)?;
    let kind = if sequence {
        SyntaxKind::SEQUENCE_EXPR
    } else {
        SyntaxKind::PAREN_EXPR
    };
    p.start_node_at(cp, kind);
    p.finish_node();
    Ok(())
}

/// ArgumentList = '(' (Argument (',' Argument)*)? ')'
/// Argument = (Name '=')? OwnedExpression
///
/// Arguments are either all positional or all named.
fn parse_argument_list<P: ExpressionParser>(p: &mut P) -> PResult {
    p.start_node(SyntaxKind::ARGUMENT_LIST);
    p.expect(SyntaxKind::L_PAREN)?;
    let mut named: Option<bool> = None;
    if !p.at(SyntaxKind::R_PAREN) {
        loop {
            let is_named = p.at(SyntaxKind::IDENT) && p.nth(1) == SyntaxKind::EQ;
            if named.is_some_and(|named| named != is_named) {
                return Err(p.error(
                    ErrorCode::E0405,
                    "cannot mix named and positional arguments".to_string(),
                ));
            }
            named = Some(is_named);

            p.start_node(SyntaxKind::ARGUMENT);
            if is_named {
                p.bump();
                p.bump();
            }
            parse_expression(p)?;
            p.finish_node();

            if !p.at(SyntaxKind::COMMA) {
                break;
            }
            p.bump();
        }
    }
    if !p.at(SyntaxKind::R_PAREN) {
        let found = p.current().describe();
        return Err(p.error(
            ErrorCode::E0404,
            format!("unclosed argument list, expected ')' found {found}"),
        ));
    }
    p.bump();
    p.finish_node();
    Ok(())
}

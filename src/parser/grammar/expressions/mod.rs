//! Expression parsing for KerML and SysML
//!
//! This module implements the expression precedence chain, loosest first:
//!
//! ```text
//! OwnedExpression → ConditionalExpression → NullCoalescingExpression
//!     → ImpliesExpression → OrExpression → XorExpression → AndExpression
//!     → EqualityExpression → ClassificationExpression → RelationalExpression
//!     → RangeExpression → AdditiveExpression → MultiplicativeExpression
//!     → ExponentiationExpression → UnaryExpression → ExtentExpression
//!     → PrimaryExpression
//! ```
//!
//! Binary levels are loops that wrap the left operand at a checkpoint, so
//! chains are left-associative without recursion. Conditional and
//! exponentiation are right-associative and recurse through
//! [`ExpressionParser::nested_expr`], which enforces the depth limit. Prefix
//! operators and postfix operations are loops, but every node they open
//! still counts as one level.

mod primary;

pub(super) use super::{Checkpoint, ErrorCode, PResult, SyntaxKind};
use crate::parser::parser::Abort;

use self::primary::parse_primary_expression;

/// Operations the expression grammar needs from the parser
///
/// The main parser implements this; the expression functions are generic
/// over it so they do not depend on member parsing.
pub trait ExpressionParser {
    // Token inspection
    fn current(&self) -> SyntaxKind;
    fn nth(&self, n: usize) -> SyntaxKind;
    fn current_text(&self) -> &str;
    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }
    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    // Token consumption
    fn bump(&mut self);
    fn expect(&mut self, kind: SyntaxKind) -> PResult;

    // Node building
    fn start_node(&mut self, kind: SyntaxKind);
    fn finish_node(&mut self);
    fn checkpoint(&mut self) -> Checkpoint;
    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind);

    // Errors and limits
    fn error(&mut self, code: ErrorCode, message: String) -> Abort;
    fn error_expected(&mut self, code: ErrorCode, expected: &[String]) -> Abort;
    fn nested_expr(&mut self, f: fn(&mut Self) -> PResult) -> PResult;
    /// One level deeper without recursing; undone by `leave_nesting`.
    fn enter_nesting(&mut self) -> PResult;
    fn leave_nesting(&mut self, levels: u32);

    // Shared grammar pieces
    fn parse_qualified_name(&mut self) -> PResult;
    /// '{' Member* '}' as the body of an anonymous expression
    fn parse_expression_body(&mut self) -> PResult;
}

/// Kinds that can begin an expression.
pub fn can_start_expression(kind: SyntaxKind) -> bool {
    use SyntaxKind::*;
    matches!(
        kind,
        INTEGER
            | REAL
            | STRING
            | TRUE_KW
            | FALSE_KW
            | STAR
            | NULL_KW
            | L_PAREN
            | NEW_KW
            | L_BRACE
            | DOLLAR
            | IDENT
            | IF_KW
            | PLUS
            | MINUS
            | TILDE
            | NOT_KW
            | ALL_KW
            | ISTYPE_KW
            | HASTYPE_KW
            | AT
    )
}

/// OwnedExpression = ConditionalExpression
///
/// Entry point for all expressions; each call is one nesting level.
pub fn parse_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    p.nested_expr(parse_conditional_expression)
}

/// ConditionalExpression =
///     'if' NullCoalescingExpression '?' OwnedExpression 'else' OwnedExpression
///     | NullCoalescingExpression
pub fn parse_conditional_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    if !p.at(SyntaxKind::IF_KW) {
        return parse_null_coalescing_expression(p);
    }
    p.start_node(SyntaxKind::CONDITIONAL_EXPR);
    p.bump(); // if
    parse_operand(p, "'if'", parse_null_coalescing_expression)?;
    p.expect(SyntaxKind::QUESTION)?;
    parse_expression(p)?;
    p.expect(SyntaxKind::ELSE_KW)?;
    parse_expression(p)?;
    p.finish_node();
    Ok(())
}

/// Parse an operand, reporting a missing one against the operator.
fn parse_operand<P: ExpressionParser>(
    p: &mut P,
    operator: &str,
    next: fn(&mut P) -> PResult,
) -> PResult {
    if !can_start_expression(p.current()) {
        let found = p.current().describe();
        return Err(p.error(
            ErrorCode::E0402,
            format!("missing operand after {operator}, found {found}"),
        ));
    }
    next(p)
}

/// Left-associative binary level: Next (Op Next)*
fn parse_binary_level<P: ExpressionParser>(
    p: &mut P,
    operators: &[SyntaxKind],
    next: fn(&mut P) -> PResult,
) -> PResult {
    let cp = p.checkpoint();
    next(p)?;
    while p.at_any(operators) {
        let operator = p.current().describe();
        p.start_node_at(cp, SyntaxKind::BINARY_EXPR);
        p.bump();
        parse_operand(p, &operator, next)?;
        p.finish_node();
    }
    Ok(())
}

/// NullCoalescingExpression = ImpliesExpression ('??' ImpliesExpression)*
pub fn parse_null_coalescing_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    parse_binary_level(p, &[SyntaxKind::QUESTION_QUESTION], parse_implies_expression)
}

/// ImpliesExpression = OrExpression ('implies' OrExpression)*
pub fn parse_implies_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    parse_binary_level(p, &[SyntaxKind::IMPLIES_KW], parse_or_expression)
}

/// OrExpression = XorExpression (('|' | 'or') XorExpression)*
pub fn parse_or_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    parse_binary_level(p, &[SyntaxKind::PIPE, SyntaxKind::OR_KW], parse_xor_expression)
}

/// XorExpression = AndExpression ('xor' AndExpression)*
pub fn parse_xor_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    parse_binary_level(p, &[SyntaxKind::XOR_KW], parse_and_expression)
}

/// AndExpression = EqualityExpression (('&' | 'and') EqualityExpression)*
pub fn parse_and_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    parse_binary_level(
        p,
        &[SyntaxKind::AMP, SyntaxKind::AND_KW],
        parse_equality_expression,
    )
}

/// EqualityExpression = ClassificationExpression (('==' | '!=' | '===' | '!==') ClassificationExpression)*
pub fn parse_equality_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    parse_binary_level(
        p,
        &[
            SyntaxKind::EQ_EQ,
            SyntaxKind::BANG_EQ,
            SyntaxKind::EQ_EQ_EQ,
            SyntaxKind::BANG_EQ_EQ,
        ],
        parse_classification_expression,
    )
}

const CLASSIFICATION_OPERATORS: &[SyntaxKind] = &[
    SyntaxKind::ISTYPE_KW,
    SyntaxKind::HASTYPE_KW,
    SyntaxKind::AT,
    SyntaxKind::AT_AT,
];

const CAST_OPERATORS: &[SyntaxKind] = &[SyntaxKind::AS_KW, SyntaxKind::META_KW];

/// ClassificationExpression =
///     RelationalExpression? (ClassificationOperator TypeReference)
///     | RelationalExpression (('as' | 'meta') TypeReference)*
///
/// The operand may be omitted for `istype`, `hastype` and `@`, which then
/// test the implicit `self`.
pub fn parse_classification_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    let cp = p.checkpoint();
    if p.at_any(&[SyntaxKind::ISTYPE_KW, SyntaxKind::HASTYPE_KW, SyntaxKind::AT]) {
        p.start_node(SyntaxKind::CLASSIFICATION_EXPR);
        p.bump();
        parse_type_reference(p)?;
        p.finish_node();
    } else {
        parse_relational_expression(p)?;
    }

    loop {
        let kind = if p.at_any(CLASSIFICATION_OPERATORS) {
            SyntaxKind::CLASSIFICATION_EXPR
        } else if p.at_any(CAST_OPERATORS) {
            SyntaxKind::CAST_EXPR
        } else {
            break;
        };
        p.start_node_at(cp, kind);
        p.bump();
        parse_type_reference(p)?;
        p.finish_node();
    }
    Ok(())
}

fn parse_type_reference<P: ExpressionParser>(p: &mut P) -> PResult {
    if !(p.at(SyntaxKind::IDENT) || p.at(SyntaxKind::DOLLAR)) {
        return Err(p.error_expected(ErrorCode::E0305, &["type name".to_string()]));
    }
    p.parse_qualified_name()
}

/// RelationalExpression = RangeExpression (('<' | '>' | '<=' | '>=') RangeExpression)*
pub fn parse_relational_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    parse_binary_level(
        p,
        &[
            SyntaxKind::LT,
            SyntaxKind::GT,
            SyntaxKind::LT_EQ,
            SyntaxKind::GT_EQ,
        ],
        parse_range_expression,
    )
}

/// RangeExpression = AdditiveExpression ('..' AdditiveExpression)?
pub fn parse_range_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    let cp = p.checkpoint();
    parse_additive_expression(p)?;
    if p.at(SyntaxKind::DOT_DOT) {
        p.start_node_at(cp, SyntaxKind::BINARY_EXPR);
        p.bump();
        parse_operand(p, "'..'", parse_additive_expression)?;
        p.finish_node();
    }
    Ok(())
}

/// AdditiveExpression = MultiplicativeExpression (('+' | '-') MultiplicativeExpression)*
///
/// Multiplicity bounds are parsed at this level so `..` separates them.
pub fn parse_additive_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    parse_binary_level(
        p,
        &[SyntaxKind::PLUS, SyntaxKind::MINUS],
        parse_multiplicative_expression,
    )
}

/// MultiplicativeExpression = ExponentiationExpression (('*' | '/' | '%') ExponentiationExpression)*
pub fn parse_multiplicative_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    parse_binary_level(
        p,
        &[SyntaxKind::STAR, SyntaxKind::SLASH, SyntaxKind::PERCENT],
        parse_exponentiation_expression,
    )
}

/// ExponentiationExpression = UnaryExpression (('**' | '^') ExponentiationExpression)?
pub fn parse_exponentiation_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    let cp = p.checkpoint();
    parse_unary_expression(p)?;
    if p.at_any(&[SyntaxKind::STAR_STAR, SyntaxKind::CARET]) {
        let operator = p.current().describe();
        p.start_node_at(cp, SyntaxKind::BINARY_EXPR);
        p.bump();
        if !can_start_expression(p.current()) {
            return Err(p.error(
                ErrorCode::E0402,
                format!("missing operand after {operator}"),
            ));
        }
        p.nested_expr(parse_exponentiation_expression)?;
        p.finish_node();
    }
    Ok(())
}

/// UnaryExpression = ('+' | '-' | '~' | 'not')* ExtentExpression
///
/// Prefix operators are consumed in a loop rather than by recursion.
pub fn parse_unary_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    let mut opened = 0;
    let result = parse_prefix_operators(p, &mut opened);
    p.leave_nesting(opened);
    result
}

fn parse_prefix_operators<P: ExpressionParser>(p: &mut P, opened: &mut u32) -> PResult {
    while p.at_any(&[
        SyntaxKind::PLUS,
        SyntaxKind::MINUS,
        SyntaxKind::TILDE,
        SyntaxKind::NOT_KW,
    ]) {
        p.enter_nesting()?;
        *opened += 1;
        p.start_node(SyntaxKind::UNARY_EXPR);
        p.bump();
    }
    if *opened > 0 && !can_start_expression(p.current()) {
        return Err(p.error_expected(ErrorCode::E0402, &["operand".to_string()]));
    }
    parse_extent_expression(p)?;
    for _ in 0..*opened {
        p.finish_node();
    }
    Ok(())
}

/// ExtentExpression = 'all' TypeReference | PrimaryExpression
pub fn parse_extent_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    if p.at(SyntaxKind::ALL_KW) {
        p.start_node(SyntaxKind::EXTENT_EXPR);
        p.bump();
        parse_type_reference(p)?;
        p.finish_node();
        return Ok(());
    }
    parse_primary_expression(p)
}

/// Expression at additive level, for multiplicity bounds.
pub fn parse_bound_expression<P: ExpressionParser>(p: &mut P) -> PResult {
    p.nested_expr(parse_additive_expression)
}

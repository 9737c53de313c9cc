//! Expression Tests - precedence, canonical printing and round trips
//!
//! Structure is checked through a prefix rendering of the lowered tree, so
//! each case states exactly which operator binds where.

use kerml::syntax::{Arguments, ArrowArg, ExprId, ExprKind, Literal, Model, unparse_expr};
use kerml::{ErrorCode, ExpressionResult, ParseOptions, parse_expression};
use rstest::rstest;

fn parse_ok(source: &str) -> ExpressionResult {
    let result = parse_expression(source, "expr.sysml", &ParseOptions::default());
    assert!(result.success, "{source}: {:?}", result.diagnostics);
    result
}

fn root(result: &ExpressionResult) -> ExprId {
    result.expr.expect("expression lowered")
}

/// Fully parenthesized prefix form of an operator tree.
fn prefix(model: &Model, id: ExprId) -> String {
    match &model.expr(id).kind {
        ExprKind::Literal(Literal::Integer(n)) => n.to_string(),
        ExprKind::Literal(Literal::Boolean(b)) => b.to_string(),
        ExprKind::Reference(reference) => reference.to_string(),
        ExprKind::Binary { op, lhs, rhs } => format!(
            "({} {} {})",
            op.as_str(),
            prefix(model, *lhs),
            prefix(model, *rhs)
        ),
        ExprKind::Unary { op, operand } => format!("({} {})", op.as_str(), prefix(model, *operand)),
        ExprKind::Conditional {
            condition,
            then_expr,
            else_expr,
        } => format!(
            "(if {} {} {})",
            prefix(model, *condition),
            prefix(model, *then_expr),
            prefix(model, *else_expr)
        ),
        ExprKind::Classification { op, operand, ty } => match operand {
            Some(operand) => format!("({} {} {ty})", op.as_str(), prefix(model, *operand)),
            None => format!("({} {ty})", op.as_str()),
        },
        ExprKind::Cast { op, operand, ty } => {
            format!("({} {} {ty})", op.as_str(), prefix(model, *operand))
        }
        ExprKind::Extent(ty) => format!("(all {ty})"),
        other => panic!("no prefix form for {other:?}"),
    }
}

// ============================================================================
// Precedence and associativity
// ============================================================================

#[rstest]
#[case("1 + 2 * 3", "(+ 1 (* 2 3))")]
#[case("1 - 2 - 3", "(- (- 1 2) 3)")]
#[case("(1 + 2) * 3", "(* (+ 1 2) 3)")]
#[case("2 ** 3 ** 2", "(** 2 (** 3 2))")]
#[case("-2 ** 2", "(** (- 2) 2)")]
#[case("a or b and c", "(or a (and b c))")]
#[case("a | b & c", "(| a (& b c))")]
#[case("a xor b or c", "(or (xor a b) c)")]
#[case("a implies b implies c", "(implies (implies a b) c)")]
#[case("a ?? b implies c", "(?? a (implies b c))")]
#[case("a == b < c", "(== a (< b c))")]
#[case("a < b == c < d", "(== (< a b) (< c d))")]
#[case("not a and b", "(and (not a) b)")]
#[case("x + 1 istype T", "(istype (+ x 1) T)")]
#[case("a istype T and b", "(and (istype a T) b)")]
#[case("x as T as U", "(as (as x T) U)")]
#[case("istype T", "(istype T)")]
#[case("1..n + 1", "(.. 1 (+ n 1))")]
#[case("if a ? b else c ?? d", "(if a b (?? c d))")]
#[case("all T", "(all T)")]
fn test_precedence(#[case] source: &str, #[case] expected: &str) {
    let result = parse_ok(source);
    assert_eq!(prefix(&result.model, root(&result)), expected);
}

// ============================================================================
// Primary expressions
// ============================================================================

#[test]
fn test_empty_parentheses_are_null() {
    let result = parse_ok("()");
    assert_eq!(result.model.expr(root(&result)).kind, ExprKind::Null);
}

#[test]
fn test_trailing_comma_makes_sequence() {
    let result = parse_ok("(a,)");
    let ExprKind::Sequence(items) = &result.model.expr(root(&result)).kind else {
        panic!("expected a sequence");
    };
    assert_eq!(items.len(), 1);

    let result = parse_ok("(a)");
    assert!(matches!(result.model.expr(root(&result)).kind, ExprKind::Reference(_)));
}

#[test]
fn test_named_arguments() {
    let result = parse_ok("f(x = 1, y = 2)");
    let ExprKind::Invocation { callee, args } = &result.model.expr(root(&result)).kind else {
        panic!("expected an invocation");
    };
    assert_eq!(callee.to_string(), "f");
    let Arguments::Named(args) = args else {
        panic!("expected named arguments");
    };
    let names: Vec<&str> = args.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["x", "y"]);
}

#[test]
fn test_mixed_arguments_are_rejected() {
    let result = parse_expression("f(1, y = 2)", "expr.sysml", &ParseOptions::default());
    assert!(!result.success);
    assert_eq!(result.diagnostics[0].code, ErrorCode::E0405);
}

#[test]
fn test_arrow_body_owns_parameters() {
    let result = parse_ok("items->select { in x; x > 0 }");
    let model = &result.model;
    let ExprKind::Arrow { function, arg, .. } = &model.expr(root(&result)).kind else {
        panic!("expected an arrow invocation");
    };
    assert_eq!(function.to_string(), "select");
    let ArrowArg::Body(body) = arg else {
        panic!("expected a body argument");
    };
    let body = model.element(*body);
    assert_eq!(body.owner, Some(model.root()));
    assert_eq!(body.owned_members().count(), 1);
    assert!(body.result.is_some());
}

#[test]
fn test_postfix_chain_is_left_nested() {
    let result = parse_ok("a.b#(1)[2]");
    let model = &result.model;
    let ExprKind::Bracket { base, .. } = &model.expr(root(&result)).kind else {
        panic!("expected a bracket");
    };
    let ExprKind::Index { base, .. } = &model.expr(*base).kind else {
        panic!("expected an index");
    };
    let ExprKind::FeatureChain { base, feature } = &model.expr(*base).kind else {
        panic!("expected a feature chain");
    };
    assert_eq!(feature.to_string(), "b");
    assert!(matches!(model.expr(*base).kind, ExprKind::Reference(_)));
}

#[rstest]
#[case("42", Literal::Integer(42))]
#[case("2.5", Literal::Real(2.5))]
#[case("true", Literal::Boolean(true))]
#[case("\"a\\\"b\"", Literal::String("a\"b".to_string()))]
#[case("*", Literal::Infinity)]
fn test_literals(#[case] source: &str, #[case] expected: Literal) {
    let result = parse_ok(source);
    assert_eq!(result.model.expr(root(&result)).kind, ExprKind::Literal(expected));
}

// ============================================================================
// Canonical text
// ============================================================================

#[rstest]
#[case("1+2*3", "1 + 2 * 3")]
#[case("(1 + 2) * 3", "(1 + 2) * 3")]
#[case("((a))", "a")]
#[case("a - (b - c)", "a - (b - c)")]
#[case("(a - b) - c", "a - b - c")]
#[case("(2 ** 3) ** 2", "(2 ** 3) ** 2")]
#[case("2 ** (3 ** 2)", "2 ** 3 ** 2")]
#[case("-(2 ** 2)", "-(2 ** 2)")]
#[case("- -x", "- -x")]
#[case("not (a and b)", "not (a and b)")]
#[case("if a ? b else c", "if a ? b else c")]
#[case("(if a ? b else c) + 1", "(if a ? b else c) + 1")]
#[case("(1, 2, 3)", "(1, 2, 3)")]
#[case("(1,)", "(1,)")]
#[case("()", "null")]
#[case("f(1, 2)", "f(1, 2)")]
#[case("f(x = 1)", "f(x = 1)")]
#[case("new T(1)", "new T(1)")]
#[case("x istype T", "x istype T")]
#[case("x as T", "x as T")]
#[case("a.b", "a.b")]
#[case("a#(1)", "a#(1)")]
#[case("s->collect {in x;x+1}", "s->collect { in x; x + 1 }")]
#[case("'my name' + 1", "'my name' + 1")]
#[case("$::P::x", "$::P::x")]
#[case("2.0", "2.0")]
#[case(
    "s->select { in x : Real [1..n] :> y; x > 0 }",
    "s->select { in x : Real :> y [1..n]; x > 0 }"
)]
#[case("s.{ in x [*] ordered = 0; x }", "s.{ in x [0..*] ordered = 0; x }")]
fn test_canonical_text(#[case] source: &str, #[case] expected: &str) {
    let result = parse_ok(source);
    assert_eq!(unparse_expr(&result.model, root(&result)), expected);
}

#[rstest]
#[case("1 + 2 * 3 - 4 / 5 % 6")]
#[case("a ?? b ?? c")]
#[case("not not a or b implies c xor d")]
#[case("if x > 0 ? x else -x")]
#[case("(a .. b) + 1")]
#[case("x hastype T and y @ U")]
#[case("(1, (2, 3), (4,))")]
#[case("f(g(1), h(x = 2))")]
#[case("items->select { in x : Real; x > 0 }->size()")]
#[case("xs.{ in x; x * 2 }.?{ in y; y < 10 }")]
#[case("~a ^ b ** -c")]
#[case("a.b.c == $::Root::d")]
#[case("xs->select { in x : Real, Integer [0..n + 1] nonunique :>> base; x > 0 }")]
#[case("xs.{ in x ::> base default := 2; x }")]
fn test_round_trip(#[case] source: &str) {
    let first = parse_ok(source);
    let text = unparse_expr(&first.model, root(&first));
    let second = parse_ok(&text);
    assert!(
        first.model.expr_eq(root(&first), &second.model, root(&second)),
        "{source} printed as {text}"
    );
    assert_eq!(unparse_expr(&second.model, root(&second)), text);
}

#[test]
fn test_expr_eq_is_structural() {
    let spaced = parse_ok("a + b * c");
    let tight = parse_ok("a+(b*c)");
    let swapped = parse_ok("b * c + a");
    assert!(spaced.model.expr_eq(root(&spaced), &tight.model, root(&tight)));
    assert!(!spaced.model.expr_eq(root(&spaced), &swapped.model, root(&swapped)));
}

#[test]
fn test_expr_eq_compares_body_parameters() {
    let one = parse_ok("s->select { in x : T [1]; x }");
    let two = parse_ok("s->select { in x : T [2]; x }");
    let untyped = parse_ok("s->select { in x [1]; x }");
    let same = parse_ok("s->select {in x:T[1];x}");
    assert!(one.model.expr_eq(root(&one), &same.model, root(&same)));
    assert!(!one.model.expr_eq(root(&one), &two.model, root(&two)));
    assert!(!one.model.expr_eq(root(&one), &untyped.model, root(&untyped)));
}

// ============================================================================
// Errors
// ============================================================================

#[rstest]
#[case("1 +", ErrorCode::E0402)]
#[case("not", ErrorCode::E0402)]
#[case("1 2", ErrorCode::E0901)]
fn test_expression_errors(#[case] source: &str, #[case] code: ErrorCode) {
    let result = parse_expression(source, "expr.sysml", &ParseOptions::default());
    assert!(!result.success);
    assert_eq!(result.diagnostics[0].code, code, "{:?}", result.diagnostics);
}

#[test]
fn test_empty_input_fails() {
    let result = parse_expression("", "expr.sysml", &ParseOptions::default());
    assert!(!result.success);
}

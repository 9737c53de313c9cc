//! Canonical text for model expressions.
//!
//! The printer emits the fewest parentheses the precedence ladder allows,
//! so re-parsing its output yields a structurally equal expression. Bodies
//! print their parameter declarations and result expression only.

use std::borrow::Cow;

use super::model::*;
use crate::base::{Language, is_plain_identifier};
use crate::parser::keywords;

/// Write `name` so that it lexes back as one identifier in `language`.
pub fn escape_name(name: &str, language: Language) -> Cow<'_, str> {
    quote_if(name, keywords::lookup(name, language).is_some())
}

/// Like [`escape_name`], but safe to re-read in either language.
fn escape_any(name: &str) -> Cow<'_, str> {
    quote_if(name, keywords::is_reserved_anywhere(name))
}

fn quote_if(name: &str, reserved: bool) -> Cow<'_, str> {
    if !reserved && is_plain_identifier(name) {
        return Cow::Borrowed(name);
    }
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('\'');
    push_escaped(&mut quoted, name, '\'');
    quoted.push('\'');
    Cow::Owned(quoted)
}

fn push_escaped(out: &mut String, text: &str, delimiter: char) {
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}

/// Text of a reference, names quoted where needed.
pub fn reference_text(reference: &Reference) -> String {
    let mut out = String::new();
    if reference.global {
        out.push_str("$::");
    }
    for (i, path) in reference.paths.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        for (j, segment) in path.iter().enumerate() {
            if j > 0 {
                out.push_str("::");
            }
            out.push_str(&escape_any(segment));
        }
    }
    out
}

// ============================================================================
// Precedence
// ============================================================================

const CONDITIONAL: u8 = 1;
const CLASSIFICATION: u8 = 8;
const RANGE: u8 = 10;
const EXPONENT: u8 = 13;
const UNARY: u8 = 14;
const EXTENT: u8 = 15;
const PRIMARY: u8 = 16;

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::NullCoalesce => 2,
        BinaryOp::Implies => 3,
        BinaryOp::Or | BinaryOp::BitOr => 4,
        BinaryOp::Xor => 5,
        BinaryOp::And | BinaryOp::BitAnd => 6,
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Same | BinaryOp::NotSame => 7,
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => 9,
        BinaryOp::Range => RANGE,
        BinaryOp::Add | BinaryOp::Sub => 11,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 12,
        BinaryOp::Pow | BinaryOp::Caret => EXPONENT,
    }
}

fn precedence(kind: &ExprKind) -> u8 {
    match kind {
        ExprKind::Conditional { .. } => CONDITIONAL,
        ExprKind::Binary { op, .. } => binary_precedence(*op),
        ExprKind::Classification { .. } | ExprKind::Cast { .. } => CLASSIFICATION,
        ExprKind::Unary { .. } => UNARY,
        ExprKind::Extent(_) => EXTENT,
        _ => PRIMARY,
    }
}

/// Minimum precedence of the left and right operands of `op`.
fn operand_bounds(op: BinaryOp) -> (u8, u8) {
    let level = binary_precedence(op);
    match level {
        RANGE => (level + 1, level + 1),
        EXPONENT => (UNARY, EXPONENT),
        _ => (level, level + 1),
    }
}

// ============================================================================
// Printer
// ============================================================================

enum Task {
    Expr(ExprId, u8),
    Body(ElementId),
    Text(Cow<'static, str>),
}

fn text(s: &'static str) -> Task {
    Task::Text(Cow::Borrowed(s))
}

fn owned(s: String) -> Task {
    Task::Text(Cow::Owned(s))
}

/// Print expression `id` of `model`.
///
/// Works from an explicit stack, so arbitrarily deep operand chains print
/// without recursion.
pub fn unparse_expr(model: &Model, id: ExprId) -> String {
    let mut out = String::new();
    let mut stack = vec![Task::Expr(id, 0)];
    while let Some(task) = stack.pop() {
        let parts = match task {
            Task::Text(s) => {
                out.push_str(&s);
                continue;
            }
            Task::Body(body) => body_parts(model, body),
            Task::Expr(id, min) => {
                let kind = &model.expr(id).kind;
                let mut parts = expr_parts(model, kind);
                if precedence(kind) < min {
                    parts.insert(0, text("("));
                    parts.push(text(")"));
                }
                parts
            }
        };
        stack.extend(parts.into_iter().rev());
    }
    out
}

fn expr_parts(model: &Model, kind: &ExprKind) -> Vec<Task> {
    match kind {
        ExprKind::Literal(literal) => vec![owned(literal_text(literal))],
        ExprKind::Null => vec![text("null")],
        ExprKind::Reference(reference) => vec![owned(reference_text(reference))],
        ExprKind::Binary { op, lhs, rhs } => {
            let (left, right) = operand_bounds(*op);
            vec![
                Task::Expr(*lhs, left),
                owned(format!(" {} ", op.as_str())),
                Task::Expr(*rhs, right),
            ]
        }
        ExprKind::Unary { op, operand } => {
            let signed = |kind: &ExprKind| {
                matches!(
                    kind,
                    ExprKind::Unary {
                        op: UnaryOp::Plus | UnaryOp::Minus,
                        ..
                    }
                )
            };
            let prefix = match op {
                UnaryOp::Not => "not ",
                UnaryOp::Plus if signed(&model.expr(*operand).kind) => "+ ",
                UnaryOp::Minus if signed(&model.expr(*operand).kind) => "- ",
                UnaryOp::Plus => "+",
                UnaryOp::Minus => "-",
                UnaryOp::BitNot => "~",
            };
            vec![text(prefix), Task::Expr(*operand, UNARY)]
        }
        ExprKind::Conditional {
            condition,
            then_expr,
            else_expr,
        } => vec![
            text("if "),
            Task::Expr(*condition, CONDITIONAL + 1),
            text(" ? "),
            Task::Expr(*then_expr, 0),
            text(" else "),
            Task::Expr(*else_expr, 0),
        ],
        ExprKind::Classification { op, operand, ty } => {
            let mut parts = Vec::new();
            if let Some(operand) = operand {
                parts.push(Task::Expr(*operand, CLASSIFICATION));
                parts.push(text(" "));
            }
            parts.push(owned(format!("{} {}", op.as_str(), reference_text(ty))));
            parts
        }
        ExprKind::Cast { op, operand, ty } => vec![
            Task::Expr(*operand, CLASSIFICATION),
            owned(format!(" {} {}", op.as_str(), reference_text(ty))),
        ],
        ExprKind::Sequence(items) => {
            let mut parts = vec![text("(")];
            push_list(&mut parts, items.iter().map(|item| Task::Expr(*item, 0)));
            if items.len() == 1 {
                parts.push(text(","));
            }
            parts.push(text(")"));
            parts
        }
        ExprKind::Invocation { callee, args } => {
            let mut parts = vec![owned(reference_text(callee))];
            push_arguments(&mut parts, args);
            parts
        }
        ExprKind::Instantiation { ty, args } => {
            let mut parts = vec![owned(format!("new {}", reference_text(ty)))];
            push_arguments(&mut parts, args);
            parts
        }
        ExprKind::FeatureChain { base, feature } => vec![
            Task::Expr(*base, PRIMARY),
            owned(format!(".{}", reference_text(feature))),
        ],
        ExprKind::Index { base, index } => vec![
            Task::Expr(*base, PRIMARY),
            text("#("),
            Task::Expr(*index, 0),
            text(")"),
        ],
        ExprKind::Bracket { base, index } => vec![
            Task::Expr(*base, PRIMARY),
            text("["),
            Task::Expr(*index, 0),
            text("]"),
        ],
        ExprKind::Collect { base, body } => {
            vec![Task::Expr(*base, PRIMARY), text("."), Task::Body(*body)]
        }
        ExprKind::Select { base, body } => {
            vec![Task::Expr(*base, PRIMARY), text(".?"), Task::Body(*body)]
        }
        ExprKind::Arrow {
            base,
            function,
            arg,
        } => {
            let mut parts = vec![
                Task::Expr(*base, PRIMARY),
                owned(format!("->{}", reference_text(function))),
            ];
            match arg {
                ArrowArg::Args(args) => push_arguments(&mut parts, args),
                ArrowArg::Body(body) => {
                    parts.push(text(" "));
                    parts.push(Task::Body(*body));
                }
                ArrowArg::Function(reference) => {
                    parts.push(owned(format!(" {}", reference_text(reference))));
                }
            }
            parts
        }
        ExprKind::MetadataAccess(reference) => {
            vec![owned(format!("{}.metadata", reference_text(reference)))]
        }
        ExprKind::Body(body) => vec![Task::Body(*body)],
        ExprKind::Extent(ty) => vec![owned(format!("all {}", reference_text(ty)))],
    }
}

fn push_list(parts: &mut Vec<Task>, items: impl Iterator<Item = Task>) {
    for (i, item) in items.enumerate() {
        if i > 0 {
            parts.push(text(", "));
        }
        parts.push(item);
    }
}

fn push_arguments(parts: &mut Vec<Task>, args: &Arguments) {
    parts.push(text("("));
    match args {
        Arguments::Positional(args) => {
            push_list(parts, args.iter().map(|arg| Task::Expr(*arg, 0)));
        }
        Arguments::Named(args) => {
            for (i, (name, arg)) in args.iter().enumerate() {
                if i > 0 {
                    parts.push(text(", "));
                }
                parts.push(owned(format!("{} = ", escape_any(name))));
                parts.push(Task::Expr(*arg, 0));
            }
        }
    }
    parts.push(text(")"));
}

/// `{ in x : T [1] :> y = 0; result }`
fn body_parts(model: &Model, body: ElementId) -> Vec<Task> {
    let element = model.element(body);
    let mut parts = vec![text("{ ")];
    for member in element.owned_members() {
        let member = model.element(member);
        let Some(feature) = member.as_feature() else {
            continue;
        };
        parameter_parts(model, member.name.as_deref(), feature, &mut parts);
        parts.push(text("; "));
    }
    if let Some(result) = element.result {
        parts.push(Task::Expr(result, 0));
        parts.push(text(" "));
    }
    parts.push(text("}"));
    parts
}

fn parameter_parts(model: &Model, name: Option<&str>, feature: &FeatureDecl, parts: &mut Vec<Task>) {
    let mut head = Vec::new();
    if let Some(direction) = feature.direction {
        head.push(direction.as_str().to_string());
    }
    if let Some(name) = name {
        head.push(escape_any(name).into_owned());
    }
    parts.push(owned(head.join(" ")));

    let mut previous = None;
    for relationship in feature.relationships.iter().map(|id| model.relationship(*id)) {
        let Some(symbol) = clause_symbol(relationship.kind) else {
            continue;
        };
        let separator = if previous == Some(relationship.kind) && takes_list(relationship.kind) {
            ", ".to_string()
        } else {
            format!(" {symbol} ")
        };
        let prefix = if relationship.conjugated { "~" } else { "" };
        parts.push(owned(format!("{separator}{prefix}{}", reference_text(&relationship.target))));
        previous = Some(relationship.kind);
    }

    if let Some(multiplicity) = &feature.multiplicity {
        multiplicity_parts(multiplicity, parts);
    }
    if feature.modifiers.is_ordered {
        parts.push(text(" ordered"));
    }
    if feature.modifiers.is_nonunique {
        parts.push(text(" nonunique"));
    }

    if let Some(value) = &feature.value {
        let operator = match (value.is_default, value.is_initial) {
            (false, false) => " = ",
            (false, true) => " := ",
            (true, false) => " default = ",
            (true, true) => " default := ",
        };
        parts.push(text(operator));
        parts.push(Task::Expr(value.expr, 0));
    }
}

fn clause_symbol(kind: RelationshipKind) -> Option<&'static str> {
    match kind {
        RelationshipKind::FeatureTyping => Some(":"),
        RelationshipKind::Subsetting => Some(":>"),
        RelationshipKind::Redefinition => Some(":>>"),
        RelationshipKind::ReferenceSubsetting => Some("::>"),
        RelationshipKind::CrossSubsetting => Some("=>"),
        RelationshipKind::TypeFeaturing => Some("featured by"),
        RelationshipKind::FeatureChaining => Some("chains"),
        RelationshipKind::FeatureInverting => Some("inverse of"),
        RelationshipKind::Disjoining => Some("disjoint from"),
        RelationshipKind::Unioning => Some("unions"),
        RelationshipKind::Intersecting => Some("intersects"),
        RelationshipKind::Differencing => Some("differences"),
        _ => None,
    }
}

fn takes_list(kind: RelationshipKind) -> bool {
    !matches!(
        kind,
        RelationshipKind::ReferenceSubsetting
            | RelationshipKind::CrossSubsetting
            | RelationshipKind::FeatureInverting
            | RelationshipKind::FeatureChaining
    )
}

/// Bounds print at additive level, so `..` stays the separator.
fn multiplicity_parts(multiplicity: &Multiplicity, parts: &mut Vec<Task>) {
    let bound = |bound: Bound| match bound {
        Bound::Literal(n) => owned(n.to_string()),
        Bound::Unbounded => text("*"),
        Bound::Expr(id) => Task::Expr(id, RANGE + 1),
    };
    let (lower, upper) = match (multiplicity.lower, multiplicity.upper) {
        (Some(lower), Some(upper)) => (lower, Some(upper).filter(|upper| *upper != lower)),
        (Some(only), None) | (None, Some(only)) => (only, None),
        (None, None) => return,
    };
    parts.push(text(" ["));
    parts.push(bound(lower));
    if let Some(upper) = upper {
        parts.push(text(".."));
        parts.push(bound(upper));
    }
    parts.push(text("]"));
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::Boolean(value) => value.to_string(),
        Literal::Integer(value) => value.to_string(),
        // Debug keeps the decimal point and round-trips exactly
        Literal::Real(value) => format!("{value:?}"),
        Literal::Infinity => "*".to_string(),
        Literal::String(value) => {
            let mut out = String::with_capacity(value.len() + 2);
            out.push('"');
            push_escaped(&mut out, value, '"');
            out.push('"');
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_name_quotes_keywords_per_language() {
        assert_eq!(escape_name("Vehicle", Language::SysML), "Vehicle");
        assert_eq!(escape_name("part", Language::SysML), "'part'");
        assert_eq!(escape_name("My Name", Language::KerML), "'My Name'");
        assert_eq!(escape_name("it's", Language::KerML), r"'it\'s'");
    }

    #[test]
    fn test_literal_text() {
        assert_eq!(literal_text(&Literal::Real(1.0)), "1.0");
        assert_eq!(literal_text(&Literal::Real(2.5e-3)), "0.0025");
        assert_eq!(literal_text(&Literal::String("a\"b".into())), r#""a\"b""#);
        assert_eq!(literal_text(&Literal::Infinity), "*");
    }

    #[test]
    fn test_operand_bounds() {
        assert_eq!(operand_bounds(BinaryOp::Add), (11, 12));
        assert_eq!(operand_bounds(BinaryOp::Pow), (UNARY, EXPONENT));
        assert_eq!(operand_bounds(BinaryOp::Range), (11, 11));
    }
}

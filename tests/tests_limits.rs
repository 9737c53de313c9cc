//! Limit Tests - recursion depth and cancellation

use kerml::{CancellationToken, ErrorCode, ParseOptions, parse, parse_expression, parse_with};
use rstest::rstest;

fn nested_packages(depth: usize) -> String {
    let mut source = String::new();
    for level in 0..depth {
        source.push_str(&format!("package P{level} {{ "));
    }
    source.push_str("part def Leaf;");
    for _ in 0..depth {
        source.push_str(" }");
    }
    source
}

#[test]
fn test_cancelled_before_start() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let options = ParseOptions::default().with_cancel(cancel);
    let result = parse_with(&nested_packages(3), "cancel.sysml", &options);

    assert!(!result.success);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, ErrorCode::E0904);
    assert!(result.root_namespace().members.is_empty());
    assert_eq!(result.syntax().text().to_string(), nested_packages(3));
}

#[test]
fn test_live_token_does_not_interfere() {
    let options = ParseOptions::default().with_cancel(CancellationToken::new());
    let result = parse_with(&nested_packages(3), "live.sysml", &options);
    assert!(result.success, "{:?}", result.diagnostics);
}

#[rstest]
#[case(1, false)]
#[case(2, false)]
#[case(3, true)]
fn test_depth_limit_on_members(#[case] max_depth: u32, #[case] success: bool) {
    let options = ParseOptions::default().with_max_depth(max_depth);
    let result = parse_with(&nested_packages(3), "deep.sysml", &options);
    assert_eq!(result.success, success, "{:?}", result.diagnostics);
    if !success {
        assert!(result.errors().any(|d| d.code == ErrorCode::E0903));
        assert_eq!(result.model.elements.len(), 1);
    }
}

#[test]
fn test_deep_nesting_under_default_limit() {
    let result = parse(&nested_packages(100), "deep.sysml");
    assert!(result.success, "{:?}", result.diagnostics);
    let path: Vec<String> = (0..100).map(|level| format!("P{level}")).collect();
    let leaf = format!("{}::Leaf", path.join("::"));
    assert!(result.model.find(&leaf).is_some());
}

#[test]
fn test_default_limit_stops_runaway_nesting() {
    let result = parse(&nested_packages(500), "runaway.sysml");
    assert!(!result.success);
    assert!(result.errors().any(|d| d.code == ErrorCode::E0903));
    assert!(result.root_namespace().members.is_empty());
}

#[test]
fn test_expression_depth_limit() {
    let source = format!("{}1{}", "(".repeat(300), ")".repeat(300));
    let result = parse_expression(&source, "expr.sysml", &ParseOptions::default());
    assert!(!result.success);
    assert!(result.expr.is_none());
    assert!(result.diagnostics.iter().any(|d| d.code == ErrorCode::E0903));

    let source = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    let result = parse_expression(&source, "expr.sysml", &ParseOptions::default());
    assert!(result.success, "{:?}", result.diagnostics);
}

#[rstest]
#[case::prefix_operators("- ")]
#[case::logical_not("not ")]
fn test_prefix_chain_hits_depth_limit(#[case] operator: &str) {
    let source = format!("attribute x = {}1;", operator.repeat(100_000));
    let result = parse(&source, "prefix.sysml");
    assert!(!result.success);
    assert!(result.errors().any(|d| d.code == ErrorCode::E0903));
    assert_eq!(result.model.elements.len(), 1);
    assert_eq!(result.syntax().text().to_string(), source);
}

#[rstest]
#[case::feature_chain(".b")]
#[case::index("#(1)")]
#[case::bracket("[0]")]
#[case::arrow("->f()")]
fn test_postfix_chain_hits_depth_limit(#[case] operation: &str) {
    let source = format!("attribute x = a{};", operation.repeat(100_000));
    let result = parse(&source, "postfix.sysml");
    assert!(!result.success);
    assert!(result.errors().any(|d| d.code == ErrorCode::E0903));
    assert_eq!(result.model.elements.len(), 1);
}

#[test]
fn test_short_chains_stay_under_the_limit() {
    let source = format!("attribute x = {}a{};", "- ".repeat(50), ".b".repeat(50));
    let result = parse(&source, "short.sysml");
    assert!(result.success, "{:?}", result.diagnostics);
}

#[test]
fn test_prefix_operators_count_toward_max_depth() {
    let options = ParseOptions::default().with_max_depth(8);
    let shallow = parse_with("attribute x = - - 1;", "d.sysml", &options);
    assert!(shallow.success, "{:?}", shallow.diagnostics);

    let deep = parse_with("attribute x = - - - - - - - - 1;", "d.sysml", &options);
    assert!(!deep.success);
    assert!(deep.errors().any(|d| d.code == ErrorCode::E0903));
}

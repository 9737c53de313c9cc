//! Parser Tests - CST, recovery and language differences
//!
//! Every input, valid or not, yields a tree whose text is the input.
//! Malformed members are wrapped in `ERROR` and parsing resumes at the
//! next statement boundary.

use kerml::parser::{ErrorCode, SyntaxKind, parse_kerml, parse_sysml};
use kerml::{Language, ParseOptions, parse, parse_with};
use rstest::rstest;

fn codes(source: &str) -> Vec<ErrorCode> {
    parse(source, "test.sysml")
        .diagnostics
        .iter()
        .map(|d| d.code)
        .collect()
}

// ============================================================================
// Lossless trees
// ============================================================================

#[rstest]
#[case("")]
#[case("   \n\t")]
#[case("package P;")]
#[case("package P {\n  // note\n  part def A :> B; /* comment */\n}\n")]
#[case("part def A { attribute x : Real [0..*] = 1 + 2 * 3; }")]
#[case("package P { part a part b; part c; }")]
#[case("package P { part a;")]
#[case("}}}")]
#[case("action a { accept sig : Signal via port; then done; }")]
#[case("package P { § }")]
#[case("part def 'unterminated")]
fn test_tree_text_equals_input(#[case] source: &str) {
    let parse = parse_sysml(source);
    assert_eq!(parse.syntax().text().to_string(), source);
    assert_eq!(parse.syntax().kind(), SyntaxKind::SOURCE_FILE);
}

#[test]
fn test_result_green_tree_is_lossless() {
    let source = "package P {\r\n\tpart def A; // trailing\r\n}";
    let result = parse(source, "crlf.sysml");
    assert!(result.success);
    assert_eq!(result.syntax().text().to_string(), source);
}

// ============================================================================
// Keywords per language
// ============================================================================

#[rstest]
#[case("class C;", Language::KerML, true)]
#[case("class C;", Language::SysML, false)]
#[case("part def P;", Language::SysML, true)]
#[case("part def P;", Language::KerML, false)]
#[case("feature f : T;", Language::KerML, true)]
#[case("struct S { feature x; }", Language::KerML, true)]
fn test_keywords_depend_on_language(
    #[case] source: &str,
    #[case] language: Language,
    #[case] success: bool,
) {
    let options = ParseOptions::default().with_language(language);
    let result = parse_with(source, "unit", &options);
    assert_eq!(result.success, success, "{:?}", result.diagnostics);
}

#[test]
fn test_kerml_keyword_is_a_name_in_sysml() {
    let result = parse("part class;", "names.sysml");
    assert!(result.success, "{:?}", result.diagnostics);
    assert!(result.model.find("class").is_some());
}

#[test]
fn test_quoted_keyword_is_a_name() {
    let parse = parse_kerml("class 'class';");
    assert!(parse.ok(), "{:?}", parse.errors);
}

// ============================================================================
// Recovery
// ============================================================================

#[test]
fn test_missing_semicolon_drops_one_member() {
    let result = parse("package P { part a part b; part c; }", "test.sysml");
    assert_eq!(result.errors().count(), 1);
    assert_eq!(result.diagnostics[0].code, ErrorCode::E0307);

    let p = result.model.find("P").expect("package kept");
    let names: Vec<_> = result
        .model
        .element(p)
        .owned_members()
        .filter_map(|id| result.model.element(id).name.clone())
        .collect();
    assert_eq!(names, ["c"]);
}

#[test]
fn test_missing_type_after_colon() {
    let result = parse("part def A { attribute x : ; attribute y; }", "test.sysml");
    assert_eq!(result.errors().count(), 1);
    assert_eq!(result.diagnostics[0].code, ErrorCode::E0305);
    assert!(result.model.find("A::y").is_some());
    assert!(result.model.find("A::x").is_none());
}

#[test]
fn test_unclosed_brace_discards_member() {
    assert_eq!(codes("package P { part a;"), [ErrorCode::E0202]);
    let result = parse("package P { part a;", "test.sysml");
    assert!(result.model.top_level().is_empty());
}

#[test]
fn test_stray_closing_brace_at_top_level() {
    let result = parse("} part def A;", "test.sysml");
    assert_eq!(result.errors().count(), 1);
    assert_eq!(result.diagnostics[0].code, ErrorCode::E0205);
    assert!(result.model.find("A").is_some());
}

#[test]
fn test_recovery_skips_balanced_block() {
    let result = parse("package P { 42 { part x; } part def B; }", "test.sysml");
    assert_eq!(result.errors().count(), 1);
    assert!(result.model.find("P::x").is_none());
    assert!(result.model.find("P::B").is_some());
}

#[rstest]
#[case("action a { 42; }", ErrorCode::E0701)]
#[case("state s { 42; }", ErrorCode::E0702)]
#[case("requirement r { part p; 1 + ; }", ErrorCode::E0402)]
fn test_context_picks_error_code(#[case] source: &str, #[case] code: ErrorCode) {
    let errors = codes(source);
    assert_eq!(errors.first(), Some(&code), "{errors:?}");
}

#[test]
fn test_errors_in_several_members_are_all_reported() {
    let source = "package P {\n  part a : ;\n  part def B :> ;\n  part c;\n}";
    let result = parse(source, "test.sysml");
    assert_eq!(result.errors().count(), 2);
    let lines: Vec<u32> = result.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, [2, 3]);
    assert!(result.model.find("P::c").is_some());
}

// ============================================================================
// Lexical errors
// ============================================================================

#[rstest]
#[case("package P { § }", ErrorCode::E0101)]
#[case("doc /* never closed", ErrorCode::E0103)]
#[case("part def 'unterminated", ErrorCode::E0105)]
#[case("attribute s = \"open;", ErrorCode::E0102)]
fn test_lex_error_is_the_only_diagnostic(#[case] source: &str, #[case] code: ErrorCode) {
    let result = parse(source, "lex.sysml");
    assert!(!result.success);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, code);
    assert!(result.model.top_level().is_empty());
}

// ============================================================================
// Deprecated syntax
// ============================================================================

#[test]
fn test_readonly_is_a_warning() {
    let result = parse("part def A { readonly attribute x; }", "test.sysml");
    assert!(result.success);
    assert_eq!(codes("part def A { readonly attribute x; }"), [ErrorCode::W0302]);
    let x = result.model.find("A::x").unwrap();
    let feature = result.model.element(x).as_feature().unwrap();
    assert!(feature.modifiers.is_constant);
}

// ============================================================================
// Result expressions
// ============================================================================

#[rstest]
#[case("calc def F { in x : Real; x * 2 }", true)]
#[case("constraint def C { in a; a > 0 }", true)]
#[case("calc def F { x * 2 attribute y; }", false)]
#[case("part def P { 1 + 1 }", false)]
fn test_result_expression_placement(#[case] source: &str, #[case] success: bool) {
    let result = parse(source, "test.sysml");
    assert_eq!(result.success, success, "{:?}", result.diagnostics);
}

// ============================================================================
// Relationship and literal checks
// ============================================================================

#[test]
fn test_second_conjugation_is_rejected() {
    let options = ParseOptions::default().with_language(Language::KerML);
    let result = parse_with("class A; class B; class C ~ A ~ B;", "conj.kerml", &options);
    assert_eq!(result.errors().count(), 1);
    assert_eq!(result.diagnostics[0].code, ErrorCode::E0603);
    assert!(result.model.find("A").is_some());
    assert!(result.model.find("C").is_none());
}

#[test]
fn test_integer_overflow_is_a_literal_error() {
    let result = parse(
        "part def A { attribute x = 99999999999999999999; attribute y = 1; }",
        "big.sysml",
    );
    assert_eq!(codes("part def A { attribute x = 99999999999999999999; }"), [ErrorCode::E0104]);
    assert!(result.model.find("A::x").is_none());
    assert!(result.model.find("A::y").is_some());
}

#[test]
fn test_parsing_is_idempotent() {
    let source = "package P { part def A :> B { attribute m : Real [1] = 2 * 3; } part def B; }";
    let first = parse(source, "same.sysml");
    let second = parse(source, "same.sysml");
    assert_eq!(first.model, second.model);
    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.green, second.green);
}

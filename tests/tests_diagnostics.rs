//! Diagnostic Tests - positions, rendering and ordering

use kerml::{ErrorCode, Severity, parse};

#[test]
fn test_display_format() {
    let result = parse("package P {\n    part x\n}", "model.sysml");
    assert_eq!(result.diagnostics.len(), 1);
    let diag = &result.diagnostics[0];
    assert_eq!(diag.code, ErrorCode::E0307);
    assert_eq!((diag.line, diag.column, diag.length), (3, 1, 1));
    assert!(
        diag.to_string().starts_with("model.sysml:3:1: error[E0307]: "),
        "{diag}"
    );
}

#[test]
fn test_columns_count_characters() {
    let result = parse("part def 'é' { readonly attribute x; }", "wide.sysml");
    assert!(result.success);
    let diag = &result.diagnostics[0];
    assert_eq!(diag.code, ErrorCode::W0302);
    assert_eq!((diag.line, diag.column, diag.length), (1, 16, 8));
    assert_eq!(diag.hint.as_deref(), Some("use 'constant'"));
}

#[test]
fn test_duplicate_name_is_a_warning_with_hint() {
    let result = parse("package P {\n  part a;\n  part a;\n}", "dup.sysml");
    assert!(result.success);
    assert_eq!(result.errors().count(), 0);
    let diag = &result.diagnostics[0];
    assert_eq!(diag.severity, Severity::Warning);
    assert_eq!(diag.line, 3);
    assert_eq!(
        diag.hint.as_deref(),
        Some("later declarations with this name are not reachable by name")
    );
    assert!(diag.to_string().starts_with("dup.sysml:3:"), "{diag}");
    assert!(diag.to_string().contains(": warning[W0301]: "), "{diag}");
}

#[test]
fn test_diagnostics_are_sorted_by_position() {
    let source = "package P {\n  part a;\n  part a;\n  part b : ;\n}";
    let result = parse(source, "order.sysml");
    assert!(!result.success);
    let codes: Vec<ErrorCode> = result.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, [ErrorCode::W0301, ErrorCode::E0305]);
    let lines: Vec<u32> = result.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, [3, 4]);
}

#[test]
fn test_error_at_end_of_input() {
    let result = parse("part def A", "eof.sysml");
    assert!(!result.success);
    let diag = &result.diagnostics[0];
    assert_eq!((diag.line, diag.column, diag.length), (1, 11, 0));
}

#[test]
fn test_unit_name_is_reported() {
    let result = parse("part def A :> ;", "models/vehicle.sysml");
    assert_eq!(result.diagnostics[0].source_unit, "models/vehicle.sysml");
}

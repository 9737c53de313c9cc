//! Project Tests - directory discovery and parallel parsing

use std::fs;
use std::path::Path;

use kerml::project::{collect_source_files, load_file, parse_directory, parse_files, parse_sources};
use kerml::{Error, Language, ParseOptions, SourceUnit, parse};

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn sample_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "lib/base.kerml", "package Base { class Thing; }");
    write(
        dir.path(),
        "model/vehicle.sysml",
        "package Vehicle { part def Car; part car : Car; }",
    );
    write(dir.path(), "model/broken.sysml", "package Broken { part a : ; }");
    write(dir.path(), "README.md", "# not a model");
    dir
}

#[test]
fn test_parse_directory_matches_sequential_parse() {
    let dir = sample_tree();
    let results = parse_directory(dir.path(), &ParseOptions::default()).unwrap();
    let files = collect_source_files(dir.path()).unwrap();
    assert_eq!(results.len(), 3);

    for (result, path) in results.iter().zip(&files) {
        let text = fs::read_to_string(path).unwrap();
        let sequential = parse(&text, SourceUnit::from_path(path));
        assert_eq!(result.unit, sequential.unit);
        assert_eq!(result.model, sequential.model);
        assert_eq!(result.diagnostics, sequential.diagnostics);
        assert_eq!(result.success, sequential.success);
    }
}

#[test]
fn test_language_follows_extension() {
    let dir = sample_tree();
    let results = parse_directory(dir.path(), &ParseOptions::default()).unwrap();
    let languages: Vec<Language> = results.iter().map(|r| r.unit.language).collect();
    assert_eq!(languages, [Language::KerML, Language::SysML, Language::SysML]);

    let base = &results[0];
    assert!(base.success, "{:?}", base.diagnostics);
    assert!(base.model.find("Base::Thing").is_some());
}

#[test]
fn test_one_broken_file_does_not_affect_others() {
    let dir = sample_tree();
    let results = parse_directory(dir.path(), &ParseOptions::default()).unwrap();
    let failed: Vec<&str> = results
        .iter()
        .filter(|r| !r.success)
        .map(|r| r.unit.name.as_str())
        .collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].ends_with("broken.sysml"));
    assert!(results.iter().filter(|r| r.success).count() == 2);
}

#[test]
fn test_parse_files_reports_each_path() {
    let dir = sample_tree();
    let good = dir.path().join("lib/base.kerml");
    let missing = dir.path().join("lib/missing.kerml");
    let unsupported = dir.path().join("README.md");

    let results = parse_files(&[good, missing, unsupported]);
    assert!(results[0].as_ref().is_ok_and(|r| r.success));
    assert!(matches!(results[1], Err(Error::Io { .. })));
    assert!(matches!(results[2], Err(Error::UnsupportedFile(_))));
}

#[test]
fn test_load_file_names_unit_after_path() {
    let dir = sample_tree();
    let path = dir.path().join("model/vehicle.sysml");
    let (unit, text) = load_file(&path).unwrap();
    assert_eq!(unit.name, path.display().to_string());
    assert_eq!(unit.language, Language::SysML);
    assert!(text.starts_with("package Vehicle"));
}

#[test]
fn test_parse_sources_in_parallel() {
    let sources: Vec<(SourceUnit, String)> = (0..64)
        .map(|i| {
            let unit = SourceUnit::from(format!("unit{i}.sysml").as_str());
            (unit, format!("package P{i} {{ part def A{i}; }}"))
        })
        .collect();
    let results = parse_sources(&sources, &ParseOptions::default());

    assert_eq!(results.len(), 64);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.unit.name, format!("unit{i}.sysml"));
        assert!(result.model.find(&format!("P{i}::A{i}")).is_some());
    }
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = parse_directory(dir.path().join("absent"), &ParseOptions::default());
    assert!(matches!(result, Err(Error::DirectoryNotFound(_))));
}

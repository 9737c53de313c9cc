//! Multi-file loading.
//!
//! Discovers `.kerml` and `.sysml` files under a directory and parses many
//! units in parallel. Every unit owns its model, so parsing needs no
//! shared state; results come back in input order.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::base::{Language, SourceUnit};
use crate::error::{Error, Result};
use crate::syntax::{ParseOptions, ParseResult, parse_with};

/// All KerML and SysML files under `dir`, sorted by path.
///
/// Hidden directories are not skipped; other files are ignored.
pub fn collect_source_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::io(path, e.into())
        })?;
        if entry.file_type().is_file() && Language::from_path(entry.path()).is_some() {
            trace!(path = %entry.path().display(), "found source file");
            files.push(entry.into_path());
        }
    }
    debug!(dir = %dir.display(), files = files.len(), "collected source files");
    Ok(files)
}

/// Read one file, naming the unit after its path.
pub fn load_file(path: impl AsRef<Path>) -> Result<(SourceUnit, String)> {
    let path = path.as_ref();
    if Language::from_path(path).is_none() {
        return Err(Error::UnsupportedFile(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok((SourceUnit::from_path(path), text))
}

/// Parse files in parallel with default options.
pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParseResult>> {
    parse_files_with(paths, &ParseOptions::default())
}

/// Parse files in parallel; one entry per path, in the same order.
pub fn parse_files_with(paths: &[PathBuf], options: &ParseOptions) -> Vec<Result<ParseResult>> {
    paths
        .par_iter()
        .map(|path| {
            let (unit, text) = load_file(path)?;
            Ok(parse_with(&text, unit, options))
        })
        .collect()
}

/// Parse in-memory units in parallel; results follow the input order.
pub fn parse_sources<S>(sources: &[(SourceUnit, S)], options: &ParseOptions) -> Vec<ParseResult>
where
    S: AsRef<str> + Sync,
{
    sources
        .par_iter()
        .map(|(unit, text)| parse_with(text.as_ref(), unit.clone(), options))
        .collect()
}

/// Collect and parse every source file under `dir`.
///
/// Fails on the first file that cannot be read.
pub fn parse_directory(dir: impl AsRef<Path>, options: &ParseOptions) -> Result<Vec<ParseResult>> {
    let files = collect_source_files(dir)?;
    parse_files_with(&files, options).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.sysml"), "part def B;").unwrap();
        fs::write(dir.path().join("nested/a.kerml"), "class A;").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = collect_source_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["b.sysml", "a.kerml"]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            collect_source_files(&missing),
            Err(Error::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_unsupported_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.txt");
        fs::write(&path, "part def A;").unwrap();
        let results = parse_files(&[path]);
        assert!(matches!(results[0], Err(Error::UnsupportedFile(_))));
    }

    #[test]
    fn test_parse_sources_keeps_order() {
        let sources = [
            (SourceUnit::from("a.kerml"), "class A;"),
            (SourceUnit::from("b.sysml"), "part def B;"),
        ];
        let results = parse_sources(&sources, &ParseOptions::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].unit.name, "a.kerml");
        assert!(results.iter().all(|r| r.success));
    }
}

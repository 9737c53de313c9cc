//! Source unit identity and dialect detection.

use std::fmt;
use std::path::Path;

use smol_str::SmolStr;

/// File extension of KerML sources.
pub const KERML_EXTENSION: &str = "kerml";
/// File extension of SysML sources.
pub const SYSML_EXTENSION: &str = "sysml";

/// The textual notation a unit is written in.
///
/// The two notations share one grammar but reserve different keywords:
/// `class` is a keyword in KerML and an ordinary name in SysML, while
/// `part` is the other way around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    KerML,
    #[default]
    SysML,
}

impl Language {
    /// Detect the language from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case(KERML_EXTENSION) {
            Some(Self::KerML)
        } else if ext.eq_ignore_ascii_case(SYSML_EXTENSION) {
            Some(Self::SysML)
        } else {
            None
        }
    }

    /// Detect the language from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::KerML => "KerML",
            Self::SysML => "SysML",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies the text being parsed in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceUnit {
    pub name: SmolStr,
    pub language: Language,
}

impl SourceUnit {
    pub fn new(name: impl Into<SmolStr>, language: Language) -> Self {
        Self {
            name: name.into(),
            language,
        }
    }

    /// A unit named after `path`; unknown extensions default to SysML.
    pub fn from_path(path: &Path) -> Self {
        let language = Language::from_path(path).unwrap_or_default();
        Self::new(path.display().to_string(), language)
    }
}

impl From<&str> for SourceUnit {
    fn from(name: &str) -> Self {
        Self::from_path(Path::new(name))
    }
}

impl From<&Path> for SourceUnit {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

impl fmt::Display for SourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("kerml"), Some(Language::KerML));
        assert_eq!(Language::from_extension("SYSML"), Some(Language::SysML));
        assert_eq!(Language::from_extension("txt"), None);
    }

    #[test]
    fn test_unit_from_str_detects_language() {
        let unit = SourceUnit::from("lib/Base.kerml");
        assert_eq!(unit.language, Language::KerML);
        assert_eq!(unit.name, "lib/Base.kerml");

        let unit = SourceUnit::from("inline");
        assert_eq!(unit.language, Language::SysML);
    }
}

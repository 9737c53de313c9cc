//! Name interning.
//!
//! Element names and qualified names repeat heavily across a model
//! (every typing of `ScalarValues::Real` spells the same path). The
//! [`Interner`] hands out one shared [`Name`] per distinct string so a
//! model holds a single allocation per spelling.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

/// An interned, cheaply clonable name.
pub type Name = SmolStr;

/// Deduplicates names for one parse.
#[derive(Debug, Default)]
pub struct Interner {
    names: FxHashSet<Name>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the shared copy.
    pub fn intern(&mut self, text: &str) -> Name {
        if let Some(existing) = self.names.get(text) {
            return existing.clone();
        }
        let name = Name::new(text);
        self.names.insert(name.clone());
        name
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Whether `text` can be written without unrestricted-name quotes.
///
/// Keywords are not considered here; callers that print names check the
/// reserved words of the target language separately.
pub fn is_plain_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first == '_' || (first.is_ascii() && unicode_ident::is_xid_start(first)) => {
            chars.all(|c| c.is_ascii() && unicode_ident::is_xid_continue(c))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_returns_equal_names() {
        let mut interner = Interner::new();
        let a = interner.intern("Vehicle");
        let b = interner.intern("Vehicle");
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_intern_distinct() {
        let mut interner = Interner::new();
        interner.intern("a");
        interner.intern("b");
        assert_eq!(interner.len(), 2);
        assert!(!interner.is_empty());
    }

    #[test]
    fn test_plain_identifier() {
        assert!(is_plain_identifier("mass"));
        assert!(is_plain_identifier("_x1"));
        assert!(!is_plain_identifier("1x"));
        assert!(!is_plain_identifier("my name"));
        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier("é"));
    }
}

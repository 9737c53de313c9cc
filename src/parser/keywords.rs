//! Reserved words of KerML and SysML.
//!
//! The lexer only produces identifiers; every identifier is then looked up
//! here against the unit's [`Language`]. KerML reserves the kernel
//! vocabulary (`class`, `feature`, `struct`, ...), SysML reserves the
//! systems vocabulary (`part`, `action`, `state`, ...). A word reserved only
//! by the other language stays an [`SyntaxKind::IDENT`].

use super::syntax_kind::SyntaxKind;
use crate::base::Language;

/// Which notation reserves a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reserved {
    KerML,
    SysML,
    Both,
}

impl Reserved {
    pub fn includes(self, language: Language) -> bool {
        match self {
            Self::Both => true,
            Self::KerML => language == Language::KerML,
            Self::SysML => language == Language::SysML,
        }
    }
}

/// Keyword table, sorted by text for binary search.
pub const KEYWORDS: &[(&str, SyntaxKind, Reserved)] = &[
    ("about", SyntaxKind::ABOUT_KW, Reserved::Both),
    ("abstract", SyntaxKind::ABSTRACT_KW, Reserved::Both),
    ("accept", SyntaxKind::ACCEPT_KW, Reserved::SysML),
    ("action", SyntaxKind::ACTION_KW, Reserved::SysML),
    ("actor", SyntaxKind::ACTOR_KW, Reserved::SysML),
    ("after", SyntaxKind::AFTER_KW, Reserved::SysML),
    ("alias", SyntaxKind::ALIAS_KW, Reserved::Both),
    ("all", SyntaxKind::ALL_KW, Reserved::Both),
    ("allocate", SyntaxKind::ALLOCATE_KW, Reserved::SysML),
    ("allocation", SyntaxKind::ALLOCATION_KW, Reserved::SysML),
    ("analysis", SyntaxKind::ANALYSIS_KW, Reserved::SysML),
    ("and", SyntaxKind::AND_KW, Reserved::Both),
    ("as", SyntaxKind::AS_KW, Reserved::Both),
    ("assert", SyntaxKind::ASSERT_KW, Reserved::SysML),
    ("assign", SyntaxKind::ASSIGN_KW, Reserved::SysML),
    ("assoc", SyntaxKind::ASSOC_KW, Reserved::KerML),
    ("assume", SyntaxKind::ASSUME_KW, Reserved::SysML),
    ("at", SyntaxKind::AT_KW, Reserved::SysML),
    ("attribute", SyntaxKind::ATTRIBUTE_KW, Reserved::SysML),
    ("behavior", SyntaxKind::BEHAVIOR_KW, Reserved::KerML),
    ("bind", SyntaxKind::BIND_KW, Reserved::SysML),
    ("binding", SyntaxKind::BINDING_KW, Reserved::Both),
    ("bool", SyntaxKind::BOOL_KW, Reserved::KerML),
    ("by", SyntaxKind::BY_KW, Reserved::Both),
    ("calc", SyntaxKind::CALC_KW, Reserved::SysML),
    ("case", SyntaxKind::CASE_KW, Reserved::SysML),
    ("chains", SyntaxKind::CHAINS_KW, Reserved::KerML),
    ("class", SyntaxKind::CLASS_KW, Reserved::KerML),
    ("classifier", SyntaxKind::CLASSIFIER_KW, Reserved::KerML),
    ("comment", SyntaxKind::COMMENT_KW, Reserved::Both),
    ("composite", SyntaxKind::COMPOSITE_KW, Reserved::KerML),
    ("concern", SyntaxKind::CONCERN_KW, Reserved::SysML),
    ("conjugate", SyntaxKind::CONJUGATE_KW, Reserved::KerML),
    ("conjugates", SyntaxKind::CONJUGATES_KW, Reserved::KerML),
    ("conjugation", SyntaxKind::CONJUGATION_KW, Reserved::KerML),
    ("connect", SyntaxKind::CONNECT_KW, Reserved::SysML),
    ("connection", SyntaxKind::CONNECTION_KW, Reserved::SysML),
    ("connector", SyntaxKind::CONNECTOR_KW, Reserved::KerML),
    ("constant", SyntaxKind::CONSTANT_KW, Reserved::Both),
    ("constraint", SyntaxKind::CONSTRAINT_KW, Reserved::SysML),
    ("crosses", SyntaxKind::CROSSES_KW, Reserved::Both),
    ("datatype", SyntaxKind::DATATYPE_KW, Reserved::KerML),
    ("decide", SyntaxKind::DECIDE_KW, Reserved::SysML),
    ("def", SyntaxKind::DEF_KW, Reserved::SysML),
    ("default", SyntaxKind::DEFAULT_KW, Reserved::Both),
    ("defined", SyntaxKind::DEFINED_KW, Reserved::SysML),
    ("dependency", SyntaxKind::DEPENDENCY_KW, Reserved::Both),
    ("derived", SyntaxKind::DERIVED_KW, Reserved::Both),
    ("differences", SyntaxKind::DIFFERENCES_KW, Reserved::KerML),
    ("disjoining", SyntaxKind::DISJOINING_KW, Reserved::KerML),
    ("disjoint", SyntaxKind::DISJOINT_KW, Reserved::KerML),
    ("do", SyntaxKind::DO_KW, Reserved::SysML),
    ("doc", SyntaxKind::DOC_KW, Reserved::Both),
    ("else", SyntaxKind::ELSE_KW, Reserved::Both),
    ("end", SyntaxKind::END_KW, Reserved::Both),
    ("entry", SyntaxKind::ENTRY_KW, Reserved::SysML),
    ("enum", SyntaxKind::ENUM_KW, Reserved::SysML),
    ("event", SyntaxKind::EVENT_KW, Reserved::SysML),
    ("exhibit", SyntaxKind::EXHIBIT_KW, Reserved::SysML),
    ("exit", SyntaxKind::EXIT_KW, Reserved::SysML),
    ("expose", SyntaxKind::EXPOSE_KW, Reserved::SysML),
    ("expr", SyntaxKind::EXPR_KW, Reserved::KerML),
    ("false", SyntaxKind::FALSE_KW, Reserved::Both),
    ("feature", SyntaxKind::FEATURE_KW, Reserved::KerML),
    ("featured", SyntaxKind::FEATURED_KW, Reserved::KerML),
    ("featuring", SyntaxKind::FEATURING_KW, Reserved::KerML),
    ("filter", SyntaxKind::FILTER_KW, Reserved::Both),
    ("first", SyntaxKind::FIRST_KW, Reserved::Both),
    ("flow", SyntaxKind::FLOW_KW, Reserved::Both),
    ("for", SyntaxKind::FOR_KW, Reserved::Both),
    ("fork", SyntaxKind::FORK_KW, Reserved::SysML),
    ("frame", SyntaxKind::FRAME_KW, Reserved::SysML),
    ("from", SyntaxKind::FROM_KW, Reserved::Both),
    ("function", SyntaxKind::FUNCTION_KW, Reserved::KerML),
    ("hastype", SyntaxKind::HASTYPE_KW, Reserved::Both),
    ("if", SyntaxKind::IF_KW, Reserved::Both),
    ("implies", SyntaxKind::IMPLIES_KW, Reserved::Both),
    ("import", SyntaxKind::IMPORT_KW, Reserved::Both),
    ("in", SyntaxKind::IN_KW, Reserved::Both),
    ("include", SyntaxKind::INCLUDE_KW, Reserved::SysML),
    ("individual", SyntaxKind::INDIVIDUAL_KW, Reserved::SysML),
    ("inout", SyntaxKind::INOUT_KW, Reserved::Both),
    ("interaction", SyntaxKind::INTERACTION_KW, Reserved::KerML),
    ("interface", SyntaxKind::INTERFACE_KW, Reserved::SysML),
    ("intersects", SyntaxKind::INTERSECTS_KW, Reserved::KerML),
    ("inv", SyntaxKind::INV_KW, Reserved::KerML),
    ("inverse", SyntaxKind::INVERSE_KW, Reserved::KerML),
    ("inverting", SyntaxKind::INVERTING_KW, Reserved::KerML),
    ("istype", SyntaxKind::ISTYPE_KW, Reserved::Both),
    ("item", SyntaxKind::ITEM_KW, Reserved::SysML),
    ("join", SyntaxKind::JOIN_KW, Reserved::SysML),
    ("language", SyntaxKind::LANGUAGE_KW, Reserved::Both),
    ("library", SyntaxKind::LIBRARY_KW, Reserved::Both),
    ("locale", SyntaxKind::LOCALE_KW, Reserved::Both),
    ("loop", SyntaxKind::LOOP_KW, Reserved::SysML),
    ("member", SyntaxKind::MEMBER_KW, Reserved::KerML),
    ("merge", SyntaxKind::MERGE_KW, Reserved::SysML),
    ("message", SyntaxKind::MESSAGE_KW, Reserved::SysML),
    ("meta", SyntaxKind::META_KW, Reserved::Both),
    ("metaclass", SyntaxKind::METACLASS_KW, Reserved::KerML),
    ("metadata", SyntaxKind::METADATA_KW, Reserved::Both),
    ("multiplicity", SyntaxKind::MULTIPLICITY_KW, Reserved::KerML),
    ("namespace", SyntaxKind::NAMESPACE_KW, Reserved::KerML),
    ("new", SyntaxKind::NEW_KW, Reserved::Both),
    ("nonunique", SyntaxKind::NONUNIQUE_KW, Reserved::Both),
    ("not", SyntaxKind::NOT_KW, Reserved::Both),
    ("null", SyntaxKind::NULL_KW, Reserved::Both),
    ("objective", SyntaxKind::OBJECTIVE_KW, Reserved::SysML),
    ("occurrence", SyntaxKind::OCCURRENCE_KW, Reserved::SysML),
    ("of", SyntaxKind::OF_KW, Reserved::Both),
    ("or", SyntaxKind::OR_KW, Reserved::Both),
    ("ordered", SyntaxKind::ORDERED_KW, Reserved::Both),
    ("out", SyntaxKind::OUT_KW, Reserved::Both),
    ("package", SyntaxKind::PACKAGE_KW, Reserved::Both),
    ("parallel", SyntaxKind::PARALLEL_KW, Reserved::SysML),
    ("part", SyntaxKind::PART_KW, Reserved::SysML),
    ("perform", SyntaxKind::PERFORM_KW, Reserved::SysML),
    ("port", SyntaxKind::PORT_KW, Reserved::SysML),
    ("portion", SyntaxKind::PORTION_KW, Reserved::KerML),
    ("predicate", SyntaxKind::PREDICATE_KW, Reserved::KerML),
    ("private", SyntaxKind::PRIVATE_KW, Reserved::Both),
    ("protected", SyntaxKind::PROTECTED_KW, Reserved::Both),
    ("public", SyntaxKind::PUBLIC_KW, Reserved::Both),
    ("readonly", SyntaxKind::READONLY_KW, Reserved::Both),
    ("redefines", SyntaxKind::REDEFINES_KW, Reserved::Both),
    ("redefinition", SyntaxKind::REDEFINITION_KW, Reserved::KerML),
    ("ref", SyntaxKind::REF_KW, Reserved::SysML),
    ("references", SyntaxKind::REFERENCES_KW, Reserved::Both),
    ("render", SyntaxKind::RENDER_KW, Reserved::SysML),
    ("rendering", SyntaxKind::RENDERING_KW, Reserved::SysML),
    ("rep", SyntaxKind::REP_KW, Reserved::Both),
    ("require", SyntaxKind::REQUIRE_KW, Reserved::SysML),
    ("requirement", SyntaxKind::REQUIREMENT_KW, Reserved::SysML),
    ("return", SyntaxKind::RETURN_KW, Reserved::Both),
    ("satisfy", SyntaxKind::SATISFY_KW, Reserved::SysML),
    ("send", SyntaxKind::SEND_KW, Reserved::SysML),
    ("snapshot", SyntaxKind::SNAPSHOT_KW, Reserved::SysML),
    ("specialization", SyntaxKind::SPECIALIZATION_KW, Reserved::KerML),
    ("specializes", SyntaxKind::SPECIALIZES_KW, Reserved::Both),
    ("stakeholder", SyntaxKind::STAKEHOLDER_KW, Reserved::SysML),
    ("standard", SyntaxKind::STANDARD_KW, Reserved::Both),
    ("state", SyntaxKind::STATE_KW, Reserved::SysML),
    ("step", SyntaxKind::STEP_KW, Reserved::KerML),
    ("struct", SyntaxKind::STRUCT_KW, Reserved::KerML),
    ("subclassifier", SyntaxKind::SUBCLASSIFIER_KW, Reserved::KerML),
    ("subject", SyntaxKind::SUBJECT_KW, Reserved::SysML),
    ("subset", SyntaxKind::SUBSET_KW, Reserved::KerML),
    ("subsets", SyntaxKind::SUBSETS_KW, Reserved::Both),
    ("subtype", SyntaxKind::SUBTYPE_KW, Reserved::KerML),
    ("succession", SyntaxKind::SUCCESSION_KW, Reserved::Both),
    ("terminate", SyntaxKind::TERMINATE_KW, Reserved::SysML),
    ("then", SyntaxKind::THEN_KW, Reserved::Both),
    ("timeslice", SyntaxKind::TIMESLICE_KW, Reserved::SysML),
    ("to", SyntaxKind::TO_KW, Reserved::Both),
    ("transition", SyntaxKind::TRANSITION_KW, Reserved::SysML),
    ("true", SyntaxKind::TRUE_KW, Reserved::Both),
    ("type", SyntaxKind::TYPE_KW, Reserved::KerML),
    ("typed", SyntaxKind::TYPED_KW, Reserved::KerML),
    ("typing", SyntaxKind::TYPING_KW, Reserved::KerML),
    ("unions", SyntaxKind::UNIONS_KW, Reserved::KerML),
    ("until", SyntaxKind::UNTIL_KW, Reserved::SysML),
    ("use", SyntaxKind::USE_KW, Reserved::SysML),
    ("var", SyntaxKind::VAR_KW, Reserved::KerML),
    ("variant", SyntaxKind::VARIANT_KW, Reserved::SysML),
    ("variation", SyntaxKind::VARIATION_KW, Reserved::SysML),
    ("verification", SyntaxKind::VERIFICATION_KW, Reserved::SysML),
    ("verify", SyntaxKind::VERIFY_KW, Reserved::SysML),
    ("via", SyntaxKind::VIA_KW, Reserved::SysML),
    ("view", SyntaxKind::VIEW_KW, Reserved::SysML),
    ("viewpoint", SyntaxKind::VIEWPOINT_KW, Reserved::SysML),
    ("when", SyntaxKind::WHEN_KW, Reserved::SysML),
    ("while", SyntaxKind::WHILE_KW, Reserved::SysML),
    ("xor", SyntaxKind::XOR_KW, Reserved::Both),
];

/// Map identifier text to a keyword kind if `language` reserves it.
pub fn lookup(text: &str, language: Language) -> Option<SyntaxKind> {
    let idx = KEYWORDS.binary_search_by(|(kw, _, _)| (*kw).cmp(text)).ok()?;
    let (_, kind, reserved) = KEYWORDS[idx];
    reserved.includes(language).then_some(kind)
}

/// Whether `text` is reserved in either language.
pub fn is_reserved_anywhere(text: &str) -> bool {
    KEYWORDS.binary_search_by(|(kw, _, _)| (*kw).cmp(text)).is_ok()
}

/// Source text of a keyword kind.
pub fn text_of(kind: SyntaxKind) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|(_, k, _)| *k == kind)
        .map(|(text, _, _)| *text)
}

/// All keywords reserved by `language`, in alphabetical order.
pub fn reserved_words(language: Language) -> impl Iterator<Item = &'static str> {
    KEYWORDS
        .iter()
        .filter(move |(_, _, reserved)| reserved.includes(language))
        .map(|(text, _, _)| *text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sorted() {
        assert!(KEYWORDS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_table_matches_kind_range() {
        for (text, kind, _) in KEYWORDS {
            assert!(kind.is_keyword(), "{text} maps to non-keyword {kind:?}");
        }
        assert_eq!(
            KEYWORDS.len(),
            (SyntaxKind::XOR_KW as u16 - SyntaxKind::ABOUT_KW as u16 + 1) as usize
        );
    }

    #[test]
    fn test_language_specific_keywords() {
        assert_eq!(lookup("class", Language::KerML), Some(SyntaxKind::CLASS_KW));
        assert_eq!(lookup("class", Language::SysML), None);
        assert_eq!(lookup("part", Language::SysML), Some(SyntaxKind::PART_KW));
        assert_eq!(lookup("part", Language::KerML), None);
        assert_eq!(lookup("package", Language::KerML), Some(SyntaxKind::PACKAGE_KW));
        assert_eq!(lookup("package", Language::SysML), Some(SyntaxKind::PACKAGE_KW));
        assert_eq!(lookup("Package", Language::SysML), None);
    }

    #[test]
    fn test_text_of() {
        assert_eq!(text_of(SyntaxKind::SPECIALIZES_KW), Some("specializes"));
        assert_eq!(text_of(SyntaxKind::IDENT), None);
    }

    #[test]
    fn test_reserved_words_differ() {
        let kerml: Vec<_> = reserved_words(Language::KerML).collect();
        let sysml: Vec<_> = reserved_words(Language::SysML).collect();
        assert!(kerml.contains(&"struct"));
        assert!(!sysml.contains(&"struct"));
        assert!(sysml.contains(&"requirement"));
        assert!(!kerml.contains(&"requirement"));
    }
}

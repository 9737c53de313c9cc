//! Rule-based parser for testing individual grammar rules
//!
//! Parses one construct without requiring full file context: the input is
//! wrapped in the smallest enclosing declaration the construct can appear
//! in, then the whole unit is parsed.
//!
//! # Example
//!
//! ```
//! use kerml::parser::rule_parser::{Rule, parse_rule};
//!
//! let result = parse_rule(Rule::Flow, "flow f from a.x to b.y;");
//! assert!(result.is_ok());
//! ```

use super::{Parse, SyntaxError, SyntaxNode, parse_kerml, parse_sysml};
use crate::base::Language;

/// Grammar rules that can be parsed individually
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    // === Whole units ===
    KerMLFile,
    SysMLFile,

    // === Namespace members ===
    /// package = 'package' Identification Body
    Package,
    /// import = 'import' 'all'? QualifiedName ('::' '*' | '::' '**')? Filter* Body
    Import,
    /// alias = 'alias' Identification 'for' QualifiedName Body
    Alias,
    /// dependency = 'dependency' (Identification 'from')? refs 'to' refs Body
    Dependency,
    /// comment / doc / rep / metadata usage
    Annotation,

    // === KerML ===
    /// classifier declarations (`class`, `struct`, `assoc`, `function`, ...)
    Classifier,
    /// feature declarations (`feature`, `step`, `expr`, `inv`, ...)
    Feature,
    /// relationship clauses on a feature (`: T`, `:> f`, `:>> g`, ...)
    FeatureClause,
    /// standalone relationship declarations (`subclassifier A :> B;`, ...)
    Relationship,
    /// `connector`, `binding`, `succession`
    Connector,

    // === SysML ===
    Definition,
    Usage,
    /// `flow` / `succession flow` / `message`
    Flow,
    /// action body elements (`accept`, `send`, `if`, `then`, ...)
    ActionMember,
    /// state body elements (`entry`, `transition`, ...)
    StateMember,
    /// requirement body elements (`subject`, `require`, ...)
    RequirementMember,

    // === Fragments ===
    /// an owned expression, parsed as a feature value
    Expression,
    /// `[l..u]`
    Multiplicity,
}

/// Parse result for a single rule
#[derive(Debug)]
pub struct RuleParseResult {
    /// The parse result with green tree and errors
    pub parse: Parse,
    /// The rule that was parsed
    pub rule: Rule,
    /// The original input
    pub input: String,
}

impl RuleParseResult {
    /// Check if parsing succeeded without errors
    pub fn is_ok(&self) -> bool {
        self.parse.ok()
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.parse.errors
    }

    pub fn syntax(&self) -> SyntaxNode {
        self.parse.syntax()
    }

    /// Check if the input text appears in the tree unchanged
    pub fn fully_consumed(&self) -> bool {
        self.parse.syntax().text().to_string().contains(self.input.trim())
    }
}

/// Parse a specific grammar rule
pub fn parse_rule(rule: Rule, input: &str) -> RuleParseResult {
    let (wrapped, language) = wrap_for_rule(rule, input);
    let parse = match language {
        Language::KerML => parse_kerml(&wrapped),
        Language::SysML => parse_sysml(&wrapped),
    };
    RuleParseResult {
        parse,
        rule,
        input: input.to_string(),
    }
}

/// Wrap input in appropriate context for the given rule
fn wrap_for_rule(rule: Rule, input: &str) -> (String, Language) {
    match rule {
        Rule::KerMLFile => (input.to_string(), Language::KerML),
        Rule::SysMLFile => (input.to_string(), Language::SysML),

        Rule::Package => (input.to_string(), Language::SysML),
        Rule::Import | Rule::Alias | Rule::Dependency | Rule::Annotation | Rule::Definition => {
            (format!("package __Test__ {{ {input} }}"), Language::SysML)
        }

        Rule::Classifier | Rule::Relationship => {
            (format!("package __Test__ {{ {input} }}"), Language::KerML)
        }
        Rule::Feature | Rule::Connector => {
            (format!("class __Test__ {{ {input} }}"), Language::KerML)
        }
        Rule::FeatureClause => (
            format!("class __Test__ {{ feature x {input} ; }}"),
            Language::KerML,
        ),

        Rule::Usage | Rule::Flow => (format!("part def __Test__ {{ {input} }}"), Language::SysML),
        Rule::ActionMember => (
            format!("action def __Test__ {{ {input} }}"),
            Language::SysML,
        ),
        Rule::StateMember => (format!("state def __Test__ {{ {input} }}"), Language::SysML),
        Rule::RequirementMember => (
            format!("requirement def __Test__ {{ {input} }}"),
            Language::SysML,
        ),

        Rule::Expression => (
            format!("class __Test__ {{ feature x = {input}; }}"),
            Language::KerML,
        ),
        Rule::Multiplicity => (
            format!("class __Test__ {{ feature x {input}; }}"),
            Language::KerML,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flow() {
        let result = parse_rule(Rule::Flow, "flow myFlow from a.x to b.y;");
        assert!(result.is_ok(), "Failed to parse flow: {:?}", result.errors());
        assert!(result.fully_consumed());
    }

    #[test]
    fn test_parse_connector() {
        let result = parse_rule(Rule::Connector, "connector from x to y;");
        assert!(result.is_ok(), "Failed to parse connector: {:?}", result.errors());
    }

    #[test]
    fn test_parse_class() {
        let result = parse_rule(Rule::Classifier, "class MyClass specializes Base;");
        assert!(result.is_ok(), "Failed to parse class: {:?}", result.errors());
    }

    #[test]
    fn test_parse_feature() {
        let result = parse_rule(Rule::Feature, "feature x : Integer[1];");
        assert!(result.is_ok(), "Failed to parse feature: {:?}", result.errors());
    }

    #[test]
    fn test_parse_operator_expression() {
        let result = parse_rule(Rule::Expression, "a + b * c");
        assert!(result.is_ok(), "Failed to parse expression: {:?}", result.errors());
    }

    #[test]
    fn test_parse_succession() {
        let result = parse_rule(Rule::Connector, "succession a then b;");
        assert!(result.is_ok(), "Failed to parse succession: {:?}", result.errors());
    }

    #[test]
    fn test_parse_rejects_missing_semicolon() {
        let result = parse_rule(Rule::Usage, "part p : P");
        assert!(!result.is_ok());
        assert_eq!(result.errors().len(), 1);
    }
}

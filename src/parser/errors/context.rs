//! Parse context tracking for context-aware error messages
//!
//! The parser keeps a stack of the bodies it is inside. When a member
//! cannot be started, the innermost context picks the error code and the
//! wording of the message.

use super::codes::ErrorCode;

/// The kind of body currently being parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseContext {
    /// At the top level of a file
    TopLevel,
    /// Inside a package or namespace body
    NamespaceBody,
    /// Inside a type or usage body with no behavior of its own
    TypeBody,
    /// Inside an action or behavior body
    ActionBody,
    /// Inside a state body
    StateBody,
    /// Inside a requirement, constraint or case body
    RequirementBody,
    /// Inside a calculation, function or expression body
    FunctionBody,
}

impl ParseContext {
    /// Human-readable description for error messages
    pub fn description(&self) -> &'static str {
        match self {
            Self::TopLevel => "at top level",
            Self::NamespaceBody => "in namespace body",
            Self::TypeBody => "in definition body",
            Self::ActionBody => "in action body",
            Self::StateBody => "in state body",
            Self::RequirementBody => "in requirement body",
            Self::FunctionBody => "in function body",
        }
    }

    /// What the context accepts
    pub fn expected_description(&self) -> &'static str {
        match self {
            Self::TopLevel | Self::NamespaceBody => {
                "a package, definition, usage, import or comment"
            }
            Self::TypeBody => "a feature, usage or nested definition",
            Self::ActionBody => "an action element (accept, send, if, then, perform, ...)",
            Self::StateBody => "a state element (entry, do, exit) or a transition",
            Self::RequirementBody => "a requirement element (subject, require, assume, ...)",
            Self::FunctionBody => "a parameter, feature or result expression",
        }
    }

    /// Error code for a member that cannot start in this context
    pub fn member_error_code(&self) -> ErrorCode {
        match self {
            Self::ActionBody => ErrorCode::E0701,
            Self::StateBody => ErrorCode::E0702,
            Self::RequirementBody => ErrorCode::E0801,
            _ => ErrorCode::E0901,
        }
    }

    /// Whether a trailing result expression may end the body
    pub fn allows_result_expression(&self) -> bool {
        matches!(self, Self::FunctionBody | Self::RequirementBody)
    }

    /// Whether action-level statements (succession, control nodes) apply
    pub fn is_behavioral(&self) -> bool {
        matches!(self, Self::ActionBody | Self::StateBody)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_descriptions() {
        assert_eq!(ParseContext::TopLevel.description(), "at top level");
        assert_eq!(ParseContext::StateBody.description(), "in state body");
        assert!(ParseContext::ActionBody
            .expected_description()
            .contains("accept"));
    }

    #[test]
    fn test_member_error_codes() {
        assert_eq!(ParseContext::ActionBody.member_error_code(), ErrorCode::E0701);
        assert_eq!(ParseContext::StateBody.member_error_code(), ErrorCode::E0702);
        assert_eq!(
            ParseContext::RequirementBody.member_error_code(),
            ErrorCode::E0801
        );
        assert_eq!(ParseContext::TypeBody.member_error_code(), ErrorCode::E0901);
    }

    #[test]
    fn test_result_expressions_only_in_function_like_bodies() {
        assert!(ParseContext::FunctionBody.allows_result_expression());
        assert!(ParseContext::RequirementBody.allows_result_expression());
        assert!(!ParseContext::NamespaceBody.allows_result_expression());
    }
}

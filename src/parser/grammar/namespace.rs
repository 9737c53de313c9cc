//! Namespace-level members: packages, imports, aliases, dependencies,
//! annotations and the member dispatcher.

use super::*;

/// Member = Visibility? PrefixMetadata* MemberElement
///
/// Visibility and prefix metadata are consumed first; the element function
/// then opens its node at the member checkpoint so those tokens belong to it.
pub(super) fn parse_member(p: &mut Parser<'_>) -> PResult {
    let cp = p.checkpoint();
    let has_visibility = p.eat_visibility();
    parse_prefix_metadata(p)?;

    match p.current() {
        SyntaxKind::PACKAGE_KW => parse_package(p, cp),
        SyntaxKind::LIBRARY_KW | SyntaxKind::STANDARD_KW => parse_library_package(p, cp),
        SyntaxKind::NAMESPACE_KW => parse_namespace(p, cp),
        SyntaxKind::IMPORT_KW | SyntaxKind::EXPOSE_KW => parse_import(p, cp),
        SyntaxKind::ALIAS_KW => parse_alias(p, cp),
        SyntaxKind::DEPENDENCY_KW => parse_dependency(p, cp),
        SyntaxKind::COMMENT_KW | SyntaxKind::REGULAR_COMMENT => parse_comment(p, cp),
        SyntaxKind::DOC_KW => parse_documentation(p, cp),
        SyntaxKind::REP_KW | SyntaxKind::LANGUAGE_KW => parse_textual_rep(p, cp),
        SyntaxKind::AT => parse_metadata_usage(p, cp),
        SyntaxKind::METADATA_KW if p.nth(1) != SyntaxKind::DEF_KW => {
            parse_metadata_usage(p, cp)
        }
        SyntaxKind::FILTER_KW => parse_filter_member(p, cp),
        kind if relationships::RELATIONSHIP_DECL_KEYWORDS.contains(&kind) => {
            relationships::parse_relationship_decl(p, cp)
        }
        SyntaxKind::R_BRACE if p.context() == ParseContext::TopLevel => {
            Err(p.error(ErrorCode::E0205, "unexpected '}' at top level"))
        }
        _ => usages::parse_definition_or_usage(p, cp, has_visibility),
    }
}

impl Parser<'_> {
    fn eat_visibility(&mut self) -> bool {
        if self.at_any(VISIBILITY) {
            self.bump();
            true
        } else {
            false
        }
    }
}

/// PrefixMetadata = ('#' QualifiedName)*
pub(super) fn parse_prefix_metadata(p: &mut Parser<'_>) -> PResult {
    while p.at(SyntaxKind::HASH) {
        p.start_node(SyntaxKind::PREFIX_METADATA);
        p.bump();
        parse_qualified_name(p)?;
        p.finish_node();
    }
    Ok(())
}

/// Package = 'package' Identification Body
fn parse_package(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::PACKAGE);
    p.bump();
    parse_identification(p)?;
    parse_body(p, ParseContext::NamespaceBody)?;
    p.finish_node();
    Ok(())
}

/// LibraryPackage = 'standard'? 'library' 'package' Identification Body
fn parse_library_package(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::LIBRARY_PACKAGE);
    p.eat(SyntaxKind::STANDARD_KW);
    p.expect(SyntaxKind::LIBRARY_KW)?;
    p.expect(SyntaxKind::PACKAGE_KW)?;
    parse_identification(p)?;
    parse_body(p, ParseContext::NamespaceBody)?;
    p.finish_node();
    Ok(())
}

/// Namespace = 'namespace' Identification Body
fn parse_namespace(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::NAMESPACE_DECL);
    p.bump();
    parse_identification(p)?;
    parse_body(p, ParseContext::NamespaceBody)?;
    p.finish_node();
    Ok(())
}

/// Import = ('import' | 'expose') 'all'? ImportedReference FilterCondition* Body
/// ImportedReference = QualifiedName ('::' '*' | '::' '**' | '::' '*' '::' '**')?
fn parse_import(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::IMPORT);
    p.bump();
    p.eat(SyntaxKind::ALL_KW);
    if !at_qualified_name(p) {
        return Err(p.error_expected(ErrorCode::E0501, &["import path".to_string()]));
    }
    parse_qualified_name(p)?;

    if p.at(SyntaxKind::COLON_COLON) {
        p.bump();
        match p.current() {
            SyntaxKind::STAR_STAR => p.bump(),
            SyntaxKind::STAR => {
                p.bump();
                if p.at(SyntaxKind::COLON_COLON) && p.nth(1) == SyntaxKind::STAR_STAR {
                    p.bump();
                    p.bump();
                }
            }
            _ => {
                return Err(p.error_expected(
                    ErrorCode::E0501,
                    &["'*'".to_string(), "'**'".to_string()],
                ));
            }
        }
    }

    while p.at(SyntaxKind::L_BRACKET) {
        p.start_node(SyntaxKind::FILTER_CONDITION);
        p.bump();
        if !can_start_expression(p.current()) {
            return Err(p.error_expected(ErrorCode::E0504, &["filter expression".to_string()]));
        }
        parse_expression(p)?;
        p.expect(SyntaxKind::R_BRACKET)?;
        p.finish_node();
    }

    parse_body(p, ParseContext::NamespaceBody)?;
    p.finish_node();
    Ok(())
}

/// Alias = 'alias' Identification 'for' QualifiedName Body
fn parse_alias(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::ALIAS_MEMBER);
    p.bump();
    if !at_identification(p) {
        return Err(p.error_expected(ErrorCode::E0503, &["alias name".to_string()]));
    }
    parse_identification(p)?;
    p.expect(SyntaxKind::FOR_KW)?;
    if !at_qualified_name(p) {
        return Err(p.error_expected(ErrorCode::E0503, &["alias target".to_string()]));
    }
    parse_qualified_name(p)?;
    parse_body(p, ParseContext::NamespaceBody)?;
    p.finish_node();
    Ok(())
}

/// Dependency = 'dependency' (Identification 'from')? References 'to' References Body
fn parse_dependency(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::DEPENDENCY);
    p.bump();
    if has_from_before_to(p) {
        parse_identification(p)?;
        p.expect(SyntaxKind::FROM_KW)?;
    }
    parse_reference_list(p)?;
    p.expect(SyntaxKind::TO_KW)?;
    parse_reference_list(p)?;
    parse_body(p, ParseContext::NamespaceBody)?;
    p.finish_node();
    Ok(())
}

/// Whether a `from` comes before the `to` of a dependency.
fn has_from_before_to(p: &Parser<'_>) -> bool {
    (0..).map(|n| p.nth(n)).find_map(|kind| match kind {
        SyntaxKind::FROM_KW => Some(true),
        SyntaxKind::TO_KW | SyntaxKind::SEMICOLON | SyntaxKind::L_BRACE | SyntaxKind::EOF => {
            Some(false)
        }
        _ => None,
    }) == Some(true)
}

/// Comment = ('comment' Identification ('about' References)? ('locale' STRING)?)? REGULAR_COMMENT
fn parse_comment(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::COMMENT_ELEMENT);
    if p.eat(SyntaxKind::COMMENT_KW) {
        parse_identification(p)?;
        if p.at(SyntaxKind::ABOUT_KW) {
            parse_about_clause(p)?;
        }
        parse_locale(p)?;
    }
    p.expect(SyntaxKind::REGULAR_COMMENT)?;
    p.finish_node();
    Ok(())
}

/// Documentation = 'doc' Identification ('locale' STRING)? REGULAR_COMMENT
fn parse_documentation(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::DOCUMENTATION);
    p.bump();
    parse_identification(p)?;
    parse_locale(p)?;
    p.expect(SyntaxKind::REGULAR_COMMENT)?;
    p.finish_node();
    Ok(())
}

/// TextualRepresentation = ('rep' Identification)? 'language' STRING REGULAR_COMMENT
fn parse_textual_rep(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::TEXTUAL_REP);
    if p.eat(SyntaxKind::REP_KW) {
        parse_identification(p)?;
    }
    p.expect(SyntaxKind::LANGUAGE_KW)?;
    p.expect(SyntaxKind::STRING)?;
    p.expect(SyntaxKind::REGULAR_COMMENT)?;
    p.finish_node();
    Ok(())
}

fn parse_locale(p: &mut Parser<'_>) -> PResult {
    if p.eat(SyntaxKind::LOCALE_KW) {
        p.expect(SyntaxKind::STRING)?;
    }
    Ok(())
}

/// AboutClause = 'about' References
fn parse_about_clause(p: &mut Parser<'_>) -> PResult {
    p.start_node(SyntaxKind::ABOUT_CLAUSE);
    p.bump();
    parse_reference_list(p)?;
    p.finish_node();
    Ok(())
}

/// MetadataUsage = ('@' | 'metadata') (Identification (':' | 'typed' 'by'))?
///     QualifiedName ('about' References)? Body
fn parse_metadata_usage(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::METADATA_USAGE);
    p.bump();

    let named = p.at(SyntaxKind::IDENT)
        && matches!(p.nth(1), SyntaxKind::COLON | SyntaxKind::TYPED_KW);
    if named || (p.at(SyntaxKind::LT) && at_identification(p)) {
        parse_identification(p)?;
        if !p.eat(SyntaxKind::COLON) {
            p.expect(SyntaxKind::TYPED_KW)?;
            p.expect(SyntaxKind::BY_KW)?;
        }
    }

    if !at_qualified_name(p) {
        return Err(p.error_expected(ErrorCode::E0305, &["metadata type".to_string()]));
    }
    p.start_node(SyntaxKind::TYPING);
    parse_qualified_name(p)?;
    p.finish_node();

    if p.at(SyntaxKind::ABOUT_KW) {
        parse_about_clause(p)?;
    }
    parse_body(p, ParseContext::TypeBody)?;
    p.finish_node();
    Ok(())
}

/// FilterMember = 'filter' OwnedExpression ';'
fn parse_filter_member(p: &mut Parser<'_>, cp: Checkpoint) -> PResult {
    p.start_node_at(cp, SyntaxKind::FILTER_MEMBER);
    p.bump();
    if !can_start_expression(p.current()) {
        return Err(p.error_expected(ErrorCode::E0504, &["filter expression".to_string()]));
    }
    parse_expression(p)?;
    p.expect(SyntaxKind::SEMICOLON)?;
    p.finish_node();
    Ok(())
}

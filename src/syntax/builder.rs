//! Lowers a CST into the arena [`Model`].
//!
//! Members are visited in source order and every element is allocated
//! before its children, so element ids follow a pre-order traversal.
//! `ERROR` nodes left by recovery are skipped. Left-nested expression
//! chains are lowered with an explicit spine instead of recursion.

use rowan::NodeOrToken;
use text_size::TextRange;
use tracing::trace;

use super::model::*;
use super::unparse::escape_name;
use crate::base::{Interner, Language, Name};
use crate::parser::ast::{
    self, AstNode, NamespaceBody, QualifiedName, ReferenceNode, comment_text, direct_tokens,
    has_token, keyword_kinds, name_text, references, string_value,
};
use crate::parser::{ErrorCode, SyntaxError, SyntaxKind, SyntaxNode};

/// Build the model for a parsed unit.
pub(crate) fn build(root: &SyntaxNode, language: Language) -> (Model, Vec<SyntaxError>) {
    let mut builder = Builder::new(language);
    let model_root = builder.model.root();
    builder.model.elements[model_root].range = root.text_range();
    for member in root.children().filter(|n| n.kind() != SyntaxKind::ERROR) {
        builder.member(model_root, &member);
    }
    trace!(
        elements = builder.model.elements.len(),
        relationships = builder.model.relationships.len(),
        exprs = builder.model.exprs.len(),
        "built model"
    );
    (builder.model, builder.errors)
}

/// Build a model whose root holds one expression.
pub(crate) fn build_expression(
    root: &SyntaxNode,
    language: Language,
) -> (Model, Option<ExprId>, Vec<SyntaxError>) {
    let mut builder = Builder::new(language);
    let model_root = builder.model.root();
    builder.model.elements[model_root].range = root.text_range();
    let expr = root
        .children()
        .find(|n| n.kind().is_expr())
        .map(|node| builder.expr(&node, model_root));
    (builder.model, expr, builder.errors)
}

struct Builder {
    model: Model,
    language: Language,
    interner: Interner,
    errors: Vec<SyntaxError>,
}

impl Builder {
    fn new(language: Language) -> Self {
        Self {
            model: Model::new(),
            language,
            interner: Interner::new(),
            errors: Vec::new(),
        }
    }

    // ========================================================================
    // Elements and names
    // ========================================================================

    /// Allocate an element for `node` and make it an owned member of `owner`.
    ///
    /// The name and short name are read from the node's direct `NAME` and
    /// `SHORT_NAME` children; prefix metadata becomes owned annotations.
    fn new_element(
        &mut self,
        owner: ElementId,
        visibility: Visibility,
        kind: ElementKind,
        node: &SyntaxNode,
    ) -> ElementId {
        let mut element = Element::new(kind, Some(owner), node.text_range());
        element.visibility = visibility;
        let id = self.model.elements.alloc(element);
        let index = self.add_member(owner, visibility, Member::Owned(id));

        let short_name = node.children().find_map(ast::ShortName::cast);
        let name = node.children().find_map(ast::Name::cast);
        if let Some(short) = &short_name {
            if let Some(text) = short.text() {
                let text = self.interner.intern(&text);
                self.register(owner, &text, index, short.syntax().text_range());
                self.model.elements[id].short_name = Some(text);
            }
        }
        if let Some(name) = &name {
            if let Some(text) = name.text() {
                let text = self.interner.intern(&text);
                self.register(owner, &text, index, name.syntax().text_range());
                self.model.elements[id].name = Some(text);
            }
        }
        self.model.elements[id].qualified_name = self.qualified_name(id);

        for prefix in node
            .children()
            .filter(|n| n.kind() == SyntaxKind::PREFIX_METADATA)
        {
            if let Some(qn) = prefix.children().find_map(QualifiedName::cast) {
                let metaclass = self.qn_reference(&qn, owner);
                let annotation = ElementKind::Annotation(Annotation::MetadataUsage {
                    metaclass,
                    about: Vec::new(),
                });
                let meta = self.new_element(id, Visibility::Public, annotation, &prefix);
                self.model.elements[id].annotations.push(meta);
            }
        }
        id
    }

    fn add_member(&mut self, owner: ElementId, visibility: Visibility, member: Member) -> usize {
        let members = &mut self.model.elements[owner].members;
        members.push(Membership { visibility, member });
        members.len() - 1
    }

    /// Enter `name` in the scope of `owner`; the first declaration wins.
    fn register(&mut self, owner: ElementId, name: &Name, index: usize, range: TextRange) {
        let scope = self.model.scope_mut(owner);
        if scope.contains_key(name) {
            self.errors.push(
                SyntaxError::new(
                    format!("duplicate name '{name}' in the same namespace"),
                    range,
                    ErrorCode::W0301,
                )
                .with_hint("later declarations with this name are not reachable by name"),
            );
        } else {
            scope.insert(name.clone(), index);
        }
    }

    fn qualified_name(&mut self, id: ElementId) -> Option<Name> {
        let element = self.model.element(id);
        let own = element.name.as_ref().or(element.short_name.as_ref())?;
        let own = escape_name(own, self.language);
        let owner = element.owner?;
        if owner == self.model.root() {
            return Some(self.interner.intern(&own));
        }
        let parent = self.model.element(owner).qualified_name.as_ref()?;
        let joined = format!("{parent}::{own}");
        Some(self.interner.intern(&joined))
    }

    fn owner_of(&self, id: ElementId) -> ElementId {
        self.model.element(id).owner.unwrap_or(self.model.root())
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn member(&mut self, owner: ElementId, node: &SyntaxNode) {
        let visibility = visibility_of(node);
        match node.kind() {
            SyntaxKind::PACKAGE | SyntaxKind::LIBRARY_PACKAGE | SyntaxKind::NAMESPACE_DECL => {
                self.namespace(owner, node, visibility)
            }
            SyntaxKind::IMPORT => self.import(owner, node, visibility),
            SyntaxKind::ALIAS_MEMBER => self.alias(owner, node, visibility),
            SyntaxKind::DEPENDENCY => self.dependency(owner, node, visibility),
            SyntaxKind::COMMENT_ELEMENT
            | SyntaxKind::DOCUMENTATION
            | SyntaxKind::TEXTUAL_REP
            | SyntaxKind::METADATA_USAGE => self.annotation(owner, node, visibility),
            SyntaxKind::FILTER_MEMBER => {
                if let Some(expr) = first_expr(node) {
                    let expr = self.expr(&expr, owner);
                    self.add_member(owner, visibility, Member::Filter(expr));
                }
            }
            SyntaxKind::RELATIONSHIP_DECL => self.relationship_decl(owner, node, visibility),
            SyntaxKind::DEFINITION => self.definition(owner, node, visibility),
            SyntaxKind::USAGE => {
                self.usage(owner, node, visibility);
            }
            SyntaxKind::RESULT_EXPRESSION => {
                if let Some(expr) = first_expr(node) {
                    let expr = self.expr(&expr, owner);
                    self.model.elements[owner].result = Some(expr);
                }
            }
            _ => {}
        }
    }

    /// Members of the node's `{ ... }` body, if it has one.
    fn body(&mut self, id: ElementId, node: &SyntaxNode) {
        if let Some(body) = node.children().find_map(NamespaceBody::cast) {
            self.body_members(id, &body);
        }
    }

    fn body_members(&mut self, id: ElementId, body: &NamespaceBody) {
        for member in body.members() {
            self.member(id, &member);
        }
    }

    fn namespace(&mut self, owner: ElementId, node: &SyntaxNode, visibility: Visibility) {
        let kind = match node.kind() {
            SyntaxKind::PACKAGE => ElementKind::Package,
            SyntaxKind::LIBRARY_PACKAGE => ElementKind::LibraryPackage {
                standard: has_token(node, SyntaxKind::STANDARD_KW),
            },
            _ => ElementKind::Namespace,
        };
        let id = self.new_element(owner, visibility, kind, node);
        self.body(id, node);
    }

    fn import(&mut self, owner: ElementId, node: &SyntaxNode, visibility: Visibility) {
        let Some(qn) = node.children().find_map(QualifiedName::cast) else {
            return;
        };
        let target = self.qn_reference(&qn, owner);
        let star = has_token(node, SyntaxKind::STAR);
        let star_star = has_token(node, SyntaxKind::STAR_STAR);
        let kind = match (star, star_star) {
            (true, true) => ImportKind::NamespaceRecursive,
            (false, true) => ImportKind::Recursive,
            (true, false) => ImportKind::Namespace,
            (false, false) => ImportKind::Member,
        };
        let conditions: Vec<SyntaxNode> = node
            .children()
            .filter(|n| n.kind() == SyntaxKind::FILTER_CONDITION)
            .filter_map(|condition| first_expr(&condition))
            .collect();
        let filters = conditions.iter().map(|expr| self.expr(expr, owner)).collect();
        let import = Import {
            target,
            all: has_token(node, SyntaxKind::ALL_KW),
            kind,
            filters,
            expose: has_token(node, SyntaxKind::EXPOSE_KW),
            range: node.text_range(),
        };
        self.add_member(owner, visibility, Member::Import(import));
    }

    fn alias(&mut self, owner: ElementId, node: &SyntaxNode, visibility: Visibility) {
        let Some(qn) = node.children().find_map(QualifiedName::cast) else {
            return;
        };
        let target = self.qn_reference(&qn, owner);
        let short = node.children().find_map(ast::ShortName::cast);
        let name = node.children().find_map(ast::Name::cast);
        let short_text = short.as_ref().and_then(|s| s.text()).map(|t| self.interner.intern(&t));
        let name_text = name.as_ref().and_then(|n| n.text()).map(|t| self.interner.intern(&t));

        let alias = Alias {
            name: name_text.clone(),
            short_name: short_text.clone(),
            target,
            range: node.text_range(),
        };
        let index = self.add_member(owner, visibility, Member::Alias(alias));
        if let (Some(text), Some(short)) = (&short_text, &short) {
            self.register(owner, text, index, short.syntax().text_range());
        }
        if let (Some(text), Some(name)) = (&name_text, &name) {
            self.register(owner, text, index, name.syntax().text_range());
        }
    }

    fn dependency(&mut self, owner: ElementId, node: &SyntaxNode, visibility: Visibility) {
        let mut clients = Vec::new();
        let mut suppliers = Vec::new();
        let mut after_to = false;
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Token(token) if token.kind() == SyntaxKind::TO_KW => after_to = true,
                NodeOrToken::Node(child) => {
                    if let Some(reference) = ReferenceNode::cast(child) {
                        let reference = self.reference(&reference, owner);
                        if after_to {
                            suppliers.push(reference);
                        } else {
                            clients.push(reference);
                        }
                    }
                }
                NodeOrToken::Token(_) => {}
            }
        }

        let placeholder = ElementKind::Dependency(DependencyDecl {
            clients: Vec::new(),
            suppliers: Vec::new(),
            relationships: Vec::new(),
        });
        let id = self.new_element(owner, visibility, placeholder, node);
        let mut relationships = Vec::with_capacity(clients.len() * suppliers.len());
        for client in &clients {
            for supplier in &suppliers {
                relationships.push(self.model.relationships.alloc(Relationship {
                    kind: RelationshipKind::Dependency,
                    source: Endpoint::Reference(client.clone()),
                    target: supplier.clone(),
                    conjugated: false,
                    declared_as: Some(id),
                    range: node.text_range(),
                }));
            }
        }
        self.model.elements[id].kind = ElementKind::Dependency(DependencyDecl {
            clients,
            suppliers,
            relationships,
        });
        self.body(id, node);
    }

    fn annotation(&mut self, owner: ElementId, node: &SyntaxNode, visibility: Visibility) {
        let about: Vec<Reference> = node
            .children()
            .find(|n| n.kind() == SyntaxKind::ABOUT_CLAUSE)
            .map(|clause| {
                references(&clause)
                    .iter()
                    .map(|r| self.reference(r, owner))
                    .collect()
            })
            .unwrap_or_default();
        let body = direct_tokens(node)
            .find(|t| t.kind() == SyntaxKind::REGULAR_COMMENT)
            .map(|t| comment_text(t.text()))
            .unwrap_or_default();
        let string = direct_tokens(node)
            .find(|t| t.kind() == SyntaxKind::STRING)
            .map(|t| string_value(t.text()));

        let annotation = match node.kind() {
            SyntaxKind::COMMENT_ELEMENT => Annotation::Comment {
                about,
                locale: string,
                body,
            },
            SyntaxKind::DOCUMENTATION => Annotation::Documentation {
                locale: string,
                body,
            },
            SyntaxKind::TEXTUAL_REP => Annotation::TextualRepresentation {
                language: string.unwrap_or_default(),
                body,
            },
            _ => {
                let Some(qn) = node
                    .children()
                    .find(|n| n.kind() == SyntaxKind::TYPING)
                    .and_then(|typing| typing.children().find_map(QualifiedName::cast))
                else {
                    return;
                };
                Annotation::MetadataUsage {
                    metaclass: self.qn_reference(&qn, owner),
                    about,
                }
            }
        };
        let id = self.new_element(owner, visibility, ElementKind::Annotation(annotation), node);
        self.model.elements[owner].annotations.push(id);
        self.body(id, node);
    }

    fn relationship_decl(&mut self, owner: ElementId, node: &SyntaxNode, visibility: Visibility) {
        let Some(clause) = node.children().find(|n| clause_kind(n.kind()).is_some()) else {
            return;
        };
        let refs = references(&clause);
        let [source, target] = refs.as_slice() else {
            return;
        };
        let kind = match clause.kind() {
            SyntaxKind::SPECIALIZATION if has_token(node, SyntaxKind::SUBCLASSIFIER_KW) => {
                RelationshipKind::Subclassification
            }
            other => clause_kind(other).unwrap_or(RelationshipKind::Specialization),
        };
        let source = self.reference(source, owner);
        let target = self.reference(target, owner);

        let placeholder = ElementKind::Namespace;
        let id = self.new_element(owner, visibility, placeholder, node);
        let relationship = self.model.relationships.alloc(Relationship {
            kind,
            source: Endpoint::Reference(source),
            target,
            conjugated: false,
            declared_as: Some(id),
            range: clause.text_range(),
        });
        self.model.elements[id].kind = ElementKind::Relationship(relationship);
        self.body(id, node);
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn definition(&mut self, owner: ElementId, node: &SyntaxNode, visibility: Visibility) {
        let keywords = keyword_kinds(node);
        let kind = type_kind(&keywords);
        let placeholder = ElementKind::Namespace;
        let id = self.new_element(owner, visibility, placeholder, node);

        let specialization = if kind == TypeKind::Type {
            RelationshipKind::Specialization
        } else {
            RelationshipKind::Subclassification
        };
        let (relationships, multiplicity) = self.clauses(id, node, specialization);
        let decl = TypeDecl {
            kind,
            is_abstract: keywords.contains(&SyntaxKind::ABSTRACT_KW),
            is_sufficient: keywords.contains(&SyntaxKind::ALL_KW),
            is_variation: keywords.contains(&SyntaxKind::VARIATION_KW),
            is_individual: keywords.contains(&SyntaxKind::INDIVIDUAL_KW),
            multiplicity,
            relationships,
        };
        self.model.elements[id].kind = ElementKind::Type(decl);
        self.body(id, node);
    }

    // ========================================================================
    // Relationship clauses
    // ========================================================================

    /// Relationship clauses and multiplicity among the direct children of
    /// `node`, all starting from element `id`.
    fn clauses(
        &mut self,
        id: ElementId,
        node: &SyntaxNode,
        specialization: RelationshipKind,
    ) -> (Vec<RelationshipId>, Option<Multiplicity>) {
        let scope = self.owner_of(id);
        let mut relationships = Vec::new();
        let mut multiplicity = None;
        for child in node.children() {
            if child.kind() == SyntaxKind::MULTIPLICITY {
                if let Some(m) = ast::Multiplicity::cast(child) {
                    multiplicity = self.multiplicity(&m, id);
                }
                continue;
            }
            let kind = match child.kind() {
                SyntaxKind::SPECIALIZATION => specialization,
                other => match clause_kind(other) {
                    Some(kind) => kind,
                    None => continue,
                },
            };
            let mut conjugated = false;
            for part in child.children_with_tokens() {
                match part {
                    NodeOrToken::Token(token) if token.kind() == SyntaxKind::TILDE => {
                        conjugated = kind == RelationshipKind::FeatureTyping;
                    }
                    NodeOrToken::Node(part) => {
                        if let Some(reference) = ReferenceNode::cast(part) {
                            let target = self.reference(&reference, scope);
                            relationships.push(self.relate(
                                kind,
                                id,
                                target,
                                conjugated,
                                reference.syntax().text_range(),
                            ));
                            conjugated = false;
                        }
                    }
                    NodeOrToken::Token(_) => {}
                }
            }
        }
        (relationships, multiplicity)
    }

    fn relate(
        &mut self,
        kind: RelationshipKind,
        source: ElementId,
        target: Reference,
        conjugated: bool,
        range: TextRange,
    ) -> RelationshipId {
        self.model.relationships.alloc(Relationship {
            kind,
            source: Endpoint::Element(source),
            target,
            conjugated,
            declared_as: None,
            range,
        })
    }

    fn multiplicity(&mut self, node: &ast::Multiplicity, scope: ElementId) -> Option<Multiplicity> {
        let bounds = node.bounds();
        match bounds.as_slice() {
            [single] => Some(match self.bound(single, scope) {
                Bound::Literal(n) => Multiplicity::exactly(n),
                Bound::Unbounded => Multiplicity::range(Bound::Literal(0), Bound::Unbounded),
                bound @ Bound::Expr(_) => Multiplicity::range(bound, bound),
            }),
            [lower, upper] => {
                let lower = self.bound(lower, scope);
                let upper = self.bound(upper, scope);
                Some(Multiplicity::range(lower, upper))
            }
            _ => None,
        }
    }

    fn bound(&mut self, node: &SyntaxNode, scope: ElementId) -> Bound {
        if node.kind() == SyntaxKind::LITERAL_EXPR {
            if let Some(token) = direct_tokens(node).next() {
                match token.kind() {
                    SyntaxKind::STAR => return Bound::Unbounded,
                    SyntaxKind::INTEGER => {
                        if let Ok(n) = token.text().parse::<u64>() {
                            return Bound::Literal(n);
                        }
                    }
                    _ => {}
                }
            }
        }
        Bound::Expr(self.expr(node, scope))
    }

    // ========================================================================
    // Features
    // ========================================================================

    fn usage(&mut self, owner: ElementId, node: &SyntaxNode, visibility: Visibility) -> ElementId {
        let tokens: Vec<SyntaxKind> = direct_tokens(node).map(|t| t.kind()).collect();
        let prefix_len = tokens.iter().take_while(|k| is_prefix_token(**k)).count();
        let (prefix, rest) = tokens.split_at(prefix_len);

        let head = rest.iter().copied().find(|k| behavior_head(*k).is_some());
        let role = rest.iter().copied().find_map(role_of);
        let kinds: Vec<SyntaxKind> = rest.iter().copied().filter(|k| is_kind_keyword(*k)).collect();
        let has_child = |kind: SyntaxKind| node.children().any(|n| n.kind() == kind);
        let connector_lead = node
            .children()
            .find(|n| n.kind() == SyntaxKind::CONNECTOR_PART)
            .and_then(|part| direct_tokens(&part).next())
            .map(|t| t.kind());
        let is_shorthand_succession = head.is_none()
            && kinds.is_empty()
            && role.is_none()
            && has_child(SyntaxKind::SUCCESSION_TARGET);
        let is_transition = head == Some(SyntaxKind::TRANSITION_KW)
            || (head == Some(SyntaxKind::ACCEPT_KW)
                && (has_child(SyntaxKind::GUARD)
                    || has_child(SyntaxKind::EFFECT)
                    || has_child(SyntaxKind::SUCCESSION_TARGET)));

        let direction = prefix.iter().find_map(|k| match k {
            SyntaxKind::IN_KW => Some(Direction::In),
            SyntaxKind::OUT_KW | SyntaxKind::RETURN_KW => Some(Direction::Out),
            SyntaxKind::INOUT_KW => Some(Direction::InOut),
            _ => None,
        });
        let in_enumeration = matches!(
            self.model.element(owner).as_type().map(|t| t.kind),
            Some(TypeKind::Enumeration)
        );

        let kind = if is_transition {
            FeatureKind::Transition
        } else if let Some(head) = head.and_then(behavior_head) {
            head
        } else if is_shorthand_succession {
            FeatureKind::Succession
        } else if let Some(kind) = feature_kind(&kinds, self.language, in_enumeration) {
            kind
        } else if let Some(kind) = connector_lead.and_then(connector_shorthand_kind) {
            kind
        } else if let Some(role) = role {
            role_kind(role)
        } else if in_enumeration {
            FeatureKind::EnumerationValue
        } else if direction.is_some() {
            FeatureKind::Parameter
        } else if self.language == Language::KerML {
            FeatureKind::Feature
        } else {
            FeatureKind::Reference
        };

        let has = |kind: SyntaxKind| tokens.contains(&kind);
        let modifiers = FeatureModifiers {
            is_abstract: prefix.contains(&SyntaxKind::ABSTRACT_KW),
            is_composite: prefix.contains(&SyntaxKind::COMPOSITE_KW),
            is_portion: prefix.contains(&SyntaxKind::PORTION_KW),
            is_constant: prefix.contains(&SyntaxKind::CONSTANT_KW)
                || prefix.contains(&SyntaxKind::READONLY_KW),
            is_derived: prefix.contains(&SyntaxKind::DERIVED_KW),
            is_end: prefix.contains(&SyntaxKind::END_KW),
            is_ordered: has(SyntaxKind::ORDERED_KW),
            is_nonunique: has(SyntaxKind::NONUNIQUE_KW),
            is_reference: prefix.contains(&SyntaxKind::REF_KW),
            is_variation: prefix.contains(&SyntaxKind::VARIATION_KW),
            is_variant: prefix.contains(&SyntaxKind::VARIANT_KW),
            is_individual: prefix.contains(&SyntaxKind::INDIVIDUAL_KW),
            is_variable: prefix.contains(&SyntaxKind::VAR_KW),
            is_parallel: has(SyntaxKind::PARALLEL_KW),
            is_sequenced: prefix.contains(&SyntaxKind::THEN_KW) && !is_shorthand_succession,
            is_return: prefix.contains(&SyntaxKind::RETURN_KW),
            is_negated: has(SyntaxKind::NOT_KW),
        };

        let mut decl = FeatureDecl::new(kind);
        decl.role = role;
        decl.direction = direction;
        decl.modifiers = modifiers;
        let id = self.new_element(owner, visibility, ElementKind::Feature(decl.clone()), node);

        let (relationships, multiplicity) =
            self.clauses(id, node, RelationshipKind::Subsetting);
        decl.relationships = relationships;
        decl.multiplicity = multiplicity;
        decl.value = node
            .children()
            .find_map(ast::FeatureValue::cast)
            .and_then(|value| {
                let expr = value.expression()?;
                Some(FeatureValue {
                    expr: self.expr(&expr, id),
                    is_default: value.is_default(),
                    is_initial: value.is_initial(),
                })
            });
        decl.detail = self.feature_detail(id, node, kind, is_transition, is_shorthand_succession);
        self.model.elements[id].kind = ElementKind::Feature(decl);

        self.body(id, node);
        if kind == FeatureKind::If {
            self.else_branch(id, node);
        }
        id
    }

    fn feature_detail(
        &mut self,
        id: ElementId,
        node: &SyntaxNode,
        kind: FeatureKind,
        is_transition: bool,
        is_shorthand_succession: bool,
    ) -> Option<FeatureDetail> {
        let child = |kind: SyntaxKind| node.children().find(|n| n.kind() == kind);

        if let Some(part) = child(SyntaxKind::CONNECTOR_PART) {
            return Some(self.connector_detail(id, &part));
        }
        if is_shorthand_succession {
            let target = child(SyntaxKind::SUCCESSION_TARGET)?;
            let end = self.connector_end(id, &target);
            return Some(FeatureDetail::Connector {
                ends: vec![end],
                payload: None,
            });
        }
        if is_transition {
            return self.transition_detail(id, node).map(FeatureDetail::Transition);
        }
        if let Some(by) = child(SyntaxKind::BY_CLAUSE) {
            let reference = references(&by).into_iter().next()?;
            let scope = self.owner_of(id);
            return Some(FeatureDetail::SatisfiedBy(self.reference(&reference, scope)));
        }

        match kind {
            FeatureKind::Accept => {
                let part = child(SyntaxKind::ACCEPT_PART)?;
                Some(FeatureDetail::Accept(self.accept_detail(id, &part)))
            }
            FeatureKind::Send => {
                let part = child(SyntaxKind::SEND_PART)?;
                let payload = first_expr(&part).map(|e| self.expr(&e, id));
                let via = self.clause_expr(&part, SyntaxKind::VIA_CLAUSE, id);
                let to = self.clause_expr(&part, SyntaxKind::TO_CLAUSE, id);
                Some(FeatureDetail::Send { payload, via, to })
            }
            FeatureKind::Assign => {
                let part = child(SyntaxKind::ASSIGN_PART)?;
                let target = references(&part).into_iter().next()?;
                let target = self.reference(&target, id);
                let value = first_expr(&part)?;
                let value = self.expr(&value, id);
                Some(FeatureDetail::Assign { target, value })
            }
            FeatureKind::If => {
                let condition = self.clause_expr(node, SyntaxKind::CONDITION, id)?;
                let scope = self.owner_of(id);
                let then_target = child(SyntaxKind::SUCCESSION_TARGET)
                    .and_then(|t| references(&t).into_iter().next())
                    .map(|r| self.reference(&r, scope));
                Some(FeatureDetail::If {
                    condition,
                    then_target,
                    else_branch: None,
                })
            }
            FeatureKind::WhileLoop => {
                let condition = self.clause_expr(node, SyntaxKind::CONDITION, id);
                let until = self.clause_expr(node, SyntaxKind::UNTIL_CLAUSE, id);
                Some(FeatureDetail::Loop { condition, until })
            }
            FeatureKind::ForLoop => {
                let variable = child(SyntaxKind::FOR_VARIABLE)?;
                let variable = self.owned_feature(id, FeatureKind::Reference, &variable);
                let sequence = self.clause_expr(node, SyntaxKind::CONDITION, id)?;
                Some(FeatureDetail::For { variable, sequence })
            }
            FeatureKind::Terminate => {
                let expr = first_expr(node).map(|e| self.expr(&e, id));
                Some(FeatureDetail::Terminate(expr))
            }
            _ => None,
        }
    }

    /// A feature owned by `owner` for a nested declaration node (loop
    /// variables, payloads), with that node's clauses.
    fn owned_feature(&mut self, owner: ElementId, kind: FeatureKind, node: &SyntaxNode) -> ElementId {
        let mut decl = FeatureDecl::new(kind);
        let id = self.new_element(owner, Visibility::Public, ElementKind::Feature(decl.clone()), node);
        let (relationships, multiplicity) = self.clauses(id, node, RelationshipKind::Subsetting);
        decl.relationships = relationships;
        decl.multiplicity = multiplicity;
        if kind == FeatureKind::Parameter {
            decl.direction = Some(Direction::In);
        }
        self.model.elements[id].kind = ElementKind::Feature(decl);
        id
    }

    fn connector_detail(&mut self, id: ElementId, part: &SyntaxNode) -> FeatureDetail {
        let mut ends = Vec::new();
        let mut payload = None;
        for child in part.children() {
            match child.kind() {
                SyntaxKind::CONNECTOR_END => ends.push(self.connector_end(id, &child)),
                SyntaxKind::FLOW_PAYLOAD => {
                    payload = Some(self.owned_feature(id, FeatureKind::Item, &child));
                }
                _ => {}
            }
        }
        FeatureDetail::Connector { ends, payload }
    }

    /// A connector end: a feature that reference-subsets the end's target.
    fn connector_end(&mut self, connector: ElementId, node: &SyntaxNode) -> ElementId {
        let mut decl = FeatureDecl::new(FeatureKind::ConnectorEnd);
        decl.modifiers.is_end = true;
        let id = self.new_element(
            connector,
            Visibility::Public,
            ElementKind::Feature(decl.clone()),
            node,
        );
        if let Some(reference) = node.children().find_map(ReferenceNode::cast) {
            let scope = self.owner_of(connector);
            let target = self.reference(&reference, scope);
            let range = reference.syntax().text_range();
            decl.relationships
                .push(self.relate(RelationshipKind::ReferenceSubsetting, id, target, false, range));
        }
        if let Some(m) = node.children().find_map(ast::Multiplicity::cast) {
            decl.multiplicity = self.multiplicity(&m, id);
        }
        self.model.elements[id].kind = ElementKind::Feature(decl);
        id
    }

    fn accept_detail(&mut self, id: ElementId, part: &SyntaxNode) -> AcceptDetail {
        let payload = part
            .children()
            .find(|n| n.kind() == SyntaxKind::PAYLOAD)
            .map(|payload| self.owned_feature(id, FeatureKind::Parameter, &payload));
        let trigger = part
            .children()
            .find(|n| n.kind() == SyntaxKind::TRIGGER)
            .and_then(|trigger| {
                let kind = match direct_tokens(&trigger).next()?.kind() {
                    SyntaxKind::AT_KW => TriggerKind::At,
                    SyntaxKind::AFTER_KW => TriggerKind::After,
                    _ => TriggerKind::When,
                };
                let expr = first_expr(&trigger)?;
                Some(Trigger {
                    kind,
                    expr: self.expr(&expr, id),
                })
            });
        let via = self.clause_expr(part, SyntaxKind::VIA_CLAUSE, id);
        AcceptDetail {
            payload,
            trigger,
            via,
        }
    }

    fn transition_detail(&mut self, id: ElementId, node: &SyntaxNode) -> Option<TransitionDetail> {
        let scope = self.owner_of(id);
        let child = |kind: SyntaxKind| node.children().find(|n| n.kind() == kind);

        let source = child(SyntaxKind::TRANSITION_SOURCE)
            .and_then(|s| references(&s).into_iter().next())
            .map(|r| self.reference(&r, scope));
        let accept = child(SyntaxKind::ACCEPT_PART).map(|part| self.accept_detail(id, &part));
        let guard = self.clause_expr(node, SyntaxKind::GUARD, id);
        let effect = child(SyntaxKind::EFFECT).and_then(|effect| {
            if let Some(action) = effect.children().find(|n| n.kind() == SyntaxKind::USAGE) {
                return Some(Effect::Action(self.usage(id, &action, Visibility::Public)));
            }
            let reference = references(&effect).into_iter().next()?;
            Some(Effect::Reference(self.reference(&reference, scope)))
        });
        let target = child(SyntaxKind::SUCCESSION_TARGET)
            .and_then(|t| references(&t).into_iter().next())
            .map(|r| self.reference(&r, scope))?;
        Some(TransitionDetail {
            source,
            accept,
            guard,
            effect,
            target,
        })
    }

    /// `else { ... }` becomes an anonymous action, `else if` the nested if;
    /// either is the last member of the if.
    fn else_branch(&mut self, id: ElementId, node: &SyntaxNode) {
        let Some(branch) = node.children().find(|n| n.kind() == SyntaxKind::ELSE_BRANCH) else {
            return;
        };
        let else_id = if let Some(nested) = branch.children().find(|n| n.kind() == SyntaxKind::USAGE) {
            self.usage(id, &nested, Visibility::Public)
        } else {
            let decl = FeatureDecl::new(FeatureKind::Action);
            let else_id =
                self.new_element(id, Visibility::Public, ElementKind::Feature(decl), &branch);
            self.body(else_id, &branch);
            else_id
        };
        if let ElementKind::Feature(FeatureDecl {
            detail: Some(FeatureDetail::If { else_branch, .. }),
            ..
        }) = &mut self.model.elements[id].kind
        {
            *else_branch = Some(else_id);
        }
    }

    /// The expression inside the first `kind` child of `node`.
    fn clause_expr(&mut self, node: &SyntaxNode, kind: SyntaxKind, scope: ElementId) -> Option<ExprId> {
        let clause = node.children().find(|n| n.kind() == kind)?;
        let expr = first_expr(&clause)?;
        Some(self.expr(&expr, scope))
    }

    // ========================================================================
    // References
    // ========================================================================

    fn reference(&mut self, node: &ReferenceNode, scope: ElementId) -> Reference {
        let paths = node
            .paths()
            .into_iter()
            .map(|path| path.iter().map(|s| self.interner.intern(s)).collect())
            .collect();
        Reference {
            paths,
            global: node.is_global(),
            scope,
            range: node.syntax().text_range(),
        }
    }

    fn qn_reference(&mut self, node: &QualifiedName, scope: ElementId) -> Reference {
        self.reference(&ReferenceNode::Name(node.clone()), scope)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Lower an expression node.
    ///
    /// Left operands are followed down to the innermost one first, then the
    /// enclosing nodes are applied on the way back up.
    fn expr(&mut self, node: &SyntaxNode, scope: ElementId) -> ExprId {
        let mut spine = Vec::new();
        let mut current = node.clone();
        loop {
            let kind = current.kind();
            if kind == SyntaxKind::PAREN_EXPR {
                match first_expr(&current) {
                    Some(inner) => {
                        current = inner;
                        continue;
                    }
                    None => break,
                }
            }
            if !is_left_nested(kind) {
                break;
            }
            match first_expr(&current) {
                Some(operand) if kind != SyntaxKind::CLASSIFICATION_EXPR || operand_precedes_type(&current) => {
                    spine.push(current);
                    current = operand;
                }
                _ => break,
            }
        }

        let mut value = self.leaf_expr(&current, scope);
        while let Some(parent) = spine.pop() {
            value = self.wrap_expr(&parent, value, scope);
        }
        value
    }

    fn alloc_expr(&mut self, kind: ExprKind, range: TextRange) -> ExprId {
        self.model.exprs.alloc(Expr { kind, range })
    }

    fn leaf_expr(&mut self, node: &SyntaxNode, scope: ElementId) -> ExprId {
        let range = node.text_range();
        let kind = match node.kind() {
            SyntaxKind::LITERAL_EXPR => self.literal(node),
            SyntaxKind::NAME_EXPR => match self.node_qn(node, scope) {
                Some(reference) => ExprKind::Reference(reference),
                None => ExprKind::Null,
            },
            SyntaxKind::EXTENT_EXPR => match self.node_qn(node, scope) {
                Some(reference) => ExprKind::Extent(reference),
                None => ExprKind::Null,
            },
            SyntaxKind::CLASSIFICATION_EXPR => match self.node_qn(node, scope) {
                Some(ty) => ExprKind::Classification {
                    op: classification_op(node),
                    operand: None,
                    ty,
                },
                None => ExprKind::Null,
            },
            SyntaxKind::CONDITIONAL_EXPR => {
                let parts: Vec<SyntaxNode> = expr_children(node).collect();
                match parts.as_slice() {
                    [c, a, b] => ExprKind::Conditional {
                        condition: self.expr(c, scope),
                        then_expr: self.expr(a, scope),
                        else_expr: self.expr(b, scope),
                    },
                    _ => ExprKind::Null,
                }
            }
            SyntaxKind::SEQUENCE_EXPR => {
                let items: Vec<SyntaxNode> = expr_children(node).collect();
                ExprKind::Sequence(items.iter().map(|item| self.expr(item, scope)).collect())
            }
            SyntaxKind::INVOCATION_EXPR => {
                let callee = node
                    .children()
                    .find(|n| n.kind() == SyntaxKind::NAME_EXPR)
                    .and_then(|name| self.node_qn(&name, scope));
                match callee {
                    Some(callee) => ExprKind::Invocation {
                        callee,
                        args: self.arguments(node, scope),
                    },
                    None => ExprKind::Null,
                }
            }
            SyntaxKind::INSTANTIATION_EXPR => match self.node_qn(node, scope) {
                Some(ty) => ExprKind::Instantiation {
                    ty,
                    args: self.arguments(node, scope),
                },
                None => ExprKind::Null,
            },
            SyntaxKind::METADATA_ACCESS_EXPR => node
                .children()
                .find(|n| n.kind() == SyntaxKind::NAME_EXPR)
                .and_then(|name| self.node_qn(&name, scope))
                .map(ExprKind::MetadataAccess)
                .unwrap_or(ExprKind::Null),
            SyntaxKind::BODY_EXPR => match self.body_element(node, scope) {
                Some(body) => ExprKind::Body(body),
                None => ExprKind::Null,
            },
            _ => ExprKind::Null,
        };
        self.alloc_expr(kind, range)
    }

    /// Apply a left-nested node to its already lowered first operand.
    fn wrap_expr(&mut self, node: &SyntaxNode, first: ExprId, scope: ElementId) -> ExprId {
        let range = node.text_range();
        let second = || expr_children(node).nth(1);
        let kind = match node.kind() {
            SyntaxKind::BINARY_EXPR => {
                let op = direct_tokens(node).find_map(|t| binary_op(t.kind()));
                match (op, second()) {
                    (Some(op), Some(rhs)) => ExprKind::Binary {
                        op,
                        lhs: first,
                        rhs: self.expr(&rhs, scope),
                    },
                    _ => return first,
                }
            }
            SyntaxKind::UNARY_EXPR => {
                let op = direct_tokens(node).find_map(|t| unary_op(t.kind()));
                match op {
                    Some(op) => ExprKind::Unary { op, operand: first },
                    None => return first,
                }
            }
            SyntaxKind::CLASSIFICATION_EXPR => match self.node_qn(node, scope) {
                Some(ty) => ExprKind::Classification {
                    op: classification_op(node),
                    operand: Some(first),
                    ty,
                },
                None => return first,
            },
            SyntaxKind::CAST_EXPR => {
                let op = if has_token(node, SyntaxKind::META_KW) {
                    CastOp::Meta
                } else {
                    CastOp::As
                };
                match self.node_qn(node, scope) {
                    Some(ty) => ExprKind::Cast {
                        op,
                        operand: first,
                        ty,
                    },
                    None => return first,
                }
            }
            SyntaxKind::FEATURE_CHAIN_EXPR => match self.node_qn(node, scope) {
                Some(feature) => ExprKind::FeatureChain {
                    base: first,
                    feature,
                },
                None => return first,
            },
            SyntaxKind::INDEX_EXPR | SyntaxKind::BRACKET_EXPR => {
                let Some(index) = second() else {
                    return first;
                };
                let index = self.expr(&index, scope);
                if node.kind() == SyntaxKind::INDEX_EXPR {
                    ExprKind::Index { base: first, index }
                } else {
                    ExprKind::Bracket { base: first, index }
                }
            }
            SyntaxKind::COLLECT_EXPR | SyntaxKind::SELECT_EXPR => {
                let Some(body) = self.body_element(node, scope) else {
                    return first;
                };
                if node.kind() == SyntaxKind::COLLECT_EXPR {
                    ExprKind::Collect { base: first, body }
                } else {
                    ExprKind::Select { base: first, body }
                }
            }
            SyntaxKind::ARROW_EXPR => {
                let Some(function) = self.node_qn(node, scope) else {
                    return first;
                };
                let arg = node
                    .children()
                    .skip_while(|n| n.kind() != SyntaxKind::QUALIFIED_NAME)
                    .nth(1);
                let arg = match arg {
                    Some(arg) if arg.kind() == SyntaxKind::ARGUMENT_LIST => {
                        ArrowArg::Args(self.arguments(node, scope))
                    }
                    Some(arg) if arg.kind() == SyntaxKind::BODY_EXPR => {
                        match self.body_element(&arg, scope) {
                            Some(body) => ArrowArg::Body(body),
                            None => return first,
                        }
                    }
                    Some(arg) => match self.node_qn(&arg, scope) {
                        Some(reference) => ArrowArg::Function(reference),
                        None => return first,
                    },
                    None => return first,
                };
                ExprKind::Arrow {
                    base: first,
                    function,
                    arg,
                }
            }
            _ => return first,
        };
        self.alloc_expr(kind, range)
    }

    /// Numeric literals are range-checked by the parser; a member holding an
    /// out-of-range one never reaches lowering.
    fn literal(&self, node: &SyntaxNode) -> ExprKind {
        let Some(token) = direct_tokens(node).next() else {
            return ExprKind::Null;
        };
        let literal = match token.kind() {
            SyntaxKind::TRUE_KW => Literal::Boolean(true),
            SyntaxKind::FALSE_KW => Literal::Boolean(false),
            SyntaxKind::STAR => Literal::Infinity,
            SyntaxKind::STRING => Literal::String(string_value(token.text())),
            SyntaxKind::INTEGER => match token.text().parse::<u64>() {
                Ok(value) => Literal::Integer(value),
                Err(_) => return ExprKind::Null,
            },
            SyntaxKind::REAL => match token.text().parse::<f64>() {
                Ok(value) if value.is_finite() => Literal::Real(value),
                _ => return ExprKind::Null,
            },
            _ => return ExprKind::Null,
        };
        ExprKind::Literal(literal)
    }

    /// Reference from the node's direct `QUALIFIED_NAME` child.
    fn node_qn(&mut self, node: &SyntaxNode, scope: ElementId) -> Option<Reference> {
        let qn = node.children().find_map(QualifiedName::cast)?;
        Some(self.qn_reference(&qn, scope))
    }

    fn arguments(&mut self, node: &SyntaxNode, scope: ElementId) -> Arguments {
        let Some(list) = node
            .children()
            .find(|n| n.kind() == SyntaxKind::ARGUMENT_LIST)
        else {
            return Arguments::Positional(Vec::new());
        };
        let mut positional = Vec::new();
        let mut named = Vec::new();
        for argument in list.children().filter(|n| n.kind() == SyntaxKind::ARGUMENT) {
            let Some(value) = first_expr(&argument) else {
                continue;
            };
            let name = direct_tokens(&argument)
                .find(|t| t.kind() == SyntaxKind::IDENT)
                .map(|t| self.interner.intern(&name_text(&t)));
            let value = self.expr(&value, scope);
            match name {
                Some(name) => named.push((name, value)),
                None => positional.push(value),
            }
        }
        if named.is_empty() {
            Arguments::Positional(positional)
        } else {
            Arguments::Named(named)
        }
    }

    /// An anonymous expression element for the `{ ... }` body under `node`.
    fn body_element(&mut self, node: &SyntaxNode, scope: ElementId) -> Option<ElementId> {
        let body = node.children().find_map(NamespaceBody::cast)?;
        let decl = FeatureDecl::new(FeatureKind::Expression);
        let id = self.new_element(
            scope,
            Visibility::Public,
            ElementKind::Feature(decl),
            body.syntax(),
        );
        self.body_members(id, &body);
        Some(id)
    }
}

// ============================================================================
// CST helpers
// ============================================================================

fn first_expr(node: &SyntaxNode) -> Option<SyntaxNode> {
    expr_children(node).next()
}

fn expr_children(node: &SyntaxNode) -> impl Iterator<Item = SyntaxNode> {
    node.children().filter(|n| n.kind().is_expr())
}

/// Whether a classification node has an operand before its operator.
fn operand_precedes_type(node: &SyntaxNode) -> bool {
    node.children_with_tokens()
        .find(|child| !child.kind().is_trivia())
        .is_some_and(|child| child.kind().is_expr())
}

fn is_left_nested(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::BINARY_EXPR
            | SyntaxKind::UNARY_EXPR
            | SyntaxKind::CLASSIFICATION_EXPR
            | SyntaxKind::CAST_EXPR
            | SyntaxKind::FEATURE_CHAIN_EXPR
            | SyntaxKind::INDEX_EXPR
            | SyntaxKind::BRACKET_EXPR
            | SyntaxKind::COLLECT_EXPR
            | SyntaxKind::SELECT_EXPR
            | SyntaxKind::ARROW_EXPR
    )
}

fn visibility_of(node: &SyntaxNode) -> Visibility {
    match direct_tokens(node).next().map(|t| t.kind()) {
        Some(SyntaxKind::PRIVATE_KW) => Visibility::Private,
        Some(SyntaxKind::PROTECTED_KW) => Visibility::Protected,
        _ => Visibility::Public,
    }
}

/// Relationship kind of a clause node.
fn clause_kind(kind: SyntaxKind) -> Option<RelationshipKind> {
    Some(match kind {
        SyntaxKind::SPECIALIZATION => RelationshipKind::Specialization,
        SyntaxKind::CONJUGATION => RelationshipKind::Conjugation,
        SyntaxKind::DISJOINING => RelationshipKind::Disjoining,
        SyntaxKind::UNIONING => RelationshipKind::Unioning,
        SyntaxKind::INTERSECTING => RelationshipKind::Intersecting,
        SyntaxKind::DIFFERENCING => RelationshipKind::Differencing,
        SyntaxKind::TYPING => RelationshipKind::FeatureTyping,
        SyntaxKind::SUBSETTING => RelationshipKind::Subsetting,
        SyntaxKind::REFERENCE_SUBSETTING => RelationshipKind::ReferenceSubsetting,
        SyntaxKind::CROSS_SUBSETTING => RelationshipKind::CrossSubsetting,
        SyntaxKind::REDEFINITION => RelationshipKind::Redefinition,
        SyntaxKind::FEATURING => RelationshipKind::TypeFeaturing,
        SyntaxKind::INVERTING => RelationshipKind::FeatureInverting,
        SyntaxKind::CHAINING => RelationshipKind::FeatureChaining,
        _ => return None,
    })
}

fn type_kind(keywords: &[SyntaxKind]) -> TypeKind {
    use SyntaxKind::*;
    let has = |kind: SyntaxKind| keywords.contains(&kind);
    if has(ASSOC_KW) {
        return if has(STRUCT_KW) {
            TypeKind::AssociationStructure
        } else {
            TypeKind::Association
        };
    }
    if has(CASE_KW) {
        return if has(ANALYSIS_KW) {
            TypeKind::AnalysisCase
        } else if has(VERIFICATION_KW) {
            TypeKind::VerificationCase
        } else if has(USE_KW) {
            TypeKind::UseCase
        } else {
            TypeKind::Case
        };
    }
    keywords
        .iter()
        .find_map(|kind| {
            Some(match kind {
                TYPE_KW => TypeKind::Type,
                CLASSIFIER_KW => TypeKind::Classifier,
                CLASS_KW => TypeKind::Class,
                DATATYPE_KW => TypeKind::DataType,
                STRUCT_KW => TypeKind::Structure,
                BEHAVIOR_KW => TypeKind::Behavior,
                FUNCTION_KW => TypeKind::Function,
                PREDICATE_KW => TypeKind::Predicate,
                INTERACTION_KW => TypeKind::Interaction,
                METACLASS_KW => TypeKind::Metaclass,
                ATTRIBUTE_KW => TypeKind::Attribute,
                ENUM_KW => TypeKind::Enumeration,
                OCCURRENCE_KW => TypeKind::Occurrence,
                ITEM_KW => TypeKind::Item,
                PART_KW => TypeKind::Part,
                PORT_KW => TypeKind::Port,
                CONNECTION_KW => TypeKind::Connection,
                INTERFACE_KW => TypeKind::Interface,
                ALLOCATION_KW => TypeKind::Allocation,
                FLOW_KW => TypeKind::Flow,
                ACTION_KW => TypeKind::Action,
                STATE_KW => TypeKind::State,
                CALC_KW => TypeKind::Calculation,
                CONSTRAINT_KW => TypeKind::Constraint,
                REQUIREMENT_KW => TypeKind::Requirement,
                CONCERN_KW => TypeKind::Concern,
                VIEW_KW => TypeKind::View,
                VIEWPOINT_KW => TypeKind::Viewpoint,
                RENDERING_KW => TypeKind::Rendering,
                METADATA_KW => TypeKind::Metadata,
                _ => return None,
            })
        })
        .unwrap_or(TypeKind::Type)
}

/// Visibility, declaration prefixes and the `then` prefix.
fn is_prefix_token(kind: SyntaxKind) -> bool {
    use SyntaxKind::*;
    matches!(
        kind,
        PUBLIC_KW
            | PRIVATE_KW
            | PROTECTED_KW
            | ABSTRACT_KW
            | VARIATION_KW
            | VARIANT_KW
            | INDIVIDUAL_KW
            | READONLY_KW
            | CONSTANT_KW
            | DERIVED_KW
            | END_KW
            | COMPOSITE_KW
            | PORTION_KW
            | VAR_KW
            | REF_KW
            | IN_KW
            | OUT_KW
            | INOUT_KW
            | RETURN_KW
            | THEN_KW
    )
}

fn behavior_head(kind: SyntaxKind) -> Option<FeatureKind> {
    Some(match kind {
        SyntaxKind::ACCEPT_KW => FeatureKind::Accept,
        SyntaxKind::SEND_KW => FeatureKind::Send,
        SyntaxKind::ASSIGN_KW => FeatureKind::Assign,
        SyntaxKind::IF_KW => FeatureKind::If,
        SyntaxKind::WHILE_KW | SyntaxKind::LOOP_KW => FeatureKind::WhileLoop,
        SyntaxKind::FOR_KW => FeatureKind::ForLoop,
        SyntaxKind::TERMINATE_KW => FeatureKind::Terminate,
        SyntaxKind::TRANSITION_KW => FeatureKind::Transition,
        _ => return None,
    })
}

fn role_of(kind: SyntaxKind) -> Option<Role> {
    Some(match kind {
        SyntaxKind::PERFORM_KW => Role::Perform,
        SyntaxKind::EXHIBIT_KW => Role::Exhibit,
        SyntaxKind::INCLUDE_KW => Role::Include,
        SyntaxKind::SATISFY_KW => Role::Satisfy,
        SyntaxKind::VERIFY_KW => Role::Verify,
        SyntaxKind::ASSERT_KW => Role::Assert,
        SyntaxKind::ASSUME_KW => Role::Assume,
        SyntaxKind::REQUIRE_KW => Role::Require,
        SyntaxKind::FRAME_KW => Role::Frame,
        SyntaxKind::RENDER_KW => Role::Render,
        SyntaxKind::ENTRY_KW => Role::Entry,
        SyntaxKind::DO_KW => Role::Do,
        SyntaxKind::EXIT_KW => Role::Exit,
        _ => return None,
    })
}

/// Kind of a usage that names no kind of its own.
fn role_kind(role: Role) -> FeatureKind {
    match role {
        Role::Perform => FeatureKind::Perform,
        Role::Exhibit => FeatureKind::Exhibit,
        Role::Include => FeatureKind::Include,
        Role::Satisfy => FeatureKind::Satisfy,
        Role::Verify => FeatureKind::Verify,
        Role::Assert | Role::Assume | Role::Require => FeatureKind::Constraint,
        Role::Frame => FeatureKind::Concern,
        Role::Render => FeatureKind::Rendering,
        Role::Entry | Role::Do | Role::Exit => FeatureKind::Action,
    }
}

fn connector_shorthand_kind(lead: SyntaxKind) -> Option<FeatureKind> {
    Some(match lead {
        SyntaxKind::CONNECT_KW => FeatureKind::Connection,
        SyntaxKind::BIND_KW => FeatureKind::BindingConnector,
        SyntaxKind::ALLOCATE_KW => FeatureKind::Allocation,
        SyntaxKind::FIRST_KW => FeatureKind::Succession,
        _ => return None,
    })
}

fn is_kind_keyword(kind: SyntaxKind) -> bool {
    feature_kind(&[kind], Language::SysML, false).is_some()
        || matches!(kind, SyntaxKind::USE_KW | SyntaxKind::ANALYSIS_KW | SyntaxKind::VERIFICATION_KW)
}

fn feature_kind(kinds: &[SyntaxKind], language: Language, in_enumeration: bool) -> Option<FeatureKind> {
    use SyntaxKind::*;
    let has = |kind: SyntaxKind| kinds.contains(&kind);
    if has(SUCCESSION_KW) && has(FLOW_KW) {
        return Some(FeatureKind::SuccessionFlow);
    }
    if has(CASE_KW) {
        return Some(if has(ANALYSIS_KW) {
            FeatureKind::AnalysisCase
        } else if has(VERIFICATION_KW) {
            FeatureKind::VerificationCase
        } else if has(USE_KW) {
            FeatureKind::UseCase
        } else {
            FeatureKind::Case
        });
    }
    if has(EVENT_KW) {
        return Some(FeatureKind::Event);
    }
    kinds.iter().find_map(|kind| {
        Some(match kind {
            FEATURE_KW => FeatureKind::Feature,
            STEP_KW => FeatureKind::Step,
            EXPR_KW => FeatureKind::Expression,
            BOOL_KW => FeatureKind::BooleanExpression,
            INV_KW => FeatureKind::Invariant,
            CONNECTOR_KW => FeatureKind::Connector,
            BINDING_KW => FeatureKind::BindingConnector,
            SUCCESSION_KW => FeatureKind::Succession,
            FLOW_KW if language == Language::KerML => FeatureKind::Flow,
            FLOW_KW => FeatureKind::FlowConnection,
            ATTRIBUTE_KW => FeatureKind::Attribute,
            ENUM_KW if in_enumeration => FeatureKind::EnumerationValue,
            ENUM_KW => FeatureKind::Enumeration,
            OCCURRENCE_KW => FeatureKind::Occurrence,
            ITEM_KW => FeatureKind::Item,
            PART_KW => FeatureKind::Part,
            PORT_KW => FeatureKind::Port,
            CONNECTION_KW => FeatureKind::Connection,
            INTERFACE_KW => FeatureKind::Interface,
            ALLOCATION_KW => FeatureKind::Allocation,
            MESSAGE_KW => FeatureKind::Message,
            ACTION_KW => FeatureKind::Action,
            STATE_KW => FeatureKind::State,
            CALC_KW => FeatureKind::Calculation,
            CONSTRAINT_KW => FeatureKind::Constraint,
            REQUIREMENT_KW => FeatureKind::Requirement,
            CONCERN_KW => FeatureKind::Concern,
            VIEW_KW => FeatureKind::View,
            VIEWPOINT_KW => FeatureKind::Viewpoint,
            RENDERING_KW => FeatureKind::Rendering,
            SUBJECT_KW => FeatureKind::Subject,
            ACTOR_KW => FeatureKind::Actor,
            STAKEHOLDER_KW => FeatureKind::Stakeholder,
            OBJECTIVE_KW => FeatureKind::Objective,
            SNAPSHOT_KW => FeatureKind::Snapshot,
            TIMESLICE_KW => FeatureKind::Timeslice,
            DECIDE_KW => FeatureKind::Decide,
            FORK_KW => FeatureKind::Fork,
            JOIN_KW => FeatureKind::Join,
            MERGE_KW => FeatureKind::Merge,
            _ => return None,
        })
    })
}

fn binary_op(kind: SyntaxKind) -> Option<BinaryOp> {
    use SyntaxKind::*;
    Some(match kind {
        QUESTION_QUESTION => BinaryOp::NullCoalesce,
        IMPLIES_KW => BinaryOp::Implies,
        OR_KW => BinaryOp::Or,
        PIPE => BinaryOp::BitOr,
        XOR_KW => BinaryOp::Xor,
        AND_KW => BinaryOp::And,
        AMP => BinaryOp::BitAnd,
        EQ_EQ => BinaryOp::Eq,
        BANG_EQ => BinaryOp::Ne,
        EQ_EQ_EQ => BinaryOp::Same,
        BANG_EQ_EQ => BinaryOp::NotSame,
        LT => BinaryOp::Lt,
        GT => BinaryOp::Gt,
        LT_EQ => BinaryOp::Le,
        GT_EQ => BinaryOp::Ge,
        DOT_DOT => BinaryOp::Range,
        PLUS => BinaryOp::Add,
        MINUS => BinaryOp::Sub,
        STAR => BinaryOp::Mul,
        SLASH => BinaryOp::Div,
        PERCENT => BinaryOp::Rem,
        STAR_STAR => BinaryOp::Pow,
        CARET => BinaryOp::Caret,
        _ => return None,
    })
}

fn unary_op(kind: SyntaxKind) -> Option<UnaryOp> {
    Some(match kind {
        SyntaxKind::PLUS => UnaryOp::Plus,
        SyntaxKind::MINUS => UnaryOp::Minus,
        SyntaxKind::TILDE => UnaryOp::BitNot,
        SyntaxKind::NOT_KW => UnaryOp::Not,
        _ => return None,
    })
}

fn classification_op(node: &SyntaxNode) -> ClassificationOp {
    match direct_tokens(node).find(|t| {
        matches!(
            t.kind(),
            SyntaxKind::ISTYPE_KW | SyntaxKind::HASTYPE_KW | SyntaxKind::AT | SyntaxKind::AT_AT
        )
    }) {
        Some(t) if t.kind() == SyntaxKind::HASTYPE_KW => ClassificationOp::HasType,
        Some(t) if t.kind() == SyntaxKind::AT => ClassificationOp::At,
        Some(t) if t.kind() == SyntaxKind::AT_AT => ClassificationOp::MetaAt,
        _ => ClassificationOp::IsType,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_kerml, parse_sysml};

    fn build_sysml(source: &str) -> (Model, Vec<SyntaxError>) {
        let parse = parse_sysml(source);
        assert!(parse.ok(), "{:?}", parse.errors);
        build(&parse.syntax(), Language::SysML)
    }

    #[test]
    fn test_ids_are_pre_order() {
        let (model, _) = build_sysml("package P { part def A { part b; } part c; }");
        let names: Vec<_> = model
            .elements
            .iter()
            .filter_map(|(_, e)| e.name.as_deref())
            .collect();
        assert_eq!(names, ["P", "A", "b", "c"]);
    }

    #[test]
    fn test_duplicate_name_warns_and_first_wins() {
        let (model, errors) = build_sysml("package P { part a; part a; }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::W0301);
        let p = model.find("P").unwrap();
        let first = model.element(p).owned_members().next().unwrap();
        let Some(Membership {
            member: Member::Owned(found),
            ..
        }) = model.lookup_member(p, "a")
        else {
            panic!("a not registered");
        };
        assert_eq!(*found, first);
    }

    #[test]
    fn test_left_deep_chain_lowers_without_recursion() {
        let mut source = String::from("class C { feature x = 1");
        for _ in 0..1000 {
            source.push_str(" + 1");
        }
        source.push_str("; }");
        let parse = parse_kerml(&source);
        assert!(parse.ok());
        let (model, errors) = build(&parse.syntax(), Language::KerML);
        assert!(errors.is_empty());
        assert_eq!(model.exprs.len(), 2001);
    }

    #[test]
    fn test_quoted_names_in_qualified_name() {
        let (model, _) = build_sysml("package 'My Pkg' { part def 'part'; }");
        assert!(model.find("'My Pkg'::'part'").is_some());
    }
}

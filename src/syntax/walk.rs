//! Generic traversal over a [`Model`].
//!
//! One walker serves every consumer: a [`Visitor`] sees each node once and
//! answers with a [`VisitAction`]. The walk keeps its own stack, so deeply
//! nested models never grow the call stack.
//!
//! Children of an element are, in order: its relationships, its expressions
//! (multiplicity bounds, value, detail expressions, import filters, filter
//! condition, result) and its owned members. Expression bodies are owned
//! members of the element the expression belongs to and are reached there.

use rustc_hash::FxHashMap;

use super::model::*;

/// A node of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Element(ElementId),
    Relationship(RelationshipId),
    Expr(ExprId),
}

impl NodeRef {
    pub fn kind(self, model: &Model) -> NodeKind {
        match self {
            NodeRef::Element(id) => match &model.element(id).kind {
                ElementKind::Root => NodeKind::Root,
                ElementKind::Namespace => NodeKind::Namespace,
                ElementKind::Package => NodeKind::Package,
                ElementKind::LibraryPackage { .. } => NodeKind::LibraryPackage,
                ElementKind::Type(_) => NodeKind::Type,
                ElementKind::Feature(_) => NodeKind::Feature,
                ElementKind::Relationship(_) => NodeKind::RelationshipDecl,
                ElementKind::Dependency(_) => NodeKind::Dependency,
                ElementKind::Annotation(_) => NodeKind::Annotation,
            },
            NodeRef::Relationship(_) => NodeKind::Relationship,
            NodeRef::Expr(_) => NodeKind::Expr,
        }
    }
}

/// Handler key for [`Handlers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Namespace,
    Package,
    LibraryPackage,
    Type,
    Feature,
    /// An element declaring a standalone relationship
    RelationshipDecl,
    Dependency,
    Annotation,
    Relationship,
    Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitAction {
    #[default]
    Continue,
    /// Do not descend into this node; ignored in post-order
    SkipChildren,
    /// Stop the walk
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Pre,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    Completed,
    /// The visitor aborted at this node
    Aborted(NodeRef),
}

pub trait Visitor {
    fn visit(&mut self, model: &Model, node: NodeRef) -> VisitAction;
}

impl<F> Visitor for F
where
    F: FnMut(&Model, NodeRef) -> VisitAction,
{
    fn visit(&mut self, model: &Model, node: NodeRef) -> VisitAction {
        self(model, node)
    }
}

type Handler<'a> = Box<dyn FnMut(&Model, NodeRef) -> VisitAction + 'a>;

/// Per-kind closures; kinds without a handler continue.
#[derive(Default)]
pub struct Handlers<'a> {
    handlers: FxHashMap<NodeKind, Handler<'a>>,
}

impl<'a> Handlers<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `kind`, replacing any earlier one.
    pub fn on(
        mut self,
        kind: NodeKind,
        handler: impl FnMut(&Model, NodeRef) -> VisitAction + 'a,
    ) -> Self {
        self.handlers.insert(kind, Box::new(handler));
        self
    }
}

impl Visitor for Handlers<'_> {
    fn visit(&mut self, model: &Model, node: NodeRef) -> VisitAction {
        match self.handlers.get_mut(&node.kind(model)) {
            Some(handler) => handler(model, node),
            None => VisitAction::Continue,
        }
    }
}

enum Frame {
    Enter(NodeRef),
    Exit(NodeRef),
}

/// Walk the subtree under `start`.
pub fn walk(model: &Model, start: NodeRef, order: Order, visitor: &mut impl Visitor) -> WalkOutcome {
    let mut stack = vec![Frame::Enter(start)];
    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(node) => {
                if order == Order::Pre {
                    match visitor.visit(model, node) {
                        VisitAction::Abort => return WalkOutcome::Aborted(node),
                        VisitAction::SkipChildren => continue,
                        VisitAction::Continue => {}
                    }
                } else {
                    stack.push(Frame::Exit(node));
                }
                stack.extend(children(model, node).into_iter().rev().map(Frame::Enter));
            }
            Frame::Exit(node) => {
                if visitor.visit(model, node) == VisitAction::Abort {
                    return WalkOutcome::Aborted(node);
                }
            }
        }
    }
    WalkOutcome::Completed
}

/// Walk the whole model from its root.
pub fn walk_model(model: &Model, order: Order, visitor: &mut impl Visitor) -> WalkOutcome {
    walk(model, NodeRef::Element(model.root()), order, visitor)
}

/// Direct children of `node`, in visiting order.
pub fn children(model: &Model, node: NodeRef) -> Vec<NodeRef> {
    match node {
        NodeRef::Element(id) => element_children(model, id),
        NodeRef::Relationship(_) => Vec::new(),
        NodeRef::Expr(id) => expr_children(model, id)
            .into_iter()
            .map(NodeRef::Expr)
            .collect(),
    }
}

fn element_children(model: &Model, id: ElementId) -> Vec<NodeRef> {
    let element = model.element(id);
    let mut children: Vec<NodeRef> = element
        .relationships()
        .iter()
        .copied()
        .map(NodeRef::Relationship)
        .collect();

    let mut exprs = Vec::new();
    match &element.kind {
        ElementKind::Type(decl) => {
            if let Some(m) = &decl.multiplicity {
                exprs.extend(m.bound_exprs());
            }
        }
        ElementKind::Feature(decl) => {
            if let Some(m) = &decl.multiplicity {
                exprs.extend(m.bound_exprs());
            }
            if let Some(value) = &decl.value {
                exprs.push(value.expr);
            }
            if let Some(detail) = &decl.detail {
                detail_exprs(detail, &mut exprs);
            }
        }
        _ => {}
    }
    for membership in &element.members {
        match &membership.member {
            Member::Import(import) => exprs.extend(import.filters.iter().copied()),
            Member::Filter(expr) => exprs.push(*expr),
            Member::Owned(_) | Member::Alias(_) => {}
        }
    }
    exprs.extend(element.result);

    children.extend(exprs.into_iter().map(NodeRef::Expr));
    children.extend(element.owned_members().map(NodeRef::Element));
    children
}

fn detail_exprs(detail: &FeatureDetail, exprs: &mut Vec<ExprId>) {
    let accept = |accept: &AcceptDetail, exprs: &mut Vec<ExprId>| {
        exprs.extend(accept.trigger.map(|t| t.expr));
        exprs.extend(accept.via);
    };
    match detail {
        FeatureDetail::Connector { .. } | FeatureDetail::SatisfiedBy(_) => {}
        FeatureDetail::Accept(detail) => accept(detail, exprs),
        FeatureDetail::Send { payload, via, to } => {
            exprs.extend([*payload, *via, *to].into_iter().flatten());
        }
        FeatureDetail::Assign { value, .. } => exprs.push(*value),
        FeatureDetail::If { condition, .. } => exprs.push(*condition),
        FeatureDetail::Loop { condition, until } => {
            exprs.extend([*condition, *until].into_iter().flatten());
        }
        FeatureDetail::For { sequence, .. } => exprs.push(*sequence),
        FeatureDetail::Terminate(expr) => exprs.extend(*expr),
        FeatureDetail::Transition(transition) => {
            if let Some(detail) = &transition.accept {
                accept(detail, exprs);
            }
            exprs.extend(transition.guard);
        }
    }
}

/// Operand expressions of `id`; bodies are not included.
pub fn expr_children(model: &Model, id: ExprId) -> Vec<ExprId> {
    match &model.expr(id).kind {
        ExprKind::Literal(_)
        | ExprKind::Null
        | ExprKind::Reference(_)
        | ExprKind::MetadataAccess(_)
        | ExprKind::Body(_)
        | ExprKind::Extent(_) => Vec::new(),
        ExprKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
        ExprKind::Unary { operand, .. } | ExprKind::Cast { operand, .. } => vec![*operand],
        ExprKind::Conditional {
            condition,
            then_expr,
            else_expr,
        } => vec![*condition, *then_expr, *else_expr],
        ExprKind::Classification { operand, .. } => operand.iter().copied().collect(),
        ExprKind::Sequence(items) => items.clone(),
        ExprKind::Invocation { args, .. } | ExprKind::Instantiation { args, .. } => args.exprs(),
        ExprKind::FeatureChain { base, .. }
        | ExprKind::Collect { base, .. }
        | ExprKind::Select { base, .. } => vec![*base],
        ExprKind::Index { base, index } | ExprKind::Bracket { base, index } => vec![*base, *index],
        ExprKind::Arrow { base, arg, .. } => {
            let mut children = vec![*base];
            if let ArrowArg::Args(args) = arg {
                children.extend(args.exprs());
            }
            children
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Language;
    use crate::parser::parse_sysml;
    use crate::syntax::builder::build;

    fn model(source: &str) -> Model {
        let parse = parse_sysml(source);
        build(&parse.syntax(), Language::SysML).0
    }

    #[test]
    fn test_pre_and_post_order() {
        let model = model("package P { part a; part b; }");
        let mut pre = Vec::new();
        walk_model(&model, Order::Pre, &mut |m: &Model, node: NodeRef| {
            if let NodeRef::Element(id) = node {
                pre.extend(m.element(id).name.clone());
            }
            VisitAction::Continue
        });
        let mut post = Vec::new();
        walk_model(&model, Order::Post, &mut |m: &Model, node: NodeRef| {
            if let NodeRef::Element(id) = node {
                post.extend(m.element(id).name.clone());
            }
            VisitAction::Continue
        });
        assert_eq!(pre, ["P", "a", "b"]);
        assert_eq!(post, ["a", "b", "P"]);
    }

    #[test]
    fn test_skip_children() {
        let model = model("package P { part a; } package Q { part b; }");
        let mut seen = Vec::new();
        let outcome = walk_model(&model, Order::Pre, &mut |m: &Model, node: NodeRef| {
            let NodeRef::Element(id) = node else {
                return VisitAction::Continue;
            };
            let name = m.element(id).name.clone();
            seen.extend(name.clone());
            if name.as_deref() == Some("P") {
                VisitAction::SkipChildren
            } else {
                VisitAction::Continue
            }
        });
        assert_eq!(outcome, WalkOutcome::Completed);
        assert_eq!(seen, ["P", "Q", "b"]);
    }

    #[test]
    fn test_handlers_by_kind() {
        let model = model("part def A { attribute x = 1 + 2; }");
        let mut exprs = 0;
        let mut features = 0;
        let mut handlers = Handlers::new()
            .on(NodeKind::Expr, |_, _| {
                exprs += 1;
                VisitAction::Continue
            })
            .on(NodeKind::Feature, |_, _| {
                features += 1;
                VisitAction::Continue
            });
        walk_model(&model, Order::Pre, &mut handlers);
        drop(handlers);
        assert_eq!(exprs, 3);
        assert_eq!(features, 1);
    }
}

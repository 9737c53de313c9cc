//! Traversal Tests - the model walker and the relationship graph

use kerml::syntax::walk::children;
use kerml::syntax::{
    ElementId, ExprKind, Handlers, Model, NodeKind, NodeRef, Order, RelationshipGraph,
    RelationshipKind, VisitAction, WalkOutcome, walk, walk_model,
};
use kerml::{Language, ParseOptions, parse, parse_with};
use rstest::rstest;

fn sysml(source: &str) -> Model {
    let result = parse(source, "test.sysml");
    assert!(result.success, "{:?}", result.diagnostics);
    result.model
}

fn kerml(source: &str) -> Model {
    let options = ParseOptions::default().with_language(Language::KerML);
    let result = parse_with(source, "test.kerml", &options);
    assert!(result.success, "{:?}", result.diagnostics);
    result.model
}

fn kinds(model: &Model, order: Order) -> Vec<NodeKind> {
    let mut kinds = Vec::new();
    walk_model(model, order, &mut |m: &Model, node: NodeRef| {
        kinds.push(node.kind(m));
        VisitAction::Continue
    });
    kinds
}

fn named(model: &Model, name: &str) -> ElementId {
    model.find(name).unwrap_or_else(|| panic!("{name} not found"))
}

// ============================================================================
// Walker
// ============================================================================

#[test]
fn test_relationships_then_expressions_then_members() {
    let model = sysml("part def A { part x : T [2] = 5 { part y; } }");
    assert_eq!(
        kinds(&model, Order::Pre),
        [
            NodeKind::Root,
            NodeKind::Type,
            NodeKind::Feature,
            NodeKind::Relationship,
            NodeKind::Expr,
            NodeKind::Feature,
        ]
    );
}

#[test]
fn test_post_order_visits_operands_first() {
    let model = sysml("part def A { attribute x = 1 + 2; }");
    let mut exprs = Vec::new();
    walk_model(&model, Order::Post, &mut |m: &Model, node: NodeRef| {
        if let NodeRef::Expr(id) = node {
            exprs.push(m.expr(id).kind.clone());
        }
        VisitAction::Continue
    });
    assert_eq!(exprs.len(), 3);
    assert!(matches!(exprs[2], ExprKind::Binary { .. }));
    assert!(matches!(exprs[0], ExprKind::Literal(_)));
}

#[test]
fn test_abort_reports_node() {
    let model = sysml("package P { part a; part b; part c; }");
    let b = named(&model, "P::b");
    let mut seen = Vec::new();
    let outcome = walk_model(&model, Order::Pre, &mut |m: &Model, node: NodeRef| {
        if let NodeRef::Element(id) = node {
            seen.extend(m.element(id).name.clone());
            if id == b {
                return VisitAction::Abort;
            }
        }
        VisitAction::Continue
    });
    assert_eq!(outcome, WalkOutcome::Aborted(NodeRef::Element(b)));
    assert_eq!(seen, ["P", "a", "b"]);
}

#[test]
fn test_abort_in_post_order() {
    let model = sysml("package P { part a { part inner; } part b; }");
    let a = named(&model, "P::a");
    let mut seen = Vec::new();
    let outcome = walk_model(&model, Order::Post, &mut |m: &Model, node: NodeRef| {
        if let NodeRef::Element(id) = node {
            seen.extend(m.element(id).name.clone());
            if id == a {
                return VisitAction::Abort;
            }
        }
        VisitAction::Continue
    });
    assert_eq!(outcome, WalkOutcome::Aborted(NodeRef::Element(a)));
    assert_eq!(seen, ["inner", "a"]);
}

#[test]
fn test_walk_from_subtree() {
    let model = sysml("package P { part a { part x; } part b { part y; } }");
    let a = named(&model, "P::a");
    let mut names = Vec::new();
    let outcome = walk(&model, NodeRef::Element(a), Order::Pre, &mut |m: &Model, node: NodeRef| {
        if let NodeRef::Element(id) = node {
            names.extend(m.element(id).name.clone());
        }
        VisitAction::Continue
    });
    assert_eq!(outcome, WalkOutcome::Completed);
    assert_eq!(names, ["a", "x"]);
}

#[test]
fn test_body_elements_are_reached_through_owner() {
    let model = sysml("calc def F { in a; a * 2 }");
    let f = named(&model, "F");
    let child_kinds: Vec<NodeKind> = children(&model, NodeRef::Element(f))
        .into_iter()
        .map(|node| node.kind(&model))
        .collect();
    assert_eq!(child_kinds, [NodeKind::Expr, NodeKind::Feature]);
}

#[test]
fn test_handlers_skip_feature_subtrees() {
    let model = sysml("part def A { part x = 1 + 2 { part y; } part z; }");
    let mut features = Vec::new();
    let mut exprs = 0;
    let mut handlers = Handlers::new()
        .on(NodeKind::Feature, |m, node| {
            if let NodeRef::Element(id) = node {
                features.extend(m.element(id).name.clone());
            }
            VisitAction::SkipChildren
        })
        .on(NodeKind::Expr, |_, _| {
            exprs += 1;
            VisitAction::Continue
        });
    let outcome = walk_model(&model, Order::Pre, &mut handlers);
    drop(handlers);
    assert_eq!(outcome, WalkOutcome::Completed);
    assert_eq!(features, ["x", "z"]);
    assert_eq!(exprs, 0);
}

#[rstest]
#[case(Order::Pre)]
#[case(Order::Post)]
fn test_long_operand_chain(#[case] order: Order) {
    let mut source = String::from("part def A { attribute x = 0");
    for _ in 0..2000 {
        source.push_str(" + 1");
    }
    source.push_str("; }");
    let model = sysml(&source);
    let mut exprs = 0usize;
    let outcome = walk_model(&model, order, &mut |_: &Model, node: NodeRef| {
        if matches!(node, NodeRef::Expr(_)) {
            exprs += 1;
        }
        VisitAction::Continue
    });
    assert_eq!(outcome, WalkOutcome::Completed);
    assert_eq!(exprs, 4001);
}

// ============================================================================
// Relationship graph
// ============================================================================

#[test]
fn test_typing_joins_the_generalization_closure() {
    let model = sysml("part def Vehicle; part def Car :> Vehicle; part car : Car;");
    let graph = RelationshipGraph::build(&model);
    let vehicle = named(&model, "Vehicle");
    let car_def = named(&model, "Car");
    let car = named(&model, "car");

    assert_eq!(graph.generals(car), [car_def]);
    assert_eq!(graph.general_closure(car), vec![car_def, vehicle]);
    assert_eq!(graph.specifics(vehicle), [car_def]);
    assert_eq!(graph.edges(RelationshipKind::FeatureTyping).len(), 1);
    assert!(graph.unresolved().is_empty());
}

#[test]
fn test_conjugation_edge() {
    let model = kerml("class A; class B ~ A;");
    let graph = RelationshipGraph::build(&model);
    let a = named(&model, "A");
    let b = named(&model, "B");
    assert_eq!(graph.conjugation_of(b), Some(a));
    assert!(graph.generals(b).is_empty());
}

#[test]
fn test_standalone_declarations_join_the_graph() {
    let model = kerml("class A; class B; subclassifier B :> A;");
    let graph = RelationshipGraph::build(&model);
    let edges = graph.edges(RelationshipKind::Subclassification);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source, named(&model, "B"));
    assert_eq!(edges[0].target, named(&model, "A"));
}

#[test]
fn test_cycle_through_standalone_declaration() {
    let model = kerml("class A; class B :> A; subclassifier A :> B;");
    let graph = RelationshipGraph::build(&model);
    let mut expected = vec![named(&model, "A"), named(&model, "B")];
    expected.sort();
    assert_eq!(graph.specialization_cycles(), vec![expected]);
    let closure = graph.general_closure(named(&model, "A"));
    assert_eq!(closure.len(), 2);
}

#[test]
fn test_dependency_edges() {
    let model = sysml("part def A; part def B; part def C; dependency A, B to C;");
    let graph = RelationshipGraph::build(&model);
    let c = named(&model, "C");
    let edges = graph.edges(RelationshipKind::Dependency);
    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(|edge| edge.target == c));
    assert!(graph.generals(named(&model, "A")).is_empty());
}

#[test]
fn test_import_does_not_resolve_edges() {
    let model = sysml("package Lib { part def T; } package Use { import Lib::*; part t : T; }");
    let graph = RelationshipGraph::build(&model);
    assert_eq!(graph.unresolved().len(), 1);
    assert!(graph.edges(RelationshipKind::FeatureTyping).is_empty());
}

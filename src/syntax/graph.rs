//! Resolved relationship graph.
//!
//! Relationship targets are resolved lexically through [`Model::resolve`];
//! edges whose ends do not resolve are kept aside as unresolved. The graph
//! answers generalization queries and finds specialization cycles, which
//! the parser accepts and later stages reject.

use rustc_hash::{FxHashMap, FxHashSet};

use super::model::*;

/// A relationship with both ends resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub relationship: RelationshipId,
    pub source: ElementId,
    pub target: ElementId,
}

#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    edges: FxHashMap<RelationshipKind, Vec<Edge>>,
    /// specific → general, for generalization kinds
    generals: FxHashMap<ElementId, Vec<ElementId>>,
    /// general → specific
    specifics: FxHashMap<ElementId, Vec<ElementId>>,
    conjugations: FxHashMap<ElementId, ElementId>,
    unresolved: Vec<RelationshipId>,
}

impl RelationshipGraph {
    pub fn build(model: &Model) -> Self {
        let mut graph = Self::default();
        for (id, relationship) in model.relationships.iter() {
            let source = match &relationship.source {
                Endpoint::Element(source) => Some(*source),
                Endpoint::Reference(reference) => model.resolve(reference),
            };
            let (Some(source), Some(target)) = (source, model.resolve(&relationship.target)) else {
                graph.unresolved.push(id);
                continue;
            };
            let kind = relationship.kind;
            graph.edges.entry(kind).or_default().push(Edge {
                relationship: id,
                source,
                target,
            });
            if kind.is_generalization() {
                push_unique(graph.generals.entry(source).or_default(), target);
                push_unique(graph.specifics.entry(target).or_default(), source);
            } else if kind == RelationshipKind::Conjugation {
                graph.conjugations.insert(source, target);
            }
        }
        graph
    }

    /// Resolved relationships of `kind`, in declaration order.
    pub fn edges(&self, kind: RelationshipKind) -> &[Edge] {
        self.edges.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Direct generalizations of `id`.
    pub fn generals(&self, id: ElementId) -> &[ElementId] {
        self.generals.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Direct specializations of `id`.
    pub fn specifics(&self, id: ElementId) -> &[ElementId] {
        self.specifics.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// The original type of a conjugated type.
    pub fn conjugation_of(&self, id: ElementId) -> Option<ElementId> {
        self.conjugations.get(&id).copied()
    }

    /// Relationships with an end that did not resolve.
    pub fn unresolved(&self) -> &[RelationshipId] {
        &self.unresolved
    }

    /// All direct and indirect generalizations of `id`, nearest first.
    ///
    /// Terminates on cycles; `id` itself is included only when it is its
    /// own generalization through one.
    pub fn general_closure(&self, id: ElementId) -> Vec<ElementId> {
        let mut seen = FxHashSet::default();
        let mut closure = Vec::new();
        let mut queue = std::collections::VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            for &general in self.generals(current) {
                if seen.insert(general) {
                    closure.push(general);
                    queue.push_back(general);
                }
            }
        }
        closure
    }

    /// Strongly connected components of the generalization graph that form
    /// cycles: more than one member, or a single self-specializing element.
    pub fn specialization_cycles(&self) -> Vec<Vec<ElementId>> {
        let mut nodes: Vec<ElementId> = self.generals.keys().copied().collect();
        nodes.sort();

        let mut state = TarjanState::default();
        for node in nodes {
            if !state.indices.contains_key(&node) {
                state.strongconnect(node, self);
            }
        }

        state
            .components
            .into_iter()
            .filter(|component| match component.as_slice() {
                [single] => self.generals(*single).contains(single),
                _ => true,
            })
            .map(|mut component| {
                component.sort();
                component
            })
            .collect()
    }
}

fn push_unique(list: &mut Vec<ElementId>, id: ElementId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

// ============================================================================
// Tarjan's SCC
// ============================================================================

#[derive(Default)]
struct TarjanState {
    index: u32,
    indices: FxHashMap<ElementId, u32>,
    lowlinks: FxHashMap<ElementId, u32>,
    stack: Vec<ElementId>,
    on_stack: FxHashSet<ElementId>,
    components: Vec<Vec<ElementId>>,
}

impl TarjanState {
    fn open(&mut self, v: ElementId) {
        self.indices.insert(v, self.index);
        self.lowlinks.insert(v, self.index);
        self.index += 1;
        self.stack.push(v);
        self.on_stack.insert(v);
    }

    fn lower(&mut self, v: ElementId, to: u32) {
        if let Some(low) = self.lowlinks.get_mut(&v) {
            *low = (*low).min(to);
        }
    }

    /// Iterative strongconnect: each work frame is a node and the position
    /// of its next successor.
    fn strongconnect(&mut self, root: ElementId, graph: &RelationshipGraph) {
        self.open(root);
        let mut work = vec![(root, 0usize)];
        while let Some(frame) = work.last_mut() {
            let v = frame.0;
            if let Some(&w) = graph.generals(v).get(frame.1) {
                frame.1 += 1;
                match self.indices.get(&w) {
                    None => {
                        self.open(w);
                        work.push((w, 0));
                    }
                    Some(&index_w) if self.on_stack.contains(&w) => self.lower(v, index_w),
                    Some(_) => {}
                }
                continue;
            }

            work.pop();
            let low_v = self.lowlinks.get(&v).copied().unwrap_or_default();
            if let Some(&(parent, _)) = work.last() {
                self.lower(parent, low_v);
            }
            if Some(low_v) == self.indices.get(&v).copied() {
                let mut component = Vec::new();
                while let Some(w) = self.stack.pop() {
                    self.on_stack.remove(&w);
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                self.components.push(component);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Language;
    use crate::parser::parse_sysml;
    use crate::syntax::builder::build;

    fn graph(source: &str) -> (Model, RelationshipGraph) {
        let parse = parse_sysml(source);
        assert!(parse.ok(), "{:?}", parse.errors);
        let (model, _) = build(&parse.syntax(), Language::SysML);
        let graph = RelationshipGraph::build(&model);
        (model, graph)
    }

    #[test]
    fn test_generals_and_closure() {
        let (model, graph) = graph("part def A; part def B :> A; part def C :> B;");
        let a = model.find("A").unwrap();
        let b = model.find("B").unwrap();
        let c = model.find("C").unwrap();
        assert_eq!(graph.generals(c), [b]);
        assert_eq!(graph.specifics(a), [b]);
        assert_eq!(graph.general_closure(c), vec![b, a]);
        assert!(graph.specialization_cycles().is_empty());
    }

    #[test]
    fn test_cycle_detection() {
        let (model, graph) = graph("part def A :> C; part def B :> A; part def C :> B; part def D :> D;");
        let ids: Vec<ElementId> = ["A", "B", "C"]
            .iter()
            .map(|name| model.find(name).unwrap())
            .collect();
        let d = model.find("D").unwrap();
        let cycles = graph.specialization_cycles();
        assert_eq!(cycles, vec![ids, vec![d]]);
    }

    #[test]
    fn test_unresolved_targets_are_kept_aside() {
        let (_, graph) = graph("part def A :> Missing;");
        assert_eq!(graph.unresolved().len(), 1);
        assert!(graph.edges(RelationshipKind::Subclassification).is_empty());
    }
}

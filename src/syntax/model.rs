//! The abstract model: elements, relationships and expressions in typed
//! arenas.
//!
//! A [`Model`] is produced once per source unit by the builder and is not
//! modified afterwards. Cross references are plain arena indices, so cyclic
//! structures (a feature typed by the type that owns it, specialization
//! cycles) need no shared ownership.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use text_size::TextRange;

use super::arena::{Arena, Idx};
use crate::base::Name;

pub type ElementId = Idx<Element>;
pub type ExprId = Idx<Expr>;
pub type RelationshipId = Idx<Relationship>;

/// Alias chains longer than this are treated as unresolvable.
const MAX_ALIAS_HOPS: u32 = 32;

// ============================================================================
// Elements
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
        }
    }
}

/// Common data of every model element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub name: Option<Name>,
    pub short_name: Option<Name>,
    /// `None` when this element or one of its owners is unnamed
    pub qualified_name: Option<Name>,
    /// `None` only for the root namespace
    pub owner: Option<ElementId>,
    pub visibility: Visibility,
    /// Owned comments, documentation, textual representations and metadata
    /// usages, in source order. Each is also an owned member.
    pub annotations: Vec<ElementId>,
    pub members: Vec<Membership>,
    /// Trailing result expression of a function-like body
    pub result: Option<ExprId>,
    pub range: TextRange,
}

impl Element {
    pub(crate) fn new(kind: ElementKind, owner: Option<ElementId>, range: TextRange) -> Self {
        Self {
            kind,
            name: None,
            short_name: None,
            qualified_name: None,
            owner,
            visibility: Visibility::Public,
            annotations: Vec::new(),
            members: Vec::new(),
            result: None,
            range,
        }
    }

    /// Ids of directly owned member elements, in order.
    pub fn owned_members(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.members.iter().filter_map(|m| match m.member {
            Member::Owned(id) => Some(id),
            _ => None,
        })
    }

    pub fn as_type(&self) -> Option<&TypeDecl> {
        match &self.kind {
            ElementKind::Type(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_feature(&self) -> Option<&FeatureDecl> {
        match &self.kind {
            ElementKind::Feature(decl) => Some(decl),
            _ => None,
        }
    }

    /// Relationships this element owns or declares.
    pub fn relationships(&self) -> &[RelationshipId] {
        match &self.kind {
            ElementKind::Type(decl) => &decl.relationships,
            ElementKind::Feature(decl) => &decl.relationships,
            ElementKind::Relationship(id) => std::slice::from_ref(id),
            ElementKind::Dependency(dep) => &dep.relationships,
            _ => &[],
        }
    }

    pub fn is_namespace(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Root
                | ElementKind::Namespace
                | ElementKind::Package
                | ElementKind::LibraryPackage { .. }
        )
    }
}

/// What an element is.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// The unnamed namespace that owns a unit's top-level members
    Root,
    /// KerML `namespace`
    Namespace,
    Package,
    LibraryPackage { standard: bool },
    Type(TypeDecl),
    Feature(FeatureDecl),
    /// A relationship declared as a member in its own right
    Relationship(RelationshipId),
    Dependency(DependencyDecl),
    Annotation(Annotation),
}

/// A namespace member with its visibility.
#[derive(Debug, Clone, PartialEq)]
pub struct Membership {
    pub visibility: Visibility,
    pub member: Member,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Owned(ElementId),
    Alias(Alias),
    Import(Import),
    /// `filter` condition of a package or view
    Filter(ExprId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub name: Option<Name>,
    pub short_name: Option<Name>,
    pub target: Reference,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub target: Reference,
    /// `import all`: also imports non-public members
    pub all: bool,
    pub kind: ImportKind,
    pub filters: Vec<ExprId>,
    /// Written with `expose` (views) instead of `import`
    pub expose: bool,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import A::B;`
    Member,
    /// `import A::*;`
    Namespace,
    /// `import A::**;`
    Recursive,
    /// `import A::*::**;`
    NamespaceRecursive,
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub is_abstract: bool,
    /// `all`: the type is sufficient
    pub is_sufficient: bool,
    pub is_variation: bool,
    pub is_individual: bool,
    pub multiplicity: Option<Multiplicity>,
    pub relationships: Vec<RelationshipId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    // KerML
    Type,
    Classifier,
    Class,
    DataType,
    Structure,
    Association,
    AssociationStructure,
    Behavior,
    Function,
    Predicate,
    Interaction,
    Metaclass,
    // SysML definitions
    Attribute,
    Enumeration,
    Occurrence,
    Item,
    Part,
    Port,
    Connection,
    Interface,
    Allocation,
    Flow,
    Action,
    State,
    Calculation,
    Constraint,
    Requirement,
    Concern,
    Case,
    AnalysisCase,
    VerificationCase,
    UseCase,
    View,
    Viewpoint,
    Rendering,
    Metadata,
}

// ============================================================================
// Features
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDecl {
    pub kind: FeatureKind,
    /// How the feature relates to another one (`perform`, `satisfy`, `entry`, ...)
    pub role: Option<Role>,
    pub direction: Option<Direction>,
    pub modifiers: FeatureModifiers,
    pub multiplicity: Option<Multiplicity>,
    pub relationships: Vec<RelationshipId>,
    pub value: Option<FeatureValue>,
    pub detail: Option<FeatureDetail>,
}

impl FeatureDecl {
    pub(crate) fn new(kind: FeatureKind) -> Self {
        Self {
            kind,
            role: None,
            direction: None,
            modifiers: FeatureModifiers::default(),
            multiplicity: None,
            relationships: Vec::new(),
            value: None,
            detail: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    // KerML
    Feature,
    Step,
    Expression,
    BooleanExpression,
    Invariant,
    Connector,
    BindingConnector,
    Succession,
    Flow,
    SuccessionFlow,
    // SysML usages
    Reference,
    Attribute,
    Enumeration,
    EnumerationValue,
    Occurrence,
    Event,
    Item,
    Part,
    Port,
    Connection,
    Interface,
    Allocation,
    FlowConnection,
    Message,
    Action,
    State,
    Calculation,
    Constraint,
    Requirement,
    Concern,
    Case,
    AnalysisCase,
    VerificationCase,
    UseCase,
    View,
    Viewpoint,
    Rendering,
    Subject,
    Actor,
    Stakeholder,
    Objective,
    Perform,
    Exhibit,
    Include,
    Satisfy,
    Verify,
    Accept,
    Send,
    Assign,
    If,
    WhileLoop,
    ForLoop,
    Decide,
    Fork,
    Join,
    Merge,
    Terminate,
    Transition,
    Snapshot,
    Timeslice,
    ConnectorEnd,
    Parameter,
}

/// Keyword a usage is introduced with when it stands for another feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Perform,
    Exhibit,
    Include,
    Satisfy,
    Verify,
    Assert,
    Assume,
    Require,
    Frame,
    Render,
    Entry,
    Do,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::InOut => "inout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeatureModifiers {
    pub is_abstract: bool,
    pub is_composite: bool,
    pub is_portion: bool,
    /// `constant`, or the deprecated `readonly`
    pub is_constant: bool,
    pub is_derived: bool,
    pub is_end: bool,
    pub is_ordered: bool,
    pub is_nonunique: bool,
    /// `ref`
    pub is_reference: bool,
    pub is_variation: bool,
    pub is_variant: bool,
    pub is_individual: bool,
    /// `var`
    pub is_variable: bool,
    pub is_parallel: bool,
    /// Introduced with a leading `then`
    pub is_sequenced: bool,
    /// `return` parameter
    pub is_return: bool,
    /// `not satisfy`, `assert not`, ...
    pub is_negated: bool,
}

/// `= e`, `:= e` or `default e`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureValue {
    pub expr: ExprId,
    pub is_default: bool,
    /// `:=`: an initial rather than a bound value
    pub is_initial: bool,
}

/// Construct-specific parts of connectors and action/state nodes.
///
/// Parts that are features themselves (connector ends, payloads, loop
/// variables, effect actions, else branches) are owned members of the
/// feature and referenced here by id.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureDetail {
    Connector {
        ends: Vec<ElementId>,
        /// Payload of a flow (`flow of p : P from a to b`)
        payload: Option<ElementId>,
    },
    Accept(AcceptDetail),
    Send {
        payload: Option<ExprId>,
        via: Option<ExprId>,
        to: Option<ExprId>,
    },
    Assign {
        target: Reference,
        value: ExprId,
    },
    If {
        condition: ExprId,
        /// `if c then t;`
        then_target: Option<Reference>,
        /// Anonymous action for `else { ... }`, or the nested if of `else if`
        else_branch: Option<ElementId>,
    },
    Loop {
        /// `while` condition; `None` for `loop`
        condition: Option<ExprId>,
        until: Option<ExprId>,
    },
    For {
        variable: ElementId,
        sequence: ExprId,
    },
    Terminate(Option<ExprId>),
    Transition(TransitionDetail),
    /// `satisfy R by x` / `verify R by x`
    SatisfiedBy(Reference),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcceptDetail {
    /// Payload parameter (`accept sig : Signal`)
    pub payload: Option<ElementId>,
    pub trigger: Option<Trigger>,
    pub via: Option<ExprId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub kind: TriggerKind,
    pub expr: ExprId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    At,
    After,
    When,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionDetail {
    pub source: Option<Reference>,
    pub accept: Option<AcceptDetail>,
    pub guard: Option<ExprId>,
    pub effect: Option<Effect>,
    pub target: Reference,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// An owned action (`do send x to y`)
    Action(ElementId),
    /// A performed action (`do doorOpen`)
    Reference(Reference),
}

// ============================================================================
// Multiplicity
// ============================================================================

/// Canonical multiplicity. Omitted multiplicity is `None` on the feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiplicity {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl Multiplicity {
    pub fn exactly(n: u64) -> Self {
        Self {
            lower: Some(Bound::Literal(n)),
            upper: Some(Bound::Literal(n)),
        }
    }

    pub fn range(lower: Bound, upper: Bound) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Expression bounds, lower first. A single `[e]` yields one id.
    pub fn bound_exprs(&self) -> Vec<ExprId> {
        let mut exprs = Vec::with_capacity(2);
        for bound in [self.lower, self.upper].into_iter().flatten() {
            if let Bound::Expr(id) = bound {
                if !exprs.contains(&id) {
                    exprs.push(id);
                }
            }
        }
        exprs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Literal(u64),
    /// `*`
    Unbounded,
    Expr(ExprId),
}

// ============================================================================
// Relationships
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub source: Endpoint,
    pub target: Reference,
    /// `: ~T`, typing by the conjugate of `T`
    pub conjugated: bool,
    /// The member element when the relationship is declared on its own
    pub declared_as: Option<ElementId>,
    pub range: TextRange,
}

impl Relationship {
    /// Whether the relationship is a clause of the element it starts from.
    pub fn is_owned(&self) -> bool {
        matches!(self.source, Endpoint::Element(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    Specialization,
    Subclassification,
    Conjugation,
    Disjoining,
    Unioning,
    Intersecting,
    Differencing,
    FeatureTyping,
    Subsetting,
    ReferenceSubsetting,
    CrossSubsetting,
    Redefinition,
    TypeFeaturing,
    FeatureInverting,
    FeatureChaining,
    Dependency,
}

impl RelationshipKind {
    /// Kinds that make the target a general of the source.
    pub fn is_generalization(self) -> bool {
        matches!(
            self,
            Self::Specialization
                | Self::Subclassification
                | Self::FeatureTyping
                | Self::Subsetting
                | Self::ReferenceSubsetting
                | Self::CrossSubsetting
                | Self::Redefinition
        )
    }
}

/// Where a relationship starts.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// The element whose declaration carries the clause
    Element(ElementId),
    /// The source named by a standalone declaration
    Reference(Reference),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DependencyDecl {
    pub clients: Vec<Reference>,
    pub suppliers: Vec<Reference>,
    /// One `Dependency` relationship per client and supplier pair
    pub relationships: Vec<RelationshipId>,
}

// ============================================================================
// References
// ============================================================================

/// An unresolved name as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    /// One path per feature chain segment; a plain name has one path
    pub paths: Vec<Vec<Name>>,
    /// Written with a leading `$::`
    pub global: bool,
    /// Element the name is looked up from
    pub scope: ElementId,
    pub range: TextRange,
}

impl Reference {
    pub fn is_chain(&self) -> bool {
        self.paths.len() > 1
    }

    /// Same path spelled the same way, ignoring scope and position.
    pub fn same_path(&self, other: &Reference) -> bool {
        self.global == other.global && self.paths == other.paths
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.global {
            f.write_str("$::")?;
        }
        for (i, path) in self.paths.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            for (j, segment) in path.iter().enumerate() {
                if j > 0 {
                    f.write_str("::")?;
                }
                f.write_str(segment)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Annotations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Comment {
        /// Annotated elements; empty means the owner
        about: Vec<Reference>,
        locale: Option<String>,
        body: String,
    },
    Documentation {
        locale: Option<String>,
        body: String,
    },
    TextualRepresentation {
        language: String,
        body: String,
    },
    MetadataUsage {
        metaclass: Reference,
        about: Vec<Reference>,
    },
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Null,
    Reference(Reference),
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    /// `if c ? a else b`
    Conditional {
        condition: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    /// `x istype T`; the operand may be omitted for `istype`, `hastype`, `@`
    Classification {
        op: ClassificationOp,
        operand: Option<ExprId>,
        ty: Reference,
    },
    Cast {
        op: CastOp,
        operand: ExprId,
        ty: Reference,
    },
    Sequence(Vec<ExprId>),
    Invocation {
        callee: Reference,
        args: Arguments,
    },
    /// `new T(args)`
    Instantiation {
        ty: Reference,
        args: Arguments,
    },
    /// `base.feature`
    FeatureChain {
        base: ExprId,
        feature: Reference,
    },
    /// `base#(i)`
    Index {
        base: ExprId,
        index: ExprId,
    },
    /// `base[i]`
    Bracket {
        base: ExprId,
        index: ExprId,
    },
    /// `base.{ body }`
    Collect {
        base: ExprId,
        body: ElementId,
    },
    /// `base.?{ body }`
    Select {
        base: ExprId,
        body: ElementId,
    },
    /// `base->f(args)`, `base->f { body }` or `base->f g`
    Arrow {
        base: ExprId,
        function: Reference,
        arg: ArrowArg,
    },
    /// `name.metadata`
    MetadataAccess(Reference),
    /// `{ body }`, an anonymous expression element
    Body(ElementId),
    /// `all T`
    Extent(Reference),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Boolean(bool),
    String(String),
    Integer(u64),
    Real(f64),
    /// `*`
    Infinity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    Positional(Vec<ExprId>),
    Named(Vec<(Name, ExprId)>),
}

impl Arguments {
    pub fn exprs(&self) -> Vec<ExprId> {
        match self {
            Self::Positional(args) => args.clone(),
            Self::Named(args) => args.iter().map(|(_, expr)| *expr).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Positional(args) => args.len(),
            Self::Named(args) => args.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrowArg {
    Args(Arguments),
    Body(ElementId),
    Function(Reference),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    NullCoalesce,
    Implies,
    Or,
    BitOr,
    Xor,
    And,
    BitAnd,
    Eq,
    Ne,
    Same,
    NotSame,
    Lt,
    Gt,
    Le,
    Ge,
    Range,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Caret,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NullCoalesce => "??",
            Self::Implies => "implies",
            Self::Or => "or",
            Self::BitOr => "|",
            Self::Xor => "xor",
            Self::And => "and",
            Self::BitAnd => "&",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Same => "===",
            Self::NotSame => "!==",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Range => "..",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Pow => "**",
            Self::Caret => "^",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    Not,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::BitNot => "~",
            Self::Not => "not",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationOp {
    IsType,
    HasType,
    /// `@`
    At,
    /// `@@`, metaclassification
    MetaAt,
}

impl ClassificationOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IsType => "istype",
            Self::HasType => "hastype",
            Self::At => "@",
            Self::MetaAt => "@@",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastOp {
    As,
    Meta,
}

impl CastOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::As => "as",
            Self::Meta => "meta",
        }
    }
}

// ============================================================================
// Model
// ============================================================================

/// All elements, relationships and expressions of one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub elements: Arena<Element>,
    pub relationships: Arena<Relationship>,
    pub exprs: Arena<Expr>,
    root: ElementId,
    /// Name or short name to member index, per owning element
    scopes: FxHashMap<ElementId, IndexMap<Name, usize>>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// A model holding only the empty root namespace.
    pub fn new() -> Self {
        let mut elements = Arena::new();
        let root = elements.alloc(Element::new(
            ElementKind::Root,
            None,
            TextRange::default(),
        ));
        Self {
            elements,
            relationships: Arena::new(),
            exprs: Arena::new(),
            root,
            scopes: FxHashMap::default(),
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    pub fn relationship(&self, id: RelationshipId) -> &Relationship {
        &self.relationships[id]
    }

    /// Top-level member elements.
    pub fn top_level(&self) -> Vec<ElementId> {
        self.element(self.root).owned_members().collect()
    }

    /// The name table of `owner`, in declaration order.
    pub fn scope(&self, owner: ElementId) -> Option<&IndexMap<Name, usize>> {
        self.scopes.get(&owner)
    }

    pub(crate) fn scope_mut(&mut self, owner: ElementId) -> &mut IndexMap<Name, usize> {
        self.scopes.entry(owner).or_default()
    }

    /// The membership registered under `name` in `owner`.
    pub fn lookup_member(&self, owner: ElementId, name: &str) -> Option<&Membership> {
        let index = *self.scopes.get(&owner)?.get(name)?;
        self.element(owner).members.get(index)
    }

    /// Find an element by its qualified name (`P::A::x`).
    pub fn find(&self, qualified_name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, element)| element.qualified_name.as_deref() == Some(qualified_name))
            .map(|(id, _)| id)
    }

    /// Owners of `id`, innermost first, ending with the root.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.element(id).owner, |&owner| self.element(owner).owner)
    }

    // ========================================================================
    // Lexical resolution
    // ========================================================================

    /// Resolve a reference by lexical lookup.
    ///
    /// The first segment is looked up in the reference scope and then in
    /// each enclosing owner; remaining segments, and later feature chain
    /// segments, descend through owned members. Aliases are followed.
    /// Imports are never consulted.
    pub fn resolve(&self, reference: &Reference) -> Option<ElementId> {
        let (first, rest) = reference.paths.split_first()?;
        let mut current = self.resolve_path(first, reference.scope, reference.global, 0)?;
        for path in rest {
            current = self.descend(current, path, 0)?;
        }
        Some(current)
    }

    fn resolve_path(
        &self,
        path: &[Name],
        scope: ElementId,
        global: bool,
        hops: u32,
    ) -> Option<ElementId> {
        let (head, rest) = path.split_first()?;
        let start = if global {
            self.member_target(self.root, head, hops)?
        } else {
            std::iter::once(scope)
                .chain(self.ancestors(scope))
                .find_map(|namespace| self.member_target(namespace, head, hops))?
        };
        self.descend(start, rest, hops)
    }

    fn descend(&self, start: ElementId, path: &[Name], hops: u32) -> Option<ElementId> {
        path.iter()
            .try_fold(start, |current, segment| self.member_target(current, segment, hops))
    }

    fn member_target(&self, owner: ElementId, name: &Name, hops: u32) -> Option<ElementId> {
        match &self.lookup_member(owner, name)?.member {
            Member::Owned(id) => Some(*id),
            Member::Alias(alias) if hops < MAX_ALIAS_HOPS => {
                let target = &alias.target;
                let (first, rest) = target.paths.split_first()?;
                let mut current = self.resolve_path(first, target.scope, target.global, hops + 1)?;
                for path in rest {
                    current = self.descend(current, path, hops + 1)?;
                }
                Some(current)
            }
            _ => None,
        }
    }

    // ========================================================================
    // Structural equality
    // ========================================================================

    /// Whether expression `a` of this model and `b` of `other` have the same
    /// structure. Ranges, arena indices and reference scopes are ignored.
    pub fn expr_eq(&self, a: ExprId, other: &Model, b: ExprId) -> bool {
        let mut pending = vec![(a, b)];
        while let Some((a, b)) = pending.pop() {
            let left = &self.expr(a).kind;
            let right = &other.expr(b).kind;
            let equal = match (left, right) {
                (ExprKind::Literal(x), ExprKind::Literal(y)) => x == y,
                (ExprKind::Null, ExprKind::Null) => true,
                (ExprKind::Reference(x), ExprKind::Reference(y))
                | (ExprKind::MetadataAccess(x), ExprKind::MetadataAccess(y))
                | (ExprKind::Extent(x), ExprKind::Extent(y)) => x.same_path(y),
                (
                    ExprKind::Binary { op, lhs, rhs },
                    ExprKind::Binary {
                        op: op2,
                        lhs: lhs2,
                        rhs: rhs2,
                    },
                ) => {
                    pending.push((*lhs, *lhs2));
                    pending.push((*rhs, *rhs2));
                    op == op2
                }
                (ExprKind::Unary { op, operand }, ExprKind::Unary { op: op2, operand: operand2 }) => {
                    pending.push((*operand, *operand2));
                    op == op2
                }
                (
                    ExprKind::Conditional {
                        condition,
                        then_expr,
                        else_expr,
                    },
                    ExprKind::Conditional {
                        condition: condition2,
                        then_expr: then2,
                        else_expr: else2,
                    },
                ) => {
                    pending.extend([
                        (*condition, *condition2),
                        (*then_expr, *then2),
                        (*else_expr, *else2),
                    ]);
                    true
                }
                (
                    ExprKind::Classification { op, operand, ty },
                    ExprKind::Classification {
                        op: op2,
                        operand: operand2,
                        ty: ty2,
                    },
                ) => match (operand, operand2) {
                    (Some(x), Some(y)) => {
                        pending.push((*x, *y));
                        op == op2 && ty.same_path(ty2)
                    }
                    (None, None) => op == op2 && ty.same_path(ty2),
                    _ => false,
                },
                (
                    ExprKind::Cast { op, operand, ty },
                    ExprKind::Cast {
                        op: op2,
                        operand: operand2,
                        ty: ty2,
                    },
                ) => {
                    pending.push((*operand, *operand2));
                    op == op2 && ty.same_path(ty2)
                }
                (ExprKind::Sequence(xs), ExprKind::Sequence(ys)) => {
                    pending.extend(xs.iter().copied().zip(ys.iter().copied()));
                    xs.len() == ys.len()
                }
                (
                    ExprKind::Invocation { callee, args },
                    ExprKind::Invocation {
                        callee: callee2,
                        args: args2,
                    },
                )
                | (
                    ExprKind::Instantiation { ty: callee, args },
                    ExprKind::Instantiation {
                        ty: callee2,
                        args: args2,
                    },
                ) => callee.same_path(callee2) && args_eq(args, args2, &mut pending),
                (
                    ExprKind::FeatureChain { base, feature },
                    ExprKind::FeatureChain {
                        base: base2,
                        feature: feature2,
                    },
                ) => {
                    pending.push((*base, *base2));
                    feature.same_path(feature2)
                }
                (ExprKind::Index { base, index }, ExprKind::Index { base: base2, index: index2 })
                | (
                    ExprKind::Bracket { base, index },
                    ExprKind::Bracket {
                        base: base2,
                        index: index2,
                    },
                ) => {
                    pending.extend([(*base, *base2), (*index, *index2)]);
                    true
                }
                (ExprKind::Collect { base, body }, ExprKind::Collect { base: base2, body: body2 })
                | (ExprKind::Select { base, body }, ExprKind::Select { base: base2, body: body2 }) => {
                    pending.push((*base, *base2));
                    self.body_eq(*body, other, *body2, &mut pending)
                }
                (
                    ExprKind::Arrow {
                        base,
                        function,
                        arg,
                    },
                    ExprKind::Arrow {
                        base: base2,
                        function: function2,
                        arg: arg2,
                    },
                ) => {
                    pending.push((*base, *base2));
                    function.same_path(function2)
                        && match (arg, arg2) {
                            (ArrowArg::Args(x), ArrowArg::Args(y)) => args_eq(x, y, &mut pending),
                            (ArrowArg::Body(x), ArrowArg::Body(y)) => {
                                self.body_eq(*x, other, *y, &mut pending)
                            }
                            (ArrowArg::Function(x), ArrowArg::Function(y)) => x.same_path(y),
                            _ => false,
                        }
                }
                (ExprKind::Body(x), ExprKind::Body(y)) => self.body_eq(*x, other, *y, &mut pending),
                _ => false,
            };
            if !equal {
                return false;
            }
        }
        true
    }

    /// Bodies match when their parameter declarations and result
    /// expressions are equal.
    fn body_eq(
        &self,
        a: ElementId,
        other: &Model,
        b: ElementId,
        pending: &mut Vec<(ExprId, ExprId)>,
    ) -> bool {
        let left = self.element(a);
        let right = other.element(b);
        let parameters = |model: &Model, element: &Element| -> Vec<ElementId> {
            element
                .owned_members()
                .filter(|id| model.element(*id).as_feature().is_some())
                .collect()
        };
        let (xs, ys) = (parameters(self, left), parameters(other, right));
        if xs.len() != ys.len() {
            return false;
        }
        for (x, y) in xs.into_iter().zip(ys) {
            if !self.parameter_eq(x, other, y, pending) {
                return false;
            }
        }
        match (left.result, right.result) {
            (Some(x), Some(y)) => {
                pending.push((x, y));
                true
            }
            (None, None) => true,
            _ => false,
        }
    }

    /// Direction, name, clauses, multiplicity and value; not the feature kind.
    fn parameter_eq(
        &self,
        a: ElementId,
        other: &Model,
        b: ElementId,
        pending: &mut Vec<(ExprId, ExprId)>,
    ) -> bool {
        let (left, right) = (self.element(a), other.element(b));
        let (Some(x), Some(y)) = (left.as_feature(), right.as_feature()) else {
            return false;
        };
        if left.name != right.name
            || x.direction != y.direction
            || x.modifiers.is_ordered != y.modifiers.is_ordered
            || x.modifiers.is_nonunique != y.modifiers.is_nonunique
        {
            return false;
        }

        let (rs, ss) = (owned_clauses(self, x), owned_clauses(other, y));
        if rs.len() != ss.len()
            || rs.iter().zip(&ss).any(|(r, s)| {
                r.kind != s.kind || r.conjugated != s.conjugated || !r.target.same_path(&s.target)
            })
        {
            return false;
        }

        let bounds_eq = |p: Option<Bound>, q: Option<Bound>, pending: &mut Vec<(ExprId, ExprId)>| {
            match (p, q) {
                (Some(Bound::Expr(e)), Some(Bound::Expr(f))) => {
                    pending.push((e, f));
                    true
                }
                (p, q) => p == q,
            }
        };
        let multiplicity_eq = match (&x.multiplicity, &y.multiplicity) {
            (Some(m), Some(n)) => {
                bounds_eq(m.lower, n.lower, pending) && bounds_eq(m.upper, n.upper, pending)
            }
            (None, None) => true,
            _ => false,
        };
        if !multiplicity_eq {
            return false;
        }

        match (&x.value, &y.value) {
            (Some(v), Some(w)) => {
                pending.push((v.expr, w.expr));
                v.is_default == w.is_default && v.is_initial == w.is_initial
            }
            (None, None) => true,
            _ => false,
        }
    }
}

fn owned_clauses<'m>(model: &'m Model, feature: &FeatureDecl) -> Vec<&'m Relationship> {
    feature
        .relationships
        .iter()
        .map(|id| model.relationship(*id))
        .filter(|r| r.is_owned())
        .collect()
}

fn args_eq(a: &Arguments, b: &Arguments, pending: &mut Vec<(ExprId, ExprId)>) -> bool {
    match (a, b) {
        (Arguments::Positional(xs), Arguments::Positional(ys)) => {
            pending.extend(xs.iter().copied().zip(ys.iter().copied()));
            xs.len() == ys.len()
        }
        (Arguments::Named(xs), Arguments::Named(ys)) => {
            if xs.len() != ys.len() || xs.iter().zip(ys).any(|((n1, _), (n2, _))| n1 != n2) {
                return false;
            }
            pending.extend(xs.iter().zip(ys).map(|((_, x), (_, y))| (*x, *y)));
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(model: &Model, text: &str) -> Reference {
        Reference {
            paths: text
                .split('.')
                .map(|path| path.split("::").map(Name::new).collect())
                .collect(),
            global: false,
            scope: model.root(),
            range: TextRange::default(),
        }
    }

    #[test]
    fn test_new_model_has_only_root() {
        let model = Model::new();
        assert_eq!(model.elements.len(), 1);
        assert!(matches!(model.element(model.root()).kind, ElementKind::Root));
        assert!(model.top_level().is_empty());
    }

    #[test]
    fn test_reference_display() {
        let model = Model::new();
        let mut r = reference(&model, "A::B.c");
        assert_eq!(r.to_string(), "A::B.c");
        assert!(r.is_chain());
        r.global = true;
        assert_eq!(r.to_string(), "$::A::B.c");
    }

    #[test]
    fn test_multiplicity_bound_exprs_dedupes() {
        let expr = ExprId::from_raw(4);
        let m = Multiplicity::range(Bound::Expr(expr), Bound::Expr(expr));
        assert_eq!(m.bound_exprs(), vec![expr]);
        assert!(Multiplicity::exactly(3).bound_exprs().is_empty());
    }

    #[test]
    fn test_expr_eq_ignores_ranges() {
        let mut a = Model::new();
        let one = a.exprs.alloc(Expr {
            kind: ExprKind::Literal(Literal::Integer(1)),
            range: TextRange::default(),
        });
        let mut b = Model::new();
        let one_b = b.exprs.alloc(Expr {
            kind: ExprKind::Literal(Literal::Integer(1)),
            range: TextRange::new(5.into(), 6.into()),
        });
        let two_b = b.exprs.alloc(Expr {
            kind: ExprKind::Literal(Literal::Integer(2)),
            range: TextRange::default(),
        });
        assert!(a.expr_eq(one, &b, one_b));
        assert!(!a.expr_eq(one, &b, two_b));
    }
}

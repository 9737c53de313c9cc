//! Arena model of a parsed unit and the operations over it.
//!
//! ```text
//! result   → parse entry points: CST, model, diagnostics
//!   ↓
//! builder  → lowers the CST into the model
//!   ↓
//! model    → elements, relationships, expressions (arena ids)
//! ```
//!
//! [`walk`], [`graph`] and [`unparse`] read a finished model.

pub mod arena;
pub(crate) mod builder;
pub mod graph;
pub mod model;
mod result;
pub mod unparse;
pub mod walk;

pub use arena::{Arena, Idx};
pub use graph::{Edge, RelationshipGraph};
pub use model::*;
pub use result::{ExpressionResult, ParseOptions, ParseResult, parse, parse_expression, parse_with};
pub use unparse::{escape_name, reference_text, unparse_expr};
pub use walk::{Handlers, NodeKind, NodeRef, Order, VisitAction, Visitor, WalkOutcome, walk, walk_model};

//! Type inference and checking for Escalier.
//!
//! Implements bidirectional inference with unification over an `ena`
//! union-find table, one-way subtyping for annotation checks, type
//! operator resolution, per-namespace declaration dependency analysis
//! with SCC ordering, and the declaration checker that drives it all.
//! Errors are accumulated with provenance, never thrown.

pub mod checker;
pub mod ctx;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod infer;
pub mod infer_pattern;
pub mod lower;
pub mod resolve;
pub mod scope;
pub mod subtype;
pub mod unify;

pub use checker::{check_module, TypeckResult};
pub use ctx::{AliasDef, ClassDef, EnumDef, InferCtx};
pub use diagnostics::render_diagnostic;
pub use error::{ConstraintOrigin, TypeError};
pub use graph::DepGraph;
pub use infer::{check_expr, infer_expr, member_lookup};
pub use infer_pattern::check_pattern;
pub use lower::lower_type_ann;
pub use scope::{Scope, TypeBinding, ValueBinding};

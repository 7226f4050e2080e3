//! The Escalier abstract syntax tree.
//!
//! Nodes are grouped into five sums -- expressions, patterns, statements,
//! declarations, and type annotations -- each carrying a span and, where
//! the grammar admits a type, an inferred-type slot filled in by the
//! checker. Traversal goes through the two-phase [`visitor::Visitor`].

pub mod bindings;
pub mod decl;
pub mod expr;
pub mod func;
pub mod ident;
pub mod module;
pub mod pattern;
pub mod slot;
pub mod stmt;
pub mod type_ann;
pub mod visitor;

pub use bindings::find_bindings;
pub use decl::{ClassMember, Decl, DeclKind, EnumMember, VarKind};
pub use expr::{BinaryOp, Expr, ExprKind, JsxAttr, MatchCase, ObjectElem, UnaryOp};
pub use func::{FuncSig, Param, TypeParam};
pub use ident::{Ident, ObjKey, QualIdent};
pub use module::{assemble, AssembleError, File, Module, Namespace, ParsedFile};
pub use pattern::{ObjectPatElem, Pattern, PatternKind};
pub use slot::TypeSlot;
pub use stmt::{Block, ImportSpecifier, ImportStmt, Stmt, StmtKind};
pub use type_ann::{MappedAnn, MappedAnnModifier, MatchAnnCase, ObjAnnElem, TypeAnn, TypeAnnKind};
pub use visitor::Visitor;

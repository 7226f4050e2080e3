//! Declaration nodes: named top-level bindings in a namespace.

use escalier_common::Span;

use crate::expr::Expr;
use crate::func::{FuncSig, Param, TypeParam};
use crate::ident::{Ident, ObjKey, QualIdent};
use crate::pattern::Pattern;
use crate::stmt::Block;
use crate::type_ann::{ObjAnnElem, TypeAnn};

/// Binding kind for variable declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Immutable binding (`val`).
    Val,
    /// Mutable binding (`var`).
    Var,
}

/// A declaration with its span and `export`/`declare` flags.
///
/// `declare` implies no initializer and no body; it is used by the
/// importer adapter for ambient declarations.
#[derive(Debug, Clone)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
    pub export: bool,
    pub declare: bool,
}

impl Decl {
    pub fn new(kind: DeclKind, span: Span) -> Self {
        Self { kind, span, export: false, declare: false }
    }

    pub fn declare(kind: DeclKind, span: Span) -> Self {
        Self { kind, span, export: false, declare: true }
    }

    /// The names this declaration introduces, for dependency analysis and
    /// scope population. Variable declarations can introduce several via
    /// destructuring.
    pub fn names(&self) -> Vec<String> {
        match &self.kind {
            DeclKind::Var { pattern, .. } => crate::bindings::find_bindings(pattern),
            DeclKind::Func { name, .. }
            | DeclKind::TypeAlias { name, .. }
            | DeclKind::Interface { name, .. }
            | DeclKind::Enum { name, .. }
            | DeclKind::Class { name, .. } => vec![name.name.clone()],
            DeclKind::Namespace { name, .. } => vec![name.name.clone()],
        }
    }

    /// The name of a non-variable declaration.
    pub fn name(&self) -> Option<&Ident> {
        match &self.kind {
            DeclKind::Var { .. } => None,
            DeclKind::Func { name, .. }
            | DeclKind::TypeAlias { name, .. }
            | DeclKind::Interface { name, .. }
            | DeclKind::Enum { name, .. }
            | DeclKind::Class { name, .. }
            | DeclKind::Namespace { name, .. } => Some(name),
        }
    }

    /// Whether this declaration introduces a type name (as opposed to, or
    /// in addition to, a value).
    pub fn declares_type(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::TypeAlias { .. }
                | DeclKind::Interface { .. }
                | DeclKind::Enum { .. }
                | DeclKind::Class { .. }
        )
    }

    /// Whether this declaration introduces a value name.
    pub fn declares_value(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Var { .. }
                | DeclKind::Func { .. }
                | DeclKind::Enum { .. }
                | DeclKind::Class { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    Var {
        kind: VarKind,
        pattern: Pattern,
        type_ann: Option<TypeAnn>,
        init: Option<Box<Expr>>,
    },
    Func {
        name: Ident,
        sig: FuncSig,
        body: Option<Block>,
    },
    TypeAlias {
        name: Ident,
        type_params: Vec<TypeParam>,
        type_ann: TypeAnn,
    },
    Interface {
        name: Ident,
        type_params: Vec<TypeParam>,
        extends: Vec<(QualIdent, Vec<TypeAnn>)>,
        body: Vec<ObjAnnElem>,
    },
    Enum {
        name: Ident,
        type_params: Vec<TypeParam>,
        members: Vec<EnumMember>,
    },
    Class {
        name: Ident,
        type_params: Vec<TypeParam>,
        extends: Option<(QualIdent, Vec<TypeAnn>)>,
        ctor_params: Vec<Param>,
        body: Vec<ClassMember>,
    },
    /// A nested namespace declaration. Produced by the importer adapter;
    /// flattened away during module assembly and never present in an
    /// assembled namespace's declaration list.
    Namespace {
        name: Ident,
        body: Vec<Decl>,
    },
}

/// A member of an enum declaration.
#[derive(Debug, Clone)]
pub enum EnumMember {
    /// `Some(T, U)` -- a variant with payload annotations.
    Variant {
        name: Ident,
        types: Vec<TypeAnn>,
        span: Span,
    },
    /// `...Other` -- splice another enum's variants.
    Spread { type_ann: TypeAnn, span: Span },
}

/// A member of a class body.
#[derive(Debug, Clone)]
pub enum ClassMember {
    Method {
        key: ObjKey,
        sig: FuncSig,
        body: Option<Block>,
        is_static: bool,
    },
    Property {
        key: ObjKey,
        optional: bool,
        readonly: bool,
        type_ann: Option<TypeAnn>,
        init: Option<Expr>,
        is_static: bool,
    },
    Getter {
        key: ObjKey,
        ret: Option<TypeAnn>,
        body: Option<Block>,
        is_static: bool,
    },
    Setter {
        key: ObjKey,
        param: Param,
        body: Option<Block>,
        is_static: bool,
    },
}

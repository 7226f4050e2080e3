//! Pattern nodes: destructuring, extraction, and match arms.

use escalier_common::{Literal, Span};

use crate::expr::Expr;
use crate::ident::{Ident, ObjKey, QualIdent};
use crate::slot::TypeSlot;
use crate::type_ann::TypeAnn;

/// A pattern with its span and inferred-type slot.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
    pub inferred: TypeSlot,
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Self { kind, span, inferred: TypeSlot::new() }
    }

    /// A bare identifier binding.
    pub fn ident(name: impl Into<String>, span: Span) -> Self {
        Self::new(
            PatternKind::Ident {
                name: Ident::new(name, span),
                default: None,
                type_ann: None,
            },
            span,
        )
    }

    pub fn wildcard(span: Span) -> Self {
        Self::new(PatternKind::Wildcard, span)
    }

    pub fn inferred_type(&self) -> Option<escalier_types::Ty> {
        self.inferred.get()
    }

    pub fn set_inferred_type(&self, ty: escalier_types::Ty) {
        self.inferred.set(ty);
    }
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    /// A name binding, optionally with a default and a type annotation.
    Ident {
        name: Ident,
        default: Option<Box<Expr>>,
        type_ann: Option<Box<TypeAnn>>,
    },
    Object { elems: Vec<ObjectPatElem> },
    Tuple { elems: Vec<Pattern> },
    /// Algebraic-data extraction, e.g. `Some(x)` or `Opt.Some(x)`.
    Extractor { name: QualIdent, args: Vec<Pattern> },
    /// Class-instance matching: `Foo { a, b }`.
    Instance { class_name: QualIdent, object: Box<Pattern> },
    Rest { inner: Box<Pattern> },
    Lit { lit: Literal },
    Wildcard,
}

/// An element of an object pattern.
#[derive(Debug, Clone)]
pub enum ObjectPatElem {
    /// `key: pattern` with an optional default.
    KeyValue {
        key: ObjKey,
        value: Pattern,
        default: Option<Box<Expr>>,
    },
    /// `name` shorthand, binding the key's name directly.
    Shorthand { ident: Ident, default: Option<Box<Expr>> },
    /// `...rest` collecting the remaining properties.
    Rest { pattern: Pattern },
}

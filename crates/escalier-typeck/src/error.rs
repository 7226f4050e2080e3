//! Type errors with provenance tracking.
//!
//! Every error carries either a span or a [`ConstraintOrigin`] recording
//! where the offending constraint was generated. Errors are accumulated,
//! never thrown; after recording one, inference substitutes `unknown` for
//! the offending node's type and continues.

use std::fmt;

use escalier_common::{Diagnostic, Span};
use escalier_types::{Ty, TyVar};

/// The origin of a type constraint -- where in the source did we decide
/// these two types should be related?
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintOrigin {
    /// A binary operator applied to its operands.
    BinOp { op_span: Span },
    /// An argument checked against a parameter at a call site.
    Call { call_span: Span, arg_index: usize },
    /// An explicit type annotation.
    Annotation { span: Span },
    /// A return value checked against the function's return type.
    Return { span: Span },
    /// The two sides of an assignment.
    Assignment { span: Span },
    /// A pattern checked against the type it destructures.
    PatternBinding { span: Span },
    /// Branches of a conditional or match that must agree.
    Branches { span: Span },
    /// A declaration's placeholder unified with its inferred body.
    Declaration { span: Span },
    /// Synthetic origin for built-in constraints.
    Builtin,
}

impl ConstraintOrigin {
    pub fn span(&self) -> Span {
        match self {
            ConstraintOrigin::BinOp { op_span } => *op_span,
            ConstraintOrigin::Call { call_span, .. } => *call_span,
            ConstraintOrigin::Annotation { span }
            | ConstraintOrigin::Return { span }
            | ConstraintOrigin::Assignment { span }
            | ConstraintOrigin::PatternBinding { span }
            | ConstraintOrigin::Branches { span }
            | ConstraintOrigin::Declaration { span } => *span,
            ConstraintOrigin::Builtin => Span::synthetic(),
        }
    }
}

/// A type error encountered during checking.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    /// A type reference whose target cannot be resolved.
    UnknownType { name: String, span: Span },
    /// An identifier used as a value with no binding.
    UnknownValue { name: String, span: Span },
    /// Two types could not be unified.
    UnificationFailure {
        expected: Ty,
        found: Ty,
        origin: ConstraintOrigin,
    },
    /// A one-way compatibility check failed.
    SubtypeFailure {
        expected: Ty,
        found: Ty,
        origin: ConstraintOrigin,
    },
    /// A cyclic type was inferred.
    OccursCheck {
        var: TyVar,
        ty: Ty,
        origin: ConstraintOrigin,
    },
    /// Two declarations compete for one name in one scope.
    DuplicateBinding { name: String, span: Span },
    /// A `declare` declaration carries a body or initializer.
    IllegalDeclare { name: String, span: Span },
    /// A pattern incompatible with the shape of its target type.
    InvalidPattern { reason: String, span: Span },
    /// Unifying against a union matched more than one member.
    AmbiguousUnion {
        ty: Ty,
        union: Ty,
        origin: ConstraintOrigin,
    },
    /// A non-function value was called.
    NotAFunction { ty: Ty, span: Span },
    /// A call supplied the wrong number of arguments.
    ArityMismatch {
        expected: usize,
        found: usize,
        origin: ConstraintOrigin,
    },
    /// A property access on a type with no such property.
    NoSuchProperty { ty: Ty, prop: String, span: Span },
    /// `await` used outside an async function.
    AwaitOutsideAsync { span: Span },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UnknownType { name, .. } => write!(f, "unknown type `{name}`"),
            TypeError::UnknownValue { name, .. } => write!(f, "unknown value `{name}`"),
            TypeError::UnificationFailure { expected, found, .. } => {
                write!(f, "type mismatch: expected `{expected}`, found `{found}`")
            }
            TypeError::SubtypeFailure { expected, found, .. } => {
                write!(f, "`{found}` is not assignable to `{expected}`")
            }
            TypeError::OccursCheck { var, ty, .. } => {
                write!(f, "cyclic type: `t{}` occurs in `{ty}`", var.0)
            }
            TypeError::DuplicateBinding { name, .. } => {
                write!(f, "duplicate binding `{name}` in this scope")
            }
            TypeError::IllegalDeclare { name, .. } => {
                write!(f, "`declare` declaration `{name}` must not have a body or initializer")
            }
            TypeError::InvalidPattern { reason, .. } => {
                write!(f, "invalid pattern: {reason}")
            }
            TypeError::AmbiguousUnion { ty, union, .. } => {
                write!(f, "`{ty}` matches more than one member of `{union}`")
            }
            TypeError::NotAFunction { ty, .. } => write!(f, "`{ty}` is not a function"),
            TypeError::ArityMismatch { expected, found, .. } => {
                write!(f, "expected {expected} argument(s), found {found}")
            }
            TypeError::NoSuchProperty { ty, prop, .. } => {
                write!(f, "type `{ty}` has no property `{prop}`")
            }
            TypeError::AwaitOutsideAsync { .. } => {
                write!(f, "`await` is only allowed inside async functions")
            }
        }
    }
}

impl Diagnostic for TypeError {
    fn message(&self) -> String {
        self.to_string()
    }

    fn span(&self) -> Span {
        match self {
            TypeError::UnknownType { span, .. }
            | TypeError::UnknownValue { span, .. }
            | TypeError::DuplicateBinding { span, .. }
            | TypeError::IllegalDeclare { span, .. }
            | TypeError::InvalidPattern { span, .. }
            | TypeError::NotAFunction { span, .. }
            | TypeError::NoSuchProperty { span, .. }
            | TypeError::AwaitOutsideAsync { span } => *span,
            TypeError::UnificationFailure { origin, .. }
            | TypeError::SubtypeFailure { origin, .. }
            | TypeError::OccursCheck { origin, .. }
            | TypeError::AmbiguousUnion { origin, .. }
            | TypeError::ArityMismatch { origin, .. } => origin.span(),
        }
    }
}

impl std::error::Error for TypeError {}

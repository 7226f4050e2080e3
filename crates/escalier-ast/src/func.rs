//! Function signatures, parameters, and type parameters.
//!
//! One [`FuncSig`] shape is shared by function expressions, function
//! declarations, interface methods, class members, and the importer.

use escalier_common::Span;

use crate::pattern::Pattern;
use crate::type_ann::TypeAnn;

/// A declared type parameter, e.g. `T extends U = Default`.
#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub constraint: Option<Box<TypeAnn>>,
    pub default: Option<Box<TypeAnn>>,
    pub span: Span,
}

impl TypeParam {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), constraint: None, default: None, span }
    }
}

/// A function parameter: pattern, optionality, and annotation.
#[derive(Debug, Clone)]
pub struct Param {
    pub pattern: Pattern,
    pub optional: bool,
    pub type_ann: Option<TypeAnn>,
}

impl Param {
    pub fn new(pattern: Pattern) -> Self {
        Self { pattern, optional: false, type_ann: None }
    }

    pub fn with_type(pattern: Pattern, type_ann: TypeAnn) -> Self {
        Self { pattern, optional: false, type_ann: Some(type_ann) }
    }
}

/// A function signature.
#[derive(Debug, Clone, Default)]
pub struct FuncSig {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub ret: Option<Box<TypeAnn>>,
    pub throws: Option<Box<TypeAnn>>,
    pub is_async: bool,
}

impl FuncSig {
    pub fn new(params: Vec<Param>) -> Self {
        Self { params, ..Default::default() }
    }
}

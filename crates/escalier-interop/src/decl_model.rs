//! The abstract declaration-module model.
//!
//! This is the output contract of the external `.d.ts` parser: a
//! statement list already organized by declaration kind, with types in a
//! TypeScript-shaped sum. Token-level concerns never reach this crate.

use escalier_common::Literal;

/// One parsed declaration module (a `.d.ts` file or ambient block).
#[derive(Debug, Clone, Default)]
pub struct DeclModule {
    /// The module's name, used as the synthetic file path.
    pub name: String,
    pub statements: Vec<DeclStatement>,
}

#[derive(Debug, Clone)]
pub enum DeclStatement {
    Var {
        name: String,
        ty: DeclType,
    },
    Func {
        name: String,
        type_params: Vec<String>,
        params: Vec<DeclParam>,
        ret: DeclType,
    },
    TypeAlias {
        name: String,
        type_params: Vec<String>,
        ty: DeclType,
    },
    Interface {
        name: String,
        type_params: Vec<String>,
        extends: Vec<String>,
        members: Vec<DeclMember>,
    },
    Enum {
        name: String,
        members: Vec<DeclEnumMember>,
    },
    Class {
        name: String,
        type_params: Vec<String>,
        extends: Option<String>,
        ctor_params: Vec<DeclParam>,
        members: Vec<DeclMember>,
    },
    Namespace {
        name: String,
        body: Vec<DeclStatement>,
    },
    Import {
        names: Vec<String>,
        from: String,
    },
}

/// A function or constructor parameter.
#[derive(Debug, Clone)]
pub struct DeclParam {
    pub name: String,
    pub ty: DeclType,
    pub optional: bool,
    pub rest: bool,
}

/// A member of an interface, class, or object type.
#[derive(Debug, Clone)]
pub enum DeclMember {
    Property {
        name: String,
        ty: DeclType,
        optional: bool,
        readonly: bool,
    },
    Method {
        name: String,
        type_params: Vec<String>,
        params: Vec<DeclParam>,
        ret: DeclType,
        optional: bool,
    },
    Getter {
        name: String,
        ty: DeclType,
    },
    Setter {
        name: String,
        param: DeclParam,
    },
    Call {
        params: Vec<DeclParam>,
        ret: DeclType,
    },
    Construct {
        params: Vec<DeclParam>,
        ret: DeclType,
    },
    /// `[key: string]: T`
    IndexSignature {
        param_name: String,
        key: DeclType,
        value: DeclType,
        readonly: bool,
    },
    /// `[Symbol.iterator](): T` and friends.
    ComputedProperty { expr: String },
}

#[derive(Debug, Clone)]
pub struct DeclEnumMember {
    pub name: String,
    pub init: Option<Literal>,
}

/// A TypeScript-shaped type.
#[derive(Debug, Clone)]
pub enum DeclType {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    Number,
    String,
    Boolean,
    Symbol,
    BigInt,
    Object,
    This,
    Lit(Literal),
    Ref { name: String, args: Vec<DeclType> },
    Array(Box<DeclType>),
    Tuple(Vec<DeclType>),
    Union(Vec<DeclType>),
    Intersection(Vec<DeclType>),
    Func {
        type_params: Vec<String>,
        params: Vec<DeclParam>,
        ret: Box<DeclType>,
    },
    ObjectLit(Vec<DeclMember>),
    KeyOf(Box<DeclType>),
    IndexedAccess { target: Box<DeclType>, index: Box<DeclType> },
    TypeQuery(String),
    /// `x is T` -- no Escalier counterpart.
    TypePredicate { param: String, ty: Box<DeclType> },
}

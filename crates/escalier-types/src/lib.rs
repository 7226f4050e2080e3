//! Semantic type representation for the Escalier type system.
//!
//! Defines the core [`Ty`] lattice, type variables ([`TyVar`]), object
//! types and their elements, function types, and polymorphic schemes.
//! These are the currency of inference; they are distinct from the
//! surface type-annotation AST.

pub mod ty;

pub use ty::{
    MappedModifier, MappedTy, Primitive, PropKey, Scheme, Ty, TyCond, TyFunc, TyFuncParam,
    TyObject, TyObjectElem, TyRef, TyTypeParam, TyVar,
};

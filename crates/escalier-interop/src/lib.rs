//! Adapter from externally-parsed TypeScript declaration modules to the
//! Escalier AST.
//!
//! The `.d.ts` parser itself is an external collaborator; it hands this
//! crate a [`DeclModule`] and receives back an `escalier_ast::Module`
//! whose declarations all carry the `declare` flag, plus the list of
//! constructs that could not be translated.

pub mod convert;
pub mod decl_model;

pub use convert::{convert, ImportError};
pub use decl_model::{
    DeclEnumMember, DeclMember, DeclModule, DeclParam, DeclStatement, DeclType,
};

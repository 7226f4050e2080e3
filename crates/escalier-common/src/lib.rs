//! Shared data types for the Escalier compiler.
//!
//! Provides source identity ([`Source`], [`SourceSet`]), locations and spans
//! ([`Location`], [`Span`]), literal values ([`Literal`]), and the
//! [`Diagnostic`] trait that every compiler error implements.

pub mod diag;
pub mod literal;
pub mod source;
pub mod span;

pub use diag::{Diagnostic, ParseError};
pub use literal::Literal;
pub use source::{Source, SourceSet};
pub use span::{Location, SourceId, Span};

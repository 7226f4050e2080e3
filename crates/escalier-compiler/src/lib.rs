//! The Escalier compile entry.
//!
//! Wires the external parser interface, namespace assembly, the
//! declaration checker, and the emitters into one pipeline. The CLI and
//! file discovery live outside this workspace; this crate exposes the
//! library surface they drive.

pub mod names;
pub mod pipeline;

pub use names::{module_name, path_to_namespace};
pub use pipeline::{
    compile, write_artifacts, CompileOutput, ParsedSource, SourceParser,
};

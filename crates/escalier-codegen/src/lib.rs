//! Output generation for Escalier: JavaScript, TypeScript declarations,
//! and Source Map v3 files.

pub mod dts;
pub mod js;
pub mod source_map;

use escalier_ast::Namespace;
use escalier_typeck::TypeckResult;

pub use js::Printer;
pub use source_map::{vlq, SourceMap, SourceMapGenerator};

/// The three artifacts produced for one output module.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedModule {
    pub js: String,
    pub dts: String,
    pub source_map: String,
}

/// Emit one namespace as JS + DTS + source map.
///
/// `out_name` is the generated file's base name (e.g. `index`);
/// `source_path` names the primary source file for the map.
pub fn emit_namespace(
    namespace: &Namespace,
    typeck: &TypeckResult,
    out_name: &str,
    source_path: &str,
) -> EmittedModule {
    let printer = Printer::new(format!("{out_name}.js"), source_path);
    let (js, source_map) = printer.print_namespace(namespace);
    let dts = dts::print_namespace(namespace, typeck);
    EmittedModule { js, dts, source_map }
}

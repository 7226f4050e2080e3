//! The compile pipeline: sources in, emitted modules and diagnostics out.
//!
//! The surface parser is an external collaborator injected through
//! [`SourceParser`]. The pipeline assembles parsed files into one
//! namespaced module, checks it, and emits JS / DTS / source-map output
//! per namespace. Errors are collected, never thrown; emission proceeds
//! even for modules with type errors.

use std::io;
use std::path::{Path, PathBuf};

use escalier_ast::{assemble, ParsedFile, Stmt};
use escalier_codegen::{emit_namespace, EmittedModule};
use escalier_common::{ParseError, Source, SourceSet};
use escalier_typeck::{check_module, TypeError};

use crate::names::{module_name, path_to_namespace};

/// One source's parse result, as produced by the external parser.
pub struct ParsedSource {
    pub stmts: Vec<Stmt>,
    pub errors: Vec<ParseError>,
}

/// The parser interface consumed by the pipeline.
pub trait SourceParser {
    fn parse(&self, source: &Source) -> ParsedSource;
}

/// The result of compiling a package.
pub struct CompileOutput {
    /// Emitted modules in namespace appearance order, keyed by output
    /// module name (`index` for the root namespace).
    pub modules: Vec<(String, EmittedModule)>,
    pub parse_errors: Vec<ParseError>,
    pub type_errors: Vec<TypeError>,
    /// The sources, retained for diagnostic rendering.
    pub sources: SourceSet,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        !self.parse_errors.is_empty() || !self.type_errors.is_empty()
    }

    /// Render every diagnostic in input order.
    pub fn render_diagnostics(&self) -> String {
        let mut out = String::new();
        for err in &self.parse_errors {
            out.push_str(&escalier_common::diag::render_plain(err, &self.sources));
        }
        for err in &self.type_errors {
            out.push_str(&escalier_typeck::render_diagnostic(err, &self.sources));
        }
        out
    }
}

/// Compile an ordered list of sources.
pub fn compile(sources: Vec<Source>, parser: &dyn SourceParser) -> CompileOutput {
    let mut source_set = SourceSet::new();
    let mut parse_errors = Vec::new();
    let mut parsed_files = Vec::new();

    for source in sources {
        let parsed = parser.parse(&source);
        parse_errors.extend(parsed.errors);
        parsed_files.push(ParsedFile {
            default_namespace: path_to_namespace(&source.path),
            path: source.path.clone(),
            source: source.id,
            stmts: parsed.stmts,
        });
        source_set.insert(source);
    }

    let (module, assemble_errors) = assemble(parsed_files);
    let mut type_errors: Vec<TypeError> = assemble_errors
        .into_iter()
        .map(|err| match err {
            escalier_ast::AssembleError::InterfaceTypeParamMismatch { name, span } => {
                TypeError::DuplicateBinding { name, span }
            }
        })
        .collect();

    let typeck = check_module(&module);
    type_errors.extend(typeck.errors.iter().cloned());

    let mut modules = Vec::new();
    for namespace in &module.namespaces {
        let out_name = module_name(&namespace.path);
        let source_path = module
            .files
            .iter()
            .find(|f| f.default_namespace == namespace.path)
            .map(|f| f.path.clone())
            .unwrap_or_else(|| format!("{out_name}.esc"));
        let emitted = emit_namespace(namespace, &typeck, &out_name, &source_path);
        modules.push((out_name, emitted));
    }

    CompileOutput { modules, parse_errors, type_errors, sources: source_set }
}

/// Write `build/<module>.js`, `.d.ts`, and `.js.map` for every emitted
/// module. Returns the paths written.
pub fn write_artifacts(output: &CompileOutput, out_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (name, module) in &output.modules {
        let base = out_dir.join(name);
        if let Some(parent) = base.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let js_path = base.with_extension("js");
        let mut js = module.js.clone();
        js.push_str(&format!("//# sourceMappingURL={}.js.map\n", leaf_name(name)));
        std::fs::write(&js_path, js)?;
        written.push(js_path);

        let dts_path = base.with_extension("d.ts");
        std::fs::write(&dts_path, &module.dts)?;
        written.push(dts_path);

        let map_path = base.with_extension("js.map");
        std::fs::write(&map_path, &module.source_map)?;
        written.push(map_path);
    }
    Ok(written)
}

fn leaf_name(module: &str) -> &str {
    module.rsplit('/').next().unwrap_or(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_name_strips_directories() {
        assert_eq!(leaf_name("index"), "index");
        assert_eq!(leaf_name("a/b/c"), "c");
    }
}

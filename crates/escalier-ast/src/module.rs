//! The namespace model: modules, namespaces, files, and assembly.
//!
//! A [`Module`] maps dotted namespace paths (empty string for the root) to
//! ordered declaration lists, and keeps per-file import tables. Imports are
//! visible only to declarations originating in their file; declarations are
//! shared across files that target the same namespace.

use escalier_common::{Diagnostic, SourceId, Span};
use rustc_hash::FxHashMap;

use crate::decl::{Decl, DeclKind};
use crate::stmt::{ImportStmt, Stmt, StmtKind};

/// A namespace: a dotted path and its declarations in appearance order.
#[derive(Debug)]
pub struct Namespace {
    pub path: String,
    pub decls: Vec<Decl>,
}

/// A file record: path, source id, default namespace, and its imports.
#[derive(Debug)]
pub struct File {
    pub path: String,
    pub source: SourceId,
    pub default_namespace: String,
    pub imports: Vec<ImportStmt>,
}

/// The root container of namespaces for one compiled package.
///
/// Namespaces are stored in first-appearance order and indexed by path;
/// iteration order is deterministic across runs on the same inputs.
#[derive(Debug, Default)]
pub struct Module {
    pub namespaces: Vec<Namespace>,
    by_path: FxHashMap<String, usize>,
    pub files: Vec<File>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the namespace at `path`.
    pub fn namespace_mut(&mut self, path: &str) -> &mut Namespace {
        if let Some(&idx) = self.by_path.get(path) {
            return &mut self.namespaces[idx];
        }
        let idx = self.namespaces.len();
        self.by_path.insert(path.to_string(), idx);
        self.namespaces.push(Namespace { path: path.to_string(), decls: Vec::new() });
        &mut self.namespaces[idx]
    }

    pub fn namespace(&self, path: &str) -> Option<&Namespace> {
        self.by_path.get(path).map(|&idx| &self.namespaces[idx])
    }

    /// The file record a source id belongs to.
    pub fn file_for(&self, source: SourceId) -> Option<&File> {
        self.files.iter().find(|f| f.source == source)
    }
}

/// A parsed source file, as handed over by the (external) parser.
#[derive(Debug)]
pub struct ParsedFile {
    pub path: String,
    pub source: SourceId,
    /// Dotted namespace derived from the file's directory; empty for
    /// package-root files.
    pub default_namespace: String,
    pub stmts: Vec<Stmt>,
}

/// A conflict detected during namespace assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum AssembleError {
    /// Two interface declarations for one name disagree on type parameters.
    InterfaceTypeParamMismatch { name: String, span: Span },
}

impl Diagnostic for AssembleError {
    fn message(&self) -> String {
        match self {
            AssembleError::InterfaceTypeParamMismatch { name, .. } => format!(
                "interface `{name}` is declared with conflicting type parameters"
            ),
        }
    }

    fn span(&self) -> Span {
        match self {
            AssembleError::InterfaceTypeParamMismatch { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for AssembleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Build a [`Module`] from per-file parse results.
///
/// Top-level declarations append to the file's default namespace in file
/// order; nested namespace declarations are flattened by concatenating
/// path segments with `.`; interfaces that redeclare a name within one
/// namespace are merged. Imports stay attached to their file record.
pub fn assemble(files: Vec<ParsedFile>) -> (Module, Vec<AssembleError>) {
    let mut module = Module::new();
    let mut errors = Vec::new();

    for file in files {
        // A file pins its default namespace even when it contributes no
        // declarations, so emission still produces the module.
        module.namespace_mut(&file.default_namespace);
        let mut imports = Vec::new();
        for stmt in file.stmts {
            match stmt.kind {
                StmtKind::Import { import } => imports.push(import),
                StmtKind::Decl { decl } => {
                    append_decl(&mut module, &file.default_namespace, decl, &mut errors);
                }
                // Bare top-level expressions and returns have no namespace
                // meaning and are dropped here.
                StmtKind::Expr { .. } | StmtKind::Return { .. } => {}
            }
        }
        module.files.push(File {
            path: file.path,
            source: file.source,
            default_namespace: file.default_namespace,
            imports,
        });
    }

    (module, errors)
}

fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}

fn append_decl(module: &mut Module, ns_path: &str, decl: Decl, errors: &mut Vec<AssembleError>) {
    match decl.kind {
        DeclKind::Namespace { name, body } => {
            let nested = join_path(ns_path, &name.name);
            // Materialize the namespace even if its body is empty.
            module.namespace_mut(&nested);
            for inner in body {
                append_decl(module, &nested, inner, errors);
            }
        }
        _ => {
            if let DeclKind::Interface { .. } = &decl.kind {
                if try_merge_interface(module, ns_path, &decl, errors) {
                    return;
                }
            }
            module.namespace_mut(ns_path).decls.push(decl);
        }
    }
}

/// Merge `incoming` into an existing interface of the same name, if any.
/// Returns true when a merge happened.
fn try_merge_interface(
    module: &mut Module,
    ns_path: &str,
    incoming: &Decl,
    errors: &mut Vec<AssembleError>,
) -> bool {
    let DeclKind::Interface {
        name: in_name,
        type_params: in_params,
        extends: in_extends,
        body: in_body,
    } = &incoming.kind
    else {
        return false;
    };

    let namespace = module.namespace_mut(ns_path);
    for existing in namespace.decls.iter_mut() {
        let DeclKind::Interface { name, type_params, extends, body } = &mut existing.kind else {
            continue;
        };
        if name.name != in_name.name {
            continue;
        }
        // Type parameter lists must agree up to renaming.
        if type_params.len() != in_params.len() {
            errors.push(AssembleError::InterfaceTypeParamMismatch {
                name: in_name.name.clone(),
                span: incoming.span,
            });
            return true;
        }
        // Bodies concatenate in source order; extends clauses union.
        body.extend(in_body.iter().cloned());
        for (qi, args) in in_extends {
            let already = extends.iter().any(|(eq, _)| eq.to_string() == qi.to_string());
            if !already {
                extends.push((qi.clone(), args.clone()));
            }
        }
        existing.span = existing.span.merge(incoming.span);
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::VarKind;
    use crate::func::TypeParam;
    use crate::ident::Ident;
    use crate::pattern::Pattern;
    use crate::type_ann::ObjAnnElem;
    use escalier_common::{Literal, Span};

    fn val_decl(name: &str) -> Decl {
        Decl::new(
            DeclKind::Var {
                kind: VarKind::Val,
                pattern: Pattern::ident(name, Span::synthetic()),
                type_ann: None,
                init: Some(Box::new(crate::expr::Expr::literal(
                    Literal::Num(1.0),
                    Span::synthetic(),
                ))),
            },
            Span::synthetic(),
        )
    }

    fn decl_stmt(decl: Decl) -> Stmt {
        Stmt::new(StmtKind::Decl { decl }, Span::synthetic())
    }

    fn interface_decl(name: &str, n_params: usize) -> Decl {
        Decl::new(
            DeclKind::Interface {
                name: Ident::synthetic(name),
                type_params: (0..n_params)
                    .map(|i| TypeParam::new(format!("T{i}"), Span::synthetic()))
                    .collect(),
                extends: vec![],
                body: vec![ObjAnnElem::Property {
                    key: crate::ident::ObjKey::Ident(Ident::synthetic("p")),
                    optional: false,
                    readonly: false,
                    type_ann: crate::type_ann::TypeAnn::new(
                        crate::type_ann::TypeAnnKind::Number,
                        Span::synthetic(),
                    ),
                }],
            },
            Span::synthetic(),
        )
    }

    fn parsed(path: &str, source: u32, ns: &str, stmts: Vec<Stmt>) -> ParsedFile {
        ParsedFile {
            path: path.into(),
            source: SourceId(source),
            default_namespace: ns.into(),
            stmts,
        }
    }

    #[test]
    fn root_decls_land_in_root_namespace() {
        let (module, errors) = assemble(vec![parsed(
            "main.esc",
            0,
            "",
            vec![decl_stmt(val_decl("x"))],
        )]);
        assert!(errors.is_empty());
        assert_eq!(module.namespace("").unwrap().decls.len(), 1);
    }

    #[test]
    fn nested_namespace_decls_flatten() {
        let nested = Decl::new(
            DeclKind::Namespace {
                name: Ident::synthetic("geom"),
                body: vec![Decl::new(
                    DeclKind::Namespace {
                        name: Ident::synthetic("shapes"),
                        body: vec![val_decl("area")],
                    },
                    Span::synthetic(),
                )],
            },
            Span::synthetic(),
        );
        let (module, errors) = assemble(vec![parsed("g.esc", 0, "", vec![decl_stmt(nested)])]);
        assert!(errors.is_empty());
        let ns = module.namespace("geom.shapes").unwrap();
        assert_eq!(ns.decls.len(), 1);
        assert_eq!(ns.decls[0].names(), ["area"]);
        // No namespace decl survives assembly.
        assert!(module
            .namespaces
            .iter()
            .all(|ns| ns.decls.iter().all(|d| !matches!(d.kind, DeclKind::Namespace { .. }))));
    }

    #[test]
    fn interfaces_with_same_name_merge() {
        let (module, errors) = assemble(vec![
            parsed("a.esc", 0, "", vec![decl_stmt(interface_decl("P", 0))]),
            parsed("b.esc", 1, "", vec![decl_stmt(interface_decl("P", 0))]),
        ]);
        assert!(errors.is_empty());
        let ns = module.namespace("").unwrap();
        assert_eq!(ns.decls.len(), 1);
        let DeclKind::Interface { body, .. } = &ns.decls[0].kind else {
            panic!("expected interface");
        };
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn interface_type_param_conflict_is_reported() {
        let (_, errors) = assemble(vec![
            parsed("a.esc", 0, "", vec![decl_stmt(interface_decl("P", 1))]),
            parsed("b.esc", 1, "", vec![decl_stmt(interface_decl("P", 2))]),
        ]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            AssembleError::InterfaceTypeParamMismatch { .. }
        ));
    }

    #[test]
    fn imports_stay_on_their_file() {
        let import = Stmt::new(
            StmtKind::Import {
                import: ImportStmt {
                    specifiers: vec![],
                    module_path: "foo".into(),
                    span: Span::synthetic(),
                },
            },
            Span::synthetic(),
        );
        let (module, _) = assemble(vec![
            parsed("a.esc", 0, "", vec![import, decl_stmt(val_decl("x"))]),
            parsed("b.esc", 1, "", vec![decl_stmt(val_decl("y"))]),
        ]);
        assert_eq!(module.files[0].imports.len(), 1);
        assert!(module.files[1].imports.is_empty());
        assert_eq!(module.namespace("").unwrap().decls.len(), 2);
    }

    #[test]
    fn merge_is_order_insensitive_for_lookup() {
        let files_ab = vec![
            parsed("a.esc", 0, "", vec![decl_stmt(val_decl("x"))]),
            parsed("b.esc", 1, "", vec![decl_stmt(val_decl("y"))]),
        ];
        let files_ba = vec![
            parsed("b.esc", 1, "", vec![decl_stmt(val_decl("y"))]),
            parsed("a.esc", 0, "", vec![decl_stmt(val_decl("x"))]),
        ];
        let (m1, _) = assemble(files_ab);
        let (m2, _) = assemble(files_ba);
        let names = |m: &Module| {
            let mut names: Vec<String> = m
                .namespace("")
                .unwrap()
                .decls
                .iter()
                .flat_map(|d| d.names())
                .collect();
            names.sort();
            names
        };
        assert_eq!(names(&m1), names(&m2));
    }
}

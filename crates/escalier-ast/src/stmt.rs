//! Statements, blocks, and file-scoped imports.

use escalier_common::Span;

use crate::decl::Decl;
use crate::expr::Expr;
use crate::ident::Ident;

/// A sequence of statements with an overall span.
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Self { stmts, span }
    }

    /// A single-expression block.
    pub fn expr(expr: Expr) -> Self {
        let span = expr.span;
        Self::new(vec![Stmt::new(StmtKind::Expr { expr }, span)], span)
    }
}

/// A statement with its span.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Expr { expr: Expr },
    Decl { decl: Decl },
    Return { arg: Option<Box<Expr>> },
    /// File-scoped import; never promoted into a namespace.
    Import { import: ImportStmt },
}

/// An import statement: specifiers plus the module path.
#[derive(Debug, Clone)]
pub struct ImportStmt {
    pub specifiers: Vec<ImportSpecifier>,
    pub module_path: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ImportSpecifier {
    /// `import { imported as local }` (alias optional).
    Named { local: Ident, imported: Option<Ident> },
    /// `import * as local`.
    Namespace { local: Ident },
}

impl ImportSpecifier {
    /// The name the specifier introduces into the file's scope.
    pub fn local_name(&self) -> &str {
        match self {
            ImportSpecifier::Named { local, .. } => &local.name,
            ImportSpecifier::Namespace { local } => &local.name,
        }
    }
}

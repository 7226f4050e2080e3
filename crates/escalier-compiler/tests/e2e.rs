//! End-to-end pipeline tests: parse results in, emitted artifacts out.
//!
//! The external parser is modeled by a table-driven test double that maps
//! source paths to prebuilt ASTs. Expected JS/DTS outputs live under
//! `tests/fixtures/`; set `UPDATE_FIXTURES=true` to regenerate them.

use std::path::Path;

use escalier_ast::{
    BinaryOp, Block, Decl, DeclKind, Expr, FuncSig, Ident, Param, Pattern, Stmt, StmtKind,
    TypeAnn, TypeAnnKind, VarKind,
};
use escalier_common::{Literal, Location, ParseError, Source, SourceId, Span};
use escalier_compiler::{compile, write_artifacts, ParsedSource, SourceParser};
use rustc_hash::FxHashMap;

// ── Test parser double ─────────────────────────────────────────────────

struct TableParser {
    files: FxHashMap<String, fn(SourceId) -> ParsedSource>,
}

impl SourceParser for TableParser {
    fn parse(&self, source: &Source) -> ParsedSource {
        match self.files.get(&source.path) {
            Some(build) => build(source.id),
            None => ParsedSource {
                stmts: Vec::new(),
                errors: vec![ParseError::new(
                    format!("no parse table entry for {}", source.path),
                    Span::synthetic(),
                )],
            },
        }
    }
}

fn stmt_of(decl: Decl) -> Stmt {
    let span = decl.span;
    Stmt::new(StmtKind::Decl { decl }, span)
}

/// `val x = 5` with spans into "val x = 5\n".
fn parse_main(source: SourceId) -> ParsedSource {
    let decl_span = Span::new(Location::new(1, 1), Location::new(1, 10), source);
    let name_span = Span::new(Location::new(1, 5), Location::new(1, 6), source);
    let lit_span = Span::new(Location::new(1, 9), Location::new(1, 10), source);
    let decl = Decl::new(
        DeclKind::Var {
            kind: VarKind::Val,
            pattern: Pattern::ident("x", name_span),
            type_ann: None,
            init: Some(Box::new(Expr::literal(Literal::Num(5.0), lit_span))),
        },
        decl_span,
    );
    ParsedSource { stmts: vec![stmt_of(decl)], errors: Vec::new() }
}

/// `fn double(n: number) -> number { return n * 2 }`.
fn parse_math(_source: SourceId) -> ParsedSource {
    let sig = FuncSig {
        params: vec![Param::with_type(
            Pattern::ident("n", Span::synthetic()),
            TypeAnn::new(TypeAnnKind::Number, Span::synthetic()),
        )],
        ret: Some(Box::new(TypeAnn::new(TypeAnnKind::Number, Span::synthetic()))),
        ..FuncSig::default()
    };
    let body = Block::new(
        vec![Stmt::new(
            StmtKind::Return {
                arg: Some(Box::new(Expr::binary(
                    BinaryOp::Mul,
                    Expr::ident("n", Span::synthetic()),
                    Expr::literal(Literal::Num(2.0), Span::synthetic()),
                    Span::synthetic(),
                ))),
            },
            Span::synthetic(),
        )],
        Span::synthetic(),
    );
    let decl = Decl::new(
        DeclKind::Func {
            name: Ident::synthetic("double"),
            sig,
            body: Some(body),
        },
        Span::synthetic(),
    );
    ParsedSource { stmts: vec![stmt_of(decl)], errors: Vec::new() }
}

fn package_parser() -> TableParser {
    let mut files: FxHashMap<String, fn(SourceId) -> ParsedSource> = FxHashMap::default();
    files.insert("main.esc".into(), parse_main);
    files.insert("math/double.esc".into(), parse_math);
    TableParser { files }
}

fn package_sources() -> Vec<Source> {
    vec![
        Source::new(SourceId(0), "main.esc", "val x = 5\n"),
        Source::new(
            SourceId(1),
            "math/double.esc",
            "fn double(n: number) -> number { return n * 2 }\n",
        ),
    ]
}

// ── Fixtures ───────────────────────────────────────────────────────────

fn assert_fixture(name: &str, actual: &str) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    if std::env::var("UPDATE_FIXTURES").as_deref() == Ok("true") {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, actual).unwrap();
        return;
    }
    let expected = std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("missing fixture {name}; run with UPDATE_FIXTURES=true"));
    assert_eq!(actual, expected, "fixture mismatch for {name}");
}

// ── Tests ──────────────────────────────────────────────────────────────

#[test]
fn package_compiles_to_per_namespace_modules() {
    let output = compile(package_sources(), &package_parser());
    assert!(output.parse_errors.is_empty());
    assert!(output.type_errors.is_empty(), "errors: {:?}", output.type_errors);

    let names: Vec<&str> = output.modules.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["index", "math"]);

    let index = &output.modules[0].1;
    assert_fixture("index.js", &index.js);
    assert_fixture("index.d.ts", &index.dts);
    assert!(index.source_map.contains("\"version\":3"));
    assert!(index.source_map.contains("main.esc"));

    let math = &output.modules[1].1;
    assert_fixture("math.js", &math.js);
    assert_fixture("math.d.ts", &math.dts);
}

#[test]
fn artifacts_land_under_the_build_directory() {
    let output = compile(package_sources(), &package_parser());
    let out_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("e2e-build");
    let _ = std::fs::remove_dir_all(&out_dir);

    let written = write_artifacts(&output, &out_dir).unwrap();
    assert_eq!(written.len(), 6);
    assert!(out_dir.join("index.js").exists());
    assert!(out_dir.join("index.d.ts").exists());
    assert!(out_dir.join("index.js.map").exists());
    assert!(out_dir.join("math.js").exists());

    let js = std::fs::read_to_string(out_dir.join("index.js")).unwrap();
    assert!(js.ends_with("//# sourceMappingURL=index.js.map\n"));
}

#[test]
fn parse_errors_surface_without_stopping_the_build() {
    let sources = vec![Source::new(SourceId(0), "broken.esc", "val = !\n")];
    let output = compile(sources, &package_parser());
    assert_eq!(output.parse_errors.len(), 1);
    // An empty module still emits its (empty) root namespace.
    assert_eq!(output.modules.len(), 1);
    assert_eq!(output.modules[0].0, "index");
}

#[test]
fn type_errors_do_not_block_emission() {
    fn parse_bad(_source: SourceId) -> ParsedSource {
        let decl = Decl::new(
            DeclKind::Var {
                kind: VarKind::Val,
                pattern: Pattern::ident("y", Span::synthetic()),
                type_ann: None,
                init: Some(Box::new(Expr::binary(
                    BinaryOp::Add,
                    Expr::literal(Literal::Num(1.0), Span::synthetic()),
                    Expr::literal(Literal::str("oops"), Span::synthetic()),
                    Span::synthetic(),
                ))),
            },
            Span::synthetic(),
        );
        ParsedSource { stmts: vec![stmt_of(decl)], errors: Vec::new() }
    }
    let mut files: FxHashMap<String, fn(SourceId) -> ParsedSource> = FxHashMap::default();
    files.insert("main.esc".into(), parse_bad);
    let parser = TableParser { files };

    let output = compile(vec![Source::new(SourceId(0), "main.esc", "val y = 1 + \"oops\"\n")], &parser);
    assert_eq!(output.type_errors.len(), 1);
    let index = &output.modules[0].1;
    assert!(index.js.contains("const y = (1 + \"oops\");"));
    assert!(index.dts.contains("declare const y: unknown;"));
}

#[test]
fn imported_declarations_check_against_usage() {
    use escalier_interop::{convert, DeclModule, DeclStatement, DeclType};

    // declare const version: string;
    let decl_module = DeclModule {
        name: "lib".into(),
        statements: vec![DeclStatement::Var {
            name: "version".into(),
            ty: DeclType::String,
        }],
    };
    let (module, errors) = convert(&decl_module);
    assert!(errors.is_empty());

    let typeck = escalier_typeck::check_module(&module);
    assert!(typeck.errors.is_empty(), "errors: {:?}", typeck.errors);
    assert_eq!(
        typeck.binding("version"),
        Some(&escalier_types::Ty::str())
    );
}

//! Emission tests: JS text, declaration output, and source maps for
//! checked modules.

use escalier_ast::{
    assemble, Decl, DeclKind, Expr, ExprKind, FuncSig, Ident, Param, ParsedFile, Pattern, Stmt,
    StmtKind, TypeAnn, TypeAnnKind, VarKind,
};
use escalier_codegen::emit_namespace;
use escalier_common::{Literal, Location, SourceId, Span};
use escalier_typeck::check_module;

fn val(name: &str, init: Expr, span: Span) -> Decl {
    Decl::new(
        DeclKind::Var {
            kind: VarKind::Val,
            pattern: Pattern::ident(name, span),
            type_ann: None,
            init: Some(Box::new(init)),
        },
        span,
    )
}

fn root_module(decls: Vec<Decl>) -> escalier_ast::Module {
    let (module, errors) = assemble(vec![ParsedFile {
        path: "main.esc".into(),
        source: SourceId(0),
        default_namespace: String::new(),
        stmts: decls
            .into_iter()
            .map(|decl| Stmt::new(StmtKind::Decl { decl }, Span::synthetic()))
            .collect(),
    }]);
    assert!(errors.is_empty());
    module
}

#[test]
fn simple_binding_emits_const() {
    let span = Span::new(Location::new(1, 1), Location::new(1, 10), SourceId(0));
    let module = root_module(vec![val(
        "x",
        Expr::literal(Literal::Num(5.0), span),
        span,
    )]);
    let typeck = check_module(&module);
    assert!(typeck.errors.is_empty());

    let emitted = emit_namespace(module.namespace("").unwrap(), &typeck, "index", "main.esc");
    assert!(emitted.js.contains("const x = 5;"), "js was: {}", emitted.js);
    assert!(emitted.dts.contains("declare const x: number;"), "dts was: {}", emitted.dts);
    assert!(emitted.source_map.contains("\"version\":3"));
    assert!(emitted.source_map.contains("main.esc"));
}

#[test]
fn erroneous_module_still_emits_all_declarations() {
    // val y = 1 + "x"  -- a type error, but JS output still appears.
    let bad = val(
        "y",
        Expr::binary(
            escalier_ast::BinaryOp::Add,
            Expr::literal(Literal::Num(1.0), Span::synthetic()),
            Expr::literal(Literal::str("x"), Span::synthetic()),
            Span::synthetic(),
        ),
        Span::synthetic(),
    );
    let good = val("z", Expr::literal(Literal::Num(2.0), Span::synthetic()), Span::synthetic());
    let module = root_module(vec![bad, good]);
    let typeck = check_module(&module);
    assert!(!typeck.errors.is_empty());

    let emitted = emit_namespace(module.namespace("").unwrap(), &typeck, "index", "main.esc");
    assert!(emitted.js.contains("const y = (1 + \"x\");"), "js was: {}", emitted.js);
    assert!(emitted.js.contains("const z = 2;"));
    // The hole types as unknown in the declarations.
    assert!(emitted.dts.contains("declare const y: unknown;"), "dts was: {}", emitted.dts);
}

#[test]
fn function_emits_js_and_signature() {
    // fn inc(n: number) -> number { return n + 1 }
    let sig = FuncSig {
        params: vec![Param::with_type(
            Pattern::ident("n", Span::synthetic()),
            TypeAnn::new(TypeAnnKind::Number, Span::synthetic()),
        )],
        ret: Some(Box::new(TypeAnn::new(TypeAnnKind::Number, Span::synthetic()))),
        ..FuncSig::default()
    };
    let body = escalier_ast::Block::new(
        vec![Stmt::new(
            StmtKind::Return {
                arg: Some(Box::new(Expr::binary(
                    escalier_ast::BinaryOp::Add,
                    Expr::ident("n", Span::synthetic()),
                    Expr::literal(Literal::Num(1.0), Span::synthetic()),
                    Span::synthetic(),
                ))),
            },
            Span::synthetic(),
        )],
        Span::synthetic(),
    );
    let decl = Decl::new(
        DeclKind::Func {
            name: Ident::synthetic("inc"),
            sig,
            body: Some(body),
        },
        Span::synthetic(),
    );
    let module = root_module(vec![decl]);
    let typeck = check_module(&module);
    assert!(typeck.errors.is_empty(), "errors: {:?}", typeck.errors);

    let emitted = emit_namespace(module.namespace("").unwrap(), &typeck, "index", "main.esc");
    assert!(emitted.js.contains("function inc(n) {"), "js was: {}", emitted.js);
    assert!(emitted.js.contains("return (n + 1);"));
    assert!(
        emitted.dts.contains("declare function inc(n: number): number;"),
        "dts was: {}",
        emitted.dts
    );
}

#[test]
fn enum_and_match_emit_tag_dispatch() {
    use escalier_ast::{EnumMember, MatchCase, PatternKind, QualIdent, TypeParam};

    let opt = Decl::new(
        DeclKind::Enum {
            name: Ident::synthetic("Opt"),
            type_params: vec![TypeParam::new("T", Span::synthetic())],
            members: vec![
                EnumMember::Variant {
                    name: Ident::synthetic("Some"),
                    types: vec![TypeAnn::new(
                        TypeAnnKind::Ref {
                            name: QualIdent::Ident(Ident::synthetic("T")),
                            type_args: vec![],
                        },
                        Span::synthetic(),
                    )],
                    span: Span::synthetic(),
                },
                EnumMember::Variant {
                    name: Ident::synthetic("None"),
                    types: vec![],
                    span: Span::synthetic(),
                },
            ],
        },
        Span::synthetic(),
    );

    // val r = match Some(1) { Some(n) => n, None => 0 }
    let target = Expr::new(
        ExprKind::Call {
            callee: Box::new(Expr::ident("Some", Span::synthetic())),
            args: vec![Expr::literal(Literal::Num(1.0), Span::synthetic())],
            opt_chain: false,
        },
        Span::synthetic(),
    );
    let match_expr = Expr::new(
        ExprKind::Match {
            target: Box::new(target),
            cases: vec![
                MatchCase {
                    pattern: Pattern::new(
                        PatternKind::Extractor {
                            name: QualIdent::ident("Some", Span::synthetic()),
                            args: vec![Pattern::ident("n", Span::synthetic())],
                        },
                        Span::synthetic(),
                    ),
                    guard: None,
                    body: escalier_ast::Block::expr(Expr::ident("n", Span::synthetic())),
                    span: Span::synthetic(),
                },
                MatchCase {
                    pattern: Pattern::new(
                        PatternKind::Extractor {
                            name: QualIdent::ident("None", Span::synthetic()),
                            args: vec![],
                        },
                        Span::synthetic(),
                    ),
                    guard: None,
                    body: escalier_ast::Block::expr(Expr::literal(
                        Literal::Num(0.0),
                        Span::synthetic(),
                    )),
                    span: Span::synthetic(),
                },
            ],
        },
        Span::synthetic(),
    );
    let module = root_module(vec![opt, val("r", match_expr, Span::synthetic())]);
    let typeck = check_module(&module);
    assert!(typeck.errors.is_empty(), "errors: {:?}", typeck.errors);

    let emitted = emit_namespace(module.namespace("").unwrap(), &typeck, "index", "main.esc");
    assert!(emitted.js.contains("const Opt = {"), "js was: {}", emitted.js);
    assert!(emitted.js.contains("Some: (arg0) => ({ tag: \"Some\", values: [arg0] }),"));
    assert!(emitted.js.contains("__subject.tag === \"Some\""));
    assert!(emitted.js.contains("const n = __subject.values[0];"));
    assert!(emitted.dts.contains("type Opt<T> ="), "dts was: {}", emitted.dts);
}

//! End-to-end inference tests over programmatically built modules.
//!
//! These exercise the full pipeline: namespace assembly, dependency
//! ordering, placeholder unification, bidirectional inference, and slot
//! finalization.

mod common;

use common::*;
use escalier_ast::{BinaryOp, DeclKind, ExprKind, FuncSig, Pattern, PatternKind, StmtKind};
use escalier_common::Span;
use escalier_typeck::{check_module, TypeError};
use escalier_types::Ty;

// ── Scenario: simple value binding ─────────────────────────────────────

#[test]
fn simple_value_binding_widens_to_number() {
    let module = module_of(vec![val_decl("x", num(5.0))]);
    let result = check_module(&module);

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    assert_eq!(result.binding("x"), Some(&Ty::num()));
}

// ── Scenario: arithmetic mismatch ──────────────────────────────────────

#[test]
fn arithmetic_mismatch_recovers_with_unknown() {
    let module = module_of(vec![val_decl(
        "y",
        binary(BinaryOp::Add, num(1.0), string("hello")),
    )]);
    let result = check_module(&module);

    assert_eq!(result.errors.len(), 1, "errors: {:?}", result.errors);
    assert!(matches!(
        result.errors[0],
        TypeError::UnificationFailure { .. }
    ));
    assert_eq!(result.binding("y"), Some(&Ty::Unknown));
}

// ── Scenario: mutual recursion ─────────────────────────────────────────

fn even_odd_module() -> escalier_ast::Module {
    // fn even(n: number) -> boolean {
    //   if n == 0 { return true }
    //   return odd(n - 1)
    // }
    let make = |name: &str, other: &str, base: bool| {
        let sig = FuncSig {
            params: vec![typed_param("n", number_ann())],
            ret: Some(Box::new(boolean_ann())),
            ..FuncSig::default()
        };
        let cond = binary(BinaryOp::EqEq, ident("n"), num(0.0));
        let if_else = escalier_ast::Expr::new(
            ExprKind::IfElse {
                cond: Box::new(cond),
                cons: block(vec![return_stmt(boolean(base))]),
                alt: None,
            },
            Span::synthetic(),
        );
        let recurse = call(
            ident(other),
            vec![binary(BinaryOp::Sub, ident("n"), num(1.0))],
        );
        func_decl(name, sig, block(vec![expr_stmt(if_else), return_stmt(recurse)]))
    };
    module_of(vec![make("even", "odd", true), make("odd", "even", false)])
}

#[test]
fn mutual_recursion_infers_both_signatures() {
    let module = even_odd_module();
    let result = check_module(&module);

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    for name in ["even", "odd"] {
        let Some(Ty::Func(func)) = result.binding(name) else {
            panic!("expected a function binding for {name}");
        };
        assert_eq!(func.params.len(), 1);
        assert_eq!(func.params[0].ty, Ty::num());
        assert_eq!(*func.ret, Ty::bool());
    }
}

#[test]
fn mutual_recursion_forms_one_component_of_two() {
    let module = even_odd_module();
    let namespace = module.namespace("").unwrap();
    let graph = escalier_typeck::DepGraph::build(namespace);
    let sccs = graph.sccs();
    assert_eq!(sccs.len(), 1);
    assert_eq!(sccs[0], vec![0, 1]);
}

// ── Scenario: pattern destructure ──────────────────────────────────────

#[test]
fn object_destructure_binds_property_types() {
    // val { x, y } = { x: 1, y: "s" }
    let pattern = Pattern::new(
        PatternKind::Object {
            elems: vec![
                escalier_ast::ObjectPatElem::Shorthand {
                    ident: escalier_ast::Ident::synthetic("x"),
                    default: None,
                },
                escalier_ast::ObjectPatElem::Shorthand {
                    ident: escalier_ast::Ident::synthetic("y"),
                    default: None,
                },
            ],
        },
        Span::synthetic(),
    );
    assert_eq!(escalier_ast::find_bindings(&pattern), ["x", "y"]);

    let init = object_expr(vec![("x", num(1.0)), ("y", string("s"))]);
    let module = module_of(vec![val_decl_pattern(pattern, init)]);
    let result = check_module(&module);

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    assert_eq!(result.binding("x"), Some(&Ty::num()));
    assert_eq!(result.binding("y"), Some(&Ty::str()));
}

// ── Scenario: extractor pattern with enum ──────────────────────────────

#[test]
fn enum_match_types_extractor_bindings() {
    // enum Opt<T> { Some(T), None }
    // fn f(o: Opt<number>) -> number { match o { Some(n) => n, None => 0 } }
    let opt = enum_decl(
        "Opt",
        vec![type_param("T")],
        vec![("Some", vec![ref_ann("T", vec![])]), ("None", vec![])],
    );
    let sig = FuncSig {
        params: vec![typed_param("o", ref_ann("Opt", vec![number_ann()]))],
        ret: Some(Box::new(number_ann())),
        ..FuncSig::default()
    };
    let body = block(vec![expr_stmt(match_expr(
        ident("o"),
        vec![
            (
                extractor_pattern("Some", vec![Pattern::ident("n", Span::synthetic())]),
                block(vec![expr_stmt(ident("n"))]),
            ),
            (
                extractor_pattern("None", vec![]),
                block(vec![expr_stmt(num(0.0))]),
            ),
        ],
    ))]);
    let module = module_of(vec![opt, func_decl("f", sig, body)]);
    let result = check_module(&module);

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let Some(Ty::Func(func)) = result.binding("f") else {
        panic!("expected a function binding for f");
    };
    assert_eq!(*func.ret, Ty::num());

    // The binding pattern `n` finalizes to `number`.
    let namespace = module.namespace("").unwrap();
    let DeclKind::Func { body: Some(body), .. } = &namespace.decls[1].kind else {
        panic!("expected f's body");
    };
    let StmtKind::Expr { expr } = &body.stmts[0].kind else { panic!() };
    let ExprKind::Match { cases, .. } = &expr.kind else { panic!() };
    let PatternKind::Extractor { args, .. } = &cases[0].pattern.kind else { panic!() };
    assert_eq!(args[0].inferred.get(), Some(Ty::num()));
}

// ── Scenario: generic identity function ────────────────────────────────

#[test]
fn generic_identity_instantiates_per_call() {
    // fn id<T>(x: T) -> T { return x }
    let sig = FuncSig {
        type_params: vec![type_param("T")],
        params: vec![typed_param("x", ref_ann("T", vec![]))],
        ret: Some(Box::new(ref_ann("T", vec![]))),
        ..FuncSig::default()
    };
    let id = func_decl("id", sig, block(vec![return_stmt(ident("x"))]));
    let a = val_decl("a", call(ident("id"), vec![num(3.0)]));
    let b = val_decl("b", call(ident("id"), vec![string("s")]));
    let module = module_of(vec![id, a, b]);
    let result = check_module(&module);

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let Some(Ty::Func(func)) = result.binding("id") else {
        panic!("expected a function binding for id");
    };
    assert_eq!(func.type_params.len(), 1);
    assert_eq!(result.binding("a"), Some(&Ty::num()));
    assert_eq!(result.binding("b"), Some(&Ty::str()));
}

// ── Error recovery ─────────────────────────────────────────────────────

#[test]
fn multiple_errors_are_all_reported() {
    let module = module_of(vec![
        val_decl("a", binary(BinaryOp::Add, num(1.0), string("x"))),
        val_decl("b", ident("missing")),
        val_decl("c", num(1.0)),
    ]);
    let result = check_module(&module);

    assert!(result.errors.len() >= 2, "errors: {:?}", result.errors);
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, TypeError::UnknownValue { .. })));
    // The healthy declaration still infers.
    assert_eq!(result.binding("c"), Some(&Ty::num()));
}

#[test]
fn annotated_declaration_checks_initializer() {
    // val n: number = "oops"
    let decl = escalier_ast::Decl::new(
        DeclKind::Var {
            kind: escalier_ast::VarKind::Val,
            pattern: Pattern::ident("n", Span::synthetic()),
            type_ann: Some(number_ann()),
            init: Some(Box::new(string("oops"))),
        },
        Span::synthetic(),
    );
    let result = check_module(&module_of(vec![decl]));

    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0], TypeError::SubtypeFailure { .. }));
    // The binding keeps its annotated type for later use.
    assert_eq!(result.binding("n"), Some(&Ty::num()));
}

#[test]
fn duplicate_bindings_are_flagged() {
    let module = module_of(vec![val_decl("x", num(1.0)), val_decl("x", num(2.0))]);
    let result = check_module(&module);
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, TypeError::DuplicateBinding { .. })));
}

// ── Expression slots ───────────────────────────────────────────────────

#[test]
fn inferred_slots_are_finalized() {
    let module = module_of(vec![val_decl(
        "x",
        binary(BinaryOp::Add, num(1.0), num(2.0)),
    )]);
    let result = check_module(&module);
    assert!(result.errors.is_empty());

    let namespace = module.namespace("").unwrap();
    let DeclKind::Var { init: Some(init), pattern, .. } = &namespace.decls[0].kind else {
        panic!("expected var decl");
    };
    assert_eq!(init.inferred.get(), Some(Ty::num()));
    assert_eq!(pattern.inferred.get(), Some(Ty::num()));
    let ExprKind::Binary { left, right, .. } = &init.kind else { panic!() };
    assert_eq!(left.inferred.get(), Some(Ty::lit_num(1.0)));
    assert_eq!(right.inferred.get(), Some(Ty::lit_num(2.0)));
}

//! Shared AST builders for the integration tests. The surface parser
//! lives outside this workspace, so tests construct ASTs directly.
#![allow(dead_code)]

use escalier_ast::{
    assemble, BinaryOp, Block, Decl, DeclKind, EnumMember, Expr, ExprKind, FuncSig, Ident,
    MatchCase, Module, ObjectElem, Param, ParsedFile, Pattern, PatternKind, QualIdent, Stmt,
    StmtKind, TypeAnn, TypeAnnKind, TypeParam, VarKind,
};
use escalier_common::{Literal, Location, SourceId, Span};

pub fn span(source: u32, line: u32, start_col: u32, end_col: u32) -> Span {
    Span::new(
        Location::new(line, start_col),
        Location::new(line, end_col),
        SourceId(source),
    )
}

pub fn num(value: f64) -> Expr {
    Expr::literal(Literal::Num(value), Span::synthetic())
}

pub fn string(value: &str) -> Expr {
    Expr::literal(Literal::str(value), Span::synthetic())
}

pub fn boolean(value: bool) -> Expr {
    Expr::literal(Literal::Bool(value), Span::synthetic())
}

pub fn ident(name: &str) -> Expr {
    Expr::ident(name, Span::synthetic())
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::binary(op, left, right, Span::synthetic())
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::new(
        ExprKind::Call { callee: Box::new(callee), args, opt_chain: false },
        Span::synthetic(),
    )
}

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::new(StmtKind::Expr { expr }, Span::synthetic())
}

pub fn return_stmt(arg: Expr) -> Stmt {
    Stmt::new(StmtKind::Return { arg: Some(Box::new(arg)) }, Span::synthetic())
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    Block::new(stmts, Span::synthetic())
}

pub fn val_decl(name: &str, init: Expr) -> Decl {
    Decl::new(
        DeclKind::Var {
            kind: VarKind::Val,
            pattern: Pattern::ident(name, Span::synthetic()),
            type_ann: None,
            init: Some(Box::new(init)),
        },
        Span::synthetic(),
    )
}

pub fn val_decl_pattern(pattern: Pattern, init: Expr) -> Decl {
    Decl::new(
        DeclKind::Var {
            kind: VarKind::Val,
            pattern,
            type_ann: None,
            init: Some(Box::new(init)),
        },
        Span::synthetic(),
    )
}

pub fn number_ann() -> TypeAnn {
    TypeAnn::new(TypeAnnKind::Number, Span::synthetic())
}

pub fn boolean_ann() -> TypeAnn {
    TypeAnn::new(TypeAnnKind::Boolean, Span::synthetic())
}

pub fn ref_ann(name: &str, args: Vec<TypeAnn>) -> TypeAnn {
    TypeAnn::new(
        TypeAnnKind::Ref {
            name: QualIdent::ident(name, Span::synthetic()),
            type_args: args,
        },
        Span::synthetic(),
    )
}

pub fn typed_param(name: &str, ann: TypeAnn) -> Param {
    Param::with_type(Pattern::ident(name, Span::synthetic()), ann)
}

pub fn func_decl(name: &str, sig: FuncSig, body: Block) -> Decl {
    Decl::new(
        DeclKind::Func {
            name: Ident::synthetic(name),
            sig,
            body: Some(body),
        },
        Span::synthetic(),
    )
}

pub fn type_param(name: &str) -> TypeParam {
    TypeParam::new(name, Span::synthetic())
}

pub fn enum_decl(name: &str, type_params: Vec<TypeParam>, variants: Vec<(&str, Vec<TypeAnn>)>) -> Decl {
    Decl::new(
        DeclKind::Enum {
            name: Ident::synthetic(name),
            type_params,
            members: variants
                .into_iter()
                .map(|(vname, types)| EnumMember::Variant {
                    name: Ident::synthetic(vname),
                    types,
                    span: Span::synthetic(),
                })
                .collect(),
        },
        Span::synthetic(),
    )
}

pub fn extractor_pattern(name: &str, args: Vec<Pattern>) -> Pattern {
    Pattern::new(
        PatternKind::Extractor {
            name: QualIdent::ident(name, Span::synthetic()),
            args,
        },
        Span::synthetic(),
    )
}

pub fn match_expr(target: Expr, cases: Vec<(Pattern, Block)>) -> Expr {
    Expr::new(
        ExprKind::Match {
            target: Box::new(target),
            cases: cases
                .into_iter()
                .map(|(pattern, body)| MatchCase {
                    pattern,
                    guard: None,
                    body,
                    span: Span::synthetic(),
                })
                .collect(),
        },
        Span::synthetic(),
    )
}

pub fn object_expr(props: Vec<(&str, Expr)>) -> Expr {
    Expr::new(
        ExprKind::Object {
            elems: props
                .into_iter()
                .map(|(key, value)| ObjectElem::Property {
                    key: escalier_ast::ObjKey::Ident(Ident::synthetic(key)),
                    value,
                })
                .collect(),
        },
        Span::synthetic(),
    )
}

pub fn decl_stmt(decl: Decl) -> Stmt {
    Stmt::new(StmtKind::Decl { decl }, Span::synthetic())
}

/// Assemble a single-file root-namespace module from declarations.
pub fn module_of(decls: Vec<Decl>) -> Module {
    let (module, errors) = assemble(vec![ParsedFile {
        path: "main.esc".into(),
        source: SourceId(0),
        default_namespace: String::new(),
        stmts: decls.into_iter().map(decl_stmt).collect(),
    }]);
    assert!(errors.is_empty(), "unexpected assembly errors: {errors:?}");
    module
}

//! Two-phase AST traversal.
//!
//! For every node the visitor receives `enter_*`; children are traversed
//! only if `enter_*` returned true; `exit_*` is called with the same node
//! regardless. Child order is left-to-right over semantic fields, e.g.
//! `Binary` traverses left then right, `Func` traverses params, then the
//! return annotation, then the body.

use escalier_common::Literal;

use crate::decl::{ClassMember, Decl, DeclKind, EnumMember};
use crate::expr::{Expr, ExprKind, ObjectElem};
use crate::func::{FuncSig, TypeParam};
use crate::ident::ObjKey;
use crate::pattern::{ObjectPatElem, Pattern, PatternKind};
use crate::stmt::{Block, Stmt, StmtKind};
use crate::type_ann::{ObjAnnElem, TypeAnn, TypeAnnKind};

/// The two-phase visitor protocol. All `enter_*` hooks default to `true`
/// (recurse); all `exit_*` hooks default to no-ops.
pub trait Visitor {
    fn enter_literal(&mut self, _lit: &Literal) -> bool {
        true
    }
    fn exit_literal(&mut self, _lit: &Literal) {}

    fn enter_pattern(&mut self, _pattern: &Pattern) -> bool {
        true
    }
    fn exit_pattern(&mut self, _pattern: &Pattern) {}

    fn enter_expr(&mut self, _expr: &Expr) -> bool {
        true
    }
    fn exit_expr(&mut self, _expr: &Expr) {}

    fn enter_obj_elem(&mut self, _elem: &ObjectElem) -> bool {
        true
    }
    fn exit_obj_elem(&mut self, _elem: &ObjectElem) {}

    fn enter_stmt(&mut self, _stmt: &Stmt) -> bool {
        true
    }
    fn exit_stmt(&mut self, _stmt: &Stmt) {}

    fn enter_decl(&mut self, _decl: &Decl) -> bool {
        true
    }
    fn exit_decl(&mut self, _decl: &Decl) {}

    fn enter_type_ann(&mut self, _type_ann: &TypeAnn) -> bool {
        true
    }
    fn exit_type_ann(&mut self, _type_ann: &TypeAnn) {}

    fn enter_block(&mut self, _block: &Block) -> bool {
        true
    }
    fn exit_block(&mut self, _block: &Block) {}

    fn enter_class_member(&mut self, _member: &ClassMember) -> bool {
        true
    }
    fn exit_class_member(&mut self, _member: &ClassMember) {}
}

pub fn walk_literal<V: Visitor>(visitor: &mut V, lit: &Literal) {
    visitor.enter_literal(lit);
    visitor.exit_literal(lit);
}

fn walk_obj_key<V: Visitor>(visitor: &mut V, key: &ObjKey) {
    if let ObjKey::Computed(expr) = key {
        walk_expr(visitor, expr);
    }
}

fn walk_type_params<V: Visitor>(visitor: &mut V, type_params: &[TypeParam]) {
    for tp in type_params {
        if let Some(constraint) = &tp.constraint {
            walk_type_ann(visitor, constraint);
        }
        if let Some(default) = &tp.default {
            walk_type_ann(visitor, default);
        }
    }
}

/// Traverse a signature: params in order (pattern then annotation), then
/// the return annotation, then the throws annotation.
pub fn walk_func_sig<V: Visitor>(visitor: &mut V, sig: &FuncSig) {
    walk_type_params(visitor, &sig.type_params);
    for param in &sig.params {
        walk_pattern(visitor, &param.pattern);
        if let Some(ann) = &param.type_ann {
            walk_type_ann(visitor, ann);
        }
    }
    if let Some(ret) = &sig.ret {
        walk_type_ann(visitor, ret);
    }
    if let Some(throws) = &sig.throws {
        walk_type_ann(visitor, throws);
    }
}

pub fn walk_expr<V: Visitor>(visitor: &mut V, expr: &Expr) {
    if visitor.enter_expr(expr) {
        match &expr.kind {
            ExprKind::Binary { left, right, .. } => {
                walk_expr(visitor, left);
                walk_expr(visitor, right);
            }
            ExprKind::Unary { arg, .. } => walk_expr(visitor, arg),
            ExprKind::Literal { lit } => walk_literal(visitor, lit),
            ExprKind::Ident { .. } | ExprKind::Ignore | ExprKind::Empty => {}
            ExprKind::Func { sig, body } => {
                walk_func_sig(visitor, sig);
                walk_block(visitor, body);
            }
            ExprKind::Call { callee, args, .. } => {
                walk_expr(visitor, callee);
                for arg in args {
                    walk_expr(visitor, arg);
                }
            }
            ExprKind::Index { object, index, .. } => {
                walk_expr(visitor, object);
                walk_expr(visitor, index);
            }
            ExprKind::Member { object, .. } => walk_expr(visitor, object),
            ExprKind::Tuple { elems } => {
                for elem in elems {
                    walk_expr(visitor, elem);
                }
            }
            ExprKind::Object { elems } => {
                for elem in elems {
                    walk_obj_elem(visitor, elem);
                }
            }
            ExprKind::IfElse { cond, cons, alt } => {
                walk_expr(visitor, cond);
                walk_block(visitor, cons);
                if let Some(alt) = alt {
                    walk_block(visitor, alt);
                }
            }
            ExprKind::IfLet { pattern, target, cons, alt } => {
                walk_pattern(visitor, pattern);
                walk_expr(visitor, target);
                walk_block(visitor, cons);
                if let Some(alt) = alt {
                    walk_block(visitor, alt);
                }
            }
            ExprKind::Match { target, cases } => {
                walk_expr(visitor, target);
                for case in cases {
                    walk_pattern(visitor, &case.pattern);
                    if let Some(guard) = &case.guard {
                        walk_expr(visitor, guard);
                    }
                    walk_block(visitor, &case.body);
                }
            }
            ExprKind::Assign { left, right } => {
                walk_expr(visitor, left);
                walk_expr(visitor, right);
            }
            ExprKind::TryCatch { try_block, catch_cases, finally } => {
                walk_block(visitor, try_block);
                for case in catch_cases {
                    walk_pattern(visitor, &case.pattern);
                    if let Some(guard) = &case.guard {
                        walk_expr(visitor, guard);
                    }
                    walk_block(visitor, &case.body);
                }
                if let Some(finally) = finally {
                    walk_block(visitor, finally);
                }
            }
            ExprKind::Do { body } => walk_block(visitor, body),
            ExprKind::Await { arg } | ExprKind::Throw { arg } => walk_expr(visitor, arg),
            ExprKind::TemplateLit { exprs, .. } => {
                for e in exprs {
                    walk_expr(visitor, e);
                }
            }
            ExprKind::TaggedTemplateLit { tag, exprs, .. } => {
                walk_expr(visitor, tag);
                for e in exprs {
                    walk_expr(visitor, e);
                }
            }
            ExprKind::TypeCast { expr, type_ann } => {
                walk_expr(visitor, expr);
                walk_type_ann(visitor, type_ann);
            }
            ExprKind::JsxElement { attrs, children, .. } => {
                for attr in attrs {
                    if let Some(value) = &attr.value {
                        walk_expr(visitor, value);
                    }
                }
                for child in children {
                    walk_expr(visitor, child);
                }
            }
            ExprKind::JsxFragment { children } => {
                for child in children {
                    walk_expr(visitor, child);
                }
            }
        }
    }
    visitor.exit_expr(expr);
}

pub fn walk_obj_elem<V: Visitor>(visitor: &mut V, elem: &ObjectElem) {
    if visitor.enter_obj_elem(elem) {
        match elem {
            ObjectElem::Property { key, value } => {
                walk_obj_key(visitor, key);
                walk_expr(visitor, value);
            }
            ObjectElem::Shorthand { .. } => {}
            ObjectElem::Spread { expr } => walk_expr(visitor, expr),
        }
    }
    visitor.exit_obj_elem(elem);
}

pub fn walk_pattern<V: Visitor>(visitor: &mut V, pattern: &Pattern) {
    if visitor.enter_pattern(pattern) {
        match &pattern.kind {
            PatternKind::Ident { default, type_ann, .. } => {
                if let Some(default) = default {
                    walk_expr(visitor, default);
                }
                if let Some(ann) = type_ann {
                    walk_type_ann(visitor, ann);
                }
            }
            PatternKind::Object { elems } => {
                for elem in elems {
                    match elem {
                        ObjectPatElem::KeyValue { key, value, default } => {
                            walk_obj_key(visitor, key);
                            walk_pattern(visitor, value);
                            if let Some(default) = default {
                                walk_expr(visitor, default);
                            }
                        }
                        ObjectPatElem::Shorthand { default, .. } => {
                            if let Some(default) = default {
                                walk_expr(visitor, default);
                            }
                        }
                        ObjectPatElem::Rest { pattern } => walk_pattern(visitor, pattern),
                    }
                }
            }
            PatternKind::Tuple { elems } => {
                for elem in elems {
                    walk_pattern(visitor, elem);
                }
            }
            PatternKind::Extractor { args, .. } => {
                for arg in args {
                    walk_pattern(visitor, arg);
                }
            }
            PatternKind::Instance { object, .. } => walk_pattern(visitor, object),
            PatternKind::Rest { inner } => walk_pattern(visitor, inner),
            PatternKind::Lit { lit } => walk_literal(visitor, lit),
            PatternKind::Wildcard => {}
        }
    }
    visitor.exit_pattern(pattern);
}

pub fn walk_stmt<V: Visitor>(visitor: &mut V, stmt: &Stmt) {
    if visitor.enter_stmt(stmt) {
        match &stmt.kind {
            StmtKind::Expr { expr } => walk_expr(visitor, expr),
            StmtKind::Decl { decl } => walk_decl(visitor, decl),
            StmtKind::Return { arg } => {
                if let Some(arg) = arg {
                    walk_expr(visitor, arg);
                }
            }
            StmtKind::Import { .. } => {}
        }
    }
    visitor.exit_stmt(stmt);
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    if visitor.enter_block(block) {
        for stmt in &block.stmts {
            walk_stmt(visitor, stmt);
        }
    }
    visitor.exit_block(block);
}

pub fn walk_decl<V: Visitor>(visitor: &mut V, decl: &Decl) {
    if visitor.enter_decl(decl) {
        match &decl.kind {
            DeclKind::Var { pattern, type_ann, init, .. } => {
                walk_pattern(visitor, pattern);
                if let Some(ann) = type_ann {
                    walk_type_ann(visitor, ann);
                }
                if let Some(init) = init {
                    walk_expr(visitor, init);
                }
            }
            DeclKind::Func { sig, body, .. } => {
                walk_func_sig(visitor, sig);
                if let Some(body) = body {
                    walk_block(visitor, body);
                }
            }
            DeclKind::TypeAlias { type_params, type_ann, .. } => {
                walk_type_params(visitor, type_params);
                walk_type_ann(visitor, type_ann);
            }
            DeclKind::Interface { type_params, extends, body, .. } => {
                walk_type_params(visitor, type_params);
                for (_, args) in extends {
                    for arg in args {
                        walk_type_ann(visitor, arg);
                    }
                }
                for elem in body {
                    walk_obj_ann_elem(visitor, elem);
                }
            }
            DeclKind::Enum { type_params, members, .. } => {
                walk_type_params(visitor, type_params);
                for member in members {
                    match member {
                        EnumMember::Variant { types, .. } => {
                            for t in types {
                                walk_type_ann(visitor, t);
                            }
                        }
                        EnumMember::Spread { type_ann, .. } => walk_type_ann(visitor, type_ann),
                    }
                }
            }
            DeclKind::Class { type_params, extends, ctor_params, body, .. } => {
                walk_type_params(visitor, type_params);
                if let Some((_, args)) = extends {
                    for arg in args {
                        walk_type_ann(visitor, arg);
                    }
                }
                for param in ctor_params {
                    walk_pattern(visitor, &param.pattern);
                    if let Some(ann) = &param.type_ann {
                        walk_type_ann(visitor, ann);
                    }
                }
                for member in body {
                    walk_class_member(visitor, member);
                }
            }
            DeclKind::Namespace { body, .. } => {
                for decl in body {
                    walk_decl(visitor, decl);
                }
            }
        }
    }
    visitor.exit_decl(decl);
}

pub fn walk_class_member<V: Visitor>(visitor: &mut V, member: &ClassMember) {
    if visitor.enter_class_member(member) {
        match member {
            ClassMember::Method { key, sig, body, .. } => {
                walk_obj_key(visitor, key);
                walk_func_sig(visitor, sig);
                if let Some(body) = body {
                    walk_block(visitor, body);
                }
            }
            ClassMember::Property { key, type_ann, init, .. } => {
                walk_obj_key(visitor, key);
                if let Some(ann) = type_ann {
                    walk_type_ann(visitor, ann);
                }
                if let Some(init) = init {
                    walk_expr(visitor, init);
                }
            }
            ClassMember::Getter { key, ret, body, .. } => {
                walk_obj_key(visitor, key);
                if let Some(ret) = ret {
                    walk_type_ann(visitor, ret);
                }
                if let Some(body) = body {
                    walk_block(visitor, body);
                }
            }
            ClassMember::Setter { key, param, body, .. } => {
                walk_obj_key(visitor, key);
                walk_pattern(visitor, &param.pattern);
                if let Some(ann) = &param.type_ann {
                    walk_type_ann(visitor, ann);
                }
                if let Some(body) = body {
                    walk_block(visitor, body);
                }
            }
        }
    }
    visitor.exit_class_member(member);
}

fn walk_obj_ann_elem<V: Visitor>(visitor: &mut V, elem: &ObjAnnElem) {
    match elem {
        ObjAnnElem::Callable(sig) | ObjAnnElem::Constructor(sig) => walk_func_sig(visitor, sig),
        ObjAnnElem::Method { key, sig, .. } => {
            walk_obj_key(visitor, key);
            walk_func_sig(visitor, sig);
        }
        ObjAnnElem::Getter { key, ret } => {
            walk_obj_key(visitor, key);
            if let Some(ret) = ret {
                walk_type_ann(visitor, ret);
            }
        }
        ObjAnnElem::Setter { key, param } => {
            walk_obj_key(visitor, key);
            walk_type_ann(visitor, param);
        }
        ObjAnnElem::Property { key, type_ann, .. } => {
            walk_obj_key(visitor, key);
            walk_type_ann(visitor, type_ann);
        }
        ObjAnnElem::Mapped(mapped) => {
            if let Some(constraint) = &mapped.type_param.constraint {
                walk_type_ann(visitor, constraint);
            }
            if let Some(remap) = &mapped.name_remap {
                walk_type_ann(visitor, remap);
            }
            walk_type_ann(visitor, &mapped.value);
        }
        ObjAnnElem::RestSpread { value } => walk_type_ann(visitor, value),
    }
}

pub fn walk_type_ann<V: Visitor>(visitor: &mut V, type_ann: &TypeAnn) {
    if visitor.enter_type_ann(type_ann) {
        match &type_ann.kind {
            TypeAnnKind::Lit { lit } => walk_literal(visitor, lit),
            TypeAnnKind::Object { elems } => {
                for elem in elems {
                    walk_obj_ann_elem(visitor, elem);
                }
            }
            TypeAnnKind::Tuple { elems } => {
                for elem in elems {
                    walk_type_ann(visitor, elem);
                }
            }
            TypeAnnKind::Union { types } | TypeAnnKind::Intersection { types } => {
                for t in types {
                    walk_type_ann(visitor, t);
                }
            }
            TypeAnnKind::Ref { type_args, .. } => {
                for arg in type_args {
                    walk_type_ann(visitor, arg);
                }
            }
            TypeAnnKind::Func { sig } => walk_func_sig(visitor, sig),
            TypeAnnKind::KeyOf { target } | TypeAnnKind::Mutable { target } => {
                walk_type_ann(visitor, target);
            }
            TypeAnnKind::Index { target, index } => {
                walk_type_ann(visitor, target);
                walk_type_ann(visitor, index);
            }
            TypeAnnKind::Cond { check, extends, then_ty, else_ty } => {
                walk_type_ann(visitor, check);
                walk_type_ann(visitor, extends);
                walk_type_ann(visitor, then_ty);
                walk_type_ann(visitor, else_ty);
            }
            TypeAnnKind::Match { target, cases } => {
                walk_type_ann(visitor, target);
                for case in cases {
                    walk_type_ann(visitor, &case.extends);
                    walk_type_ann(visitor, &case.then_ty);
                }
            }
            TypeAnnKind::TemplateLit { types, .. } => {
                for t in types {
                    walk_type_ann(visitor, t);
                }
            }
            TypeAnnKind::Import { type_args, .. } => {
                for arg in type_args {
                    walk_type_ann(visitor, arg);
                }
            }
            TypeAnnKind::RestSpread { value } => walk_type_ann(visitor, value),
            TypeAnnKind::Number
            | TypeAnnKind::String
            | TypeAnnKind::Boolean
            | TypeAnnKind::Symbol
            | TypeAnnKind::UniqueSymbol
            | TypeAnnKind::BigInt
            | TypeAnnKind::Any
            | TypeAnnKind::Unknown
            | TypeAnnKind::Never
            | TypeAnnKind::Void
            | TypeAnnKind::TypeOf { .. }
            | TypeAnnKind::Infer { .. }
            | TypeAnnKind::Wildcard
            | TypeAnnKind::Intrinsic
            | TypeAnnKind::Empty => {}
        }
    }
    visitor.exit_type_ann(type_ann);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BinaryOp;
    use escalier_common::{Literal, Span};

    /// Records enter/exit counts and optionally vetoes expression recursion.
    #[derive(Default)]
    struct Counter {
        enter_expr: usize,
        exit_expr: usize,
        enter_literal: usize,
        exit_literal: usize,
        veto_exprs: bool,
    }

    impl Visitor for Counter {
        fn enter_expr(&mut self, _: &Expr) -> bool {
            self.enter_expr += 1;
            !self.veto_exprs
        }
        fn exit_expr(&mut self, _: &Expr) {
            self.exit_expr += 1;
        }
        fn enter_literal(&mut self, _: &Literal) -> bool {
            self.enter_literal += 1;
            true
        }
        fn exit_literal(&mut self, _: &Literal) {
            self.exit_literal += 1;
        }
    }

    fn one_plus_two() -> Expr {
        Expr::binary(
            BinaryOp::Add,
            Expr::literal(Literal::Num(1.0), Span::synthetic()),
            Expr::literal(Literal::Num(2.0), Span::synthetic()),
            Span::synthetic(),
        )
    }

    #[test]
    fn enter_and_exit_pair_up() {
        let mut counter = Counter::default();
        walk_expr(&mut counter, &one_plus_two());
        assert_eq!(counter.enter_expr, 3);
        assert_eq!(counter.exit_expr, 3);
        assert_eq!(counter.enter_literal, 2);
        assert_eq!(counter.exit_literal, 2);
    }

    #[test]
    fn veto_skips_children_but_still_exits() {
        let mut counter = Counter { veto_exprs: true, ..Default::default() };
        walk_expr(&mut counter, &one_plus_two());
        // Only the root is entered; its children are skipped entirely.
        assert_eq!(counter.enter_expr, 1);
        assert_eq!(counter.exit_expr, 1);
        assert_eq!(counter.enter_literal, 0);
    }

    #[test]
    fn binary_traverses_left_then_right() {
        struct Order(Vec<String>);
        impl Visitor for Order {
            fn enter_expr(&mut self, expr: &Expr) -> bool {
                if let ExprKind::Literal { lit } = &expr.kind {
                    self.0.push(lit.to_string());
                }
                true
            }
        }
        let mut order = Order(Vec::new());
        walk_expr(&mut order, &one_plus_two());
        assert_eq!(order.0, ["1", "2"]);
    }
}

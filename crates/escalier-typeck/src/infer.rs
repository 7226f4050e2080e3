//! Bidirectional expression inference.
//!
//! `infer_expr` synthesizes a type bottom-up; `check_expr` forces
//! inference against an expected type where one is known (annotated
//! variables, function returns, call arguments). Both fill each node's
//! inferred-type slot and record errors instead of propagating them,
//! substituting `unknown` so later errors still surface in the same run.

use escalier_ast::{
    BinaryOp, Block, Decl, DeclKind, Expr, ExprKind, FuncSig, MatchCase, ObjectElem, Pattern,
    PatternKind, Stmt, StmtKind, UnaryOp, VarKind,
};
use escalier_common::{Literal, Span};
use escalier_types::{PropKey, Ty, TyFunc, TyFuncParam, TyObject, TyObjectElem, TyTypeParam};
use rustc_hash::FxHashMap;

use crate::ctx::{subst_named, EnumDef, InferCtx};
use crate::error::{ConstraintOrigin, TypeError};
use crate::infer_pattern::{check_pattern, resolve_extractor};
use crate::lower::{lower_func_sig, lower_type_ann, param_name};
use crate::scope::{Scope, TypeBinding, ValueBinding};

/// Synthesize an expression's type bottom-up.
pub fn infer_expr(ctx: &mut InferCtx, scope: &mut Scope, expr: &Expr) -> Ty {
    let ty = infer_kind(ctx, scope, expr);
    expr.inferred.set(ty.clone());
    ty
}

/// Infer an expression and check it against an expected type.
pub fn check_expr(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    expr: &Expr,
    expected: &Ty,
    origin: &ConstraintOrigin,
) -> Ty {
    let actual = infer_expr(ctx, scope, expr);
    let _ = ctx.subtype(&actual, expected, origin);
    actual
}

fn infer_kind(ctx: &mut InferCtx, scope: &mut Scope, expr: &Expr) -> Ty {
    match &expr.kind {
        ExprKind::Literal { lit } => Ty::Lit(lit.clone()),

        ExprKind::Ident { name } => match scope.lookup_value(&name.name) {
            Some(binding) => {
                let scheme = binding.scheme.clone();
                ctx.instantiate(&scheme, expr.span)
            }
            None => {
                // A bare enum-variant constructor, e.g. `Some(5)`.
                let qi = escalier_ast::QualIdent::ident(name.name.clone(), name.span);
                if let Some((def, idx)) = resolve_extractor(ctx, scope, &qi) {
                    return variant_value_ty(ctx, &def, idx, expr.span);
                }
                ctx.record(TypeError::UnknownValue {
                    name: name.name.clone(),
                    span: name.span,
                });
                Ty::Unknown
            }
        },

        ExprKind::Binary { op, left, right } => {
            infer_binary(ctx, scope, *op, left, right, expr.span)
        }

        ExprKind::Unary { op, arg } => {
            let arg_ty = infer_expr(ctx, scope, arg);
            match op {
                UnaryOp::Minus | UnaryOp::Plus => {
                    let origin = ConstraintOrigin::BinOp { op_span: expr.span };
                    let _ = ctx.unify(&arg_ty, &Ty::num(), &origin);
                    Ty::num()
                }
                UnaryOp::Not => Ty::bool(),
            }
        }

        ExprKind::Func { sig, body } => {
            let func = infer_func(ctx, scope, sig, Some(body), expr.span);
            Ty::Func(Box::new(func))
        }

        ExprKind::Call { callee, args, opt_chain } => {
            let callee_ty = infer_expr(ctx, scope, callee);
            let ret = infer_call(ctx, scope, &callee_ty, args, expr.span);
            if *opt_chain {
                Ty::union(vec![ret, Ty::undefined()])
            } else {
                ret
            }
        }

        ExprKind::Member { object, prop, opt_chain } => {
            // An enum referenced by name yields variant constructors.
            if let ExprKind::Ident { name } = &object.kind {
                if let Some(TypeBinding::Named(key)) = scope.lookup_type(&name.name) {
                    if let Some(def) = ctx.enums.get(key).cloned() {
                        if let Some(idx) =
                            def.variants.iter().position(|(v, _)| v == &prop.name)
                        {
                            object.inferred.set(Ty::reference(def.name.clone(), vec![]));
                            return variant_value_ty(ctx, &def, idx, expr.span);
                        }
                    }
                }
            }
            let object_ty = infer_expr(ctx, scope, object);
            let object_ty = if *opt_chain {
                strip_nullish(&object_ty)
            } else {
                object_ty
            };
            let result = member_lookup(ctx, &object_ty, &prop.name, prop.span);
            if *opt_chain {
                Ty::union(vec![result, Ty::undefined()])
            } else {
                result
            }
        }

        ExprKind::Index { object, index, opt_chain } => {
            let object_ty = infer_expr(ctx, scope, object);
            let index_ty = infer_expr(ctx, scope, index);
            let result = match ctx.resolve_index(&object_ty, &index_ty) {
                Some(ty) => ty,
                None => {
                    let object_ty = ctx.prune(&object_ty);
                    if matches!(object_ty, Ty::Object(_) | Ty::Tuple(_)) {
                        let prop = ctx.resolve(&index_ty).to_string();
                        ctx.record(TypeError::NoSuchProperty {
                            ty: object_ty,
                            prop,
                            span: index.span,
                        });
                    }
                    Ty::Unknown
                }
            };
            if *opt_chain {
                Ty::union(vec![result, Ty::undefined()])
            } else {
                result
            }
        }

        ExprKind::Tuple { elems } => {
            Ty::Tuple(elems.iter().map(|e| infer_expr(ctx, scope, e)).collect())
        }

        ExprKind::Object { elems } => infer_object(ctx, scope, elems),

        ExprKind::IfElse { cond, cons, alt } => {
            let cond_ty = infer_expr(ctx, scope, cond);
            let origin = ConstraintOrigin::Branches { span: cond.span };
            let _ = ctx.subtype(&cond_ty, &Ty::bool(), &origin);
            let cons_ty = infer_block(ctx, scope, cons);
            match alt {
                Some(alt) => {
                    let alt_ty = infer_block(ctx, scope, alt);
                    Ty::union(vec![cons_ty, alt_ty])
                }
                None => Ty::union(vec![cons_ty, Ty::undefined()]),
            }
        }

        ExprKind::IfLet { pattern, target, cons, alt } => {
            let target_ty = infer_expr(ctx, scope, target);
            scope.push();
            check_pattern(ctx, scope, pattern, &target_ty);
            let cons_ty = infer_block(ctx, scope, cons);
            scope.pop();
            match alt {
                Some(alt) => {
                    let alt_ty = infer_block(ctx, scope, alt);
                    Ty::union(vec![cons_ty, alt_ty])
                }
                None => Ty::union(vec![cons_ty, Ty::undefined()]),
            }
        }

        ExprKind::Match { target, cases } => infer_match(ctx, scope, target, cases, expr.span),

        ExprKind::Assign { left, right } => infer_assign(ctx, scope, left, right),

        ExprKind::TryCatch { try_block, catch_cases, finally } => {
            infer_try_catch(ctx, scope, try_block, catch_cases, finally)
        }

        ExprKind::Do { body } => infer_block(ctx, scope, body),

        ExprKind::Await { arg } => {
            let arg_ty = infer_expr(ctx, scope, arg);
            if !ctx.in_async_fn() {
                ctx.record(TypeError::AwaitOutsideAsync { span: expr.span });
            }
            let value = ctx.fresh_var(expr.span);
            let err = ctx.fresh_var(expr.span);
            let promise = Ty::promise(value.clone(), err.clone());
            let origin = ConstraintOrigin::Builtin;
            if ctx.subtype(&arg_ty, &promise, &origin).is_ok() {
                let err = ctx.prune(&err);
                ctx.add_throws(err);
                ctx.prune(&value)
            } else {
                Ty::Unknown
            }
        }

        ExprKind::Throw { arg } => {
            let arg_ty = infer_expr(ctx, scope, arg);
            let arg_ty = ctx.resolve(&arg_ty);
            ctx.add_throws(arg_ty);
            Ty::Never
        }

        ExprKind::TemplateLit { quasis, exprs } => {
            let types: Vec<Ty> = exprs.iter().map(|e| infer_expr(ctx, scope, e)).collect();
            ctx.resolve_template_lit(quasis, &types).unwrap_or(Ty::str())
        }

        ExprKind::TaggedTemplateLit { tag, quasis, exprs } => {
            let tag_ty = infer_expr(ctx, scope, tag);
            let expr_types: Vec<Ty> = exprs.iter().map(|e| infer_expr(ctx, scope, e)).collect();
            match ctx.prune(&tag_ty) {
                Ty::Func(func) => {
                    let func = ctx.alpha_rename(&func, expr.span);
                    // First parameter receives the quasis tuple, the rest
                    // the interpolated expressions.
                    if let Some(first) = func.params.first() {
                        let strings =
                            Ty::Tuple(quasis.iter().map(|q| Ty::lit_str(q.clone())).collect());
                        let origin = ConstraintOrigin::Call { call_span: expr.span, arg_index: 0 };
                        let _ = ctx.subtype(&strings, &first.ty, &origin);
                    }
                    for (i, (ty, param)) in
                        expr_types.iter().zip(func.params.iter().skip(1)).enumerate()
                    {
                        let origin = ConstraintOrigin::Call {
                            call_span: expr.span,
                            arg_index: i + 1,
                        };
                        let _ = ctx.subtype(ty, &param.ty, &origin);
                    }
                    ctx.prune(&func.ret)
                }
                Ty::Unknown => Ty::Unknown,
                other => {
                    ctx.record(TypeError::NotAFunction { ty: other, span: tag.span });
                    Ty::Unknown
                }
            }
        }

        ExprKind::TypeCast { expr: inner, type_ann } => {
            let target = lower_type_ann(ctx, scope, type_ann);
            let origin = ConstraintOrigin::Annotation { span: type_ann.span };
            check_expr(ctx, scope, inner, &target, &origin);
            target
        }

        ExprKind::JsxElement { attrs, children, .. } => {
            for attr in attrs {
                if let Some(value) = &attr.value {
                    infer_expr(ctx, scope, value);
                }
            }
            for child in children {
                infer_expr(ctx, scope, child);
            }
            Ty::reference("JSX.Element", vec![])
        }
        ExprKind::JsxFragment { children } => {
            for child in children {
                infer_expr(ctx, scope, child);
            }
            Ty::reference("JSX.Element", vec![])
        }

        ExprKind::Ignore | ExprKind::Empty => Ty::undefined(),
    }
}

// ── Binary operators ───────────────────────────────────────────────────

fn infer_binary(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    span: Span,
) -> Ty {
    if op == BinaryOp::Assign {
        return infer_assign(ctx, scope, left, right);
    }

    let left_ty = infer_expr(ctx, scope, left);
    let right_ty = infer_expr(ctx, scope, right);
    let origin = ConstraintOrigin::BinOp { op_span: span };

    match op {
        BinaryOp::Add => {
            // `+` is overloaded over numbers and strings.
            if ctx.try_subtype(&left_ty, &Ty::num(), &origin).is_ok() {
                if ctx.unify(&right_ty, &Ty::num(), &origin).is_ok() {
                    Ty::num()
                } else {
                    Ty::Unknown
                }
            } else if ctx.try_subtype(&left_ty, &Ty::str(), &origin).is_ok() {
                if ctx.unify(&right_ty, &Ty::str(), &origin).is_ok() {
                    Ty::str()
                } else {
                    Ty::Unknown
                }
            } else {
                let found = ctx.resolve(&left_ty);
                ctx.record(TypeError::UnificationFailure {
                    expected: Ty::union(vec![Ty::num(), Ty::str()]),
                    found,
                    origin,
                });
                Ty::Unknown
            }
        }

        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let _ = ctx.unify(&left_ty, &Ty::num(), &origin);
            let _ = ctx.unify(&right_ty, &Ty::num(), &origin);
            Ty::num()
        }

        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            // Both operands must share a numeric or string primitive.
            if ctx.try_subtype(&left_ty, &Ty::num(), &origin).is_ok() {
                let _ = ctx.subtype(&right_ty, &Ty::num(), &origin);
            } else if ctx.try_subtype(&left_ty, &Ty::str(), &origin).is_ok() {
                let _ = ctx.subtype(&right_ty, &Ty::str(), &origin);
            } else {
                let found = ctx.resolve(&left_ty);
                ctx.record(TypeError::UnificationFailure {
                    expected: Ty::union(vec![Ty::num(), Ty::str()]),
                    found,
                    origin,
                });
            }
            Ty::bool()
        }

        BinaryOp::EqEq | BinaryOp::NotEq => {
            let _ = ctx.unify(&left_ty, &right_ty, &origin);
            Ty::bool()
        }

        BinaryOp::And | BinaryOp::Or => Ty::union(vec![left_ty, right_ty]),

        BinaryOp::NullishCoalescing => {
            let non_nullish = strip_nullish(&left_ty);
            Ty::union(vec![non_nullish, right_ty])
        }

        BinaryOp::Concat => {
            let _ = ctx.unify(&left_ty, &Ty::str(), &origin);
            let _ = ctx.unify(&right_ty, &Ty::str(), &origin);
            Ty::str()
        }

        BinaryOp::Assign => unreachable!("handled above"),
    }
}

/// Remove `null` and `undefined` members from a union.
fn strip_nullish(ty: &Ty) -> Ty {
    match ty {
        Ty::Union(members) => Ty::union(
            members
                .iter()
                .filter(|t| {
                    !matches!(t, Ty::Lit(Literal::Null) | Ty::Lit(Literal::Undefined))
                })
                .cloned()
                .collect(),
        ),
        Ty::Lit(Literal::Null) | Ty::Lit(Literal::Undefined) => Ty::Never,
        other => other.clone(),
    }
}

// ── Objects ────────────────────────────────────────────────────────────

fn infer_object(ctx: &mut InferCtx, scope: &mut Scope, elems: &[ObjectElem]) -> Ty {
    let mut out: Vec<TyObjectElem> = Vec::new();
    for elem in elems {
        match elem {
            ObjectElem::Property { key, value } => {
                let value_ty = infer_expr(ctx, scope, value);
                let prop_key = match key {
                    escalier_ast::ObjKey::Ident(id) => Some(PropKey::str(id.name.clone())),
                    escalier_ast::ObjKey::Str(s, _) => Some(PropKey::str(s.clone())),
                    escalier_ast::ObjKey::Num(n, _) => Some(PropKey::Num(*n)),
                    escalier_ast::ObjKey::Computed(inner) => {
                        let inner_ty = infer_expr(ctx, scope, inner);
                        match ctx.prune(&inner_ty) {
                            Ty::Lit(Literal::Str(s)) => Some(PropKey::str(s)),
                            Ty::Lit(Literal::Num(n)) => Some(PropKey::Num(n)),
                            _ => None,
                        }
                    }
                };
                match prop_key {
                    Some(key) => out.push(TyObjectElem::Property {
                        key,
                        optional: false,
                        readonly: false,
                        ty: value_ty,
                    }),
                    None => ctx.record(TypeError::InvalidPattern {
                        reason: "object key is not statically known".into(),
                        span: key.span(),
                    }),
                }
            }
            ObjectElem::Shorthand { ident } => {
                let value_ty = match scope.lookup_value(&ident.name) {
                    Some(binding) => {
                        let scheme = binding.scheme.clone();
                        ctx.instantiate(&scheme, ident.span)
                    }
                    None => {
                        ctx.record(TypeError::UnknownValue {
                            name: ident.name.clone(),
                            span: ident.span,
                        });
                        Ty::Unknown
                    }
                };
                out.push(TyObjectElem::Property {
                    key: PropKey::str(ident.name.clone()),
                    optional: false,
                    readonly: false,
                    ty: value_ty,
                });
            }
            ObjectElem::Spread { expr } => {
                let spread_ty = infer_expr(ctx, scope, expr);
                match ctx.prune(&spread_ty) {
                    // Spreading an object injects its members directly.
                    Ty::Object(obj) => out.extend(obj.elems.iter().cloned()),
                    other => out.push(TyObjectElem::RestSpread(other)),
                }
            }
        }
    }
    Ty::Object(Box::new(TyObject::structural(out)))
}

// ── Member access ──────────────────────────────────────────────────────

/// Look up a property on an object-like type, distributing over unions
/// and driving inference through unsolved variables.
pub fn member_lookup(ctx: &mut InferCtx, object_ty: &Ty, prop: &str, span: Span) -> Ty {
    let object_ty = ctx.prune(object_ty);
    match &object_ty {
        Ty::Object(obj) => match obj.lookup(prop) {
            Some(ty) => ty,
            None => {
                // Interfaces inherit members through their extends chain.
                for parent in &obj.extends {
                    if let Some(expanded) = ctx.expand_ref(parent) {
                        let found = member_lookup(ctx, &expanded, prop, span);
                        if !found.is_unknown() {
                            return found;
                        }
                    }
                }
                ctx.record(TypeError::NoSuchProperty {
                    ty: object_ty.clone(),
                    prop: prop.to_string(),
                    span,
                });
                Ty::Unknown
            }
        },
        Ty::Ref(r) => match ctx.expand_ref(r) {
            Some(expanded) => member_lookup(ctx, &expanded, prop, span),
            None => {
                ctx.record(TypeError::NoSuchProperty {
                    ty: object_ty.clone(),
                    prop: prop.to_string(),
                    span,
                });
                Ty::Unknown
            }
        },
        Ty::Tuple(elems) => {
            if prop == "length" {
                return Ty::lit_num(elems.len() as f64);
            }
            ctx.record(TypeError::NoSuchProperty {
                ty: object_ty.clone(),
                prop: prop.to_string(),
                span,
            });
            Ty::Unknown
        }
        Ty::Union(members) => {
            let members = members.clone();
            let results: Vec<Ty> = members
                .iter()
                .map(|member| member_lookup(ctx, member, prop, span))
                .collect();
            Ty::union(results)
        }
        Ty::Var(_) => {
            // Property access drives inference: the object must have at
            // least this property.
            let prop_ty = ctx.fresh_var(span);
            let obj = Ty::Object(Box::new(TyObject::structural(vec![
                TyObjectElem::Property {
                    key: PropKey::str(prop.to_string()),
                    optional: false,
                    readonly: false,
                    ty: prop_ty.clone(),
                },
            ])));
            let _ = ctx.unify(&object_ty, &obj, &ConstraintOrigin::Builtin);
            prop_ty
        }
        Ty::Unknown => Ty::Unknown,
        _ => {
            ctx.record(TypeError::NoSuchProperty {
                ty: object_ty.clone(),
                prop: prop.to_string(),
                span,
            });
            Ty::Unknown
        }
    }
}

// ── Calls ──────────────────────────────────────────────────────────────

fn infer_call(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    callee_ty: &Ty,
    args: &[Expr],
    span: Span,
) -> Ty {
    let callee_ty = ctx.prune(callee_ty);
    match &callee_ty {
        Ty::Func(func) => {
            let func = ctx.alpha_rename(func, span);
            check_call_args(ctx, scope, &func, args, span);
            if let Some(throws) = &func.throws {
                let throws = ctx.resolve(throws);
                ctx.add_throws(throws);
            }
            ctx.prune(&func.ret)
        }
        Ty::Var(_) => {
            // Calling an unsolved variable shapes it into a function.
            let params: Vec<TyFuncParam> = args
                .iter()
                .enumerate()
                .map(|(i, arg)| {
                    let ty = infer_expr(ctx, scope, arg);
                    TyFuncParam::new(format!("arg{i}"), ty)
                })
                .collect();
            let ret = ctx.fresh_var(span);
            let func = Ty::func(params, ret.clone());
            let origin = ConstraintOrigin::Call { call_span: span, arg_index: 0 };
            let _ = ctx.unify(&callee_ty, &func, &origin);
            ret
        }
        Ty::Object(obj) => {
            let callable = obj.elems.iter().find_map(|e| match e {
                TyObjectElem::Callable(f) => Some(f.clone()),
                _ => None,
            });
            match callable {
                Some(func) => {
                    let func_ty = Ty::Func(Box::new(func));
                    infer_call(ctx, scope, &func_ty, args, span)
                }
                None => {
                    for arg in args {
                        infer_expr(ctx, scope, arg);
                    }
                    ctx.record(TypeError::NotAFunction { ty: callee_ty.clone(), span });
                    Ty::Unknown
                }
            }
        }
        Ty::Unknown => {
            for arg in args {
                infer_expr(ctx, scope, arg);
            }
            Ty::Unknown
        }
        _ => {
            for arg in args {
                infer_expr(ctx, scope, arg);
            }
            ctx.record(TypeError::NotAFunction { ty: callee_ty.clone(), span });
            Ty::Unknown
        }
    }
}

/// Check each argument against its (optionally defaulted) parameter; a
/// trailing rest parameter absorbs the remaining arguments.
fn check_call_args(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    func: &TyFunc,
    args: &[Expr],
    span: Span,
) {
    let has_rest = matches!(
        func.params.last().map(|p| ctx.prune(&p.ty)),
        Some(Ty::RestSpread(_))
    );
    let fixed = if has_rest {
        func.params.len() - 1
    } else {
        func.params.len()
    };

    for (i, param) in func.params[..fixed].iter().enumerate() {
        match args.get(i) {
            Some(arg) => {
                let origin = ConstraintOrigin::Call { call_span: arg.span, arg_index: i };
                check_expr(ctx, scope, arg, &param.ty, &origin);
            }
            None => {
                if !param.is_omittable() {
                    ctx.record(TypeError::ArityMismatch {
                        expected: fixed,
                        found: args.len(),
                        origin: ConstraintOrigin::Call { call_span: span, arg_index: i },
                    });
                    return;
                }
            }
        }
    }

    if has_rest {
        let Some(Ty::RestSpread(inner)) = func.params.last().map(|p| ctx.prune(&p.ty)) else {
            unreachable!("checked above");
        };
        let tail = &args[fixed.min(args.len())..];
        match ctx.prune(&inner) {
            Ty::Tuple(elem_types) => {
                for (j, arg) in tail.iter().enumerate() {
                    let expected = elem_types.get(j).cloned().unwrap_or(Ty::Unknown);
                    let origin = ConstraintOrigin::Call {
                        call_span: arg.span,
                        arg_index: fixed + j,
                    };
                    check_expr(ctx, scope, arg, &expected, &origin);
                }
            }
            elem => {
                for (j, arg) in tail.iter().enumerate() {
                    let origin = ConstraintOrigin::Call {
                        call_span: arg.span,
                        arg_index: fixed + j,
                    };
                    check_expr(ctx, scope, arg, &elem, &origin);
                }
            }
        }
    } else if args.len() > fixed {
        ctx.record(TypeError::ArityMismatch {
            expected: fixed,
            found: args.len(),
            origin: ConstraintOrigin::Call { call_span: span, arg_index: fixed },
        });
    }
}

// ── Match / assignment / try ───────────────────────────────────────────

fn infer_match(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    target: &Expr,
    cases: &[MatchCase],
    span: Span,
) -> Ty {
    let target_ty = infer_expr(ctx, scope, target);
    if cases.is_empty() {
        return Ty::undefined();
    }
    let result = ctx.fresh_var(span);
    for case in cases {
        scope.push();
        check_pattern(ctx, scope, &case.pattern, &target_ty);
        if let Some(guard) = &case.guard {
            let guard_ty = infer_expr(ctx, scope, guard);
            let origin = ConstraintOrigin::Branches { span: guard.span };
            let _ = ctx.subtype(&guard_ty, &Ty::bool(), &origin);
        }
        let body_ty = infer_block(ctx, scope, &case.body);
        scope.pop();
        // Literal arms widen so the arms agree on a common primitive.
        let body_ty = ctx.widen(&body_ty);
        if !matches!(ctx.prune(&body_ty), Ty::Never) {
            let origin = ConstraintOrigin::Branches { span: case.span };
            let _ = ctx.unify(&body_ty, &result, &origin);
        }
    }
    ctx.prune(&result)
}

fn infer_assign(ctx: &mut InferCtx, scope: &mut Scope, left: &Expr, right: &Expr) -> Ty {
    match &left.kind {
        ExprKind::Ident { .. } => {}
        ExprKind::Member { opt_chain, .. } | ExprKind::Index { opt_chain, .. } => {
            // Optional chaining on the left of an assignment is rejected
            // by the parser; tolerate it here without panicking.
            if *opt_chain {
                ctx.record(TypeError::InvalidPattern {
                    reason: "optional chaining is not allowed on an assignment target".into(),
                    span: left.span,
                });
            }
        }
        _ => {
            ctx.record(TypeError::InvalidPattern {
                reason: "invalid assignment target".into(),
                span: left.span,
            });
        }
    }
    let left_ty = infer_expr(ctx, scope, left);
    let origin = ConstraintOrigin::Assignment { span: right.span };
    check_expr(ctx, scope, right, &left_ty, &origin)
}

fn infer_try_catch(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    try_block: &Block,
    catch_cases: &[MatchCase],
    finally: &Option<Block>,
) -> Ty {
    ctx.push_throws_frame();
    let try_ty = infer_block(ctx, scope, try_block);
    let thrown = ctx.pop_throws_frame();
    let thrown_ty = if thrown.is_empty() {
        Ty::Unknown
    } else {
        Ty::union(thrown.clone())
    };

    let mut results = vec![try_ty];
    if catch_cases.is_empty() {
        // Nothing catches; thrown types propagate outward.
        for ty in thrown {
            ctx.add_throws(ty);
        }
    } else {
        for case in catch_cases {
            scope.push();
            check_pattern(ctx, scope, &case.pattern, &thrown_ty);
            if let Some(guard) = &case.guard {
                let guard_ty = infer_expr(ctx, scope, guard);
                let origin = ConstraintOrigin::Branches { span: guard.span };
                let _ = ctx.subtype(&guard_ty, &Ty::bool(), &origin);
            }
            let body_ty = infer_block(ctx, scope, &case.body);
            scope.pop();
            results.push(body_ty);
        }
    }

    if let Some(finally) = finally {
        let finally_ty = infer_block(ctx, scope, finally);
        let origin = ConstraintOrigin::Branches { span: finally.span };
        let _ = ctx.subtype(&finally_ty, &Ty::undefined(), &origin);
    }

    Ty::union(results)
}

// ── Blocks and local declarations ──────────────────────────────────────

/// Infer a block, pushing a scope frame around its statements. The block's
/// value is its trailing expression statement, `undefined` otherwise, and
/// `never` after a return or throw.
pub fn infer_block(ctx: &mut InferCtx, scope: &mut Scope, block: &Block) -> Ty {
    scope.push();
    let mut last = Ty::undefined();
    for stmt in &block.stmts {
        last = infer_stmt(ctx, scope, stmt);
    }
    scope.pop();
    last
}

fn infer_stmt(ctx: &mut InferCtx, scope: &mut Scope, stmt: &Stmt) -> Ty {
    match &stmt.kind {
        StmtKind::Expr { expr } => infer_expr(ctx, scope, expr),
        StmtKind::Decl { decl } => {
            infer_local_decl(ctx, scope, decl);
            Ty::undefined()
        }
        StmtKind::Return { arg } => {
            let arg_ty = match arg {
                Some(arg) => infer_expr(ctx, scope, arg),
                None => Ty::undefined(),
            };
            ctx.mark_return();
            if let Some(ret) = ctx.current_return() {
                let origin = ConstraintOrigin::Return { span: stmt.span };
                let _ = ctx.unify(&arg_ty, &ret, &origin);
            }
            Ty::Never
        }
        StmtKind::Import { .. } => Ty::undefined(),
    }
}

fn infer_local_decl(ctx: &mut InferCtx, scope: &mut Scope, decl: &Decl) {
    match &decl.kind {
        DeclKind::Var { kind, pattern, type_ann, init } => {
            infer_var_decl(
                ctx,
                scope,
                *kind,
                pattern,
                type_ann.as_ref(),
                init.as_deref(),
                decl.declare,
                decl.span,
            );
        }
        DeclKind::Func { name, sig, body } => {
            let func = infer_func_decl(ctx, scope, name, sig, body.as_ref(), decl);
            let binding = ValueBinding::mono(Ty::Func(Box::new(func)), name.span);
            if scope.declare_value(&name.name, binding).is_err() {
                ctx.record(TypeError::DuplicateBinding {
                    name: name.name.clone(),
                    span: name.span,
                });
            }
        }
        // Type-level declarations inside blocks are handled at namespace
        // level; the parser does not produce them here.
        _ => {}
    }
}

/// Infer a variable declaration: annotated declarations check their
/// initializer against the annotation; unannotated ones synthesize and
/// widen. Bindings go into the current scope frame.
#[allow(clippy::too_many_arguments)]
pub fn infer_var_decl(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    _kind: VarKind,
    pattern: &Pattern,
    type_ann: Option<&escalier_ast::TypeAnn>,
    init: Option<&Expr>,
    declare: bool,
    span: Span,
) {
    if declare && init.is_some() {
        let name = escalier_ast::find_bindings(pattern)
            .first()
            .cloned()
            .unwrap_or_default();
        ctx.record(TypeError::IllegalDeclare { name, span });
    }

    let target = match (type_ann, init) {
        (Some(ann), init) => {
            let ann_ty = lower_type_ann(ctx, scope, ann);
            if let Some(init) = init {
                let origin = ConstraintOrigin::Annotation { span: ann.span };
                check_expr(ctx, scope, init, &ann_ty, &origin);
            }
            ann_ty
        }
        (None, Some(init)) => {
            let init_ty = infer_expr(ctx, scope, init);
            ctx.widen(&init_ty)
        }
        (None, None) => {
            if declare {
                Ty::Unknown
            } else {
                ctx.fresh_var(span)
            }
        }
    };
    check_pattern(ctx, scope, pattern, &target);
}

/// Infer a function declaration or expression body against its signature.
pub fn infer_func_decl(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    name: &escalier_ast::Ident,
    sig: &FuncSig,
    body: Option<&Block>,
    decl: &Decl,
) -> TyFunc {
    if decl.declare {
        if body.is_some() {
            ctx.record(TypeError::IllegalDeclare {
                name: name.name.clone(),
                span: decl.span,
            });
        }
        return lower_func_sig(ctx, scope, sig, decl.span);
    }
    match body {
        Some(body) => infer_func(ctx, scope, sig, Some(body), decl.span),
        None => lower_func_sig(ctx, scope, sig, decl.span),
    }
}

/// Infer a function: parameters bind into a fresh frame, the body checks
/// against the (annotated or fresh) return type, throw/await types
/// accumulate into the signature's throws, and async functions wrap their
/// result in `Promise`.
pub fn infer_func(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    sig: &FuncSig,
    body: Option<&Block>,
    span: Span,
) -> TyFunc {
    scope.push();

    let mut type_params = Vec::new();
    for tp in &sig.type_params {
        scope.insert_type(
            &tp.name,
            TypeBinding::Param(Ty::reference(tp.name.clone(), vec![])),
        );
        type_params.push(TyTypeParam {
            name: tp.name.clone(),
            constraint: tp
                .constraint
                .as_ref()
                .map(|c| Box::new(lower_type_ann(ctx, scope, c))),
            default: tp
                .default
                .as_ref()
                .map(|d| Box::new(lower_type_ann(ctx, scope, d))),
        });
    }

    let mut params = Vec::new();
    for param in &sig.params {
        let declared = match &param.type_ann {
            Some(ann) => lower_type_ann(ctx, scope, ann),
            None => ctx.fresh_var(param.pattern.span),
        };
        match &param.pattern.kind {
            PatternKind::Rest { inner } => {
                let elem_ty = match &declared {
                    Ty::RestSpread(inner_ty) => (**inner_ty).clone(),
                    other => other.clone(),
                };
                param.pattern.inferred.set(Ty::RestSpread(Box::new(elem_ty.clone())));
                check_pattern(ctx, scope, inner, &elem_ty);
                params.push(TyFuncParam {
                    name: param_name(&param.pattern),
                    ty: Ty::RestSpread(Box::new(elem_ty)),
                    optional: param.optional,
                    has_default: false,
                });
            }
            _ => {
                check_pattern(ctx, scope, &param.pattern, &declared);
                let has_default = matches!(
                    &param.pattern.kind,
                    PatternKind::Ident { default: Some(_), .. }
                );
                params.push(TyFuncParam {
                    name: param_name(&param.pattern),
                    ty: declared,
                    optional: param.optional,
                    has_default,
                });
            }
        }
    }

    let ret_ty = match &sig.ret {
        Some(ann) => lower_type_ann(ctx, scope, ann),
        None => ctx.fresh_var(span),
    };
    let declared_throws = sig
        .throws
        .as_ref()
        .map(|ann| lower_type_ann(ctx, scope, ann));

    ctx.push_fn(sig.is_async, ret_ty.clone());
    if let Some(body) = body {
        let body_ty = infer_block(ctx, scope, body);
        let body_ty = ctx.prune(&body_ty);
        let implicit_undefined =
            body_ty == Ty::undefined() && ctx.fn_had_returns();
        if !matches!(body_ty, Ty::Never) && !implicit_undefined {
            let origin = ConstraintOrigin::Return { span: body.span };
            let _ = ctx.unify(&body_ty, &ret_ty, &origin);
        }
    }
    let thrown = ctx.pop_fn();
    scope.pop();

    let thrown_ty = Ty::union(thrown);
    let throws = match declared_throws {
        Some(declared) => {
            if !matches!(thrown_ty, Ty::Never) {
                let origin = ConstraintOrigin::Annotation { span };
                let _ = ctx.subtype(&thrown_ty, &declared, &origin);
            }
            Some(declared)
        }
        None if matches!(thrown_ty, Ty::Never) => None,
        None => Some(thrown_ty.clone()),
    };

    if sig.is_async {
        let err_ty = throws.clone().unwrap_or(Ty::Never);
        let promise = Ty::promise(ctx.prune(&ret_ty), err_ty);
        return TyFunc {
            type_params,
            self_ty: None,
            params,
            ret: Box::new(promise),
            throws: None,
        };
    }

    TyFunc {
        type_params,
        self_ty: None,
        params,
        ret: Box::new(ctx.prune(&ret_ty)),
        throws: throws.map(Box::new),
    }
}

/// The value type of an enum variant: nullary variants are instances of
/// the enum; payload variants are constructor functions.
pub fn variant_value_ty(ctx: &mut InferCtx, def: &EnumDef, idx: usize, span: Span) -> Ty {
    let mut mapping = FxHashMap::default();
    let mut fresh_args = Vec::new();
    for tp in &def.type_params {
        let fresh = ctx.fresh_var(span);
        mapping.insert(tp.clone(), fresh.clone());
        fresh_args.push(fresh);
    }
    let enum_ty = Ty::reference(def.name.clone(), fresh_args);
    let (_, payload) = &def.variants[idx];
    if payload.is_empty() {
        return enum_ty;
    }
    let params = payload
        .iter()
        .enumerate()
        .map(|(i, ty)| TyFuncParam::new(format!("arg{i}"), subst_named(ty, &mapping)))
        .collect();
    Ty::func(params, enum_ty)
}

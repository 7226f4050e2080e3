//! Pattern checking: patterns check against an expected type and publish
//! bindings into the current scope frame.

use escalier_ast::{ObjectPatElem, Pattern, PatternKind, QualIdent};
use escalier_common::Span;
use escalier_types::{PropKey, Ty, TyObject, TyObjectElem};
use rustc_hash::FxHashMap;

use crate::ctx::{subst_named, EnumDef, InferCtx};
use crate::error::{ConstraintOrigin, TypeError};
use crate::infer::infer_expr;
use crate::scope::{Scope, TypeBinding, ValueBinding};

/// Check a pattern against the type it destructures, binding its names
/// into the innermost scope frame. Errors are recorded, never thrown; a
/// failed component binds `unknown` so checking continues.
pub fn check_pattern(ctx: &mut InferCtx, scope: &mut Scope, pattern: &Pattern, expected: &Ty) {
    let expected = ctx.prune(expected);
    pattern.inferred.set(expected.clone());

    match &pattern.kind {
        PatternKind::Ident { name, default, type_ann } => {
            let bound = match type_ann {
                Some(ann) => {
                    let ann_ty = crate::lower::lower_type_ann(ctx, scope, ann);
                    let origin = ConstraintOrigin::Annotation { span: ann.span };
                    let _ = ctx.subtype(&expected, &ann_ty, &origin);
                    ann_ty
                }
                None => expected.clone(),
            };
            if let Some(default) = default {
                let default_ty = infer_expr(ctx, scope, default);
                let origin = ConstraintOrigin::PatternBinding { span: default.span };
                let _ = ctx.subtype(&default_ty, &bound, &origin);
            }
            pattern.inferred.set(bound.clone());
            bind(ctx, scope, &name.name, bound, name.span);
        }

        PatternKind::Tuple { elems } => check_tuple(ctx, scope, pattern, elems, &expected),

        PatternKind::Object { elems } => check_object(ctx, scope, pattern, elems, &expected),

        PatternKind::Extractor { name, args } => {
            check_extractor(ctx, scope, pattern, name, args, &expected);
        }

        PatternKind::Instance { class_name, object } => {
            let key = class_name.to_string();
            let class = match scope.lookup_type(&key) {
                Some(TypeBinding::Named(qualified)) => ctx.classes.get(qualified).cloned(),
                _ => None,
            };
            match class {
                Some(class) => {
                    let mut mapping = FxHashMap::default();
                    for tp in &class.type_params {
                        let fresh = ctx.fresh_var(pattern.span);
                        mapping.insert(tp.clone(), fresh);
                    }
                    let instance = subst_named(&class.instance, &mapping);
                    let origin = ConstraintOrigin::PatternBinding { span: pattern.span };
                    let _ = ctx.subtype(&expected, &instance, &origin);
                    check_pattern(ctx, scope, object, &instance);
                }
                None => {
                    ctx.record(TypeError::UnknownType { name: key, span: class_name.span() });
                    check_pattern(ctx, scope, object, &Ty::Unknown);
                }
            }
        }

        PatternKind::Rest { inner } => {
            // A rest pattern is only meaningful inside a tuple or object;
            // elsewhere it cannot be given a type.
            ctx.record(TypeError::InvalidPattern {
                reason: "rest pattern outside a tuple or object".into(),
                span: pattern.span,
            });
            check_pattern(ctx, scope, inner, &Ty::Unknown);
        }

        PatternKind::Lit { lit } => {
            let lit_ty = Ty::Lit(lit.clone());
            let origin = ConstraintOrigin::PatternBinding { span: pattern.span };
            if ctx.try_subtype(&lit_ty, &expected, &origin).is_err() {
                ctx.record(TypeError::InvalidPattern {
                    reason: format!("literal `{lit}` cannot match `{expected}`"),
                    span: pattern.span,
                });
            }
        }

        PatternKind::Wildcard => {}
    }
}

fn bind(ctx: &mut InferCtx, scope: &mut Scope, name: &str, ty: Ty, span: Span) {
    if let Err(_previous) = scope.declare_value(name, ValueBinding::mono(ty, span)) {
        ctx.record(TypeError::DuplicateBinding { name: name.to_string(), span });
    }
}

fn check_tuple(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    pattern: &Pattern,
    elems: &[Pattern],
    expected: &Ty,
) {
    let has_rest = matches!(elems.last().map(|p| &p.kind), Some(PatternKind::Rest { .. }));

    match expected {
        Ty::Tuple(expected_elems) => {
            let prefix = if has_rest { elems.len() - 1 } else { elems.len() };
            if expected_elems.len() < prefix || (!has_rest && expected_elems.len() != prefix) {
                ctx.record(TypeError::InvalidPattern {
                    reason: format!(
                        "tuple pattern with {} element(s) cannot match `{expected}`",
                        elems.len()
                    ),
                    span: pattern.span,
                });
                for elem in elems {
                    check_pattern(ctx, scope, elem, &Ty::Unknown);
                }
                return;
            }
            for (elem, ty) in elems[..prefix].iter().zip(expected_elems) {
                check_pattern(ctx, scope, elem, ty);
            }
            if has_rest {
                let PatternKind::Rest { inner } = &elems[prefix].kind else { unreachable!() };
                let tail = Ty::Tuple(expected_elems[prefix..].to_vec());
                elems[prefix].inferred.set(tail.clone());
                check_pattern(ctx, scope, inner, &tail);
            }
        }
        Ty::Var(_) => {
            // Destructuring drives inference: the target must be a tuple
            // of fresh element types.
            let vars: Vec<Ty> = elems.iter().map(|e| ctx.fresh_var(e.span)).collect();
            let tuple = Ty::Tuple(vars.clone());
            let origin = ConstraintOrigin::PatternBinding { span: pattern.span };
            let _ = ctx.unify(expected, &tuple, &origin);
            for (elem, var) in elems.iter().zip(&vars) {
                check_pattern(ctx, scope, elem, var);
            }
        }
        Ty::Unknown => {
            for elem in elems {
                check_pattern(ctx, scope, elem, &Ty::Unknown);
            }
        }
        _ => {
            ctx.record(TypeError::InvalidPattern {
                reason: format!("tuple pattern cannot match `{expected}`"),
                span: pattern.span,
            });
            for elem in elems {
                check_pattern(ctx, scope, elem, &Ty::Unknown);
            }
        }
    }
}

fn check_object(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    pattern: &Pattern,
    elems: &[ObjectPatElem],
    expected: &Ty,
) {
    let obj = match expected {
        Ty::Object(obj) => (**obj).clone(),
        Ty::Var(_) => {
            // Bind the target variable to an open object shaped like the
            // pattern, then recurse with the concrete object.
            let mut props = Vec::new();
            for elem in elems {
                let (name, span) = match elem {
                    ObjectPatElem::KeyValue { key, value, .. } => match key.name() {
                        Some(name) => (name, value.span),
                        None => continue,
                    },
                    ObjectPatElem::Shorthand { ident, .. } => {
                        (ident.name.clone(), ident.span)
                    }
                    ObjectPatElem::Rest { .. } => continue,
                };
                props.push(TyObjectElem::Property {
                    key: PropKey::str(name),
                    optional: false,
                    readonly: false,
                    ty: ctx.fresh_var(span),
                });
            }
            let obj = TyObject::structural(props);
            let origin = ConstraintOrigin::PatternBinding { span: pattern.span };
            let obj_ty = Ty::Object(Box::new(obj.clone()));
            let _ = ctx.unify(expected, &obj_ty, &origin);
            obj
        }
        Ty::Unknown => {
            for elem in elems {
                match elem {
                    ObjectPatElem::KeyValue { value, .. } => {
                        check_pattern(ctx, scope, value, &Ty::Unknown)
                    }
                    ObjectPatElem::Shorthand { ident, .. } => {
                        bind(ctx, scope, &ident.name, Ty::Unknown, ident.span)
                    }
                    ObjectPatElem::Rest { pattern } => {
                        check_pattern(ctx, scope, pattern, &Ty::Unknown)
                    }
                }
            }
            return;
        }
        _ => {
            ctx.record(TypeError::InvalidPattern {
                reason: format!("object pattern cannot match `{expected}`"),
                span: pattern.span,
            });
            return;
        }
    };

    let mut consumed: Vec<String> = Vec::new();
    for elem in elems {
        match elem {
            ObjectPatElem::KeyValue { key, value, default } => {
                let Some(name) = key.name() else {
                    ctx.record(TypeError::InvalidPattern {
                        reason: "computed keys are not allowed in patterns".into(),
                        span: key.span(),
                    });
                    continue;
                };
                consumed.push(name.clone());
                let prop_ty = lookup_or_default(ctx, scope, &obj, &name, default, key.span());
                check_pattern(ctx, scope, value, &prop_ty);
            }
            ObjectPatElem::Shorthand { ident, default } => {
                consumed.push(ident.name.clone());
                let prop_ty =
                    lookup_or_default(ctx, scope, &obj, &ident.name, default, ident.span);
                bind(ctx, scope, &ident.name, prop_ty, ident.span);
            }
            ObjectPatElem::Rest { pattern: rest } => {
                let remaining: Vec<TyObjectElem> = obj
                    .elems
                    .iter()
                    .filter(|e| {
                        !e.key().is_some_and(|k| consumed.contains(&k.to_string()))
                    })
                    .cloned()
                    .collect();
                let rest_ty = Ty::Object(Box::new(TyObject::structural(remaining)));
                check_pattern(ctx, scope, rest, &rest_ty);
            }
        }
    }
}

fn lookup_or_default(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    obj: &TyObject,
    name: &str,
    default: &Option<Box<escalier_ast::Expr>>,
    span: Span,
) -> Ty {
    match obj.lookup(name) {
        Some(ty) => {
            if let Some(default) = default {
                let default_ty = infer_expr(ctx, scope, default);
                let origin = ConstraintOrigin::PatternBinding { span: default.span };
                let _ = ctx.subtype(&default_ty, &ty, &origin);
            }
            ty
        }
        None => match default {
            Some(default) => {
                let default_ty = infer_expr(ctx, scope, default);
                ctx.widen(&default_ty)
            }
            None => {
                ctx.record(TypeError::NoSuchProperty {
                    ty: Ty::Object(Box::new(obj.clone())),
                    prop: name.to_string(),
                    span,
                });
                Ty::Unknown
            }
        },
    }
}

/// Resolve an extractor name to its enum definition and variant index.
///
/// Qualified names (`Opt.Some`) resolve the enum through the scope; bare
/// names search registered enums in registration order.
pub fn resolve_extractor(
    ctx: &InferCtx,
    scope: &Scope,
    name: &QualIdent,
) -> Option<(EnumDef, usize)> {
    let segments = name.segments();
    if segments.len() >= 2 {
        let enum_path = segments[..segments.len() - 1].join(".");
        let variant = segments[segments.len() - 1];
        let key = match scope.lookup_type(&enum_path) {
            Some(TypeBinding::Named(key)) => key.clone(),
            _ => enum_path,
        };
        let def = ctx.enums.get(&key)?;
        let idx = def.variants.iter().position(|(v, _)| v == variant)?;
        return Some((def.clone(), idx));
    }
    let variant = segments[0];
    for key in &ctx.enum_order {
        if let Some(def) = ctx.enums.get(key) {
            if let Some(idx) = def.variants.iter().position(|(v, _)| v == variant) {
                return Some((def.clone(), idx));
            }
        }
    }
    None
}

fn check_extractor(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    pattern: &Pattern,
    name: &QualIdent,
    args: &[Pattern],
    expected: &Ty,
) {
    let Some((def, variant_idx)) = resolve_extractor(ctx, scope, name) else {
        ctx.record(TypeError::UnknownType {
            name: name.to_string(),
            span: name.span(),
        });
        for arg in args {
            check_pattern(ctx, scope, arg, &Ty::Unknown);
        }
        return;
    };

    // The matched value must be an instance of the extractor's enum.
    let mut mapping = FxHashMap::default();
    let mut fresh_args = Vec::new();
    for tp in &def.type_params {
        let fresh = ctx.fresh_var(pattern.span);
        mapping.insert(tp.clone(), fresh.clone());
        fresh_args.push(fresh);
    }
    let enum_ty = Ty::reference(def.name.clone(), fresh_args);
    let origin = ConstraintOrigin::PatternBinding { span: pattern.span };
    let _ = ctx.unify(expected, &enum_ty, &origin);

    let (_, payload) = &def.variants[variant_idx];
    if payload.len() != args.len() {
        ctx.record(TypeError::InvalidPattern {
            reason: format!(
                "extractor `{name}` takes {} argument(s), pattern has {}",
                payload.len(),
                args.len()
            ),
            span: pattern.span,
        });
    }
    for (arg, payload_ty) in args.iter().zip(payload) {
        let arg_ty = subst_named(payload_ty, &mapping);
        check_pattern(ctx, scope, arg, &arg_ty);
    }
    for arg in args.iter().skip(payload.len()) {
        check_pattern(ctx, scope, arg, &Ty::Unknown);
    }
}

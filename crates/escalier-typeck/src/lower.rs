//! Lowering of surface type annotations into semantic types.
//!
//! Every lowered annotation has its inferred-type slot filled, so
//! diagnostics and emitters can read back the semantic type of any
//! annotation the user wrote. Unresolvable references lower to `unknown`
//! after recording an `UnknownType` error.

use escalier_ast::{
    FuncSig, MappedAnnModifier, ObjAnnElem, ObjKey, Pattern, PatternKind, TypeAnn, TypeAnnKind,
};
use escalier_common::Span;
use escalier_types::{
    MappedModifier, MappedTy, PropKey, Ty, TyCond, TyFunc, TyFuncParam, TyObject, TyObjectElem,
    TyTypeParam,
};

use crate::ctx::InferCtx;
use crate::error::TypeError;
use crate::scope::{Scope, TypeBinding};

/// Lower a type annotation to a semantic type, recording errors for
/// unresolved references and filling the annotation's inferred slot.
pub fn lower_type_ann(ctx: &mut InferCtx, scope: &mut Scope, ann: &TypeAnn) -> Ty {
    let ty = lower_kind(ctx, scope, ann);
    ann.inferred.set(ty.clone());
    ty
}

fn lower_kind(ctx: &mut InferCtx, scope: &mut Scope, ann: &TypeAnn) -> Ty {
    match &ann.kind {
        TypeAnnKind::Lit { lit } => Ty::Lit(lit.clone()),
        TypeAnnKind::Number => Ty::num(),
        TypeAnnKind::String => Ty::str(),
        TypeAnnKind::Boolean => Ty::bool(),
        TypeAnnKind::Symbol => Ty::symbol(),
        TypeAnnKind::UniqueSymbol => Ty::UniqueSymbol(ctx.fresh_symbol_id()),
        TypeAnnKind::BigInt => Ty::bigint(),
        // `any` has no semantic counterpart; it lowers to `unknown`.
        TypeAnnKind::Any | TypeAnnKind::Unknown => Ty::Unknown,
        TypeAnnKind::Never => Ty::Never,
        TypeAnnKind::Void => Ty::undefined(),
        TypeAnnKind::Object { elems } => {
            let lowered: Vec<TyObjectElem> = elems
                .iter()
                .filter_map(|elem| lower_obj_elem(ctx, scope, elem))
                .collect();
            Ty::Object(Box::new(TyObject::structural(lowered)))
        }
        TypeAnnKind::Tuple { elems } => {
            Ty::Tuple(elems.iter().map(|e| lower_type_ann(ctx, scope, e)).collect())
        }
        TypeAnnKind::Union { types } => {
            Ty::union(types.iter().map(|t| lower_type_ann(ctx, scope, t)).collect())
        }
        TypeAnnKind::Intersection { types } => {
            Ty::Intersection(types.iter().map(|t| lower_type_ann(ctx, scope, t)).collect())
        }
        TypeAnnKind::Ref { name, type_args } => {
            let dotted = name.to_string();
            let args: Vec<Ty> = type_args
                .iter()
                .map(|a| lower_type_ann(ctx, scope, a))
                .collect();
            match scope.lookup_type(&dotted).cloned() {
                Some(TypeBinding::Param(ty)) => ty,
                Some(TypeBinding::Named(key)) => Ty::reference(key, args),
                None => {
                    ctx.record(TypeError::UnknownType { name: dotted, span: ann.span });
                    Ty::Unknown
                }
            }
        }
        TypeAnnKind::Func { sig } => {
            Ty::Func(Box::new(lower_func_sig(ctx, scope, sig, ann.span)))
        }
        TypeAnnKind::KeyOf { target } => {
            let target = lower_type_ann(ctx, scope, target);
            ctx.resolve_keyof(&target)
        }
        TypeAnnKind::TypeOf { target } => {
            let dotted = target.to_string();
            match scope.lookup_value(&dotted) {
                Some(binding) => binding.scheme.ty.clone(),
                None => {
                    ctx.record(TypeError::UnknownValue { name: dotted, span: ann.span });
                    Ty::Unknown
                }
            }
        }
        TypeAnnKind::Index { target, index } => {
            let target = lower_type_ann(ctx, scope, target);
            let index = lower_type_ann(ctx, scope, index);
            ctx.resolve_index(&target, &index)
                .unwrap_or(Ty::Index { target: Box::new(target), index: Box::new(index) })
        }
        TypeAnnKind::Cond { check, extends, then_ty, else_ty } => {
            let cond = TyCond {
                check: lower_type_ann(ctx, scope, check),
                extends: lower_type_ann(ctx, scope, extends),
                then_ty: lower_type_ann(ctx, scope, then_ty),
                else_ty: lower_type_ann(ctx, scope, else_ty),
            };
            ctx.resolve_conditional(&cond)
                .unwrap_or(Ty::Cond(Box::new(cond)))
        }
        TypeAnnKind::Match { target, cases } => {
            // Type-level match is sugar for a chain of conditionals.
            let check = lower_type_ann(ctx, scope, target);
            let mut result = Ty::Never;
            for case in cases.iter().rev() {
                let cond = TyCond {
                    check: check.clone(),
                    extends: lower_type_ann(ctx, scope, &case.extends),
                    then_ty: lower_type_ann(ctx, scope, &case.then_ty),
                    else_ty: result,
                };
                result = ctx
                    .resolve_conditional(&cond)
                    .unwrap_or(Ty::Cond(Box::new(cond)));
            }
            result
        }
        TypeAnnKind::Infer { name } => Ty::Infer(name.clone()),
        TypeAnnKind::Wildcard => Ty::Wildcard,
        TypeAnnKind::TemplateLit { quasis, types } => {
            let types: Vec<Ty> = types.iter().map(|t| lower_type_ann(ctx, scope, t)).collect();
            ctx.resolve_template_lit(quasis, &types)
                .unwrap_or(Ty::TemplateLit { quasis: quasis.clone(), types })
        }
        TypeAnnKind::Intrinsic => {
            let name = ctx.current_alias.clone().unwrap_or_default();
            Ty::Intrinsic(name)
        }
        TypeAnnKind::Import { source, qualifier, type_args } => {
            // External module types stay nominal references.
            let args = type_args.iter().map(|a| lower_type_ann(ctx, scope, a)).collect();
            Ty::reference(format!("{source}.{qualifier}"), args)
        }
        TypeAnnKind::Mutable { target } => {
            let lowered = lower_type_ann(ctx, scope, target);
            match lowered {
                Ty::Object(mut obj) => {
                    obj.immutable = false;
                    obj.mutable = true;
                    Ty::Object(obj)
                }
                other => other,
            }
        }
        TypeAnnKind::RestSpread { value } => {
            Ty::RestSpread(Box::new(lower_type_ann(ctx, scope, value)))
        }
        TypeAnnKind::Empty => Ty::Unknown,
    }
}

fn lower_obj_key(key: &ObjKey) -> Option<PropKey> {
    match key {
        ObjKey::Ident(id) => Some(PropKey::str(id.name.clone())),
        ObjKey::Str(s, _) => Some(PropKey::str(s.clone())),
        ObjKey::Num(n, _) => Some(PropKey::Num(*n)),
        ObjKey::Computed(_) => None,
    }
}

pub(crate) fn lower_obj_elem(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    elem: &ObjAnnElem,
) -> Option<TyObjectElem> {
    match elem {
        ObjAnnElem::Callable(sig) => Some(TyObjectElem::Callable(lower_func_sig(
            ctx,
            scope,
            sig,
            Span::synthetic(),
        ))),
        ObjAnnElem::Constructor(sig) => Some(TyObjectElem::Constructor(lower_func_sig(
            ctx,
            scope,
            sig,
            Span::synthetic(),
        ))),
        ObjAnnElem::Method { key, sig, .. } => Some(TyObjectElem::Method {
            key: lower_obj_key(key)?,
            func: lower_func_sig(ctx, scope, sig, key.span()),
        }),
        ObjAnnElem::Getter { key, ret } => Some(TyObjectElem::Getter {
            key: lower_obj_key(key)?,
            ret: Box::new(match ret {
                Some(ret) => lower_type_ann(ctx, scope, ret),
                None => ctx.fresh_var(key.span()),
            }),
        }),
        ObjAnnElem::Setter { key, param } => Some(TyObjectElem::Setter {
            key: lower_obj_key(key)?,
            param: Box::new(lower_type_ann(ctx, scope, param)),
        }),
        ObjAnnElem::Property { key, optional, readonly, type_ann } => {
            Some(TyObjectElem::Property {
                key: lower_obj_key(key)?,
                optional: *optional,
                readonly: *readonly,
                ty: lower_type_ann(ctx, scope, type_ann),
            })
        }
        ObjAnnElem::Mapped(mapped) => {
            let constraint = match &mapped.type_param.constraint {
                Some(c) => lower_type_ann(ctx, scope, c),
                None => Ty::Unknown,
            };
            scope.push();
            scope.insert_type(
                &mapped.type_param.name,
                TypeBinding::Param(Ty::reference(mapped.type_param.name.clone(), vec![])),
            );
            let value = lower_type_ann(ctx, scope, &mapped.value);
            let name_remap = mapped
                .name_remap
                .as_ref()
                .map(|t| Box::new(lower_type_ann(ctx, scope, t)));
            scope.pop();
            Some(TyObjectElem::Mapped(MappedTy {
                type_param: mapped.type_param.name.clone(),
                constraint: Box::new(constraint),
                name_remap,
                value: Box::new(value),
                optional: mapped.optional.map(lower_modifier),
                readonly: mapped.readonly.map(lower_modifier),
            }))
        }
        ObjAnnElem::RestSpread { value } => {
            Some(TyObjectElem::RestSpread(lower_type_ann(ctx, scope, value)))
        }
    }
}

fn lower_modifier(modifier: MappedAnnModifier) -> MappedModifier {
    match modifier {
        MappedAnnModifier::Add => MappedModifier::Add,
        MappedAnnModifier::Remove => MappedModifier::Remove,
    }
}

/// The display name a parameter pattern contributes to a function type.
pub(crate) fn param_name(pattern: &Pattern) -> String {
    match &pattern.kind {
        PatternKind::Ident { name, .. } => name.name.clone(),
        PatternKind::Rest { inner } => param_name(inner),
        _ => "_".to_string(),
    }
}

/// Lower a signature in type position (no body): annotated parameters take
/// their annotation's type, unannotated ones get fresh variables.
pub fn lower_func_sig(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    sig: &FuncSig,
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
        let ty = match &param.type_ann {
            Some(ann) => lower_type_ann(ctx, scope, ann),
            None => ctx.fresh_var(param.pattern.span),
        };
        let ty = if matches!(param.pattern.kind, PatternKind::Rest { .. })
            && !matches!(ty, Ty::RestSpread(_))
        {
            Ty::RestSpread(Box::new(ty))
        } else {
            ty
        };
        let has_default = matches!(
            &param.pattern.kind,
            PatternKind::Ident { default: Some(_), .. }
        );
        params.push(TyFuncParam {
            name: param_name(&param.pattern),
            ty,
            optional: param.optional,
            has_default,
        });
    }

    let ret = match &sig.ret {
        Some(ret) => lower_type_ann(ctx, scope, ret),
        None => ctx.fresh_var(span),
    };
    let throws = sig
        .throws
        .as_ref()
        .map(|t| Box::new(lower_type_ann(ctx, scope, t)));
    scope.pop();

    TyFunc {
        type_params,
        self_ty: None,
        params,
        ret: Box::new(ret),
        throws,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use escalier_ast::{Ident, Param, QualIdent, TypeParam};
    use escalier_common::Span;

    fn ann(kind: TypeAnnKind) -> TypeAnn {
        TypeAnn::new(kind, Span::synthetic())
    }

    #[test]
    fn primitives_lower_directly() {
        let mut ctx = InferCtx::new();
        let mut scope = Scope::new();
        assert_eq!(lower_type_ann(&mut ctx, &mut scope, &ann(TypeAnnKind::Number)), Ty::num());
        assert_eq!(
            lower_type_ann(&mut ctx, &mut scope, &ann(TypeAnnKind::Void)),
            Ty::undefined()
        );
        assert_eq!(
            lower_type_ann(&mut ctx, &mut scope, &ann(TypeAnnKind::Any)),
            Ty::Unknown
        );
    }

    #[test]
    fn unknown_ref_records_error_and_lowers_to_unknown() {
        let mut ctx = InferCtx::new();
        let mut scope = Scope::new();
        let reference = ann(TypeAnnKind::Ref {
            name: QualIdent::ident("Missing", Span::synthetic()),
            type_args: vec![],
        });
        let lowered = lower_type_ann(&mut ctx, &mut scope, &reference);
        assert_eq!(lowered, Ty::Unknown);
        assert!(matches!(ctx.errors[0], TypeError::UnknownType { .. }));
        assert_eq!(reference.inferred.get(), Some(Ty::Unknown));
    }

    #[test]
    fn generic_sig_lowers_named_params() {
        let mut ctx = InferCtx::new();
        let mut scope = Scope::new();
        // <T>(x: T) -> T
        let sig = FuncSig {
            type_params: vec![TypeParam::new("T", Span::synthetic())],
            params: vec![Param::with_type(
                Pattern::ident("x", Span::synthetic()),
                TypeAnn::new(
                    TypeAnnKind::Ref {
                        name: QualIdent::Ident(Ident::synthetic("T")),
                        type_args: vec![],
                    },
                    Span::synthetic(),
                ),
            )],
            ret: Some(Box::new(TypeAnn::new(
                TypeAnnKind::Ref {
                    name: QualIdent::Ident(Ident::synthetic("T")),
                    type_args: vec![],
                },
                Span::synthetic(),
            ))),
            throws: None,
            is_async: false,
        };
        let func = lower_func_sig(&mut ctx, &mut scope, &sig, Span::synthetic());
        assert_eq!(func.type_params.len(), 1);
        assert_eq!(func.params[0].ty, Ty::reference("T", vec![]));
        assert_eq!(*func.ret, Ty::reference("T", vec![]));
    }
}

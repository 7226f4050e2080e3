//! One-way structural compatibility.
//!
//! Used for annotated returns, argument checking, and `extends` clauses.
//! The rules mirror unification but are unidirectional: unions on the
//! super side accept any member match, unions on the sub side require
//! every member to match, objects allow extra properties on the sub side,
//! and functions are contravariant in parameters and covariant in
//! return. Literal types are subtypes of their primitives.

use escalier_common::Literal;
use escalier_types::{Primitive, Ty, TyFunc, TyObjectElem};

use crate::ctx::InferCtx;
use crate::error::{ConstraintOrigin, TypeError};

impl InferCtx {
    /// Check `sub <: sup`, recording the error on failure.
    pub fn subtype(
        &mut self,
        sub: &Ty,
        sup: &Ty,
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        match self.try_subtype(sub, sup, origin) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.errors.push(err.clone());
                Err(err)
            }
        }
    }

    /// Check `sub <: sup` without recording; bindings commit on success.
    pub fn try_subtype(
        &mut self,
        sub: &Ty,
        sup: &Ty,
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let snapshot = self.snapshot();
        match self.subtype_inner(sub, sup, origin) {
            Ok(()) => {
                self.commit(snapshot);
                Ok(())
            }
            Err(err) => {
                self.rollback_to(snapshot);
                Err(err)
            }
        }
    }

    /// A side-effect-free probe: bindings are always rolled back.
    pub fn probe_subtype(&mut self, sub: &Ty, sup: &Ty) -> bool {
        let snapshot = self.snapshot();
        let ok = self
            .subtype_inner(sub, sup, &ConstraintOrigin::Builtin)
            .is_ok();
        self.rollback_to(snapshot);
        ok
    }

    fn subtype_inner(
        &mut self,
        sub: &Ty,
        sup: &Ty,
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let sub = self.normalize(sub);
        let sup = self.normalize(sup);

        match (&sub, &sup) {
            // Top and bottom, plus error-recovery holes.
            (_, Ty::Unknown) | (Ty::Unknown, _) => Ok(()),
            (Ty::Never, _) => Ok(()),

            // Variables delegate to unification.
            (Ty::Var(_), _) | (_, Ty::Var(_)) => self.unify_inner(&sub, &sup, origin),

            (Ty::Prim(p1), Ty::Prim(p2)) if p1 == p2 => Ok(()),
            (Ty::Lit(l1), Ty::Lit(l2)) if l1 == l2 => Ok(()),

            // A literal type is a subtype of its primitive.
            (Ty::Lit(lit), Ty::Prim(prim)) if literal_base(lit) == Some(*prim) => Ok(()),

            // A folded template literal is a string.
            (Ty::TemplateLit { .. }, Ty::Prim(Primitive::Str)) => Ok(()),

            // Nominal references by name; otherwise through their aliases.
            (Ty::Ref(r1), Ty::Ref(r2)) if r1.name == r2.name => {
                if r1.type_args.len() != r2.type_args.len() {
                    return Err(self.failure(&sub, &sup, origin));
                }
                // Type arguments are checked invariantly.
                for (x, y) in r1.type_args.iter().zip(&r2.type_args) {
                    self.unify_inner(x, y, origin)?;
                }
                Ok(())
            }
            (Ty::Ref(r), _) => match self.expand_ref(r) {
                Some(expanded) => self.subtype_inner(&expanded, &sup, origin),
                None => Err(self.failure(&sub, &sup, origin)),
            },
            (_, Ty::Ref(r)) => match self.expand_ref(r) {
                Some(expanded) => self.subtype_inner(&sub, &expanded, origin),
                None => Err(self.failure(&sub, &sup, origin)),
            },

            // A union on the sub side requires every member to fit.
            (Ty::Union(members), _) => {
                for member in members {
                    self.subtype_inner(member, &sup, origin)?;
                }
                Ok(())
            }

            // A union on the super side accepts any member match.
            (_, Ty::Union(members)) => {
                for member in members {
                    let snapshot = self.snapshot();
                    if self.subtype_inner(&sub, member, origin).is_ok() {
                        self.commit(snapshot);
                        return Ok(());
                    }
                    self.rollback_to(snapshot);
                }
                Err(self.failure(&sub, &sup, origin))
            }

            // An intersection on the sub side satisfies the super type if
            // any member does; on the super side, every member must hold.
            (Ty::Intersection(members), _) => {
                for member in members {
                    let snapshot = self.snapshot();
                    if self.subtype_inner(member, &sup, origin).is_ok() {
                        self.commit(snapshot);
                        return Ok(());
                    }
                    self.rollback_to(snapshot);
                }
                Err(self.failure(&sub, &sup, origin))
            }
            (_, Ty::Intersection(members)) => {
                for member in members {
                    self.subtype_inner(&sub, member, origin)?;
                }
                Ok(())
            }

            (Ty::Tuple(e1), Ty::Tuple(e2)) => self.subtype_tuples(e1, e2, origin),

            (Ty::Object(o1), Ty::Object(o2)) => {
                // Width subtyping: every requirement of the super side must
                // be satisfied; the sub side may carry extra properties.
                for elem in &o2.elems {
                    match elem {
                        TyObjectElem::Property { key, optional, ty, .. } => {
                            let key_name = key.to_string();
                            match o1.lookup(&key_name) {
                                Some(found) => self.subtype_inner(&found, ty, origin)?,
                                None if *optional => {}
                                None => {
                                    return Err(self.failure(&sub, &sup, origin));
                                }
                            }
                        }
                        TyObjectElem::Method { key, func } => {
                            match o1.lookup(&key.to_string()) {
                                Some(Ty::Func(found)) => {
                                    self.subtype_funcs(&found, func, origin)?
                                }
                                _ => return Err(self.failure(&sub, &sup, origin)),
                            }
                        }
                        TyObjectElem::Callable(sup_callable) => {
                            let sub_callable = o1.elems.iter().find_map(|e| match e {
                                TyObjectElem::Callable(f) => Some(f.clone()),
                                _ => None,
                            });
                            match sub_callable {
                                Some(f) => self.subtype_funcs(&f, sup_callable, origin)?,
                                None => return Err(self.failure(&sub, &sup, origin)),
                            }
                        }
                        _ => {}
                    }
                }
                Ok(())
            }

            (Ty::Func(f1), Ty::Func(f2)) => self.subtype_funcs(f1, f2, origin),

            (Ty::GlobalThis, Ty::GlobalThis) => Ok(()),
            (Ty::UniqueSymbol(a), Ty::UniqueSymbol(b)) if a == b => Ok(()),
            (Ty::UniqueSymbol(_), Ty::Prim(Primitive::Symbol)) => Ok(()),
            (Ty::Wildcard, _) | (_, Ty::Wildcard) => Ok(()),

            (
                Ty::Extract { extractor: e1, args: a1 },
                Ty::Extract { extractor: e2, args: a2 },
            ) if a1.len() == a2.len() => {
                self.subtype_inner(e1, e2, origin)?;
                for (x, y) in a1.iter().zip(a2) {
                    self.subtype_inner(x, y, origin)?;
                }
                Ok(())
            }

            _ => Err(self.failure(&sub, &sup, origin)),
        }
    }

    fn failure(&self, sub: &Ty, sup: &Ty, origin: &ConstraintOrigin) -> TypeError {
        TypeError::SubtypeFailure {
            expected: sup.clone(),
            found: sub.clone(),
            origin: origin.clone(),
        }
    }

    fn subtype_tuples(
        &mut self,
        sub: &[Ty],
        sup: &[Ty],
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        if matches!(sup.last(), Some(Ty::RestSpread(_))) {
            let prefix = sup.len() - 1;
            if sub.len() < prefix {
                return Err(TypeError::ArityMismatch {
                    expected: prefix,
                    found: sub.len(),
                    origin: origin.clone(),
                });
            }
            for (x, y) in sub.iter().zip(&sup[..prefix]) {
                self.subtype_inner(x, y, origin)?;
            }
            let Some(Ty::RestSpread(inner)) = sup.last() else { unreachable!() };
            let tail = Ty::Tuple(sub[prefix..].to_vec());
            return self.subtype_inner(&tail, inner, origin);
        }
        if sub.len() != sup.len() {
            return Err(TypeError::ArityMismatch {
                expected: sup.len(),
                found: sub.len(),
                origin: origin.clone(),
            });
        }
        for (x, y) in sub.iter().zip(sup) {
            self.subtype_inner(x, y, origin)?;
        }
        Ok(())
    }

    /// Contravariant in parameters, covariant in return and throws. The
    /// sub function may accept fewer parameters; extra declared parameters
    /// must be omittable.
    pub(crate) fn subtype_funcs(
        &mut self,
        sub: &TyFunc,
        sup: &TyFunc,
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let sub = self.alpha_rename(sub, origin.span());
        let sup = self.alpha_rename(sup, origin.span());

        for (i, sub_param) in sub.params.iter().enumerate() {
            match sup.params.get(i) {
                Some(sup_param) => {
                    self.subtype_inner(&sup_param.ty, &sub_param.ty, origin)?;
                }
                None => {
                    if !sub_param.is_omittable() {
                        return Err(TypeError::ArityMismatch {
                            expected: sup.params.len(),
                            found: sub.params.len(),
                            origin: origin.clone(),
                        });
                    }
                }
            }
        }

        self.subtype_inner(&sub.ret, &sup.ret, origin)?;
        let sub_throws = sub.throws.as_deref().cloned().unwrap_or(Ty::Never);
        let sup_throws = sup.throws.as_deref().cloned().unwrap_or(Ty::Never);
        if matches!(sub_throws, Ty::Never) {
            return Ok(());
        }
        self.subtype_inner(&sub_throws, &sup_throws, origin)
    }
}

fn literal_base(lit: &Literal) -> Option<Primitive> {
    match lit {
        Literal::Bool(_) => Some(Primitive::Bool),
        Literal::Num(_) => Some(Primitive::Num),
        Literal::Str(_) => Some(Primitive::Str),
        Literal::BigInt(_) => Some(Primitive::BigInt),
        Literal::Null | Literal::Undefined | Literal::Regex { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use escalier_common::Span;
    use escalier_types::{PropKey, TyFuncParam, TyObject};

    fn origin() -> ConstraintOrigin {
        ConstraintOrigin::Builtin
    }

    fn prop(key: &str, ty: Ty) -> TyObjectElem {
        TyObjectElem::Property {
            key: PropKey::str(key),
            optional: false,
            readonly: false,
            ty,
        }
    }

    #[test]
    fn literal_subtypes_its_primitive() {
        let mut ctx = InferCtx::new();
        assert!(ctx.try_subtype(&Ty::lit_num(5.0), &Ty::num(), &origin()).is_ok());
        assert!(ctx.try_subtype(&Ty::num(), &Ty::lit_num(5.0), &origin()).is_err());
    }

    #[test]
    fn union_on_super_accepts_any_member() {
        let mut ctx = InferCtx::new();
        let sup = Ty::union(vec![Ty::num(), Ty::str()]);
        assert!(ctx.try_subtype(&Ty::num(), &sup, &origin()).is_ok());
        assert!(ctx.try_subtype(&Ty::bool(), &sup, &origin()).is_err());
    }

    #[test]
    fn union_on_sub_requires_all_members() {
        let mut ctx = InferCtx::new();
        let sub = Ty::union(vec![Ty::lit_num(1.0), Ty::lit_num(2.0)]);
        assert!(ctx.try_subtype(&sub, &Ty::num(), &origin()).is_ok());
        let mixed = Ty::union(vec![Ty::lit_num(1.0), Ty::lit_str("a")]);
        assert!(ctx.try_subtype(&mixed, &Ty::num(), &origin()).is_err());
    }

    #[test]
    fn objects_allow_extra_properties_on_sub() {
        let mut ctx = InferCtx::new();
        let sub = Ty::Object(Box::new(TyObject::structural(vec![
            prop("x", Ty::num()),
            prop("y", Ty::str()),
        ])));
        let sup = Ty::Object(Box::new(TyObject::structural(vec![prop("x", Ty::num())])));
        assert!(ctx.try_subtype(&sub, &sup, &origin()).is_ok());
        assert!(ctx.try_subtype(&sup, &sub, &origin()).is_err());
    }

    #[test]
    fn functions_are_contravariant_in_params() {
        let mut ctx = InferCtx::new();
        // (x: number | string) -> number  <:  (x: number) -> number
        let wide = Ty::func(
            vec![TyFuncParam::new("x", Ty::union(vec![Ty::num(), Ty::str()]))],
            Ty::num(),
        );
        let narrow = Ty::func(vec![TyFuncParam::new("x", Ty::num())], Ty::num());
        assert!(ctx.try_subtype(&wide, &narrow, &origin()).is_ok());
        assert!(ctx.try_subtype(&narrow, &wide, &origin()).is_err());
    }

    #[test]
    fn functions_are_covariant_in_return() {
        let mut ctx = InferCtx::new();
        let precise = Ty::func(vec![], Ty::lit_num(1.0));
        let loose = Ty::func(vec![], Ty::num());
        assert!(ctx.try_subtype(&precise, &loose, &origin()).is_ok());
        assert!(ctx.try_subtype(&loose, &precise, &origin()).is_err());
    }

    #[test]
    fn sub_function_may_take_fewer_params() {
        let mut ctx = InferCtx::new();
        let short = Ty::func(vec![], Ty::num());
        let long = Ty::func(vec![TyFuncParam::new("x", Ty::num())], Ty::num());
        assert!(ctx.try_subtype(&short, &long, &origin()).is_ok());
        assert!(ctx.try_subtype(&long, &short, &origin()).is_err());
    }

    #[test]
    fn never_subtypes_everything_unknown_is_top() {
        let mut ctx = InferCtx::new();
        assert!(ctx.try_subtype(&Ty::Never, &Ty::num(), &origin()).is_ok());
        assert!(ctx.try_subtype(&Ty::num(), &Ty::Unknown, &origin()).is_ok());
    }

    #[test]
    fn probe_subtype_never_commits() {
        let mut ctx = InferCtx::new();
        let v = ctx.fresh_var(Span::synthetic());
        assert!(ctx.probe_subtype(&v, &Ty::num()));
        assert_eq!(ctx.prune(&v), v, "probe must roll back bindings");
    }
}

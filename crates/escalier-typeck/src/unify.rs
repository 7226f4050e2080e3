//! Unification: symmetric structural matching that may instantiate type
//! variables.
//!
//! Unification is commit-or-rollback: a failed branch must not leave
//! partial instance assignments behind. Each entry point takes a snapshot
//! of the union-find table and either commits it or rolls it back, so
//! speculative attempts (union members, subtype probes) leave no trace.

use escalier_common::Literal;
use escalier_types::{Primitive, Ty, TyFunc, TyObjectElem};
use rustc_hash::FxHashMap;

use crate::ctx::{subst_named, InferCtx};
use crate::error::{ConstraintOrigin, TypeError};

impl InferCtx {
    /// Unify two types, recording the error on failure.
    pub fn unify(&mut self, a: &Ty, b: &Ty, origin: &ConstraintOrigin) -> Result<(), TypeError> {
        match self.try_unify(a, b, origin) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.errors.push(err.clone());
                Err(err)
            }
        }
    }

    /// Unify without recording; bindings are committed on success and
    /// rolled back on failure.
    pub fn try_unify(
        &mut self,
        a: &Ty,
        b: &Ty,
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let snapshot = self.snapshot();
        match self.unify_inner(a, b, origin) {
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

    pub(crate) fn unify_inner(
        &mut self,
        a: &Ty,
        b: &Ty,
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let a = self.normalize(a);
        let b = self.normalize(b);

        match (&a, &b) {
            // Two variables: already unified, or union them.
            (Ty::Var(v1), Ty::Var(v2)) => {
                if v1 != v2 {
                    self.union_vars(*v1, *v2);
                }
                Ok(())
            }

            // Variable meets a concrete type: occurs check, then bind.
            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => {
                if self.occurs_in(*v, ty) {
                    Err(TypeError::OccursCheck {
                        var: *v,
                        ty: (*ty).clone(),
                        origin: origin.clone(),
                    })
                } else {
                    self.bind_var(*v, (*ty).clone());
                    Ok(())
                }
            }

            // Unknown unifies with anything.
            (Ty::Unknown, _) | (_, Ty::Unknown) => Ok(()),

            // Nominal references: tie-break by name before alias resolution.
            (Ty::Ref(r1), Ty::Ref(r2)) if r1.name == r2.name => {
                if r1.type_args.len() != r2.type_args.len() {
                    return Err(self.mismatch(&a, &b, origin));
                }
                for (x, y) in r1.type_args.iter().zip(&r2.type_args) {
                    self.unify_inner(x, y, origin)?;
                }
                Ok(())
            }
            (Ty::Ref(_), _) | (_, Ty::Ref(_)) => {
                // Resolve aliases lazily, expanding whichever side has a
                // definition; a nominal reference can still match as one
                // member of a union on the other side.
                if let Ty::Ref(r) = &a {
                    if let Some(expanded) = self.expand_ref(r) {
                        return self.unify_inner(&expanded, &b, origin);
                    }
                }
                if let Ty::Ref(r) = &b {
                    if let Some(expanded) = self.expand_ref(r) {
                        return self.unify_inner(&a, &expanded, origin);
                    }
                }
                match (&a, &b) {
                    (Ty::Ref(_), Ty::Union(members)) => {
                        let members = members.clone();
                        self.unify_with_union(&a, &members, &b, origin)
                    }
                    (Ty::Union(members), Ty::Ref(_)) => {
                        let members = members.clone();
                        self.unify_with_union(&b, &members, &a, origin)
                    }
                    _ => Err(self.mismatch(&a, &b, origin)),
                }
            }

            (Ty::Prim(p1), Ty::Prim(p2)) if p1 == p2 => Ok(()),

            (Ty::Lit(l1), Ty::Lit(l2)) if l1 == l2 => Ok(()),

            // A literal widens into its own primitive.
            (Ty::Lit(lit), Ty::Prim(prim)) | (Ty::Prim(prim), Ty::Lit(lit))
                if literal_base(lit) == Some(*prim) =>
            {
                Ok(())
            }

            (Ty::Tuple(e1), Ty::Tuple(e2)) => self.unify_tuples(e1, e2, origin),

            (Ty::Object(o1), Ty::Object(o2)) => {
                if o1.exact != o2.exact
                    || o1.immutable != o2.immutable
                    || o1.mutable != o2.mutable
                {
                    return Err(self.mismatch(&a, &b, origin));
                }
                self.unify_objects(&o1.elems, &o2.elems, origin)
            }

            (Ty::Func(f1), Ty::Func(f2)) => self.unify_funcs(f1, f2, origin),

            // Two unions: members must pair up one-to-one, regardless of
            // the order they were written in.
            (Ty::Union(m1), Ty::Union(m2)) => {
                let m1 = m1.clone();
                let m2 = m2.clone();
                self.unify_unions(&m1, &m2, &a, &b, origin)
            }

            // Exactly one side a union: exactly one member must match.
            (Ty::Union(members), other) | (other, Ty::Union(members)) => {
                let members = members.clone();
                let other = (*other).clone();
                let union = if matches!(a, Ty::Union(_)) { a.clone() } else { b.clone() };
                self.unify_with_union(&other, &members, &union, origin)
            }

            (Ty::Never, Ty::Never) => Ok(()),

            (Ty::GlobalThis, Ty::GlobalThis) => Ok(()),
            (Ty::UniqueSymbol(s1), Ty::UniqueSymbol(s2)) if s1 == s2 => Ok(()),
            (Ty::Infer(n1), Ty::Infer(n2)) if n1 == n2 => Ok(()),
            (Ty::Wildcard, _) | (_, Ty::Wildcard) => Ok(()),
            (Ty::Intrinsic(n1), Ty::Intrinsic(n2)) if n1 == n2 => Ok(()),

            (Ty::Intersection(t1), Ty::Intersection(t2)) if t1 == t2 => Ok(()),

            (
                Ty::Extract { extractor: e1, args: a1 },
                Ty::Extract { extractor: e2, args: a2 },
            ) => {
                if a1.len() != a2.len() {
                    return Err(self.mismatch(&a, &b, origin));
                }
                self.unify_inner(e1, e2, origin)?;
                for (x, y) in a1.iter().zip(a2) {
                    self.unify_inner(x, y, origin)?;
                }
                Ok(())
            }

            (
                Ty::TemplateLit { quasis: q1, types: t1 },
                Ty::TemplateLit { quasis: q2, types: t2 },
            ) if q1 == q2 && t1.len() == t2.len() => {
                for (x, y) in t1.iter().zip(t2) {
                    self.unify_inner(x, y, origin)?;
                }
                Ok(())
            }

            _ => Err(self.mismatch(&a, &b, origin)),
        }
    }

    fn mismatch(&self, a: &Ty, b: &Ty, origin: &ConstraintOrigin) -> TypeError {
        TypeError::UnificationFailure {
            expected: a.clone(),
            found: b.clone(),
            origin: origin.clone(),
        }
    }

    // ── Tuples ──────────────────────────────────────────────────────────

    /// Pointwise unification; a trailing rest element may absorb one or
    /// more trailing elements from the other side.
    fn unify_tuples(
        &mut self,
        e1: &[Ty],
        e2: &[Ty],
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let rest1 = matches!(e1.last(), Some(Ty::RestSpread(_)));
        let rest2 = matches!(e2.last(), Some(Ty::RestSpread(_)));

        if rest1 && e2.len() >= e1.len() - 1 {
            return self.unify_tuple_rest(e1, e2, origin);
        }
        if rest2 && e1.len() >= e2.len() - 1 {
            return self.unify_tuple_rest(e2, e1, origin);
        }

        if e1.len() != e2.len() {
            return Err(TypeError::ArityMismatch {
                expected: e1.len(),
                found: e2.len(),
                origin: origin.clone(),
            });
        }
        for (x, y) in e1.iter().zip(e2) {
            self.unify_inner(x, y, origin)?;
        }
        Ok(())
    }

    /// `with_rest` ends in a rest element absorbing the tail of `other`.
    fn unify_tuple_rest(
        &mut self,
        with_rest: &[Ty],
        other: &[Ty],
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let prefix = with_rest.len() - 1;
        for (x, y) in with_rest[..prefix].iter().zip(other) {
            self.unify_inner(x, y, origin)?;
        }
        let Some(Ty::RestSpread(inner)) = with_rest.last() else {
            unreachable!("caller checked the trailing rest element");
        };
        let tail = Ty::Tuple(other[prefix..].to_vec());
        self.unify_inner(inner, &tail, origin)
    }

    // ── Objects ─────────────────────────────────────────────────────────

    /// Keys present on either side must unify pointwise; optional
    /// properties tolerate absence on the other side. Callable signatures
    /// unify when both sides carry one.
    fn unify_objects(
        &mut self,
        e1: &[TyObjectElem],
        e2: &[TyObjectElem],
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        self.unify_object_keys(e1, e2, origin)?;
        self.unify_object_keys(e2, e1, origin)?;

        let callable1 = e1.iter().find_map(|e| match e {
            TyObjectElem::Callable(f) => Some(f.clone()),
            _ => None,
        });
        let callable2 = e2.iter().find_map(|e| match e {
            TyObjectElem::Callable(f) => Some(f.clone()),
            _ => None,
        });
        match (callable1, callable2) {
            (Some(f1), Some(f2)) => self.unify_funcs(&f1, &f2, origin),
            (None, None) => Ok(()),
            (Some(f), None) | (None, Some(f)) => Err(TypeError::UnificationFailure {
                expected: Ty::Func(Box::new(f)),
                found: Ty::Object(Box::new(escalier_types::TyObject::structural(vec![]))),
                origin: origin.clone(),
            }),
        }
    }

    fn unify_object_keys(
        &mut self,
        from: &[TyObjectElem],
        to: &[TyObjectElem],
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        for elem in from {
            let Some(key) = elem.key() else { continue };
            let counterpart = to.iter().find(|e| e.key() == Some(key));
            match (elem, counterpart) {
                (TyObjectElem::Property { ty, optional, .. }, None) => {
                    if !optional {
                        return Err(TypeError::UnificationFailure {
                            expected: ty.clone(),
                            found: Ty::undefined(),
                            origin: origin.clone(),
                        });
                    }
                }
                (
                    TyObjectElem::Property { ty: t1, .. },
                    Some(TyObjectElem::Property { ty: t2, .. }),
                ) => self.unify_inner(t1, t2, origin)?,
                (
                    TyObjectElem::Method { func: f1, .. },
                    Some(TyObjectElem::Method { func: f2, .. }),
                ) => self.unify_funcs(f1, f2, origin)?,
                (
                    TyObjectElem::Getter { ret: r1, .. },
                    Some(TyObjectElem::Getter { ret: r2, .. }),
                ) => self.unify_inner(r1, r2, origin)?,
                (
                    TyObjectElem::Setter { param: p1, .. },
                    Some(TyObjectElem::Setter { param: p2, .. }),
                ) => self.unify_inner(p1, p2, origin)?,
                (_, None) => {}
                _ => {
                    return Err(TypeError::UnificationFailure {
                        expected: Ty::Object(Box::new(
                            escalier_types::TyObject::structural(from.to_vec()),
                        )),
                        found: Ty::Object(Box::new(
                            escalier_types::TyObject::structural(to.to_vec()),
                        )),
                        origin: origin.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    // ── Functions ───────────────────────────────────────────────────────

    /// α-rename type parameters to fresh variables, unify parameter lists
    /// positionally (tolerating omittable trailing parameters on one
    /// side), then unify return and throws types.
    pub(crate) fn unify_funcs(
        &mut self,
        f1: &TyFunc,
        f2: &TyFunc,
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let f1 = self.alpha_rename(f1, origin.span());
        let f2 = self.alpha_rename(f2, origin.span());

        let len = f1.params.len().max(f2.params.len());
        for i in 0..len {
            match (f1.params.get(i), f2.params.get(i)) {
                (Some(p1), Some(p2)) => self.unify_inner(&p1.ty, &p2.ty, origin)?,
                (Some(p), None) | (None, Some(p)) => {
                    if !p.is_omittable() {
                        return Err(TypeError::ArityMismatch {
                            expected: f1.params.len(),
                            found: f2.params.len(),
                            origin: origin.clone(),
                        });
                    }
                }
                (None, None) => unreachable!(),
            }
        }

        self.unify_inner(&f1.ret, &f2.ret, origin)?;
        let t1 = f1.throws.as_deref().cloned().unwrap_or(Ty::Never);
        let t2 = f2.throws.as_deref().cloned().unwrap_or(Ty::Never);
        self.unify_inner(&t1, &t2, origin)
    }

    /// Instantiate a function's named type parameters with fresh
    /// variables, leaving a monomorphic signature.
    pub(crate) fn alpha_rename(&mut self, func: &TyFunc, span: escalier_common::Span) -> TyFunc {
        if func.type_params.is_empty() {
            return func.clone();
        }
        let mut mapping = FxHashMap::default();
        for tp in &func.type_params {
            let fresh = self.fresh_var(span);
            mapping.insert(tp.name.clone(), fresh);
        }
        let renamed = subst_named(&Ty::Func(Box::new(func.clone())), &mapping);
        match renamed {
            Ty::Func(renamed) => TyFunc { type_params: Vec::new(), ..*renamed },
            _ => unreachable!("substitution preserves the head constructor"),
        }
    }

    // ── Unions ──────────────────────────────────────────────────────────

    /// Unify two unions pointwise: arities must agree and every member of
    /// one side must claim exactly one member of the other, in any order.
    /// A member that could claim several counterparts is ambiguous, the
    /// same ruling as one-sided union matching.
    fn unify_unions(
        &mut self,
        m1: &[Ty],
        m2: &[Ty],
        a: &Ty,
        b: &Ty,
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        if m1 == m2 {
            return Ok(());
        }
        if m1.len() != m2.len() {
            return Err(self.mismatch(a, b, origin));
        }

        let mut claimed = vec![false; m2.len()];
        let mut pairs: Vec<(&Ty, &Ty)> = Vec::with_capacity(m1.len());
        for x in m1 {
            let mut matched = Vec::new();
            for (j, y) in m2.iter().enumerate() {
                if claimed[j] {
                    continue;
                }
                let snapshot = self.snapshot();
                let ok = self.unify_inner(x, y, origin).is_ok();
                self.rollback_to(snapshot);
                if ok {
                    matched.push(j);
                }
            }
            match matched.as_slice() {
                [] => return Err(self.mismatch(a, b, origin)),
                [only] => {
                    claimed[*only] = true;
                    pairs.push((x, &m2[*only]));
                }
                _ => {
                    return Err(TypeError::AmbiguousUnion {
                        ty: x.clone(),
                        union: b.clone(),
                        origin: origin.clone(),
                    })
                }
            }
        }
        for (x, y) in pairs {
            self.unify_inner(x, y, origin)?;
        }
        Ok(())
    }

    /// Attempt to unify `ty` with each union member under a rolled-back
    /// snapshot; exactly one member may match.
    fn unify_with_union(
        &mut self,
        ty: &Ty,
        members: &[Ty],
        union: &Ty,
        origin: &ConstraintOrigin,
    ) -> Result<(), TypeError> {
        let mut matched = Vec::new();
        for (i, member) in members.iter().enumerate() {
            let snapshot = self.snapshot();
            let ok = self.unify_inner(ty, member, origin).is_ok();
            self.rollback_to(snapshot);
            if ok {
                matched.push(i);
            }
        }
        match matched.as_slice() {
            [] => Err(TypeError::UnificationFailure {
                expected: union.clone(),
                found: ty.clone(),
                origin: origin.clone(),
            }),
            [only] => self.unify_inner(ty, &members[*only], origin),
            _ => Err(TypeError::AmbiguousUnion {
                ty: ty.clone(),
                union: union.clone(),
                origin: origin.clone(),
            }),
        }
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
    use escalier_types::TyFuncParam;

    fn origin() -> ConstraintOrigin {
        ConstraintOrigin::Builtin
    }

    #[test]
    fn unify_two_fresh_vars_then_bind() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_var(Span::synthetic());
        let b = ctx.fresh_var(Span::synthetic());
        assert!(ctx.unify(&a, &b, &origin()).is_ok());
        assert!(ctx.unify(&a, &Ty::num(), &origin()).is_ok());
        assert_eq!(ctx.prune(&b), Ty::num());
    }

    #[test]
    fn unify_mismatch_reports_both_types() {
        let mut ctx = InferCtx::new();
        let result = ctx.unify(&Ty::num(), &Ty::str(), &origin());
        match result.unwrap_err() {
            TypeError::UnificationFailure { expected, found, .. } => {
                assert_eq!(expected, Ty::num());
                assert_eq!(found, Ty::str());
            }
            other => panic!("expected UnificationFailure, got {other:?}"),
        }
        assert_eq!(ctx.errors.len(), 1);
    }

    #[test]
    fn occurs_check_rejects_cyclic_binding() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_var(Span::synthetic());
        let fun = Ty::func(vec![TyFuncParam::new("x", a.clone())], Ty::num());
        let result = ctx.unify(&a, &fun, &origin());
        assert!(matches!(result.unwrap_err(), TypeError::OccursCheck { .. }));
        // The failed branch must leave no binding behind.
        assert_eq!(ctx.prune(&a), a);
    }

    #[test]
    fn literal_unifies_with_its_primitive() {
        let mut ctx = InferCtx::new();
        assert!(ctx.unify(&Ty::lit_num(5.0), &Ty::num(), &origin()).is_ok());
        assert!(ctx.unify(&Ty::str(), &Ty::lit_str("a"), &origin()).is_ok());
        assert!(ctx.unify(&Ty::lit_num(5.0), &Ty::str(), &origin()).is_err());
    }

    #[test]
    fn unify_symmetry_on_concrete_inputs() {
        let mut ctx = InferCtx::new();
        let pairs = [
            (Ty::num(), Ty::num()),
            (Ty::num(), Ty::str()),
            (Ty::Tuple(vec![Ty::num()]), Ty::Tuple(vec![Ty::num()])),
            (Ty::lit_num(1.0), Ty::num()),
        ];
        for (a, b) in pairs {
            let ab = ctx.try_unify(&a, &b, &origin()).is_ok();
            let ba = ctx.try_unify(&b, &a, &origin()).is_ok();
            assert_eq!(ab, ba, "symmetry violated for {a} ~ {b}");
        }
    }

    #[test]
    fn tuple_rest_absorbs_trailing_elements() {
        let mut ctx = InferCtx::new();
        let rest_inner = ctx.fresh_var(Span::synthetic());
        let with_rest = Ty::Tuple(vec![Ty::num(), Ty::RestSpread(Box::new(rest_inner.clone()))]);
        let concrete = Ty::Tuple(vec![Ty::num(), Ty::str(), Ty::bool()]);
        assert!(ctx.unify(&with_rest, &concrete, &origin()).is_ok());
        assert_eq!(ctx.prune(&rest_inner), Ty::Tuple(vec![Ty::str(), Ty::bool()]));
    }

    #[test]
    fn union_accepts_unique_match() {
        let mut ctx = InferCtx::new();
        let union = Ty::union(vec![Ty::num(), Ty::str()]);
        assert!(ctx.unify(&Ty::num(), &union, &origin()).is_ok());
    }

    #[test]
    fn union_rejects_no_match_and_flags_ambiguity() {
        let mut ctx = InferCtx::new();
        let union = Ty::union(vec![Ty::num(), Ty::str()]);
        assert!(matches!(
            ctx.try_unify(&Ty::bool(), &union, &origin()),
            Err(TypeError::UnificationFailure { .. })
        ));

        // A literal number matches both `number` and itself.
        let overlapping = Ty::union(vec![Ty::num(), Ty::lit_num(1.0)]);
        assert!(matches!(
            ctx.try_unify(&Ty::lit_num(1.0), &overlapping, &origin()),
            Err(TypeError::AmbiguousUnion { .. })
        ));
    }

    #[test]
    fn union_vs_union_matches_members_in_any_order() {
        let mut ctx = InferCtx::new();
        let a = Ty::union(vec![Ty::num(), Ty::str()]);
        let b = Ty::union(vec![Ty::str(), Ty::num()]);
        assert!(ctx.try_unify(&a, &b, &origin()).is_ok());
        assert!(ctx.try_unify(&b, &a, &origin()).is_ok());
        // Identical unions take the fast path.
        assert!(ctx.try_unify(&a, &a.clone(), &origin()).is_ok());
    }

    #[test]
    fn union_vs_union_rejects_arity_and_member_mismatches() {
        let mut ctx = InferCtx::new();
        let two = Ty::union(vec![Ty::num(), Ty::str()]);
        let three = Ty::union(vec![Ty::num(), Ty::str(), Ty::bool()]);
        assert!(matches!(
            ctx.try_unify(&two, &three, &origin()),
            Err(TypeError::UnificationFailure { .. })
        ));

        let other = Ty::union(vec![Ty::num(), Ty::bool()]);
        assert!(matches!(
            ctx.try_unify(&two, &other, &origin()),
            Err(TypeError::UnificationFailure { .. })
        ));
    }

    #[test]
    fn union_vs_union_unifies_paired_members() {
        let mut ctx = InferCtx::new();
        // [Opt<t0>, string] ~ [string, Opt<number>] pairs the references
        // and solves the variable.
        let v = ctx.fresh_var(Span::synthetic());
        let a = Ty::union(vec![Ty::reference("Opt", vec![v.clone()]), Ty::str()]);
        let b = Ty::union(vec![Ty::str(), Ty::reference("Opt", vec![Ty::num()])]);
        assert!(ctx.unify(&a, &b, &origin()).is_ok());
        assert_eq!(ctx.prune(&v), Ty::num());
    }

    #[test]
    fn nominal_ref_matches_as_a_union_member() {
        let mut ctx = InferCtx::new();
        let opt = Ty::reference("Opt", vec![Ty::num()]);
        let union = Ty::union(vec![Ty::reference("Opt", vec![Ty::num()]), Ty::str()]);
        assert!(ctx.try_unify(&opt, &union, &origin()).is_ok());
        assert!(ctx.try_unify(&union, &opt, &origin()).is_ok());
        assert!(ctx.try_unify(&Ty::reference("Other", vec![]), &union, &origin()).is_err());
    }

    #[test]
    fn union_vs_union_flags_ambiguous_pairings() {
        let mut ctx = InferCtx::new();
        // The literal member matches both `number` and itself.
        let a = Ty::union(vec![Ty::lit_num(1.0), Ty::str()]);
        let b = Ty::union(vec![Ty::num(), Ty::lit_num(1.0)]);
        assert!(matches!(
            ctx.try_unify(&a, &b, &origin()),
            Err(TypeError::AmbiguousUnion { .. })
        ));
    }

    #[test]
    fn never_unifies_only_with_itself_and_vars() {
        let mut ctx = InferCtx::new();
        assert!(ctx.try_unify(&Ty::Never, &Ty::Never, &origin()).is_ok());
        assert!(ctx.try_unify(&Ty::Never, &Ty::num(), &origin()).is_err());
        let v = ctx.fresh_var(Span::synthetic());
        assert!(ctx.try_unify(&Ty::Never, &v, &origin()).is_ok());
    }

    #[test]
    fn unknown_unifies_with_anything() {
        let mut ctx = InferCtx::new();
        assert!(ctx.try_unify(&Ty::Unknown, &Ty::num(), &origin()).is_ok());
        assert!(ctx.try_unify(&Ty::str(), &Ty::Unknown, &origin()).is_ok());
    }

    #[test]
    fn generic_funcs_alpha_rename_before_unifying() {
        let mut ctx = InferCtx::new();
        // <T>(x: T) -> T  ~  (x: number) -> number
        let mut generic = TyFunc::new(
            vec![TyFuncParam::new("x", Ty::reference("T", vec![]))],
            Ty::reference("T", vec![]),
        );
        generic.type_params = vec![escalier_types::TyTypeParam::new("T")];
        let mono = TyFunc::new(vec![TyFuncParam::new("x", Ty::num())], Ty::num());
        assert!(ctx
            .unify(
                &Ty::Func(Box::new(generic)),
                &Ty::Func(Box::new(mono)),
                &origin()
            )
            .is_ok());
    }

    #[test]
    fn funcs_tolerate_omittable_trailing_params() {
        let mut ctx = InferCtx::new();
        let short = TyFunc::new(vec![TyFuncParam::new("a", Ty::num())], Ty::num());
        let long = TyFunc {
            params: vec![TyFuncParam::new("a", Ty::num()), TyFuncParam {
                name: "b".into(),
                ty: Ty::str(),
                optional: true,
                has_default: false,
            }],
            ..TyFunc::new(vec![], Ty::num())
        };
        assert!(ctx
            .unify(&Ty::Func(Box::new(short)), &Ty::Func(Box::new(long)), &origin())
            .is_ok());
    }

    #[test]
    fn nominal_refs_unify_by_name_with_args() {
        let mut ctx = InferCtx::new();
        let a = Ty::reference("Opt", vec![Ty::num()]);
        let b = Ty::reference("Opt", vec![Ty::num()]);
        assert!(ctx.unify(&a, &b, &origin()).is_ok());
        let c = Ty::reference("Opt", vec![Ty::str()]);
        assert!(ctx.try_unify(&a, &c, &origin()).is_err());
    }

    #[test]
    fn failed_object_unify_rolls_back_var_bindings() {
        let mut ctx = InferCtx::new();
        let v = ctx.fresh_var(Span::synthetic());
        let a = Ty::Tuple(vec![v.clone(), Ty::num()]);
        let b = Ty::Tuple(vec![Ty::str(), Ty::bool()]);
        // First element would bind v := string, second fails.
        assert!(ctx.try_unify(&a, &b, &origin()).is_err());
        assert_eq!(ctx.prune(&v), v, "rollback must clear partial bindings");
    }
}

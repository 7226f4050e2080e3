//! Resolution of type operators: alias expansion, `keyof`, indexed
//! access, conditional types, and template-literal folding.

use escalier_common::Literal;
use escalier_types::{PropKey, Ty, TyCond, TyObjectElem, TyRef};
use rustc_hash::FxHashMap;

use crate::ctx::{subst_named, InferCtx};

impl InferCtx {
    /// Expand a reference through its alias definition, substituting type
    /// arguments for the alias's parameters. Returns `None` for nominal
    /// references (enums, classes, unregistered names).
    pub fn expand_ref(&mut self, reference: &TyRef) -> Option<Ty> {
        let def = self.aliases.get(&reference.name)?.clone();
        let mut mapping = FxHashMap::default();
        for (i, param) in def.type_params.iter().enumerate() {
            let arg = reference.type_args.get(i).cloned().unwrap_or(Ty::Unknown);
            mapping.insert(param.clone(), arg);
        }
        Some(subst_named(&def.ty, &mapping))
    }

    /// Prune, then resolve any type operator at the head of the type:
    /// `keyof`, indexed access, conditionals, and template literals that
    /// can be folded. Leaves unresolvable operators in place.
    pub fn normalize(&mut self, ty: &Ty) -> Ty {
        let ty = self.prune(ty);
        match &ty {
            Ty::KeyOf(target) => self.resolve_keyof(target),
            Ty::Index { target, index } => self
                .resolve_index(target, index)
                .unwrap_or(ty.clone()),
            Ty::Cond(cond) => self.resolve_conditional(cond).unwrap_or(ty.clone()),
            Ty::TemplateLit { quasis, types } => self
                .resolve_template_lit(quasis, types)
                .unwrap_or(ty.clone()),
            _ => ty,
        }
    }

    /// `keyof T`: objects yield the union of their property key literal
    /// types; tuples yield index literals plus `"length"`; unions yield the
    /// intersection of their keyofs; intersections the union.
    pub fn resolve_keyof(&mut self, target: &Ty) -> Ty {
        let target = self.prune(target);
        match &target {
            Ty::Ref(r) => match self.expand_ref(r) {
                Some(expanded) => self.resolve_keyof(&expanded),
                None => Ty::KeyOf(Box::new(target.clone())),
            },
            Ty::Object(obj) => {
                let mut keys = Vec::new();
                for elem in &obj.elems {
                    if let Some(key) = elem.key() {
                        keys.push(match key {
                            PropKey::Str(s) => Ty::lit_str(s.clone()),
                            PropKey::Num(n) => Ty::lit_num(*n),
                            PropKey::Sym(id) => Ty::UniqueSymbol(*id),
                        });
                    }
                }
                Ty::union(keys)
            }
            Ty::Tuple(elems) => {
                let mut keys: Vec<Ty> =
                    (0..elems.len()).map(|i| Ty::lit_num(i as f64)).collect();
                keys.push(Ty::lit_str("length"));
                Ty::union(keys)
            }
            Ty::Union(types) => {
                let keyofs = types.iter().map(|t| self.resolve_keyof(t)).collect();
                Ty::Intersection(keyofs)
            }
            Ty::Intersection(types) => {
                let keyofs = types.iter().map(|t| self.resolve_keyof(t)).collect();
                Ty::union(keyofs)
            }
            _ => Ty::KeyOf(Box::new(target.clone())),
        }
    }

    /// `T[K]`: look up the property or tuple element type. `None` means
    /// the access cannot be resolved statically.
    pub fn resolve_index(&mut self, target: &Ty, index: &Ty) -> Option<Ty> {
        let target = self.prune(target);
        let index = self.prune(index);
        match (&target, &index) {
            (Ty::Ref(r), _) => {
                let expanded = self.expand_ref(r)?;
                self.resolve_index(&expanded, &index)
            }
            (Ty::Tuple(elems), Ty::Lit(Literal::Num(n))) => {
                let i = *n as usize;
                Some(elems.get(i).cloned().unwrap_or_else(Ty::undefined))
            }
            (Ty::Tuple(_), Ty::Lit(Literal::Str(s))) if s == "length" => Some(Ty::num()),
            (Ty::Object(obj), Ty::Lit(Literal::Str(s))) => obj.lookup(s),
            (Ty::Object(obj), Ty::Lit(Literal::Num(n))) => {
                let key = PropKey::Num(*n);
                obj.elems.iter().find_map(|elem| match elem {
                    TyObjectElem::Property { key: k, ty, .. } if *k == key => Some(ty.clone()),
                    _ => None,
                })
            }
            (Ty::Union(types), _) => {
                let mut results = Vec::new();
                for t in types {
                    results.push(self.resolve_index(t, &index)?);
                }
                Some(Ty::union(results))
            }
            (_, Ty::Union(indices)) => {
                let mut results = Vec::new();
                for i in indices {
                    results.push(self.resolve_index(&target, i)?);
                }
                Some(Ty::union(results))
            }
            _ => None,
        }
    }

    /// Resolve a conditional type. Returns `None` while the check type is
    /// still an unsolved variable. Distributes over a union check.
    pub fn resolve_conditional(&mut self, cond: &TyCond) -> Option<Ty> {
        let check = self.prune(&cond.check);
        match &check {
            Ty::Var(_) => None,
            Ty::Union(members) => {
                // Distributive conditional: apply per member.
                let mut results = Vec::new();
                for member in members {
                    let arm = TyCond {
                        check: member.clone(),
                        extends: cond.extends.clone(),
                        then_ty: cond.then_ty.clone(),
                        else_ty: cond.else_ty.clone(),
                    };
                    results.push(self.resolve_conditional(&arm)?);
                }
                Some(Ty::union(results))
            }
            _ => {
                let mut captures = FxHashMap::default();
                if self.match_extends(&check, &cond.extends, &mut captures) {
                    Some(subst_named(&cond.then_ty, &captures))
                } else {
                    Some(cond.else_ty.clone())
                }
            }
        }
    }

    /// Structural match of `check` against an extends clause, binding
    /// `infer` captures. Falls back to a rolled-back subtype probe for
    /// shapes without captures.
    pub(crate) fn match_extends(
        &mut self,
        check: &Ty,
        extends: &Ty,
        captures: &mut FxHashMap<String, Ty>,
    ) -> bool {
        let check = self.prune(check);
        let extends = self.prune(extends);
        match (&check, &extends) {
            (_, Ty::Infer(name)) => {
                captures.insert(name.clone(), check.clone());
                true
            }
            (_, Ty::Wildcard) | (_, Ty::Unknown) => true,
            (Ty::Ref(a), Ty::Ref(b)) if a.name == b.name => {
                a.type_args.len() == b.type_args.len()
                    && a.type_args
                        .iter()
                        .zip(&b.type_args)
                        .all(|(x, y)| self.match_extends(x, y, captures))
            }
            (Ty::Tuple(a), Ty::Tuple(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| self.match_extends(x, y, captures))
            }
            (Ty::Func(a), Ty::Func(b)) => {
                a.params.len() == b.params.len()
                    && a.params
                        .iter()
                        .zip(&b.params)
                        .all(|(x, y)| self.match_extends(&x.ty, &y.ty, captures))
                    && self.match_extends(&a.ret, &b.ret, captures)
            }
            (Ty::Object(a), Ty::Object(b)) => b.elems.iter().all(|elem| match elem {
                TyObjectElem::Property { key: PropKey::Str(k), ty, .. } => {
                    match a.as_ref().lookup(k) {
                        Some(found) => self.match_extends(&found, ty, captures),
                        None => false,
                    }
                }
                _ => false,
            }),
            _ => self.probe_subtype(&check, &extends),
        }
    }

    /// Fold a template-literal type into a single string literal when all
    /// of its interpolated types are literal. `None` keeps the template.
    pub fn resolve_template_lit(&mut self, quasis: &[String], types: &[Ty]) -> Option<Ty> {
        let mut out = String::new();
        for (i, quasi) in quasis.iter().enumerate() {
            out.push_str(quasi);
            if let Some(ty) = types.get(i) {
                match self.normalize(ty) {
                    Ty::Lit(Literal::Str(s)) => out.push_str(&s),
                    Ty::Lit(Literal::Num(n)) => {
                        out.push_str(&Literal::Num(n).to_string());
                    }
                    Ty::Lit(Literal::Bool(b)) => out.push_str(if b { "true" } else { "false" }),
                    _ => return None,
                }
            }
        }
        Some(Ty::lit_str(out))
    }

    /// Widen literal types to their primitives, as happens when an
    /// unannotated binding captures a literal initializer. `null`,
    /// `undefined`, and regexes keep their types.
    pub fn widen(&mut self, ty: &Ty) -> Ty {
        let ty = self.prune(ty);
        match &ty {
            Ty::Lit(Literal::Num(_)) => Ty::num(),
            Ty::Lit(Literal::Str(_)) => Ty::str(),
            Ty::Lit(Literal::Bool(_)) => Ty::bool(),
            Ty::Lit(Literal::BigInt(_)) => Ty::bigint(),
            Ty::Tuple(elems) => Ty::Tuple(elems.iter().map(|t| self.widen(t)).collect()),
            Ty::Object(obj) => {
                let mut widened = (**obj).clone();
                for elem in widened.elems.iter_mut() {
                    if let TyObjectElem::Property { ty, .. } = elem {
                        *ty = self.widen(ty);
                    }
                }
                Ty::Object(Box::new(widened))
            }
            Ty::Union(types) => {
                let widened = types.iter().map(|t| self.widen(t)).collect();
                Ty::union(widened)
            }
            _ => ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::AliasDef;
    use escalier_types::TyObject;

    fn obj_xy() -> Ty {
        Ty::Object(Box::new(TyObject::structural(vec![
            TyObjectElem::Property {
                key: PropKey::str("x"),
                optional: false,
                readonly: false,
                ty: Ty::num(),
            },
            TyObjectElem::Property {
                key: PropKey::str("y"),
                optional: false,
                readonly: false,
                ty: Ty::str(),
            },
        ])))
    }

    #[test]
    fn keyof_object_is_union_of_key_literals() {
        let mut ctx = InferCtx::new();
        let keys = ctx.resolve_keyof(&obj_xy());
        assert_eq!(keys, Ty::union(vec![Ty::lit_str("x"), Ty::lit_str("y")]));
    }

    #[test]
    fn keyof_tuple_includes_length() {
        let mut ctx = InferCtx::new();
        let keys = ctx.resolve_keyof(&Ty::Tuple(vec![Ty::num(), Ty::str()]));
        assert_eq!(
            keys,
            Ty::union(vec![Ty::lit_num(0.0), Ty::lit_num(1.0), Ty::lit_str("length")])
        );
    }

    #[test]
    fn index_into_object_and_tuple() {
        let mut ctx = InferCtx::new();
        assert_eq!(
            ctx.resolve_index(&obj_xy(), &Ty::lit_str("x")),
            Some(Ty::num())
        );
        let tuple = Ty::Tuple(vec![Ty::num(), Ty::str()]);
        assert_eq!(ctx.resolve_index(&tuple, &Ty::lit_num(1.0)), Some(Ty::str()));
        assert_eq!(
            ctx.resolve_index(&tuple, &Ty::lit_num(9.0)),
            Some(Ty::undefined())
        );
    }

    #[test]
    fn alias_expansion_substitutes_args() {
        let mut ctx = InferCtx::new();
        ctx.aliases.insert(
            "Pair".into(),
            AliasDef {
                type_params: vec!["T".into()],
                ty: Ty::Tuple(vec![
                    Ty::reference("T", vec![]),
                    Ty::reference("T", vec![]),
                ]),
            },
        );
        let expanded = ctx.expand_ref(&TyRef::new("Pair", vec![Ty::num()])).unwrap();
        assert_eq!(expanded, Ty::Tuple(vec![Ty::num(), Ty::num()]));
    }

    #[test]
    fn alias_expansion_flattens_union_arguments() {
        let mut ctx = InferCtx::new();
        // type OrStr<T> = T | string, applied to `number | boolean`.
        ctx.aliases.insert(
            "OrStr".into(),
            AliasDef {
                type_params: vec!["T".into()],
                ty: Ty::Union(vec![Ty::reference("T", vec![]), Ty::str()]),
            },
        );
        let expanded = ctx
            .expand_ref(&TyRef::new(
                "OrStr",
                vec![Ty::union(vec![Ty::num(), Ty::bool()])],
            ))
            .unwrap();
        // The substituted union flattens instead of nesting.
        assert_eq!(
            expanded,
            Ty::union(vec![Ty::num(), Ty::bool(), Ty::str()])
        );
    }

    #[test]
    fn conditional_takes_then_branch_with_infer_capture() {
        let mut ctx = InferCtx::new();
        // [number, string] extends [infer A, string] ? A : never
        let cond = TyCond {
            check: Ty::Tuple(vec![Ty::num(), Ty::str()]),
            extends: Ty::Tuple(vec![Ty::Infer("A".into()), Ty::str()]),
            then_ty: Ty::reference("A", vec![]),
            else_ty: Ty::Never,
        };
        assert_eq!(ctx.resolve_conditional(&cond), Some(Ty::num()));
    }

    #[test]
    fn conditional_distributes_over_union_check() {
        let mut ctx = InferCtx::new();
        // (number | string) extends number ? "n" : "s"  =>  "n" | "s"
        let cond = TyCond {
            check: Ty::union(vec![Ty::num(), Ty::str()]),
            extends: Ty::num(),
            then_ty: Ty::lit_str("n"),
            else_ty: Ty::lit_str("s"),
        };
        assert_eq!(
            ctx.resolve_conditional(&cond),
            Some(Ty::union(vec![Ty::lit_str("n"), Ty::lit_str("s")]))
        );
    }

    #[test]
    fn template_lit_folds_literals() {
        let mut ctx = InferCtx::new();
        let folded = ctx.resolve_template_lit(
            &["get".into(), "".into()],
            &[Ty::lit_str("Name")],
        );
        assert_eq!(folded, Some(Ty::lit_str("getName")));
        let kept = ctx.resolve_template_lit(&["get".into(), "".into()], &[Ty::str()]);
        assert_eq!(kept, None);
    }

    #[test]
    fn widen_literals_to_primitives() {
        let mut ctx = InferCtx::new();
        assert_eq!(ctx.widen(&Ty::lit_num(5.0)), Ty::num());
        assert_eq!(ctx.widen(&Ty::lit_str("a")), Ty::str());
        assert_eq!(ctx.widen(&Ty::undefined()), Ty::undefined());
        assert_eq!(
            ctx.widen(&Ty::Tuple(vec![Ty::lit_num(1.0), Ty::lit_str("a")])),
            Ty::Tuple(vec![Ty::num(), Ty::str()])
        );
    }
}

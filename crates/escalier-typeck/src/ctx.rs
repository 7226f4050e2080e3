//! The inference context: union-find table, registries, and error sinks.
//!
//! All inference happens through [`InferCtx`]. It creates fresh type
//! variables, resolves types through the union-find table, runs the occurs
//! check, and collects errors and warnings. The `ena` table's snapshots
//! provide commit-or-rollback over the set of variables touched in a
//! speculative branch.

use ena::unify::{InPlaceUnificationTable, Snapshot};
use escalier_common::Span;
use escalier_types::{
    MappedTy, Scheme, Ty, TyCond, TyFunc, TyFuncParam, TyObject, TyObjectElem, TyRef, TyVar,
};
use rustc_hash::FxHashMap;

use crate::error::TypeError;

/// A registered type alias or interface body.
#[derive(Clone, Debug)]
pub struct AliasDef {
    pub type_params: Vec<String>,
    pub ty: Ty,
}

/// A registered enum definition.
#[derive(Clone, Debug)]
pub struct EnumDef {
    /// Qualified name, e.g. `"Opt"` or `"geom.Shape"`.
    pub name: String,
    pub type_params: Vec<String>,
    /// Variant name and payload types (which may reference type params).
    pub variants: Vec<(String, Vec<Ty>)>,
}

/// A registered class: its instance object type and type parameters.
#[derive(Clone, Debug)]
pub struct ClassDef {
    pub name: String,
    pub type_params: Vec<String>,
    pub instance: Ty,
}

/// The inference context.
pub struct InferCtx {
    table: InPlaceUnificationTable<TyVar>,
    /// Span at which each variable was introduced, indexed by `TyVar.0`.
    var_spans: Vec<Span>,
    next_symbol: u32,
    /// Type errors accumulated during checking.
    pub errors: Vec<TypeError>,
    /// Warnings accumulated during checking.
    pub warnings: Vec<TypeError>,
    /// Alias and interface bodies, keyed by qualified name.
    pub aliases: FxHashMap<String, AliasDef>,
    /// Enum definitions, keyed by qualified name.
    pub enums: FxHashMap<String, EnumDef>,
    /// Enum registration order, for deterministic bare-variant lookup.
    pub enum_order: Vec<String>,
    /// Class definitions, keyed by qualified name.
    pub classes: FxHashMap<String, ClassDef>,
    /// Stack of throws accumulators for enclosing functions and try blocks.
    throws: Vec<Vec<Ty>>,
    /// Stack of enclosing-function async flags.
    async_fns: Vec<bool>,
    /// Stack of enclosing-function return-type variables.
    returns: Vec<Ty>,
    /// Count of explicit `return` statements seen per enclosing function.
    returns_seen: Vec<u32>,
    /// Name of the alias currently being lowered (for `intrinsic`).
    pub current_alias: Option<String>,
}

impl InferCtx {
    pub fn new() -> Self {
        InferCtx {
            table: InPlaceUnificationTable::new(),
            var_spans: Vec::new(),
            next_symbol: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            aliases: FxHashMap::default(),
            enums: FxHashMap::default(),
            enum_order: Vec::new(),
            classes: FxHashMap::default(),
            throws: Vec::new(),
            async_fns: Vec::new(),
            returns: Vec::new(),
            returns_seen: Vec::new(),
            current_alias: None,
        }
    }

    pub fn record(&mut self, err: TypeError) {
        self.errors.push(err);
    }

    /// Register an enum definition, keeping registration order for
    /// deterministic bare-variant lookup.
    pub fn register_enum(&mut self, def: EnumDef) {
        let key = def.name.clone();
        if !self.enum_order.contains(&key) {
            self.enum_order.push(key.clone());
        }
        self.enums.insert(key, def);
    }

    // ── Variables ───────────────────────────────────────────────────────

    /// Create a fresh type variable, remembering the span that demanded it.
    pub fn fresh_var(&mut self, span: Span) -> Ty {
        let var = self.table.new_key(None);
        while self.var_spans.len() <= var.0 as usize {
            self.var_spans.push(Span::synthetic());
        }
        self.var_spans[var.0 as usize] = span;
        Ty::Var(var)
    }

    /// The span at which a variable was introduced, if known.
    pub fn var_span(&self, var: TyVar) -> Span {
        self.var_spans.get(var.0 as usize).copied().unwrap_or_else(Span::synthetic)
    }

    pub fn fresh_symbol_id(&mut self) -> u32 {
        let id = self.next_symbol;
        self.next_symbol += 1;
        id
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    pub fn snapshot(&mut self) -> Snapshot<ena::unify::InPlace<TyVar>> {
        self.table.snapshot()
    }

    pub fn rollback_to(&mut self, snapshot: Snapshot<ena::unify::InPlace<TyVar>>) {
        self.table.rollback_to(snapshot);
    }

    pub fn commit(&mut self, snapshot: Snapshot<ena::unify::InPlace<TyVar>>) {
        self.table.commit(snapshot);
    }

    // ── Union-find plumbing ─────────────────────────────────────────────

    pub(crate) fn probe(&mut self, var: TyVar) -> Option<Ty> {
        self.table.probe_value(var)
    }

    pub(crate) fn union_vars(&mut self, a: TyVar, b: TyVar) {
        self.table
            .unify_var_var(a, b)
            .expect("unifying two unbound vars cannot conflict");
    }

    pub(crate) fn bind_var(&mut self, var: TyVar, ty: Ty) {
        self.table
            .unify_var_value(var, Some(ty))
            .expect("binding an unbound var after the occurs check cannot conflict");
    }

    // ── Prune ───────────────────────────────────────────────────────────

    /// Follow a variable's instance chain until a non-variable is reached,
    /// or return the chain's root variable. The table path-compresses as a
    /// side effect, so repeated prunes shorten chains.
    pub fn prune(&mut self, ty: &Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(*v) {
                Some(inner) => self.prune(&inner),
                // Normalize to the root key so variables in the same
                // equivalence class prune to the same representative.
                None => Ty::Var(self.table.find(*v)),
            },
            other => other.clone(),
        }
    }

    /// Deeply resolve a type: prune every variable it contains, leaving
    /// uninstantiated variables as their root representative.
    pub fn resolve(&mut self, ty: &Ty) -> Ty {
        let ty = self.prune(ty);
        match ty {
            Ty::Var(_) => ty,
            Ty::Ref(r) => Ty::Ref(TyRef {
                name: r.name,
                type_args: r.type_args.iter().map(|t| self.resolve(t)).collect(),
                alias: None,
            }),
            Ty::Func(func) => Ty::Func(Box::new(self.resolve_func(&func))),
            Ty::Object(obj) => Ty::Object(Box::new(self.resolve_object(&obj))),
            Ty::Tuple(elems) => Ty::Tuple(elems.iter().map(|t| self.resolve(t)).collect()),
            Ty::RestSpread(inner) => Ty::RestSpread(Box::new(self.resolve(&inner))),
            Ty::Union(types) => {
                Ty::union(types.iter().map(|t| self.resolve(t)).collect())
            }
            Ty::Intersection(types) => {
                Ty::Intersection(types.iter().map(|t| self.resolve(t)).collect())
            }
            Ty::KeyOf(t) => Ty::KeyOf(Box::new(self.resolve(&t))),
            Ty::Index { target, index } => Ty::Index {
                target: Box::new(self.resolve(&target)),
                index: Box::new(self.resolve(&index)),
            },
            Ty::Cond(cond) => Ty::Cond(Box::new(TyCond {
                check: self.resolve(&cond.check),
                extends: self.resolve(&cond.extends),
                then_ty: self.resolve(&cond.then_ty),
                else_ty: self.resolve(&cond.else_ty),
            })),
            Ty::Extract { extractor, args } => Ty::Extract {
                extractor: Box::new(self.resolve(&extractor)),
                args: args.iter().map(|t| self.resolve(t)).collect(),
            },
            Ty::TemplateLit { quasis, types } => Ty::TemplateLit {
                quasis,
                types: types.iter().map(|t| self.resolve(t)).collect(),
            },
            other => other,
        }
    }

    pub(crate) fn resolve_func(&mut self, func: &TyFunc) -> TyFunc {
        TyFunc {
            type_params: func.type_params.clone(),
            self_ty: func.self_ty.as_ref().map(|t| Box::new(self.resolve(t))),
            params: func
                .params
                .iter()
                .map(|p| TyFuncParam {
                    name: p.name.clone(),
                    ty: self.resolve(&p.ty),
                    optional: p.optional,
                    has_default: p.has_default,
                })
                .collect(),
            ret: Box::new(self.resolve(&func.ret)),
            throws: func.throws.as_ref().map(|t| Box::new(self.resolve(t))),
        }
    }

    fn resolve_object(&mut self, obj: &TyObject) -> TyObject {
        TyObject {
            elems: obj
                .elems
                .iter()
                .map(|elem| match elem {
                    TyObjectElem::Callable(f) => TyObjectElem::Callable(self.resolve_func(f)),
                    TyObjectElem::Constructor(f) => {
                        TyObjectElem::Constructor(self.resolve_func(f))
                    }
                    TyObjectElem::Method { key, func } => TyObjectElem::Method {
                        key: key.clone(),
                        func: self.resolve_func(func),
                    },
                    TyObjectElem::Getter { key, ret } => TyObjectElem::Getter {
                        key: key.clone(),
                        ret: Box::new(self.resolve(ret)),
                    },
                    TyObjectElem::Setter { key, param } => TyObjectElem::Setter {
                        key: key.clone(),
                        param: Box::new(self.resolve(param)),
                    },
                    TyObjectElem::Property { key, optional, readonly, ty } => {
                        TyObjectElem::Property {
                            key: key.clone(),
                            optional: *optional,
                            readonly: *readonly,
                            ty: self.resolve(ty),
                        }
                    }
                    TyObjectElem::Mapped(m) => TyObjectElem::Mapped(MappedTy {
                        type_param: m.type_param.clone(),
                        constraint: Box::new(self.resolve(&m.constraint)),
                        name_remap: m.name_remap.as_ref().map(|t| Box::new(self.resolve(t))),
                        value: Box::new(self.resolve(&m.value)),
                        optional: m.optional,
                        readonly: m.readonly,
                    }),
                    TyObjectElem::RestSpread(t) => TyObjectElem::RestSpread(self.resolve(t)),
                })
                .collect(),
            ..obj.clone()
        }
    }

    // ── Occurs check ────────────────────────────────────────────────────

    /// Whether `var` occurs anywhere within `ty`, following instances.
    pub fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v) => {
                if self.table.unioned(*v, var) {
                    return true;
                }
                match self.table.probe_value(*v) {
                    Some(inner) => self.occurs_in(var, &inner),
                    None => false,
                }
            }
            Ty::Ref(r) => r.type_args.iter().any(|t| self.occurs_in(var, t)),
            Ty::Func(func) => {
                func.params.iter().any(|p| self.occurs_in(var, &p.ty))
                    || self.occurs_in(var, &func.ret)
                    || func
                        .throws
                        .as_ref()
                        .is_some_and(|t| self.occurs_in(var, t))
                    || func
                        .self_ty
                        .as_ref()
                        .is_some_and(|t| self.occurs_in(var, t))
            }
            Ty::Object(obj) => obj.elems.iter().any(|elem| match elem {
                TyObjectElem::Callable(f) | TyObjectElem::Constructor(f) => {
                    self.occurs_in_func(var, f)
                }
                TyObjectElem::Method { func, .. } => self.occurs_in_func(var, func),
                TyObjectElem::Getter { ret, .. } => self.occurs_in(var, ret),
                TyObjectElem::Setter { param, .. } => self.occurs_in(var, param),
                TyObjectElem::Property { ty, .. } => self.occurs_in(var, ty),
                TyObjectElem::Mapped(m) => {
                    self.occurs_in(var, &m.constraint) || self.occurs_in(var, &m.value)
                }
                TyObjectElem::RestSpread(t) => self.occurs_in(var, t),
            }),
            Ty::Tuple(elems) => elems.iter().any(|t| self.occurs_in(var, t)),
            Ty::RestSpread(inner) => self.occurs_in(var, inner),
            Ty::Union(types) | Ty::Intersection(types) => {
                types.iter().any(|t| self.occurs_in(var, t))
            }
            Ty::KeyOf(t) => self.occurs_in(var, t),
            Ty::Index { target, index } => {
                self.occurs_in(var, target) || self.occurs_in(var, index)
            }
            Ty::Cond(cond) => {
                self.occurs_in(var, &cond.check)
                    || self.occurs_in(var, &cond.extends)
                    || self.occurs_in(var, &cond.then_ty)
                    || self.occurs_in(var, &cond.else_ty)
            }
            Ty::Extract { extractor, args } => {
                self.occurs_in(var, extractor) || args.iter().any(|t| self.occurs_in(var, t))
            }
            Ty::TemplateLit { types, .. } => types.iter().any(|t| self.occurs_in(var, t)),
            Ty::Prim(_)
            | Ty::Lit(_)
            | Ty::UniqueSymbol(_)
            | Ty::Unknown
            | Ty::Never
            | Ty::GlobalThis
            | Ty::Infer(_)
            | Ty::Wildcard
            | Ty::Intrinsic(_) => false,
        }
    }

    fn occurs_in_func(&mut self, var: TyVar, func: &TyFunc) -> bool {
        let ty = Ty::Func(Box::new(func.clone()));
        self.occurs_in(var, &ty)
    }

    // ── Schemes ─────────────────────────────────────────────────────────

    /// Instantiate a scheme with fresh variables for its quantified vars.
    pub fn instantiate(&mut self, scheme: &Scheme, span: Span) -> Ty {
        if scheme.vars.is_empty() {
            return scheme.ty.clone();
        }
        let mapping: FxHashMap<TyVar, Ty> = scheme
            .vars
            .iter()
            .map(|v| (*v, self.fresh_var(span)))
            .collect();
        subst_vars(&scheme.ty, &mapping)
    }

    /// Generalize a type into a scheme quantifying every unbound variable.
    ///
    /// Declaration-level placeholders stay monomorphic within their SCC;
    /// the checker generalizes only at SCC completion, so this simpler rule
    /// (quantify all unbound vars) is sufficient.
    pub fn generalize(&mut self, ty: &Ty) -> Scheme {
        let resolved = self.resolve(ty);
        let mut vars = Vec::new();
        collect_vars(&resolved, &mut vars);
        Scheme { vars, ty: resolved }
    }

    // ── Throws / async / return bookkeeping ─────────────────────────────

    pub fn push_throws_frame(&mut self) {
        self.throws.push(Vec::new());
    }

    pub fn pop_throws_frame(&mut self) -> Vec<Ty> {
        self.throws.pop().unwrap_or_default()
    }

    /// Schedule a type into the nearest enclosing throws accumulator.
    pub fn add_throws(&mut self, ty: Ty) {
        if let Some(frame) = self.throws.last_mut() {
            if !matches!(ty, Ty::Never) && !frame.contains(&ty) {
                frame.push(ty);
            }
        }
    }

    pub fn push_fn(&mut self, is_async: bool, ret: Ty) {
        self.async_fns.push(is_async);
        self.returns.push(ret);
        self.returns_seen.push(0);
        self.push_throws_frame();
    }

    pub fn pop_fn(&mut self) -> Vec<Ty> {
        self.async_fns.pop();
        self.returns.pop();
        self.returns_seen.pop();
        self.pop_throws_frame()
    }

    pub fn in_async_fn(&self) -> bool {
        self.async_fns.last().copied().unwrap_or(false)
    }

    pub fn current_return(&self) -> Option<Ty> {
        self.returns.last().cloned()
    }

    /// Note an explicit `return` statement in the enclosing function.
    pub fn mark_return(&mut self) {
        if let Some(count) = self.returns_seen.last_mut() {
            *count += 1;
        }
    }

    /// Whether the enclosing function contained explicit returns.
    pub fn fn_had_returns(&self) -> bool {
        self.returns_seen.last().copied().unwrap_or(0) > 0
    }
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace quantified variables according to a mapping. Only variable
/// occurrences are rewritten; everything else is structural recursion.
pub fn subst_vars(ty: &Ty, mapping: &FxHashMap<TyVar, Ty>) -> Ty {
    map_ty(ty, &mut |t| match t {
        Ty::Var(v) => mapping.get(v).cloned(),
        _ => None,
    })
}

/// Replace zero-argument references by name, used to instantiate named
/// type parameters (`T` inside a generic signature).
pub fn subst_named(ty: &Ty, mapping: &FxHashMap<String, Ty>) -> Ty {
    map_ty(ty, &mut |t| match t {
        Ty::Ref(r) if r.type_args.is_empty() => mapping.get(&r.name).cloned(),
        Ty::Infer(name) => mapping.get(name).cloned(),
        _ => None,
    })
}

/// Structure-preserving map over a type. `f` returning `Some` replaces the
/// node wholesale; `None` recurses into children.
pub fn map_ty(ty: &Ty, f: &mut dyn FnMut(&Ty) -> Option<Ty>) -> Ty {
    if let Some(replacement) = f(ty) {
        return replacement;
    }
    match ty {
        Ty::Ref(r) => Ty::Ref(TyRef {
            name: r.name.clone(),
            type_args: r.type_args.iter().map(|t| map_ty(t, f)).collect(),
            alias: None,
        }),
        Ty::Func(func) => Ty::Func(Box::new(map_func(func, f))),
        Ty::Object(obj) => Ty::Object(Box::new(TyObject {
            elems: obj
                .elems
                .iter()
                .map(|elem| match elem {
                    TyObjectElem::Callable(func) => TyObjectElem::Callable(map_func(func, f)),
                    TyObjectElem::Constructor(func) => {
                        TyObjectElem::Constructor(map_func(func, f))
                    }
                    TyObjectElem::Method { key, func } => TyObjectElem::Method {
                        key: key.clone(),
                        func: map_func(func, f),
                    },
                    TyObjectElem::Getter { key, ret } => TyObjectElem::Getter {
                        key: key.clone(),
                        ret: Box::new(map_ty(ret, f)),
                    },
                    TyObjectElem::Setter { key, param } => TyObjectElem::Setter {
                        key: key.clone(),
                        param: Box::new(map_ty(param, f)),
                    },
                    TyObjectElem::Property { key, optional, readonly, ty } => {
                        TyObjectElem::Property {
                            key: key.clone(),
                            optional: *optional,
                            readonly: *readonly,
                            ty: map_ty(ty, f),
                        }
                    }
                    TyObjectElem::Mapped(m) => TyObjectElem::Mapped(MappedTy {
                        type_param: m.type_param.clone(),
                        constraint: Box::new(map_ty(&m.constraint, f)),
                        name_remap: m.name_remap.as_ref().map(|t| Box::new(map_ty(t, f))),
                        value: Box::new(map_ty(&m.value, f)),
                        optional: m.optional,
                        readonly: m.readonly,
                    }),
                    TyObjectElem::RestSpread(t) => TyObjectElem::RestSpread(map_ty(t, f)),
                })
                .collect(),
            ..(**obj).clone()
        })),
        Ty::Tuple(elems) => Ty::Tuple(elems.iter().map(|t| map_ty(t, f)).collect()),
        Ty::RestSpread(inner) => Ty::RestSpread(Box::new(map_ty(inner, f))),
        // Substitution can place a union inside a union (`T | string` with
        // `T := number | boolean`); the smart constructor reflattens so
        // the result stays structurally equal to a directly-built union.
        Ty::Union(types) => Ty::union(types.iter().map(|t| map_ty(t, f)).collect()),
        Ty::Intersection(types) => {
            Ty::Intersection(types.iter().map(|t| map_ty(t, f)).collect())
        }
        Ty::KeyOf(t) => Ty::KeyOf(Box::new(map_ty(t, f))),
        Ty::Index { target, index } => Ty::Index {
            target: Box::new(map_ty(target, f)),
            index: Box::new(map_ty(index, f)),
        },
        Ty::Cond(cond) => Ty::Cond(Box::new(TyCond {
            check: map_ty(&cond.check, f),
            extends: map_ty(&cond.extends, f),
            then_ty: map_ty(&cond.then_ty, f),
            else_ty: map_ty(&cond.else_ty, f),
        })),
        Ty::Extract { extractor, args } => Ty::Extract {
            extractor: Box::new(map_ty(extractor, f)),
            args: args.iter().map(|t| map_ty(t, f)).collect(),
        },
        Ty::TemplateLit { quasis, types } => Ty::TemplateLit {
            quasis: quasis.clone(),
            types: types.iter().map(|t| map_ty(t, f)).collect(),
        },
        other => other.clone(),
    }
}

fn map_func(func: &TyFunc, f: &mut dyn FnMut(&Ty) -> Option<Ty>) -> TyFunc {
    TyFunc {
        type_params: func.type_params.clone(),
        self_ty: func.self_ty.as_ref().map(|t| Box::new(map_ty(t, f))),
        params: func
            .params
            .iter()
            .map(|p| TyFuncParam {
                name: p.name.clone(),
                ty: map_ty(&p.ty, f),
                optional: p.optional,
                has_default: p.has_default,
            })
            .collect(),
        ret: Box::new(map_ty(&func.ret, f)),
        throws: func.throws.as_ref().map(|t| Box::new(map_ty(t, f))),
    }
}

/// Collect unbound variables in order of first appearance.
fn collect_vars(ty: &Ty, out: &mut Vec<TyVar>) {
    match ty {
        Ty::Var(v) => {
            if !out.contains(v) {
                out.push(*v);
            }
        }
        _ => {
            // Reuse map_ty as a traversal; the closure never replaces.
            map_ty(ty, &mut |t| {
                if let Ty::Var(v) = t {
                    if !out.contains(v) {
                        out.push(*v);
                    }
                }
                None
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use escalier_types::Primitive;

    #[test]
    fn prune_is_idempotent() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_var(Span::synthetic());
        let b = ctx.fresh_var(Span::synthetic());
        if let (Ty::Var(va), Ty::Var(vb)) = (&a, &b) {
            ctx.union_vars(*va, *vb);
            ctx.bind_var(*vb, Ty::num());
        }
        let once = ctx.prune(&a);
        let twice = ctx.prune(&once);
        assert_eq!(once, twice);
        assert_eq!(once, Ty::num());
    }

    #[test]
    fn prune_normalizes_unbound_vars_to_root() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_var(Span::synthetic());
        let b = ctx.fresh_var(Span::synthetic());
        if let (Ty::Var(va), Ty::Var(vb)) = (&a, &b) {
            ctx.union_vars(*va, *vb);
        }
        assert_eq!(ctx.prune(&a), ctx.prune(&b));
    }

    #[test]
    fn occurs_finds_nested_occurrence() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_var(Span::synthetic());
        let Ty::Var(va) = a else { unreachable!() };
        let fun = Ty::func(vec![TyFuncParam::new("x", Ty::Var(va))], Ty::num());
        assert!(ctx.occurs_in(va, &fun));
        assert!(!ctx.occurs_in(va, &Ty::Prim(Primitive::Num)));
    }

    #[test]
    fn instantiate_produces_fresh_vars() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_var(Span::synthetic());
        let Ty::Var(va) = a else { unreachable!() };
        let scheme = Scheme {
            vars: vec![va],
            ty: Ty::func(vec![TyFuncParam::new("x", Ty::Var(va))], Ty::Var(va)),
        };
        let inst1 = ctx.instantiate(&scheme, Span::synthetic());
        let inst2 = ctx.instantiate(&scheme, Span::synthetic());
        assert_ne!(inst1, inst2, "instantiations must not share variables");
    }

    #[test]
    fn subst_named_replaces_bare_refs() {
        let mut mapping = FxHashMap::default();
        mapping.insert("T".to_string(), Ty::num());
        let ty = Ty::func(
            vec![TyFuncParam::new("x", Ty::reference("T", vec![]))],
            Ty::reference("T", vec![]),
        );
        let substituted = subst_named(&ty, &mapping);
        assert_eq!(
            substituted,
            Ty::func(vec![TyFuncParam::new("x", Ty::num())], Ty::num())
        );
    }

    #[test]
    fn subst_named_flattens_substituted_unions() {
        // `T | string` with `T := number | boolean` must come out flat,
        // not as a union nested inside a union.
        let mut mapping = FxHashMap::default();
        mapping.insert("T".to_string(), Ty::union(vec![Ty::num(), Ty::bool()]));
        let body = Ty::Union(vec![Ty::reference("T", vec![]), Ty::str()]);
        let substituted = subst_named(&body, &mapping);
        assert_eq!(
            substituted,
            Ty::Union(vec![Ty::num(), Ty::bool(), Ty::str()])
        );
    }

    #[test]
    fn rollback_undoes_bindings() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_var(Span::synthetic());
        let Ty::Var(va) = a else { unreachable!() };
        let snapshot = ctx.snapshot();
        ctx.bind_var(va, Ty::num());
        assert_eq!(ctx.prune(&Ty::Var(va)), Ty::num());
        ctx.rollback_to(snapshot);
        assert_eq!(ctx.prune(&Ty::Var(va)), Ty::Var(va));
    }
}

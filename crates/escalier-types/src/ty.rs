//! The type lattice.
//!
//! Types are created during inference, shared by value (cloning is cheap
//! relative to inference work), and immutable apart from the instance slot
//! of unification variables, which lives in the checker's union-find table
//! rather than in the type itself. Structural equality never looks at
//! resolved alias caches, so two references to the same alias compare equal
//! whether or not one has been expanded.

use std::fmt;

use escalier_common::Literal;

/// A unification variable, identified by a `u32` index into the checker's
/// union-find table. The `ena` crate handles the union-find mechanics;
/// a variable's `instance` is the table's probe value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TyVar(pub u32);

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}

/// The primitive types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Num,
    Str,
    BigInt,
    Symbol,
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Bool => "boolean",
            Primitive::Num => "number",
            Primitive::Str => "string",
            Primitive::BigInt => "bigint",
            Primitive::Symbol => "symbol",
        }
    }
}

/// A reference to a named type alias or interface.
///
/// `alias` caches the lazily-resolved body of the alias (or the interface's
/// object type). It is intentionally excluded from equality: a reference
/// compares by name and type arguments only, preserving nominal identity.
#[derive(Clone, Debug)]
pub struct TyRef {
    /// Dotted qualified name, e.g. `"Opt"` or `"foo.bar.Point"`.
    pub name: String,
    pub type_args: Vec<Ty>,
    pub alias: Option<Box<Ty>>,
}

impl TyRef {
    pub fn new(name: impl Into<String>, type_args: Vec<Ty>) -> Self {
        Self { name: name.into(), type_args, alias: None }
    }
}

impl PartialEq for TyRef {
    fn eq(&self, other: &Self) -> bool {
        // alias cache intentionally excluded
        self.name == other.name && self.type_args == other.type_args
    }
}

impl Eq for TyRef {}

/// A named type parameter on a function or scheme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TyTypeParam {
    pub name: String,
    pub constraint: Option<Box<Ty>>,
    pub default: Option<Box<Ty>>,
}

impl TyTypeParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), constraint: None, default: None }
    }
}

/// A parameter of a function type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TyFuncParam {
    pub name: String,
    pub ty: Ty,
    pub optional: bool,
    /// Whether the declaration supplied a default value for this parameter.
    pub has_default: bool,
}

impl TyFuncParam {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self { name: name.into(), ty, optional: false, has_default: false }
    }

    /// Whether a call may omit this argument.
    pub fn is_omittable(&self) -> bool {
        self.optional || self.has_default
    }
}

/// A function type: type parameters, parameters, return, and throws.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TyFunc {
    pub type_params: Vec<TyTypeParam>,
    /// The `self` type for methods; `None` for free functions.
    pub self_ty: Option<Box<Ty>>,
    pub params: Vec<TyFuncParam>,
    pub ret: Box<Ty>,
    pub throws: Option<Box<Ty>>,
}

impl TyFunc {
    pub fn new(params: Vec<TyFuncParam>, ret: Ty) -> Self {
        Self {
            type_params: Vec::new(),
            self_ty: None,
            params,
            ret: Box::new(ret),
            throws: None,
        }
    }
}

/// A property key on an object type.
#[derive(Clone, Debug)]
pub enum PropKey {
    Str(String),
    Num(f64),
    Sym(u32),
}

impl PropKey {
    pub fn str(s: impl Into<String>) -> Self {
        PropKey::Str(s.into())
    }
}

impl PartialEq for PropKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropKey::Str(a), PropKey::Str(b)) => a == b,
            (PropKey::Num(a), PropKey::Num(b)) => a.to_bits() == b.to_bits(),
            (PropKey::Sym(a), PropKey::Sym(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PropKey {}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropKey::Str(s) => write!(f, "{s}"),
            PropKey::Num(n) => write!(f, "{n}"),
            PropKey::Sym(id) => write!(f, "[symbol {id}]"),
        }
    }
}

/// Modifier applied by a mapped type to `optional` or `readonly`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MappedModifier {
    Add,
    Remove,
}

/// A mapped element: `[K in C as R]: V` with optional modifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappedTy {
    pub type_param: String,
    pub constraint: Box<Ty>,
    pub name_remap: Option<Box<Ty>>,
    pub value: Box<Ty>,
    pub optional: Option<MappedModifier>,
    pub readonly: Option<MappedModifier>,
}

/// An element of an object type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TyObjectElem {
    Callable(TyFunc),
    Constructor(TyFunc),
    Method { key: PropKey, func: TyFunc },
    Getter { key: PropKey, ret: Box<Ty> },
    Setter { key: PropKey, param: Box<Ty> },
    Property { key: PropKey, optional: bool, readonly: bool, ty: Ty },
    Mapped(MappedTy),
    RestSpread(Ty),
}

impl TyObjectElem {
    /// The property key, for elements that have one.
    pub fn key(&self) -> Option<&PropKey> {
        match self {
            TyObjectElem::Method { key, .. }
            | TyObjectElem::Getter { key, .. }
            | TyObjectElem::Setter { key, .. }
            | TyObjectElem::Property { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// An object type with structural and nominal facets.
///
/// `exact` is mutually exclusive with the interface facets
/// (`is_interface`, `extends`, `implements`); `immutable` and `mutable`
/// are mutually exclusive. Use [`TyObject::structural`] and the builder
/// methods to keep the invariants.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TyObject {
    pub elems: Vec<TyObjectElem>,
    pub exact: bool,
    pub immutable: bool,
    pub mutable: bool,
    pub nominal: bool,
    pub is_interface: bool,
    pub extends: Vec<TyRef>,
    pub implements: Vec<TyRef>,
}

impl TyObject {
    pub fn structural(elems: Vec<TyObjectElem>) -> Self {
        Self { elems, ..Default::default() }
    }

    pub fn interface(elems: Vec<TyObjectElem>, extends: Vec<TyRef>) -> Self {
        Self { elems, is_interface: true, extends, ..Default::default() }
    }

    pub fn with_exact(mut self) -> Self {
        debug_assert!(
            !self.is_interface && self.extends.is_empty() && self.implements.is_empty(),
            "exact objects cannot carry interface facets"
        );
        self.exact = true;
        self
    }

    pub fn with_immutable(mut self) -> Self {
        debug_assert!(!self.mutable, "immutable and mutable are exclusive");
        self.immutable = true;
        self
    }

    pub fn with_mutable(mut self) -> Self {
        debug_assert!(!self.immutable, "immutable and mutable are exclusive");
        self.mutable = true;
        self
    }

    /// Look up a property/method/getter type by string key.
    pub fn lookup(&self, key: &str) -> Option<Ty> {
        for elem in &self.elems {
            match elem {
                TyObjectElem::Property { key: PropKey::Str(k), ty, optional, .. } if k == key => {
                    return Some(if *optional {
                        Ty::union(vec![ty.clone(), Ty::undefined()])
                    } else {
                        ty.clone()
                    });
                }
                TyObjectElem::Method { key: PropKey::Str(k), func } if k == key => {
                    return Some(Ty::Func(Box::new(func.clone())));
                }
                TyObjectElem::Getter { key: PropKey::Str(k), ret } if k == key => {
                    return Some((**ret).clone());
                }
                _ => {}
            }
        }
        None
    }
}

/// A conditional type: `check extends extends_ty ? then_ty : else_ty`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TyCond {
    pub check: Ty,
    pub extends: Ty,
    pub then_ty: Ty,
    pub else_ty: Ty,
}

/// An Escalier semantic type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ty {
    /// An inference variable (resolved through the union-find table).
    Var(TyVar),
    /// A reference to a named alias or interface.
    Ref(TyRef),
    Prim(Primitive),
    /// A singleton literal type.
    Lit(Literal),
    UniqueSymbol(u32),
    Unknown,
    Never,
    GlobalThis,
    Func(Box<TyFunc>),
    Object(Box<TyObject>),
    Tuple(Vec<Ty>),
    /// A rest/spread element inside a tuple or parameter list.
    RestSpread(Box<Ty>),
    Union(Vec<Ty>),
    Intersection(Vec<Ty>),
    KeyOf(Box<Ty>),
    Index { target: Box<Ty>, index: Box<Ty> },
    Cond(Box<TyCond>),
    /// An `infer` capture inside a conditional's extends clause.
    Infer(String),
    Wildcard,
    /// An extractor application, e.g. `Opt.Some` applied to `[T]`.
    Extract { extractor: Box<Ty>, args: Vec<Ty> },
    TemplateLit { quasis: Vec<String>, types: Vec<Ty> },
    Intrinsic(String),
}

impl Ty {
    pub fn num() -> Ty {
        Ty::Prim(Primitive::Num)
    }

    pub fn str() -> Ty {
        Ty::Prim(Primitive::Str)
    }

    pub fn bool() -> Ty {
        Ty::Prim(Primitive::Bool)
    }

    pub fn bigint() -> Ty {
        Ty::Prim(Primitive::BigInt)
    }

    pub fn symbol() -> Ty {
        Ty::Prim(Primitive::Symbol)
    }

    pub fn undefined() -> Ty {
        Ty::Lit(Literal::Undefined)
    }

    pub fn null() -> Ty {
        Ty::Lit(Literal::Null)
    }

    pub fn lit_num(n: f64) -> Ty {
        Ty::Lit(Literal::Num(n))
    }

    pub fn lit_str(s: impl Into<String>) -> Ty {
        Ty::Lit(Literal::Str(s.into()))
    }

    pub fn func(params: Vec<TyFuncParam>, ret: Ty) -> Ty {
        Ty::Func(Box::new(TyFunc::new(params, ret)))
    }

    pub fn reference(name: impl Into<String>, type_args: Vec<Ty>) -> Ty {
        Ty::Ref(TyRef::new(name, type_args))
    }

    /// `Promise<T, E>` as used by `await` and async returns.
    pub fn promise(value: Ty, err: Ty) -> Ty {
        Ty::reference("Promise", vec![value, err])
    }

    /// Build a union, flattening nested unions and deduplicating members.
    /// A single surviving member collapses to that member; an empty union
    /// collapses to `Never`.
    pub fn union(types: Vec<Ty>) -> Ty {
        let mut members: Vec<Ty> = Vec::new();
        let mut push = |t: Ty, members: &mut Vec<Ty>| {
            if !members.contains(&t) {
                members.push(t);
            }
        };
        for t in types {
            match t {
                Ty::Union(inner) => {
                    for t in inner {
                        push(t, &mut members);
                    }
                }
                Ty::Never => {}
                other => push(other, &mut members),
            }
        }
        match members.len() {
            0 => Ty::Never,
            1 => members.pop().unwrap(),
            _ => Ty::Union(members),
        }
    }

    /// Whether the type is the `Unknown` top type.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Ty::Unknown)
    }
}

// ── Display ────────────────────────────────────────────────────────────

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Ty], sep: &str) -> fmt::Result {
    for (i, t) in types.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{t}")?;
    }
    Ok(())
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => write!(f, "t{}", v.0),
            Ty::Ref(r) => {
                write!(f, "{}", r.name)?;
                if !r.type_args.is_empty() {
                    write!(f, "<")?;
                    write_list(f, &r.type_args, ", ")?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            Ty::Prim(p) => write!(f, "{}", p.name()),
            Ty::Lit(l) => write!(f, "{l}"),
            Ty::UniqueSymbol(id) => write!(f, "unique symbol({id})"),
            Ty::Unknown => write!(f, "unknown"),
            Ty::Never => write!(f, "never"),
            Ty::GlobalThis => write!(f, "globalThis"),
            Ty::Func(func) => {
                if !func.type_params.is_empty() {
                    write!(f, "<")?;
                    for (i, tp) in func.type_params.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", tp.name)?;
                    }
                    write!(f, ">")?;
                }
                write!(f, "(")?;
                for (i, p) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p.name)?;
                    if p.optional {
                        write!(f, "?")?;
                    }
                    write!(f, ": {}", p.ty)?;
                }
                write!(f, ") -> {}", func.ret)?;
                if let Some(throws) = &func.throws {
                    write!(f, " throws {throws}")?;
                }
                Ok(())
            }
            Ty::Object(obj) => {
                write!(f, "{{")?;
                for (i, elem) in obj.elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match elem {
                        TyObjectElem::Property { key, optional, readonly, ty } => {
                            if *readonly {
                                write!(f, "readonly ")?;
                            }
                            write!(f, "{key}")?;
                            if *optional {
                                write!(f, "?")?;
                            }
                            write!(f, ": {ty}")?;
                        }
                        TyObjectElem::Method { key, func } => {
                            write!(f, "{key}{}", Ty::Func(Box::new(func.clone())))?;
                        }
                        TyObjectElem::Getter { key, ret } => write!(f, "get {key}(): {ret}")?,
                        TyObjectElem::Setter { key, param } => {
                            write!(f, "set {key}(value: {param})")?;
                        }
                        TyObjectElem::Callable(func) => {
                            write!(f, "{}", Ty::Func(Box::new(func.clone())))?;
                        }
                        TyObjectElem::Constructor(func) => {
                            write!(f, "new {}", Ty::Func(Box::new(func.clone())))?;
                        }
                        TyObjectElem::Mapped(m) => {
                            write!(f, "[{} in {}]: {}", m.type_param, m.constraint, m.value)?;
                        }
                        TyObjectElem::RestSpread(ty) => write!(f, "...{ty}")?,
                    }
                }
                write!(f, "}}")
            }
            Ty::Tuple(elems) => {
                write!(f, "[")?;
                write_list(f, elems, ", ")?;
                write!(f, "]")
            }
            Ty::RestSpread(inner) => write!(f, "...{inner}"),
            Ty::Union(types) => write_list(f, types, " | "),
            Ty::Intersection(types) => write_list(f, types, " & "),
            Ty::KeyOf(t) => write!(f, "keyof {t}"),
            Ty::Index { target, index } => write!(f, "{target}[{index}]"),
            Ty::Cond(cond) => write!(
                f,
                "{} extends {} ? {} : {}",
                cond.check, cond.extends, cond.then_ty, cond.else_ty
            ),
            Ty::Infer(name) => write!(f, "infer {name}"),
            Ty::Wildcard => write!(f, "_"),
            Ty::Extract { extractor, args } => {
                write!(f, "{extractor}(")?;
                write_list(f, args, ", ")?;
                write!(f, ")")
            }
            Ty::TemplateLit { quasis, types } => {
                write!(f, "`")?;
                for (i, quasi) in quasis.iter().enumerate() {
                    write!(f, "{quasi}")?;
                    if let Some(t) = types.get(i) {
                        write!(f, "${{{t}}}")?;
                    }
                }
                write!(f, "`")
            }
            Ty::Intrinsic(name) => write!(f, "intrinsic {name}"),
        }
    }
}

/// A polymorphic type scheme: a type with universally quantified inference
/// variables. Generic declarations abstract their variables at the binding
/// boundary; every reference instantiates them fresh.
#[derive(Clone, Debug)]
pub struct Scheme {
    pub vars: Vec<TyVar>,
    pub ty: Ty,
}

impl Scheme {
    /// A monomorphic scheme (no quantified variables).
    pub fn mono(ty: Ty) -> Self {
        Scheme { vars: Vec::new(), ty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_equality_ignores_alias_cache() {
        let plain = TyRef::new("Point", vec![]);
        let resolved = TyRef {
            name: "Point".into(),
            type_args: vec![],
            alias: Some(Box::new(Ty::Object(Box::new(TyObject::structural(vec![]))))),
        };
        assert_eq!(plain, resolved);
    }

    #[test]
    fn union_flattens_and_dedups() {
        let u = Ty::union(vec![
            Ty::num(),
            Ty::union(vec![Ty::str(), Ty::num()]),
            Ty::str(),
        ]);
        assert_eq!(u, Ty::Union(vec![Ty::num(), Ty::str()]));
    }

    #[test]
    fn union_collapses_singleton_and_never() {
        assert_eq!(Ty::union(vec![Ty::num(), Ty::Never]), Ty::num());
        assert_eq!(Ty::union(vec![]), Ty::Never);
    }

    #[test]
    fn object_lookup_wraps_optional_in_undefined() {
        let obj = TyObject::structural(vec![
            TyObjectElem::Property {
                key: PropKey::str("x"),
                optional: false,
                readonly: false,
                ty: Ty::num(),
            },
            TyObjectElem::Property {
                key: PropKey::str("y"),
                optional: true,
                readonly: false,
                ty: Ty::str(),
            },
        ]);
        assert_eq!(obj.lookup("x"), Some(Ty::num()));
        assert_eq!(
            obj.lookup("y"),
            Some(Ty::Union(vec![Ty::str(), Ty::undefined()]))
        );
        assert_eq!(obj.lookup("z"), None);
    }

    #[test]
    fn display_forms() {
        assert_eq!(Ty::num().to_string(), "number");
        assert_eq!(Ty::lit_num(5.0).to_string(), "5");
        assert_eq!(
            Ty::union(vec![Ty::num(), Ty::undefined()]).to_string(),
            "number | undefined"
        );
        assert_eq!(
            Ty::func(vec![TyFuncParam::new("n", Ty::num())], Ty::bool()).to_string(),
            "(n: number) -> boolean"
        );
        assert_eq!(
            Ty::reference("Opt", vec![Ty::num()]).to_string(),
            "Opt<number>"
        );
        assert_eq!(Ty::Tuple(vec![Ty::num(), Ty::str()]).to_string(), "[number, string]");
    }
}

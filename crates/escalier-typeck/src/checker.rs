//! The declaration checker: drives inference over a module in dependency
//! order, namespace by namespace.
//!
//! For each namespace it collects placeholder bindings for every
//! declaration, orders declarations by the SCCs of the reference graph,
//! infers each component with its placeholders visible (enabling mutual
//! recursion), unifies placeholders with the inferred results at
//! component completion, and finally deep-resolves every inferred-type
//! slot in the AST. Errors are recorded throughout; checking never stops
//! at a recoverable error.

use escalier_ast::visitor::{walk_decl, Visitor};
use escalier_ast::{
    ClassMember, Decl, DeclKind, EnumMember, Expr, File, ImportStmt, Module, Namespace, ObjKey,
    Pattern, TypeAnn,
};
use escalier_common::{SourceId, Span};
use escalier_types::{PropKey, Ty, TyFunc, TyFuncParam, TyObject, TyObjectElem, TyRef};
use rustc_hash::FxHashMap;

use crate::ctx::{AliasDef, ClassDef, EnumDef, InferCtx};
use crate::error::{ConstraintOrigin, TypeError};
use crate::graph::DepGraph;
use crate::infer::{infer_func, infer_var_decl};
use crate::lower::{lower_func_sig, lower_obj_elem, lower_type_ann};
use crate::scope::{Scope, TypeBinding, ValueBinding};

/// The outcome of checking a module.
pub struct TypeckResult {
    pub errors: Vec<TypeError>,
    pub warnings: Vec<TypeError>,
    /// Fully resolved top-level value bindings, by qualified name, in
    /// declaration order.
    pub bindings: Vec<(String, Ty)>,
}

impl TypeckResult {
    /// Look up a binding's resolved type by qualified name.
    pub fn binding(&self, name: &str) -> Option<&Ty> {
        self.bindings.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
    }
}

fn qualify(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

/// Check every namespace of a module.
pub fn check_module(module: &Module) -> TypeckResult {
    let mut ctx = InferCtx::new();
    let mut scope = Scope::new();

    let imports_by_source: FxHashMap<SourceId, &File> =
        module.files.iter().map(|f| (f.source, f)).collect();

    // Pass 1: placeholders and type registrations for every namespace, so
    // cross-namespace references resolve during inference.
    let mut placeholders: Vec<FxHashMap<String, Ty>> = Vec::new();
    for namespace in &module.namespaces {
        placeholders.push(register_namespace(&mut ctx, &mut scope, namespace));
    }
    build_namespace_objects(&mut scope, module, &placeholders);

    // Pass 2: infer each namespace in appearance order.
    for (ns_idx, namespace) in module.namespaces.iter().enumerate() {
        check_namespace(
            &mut ctx,
            &mut scope,
            namespace,
            &placeholders[ns_idx],
            &imports_by_source,
        );
    }

    // Pass 3: deep-resolve every inferred-type slot.
    let mut finalizer = Finalizer { ctx: &mut ctx };
    for namespace in &module.namespaces {
        for decl in &namespace.decls {
            walk_decl(&mut finalizer, decl);
        }
    }

    let mut bindings = Vec::new();
    for namespace in &module.namespaces {
        for decl in &namespace.decls {
            if !decl.declares_value() {
                continue;
            }
            for name in decl.names() {
                let qualified = qualify(&namespace.path, &name);
                if let Some(binding) = scope.lookup_value(&qualified) {
                    let ty = binding.scheme.ty.clone();
                    bindings.push((qualified, ctx.resolve(&ty)));
                }
            }
        }
    }

    TypeckResult {
        errors: std::mem::take(&mut ctx.errors),
        warnings: std::mem::take(&mut ctx.warnings),
        bindings,
    }
}

/// Collect placeholder bindings for a namespace's declarations into the
/// global scope under their qualified names. Returns the placeholder map
/// keyed by local name.
fn register_namespace(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    namespace: &Namespace,
) -> FxHashMap<String, Ty> {
    let mut value_placeholders: FxHashMap<String, Ty> = FxHashMap::default();
    let mut type_names: Vec<String> = Vec::new();

    for decl in &namespace.decls {
        if decl.declares_type() {
            let name = decl.name().expect("type declarations are named");
            if type_names.contains(&name.name) {
                ctx.record(TypeError::DuplicateBinding {
                    name: name.name.clone(),
                    span: name.span,
                });
            } else {
                type_names.push(name.name.clone());
                let qualified = qualify(&namespace.path, &name.name);
                scope.insert_type(&qualified, TypeBinding::Named(qualified.clone()));
            }
        }
        if decl.declares_value() {
            for name in decl.names() {
                if value_placeholders.contains_key(&name) {
                    ctx.record(TypeError::DuplicateBinding {
                        name: name.clone(),
                        span: decl.span,
                    });
                    continue;
                }
                let placeholder = ctx.fresh_var(decl.span);
                let qualified = qualify(&namespace.path, &name);
                scope.insert_value(
                    &qualified,
                    ValueBinding::mono(placeholder.clone(), decl.span),
                );
                value_placeholders.insert(name, placeholder);
            }
        }
    }

    value_placeholders
}

/// Publish namespace value objects into the global scope so that dotted
/// references (`geom.shapes.area`) resolve as ordinary member accesses.
fn build_namespace_objects(
    scope: &mut Scope,
    module: &Module,
    placeholders: &[FxHashMap<String, Ty>],
) {
    // path segments -> properties, deepest namespaces first so parents
    // can embed their children. Ancestor paths that exist only as
    // prefixes (a namespace `a.b` with no declarations directly in `a`)
    // still get an object so dotted access resolves.
    let mut trees: FxHashMap<String, Vec<(String, Ty)>> = FxHashMap::default();
    let mut paths: Vec<String> = Vec::new();
    for (idx, namespace) in module.namespaces.iter().enumerate() {
        if namespace.path.is_empty() {
            continue;
        }
        let mut prefix = String::new();
        for segment in namespace.path.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            if !paths.contains(&prefix) {
                paths.push(prefix.clone());
                trees.insert(prefix.clone(), Vec::new());
            }
        }
        let mut props: Vec<(String, Ty)> = Vec::new();
        for decl in &namespace.decls {
            for name in decl.names() {
                if let Some(placeholder) = placeholders[idx].get(&name) {
                    props.push((name, placeholder.clone()));
                }
            }
        }
        trees
            .get_mut(&namespace.path)
            .expect("prefix loop inserted every namespace path")
            .extend(props);
    }

    paths.sort_by_key(|p| std::cmp::Reverse(p.matches('.').count()));
    for path in &paths {
        let props = trees.remove(path).unwrap_or_default();
        let object = Ty::Object(Box::new(TyObject::structural(
            props
                .into_iter()
                .map(|(name, ty)| TyObjectElem::Property {
                    key: PropKey::str(name),
                    optional: false,
                    readonly: false,
                    ty,
                })
                .collect(),
        )));
        match path.rsplit_once('.') {
            Some((parent, leaf)) => {
                trees
                    .entry(parent.to_string())
                    .or_default()
                    .push((leaf.to_string(), object));
            }
            None => {
                scope.insert_value(path, ValueBinding::mono(object, Span::synthetic()));
            }
        }
    }
}

fn check_namespace(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    namespace: &Namespace,
    placeholders: &FxHashMap<String, Ty>,
    imports_by_source: &FxHashMap<SourceId, &File>,
) {
    scope.push();

    // Local names alias their qualified registrations.
    for decl in &namespace.decls {
        if decl.declares_type() {
            if let Some(name) = decl.name() {
                let qualified = qualify(&namespace.path, &name.name);
                scope.insert_type(&name.name, TypeBinding::Named(qualified));
            }
        }
        for name in decl.names() {
            if let Some(placeholder) = placeholders.get(&name) {
                scope.insert_value(&name, ValueBinding::mono(placeholder.clone(), decl.span));
            }
        }
    }

    let graph = DepGraph::build(namespace);
    for component in graph.sccs() {
        for &decl_idx in &component {
            let decl = &namespace.decls[decl_idx];
            scope.push();
            if let Some(file) = imports_by_source.get(&decl.span.source) {
                bind_import_stubs(scope, &file.imports);
            }
            let results = infer_ns_decl(ctx, scope, namespace, decl);
            scope.pop();

            for (name, ty) in results {
                if let Some(placeholder) = placeholders.get(&name) {
                    let origin = ConstraintOrigin::Declaration { span: decl.span };
                    let _ = ctx.unify(placeholder, &ty, &origin);
                }
            }
        }
        // Placeholders become generalized schemes once the component has
        // been fully inferred.
        for &decl_idx in &component {
            let decl = &namespace.decls[decl_idx];
            for name in decl.names() {
                if let Some(placeholder) = placeholders.get(&name) {
                    let scheme = ctx.generalize(placeholder);
                    let qualified = qualify(&namespace.path, &name);
                    let binding = ValueBinding { scheme, span: decl.span };
                    scope.update_value(&name, binding.clone());
                    scope.update_value(&qualified, binding);
                }
            }
        }
    }

    scope.pop();
}

/// Imports are file-scoped; their targets live in other packages, so each
/// specifier binds an opaque stub that unifies with anything.
fn bind_import_stubs(scope: &mut Scope, imports: &[ImportStmt]) {
    for import in imports {
        for specifier in &import.specifiers {
            let name = specifier.local_name().to_string();
            scope.insert_value(&name, ValueBinding::mono(Ty::Unknown, import.span));
            scope.insert_type(&name, TypeBinding::Param(Ty::Unknown));
        }
    }
}

/// Infer one namespace-level declaration, returning the value bindings it
/// produces (empty for pure type declarations).
fn infer_ns_decl(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    namespace: &Namespace,
    decl: &Decl,
) -> Vec<(String, Ty)> {
    match &decl.kind {
        DeclKind::Var { kind, pattern, type_ann, init } => {
            scope.push();
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
            let names = escalier_ast::find_bindings(pattern);
            let results = names
                .into_iter()
                .filter_map(|name| {
                    scope
                        .lookup_value(&name)
                        .map(|b| (name.clone(), b.scheme.ty.clone()))
                })
                .collect();
            scope.pop();
            results
        }

        DeclKind::Func { name, sig, body } => {
            let func = if decl.declare {
                if body.is_some() {
                    ctx.record(TypeError::IllegalDeclare {
                        name: name.name.clone(),
                        span: decl.span,
                    });
                }
                lower_func_sig(ctx, scope, sig, decl.span)
            } else {
                infer_func(ctx, scope, sig, body.as_ref(), decl.span)
            };
            vec![(name.name.clone(), Ty::Func(Box::new(func)))]
        }

        DeclKind::TypeAlias { name, type_params, type_ann } => {
            let qualified = qualify(&namespace.path, &name.name);
            scope.push();
            for tp in type_params {
                scope.insert_type(
                    &tp.name,
                    TypeBinding::Param(Ty::reference(tp.name.clone(), vec![])),
                );
            }
            let previous = ctx.current_alias.replace(qualified.clone());
            let body = lower_type_ann(ctx, scope, type_ann);
            ctx.current_alias = previous;
            scope.pop();
            ctx.aliases.insert(
                qualified,
                AliasDef {
                    type_params: type_params.iter().map(|tp| tp.name.clone()).collect(),
                    ty: body,
                },
            );
            Vec::new()
        }

        DeclKind::Interface { name, type_params, extends, body } => {
            let qualified = qualify(&namespace.path, &name.name);
            scope.push();
            for tp in type_params {
                scope.insert_type(
                    &tp.name,
                    TypeBinding::Param(Ty::reference(tp.name.clone(), vec![])),
                );
            }
            let extends_refs: Vec<TyRef> = extends
                .iter()
                .filter_map(|(qi, args)| {
                    let target = qi.to_string();
                    let args: Vec<Ty> =
                        args.iter().map(|a| lower_type_ann(ctx, scope, a)).collect();
                    match scope.lookup_type(&target) {
                        Some(TypeBinding::Named(key)) => Some(TyRef::new(key.clone(), args)),
                        _ => {
                            ctx.record(TypeError::UnknownType {
                                name: target,
                                span: qi.span(),
                            });
                            None
                        }
                    }
                })
                .collect();
            let elems: Vec<TyObjectElem> = body
                .iter()
                .filter_map(|elem| lower_obj_elem(ctx, scope, elem))
                .collect();
            scope.pop();
            let object = TyObject::interface(elems, extends_refs);
            ctx.aliases.insert(
                qualified,
                AliasDef {
                    type_params: type_params.iter().map(|tp| tp.name.clone()).collect(),
                    ty: Ty::Object(Box::new(object)),
                },
            );
            Vec::new()
        }

        DeclKind::Enum { name, type_params, members } => {
            infer_enum_decl(ctx, scope, namespace, name, type_params, members)
        }

        DeclKind::Class { name, type_params, extends, ctor_params, body } => {
            infer_class_decl(ctx, scope, namespace, decl, name, type_params, extends, ctor_params, body)
        }

        // Namespace declarations are flattened during assembly.
        DeclKind::Namespace { .. } => Vec::new(),
    }
}

fn infer_enum_decl(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    namespace: &Namespace,
    name: &escalier_ast::Ident,
    type_params: &[escalier_ast::TypeParam],
    members: &[EnumMember],
) -> Vec<(String, Ty)> {
    let qualified = qualify(&namespace.path, &name.name);
    scope.push();
    for tp in type_params {
        scope.insert_type(
            &tp.name,
            TypeBinding::Param(Ty::reference(tp.name.clone(), vec![])),
        );
    }

    let mut variants: Vec<(String, Vec<Ty>)> = Vec::new();
    for member in members {
        match member {
            EnumMember::Variant { name, types, .. } => {
                let payload = types.iter().map(|t| lower_type_ann(ctx, scope, t)).collect();
                variants.push((name.name.clone(), payload));
            }
            EnumMember::Spread { type_ann, .. } => {
                // Splice another enum's variants into this one.
                let spread = lower_type_ann(ctx, scope, type_ann);
                match &spread {
                    Ty::Ref(r) => match ctx.enums.get(&r.name) {
                        Some(def) => variants.extend(def.variants.iter().cloned()),
                        None => ctx.record(TypeError::UnknownType {
                            name: r.name.clone(),
                            span: type_ann.span,
                        }),
                    },
                    _ => ctx.record(TypeError::InvalidPattern {
                        reason: "enum spread must reference another enum".into(),
                        span: type_ann.span,
                    }),
                }
            }
        }
    }
    scope.pop();

    let def = EnumDef {
        name: qualified.clone(),
        type_params: type_params.iter().map(|tp| tp.name.clone()).collect(),
        variants: variants.clone(),
    };
    ctx.register_enum(def.clone());

    // The enum's value is an object of variant constructors; member
    // access instantiates the generic parameters per use.
    let param_refs: Vec<Ty> = def
        .type_params
        .iter()
        .map(|tp| Ty::reference(tp.clone(), vec![]))
        .collect();
    let enum_ref = Ty::reference(qualified, param_refs);
    let elems = variants
        .into_iter()
        .map(|(vname, payload)| {
            if payload.is_empty() {
                TyObjectElem::Property {
                    key: PropKey::str(vname),
                    optional: false,
                    readonly: false,
                    ty: enum_ref.clone(),
                }
            } else {
                let mut func = TyFunc::new(
                    payload
                        .into_iter()
                        .enumerate()
                        .map(|(i, ty)| TyFuncParam::new(format!("arg{i}"), ty))
                        .collect(),
                    enum_ref.clone(),
                );
                func.type_params = def
                    .type_params
                    .iter()
                    .map(|tp| escalier_types::TyTypeParam::new(tp.clone()))
                    .collect();
                TyObjectElem::Method { key: PropKey::str(vname), func }
            }
        })
        .collect();
    let value = Ty::Object(Box::new(TyObject::structural(elems)));
    vec![(name.name.clone(), value)]
}

#[allow(clippy::too_many_arguments)]
fn infer_class_decl(
    ctx: &mut InferCtx,
    scope: &mut Scope,
    namespace: &Namespace,
    decl: &Decl,
    name: &escalier_ast::Ident,
    type_params: &[escalier_ast::TypeParam],
    extends: &Option<(escalier_ast::QualIdent, Vec<TypeAnn>)>,
    ctor_params: &[escalier_ast::Param],
    body: &[ClassMember],
) -> Vec<(String, Ty)> {
    let qualified = qualify(&namespace.path, &name.name);
    scope.push();
    for tp in type_params {
        scope.insert_type(
            &tp.name,
            TypeBinding::Param(Ty::reference(tp.name.clone(), vec![])),
        );
    }

    let extends_ref = extends.as_ref().and_then(|(qi, args)| {
        let target = qi.to_string();
        let args: Vec<Ty> = args.iter().map(|a| lower_type_ann(ctx, scope, a)).collect();
        match scope.lookup_type(&target) {
            Some(TypeBinding::Named(key)) => Some(TyRef::new(key.clone(), args)),
            _ => {
                ctx.record(TypeError::UnknownType { name: target, span: qi.span() });
                None
            }
        }
    });

    // Constructor parameters with identifier patterns double as fields.
    let mut elems: Vec<TyObjectElem> = Vec::new();
    let mut ctor_param_tys: Vec<TyFuncParam> = Vec::new();
    for param in ctor_params {
        let ty = match &param.type_ann {
            Some(ann) => lower_type_ann(ctx, scope, ann),
            None => ctx.fresh_var(param.pattern.span),
        };
        let pname = crate::lower::param_name(&param.pattern);
        if pname != "_" {
            elems.push(TyObjectElem::Property {
                key: PropKey::str(pname.clone()),
                optional: param.optional,
                readonly: false,
                ty: ty.clone(),
            });
        }
        ctor_param_tys.push(TyFuncParam {
            name: pname,
            ty,
            optional: param.optional,
            has_default: false,
        });
    }

    let param_refs: Vec<Ty> = type_params
        .iter()
        .map(|tp| Ty::reference(tp.name.clone(), vec![]))
        .collect();
    let instance_ref = Ty::reference(qualified.clone(), param_refs);

    for member in body {
        let Some(key) = obj_key_to_prop(member_key(member)) else { continue };
        match member {
            ClassMember::Method { sig, body: method_body, is_static, .. } => {
                if *is_static {
                    continue;
                }
                scope.push();
                scope.insert_value(
                    "self",
                    ValueBinding::mono(instance_ref.clone(), decl.span),
                );
                let mut func = if decl.declare || method_body.is_none() {
                    lower_func_sig(ctx, scope, sig, decl.span)
                } else {
                    infer_func(ctx, scope, sig, method_body.as_ref(), decl.span)
                };
                scope.pop();
                func.self_ty = Some(Box::new(instance_ref.clone()));
                elems.push(TyObjectElem::Method { key, func });
            }
            ClassMember::Property { optional, readonly, type_ann, init, .. } => {
                let ty = match type_ann {
                    Some(ann) => lower_type_ann(ctx, scope, ann),
                    None => match init {
                        Some(init) => {
                            let init_ty = crate::infer::infer_expr(ctx, scope, init);
                            ctx.widen(&init_ty)
                        }
                        None => ctx.fresh_var(decl.span),
                    },
                };
                if let (Some(ann), Some(init)) = (type_ann, init) {
                    let origin = ConstraintOrigin::Annotation { span: ann.span };
                    crate::infer::check_expr(ctx, scope, init, &ty, &origin);
                }
                elems.push(TyObjectElem::Property {
                    key,
                    optional: *optional,
                    readonly: *readonly,
                    ty,
                });
            }
            ClassMember::Getter { ret, body: getter_body, is_static, .. } => {
                if *is_static {
                    continue;
                }
                let ret_ty = match ret {
                    Some(ann) => lower_type_ann(ctx, scope, ann),
                    None => match getter_body {
                        Some(body) => {
                            scope.push();
                            scope.insert_value(
                                "self",
                                ValueBinding::mono(instance_ref.clone(), decl.span),
                            );
                            let ty = crate::infer::infer_block(ctx, scope, body);
                            scope.pop();
                            ty
                        }
                        None => ctx.fresh_var(decl.span),
                    },
                };
                elems.push(TyObjectElem::Getter { key, ret: Box::new(ret_ty) });
            }
            ClassMember::Setter { param, .. } => {
                let param_ty = match &param.type_ann {
                    Some(ann) => lower_type_ann(ctx, scope, ann),
                    None => ctx.fresh_var(decl.span),
                };
                elems.push(TyObjectElem::Setter { key, param: Box::new(param_ty) });
            }
        }
    }
    scope.pop();

    let mut instance = TyObject::structural(elems);
    instance.nominal = true;
    if let Some(parent) = extends_ref {
        instance.extends = vec![parent];
    }
    let instance_ty = Ty::Object(Box::new(instance));

    let tp_names: Vec<String> = type_params.iter().map(|tp| tp.name.clone()).collect();
    ctx.classes.insert(
        qualified.clone(),
        ClassDef {
            name: qualified.clone(),
            type_params: tp_names.clone(),
            instance: instance_ty.clone(),
        },
    );
    // The class name is also usable as a type: instances are nominal
    // references resolved through the alias table.
    ctx.aliases.insert(
        qualified,
        AliasDef { type_params: tp_names.clone(), ty: instance_ty },
    );

    // The class's value is its constructor.
    let mut ctor = TyFunc::new(ctor_param_tys, instance_ref);
    ctor.type_params = tp_names
        .into_iter()
        .map(escalier_types::TyTypeParam::new)
        .collect();
    vec![(name.name.clone(), Ty::Func(Box::new(ctor)))]
}

fn member_key(member: &ClassMember) -> &ObjKey {
    match member {
        ClassMember::Method { key, .. }
        | ClassMember::Property { key, .. }
        | ClassMember::Getter { key, .. }
        | ClassMember::Setter { key, .. } => key,
    }
}

fn obj_key_to_prop(key: &ObjKey) -> Option<PropKey> {
    match key {
        ObjKey::Ident(id) => Some(PropKey::str(id.name.clone())),
        ObjKey::Str(s, _) => Some(PropKey::str(s.clone())),
        ObjKey::Num(n, _) => Some(PropKey::Num(*n)),
        ObjKey::Computed(_) => None,
    }
}

/// Deep-resolves every filled inferred-type slot after checking.
struct Finalizer<'a> {
    ctx: &'a mut InferCtx,
}

impl Visitor for Finalizer<'_> {
    fn exit_expr(&mut self, expr: &Expr) {
        if let Some(ty) = expr.inferred.get() {
            expr.inferred.set(self.ctx.resolve(&ty));
        }
    }

    fn exit_pattern(&mut self, pattern: &Pattern) {
        if let Some(ty) = pattern.inferred.get() {
            pattern.inferred.set(self.ctx.resolve(&ty));
        }
    }

    fn exit_type_ann(&mut self, type_ann: &TypeAnn) {
        if let Some(ty) = type_ann.inferred.get() {
            type_ann.inferred.set(self.ctx.resolve(&ty));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualify_joins_with_dots() {
        assert_eq!(qualify("", "x"), "x");
        assert_eq!(qualify("geom", "x"), "geom.x");
        assert_eq!(qualify("geom.shapes", "area"), "geom.shapes.area");
    }
}

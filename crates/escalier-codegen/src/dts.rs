//! The TypeScript declaration printer.
//!
//! Renders each declaration's checked type as `.d.ts` syntax. Value
//! declarations read their types from the checker's binding table; type
//! declarations read the finalized inferred slots on their annotation
//! nodes.

use escalier_ast::{
    Decl, DeclKind, EnumMember, FuncSig, Namespace, ObjAnnElem, ObjKey, PatternKind, TypeParam,
};
use escalier_common::Literal;
use escalier_typeck::TypeckResult;
use escalier_types::{PropKey, Ty, TyFunc, TyObjectElem};

/// Render a namespace's declarations as a `.d.ts` string.
pub fn print_namespace(namespace: &Namespace, typeck: &TypeckResult) -> String {
    let mut out = String::new();
    for decl in &namespace.decls {
        print_decl(&mut out, namespace, decl, typeck);
    }
    out
}

fn qualify(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn print_decl(out: &mut String, namespace: &Namespace, decl: &Decl, typeck: &TypeckResult) {
    let export = if decl.export { "export " } else { "" };
    match &decl.kind {
        DeclKind::Var { pattern, .. } => {
            for name in escalier_ast::find_bindings(pattern) {
                let qualified = qualify(&namespace.path, &name);
                let ty = typeck.binding(&qualified).cloned().unwrap_or(Ty::Unknown);
                out.push_str(&format!("{export}declare const {name}: {};\n", ts_type(&ty)));
            }
        }
        DeclKind::Func { name, sig, .. } => {
            let qualified = qualify(&namespace.path, &name.name);
            match typeck.binding(&qualified) {
                Some(Ty::Func(func)) => {
                    out.push_str(&format!(
                        "{export}declare function {}{};\n",
                        name.name,
                        ts_signature(func)
                    ));
                }
                _ => {
                    out.push_str(&format!(
                        "{export}declare function {}(...args: unknown[]): unknown;\n",
                        name.name
                    ));
                }
            }
        }
        DeclKind::TypeAlias { name, type_params, type_ann } => {
            let body = type_ann
                .inferred
                .get()
                .map(|ty| ts_type(&ty))
                .unwrap_or_else(|| "unknown".to_string());
            out.push_str(&format!(
                "{export}type {}{} = {body};\n",
                name.name,
                ts_type_params(type_params)
            ));
        }
        DeclKind::Interface { name, type_params, extends, body } => {
            out.push_str(&format!(
                "{export}interface {}{}",
                name.name,
                ts_type_params(type_params)
            ));
            if !extends.is_empty() {
                let parents: Vec<String> =
                    extends.iter().map(|(qi, _)| qi.to_string()).collect();
                out.push_str(&format!(" extends {}", parents.join(", ")));
            }
            out.push_str(" {\n");
            for elem in body {
                print_interface_member(out, elem);
            }
            out.push_str("}\n");
        }
        DeclKind::Enum { name, type_params, members } => {
            // Variants become a discriminated union plus a constructor
            // object.
            let params = ts_type_params(type_params);
            let mut variants = Vec::new();
            for member in members {
                if let EnumMember::Variant { name: vname, types, .. } = member {
                    let values: Vec<String> = types
                        .iter()
                        .map(|t| {
                            t.inferred
                                .get()
                                .map(|ty| ts_type(&ty))
                                .unwrap_or_else(|| "unknown".to_string())
                        })
                        .collect();
                    variants.push(format!(
                        "{{ tag: \"{}\"; values: [{}] }}",
                        vname.name,
                        values.join(", ")
                    ));
                }
            }
            let union = if variants.is_empty() {
                "never".to_string()
            } else {
                variants.join(" | ")
            };
            out.push_str(&format!("{export}type {}{params} = {union};\n", name.name));
        }
        DeclKind::Class { name, type_params, ctor_params, .. } => {
            out.push_str(&format!(
                "{export}declare class {}{} {{\n",
                name.name,
                ts_type_params(type_params)
            ));
            for param in ctor_params {
                if let PatternKind::Ident { name: pname, .. } = &param.pattern.kind {
                    let ty = param
                        .type_ann
                        .as_ref()
                        .and_then(|ann| ann.inferred.get())
                        .map(|ty| ts_type(&ty))
                        .unwrap_or_else(|| "unknown".to_string());
                    out.push_str(&format!("    {}: {ty};\n", pname.name));
                }
            }
            out.push_str("}\n");
        }
        DeclKind::Namespace { .. } => {}
    }
}

fn print_interface_member(out: &mut String, elem: &ObjAnnElem) {
    match elem {
        ObjAnnElem::Property { key, optional, readonly, type_ann } => {
            let ty = type_ann
                .inferred
                .get()
                .map(|ty| ts_type(&ty))
                .unwrap_or_else(|| "unknown".to_string());
            out.push_str(&format!(
                "    {}{}{}: {ty};\n",
                if *readonly { "readonly " } else { "" },
                key_text(key),
                if *optional { "?" } else { "" },
            ));
        }
        ObjAnnElem::Method { key, sig, optional } => {
            out.push_str(&format!(
                "    {}{}{};\n",
                key_text(key),
                if *optional { "?" } else { "" },
                ts_sig_from_anns(sig),
            ));
        }
        ObjAnnElem::Callable(sig) => {
            out.push_str(&format!("    {};\n", ts_sig_from_anns(sig)));
        }
        ObjAnnElem::Constructor(sig) => {
            out.push_str(&format!("    new {};\n", ts_sig_from_anns(sig)));
        }
        ObjAnnElem::Getter { key, ret } => {
            let ty = ret
                .as_ref()
                .and_then(|ann| ann.inferred.get())
                .map(|ty| ts_type(&ty))
                .unwrap_or_else(|| "unknown".to_string());
            out.push_str(&format!("    get {}(): {ty};\n", key_text(key)));
        }
        ObjAnnElem::Setter { key, param } => {
            let ty = param
                .inferred
                .get()
                .map(|ty| ts_type(&ty))
                .unwrap_or_else(|| "unknown".to_string());
            out.push_str(&format!("    set {}(value: {ty});\n", key_text(key)));
        }
        ObjAnnElem::Mapped(_) | ObjAnnElem::RestSpread { .. } => {}
    }
}

fn key_text(key: &ObjKey) -> String {
    match key {
        ObjKey::Ident(id) => id.name.clone(),
        ObjKey::Str(s, _) => format!("{s:?}"),
        ObjKey::Num(n, _) => Literal::Num(*n).to_string(),
        ObjKey::Computed(_) => "[computed]".to_string(),
    }
}

fn ts_type_params(type_params: &[TypeParam]) -> String {
    if type_params.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = type_params.iter().map(|tp| tp.name.as_str()).collect();
    format!("<{}>", names.join(", "))
}

/// A signature rendered from annotation slots, for interface members.
fn ts_sig_from_anns(sig: &FuncSig) -> String {
    let params: Vec<String> = sig
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let name = match &param.pattern.kind {
                PatternKind::Ident { name, .. } => name.name.clone(),
                _ => format!("arg{i}"),
            };
            let ty = param
                .type_ann
                .as_ref()
                .and_then(|ann| ann.inferred.get())
                .map(|ty| ts_type(&ty))
                .unwrap_or_else(|| "unknown".to_string());
            format!("{name}{}: {ty}", if param.optional { "?" } else { "" })
        })
        .collect();
    let ret = sig
        .ret
        .as_ref()
        .and_then(|ann| ann.inferred.get())
        .map(|ty| ts_type(&ty))
        .unwrap_or_else(|| "unknown".to_string());
    format!("({}): {ret}", params.join(", "))
}

/// A checked function type rendered as a TS declaration signature.
pub fn ts_signature(func: &TyFunc) -> String {
    let type_params = if func.type_params.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = func.type_params.iter().map(|tp| tp.name.as_str()).collect();
        format!("<{}>", names.join(", "))
    };
    let params: Vec<String> = func
        .params
        .iter()
        .map(|p| match &p.ty {
            Ty::RestSpread(inner) => {
                format!("...{}: {}", p.name, ts_type(&Ty::Tuple(vec![(**inner).clone()])))
            }
            ty => format!(
                "{}{}: {}",
                p.name,
                if p.is_omittable() { "?" } else { "" },
                ts_type(ty)
            ),
        })
        .collect();
    format!("{type_params}({}): {}", params.join(", "), ts_type(&func.ret))
}

/// Render a semantic type as TypeScript syntax.
pub fn ts_type(ty: &Ty) -> String {
    match ty {
        Ty::Var(_) | Ty::Unknown | Ty::Wildcard | Ty::Infer(_) => "unknown".to_string(),
        Ty::Never => "never".to_string(),
        Ty::GlobalThis => "typeof globalThis".to_string(),
        Ty::Prim(p) => p.name().to_string(),
        Ty::Lit(Literal::Undefined) => "undefined".to_string(),
        Ty::Lit(Literal::Null) => "null".to_string(),
        Ty::Lit(Literal::Regex { .. }) => "RegExp".to_string(),
        Ty::Lit(lit) => lit.to_string(),
        Ty::UniqueSymbol(_) => "unique symbol".to_string(),
        Ty::Ref(r) => {
            if r.type_args.is_empty() {
                r.name.clone()
            } else {
                let args: Vec<String> = r.type_args.iter().map(ts_type).collect();
                format!("{}<{}>", r.name, args.join(", "))
            }
        }
        Ty::Func(func) => {
            let params: Vec<String> = func
                .params
                .iter()
                .map(|p| format!("{}: {}", p.name, ts_type(&p.ty)))
                .collect();
            format!("({}) => {}", params.join(", "), ts_type(&func.ret))
        }
        Ty::Object(obj) => {
            let members: Vec<String> = obj
                .elems
                .iter()
                .filter_map(|elem| match elem {
                    TyObjectElem::Property { key, optional, readonly, ty } => Some(format!(
                        "{}{}{}: {}",
                        if *readonly { "readonly " } else { "" },
                        prop_key(key),
                        if *optional { "?" } else { "" },
                        ts_type(ty)
                    )),
                    TyObjectElem::Method { key, func } => {
                        Some(format!("{}{}", prop_key(key), ts_signature(func)))
                    }
                    TyObjectElem::Getter { key, ret } => {
                        Some(format!("get {}(): {}", prop_key(key), ts_type(ret)))
                    }
                    TyObjectElem::Setter { key, param } => {
                        Some(format!("set {}(value: {})", prop_key(key), ts_type(param)))
                    }
                    TyObjectElem::Callable(func) => Some(ts_signature(func)),
                    TyObjectElem::Constructor(func) => Some(format!("new {}", ts_signature(func))),
                    TyObjectElem::Mapped(m) => Some(format!(
                        "[{} in {}]: {}",
                        m.type_param,
                        ts_type(&m.constraint),
                        ts_type(&m.value)
                    )),
                    TyObjectElem::RestSpread(_) => None,
                })
                .collect();
            format!("{{ {} }}", members.join("; "))
        }
        Ty::Tuple(elems) => {
            let elems: Vec<String> = elems.iter().map(ts_type).collect();
            format!("[{}]", elems.join(", "))
        }
        Ty::RestSpread(inner) => format!("...{}[]", ts_type(inner)),
        Ty::Union(types) => {
            let members: Vec<String> = types.iter().map(ts_type).collect();
            members.join(" | ")
        }
        Ty::Intersection(types) => {
            let members: Vec<String> = types.iter().map(ts_type).collect();
            members.join(" & ")
        }
        Ty::KeyOf(t) => format!("keyof {}", ts_type(t)),
        Ty::Index { target, index } => format!("{}[{}]", ts_type(target), ts_type(index)),
        Ty::Cond(cond) => format!(
            "{} extends {} ? {} : {}",
            ts_type(&cond.check),
            ts_type(&cond.extends),
            ts_type(&cond.then_ty),
            ts_type(&cond.else_ty)
        ),
        Ty::Extract { extractor, args } => {
            let args: Vec<String> = args.iter().map(ts_type).collect();
            format!("ReturnType<typeof {}<{}>>", ts_type(extractor), args.join(", "))
        }
        Ty::TemplateLit { quasis, types } => {
            let mut out = String::from("`");
            for (i, quasi) in quasis.iter().enumerate() {
                out.push_str(quasi);
                if let Some(t) = types.get(i) {
                    out.push_str(&format!("${{{}}}", ts_type(t)));
                }
            }
            out.push('`');
            out
        }
        Ty::Intrinsic(name) => {
            if name.is_empty() {
                "unknown".to_string()
            } else {
                name.clone()
            }
        }
    }
}

fn prop_key(key: &PropKey) -> String {
    match key {
        PropKey::Str(s) => s.clone(),
        PropKey::Num(n) => Literal::Num(*n).to_string(),
        PropKey::Sym(id) => format!("[sym{id}]"),
    }
}

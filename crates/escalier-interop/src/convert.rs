//! Translation from declaration modules into the Escalier AST.
//!
//! Every produced declaration carries `declare = true` and the synthetic
//! span. `this` types map to a `Self` reference, `void` to undefined,
//! index signatures to mapped object elements. Constructs with no
//! Escalier counterpart are reported as [`ImportError`]s and skipped.

use escalier_ast::{
    assemble, Decl, DeclKind, EnumMember, FuncSig, Ident, MappedAnn, Module, ObjAnnElem, ObjKey,
    Param, ParsedFile, Pattern, PatternKind, QualIdent, Stmt, StmtKind, TypeAnn, TypeAnnKind,
    TypeParam,
};
use escalier_common::{Diagnostic, Literal, SourceId, Span};

use crate::decl_model::{
    DeclEnumMember, DeclMember, DeclModule, DeclParam, DeclStatement, DeclType,
};

/// A construct the adapter could not translate.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportError {
    pub construct: String,
    pub context: String,
}

impl ImportError {
    fn new(construct: impl Into<String>, context: impl Into<String>) -> Self {
        Self { construct: construct.into(), context: context.into() }
    }
}

impl Diagnostic for ImportError {
    fn message(&self) -> String {
        format!(
            "unsupported construct in declaration file: {} (in {})",
            self.construct, self.context
        )
    }

    fn span(&self) -> Span {
        Span::synthetic()
    }
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Convert a declaration module into a namespaced Escalier module.
pub fn convert(module: &DeclModule) -> (Module, Vec<ImportError>) {
    let mut errors = Vec::new();
    let mut stmts = Vec::new();
    for statement in &module.statements {
        if let Some(decl) = convert_statement(statement, &module.name, &mut errors) {
            stmts.push(decl);
        }
    }
    let (ast_module, assemble_errors) = assemble(vec![ParsedFile {
        path: format!("{}.d.ts", module.name),
        source: SourceId::SYNTHETIC,
        default_namespace: String::new(),
        stmts,
    }]);
    for err in assemble_errors {
        errors.push(ImportError::new(err.message(), module.name.clone()));
    }
    (ast_module, errors)
}

fn convert_statement(
    statement: &DeclStatement,
    context: &str,
    errors: &mut Vec<ImportError>,
) -> Option<Stmt> {
    let decl = convert_statement_decl(statement, context, errors)?;
    Some(Stmt::new(StmtKind::Decl { decl }, Span::synthetic()))
}

fn convert_statement_decl(
    statement: &DeclStatement,
    context: &str,
    errors: &mut Vec<ImportError>,
) -> Option<Decl> {
    let kind = match statement {
        DeclStatement::Var { name, ty } => DeclKind::Var {
            kind: escalier_ast::VarKind::Val,
            pattern: Pattern::ident(name, Span::synthetic()),
            type_ann: Some(convert_type(ty, context, errors)),
            init: None,
        },
        DeclStatement::Func { name, type_params, params, ret } => DeclKind::Func {
            name: Ident::synthetic(name),
            sig: convert_sig(type_params, params, ret, context, errors),
            body: None,
        },
        DeclStatement::TypeAlias { name, type_params, ty } => DeclKind::TypeAlias {
            name: Ident::synthetic(name),
            type_params: convert_type_params(type_params),
            type_ann: convert_type(ty, name, errors),
        },
        DeclStatement::Interface { name, type_params, extends, members } => DeclKind::Interface {
            name: Ident::synthetic(name),
            type_params: convert_type_params(type_params),
            extends: extends
                .iter()
                .map(|parent| {
                    (QualIdent::ident(parent.clone(), Span::synthetic()), Vec::new())
                })
                .collect(),
            body: convert_members(members, name, errors),
        },
        DeclStatement::Enum { name, members } => DeclKind::Enum {
            name: Ident::synthetic(name),
            type_params: Vec::new(),
            members: members
                .iter()
                .map(|member| convert_enum_member(member, name, errors))
                .collect(),
        },
        DeclStatement::Class { name, type_params, extends, ctor_params, members } => {
            DeclKind::Class {
                name: Ident::synthetic(name),
                type_params: convert_type_params(type_params),
                extends: extends.as_ref().map(|parent| {
                    (QualIdent::ident(parent.clone(), Span::synthetic()), Vec::new())
                }),
                ctor_params: ctor_params
                    .iter()
                    .map(|p| convert_param(p, context, errors))
                    .collect(),
                body: convert_members(members, name, errors)
                    .into_iter()
                    .filter_map(obj_elem_to_class_member)
                    .collect(),
            }
        }
        DeclStatement::Namespace { name, body } => DeclKind::Namespace {
            name: Ident::synthetic(name),
            body: body
                .iter()
                .filter_map(|inner| convert_statement_decl(inner, name, errors))
                .collect(),
        },
        DeclStatement::Import { .. } => {
            // Imports between declaration files are resolved by the
            // importer driver, not the adapter.
            return None;
        }
    };
    Some(Decl::declare(kind, Span::synthetic()))
}

fn convert_type_params(names: &[String]) -> Vec<TypeParam> {
    names
        .iter()
        .map(|name| TypeParam::new(name.clone(), Span::synthetic()))
        .collect()
}

fn convert_sig(
    type_params: &[String],
    params: &[DeclParam],
    ret: &DeclType,
    context: &str,
    errors: &mut Vec<ImportError>,
) -> FuncSig {
    FuncSig {
        type_params: convert_type_params(type_params),
        params: params.iter().map(|p| convert_param(p, context, errors)).collect(),
        ret: Some(Box::new(convert_type(ret, context, errors))),
        throws: None,
        is_async: false,
    }
}

fn convert_param(param: &DeclParam, context: &str, errors: &mut Vec<ImportError>) -> Param {
    let ident = Pattern::ident(&param.name, Span::synthetic());
    let pattern = if param.rest {
        Pattern::new(PatternKind::Rest { inner: Box::new(ident) }, Span::synthetic())
    } else {
        ident
    };
    Param {
        pattern,
        optional: param.optional,
        type_ann: Some(convert_type(&param.ty, context, errors)),
    }
}

fn convert_members(
    members: &[DeclMember],
    context: &str,
    errors: &mut Vec<ImportError>,
) -> Vec<ObjAnnElem> {
    members
        .iter()
        .filter_map(|member| convert_member(member, context, errors))
        .collect()
}

fn convert_member(
    member: &DeclMember,
    context: &str,
    errors: &mut Vec<ImportError>,
) -> Option<ObjAnnElem> {
    match member {
        DeclMember::Property { name, ty, optional, readonly } => Some(ObjAnnElem::Property {
            key: ObjKey::Ident(Ident::synthetic(name)),
            optional: *optional,
            readonly: *readonly,
            type_ann: convert_type(ty, context, errors),
        }),
        DeclMember::Method { name, type_params, params, ret, optional } => {
            Some(ObjAnnElem::Method {
                key: ObjKey::Ident(Ident::synthetic(name)),
                sig: convert_sig(type_params, params, ret, context, errors),
                optional: *optional,
            })
        }
        DeclMember::Getter { name, ty } => Some(ObjAnnElem::Getter {
            key: ObjKey::Ident(Ident::synthetic(name)),
            ret: Some(Box::new(convert_type(ty, context, errors))),
        }),
        DeclMember::Setter { name, param } => Some(ObjAnnElem::Setter {
            key: ObjKey::Ident(Ident::synthetic(name)),
            param: Box::new(convert_type(&param.ty, context, errors)),
        }),
        DeclMember::Call { params, ret } => Some(ObjAnnElem::Callable(convert_sig(
            &[],
            params,
            ret,
            context,
            errors,
        ))),
        DeclMember::Construct { params, ret } => Some(ObjAnnElem::Constructor(convert_sig(
            &[],
            params,
            ret,
            context,
            errors,
        ))),
        DeclMember::IndexSignature { param_name, key, value, readonly } => {
            // `[key: string]: T` becomes a mapped element over the key
            // type.
            let mut type_param = TypeParam::new(param_name.clone(), Span::synthetic());
            type_param.constraint =
                Some(Box::new(convert_type(key, context, errors)));
            Some(ObjAnnElem::Mapped(MappedAnn {
                type_param,
                name_remap: None,
                value: Box::new(convert_type(value, context, errors)),
                optional: None,
                readonly: readonly.then_some(escalier_ast::MappedAnnModifier::Add),
                span: Span::synthetic(),
            }))
        }
        DeclMember::ComputedProperty { expr } => {
            errors.push(ImportError::new(
                format!("computed property key `{expr}`"),
                context,
            ));
            None
        }
    }
}

fn convert_enum_member(
    member: &DeclEnumMember,
    enum_name: &str,
    errors: &mut Vec<ImportError>,
) -> EnumMember {
    // TS enum members map to string-literal variants; numeric
    // initializers have no defined Escalier semantics.
    if let Some(Literal::Num(_)) = member.init {
        errors.push(ImportError::new(
            format!("numeric enum initializer on `{}`", member.name),
            enum_name,
        ));
    }
    let value = match &member.init {
        Some(Literal::Str(s)) => s.clone(),
        _ => member.name.clone(),
    };
    EnumMember::Variant {
        name: Ident::synthetic(&member.name),
        types: vec![TypeAnn::new(
            TypeAnnKind::Lit { lit: Literal::Str(value) },
            Span::synthetic(),
        )],
        span: Span::synthetic(),
    }
}

fn convert_type(ty: &DeclType, context: &str, errors: &mut Vec<ImportError>) -> TypeAnn {
    let kind = match ty {
        DeclType::Any => TypeAnnKind::Any,
        DeclType::Unknown => TypeAnnKind::Unknown,
        DeclType::Never => TypeAnnKind::Never,
        DeclType::Void => TypeAnnKind::Void,
        DeclType::Undefined => TypeAnnKind::Lit { lit: Literal::Undefined },
        DeclType::Null => TypeAnnKind::Lit { lit: Literal::Null },
        DeclType::Number => TypeAnnKind::Number,
        DeclType::String => TypeAnnKind::String,
        DeclType::Boolean => TypeAnnKind::Boolean,
        DeclType::Symbol => TypeAnnKind::Symbol,
        DeclType::BigInt => TypeAnnKind::BigInt,
        // The anonymous `object` keyword: an empty structural object.
        DeclType::Object => TypeAnnKind::Object { elems: Vec::new() },
        DeclType::This => TypeAnnKind::Ref {
            name: QualIdent::ident("Self", Span::synthetic()),
            type_args: Vec::new(),
        },
        DeclType::Lit(lit) => TypeAnnKind::Lit { lit: lit.clone() },
        DeclType::Ref { name, args } => TypeAnnKind::Ref {
            name: qual_ident_from_dotted(name),
            type_args: args.iter().map(|a| convert_type(a, context, errors)).collect(),
        },
        DeclType::Array(inner) => TypeAnnKind::Ref {
            name: QualIdent::ident("Array", Span::synthetic()),
            type_args: vec![convert_type(inner, context, errors)],
        },
        DeclType::Tuple(elems) => TypeAnnKind::Tuple {
            elems: elems.iter().map(|e| convert_type(e, context, errors)).collect(),
        },
        DeclType::Union(types) => TypeAnnKind::Union {
            types: types.iter().map(|t| convert_type(t, context, errors)).collect(),
        },
        DeclType::Intersection(types) => TypeAnnKind::Intersection {
            types: types.iter().map(|t| convert_type(t, context, errors)).collect(),
        },
        DeclType::Func { type_params, params, ret } => TypeAnnKind::Func {
            sig: convert_sig(type_params, params, ret, context, errors),
        },
        DeclType::ObjectLit(members) => TypeAnnKind::Object {
            elems: convert_members(members, context, errors),
        },
        DeclType::KeyOf(inner) => TypeAnnKind::KeyOf {
            target: Box::new(convert_type(inner, context, errors)),
        },
        DeclType::IndexedAccess { target, index } => TypeAnnKind::Index {
            target: Box::new(convert_type(target, context, errors)),
            index: Box::new(convert_type(index, context, errors)),
        },
        DeclType::TypeQuery(name) => TypeAnnKind::TypeOf {
            target: qual_ident_from_dotted(name),
        },
        DeclType::TypePredicate { param, .. } => {
            // `x is T` narrows in TS; Escalier has no counterpart, so the
            // signature degrades to boolean.
            errors.push(ImportError::new(
                format!("type predicate on `{param}`"),
                context,
            ));
            TypeAnnKind::Boolean
        }
    };
    TypeAnn::new(kind, Span::synthetic())
}

fn qual_ident_from_dotted(name: &str) -> QualIdent {
    let segments: Vec<&str> = name.split('.').collect();
    QualIdent::from_segments(&segments, Span::synthetic())
}

fn obj_elem_to_class_member(elem: ObjAnnElem) -> Option<escalier_ast::ClassMember> {
    match elem {
        ObjAnnElem::Property { key, optional, readonly, type_ann } => {
            Some(escalier_ast::ClassMember::Property {
                key,
                optional,
                readonly,
                type_ann: Some(type_ann),
                init: None,
                is_static: false,
            })
        }
        ObjAnnElem::Method { key, sig, .. } => Some(escalier_ast::ClassMember::Method {
            key,
            sig,
            body: None,
            is_static: false,
        }),
        ObjAnnElem::Getter { key, ret } => Some(escalier_ast::ClassMember::Getter {
            key,
            ret: ret.map(|r| *r),
            body: None,
            is_static: false,
        }),
        ObjAnnElem::Setter { key, param } => Some(escalier_ast::ClassMember::Setter {
            key,
            param: Param {
                pattern: Pattern::ident("value", Span::synthetic()),
                optional: false,
                type_ann: Some(*param),
            },
            body: None,
            is_static: false,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use escalier_ast::DeclKind;

    fn var(name: &str, ty: DeclType) -> DeclStatement {
        DeclStatement::Var { name: name.into(), ty }
    }

    #[test]
    fn everything_is_marked_declare_and_synthetic() {
        let module = DeclModule {
            name: "lib".into(),
            statements: vec![
                var("version", DeclType::String),
                DeclStatement::Func {
                    name: "parse".into(),
                    type_params: vec![],
                    params: vec![DeclParam {
                        name: "input".into(),
                        ty: DeclType::String,
                        optional: false,
                        rest: false,
                    }],
                    ret: DeclType::Number,
                },
            ],
        };
        let (converted, errors) = convert(&module);
        assert!(errors.is_empty());
        let root = converted.namespace("").unwrap();
        assert_eq!(root.decls.len(), 2);
        for decl in &root.decls {
            assert!(decl.declare);
            assert!(decl.span.is_synthetic());
        }
    }

    #[test]
    fn namespaces_flatten_into_dotted_paths() {
        let module = DeclModule {
            name: "lib".into(),
            statements: vec![DeclStatement::Namespace {
                name: "dom".into(),
                body: vec![DeclStatement::Namespace {
                    name: "events".into(),
                    body: vec![var("count", DeclType::Number)],
                }],
            }],
        };
        let (converted, errors) = convert(&module);
        assert!(errors.is_empty());
        let ns = converted.namespace("dom.events").unwrap();
        assert_eq!(ns.decls.len(), 1);
    }

    #[test]
    fn this_maps_to_self_reference() {
        let module = DeclModule {
            name: "lib".into(),
            statements: vec![DeclStatement::Interface {
                name: "Chain".into(),
                type_params: vec![],
                extends: vec![],
                members: vec![DeclMember::Method {
                    name: "next".into(),
                    type_params: vec![],
                    params: vec![],
                    ret: DeclType::This,
                    optional: false,
                }],
            }],
        };
        let (converted, errors) = convert(&module);
        assert!(errors.is_empty());
        let root = converted.namespace("").unwrap();
        let DeclKind::Interface { body, .. } = &root.decls[0].kind else {
            panic!("expected interface");
        };
        let ObjAnnElem::Method { sig, .. } = &body[0] else { panic!() };
        let ret = sig.ret.as_ref().unwrap();
        let TypeAnnKind::Ref { name, .. } = &ret.kind else {
            panic!("expected a reference return");
        };
        assert_eq!(name.to_string(), "Self");
    }

    #[test]
    fn unsupported_constructs_are_reported_and_skipped() {
        let module = DeclModule {
            name: "lib".into(),
            statements: vec![
                DeclStatement::Interface {
                    name: "Weird".into(),
                    type_params: vec![],
                    extends: vec![],
                    members: vec![DeclMember::ComputedProperty {
                        expr: "Symbol.iterator".into(),
                    }],
                },
                DeclStatement::Func {
                    name: "isString".into(),
                    type_params: vec![],
                    params: vec![DeclParam {
                        name: "x".into(),
                        ty: DeclType::Unknown,
                        optional: false,
                        rest: false,
                    }],
                    ret: DeclType::TypePredicate {
                        param: "x".into(),
                        ty: Box::new(DeclType::String),
                    },
                },
            ],
        };
        let (converted, errors) = convert(&module);
        assert_eq!(errors.len(), 2);
        // The interface survives with the member dropped; the predicate
        // degrades to boolean.
        let root = converted.namespace("").unwrap();
        assert_eq!(root.decls.len(), 2);
    }

    #[test]
    fn ts_enums_become_string_literal_variants() {
        let module = DeclModule {
            name: "lib".into(),
            statements: vec![DeclStatement::Enum {
                name: "Direction".into(),
                members: vec![
                    DeclEnumMember { name: "Up".into(), init: None },
                    DeclEnumMember {
                        name: "Down".into(),
                        init: Some(Literal::Num(1.0)),
                    },
                ],
            }],
        };
        let (converted, errors) = convert(&module);
        // The numeric initializer is flagged but the enum still converts.
        assert_eq!(errors.len(), 1);
        let root = converted.namespace("").unwrap();
        let DeclKind::Enum { members, .. } = &root.decls[0].kind else {
            panic!("expected enum");
        };
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn index_signatures_become_mapped_elements() {
        let module = DeclModule {
            name: "lib".into(),
            statements: vec![DeclStatement::Interface {
                name: "Dict".into(),
                type_params: vec![],
                extends: vec![],
                members: vec![DeclMember::IndexSignature {
                    param_name: "key".into(),
                    key: DeclType::String,
                    value: DeclType::Number,
                    readonly: false,
                }],
            }],
        };
        let (converted, errors) = convert(&module);
        assert!(errors.is_empty());
        let root = converted.namespace("").unwrap();
        let DeclKind::Interface { body, .. } = &root.decls[0].kind else {
            panic!("expected interface");
        };
        assert!(matches!(body[0], ObjAnnElem::Mapped(_)));
    }
}

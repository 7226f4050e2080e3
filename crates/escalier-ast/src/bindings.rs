//! Binding extraction from patterns.

use crate::pattern::{ObjectPatElem, Pattern, PatternKind};

/// Collect the names a pattern binds, in lexical appearance order, with
/// duplicates removed (first occurrence kept).
///
/// Feeds scope population and declaration dependency analysis.
pub fn find_bindings(pattern: &Pattern) -> Vec<String> {
    let mut names = Vec::new();
    collect(pattern, &mut names);
    names
}

fn push(name: &str, out: &mut Vec<String>) {
    if !out.iter().any(|n| n == name) {
        out.push(name.to_string());
    }
}

fn collect(pattern: &Pattern, out: &mut Vec<String>) {
    match &pattern.kind {
        PatternKind::Ident { name, .. } => push(&name.name, out),
        PatternKind::Tuple { elems } => {
            for elem in elems {
                collect(elem, out);
            }
        }
        PatternKind::Object { elems } => {
            for elem in elems {
                match elem {
                    ObjectPatElem::KeyValue { value, .. } => collect(value, out),
                    ObjectPatElem::Shorthand { ident, .. } => push(&ident.name, out),
                    ObjectPatElem::Rest { pattern } => collect(pattern, out),
                }
            }
        }
        PatternKind::Extractor { args, .. } => {
            for arg in args {
                collect(arg, out);
            }
        }
        PatternKind::Instance { object, .. } => collect(object, out),
        PatternKind::Rest { inner } => collect(inner, out),
        PatternKind::Lit { .. } | PatternKind::Wildcard => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{Ident, ObjKey, QualIdent};
    use escalier_common::{Literal, Span};

    fn pat(kind: PatternKind) -> Pattern {
        Pattern::new(kind, Span::synthetic())
    }

    #[test]
    fn ident_binds_itself() {
        assert_eq!(find_bindings(&Pattern::ident("x", Span::synthetic())), ["x"]);
    }

    #[test]
    fn tuple_binds_in_order() {
        let p = pat(PatternKind::Tuple {
            elems: vec![
                Pattern::ident("b", Span::synthetic()),
                Pattern::ident("a", Span::synthetic()),
            ],
        });
        assert_eq!(find_bindings(&p), ["b", "a"]);
    }

    #[test]
    fn object_shorthand_keyvalue_and_rest() {
        let p = pat(PatternKind::Object {
            elems: vec![
                ObjectPatElem::Shorthand {
                    ident: Ident::synthetic("x"),
                    default: None,
                },
                ObjectPatElem::KeyValue {
                    key: ObjKey::Ident(Ident::synthetic("y")),
                    value: Pattern::ident("z", Span::synthetic()),
                    default: None,
                },
                ObjectPatElem::Rest {
                    pattern: Pattern::ident("rest", Span::synthetic()),
                },
            ],
        });
        assert_eq!(find_bindings(&p), ["x", "z", "rest"]);
    }

    #[test]
    fn extractor_binds_args() {
        let p = pat(PatternKind::Extractor {
            name: QualIdent::ident("Some", Span::synthetic()),
            args: vec![Pattern::ident("n", Span::synthetic())],
        });
        assert_eq!(find_bindings(&p), ["n"]);
    }

    #[test]
    fn literals_and_wildcards_bind_nothing() {
        assert!(find_bindings(&pat(PatternKind::Lit { lit: Literal::Num(1.0) })).is_empty());
        assert!(find_bindings(&pat(PatternKind::Wildcard)).is_empty());
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let p = pat(PatternKind::Tuple {
            elems: vec![
                Pattern::ident("x", Span::synthetic()),
                Pattern::ident("y", Span::synthetic()),
                Pattern::ident("x", Span::synthetic()),
            ],
        });
        assert_eq!(find_bindings(&p), ["x", "y"]);
    }
}

//! Identifiers, qualified identifiers, and object keys.

use std::fmt;

use escalier_common::Span;

use crate::expr::Expr;

/// A plain identifier with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }

    /// An identifier with no source position (importer-inserted).
    pub fn synthetic(name: impl Into<String>) -> Self {
        Self::new(name, Span::synthetic())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A possibly-dotted identifier, e.g. `foo` or `foo.bar.Baz`.
#[derive(Debug, Clone, PartialEq)]
pub enum QualIdent {
    Ident(Ident),
    Member { left: Box<QualIdent>, right: Ident },
}

impl QualIdent {
    pub fn ident(name: impl Into<String>, span: Span) -> Self {
        QualIdent::Ident(Ident::new(name, span))
    }

    /// Build from dot-separated segments. Panics on an empty list.
    pub fn from_segments(segments: &[&str], span: Span) -> Self {
        let mut iter = segments.iter();
        let first = iter.next().expect("qualified identifier needs a segment");
        let mut qi = QualIdent::Ident(Ident::new(*first, span));
        for seg in iter {
            qi = QualIdent::Member {
                left: Box::new(qi),
                right: Ident::new(*seg, span),
            };
        }
        qi
    }

    pub fn span(&self) -> Span {
        match self {
            QualIdent::Ident(id) => id.span,
            QualIdent::Member { left, right } => left.span().merge(right.span),
        }
    }

    /// The leftmost segment.
    pub fn head(&self) -> &Ident {
        match self {
            QualIdent::Ident(id) => id,
            QualIdent::Member { left, .. } => left.head(),
        }
    }

    /// All segments, left to right.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            QualIdent::Ident(id) => vec![id.name.as_str()],
            QualIdent::Member { left, right } => {
                let mut segs = left.segments();
                segs.push(right.name.as_str());
                segs
            }
        }
    }
}

impl fmt::Display for QualIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualIdent::Ident(id) => write!(f, "{id}"),
            QualIdent::Member { left, right } => write!(f, "{left}.{right}"),
        }
    }
}

/// A key in an object expression, object pattern, or object type.
#[derive(Debug, Clone)]
pub enum ObjKey {
    Ident(Ident),
    Str(String, Span),
    Num(f64, Span),
    Computed(Box<Expr>),
}

impl ObjKey {
    pub fn span(&self) -> Span {
        match self {
            ObjKey::Ident(id) => id.span,
            ObjKey::Str(_, span) | ObjKey::Num(_, span) => *span,
            ObjKey::Computed(expr) => expr.span,
        }
    }

    /// The key's name when it is statically known.
    pub fn name(&self) -> Option<String> {
        match self {
            ObjKey::Ident(id) => Some(id.name.clone()),
            ObjKey::Str(s, _) => Some(s.clone()),
            ObjKey::Num(n, _) => Some(n.to_string()),
            ObjKey::Computed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qual_ident_renders_dotted() {
        let qi = QualIdent::from_segments(&["foo", "bar", "Baz"], Span::synthetic());
        assert_eq!(qi.to_string(), "foo.bar.Baz");
        assert_eq!(qi.segments(), vec!["foo", "bar", "Baz"]);
        assert_eq!(qi.head().name, "foo");
    }
}

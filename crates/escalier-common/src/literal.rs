//! Literal values shared by expressions and type annotations.

use std::fmt;

use serde::Serialize;

/// A literal constant.
///
/// Literals are the only carrier for numeric and string constants in both
/// expressions and type annotations, and double as singleton literal types
/// in the type IR. Equality is structural; `Num` compares bitwise so that
/// literal types behave as singletons (`NaN == NaN`, `0.0 != -0.0`).
#[derive(Debug, Clone, Serialize)]
pub enum Literal {
    Bool(bool),
    Num(f64),
    Str(String),
    /// Arbitrary-precision integer, carried as its decimal digit string.
    BigInt(String),
    Null,
    Undefined,
    Regex {
        pattern: String,
        flags: String,
    },
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::Bool(a), Literal::Bool(b)) => a == b,
            (Literal::Num(a), Literal::Num(b)) => a.to_bits() == b.to_bits(),
            (Literal::Str(a), Literal::Str(b)) => a == b,
            (Literal::BigInt(a), Literal::BigInt(b)) => a == b,
            (Literal::Null, Literal::Null) => true,
            (Literal::Undefined, Literal::Undefined) => true,
            (
                Literal::Regex { pattern: p1, flags: f1 },
                Literal::Regex { pattern: p2, flags: f2 },
            ) => p1 == p2 && f1 == f2,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl std::hash::Hash for Literal {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Literal::Bool(b) => b.hash(state),
            Literal::Num(n) => n.to_bits().hash(state),
            Literal::Str(s) => s.hash(state),
            Literal::BigInt(s) => s.hash(state),
            Literal::Null | Literal::Undefined => {}
            Literal::Regex { pattern, flags } => {
                pattern.hash(state);
                flags.hash(state);
            }
        }
    }
}

impl Literal {
    pub fn str(s: impl Into<String>) -> Self {
        Literal::Str(s.into())
    }

    pub fn num(n: f64) -> Self {
        Literal::Num(n)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Num(n) => {
                // Render integral floats without the trailing ".0".
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e21 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Literal::Str(s) => write!(f, "{s:?}"),
            Literal::BigInt(s) => write!(f, "{s}n"),
            Literal::Null => write!(f, "null"),
            Literal::Undefined => write!(f, "undefined"),
            Literal::Regex { pattern, flags } => write!(f, "/{pattern}/{flags}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_equality_is_bitwise() {
        assert_eq!(Literal::Num(f64::NAN), Literal::Num(f64::NAN));
        assert_ne!(Literal::Num(0.0), Literal::Num(-0.0));
        assert_eq!(Literal::Num(1.5), Literal::Num(1.5));
    }

    #[test]
    fn cross_variant_inequality() {
        assert_ne!(Literal::Null, Literal::Undefined);
        assert_ne!(Literal::Num(0.0), Literal::Bool(false));
        assert_ne!(Literal::Str("1".into()), Literal::Num(1.0));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Literal::Num(5.0).to_string(), "5");
        assert_eq!(Literal::Num(1.25).to_string(), "1.25");
        assert_eq!(Literal::str("hi").to_string(), "\"hi\"");
        assert_eq!(Literal::BigInt("42".into()).to_string(), "42n");
        assert_eq!(
            Literal::Regex { pattern: "a+".into(), flags: "g".into() }.to_string(),
            "/a+/g"
        );
    }
}

//! Expression nodes.

use std::fmt;

use escalier_common::{Literal, Span};

use crate::func::FuncSig;
use crate::ident::{Ident, ObjKey, QualIdent};
use crate::pattern::Pattern;
use crate::slot::TypeSlot;
use crate::stmt::Block;
use crate::type_ann::TypeAnn;

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    LtEq,
    Gt,
    GtEq,
    EqEq,
    NotEq,
    And,
    Or,
    NullishCoalescing,
    Assign,
    /// String concatenation (`++`).
    Concat,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::EqEq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::NullishCoalescing => "??",
            BinaryOp::Assign => "=",
            BinaryOp::Concat => "++",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// An expression with its span and inferred-type slot.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub inferred: TypeSlot,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span, inferred: TypeSlot::new() }
    }

    pub fn literal(lit: Literal, span: Span) -> Self {
        Self::new(ExprKind::Literal { lit }, span)
    }

    pub fn ident(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Ident { name: Ident::new(name, span) }, span)
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
            span,
        )
    }

    pub fn inferred_type(&self) -> Option<escalier_types::Ty> {
        self.inferred.get()
    }

    pub fn set_inferred_type(&self, ty: escalier_types::Ty) {
        self.inferred.set(ty);
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    Unary { op: UnaryOp, arg: Box<Expr> },
    Literal { lit: Literal },
    Ident { name: Ident },
    Func { sig: FuncSig, body: Block },
    Call { callee: Box<Expr>, args: Vec<Expr>, opt_chain: bool },
    Index { object: Box<Expr>, index: Box<Expr>, opt_chain: bool },
    Member { object: Box<Expr>, prop: Ident, opt_chain: bool },
    Tuple { elems: Vec<Expr> },
    Object { elems: Vec<ObjectElem> },
    IfElse { cond: Box<Expr>, cons: Block, alt: Option<Block> },
    IfLet { pattern: Pattern, target: Box<Expr>, cons: Block, alt: Option<Block> },
    Match { target: Box<Expr>, cases: Vec<MatchCase> },
    Assign { left: Box<Expr>, right: Box<Expr> },
    TryCatch { try_block: Block, catch_cases: Vec<MatchCase>, finally: Option<Block> },
    Do { body: Block },
    Await { arg: Box<Expr> },
    Throw { arg: Box<Expr> },
    TemplateLit { quasis: Vec<String>, exprs: Vec<Expr> },
    TaggedTemplateLit { tag: Box<Expr>, quasis: Vec<String>, exprs: Vec<Expr> },
    TypeCast { expr: Box<Expr>, type_ann: Box<TypeAnn> },
    JsxElement { name: QualIdent, attrs: Vec<JsxAttr>, children: Vec<Expr> },
    JsxFragment { children: Vec<Expr> },
    /// An intentionally discarded value (`_ = expr` position).
    Ignore,
    /// An empty expression, e.g. an elided tuple slot.
    Empty,
}

/// An element of an object literal expression.
#[derive(Debug, Clone)]
pub enum ObjectElem {
    Property { key: ObjKey, value: Expr },
    Shorthand { ident: Ident },
    Spread { expr: Expr },
}

/// One arm of a `match` expression or `catch` clause.
#[derive(Debug, Clone)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub guard: Option<Box<Expr>>,
    pub body: Block,
    pub span: Span,
}

/// A JSX attribute, `name` or `name={expr}`.
#[derive(Debug, Clone)]
pub struct JsxAttr {
    pub name: Ident,
    pub value: Option<Expr>,
}

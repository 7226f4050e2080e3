//! The diagnostic contract and plain-text rendering.
//!
//! Every compiler error implements [`Diagnostic`]: a human-readable message
//! plus the span it points at. A span whose start is `(0,0)` means "no
//! source position". Errors are collected during compilation rather than
//! aborting immediately, enabling error recovery and reporting multiple
//! issues in one run.

use std::fmt;

use crate::source::SourceSet;
use crate::span::Span;

/// A compiler diagnostic: message plus source position.
pub trait Diagnostic {
    fn message(&self) -> String;
    fn span(&self) -> Span;
}

/// Render a diagnostic as plain text: `path:line:col: message`, followed by
/// the excerpted source line and a caret underline when the span is not
/// synthetic.
pub fn render_plain(diag: &dyn Diagnostic, sources: &SourceSet) -> String {
    let span = diag.span();
    let message = diag.message();

    if span.is_synthetic() {
        return format!("error: {message}\n");
    }

    let path = sources
        .get(span.source)
        .map_or("<unknown>", |s| s.path.as_str());
    let mut out = format!("{path}:{}:{}: {message}\n", span.start.line, span.start.column);

    if let Some(line) = sources.line_text(span.source, span.start.line) {
        out.push_str(line);
        out.push('\n');
        let pad = (span.start.column as usize).saturating_sub(1);
        let width = if span.end.line == span.start.line && span.end.column > span.start.column {
            (span.end.column - span.start.column) as usize
        } else {
            1
        };
        out.push_str(&" ".repeat(pad));
        out.push_str(&"^".repeat(width.max(1)));
        out.push('\n');
    }
    out
}

/// A syntax error reported by the (external) parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self { message: message.into(), span }
    }
}

impl Diagnostic for ParseError {
    fn message(&self) -> String {
        self.message.clone()
    }

    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

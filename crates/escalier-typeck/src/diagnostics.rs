//! Ariadne-based rendering of type errors.
//!
//! Output is colorless for deterministic snapshots. Each diagnostic
//! carries an error code, the message, and a labeled source span; errors
//! with synthetic spans render without an excerpt.

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use escalier_common::{Diagnostic, SourceSet};

use crate::error::TypeError;

/// Stable error code per variant.
pub fn error_code(err: &TypeError) -> &'static str {
    match err {
        TypeError::UnknownType { .. } => "E0001",
        TypeError::UnknownValue { .. } => "E0002",
        TypeError::UnificationFailure { .. } => "E0003",
        TypeError::SubtypeFailure { .. } => "E0004",
        TypeError::OccursCheck { .. } => "E0005",
        TypeError::DuplicateBinding { .. } => "E0006",
        TypeError::IllegalDeclare { .. } => "E0007",
        TypeError::InvalidPattern { .. } => "E0008",
        TypeError::AmbiguousUnion { .. } => "E0009",
        TypeError::NotAFunction { .. } => "E0010",
        TypeError::ArityMismatch { .. } => "E0011",
        TypeError::NoSuchProperty { .. } => "E0012",
        TypeError::AwaitOutsideAsync { .. } => "E0013",
    }
}

/// Render a type error against its source, with a caret-labeled excerpt
/// when the span is not synthetic.
pub fn render_diagnostic(err: &TypeError, sources: &SourceSet) -> String {
    let span = err.span();
    let message = err.message();
    let code = error_code(err);

    let (path, range, text) = match (
        sources.get(span.source),
        sources.byte_range(span),
    ) {
        (Some(source), Some(range)) if !span.is_synthetic() => {
            (source.path.clone(), range, source.contents.clone())
        }
        _ => {
            // No usable position: message-only form.
            return format!("error[{code}]: {message}\n");
        }
    };

    let range = if range.is_empty() {
        range.start..(range.start + 1).min(text.len().max(1))
    } else {
        range
    };

    let config = Config::default().with_color(false);
    let report = Report::build(ReportKind::Error, range.clone())
        .with_code(code)
        .with_message(&message)
        .with_config(config)
        .with_label(
            Label::new(range)
                .with_message(label_for(err))
                .with_color(Color::Red),
        )
        .finish();

    let mut buf = Vec::new();
    let cache = Source::from(text.as_str());
    report
        .write(cache, &mut buf)
        .expect("writing a diagnostic to a buffer cannot fail");
    let body = String::from_utf8(buf).expect("diagnostic output is UTF-8");
    format!("{path}: {body}")
}

fn label_for(err: &TypeError) -> String {
    match err {
        TypeError::UnknownType { .. } => "not a known type".into(),
        TypeError::UnknownValue { .. } => "not found in this scope".into(),
        TypeError::UnificationFailure { expected, found, .. } => {
            format!("expected `{expected}`, found `{found}`")
        }
        TypeError::SubtypeFailure { expected, .. } => format!("expected `{expected}`"),
        TypeError::OccursCheck { .. } => "recursive type here".into(),
        TypeError::DuplicateBinding { name, .. } => format!("`{name}` redeclared here"),
        TypeError::IllegalDeclare { .. } => "ambient declarations have no body".into(),
        TypeError::InvalidPattern { .. } => "pattern does not fit the target".into(),
        TypeError::AmbiguousUnion { .. } => "more than one union member matches".into(),
        TypeError::NotAFunction { ty, .. } => format!("`{ty}` cannot be called"),
        TypeError::ArityMismatch { expected, .. } => {
            format!("expected {expected} argument(s)")
        }
        TypeError::NoSuchProperty { prop, .. } => format!("no property `{prop}`"),
        TypeError::AwaitOutsideAsync { .. } => "not inside an async function".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use escalier_common::{Location, Source, SourceId, Span};
    use escalier_types::Ty;

    #[test]
    fn renders_path_code_and_message() {
        let mut sources = SourceSet::new();
        sources.insert(Source::new(SourceId(0), "main.esc", "val y = 1 + \"x\"\n"));
        let err = TypeError::UnificationFailure {
            expected: Ty::num(),
            found: Ty::str(),
            origin: crate::error::ConstraintOrigin::BinOp {
                op_span: Span::new(Location::new(1, 11), Location::new(1, 12), SourceId(0)),
            },
        };
        let rendered = render_diagnostic(&err, &sources);
        assert!(rendered.starts_with("main.esc: "));
        assert!(rendered.contains("E0003"));
        assert!(rendered.contains("expected `number`, found `string`"));
    }

    #[test]
    fn synthetic_span_renders_message_only() {
        let sources = SourceSet::new();
        let err = TypeError::UnknownType { name: "T".into(), span: Span::synthetic() };
        assert_eq!(
            render_diagnostic(&err, &sources),
            "error[E0001]: unknown type `T`\n"
        );
    }
}

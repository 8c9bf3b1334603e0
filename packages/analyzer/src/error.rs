//! Error types for the structural analyzer

use std::ops::Range;
use thiserror::Error;

pub type AnalyzeResult<T> = Result<T, StructuralParseError>;

/// Malformed or unparseable markup.
///
/// Carries the offending source fragment so it can be shown to the author;
/// the input itself is never modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at byte {}: `{fragment}`", .span.start)]
pub struct StructuralParseError {
    pub message: String,
    pub span: Range<usize>,
    pub fragment: String,
}

const MAX_FRAGMENT_LEN: usize = 80;

impl StructuralParseError {
    pub fn new(message: impl Into<String>, source: &str, span: Range<usize>) -> Self {
        let start = span.start.min(source.len());
        let end = span.end.clamp(start, source.len());
        let mut fragment: String = source.get(start..end).unwrap_or_default().to_string();
        if fragment.chars().count() > MAX_FRAGMENT_LEN {
            fragment = fragment.chars().take(MAX_FRAGMENT_LEN).collect::<String>() + "...";
        }
        Self {
            message: message.into(),
            span: start..end,
            fragment,
        }
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &StructuralParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let mut output = Vec::new();
    let span = if error.span.is_empty() {
        error.span.start.saturating_sub(1)..error.span.start.max(1).min(source.len())
    } else {
        error.span.clone()
    };

    let report = Report::build(ReportKind::Error, filename, span.start)
        .with_message(&error.message)
        .with_label(
            Label::new((filename, span))
                .with_color(Color::Red)
                .with_message(&error.message),
        )
        .finish();

    if report
        .write((filename, Source::from(source)), &mut output)
        .is_err()
    {
        return error.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| error.to_string())
}

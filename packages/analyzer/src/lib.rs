//! # Tessera Analyzer
//!
//! Parses an arbitrary HTML fragment into a Tessera element tree and
//! reports what an author can turn into a reusable block type: content
//! fields, CSS classes, repeating sibling groups, element count and depth.
//!
//! Parsing is strict. Unbalanced markup fails with a
//! [`StructuralParseError`] that names the offending fragment; nothing is
//! silently repaired.

mod analyzer;
mod classify;
pub mod dom;
mod error;
mod fields;
pub mod lexer;

pub use analyzer::{analyze, AnalysisReport, Analyzer, GENERATED_CLASS_PREFIX, GENERATED_STYLE_ATTRIBUTE};
pub use classify::classify;
pub use error::{AnalyzeResult, StructuralParseError};
pub use fields::{detect_content_fields, detect_repeaters, strip_tags, ContentField, Repeater};

#[cfg(feature = "pretty-errors")]
pub use error::format_error;

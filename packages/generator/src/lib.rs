//! # Tessera Generator
//!
//! Builds a dedicated block type from a piece of imported HTML.
//!
//! ```text
//! Analyze ──▶ Configure ──▶ Preview ──▶ Save
//!   │            │             │          │
//!   │            │             │          └─ register template + schema
//!   │            │             └─ ${content.*} / ${settings.*} substitution
//!   │            └─ name, icon, rename / retype / remove fields
//!   └─ structural analyzer: tree + detected content fields
//! ```
//!
//! Only the fields the author keeps stay editable; everything else in the
//! markup becomes fixed boilerplate of the generated template.

mod draft;
mod error;
mod slug;

pub use draft::{
    suggest_icon, BlockDraft, BlockGenerator, DraftField, CSS_CLASS_SETTING, GENERATED_CATEGORY,
    GENERATED_WRAPPER_CLASS,
};
pub use error::{GeneratorError, GeneratorResult};
pub use slug::{is_field_name, type_slug};

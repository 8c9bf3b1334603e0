//! # Tessera Document
//!
//! The block/element data model shared by every other Tessera crate.
//!
//! A [`Document`] owns an ordered list of [`Block`]s. Each block is either
//! LOCKED (its `compiledHtml` cache is authoritative) or EDITING (its
//! structured [`ElementTree`] is authoritative). This crate only knows how
//! to hold, validate and reorder that data; compiling and analyzing markup
//! live in `tessera-compiler-*` and `tessera-analyzer`.
//!
//! ```rust,ignore
//! use tessera_document::{Document, InMemoryRegistry};
//!
//! let registry = InMemoryRegistry::with_builtins();
//! let mut doc = Document::new("product-42");
//! doc.insert_block(&registry, "heading", 0)?;
//! doc.insert_block(&registry, "text", 1)?;
//! doc.move_block(1, 0)?;
//! ```

mod block;
mod document;
mod element;
mod error;
mod events;
mod id_generator;
mod limits;
mod palette;
mod registry;
mod reorder;
mod style;
mod template;
mod tree;
pub mod visitor;

pub use block::{Block, BlockMeta, BlockState};
pub use document::Document;
pub use element::{ClassList, Element, ElementType};
pub use error::{DocumentError, DocumentResult};
pub use events::DocumentEvent;
pub use id_generator::{get_document_id, IdGenerator};
pub use limits::Limits;
pub use registry::{BlockRegistry, BlockTypeDefinition, FieldKind, FieldSchema, InMemoryRegistry};
pub use reorder::{BlockMove, Placement};
pub use style::{Breakpoint, StyleMap, StyleState};
pub use template::{render_template, value_to_text, TemplateOutput, TemplateWarning};
pub use tree::ElementTree;

//! # Tessera Editor
//!
//! Edit-session engine for block documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ analyzer: imported HTML → element tree      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: block lifecycle + mutations         │
//! │  - LOCKED ⇄ EDITING state machine           │
//! │  - Validated element mutations              │
//! │  - Per-session undo/redo                    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compiler: element tree → { html, css }      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tessera_editor::{EditSession, Mutation};
//!
//! let mut session = EditSession::new(document, InMemoryRegistry::with_builtins())?;
//! session.unfreeze(0)?;
//! session.apply(Mutation::UpdateContent {
//!     element_id: "blk-3".to_string(),
//!     content: "New headline".to_string(),
//! })?;
//! session.freeze(0, true)?;
//! ```

mod errors;
mod mutations;
mod session;
mod undo_stack;

pub use errors::{EditorError, EditorResult};
pub use mutations::{Mutation, MutationError, MutationResult};
pub use session::EditSession;
pub use undo_stack::{MutationBatch, UndoStack};

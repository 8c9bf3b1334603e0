//! # Edit Session
//!
//! Owns a [`Document`] together with its block registry and drives the
//! LOCKED ⇄ EDITING state machine of its blocks.
//!
//! At most one block is EDITING at a time. The active block is tracked by
//! id, so moving blocks around never loses it. Entering EDITING takes a
//! snapshot of the element tree; leaving it either recompiles the cache
//! (commit) or restores the snapshot (cancel).

use crate::errors::{EditorError, EditorResult};
use crate::mutations::Mutation;
use crate::undo_stack::UndoStack;
use std::collections::{BTreeMap, HashSet};
use tessera_analyzer::Analyzer;
use tessera_compiler_css::StyleResolver;
use tessera_compiler_html::{compile, render_preview, PreviewDocument, PreviewOptions};
use tessera_document::{
    Block, BlockRegistry, Breakpoint, Document, DocumentError, DocumentEvent, Element, ElementTree, ElementType,
    IdGenerator, StyleState,
};
use tracing::{debug, info, instrument, warn};

/// State kept only while a block is EDITING
#[derive(Debug)]
struct ActiveBlock {
    block_id: String,
    snapshot: ElementTree,
    history: UndoStack,
    selected_element: Option<String>,
}

pub struct EditSession<R: BlockRegistry> {
    document: Document,
    registry: R,
    active: Option<ActiveBlock>,
    selected_block: Option<String>,
}

impl<R: BlockRegistry> EditSession<R> {
    /// Start a session over `document`.
    ///
    /// A persisted document may hold several unlocked blocks; the first one
    /// stays EDITING and the others are frozen with commit.
    pub fn new(document: Document, registry: R) -> EditorResult<Self> {
        let mut session = Self {
            document,
            registry,
            active: None,
            selected_block: None,
        };

        let unlocked: Vec<String> = session
            .document
            .blocks()
            .iter()
            .filter(|b| !b.locked)
            .map(|b| b.id.clone())
            .collect();

        if let Some((first, rest)) = unlocked.split_first() {
            for id in rest {
                warn!(block_id = %id, "Freezing extra unlocked block");
                session.commit_block(id)?;
            }
            let index = session.require_index(first)?;
            session.enter_editing(index)?;
        }
        session.document.take_events();
        Ok(session)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        self.document.take_events()
    }

    pub fn active_block_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.block_id.as_str())
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_block_id().and_then(|id| self.document.index_of(id))
    }

    pub fn selected_block_id(&self) -> Option<&str> {
        self.selected_block.as_deref()
    }

    pub fn selected_element(&self) -> Option<&str> {
        self.active.as_ref().and_then(|a| a.selected_element.as_deref())
    }

    /// The element tree of the EDITING block
    pub fn active_tree(&self) -> Option<&ElementTree> {
        let id = self.active_block_id()?;
        self.document.block_by_id(id)?.document.as_ref()
    }

    fn require_index(&self, block_id: &str) -> EditorResult<usize> {
        self.document
            .index_of(block_id)
            .ok_or_else(|| DocumentError::BlockNotFound(block_id.to_string()).into())
    }

    fn block_at(&self, index: usize) -> EditorResult<&Block> {
        self.document
            .block(index)
            .ok_or_else(|| DocumentError::index(index, self.document.len()).into())
    }

    // ---- block operations -------------------------------------------------

    /// Insert a block of `block_type`. A type without a static template
    /// starts EDITING and becomes the active block.
    pub fn insert_block(&mut self, block_type: &str, index: usize) -> EditorResult<String> {
        let id = self.document.insert_block(&self.registry, block_type, index)?;
        let index = self.require_index(&id)?;
        if !self.block_at(index)?.locked {
            if let Some(active) = self.active_block_id().map(str::to_string) {
                self.commit_block(&active)?;
            }
            self.enter_editing(index)?;
        }
        Ok(id)
    }

    pub fn remove_block(&mut self, index: usize) -> EditorResult<Block> {
        let block = self.document.remove_block(index)?;
        if self.active_block_id() == Some(block.id.as_str()) {
            debug!(block_id = %block.id, "Removed the active block");
            self.active = None;
        }
        if self.selected_block.as_deref() == Some(block.id.as_str()) {
            self.selected_block = None;
        }
        Ok(block)
    }

    /// Duplicate the block at `index`. The copy starts LOCKED; when it has
    /// an element tree its cache is recompiled so it carries its own
    /// namespace classes.
    pub fn duplicate_block(&mut self, index: usize) -> EditorResult<String> {
        let id = self.document.duplicate_block(index)?;
        if let Some(copy) = self.document.block_by_id_mut(&id) {
            if let Some(tree) = &copy.document {
                copy.compiled_html = Some(compile(&copy.id, tree).cache_string());
            }
        }
        Ok(id)
    }

    pub fn move_block(&mut self, from: usize, drop: usize) -> EditorResult<usize> {
        Ok(self.document.move_block(from, drop)?)
    }

    pub fn move_block_up(&mut self, index: usize) -> EditorResult<usize> {
        Ok(self.document.move_block_up(index)?)
    }

    pub fn move_block_down(&mut self, index: usize) -> EditorResult<usize> {
        Ok(self.document.move_block_down(index)?)
    }

    pub fn reorder(&mut self, order: &[usize]) -> EditorResult<()> {
        Ok(self.document.reorder(order)?)
    }

    /// Repair duplicate ids. The active block's history refers to element
    /// ids, so it is dropped when anything was rewritten.
    pub fn reindex(&mut self) -> usize {
        let repaired = self.document.reindex();
        if repaired > 0 {
            if let Some(active) = self.active.as_mut() {
                active.history.clear();
                active.selected_element = None;
            }
        }
        repaired
    }

    pub fn select_block(&mut self, index: usize) -> EditorResult<()> {
        let id = self.block_at(index)?.id.clone();
        self.selected_block = Some(id.clone());
        self.document.emit(DocumentEvent::BlockSelected { block_id: id });
        Ok(())
    }

    // ---- lifecycle --------------------------------------------------------

    /// LOCKED → EDITING.
    ///
    /// A block without an element tree gets one synthesized from its cache
    /// by the analyzer; if that fails the block stays LOCKED and the active
    /// block keeps editing. Otherwise any other EDITING block is committed
    /// first. Selection moves to the block and its root element.
    /// Unfreezing the active block again is a no-op.
    #[instrument(skip(self))]
    pub fn unfreeze(&mut self, index: usize) -> EditorResult<()> {
        let id = self.block_at(index)?.id.clone();
        if self.active_block_id() == Some(id.as_str()) {
            return Ok(());
        }
        let synthesized = self.synthesize_tree(index)?;
        if let Some(active) = self.active_block_id().map(str::to_string) {
            self.commit_block(&active)?;
        }
        let index = self.require_index(&id)?;
        self.enter_editing_with(index, synthesized)
    }

    /// The tree a block needs before it can enter EDITING, or `None` when it
    /// already has one. Leaves the document untouched.
    fn synthesize_tree(&self, index: usize) -> EditorResult<Option<ElementTree>> {
        let block = self.block_at(index)?;
        if block.document.is_some() {
            return Ok(None);
        }
        let tree = match &block.compiled_html {
            Some(html) => {
                let report = Analyzer::new()
                    .with_limits(*self.document.limits())
                    .with_id_seed(block.id.clone())
                    .analyze(html)
                    .map_err(|err| {
                        warn!(block_id = %block.id, error = %err, "Block markup cannot be edited in place");
                        err
                    })?;
                debug!(block_id = %block.id, elements = report.element_count, "Synthesized element tree");
                report.tree
            }
            None => ElementTree::new(Element::fragment(format!("{}-1", block.id))),
        };
        Ok(Some(tree))
    }

    fn enter_editing(&mut self, index: usize) -> EditorResult<()> {
        let synthesized = self.synthesize_tree(index)?;
        self.enter_editing_with(index, synthesized)
    }

    fn enter_editing_with(&mut self, index: usize, synthesized: Option<ElementTree>) -> EditorResult<()> {
        let block = self
            .document
            .block_mut(index)
            .ok_or_else(|| DocumentError::index(index, 0))?;

        if let Some(tree) = synthesized {
            block.document = Some(tree);
        }
        block.locked = false;
        let snapshot = block.document.clone().unwrap_or_else(|| ElementTree::new(Element::fragment("")));
        let block_id = block.id.clone();
        let root_id = snapshot.root.id.clone();

        info!(block_id = %block_id, "Block entered editing");
        if self.selected_block.as_deref() != Some(block_id.as_str()) {
            self.selected_block = Some(block_id.clone());
            self.document.emit(DocumentEvent::BlockSelected {
                block_id: block_id.clone(),
            });
        }
        self.active = Some(ActiveBlock {
            block_id: block_id.clone(),
            snapshot,
            history: UndoStack::new(),
            selected_element: Some(root_id),
        });
        self.document.emit(DocumentEvent::BlockEnteredEditing { block_id });
        Ok(())
    }

    /// EDITING → LOCKED for the block at `index`.
    ///
    /// With `commit` the cache is recompiled from the tree, unless the tree
    /// still equals the unfreeze snapshot and a cache exists, in which case
    /// the cache is kept byte-for-byte. Without `commit` the tree is
    /// restored from the snapshot and the cache is left alone; it is only
    /// compiled when the block never had one.
    #[instrument(skip(self))]
    pub fn freeze(&mut self, index: usize, commit: bool) -> EditorResult<()> {
        let id = self.block_at(index)?.id.clone();
        if self.active_block_id() != Some(id.as_str()) {
            return Err(EditorError::NotEditing(id));
        }
        if commit {
            self.commit_block(&id)
        } else {
            self.cancel_block(&id)
        }
    }

    /// Freeze the active block, if any
    pub fn freeze_active(&mut self, commit: bool) -> EditorResult<()> {
        let index = self.active_index().ok_or(EditorError::NoActiveBlock)?;
        self.freeze(index, commit)
    }

    fn commit_block(&mut self, block_id: &str) -> EditorResult<()> {
        let active = self.take_active_for(block_id);
        let block = self
            .document
            .block_by_id_mut(block_id)
            .ok_or_else(|| DocumentError::BlockNotFound(block_id.to_string()))?;

        let unchanged = match (&active, &block.document) {
            (Some(active), Some(tree)) => *tree == active.snapshot,
            _ => false,
        };
        if unchanged && block.compiled_html.is_some() {
            debug!(block_id, "Tree unchanged, keeping cache");
        } else if let Some(tree) = &block.document {
            block.compiled_html = Some(compile(&block.id, tree).cache_string());
        }
        block.locked = true;

        info!(block_id, "Block committed");
        self.document.emit(DocumentEvent::BlockLeftEditing {
            block_id: block_id.to_string(),
            committed: true,
        });
        self.document.emit(DocumentEvent::DocumentChanged);
        Ok(())
    }

    fn cancel_block(&mut self, block_id: &str) -> EditorResult<()> {
        let active = self.take_active_for(block_id);
        let block = self
            .document
            .block_by_id_mut(block_id)
            .ok_or_else(|| DocumentError::BlockNotFound(block_id.to_string()))?;

        if let Some(active) = active {
            block.document = Some(active.snapshot);
        }
        if block.compiled_html.is_none() {
            if let Some(tree) = &block.document {
                block.compiled_html = Some(compile(&block.id, tree).cache_string());
            }
        }
        block.locked = true;

        info!(block_id, "Block edit cancelled");
        self.document.emit(DocumentEvent::BlockLeftEditing {
            block_id: block_id.to_string(),
            committed: false,
        });
        Ok(())
    }

    fn take_active_for(&mut self, block_id: &str) -> Option<ActiveBlock> {
        match &self.active {
            Some(active) if active.block_id == block_id => self.active.take(),
            _ => None,
        }
    }

    // ---- element editing --------------------------------------------------

    fn active_parts(&mut self) -> EditorResult<(&mut ActiveBlock, &mut ElementTree, tessera_document::Limits)> {
        let limits = *self.document.limits();
        let active = self.active.as_mut().ok_or(EditorError::NoActiveBlock)?;
        let block = self
            .document
            .block_by_id_mut(&active.block_id)
            .ok_or_else(|| DocumentError::BlockNotFound(active.block_id.clone()))?;
        let tree = block
            .document
            .as_mut()
            .ok_or_else(|| EditorError::NotEditing(active.block_id.clone()))?;
        Ok((active, tree, limits))
    }

    pub fn select_element(&mut self, element_id: &str) -> EditorResult<()> {
        let (active, tree, _) = self.active_parts()?;
        if !tree.contains(element_id) {
            return Err(DocumentError::ElementNotFound(element_id.to_string()).into());
        }
        active.selected_element = Some(element_id.to_string());
        Ok(())
    }

    /// Apply one mutation to the active block and record it in the history
    pub fn apply(&mut self, mutation: Mutation) -> EditorResult<()> {
        let (active, tree, limits) = self.active_parts()?;
        active.history.apply(&mutation, tree, &limits)?;
        debug!(mutation = mutation.name(), element = mutation.element_id(), "Applied mutation");

        if let Some(selected) = active.selected_element.as_deref() {
            if !tree.contains(selected) {
                active.selected_element = None;
            }
        }
        self.document.emit(DocumentEvent::DocumentChanged);
        Ok(())
    }

    /// Apply several mutations as one undo step; if any fails the earlier
    /// ones are rolled back and the error is returned.
    pub fn apply_batch(&mut self, mutations: Vec<Mutation>, description: &str) -> EditorResult<()> {
        let (active, tree, limits) = self.active_parts()?;
        active.history.begin_batch();
        active.history.set_batch_description(description);
        for mutation in &mutations {
            if let Err(err) = active.history.apply(mutation, tree, &limits) {
                active.history.abort_batch(tree, &limits)?;
                return Err(err.into());
            }
        }
        active.history.end_batch();
        self.document.emit(DocumentEvent::DocumentChanged);
        Ok(())
    }

    fn taken_element_ids(&self) -> HashSet<String> {
        self.document
            .blocks()
            .iter()
            .filter_map(|b| b.document.as_ref())
            .flat_map(|tree| tree.ids())
            .collect()
    }

    fn element_ids(&self) -> EditorResult<IdGenerator> {
        let id = self.active_block_id().ok_or(EditorError::NoActiveBlock)?;
        Ok(IdGenerator::from_seed(id))
    }

    /// Add a palette element of `kind` under `parent_id`. Returns the new element id.
    pub fn add_element(&mut self, kind: ElementType, parent_id: &str, index: usize) -> EditorResult<String> {
        let id = self.element_ids()?.next_unused(&self.taken_element_ids());
        self.apply(Mutation::AddElement {
            parent_id: parent_id.to_string(),
            index,
            element: Element::from_palette(kind, id.clone()),
        })?;
        Ok(id)
    }

    /// Duplicate an element next to itself. Returns the copy's id.
    pub fn duplicate_element(&mut self, element_id: &str) -> EditorResult<String> {
        let mut ids = self.element_ids()?;
        let taken = self.taken_element_ids();
        let tree = self.active_tree().ok_or(EditorError::NoActiveBlock)?;
        let copy = Mutation::prepare_copy(tree, element_id, &mut ids, &taken)?;
        let copy_id = copy.id.clone();
        self.apply(Mutation::DuplicateElement {
            element_id: element_id.to_string(),
            copy,
        })?;
        Ok(copy_id)
    }

    pub fn undo(&mut self) -> EditorResult<bool> {
        let (active, tree, limits) = self.active_parts()?;
        let undone = active.history.undo(tree, &limits)?;
        if undone {
            self.document.emit(DocumentEvent::DocumentChanged);
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        let (active, tree, limits) = self.active_parts()?;
        let redone = active.history.redo(tree, &limits)?;
        if redone {
            self.document.emit(DocumentEvent::DocumentChanged);
        }
        Ok(redone)
    }

    pub fn can_undo(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.history.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.history.can_redo())
    }

    // ---- queries ----------------------------------------------------------

    /// Effective styles of an element in the active block for one slot,
    /// including the block type's defaults
    pub fn computed_style(
        &self,
        element_id: &str,
        state: StyleState,
        breakpoint: Breakpoint,
    ) -> EditorResult<BTreeMap<String, String>> {
        let block_id = self.active_block_id().ok_or(EditorError::NoActiveBlock)?;
        let block = self
            .document
            .block_by_id(block_id)
            .ok_or_else(|| DocumentError::BlockNotFound(block_id.to_string()))?;
        let element = block
            .document
            .as_ref()
            .and_then(|tree| tree.find(element_id))
            .ok_or_else(|| DocumentError::ElementNotFound(element_id.to_string()))?;

        let resolver = match self.registry.get(&block.block_type) {
            Some(definition) => StyleResolver::with_block_type(definition),
            None => StyleResolver::new(),
        };
        Ok(resolver.computed(element, state, breakpoint))
    }

    pub fn preview(&self, options: &PreviewOptions) -> PreviewDocument {
        render_preview(&self.document, &self.registry, options)
    }

    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_document::InMemoryRegistry;

    fn session() -> EditSession<InMemoryRegistry> {
        let mut doc = Document::new("test");
        let registry = InMemoryRegistry::with_builtins();
        doc.insert_block(&registry, "heading", 0).unwrap();
        doc.insert_block(&registry, "text", 1).unwrap();
        EditSession::new(doc, registry).unwrap()
    }

    #[test]
    fn test_session_creation() {
        let session = session();
        assert_eq!(session.document().len(), 2);
        assert!(session.active_block_id().is_none());
        assert!(session.selected_element().is_none());
    }

    #[test]
    fn test_mutations_need_an_active_block() {
        let mut session = session();
        let result = session.apply(Mutation::ToggleVisibility {
            element_id: "x".to_string(),
        });
        assert!(matches!(result, Err(EditorError::NoActiveBlock)));
    }

    #[test]
    fn test_unfreeze_moves_selection_into_block() {
        let mut session = session();
        session.unfreeze(0).unwrap();

        let id = session.document().blocks()[0].id.clone();
        assert_eq!(session.active_block_id(), Some(id.as_str()));
        assert!(!session.document().blocks()[0].locked);

        let root = session.active_tree().unwrap().root.id.clone();
        assert_eq!(root, format!("{}-1", id));
        assert_eq!(session.selected_block_id(), Some(id.as_str()));
        assert_eq!(session.selected_element(), Some(root.as_str()));

        session.unfreeze(1).unwrap();
        let second = session.document().blocks()[1].id.clone();
        assert_eq!(session.selected_block_id(), Some(second.as_str()));
        assert_eq!(
            session.take_events().first(),
            Some(&DocumentEvent::BlockSelected { block_id: id })
        );
    }

    #[test]
    fn test_freeze_requires_editing() {
        let mut session = session();
        assert!(matches!(session.freeze(1, true), Err(EditorError::NotEditing(_))));
        assert!(matches!(session.freeze_active(true), Err(EditorError::NoActiveBlock)));
    }
}

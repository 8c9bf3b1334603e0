//! Per-session undo/redo history.
//!
//! Every mutation is validated and its inverse captured against the tree
//! *before* it is applied. Undoing replays the inverses newest first;
//! redoing replays the forward mutations in order. A batch groups several
//! mutations into one step. History belongs to a single edit session of a
//! single block and is dropped when that block leaves EDITING.

use crate::mutations::{Mutation, MutationError};
use std::collections::VecDeque;
use tessera_document::{ElementTree, Limits};

const DEFAULT_MAX_LEVELS: usize = 100;

/// One undo step
#[derive(Debug, Clone, Default)]
pub struct MutationBatch {
    /// Forward mutations in application order
    pub mutations: Vec<Mutation>,
    /// Inverses, newest first
    pub inverses: Vec<Mutation>,
    pub description: Option<String>,
}

impl MutationBatch {
    fn record(&mut self, mutation: &Mutation, inverse: Mutation) {
        self.mutations.push(mutation.clone());
        self.inverses.insert(0, inverse);
    }

    fn revert(&self, tree: &mut ElementTree, limits: &Limits) -> Result<(), MutationError> {
        self.inverses.iter().try_for_each(|inverse| inverse.apply(tree, limits))
    }

    fn replay(&self, tree: &mut ElementTree, limits: &Limits) -> Result<(), MutationError> {
        self.mutations.iter().try_for_each(|mutation| mutation.apply(tree, limits))
    }
}

#[derive(Debug)]
pub struct UndoStack {
    done: VecDeque<MutationBatch>,
    undone: Vec<MutationBatch>,
    /// 0 keeps everything
    max_levels: usize,
    open_batch: Option<MutationBatch>,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_MAX_LEVELS)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            done: VecDeque::new(),
            undone: Vec::new(),
            max_levels,
            open_batch: None,
        }
    }

    /// Apply `mutation` to `tree` and record it. Nothing is recorded when
    /// validation fails.
    pub fn apply(&mut self, mutation: &Mutation, tree: &mut ElementTree, limits: &Limits) -> Result<(), MutationError> {
        mutation.validate(tree, limits)?;
        let inverse = mutation.to_inverse(tree)?;
        mutation.apply(tree, limits)?;

        match self.open_batch.as_mut() {
            Some(batch) => batch.record(mutation, inverse),
            None => {
                let mut batch = MutationBatch::default();
                batch.record(mutation, inverse);
                self.push(batch);
            }
        }
        Ok(())
    }

    /// Group the following mutations into one step until [`end_batch`](Self::end_batch)
    pub fn begin_batch(&mut self) {
        self.open_batch = Some(MutationBatch::default());
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = self.open_batch.as_mut() {
            batch.description = Some(description.into());
        }
    }

    pub fn end_batch(&mut self) {
        if let Some(batch) = self.open_batch.take().filter(|b| !b.mutations.is_empty()) {
            self.push(batch);
        }
    }

    /// Revert everything applied since [`begin_batch`](Self::begin_batch) and forget it
    pub fn abort_batch(&mut self, tree: &mut ElementTree, limits: &Limits) -> Result<(), MutationError> {
        match self.open_batch.take() {
            Some(batch) => batch.revert(tree, limits),
            None => Ok(()),
        }
    }

    fn push(&mut self, batch: MutationBatch) {
        self.done.push_back(batch);
        if self.max_levels > 0 && self.done.len() > self.max_levels {
            self.done.pop_front();
        }
        self.undone.clear();
    }

    /// Revert the newest step. `false` when there is nothing to undo.
    pub fn undo(&mut self, tree: &mut ElementTree, limits: &Limits) -> Result<bool, MutationError> {
        let Some(batch) = self.done.pop_back() else {
            return Ok(false);
        };
        batch.revert(tree, limits)?;
        self.undone.push(batch);
        Ok(true)
    }

    /// Replay the newest undone step. `false` when there is nothing to redo.
    pub fn redo(&mut self, tree: &mut ElementTree, limits: &Limits) -> Result<bool, MutationError> {
        let Some(batch) = self.undone.pop() else {
            return Ok(false);
        };
        batch.replay(tree, limits)?;
        self.done.push_back(batch);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.done.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.undone.len()
    }

    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
        self.open_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.done.back().and_then(|b| b.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.undone.last().and_then(|b| b.description.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_document::{Element, ElementType};

    fn tree() -> ElementTree {
        ElementTree::new(
            Element::fragment("b-1").with_child(Element::new("b-2", ElementType::Heading, "h2").with_content("Hello")),
        )
    }

    fn update(content: &str) -> Mutation {
        Mutation::UpdateContent {
            element_id: "b-2".to_string(),
            content: content.to_string(),
        }
    }

    fn content(tree: &ElementTree) -> &str {
        &tree.find("b-2").unwrap().content
    }

    #[test]
    fn test_apply_undo_redo() {
        let mut tree = tree();
        let limits = Limits::default();
        let mut stack = UndoStack::new();

        stack.apply(&update("World"), &mut tree, &limits).unwrap();
        assert_eq!(content(&tree), "World");
        assert_eq!(stack.undo_levels(), 1);

        assert!(stack.undo(&mut tree, &limits).unwrap());
        assert_eq!(content(&tree), "Hello");
        assert!(stack.can_redo());

        assert!(stack.redo(&mut tree, &limits).unwrap());
        assert_eq!(content(&tree), "World");
        assert!(!stack.redo(&mut tree, &limits).unwrap());
    }

    #[test]
    fn test_batched_mutations() {
        let mut tree = tree();
        let limits = Limits::default();
        let mut stack = UndoStack::new();

        stack.begin_batch();
        stack.set_batch_description("Rewrite heading");
        stack.apply(&update("One"), &mut tree, &limits).unwrap();
        stack.apply(&update("Two"), &mut tree, &limits).unwrap();
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Rewrite heading"));

        stack.undo(&mut tree, &limits).unwrap();
        assert_eq!(content(&tree), "Hello");
    }

    #[test]
    fn test_abort_batch_rolls_back() {
        let mut tree = tree();
        let limits = Limits::default();
        let mut stack = UndoStack::new();

        stack.begin_batch();
        stack.apply(&update("One"), &mut tree, &limits).unwrap();
        stack.abort_batch(&mut tree, &limits).unwrap();

        assert_eq!(content(&tree), "Hello");
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_max_levels() {
        let mut tree = tree();
        let limits = Limits::default();
        let mut stack = UndoStack::with_max_levels(3);

        for i in 0..5 {
            stack.apply(&update(&i.to_string()), &mut tree, &limits).unwrap();
        }
        assert_eq!(stack.undo_levels(), 3);

        while stack.undo(&mut tree, &limits).unwrap() {}
        assert_eq!(content(&tree), "1");
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut tree = tree();
        let limits = Limits::default();
        let mut stack = UndoStack::new();

        stack.apply(&update("A"), &mut tree, &limits).unwrap();
        stack.undo(&mut tree, &limits).unwrap();
        stack.apply(&update("B"), &mut tree, &limits).unwrap();

        assert!(!stack.can_redo());
    }
}

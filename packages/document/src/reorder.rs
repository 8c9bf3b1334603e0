//! Block-level and element-level moves.
//!
//! Block moves use drop indices: the position of the drop indicator between
//! existing blocks, from `0` (before the first block) to `len` (after the
//! last one). Element moves detach a subtree and splice it into a new parent
//! after an ancestor-walk cycle check.

use crate::element::Element;
use crate::error::{DocumentError, DocumentResult};
use crate::tree::ElementTree;
use serde::{Deserialize, Serialize};

/// A block move from `from` to the drop indicator at `drop`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMove {
    pub from: usize,
    pub drop: usize,
}

impl BlockMove {
    pub fn new(from: usize, drop: usize) -> Self {
        Self { from, drop }
    }

    /// Dropping directly before or after the block leaves it where it is
    pub fn is_noop(&self) -> bool {
        self.drop == self.from || self.drop == self.from + 1
    }

    /// Final index of the moved block
    pub fn landing_index(&self) -> usize {
        if self.is_noop() {
            self.from
        } else if self.drop > self.from {
            self.drop - 1
        } else {
            self.drop
        }
    }

    /// The move that puts the block back where it came from
    pub fn inverse(&self) -> BlockMove {
        if self.is_noop() {
            return *self;
        }
        let landing = self.landing_index();
        let drop = if landing > self.from {
            self.from
        } else {
            self.from + 1
        };
        BlockMove::new(landing, drop)
    }

    pub fn validate(&self, len: usize) -> DocumentResult<()> {
        if self.from >= len {
            return Err(DocumentError::index(self.from, len));
        }
        if self.drop > len {
            return Err(DocumentError::index(self.drop, len));
        }
        Ok(())
    }

    /// Apply to any ordered list. Returns the landing index.
    pub fn apply<T>(&self, items: &mut Vec<T>) -> DocumentResult<usize> {
        self.validate(items.len())?;
        if self.is_noop() {
            return Ok(self.from);
        }
        let item = items.remove(self.from);
        let landing = self.landing_index();
        items.insert(landing, item);
        Ok(landing)
    }
}

/// Where to put an element relative to a drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Before,
    After,
    Inside,
}

impl ElementTree {
    /// Check that `element_id` may be moved under `new_parent_id` without mutating anything
    pub fn check_move(&self, element_id: &str, new_parent_id: &str) -> DocumentResult<()> {
        let element = self
            .find(element_id)
            .ok_or_else(|| DocumentError::ElementNotFound(element_id.to_string()))?;
        let parent = self
            .find(new_parent_id)
            .ok_or_else(|| DocumentError::ElementNotFound(new_parent_id.to_string()))?;

        if new_parent_id == element_id || self.is_descendant_of(new_parent_id, element_id) {
            return Err(DocumentError::cycle(element_id, new_parent_id));
        }
        if self.is_root(element_id) {
            return Err(DocumentError::RootElement(element_id.to_string()));
        }
        if element.locked {
            return Err(DocumentError::ElementLocked(element_id.to_string()));
        }
        if !parent.accepts_children() {
            return Err(DocumentError::InvalidParent(new_parent_id.to_string()));
        }
        Ok(())
    }

    /// Move `element_id` (with its subtree) into `new_parent_id` at `position`.
    ///
    /// `position` indexes the new parent's children after the element has
    /// been detached and is clamped to the child count.
    pub fn move_element(&mut self, element_id: &str, new_parent_id: &str, position: usize) -> DocumentResult<()> {
        self.check_move(element_id, new_parent_id)?;
        let element = self.remove(element_id)?;
        self.insert(new_parent_id, position, element)
    }

    /// Move `element_id` before, after or inside `target_id`
    pub fn move_element_relative(
        &mut self,
        element_id: &str,
        target_id: &str,
        placement: Placement,
    ) -> DocumentResult<()> {
        if placement == Placement::Inside {
            return self.move_element(element_id, target_id, usize::MAX);
        }

        if element_id == target_id {
            return Err(DocumentError::cycle(element_id, target_id));
        }
        let parent_id = match self.parent_of(target_id) {
            Some(parent) => parent.id.clone(),
            None if self.contains(target_id) => {
                return Err(DocumentError::RootElement(target_id.to_string()))
            }
            None => return Err(DocumentError::ElementNotFound(target_id.to_string())),
        };
        self.check_move(element_id, &parent_id)?;

        let element = self.remove(element_id)?;
        let index = sibling_index(self, &parent_id, target_id);
        let position = match placement {
            Placement::After => index + 1,
            _ => index,
        };
        self.insert(&parent_id, position, element)
    }
}

fn sibling_index(tree: &ElementTree, parent_id: &str, target_id: &str) -> usize {
    tree.find(parent_id)
        .and_then(|parent| parent.children.iter().position(|c: &Element| c.id == target_id))
        .unwrap_or(0)
}

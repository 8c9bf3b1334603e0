use crate::block::{Block, BlockMeta};
use crate::element::Element;
use crate::error::{DocumentError, DocumentResult};
use crate::events::DocumentEvent;
use crate::id_generator::IdGenerator;
use crate::limits::Limits;
use crate::registry::{BlockRegistry, BlockTypeDefinition};
use crate::reorder::BlockMove;
use crate::tree::{assign_fresh_ids, ElementTree};
use crate::visitor::{walk_element_mut, VisitorMut};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Ordered list of blocks; insertion order is render order.
///
/// Every mutating operation validates its arguments before touching the
/// block list, so a failed call never leaves a partial change behind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
    #[serde(skip)]
    ids: IdGenerator,
    #[serde(skip)]
    limits: Limits,
    #[serde(skip)]
    events: Vec<DocumentEvent>,
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.blocks == other.blocks
    }
}

impl Document {
    /// Create an empty document; `name` seeds generated block ids
    pub fn new(name: &str) -> Self {
        Self {
            blocks: Vec::new(),
            ids: IdGenerator::new(name),
            limits: Limits::default(),
            events: Vec::new(),
        }
    }

    pub fn from_blocks(name: &str, blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            ..Self::new(name)
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let doc: Document = serde_json::from_str(json)?;
        debug!(blocks = doc.blocks.len(), "Loaded document");
        Ok(doc)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    pub fn block_by_id(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_by_id_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn emit(&mut self, event: DocumentEvent) {
        self.events.push(event);
    }

    /// Drain queued events in emission order
    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    fn changed(&mut self) {
        self.emit(DocumentEvent::DocumentChanged);
    }

    fn next_block_id(&mut self) -> String {
        let taken: HashSet<String> = self.blocks.iter().map(|b| b.id.clone()).collect();
        self.ids.next_unused(&taken)
    }

    fn element_ids(&self) -> HashSet<String> {
        self.blocks
            .iter()
            .filter_map(|b| b.document.as_ref())
            .flat_map(|tree| tree.ids())
            .collect()
    }

    /// Instantiate a block of `block_type` at `index` (`0..=len`). Returns its id.
    #[instrument(skip(self, registry), fields(blocks = self.blocks.len()))]
    pub fn insert_block(&mut self, registry: &dyn BlockRegistry, block_type: &str, index: usize) -> DocumentResult<String> {
        if index > self.blocks.len() {
            return Err(DocumentError::index(index, self.blocks.len()));
        }
        self.limits.check_blocks(self.blocks.len() + 1)?;
        let definition = registry
            .get(block_type)
            .ok_or_else(|| DocumentError::UnknownBlockType(block_type.to_string()))?;

        let id = self.next_block_id();
        let block = instantiate(definition, id.clone());
        info!(block_id = %id, locked = block.locked, "Inserted block");

        self.blocks.insert(index, block);
        self.changed();
        Ok(id)
    }

    /// Insert an already-built block, e.g. one holding imported markup
    pub fn insert_existing(&mut self, index: usize, mut block: Block) -> DocumentResult<String> {
        if index > self.blocks.len() {
            return Err(DocumentError::index(index, self.blocks.len()));
        }
        self.limits.check_blocks(self.blocks.len() + 1)?;
        if block.id.is_empty() || self.index_of(&block.id).is_some() {
            block.id = self.next_block_id();
        }
        let id = block.id.clone();
        self.blocks.insert(index, block);
        self.changed();
        Ok(id)
    }

    pub fn remove_block(&mut self, index: usize) -> DocumentResult<Block> {
        if index >= self.blocks.len() {
            return Err(DocumentError::index(index, self.blocks.len()));
        }
        let block = self.blocks.remove(index);
        info!(block_id = %block.id, index, "Removed block");
        self.changed();
        Ok(block)
    }

    /// Deep-copy the block at `index` directly after it with fresh ids.
    ///
    /// The copy starts LOCKED and records where it was cloned from. A copy
    /// with an element tree has no cache until it is compiled from that
    /// tree. Returns the new block id.
    pub fn duplicate_block(&mut self, index: usize) -> DocumentResult<String> {
        let source = self
            .blocks
            .get(index)
            .ok_or_else(|| DocumentError::index(index, self.blocks.len()))?;
        self.limits.check_blocks(self.blocks.len() + 1)?;

        let mut copy = source.clone();
        let id = self.next_block_id();
        if let Some(tree) = copy.document.as_mut() {
            assign_fresh_ids(&mut tree.root, &mut IdGenerator::from_seed(id.clone()), self.element_ids());
            // the source cache is scoped to the source's ids
            copy.compiled_html = None;
        }
        copy.meta = BlockMeta {
            created_at: Some(Utc::now()),
            cloned_from: Some(copy.id.clone()),
            ..copy.meta
        };
        copy.id = id.clone();
        copy.locked = true;

        info!(source = %self.blocks[index].id, block_id = %id, "Duplicated block");
        self.blocks.insert(index + 1, copy);
        self.changed();
        Ok(id)
    }

    /// Move the block at `from` to the drop indicator at `drop`. Returns its landing index.
    pub fn move_block(&mut self, from: usize, drop: usize) -> DocumentResult<usize> {
        let mv = BlockMove::new(from, drop);
        let landing = mv.apply(&mut self.blocks)?;
        if !mv.is_noop() {
            debug!(from, drop, landing, "Moved block");
            self.changed();
        }
        Ok(landing)
    }

    pub fn move_block_up(&mut self, index: usize) -> DocumentResult<usize> {
        if index >= self.blocks.len() {
            return Err(DocumentError::index(index, self.blocks.len()));
        }
        if index == 0 {
            return Ok(0);
        }
        self.move_block(index, index - 1)
    }

    pub fn move_block_down(&mut self, index: usize) -> DocumentResult<usize> {
        if index >= self.blocks.len() {
            return Err(DocumentError::index(index, self.blocks.len()));
        }
        if index + 1 == self.blocks.len() {
            return Ok(index);
        }
        self.move_block(index, index + 2)
    }

    /// Apply a full permutation: `order[k]` is the old index of the block that ends up at `k`
    pub fn reorder(&mut self, order: &[usize]) -> DocumentResult<()> {
        let len = self.blocks.len();
        if order.len() != len {
            return Err(DocumentError::index(order.len(), len));
        }
        let mut seen = vec![false; len];
        for &old in order {
            if old >= len || seen[old] {
                return Err(DocumentError::index(old, len));
            }
            seen[old] = true;
        }

        let mut slots: Vec<Option<Block>> = std::mem::take(&mut self.blocks).into_iter().map(Some).collect();
        self.blocks = order.iter().filter_map(|&old| slots[old].take()).collect();
        self.changed();
        Ok(())
    }

    /// Repair ids so every block id and every element id is unique
    /// document-wide. Returns how many ids were rewritten.
    pub fn reindex(&mut self) -> usize {
        let mut taken_blocks: HashSet<String> = self.blocks.iter().map(|b| b.id.clone()).collect();
        let mut seen_blocks = HashSet::new();
        let mut repair = DuplicateRepair {
            seen: HashSet::new(),
            taken: self.element_ids(),
            ids: IdGenerator::default(),
            repaired: 0,
        };

        for block in &mut self.blocks {
            if !seen_blocks.insert(block.id.clone()) {
                let fresh = self.ids.next_unused(&taken_blocks);
                warn!(old = %block.id, new = %fresh, "Repaired duplicate block id");
                taken_blocks.insert(fresh.clone());
                seen_blocks.insert(fresh.clone());
                block.id = fresh;
                repair.repaired += 1;
            }
            if let Some(tree) = block.document.as_mut() {
                repair.ids = IdGenerator::from_seed(block.id.clone());
                repair.visit_element_mut(&mut tree.root);
            }
        }

        if repair.repaired > 0 {
            self.changed();
        }
        repair.repaired
    }
}

fn instantiate(definition: &BlockTypeDefinition, id: String) -> Block {
    let mut block = Block::new(id.clone(), definition.block_type.clone());
    block.data = definition.default_data();
    block.meta = BlockMeta::created(format!("palette:{}", definition.block_type));

    let mut element_ids = IdGenerator::from_seed(id);
    if let Some(tree) = &definition.default_document {
        let mut tree = tree.clone();
        tree.regenerate_ids(&mut element_ids);
        block.document = Some(tree);
    }

    match definition.render(&block.data) {
        Some(rendered) => {
            for warning in &rendered.warnings {
                warn!(block_type = %definition.block_type, %warning, "Template warning");
            }
            block.compiled_html = Some(rendered.output);
            block.locked = true;
        }
        None => {
            if block.document.is_none() {
                block.document = Some(ElementTree::new(Element::fragment(element_ids.new_id())));
            }
            block.locked = false;
        }
    }
    block
}

struct DuplicateRepair {
    seen: HashSet<String>,
    taken: HashSet<String>,
    ids: IdGenerator,
    repaired: usize,
}

impl VisitorMut for DuplicateRepair {
    fn visit_element_mut(&mut self, element: &mut Element) {
        if !self.seen.insert(element.id.clone()) {
            let fresh = self.ids.next_unused(&self.taken);
            self.taken.insert(fresh.clone());
            self.seen.insert(fresh.clone());
            element.id = fresh;
            self.repaired += 1;
        }
        walk_element_mut(self, element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryRegistry;

    fn doc_with(types: &[&str]) -> Document {
        let registry = InMemoryRegistry::with_builtins();
        let mut doc = Document::new("test");
        for (i, t) in types.iter().enumerate() {
            doc.insert_block(&registry, t, i).unwrap();
        }
        doc.take_events();
        doc
    }

    fn types(doc: &Document) -> Vec<&str> {
        doc.blocks().iter().map(|b| b.block_type.as_str()).collect()
    }

    #[test]
    fn test_insert_seeds_from_registry() {
        let doc = doc_with(&["heading", "custom-html"]);

        let heading = doc.block(0).unwrap();
        assert!(heading.locked);
        assert_eq!(heading.compiled_html.as_deref(), Some("<h2>Heading</h2>"));
        assert_eq!(heading.meta.created_from, "palette:heading");

        let custom = doc.block(1).unwrap();
        assert!(!custom.locked);
        assert!(custom.compiled_html.is_none());
        assert!(custom.document.as_ref().unwrap().root.id.starts_with(&custom.id));
    }

    #[test]
    fn test_insert_errors_leave_document_unchanged() {
        let registry = InMemoryRegistry::with_builtins();
        let mut doc = doc_with(&["text"]);
        let before = doc.clone();

        assert_eq!(doc.insert_block(&registry, "text", 5), Err(DocumentError::index(5, 1)));
        assert_eq!(
            doc.insert_block(&registry, "carousel", 0),
            Err(DocumentError::UnknownBlockType("carousel".to_string()))
        );
        assert_eq!(doc, before);
        assert!(doc.take_events().is_empty());
    }

    #[test]
    fn test_block_limit() {
        let registry = InMemoryRegistry::with_builtins();
        let mut doc = Document::new("t").with_limits(Limits {
            max_blocks: 1,
            ..Limits::default()
        });
        doc.insert_block(&registry, "text", 0).unwrap();
        assert!(matches!(
            doc.insert_block(&registry, "text", 1),
            Err(DocumentError::LimitExceeded(_))
        ));
        assert!(matches!(doc.duplicate_block(0), Err(DocumentError::LimitExceeded(_))));
    }

    #[test]
    fn test_remove_block() {
        let mut doc = doc_with(&["heading", "text"]);
        let removed = doc.remove_block(0).unwrap();

        assert_eq!(removed.block_type, "heading");
        assert_eq!(types(&doc), vec!["text"]);
        assert_eq!(doc.remove_block(1), Err(DocumentError::index(1, 1)));
        assert_eq!(doc.take_events(), vec![DocumentEvent::DocumentChanged]);
    }

    #[test]
    fn test_move_block_up_and_down() {
        let mut doc = doc_with(&["heading", "text", "image"]);

        assert_eq!(doc.move_block_down(0), Ok(1));
        assert_eq!(types(&doc), vec!["text", "heading", "image"]);
        assert_eq!(doc.move_block_up(2), Ok(1));
        assert_eq!(types(&doc), vec!["text", "image", "heading"]);
        assert_eq!(doc.move_block_up(0), Ok(0));
        assert_eq!(doc.move_block_down(2), Ok(2));
    }

    #[test]
    fn test_reorder_requires_permutation() {
        let mut doc = doc_with(&["heading", "text", "image"]);
        assert!(doc.reorder(&[0, 0, 1]).is_err());
        assert!(doc.reorder(&[0, 1]).is_err());

        doc.reorder(&[2, 0, 1]).unwrap();
        assert_eq!(types(&doc), vec!["image", "heading", "text"]);
    }

    #[test]
    fn test_reindex_repairs_duplicates() {
        let mut doc = doc_with(&["custom-html", "custom-html"]);
        let first = doc.block(0).unwrap().clone();
        *doc.block_mut(1).unwrap() = first;

        // block id and root element id both collide
        assert_eq!(doc.reindex(), 2);
        assert_ne!(doc.block(0).unwrap().id, doc.block(1).unwrap().id);
        assert_eq!(doc.reindex(), 0);
    }
}

use crate::element::Element;
use crate::error::{DocumentError, DocumentResult};
use crate::id_generator::IdGenerator;
use crate::visitor::{walk_element_mut, IdCollector, TreeStats, Visitor, VisitorMut};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A block's structured element tree (`document.root` when serialized)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementTree {
    pub root: Element,
}

impl ElementTree {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Child-index path from the root to `id`; empty for the root itself
    pub fn path_to(&self, id: &str) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        if find_path(&self.root, id, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn at_path(&self, path: &[usize]) -> Option<&Element> {
        let mut current = &self.root;
        for &index in path {
            current = current.children.get(index)?;
        }
        Some(current)
    }

    fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = &mut self.root;
        for &index in path {
            current = current.children.get_mut(index)?;
        }
        Some(current)
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        let path = self.path_to(id)?;
        self.at_path(&path)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        let path = self.path_to(id)?;
        self.at_path_mut(&path)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.path_to(id).is_some()
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.root.id == id
    }

    pub fn parent_of(&self, id: &str) -> Option<&Element> {
        let path = self.path_to(id)?;
        let (_, parent_path) = path.split_last()?;
        self.at_path(parent_path)
    }

    /// Ancestors of `id`, nearest first, ending with the root
    pub fn ancestors(&self, id: &str) -> Vec<&Element> {
        let Some(path) = self.path_to(id) else {
            return Vec::new();
        };
        (0..path.len())
            .rev()
            .filter_map(|len| self.at_path(&path[..len]))
            .collect()
    }

    /// Ancestor walk from `id` up to the root looking for `ancestor_id`
    pub fn is_descendant_of(&self, id: &str, ancestor_id: &str) -> bool {
        self.ancestors(id).iter().any(|el| el.id == ancestor_id)
    }

    pub fn count(&self) -> usize {
        let mut stats = TreeStats::default();
        stats.visit_element(&self.root);
        stats.count
    }

    /// Longest root-to-leaf path, counted in nodes
    pub fn depth(&self) -> usize {
        let mut stats = TreeStats::default();
        stats.visit_element(&self.root);
        stats.max_depth
    }

    pub fn ids(&self) -> HashSet<String> {
        let mut collector = IdCollector::default();
        collector.visit_element(&self.root);
        collector.ids.into_iter().collect()
    }

    /// Insert `element` under `parent_id`; `position` is clamped to the child count
    pub fn insert(&mut self, parent_id: &str, position: usize, element: Element) -> DocumentResult<()> {
        let parent = self
            .find_mut(parent_id)
            .ok_or_else(|| DocumentError::ElementNotFound(parent_id.to_string()))?;

        if !parent.accepts_children() {
            return Err(DocumentError::InvalidParent(parent_id.to_string()));
        }

        let index = position.min(parent.children.len());
        parent.children.insert(index, element);
        Ok(())
    }

    /// Detach `id` and its whole subtree
    pub fn remove(&mut self, id: &str) -> DocumentResult<Element> {
        let path = self
            .path_to(id)
            .ok_or_else(|| DocumentError::ElementNotFound(id.to_string()))?;

        let Some((&index, parent_path)) = path.split_last() else {
            return Err(DocumentError::RootElement(id.to_string()));
        };

        let parent = self
            .at_path_mut(parent_path)
            .ok_or_else(|| DocumentError::ElementNotFound(id.to_string()))?;
        Ok(parent.children.remove(index))
    }

    /// Assign fresh ids to every element in the tree, root included
    pub fn regenerate_ids(&mut self, ids: &mut IdGenerator) {
        let mut rewriter = IdRewriter {
            ids,
            taken: HashSet::new(),
        };
        rewriter.visit_element_mut(&mut self.root);
    }
}

/// Assign fresh ids to a detached subtree, avoiding ids already in `taken`
pub(crate) fn assign_fresh_ids(element: &mut Element, ids: &mut IdGenerator, taken: HashSet<String>) {
    let mut rewriter = IdRewriter { ids, taken };
    rewriter.visit_element_mut(element);
}

struct IdRewriter<'a> {
    ids: &'a mut IdGenerator,
    taken: HashSet<String>,
}

impl VisitorMut for IdRewriter<'_> {
    fn visit_element_mut(&mut self, element: &mut Element) {
        element.id = self.ids.next_unused(&self.taken);
        self.taken.insert(element.id.clone());
        walk_element_mut(self, element);
    }
}

fn find_path(element: &Element, id: &str, path: &mut Vec<usize>) -> bool {
    if element.id == id {
        return true;
    }
    for (index, child) in element.children.iter().enumerate() {
        path.push(index);
        if find_path(child, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;

    fn sample() -> ElementTree {
        ElementTree::new(
            Element::fragment("root").with_child(
                Element::new("hero", ElementType::Container, "div")
                    .with_child(Element::new("title", ElementType::Heading, "h2").with_content("Title"))
                    .with_child(Element::new("img", ElementType::Image, "img")),
            ),
        )
    }

    #[test]
    fn test_find_and_parent() {
        let tree = sample();

        assert_eq!(tree.find("title").map(|e| e.content.as_str()), Some("Title"));
        assert_eq!(tree.parent_of("img").map(|e| e.id.as_str()), Some("hero"));
        assert!(tree.parent_of("root").is_none());
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let tree = sample();
        let ids: Vec<&str> = tree.ancestors("title").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["hero", "root"]);
        assert!(tree.is_descendant_of("title", "root"));
        assert!(!tree.is_descendant_of("hero", "title"));
    }

    #[test]
    fn test_remove_takes_subtree() {
        let mut tree = sample();
        let removed = tree.remove("hero").unwrap();

        assert_eq!(removed.children.len(), 2);
        assert_eq!(tree.count(), 1);
        assert_eq!(tree.remove("root"), Err(DocumentError::RootElement("root".to_string())));
    }

    #[test]
    fn test_insert_into_leaf_is_rejected() {
        let mut tree = sample();
        let result = tree.insert("img", 0, Element::text_run("t", "x"));
        assert_eq!(result, Err(DocumentError::InvalidParent("img".to_string())));

        tree.insert("hero", 99, Element::new("hr", ElementType::Divider, "hr")).unwrap();
        assert_eq!(tree.find("hero").unwrap().children[2].id, "hr");
    }

    #[test]
    fn test_regenerate_ids() {
        let mut tree = sample();
        tree.regenerate_ids(&mut IdGenerator::from_seed("blk"));

        assert_eq!(tree.root.id, "blk-1");
        assert_eq!(tree.count(), 4);
        assert!(tree.ids().iter().all(|id| id.starts_with("blk-")));
        assert_eq!(tree.depth(), 3);
    }
}

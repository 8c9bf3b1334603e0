use crate::element::Element;

/// Visitor pattern for traversing element trees immutably
///
/// The default implementation walks the entire subtree in pre-order.
/// Override `visit_element` and call [`walk_element`] to keep descending.
pub trait Visitor: Sized {
    fn visit_element(&mut self, element: &Element) {
        walk_element(self, element);
    }
}

/// Mutable visitor for rewriting element trees in place
pub trait VisitorMut: Sized {
    fn visit_element_mut(&mut self, element: &mut Element) {
        walk_element_mut(self, element);
    }
}

pub fn walk_element<V: Visitor>(visitor: &mut V, element: &Element) {
    for child in &element.children {
        visitor.visit_element(child);
    }
}

pub fn walk_element_mut<V: VisitorMut>(visitor: &mut V, element: &mut Element) {
    for child in &mut element.children {
        visitor.visit_element_mut(child);
    }
}

/// Counts elements and the longest root-to-leaf path (in nodes)
#[derive(Debug, Default)]
pub struct TreeStats {
    pub count: usize,
    pub max_depth: usize,
    depth: usize,
}

impl Visitor for TreeStats {
    fn visit_element(&mut self, element: &Element) {
        self.count += 1;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        walk_element(self, element);
        self.depth -= 1;
    }
}

/// Collects every id in visit order
#[derive(Debug, Default)]
pub struct IdCollector {
    pub ids: Vec<String>,
}

impl Visitor for IdCollector {
    fn visit_element(&mut self, element: &Element) {
        self.ids.push(element.id.clone());
        walk_element(self, element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;

    #[test]
    fn test_tree_stats() {
        let tree = Element::new("a", ElementType::Container, "div")
            .with_child(Element::new("b", ElementType::Heading, "h2"))
            .with_child(
                Element::new("c", ElementType::List, "ul")
                    .with_child(Element::new("d", ElementType::ListItem, "li")),
            );

        let mut stats = TreeStats::default();
        stats.visit_element(&tree);

        assert_eq!(stats.count, 4);
        assert_eq!(stats.max_depth, 3);
    }

    #[test]
    fn test_id_collector_is_preorder() {
        let tree = Element::new("a", ElementType::Row, "div")
            .with_child(Element::new("b", ElementType::Column, "div").with_child(Element::text_run("c", "x")))
            .with_child(Element::new("d", ElementType::Column, "div"));

        let mut ids = IdCollector::default();
        ids.visit_element(&tree);

        assert_eq!(ids.ids, vec!["a", "b", "c", "d"]);
    }
}

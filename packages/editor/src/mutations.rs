//! # Element Mutations
//!
//! Semantic operations on the element tree of the block being edited.
//!
//! Every mutation validates against the current tree before touching it,
//! so a rejected mutation leaves the tree exactly as it was. Each one can
//! produce its inverse from the pre-mutation tree, which is what the
//! session history replays on undo.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tessera_compiler_css::{normalize_property, validate_value, PropertyCatalog, StyleError};
use tessera_document::visitor::{walk_element_mut, TreeStats, Visitor, VisitorMut};
use tessera_document::{
    Breakpoint, DocumentError, Element, ElementTree, IdGenerator, Limits, Placement, StyleState,
};
use thiserror::Error;

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Insert a new element (with its subtree) under `parent_id`
    AddElement {
        parent_id: String,
        index: usize,
        element: Element,
    },

    /// Remove an element and all its descendants
    RemoveElement { element_id: String },

    /// Insert a prepared copy directly after the original.
    ///
    /// Build the copy with [`Mutation::prepare_copy`] so it carries fresh ids.
    DuplicateElement { element_id: String, copy: Element },

    /// Move an element to a new parent at index
    MoveElement {
        element_id: String,
        new_parent_id: String,
        index: usize,
    },

    /// Move an element before, after or inside a target
    MoveElementRelative {
        element_id: String,
        target_id: String,
        placement: Placement,
    },

    /// Replace the inline content (atomic replacement)
    UpdateContent { element_id: String, content: String },

    /// Set (`Some`) or clear (`None`) one style declaration
    SetStyle {
        element_id: String,
        state: StyleState,
        breakpoint: Breakpoint,
        property: String,
        value: Option<String>,
    },

    /// Set (`Some`) or clear (`None`) an attribute
    SetAttribute {
        element_id: String,
        name: String,
        value: Option<String>,
    },

    AddClass { element_id: String, class: String },

    RemoveClass { element_id: String, class: String },

    ToggleVisibility { element_id: String },

    ToggleLock { element_id: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error("Element id already in use: {0}")]
    DuplicateId(String),

    #[error("Element {0} has children and no inline content")]
    HasChildren(String),

    #[error("Invalid attribute name: {0}")]
    InvalidAttribute(String),

    #[error("Attribute `{0}` cannot be set directly")]
    ReservedAttribute(String),

    #[error("Invalid class name: {0}")]
    InvalidClass(String),
}

pub type MutationResult<T> = Result<T, MutationError>;

fn find<'t>(tree: &'t ElementTree, id: &str) -> MutationResult<&'t Element> {
    tree.find(id)
        .ok_or_else(|| DocumentError::ElementNotFound(id.to_string()).into())
}

fn find_mut<'t>(tree: &'t mut ElementTree, id: &str) -> MutationResult<&'t mut Element> {
    tree.find_mut(id)
        .ok_or_else(|| DocumentError::ElementNotFound(id.to_string()).into())
}

/// The element must exist and not be locked
fn editable<'t>(tree: &'t ElementTree, id: &str) -> MutationResult<&'t Element> {
    let element = find(tree, id)?;
    if element.locked {
        return Err(DocumentError::ElementLocked(id.to_string()).into());
    }
    Ok(element)
}

/// A non-root element that may leave its parent: both must be unlocked.
/// Returns the parent id.
fn editable_with_parent(tree: &ElementTree, id: &str) -> MutationResult<String> {
    let (parent_id, _) = position_of(tree, id)?;
    editable(tree, id)?;
    editable(tree, &parent_id)?;
    Ok(parent_id)
}

/// Parent id and child index of a non-root element
fn position_of(tree: &ElementTree, id: &str) -> MutationResult<(String, usize)> {
    let parent = tree.parent_of(id).ok_or_else(|| {
        if tree.contains(id) {
            DocumentError::RootElement(id.to_string())
        } else {
            DocumentError::ElementNotFound(id.to_string())
        }
    })?;
    let index = parent
        .children
        .iter()
        .position(|c| c.id == id)
        .unwrap_or(parent.children.len());
    Ok((parent.id.clone(), index))
}

fn subtree_stats(element: &Element) -> TreeStats {
    let mut stats = TreeStats::default();
    stats.visit_element(element);
    stats
}

fn subtree_ids(element: &Element) -> Vec<String> {
    let mut ids = Vec::new();
    collect_ids(element, &mut ids);
    ids
}

fn collect_ids(element: &Element, ids: &mut Vec<String>) {
    ids.push(element.id.clone());
    for child in &element.children {
        collect_ids(child, ids);
    }
}

/// New subtree must not reuse ids and must stay within the block limits
fn check_insertion(tree: &ElementTree, parent_id: &str, element: &Element, limits: &Limits) -> MutationResult<()> {
    let taken = tree.ids();
    let mut seen = HashSet::new();
    for id in subtree_ids(element) {
        if taken.contains(&id) || !seen.insert(id.clone()) {
            return Err(MutationError::DuplicateId(id));
        }
    }

    let stats = subtree_stats(element);
    // The fragment root is not counted against the limits
    limits.check_elements(tree.count() - 1 + stats.count)?;
    let parent_depth = tree
        .path_to(parent_id)
        .map(|path| path.len())
        .ok_or_else(|| DocumentError::ElementNotFound(parent_id.to_string()))?;
    limits.check_depth(parent_depth + stats.max_depth)?;
    Ok(())
}

fn check_attribute_name(name: &str) -> MutationResult<()> {
    let valid = name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'));
    if !valid {
        return Err(MutationError::InvalidAttribute(name.to_string()));
    }
    let lower = name.to_ascii_lowercase();
    if matches!(lower.as_str(), "class" | "style") || lower.starts_with("on") {
        return Err(MutationError::ReservedAttribute(name.to_string()));
    }
    Ok(())
}

fn check_class(class: &str) -> MutationResult<()> {
    if class.is_empty()
        || class.starts_with(tessera_analyzer::GENERATED_CLASS_PREFIX)
        || class.contains(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>'))
    {
        return Err(MutationError::InvalidClass(class.to_string()));
    }
    Ok(())
}

impl Mutation {
    /// Deep copy of a non-root element with fresh ids, for [`Mutation::DuplicateElement`]
    pub fn prepare_copy(tree: &ElementTree, element_id: &str, ids: &mut IdGenerator, taken: &HashSet<String>) -> MutationResult<Element> {
        position_of(tree, element_id)?;
        let mut copy = find(tree, element_id)?.clone();
        let mut rewriter = FreshIds { ids, taken: taken.clone() };
        rewriter.visit_element_mut(&mut copy);
        Ok(copy)
    }

    pub fn element_id(&self) -> &str {
        match self {
            Mutation::AddElement { element, .. } => &element.id,
            Mutation::RemoveElement { element_id }
            | Mutation::DuplicateElement { element_id, .. }
            | Mutation::MoveElement { element_id, .. }
            | Mutation::MoveElementRelative { element_id, .. }
            | Mutation::UpdateContent { element_id, .. }
            | Mutation::SetStyle { element_id, .. }
            | Mutation::SetAttribute { element_id, .. }
            | Mutation::AddClass { element_id, .. }
            | Mutation::RemoveClass { element_id, .. }
            | Mutation::ToggleVisibility { element_id }
            | Mutation::ToggleLock { element_id } => element_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddElement { .. } => "AddElement",
            Mutation::RemoveElement { .. } => "RemoveElement",
            Mutation::DuplicateElement { .. } => "DuplicateElement",
            Mutation::MoveElement { .. } => "MoveElement",
            Mutation::MoveElementRelative { .. } => "MoveElementRelative",
            Mutation::UpdateContent { .. } => "UpdateContent",
            Mutation::SetStyle { .. } => "SetStyle",
            Mutation::SetAttribute { .. } => "SetAttribute",
            Mutation::AddClass { .. } => "AddClass",
            Mutation::RemoveClass { .. } => "RemoveClass",
            Mutation::ToggleVisibility { .. } => "ToggleVisibility",
            Mutation::ToggleLock { .. } => "ToggleLock",
        }
    }

    /// Check the mutation against `tree` without changing it
    pub fn validate(&self, tree: &ElementTree, limits: &Limits) -> MutationResult<()> {
        match self {
            Mutation::AddElement { parent_id, element, .. } => {
                let parent = editable(tree, parent_id)?;
                if !parent.accepts_children() {
                    return Err(DocumentError::InvalidParent(parent_id.clone()).into());
                }
                check_insertion(tree, parent_id, element, limits)
            }

            Mutation::RemoveElement { element_id } => {
                editable_with_parent(tree, element_id)?;
                Ok(())
            }

            Mutation::DuplicateElement { element_id, copy } => {
                let parent_id = editable_with_parent(tree, element_id)?;
                check_insertion(tree, &parent_id, copy, limits)
            }

            Mutation::MoveElement { element_id, new_parent_id, .. } => {
                tree.check_move(element_id, new_parent_id)?;
                editable_with_parent(tree, element_id)?;
                editable(tree, new_parent_id)?;
                check_move_depth(tree, element_id, new_parent_id, limits)
            }

            Mutation::MoveElementRelative {
                element_id,
                target_id,
                placement,
            } => {
                let new_parent_id = match placement {
                    Placement::Inside => target_id.clone(),
                    _ => {
                        if element_id == target_id {
                            return Err(DocumentError::cycle(element_id.as_str(), target_id.as_str()).into());
                        }
                        position_of(tree, target_id)?.0
                    }
                };
                tree.check_move(element_id, &new_parent_id)?;
                editable_with_parent(tree, element_id)?;
                editable(tree, &new_parent_id)?;
                check_move_depth(tree, element_id, &new_parent_id, limits)
            }

            Mutation::UpdateContent { element_id, .. } => {
                let element = editable(tree, element_id)?;
                if !element.children.is_empty() {
                    return Err(MutationError::HasChildren(element_id.clone()));
                }
                Ok(())
            }

            Mutation::SetStyle {
                element_id,
                state,
                breakpoint,
                property,
                value,
            } => {
                editable(tree, element_id)?;
                let property = normalize_property(property)?;
                if let Some(value) = value {
                    PropertyCatalog::standard().check(&property, *state, *breakpoint)?;
                    validate_value(&property, value)?;
                }
                Ok(())
            }

            Mutation::SetAttribute { element_id, name, .. } => {
                editable(tree, element_id)?;
                check_attribute_name(name)
            }

            Mutation::AddClass { element_id, class } => {
                editable(tree, element_id)?;
                check_class(class)
            }

            Mutation::RemoveClass { element_id, class } => {
                let element = editable(tree, element_id)?;
                if element.classes.locked.iter().any(|c| c == class) {
                    return Err(DocumentError::SystemClass(class.clone()).into());
                }
                Ok(())
            }

            Mutation::ToggleVisibility { element_id } | Mutation::ToggleLock { element_id } => {
                position_of(tree, element_id)?;
                Ok(())
            }
        }
    }

    /// Apply mutation to the tree with validation
    pub fn apply(&self, tree: &mut ElementTree, limits: &Limits) -> MutationResult<()> {
        self.validate(tree, limits)?;

        match self {
            Mutation::AddElement { parent_id, index, element } => {
                tree.insert(parent_id, *index, element.clone())?;
            }

            Mutation::RemoveElement { element_id } => {
                tree.remove(element_id)?;
            }

            Mutation::DuplicateElement { element_id, copy } => {
                let (parent_id, index) = position_of(tree, element_id)?;
                tree.insert(&parent_id, index + 1, copy.clone())?;
            }

            Mutation::MoveElement {
                element_id,
                new_parent_id,
                index,
            } => {
                tree.move_element(element_id, new_parent_id, *index)?;
            }

            Mutation::MoveElementRelative {
                element_id,
                target_id,
                placement,
            } => {
                tree.move_element_relative(element_id, target_id, *placement)?;
            }

            Mutation::UpdateContent { element_id, content } => {
                find_mut(tree, element_id)?.content = content.clone();
            }

            Mutation::SetStyle {
                element_id,
                state,
                breakpoint,
                property,
                value,
            } => {
                let property = normalize_property(property)?;
                let element = find_mut(tree, element_id)?;
                match value {
                    Some(value) => element.styles.set(*state, *breakpoint, property, value.trim()),
                    None => {
                        element.styles.remove(*state, *breakpoint, &property);
                    }
                }
            }

            Mutation::SetAttribute { element_id, name, value } => {
                let element = find_mut(tree, element_id)?;
                match value {
                    Some(value) => {
                        element.attributes.insert(name.clone(), value.clone());
                    }
                    None => {
                        element.attributes.remove(name);
                    }
                }
            }

            Mutation::AddClass { element_id, class } => {
                find_mut(tree, element_id)?.classes.add(class.clone());
            }

            Mutation::RemoveClass { element_id, class } => {
                find_mut(tree, element_id)?.classes.remove(class)?;
            }

            Mutation::ToggleVisibility { element_id } => {
                let element = find_mut(tree, element_id)?;
                element.visible = !element.visible;
            }

            Mutation::ToggleLock { element_id } => {
                let element = find_mut(tree, element_id)?;
                element.locked = !element.locked;
            }
        }

        Ok(())
    }

    /// The mutation that undoes this one, computed from the tree before applying it
    pub fn to_inverse(&self, tree: &ElementTree) -> MutationResult<Mutation> {
        let inverse = match self {
            Mutation::AddElement { element, .. } => Mutation::RemoveElement {
                element_id: element.id.clone(),
            },

            Mutation::RemoveElement { element_id } => {
                let (parent_id, index) = position_of(tree, element_id)?;
                Mutation::AddElement {
                    parent_id,
                    index,
                    element: find(tree, element_id)?.clone(),
                }
            }

            Mutation::DuplicateElement { copy, .. } => Mutation::RemoveElement {
                element_id: copy.id.clone(),
            },

            Mutation::MoveElement { element_id, .. } | Mutation::MoveElementRelative { element_id, .. } => {
                let (parent_id, index) = position_of(tree, element_id)?;
                Mutation::MoveElement {
                    element_id: element_id.clone(),
                    new_parent_id: parent_id,
                    index,
                }
            }

            Mutation::UpdateContent { element_id, .. } => Mutation::UpdateContent {
                element_id: element_id.clone(),
                content: find(tree, element_id)?.content.clone(),
            },

            Mutation::SetStyle {
                element_id,
                state,
                breakpoint,
                property,
                ..
            } => {
                let property = normalize_property(property)?;
                let previous = find(tree, element_id)?
                    .styles
                    .get(*state, *breakpoint, &property)
                    .map(str::to_string);
                Mutation::SetStyle {
                    element_id: element_id.clone(),
                    state: *state,
                    breakpoint: *breakpoint,
                    property,
                    value: previous,
                }
            }

            Mutation::SetAttribute { element_id, name, .. } => Mutation::SetAttribute {
                element_id: element_id.clone(),
                name: name.clone(),
                value: find(tree, element_id)?.attributes.get(name).cloned(),
            },

            Mutation::AddClass { element_id, class } => {
                if find(tree, element_id)?.classes.contains(class) {
                    self.clone()
                } else {
                    Mutation::RemoveClass {
                        element_id: element_id.clone(),
                        class: class.clone(),
                    }
                }
            }

            Mutation::RemoveClass { element_id, class } => {
                if find(tree, element_id)?.classes.contains(class) {
                    Mutation::AddClass {
                        element_id: element_id.clone(),
                        class: class.clone(),
                    }
                } else {
                    self.clone()
                }
            }

            Mutation::ToggleVisibility { .. } | Mutation::ToggleLock { .. } => self.clone(),
        };
        Ok(inverse)
    }
}

fn check_move_depth(tree: &ElementTree, element_id: &str, new_parent_id: &str, limits: &Limits) -> MutationResult<()> {
    let element = find(tree, element_id)?;
    let parent_depth = tree
        .path_to(new_parent_id)
        .map(|path| path.len())
        .ok_or_else(|| DocumentError::ElementNotFound(new_parent_id.to_string()))?;
    limits.check_depth(parent_depth + subtree_stats(element).max_depth)?;
    Ok(())
}

struct FreshIds<'a> {
    ids: &'a mut IdGenerator,
    taken: HashSet<String>,
}

impl VisitorMut for FreshIds<'_> {
    fn visit_element_mut(&mut self, element: &mut Element) {
        element.id = self.ids.next_unused(&self.taken);
        self.taken.insert(element.id.clone());
        walk_element_mut(self, element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_document::ElementType;

    fn tree() -> ElementTree {
        ElementTree::new(
            Element::fragment("b-1").with_child(
                Element::new("b-2", ElementType::Container, "div")
                    .with_child(Element::new("b-3", ElementType::Heading, "h2").with_content("Title"))
                    .with_child(Element::new("b-4", ElementType::Text, "p").with_content("Body")),
            ),
        )
    }

    fn apply_and_undo(mutation: Mutation) {
        let original = tree();
        let mut tree = original.clone();
        let inverse = mutation.to_inverse(&tree).unwrap();
        mutation.apply(&mut tree, &Limits::default()).unwrap();
        assert_ne!(tree, original, "{} changed nothing", mutation.name());
        inverse.apply(&mut tree, &Limits::default()).unwrap();
        assert_eq!(tree, original, "{} inverse did not restore the tree", mutation.name());
    }

    #[test]
    fn test_inverses_restore_the_tree() {
        apply_and_undo(Mutation::RemoveElement {
            element_id: "b-3".to_string(),
        });
        apply_and_undo(Mutation::MoveElement {
            element_id: "b-4".to_string(),
            new_parent_id: "b-2".to_string(),
            index: 0,
        });
        apply_and_undo(Mutation::MoveElementRelative {
            element_id: "b-3".to_string(),
            target_id: "b-2".to_string(),
            placement: Placement::After,
        });
        apply_and_undo(Mutation::UpdateContent {
            element_id: "b-3".to_string(),
            content: "New".to_string(),
        });
        apply_and_undo(Mutation::SetStyle {
            element_id: "b-3".to_string(),
            state: StyleState::Hover,
            breakpoint: Breakpoint::Desktop,
            property: "color".to_string(),
            value: Some("blue".to_string()),
        });
        apply_and_undo(Mutation::SetAttribute {
            element_id: "b-2".to_string(),
            name: "id".to_string(),
            value: Some("hero".to_string()),
        });
        apply_and_undo(Mutation::AddClass {
            element_id: "b-2".to_string(),
            class: "wide".to_string(),
        });
        apply_and_undo(Mutation::ToggleVisibility {
            element_id: "b-4".to_string(),
        });
    }

    #[test]
    fn test_duplicate_gets_fresh_ids() {
        let mut tree = tree();
        let mut ids = IdGenerator::from_seed("b");
        let taken = tree.ids();
        let copy = Mutation::prepare_copy(&tree, "b-2", &mut ids, &taken).unwrap();
        let mutation = Mutation::DuplicateElement {
            element_id: "b-2".to_string(),
            copy,
        };
        mutation.apply(&mut tree, &Limits::default()).unwrap();

        let copy = &tree.root.children[1];
        assert_eq!(copy.id, "b-5");
        assert_eq!(copy.children[0].id, "b-6");
        assert_eq!(copy.children[0].content, "Title");
        assert_eq!(tree.count(), 7);
    }

    #[test]
    fn test_style_validation() {
        let mut tree = tree();
        let hover_padding = Mutation::SetStyle {
            element_id: "b-3".to_string(),
            state: StyleState::Hover,
            breakpoint: Breakpoint::Desktop,
            property: "padding".to_string(),
            value: Some("1rem".to_string()),
        };
        assert!(matches!(
            hover_padding.apply(&mut tree, &Limits::default()),
            Err(MutationError::Style(StyleError::StateNotSupported { .. }))
        ));

        let camel = Mutation::SetStyle {
            element_id: "b-3".to_string(),
            state: StyleState::Normal,
            breakpoint: Breakpoint::Mobile,
            property: "fontSize".to_string(),
            value: Some("14px".to_string()),
        };
        camel.apply(&mut tree, &Limits::default()).unwrap();
        let title = tree.find("b-3").unwrap();
        assert_eq!(title.styles.get(StyleState::Normal, Breakpoint::Mobile, "font-size"), Some("14px"));
    }

    #[test]
    fn test_locked_elements_reject_edits() {
        let mut tree = tree();
        tree.find_mut("b-3").unwrap().locked = true;
        let before = tree.clone();

        let update = Mutation::UpdateContent {
            element_id: "b-3".to_string(),
            content: "x".to_string(),
        };
        assert_eq!(
            update.apply(&mut tree, &Limits::default()),
            Err(MutationError::Document(DocumentError::ElementLocked("b-3".to_string())))
        );
        let unlock = Mutation::ToggleLock {
            element_id: "b-3".to_string(),
        };
        unlock.apply(&mut tree, &Limits::default()).unwrap();
        assert!(!tree.find("b-3").unwrap().locked);
        assert_ne!(tree, before);
    }

    #[test]
    fn test_children_of_locked_parents_stay_put() {
        let mut tree = tree();
        tree.find_mut("b-2").unwrap().locked = true;
        let before = tree.clone();
        let locked = Err(MutationError::Document(DocumentError::ElementLocked("b-2".to_string())));

        let remove = Mutation::RemoveElement {
            element_id: "b-3".to_string(),
        };
        assert_eq!(remove.apply(&mut tree, &Limits::default()), locked);

        let move_out = Mutation::MoveElement {
            element_id: "b-4".to_string(),
            new_parent_id: "b-1".to_string(),
            index: 0,
        };
        assert_eq!(move_out.apply(&mut tree, &Limits::default()), locked);

        let mut ids = IdGenerator::from_seed("b");
        let copy = Mutation::prepare_copy(&tree, "b-3", &mut ids, &tree.ids()).unwrap();
        let duplicate = Mutation::DuplicateElement {
            element_id: "b-3".to_string(),
            copy,
        };
        assert_eq!(duplicate.apply(&mut tree, &Limits::default()), locked);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_system_classes_cannot_be_removed() {
        let mut tree = tree();
        tree.find_mut("b-2").unwrap().classes.add_locked("hero");
        let remove = Mutation::RemoveClass {
            element_id: "b-2".to_string(),
            class: "hero".to_string(),
        };
        assert_eq!(
            remove.apply(&mut tree, &Limits::default()),
            Err(MutationError::Document(DocumentError::SystemClass("hero".to_string())))
        );
    }

    #[test]
    fn test_attribute_rules() {
        let mut tree = tree();
        for name in ["class", "style", "onclick"] {
            let set = Mutation::SetAttribute {
                element_id: "b-2".to_string(),
                name: name.to_string(),
                value: Some("x".to_string()),
            };
            assert_eq!(
                set.apply(&mut tree, &Limits::default()),
                Err(MutationError::ReservedAttribute(name.to_string()))
            );
        }
    }

    #[test]
    fn test_limits_are_enforced() {
        let mut tree = tree();
        let limits = Limits {
            max_elements_per_block: 3,
            ..Limits::default()
        };
        let add = Mutation::AddElement {
            parent_id: "b-2".to_string(),
            index: 0,
            element: Element::from_palette(ElementType::Divider, "b-9"),
        };
        assert!(matches!(
            add.apply(&mut tree, &limits),
            Err(MutationError::Document(DocumentError::LimitExceeded(_)))
        ));

        let duplicate_id = Mutation::AddElement {
            parent_id: "b-2".to_string(),
            index: 0,
            element: Element::from_palette(ElementType::Divider, "b-3"),
        };
        assert_eq!(
            duplicate_id.apply(&mut tree, &Limits::default()),
            Err(MutationError::DuplicateId("b-3".to_string()))
        );
    }

    #[test]
    fn test_cannot_add_into_leaf() {
        let mut tree = tree();
        let add = Mutation::AddElement {
            parent_id: "b-3".to_string(),
            index: 0,
            element: Element::from_palette(ElementType::Text, "b-9"),
        };
        assert_eq!(
            add.apply(&mut tree, &Limits::default()),
            Err(MutationError::Document(DocumentError::InvalidParent("b-3".to_string())))
        );
    }
}

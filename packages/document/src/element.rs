//! Element nodes of a block's structured tree.

use crate::error::{DocumentError, DocumentResult};
use crate::style::{Breakpoint, StyleMap, StyleState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Semantic kind of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    /// Transparent root wrapper; compiles to its children only
    Fragment,
    Heading,
    Text,
    Image,
    Button,
    Link,
    Container,
    Row,
    Column,
    List,
    ListItem,
    Divider,
    Spacer,
    Icon,
    Picture,
    Source,
    RawHtml,
}

impl ElementType {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Fragment => "fragment",
            ElementType::Heading => "heading",
            ElementType::Text => "text",
            ElementType::Image => "image",
            ElementType::Button => "button",
            ElementType::Link => "link",
            ElementType::Container => "container",
            ElementType::Row => "row",
            ElementType::Column => "column",
            ElementType::List => "list",
            ElementType::ListItem => "list-item",
            ElementType::Divider => "divider",
            ElementType::Spacer => "spacer",
            ElementType::Icon => "icon",
            ElementType::Picture => "picture",
            ElementType::Source => "source",
            ElementType::RawHtml => "raw-html",
        }
    }

    /// Whether elements of this kind may hold child elements
    pub fn accepts_children(self) -> bool {
        matches!(
            self,
            ElementType::Fragment
                | ElementType::Button
                | ElementType::Link
                | ElementType::Container
                | ElementType::Row
                | ElementType::Column
                | ElementType::List
                | ElementType::ListItem
                | ElementType::Picture
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered class set split into system classes and user-added classes.
///
/// System (locked) classes come from imported markup or the block type and
/// cannot be removed through the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassList {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locked: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user: Vec<String>,
}

impl ClassList {
    pub fn system<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for class in classes {
            list.add_locked(class);
        }
        list
    }

    pub fn add_locked(&mut self, class: impl Into<String>) -> bool {
        let class = class.into();
        if class.is_empty() || self.contains(&class) {
            return false;
        }
        self.locked.push(class);
        true
    }

    /// Add a user class. Adding an existing class is a no-op.
    pub fn add(&mut self, class: impl Into<String>) -> bool {
        let class = class.into();
        if class.is_empty() || self.contains(&class) {
            return false;
        }
        self.user.push(class);
        true
    }

    pub fn remove(&mut self, class: &str) -> DocumentResult<bool> {
        if self.locked.iter().any(|c| c == class) {
            return Err(DocumentError::SystemClass(class.to_string()));
        }
        let before = self.user.len();
        self.user.retain(|c| c != class);
        Ok(self.user.len() != before)
    }

    pub fn contains(&self, class: &str) -> bool {
        self.iter().any(|c| c == class)
    }

    /// System classes first, then user classes
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.locked.iter().chain(self.user.iter()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.locked.is_empty() && self.user.is_empty()
    }
}

fn default_visible() -> bool {
    true
}

/// A node of a block's element tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementType,
    #[serde(default)]
    pub tag: String,
    #[serde(default, skip_serializing_if = "ClassList::is_empty")]
    pub classes: ClassList,
    /// Inline markup for text-bearing kinds, the URL for images
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
    #[serde(default, skip_serializing_if = "StyleMap::is_empty")]
    pub styles: StyleMap,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: ElementType, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            tag: tag.into(),
            classes: ClassList::default(),
            content: String::new(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            styles: StyleMap::new(),
            locked: false,
            visible: true,
        }
    }

    pub fn fragment(id: impl Into<String>) -> Self {
        Self::new(id, ElementType::Fragment, "")
    }

    /// A bare run of text between sibling elements
    pub fn text_run(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, ElementType::Text, "").with_content(text)
    }

    pub fn is_text_run(&self) -> bool {
        self.kind == ElementType::Text && self.tag.is_empty()
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.add(class);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_style(
        mut self,
        state: StyleState,
        breakpoint: Breakpoint,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.styles.set(state, breakpoint, property, value);
        self
    }

    pub fn accepts_children(&self) -> bool {
        self.kind.accepts_children()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_classes_cannot_be_removed() {
        let mut classes = ClassList::system(["hero"]);
        classes.add("highlight");

        assert_eq!(classes.remove("hero"), Err(DocumentError::SystemClass("hero".to_string())));
        assert_eq!(classes.remove("highlight"), Ok(true));
        assert_eq!(classes.remove("highlight"), Ok(false));
        assert_eq!(classes.iter().collect::<Vec<_>>(), vec!["hero"]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut classes = ClassList::system(["hero"]);
        assert!(!classes.add("hero"));
        assert!(classes.add("wide"));
        assert!(!classes.add("wide"));
        assert_eq!(classes.iter().collect::<Vec<_>>(), vec!["hero", "wide"]);
    }

    #[test]
    fn test_element_serialization_defaults() {
        let json = r#"{"id":"a","type":"list-item","tag":"li","content":"One"}"#;
        let element: Element = serde_json::from_str(json).unwrap();

        assert_eq!(element.kind, ElementType::ListItem);
        assert!(element.visible);
        assert!(!element.locked);
        assert!(element.children.is_empty());
    }
}

//! Content-field and repeater detection over an analyzed tree.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tessera_document::visitor::{walk_element, Visitor};
use tessera_document::{Element, ElementTree, ElementType, FieldKind};

/// A fillable value found in imported markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub value: String,
    pub element_id: String,
}

/// A run of sibling elements sharing tag and classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repeater {
    pub name: String,
    pub parent_id: String,
    pub tag: String,
    pub classes: Vec<String>,
    pub element_ids: Vec<String>,
}

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// Visible text of an inline-markup fragment
pub fn strip_tags(markup: &str) -> String {
    let re = TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
    let text = re.replace_all(markup, "");
    html_escape::decode_html_entities(text.trim()).into_owned()
}

/// Hands out `base`, `base_2`, `base_3`, ...
#[derive(Debug, Default)]
struct Namer {
    used: HashMap<String, usize>,
}

impl Namer {
    fn name(&mut self, base: &str) -> String {
        let n = self.used.entry(base.to_string()).or_insert(0);
        *n += 1;
        if *n == 1 {
            base.to_string()
        } else {
            format!("{}_{}", base, n)
        }
    }
}

fn field_base(kind: ElementType) -> Option<&'static str> {
    match kind {
        ElementType::Heading => Some("heading"),
        ElementType::Text => Some("text"),
        ElementType::ListItem => Some("item"),
        ElementType::Button => Some("button"),
        ElementType::Link => Some("link"),
        ElementType::Image => Some("image"),
        _ => None,
    }
}

struct FieldCollector {
    namer: Namer,
    fields: Vec<ContentField>,
}

impl Visitor for FieldCollector {
    fn visit_element(&mut self, element: &Element) {
        if let Some(base) = field_base(element.kind) {
            self.collect(base, element);
        }
        walk_element(self, element);
    }
}

impl FieldCollector {
    fn push(&mut self, name: String, kind: FieldKind, value: &str, element: &Element) {
        self.fields.push(ContentField {
            name,
            kind,
            value: value.to_string(),
            element_id: element.id.clone(),
        });
    }

    fn collect(&mut self, base: &str, element: &Element) {
        if element.kind == ElementType::Image {
            if !element.content.is_empty() {
                let name = self.namer.name(base);
                self.push(name, FieldKind::Image, &element.content, element);
            }
            return;
        }

        let href = element
            .attributes
            .get("href")
            .filter(|href| !href.is_empty());
        let has_text = !strip_tags(&element.content).is_empty();
        if !has_text && href.is_none() {
            return;
        }

        let name = self.namer.name(base);
        if has_text {
            self.push(name.clone(), FieldKind::Text, &element.content, element);
        }
        if let Some(href) = href {
            self.push(format!("{}_url", name), FieldKind::Url, href, element);
        }
    }
}

/// Fillable values in pre-order: text content, image sources and link targets
pub fn detect_content_fields(tree: &ElementTree) -> Vec<ContentField> {
    let mut collector = FieldCollector {
        namer: Namer::default(),
        fields: Vec::new(),
    };
    collector.visit_element(&tree.root);
    collector.fields
}

struct RepeaterCollector {
    namer: Namer,
    repeaters: Vec<Repeater>,
}

impl Visitor for RepeaterCollector {
    fn visit_element(&mut self, element: &Element) {
        let mut groups: Vec<(String, Vec<String>, Vec<String>)> = Vec::new();
        for child in element.children.iter().filter(|c| !c.is_text_run()) {
            let classes: Vec<String> = child.classes.iter().map(str::to_string).collect();
            match groups
                .iter_mut()
                .find(|(tag, cls, _)| *tag == child.tag && *cls == classes)
            {
                Some((_, _, ids)) => ids.push(child.id.clone()),
                None => groups.push((child.tag.clone(), classes, vec![child.id.clone()])),
            }
        }

        for (tag, classes, element_ids) in groups {
            if element_ids.len() < 2 {
                continue;
            }
            let base = repeater_base(element.kind, &classes);
            self.repeaters.push(Repeater {
                name: self.namer.name(base),
                parent_id: element.id.clone(),
                tag,
                classes,
                element_ids,
            });
        }

        walk_element(self, element);
    }
}

fn repeater_base(parent: ElementType, classes: &[String]) -> &'static str {
    if classes.iter().any(|c| c.contains("slide")) {
        "slides"
    } else if parent == ElementType::Row || classes.iter().any(|c| c == "col" || c.starts_with("col-")) {
        "columns"
    } else {
        "items"
    }
}

/// Sibling groups of two or more elements with the same tag and classes
pub fn detect_repeaters(tree: &ElementTree) -> Vec<Repeater> {
    let mut collector = RepeaterCollector {
        namer: Namer::default(),
        repeaters: Vec::new(),
    };
    collector.visit_element(&tree.root);
    collector.repeaters
}

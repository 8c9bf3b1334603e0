//! Block type definitions and the registry interface the engine consumes.

use crate::element::{Element, ElementType};
use crate::error::DocumentResult;
use crate::template::{render_template, TemplateOutput};
use crate::tree::ElementTree;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Kind of value a content field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Image,
    Url,
}

/// One author-exposed, fillable parameter of a block type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub default: String,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, kind: FieldKind, default: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.replace('_', " "),
            name,
            kind,
            default: default.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeDefinition {
    #[serde(rename = "type")]
    pub block_type: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub schema: Vec<FieldSchema>,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
    /// Static render template with `${content.*}` / `${settings.*}` tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_document: Option<ElementTree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_compiled_html: Option<String>,
    /// Fallback `(normal, desktop)` declarations per element kind
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style_defaults: BTreeMap<ElementType, BTreeMap<String, String>>,
}

impl BlockTypeDefinition {
    pub fn new(block_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            name: name.into(),
            icon: String::new(),
            category: String::new(),
            schema: Vec::new(),
            settings: BTreeMap::new(),
            template: None,
            default_document: None,
            default_compiled_html: None,
            style_defaults: BTreeMap::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.schema.push(field);
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_default_document(mut self, root: Element) -> Self {
        self.default_document = Some(ElementTree::new(root));
        self
    }

    pub fn with_style_default(
        mut self,
        kind: ElementType,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.style_defaults
            .entry(kind)
            .or_default()
            .insert(property.into(), value.into());
        self
    }

    /// Default `data` for a new instance: every schema field at its default
    pub fn default_data(&self) -> Map<String, Value> {
        self.schema
            .iter()
            .map(|field| (field.name.clone(), Value::String(field.default.clone())))
            .collect()
    }

    pub fn has_static_template(&self) -> bool {
        self.template.is_some() || self.default_compiled_html.is_some()
    }

    /// Render the static markup for `data`.
    ///
    /// The template wins over `defaultCompiledHtml`; `None` when the type has
    /// neither.
    pub fn render(&self, data: &Map<String, Value>) -> Option<TemplateOutput> {
        if let Some(template) = &self.template {
            return Some(render_template(template, data, &self.settings));
        }
        self.default_compiled_html.as_ref().map(|html| TemplateOutput {
            output: html.clone(),
            warnings: Vec::new(),
        })
    }

    pub fn style_default(&self, kind: ElementType, property: &str) -> Option<&str> {
        self.style_defaults
            .get(&kind)
            .and_then(|props| props.get(property))
            .map(String::as_str)
    }
}

/// Source of block type definitions.
///
/// Injected wherever the engine needs to look up a type so alternate
/// registries (per theme, per shop) can be swapped in.
pub trait BlockRegistry {
    fn get(&self, block_type: &str) -> Option<&BlockTypeDefinition>;

    /// Register a definition, returning the one it replaced
    fn register(&mut self, definition: BlockTypeDefinition) -> Option<BlockTypeDefinition>;

    fn types(&self) -> Vec<&str>;

    fn contains(&self, block_type: &str) -> bool {
        self.get(block_type).is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryRegistry {
    #[serde(default)]
    types: BTreeMap<String, BlockTypeDefinition>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for definition in builtin_types() {
            registry.register(definition);
        }
        registry
    }

    pub fn from_json(json: &str) -> DocumentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl BlockRegistry for InMemoryRegistry {
    fn get(&self, block_type: &str) -> Option<&BlockTypeDefinition> {
        self.types.get(block_type)
    }

    fn register(&mut self, definition: BlockTypeDefinition) -> Option<BlockTypeDefinition> {
        self.types.insert(definition.block_type.clone(), definition)
    }

    fn types(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }
}

fn builtin_types() -> Vec<BlockTypeDefinition> {
    vec![
        BlockTypeDefinition::new("heading", "Heading")
            .with_icon("heading")
            .with_field(FieldSchema::new("heading", FieldKind::Text, "Heading"))
            .with_template("<h2>${content.heading}</h2>")
            .with_style_default(ElementType::Heading, "margin-bottom", "1rem"),
        BlockTypeDefinition::new("text", "Text")
            .with_icon("paragraph")
            .with_field(FieldSchema::new("text", FieldKind::Text, "Paragraph text..."))
            .with_template("<p>${content.text}</p>")
            .with_style_default(ElementType::Text, "margin-bottom", "1rem"),
        BlockTypeDefinition::new("image", "Image")
            .with_icon("image")
            .with_field(FieldSchema::new("image", FieldKind::Image, ""))
            .with_field(FieldSchema::new("alt", FieldKind::Text, ""))
            .with_template(r#"<img src="${content.image}" alt="${content.alt}" />"#)
            .with_style_default(ElementType::Image, "max-width", "100%")
            .with_style_default(ElementType::Image, "height", "auto"),
        BlockTypeDefinition::new("button", "Button")
            .with_icon("cursor")
            .with_field(FieldSchema::new("button", FieldKind::Text, "Button"))
            .with_field(FieldSchema::new("button_url", FieldKind::Url, "#"))
            .with_template(r#"<a class="btn btn-primary" href="${content.button_url}">${content.button}</a>"#),
        BlockTypeDefinition::new("columns", "Two columns")
            .with_icon("columns")
            .with_field(FieldSchema::new("left", FieldKind::Text, "Left column"))
            .with_field(FieldSchema::new("right", FieldKind::Text, "Right column"))
            .with_template(
                r#"<div class="row"><div class="col">${content.left}</div><div class="col">${content.right}</div></div>"#,
            )
            .with_style_default(ElementType::Row, "display", "flex")
            .with_style_default(ElementType::Row, "gap", "1rem"),
        BlockTypeDefinition::new("custom-html", "Custom HTML")
            .with_icon("code")
            .with_default_document(Element::fragment("root")),
    ]
}

//! The four generator stages.
//!
//! [`BlockGenerator::analyze`] runs the structural analyzer and returns a
//! [`BlockDraft`]. The draft is then configured (name, icon, field list,
//! template), previewed against sample data, and finally saved into a
//! [`BlockRegistry`]. Existing blocks in documents are never touched.

use crate::error::{GeneratorError, GeneratorResult};
use crate::slug::{is_field_name, type_slug};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tessera_analyzer::{AnalysisReport, Analyzer, ContentField};
use tessera_compiler_html::{compile_with_options, CompileOptions};
use tessera_document::{
    render_template, BlockRegistry, BlockTypeDefinition, Element, ElementType, FieldKind, FieldSchema, Limits,
    TemplateOutput,
};
use tracing::{debug, info, instrument, warn};

/// Class on the wrapper every generated template renders
pub const GENERATED_WRAPPER_CLASS: &str = "tessera-generated";

/// Setting holding the author's extra wrapper classes
pub const CSS_CLASS_SETTING: &str = "css_class";

pub const GENERATED_CATEGORY: &str = "generated";

/// Where a field's value sits in the analyzed tree
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldTarget {
    Content,
    Attribute(String),
}

/// A content field as the author configures it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Value found in the imported markup
    pub default: String,
    pub element_id: String,
    #[serde(skip)]
    target: FieldTarget,
}

impl DraftField {
    fn from_detected(field: &ContentField) -> Self {
        let target = match field.kind {
            FieldKind::Url => FieldTarget::Attribute("href".to_string()),
            FieldKind::Text | FieldKind::Image => FieldTarget::Content,
        };
        Self {
            name: field.name.clone(),
            kind: field.kind,
            default: field.value.clone(),
            element_id: field.element_id.clone(),
            target,
        }
    }

    fn token(&self) -> String {
        content_token(&self.name)
    }

    /// How the default reads when written back in place of the token
    fn literal(&self) -> String {
        match (&self.target, self.kind) {
            (FieldTarget::Content, FieldKind::Text) => self.default.clone(),
            _ => html_escape::encode_double_quoted_attribute(&self.default).into_owned(),
        }
    }
}

fn content_token(name: &str) -> String {
    format!("${{content.{}}}", name)
}

#[derive(Debug, Clone)]
pub struct BlockGenerator {
    analyzer: Analyzer,
}

impl Default for BlockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockGenerator {
    pub fn new() -> Self {
        Self {
            analyzer: Analyzer::new().with_id_seed("generated"),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.analyzer = self.analyzer.with_limits(limits);
        self
    }

    /// Analyze stage: parse `html` and start a draft named `name`
    #[instrument(skip(self, html), fields(bytes = html.len()))]
    pub fn analyze(&self, html: &str, name: &str) -> GeneratorResult<BlockDraft> {
        let block_type = type_slug(name);
        if block_type.is_empty() {
            return Err(GeneratorError::EmptyName);
        }

        let report = self.analyzer.analyze(html)?;
        let fields = report.content_fields.iter().map(DraftField::from_detected).collect();
        let icon = suggest_icon(&report).to_string();

        let mut draft = BlockDraft {
            name: name.trim().to_string(),
            block_type,
            icon,
            source: html.to_string(),
            report,
            fields,
            settings: BTreeMap::from([(CSS_CLASS_SETTING.to_string(), String::new())]),
            template: String::new(),
            customized: false,
        };
        draft.template = draft.generate_template();

        info!(
            block_type = %draft.block_type,
            fields = draft.fields.len(),
            elements = draft.report.element_count,
            "Analyzed block source"
        );
        Ok(draft)
    }
}

/// A block type under construction
#[derive(Debug, Clone)]
pub struct BlockDraft {
    name: String,
    block_type: String,
    icon: String,
    source: String,
    report: AnalysisReport,
    fields: Vec<DraftField>,
    settings: BTreeMap<String, String>,
    template: String,
    /// The author replaced the generated template
    customized: bool,
}

impl BlockDraft {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn report(&self) -> &AnalysisReport {
        &self.report
    }

    pub fn fields(&self) -> &[DraftField] {
        &self.fields
    }

    pub fn settings(&self) -> &BTreeMap<String, String> {
        &self.settings
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn is_customized(&self) -> bool {
        self.customized
    }

    // ---- configure --------------------------------------------------------

    /// Rename the type; the slug follows the name
    pub fn set_name(&mut self, name: &str) -> GeneratorResult<()> {
        let block_type = type_slug(name);
        if block_type.is_empty() {
            return Err(GeneratorError::EmptyName);
        }
        self.name = name.trim().to_string();
        self.block_type = block_type;
        if !self.customized {
            self.template = self.generate_template();
        }
        Ok(())
    }

    pub fn set_icon(&mut self, icon: impl Into<String>) {
        self.icon = icon.into();
    }

    pub fn set_setting(&mut self, key: &str, value: impl Into<String>) -> GeneratorResult<()> {
        if !is_field_name(key) {
            return Err(GeneratorError::InvalidFieldName(key.to_string()));
        }
        self.settings.insert(key.to_string(), value.into());
        Ok(())
    }

    fn field_index(&self, name: &str) -> GeneratorResult<usize> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| GeneratorError::UnknownField(name.to_string()))
    }

    pub fn rename_field(&mut self, name: &str, new_name: &str) -> GeneratorResult<()> {
        let index = self.field_index(name)?;
        if name == new_name {
            return Ok(());
        }
        if !is_field_name(new_name) {
            return Err(GeneratorError::InvalidFieldName(new_name.to_string()));
        }
        if self.fields.iter().any(|f| f.name == new_name) {
            return Err(GeneratorError::DuplicateField(new_name.to_string()));
        }

        let old_token = self.fields[index].token();
        self.fields[index].name = new_name.to_string();
        if self.customized {
            self.template = self.template.replace(&old_token, &content_token(new_name));
        } else {
            self.template = self.generate_template();
        }
        debug!(from = name, to = new_name, "Renamed field");
        Ok(())
    }

    /// Change the kind reported in the schema. The value stays where it was
    /// found in the markup.
    pub fn retype_field(&mut self, name: &str, kind: FieldKind) -> GeneratorResult<()> {
        let index = self.field_index(name)?;
        self.fields[index].kind = kind;
        Ok(())
    }

    /// Drop a field; its original value becomes fixed boilerplate
    pub fn remove_field(&mut self, name: &str) -> GeneratorResult<DraftField> {
        let index = self.field_index(name)?;
        let field = self.fields.remove(index);
        if self.customized {
            self.template = self.template.replace(&field.token(), &field.literal());
        } else {
            self.template = self.generate_template();
        }
        debug!(field = name, "Removed field");
        Ok(field)
    }

    /// Replace the generated template with the author's own
    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = template.into();
        self.customized = true;
    }

    /// Throw away template edits and regenerate from the analyzed tree
    pub fn reset_template(&mut self) {
        self.template = self.generate_template();
        self.customized = false;
    }

    fn generate_template(&self) -> String {
        let mut tree = self.report.tree.clone();
        for field in &self.fields {
            if let Some(element) = tree.find_mut(&field.element_id) {
                match &field.target {
                    FieldTarget::Content => element.content = field.token(),
                    FieldTarget::Attribute(attribute) => {
                        element.attributes.insert(attribute.clone(), field.token());
                    }
                }
            }
        }

        let options = CompileOptions {
            inline_styles: true,
            ..CompileOptions::default()
        };
        let compiled = compile_with_options(&self.block_type, &tree, &options);
        format!(
            "<div class=\"{} ${{settings.{}}}\">{}</div>",
            GENERATED_WRAPPER_CLASS,
            CSS_CLASS_SETTING,
            compiled.cache_string()
        )
    }

    // ---- preview ----------------------------------------------------------

    /// Field defaults, as new instances of the type receive them
    pub fn default_data(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), Value::String(f.default.clone())))
            .collect()
    }

    /// Preview stage: substitute `sample` (falling back to field defaults)
    /// into the template. Unknown tokens stay verbatim and come back as
    /// warnings.
    pub fn preview(&self, sample: &Map<String, Value>) -> TemplateOutput {
        let mut data = self.default_data();
        for (key, value) in sample {
            data.insert(key.clone(), value.clone());
        }
        render_template(&self.template, &data, &self.settings)
    }

    // ---- save -------------------------------------------------------------

    pub fn to_definition(&self) -> BlockTypeDefinition {
        let mut definition = BlockTypeDefinition::new(&self.block_type, &self.name)
            .with_icon(&self.icon)
            .with_template(&self.template);
        definition.category = GENERATED_CATEGORY.to_string();
        definition.settings = self.settings.clone();
        for field in &self.fields {
            definition = definition.with_field(FieldSchema::new(&field.name, field.kind, &field.default));
        }

        let rendered = render_template(&self.template, &self.default_data(), &self.settings);
        for warning in &rendered.warnings {
            warn!(block_type = %self.block_type, "{}", warning);
        }
        definition.default_compiled_html = Some(rendered.output);
        definition
    }

    /// Save stage: register the type. An existing type of the same slug is
    /// only replaced with `overwrite`.
    #[instrument(skip(self, registry), fields(block_type = %self.block_type))]
    pub fn save(&self, registry: &mut dyn BlockRegistry, overwrite: bool) -> GeneratorResult<BlockTypeDefinition> {
        if registry.contains(&self.block_type) && !overwrite {
            return Err(GeneratorError::TypeExists(self.block_type.clone()));
        }
        let definition = self.to_definition();
        if registry.register(definition.clone()).is_some() {
            info!("Replaced existing block type");
        } else {
            info!("Registered block type");
        }
        Ok(definition)
    }
}

/// Icon hint from what the markup contains
pub fn suggest_icon(report: &AnalysisReport) -> &'static str {
    let root = &report.tree.root;
    if contains_kind(root, ElementType::Image) || contains_kind(root, ElementType::Picture) {
        return "photo";
    }
    if contains_kind(root, ElementType::List) {
        return "list";
    }
    if !report.repeaters.is_empty() {
        return "grid";
    }

    let top_classes: Vec<&str> = root.children.iter().flat_map(|c| c.classes.iter()).collect();
    if any_class_contains(&top_classes, &["banner", "hero"]) {
        "banner"
    } else if any_class_contains(&top_classes, &["card", "box"]) {
        "card"
    } else if any_class_contains(&top_classes, &["feature", "merit", "benefit"]) {
        "badge"
    } else {
        "cube"
    }
}

fn any_class_contains(classes: &[&str], needles: &[&str]) -> bool {
    classes.iter().any(|c| needles.iter().any(|n| c.contains(n)))
}

fn contains_kind(element: &Element, kind: ElementType) -> bool {
    element.kind == kind || element.children.iter().any(|c| contains_kind(c, kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(html: &str) -> BlockDraft {
        BlockGenerator::new().analyze(html, "Hero Banner").unwrap()
    }

    #[test]
    fn test_template_tokens_replace_values() {
        let draft = draft(r#"<div class="hero"><h2>Title</h2><img src="x.jpg" alt="y"></div>"#);

        assert_eq!(draft.block_type(), "hero-banner");
        assert_eq!(
            draft.template(),
            r#"<div class="tessera-generated ${settings.css_class}"><div class="hero"><h2>${content.heading}</h2><img src="${content.image}" alt="y" /></div></div>"#
        );
    }

    #[test]
    fn test_link_fields_target_href() {
        let draft = draft(r#"<a class="btn" href="/buy">Buy now</a>"#);
        let names: Vec<&str> = draft.fields().iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["button", "button_url"]);
        assert!(draft
            .template()
            .contains(r#"<a class="btn" href="${content.button_url}">${content.button}</a>"#));
    }

    #[test]
    fn test_icon_suggestions() {
        assert_eq!(draft(r#"<div><img src="a.png"></div>"#).icon(), "photo");
        assert_eq!(draft("<ul><li>a</li></ul>").icon(), "list");
        assert_eq!(draft(r#"<section class="hero-top"><h2>x</h2></section>"#).icon(), "banner");
        assert_eq!(draft("<section><h2>x</h2></section>").icon(), "cube");
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = BlockGenerator::new().analyze("<p>x</p>", "  ?? ");
        assert!(matches!(result, Err(GeneratorError::EmptyName)));

        let mut draft = draft("<p>x</p>");
        assert!(matches!(draft.set_name(""), Err(GeneratorError::EmptyName)));
        assert_eq!(draft.block_type(), "hero-banner");
    }
}

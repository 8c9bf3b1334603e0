use crate::classify::{classify, keeps_inline_content};
use crate::dom::{parse_fragment, Dom, DomElement, DomNode};
use crate::error::{AnalyzeResult, StructuralParseError};
use crate::fields::{detect_content_fields, detect_repeaters, ContentField, Repeater};
use serde::Serialize;
use tessera_document::{ClassList, Element, ElementTree, ElementType, IdGenerator, Limits, StyleMap};
use tracing::{debug, info, instrument};

/// Marker attribute on the `<style>` element the compiler prepends to cached markup
pub const GENERATED_STYLE_ATTRIBUTE: &str = "data-tessera-block";

/// Prefix of generated per-element namespace classes
pub const GENERATED_CLASS_PREFIX: &str = "tsr-";

/// Everything the analyzer learns about one fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Always rooted at a `fragment` element
    pub tree: ElementTree,
    pub content_fields: Vec<ContentField>,
    pub css_classes: Vec<String>,
    /// Elements below the fragment root
    pub element_count: usize,
    /// Longest path below the fragment root, in elements
    pub depth: usize,
    pub repeaters: Vec<Repeater>,
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    limits: Limits,
    id_seed: String,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            id_seed: "fragment".to_string(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Element ids become `{seed}-{n}`; pass the owning block id
    pub fn with_id_seed(mut self, seed: impl Into<String>) -> Self {
        self.id_seed = seed.into();
        self
    }

    #[instrument(skip(self, html), fields(bytes = html.len(), seed = %self.id_seed))]
    pub fn analyze(&self, html: &str) -> AnalyzeResult<AnalysisReport> {
        let dom = parse_fragment(html, self.limits.max_depth)?;
        debug!(roots = dom.children.len(), "Parsed fragment");

        let mut builder = TreeBuilder {
            dom: &dom,
            ids: IdGenerator::from_seed(self.id_seed.clone()),
            count: 0,
            limits: &self.limits,
        };
        let mut root = Element::fragment(builder.ids.new_id());
        root.children = builder.build_children(&dom.children)?;
        let tree = ElementTree::new(root);

        // the fragment root is not counted
        let element_count = tree.count() - 1;
        let depth = tree.depth() - 1;
        let content_fields = detect_content_fields(&tree);
        let repeaters = detect_repeaters(&tree);
        let css_classes = dom
            .classes
            .iter()
            .filter(|c| !c.starts_with(GENERATED_CLASS_PREFIX))
            .cloned()
            .collect();

        info!(
            elements = element_count,
            depth,
            fields = content_fields.len(),
            "Analysis complete"
        );

        Ok(AnalysisReport {
            tree,
            content_fields,
            css_classes,
            element_count,
            depth,
            repeaters,
        })
    }
}

/// Analyze with default limits and ids seeded from `"fragment"`
pub fn analyze(html: &str) -> AnalyzeResult<AnalysisReport> {
    Analyzer::new().analyze(html)
}

struct TreeBuilder<'a, 'src> {
    dom: &'a Dom<'src>,
    ids: IdGenerator,
    count: usize,
    limits: &'a Limits,
}

impl TreeBuilder<'_, '_> {
    fn build_children(&mut self, nodes: &[DomNode]) -> AnalyzeResult<Vec<Element>> {
        let mut children = Vec::new();
        for node in nodes {
            if let Some(element) = self.build_node(node)? {
                children.push(element);
            }
        }
        Ok(children)
    }

    fn next_id(&mut self, span: std::ops::Range<usize>) -> AnalyzeResult<String> {
        self.count += 1;
        if self.count > self.limits.max_elements_per_block {
            return Err(StructuralParseError::new(
                format!("fragment holds more than {} elements", self.limits.max_elements_per_block),
                self.dom.source,
                span,
            ));
        }
        Ok(self.ids.new_id())
    }

    fn build_node(&mut self, node: &DomNode) -> AnalyzeResult<Option<Element>> {
        match node {
            DomNode::Text(range) => {
                let text = self.dom.text(range).trim();
                if text.is_empty() {
                    return Ok(None);
                }
                let id = self.next_id(range.clone())?;
                Ok(Some(Element::text_run(id, text)))
            }
            DomNode::Element(el) => self.build_element(el),
        }
    }

    fn build_element(&mut self, el: &DomElement) -> AnalyzeResult<Option<Element>> {
        if el.tag == "style" && el.attribute(GENERATED_STYLE_ATTRIBUTE).is_some() {
            return Ok(None);
        }

        let kind = classify(el, self.dom.source);
        let id = self.next_id(el.span.clone())?;
        let mut element = Element::new(id, kind, el.tag.clone());

        element.classes = ClassList::system(el.classes().filter(|c| !c.starts_with(GENERATED_CLASS_PREFIX)));
        for (name, value) in &el.attributes {
            match name.as_str() {
                "class" => {}
                "style" => element.styles = StyleMap::from_inline(value),
                "src" if kind == ElementType::Image => element.content = value.clone(),
                _ => {
                    element.attributes.insert(name.clone(), value.clone());
                }
            }
        }

        if kind == ElementType::Image {
            return Ok(Some(element));
        }
        if keeps_inline_content(kind, el) {
            element.content = self.dom.text(&el.inner).trim().to_string();
        } else {
            element.children = self.build_children(&el.children)?;
        }
        Ok(Some(element))
    }
}

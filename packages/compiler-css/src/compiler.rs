use crate::minify::{minify_css_selector, minify_css_value};
use crate::properties::PropertyCatalog;
use tessera_document::{Breakpoint, Element, ElementTree, StyleState};
use tracing::{debug, instrument};

/// Class every generated rule is scoped under
pub const CONTENT_SCOPE_CLASS: &str = "tessera-content";

#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    pub selector: String,
    pub properties: Vec<(String, String)>,
    pub media_query: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualCssDocument {
    pub rules: Vec<CssRule>,
}

impl VirtualCssDocument {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: CssRule) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Consecutive rules sharing a media query are grouped in one block
    pub fn to_css(&self) -> String {
        let mut css = String::new();

        for (media_query, rules) in self.groups() {
            match media_query {
                None => {
                    for rule in rules {
                        write_rule(&mut css, rule, "");
                    }
                }
                Some(mq) => {
                    css.push_str(mq);
                    css.push_str(" {\n");
                    for rule in rules {
                        write_rule(&mut css, rule, "  ");
                    }
                    css.push_str("}\n\n");
                }
            }
        }

        css
    }

    pub fn to_css_minified(&self) -> String {
        let mut css = String::new();

        for (media_query, rules) in self.groups() {
            if let Some(mq) = media_query {
                css.push_str(mq.trim());
                css.push('{');
            }
            for rule in rules {
                css.push_str(&minify_css_selector(&rule.selector));
                css.push('{');
                let body: Vec<String> = rule
                    .properties
                    .iter()
                    .map(|(k, v)| format!("{}:{}", k, minify_css_value(v)))
                    .collect();
                css.push_str(&body.join(";"));
                css.push('}');
            }
            if media_query.is_some() {
                css.push('}');
            }
        }

        css
    }

    fn groups(&self) -> Vec<(Option<&str>, &[CssRule])> {
        let mut groups = Vec::new();
        let mut start = 0;
        for i in 1..=self.rules.len() {
            if i == self.rules.len() || self.rules[i].media_query != self.rules[start].media_query {
                groups.push((self.rules[start].media_query.as_deref(), &self.rules[start..i]));
                start = i;
            }
        }
        groups
    }
}

fn write_rule(css: &mut String, rule: &CssRule, indent: &str) {
    css.push_str(indent);
    css.push_str(&rule.selector);
    css.push_str(" {\n");
    for (key, value) in &rule.properties {
        css.push_str(indent);
        css.push_str("  ");
        css.push_str(key);
        css.push_str(": ");
        css.push_str(value);
        css.push_str(";\n");
    }
    css.push_str(indent);
    css.push_str("}\n");
    if indent.is_empty() {
        css.push('\n');
    }
}

/// Stable class name identifying one element of one block.
///
/// Generated element ids already start with the block id, so the block id
/// is only prepended when it is missing.
pub fn get_style_namespace(block_id: &str, element_id: &str) -> String {
    let raw = if element_id.starts_with(block_id) {
        element_id.to_string()
    } else {
        format!("{}-{}", block_id, element_id)
    };
    let sanitized: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("tsr-{}", sanitized)
}

/// Elements that render as a tag of their own and so can carry a class
pub fn is_styleable(element: &Element) -> bool {
    !element.tag.is_empty() && !element.is_text_run()
}

/// Whether the element gets a namespace class in generated markup
pub fn needs_namespace(element: &Element) -> bool {
    is_styleable(element) && !element.styles.is_empty()
}

/// Compile the style maps of a block's tree into scoped rules.
///
/// Rules come out breakpoint-major (desktop, tablet, mobile), then in
/// element preorder, with the normal rule before the hover rule. Hidden
/// subtrees produce nothing.
#[instrument(skip(tree), fields(elements = tree.count()))]
pub fn compile_css(block_id: &str, tree: &ElementTree) -> VirtualCssDocument {
    let catalog = PropertyCatalog::standard();
    let mut styled = Vec::new();
    collect_styled(&tree.root, &mut styled);

    let mut document = VirtualCssDocument::new();
    for breakpoint in Breakpoint::ALL {
        for element in &styled {
            for state in StyleState::ALL {
                let Some(declarations) = element.styles.declarations(state, breakpoint) else {
                    continue;
                };
                document.add_rule(CssRule {
                    selector: format!(
                        ".{} .{}{}",
                        CONTENT_SCOPE_CLASS,
                        get_style_namespace(block_id, &element.id),
                        state.pseudo_class()
                    ),
                    properties: catalog
                        .sorted(declarations)
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                    media_query: breakpoint.media_query(),
                });
            }
        }
    }

    debug!(rules = document.rules.len(), "Compiled block styles");
    document
}

fn collect_styled<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    if !element.visible {
        return;
    }
    if needs_namespace(element) {
        out.push(element);
    }
    for child in &element.children {
        collect_styled(child, out);
    }
}

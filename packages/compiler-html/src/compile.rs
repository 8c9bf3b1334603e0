use crate::markup::{compile_element, CompileOptions, Context};
use tessera_compiler_css::compile_css;
use tessera_document::{Breakpoint, Element, ElementTree, StyleState};
use tracing::{debug, instrument};

/// Attribute marking the style element generated for a block
pub const GENERATED_STYLE_ATTRIBUTE: &str = "data-tessera-block";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledBlock {
    pub block_id: String,
    pub html: String,
    pub css: String,
}

impl CompiledBlock {
    /// The string persisted as a block's `compiledHtml`: the generated
    /// style element (when there is any CSS) followed by the markup.
    pub fn cache_string(&self) -> String {
        if self.css.is_empty() {
            return self.html.clone();
        }
        format!(
            "<style {}=\"{}\">{}</style>{}",
            GENERATED_STYLE_ATTRIBUTE,
            html_escape::encode_double_quoted_attribute(&self.block_id),
            self.css,
            self.html
        )
    }
}

pub fn compile(block_id: &str, tree: &ElementTree) -> CompiledBlock {
    compile_with_options(block_id, tree, &CompileOptions::default())
}

/// Compile a block's element tree to markup plus scoped CSS.
///
/// Output depends only on the tree and the options, so compiling an
/// unchanged tree twice gives byte-identical results.
#[instrument(skip(tree, options), fields(elements = tree.count(), inline = options.inline_styles))]
pub fn compile_with_options(block_id: &str, tree: &ElementTree, options: &CompileOptions) -> CompiledBlock {
    let mut ctx = Context::new(options, block_id);
    compile_element(&tree.root, &mut ctx);
    let html = ctx.get_output();

    let rules = if options.inline_styles {
        let mut stripped = tree.clone();
        strip_inline_slot(&mut stripped.root);
        compile_css(block_id, &stripped)
    } else {
        compile_css(block_id, tree)
    };
    let css = if options.minify_css {
        rules.to_css_minified()
    } else {
        rules.to_css()
    };

    debug!(html = html.len(), css = css.len(), "Compiled block");
    CompiledBlock {
        block_id: block_id.to_string(),
        html,
        css,
    }
}

fn strip_inline_slot(element: &mut Element) {
    let properties: Vec<String> = element
        .styles
        .declarations(StyleState::Normal, Breakpoint::Desktop)
        .map(|decls| decls.keys().cloned().collect())
        .unwrap_or_default();
    for property in properties {
        element.styles.remove(StyleState::Normal, Breakpoint::Desktop, &property);
    }
    for child in &mut element.children {
        strip_inline_slot(child);
    }
}

//! # Tessera CSS Compiler
//!
//! Turns the per-element style maps of a block into scoped CSS. Every rule
//! is prefixed with `.tessera-content` and targets the element's namespace
//! class, so styles from one block never leak into another.

mod compiler;
mod minify;
mod properties;
mod resolver;

pub use compiler::{
    compile_css, get_style_namespace, is_styleable, needs_namespace, CssRule, VirtualCssDocument,
    CONTENT_SCOPE_CLASS,
};
pub use minify::{minify_css_selector, minify_css_value};
pub use properties::{
    normalize_property, to_kebab_case, validate_value, PropertyCatalog, PropertyDefinition, PropertyGroup,
    StyleError,
};
pub use resolver::{resolve, StyleResolver};

/// Compile a block's styles to CSS text
pub fn compile_to_css(block_id: &str, tree: &tessera_document::ElementTree, minify: bool) -> String {
    let css = compile_css(block_id, tree);
    if minify {
        css.to_css_minified()
    } else {
        css.to_css()
    }
}

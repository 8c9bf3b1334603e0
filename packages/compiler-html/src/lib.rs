//! # Tessera HTML Compiler
//!
//! Compiles a block's element tree to `{ html, css }`, and assembles the
//! isolated preview document that frames compiled blocks together with
//! the destination theme's CSS.

mod compile;
mod markup;
mod preview;
mod theme;
mod variables;

pub use compile::{compile, compile_with_options, CompiledBlock, GENERATED_STYLE_ATTRIBUTE};
pub use markup::CompileOptions;
pub use preview::{export_html, render_block, render_preview, Diagnostic, PreviewDocument, PreviewOptions, Rendered};
pub use theme::{StaticTheme, ThemeProvider, CONTENT_SLOT};
pub use variables::{substitute_variables, MapVariables, VariableSource};

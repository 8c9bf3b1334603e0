use crate::compile::compile;
use crate::markup::{CompileOptions, Context};
use crate::theme::{ThemeProvider, CONTENT_SLOT};
use crate::variables::{substitute_variables, VariableSource};
use serde::Serialize;
use std::fmt;
use tessera_compiler_css::CONTENT_SCOPE_CLASS;
use tessera_document::{Block, BlockRegistry, Breakpoint, Document};
use tracing::{info, instrument, warn};

/// Something worth telling the author about a render that still succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    UnknownBlockType { block_id: String, block_type: String },
    MissingRepresentation { block_id: String },
    UnknownVariable { token: String },
    MissingContentSlot,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownBlockType { block_id, block_type } => {
                write!(f, "block {} has unknown type `{}`", block_id, block_type)
            }
            Diagnostic::MissingRepresentation { block_id } => {
                write!(f, "block {} has neither compiled markup nor an element tree", block_id)
            }
            Diagnostic::UnknownVariable { token } => write!(f, "unknown variable {{{{{}}}}}", token),
            Diagnostic::MissingContentSlot => write!(f, "base markup has no {} slot", CONTENT_SLOT),
        }
    }
}

/// Storefront body markup plus what went wrong producing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    pub html: String,
    pub viewport: Breakpoint,
    pub diagnostics: Vec<Diagnostic>,
}

impl PreviewDocument {
    /// A sandboxed frame with the viewport's fixed width.
    ///
    /// `sandbox=""` disables scripts, forms and same-origin access, so
    /// neither side's styles or scripts reach the other.
    pub fn iframe(&self) -> String {
        let width = self.viewport.preview_width();
        format!(
            "<iframe sandbox=\"\" width=\"{w}\" style=\"width: {w}px; border: 0;\" srcdoc=\"{doc}\"></iframe>",
            w = width,
            doc = html_escape::encode_safe(&self.html)
        )
    }
}

pub struct PreviewOptions<'a> {
    pub viewport: Breakpoint,
    pub theme: &'a dyn ThemeProvider,
    pub variables: &'a dyn VariableSource,
    pub pretty: bool,
}

/// Markup for a single block as it should appear right now
pub fn render_block(block: &Block, registry: &dyn BlockRegistry) -> Result<String, Diagnostic> {
    if !registry.contains(&block.block_type) {
        warn!(block = %block.id, block_type = %block.block_type, "Unknown block type");
        return Err(Diagnostic::UnknownBlockType {
            block_id: block.id.clone(),
            block_type: block.block_type.clone(),
        });
    }

    let cached = block.compiled_html.as_ref().filter(|_| block.locked);
    match (cached, &block.document) {
        (Some(html), _) => Ok(html.clone()),
        (None, Some(tree)) => Ok(compile(&block.id, tree).cache_string()),
        (None, None) => Err(Diagnostic::MissingRepresentation {
            block_id: block.id.clone(),
        }),
    }
}

fn placeholder(block: &Block) -> String {
    format!(
        "<div class=\"tessera-placeholder\" data-block-type=\"{}\"></div>",
        html_escape::encode_double_quoted_attribute(&block.block_type)
    )
}

/// Content markup for every block wrapped in the scope element.
///
/// A block that cannot be rendered is replaced by an inert placeholder so
/// its siblings still render.
pub fn export_html(document: &Document, registry: &dyn BlockRegistry, variables: &dyn VariableSource) -> Rendered {
    let options = CompileOptions::default();
    let (body, diagnostics) = render_content(document, registry, variables, &options);
    Rendered {
        html: body,
        diagnostics,
    }
}

fn render_content(
    document: &Document,
    registry: &dyn BlockRegistry,
    variables: &dyn VariableSource,
    options: &CompileOptions,
) -> (String, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let mut ctx = Context::new(options, "");

    ctx.add_line(&format!("<div class=\"{}\">", CONTENT_SCOPE_CLASS));
    ctx.indent();
    for block in document.blocks() {
        let markup = render_block(block, registry).unwrap_or_else(|diagnostic| {
            diagnostics.push(diagnostic);
            placeholder(block)
        });
        ctx.add_line(&format!(
            "<div class=\"tessera-block\" data-block-id=\"{}\">",
            html_escape::encode_double_quoted_attribute(&block.id)
        ));
        ctx.indent();
        ctx.add_line(&markup);
        ctx.dedent();
        ctx.add_line("</div>");
    }
    ctx.dedent();
    ctx.add_line("</div>");

    let (body, unknown) = substitute_variables(&ctx.get_output(), variables);
    diagnostics.extend(unknown.into_iter().map(|token| Diagnostic::UnknownVariable { token }));
    (body, diagnostics)
}

/// Assemble the full isolated preview document.
///
/// One compile serves every viewport: only the frame width changes and the
/// generated media queries do the rest.
#[instrument(skip_all, fields(blocks = document.len(), viewport = %options.viewport))]
pub fn render_preview(document: &Document, registry: &dyn BlockRegistry, options: &PreviewOptions) -> PreviewDocument {
    let compile_options = CompileOptions {
        pretty: options.pretty,
        ..CompileOptions::default()
    };
    let (content, mut diagnostics) = render_content(document, registry, options.variables, &compile_options);

    let body = match options.theme.base_markup() {
        Some(base) if base.contains(CONTENT_SLOT) => base.replacen(CONTENT_SLOT, &content, 1),
        Some(base) => {
            diagnostics.push(Diagnostic::MissingContentSlot);
            format!("{}{}", base, content)
        }
        None => content,
    };

    let mut ctx = Context::new(&compile_options, "");
    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html>");
    ctx.indent();
    ctx.add_line("<head>");
    ctx.indent();
    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line(&format!(
        "<meta name=\"viewport\" content=\"width={}, initial-scale=1.0\">",
        options.viewport.preview_width()
    ));
    let theme_css = options.theme.theme_css();
    if !theme_css.is_empty() {
        ctx.add_line("<style data-tessera-theme>");
        ctx.add_line(theme_css);
        ctx.add_line("</style>");
    }
    ctx.dedent();
    ctx.add_line("</head>");
    ctx.add_line("<body>");
    ctx.add_line(&body);
    ctx.add_line("</body>");
    ctx.dedent();
    ctx.add_line("</html>");

    info!(diagnostics = diagnostics.len(), "Rendered preview");
    PreviewDocument {
        html: ctx.get_output(),
        viewport: options.viewport,
        diagnostics,
    }
}

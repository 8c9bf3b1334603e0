use std::borrow::Cow;
use tessera_compiler_css::{get_style_namespace, is_styleable, PropertyCatalog};
use tessera_document::{Breakpoint, Element, ElementType, StyleState};

/// Options for markup compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Emit `(normal, desktop)` declarations as `style` attributes instead of rules
    pub inline_styles: bool,
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    pub minify_css: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            inline_styles: false,
            pretty: false,
            indent: "  ".to_string(),
            minify_css: false,
        }
    }
}

pub(crate) struct Context<'a> {
    pub options: &'a CompileOptions,
    block_id: &'a str,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    pub fn new(options: &'a CompileOptions, block_id: &'a str) -> Self {
        Self {
            options,
            block_id,
            depth: 0,
            buffer: String::new(),
        }
    }

    pub fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    pub fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    pub fn get_output(self) -> String {
        self.buffer
    }
}

/// Whether the element needs generated rules (and so a namespace class)
pub(crate) fn has_rules(element: &Element, inline_styles: bool) -> bool {
    if !is_styleable(element) {
        return false;
    }
    element
        .styles
        .slots()
        .any(|(state, bp, _)| !(inline_styles && state == StyleState::Normal && bp == Breakpoint::Desktop))
}

pub(crate) fn compile_element(element: &Element, ctx: &mut Context) {
    if !element.visible {
        return;
    }

    if element.kind == ElementType::Fragment {
        compile_children(&element.children, ctx);
    } else if element.is_text_run() {
        // Text runs hold source markup already
        ctx.add_line(&element.content);
    } else {
        compile_tag(element, ctx);
    }
}

fn compile_children(children: &[Element], ctx: &mut Context) {
    let mut previous: Option<&Element> = None;
    for child in children.iter().filter(|c| c.visible) {
        // Runs were trimmed on import; keep them apart from their siblings
        if let Some(prev) = previous {
            if !ctx.options.pretty && (prev.is_text_run() || child.is_text_run()) {
                ctx.add(" ");
            }
        }
        compile_element(child, ctx);
        previous = Some(child);
    }
}

fn compile_tag(element: &Element, ctx: &mut Context) {
    if ctx.options.pretty {
        ctx.add_indent();
    }
    ctx.add(&open_tag(element, ctx));

    let leaf = element.children.is_empty() && (element.content.is_empty() || element.kind == ElementType::Image);
    if leaf && is_self_closing(&element.tag) {
        ctx.add(" />");
        if ctx.options.pretty {
            ctx.add("\n");
        }
        return;
    }

    ctx.add(">");

    if element.kind != ElementType::Image && !element.content.is_empty() {
        ctx.add(&element.content);
    } else if element.children.iter().any(|c| c.visible) {
        if ctx.options.pretty {
            ctx.add("\n");
        }
        ctx.indent();
        compile_children(&element.children, ctx);
        ctx.dedent();
        if ctx.options.pretty {
            ctx.add_indent();
        }
    }

    ctx.add(&format!("</{}>", element.tag));
    if ctx.options.pretty {
        ctx.add("\n");
    }
}

fn open_tag(element: &Element, ctx: &Context) -> String {
    let mut tag = format!("<{}", element.tag);

    let mut classes: Vec<Cow<str>> = element.classes.iter().map(Cow::Borrowed).collect();
    if has_rules(element, ctx.options.inline_styles) {
        classes.push(Cow::Owned(get_style_namespace(ctx.block_id, &element.id)));
    }
    if !classes.is_empty() {
        push_attribute(&mut tag, "class", &classes.join(" "));
    }

    if element.kind == ElementType::Image && !element.content.is_empty() {
        push_attribute(&mut tag, "src", &element.content);
    }

    for (name, value) in &element.attributes {
        if matches!(name.as_str(), "class" | "style") {
            continue;
        }
        push_attribute(&mut tag, name, value);
    }

    if ctx.options.inline_styles {
        if let Some(declarations) = element.styles.declarations(StyleState::Normal, Breakpoint::Desktop) {
            let style: Vec<String> = PropertyCatalog::standard()
                .sorted(declarations)
                .into_iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            push_attribute(&mut tag, "style", &style.join("; "));
        }
    }

    tag
}

fn push_attribute(tag: &mut String, name: &str, value: &str) {
    tag.push(' ');
    tag.push_str(name);
    tag.push_str("=\"");
    tag.push_str(&html_escape::encode_double_quoted_attribute(value));
    tag.push('"');
}

pub(crate) fn is_self_closing(tag: &str) -> bool {
    matches!(
        tag,
        "img"
            | "input"
            | "br"
            | "hr"
            | "meta"
            | "link"
            | "area"
            | "base"
            | "col"
            | "embed"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

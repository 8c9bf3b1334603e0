/// Placeholder in base markup where block content is inserted
pub const CONTENT_SLOT: &str = "<!--tessera:content-->";

/// Destination shop styling used to make previews representative
pub trait ThemeProvider {
    fn theme_css(&self) -> &str;

    /// Markup wrapping the content, containing [`CONTENT_SLOT`]
    fn base_markup(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticTheme {
    css: String,
    base_markup: Option<String>,
}

impl StaticTheme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        if !self.css.is_empty() {
            self.css.push('\n');
        }
        self.css.push_str(&css.into());
        self
    }

    pub fn with_base_markup(mut self, markup: impl Into<String>) -> Self {
        self.base_markup = Some(markup.into());
        self
    }
}

impl ThemeProvider for StaticTheme {
    fn theme_css(&self) -> &str {
        &self.css
    }

    fn base_markup(&self) -> Option<&str> {
        self.base_markup.as_deref()
    }
}

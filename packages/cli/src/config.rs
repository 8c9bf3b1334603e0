use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tessera_compiler_html::{MapVariables, StaticTheme};
use tessera_document::{BlockRegistry, Breakpoint, InMemoryRegistry, Limits};

pub const DEFAULT_CONFIG_NAME: &str = "tessera.config.json";

/// Tessera configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub limits: Limits,

    /// CSS files of the destination theme, injected into previews
    #[serde(default)]
    pub theme_css: Vec<String>,

    /// Markup wrapping previewed content, with a `<!--tessera:content-->` slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_markup: Option<String>,

    /// Block type registry holding generated types
    #[serde(default = "default_registry")]
    pub registry: String,

    /// Sample values for `{{namespace.key}}` tokens
    #[serde(default)]
    pub variables: BTreeMap<String, BTreeMap<String, String>>,

    #[serde(default = "default_viewport")]
    pub default_viewport: Breakpoint,
}

fn default_registry() -> String {
    "blocks.json".to_string()
}

fn default_viewport() -> Breakpoint {
    Breakpoint::Desktop
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", DEFAULT_CONFIG_NAME))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn get_registry_path(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.registry)
    }

    /// Types stored in the registry file only
    pub fn read_registry_file(&self, cwd: &str) -> anyhow::Result<InMemoryRegistry> {
        let path = self.get_registry_path(cwd);
        if !path.exists() {
            return Ok(InMemoryRegistry::new());
        }
        let content = std::fs::read_to_string(&path)?;
        InMemoryRegistry::from_json(&content).with_context(|| format!("Invalid registry {}", path.display()))
    }

    pub fn write_registry_file(&self, cwd: &str, registry: &InMemoryRegistry) -> anyhow::Result<()> {
        std::fs::write(self.get_registry_path(cwd), registry.to_json()?)?;
        Ok(())
    }

    /// Built-in types overlaid with the registry file
    pub fn load_registry(&self, cwd: &str) -> anyhow::Result<InMemoryRegistry> {
        let mut registry = InMemoryRegistry::with_builtins();
        let stored = self.read_registry_file(cwd)?;
        for block_type in stored.types() {
            if let Some(definition) = stored.get(block_type) {
                registry.register(definition.clone());
            }
        }
        Ok(registry)
    }

    pub fn load_theme(&self, cwd: &str) -> anyhow::Result<StaticTheme> {
        let mut theme = StaticTheme::new();
        for file in &self.theme_css {
            let path = PathBuf::from(cwd).join(file);
            let css = std::fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.display()))?;
            theme = theme.with_css(css);
        }
        if let Some(file) = &self.base_markup {
            let path = PathBuf::from(cwd).join(file);
            let markup = std::fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.display()))?;
            theme = theme.with_base_markup(markup);
        }
        Ok(theme)
    }

    pub fn variable_source(&self) -> MapVariables {
        MapVariables::new(self.variables.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            theme_css: vec![],
            base_markup: None,
            registry: default_registry(),
            variables: BTreeMap::new(),
            default_viewport: default_viewport(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_compiler_html::{ThemeProvider, VariableSource};

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "limits": { "maxBlocks": 10 },
            "themeCss": ["theme/custom.css"],
            "baseMarkup": "theme/layout.html",
            "variables": { "product": { "name": "Oak table" } },
            "defaultViewport": "mobile"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.limits.max_blocks, 10);
        assert_eq!(config.limits.max_depth, 32);
        assert_eq!(config.theme_css, vec!["theme/custom.css"]);
        assert_eq!(config.base_markup.as_deref(), Some("theme/layout.html"));
        assert_eq!(config.registry, "blocks.json");
        assert_eq!(config.default_viewport, Breakpoint::Mobile);
        assert_eq!(
            config.variable_source().lookup("product", "name").as_deref(),
            Some("Oak table")
        );
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits, Limits::default());
        assert!(config.theme_css.is_empty());
        assert_eq!(config.default_viewport, Breakpoint::Desktop);
    }

    #[test]
    fn test_registry_overlays_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        let config = Config::default();

        let mut stored = InMemoryRegistry::new();
        stored.register(tessera_document::BlockTypeDefinition::new("promo", "Promo").with_template("<p>promo</p>"));
        config.write_registry_file(cwd, &stored).unwrap();

        let registry = config.load_registry(cwd).unwrap();
        assert!(registry.contains("promo"));
        assert!(registry.contains("heading"));
        assert_eq!(config.read_registry_file(cwd).unwrap().len(), 1);
    }

    #[test]
    fn test_load_theme() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        std::fs::write(dir.path().join("a.css"), "body { margin: 0; }").unwrap();
        std::fs::write(dir.path().join("b.css"), ".btn { color: red; }").unwrap();

        let config = Config {
            theme_css: vec!["a.css".to_string(), "b.css".to_string()],
            ..Config::default()
        };
        let theme = config.load_theme(cwd).unwrap();
        assert_eq!(theme.theme_css(), "body { margin: 0; }\n.btn { color: red; }");
        assert!(theme.base_markup().is_none());
    }
}

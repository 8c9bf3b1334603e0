//! Literal `${content.<field>}` / `${settings.<key>}` substitution.
//!
//! No control flow and no escaping: each recognised token is replaced by
//! its value verbatim. Anything else inside `${...}` is left untouched and
//! reported, so half-configured templates still render.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_REGEX.get_or_init(|| Regex::new(r"\$\{([^{}]*)\}").expect("valid token regex"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateWarning {
    /// Well-formed token naming a field or setting that does not exist
    UnknownToken(String),
    /// `${...}` whose body is not `content.<name>` or `settings.<name>`
    MalformedToken(String),
}

impl fmt::Display for TemplateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateWarning::UnknownToken(token) => write!(f, "unknown token {}", token),
            TemplateWarning::MalformedToken(token) => write!(f, "malformed token {}", token),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOutput {
    pub output: String,
    pub warnings: Vec<TemplateWarning>,
}

/// String form of a content value
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn render_template(
    template: &str,
    content: &Map<String, Value>,
    settings: &BTreeMap<String, String>,
) -> TemplateOutput {
    let mut warnings = Vec::new();

    let output = token_regex().replace_all(template, |caps: &regex::Captures| {
        let token = &caps[0];
        let body = caps[1].trim();

        let replacement = match body.split_once('.') {
            Some(("content", key)) if is_identifier(key) => match content.get(key) {
                Some(value) => Some(value_to_text(value)),
                None => {
                    warnings.push(TemplateWarning::UnknownToken(token.to_string()));
                    None
                }
            },
            Some(("settings", key)) if is_identifier(key) => match settings.get(key) {
                Some(value) => Some(value.clone()),
                None => {
                    warnings.push(TemplateWarning::UnknownToken(token.to_string()));
                    None
                }
            },
            _ => {
                warnings.push(TemplateWarning::MalformedToken(token.to_string()));
                None
            }
        };

        replacement.unwrap_or_else(|| token.to_string())
    });

    TemplateOutput {
        output: output.into_owned(),
        warnings,
    }
}

fn is_identifier(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content() -> Map<String, Value> {
        match json!({ "heading": "Hello", "count": 3 }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_substitutes_known_tokens() {
        let mut settings = BTreeMap::new();
        settings.insert("css_class".to_string(), "wide".to_string());

        let result = render_template(
            r#"<h2 class="${settings.css_class}">${content.heading} x${content.count}</h2>"#,
            &content(),
            &settings,
        );

        assert_eq!(result.output, r#"<h2 class="wide">Hello x3</h2>"#);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unknown_tokens_left_verbatim() {
        let result = render_template(
            "${content.missing} ${weird} ${content.heading}",
            &content(),
            &BTreeMap::new(),
        );

        assert_eq!(result.output, "${content.missing} ${weird} Hello");
        assert_eq!(
            result.warnings,
            vec![
                TemplateWarning::UnknownToken("${content.missing}".to_string()),
                TemplateWarning::MalformedToken("${weird}".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_recursive_expansion() {
        let mut map = Map::new();
        map.insert("a".to_string(), Value::String("${content.b}".to_string()));
        map.insert("b".to_string(), Value::String("nope".to_string()));

        let result = render_template("${content.a}", &map, &BTreeMap::new());
        assert_eq!(result.output, "${content.b}");
    }
}

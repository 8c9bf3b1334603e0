//! `{{namespace.key}}` substitution against live shop data.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Supplies live values (product, shop, category, ...) at render time
pub trait VariableSource {
    fn lookup(&self, namespace: &str, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapVariables {
    values: BTreeMap<String, BTreeMap<String, String>>,
}

impl MapVariables {
    pub fn new(values: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self { values }
    }

    pub fn with(mut self, namespace: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .entry(namespace.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }
}

impl VariableSource for MapVariables {
    fn lookup(&self, namespace: &str, key: &str) -> Option<String> {
        self.values.get(namespace)?.get(key).cloned()
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_-]+)\.([A-Za-z0-9_.-]+)\s*\}\}").expect("variable pattern is valid")
    })
}

/// Replace every known token; unknown tokens stay verbatim and are returned
pub fn substitute_variables(text: &str, source: &dyn VariableSource) -> (String, Vec<String>) {
    let mut unknown = Vec::new();
    let output = token_pattern().replace_all(text, |caps: &Captures| match source.lookup(&caps[1], &caps[2]) {
        Some(value) => html_escape::encode_safe(&value).into_owned(),
        None => {
            let token = format!("{}.{}", &caps[1], &caps[2]);
            if !unknown.contains(&token) {
                unknown.push(token);
            }
            caps[0].to_string()
        }
    });
    (output.into_owned(), unknown)
}

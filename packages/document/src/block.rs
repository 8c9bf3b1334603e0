use crate::tree::ElementTree;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Which representation of a block is authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockState {
    /// `compiledHtml` is authoritative
    Locked,
    /// `document` is authoritative
    Editing,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloned_from: Option<String>,
    /// Provenance keys written by other tools, preserved as-is
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl BlockMeta {
    pub fn created(from: impl Into<String>) -> Self {
        Self {
            created_from: from.into(),
            created_at: Some(Utc::now()),
            ..Self::default()
        }
    }
}

/// Top-level content unit of a document.
///
/// Both `document` and `compiledHtml` may be present at once; `locked`
/// decides which one is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<ElementTree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiled_html: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub meta: BlockMeta,
}

impl Block {
    pub fn new(id: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            data: Map::new(),
            document: None,
            compiled_html: None,
            locked: true,
            meta: BlockMeta::default(),
        }
    }

    /// A locked block holding imported markup
    pub fn from_html(id: impl Into<String>, block_type: impl Into<String>, html: impl Into<String>) -> Self {
        let mut block = Self::new(id, block_type);
        block.compiled_html = Some(html.into());
        block.meta = BlockMeta::created("raw-html-import");
        block
    }

    pub fn state(&self) -> BlockState {
        if self.locked {
            BlockState::Locked
        } else {
            BlockState::Editing
        }
    }

    pub fn is_editing(&self) -> bool {
        self.state() == BlockState::Editing
    }

    pub fn element_count(&self) -> usize {
        self.document.as_ref().map(ElementTree::count).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_shape() {
        let mut block = Block::from_html("b-1", "custom-html", "<p>Hi</p>");
        block.meta.created_at = None;

        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "b-1",
                "type": "custom-html",
                "data": {},
                "compiledHtml": "<p>Hi</p>",
                "locked": true,
                "meta": { "createdFrom": "raw-html-import" }
            })
        );
    }

    #[test]
    fn test_unknown_meta_keys_survive() {
        let json = r#"{"id":"b","type":"text","locked":false,"meta":{"source":"shop-7"}}"#;
        let block: Block = serde_json::from_str(json).unwrap();

        assert_eq!(block.state(), BlockState::Editing);
        assert_eq!(block.meta.extra.get("source"), Some(&Value::String("shop-7".to_string())));
        let again = serde_json::to_string(&block).unwrap();
        assert!(again.contains(r#""source":"shop-7""#));
    }
}

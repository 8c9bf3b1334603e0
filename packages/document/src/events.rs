use serde::{Deserialize, Serialize};

/// Signals for the editor shell and persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DocumentEvent {
    #[serde(rename_all = "camelCase")]
    BlockSelected { block_id: String },
    #[serde(rename_all = "camelCase")]
    BlockEnteredEditing { block_id: String },
    #[serde(rename_all = "camelCase")]
    BlockLeftEditing { block_id: String, committed: bool },
    /// Emitted after any structural mutation
    DocumentChanged,
}

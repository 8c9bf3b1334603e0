use crate::error::{DocumentError, DocumentResult};
use serde::{Deserialize, Serialize};

/// Hard caps that bound analyzer and compiler work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    #[serde(default = "default_max_blocks")]
    pub max_blocks: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_max_elements")]
    pub max_elements_per_block: usize,
}

fn default_max_blocks() -> usize {
    200
}

fn default_max_depth() -> usize {
    32
}

fn default_max_elements() -> usize {
    2000
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_blocks: default_max_blocks(),
            max_depth: default_max_depth(),
            max_elements_per_block: default_max_elements(),
        }
    }
}

impl Limits {
    pub fn check_blocks(&self, count: usize) -> DocumentResult<()> {
        if count > self.max_blocks {
            return Err(DocumentError::LimitExceeded(format!(
                "document would hold {} blocks (max {})",
                count, self.max_blocks
            )));
        }
        Ok(())
    }

    pub fn check_depth(&self, depth: usize) -> DocumentResult<()> {
        if depth > self.max_depth {
            return Err(DocumentError::LimitExceeded(format!(
                "element tree depth {} exceeds {}",
                depth, self.max_depth
            )));
        }
        Ok(())
    }

    pub fn check_elements(&self, count: usize) -> DocumentResult<()> {
        if count > self.max_elements_per_block {
            return Err(DocumentError::LimitExceeded(format!(
                "block would hold {} elements (max {})",
                count, self.max_elements_per_block
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let limits: Limits = serde_json::from_str(r#"{"maxDepth": 8}"#).unwrap();
        assert_eq!(limits.max_depth, 8);
        assert_eq!(limits.max_blocks, 200);
        assert!(limits.check_depth(8).is_ok());
        assert!(limits.check_depth(9).is_err());
    }
}

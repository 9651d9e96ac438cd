//! Traversal configuration.

use serde::{Deserialize, Serialize};

/// Limits applied to every history read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Maximum number of blocks a single walk may visit before the chain is
    /// reported as malformed.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum number of entry fetches in flight for one block.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

fn default_max_depth() -> usize { 500_000 }
fn default_fetch_concurrency() -> usize { 8 }

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

impl ReaderConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: ReaderConfig = serde_json::from_str(r#"{"max_depth": 10}"#).unwrap();
        assert_eq!(cfg.max_depth, 10);
        assert_eq!(cfg.fetch_concurrency, 8);
    }
}

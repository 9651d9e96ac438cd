//! CLI configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use chainhistory_core::ReaderConfig;
use chainhistory_rpc::RpcSourceConfig;

use crate::logging::LogConfig;

/// Top-level configuration, loadable from a JSON file.
///
/// ```json
/// {
///   "rpc":    { "url": "http://localhost:8088/v2", "request_timeout_ms": 30000 },
///   "reader": { "max_depth": 500000, "fetch_concurrency": 8 },
///   "log":    { "level": "info", "json": false }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub rpc: RpcSourceConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }
}

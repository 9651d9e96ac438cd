//! Connection settings for a factomd node.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;

/// Default factomd v2 API endpoint.
pub const DEFAULT_URL: &str = "http://localhost:8088/v2";

/// Configuration for [`HttpRpcClient`](crate::HttpRpcClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSourceConfig {
    /// factomd API endpoint, e.g. `"http://localhost:8088/v2"`.
    #[serde(default = "default_url")]
    pub url: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_url() -> String { DEFAULT_URL.to_string() }
fn default_request_timeout_ms() -> u64 { 30_000 }

impl Default for RpcSourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            request_timeout_ms: default_request_timeout_ms(),
            retry: RetryConfig::default(),
        }
    }
}

impl RpcSourceConfig {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Self::default() }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: RpcSourceConfig =
            serde_json::from_str(r#"{"url":"http://node:8088/v2","retry":{"max_retries":1}}"#).unwrap();
        assert_eq!(cfg.url, "http://node:8088/v2");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.retry.max_retries, 1);
        assert_eq!(cfg.retry.initial_backoff_ms, 100);
    }
}

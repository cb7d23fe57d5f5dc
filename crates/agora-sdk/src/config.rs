use std::time::Duration;

use serde::{Deserialize, Serialize};

use agora_store::GatewayConfig;

use crate::cache::DEFAULT_CACHE_CAPACITY;

/// Construction-time configuration for a [`PostStore`] client.
///
/// This is the client's only environment coupling: no CLI, no environment
/// variables, no persisted local state. The post cache dies with the
/// process.
///
/// [`PostStore`]: crate::client::PostStore
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Ledger node endpoint.
    pub ledger_url: String,
    /// Hex address of the post registry contract on the ledger.
    pub registry: String,
    /// Blob gateway coordinates.
    pub store: GatewayConfig,
    /// Post cache bound, in entries.
    pub cache_capacity: usize,
    /// Deadline applied to each external call. A hung collaborator
    /// surfaces as a timeout error instead of blocking the caller forever.
    pub op_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ledger_url: "http://localhost:8545".into(),
            registry: String::new(),
            store: GatewayConfig::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            op_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Configuration for a specific ledger node and registry, with default
    /// gateway, cache, and deadline settings.
    pub fn new(ledger_url: impl Into<String>, registry: impl Into<String>) -> Self {
        Self {
            ledger_url: ledger_url.into(),
            registry: registry.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_node() {
        let config = ClientConfig::default();
        assert_eq!(config.ledger_url, "http://localhost:8545");
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(config.op_timeout, Duration::from_secs(30));
    }

    #[test]
    fn new_keeps_remaining_defaults() {
        let config = ClientConfig::new("https://ledger.example", "0xabc");
        assert_eq!(config.ledger_url, "https://ledger.example");
        assert_eq!(config.registry, "0xabc");
        assert_eq!(config.store, GatewayConfig::default());
    }

    #[test]
    fn serde_roundtrip() {
        let config = ClientConfig::new("https://ledger.example", "0xabc");
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}

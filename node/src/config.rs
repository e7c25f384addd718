//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};

use crate::NodeError;

/// Configuration for a votechain node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Address to bind the RPC listener to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// RPC port.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Per-call timeout for ledger operations, in seconds.
    #[serde(default = "default_ledger_timeout")]
    pub ledger_timeout_secs: u64,

    /// Maximum re-submissions after retryable ledger failures.
    #[serde(default = "default_ledger_retries")]
    pub ledger_max_retries: u32,

    /// How often the repair loop drains the pending-repair queue, in seconds.
    #[serde(default = "default_repair_interval")]
    pub repair_interval_secs: u64,

    /// Seed the store with demo geography, voters, and an active election.
    /// Development deployments only.
    #[serde(default)]
    pub seed_demo_data: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    7070
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ledger_timeout() -> u64 {
    10
}

fn default_ledger_retries() -> u32 {
    2
}

fn default_repair_interval() -> u64 {
    30
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("NodeConfig is always serializable to TOML")
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            rpc_port: default_rpc_port(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            ledger_timeout_secs: default_ledger_timeout(),
            ledger_max_retries: default_ledger_retries(),
            repair_interval_secs: default_repair_interval(),
            seed_demo_data: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.rpc_port, config.rpc_port);
        assert_eq!(parsed.repair_interval_secs, config.repair_interval_secs);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.rpc_port, 7070);
        assert_eq!(config.log_format, "human");
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            rpc_port = 9999
            seed_demo_data = true
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.rpc_port, 9999);
        assert!(config.seed_demo_data);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn config_file_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rpc_port = 7171").unwrap();
        let config = NodeConfig::from_toml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.rpc_port, 7171);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/votechain.toml");
        assert!(matches!(result.unwrap_err(), NodeError::Config(_)));
    }
}

//! Service configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::sync::{FailurePolicy, SyncPolicy};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub ipfs: IpfsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ethereum JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Address of the registry contract
    #[serde(default)]
    pub registry_address: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpfsConfig {
    /// IPFS HTTP API base URL
    #[serde(default = "default_ipfs_url")]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

/// Sync pass configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between passes
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// `skip` or `abort_pass`
    #[serde(default)]
    pub service_metadata_failure: FailurePolicy,

    /// Replace a service's schemas with the freshly compiled bundle
    #[serde(default = "default_true")]
    pub reset_service_schemas: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Serve the schema registry over HTTP
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// HTTP API port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

// Defaults
fn default_rpc_url() -> String { "http://localhost:8545".to_string() }
fn default_ipfs_url() -> String { "http://localhost:5001".to_string() }
fn default_request_timeout() -> u64 { 30 }
fn default_database_path() -> PathBuf { PathBuf::from("registry-sync.db") }
fn default_interval() -> u64 { 100 * 60 * 60 } // 100 hours
fn default_true() -> bool { true }
fn default_http_port() -> u16 { 8080 }

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            registry_address: String::new(),
            timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            api_url: default_ipfs_url(),
            timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            service_metadata_failure: FailurePolicy::default(),
            reset_service_schemas: true,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            http_port: default_http_port(),
        }
    }
}

impl Config {
    /// Read a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.ledger.registry_address.trim().is_empty() {
            return Err(Error::Config("ledger.registry_address is required".to_string()));
        }
        if crate::identity::parse_address(&self.ledger.registry_address).is_none() {
            return Err(Error::Config(format!(
                "ledger.registry_address is not a valid address: {}",
                self.ledger.registry_address
            )));
        }
        if self.sync.interval_secs == 0 {
            return Err(Error::Config("sync.interval_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync.interval_secs)
    }

    pub fn sync_policy(&self) -> SyncPolicy {
        SyncPolicy {
            service_metadata_failure: self.sync.service_metadata_failure,
            reset_service_schemas: self.sync.reset_service_schemas,
        }
    }
}

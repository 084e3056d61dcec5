//! Sync pipeline - mirrors the ledger registry locally
//!
//! Handles:
//! - One full pass over organizations and their services
//! - Periodic re-runs with cooperative shutdown

pub mod orchestrator;
pub mod scheduler;

use serde::{Deserialize, Serialize};

// Re-exports
pub use orchestrator::Syncer;
pub use scheduler::run_periodic;

/// What to do when a service's metadata cannot be fetched or decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log and move on to the next service
    #[default]
    Skip,
    /// Log and end the whole pass
    AbortPass,
}

/// Per-pass behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    pub service_metadata_failure: FailurePolicy,
    /// Replace a service's schema entries with the ones rebuilt this pass
    pub reset_service_schemas: bool,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            service_metadata_failure: FailurePolicy::Skip,
            reset_service_schemas: true,
        }
    }
}

//! registry-sync: mirrors an on-chain service marketplace into a local store
//!
//! Each sync pass walks the organizations registered in the ledger's registry
//! contract, resolves their metadata from IPFS, persists organizations,
//! groups and services to SQLite, and compiles every service's protobuf
//! bundle into an in-memory [`SchemaRegistry`] that can be rendered for
//! display or queried by service identity.
//!
//! ## Layout
//!
//! - `ledger` - registry contract client (JSON-RPC `eth_call` + ABI codec)
//! - `content` - IPFS client and schema bundle extraction
//! - `metadata` - organization/service metadata JSON
//! - `store` - persistence seam and the SQLite implementation
//! - `schema` - protobuf compilation and the schema registry
//! - `sync` - the sync pass and its scheduler
//! - `api` - HTTP surface over the schema registry

pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod metadata;
pub mod schema;
pub mod store;
pub mod sync;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use schema::{SchemaCompiler, SchemaRegistry};
pub use sync::{FailurePolicy, SyncPolicy, Syncer};

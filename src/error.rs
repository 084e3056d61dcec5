//! Error types for registry-sync

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found on ledger: {0}")]
    NotFound(String),

    #[error("Ledger RPC error: {0}")]
    Ledger(String),

    #[error("ABI decode error: {0}")]
    Abi(String),

    #[error("Content store error: {0}")]
    Content(String),

    #[error("Metadata decode error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Bundle extraction error: {0}")]
    Bundle(String),

    #[error("Schema compile error: {0}")]
    Compile(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

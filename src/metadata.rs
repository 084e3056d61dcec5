//! Organization and service metadata documents
//!
//! Both are JSON files published to IPFS and referenced from the registry
//! contract. Only the fields the local registry keeps are modelled; unknown
//! fields are ignored and missing ones default to empty.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Decode a metadata JSON document.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Free text description, either a bare string or the structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Detailed {
        #[serde(default)]
        description: String,
        #[serde(default)]
        short_description: String,
        #[serde(default)]
        url: String,
    },
}

impl Default for Description {
    fn default() -> Self {
        Description::Text(String::new())
    }
}

impl Description {
    pub fn description(&self) -> &str {
        match self {
            Description::Text(text) => text,
            Description::Detailed { description, .. } => description,
        }
    }

    pub fn short_description(&self) -> &str {
        match self {
            Description::Text(_) => "",
            Description::Detailed { short_description, .. } => short_description,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Description::Text(_) => "",
            Description::Detailed { url, .. } => url,
        }
    }
}

/// Organization metadata document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationMetadata {
    #[serde(default)]
    pub org_name: String,

    #[serde(default)]
    pub org_type: String,

    #[serde(default)]
    pub description: Description,

    #[serde(default)]
    pub groups: Vec<OrganizationGroup>,
}

/// Payment group of an organization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationGroup {
    #[serde(default)]
    pub group_name: String,

    #[serde(default)]
    pub group_id: String,

    #[serde(default)]
    pub payment: Option<GroupPayment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupPayment {
    #[serde(default)]
    pub payment_address: String,

    #[serde(default)]
    pub payment_expiration_threshold: u64,
}

/// Service metadata document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    #[serde(default)]
    pub version: u32,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub encoding: String,

    #[serde(default)]
    pub service_type: String,

    /// Legacy bundle location (bare CID)
    #[serde(default)]
    pub model_ipfs_hash: String,

    /// Bundle location with scheme, e.g. `ipfs://<cid>`
    #[serde(default)]
    pub service_api_source: String,

    #[serde(default)]
    pub mpe_address: String,

    #[serde(default)]
    pub service_description: Description,
}

impl ServiceMetadata {
    /// Where the schema bundle lives, preferring the legacy hash when both are set.
    pub fn bundle_locator(&self) -> Option<&str> {
        [&self.model_ipfs_hash, &self.service_api_source]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

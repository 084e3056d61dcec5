//! Persistence layer - local mirror of the registry
//!
//! Rows are written once per sync pass; the store assigns local ids.

pub mod sqlite;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::metadata::{OrganizationGroup, OrganizationMetadata, ServiceMetadata};

pub use sqlite::SqliteStore;

/// Organization row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationRow {
    /// Display identity of the on-chain id
    pub chain_id: String,
    pub owner: String,
    pub name: String,
    pub org_type: String,
    pub description: String,
    pub short_description: String,
    pub url: String,
}

impl OrganizationRow {
    pub fn new(chain_id: String, owner: String, meta: &OrganizationMetadata) -> Self {
        Self {
            chain_id,
            owner,
            name: meta.org_name.clone(),
            org_type: meta.org_type.clone(),
            description: meta.description.description().to_string(),
            short_description: meta.description.short_description().to_string(),
            url: meta.description.url().to_string(),
        }
    }
}

/// Organization group row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationGroupRow {
    pub group_id: String,
    pub group_name: String,
    pub payment_address: String,
}

impl From<&OrganizationGroup> for OrganizationGroupRow {
    fn from(group: &OrganizationGroup) -> Self {
        Self {
            group_id: group.group_id.clone(),
            group_name: group.group_name.clone(),
            payment_address: group
                .payment
                .as_ref()
                .map(|p| p.payment_address.clone())
                .unwrap_or_default(),
        }
    }
}

/// Service row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRow {
    /// Local id of the parent organization (0 if its insert failed)
    pub organization_id: i64,
    pub org_chain_id: String,
    pub chain_id: String,
    pub display_name: String,
    pub encoding: String,
    pub service_type: String,
    pub description: String,
    pub short_description: String,
    pub url: String,
    pub bundle_locator: String,
    pub mpe_address: String,
}

impl ServiceRow {
    pub fn new(
        organization_id: i64,
        org_chain_id: String,
        chain_id: String,
        meta: &ServiceMetadata,
    ) -> Self {
        Self {
            organization_id,
            org_chain_id,
            chain_id,
            display_name: meta.display_name.clone(),
            encoding: meta.encoding.clone(),
            service_type: meta.service_type.clone(),
            description: meta.service_description.description().to_string(),
            short_description: meta.service_description.short_description().to_string(),
            url: meta.service_description.url().to_string(),
            bundle_locator: meta.bundle_locator().unwrap_or_default().to_string(),
            mpe_address: meta.mpe_address.clone(),
        }
    }
}

/// Write access to the local registry mirror
#[async_trait]
pub trait RegistryStore: Send + Sync {
    async fn create_organization(&self, row: &OrganizationRow) -> Result<i64>;

    async fn create_organization_groups(
        &self,
        organization_id: i64,
        groups: &[OrganizationGroupRow],
    ) -> Result<()>;

    async fn create_service(&self, row: &ServiceRow) -> Result<i64>;
}

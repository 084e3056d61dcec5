//! Ledger access - the marketplace registry contract
//!
//! The sync pass only needs three read calls: enumerate organization ids,
//! fetch one organization, fetch one service registration.

pub mod abi;
pub mod registry;

use async_trait::async_trait;

use crate::error::Result;
use crate::identity::{checksum_address, display_identity, Address, OnChainId};

pub use registry::EthRegistryClient;

/// Organization as recorded on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationRecord {
    pub id: OnChainId,
    pub metadata_uri: Vec<u8>,
    pub owner: Address,
    pub members: Vec<Address>,
    pub service_ids: Vec<OnChainId>,
}

impl OrganizationRecord {
    pub fn identity(&self) -> String {
        display_identity(&self.id)
    }

    pub fn owner_hex(&self) -> String {
        checksum_address(&self.owner)
    }

    /// Metadata locator as text.
    pub fn metadata_locator(&self) -> String {
        display_identity(&self.metadata_uri)
    }
}

/// Service registration as recorded on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub id: OnChainId,
    pub metadata_uri: Vec<u8>,
}

impl ServiceRecord {
    pub fn metadata_locator(&self) -> String {
        display_identity(&self.metadata_uri)
    }
}

/// Read access to the registry contract
#[async_trait]
pub trait Ledger: Send + Sync {
    /// All registered organization ids.
    async fn list_organization_ids(&self) -> Result<Vec<OnChainId>>;

    /// Full organization record.
    async fn get_organization(&self, org_id: &OnChainId) -> Result<OrganizationRecord>;

    /// Service registration under an organization.
    async fn get_service(&self, org_id: &OnChainId, service_id: &OnChainId) -> Result<ServiceRecord>;
}

//! In-memory collaborators for sync pass tests

#![allow(dead_code)]

pub mod abi;

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use registry_sync::content::ContentStore;
use registry_sync::identity::{to_on_chain_id, OnChainId};
use registry_sync::ledger::{Ledger, OrganizationRecord, ServiceRecord};
use registry_sync::schema::ProtoxCompiler;
use registry_sync::store::{OrganizationGroupRow, OrganizationRow, RegistryStore, ServiceRow};
use registry_sync::{Error, Result, SchemaRegistry, Syncer};

pub const OWNER: [u8; 20] = [
    0x5a, 0xae, 0xb6, 0x05, 0x3f, 0x3e, 0x94, 0xc9, 0xb9, 0xa0, 0x9f, 0x33, 0x66, 0x94, 0x35, 0xe7,
    0xef, 0x1b, 0xea, 0xed,
];
pub const OWNER_HEX: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

pub const CALCULATOR_PROTO: &str = r#"
syntax = "proto3";

package example_service;

message Numbers {
    float a = 1;
    float b = 2;
}

message Result {
    float value = 1;
}

service Calculator {
    rpc add(Numbers) returns (Result) {}
}
"#;

pub fn id(s: &str) -> OnChainId {
    to_on_chain_id(s).expect("identity fits in 32 bytes")
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Default)]
pub struct FakeLedger {
    pub organizations: Vec<OrganizationRecord>,
    /// Ids listed by the registry but missing when fetched
    pub dangling: Vec<OnChainId>,
    pub services: HashMap<(OnChainId, OnChainId), ServiceRecord>,
    pub fail_listing: bool,
    pub list_calls: AtomicUsize,
}

impl FakeLedger {
    pub fn organization(mut self, org: &str, metadata_uri: &str, services: &[&str]) -> Self {
        self.organizations.push(OrganizationRecord {
            id: id(org),
            metadata_uri: metadata_uri.as_bytes().to_vec(),
            owner: OWNER,
            members: vec![],
            service_ids: services.iter().map(|s| id(s)).collect(),
        });
        self
    }

    pub fn service(mut self, org: &str, service: &str, metadata_uri: &str) -> Self {
        self.services.insert(
            (id(org), id(service)),
            ServiceRecord {
                id: id(service),
                metadata_uri: metadata_uri.as_bytes().to_vec(),
            },
        );
        self
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn list_organization_ids(&self) -> Result<Vec<OnChainId>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(Error::Ledger("connection refused".to_string()));
        }
        let mut ids: Vec<OnChainId> = self.dangling.clone();
        ids.extend(self.organizations.iter().map(|o| o.id));
        Ok(ids)
    }

    async fn get_organization(&self, org_id: &OnChainId) -> Result<OrganizationRecord> {
        self.organizations
            .iter()
            .find(|o| &o.id == org_id)
            .cloned()
            .ok_or_else(|| Error::NotFound("organization".to_string()))
    }

    async fn get_service(&self, org_id: &OnChainId, service_id: &OnChainId) -> Result<ServiceRecord> {
        self.services
            .get(&(*org_id, *service_id))
            .cloned()
            .ok_or_else(|| Error::NotFound("service".to_string()))
    }
}

// =============================================================================
// Content store
// =============================================================================

#[derive(Default)]
pub struct FakeContent {
    pub files: HashMap<String, Vec<u8>>,
}

impl FakeContent {
    pub fn file(mut self, locator: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(locator.to_string(), content.into());
        self
    }
}

#[async_trait]
impl ContentStore for FakeContent {
    async fn get_file(&self, locator: &str) -> Result<Vec<u8>> {
        self.files
            .get(locator)
            .cloned()
            .ok_or_else(|| Error::Content(format!("{} not pinned", locator)))
    }
}

// =============================================================================
// Registry store
// =============================================================================

#[derive(Default)]
pub struct FakeStore {
    pub organizations: Mutex<Vec<(i64, OrganizationRow)>>,
    pub groups: Mutex<Vec<(i64, OrganizationGroupRow)>>,
    pub services: Mutex<Vec<(i64, ServiceRow)>>,
    pub fail_organizations: AtomicBool,
    next_id: AtomicI64,
}

impl FakeStore {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn organization_ids(&self) -> Vec<String> {
        self.organizations
            .lock()
            .unwrap()
            .iter()
            .map(|(_, row)| row.chain_id.clone())
            .collect()
    }

    pub fn service_ids(&self) -> Vec<String> {
        self.services
            .lock()
            .unwrap()
            .iter()
            .map(|(_, row)| row.chain_id.clone())
            .collect()
    }
}

#[async_trait]
impl RegistryStore for FakeStore {
    async fn create_organization(&self, row: &OrganizationRow) -> Result<i64> {
        if self.fail_organizations.load(Ordering::SeqCst) {
            return Err(Error::Config("disk full".to_string()));
        }
        let id = self.next_id();
        self.organizations.lock().unwrap().push((id, row.clone()));
        Ok(id)
    }

    async fn create_organization_groups(
        &self,
        organization_id: i64,
        groups: &[OrganizationGroupRow],
    ) -> Result<()> {
        let mut stored = self.groups.lock().unwrap();
        for group in groups {
            stored.push((organization_id, group.clone()));
        }
        Ok(())
    }

    async fn create_service(&self, row: &ServiceRow) -> Result<i64> {
        let id = self.next_id();
        self.services.lock().unwrap().push((id, row.clone()));
        Ok(id)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn org_metadata(name: &str, groups: &[&str]) -> String {
    let groups: Vec<serde_json::Value> = groups
        .iter()
        .map(|g| {
            serde_json::json!({
                "group_name": g,
                "group_id": format!("{}-id", g),
                "payment": { "payment_address": OWNER_HEX }
            })
        })
        .collect();
    serde_json::json!({
        "org_name": name,
        "org_type": "organization",
        "description": { "description": "test org", "short_description": "test", "url": "" },
        "groups": groups,
    })
    .to_string()
}

pub fn service_metadata(name: &str, bundle: &str) -> String {
    serde_json::json!({
        "version": 1,
        "display_name": name,
        "encoding": "proto",
        "service_type": "grpc",
        "model_ipfs_hash": bundle,
        "mpe_address": "0x5e592F9b1d303183d963635f895f0f0C48284f4e",
        "service_description": { "description": "test service" }
    })
    .to_string()
}

pub fn zip_bundle(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buf);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    buf.into_inner()
}

/// Uncompressed tar, the format publishers upload schema bundles in.
pub fn tar_bundle(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap()
}

pub fn syncer(ledger: FakeLedger, content: FakeContent, store: Arc<FakeStore>) -> (Syncer, Arc<SchemaRegistry>) {
    let registry = Arc::new(SchemaRegistry::new());
    let syncer = Syncer::new(
        Arc::new(ledger),
        Arc::new(content),
        store,
        Arc::new(ProtoxCompiler::new()),
        registry.clone(),
    );
    (syncer, registry)
}

//! Sync pass - walks the ledger registry and rebuilds the local mirror
//!
//! A pass never fails as a whole: every per-entity failure is logged and the
//! pass moves on to the next organization or service. Only a service metadata
//! failure under [`FailurePolicy::AbortPass`] ends a pass early.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::{FailurePolicy, SyncPolicy};
use crate::content::{self, ContentStore};
use crate::identity::{display_identity, OnChainId};
use crate::ledger::{Ledger, OrganizationRecord};
use crate::metadata::{self, OrganizationMetadata, ServiceMetadata};
use crate::schema::{SchemaCompiler, SchemaFile, SchemaRegistry};
use crate::store::{OrganizationGroupRow, OrganizationRow, RegistryStore, ServiceRow};

/// Counters for the end-of-pass log line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct PassSummary {
    pub(crate) organizations: usize,
    pub(crate) services: usize,
    pub(crate) schema_files: usize,
    pub(crate) compile_failures: usize,
    pub(crate) skipped: usize,
    pub(crate) aborted: bool,
}

/// Mutable state of one pass.
#[derive(Default)]
struct PassState {
    summary: PassSummary,
    /// Services whose registry entries were already replaced this pass
    replaced: HashSet<String>,
}

enum Flow {
    Continue,
    Abort,
}

/// Runs sync passes against the configured collaborators
pub struct Syncer {
    ledger: Arc<dyn Ledger>,
    content: Arc<dyn ContentStore>,
    store: Arc<dyn RegistryStore>,
    compiler: Arc<dyn SchemaCompiler>,
    registry: Arc<SchemaRegistry>,
    policy: SyncPolicy,
}

impl Syncer {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        content: Arc<dyn ContentStore>,
        store: Arc<dyn RegistryStore>,
        compiler: Arc<dyn SchemaCompiler>,
        registry: Arc<SchemaRegistry>,
    ) -> Self {
        Self {
            ledger,
            content,
            store,
            compiler,
            registry,
            policy: SyncPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Run one full pass. Failures are logged, never returned.
    pub async fn run_pass(&self) {
        self.pass().await;
    }

    pub(crate) async fn pass(&self) -> PassSummary {
        info!("Sync pass starting");
        let started = Instant::now();
        let mut state = PassState::default();

        let org_ids = match self.ledger.list_organization_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Failed to list organizations, nothing to sync");
                Vec::new()
            }
        };

        for org_id in &org_ids {
            if let Flow::Abort = self.sync_organization(org_id, &mut state).await {
                state.summary.aborted = true;
                warn!("Sync pass aborted");
                break;
            }
        }

        let summary = state.summary;
        info!(
            organizations = summary.organizations,
            services = summary.services,
            schema_files = summary.schema_files,
            compile_failures = summary.compile_failures,
            skipped = summary.skipped,
            aborted = summary.aborted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sync pass finished"
        );
        summary
    }

    async fn sync_organization(&self, org_id: &OnChainId, state: &mut PassState) -> Flow {
        let org_identity = display_identity(org_id);

        let record = match self.ledger.get_organization(org_id).await {
            Ok(record) => record,
            Err(e) => {
                error!(org = %org_identity, error = %e, "Failed to get organization");
                state.summary.skipped += 1;
                return Flow::Continue;
            }
        };

        let raw = match self.content.get_file(&record.metadata_locator()).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(org = %org_identity, error = %e, "Failed to fetch organization metadata");
                state.summary.skipped += 1;
                return Flow::Continue;
            }
        };

        let meta: OrganizationMetadata = match metadata::decode(&raw) {
            Ok(meta) => meta,
            Err(e) => {
                error!(
                    org = %org_identity,
                    error = %e,
                    content = %String::from_utf8_lossy(&raw),
                    "Can't decode organization metadata"
                );
                state.summary.skipped += 1;
                return Flow::Continue;
            }
        };

        let identity = record.identity();
        let row = OrganizationRow::new(identity.clone(), record.owner_hex(), &meta);
        let org_local_id = match self.store.create_organization(&row).await {
            Ok(id) => id,
            Err(e) => {
                error!(org = %identity, error = %e, "Failed to save organization");
                0
            }
        };

        let groups: Vec<OrganizationGroupRow> = meta.groups.iter().map(Into::into).collect();
        if let Err(e) = self.store.create_organization_groups(org_local_id, &groups).await {
            error!(org = %identity, error = %e, "Failed to save organization groups");
        }

        state.summary.organizations += 1;
        debug!(
            org = %identity,
            id = org_local_id,
            services = record.service_ids.len(),
            "Organization saved"
        );

        for service_id in &record.service_ids {
            if let Flow::Abort = self
                .sync_service(&record, &identity, org_local_id, service_id, state)
                .await
            {
                return Flow::Abort;
            }
        }

        Flow::Continue
    }

    async fn sync_service(
        &self,
        org: &OrganizationRecord,
        org_identity: &str,
        org_local_id: i64,
        service_id: &OnChainId,
        state: &mut PassState,
    ) -> Flow {
        let service_identity = display_identity(service_id);

        let record = match self.ledger.get_service(&org.id, service_id).await {
            Ok(record) => record,
            Err(e) => {
                error!(org = %org_identity, service = %service_identity, error = %e, "Failed to get service");
                state.summary.skipped += 1;
                return Flow::Continue;
            }
        };

        let meta = match self.service_metadata(&record.metadata_locator(), &service_identity).await {
            Some(meta) => meta,
            None => {
                state.summary.skipped += 1;
                return match self.policy.service_metadata_failure {
                    FailurePolicy::Skip => Flow::Continue,
                    FailurePolicy::AbortPass => Flow::Abort,
                };
            }
        };

        debug!(service = %service_identity, metadata = ?meta, "Service metadata");

        let row = ServiceRow::new(
            org_local_id,
            org_identity.to_string(),
            service_identity.clone(),
            &meta,
        );
        match self.store.create_service(&row).await {
            Ok(id) => debug!(service = %service_identity, id, "Service saved"),
            Err(e) => {
                error!(service = %service_identity, org = %org_identity, error = %e, "Failed to save service")
            }
        }
        state.summary.services += 1;

        let entries = self.compile_bundle(&service_identity, &meta, state).await;

        // Rebuilt entries go in under one write lock so readers never see a
        // service half cleared
        if self.policy.reset_service_schemas && state.replaced.insert(service_identity.clone()) {
            self.registry.replace(&service_identity, entries).await;
        } else {
            for entry in entries {
                self.registry.accumulate(&service_identity, entry).await;
            }
        }
        Flow::Continue
    }

    /// Fetch and decode service metadata, logging why it failed.
    async fn service_metadata(&self, locator: &str, service: &str) -> Option<ServiceMetadata> {
        let raw = match self.content.get_file(locator).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(service, error = %e, "Failed to fetch service metadata");
                return None;
            }
        };

        match metadata::decode(&raw) {
            Ok(meta) => Some(meta),
            Err(e) => {
                error!(
                    service,
                    error = %e,
                    content = %String::from_utf8_lossy(&raw),
                    "Can't decode service metadata"
                );
                None
            }
        }
    }

    /// Fetch, extract and compile a service's schema bundle. Files that fail
    /// to compile are kept as `None`; any earlier failure yields no entries.
    async fn compile_bundle(
        &self,
        service: &str,
        meta: &ServiceMetadata,
        state: &mut PassState,
    ) -> Vec<Option<SchemaFile>> {
        let Some(locator) = meta.bundle_locator() else {
            warn!(service, "Service metadata has no schema bundle locator");
            return Vec::new();
        };

        let bundle = match self.content.get_file(locator).await {
            Ok(bundle) => bundle,
            Err(e) => {
                error!(service, locator, error = %e, "Failed to fetch schema bundle");
                return Vec::new();
            }
        };

        let files = match content::extract(&bundle) {
            Ok(files) => files,
            Err(e) => {
                error!(service, locator, error = %e, "Failed to extract schema bundle");
                return Vec::new();
            }
        };

        let sources: BTreeMap<String, String> = files
            .into_iter()
            .map(|(name, bytes)| (name, String::from_utf8_lossy(&bytes).into_owned()))
            .collect();

        sources
            .iter()
            .map(|(name, source)| match self.compiler.compile(name, source, &sources) {
                Ok(file) => {
                    state.summary.schema_files += 1;
                    Some(file)
                }
                Err(e) => {
                    error!(service, file = %name, error = %e, "Failed to compile schema file");
                    state.summary.compile_failures += 1;
                    None
                }
            })
            .collect()
    }
}

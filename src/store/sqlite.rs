//! SQLite-backed registry mirror
//!
//! Organizations are keyed by chain id and services by (org chain id, chain
//! id), so repeated passes update rows in place and keep their local ids.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::{params, Connection};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{OrganizationGroupRow, OrganizationRow, RegistryStore, ServiceRow};
use crate::error::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS organizations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chain_id TEXT NOT NULL UNIQUE,
    owner TEXT NOT NULL,
    name TEXT NOT NULL,
    org_type TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    short_description TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL DEFAULT '',
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
);

CREATE TABLE IF NOT EXISTS organization_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    organization_id INTEGER NOT NULL,
    group_id TEXT NOT NULL,
    group_name TEXT NOT NULL,
    payment_address TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_organization_groups_org
    ON organization_groups(organization_id);

CREATE TABLE IF NOT EXISTS services (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    organization_id INTEGER NOT NULL,
    org_chain_id TEXT NOT NULL,
    chain_id TEXT NOT NULL,
    display_name TEXT NOT NULL DEFAULT '',
    encoding TEXT NOT NULL DEFAULT '',
    service_type TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    short_description TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL DEFAULT '',
    bundle_locator TEXT NOT NULL DEFAULT '',
    mpe_address TEXT NOT NULL DEFAULT '',
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
    UNIQUE (org_chain_id, chain_id)
);
";

/// Registry mirror stored in a single SQLite file
pub struct SqliteStore {
    db: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Connection::open(path)?;

        // Enable WAL mode for concurrent read access
        db.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self::init(db)?;
        info!(path = %path.display(), "Registry store initialized");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(db: Connection) -> Result<Self> {
        db.execute_batch(SCHEMA)?;
        Ok(Self { db: Mutex::new(db) })
    }

    pub async fn organization_count(&self) -> Result<i64> {
        let db = self.db.lock().await;
        Ok(db.query_row("SELECT count(*) FROM organizations", [], |row| row.get(0))?)
    }

    pub async fn service_count(&self) -> Result<i64> {
        let db = self.db.lock().await;
        Ok(db.query_row("SELECT count(*) FROM services", [], |row| row.get(0))?)
    }

    /// Group names of an organization, in insertion order.
    pub async fn group_names(&self, organization_id: i64) -> Result<Vec<String>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare_cached(
            "SELECT group_name FROM organization_groups WHERE organization_id = ?1 ORDER BY id",
        )?;
        let names = stmt
            .query_map([organization_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

#[async_trait]
impl RegistryStore for SqliteStore {
    async fn create_organization(&self, row: &OrganizationRow) -> Result<i64> {
        let db = self.db.lock().await;
        let id: i64 = db.query_row(
            "INSERT INTO organizations (chain_id, owner, name, org_type, description, short_description, url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(chain_id) DO UPDATE SET
                owner = excluded.owner,
                name = excluded.name,
                org_type = excluded.org_type,
                description = excluded.description,
                short_description = excluded.short_description,
                url = excluded.url,
                updated_at = strftime('%s', 'now')
             RETURNING id",
            params![
                row.chain_id,
                row.owner,
                row.name,
                row.org_type,
                row.description,
                row.short_description,
                row.url
            ],
            |r| r.get(0),
        )?;
        debug!(id, chain_id = %row.chain_id, "Saved organization");
        Ok(id)
    }

    async fn create_organization_groups(
        &self,
        organization_id: i64,
        groups: &[OrganizationGroupRow],
    ) -> Result<()> {
        let mut db = self.db.lock().await;
        let tx = db.transaction()?;
        tx.execute(
            "DELETE FROM organization_groups WHERE organization_id = ?1",
            [organization_id],
        )?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO organization_groups (organization_id, group_id, group_name, payment_address)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for group in groups {
                stmt.execute(params![
                    organization_id,
                    group.group_id,
                    group.group_name,
                    group.payment_address
                ])?;
            }
        }
        tx.commit()?;
        debug!(organization_id, count = groups.len(), "Saved organization groups");
        Ok(())
    }

    async fn create_service(&self, row: &ServiceRow) -> Result<i64> {
        let db = self.db.lock().await;
        let id: i64 = db.query_row(
            "INSERT INTO services (organization_id, org_chain_id, chain_id, display_name, encoding,
                                   service_type, description, short_description, url,
                                   bundle_locator, mpe_address)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(org_chain_id, chain_id) DO UPDATE SET
                organization_id = excluded.organization_id,
                display_name = excluded.display_name,
                encoding = excluded.encoding,
                service_type = excluded.service_type,
                description = excluded.description,
                short_description = excluded.short_description,
                url = excluded.url,
                bundle_locator = excluded.bundle_locator,
                mpe_address = excluded.mpe_address,
                updated_at = strftime('%s', 'now')
             RETURNING id",
            params![
                row.organization_id,
                row.org_chain_id,
                row.chain_id,
                row.display_name,
                row.encoding,
                row.service_type,
                row.description,
                row.short_description,
                row.url,
                row.bundle_locator,
                row.mpe_address
            ],
            |r| r.get(0),
        )?;
        debug!(id, chain_id = %row.chain_id, "Saved service");
        Ok(id)
    }
}

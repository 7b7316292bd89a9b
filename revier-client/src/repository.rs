//! Zone repository
//!
//! CRUD over a [`ZoneStore`], adding the bookkeeping callers expect:
//! author stamping on create, an `updated_at` bump on every update, and
//! a firm `NotFound` when an update matches nothing. The store decides
//! who may write; the repository only shapes the rows.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use shared::{Principal, Zone, ZoneDraft, ZoneInsertRow, ZonePatch, ZoneUpdateRow};

use crate::error::{StoreError, StoreResult};
use crate::store::ZoneStore;

#[derive(Clone)]
pub struct ZoneRepository {
    store: Arc<dyn ZoneStore>,
}

impl ZoneRepository {
    pub fn new(store: Arc<dyn ZoneStore>) -> Self {
        Self { store }
    }

    /// All zones, newest first.
    pub async fn list_all(&self) -> StoreResult<Vec<Zone>> {
        self.store.select_all().await
    }

    /// Insert a new zone, stamped with the author when one is signed in.
    pub async fn create(&self, draft: ZoneDraft, author: Option<&Principal>) -> StoreResult<Zone> {
        let row = ZoneInsertRow {
            draft,
            created_by: author.map(|user| user.id),
        };
        self.store.insert(&row).await
    }

    /// Apply a patch to an existing zone. An empty patch still bumps
    /// `updated_at`.
    pub async fn update(&self, id: Uuid, patch: ZonePatch) -> StoreResult<Zone> {
        let row = ZoneUpdateRow {
            patch,
            updated_at: Utc::now(),
        };
        match self.store.update(id, &row).await? {
            Some(zone) => Ok(zone),
            None => Err(StoreError::NotFound),
        }
    }

    /// Delete by id. Deleting an id that no longer exists is not an error.
    pub async fn remove(&self, id: Uuid) -> StoreResult<()> {
        self.store.delete(id).await
    }
}

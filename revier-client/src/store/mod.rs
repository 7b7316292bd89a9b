//! Store collaborator seam

use async_trait::async_trait;
use uuid::Uuid;

use shared::{Zone, ZoneInsertRow, ZoneUpdateRow};

use crate::error::StoreResult;

/// Table-style access to the hosted `zones` table.
///
/// Implementations carry the store's observed semantics, not ideals: rows
/// come back newest first, updates report how many rows matched through an
/// `Option`, and deleting an id that is already gone succeeds.
#[async_trait]
pub trait ZoneStore: Send + Sync {
    /// All rows, ordered by `created_at` descending.
    async fn select_all(&self) -> StoreResult<Vec<Zone>>;

    /// Insert a row and return it as stored.
    async fn insert(&self, row: &ZoneInsertRow) -> StoreResult<Zone>;

    /// Apply an update; `None` when no row matched the id.
    async fn update(&self, id: Uuid, row: &ZoneUpdateRow) -> StoreResult<Option<Zone>>;

    /// Remove a row. Removing a missing id is not an error.
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

//! Map session
//!
//! Holds the zone list the map renders, the shapes derived from it, and
//! the view state. All mutations go through here so the toast and reload
//! behavior stays uniform: every successful write shows a toast and
//! reloads the full list, every failure lands in the toast queue.

use uuid::Uuid;

use shared::{
    Bounds, Principal, ShapeDescriptor, Zone, ZoneCounts, ZoneDraft, ZoneFilter, ZonePatch,
    record_to_shape,
};

use crate::error::StoreResult;
use crate::repository::ZoneRepository;
use crate::ui::UiState;

pub struct MapSession {
    repo: ZoneRepository,
    zones: Vec<Zone>,
    shapes: Vec<ShapeDescriptor>,
    pub ui: UiState,
}

impl MapSession {
    pub fn new(repo: ZoneRepository) -> Self {
        Self {
            repo,
            zones: Vec::new(),
            shapes: Vec::new(),
            ui: UiState::default(),
        }
    }

    /// Zones as last loaded, newest first.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Renderable shapes for the current zone list.
    pub fn shapes(&self) -> &[ShapeDescriptor] {
        &self.shapes
    }

    /// Initial page load: fetch the list and hand back the bounds the map
    /// should open on, when there is anything to frame.
    pub async fn start(&mut self) -> Option<Bounds> {
        self.reload().await;
        self.fit_bounds()
    }

    /// Reload the zone list from the store. On failure the current list
    /// stays on screen and the error goes to the toast queue.
    pub async fn reload(&mut self) {
        self.ui.is_loading = true;
        match self.repo.list_all().await {
            Ok(zones) => {
                self.zones = zones;
                self.rebuild_shapes();
            }
            Err(err) => {
                self.ui.push_error(format!("Fehler beim Laden: {err}"));
            }
        }
        self.ui.is_loading = false;
    }

    pub async fn create_zone(
        &mut self,
        draft: ZoneDraft,
        author: Option<&Principal>,
    ) -> StoreResult<Zone> {
        match self.repo.create(draft, author).await {
            Ok(zone) => {
                self.ui.push_success("Zone erstellt!");
                self.reload().await;
                Ok(zone)
            }
            Err(err) => {
                self.ui.push_error(format!("Fehler: {err}"));
                Err(err)
            }
        }
    }

    pub async fn update_zone(&mut self, id: Uuid, patch: ZonePatch) -> StoreResult<Zone> {
        match self.repo.update(id, patch).await {
            Ok(zone) => {
                self.ui.push_success("Zone aktualisiert");
                self.reload().await;
                Ok(zone)
            }
            Err(err) => {
                self.ui.push_error(format!("Fehler: {err}"));
                Err(err)
            }
        }
    }

    pub async fn delete_zone(&mut self, id: Uuid) -> StoreResult<()> {
        match self.repo.remove(id).await {
            Ok(()) => {
                self.ui.push_success("Zone gelöscht");
                self.reload().await;
                Ok(())
            }
            Err(err) => {
                self.ui.push_error(format!("Fehler: {err}"));
                Err(err)
            }
        }
    }

    /// Per-type totals over the loaded list.
    pub fn counts(&self) -> ZoneCounts {
        ZoneCounts::tally(&self.zones)
    }

    /// Zones passing the filter, in list order.
    pub fn filtered(&self, filter: &ZoneFilter) -> Vec<&Zone> {
        self.zones.iter().filter(|zone| filter.matches(zone)).collect()
    }

    /// Shape for one zone, if it rendered.
    pub fn shape_for(&self, id: Uuid) -> Option<&ShapeDescriptor> {
        self.shapes.iter().find(|shape| shape.zone_id == id)
    }

    /// Smallest bounds covering every rendered shape, for the map's
    /// fit-to-content view.
    pub fn fit_bounds(&self) -> Option<Bounds> {
        self.shapes
            .iter()
            .filter_map(ShapeDescriptor::bounds)
            .reduce(Bounds::union)
    }

    fn rebuild_shapes(&mut self) {
        self.shapes.clear();
        for zone in &self.zones {
            match record_to_shape(zone) {
                Some(shape) => self.shapes.push(shape),
                None => {
                    tracing::warn!(
                        zone_id = %zone.id,
                        shape = %zone.shape,
                        "zone has no usable geometry, skipping"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthProvider;
    use crate::backend::MemoryBackend;
    use crate::error::StoreError;
    use crate::store::ZoneStore;
    use crate::ui::NoticeKind;
    use async_trait::async_trait;
    use chrono::Utc;
    use shared::{LatLng, MAP_HOME, ZoneInsertRow, ZoneShape, ZoneType, ZoneUpdateRow};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn marker_zone(name: &str) -> Zone {
        let now = Utc::now();
        Zone {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            plz: "8022".to_owned(),
            zone_type: ZoneType::Base,
            shape: ZoneShape::Marker,
            geometry: None,
            radius: None,
            center: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn broken_polygon_zone() -> Zone {
        Zone {
            shape: ZoneShape::Polygon,
            ..marker_zone("kaputt")
        }
    }

    async fn admin_session(backend: Arc<MemoryBackend>) -> MapSession {
        backend
            .sign_in("admin@revier.dev", "changeme")
            .await
            .unwrap();
        MapSession::new(ZoneRepository::new(backend))
    }

    #[tokio::test]
    async fn test_reload_builds_shapes() {
        let backend = Arc::new(
            MemoryBackend::new()
                .with_zone(marker_zone("Hafen"))
                .with_zone(marker_zone("Altstadt")),
        );
        let mut session = MapSession::new(ZoneRepository::new(backend));

        session.reload().await;
        assert!(!session.ui.is_loading);
        assert_eq!(session.zones().len(), 2);
        assert_eq!(session.shapes().len(), 2);

        let id = session.zones()[0].id;
        let shape = session.shape_for(id).unwrap();
        assert_eq!(shape.anchor(), MAP_HOME);
    }

    #[tokio::test]
    async fn test_reload_skips_zones_without_geometry() {
        let backend = Arc::new(
            MemoryBackend::new()
                .with_zone(marker_zone("Hafen"))
                .with_zone(broken_polygon_zone()),
        );
        let mut session = MapSession::new(ZoneRepository::new(backend));

        session.reload().await;
        assert_eq!(session.zones().len(), 2);
        assert_eq!(session.shapes().len(), 1);
    }

    struct FlakyStore {
        inner: MemoryBackend,
        fail_reads: AtomicBool,
    }

    #[async_trait]
    impl ZoneStore for FlakyStore {
        async fn select_all(&self) -> StoreResult<Vec<Zone>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StoreError::Provider("500: kaputt".to_owned()));
            }
            self.inner.select_all().await
        }

        async fn insert(&self, row: &ZoneInsertRow) -> StoreResult<Zone> {
            self.inner.insert(row).await
        }

        async fn update(&self, id: Uuid, row: &ZoneUpdateRow) -> StoreResult<Option<Zone>> {
            self.inner.update(id, row).await
        }

        async fn delete(&self, id: Uuid) -> StoreResult<()> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_current_list() {
        let store = Arc::new(FlakyStore {
            inner: MemoryBackend::new().with_zone(marker_zone("Hafen")),
            fail_reads: AtomicBool::new(false),
        });
        let mut session = MapSession::new(ZoneRepository::new(store.clone()));

        session.reload().await;
        assert_eq!(session.zones().len(), 1);

        store.fail_reads.store(true, Ordering::SeqCst);
        session.reload().await;
        assert_eq!(session.zones().len(), 1);
        assert!(!session.ui.is_loading);

        let notice = session.ui.take_notification().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.starts_with("Fehler beim Laden:"));
    }

    #[tokio::test]
    async fn test_create_toasts_and_reloads() {
        let backend =
            Arc::new(MemoryBackend::new().with_user("admin@revier.dev", "changeme", "admin"));
        let mut session = admin_session(backend).await;

        // Empty store: the page opens without zones and without an error.
        assert_eq!(session.start().await, None);
        assert!(session.zones().is_empty());
        assert_eq!(session.ui.take_notification(), None);

        let draft = ZoneDraft {
            name: "Neue Zone".to_owned(),
            shape: ZoneShape::Marker,
            ..ZoneDraft::default()
        };
        session.create_zone(draft, None).await.unwrap();

        assert_eq!(
            session.ui.take_notification().unwrap().message,
            "Zone erstellt!"
        );
        assert_eq!(session.zones().len(), 1);
        assert_eq!(session.zones()[0].name, "Neue Zone");
    }

    #[tokio::test]
    async fn test_denied_create_toasts_error() {
        let backend =
            Arc::new(MemoryBackend::new().with_user("scout@revier.dev", "changeme", "viewer"));
        backend
            .sign_in("scout@revier.dev", "changeme")
            .await
            .unwrap();
        let mut session = MapSession::new(ZoneRepository::new(backend));

        let err = session
            .create_zone(ZoneDraft::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Denied(_)));

        let notice = session.ui.take_notification().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.starts_with("Fehler:"));
        assert!(session.zones().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_toast_in_german() {
        let backend =
            Arc::new(MemoryBackend::new().with_user("admin@revier.dev", "changeme", "admin"));
        let mut session = admin_session(backend).await;

        let zone = session
            .create_zone(
                ZoneDraft {
                    name: "Hafen".to_owned(),
                    shape: ZoneShape::Marker,
                    ..ZoneDraft::default()
                },
                None,
            )
            .await
            .unwrap();
        session.ui.take_notification();

        session
            .update_zone(
                zone.id,
                ZonePatch {
                    name: Some("Hafen Nord".to_owned()),
                    ..ZonePatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            session.ui.take_notification().unwrap().message,
            "Zone aktualisiert"
        );
        assert_eq!(session.zones()[0].name, "Hafen Nord");

        session.delete_zone(zone.id).await.unwrap();
        assert_eq!(
            session.ui.take_notification().unwrap().message,
            "Zone gelöscht"
        );
        assert!(session.zones().is_empty());
    }

    #[tokio::test]
    async fn test_counts_filter_and_fit_bounds() {
        let hafen = Zone {
            zone_type: ZoneType::Base,
            center: Some(LatLng::new(-40.0, 80.0)),
            radius: Some(10.0),
            shape: ZoneShape::Circle,
            ..marker_zone("Hafen")
        };
        let sperrgebiet = Zone {
            zone_type: ZoneType::Bauverbot,
            center: Some(LatLng::new(-60.0, 100.0)),
            radius: Some(5.0),
            shape: ZoneShape::Circle,
            ..marker_zone("Sperrgebiet")
        };
        let backend = Arc::new(MemoryBackend::new().with_zone(hafen).with_zone(sperrgebiet));
        let mut session = MapSession::new(ZoneRepository::new(backend));
        let opening = session.start().await;

        let counts = session.counts();
        assert_eq!(counts.base, 1);
        assert_eq!(counts.bauverbot, 1);
        assert_eq!(counts.total(), 2);

        let filter = ZoneFilter {
            zone_type: Some(ZoneType::Base),
            query: String::new(),
        };
        let hits = session.filtered(&filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Hafen");

        let bounds = session.fit_bounds().unwrap();
        assert_eq!(bounds.south_west, LatLng::new(-65.0, 70.0));
        assert_eq!(bounds.north_east, LatLng::new(-30.0, 105.0));
        assert_eq!(opening, Some(bounds));
    }
}

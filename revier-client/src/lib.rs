//! Revier Client - map client for the zone backend
//!
//! Talks to the hosted auth and table endpoints, keeps the zone list the
//! map renders, and enforces the viewer/admin split client-side.

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod repository;
pub mod session;
pub mod store;
pub mod ui;

pub use auth::{AccessPolicy, AuthProvider, AuthState, Gate, Session};
pub use backend::{HttpBackend, MemoryBackend};
pub use config::ClientConfig;
pub use error::{AuthError, AuthResult, ConfigError, StoreError, StoreResult};
pub use repository::ZoneRepository;
pub use session::MapSession;
pub use store::ZoneStore;
pub use ui::{NoticeKind, Notification, UiState};

// Re-export the record and codec types callers constantly need
pub use shared::{
    MapShape, MapViewConfig, ShapeDescriptor, Zone, ZoneCounts, ZoneDraft, ZoneFilter, ZoneForm,
    ZonePatch, record_to_shape, shape_to_record,
};

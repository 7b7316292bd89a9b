//! Mock service state: seeded users, their role rows, and the zones table.

use std::collections::HashMap;

use rand::Rng;
use rand::distributions::Alphanumeric;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared::{LatLng, MapShape, Principal, Ring, Zone, ZoneForm, ZoneType, shape_to_record};

#[derive(Debug, Clone)]
struct MockUser {
    principal: Principal,
    password: String,
}

/// Shared application state
pub struct AppState {
    /// HS256 secret the issued tokens are signed with
    pub jwt_secret: String,
    /// The project's anon key, required on every request
    pub anon_key: String,
    users: RwLock<Vec<MockUser>>,
    roles: RwLock<HashMap<Uuid, String>>,
    /// The zones table
    pub zones: RwLock<Vec<Zone>>,
}

impl AppState {
    pub fn new(jwt_secret: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            anon_key: anon_key.into(),
            users: RwLock::new(Vec::new()),
            roles: RwLock::new(HashMap::new()),
            zones: RwLock::new(Vec::new()),
        }
    }

    /// Environment variables:
    /// - `MOCK_JWT_SECRET`: token signing secret (default: random per run)
    /// - `MOCK_ANON_KEY`: expected `apikey` header (default: dev-anon-key)
    pub fn from_env() -> Self {
        let jwt_secret =
            std::env::var("MOCK_JWT_SECRET").unwrap_or_else(|_| random_secret());
        let anon_key =
            std::env::var("MOCK_ANON_KEY").unwrap_or_else(|_| "dev-anon-key".to_owned());
        Self::new(jwt_secret, anon_key)
    }

    /// Register a user, with a role row unless `role` is `None`.
    pub async fn seed_user(&self, email: &str, password: &str, role: Option<&str>) -> Principal {
        let principal = Principal {
            id: Uuid::new_v4(),
            email: email.to_owned(),
        };
        if let Some(role) = role {
            self.roles
                .write()
                .await
                .insert(principal.id, role.to_owned());
        }
        self.users.write().await.push(MockUser {
            principal: principal.clone(),
            password: password.to_owned(),
        });
        principal
    }

    pub async fn seed_zone(&self, zone: Zone) {
        self.zones.write().await.push(zone);
    }

    /// Demo accounts and a handful of zones so a fresh mock has something
    /// to show.
    pub async fn seed_demo(&self) {
        let admin = self.seed_user("admin@revier.dev", "changeme", Some("admin")).await;
        self.seed_user("scout@revier.dev", "changeme", Some("viewer")).await;

        let altstadt: Ring = vec![
            [105.0, -62.0],
            [118.0, -62.0],
            [118.0, -54.0],
            [105.0, -54.0],
            [105.0, -62.0],
        ];
        let demo = [
            drawn_zone(
                MapShape::Polygon {
                    geometry: shared::Geometry::Polygon {
                        coordinates: vec![altstadt],
                    },
                },
                "Altstadt",
                "8022",
                ZoneType::Base,
                admin.id,
            ),
            drawn_zone(
                MapShape::Circle {
                    center: LatLng::new(-48.0, 94.0),
                    radius: 6.5,
                },
                "Hafenrunde",
                "8051",
                ZoneType::Bauverbot,
                admin.id,
            ),
            drawn_zone(
                MapShape::Marker {
                    at: LatLng::new(-71.5, 132.0),
                },
                "Treffpunkt Pier",
                "8122",
                ZoneType::Aktionspunkt,
                admin.id,
            ),
        ];
        let mut zones = self.zones.write().await;
        zones.extend(demo);
        tracing::info!(count = zones.len(), "seeded demo data");
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Option<Principal> {
        self.users
            .read()
            .await
            .iter()
            .find(|user| user.principal.email == email && user.password == password)
            .map(|user| user.principal.clone())
    }

    pub async fn role_for(&self, user_id: Uuid) -> Option<String> {
        self.roles.read().await.get(&user_id).cloned()
    }
}

/// Persisted row for a freshly drawn shape, the same conversion the editor
/// runs before saving.
fn drawn_zone(
    shape: MapShape,
    name: &str,
    plz: &str,
    zone_type: ZoneType,
    author: Uuid,
) -> Zone {
    let form = ZoneForm {
        name: name.to_owned(),
        plz: plz.to_owned(),
        zone_type,
    };
    let draft = shape_to_record(&shape, &form);
    let now = chrono::Utc::now();
    Zone {
        id: Uuid::new_v4(),
        name: draft.name,
        plz: draft.plz,
        zone_type: draft.zone_type,
        shape: draft.shape,
        geometry: draft.geometry,
        radius: draft.radius,
        center: draft.center,
        created_by: Some(author),
        created_at: now,
        updated_at: now,
    }
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

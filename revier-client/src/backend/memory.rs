//! In-memory backend
//!
//! Seeded stand-in for the hosted service, used by unit tests and offline
//! work. It mirrors the service's observed semantics including the
//! row-level access rules: anyone reads, only admins write. An
//! unauthorized insert is refused outright; unauthorized updates and
//! deletes simply match no rows, exactly like rows hidden by row-level
//! security.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use shared::{Principal, Role, Zone, ZoneInsertRow, ZoneUpdateRow};

use crate::auth::{AuthProvider, AuthState, Session};
use crate::error::{AuthError, AuthResult, StoreError, StoreResult};
use crate::store::ZoneStore;

#[derive(Debug, Clone)]
struct MemoryUser {
    principal: Principal,
    password: String,
}

/// In-memory twin of the hosted backend.
#[derive(Debug)]
pub struct MemoryBackend {
    users: Vec<MemoryUser>,
    roles: HashMap<Uuid, String>,
    zones: RwLock<Vec<Zone>>,
    session: RwLock<Option<Session>>,
    state_tx: watch::Sender<AuthState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(AuthState::SignedOut);
        Self {
            users: Vec::new(),
            roles: HashMap::new(),
            zones: RwLock::new(Vec::new()),
            session: RwLock::new(None),
            state_tx,
        }
    }

    /// Seed a user with a role row.
    pub fn with_user(
        mut self,
        email: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        let principal = Principal {
            id: Uuid::new_v4(),
            email: email.into(),
        };
        self.roles.insert(principal.id, role.into());
        self.users.push(MemoryUser {
            principal,
            password: password.into(),
        });
        self
    }

    /// Seed a user without a role row, for exercising the lookup miss.
    pub fn with_unlisted_user(
        mut self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.users.push(MemoryUser {
            principal: Principal {
                id: Uuid::new_v4(),
                email: email.into(),
            },
            password: password.into(),
        });
        self
    }

    /// Seed a zone row as stored.
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zones.get_mut().push(zone);
        self
    }

    /// Seeded principal by email, for building expectations in tests.
    pub fn principal(&self, email: &str) -> Option<Principal> {
        self.users
            .iter()
            .find(|user| user.principal.email == email)
            .map(|user| user.principal.clone())
    }

    async fn is_admin(&self) -> bool {
        let session = self.session.read().await;
        match session.as_ref() {
            Some(active) => self
                .roles
                .get(&active.user.id)
                .is_some_and(|role| role == "admin"),
            None => false,
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let user = self
            .users
            .iter()
            .find(|user| user.principal.email == email && user.password == password)
            .ok_or_else(|| AuthError::InvalidCredentials("invalid login credentials".into()))?;
        let session = Session {
            access_token: format!("mem-{}", Uuid::new_v4()),
            user: user.principal.clone(),
        };
        *self.session.write().await = Some(session.clone());
        self.state_tx
            .send_replace(AuthState::SignedIn(session.user.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        if self.session.write().await.take().is_some() {
            self.state_tx.send_replace(AuthState::SignedOut);
        }
        Ok(())
    }

    async fn role_of(&self, user_id: Uuid) -> Option<Role> {
        match self.roles.get(&user_id) {
            Some(raw) => Some(Role::from(raw.as_str())),
            None => {
                tracing::warn!(%user_id, "no role row, reading as viewer");
                None
            }
        }
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }
}

#[async_trait]
impl ZoneStore for MemoryBackend {
    async fn select_all(&self) -> StoreResult<Vec<Zone>> {
        let mut zones = self.zones.read().await.clone();
        zones.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(zones)
    }

    async fn insert(&self, row: &ZoneInsertRow) -> StoreResult<Zone> {
        if !self.is_admin().await {
            return Err(StoreError::Denied(
                "new row violates row-level security policy for table \"zones\"".into(),
            ));
        }
        let now = Utc::now();
        let zone = Zone {
            id: Uuid::new_v4(),
            name: row.draft.name.clone(),
            plz: row.draft.plz.clone(),
            zone_type: row.draft.zone_type.clone(),
            shape: row.draft.shape.clone(),
            geometry: row.draft.geometry.clone(),
            radius: row.draft.radius,
            center: row.draft.center,
            created_by: row.created_by,
            created_at: now,
            updated_at: now,
        };
        self.zones.write().await.push(zone.clone());
        Ok(zone)
    }

    async fn update(&self, id: Uuid, row: &ZoneUpdateRow) -> StoreResult<Option<Zone>> {
        if !self.is_admin().await {
            // The access rules hide every row, so the update matches
            // nothing instead of failing.
            return Ok(None);
        }
        let mut zones = self.zones.write().await;
        match zones.iter_mut().find(|zone| zone.id == id) {
            Some(zone) => {
                row.patch.apply_to(zone);
                zone.updated_at = row.updated_at;
                Ok(Some(zone.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        if !self.is_admin().await {
            return Ok(());
        }
        self.zones.write().await.retain(|zone| zone.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shared::{ZoneDraft, ZonePatch};

    fn seeded() -> MemoryBackend {
        MemoryBackend::new()
            .with_user("admin@revier.dev", "changeme", "admin")
            .with_user("scout@revier.dev", "changeme", "viewer")
    }

    fn stored_zone(name: &str, age: Duration) -> Zone {
        let at = Utc::now() - age;
        Zone {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            plz: String::new(),
            zone_type: Default::default(),
            shape: Default::default(),
            geometry: None,
            radius: None,
            center: None,
            created_by: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_sign_in_rejects_wrong_password() {
        let backend = seeded();
        let err = backend
            .sign_in("admin@revier.dev", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials(_)));
        assert!(backend.session().await.is_none());
    }

    #[tokio::test]
    async fn test_select_orders_newest_first() {
        let backend = seeded()
            .with_zone(stored_zone("alt", Duration::minutes(10)))
            .with_zone(stored_zone("neu", Duration::minutes(1)))
            .with_zone(stored_zone("mittel", Duration::minutes(5)));

        let zones = backend.select_all().await.unwrap();
        let names: Vec<_> = zones.iter().map(|zone| zone.name.as_str()).collect();
        assert_eq!(names, ["neu", "mittel", "alt"]);
    }

    #[tokio::test]
    async fn test_writes_require_admin() {
        let backend = seeded().with_zone(stored_zone("bestand", Duration::minutes(1)));
        backend
            .sign_in("scout@revier.dev", "changeme")
            .await
            .unwrap();
        let existing = backend.select_all().await.unwrap()[0].clone();

        let insert = ZoneInsertRow {
            draft: ZoneDraft::default(),
            created_by: None,
        };
        assert!(matches!(
            backend.insert(&insert).await,
            Err(StoreError::Denied(_))
        ));

        let update = ZoneUpdateRow {
            patch: ZonePatch {
                name: Some("umbenannt".to_owned()),
                ..ZonePatch::default()
            },
            updated_at: Utc::now(),
        };
        assert_eq!(backend.update(existing.id, &update).await.unwrap(), None);

        backend.delete(existing.id).await.unwrap();

        let after = backend.select_all().await.unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].name, "bestand");
    }

    #[tokio::test]
    async fn test_auth_state_watch_sees_sign_in_and_out() {
        let backend = seeded();
        let mut rx = backend.subscribe();
        assert_eq!(*rx.borrow(), AuthState::SignedOut);

        backend
            .sign_in("admin@revier.dev", "changeme")
            .await
            .unwrap();
        assert!(rx.has_changed().unwrap());
        match &*rx.borrow_and_update() {
            AuthState::SignedIn(user) => assert_eq!(user.email, "admin@revier.dev"),
            other => panic!("expected signed-in, got {other:?}"),
        }

        backend.sign_out().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), AuthState::SignedOut);
    }
}

//! HTTP backend for the hosted database/auth service
//!
//! Speaks the two REST surfaces the service exposes: the auth endpoints
//! under `/auth/v1` (password grant, bearer user lookup, logout) and the
//! table endpoints under `/rest/v1` (filter and order via query string,
//! `Prefer: return=representation` to get written rows back). Session state
//! lives inside the handle; one instance is shared behind an `Arc` and
//! serves as both the auth provider and the zone store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use shared::{Principal, Role, Zone, ZoneInsertRow, ZoneUpdateRow};

use crate::auth::{AuthProvider, AuthState, Session};
use crate::config::ClientConfig;
use crate::error::{AuthError, AuthResult, ConfigError, StoreError, StoreResult};
use crate::store::ZoneStore;

/// Client handle for the hosted backend.
#[derive(Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: String,
    session: RwLock<Option<Session>>,
    state_tx: watch::Sender<AuthState>,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Password-grant response of the auth service.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    user: Principal,
}

#[derive(Debug, Deserialize)]
struct RoleCell {
    role: String,
}

impl HttpBackend {
    /// Build a handle. Fails fast on a configuration that can never work.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;
        let (state_tx, _) = watch::channel(AuthState::SignedOut);
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key,
            session: RwLock::new(None),
            state_tx,
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Bearer for table calls: the session token when signed in, the anon
    /// key otherwise.
    async fn bearer(&self) -> String {
        let session = self.session.read().await;
        match session.as_ref() {
            Some(active) => active.access_token.clone(),
            None => self.api_key.clone(),
        }
    }

    fn install_session(&self, session: &Session) {
        self.state_tx
            .send_replace(AuthState::SignedIn(session.user.clone()));
    }

    /// Validate a persisted access token and install it as the session.
    ///
    /// This is what a returning page does instead of asking for credentials
    /// again.
    pub async fn restore_session(&self, access_token: &str) -> AuthResult<Session> {
        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    AuthError::InvalidCredentials(text)
                }
                _ => AuthError::Provider(text),
            });
        }
        let user: Principal = response.json().await?;
        let session = Session {
            access_token: access_token.to_owned(),
            user,
        };
        *self.session.write().await = Some(session.clone());
        self.install_session(&session);
        Ok(session)
    }

    async fn fetch_role(&self, user_id: Uuid) -> AuthResult<Role> {
        let response = self
            .client
            .get(self.rest_url("user_roles"))
            .query(&[
                ("select", "role".to_owned()),
                ("user_id", format!("eq.{user_id}")),
            ])
            .header("apikey", &self.api_key)
            // Single-object representation: a miss is a 406, not an empty
            // array.
            .header(header::ACCEPT, "application/vnd.pgrst.object+json")
            .bearer_auth(self.bearer().await)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(AuthError::Provider(format!("{status}: {text}")));
        }
        let cell: RoleCell = response.json().await?;
        Ok(Role::from(cell.role))
    }
}

#[async_trait]
impl AuthProvider for HttpBackend {
    async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&Credentials { email, password })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                    AuthError::InvalidCredentials(text)
                }
                _ => AuthError::Provider(text),
            });
        }
        let grant: TokenGrant = response.json().await?;
        let session = Session {
            access_token: grant.access_token,
            user: grant.user,
        };
        *self.session.write().await = Some(session.clone());
        self.install_session(&session);
        Ok(session)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let token = self.session.write().await.take().map(|s| s.access_token);
        let Some(token) = token else {
            return Ok(());
        };
        self.state_tx.send_replace(AuthState::SignedOut);
        // Server-side revocation is best effort; the local session is
        // already gone.
        match self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
        {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(status = %response.status(), "server-side sign-out refused");
            }
            Err(err) => tracing::warn!(%err, "server-side sign-out failed"),
            Ok(_) => {}
        }
        Ok(())
    }

    async fn role_of(&self, user_id: Uuid) -> Option<Role> {
        match self.fetch_role(user_id).await {
            Ok(role) => Some(role),
            Err(err) => {
                tracing::warn!(%user_id, %err, "role lookup failed, reading as viewer");
                None
            }
        }
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }
}

#[async_trait]
impl ZoneStore for HttpBackend {
    async fn select_all(&self) -> StoreResult<Vec<Zone>> {
        let response = self
            .client
            .get(self.rest_url("zones"))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;
        read_rows(response).await
    }

    async fn insert(&self, row: &ZoneInsertRow) -> StoreResult<Zone> {
        let response = self
            .client
            .post(self.rest_url("zones"))
            .header("apikey", &self.api_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer().await)
            .json(row)
            .send()
            .await?;
        let rows: Vec<Zone> = read_rows(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidResponse("insert returned no row".into()))
    }

    async fn update(&self, id: Uuid, row: &ZoneUpdateRow) -> StoreResult<Option<Zone>> {
        let response = self
            .client
            .patch(self.rest_url("zones"))
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.api_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer().await)
            .json(row)
            .send()
            .await?;
        // Zero matched rows come back as an empty representation.
        let rows: Vec<Zone> = read_rows(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let response = self
            .client
            .delete(self.rest_url("zones"))
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(store_error_for(status, text));
        }
        Ok(())
    }
}

async fn read_rows<T: DeserializeOwned>(response: reqwest::Response) -> StoreResult<T> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await?;
        return Err(store_error_for(status, text));
    }
    response.json().await.map_err(Into::into)
}

fn store_error_for(status: StatusCode, text: String) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Denied(text),
        StatusCode::NOT_FOUND => StoreError::NotFound,
        _ => StoreError::Provider(format!("{status}: {text}")),
    }
}

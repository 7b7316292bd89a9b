//! Auth collaborator seam
//!
//! The hosted auth service as the client sees it: session handling, the
//! role table and a lifecycle broadcast. One implementation speaks the real
//! HTTP protocol, the in-memory one backs unit tests and offline work.

pub mod policy;

pub use policy::{AccessPolicy, Gate};

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use shared::{Principal, Role};

use crate::error::AuthResult;

/// A live session with the auth service.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub user: Principal,
}

/// Auth lifecycle event, broadcast to anyone holding a receiver.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(Principal),
}

/// The auth side of the hosted backend.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current session, if any. Transport trouble reads as signed out.
    async fn session(&self) -> Option<Session>;

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;

    /// Drop the local session. The server-side revocation is best effort;
    /// locally the session is gone either way.
    async fn sign_out(&self) -> AuthResult<()>;

    /// Explicit role from the role table. A missing row and every failure
    /// path read as `None`; callers fall back to [`Role::Viewer`].
    async fn role_of(&self, user_id: Uuid) -> Option<Role>;

    /// Watch sign-in/sign-out transitions.
    fn subscribe(&self) -> watch::Receiver<AuthState>;
}

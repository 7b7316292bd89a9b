//! Page access policy
//!
//! The gate every map page runs once at load. It never fails: anything
//! wrong with the session reads as signed out, a role lookup miss reads as
//! viewer. Revocation mid-visit is only noticed at the next gate check or
//! through the auth-state watch channel.

use std::sync::Arc;

use shared::{Principal, Role};

use super::AuthProvider;

/// Outcome of the access check.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    /// Stay on the page.
    Granted { user: Principal, role: Role },
    /// No session: back to the login page.
    ToLogin,
    /// Signed in but not allowed here: over to the read-only map.
    ToViewer,
}

/// Role-based page gate over an [`AuthProvider`].
#[derive(Clone)]
pub struct AccessPolicy {
    provider: Arc<dyn AuthProvider>,
}

impl AccessPolicy {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Run the page-load access check.
    ///
    /// `required` is the minimum role for the page; `None` admits any
    /// signed-in user.
    pub async fn require_auth(&self, required: Option<Role>) -> Gate {
        let Some(session) = self.provider.session().await else {
            return Gate::ToLogin;
        };
        let role = self
            .provider
            .role_of(session.user.id)
            .await
            .unwrap_or_default();
        if required == Some(Role::Admin) && !role.is_admin() {
            tracing::info!(
                user = %session.user.email,
                %role,
                "admin page refused, sending to viewer"
            );
            return Gate::ToViewer;
        }
        Gate::Granted {
            user: session.user,
            role,
        }
    }
}

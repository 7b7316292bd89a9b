//! Revier Cloud Mock - offline stand-in for the hosted backend
//!
//! Serves the same `/auth/v1` and `/rest/v1` dialect the client speaks,
//! with the zones table's row-level access rules baked in. Integration
//! tests mount [`router`] on an ephemeral port; `main` runs it as a local
//! dev server.

use std::sync::Arc;

pub mod api;
pub mod state;

pub use api::router;
pub use state::AppState;

/// Serve the mock on an already-bound listener. Tests bind port 0 and
/// spawn this.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: Arc<AppState>,
) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

use std::sync::Arc;

use revier_cloud_mock::{AppState, router};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenv::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revier_cloud_mock=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState::from_env());
    state.seed_demo().await;

    let port = std::env::var("MOCK_PORT").unwrap_or_else(|_| "54321".to_owned());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("revier-cloud-mock listening on {addr}");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

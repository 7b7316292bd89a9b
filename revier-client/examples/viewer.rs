// revier-client/examples/viewer.rs
// Headless viewer: load the zone list and print what the map would render.

use std::sync::Arc;

use revier_client::{
    AccessPolicy, AuthProvider, ClientConfig, Gate, HttpBackend, MapSession, ZoneRepository,
};
use shared::{MapViewConfig, Role, type_label};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() == 2 {
        println!("Usage: {} [<email> <password>]", args[0]);
        println!("  Without credentials the viewer browses anonymously.");
        return Ok(());
    }

    let config = ClientConfig::from_env();
    tracing::info!("connecting to {}", config.base_url);
    let backend = Arc::new(HttpBackend::new(config)?);

    if args.len() >= 3 {
        let session = backend.sign_in(&args[1], &args[2]).await?;
        tracing::info!("signed in as {}", session.user.email);

        let policy = AccessPolicy::new(backend.clone());
        match policy.require_auth(Some(Role::Admin)).await {
            Gate::Granted { user, role } => {
                tracing::info!("editor access for {} ({})", user.email, role)
            }
            Gate::ToViewer => tracing::info!("no editor role, browsing read-only"),
            Gate::ToLogin => tracing::warn!("session vanished, browsing anonymously"),
        }
    }

    let mut session = MapSession::new(ZoneRepository::new(backend));
    let opening = session.start().await;
    while let Some(notice) = session.ui.take_notification() {
        tracing::warn!("{}", notice.message);
    }

    let view = MapViewConfig::default();
    println!(
        "Karte: {} (zoom {}..{}, start {} @ {})",
        view.tile_url, view.min_zoom, view.max_zoom, view.home, view.home_zoom
    );

    let counts = session.counts();
    println!(
        "Zonen: {} gesamt ({} Base, {} Bauverbot, {} Safezone, {} Aktionspunkte)",
        counts.total(),
        counts.base,
        counts.bauverbot,
        counts.safezone,
        counts.aktionspunkt
    );

    for zone in session.zones() {
        match session.shape_for(zone.id) {
            Some(shape) => println!(
                "  [{}] {} (PLZ {}) bei {} in {}",
                type_label(&zone.zone_type),
                zone.name,
                zone.plz,
                shape.anchor(),
                shape.style().color,
            ),
            None => println!("  [{}] {} ohne Geometrie", type_label(&zone.zone_type), zone.name),
        }
    }

    if let Some(bounds) = opening {
        println!("Ausschnitt: {} bis {}", bounds.south_west, bounds.north_east);
    }

    Ok(())
}

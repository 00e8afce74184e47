use tokio::net::TcpListener;
use tracing::{error, info};

use workforce_engine::api::{AppState, create_router};
use workforce_engine::config::{PolicyStore, ServerSettings};

#[tokio::main]
async fn main() {
    let settings = ServerSettings::from_env();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let store = match PolicyStore::load(&settings.policy_dir) {
        Ok(store) => store,
        Err(err) => {
            error!(policy_dir = %settings.policy_dir, error = %err, "Failed to load policies");
            std::process::exit(1);
        }
    };
    let router = create_router(AppState::new(store));

    let listener = match TcpListener::bind(&settings.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(bind_addr = %settings.bind_addr, error = %err, "Failed to bind");
            std::process::exit(1);
        }
    };
    info!(bind_addr = %settings.bind_addr, policy_dir = %settings.policy_dir, "Server starting...");

    if let Err(err) = axum::serve(listener, router).await {
        error!(error = %err, "Server stopped");
        std::process::exit(1);
    }
}

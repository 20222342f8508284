//! # Passkey Relying-Party Server
//!
//! Entry point: logging, configuration, shared state, the expired-challenge
//! sweep, and the HTTP listener.

use passkey_rp_server::{build_router, config::Config, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default: info level for most crates, debug level for this one.
    // Override with RUST_LOG.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,passkey_rp_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // An inconsistent relying-party configuration stops the server here
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let app_state = AppState::new(&config)?;
    tracing::info!("Relying party '{}' initialized", app_state.relying_party.rp_id());

    // Ceremonies that are begun but never finished would otherwise keep
    // their slot (and memory) forever
    let ceremonies = app_state.ceremonies.clone();
    let sweep_interval = config.sweep_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            let purged = ceremonies.purge_expired();
            if purged > 0 {
                tracing::debug!("Purged {} expired pending ceremonies", purged);
            }
        }
    });

    let app = build_router(app_state, &config);

    let bind_addr = config.bind_address();
    tracing::info!("Starting FIDO2 server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

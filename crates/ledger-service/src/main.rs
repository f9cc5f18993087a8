//! Ledger Service - HTTP API for customer accounts and transfers
//!
//! This is the main entry point for the ledger service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledger_service::{create_router, open_store, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let default_filter =
        std::env::var("LEDGER_LOG_LEVEL").unwrap_or_else(|_| "info,ledger=debug".into());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ledger Service");

    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        backend = %config.backend,
        reconcile_on_startup = config.reconcile_on_startup,
        "Service configuration loaded"
    );

    let store = open_store(&config)?;
    let state = AppState::new(store, config.clone());

    // Interrupted transfers must settle before new ones are accepted
    if config.reconcile_on_startup {
        let report = state.ledger.transfers().reconcile()?;
        tracing::info!(
            committed = report.committed.len(),
            aborted = report.aborted.len(),
            unresolved = report.unresolved.len(),
            "Startup reconciliation finished"
        );
    }

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

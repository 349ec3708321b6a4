//! Seat Tracker - seat occupancy and sitting-time service
//!
//! Records pressure samples from a seat sensor, tracks the current sitting
//! session, and reports how long the user has been sitting.

pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod reading;
pub mod session;
pub mod store;

pub use config::{load_config, Config};
pub use error::{Result, SeatError};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::classifier::OccupancyClassifier;
use crate::session::SessionTracker;

/// Build the session tracker described by the configuration
pub fn build_tracker(config: &Config) -> Result<Arc<SessionTracker>> {
    let store = store::open_store(&config.storage)?;
    let classifier = OccupancyClassifier::from_config(&config.classifier);
    tracing::debug!(
        "Occupancy rule: {:?}, threshold: {}",
        classifier.rule(),
        classifier.threshold()
    );
    Ok(Arc::new(SessionTracker::new(store, classifier)))
}

/// Serve the API until `cancel` fires
pub async fn serve(config: Config, cancel: CancellationToken) -> Result<()> {
    let tracker = build_tracker(&config)?;
    let router = api::build_router(tracker);

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        SeatError::Config(format!("Failed to bind HTTP server to {}: {}", addr, e))
    })?;
    tracing::info!("Seat tracker listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::info!("Seat tracker stopped");
    Ok(())
}

/// Run the seat tracker service with the given configuration
pub async fn run(config: Config) -> Result<()> {
    let cancel = CancellationToken::new();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
        cancel_for_signal.cancel();
    });

    serve(config, cancel).await
}

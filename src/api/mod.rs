pub mod average;
pub mod error;
pub mod fields;
pub mod rating;
pub mod songs;

use std::sync::Arc;
use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use crate::average::engine::AverageEngine;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::search::keyset::KeysetPager;
use crate::storage::store::{AggregateStore, RecordStore};

/// Engines shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub songs: Arc<dyn RecordStore>,
    pub pager: Arc<KeysetPager>,
    pub averages: Arc<AverageEngine>,
    pub default_page_size: usize,
}

impl AppState {
    pub fn new(config: &Config, songs: Arc<dyn RecordStore>, totals: Arc<dyn AggregateStore>) -> Self {
        let pager = KeysetPager::new(songs.clone()).with_max_limit(config.max_page_size);
        AppState {
            pager: Arc::new(pager),
            averages: Arc::new(AverageEngine::new(songs.clone(), totals)),
            songs,
            default_page_size: config.default_page_size,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/songs", get(songs::list_songs))
        .route("/songs/search", get(songs::list_songs))
        .route("/songs/avg", get(average::average_difficulty))
        .route("/songs/rating/{id}", get(rating::get_rating).post(rating::post_rating))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API on `config.bind_addr` until Ctrl+C or SIGTERM.
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

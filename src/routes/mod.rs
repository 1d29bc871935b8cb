//! HTTP routes
//!
//! - `/` - The analysis form
//! - `/api/analyze` - Run extraction and summarization for one document
//! - `/api/documents` - Documents available in the test folder
//! - `/api/health` - Health check

pub mod analyze;
pub mod documents;
pub mod health;
pub mod ui;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(ui::router())
        .merge(analyze::router(state.clone()))
        .merge(documents::router(state.clone()))
        .merge(health::router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

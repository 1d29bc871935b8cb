use axum::{extract::State, routing::get, Json, Router};

use crate::models::{AppState, HealthResponse};
use crate::source::list_repo_documents;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let dir = &state.config.analysis.documents_dir;

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        documents_dir: dir.display().to_string(),
        documents_available: list_repo_documents(dir).len(),
    })
}

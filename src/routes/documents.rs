use axum::{extract::State, routing::get, Json, Router};
use tracing::debug;

use crate::models::{AppState, DocumentListResponse};
use crate::source::list_repo_documents;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/documents", get(list_documents))
        .with_state(state)
}

// Rescanned on every request so files added while running show up.
async fn list_documents(State(state): State<AppState>) -> Json<DocumentListResponse> {
    let dir = state.config.analysis.documents_dir.clone();
    let documents = list_repo_documents(&dir);
    debug!(dir = %dir.display(), count = documents.len(), "Listed test documents");

    Json(DocumentListResponse {
        directory: dir.display().to_string(),
        documents,
    })
}

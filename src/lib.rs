// Document Insight - PDF/DOCX summarization with Azure AI Document Intelligence and Azure OpenAI

pub mod config;
pub mod types;
pub mod models;
pub mod source;
pub mod extraction;
pub mod llm;
pub mod analysis;
pub mod routes;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}

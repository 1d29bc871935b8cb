use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use document_insight::{
    analysis::DocumentAnalyzer,
    config::Config,
    extraction::AzureDocumentAdapter,
    llm::AzureOpenAIAdapter,
    routes::create_router,
    source::list_repo_documents,
    utils::init_logger,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load and validate configuration before anything is served
    info!("Checking configuration...");
    let config = Config::from_env()?;
    if let Err(e) = config.check() {
        error!(error = %e, "Configuration incomplete");
        return Err(e.into());
    }
    info!(
        deployment = %config.llm.deployment,
        api_version = %config.llm.api_version,
        max_chars = config.analysis.max_chars_for_summary,
        "Configuration loaded"
    );

    let documents = list_repo_documents(&config.analysis.documents_dir);
    info!(
        dir = %config.analysis.documents_dir.display(),
        count = documents.len(),
        "Test documents found"
    );

    let client = reqwest::Client::new();
    let analyzer = DocumentAnalyzer::new(
        Arc::new(AzureDocumentAdapter::with_client(client.clone(), &config.extraction)),
        Arc::new(AzureOpenAIAdapter::with_client(client, &config.llm)),
        config.analysis.max_chars_for_summary,
    );

    let config = Arc::new(config);
    let state = AppState::new(config.clone(), analyzer);
    let app = create_router(state);

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid HOST {:?}: {}", config.server.host, e))?;
    let addr = SocketAddr::new(host, config.server.port);
    info!("Server listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

mod api;
mod assistant;
mod compose;
mod config;
mod endpoints;
mod error;
mod fallback;
mod http;
mod intent;
mod links;
mod model;
mod navigation;
mod prompt;
mod rerank;
mod search;
mod server;
mod tables;
mod terms;

use std::sync::Arc;

use docs_common::algolia::AlgoliaClient;
use docs_common::completion::CompletionClient;
use rmcp::{transport::stdio, ServiceExt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use assistant::{Assistant, DocsAssistant};
use config::Config;
use endpoints::ApiRegistry;
use search::SearchOrchestrator;
use server::DocAssistantServer;
use tables::KnowledgeTables;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries MCP JSON-RPC in stdio mode.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting doc-assistant");

    // 1. Configuration
    let config = Config::from_env()?;
    info!(
        llama_server_url = %config.completion.base_url,
        search = config.algolia.is_some(),
        http_addr = ?config.http_addr,
        "configuration loaded"
    );

    // 2. Knowledge tables, shared read-only by every request
    let tables = Arc::new(KnowledgeTables::load(config.tables_path.as_deref())?);
    info!(
        version = tables.version(),
        routes = tables.routes().len(),
        "knowledge tables ready"
    );

    // 3. Collaborators (search is optional)
    let index = match &config.algolia {
        Some(algolia) => {
            info!(index = %algolia.index_name, "search index configured");
            Some(AlgoliaClient::new(algolia.clone())?)
        }
        None => {
            warn!("ALGOLIA_APP_ID/ALGOLIA_API_KEY not set, answering without retrieval");
            None
        }
    };
    let generator = CompletionClient::new(config.completion.clone())?;
    if generator.is_healthy().await {
        info!("completion server reachable");
    } else {
        warn!("completion server not reachable yet, offline routes will answer until it is");
    }

    let assistant: Arc<DocsAssistant> = Arc::new(Assistant::new(
        tables,
        SearchOrchestrator::new(index, config.search_oversample, config.search_timeout),
        Some(generator),
        config.assistant.clone(),
    ));

    // 4. Serve
    if let Some(addr) = config.http_addr {
        http::serve(addr, http::router(assistant)).await?;
        return Ok(());
    }

    let registry = ApiRegistry::new();
    info!(endpoints = registry.len(), "endpoint registry ready");
    let server = DocAssistantServer::new(assistant, registry);
    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}

/// MCP server for the documentation assistant.
///
/// Exposes six tools:
/// - `ask_docs`: answer a question with verified documentation links
/// - `search_docs`: ranked documentation search
/// - `get_api_info`: endpoint details by path, or endpoints matching a keyword
/// - `list_endpoints`: endpoints grouped by category
/// - `get_example_code`: a request snippet for an endpoint
/// - `route_offline`: answer from the route tables without search or generation
use std::sync::Arc;

use rmcp::{
    handler::server::router::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    tool, tool_handler, tool_router, Json, ServerHandler,
};
use tracing::info;

use crate::api::{
    ChatRequest, ChatResponse, GetApiInfoParams, GetExampleCodeParams, ListEndpointsParams,
    RouteOfflineParams,
    RouteOfflineResponse, SearchDocsRequest, SearchDocsResponse,
};
use crate::assistant::DocsAssistant;
use crate::endpoints::{
    example_code, generic_example, ApiInfoResponse, ApiRegistry, CategoryEndpoints,
    EndpointInfo, EndpointSummary, ExampleCodeResponse, ListEndpointsResponse,
    EXAMPLE_LANGUAGES,
};

#[derive(Clone)]
pub struct DocAssistantServer {
    assistant: Arc<DocsAssistant>,
    registry: ApiRegistry,
    tool_router: ToolRouter<DocAssistantServer>,
}

impl DocAssistantServer {
    pub fn new(assistant: Arc<DocsAssistant>, registry: ApiRegistry) -> Self {
        Self {
            assistant,
            registry,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl DocAssistantServer {
    #[tool(description = "Answer a question about the IQM API documentation. Returns a markdown answer whose links all point at verified documentation pages, plus the structured links, detected intent and the steps taken.")]
    async fn ask_docs(
        &self,
        Parameters(request): Parameters<ChatRequest>,
    ) -> Result<Json<ChatResponse>, String> {
        info!("ask_docs tool invoked");
        self.assistant
            .chat(&request)
            .await
            .map(Json)
            .map_err(|e| e.to_string())
    }

    #[tool(description = "Search the IQM documentation. Results are reranked for the query's intent; optionally filter by category (quickstart, guidelines, tutorials, reference, migration, political, healthcare).")]
    async fn search_docs(
        &self,
        Parameters(request): Parameters<SearchDocsRequest>,
    ) -> Result<Json<SearchDocsResponse>, String> {
        self.assistant
            .search_docs(&request)
            .await
            .map(Json)
            .map_err(|e| e.to_string())
    }

    #[tool(description = "Get details about an IQM API endpoint by path (e.g. '/api/v3/campaign/{id}'), or list the endpoints matching a keyword (e.g. 'budget').")]
    async fn get_api_info(
        &self,
        Parameters(params): Parameters<GetApiInfoParams>,
    ) -> Result<Json<ApiInfoResponse>, String> {
        api_info(&self.registry, &params).map(Json)
    }

    #[tool(description = "List IQM API endpoints in a category such as 'campaigns' or 'reports', or every category when none is given.")]
    async fn list_endpoints(
        &self,
        Parameters(params): Parameters<ListEndpointsParams>,
    ) -> Result<Json<ListEndpointsResponse>, String> {
        list_endpoints(&self.registry, &params).map(Json)
    }

    #[tool(description = "Get a ready-to-run request example for an IQM API endpoint path. Documented endpoints include a JSON body with their required fields. Supported language: curl.")]
    async fn get_example_code(
        &self,
        Parameters(params): Parameters<GetExampleCodeParams>,
    ) -> Result<Json<ExampleCodeResponse>, String> {
        example_for(&self.registry, &params).map(Json)
    }

    #[tool(description = "Answer a question from the built-in route tables only, without search or text generation. Useful when the live services are unavailable.")]
    async fn route_offline(
        &self,
        Parameters(params): Parameters<RouteOfflineParams>,
    ) -> Result<Json<RouteOfflineResponse>, String> {
        let answer = self
            .assistant
            .route_offline(&params.message)
            .map_err(|e| e.to_string())?;
        Ok(Json(RouteOfflineResponse {
            response: answer.text,
            structured_links: answer.links,
            route_id: answer.route_id,
        }))
    }
}

/// A path (anything containing '/') is looked up; anything else is a keyword search.
fn api_info(registry: &ApiRegistry, params: &GetApiInfoParams) -> Result<ApiInfoResponse, String> {
    let endpoint = params.endpoint.trim();
    if endpoint.is_empty() {
        return Err("endpoint must not be empty".to_string());
    }

    let endpoints: Vec<EndpointInfo> = if endpoint.contains('/') {
        let found = registry
            .get(endpoint, params.method.as_deref())
            .ok_or_else(|| format!("endpoint not found: {endpoint}"))?;
        vec![EndpointInfo::from(found)]
    } else {
        registry.search(endpoint).into_iter().map(EndpointInfo::from).collect()
    };
    Ok(ApiInfoResponse { endpoints })
}

/// Documented paths use the registry entry; other paths get a bare request with the given
/// method (POST when none is given).
fn example_for(
    registry: &ApiRegistry,
    params: &GetExampleCodeParams,
) -> Result<ExampleCodeResponse, String> {
    let path = params.endpoint.trim();
    if !path.starts_with('/') {
        return Err(format!("endpoint must be a path starting with '/': '{path}'"));
    }
    let language = params
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("curl")
        .to_lowercase();
    let unsupported = || {
        format!(
            "language not supported: '{language}'. Supported: {}",
            EXAMPLE_LANGUAGES.join(", ")
        )
    };

    let method = params.method.as_deref();
    let (example, endpoint) = match registry.get(path, method) {
        Some(found) => (
            example_code(found, &language).ok_or_else(unsupported)?,
            Some(EndpointSummary::from(found)),
        ),
        None => (
            generic_example(path, method.unwrap_or("POST"), &language).ok_or_else(unsupported)?,
            None,
        ),
    };
    Ok(ExampleCodeResponse {
        language,
        example,
        endpoint,
    })
}

fn list_endpoints(
    registry: &ApiRegistry,
    params: &ListEndpointsParams,
) -> Result<ListEndpointsResponse, String> {
    let summaries = |category: &str| {
        registry
            .by_category(category)
            .into_iter()
            .map(EndpointSummary::from)
            .collect::<Vec<_>>()
    };

    let categories = match params.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(category) => {
            let endpoints = summaries(category);
            if endpoints.is_empty() {
                return Err(format!(
                    "unknown category: '{category}'. Available categories: {}",
                    registry.categories().join(", ")
                ));
            }
            vec![CategoryEndpoints {
                category: category.to_lowercase(),
                endpoints,
            }]
        }
        None => registry
            .categories()
            .into_iter()
            .map(|category| CategoryEndpoints {
                category: category.to_string(),
                endpoints: summaries(category),
            })
            .collect(),
    };
    Ok(ListEndpointsResponse { categories })
}

#[tool_handler]
impl ServerHandler for DocAssistantServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "doc-assistant".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "IQM API documentation assistant. Use ask_docs for natural language \
                 questions, search_docs for ranked documentation search, get_api_info and \
                 list_endpoints for REST endpoint details, get_example_code for request \
                 snippets, and route_offline when the \
                 search or generation services are down."
                    .to_string(),
            ),
        }
    }
}

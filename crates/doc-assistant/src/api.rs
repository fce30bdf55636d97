//! Request and response types shared by the MCP tools and the REST routes.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::{
    ConversationTurn, LinkEntry, PageContext, QueryIntent, Role, StructuredLinks,
};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's question (at most 2000 characters by default).
    pub message: String,
    /// Page and conversation context from the docs site.
    #[serde(default)]
    pub context: Option<ChatContext>,
}

/// Chat body accepted over HTTP: the native `{message, context}` shape, an
/// OpenAI-style `{messages: [...]}` list, or a llama.cpp-style `{prompt}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatInput {
    #[serde(default)]
    pub messages: Option<Vec<HistoryTurn>>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub context: Option<ChatContext>,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl TryFrom<ChatInput> for ChatRequest {
    type Error = AppError;

    /// `messages` wins over `message`, which wins over `prompt`. In a message list the last
    /// entry is the question and the earlier ones are history.
    fn try_from(input: ChatInput) -> Result<Self, AppError> {
        if let Some(mut messages) = input.messages {
            let last = messages
                .pop()
                .ok_or_else(|| AppError::InvalidInput("messages must not be empty".to_string()))?;
            let mut context = input.context.unwrap_or_default();
            context.conversation_history.extend(messages);
            return Ok(ChatRequest {
                message: last.content,
                context: Some(context),
            });
        }
        if let Some(message) = input.message {
            return Ok(ChatRequest {
                message,
                context: input.context,
            });
        }
        if let Some(prompt) = input.prompt {
            return Ok(ChatRequest {
                message: prompt,
                context: None,
            });
        }
        Err(AppError::InvalidInput(
            "missing message, messages or prompt".to_string(),
        ))
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    /// Site path of the page being viewed, e.g. "/guidelines/campaign-api".
    pub current_page: Option<String>,
    pub page_title: Option<String>,
    #[serde(default)]
    pub headings: Vec<String>,
    /// Earlier turns, oldest first.
    #[serde(default)]
    pub conversation_history: Vec<HistoryTurn>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HistoryTurn {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
}

impl ChatContext {
    /// Turns with an unknown role are dropped.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.conversation_history
            .iter()
            .filter_map(|turn| {
                Some(ConversationTurn {
                    role: Role::parse(&turn.role)?,
                    text: turn.content.clone(),
                })
            })
            .collect()
    }

    pub fn page(&self) -> Option<PageContext> {
        let path = self.current_page.as_deref()?.trim();
        if path.is_empty() {
            return None;
        }
        Some(PageContext {
            path: path.to_string(),
            title: self.page_title.clone(),
            headings: self.headings.clone(),
        })
    }
}

/// Where the answer text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    /// Generated prose with verified links.
    Generated,
    /// Offline route table.
    Fallback,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Markdown answer. Every link in it is also listed in `structuredLinks`.
    pub response: String,
    pub actions: Vec<Action>,
    /// Flat list of every link, primary first.
    pub links: Vec<LinkEntry>,
    pub structured_links: StructuredLinks,
    pub query_intent: QueryIntent,
    pub source: AnswerSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Completed,
    NoResults,
    Skipped,
    Fallback,
    Suggested,
}

/// A step the assistant ran, or suggests the client run (`navigate`).
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Action {
    pub tool: String,
    pub params: serde_json::Value,
    pub status: ActionStatus,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchDocsRequest {
    /// Free-text search query.
    pub query: String,
    #[serde(default)]
    pub filters: Option<SearchFilters>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchFilters {
    /// Restrict results to these category slugs, e.g. ["guidelines", "quickstart"].
    #[serde(default)]
    pub categories: Vec<String>,
    /// Maximum number of results (default: 10, max: 50).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub title: String,
    pub url: String,
    pub category: String,
    pub snippet: String,
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocsResponse {
    pub results: Vec<SearchResultItem>,
    pub summary: String,
    pub total_count: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetApiInfoParams {
    /// Endpoint path such as "/api/v3/campaign/{id}", or a keyword such as "budget".
    pub endpoint: String,
    /// HTTP method used to disambiguate paths with several operations.
    pub method: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetExampleCodeParams {
    /// Endpoint path such as "/api/v3/campaign/add".
    pub endpoint: String,
    /// HTTP method, used when the path has several operations or is not documented.
    pub method: Option<String>,
    /// Snippet language (default: "curl").
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListEndpointsParams {
    /// Category such as "Campaign" or "Reports". Omit to list every category.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RouteOfflineParams {
    /// The user's question.
    pub message: String,
}

/// llama.cpp-compatible reply for `POST /completion`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionReply {
    pub content: String,
    pub model: String,
    pub stop: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteOfflineResponse {
    pub response: String,
    pub structured_links: StructuredLinks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub search_configured: bool,
    pub generation_configured: bool,
    pub tables_version: u32,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

//! Per-request orchestration: classify, retrieve, rerank, link, generate, compose.
//!
//! The assistant is built once in `main` and shared by the MCP and HTTP transports. Both
//! collaborators are optional; a missing or failing one is substituted locally and the
//! caller always receives an answer.
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use docs_common::algolia::AlgoliaClient;
use docs_common::completion::{CompletionClient, CompletionRequest};
use docs_common::error::CollaboratorError;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::api::{
    Action, ActionStatus, AnswerSource, ChatRequest, ChatResponse, SearchDocsRequest,
    SearchDocsResponse, SearchResultItem,
};
use crate::compose::compose_response;
use crate::error::AppError;
use crate::fallback::{route_offline, FallbackAnswer};
use crate::intent::classify_intent;
use crate::links::{build_links, resolve_title};
use crate::model::{DocCategory, Query, QueryIntent, StructuredLinks};
use crate::navigation::{validate_path, wants_navigation};
use crate::prompt::Prompt;
use crate::rerank::rerank;
use crate::search::{truncate_chars, Retrieval, SearchIndex, SearchOrchestrator};
use crate::tables::KnowledgeTables;
use crate::terms::extract_search_terms;

const DEFAULT_SEARCH_LIMIT: u32 = 10;
const MAX_SEARCH_LIMIT: u32 = 50;
const SEARCH_SNIPPET_CHARS: usize = 200;

/// The text generation collaborator: prompt in, generated text out.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> impl Future<Output = Result<String, CollaboratorError>> + Send;
}

impl TextGenerator for CompletionClient {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, CollaboratorError> {
        let request = CompletionRequest {
            prompt: prompt.to_string(),
            n_predict: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stop: params.stop.clone(),
        };
        self.complete(&request).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub stop: Vec<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 512,
            stop: vec!["</s>".to_string(), "[INST]".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub max_message_chars: usize,
    /// Ranked documents handed to the link builder and prompt.
    pub link_candidates: usize,
    pub generation_timeout: Duration,
    pub generation: GenerationParams,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            max_message_chars: 2000,
            link_candidates: 6,
            generation_timeout: Duration::from_secs(30),
            generation: GenerationParams::default(),
        }
    }
}

/// Which collaborators were configured at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub search: bool,
    pub generation: bool,
    pub tables_version: u32,
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub links: StructuredLinks,
    pub intent: QueryIntent,
    pub actions: Vec<Action>,
    pub source: AnswerSource,
}

impl From<Answer> for ChatResponse {
    fn from(answer: Answer) -> Self {
        ChatResponse {
            response: answer.text,
            actions: answer.actions,
            links: answer.links.all_links().cloned().collect(),
            structured_links: answer.links,
            query_intent: answer.intent,
            source: answer.source,
        }
    }
}

pub type DocsAssistant = Assistant<AlgoliaClient, CompletionClient>;

pub struct Assistant<S, G> {
    tables: Arc<KnowledgeTables>,
    search: SearchOrchestrator<S>,
    generator: Option<G>,
    settings: AssistantSettings,
}

impl<S: SearchIndex, G: TextGenerator> Assistant<S, G> {
    pub fn new(
        tables: Arc<KnowledgeTables>,
        search: SearchOrchestrator<S>,
        generator: Option<G>,
        settings: AssistantSettings,
    ) -> Self {
        Self {
            tables,
            search,
            generator,
            settings,
        }
    }

    pub fn readiness(&self) -> Readiness {
        Readiness {
            search: self.search.is_configured(),
            generation: self.generator.is_some(),
            tables_version: self.tables.version(),
        }
    }

    /// Validate a chat request. Runs before any classification or collaborator call.
    pub fn prepare(&self, request: &ChatRequest) -> Result<Query, AppError> {
        let query = Query::new(&request.message, self.settings.max_message_chars)?;
        Ok(match &request.context {
            Some(context) => query.with_history(context.history()).with_page(context.page()),
            None => query,
        })
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let query = self.prepare(request)?;
        Ok(self.answer(&query).await.into())
    }

    /// Answer one validated query. Never fails; collaborator outages fall back locally.
    pub async fn answer(&self, query: &Query) -> Answer {
        let intent = classify_intent(&query.text);
        let terms = extract_search_terms(&query.text, &self.tables);
        info!(query_intent = ?intent.intent, special = intent.special_category, terms = %terms, "handling query");

        let keep = self.settings.link_candidates;
        let retrieval = self.search.retrieve(&terms, keep, None).await;
        let search_status = match (&retrieval, self.search.is_configured()) {
            (_, false) => ActionStatus::Skipped,
            (Retrieval::Hits(_), true) => ActionStatus::Completed,
            (Retrieval::NoResults, true) => ActionStatus::NoResults,
        };
        let mut actions = vec![Action {
            tool: "search_docs".to_string(),
            params: json!({ "query": terms }),
            status: search_status,
        }];

        let mut ranked = rerank(retrieval.into_documents(), &intent, &self.tables);
        ranked.truncate(keep);
        let links = build_links(&ranked, &self.tables);
        let context: Vec<_> = ranked.into_iter().map(|r| r.document).collect();
        let prompt = Prompt::for_query(query, &context);
        debug!(
            sections = ?prompt.sections().iter().map(|s| s.kind.name()).collect::<Vec<_>>(),
            "prompt assembled"
        );

        let (text, links, source) = match self.generate(&prompt.render()).await {
            Ok(generated) => {
                actions.push(Action {
                    tool: "generate".to_string(),
                    params: json!({ "contextDocuments": context.len() }),
                    status: ActionStatus::Completed,
                });
                (compose_response(&generated, &links), links, AnswerSource::Generated)
            }
            Err(e) => {
                let timed_out = matches!(&e, AppError::GenerationUnavailable(c) if c.is_timeout());
                warn!(error = %e, timed_out, "answering from offline routes");
                let FallbackAnswer { text, links, route_id } = route_offline(&query.text, &self.tables);
                actions.push(Action {
                    tool: "generate".to_string(),
                    params: json!({ "route": route_id }),
                    status: ActionStatus::Fallback,
                });
                (text, links, AnswerSource::Fallback)
            }
        };

        if let Some(action) = navigate_action(&query.text, &links) {
            actions.push(action);
        }

        Answer {
            text,
            links,
            intent,
            actions,
            source,
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let Some(generator) = &self.generator else {
            return Err(AppError::GenerationUnavailable(CollaboratorError::NotConfigured(
                "text generation",
            )));
        };
        let timeout = self.settings.generation_timeout;
        let generated = tokio::time::timeout(
            timeout,
            generator.generate(prompt, &self.settings.generation),
        )
        .await
        .map_err(|_| CollaboratorError::Timeout {
            service: "text generation",
            timeout_ms: timeout.as_millis(),
        })
        .and_then(|result| result)
        .map_err(AppError::GenerationUnavailable)?;

        if generated.trim().is_empty() {
            return Err(AppError::GenerationUnavailable(CollaboratorError::Malformed(
                "empty completion".to_string(),
            )));
        }
        info!(chars = generated.len(), "generation complete");
        Ok(generated)
    }

    /// Search the docs directly, without generation.
    pub async fn search_docs(&self, request: &SearchDocsRequest) -> Result<SearchDocsResponse, AppError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("query must not be empty".to_string()));
        }
        let filters = request.filters.clone().unwrap_or_default();
        let limit = filters
            .limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT) as usize;
        let filter = category_filter(&filters.categories)?;

        let intent = classify_intent(query);
        let terms = extract_search_terms(query, &self.tables);
        let mut ranked = rerank(
            self.search
                .retrieve(&terms, limit, filter.as_deref())
                .await
                .into_documents(),
            &intent,
            &self.tables,
        );
        ranked.truncate(limit);

        let results: Vec<SearchResultItem> = ranked
            .iter()
            .map(|r| SearchResultItem {
                title: resolve_title(&r.document),
                url: r.document.url.clone(),
                category: r.document.category.as_str().to_string(),
                snippet: truncate_chars(&r.document.snippet, SEARCH_SNIPPET_CHARS),
                score: r.intent_score,
            })
            .collect();

        let summary = if !self.search.is_configured() {
            "Documentation search is not configured.".to_string()
        } else if results.is_empty() {
            format!("No documentation matched \"{query}\".")
        } else {
            format!("Found {} documentation pages for \"{query}\".", results.len())
        };
        debug!(query, results = results.len(), "search_docs complete");

        Ok(SearchDocsResponse {
            total_count: results.len(),
            results,
            summary,
        })
    }

    /// Answer from the route tables alone.
    pub fn route_offline(&self, message: &str) -> Result<FallbackAnswer, AppError> {
        let query = Query::new(message, self.settings.max_message_chars)?;
        Ok(route_offline(&query.text, &self.tables))
    }
}

/// Index filter expression for the requested category slugs.
fn category_filter(categories: &[String]) -> Result<Option<String>, AppError> {
    if categories.is_empty() {
        return Ok(None);
    }
    let clauses = categories
        .iter()
        .map(|raw| {
            DocCategory::from_label(raw)
                .map(|c| format!("category:{}", c.as_str()))
                .ok_or_else(|| AppError::InvalidInput(format!("unknown category: {raw}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(clauses.join(" OR ")))
}

fn navigate_action(message: &str, links: &StructuredLinks) -> Option<Action> {
    if !wants_navigation(message) {
        return None;
    }
    let primary = links.primary.as_ref()?;
    match validate_path(&primary.url) {
        Ok(path) => Some(Action {
            tool: "navigate".to_string(),
            params: json!({ "path": path, "title": primary.title }),
            status: ActionStatus::Suggested,
        }),
        Err(e) => {
            debug!(error = %e, "navigation suggestion dropped");
            None
        }
    }
}

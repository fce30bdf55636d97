//! REST transport for the docs site widget.
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info, warn};

use crate::api::{
    AnswerSource, ChatInput, ChatRequest, ChatResponse, CompletionReply, ErrorBody,
    HealthResponse, SearchDocsRequest, SearchDocsResponse,
};
use crate::assistant::{Assistant, TextGenerator};
use crate::error::AppError;
use crate::search::SearchIndex;

/// Model name reported by `/completion` for generated answers.
const GENERATED_MODEL: &str = "mistral-7b-local";
/// Model name reported by `/completion` when the route tables answered.
const FALLBACK_MODEL: &str = "offline-router";

pub fn router<S, G>(assistant: Arc<Assistant<S, G>>) -> Router
where
    S: SearchIndex + 'static,
    G: TextGenerator + 'static,
{
    Router::new()
        .route("/api/ai/chat", post(chat::<S, G>))
        .route("/v1/chat", post(chat::<S, G>))
        .route("/completion", post(completion::<S, G>))
        .route("/api/search", post(search::<S, G>))
        .route("/v1/search", post(search::<S, G>))
        .route("/health", get(health::<S, G>))
        .route("/api/health", get(health::<S, G>))
        .with_state(assistant)
}

/// Serve until ctrl-c.
pub async fn serve(addr: SocketAddr, app: Router) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
    }
}

async fn chat<S: SearchIndex, G: TextGenerator>(
    State(assistant): State<Arc<Assistant<S, G>>>,
    payload: Result<Json<ChatInput>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(input) = payload?;
    let request = ChatRequest::try_from(input)?;
    Ok(Json(assistant.chat(&request).await?))
}

/// llama.cpp-compatible surface over the same pipeline.
async fn completion<S: SearchIndex, G: TextGenerator>(
    State(assistant): State<Arc<Assistant<S, G>>>,
    payload: Result<Json<ChatInput>, JsonRejection>,
) -> Result<Json<CompletionReply>, ApiError> {
    let Json(input) = payload?;
    let request = ChatRequest::try_from(input)?;
    let response = assistant.chat(&request).await?;
    let model = match response.source {
        AnswerSource::Generated => GENERATED_MODEL,
        AnswerSource::Fallback => FALLBACK_MODEL,
    };
    Ok(Json(CompletionReply {
        content: response.response,
        model: model.to_string(),
        stop: true,
    }))
}

async fn search<S: SearchIndex, G: TextGenerator>(
    State(assistant): State<Arc<Assistant<S, G>>>,
    payload: Result<Json<SearchDocsRequest>, JsonRejection>,
) -> Result<Json<SearchDocsResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(assistant.search_docs(&request).await?))
}

async fn health<S: SearchIndex, G: TextGenerator>(
    State(assistant): State<Arc<Assistant<S, G>>>,
) -> Json<HealthResponse> {
    let readiness = assistant.readiness();
    Json(HealthResponse {
        status: "ok".to_string(),
        search_configured: readiness.search,
        generation_configured: readiness.generation,
        tables_version: readiness.tables_version,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Error response: 400 for caller mistakes, 500 otherwise.
#[derive(Debug)]
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            warn!(error = %self.0, "rejected request");
            StatusCode::BAD_REQUEST
        } else {
            error!(error = %self.0, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    use super::*;
    use crate::assistant::tests::FakeGenerator;
    use crate::assistant::AssistantSettings;
    use crate::search::tests::FakeIndex;
    use crate::search::SearchOrchestrator;
    use crate::tables::KnowledgeTables;

    fn state(generator: Option<FakeGenerator>) -> State<Arc<Assistant<FakeIndex, FakeGenerator>>> {
        State(Arc::new(Assistant::new(
            Arc::new(KnowledgeTables::builtin()),
            SearchOrchestrator::new(None, 10, Duration::from_secs(3)),
            generator,
            AssistantSettings::default(),
        )))
    }

    fn message(text: &str) -> Result<Json<ChatInput>, JsonRejection> {
        Ok(Json(ChatInput {
            message: Some(text.to_string()),
            ..Default::default()
        }))
    }

    async fn extract(body: &'static str) -> Result<Json<ChatInput>, JsonRejection> {
        let request = Request::builder()
            .method("POST")
            .uri("/api/ai/chat")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        Json::<ChatInput>::from_request(request, &()).await
    }

    async fn error_response(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn chat_answers_with_fallback_when_generation_fails() {
        let Json(response) = chat(
            state(Some(FakeGenerator::failing())),
            message("How do I upload a creative?"),
        )
        .await
        .unwrap();
        assert_eq!(
            response.structured_links.primary.unwrap().url,
            "/quickstart-guides/upload-a-creative-quickstart"
        );
    }

    #[tokio::test]
    async fn empty_message_is_bad_request() {
        let err = chat(state(None), message("   ")).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request_with_error_json() {
        let err = chat(state(None), extract("not json").await).await.unwrap_err();
        let (status, body) = error_response(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("invalid input"));
    }

    #[tokio::test]
    async fn missing_message_is_bad_request_with_error_json() {
        let err = chat(state(None), extract(r#"{"context":{}}"#).await)
            .await
            .unwrap_err();
        let (status, body) = error_response(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("missing message"));
    }

    #[tokio::test]
    async fn openai_messages_are_answered() {
        let payload = extract(
            r#"{"messages":[{"role":"user","content":"hi"},{"role":"user","content":"update campaign status"}]}"#,
        )
        .await;
        let Json(response) = chat(state(None), payload).await.unwrap();
        assert_eq!(response.source, AnswerSource::Fallback);
        assert_eq!(
            response.structured_links.primary.unwrap().url,
            "/guidelines/campaign-api#update-campaign-status"
        );
    }

    #[tokio::test]
    async fn completion_returns_llama_shape() {
        let payload = Ok(Json(ChatInput {
            prompt: Some("What is a campaign budget?".to_string()),
            ..Default::default()
        }));
        let Json(reply) = completion(state(Some(FakeGenerator::replying("Budgets cap spend."))), payload)
            .await
            .unwrap();
        assert!(reply.content.starts_with("Budgets cap spend."));
        assert_eq!(reply.model, GENERATED_MODEL);
        assert!(reply.stop);

        let Json(reply) = completion(state(None), message("update campaign status"))
            .await
            .unwrap();
        assert_eq!(reply.model, FALLBACK_MODEL);
    }

    #[test]
    fn collaborator_errors_are_server_errors() {
        let err = ApiError(AppError::Tables("broken".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_reports_readiness() {
        let Json(health) = health(state(Some(FakeGenerator::replying("ok")))).await;
        assert_eq!(health.status, "ok");
        assert!(!health.search_configured);
        assert!(health.generation_configured);
        assert_eq!(health.tables_version, crate::tables::TABLES_VERSION);
    }

    #[test]
    fn router_builds() {
        let _ = router(state(None).0);
    }
}

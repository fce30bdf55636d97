use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use docs_common::algolia::AlgoliaConfig;
use docs_common::completion::CompletionClientConfig;

use crate::assistant::AssistantSettings;
use crate::error::AppError;

const DEFAULT_LLAMA_SERVER_URL: &str = "http://localhost:8080";
const DEFAULT_INDEX_NAME: &str = "IQM API Docs";

/// Application configuration loaded explicitly from environment variables.
///
/// Every setting has a default except the search credentials; search stays disabled
/// unless both `ALGOLIA_APP_ID` and `ALGOLIA_API_KEY` are set.
#[derive(Debug, Clone)]
pub struct Config {
    pub completion: CompletionClientConfig,
    /// `None` disables retrieval.
    pub algolia: Option<AlgoliaConfig>,
    pub search_timeout: Duration,
    pub search_oversample: usize,
    pub assistant: AssistantSettings,
    /// JSON knowledge-table file; the builtin tables are used when absent.
    pub tables_path: Option<PathBuf>,
    /// Serve the REST API on this address instead of MCP on stdio.
    pub http_addr: Option<SocketAddr>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `LLAMA_SERVER_URL`, `GENERATION_TIMEOUT_SECS`
    /// - `ALGOLIA_APP_ID`, `ALGOLIA_API_KEY`, `ALGOLIA_INDEX_NAME`, `SEARCH_TIMEOUT_MS`
    /// - `MAX_MESSAGE_CHARS`, `SEARCH_OVERSAMPLE`, `LINK_CANDIDATES`
    /// - `DOC_ASSISTANT_TABLES`, `DOC_ASSISTANT_HTTP_ADDR`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let generation_timeout = Duration::from_secs(parse_or(&get, "GENERATION_TIMEOUT_SECS", 30u64)?);
        let search_timeout = Duration::from_millis(parse_or(&get, "SEARCH_TIMEOUT_MS", 3000u64)?);

        let llama_url = get("LLAMA_SERVER_URL").unwrap_or_else(|| DEFAULT_LLAMA_SERVER_URL.to_string());
        if !(llama_url.starts_with("http://") || llama_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "LLAMA_SERVER_URL must be an http(s) URL, got {llama_url}"
            )));
        }

        let algolia = match (get("ALGOLIA_APP_ID"), get("ALGOLIA_API_KEY")) {
            (Some(app_id), Some(api_key)) => {
                let index_name = get("ALGOLIA_INDEX_NAME").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string());
                Some(AlgoliaConfig::new(&app_id, &api_key, &index_name, search_timeout))
            }
            _ => None,
        };

        let max_message_chars: usize = parse_or(&get, "MAX_MESSAGE_CHARS", 2000)?;
        let link_candidates: usize = parse_or(&get, "LINK_CANDIDATES", 6)?;
        let search_oversample: usize = parse_or(&get, "SEARCH_OVERSAMPLE", 10)?;
        if max_message_chars == 0 || link_candidates == 0 {
            return Err(AppError::Config(
                "MAX_MESSAGE_CHARS and LINK_CANDIDATES must be positive".to_string(),
            ));
        }

        let http_addr = get("DOC_ASSISTANT_HTTP_ADDR")
            .map(|raw| {
                raw.parse::<SocketAddr>().map_err(|e| {
                    AppError::Config(format!("DOC_ASSISTANT_HTTP_ADDR={raw}: {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            completion: CompletionClientConfig::new(&llama_url, generation_timeout),
            algolia,
            search_timeout,
            search_oversample,
            assistant: AssistantSettings {
                max_message_chars,
                link_candidates,
                generation_timeout,
                ..AssistantSettings::default()
            },
            tables_path: get("DOC_ASSISTANT_TABLES").map(PathBuf::from),
            http_addr,
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{name}={raw}: {e}"))),
        None => Ok(default),
    }
}

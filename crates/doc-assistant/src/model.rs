use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::AppError;

/// A validated user question with its optional conversation and page context.
#[derive(Debug, Clone)]
pub struct Query {
    pub text: String,
    /// Prior turns, most recent last.
    pub history: Vec<ConversationTurn>,
    pub page: Option<PageContext>,
}

impl Query {
    /// Validate the raw message. Empty or over-long messages are client errors.
    pub fn new(message: &str, max_chars: usize) -> Result<Self, AppError> {
        let text = message.trim();
        if text.is_empty() {
            return Err(AppError::InvalidInput("message must not be empty".to_string()));
        }
        let len = text.chars().count();
        if len > max_chars {
            return Err(AppError::InvalidInput(format!(
                "message is {len} characters, maximum is {max_chars}"
            )));
        }
        Ok(Self {
            text: text.to_string(),
            history: Vec::new(),
            page: None,
        })
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_page(mut self, page: Option<PageContext>) -> Self {
        self.page = page;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

/// The documentation page the user is looking at.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub path: String,
    pub title: Option<String>,
    pub headings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    Create,
    Update,
    Get,
    Conceptual,
    Specific,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Create => "create",
            IntentKind::Update => "update",
            IntentKind::Get => "get",
            IntentKind::Conceptual => "conceptual",
            IntentKind::Specific => "specific",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryIntent {
    pub intent: IntentKind,
    /// Set when the query targets vertical or migration content on purpose.
    pub special_category: bool,
}

/// Documentation section a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocCategory {
    Quickstart,
    Guidelines,
    Tutorials,
    Reference,
    Migration,
    Political,
    Healthcare,
}

impl DocCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocCategory::Quickstart => "quickstart",
            DocCategory::Guidelines => "guidelines",
            DocCategory::Tutorials => "tutorials",
            DocCategory::Reference => "reference",
            DocCategory::Migration => "migration",
            DocCategory::Political => "political",
            DocCategory::Healthcare => "healthcare",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DocCategory::Quickstart => "Quickstart Guides",
            DocCategory::Guidelines => "API Guidelines",
            DocCategory::Tutorials => "Tutorials",
            DocCategory::Reference => "Reference",
            DocCategory::Migration => "Migration Guides",
            DocCategory::Political => "Political Vertical",
            DocCategory::Healthcare => "Healthcare Vertical",
        }
    }

    /// Parse an index-provided category label ("quickstart", "Migration Guides", ...).
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "quickstart" | "quickstarts" | "quickstart guides" | "quickstart guide" => {
                Some(DocCategory::Quickstart)
            }
            "guidelines" | "api guidelines" => Some(DocCategory::Guidelines),
            "tutorials" | "tutorial" => Some(DocCategory::Tutorials),
            "reference" | "api reference" | "getting started" => Some(DocCategory::Reference),
            "migration" | "migrations" | "migration guides" => Some(DocCategory::Migration),
            "political" | "political vertical" => Some(DocCategory::Political),
            "healthcare" | "healthcare vertical" => Some(DocCategory::Healthcare),
            _ => None,
        }
    }

    /// Infer the category from a site path. Vertical sections are checked first.
    pub fn infer_from_path(path: &str) -> Self {
        let path = path.to_ascii_lowercase();
        if path.contains("/political") {
            DocCategory::Political
        } else if path.contains("/healthcare") {
            DocCategory::Healthcare
        } else if path.contains("/migration") {
            DocCategory::Migration
        } else if path.contains("/quickstart") {
            DocCategory::Quickstart
        } else if path.contains("/tutorial") {
            DocCategory::Tutorials
        } else if path.contains("/guidelines") {
            DocCategory::Guidelines
        } else {
            DocCategory::Reference
        }
    }

    /// Vertical and migration content, demoted unless the query asks for it.
    pub fn is_low_priority(&self) -> bool {
        matches!(
            self,
            DocCategory::Migration | DocCategory::Political | DocCategory::Healthcare
        )
    }
}

/// A page or page section returned by the search index.
#[derive(Debug, Clone)]
pub struct CandidateDocument {
    pub id: String,
    /// Site-relative URL, possibly with a `#fragment`.
    pub url: String,
    /// Raw title as indexed, e.g. "Campaign API | IQM Docs".
    pub title: String,
    pub section_title: Option<String>,
    /// Top hierarchy title (the page title).
    pub page_title: Option<String>,
    /// Hierarchy level 0, e.g. "Getting Started".
    pub display_category: Option<String>,
    pub category: DocCategory,
    pub topic: String,
    pub snippet: String,
    pub anchor: Option<String>,
    /// Deepest populated hierarchy level (0 = section, 1 = page, 2+ = in-page heading).
    pub depth: u8,
    pub raw_score: Option<f64>,
}

impl CandidateDocument {
    pub fn base_url(&self) -> &str {
        base_url(&self.url)
    }
}

#[derive(Debug, Clone)]
pub struct RankedDocument {
    pub document: CandidateDocument,
    pub intent_score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct LinkEntry {
    pub title: String,
    pub url: String,
    /// Category slug, e.g. "guidelines".
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBucket {
    pub category: DocCategory,
    pub links: Vec<LinkEntry>,
}

/// Verified navigation links attached to an answer.
///
/// `related` is serialized as a JSON object whose keys appear in bucket first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct StructuredLinks {
    pub primary: Option<LinkEntry>,
    #[serde(serialize_with = "serialize_buckets")]
    #[schemars(with = "std::collections::BTreeMap<String, Vec<LinkEntry>>")]
    pub related: Vec<LinkBucket>,
}

impl StructuredLinks {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.related.iter().all(|b| b.links.is_empty())
    }

    /// Primary first, then related entries in bucket order.
    pub fn all_links(&self) -> impl Iterator<Item = &LinkEntry> {
        self.primary
            .iter()
            .chain(self.related.iter().flat_map(|bucket| bucket.links.iter()))
    }
}

fn serialize_buckets<S: Serializer>(buckets: &[LinkBucket], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        buckets
            .iter()
            .map(|bucket| (bucket.category.as_str(), &bucket.links)),
    )
}

/// URL with any `#fragment` removed.
pub fn base_url(url: &str) -> &str {
    url.split_once('#').map_or(url, |(base, _)| base)
}

/// Reduce an absolute URL to its site-relative path; relative input is returned as-is.
pub fn site_path(url: &str) -> String {
    let trimmed = url.trim();
    let Some((_, rest)) = trimmed.split_once("://") else {
        return trimmed.to_string();
    };
    match rest.find(['/', '#', '?']) {
        Some(idx) if rest[idx..].starts_with('/') => rest[idx..].to_string(),
        Some(idx) => format!("/{}", &rest[idx..]),
        None => "/".to_string(),
    }
}

//! Keyword, ranking and routing tables shared by every stage of the engine.
//!
//! There is exactly one table value per process. It is built once at startup (from the
//! compiled-in data, or from a JSON file with the same shape as [`TableSource`]) and
//! handed out as `Arc<KnowledgeTables>`. Nothing mutates it afterwards.
mod builtin;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::model::IntentKind;

pub use builtin::builtin_source;

/// Bumped whenever the table shape or semantics change; files with another version are rejected.
pub const TABLES_VERSION: u32 = 1;

/// Serialized form of the tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSource {
    pub version: u32,
    pub stop_words: Vec<String>,
    pub entity_expansions: Vec<EntityExpansion>,
    pub category_priorities: Vec<CategoryPriority>,
    pub path_boosts: Vec<PathBoost>,
    pub advanced_markers: Vec<String>,
    pub reference_pages: Vec<ReferencePage>,
    pub auth_pattern: String,
    pub auth_route: FallbackRoute,
    pub routes: Vec<FallbackRoute>,
    pub generic_suggestions: Vec<RouteLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityExpansion {
    pub term: String,
    pub expansion: String,
}

/// Score adjustment for documents of `label` (category slug or hierarchy level 0) under `intent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPriority {
    pub intent: IntentKind,
    pub label: String,
    pub boost: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathBoost {
    pub intent: IntentKind,
    /// Lowercase substring of the document path.
    pub pattern: String,
    pub boost: i32,
}

/// Maps a quickstart or tutorial path (by substring) to the reference page it builds on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencePage {
    pub path_fragment: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackRoute {
    pub id: String,
    pub keywords: Vec<String>,
    pub title: String,
    pub url: String,
    pub summary: String,
    #[serde(default)]
    pub related: Vec<RouteLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug)]
pub struct KnowledgeTables {
    version: u32,
    stop_words: HashSet<String>,
    expansions: HashMap<String, String>,
    priorities: HashMap<(IntentKind, String), i32>,
    path_boosts: Vec<PathBoost>,
    advanced_markers: Vec<String>,
    reference_pages: Vec<ReferencePage>,
    auth_pattern: Regex,
    auth_route: FallbackRoute,
    routes: Vec<FallbackRoute>,
    generic_suggestions: Vec<RouteLink>,
}

impl KnowledgeTables {
    /// The compiled-in tables.
    pub fn builtin() -> Self {
        Self::from_source(builtin_source()).expect("builtin knowledge tables are valid")
    }

    /// Load tables from `path`, or the builtin tables when no path is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::builtin());
        };
        let raw = std::fs::read_to_string(path)?;
        let source: TableSource = serde_json::from_str(&raw)
            .map_err(|e| AppError::Tables(format!("{}: {e}", path.display())))?;
        let tables = Self::from_source(source)?;
        info!(
            path = %path.display(),
            routes = tables.routes.len(),
            "knowledge tables loaded from file"
        );
        Ok(tables)
    }

    /// Validate and index a table source. Keys and keywords are lowercased here.
    pub fn from_source(source: TableSource) -> Result<Self, AppError> {
        if source.version != TABLES_VERSION {
            return Err(AppError::Tables(format!(
                "unsupported table version {} (expected {TABLES_VERSION})",
                source.version
            )));
        }
        if source.routes.is_empty() {
            return Err(AppError::Tables("route table is empty".to_string()));
        }

        let auth_pattern = Regex::new(&source.auth_pattern)
            .map_err(|e| AppError::Tables(format!("invalid auth pattern: {e}")))?;

        let mut priorities = HashMap::new();
        for entry in &source.category_priorities {
            let key = (entry.intent, entry.label.trim().to_lowercase());
            if priorities.insert(key, entry.boost).is_some() {
                return Err(AppError::Tables(format!(
                    "duplicate category priority for {}/{}",
                    entry.intent.as_str(),
                    entry.label
                )));
            }
        }

        let expansions = source
            .entity_expansions
            .iter()
            .map(|e| (e.term.trim().to_lowercase(), e.expansion.trim().to_string()))
            .collect();

        let routes = source
            .routes
            .into_iter()
            .map(normalize_route)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: source.version,
            stop_words: source.stop_words.iter().map(|w| w.trim().to_lowercase()).collect(),
            expansions,
            priorities,
            path_boosts: source
                .path_boosts
                .into_iter()
                .map(|b| PathBoost {
                    pattern: b.pattern.to_lowercase(),
                    ..b
                })
                .collect(),
            advanced_markers: source
                .advanced_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            reference_pages: source
                .reference_pages
                .into_iter()
                .map(|page| ReferencePage {
                    path_fragment: page.path_fragment.to_lowercase(),
                    ..page
                })
                .collect(),
            auth_pattern,
            auth_route: source.auth_route,
            routes,
            generic_suggestions: source.generic_suggestions,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Multi-word expansion for an exact (lowercase) token.
    pub fn expansion(&self, token: &str) -> Option<&str> {
        self.expansions.get(token).map(String::as_str)
    }

    pub fn category_priority(&self, intent: IntentKind, label: &str) -> Option<i32> {
        self.priorities
            .get(&(intent, label.trim().to_lowercase()))
            .copied()
    }

    /// Sum of every path boost for `intent` whose pattern occurs in `path`.
    pub fn path_boost(&self, intent: IntentKind, path: &str) -> i32 {
        let path = path.to_lowercase();
        self.path_boosts
            .iter()
            .filter(|b| b.intent == intent && path.contains(&b.pattern))
            .map(|b| b.boost)
            .sum()
    }

    pub fn is_advanced_track(&self, title: &str, path: &str) -> bool {
        let title = title.to_lowercase();
        let path = path.to_lowercase();
        self.advanced_markers
            .iter()
            .any(|m| title.contains(m.as_str()) || path.contains(m.as_str()))
    }

    /// First registered reference page whose fragment occurs in `path`, ignoring case.
    pub fn reference_page_for(&self, path: &str) -> Option<&ReferencePage> {
        let path = path.to_lowercase();
        self.reference_pages
            .iter()
            .find(|page| path.contains(&page.path_fragment))
    }

    pub fn is_auth_query(&self, query: &str) -> bool {
        self.auth_pattern.is_match(query)
    }

    pub fn auth_route(&self) -> &FallbackRoute {
        &self.auth_route
    }

    /// Routes in registration order.
    pub fn routes(&self) -> &[FallbackRoute] {
        &self.routes
    }

    pub fn generic_suggestions(&self) -> &[RouteLink] {
        &self.generic_suggestions
    }
}

fn normalize_route(route: FallbackRoute) -> Result<FallbackRoute, AppError> {
    let keywords: Vec<String> = route
        .keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return Err(AppError::Tables(format!("route {} has no keywords", route.id)));
    }
    Ok(FallbackRoute { keywords, ..route })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_valid() {
        let tables = KnowledgeTables::builtin();
        assert_eq!(tables.version(), TABLES_VERSION);
        assert!(tables.routes().len() > 10);
        assert!(tables.is_stop_word("how"));
        assert_eq!(tables.expansion("campaign"), Some("campaign api"));
        assert_eq!(
            tables.category_priority(IntentKind::Create, "Quickstart"),
            Some(100)
        );
        assert_eq!(
            tables.category_priority(IntentKind::Conceptual, "Getting Started"),
            Some(100)
        );
        assert_eq!(tables.category_priority(IntentKind::Get, "migration"), None);
    }

    #[test]
    fn builtin_source_round_trips_through_json() {
        let json = serde_json::to_string(&builtin_source()).unwrap();
        let source: TableSource = serde_json::from_str(&json).unwrap();
        let tables = KnowledgeTables::from_source(source).unwrap();
        assert_eq!(tables.routes().len(), KnowledgeTables::builtin().routes().len());
    }

    #[test]
    fn rejects_wrong_version() {
        let mut source = builtin_source();
        source.version = TABLES_VERSION + 1;
        assert!(matches!(
            KnowledgeTables::from_source(source),
            Err(AppError::Tables(_))
        ));
    }

    #[test]
    fn rejects_duplicate_priorities() {
        let mut source = builtin_source();
        let dup = source.category_priorities[0].clone();
        source.category_priorities.push(dup);
        assert!(KnowledgeTables::from_source(source).is_err());
    }

    #[test]
    fn rejects_invalid_auth_pattern() {
        let mut source = builtin_source();
        source.auth_pattern = "(unclosed".to_string();
        assert!(KnowledgeTables::from_source(source).is_err());
    }

    #[test]
    fn route_keywords_are_lowercased() {
        let mut source = builtin_source();
        source.routes[0].keywords = vec!["  Create Campaign ".to_string()];
        let tables = KnowledgeTables::from_source(source).unwrap();
        assert_eq!(tables.routes()[0].keywords, vec!["create campaign".to_string()]);
    }

    #[test]
    fn reference_page_lookup_uses_registration_order() {
        let tables = KnowledgeTables::builtin();
        let page = tables
            .reference_page_for("/quickstart-guides/create-a-campaign-quickstart")
            .unwrap();
        assert_eq!(page.url, "/guidelines/campaign-api");
        assert!(tables.reference_page_for("/guidelines/reports-api").is_none());
    }

    #[test]
    fn reference_page_lookup_ignores_case() {
        let mut source = builtin_source();
        source.reference_pages.insert(
            0,
            ReferencePage {
                path_fragment: "Upload-A-Video".to_string(),
                title: "Creative API".to_string(),
                url: "/guidelines/creative-api".to_string(),
            },
        );
        let tables = KnowledgeTables::from_source(source).unwrap();
        let page = tables
            .reference_page_for("/Tutorials/upload-a-video-creative")
            .unwrap();
        assert_eq!(page.url, "/guidelines/creative-api");
    }

    #[test]
    fn load_without_path_uses_builtin() {
        let tables = KnowledgeTables::load(None).unwrap();
        assert_eq!(tables.version(), TABLES_VERSION);
    }
}

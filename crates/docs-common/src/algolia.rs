/// Client for an Algolia DocSearch-style documentation index.
///
/// Only the query endpoint is used. Hits carry the DocSearch hierarchy (`lvl0` is the
/// site section, `lvl1` the page title, deeper levels in-page headings), the page URL,
/// an optional anchor and a content snippet. Index construction is out of scope.
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;
use crate::http::parse_json_response;

#[derive(Clone, Debug)]
pub struct AlgoliaConfig {
    pub app_id: String,
    pub api_key: String,
    pub index_name: String,
    pub timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl AlgoliaConfig {
    pub fn new(app_id: &str, api_key: &str, index_name: &str, timeout: Duration) -> Self {
        Self {
            app_id: app_id.to_string(),
            api_key: api_key.to_string(),
            index_name: index_name.to_string(),
            timeout,
            max_error_body_bytes: 8 * 1024,
        }
    }

    /// `https://{app}-dsn.algolia.net/1/indexes/{index}/query`
    pub fn query_url(&self) -> String {
        format!(
            "https://{}-dsn.algolia.net/1/indexes/{}/query",
            self.app_id,
            encode_path_segment(&self.index_name)
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: String,
    pub hits_per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    #[serde(rename = "nbHits")]
    pub nb_hits: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "objectID", default)]
    pub object_id: String,
    pub url: String,
    pub anchor: Option<String>,
    pub content: Option<String>,
    /// Page `<title>` when the crawler records it, e.g. "Campaign API | IQM Docs".
    pub title: Option<String>,
    #[serde(default)]
    pub hierarchy: Hierarchy,
    pub category: Option<String>,
    pub topic: Option<String>,
    #[serde(rename = "_rankingInfo")]
    pub ranking_info: Option<RankingInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hierarchy {
    pub lvl0: Option<String>,
    pub lvl1: Option<String>,
    pub lvl2: Option<String>,
    pub lvl3: Option<String>,
    pub lvl4: Option<String>,
}

impl Hierarchy {
    fn levels(&self) -> [Option<&str>; 5] {
        [
            self.lvl0.as_deref(),
            self.lvl1.as_deref(),
            self.lvl2.as_deref(),
            self.lvl3.as_deref(),
            self.lvl4.as_deref(),
        ]
        .map(|level| level.map(str::trim).filter(|s| !s.is_empty()))
    }

    /// Index of the deepest populated level (`lvl0` = 0), or `None` for an empty hierarchy.
    pub fn depth(&self) -> Option<u8> {
        self.levels()
            .iter()
            .rposition(Option::is_some)
            .map(|idx| idx as u8)
    }

    /// Deepest in-page heading below the page title (`lvl2`..`lvl4`).
    pub fn section_title(&self) -> Option<&str> {
        self.levels()[2..].iter().rev().find_map(|level| *level)
    }

    pub fn page_title(&self) -> Option<&str> {
        self.levels()[1]
    }

    pub fn section_label(&self) -> Option<&str> {
        self.levels()[0]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingInfo {
    pub user_score: Option<f64>,
    pub words: Option<u32>,
}

#[derive(Clone)]
pub struct AlgoliaClient {
    config: AlgoliaConfig,
    http: reqwest::Client,
}

impl AlgoliaClient {
    pub fn new(config: AlgoliaConfig) -> Result<Self, CollaboratorError> {
        let http = reqwest::Client::builder()
            .user_agent("doc-assistant/search")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &AlgoliaConfig {
        &self.config
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, CollaboratorError> {
        let resp = self
            .http
            .post(self.config.query_url())
            .timeout(self.config.timeout)
            .header("X-Algolia-Application-Id", &self.config.app_id)
            .header("X-Algolia-API-Key", &self.config.api_key)
            .json(params)
            .send()
            .await?;
        parse_json_response(resp, self.config.max_error_body_bytes).await
    }
}

/// Percent-encode an index name for use as a single URL path segment.
fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_url_encodes_index_name() {
        let config = AlgoliaConfig::new("ABC123", "key", "IQM API Docs", Duration::from_secs(3));
        assert_eq!(
            config.query_url(),
            "https://ABC123-dsn.algolia.net/1/indexes/IQM%20API%20Docs/query"
        );
    }

    #[test]
    fn params_use_algolia_field_names() {
        let params = SearchParams {
            query: "campaign api".to_string(),
            hits_per_page: 10,
            filters: None,
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["hitsPerPage"], 10);
        assert!(json.get("filters").is_none());
    }

    #[test]
    fn hit_parses_docsearch_shape() {
        let raw = r##"{
            "objectID": "42",
            "url": "https://developers.iqm.com/guidelines/campaign-api#create-a-campaign",
            "anchor": "create-a-campaign",
            "content": null,
            "hierarchy": {
                "lvl0": "Guidelines",
                "lvl1": "Campaign API",
                "lvl2": "Create a Campaign",
                "lvl3": null
            },
            "_rankingInfo": {"userScore": 17}
        }"##;
        let hit: SearchHit = serde_json::from_str(raw).unwrap();
        assert_eq!(hit.object_id, "42");
        assert_eq!(hit.hierarchy.depth(), Some(2));
        assert_eq!(hit.hierarchy.section_title(), Some("Create a Campaign"));
        assert_eq!(hit.hierarchy.page_title(), Some("Campaign API"));
        assert_eq!(hit.ranking_info.and_then(|r| r.user_score), Some(17.0));
    }

    #[test]
    fn blank_levels_do_not_count_towards_depth() {
        let hierarchy = Hierarchy {
            lvl0: Some("Guidelines".to_string()),
            lvl1: Some("Reports API".to_string()),
            lvl2: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(hierarchy.depth(), Some(1));
        assert_eq!(hierarchy.section_title(), None);
        assert_eq!(Hierarchy::default().depth(), None);
    }
}

/// Retrieval against the documentation search index.
///
/// The orchestrator asks the index for more hits than the link builder will keep, so the
/// reranker has material to reorder. Every failure mode (not configured, timeout,
/// non-success status, malformed payload, zero hits) collapses into
/// [`Retrieval::NoResults`]; nothing here returns an error to the caller.
use std::future::Future;
use std::time::Duration;

use docs_common::algolia::{AlgoliaClient, SearchHit, SearchParams};
use docs_common::error::CollaboratorError;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::model::{site_path, CandidateDocument, DocCategory};

const MAX_SNIPPET_CHARS: usize = 500;

/// The search collaborator: (query, hit limit, optional filter) in, ranked hits out.
pub trait SearchIndex: Send + Sync {
    fn query(
        &self,
        query: &str,
        limit: usize,
        filter: Option<&str>,
    ) -> impl Future<Output = Result<Vec<SearchHit>, CollaboratorError>> + Send;
}

impl SearchIndex for AlgoliaClient {
    async fn query(
        &self,
        query: &str,
        limit: usize,
        filter: Option<&str>,
    ) -> Result<Vec<SearchHit>, CollaboratorError> {
        let params = SearchParams {
            query: query.to_string(),
            hits_per_page: u32::try_from(limit).unwrap_or(u32::MAX),
            filters: filter.map(str::to_string),
        };
        Ok(self.search(&params).await?.hits)
    }
}

#[derive(Debug)]
pub enum Retrieval {
    Hits(Vec<CandidateDocument>),
    NoResults,
}

impl Retrieval {
    pub fn into_documents(self) -> Vec<CandidateDocument> {
        match self {
            Retrieval::Hits(docs) => docs,
            Retrieval::NoResults => Vec::new(),
        }
    }
}

pub struct SearchOrchestrator<S> {
    index: Option<S>,
    oversample: usize,
    timeout: Duration,
}

impl<S: SearchIndex> SearchOrchestrator<S> {
    pub fn new(index: Option<S>, oversample: usize, timeout: Duration) -> Self {
        Self {
            index,
            oversample,
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.index.is_some()
    }

    /// Number of hits requested from the index when `keep` documents are wanted.
    pub fn fetch_limit(&self, keep: usize) -> usize {
        self.oversample.max(keep)
    }

    /// Run one search. Hits come back in collaborator order.
    pub async fn retrieve(&self, terms: &str, keep: usize, filter: Option<&str>) -> Retrieval {
        let Some(index) = &self.index else {
            debug!("search index not configured, skipping retrieval");
            return Retrieval::NoResults;
        };

        let limit = self.fetch_limit(keep);
        let outcome = tokio::time::timeout(self.timeout, index.query(terms, limit, filter)).await;
        let hits = match outcome {
            Ok(Ok(hits)) => hits,
            Ok(Err(e)) => {
                let timed_out = e.is_timeout();
                let err = AppError::SearchUnavailable(e);
                warn!(error = %err, timed_out, terms, "continuing without retrieval context");
                return Retrieval::NoResults;
            }
            Err(_) => {
                let err = AppError::SearchUnavailable(CollaboratorError::Timeout {
                    service: "search index",
                    timeout_ms: self.timeout.as_millis(),
                });
                warn!(error = %err, timed_out = true, terms, "continuing without retrieval context");
                return Retrieval::NoResults;
            }
        };

        if hits.is_empty() {
            info!(terms, "search returned no hits");
            return Retrieval::NoResults;
        }

        info!(terms, hits = hits.len(), limit, "search complete");
        Retrieval::Hits(hits.into_iter().map(candidate_from_hit).collect())
    }
}

/// Convert an index hit into a candidate document.
///
/// URLs become site-relative. The category comes from the hit when it names a known one,
/// otherwise from the path. The topic defaults to the last path segment.
pub fn candidate_from_hit(hit: SearchHit) -> CandidateDocument {
    let url = site_path(&hit.url);
    let category = hit
        .category
        .as_deref()
        .and_then(DocCategory::from_label)
        .unwrap_or_else(|| DocCategory::infer_from_path(&url));

    let page_title = hit.hierarchy.page_title().map(str::to_string);
    let title = hit
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| page_title.clone())
        .unwrap_or_else(|| url.clone());

    let topic = hit
        .topic
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| topic_from_path(&url));

    let anchor = hit
        .anchor
        .clone()
        .filter(|a| !a.trim().is_empty())
        .or_else(|| url.split_once('#').map(|(_, a)| a.to_string()));

    CandidateDocument {
        id: hit.object_id.clone(),
        title,
        section_title: hit.hierarchy.section_title().map(str::to_string),
        page_title,
        display_category: hit.hierarchy.section_label().map(str::to_string),
        category,
        topic,
        snippet: truncate_chars(hit.content.as_deref().unwrap_or_default(), MAX_SNIPPET_CHARS),
        anchor,
        depth: hit.hierarchy.depth().unwrap_or(0),
        raw_score: hit.ranking_info.as_ref().and_then(|r| r.user_score),
        url,
    }
}

fn topic_from_path(url: &str) -> String {
    crate::model::base_url(url)
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("home")
        .to_string()
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use docs_common::algolia::Hierarchy;
    use super::*;

    /// In-memory index used across the crate's tests.
    #[derive(Clone, Default)]
    pub(crate) struct FakeIndex {
        pub hits: Vec<SearchHit>,
        pub fail: bool,
        pub delay: Option<Duration>,
        pub calls: Arc<AtomicUsize>,
        pub last_limit: Arc<AtomicUsize>,
        pub last_filter: Arc<Mutex<Option<String>>>,
    }

    impl SearchIndex for FakeIndex {
        async fn query(
            &self,
            _query: &str,
            limit: usize,
            filter: Option<&str>,
        ) -> Result<Vec<SearchHit>, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_limit.store(limit, Ordering::SeqCst);
            *self.last_filter.lock().unwrap() = filter.map(str::to_string);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(CollaboratorError::Malformed("index exploded".to_string()));
            }
            Ok(self.hits.iter().take(limit).cloned().collect())
        }
    }

    pub(crate) fn hit(url: &str, lvl0: &str, lvl1: &str, lvl2: Option<&str>) -> SearchHit {
        SearchHit {
            object_id: url.to_string(),
            url: format!("https://developers.iqm.com{url}"),
            anchor: url.split_once('#').map(|(_, a)| a.to_string()),
            content: Some(format!("Content for {lvl1}")),
            title: None,
            hierarchy: Hierarchy {
                lvl0: Some(lvl0.to_string()),
                lvl1: Some(lvl1.to_string()),
                lvl2: lvl2.map(str::to_string),
                ..Default::default()
            },
            category: None,
            topic: None,
            ranking_info: None,
        }
    }

    #[tokio::test]
    async fn oversamples_and_converts_hits() {
        let index = FakeIndex {
            hits: vec![
                hit("/guidelines/campaign-api#create-a-campaign", "Guidelines", "Campaign API", Some("Create a Campaign")),
                hit("/quickstart-guides/create-a-campaign-quickstart", "Quickstart Guides", "Create a Campaign", None),
            ],
            ..Default::default()
        };
        let last_limit = Arc::clone(&index.last_limit);
        let orchestrator = SearchOrchestrator::new(Some(index), 10, Duration::from_secs(3));

        let docs = orchestrator.retrieve("create campaign api", 6, None).await.into_documents();

        assert_eq!(last_limit.load(Ordering::SeqCst), 10);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].url, "/guidelines/campaign-api#create-a-campaign");
        assert_eq!(docs[0].category, DocCategory::Guidelines);
        assert_eq!(docs[0].anchor.as_deref(), Some("create-a-campaign"));
        assert_eq!(docs[0].depth, 2);
        assert_eq!(docs[0].topic, "campaign-api");
        assert_eq!(docs[1].category, DocCategory::Quickstart);
    }

    #[tokio::test]
    async fn failure_becomes_no_results() {
        let orchestrator = SearchOrchestrator::new(
            Some(FakeIndex {
                fail: true,
                ..Default::default()
            }),
            10,
            Duration::from_secs(3),
        );
        assert!(matches!(
            orchestrator.retrieve("anything", 6, None).await,
            Retrieval::NoResults
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_becomes_no_results() {
        let orchestrator = SearchOrchestrator::new(
            Some(FakeIndex {
                hits: vec![hit("/guidelines/reports-api", "Guidelines", "Reports API", None)],
                delay: Some(Duration::from_secs(10)),
                ..Default::default()
            }),
            10,
            Duration::from_millis(500),
        );
        assert!(matches!(
            orchestrator.retrieve("reports api", 6, None).await,
            Retrieval::NoResults
        ));
    }

    #[tokio::test]
    async fn unconfigured_index_is_skipped() {
        let orchestrator: SearchOrchestrator<FakeIndex> =
            SearchOrchestrator::new(None, 10, Duration::from_secs(3));
        assert!(!orchestrator.is_configured());
        assert!(matches!(
            orchestrator.retrieve("reports", 6, None).await,
            Retrieval::NoResults
        ));
    }

    #[test]
    fn hit_category_label_overrides_path() {
        let mut raw = hit("/guidelines/campaign-api", "Guidelines", "Campaign API", None);
        raw.category = Some("migration".to_string());
        raw.title = Some("Campaign API | IQM Docs".to_string());
        let doc = candidate_from_hit(raw);
        assert_eq!(doc.category, DocCategory::Migration);
        assert_eq!(doc.title, "Campaign API | IQM Docs");
    }

    #[test]
    fn truncates_long_snippets() {
        let long = "x".repeat(600);
        let out = truncate_chars(&long, MAX_SNIPPET_CHARS);
        assert_eq!(out.chars().count(), MAX_SNIPPET_CHARS + 3);
        assert!(out.ends_with("..."));
    }
}

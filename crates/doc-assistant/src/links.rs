use std::collections::HashSet;

use crate::model::{
    base_url, CandidateDocument, DocCategory, LinkBucket, LinkEntry, RankedDocument,
    StructuredLinks,
};
use crate::tables::KnowledgeTables;

pub const MAX_BUCKET_LINKS: usize = 3;

/// Accumulates links while enforcing base-URL uniqueness and the per-bucket cap.
///
/// URLs are stored as given; only the uniqueness check ignores fragments.
#[derive(Debug, Default)]
pub struct LinkCollector {
    seen: HashSet<String>,
    primary: Option<LinkEntry>,
    related: Vec<LinkBucket>,
}

impl LinkCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_seen(&self, url: &str) -> bool {
        self.seen.contains(base_url(url))
    }

    /// Set the primary link. Returns false if its base URL was already used.
    pub fn set_primary(&mut self, title: String, url: &str, category: DocCategory) -> bool {
        if !self.seen.insert(base_url(url).to_string()) {
            return false;
        }
        self.primary = Some(LinkEntry {
            title,
            url: url.to_string(),
            category: category.as_str().to_string(),
        });
        true
    }

    /// Append to the bucket for `category`. Duplicates and overflow are dropped.
    pub fn push_related(&mut self, title: String, url: &str, category: DocCategory) -> bool {
        let base = base_url(url);
        if self.seen.contains(base) {
            return false;
        }
        let idx = match self.related.iter().position(|b| b.category == category) {
            Some(idx) => idx,
            None => {
                self.related.push(LinkBucket {
                    category,
                    links: Vec::new(),
                });
                self.related.len() - 1
            }
        };
        let bucket = &mut self.related[idx];
        if bucket.links.len() >= MAX_BUCKET_LINKS {
            return false;
        }
        self.seen.insert(base.to_string());
        bucket.links.push(LinkEntry {
            title,
            url: url.to_string(),
            category: category.as_str().to_string(),
        });
        true
    }

    pub fn finish(self) -> StructuredLinks {
        StructuredLinks {
            primary: self.primary,
            related: self
                .related
                .into_iter()
                .filter(|bucket| !bucket.links.is_empty())
                .collect(),
        }
    }
}

/// Build the primary link and categorized related links from ranked documents.
///
/// When the primary is a quickstart or tutorial, the reference page it builds on is
/// injected first under guidelines and only guidelines documents follow it.
pub fn build_links(ranked: &[RankedDocument], tables: &KnowledgeTables) -> StructuredLinks {
    let Some((first, rest)) = ranked.split_first() else {
        return StructuredLinks::default();
    };

    let mut collector = LinkCollector::new();
    let primary = &first.document;
    collector.set_primary(resolve_title(primary), primary.base_url(), primary.category);

    let guided = matches!(
        primary.category,
        DocCategory::Quickstart | DocCategory::Tutorials
    );
    if guided {
        if let Some(page) = tables.reference_page_for(primary.base_url()) {
            collector.push_related(page.title.clone(), &page.url, DocCategory::Guidelines);
        }
    }

    for ranked in rest {
        let doc = &ranked.document;
        if collector.has_seen(&doc.url) {
            continue;
        }
        if guided && doc.category != DocCategory::Guidelines {
            continue;
        }
        collector.push_related(resolve_title(doc), doc.base_url(), doc.category);
    }

    collector.finish()
}

/// Section title, then page title, then display category, then the cleaned raw title.
pub fn resolve_title(doc: &CandidateDocument) -> String {
    [
        doc.section_title.as_deref(),
        doc.page_title.as_deref(),
        doc.display_category.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|t| !t.is_empty())
    .map(str::to_string)
    .unwrap_or_else(|| clean_title(&doc.title))
}

/// Drop site suffixes such as "Campaign API | IQM Docs" or "Reports - IQM".
pub fn clean_title(raw: &str) -> String {
    let cut = [" | ", " - "]
        .iter()
        .filter_map(|sep| raw.find(sep))
        .min()
        .unwrap_or(raw.len());
    raw[..cut].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rerank::tests::doc;

    fn ranked(docs: Vec<CandidateDocument>) -> Vec<RankedDocument> {
        docs.into_iter()
            .map(|document| RankedDocument {
                document,
                intent_score: 100,
            })
            .collect()
    }

    fn assert_invariants(links: &StructuredLinks) {
        let mut seen = HashSet::new();
        for link in links.all_links() {
            assert!(seen.insert(base_url(&link.url).to_string()), "duplicate {}", link.url);
        }
        for bucket in &links.related {
            assert!(bucket.links.len() <= MAX_BUCKET_LINKS);
        }
    }

    #[test]
    fn empty_input_yields_empty_links() {
        let links = build_links(&[], &KnowledgeTables::builtin());
        assert!(links.primary.is_none());
        assert!(links.related.is_empty());
        assert!(links.is_empty());
    }

    #[test]
    fn quickstart_primary_injects_reference_page() {
        let tables = KnowledgeTables::builtin();
        let mut quickstart = doc(
            "/quickstart-guides/create-a-campaign-quickstart#step-1",
            DocCategory::Quickstart,
            Some("Quickstart Guides"),
        );
        quickstart.page_title = Some("Create a Campaign".to_string());
        let docs = vec![
            quickstart,
            doc("/tutorials/campaign-walkthrough", DocCategory::Tutorials, None),
            doc("/guidelines/creative-api", DocCategory::Guidelines, None),
        ];

        let links = build_links(&ranked(docs), &tables);

        let primary = links.primary.as_ref().unwrap();
        assert_eq!(primary.url, "/quickstart-guides/create-a-campaign-quickstart");
        assert_eq!(primary.title, "Create a Campaign");
        assert_eq!(links.related.len(), 1);
        let guidelines = &links.related[0];
        assert_eq!(guidelines.category, DocCategory::Guidelines);
        assert_eq!(guidelines.links[0].url, "/guidelines/campaign-api");
        assert_eq!(guidelines.links[0].title, "Campaign API");
        assert_eq!(guidelines.links[1].url, "/guidelines/creative-api");
        assert_invariants(&links);
    }

    #[test]
    fn injected_reference_is_not_repeated_from_hits() {
        let tables = KnowledgeTables::builtin();
        let docs = vec![
            doc("/quickstart-guides/create-a-campaign-quickstart", DocCategory::Quickstart, None),
            doc("/guidelines/campaign-api#create-a-campaign", DocCategory::Guidelines, None),
        ];
        let links = build_links(&ranked(docs), &tables);
        assert_eq!(links.related[0].links.len(), 1);
        assert_invariants(&links);
    }

    #[test]
    fn buckets_are_capped_and_deduplicated() {
        let tables = KnowledgeTables::builtin();
        let docs = vec![
            doc("/guidelines/reports-api", DocCategory::Guidelines, None),
            doc("/guidelines/reports-api#execute", DocCategory::Guidelines, None),
            doc("/tutorials/report-a", DocCategory::Tutorials, None),
            doc("/guidelines/a", DocCategory::Guidelines, None),
            doc("/guidelines/b", DocCategory::Guidelines, None),
            doc("/guidelines/c", DocCategory::Guidelines, None),
            doc("/guidelines/d", DocCategory::Guidelines, None),
        ];
        let links = build_links(&ranked(docs), &tables);

        assert_eq!(links.primary.as_ref().unwrap().url, "/guidelines/reports-api");
        let order: Vec<_> = links.related.iter().map(|b| b.category).collect();
        assert_eq!(order, vec![DocCategory::Tutorials, DocCategory::Guidelines]);
        let guideline_urls: Vec<_> = links.related[1].links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(guideline_urls, vec!["/guidelines/a", "/guidelines/b", "/guidelines/c"]);
        assert_invariants(&links);
    }

    #[test]
    fn title_resolution_order() {
        let mut d = doc("/guidelines/campaign-api", DocCategory::Guidelines, Some("Guidelines"));
        d.title = "Campaign API | IQM Docs".to_string();
        assert_eq!(resolve_title(&d), "Guidelines");
        d.page_title = Some("Campaign API".to_string());
        assert_eq!(resolve_title(&d), "Campaign API");
        d.section_title = Some("Create a Campaign".to_string());
        assert_eq!(resolve_title(&d), "Create a Campaign");

        let mut bare = doc("/guidelines/x", DocCategory::Guidelines, None);
        bare.title = "Reports API - IQM | Docs".to_string();
        assert_eq!(resolve_title(&bare), "Reports API");
    }
}

use serde::Serialize;
use tracing::debug;

use crate::model::{CandidateDocument, QueryIntent, RankedDocument};
use crate::tables::KnowledgeTables;

pub const BASE_SCORE: i32 = 100;
const ADVANCED_TRACK_PENALTY: i32 = -30;
const LOW_PRIORITY_PENALTY: i32 = -50;
const LEAF_ANCHOR_BONUS: i32 = 20;

/// Per-document score components. The total is their sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub base: i32,
    pub category: i32,
    pub path: i32,
    pub advanced: i32,
    pub low_priority: i32,
    pub anchor: i32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i32 {
        self.base + self.category + self.path + self.advanced + self.low_priority + self.anchor
    }
}

/// Score a single document against the query intent.
pub fn score(doc: &CandidateDocument, intent: &QueryIntent, tables: &KnowledgeTables) -> ScoreBreakdown {
    let category = doc
        .display_category
        .as_deref()
        .and_then(|label| tables.category_priority(intent.intent, label))
        .or_else(|| tables.category_priority(intent.intent, doc.category.as_str()))
        .unwrap_or(0);

    let advanced = if tables.is_advanced_track(&doc.title, &doc.url) {
        ADVANCED_TRACK_PENALTY
    } else {
        0
    };

    let low_priority = if doc.category.is_low_priority() && !intent.special_category {
        LOW_PRIORITY_PENALTY
    } else {
        0
    };

    let anchor = if doc.anchor.is_some() && doc.depth >= 2 {
        LEAF_ANCHOR_BONUS
    } else {
        0
    };

    ScoreBreakdown {
        base: BASE_SCORE,
        category,
        path: tables.path_boost(intent.intent, &doc.url),
        advanced,
        low_priority,
        anchor,
    }
}

/// Order candidates by intent score, highest first. Equal scores keep collaborator order.
pub fn rerank(
    candidates: Vec<CandidateDocument>,
    intent: &QueryIntent,
    tables: &KnowledgeTables,
) -> Vec<RankedDocument> {
    let mut ranked: Vec<RankedDocument> = candidates
        .into_iter()
        .map(|document| {
            let breakdown = score(&document, intent, tables);
            debug!(
                id = %document.id,
                url = %document.url,
                index_score = ?document.raw_score,
                score = breakdown.total(),
                ?breakdown,
                "scored candidate"
            );
            RankedDocument {
                intent_score: breakdown.total(),
                document,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.intent_score.cmp(&a.intent_score));
    ranked
}

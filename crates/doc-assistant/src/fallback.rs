use serde::Serialize;
use tracing::info;

use crate::compose::render_answer;
use crate::links::LinkCollector;
use crate::model::{DocCategory, StructuredLinks};
use crate::tables::{FallbackRoute, KnowledgeTables};

const GENERIC_LEAD_IN: &str = "I can help you find your way around the IQM API documentation. \
These pages are good places to start:";

/// Answer produced entirely from the knowledge tables.
#[derive(Debug, Clone, Serialize)]
pub struct FallbackAnswer {
    pub text: String,
    pub links: StructuredLinks,
    /// Matched route, `None` for the generic suggestions.
    pub route_id: Option<String>,
}

/// Route a query without search or generation.
///
/// Authentication questions always get the authentication route. Otherwise the route with
/// the longest matching keyword wins, and the earlier route wins a tie.
pub fn route_offline(query: &str, tables: &KnowledgeTables) -> FallbackAnswer {
    if tables.is_auth_query(query) {
        info!(route = %tables.auth_route().id, "offline route (auth)");
        return answer_from_route(tables.auth_route());
    }

    match best_route(query, tables) {
        Some((route, keyword)) => {
            info!(route = %route.id, keyword, "offline route");
            answer_from_route(route)
        }
        None => {
            info!("no offline route matched, using generic suggestions");
            generic_answer(tables)
        }
    }
}

/// The matching route and the keyword that won it.
pub fn best_route<'a>(query: &str, tables: &'a KnowledgeTables) -> Option<(&'a FallbackRoute, &'a str)> {
    let query = query.to_lowercase();
    let mut best: Option<(&FallbackRoute, &str)> = None;
    for route in tables.routes() {
        let Some(keyword) = route
            .keywords
            .iter()
            .filter(|k| query.contains(k.as_str()))
            .max_by_key(|k| k.chars().count())
        else {
            continue;
        };
        if best.is_none_or(|(_, current)| keyword.chars().count() > current.chars().count()) {
            best = Some((route, keyword.as_str()));
        }
    }
    best
}

fn answer_from_route(route: &FallbackRoute) -> FallbackAnswer {
    let mut collector = LinkCollector::new();
    collector.set_primary(
        route.title.clone(),
        &route.url,
        DocCategory::infer_from_path(&route.url),
    );
    for link in &route.related {
        collector.push_related(
            link.title.clone(),
            &link.url,
            DocCategory::infer_from_path(&link.url),
        );
    }
    let links = collector.finish();
    FallbackAnswer {
        text: render_answer(&route.summary, &links),
        links,
        route_id: Some(route.id.clone()),
    }
}

fn generic_answer(tables: &KnowledgeTables) -> FallbackAnswer {
    let mut collector = LinkCollector::new();
    for link in tables.generic_suggestions() {
        collector.push_related(
            link.title.clone(),
            &link.url,
            DocCategory::infer_from_path(&link.url),
        );
    }
    let links = collector.finish();
    FallbackAnswer {
        text: render_answer(GENERIC_LEAD_IN, &links),
        links,
        route_id: None,
    }
}

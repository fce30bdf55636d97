//! Rule-based intent classification.
//!
//! The rules are checked in a fixed order and the first one that matches decides the
//! intent. Patterns are compiled once and matched case-insensitively on word boundaries.
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{IntentKind, QueryIntent};

static SPECIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(political|politics|elections?|candidates?|voters?|ballots?|advocacy|healthcare|health\s+care|pharma\w*|hipaa|medical|migrat\w*|deprecat\w*|legacy)\b",
    )
    .expect("valid regex")
});

static CREATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(create|creating|add|adding|new|make|build|set\s*up|launch|upload|uploading|generate|register)\b",
    )
    .expect("valid regex")
});

static UPDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(update|updating|edit|modify|change|delete|deleting|remove|pause|resume|archive|cancel|rename)\b",
    )
    .expect("valid regex")
});

static GET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(get|list|fetch|retrieve|find|show|view|download|search|export|look\s+up)\b",
    )
    .expect("valid regex")
});

static CONCEPTUAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(what\s+(is|are)|what's|explain|why|how\s+does|overview|difference|concepts?|understand|meaning)\b",
    )
    .expect("valid regex")
});

/// Classify a query. Pure and total: every input maps to exactly one intent.
pub fn classify_intent(query: &str) -> QueryIntent {
    let rules: [(&LazyLock<Regex>, IntentKind); 4] = [
        (&CREATE_RE, IntentKind::Create),
        (&UPDATE_RE, IntentKind::Update),
        (&GET_RE, IntentKind::Get),
        (&CONCEPTUAL_RE, IntentKind::Conceptual),
    ];

    if SPECIAL_RE.is_match(query) {
        return QueryIntent {
            intent: IntentKind::Specific,
            special_category: true,
        };
    }

    let intent = rules
        .iter()
        .find(|(re, _)| re.is_match(query))
        .map(|(_, intent)| *intent)
        .unwrap_or(IntentKind::Get);

    QueryIntent {
        intent,
        special_category: false,
    }
}

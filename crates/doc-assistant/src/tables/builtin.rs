//! Compiled-in table data for the IQM developer documentation.
use super::{
    CategoryPriority, EntityExpansion, FallbackRoute, PathBoost, ReferencePage, RouteLink,
    TableSource, TABLES_VERSION,
};
use crate::model::IntentKind;

const STOP_WORDS: &[&str] = &[
    "a", "about", "also", "am", "an", "and", "any", "are", "as", "at", "be", "been", "but", "by",
    "can", "could", "did", "do", "does", "doing", "for", "from", "give", "has", "have", "help",
    "here", "how", "i", "if", "in", "into", "is", "it", "its", "just", "know", "let", "like",
    "me", "might", "my", "need", "of", "on", "or", "our", "please", "should", "so", "some",
    "tell", "that", "the", "their", "them", "then", "there", "these", "this", "those", "to",
    "us", "using", "via", "want", "was", "way", "we", "were", "what", "when", "where", "which",
    "who", "why", "will", "with", "would", "you", "your",
];

const ENTITY_EXPANSIONS: &[(&str, &str)] = &[
    ("campaign", "campaign api"),
    ("campaigns", "campaign api"),
    ("creative", "creative api"),
    ("creatives", "creative api"),
    ("audience", "audience api"),
    ("audiences", "audience api"),
    ("report", "reports api"),
    ("reports", "reports api"),
    ("reporting", "reports api"),
    ("conversion", "conversion api"),
    ("conversions", "conversion api"),
    ("dashboard", "dashboard api"),
    ("insights", "insights api"),
    ("inventory", "inventory api"),
    ("pmp", "pmp deals inventory api"),
    ("auth", "authentication quickstart"),
    ("authentication", "authentication quickstart"),
    ("token", "authentication token"),
    ("pagination", "api pagination guide"),
    ("typescript", "typescript prerequisites"),
];

const CATEGORY_PRIORITIES: &[(IntentKind, &str, i32)] = &[
    (IntentKind::Create, "quickstart", 100),
    (IntentKind::Create, "quickstart guides", 100),
    (IntentKind::Create, "tutorials", 60),
    (IntentKind::Create, "guidelines", 50),
    (IntentKind::Create, "reference", 50),
    (IntentKind::Update, "guidelines", 80),
    (IntentKind::Update, "reference", 60),
    (IntentKind::Update, "tutorials", 30),
    (IntentKind::Get, "guidelines", 80),
    (IntentKind::Get, "reference", 60),
    (IntentKind::Get, "quickstart", 20),
    (IntentKind::Conceptual, "getting started", 100),
    (IntentKind::Conceptual, "reference", 60),
    (IntentKind::Conceptual, "guidelines", 40),
    (IntentKind::Conceptual, "tutorials", 40),
    (IntentKind::Specific, "migration", 80),
    (IntentKind::Specific, "political", 80),
    (IntentKind::Specific, "healthcare", 80),
    (IntentKind::Specific, "guidelines", 20),
];

const PATH_BOOSTS: &[(IntentKind, &str, i32)] = &[
    (IntentKind::Create, "quickstart", 100),
    (IntentKind::Create, "tutorial", 60),
];

const ADVANCED_MARKERS: &[&str] = &[
    "advanced",
    "programmatic-guaranteed",
    "programmatic guaranteed",
    "pg-campaign",
    "bulk-",
    "bulk ",
    "deep-dive",
];

const REFERENCE_PAGES: &[(&str, &str, &str)] = &[
    ("create-a-campaign-quickstart", "Campaign API", "/guidelines/campaign-api"),
    ("upload-a-creative-quickstart", "Creative API", "/guidelines/creative-api"),
    ("reporting-api-quickstart", "Reports API", "/guidelines/reports-api"),
    ("tutorials/pg-campaign", "Campaign API", "/guidelines/campaign-api"),
    ("tutorials/campaign", "Campaign API", "/guidelines/campaign-api"),
    ("tutorials/creative", "Creative API", "/guidelines/creative-api"),
    ("tutorials/audience", "Audience API", "/guidelines/audience-api"),
    ("tutorials/conversion", "Conversion API", "/guidelines/conversion-api"),
    ("tutorials/insights", "Insights API", "/guidelines/insights-api"),
    ("tutorials/inventory", "Inventory API", "/guidelines/inventory-api"),
    ("tutorials/report", "Reports API", "/guidelines/reports-api"),
];

const AUTH_PATTERN: &str = r"(?i)\b(auth|authenticat\w*|authoriz\w*|log\s?in|sign\s?in|oauth|bearer|access\s+tokens?|refresh\s+tokens?|api\s+keys?|credentials?)\b";

fn link(title: &str, url: &str) -> RouteLink {
    RouteLink {
        title: title.to_string(),
        url: url.to_string(),
    }
}

fn route(
    id: &str,
    keywords: &[&str],
    (title, url): (&str, &str),
    summary: &str,
    related: Vec<RouteLink>,
) -> FallbackRoute {
    FallbackRoute {
        id: id.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        title: title.to_string(),
        url: url.to_string(),
        summary: summary.to_string(),
        related,
    }
}

fn auth_route() -> FallbackRoute {
    route(
        "authentication",
        &["authentication", "login", "token"],
        (
            "Authentication Quickstart",
            "/quickstart-guides/authentication-quickstart-guide",
        ),
        "Every IQM API call is authenticated. Sign in with your account credentials to \
         obtain a bearer token, then send it in the Authorization header on each request. \
         The authentication quickstart walks through the login request and token refresh.",
        vec![
            link("Before You Begin", "/getting-started/before-you-begin"),
            link("TypeScript Prerequisites", "/getting-started/typescript-prerequisites"),
        ],
    )
}

/// Routes in registration order; on equal keyword length the earlier route wins.
fn routes() -> Vec<FallbackRoute> {
    vec![
        route(
            "campaign-create",
            &[
                "create a campaign",
                "create campaign",
                "new campaign",
                "launch a campaign",
                "campaign setup",
                "set up a campaign",
            ],
            (
                "Create a Campaign Quickstart",
                "/quickstart-guides/create-a-campaign-quickstart",
            ),
            "Campaigns are created with a POST to the campaign endpoint, supplying the \
             campaign name, advertiser, flight dates and total budget. The quickstart covers \
             the minimal request and how to attach creatives and audiences.",
            vec![
                link("Campaign API", "/guidelines/campaign-api"),
                link("Upload a Creative Quickstart", "/quickstart-guides/upload-a-creative-quickstart"),
            ],
        ),
        route(
            "campaign-status",
            &[
                "campaign status",
                "pause campaign",
                "pause a campaign",
                "resume campaign",
                "resume a campaign",
                "stop campaign",
            ],
            (
                "Update Campaign Status",
                "/guidelines/campaign-api#update-campaign-status",
            ),
            "Campaign status changes (pause, resume or delete) are made with a PUT to the \
             campaign status endpoint and can target several campaign IDs at once.",
            vec![link("Campaign API", "/guidelines/campaign-api")],
        ),
        route(
            "campaign-budget",
            &[
                "campaign budget",
                "daily budget",
                "total budget",
                "max bid",
                "budget",
            ],
            (
                "Update Campaign Budget",
                "/guidelines/campaign-api#update-campaign-budget",
            ),
            "Budgets are changed with a PATCH to the campaign budget endpoint. You can set \
             the total budget, the daily cap or the max bid for one or more campaigns.",
            vec![link("Campaign API", "/guidelines/campaign-api")],
        ),
        route(
            "campaign-api",
            &["campaigns", "campaign"],
            ("Campaign API", "/guidelines/campaign-api"),
            "The Campaign API covers creating, listing, reading and updating campaigns, \
             including their status and budget.",
            vec![link(
                "Create a Campaign Quickstart",
                "/quickstart-guides/create-a-campaign-quickstart",
            )],
        ),
        route(
            "creative-upload",
            &[
                "upload a creative",
                "upload creative",
                "creative upload",
                "new creative",
                "add a creative",
            ],
            (
                "Upload a Creative Quickstart",
                "/quickstart-guides/upload-a-creative-quickstart",
            ),
            "Creative assets are uploaded with a POST to the creative endpoint. The \
             quickstart shows the upload request and how to check the creative afterwards.",
            vec![link("Creative API", "/guidelines/creative-api")],
        ),
        route(
            "creative-api",
            &["creatives", "creative", "banner", "video ad"],
            ("Creative API", "/guidelines/creative-api"),
            "The Creative API covers uploading, listing and inspecting creative assets.",
            vec![link(
                "Upload a Creative Quickstart",
                "/quickstart-guides/upload-a-creative-quickstart",
            )],
        ),
        route(
            "reporting-quickstart",
            &[
                "run a report",
                "create a report",
                "create report",
                "execute a report",
                "reporting quickstart",
            ],
            (
                "Reporting API Quickstart",
                "/quickstart-guides/reporting-api-quickstart-guide",
            ),
            "Reports are executed with a POST describing dimensions, metrics and a date \
             range. The quickstart builds a first report request end to end.",
            vec![link("Reports API", "/guidelines/reports-api")],
        ),
        route(
            "reports-api",
            &["schedule a report", "reporting", "reports", "report"],
            ("Reports API", "/guidelines/reports-api"),
            "The Reports API executes on-demand reports and schedules recurring ones.",
            vec![link(
                "Reporting API Quickstart",
                "/quickstart-guides/reporting-api-quickstart-guide",
            )],
        ),
        route(
            "audience-api",
            &[
                "matched audience",
                "contextual audience",
                "audiences",
                "audience",
                "segment",
                "targeting",
            ],
            ("Audience API", "/guidelines/audience-api"),
            "The Audience API covers matched audience uploads, contextual audiences and \
             searching existing audiences for targeting.",
            vec![link("Campaign API", "/guidelines/campaign-api")],
        ),
        route(
            "conversion-api",
            &["conversions", "conversion", "pixel", "attribution"],
            ("Conversion API", "/guidelines/conversion-api"),
            "The Conversion API creates conversion trackers and reads their details.",
            vec![link("Reports API", "/guidelines/reports-api")],
        ),
        route(
            "dashboard-api",
            &["dashboard", "metrics"],
            ("Dashboard API", "/guidelines/dashboard-api"),
            "The Dashboard API returns aggregated performance metrics for a date range.",
            vec![link("Insights API", "/guidelines/insights-api")],
        ),
        route(
            "insights-api",
            &["insights", "insight", "performance"],
            ("Insights API", "/guidelines/insights-api"),
            "The Insights API exposes performance insights across campaigns.",
            vec![link("Dashboard API", "/guidelines/dashboard-api")],
        ),
        route(
            "inventory-api",
            &[
                "private marketplace",
                "inventory group",
                "inventory",
                "pmp",
                "deals",
                "deal",
            ],
            ("Inventory API", "/guidelines/inventory-api"),
            "The Inventory API lists PMP deals and manages inventory groups.",
            vec![link("Campaign API", "/guidelines/campaign-api")],
        ),
        route(
            "pagination",
            &["pagination", "paginate", "page size", "next page"],
            ("API Pagination Guide", "/getting-started/api-pagination-guide"),
            "List endpoints are paginated with page number and page size parameters; the \
             guide explains the request fields and how to walk through every page.",
            vec![link("Before You Begin", "/getting-started/before-you-begin")],
        ),
        route(
            "typescript",
            &["typescript", "sdk setup", "node"],
            (
                "TypeScript Prerequisites",
                "/getting-started/typescript-prerequisites",
            ),
            "The TypeScript prerequisites page lists the tooling needed to follow the \
             TypeScript examples in the guides.",
            vec![link("Before You Begin", "/getting-started/before-you-begin")],
        ),
        route(
            "getting-started",
            &[
                "before you begin",
                "getting started",
                "get started",
                "prerequisite",
                "overview",
            ],
            ("Before You Begin", "/getting-started/before-you-begin"),
            "Start with the prerequisites: an IQM account, API access and an understanding \
             of authentication and pagination.",
            vec![
                link("Getting Started", "/getting-started/"),
                link(
                    "Authentication Quickstart",
                    "/quickstart-guides/authentication-quickstart-guide",
                ),
            ],
        ),
    ]
}

fn generic_suggestions() -> Vec<RouteLink> {
    vec![
        link("Getting Started", "/getting-started/"),
        link(
            "Authentication Quickstart",
            "/quickstart-guides/authentication-quickstart-guide",
        ),
        link(
            "Create a Campaign Quickstart",
            "/quickstart-guides/create-a-campaign-quickstart",
        ),
        link("Reports API", "/guidelines/reports-api"),
    ]
}

pub fn builtin_source() -> TableSource {
    TableSource {
        version: TABLES_VERSION,
        stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        entity_expansions: ENTITY_EXPANSIONS
            .iter()
            .map(|(term, expansion)| EntityExpansion {
                term: term.to_string(),
                expansion: expansion.to_string(),
            })
            .collect(),
        category_priorities: CATEGORY_PRIORITIES
            .iter()
            .map(|(intent, label, boost)| CategoryPriority {
                intent: *intent,
                label: label.to_string(),
                boost: *boost,
            })
            .collect(),
        path_boosts: PATH_BOOSTS
            .iter()
            .map(|(intent, pattern, boost)| PathBoost {
                intent: *intent,
                pattern: pattern.to_string(),
                boost: *boost,
            })
            .collect(),
        advanced_markers: ADVANCED_MARKERS.iter().map(|m| m.to_string()).collect(),
        reference_pages: REFERENCE_PAGES
            .iter()
            .map(|(fragment, title, url)| ReferencePage {
                path_fragment: fragment.to_string(),
                title: title.to_string(),
                url: url.to_string(),
            })
            .collect(),
        auth_pattern: AUTH_PATTERN.to_string(),
        auth_route: auth_route(),
        routes: routes(),
        generic_suggestions: generic_suggestions(),
    }
}

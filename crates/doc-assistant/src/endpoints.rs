//! Static registry of the documented IQM REST endpoints.
use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug)]
pub struct Endpoint {
    pub path: &'static str,
    pub method: &'static str,
    pub summary: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub doc_page: &'static str,
    pub tags: &'static [&'static str],
    pub required_fields: &'static [&'static str],
}

impl Endpoint {
    fn matches_template(&self, path: &str) -> bool {
        let template: Vec<&str> = self.path.trim_end_matches('/').split('/').collect();
        let candidate: Vec<&str> = path.trim_end_matches('/').split('/').collect();
        template.len() == candidate.len()
            && template.iter().zip(&candidate).all(|(t, c)| {
                (t.starts_with('{') && t.ends_with('}') && !c.is_empty()) || t == c
            })
    }

    fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.path,
            self.summary,
            self.description,
            self.tags.join(" ")
        )
        .to_lowercase()
    }
}

const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        path: "/api/v3/campaign",
        method: "POST",
        summary: "Create a new campaign",
        description: "Creates a new advertising campaign with specified targeting, budget, and creative settings.",
        category: "campaigns",
        doc_page: "/guidelines/campaign-api#create-a-campaign",
        tags: &["campaign", "create"],
        required_fields: &["campaignName", "advertiserId", "startDate", "endDate", "budgetTotal"],
    },
    Endpoint {
        path: "/api/v3/campaign/{id}",
        method: "GET",
        summary: "Get campaign details",
        description: "Retrieves detailed information about a specific campaign including targeting, budget, and performance data.",
        category: "campaigns",
        doc_page: "/guidelines/campaign-api#get-campaign-details",
        tags: &["campaign", "read", "details"],
        required_fields: &[],
    },
    Endpoint {
        path: "/api/v3/campaign/basic/list",
        method: "POST",
        summary: "List campaigns with filters",
        description: "Retrieves a paginated list of campaigns with optional filtering by status, date range, and search terms.",
        category: "campaigns",
        doc_page: "/guidelines/campaign-api#get-campaign-list",
        tags: &["campaign", "list", "search"],
        required_fields: &[],
    },
    Endpoint {
        path: "/api/v3/campaign/budget",
        method: "PATCH",
        summary: "Update campaign budget",
        description: "Updates the total budget, daily budget, or max bid for one or more campaigns.",
        category: "campaigns",
        doc_page: "/guidelines/campaign-api#update-campaign-budget",
        tags: &["campaign", "update", "budget"],
        required_fields: &["campaignIds"],
    },
    Endpoint {
        path: "/api/v3/campaign/status",
        method: "PUT",
        summary: "Update campaign status",
        description: "Changes the status of one or more campaigns (pause, resume, delete).",
        category: "campaigns",
        doc_page: "/guidelines/campaign-api#update-campaign-status",
        tags: &["campaign", "update", "status"],
        required_fields: &["campaignIds", "status"],
    },
    Endpoint {
        path: "/api/v3/ra/report/execute",
        method: "POST",
        summary: "Execute a report",
        description: "Generates a report based on specified dimensions, metrics, and filters.",
        category: "reports",
        doc_page: "/guidelines/reports-api#execute-report",
        tags: &["report", "execute", "analytics"],
        required_fields: &["startDate", "endDate", "dimensions", "metrics"],
    },
    Endpoint {
        path: "/api/v3/ra/report/schedule",
        method: "POST",
        summary: "Schedule a recurring report",
        description: "Creates a scheduled report that runs automatically at specified intervals.",
        category: "reports",
        doc_page: "/guidelines/reports-api#schedule-report",
        tags: &["report", "schedule", "automation"],
        required_fields: &["reportName", "startDate", "endDate", "dimensions", "metrics", "frequency"],
    },
    Endpoint {
        path: "/api/v2/audience/matched/add",
        method: "POST",
        summary: "Upload a matched audience",
        description: "Creates a new matched audience by uploading hashed identifiers (emails, MAIDs, etc.).",
        category: "audiences",
        doc_page: "/guidelines/audience-api#upload-matched-audience",
        tags: &["audience", "matched", "upload"],
        required_fields: &[],
    },
    Endpoint {
        path: "/api/v3/audience/contextual/create",
        method: "POST",
        summary: "Create a contextual audience",
        description: "Creates a new contextual audience based on keywords, topics, or URL patterns.",
        category: "audiences",
        doc_page: "/guidelines/audience-api#create-contextual-audience",
        tags: &["audience", "contextual", "create"],
        required_fields: &["audienceName", "keywords"],
    },
    Endpoint {
        path: "/api/v2/audience/search",
        method: "POST",
        summary: "Search and list audiences",
        description: "Retrieves a paginated list of audiences with optional filtering.",
        category: "audiences",
        doc_page: "/guidelines/audience-api#list-audiences",
        tags: &["audience", "list", "search"],
        required_fields: &[],
    },
    Endpoint {
        path: "/api/v3/creative/add",
        method: "POST",
        summary: "Upload a creative asset",
        description: "Uploads a new creative asset (image, video, HTML5, native, or audio).",
        category: "creatives",
        doc_page: "/guidelines/creative-api#upload-creative",
        tags: &["creative", "upload", "asset"],
        required_fields: &["creativeName", "creativeTypeId"],
    },
    Endpoint {
        path: "/api/v3/creative/{id}",
        method: "GET",
        summary: "Get creative details",
        description: "Retrieves detailed information about a specific creative asset.",
        category: "creatives",
        doc_page: "/guidelines/creative-api#get-creative-details",
        tags: &["creative", "read", "details"],
        required_fields: &[],
    },
    Endpoint {
        path: "/api/v2/creative/list",
        method: "POST",
        summary: "List creative assets",
        description: "Retrieves a paginated list of creative assets with optional filtering.",
        category: "creatives",
        doc_page: "/guidelines/creative-api#list-creatives",
        tags: &["creative", "list", "search"],
        required_fields: &[],
    },
    Endpoint {
        path: "/api/v3/conversion/add",
        method: "POST",
        summary: "Create a conversion tracker",
        description: "Creates a new conversion tracking pixel or postback.",
        category: "conversions",
        doc_page: "/guidelines/conversion-api#create-conversion",
        tags: &["conversion", "tracking", "create"],
        required_fields: &["conversionName", "conversionTypeId"],
    },
    Endpoint {
        path: "/api/v3/conversion/{id}",
        method: "GET",
        summary: "Get conversion details",
        description: "Retrieves detailed information about a conversion tracker.",
        category: "conversions",
        doc_page: "/guidelines/conversion-api#get-conversion-details",
        tags: &["conversion", "read", "details"],
        required_fields: &[],
    },
    Endpoint {
        path: "/api/v2/inv/pmp/deal/list",
        method: "POST",
        summary: "List PMP deals",
        description: "Retrieves a list of available Private Marketplace deals.",
        category: "inventory",
        doc_page: "/guidelines/inventory-api#list-pmp-deals",
        tags: &["inventory", "pmp", "deals", "list"],
        required_fields: &[],
    },
    Endpoint {
        path: "/api/v3/inv/group/add",
        method: "POST",
        summary: "Create inventory group",
        description: "Creates a new inventory group for organizing and targeting inventory.",
        category: "inventory",
        doc_page: "/guidelines/inventory-api#create-inventory-group",
        tags: &["inventory", "group", "create"],
        required_fields: &["groupName", "inventoryGroupTypeId"],
    },
    Endpoint {
        path: "/api/v2/rb/resultDashboard",
        method: "POST",
        summary: "Get dashboard performance data",
        description: "Retrieves aggregated performance metrics for the dashboard view.",
        category: "dashboard",
        doc_page: "/guidelines/dashboard-api#get-dashboard-data",
        tags: &["dashboard", "metrics", "performance"],
        required_fields: &["dateRange"],
    },
];

/// Lookup over the endpoint table. Iteration is in registration order.
#[derive(Debug, Clone, Copy)]
pub struct ApiRegistry {
    endpoints: &'static [Endpoint],
}

impl Default for ApiRegistry {
    fn default() -> Self {
        Self {
            endpoints: ENDPOINTS,
        }
    }
}

impl ApiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Find one endpoint: method and path, then path alone, then any endpoint whose path
    /// contains or is contained in `path`. Literal paths win over `{id}` templates.
    pub fn get(&self, path: &str, method: Option<&str>) -> Option<&'static Endpoint> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        let method = method.map(str::trim).filter(|m| !m.is_empty());
        let literal = |e: &&Endpoint| e.path == path;
        let templated = |e: &&Endpoint| e.matches_template(path);

        if let Some(method) = method {
            let same_method = |e: &&Endpoint| e.method.eq_ignore_ascii_case(method);
            let exact = self
                .endpoints
                .iter()
                .filter(same_method)
                .find(literal)
                .or_else(|| self.endpoints.iter().filter(same_method).find(templated));
            if exact.is_some() {
                return exact;
            }
        }
        self.endpoints
            .iter()
            .find(literal)
            .or_else(|| self.endpoints.iter().find(templated))
            .or_else(|| {
                self.endpoints
                    .iter()
                    .find(|e| path.contains(e.path) || e.path.contains(path))
            })
    }

    /// Case-insensitive substring search over path, summary, description and tags.
    pub fn search(&self, keyword: &str) -> Vec<&'static Endpoint> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Vec::new();
        }
        self.endpoints
            .iter()
            .filter(|e| e.search_text().contains(&keyword))
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&'static Endpoint> {
        let category = category.trim();
        self.endpoints
            .iter()
            .filter(|e| e.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<&'static str> {
        let mut categories: Vec<&'static str> = self.endpoints.iter().map(|e| e.category).collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub summary: String,
    pub description: String,
    pub category: String,
    pub doc_page: String,
    pub tags: Vec<String>,
    pub required_fields: Vec<String>,
    pub requires_auth: bool,
}

impl From<&Endpoint> for EndpointInfo {
    fn from(e: &Endpoint) -> Self {
        Self {
            path: e.path.to_string(),
            method: e.method.to_string(),
            summary: e.summary.to_string(),
            description: e.description.to_string(),
            category: e.category.to_string(),
            doc_page: e.doc_page.to_string(),
            tags: e.tags.iter().map(|t| t.to_string()).collect(),
            required_fields: e.required_fields.iter().map(|f| f.to_string()).collect(),
            requires_auth: true,
        }
    }
}

/// Host the documented paths are served from.
pub const API_BASE_URL: &str = "https://api.iqm.com";

/// Languages `example_code` can render.
pub const EXAMPLE_LANGUAGES: &[&str] = &["curl"];

/// Request snippet for a documented endpoint. `None` for an unsupported language.
///
/// Bodies carry a placeholder for every required field; GET and DELETE requests carry none.
pub fn example_code(endpoint: &Endpoint, language: &str) -> Option<String> {
    if !language.trim().eq_ignore_ascii_case("curl") {
        return None;
    }
    Some(curl_example(endpoint.method, endpoint.path, endpoint.required_fields))
}

/// Request snippet for a path that is not in the registry.
pub fn generic_example(path: &str, method: &str, language: &str) -> Option<String> {
    if !language.trim().eq_ignore_ascii_case("curl") {
        return None;
    }
    Some(curl_example(&method.to_uppercase(), path, &[]))
}

fn curl_example(method: &str, path: &str, required_fields: &[&str]) -> String {
    let mut lines = vec![
        format!("curl -X {method} '{API_BASE_URL}{path}'"),
        "  -H 'Authorization: Bearer TOKEN'".to_string(),
    ];
    if !matches!(method, "GET" | "DELETE") {
        lines.push("  -H 'Content-Type: application/json'".to_string());
        let body = required_fields
            .iter()
            .map(|field| (field.to_string(), serde_json::Value::String(format!("<{field}>"))))
            .collect::<serde_json::Map<_, _>>();
        lines.push(format!("  -d '{}'", serde_json::Value::Object(body)));
    }
    lines.join(" \\\n")
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct EndpointSummary {
    pub path: String,
    pub method: String,
    pub summary: String,
}

impl From<&Endpoint> for EndpointSummary {
    fn from(e: &Endpoint) -> Self {
        Self {
            path: e.path.to_string(),
            method: e.method.to_string(),
            summary: e.summary.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ApiInfoResponse {
    /// One entry for a path lookup; every match for a keyword search.
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CategoryEndpoints {
    pub category: String,
    pub endpoints: Vec<EndpointSummary>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListEndpointsResponse {
    pub categories: Vec<CategoryEndpoints>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExampleCodeResponse {
    pub language: String,
    pub example: String,
    /// The registry entry the example was built from; absent for unregistered paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_every_endpoint() {
        assert_eq!(ApiRegistry::new().len(), 18);
    }

    #[test]
    fn exact_match_uses_method() {
        let registry = ApiRegistry::new();
        let endpoint = registry.get("/api/v3/campaign/status", Some("put")).unwrap();
        assert_eq!(endpoint.summary, "Update campaign status");
    }

    #[test]
    fn templated_segments_match_ids() {
        let registry = ApiRegistry::new();
        let endpoint = registry.get("/api/v3/creative/42", None).unwrap();
        assert_eq!(endpoint.path, "/api/v3/creative/{id}");
    }

    #[test]
    fn wrong_method_falls_back_to_path() {
        let registry = ApiRegistry::new();
        let endpoint = registry.get("/api/v3/campaign/budget", Some("DELETE")).unwrap();
        assert_eq!(endpoint.method, "PATCH");
    }

    #[test]
    fn partial_path_match() {
        let registry = ApiRegistry::new();
        let endpoint = registry.get("/ra/report/schedule", None).unwrap();
        assert_eq!(endpoint.path, "/api/v3/ra/report/schedule");
        assert!(registry.get("/nothing/here", None).is_none());
    }

    #[test]
    fn curl_example_lists_required_fields() {
        let registry = ApiRegistry::new();
        let endpoint = registry.get("/api/v3/inv/group/add", Some("POST")).unwrap();
        let example = example_code(endpoint, "CURL").unwrap();
        assert!(example.starts_with("curl -X POST 'https://api.iqm.com/api/v3/inv/group/add'"));
        assert!(example.contains("-H 'Authorization: Bearer TOKEN'"));
        assert!(example.contains(r#""groupName":"<groupName>""#), "{example}");
        assert!(example.contains(r#""inventoryGroupTypeId":"<inventoryGroupTypeId>""#));
        assert!(example_code(endpoint, "python").is_none());
    }

    #[test]
    fn get_examples_have_no_body() {
        let example = generic_example("/api/v3/custom", "get", "curl").unwrap();
        assert_eq!(
            example,
            "curl -X GET 'https://api.iqm.com/api/v3/custom' \\\n  -H 'Authorization: Bearer TOKEN'"
        );
    }

    #[test]
    fn keyword_search_covers_tags_and_text() {
        let registry = ApiRegistry::new();
        let hits: Vec<_> = registry.search("PMP").iter().map(|e| e.path).collect();
        assert_eq!(hits, vec!["/api/v2/inv/pmp/deal/list"]);
        assert_eq!(registry.search("budget").len(), 3);
        assert!(registry.search("  ").is_empty());
    }

    #[test]
    fn categories_are_sorted_and_distinct() {
        let registry = ApiRegistry::new();
        assert_eq!(
            registry.categories(),
            vec!["audiences", "campaigns", "conversions", "creatives", "dashboard", "inventory", "reports"]
        );
        assert_eq!(registry.by_category("Campaigns").len(), 5);
    }
}

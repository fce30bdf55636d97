use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

/// Site sections a client may be told to navigate to.
pub const ALLOWED_PREFIXES: &[&str] = &[
    "/getting-started",
    "/quickstart-guides",
    "/guidelines",
    "/tutorials",
    "/migration-guides",
];

static NAVIGATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(take me to|navigate to|go to|bring me to|open the|show me the .*\b(page|guide|docs?))\b",
    )
    .expect("valid regex")
});

/// True when the message asks to be taken to a page.
pub fn wants_navigation(message: &str) -> bool {
    NAVIGATION_RE.is_match(message)
}

/// Accept only site-relative paths inside a whitelisted section.
///
/// The returned path is the input with surrounding whitespace removed.
pub fn validate_path(path: &str) -> Result<&str, AppError> {
    let path = path.trim();
    let reject = |reason: &str| Err(AppError::Navigation(format!("{reason}: {path}")));

    if !path.starts_with('/') || path.starts_with("//") {
        return reject("not a site-relative path");
    }
    if path.contains("://") || path.contains('\\') {
        return reject("absolute URLs are not allowed");
    }
    if path.split(['/', '#', '?']).any(|segment| segment == "..") || path.contains("//") {
        return reject("path traversal is not allowed");
    }

    let allowed = ALLOWED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '#', '?']))
    });
    if !allowed {
        return reject("path is outside the documentation sections");
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_whitelisted_sections() {
        for path in [
            "/getting-started",
            "/getting-started/",
            "/guidelines/campaign-api#update-campaign-status",
            " /quickstart-guides/authentication-quickstart-guide ",
            "/migration-guides/v2?tab=1",
        ] {
            assert!(validate_path(path).is_ok(), "{path}");
        }
    }

    #[test]
    fn rejects_everything_else() {
        for path in [
            "https://evil.example/guidelines",
            "//evil.example/guidelines",
            "/guidelines/../admin",
            "/guidelinesx/campaign-api",
            "/admin",
            "guidelines/campaign-api",
            "/tutorials//x",
            "",
        ] {
            let err = validate_path(path).unwrap_err();
            assert!(err.is_client_error(), "{path}");
        }
    }

    #[test]
    fn navigation_requests() {
        assert!(wants_navigation("Take me to the campaign API"));
        assert!(wants_navigation("can you go to the reports page"));
        assert!(!wants_navigation("How do I create a campaign?"));
    }
}

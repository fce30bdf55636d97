//! Final answer assembly.
//!
//! Generated prose is untrusted: it may invent URLs or point at pages that do not exist.
//! The cleanup pipeline strips every link-like construct from it, and the only links in
//! the final answer are the ones rendered here from [`StructuredLinks`].
use std::sync::LazyLock;

use regex::Regex;

use crate::model::StructuredLinks;

pub type CleanupStep = fn(&str) -> String;

/// Cleanup steps in application order.
pub const CLEANUP_PIPELINE: &[(&str, CleanupStep)] = &[
    ("strip_markdown_links", strip_markdown_links),
    ("strip_bare_urls", strip_bare_urls),
    ("strip_see_references", strip_see_references),
    ("strip_orphan_titles", strip_orphan_titles),
    ("normalize_whitespace", normalize_whitespace),
];

const EMPTY_PROSE_LEAD_IN: &str = "Here are the documentation pages most relevant to your question.";
const NO_ANSWER_TEXT: &str = "I couldn't find a specific answer to that. Try rephrasing your question, or start from the Getting Started overview.";

static MARKDOWN_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!?\[([^\[\]]*)\]\(([^()]*)\)").expect("valid regex")
});

static LINK_ONLY_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*(?:[-*+•]|\d+[.)])[ \t]+)!?\[[^\[\]]*\]\([^()]*\)[ \t]*$")
        .expect("valid regex")
});

static BARE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<?\b(?:https?://|www\.)[^\s<>()]+>?").expect("valid regex")
});

static SITE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(^|[\s(`])`?/(?:getting-started|quickstart-guides|guidelines|tutorials|migration-guides)\b[\w\-/#.]*`?",
    )
    .expect("valid regex")
});

static EMPTY_PARENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\([\s,;:]*\)").expect("valid regex"));

static SEE_PAREN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[ \t]*\((?:see|refer to|check out)\b[^()]*\)").expect("valid regex")
});

static SEE_SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)(^|[.!?:][ \t]+)[ \t]*(?:(?:for more (?:details|information)|to learn more)[^.!?\n]*?,[ \t]*)?(?:see|refer to|check out)\b[^.!?\n]*[.!?]?[ \t]*",
    )
    .expect("valid regex")
});

static EMPTY_BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+•]|\d+[.)])\s*$").expect("valid regex"));

static DANGLING_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:#+\s*)?(?:[-*+]\s*)?\**\s*(?:related(?:\s+(?:resources|links|docs|documentation|pages))?|resources|references|useful links|learn more|further reading|see also|documentation(?:\s+links)?)\s*:?\s*\**\s*:?\s*$",
    )
    .expect("valid regex")
});

static RECOMMENDED_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:#+\s*)?(?:[-*+]\s*)?\**\s*recommended(?:\s+(?:reading|resource|page|link))?\s*\**\s*:.*$",
    )
    .expect("valid regex")
});

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+•]|\d+[.)])(?:\s|$)").expect("valid regex"));

static INNER_SPACES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S)[ \t]{2,}").expect("valid regex"));

static SPACE_BEFORE_PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S)[ \t]+([.,;!?])").expect("valid regex"));

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

fn replace_to_fixpoint(re: &Regex, text: &str, replacement: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = re.replace_all(&current, replacement).into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// `[text](url)` becomes `text`. A list item holding nothing but a link loses the link entirely.
pub fn strip_markdown_links(text: &str) -> String {
    let text = replace_to_fixpoint(&LINK_ONLY_ITEM_RE, text, "${1}");
    replace_to_fixpoint(&MARKDOWN_LINK_RE, &text, "${1}")
}

/// Remove absolute URLs and site paths the model wrote inline.
pub fn strip_bare_urls(text: &str) -> String {
    let text = replace_to_fixpoint(&BARE_URL_RE, text, "");
    let text = replace_to_fixpoint(&SITE_PATH_RE, &text, "${1}");
    replace_to_fixpoint(&EMPTY_PARENS_RE, &text, "")
}

/// Remove "(see ...)" asides and "See the ... guide." sentences.
pub fn strip_see_references(text: &str) -> String {
    let text = replace_to_fixpoint(&SEE_PAREN_RE, text, "");
    replace_to_fixpoint(&SEE_SENTENCE_RE, &text, "${1}")
}

fn is_orphan_label(line: &str) -> bool {
    DANGLING_LABEL_RE.is_match(line) || RECOMMENDED_LINE_RE.is_match(line)
}

/// Drop empty bullets and "Related resources:"/"Recommended:" labels left behind once links
/// are gone, together with the list that follows such a label.
pub fn strip_orphan_titles(text: &str) -> String {
    let mut kept = Vec::new();
    let mut after_label = false;
    for line in text.lines() {
        if is_orphan_label(line) {
            after_label = true;
            continue;
        }
        if after_label && (line.trim().is_empty() || LIST_ITEM_RE.is_match(line)) {
            continue;
        }
        after_label = false;
        if !EMPTY_BULLET_RE.is_match(line) {
            kept.push(line);
        }
    }
    if kept.len() == text.lines().count() {
        return text.to_string();
    }
    kept.join("\n")
}

pub fn normalize_whitespace(text: &str) -> String {
    let text = replace_to_fixpoint(&INNER_SPACES_RE, text, "${1} ");
    let text = replace_to_fixpoint(&SPACE_BEFORE_PUNCT_RE, &text, "${1}${2}");
    let text = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let text = replace_to_fixpoint(&BLANK_LINES_RE, &text, "\n\n");
    text.trim().to_string()
}

/// Run the cleanup pipeline until the text stops changing.
///
/// Every step only removes characters, so the loop terminates, and the result is a fixed
/// point of the pipeline.
pub fn clean_generated_text(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = CLEANUP_PIPELINE
            .iter()
            .fold(current.clone(), |text, (_, step)| step(&text));
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Append the recommended link and the grouped related links to cleaned prose.
pub fn render_answer(prose: &str, links: &StructuredLinks) -> String {
    let prose = prose.trim();
    let mut out = if !prose.is_empty() {
        prose.to_string()
    } else if links.is_empty() {
        NO_ANSWER_TEXT.to_string()
    } else {
        EMPTY_PROSE_LEAD_IN.to_string()
    };

    if let Some(primary) = &links.primary {
        out.push_str(&format!(
            "\n\n**Recommended:** [{}]({})",
            primary.title, primary.url
        ));
    }

    let buckets: Vec<_> = links
        .related
        .iter()
        .filter(|bucket| !bucket.links.is_empty())
        .collect();
    if !buckets.is_empty() {
        out.push_str("\n\n**Related resources:**");
        for bucket in buckets {
            out.push_str(&format!("\n\n*{}*", bucket.category.display_name()));
            for link in &bucket.links {
                out.push_str(&format!("\n- [{}]({})", link.title, link.url));
            }
        }
    }
    out
}

/// Clean generated prose and attach verified links.
pub fn compose_response(generated: &str, links: &StructuredLinks) -> String {
    render_answer(&clean_generated_text(generated), links)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::model::{DocCategory, LinkBucket, LinkEntry};

    const NOISY: &str = "To create a campaign, send a POST request to the campaign endpoint (see the [Campaign API](https://developers.iqm.com/guidelines/campaign-api) page).\n\n\
For more details, see the [quickstart](/quickstart-guides/create-a-campaign-quickstart).   The response includes the new campaign ID .\n\n\n\n\
**Related resources:**\n\
- [Campaign API](/guidelines/campaign-api)\n\
- https://example.com/made-up-page\n\
Visit /guidelines/reports-api to read results.";

    fn entry(title: &str, url: &str, category: DocCategory) -> LinkEntry {
        LinkEntry {
            title: title.to_string(),
            url: url.to_string(),
            category: category.as_str().to_string(),
        }
    }

    fn sample_links() -> StructuredLinks {
        StructuredLinks {
            primary: Some(entry(
                "Create a Campaign",
                "/quickstart-guides/create-a-campaign-quickstart",
                DocCategory::Quickstart,
            )),
            related: vec![LinkBucket {
                category: DocCategory::Guidelines,
                links: vec![entry("Campaign API", "/guidelines/campaign-api", DocCategory::Guidelines)],
            }],
        }
    }

    #[test]
    fn each_step_is_idempotent() {
        for (name, step) in CLEANUP_PIPELINE {
            let once = step(NOISY);
            assert_eq!(step(&once), once, "{name} is not idempotent");
        }
    }

    #[test]
    fn cleanup_is_idempotent() {
        let once = clean_generated_text(NOISY);
        assert_eq!(clean_generated_text(&once), once);
    }

    #[test]
    fn cleanup_removes_every_link_construct() {
        let cleaned = clean_generated_text(NOISY);
        assert!(!cleaned.contains("http"), "{cleaned}");
        assert!(!cleaned.contains("]("), "{cleaned}");
        assert!(!cleaned.contains("/guidelines"), "{cleaned}");
        assert!(!cleaned.contains("/quickstart-guides"), "{cleaned}");
        assert!(!cleaned.contains("Related resources"), "{cleaned}");
        assert!(!cleaned.contains("\n\n\n"));
        assert!(cleaned.starts_with("To create a campaign, send a POST request to the campaign endpoint."));
        assert!(cleaned.contains("The response includes the new campaign ID."));
    }

    #[test]
    fn markdown_links_keep_their_text() {
        assert_eq!(
            strip_markdown_links("Use the [Reports API](/guidelines/reports-api) today"),
            "Use the Reports API today"
        );
    }

    #[test]
    fn see_sentences_are_removed() {
        assert_eq!(
            strip_see_references("Budgets are daily. See the Campaign API guide for details. Pacing is even."),
            "Budgets are daily. Pacing is even."
        );
    }

    #[test]
    fn every_rendered_link_comes_from_structured_links() {
        let links = sample_links();
        let answer = compose_response(NOISY, &links);

        let allowed: HashSet<&str> = links.all_links().map(|l| l.url.as_str()).collect();
        let link_re = Regex::new(r"\]\(([^)]+)\)").unwrap();
        let rendered: Vec<&str> = link_re
            .captures_iter(&answer)
            .map(|c| c.get(1).unwrap().as_str())
            .collect();
        assert_eq!(rendered.len(), 2);
        for url in rendered {
            assert!(allowed.contains(url), "unexpected link {url}");
        }
        assert!(answer.contains("**Recommended:** [Create a Campaign](/quickstart-guides/create-a-campaign-quickstart)"));
        assert!(answer.contains("*API Guidelines*\n- [Campaign API](/guidelines/campaign-api)"));
    }

    #[test]
    fn generated_link_sections_are_dropped_whole() {
        let generated = "Send a POST request.\n\n\
**Recommended:** [Reports API](/guidelines/reports-api)\n\n\
**Related resources:**\n\
- Reports API\n\
- Audience API Guide";
        let answer = compose_response(generated, &sample_links());
        assert_eq!(answer.matches("**Recommended:**").count(), 1, "{answer}");
        assert_eq!(answer.matches("**Related resources:**").count(), 1, "{answer}");
        assert!(!answer.contains("Reports API"), "{answer}");
        assert!(!answer.contains("Audience API Guide"), "{answer}");
        assert!(answer.starts_with("Send a POST request.\n\n**Recommended:** [Create a Campaign]"));
    }

    #[test]
    fn prose_after_a_dropped_label_is_kept() {
        assert_eq!(
            strip_orphan_titles("Intro.\n\nResources:\n- Campaign API\n\nBudgets are daily.\n- keep me"),
            "Intro.\n\nBudgets are daily.\n- keep me"
        );
        assert_eq!(
            strip_orphan_titles("Recommended settings keep pacing even."),
            "Recommended settings keep pacing even."
        );
    }

    #[test]
    fn empty_prose_gets_lead_in() {
        let answer = compose_response("See [this](https://x.test).", &sample_links());
        assert!(answer.starts_with(EMPTY_PROSE_LEAD_IN));
    }

    #[test]
    fn no_prose_and_no_links() {
        assert_eq!(render_answer("", &StructuredLinks::default()), NO_ANSWER_TEXT);
    }
}

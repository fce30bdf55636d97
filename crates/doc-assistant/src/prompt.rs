//! Generation prompt assembly.
//!
//! A prompt is an ordered list of named sections rendered into the Mistral instruct
//! format (`<s>[INST] ... [/INST]`). Sections with no content are left out.
use crate::model::{CandidateDocument, PageContext, Query, Role};
use crate::search::truncate_chars;

pub const MAX_CONTEXT_DOCUMENTS: usize = 3;
pub const MAX_CONTEXT_SNIPPET_CHARS: usize = 500;
pub const MAX_HISTORY_TURNS: usize = 10;

pub const SYSTEM_PROMPT: &str = r#"You are an AI assistant for IQM's programmatic advertising API documentation.

## Available Documentation Pages

Getting Started:
- Overview of the IQM platform
- Before You Begin (prerequisites)
- API Pagination Guide
- TypeScript Prerequisites

API Guidelines:
- Campaign API (campaign management)
- Creative API (creative upload and management)
- Audience API (audience targeting)
- Reports API (reporting endpoints)
- Conversion API (conversion tracking)
- Dashboard API (dashboard metrics)
- Insights API (performance insights)
- Inventory API (PMP deals and inventory groups)

Quickstarts:
- Authentication
- Create a Campaign
- Reporting API
- Upload a Creative

RULES:
- Be concise and accurate
- Only describe pages that exist above
- Do not include links or URLs; verified links are added to your answer automatically
- Provide code examples when helpful
- Use markdown formatting"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    System,
    RetrievedContext,
    PageContext,
    History,
    CurrentTurn,
}

impl SectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::System => "system",
            SectionKind::RetrievedContext => "retrieved-context",
            SectionKind::PageContext => "page-context",
            SectionKind::History => "history",
            SectionKind::CurrentTurn => "current-turn",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct Prompt {
    sections: Vec<Section>,
}

impl Prompt {
    /// Build the prompt for one query from the ranked context documents.
    pub fn for_query(query: &Query, context: &[CandidateDocument]) -> Self {
        let mut prompt = Prompt::default();
        prompt.push(SectionKind::System, SYSTEM_PROMPT.to_string());
        prompt.push(SectionKind::RetrievedContext, retrieved_context(context));
        prompt.push(
            SectionKind::PageContext,
            query.page.as_ref().map(page_context).unwrap_or_default(),
        );
        prompt.push(SectionKind::History, history(query));
        prompt.push(SectionKind::CurrentTurn, format!("User: {}", query.text));
        prompt
    }

    pub fn push(&mut self, kind: SectionKind, body: String) {
        if !body.trim().is_empty() {
            self.sections.push(Section { kind, body });
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[cfg(test)]
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn render(&self) -> String {
        let mut out = String::from("<s>[INST] ");
        for section in &self.sections {
            match section.kind {
                SectionKind::History => {
                    out.push_str(&section.body);
                    out.push('\n');
                }
                SectionKind::CurrentTurn => {
                    out.push_str(&section.body);
                    out.push_str(" [/INST]");
                }
                _ => {
                    out.push_str(&section.body);
                    out.push_str("\n\n");
                }
            }
        }
        out
    }
}

fn retrieved_context(docs: &[CandidateDocument]) -> String {
    if docs.is_empty() {
        return String::new();
    }
    let mut out = String::from("## Relevant Documentation\n");
    for doc in docs.iter().take(MAX_CONTEXT_DOCUMENTS) {
        let heading = doc
            .section_title
            .as_deref()
            .or(doc.page_title.as_deref())
            .unwrap_or(&doc.title);
        out.push_str(&format!(
            "### {heading}\n{}\n\n",
            truncate_chars(&doc.snippet, MAX_CONTEXT_SNIPPET_CHARS)
        ));
    }
    out.trim_end().to_string()
}

fn page_context(page: &PageContext) -> String {
    if page.path.trim().is_empty() {
        return String::new();
    }
    let mut out = format!("User is currently viewing: {}", page.path);
    if let Some(title) = page.title.as_deref().filter(|t| !t.trim().is_empty()) {
        out.push_str(&format!(" ({title})"));
    }
    if !page.headings.is_empty() {
        out.push_str(&format!("\nPage sections: {}", page.headings.join(", ")));
    }
    out
}

fn history(query: &Query) -> String {
    let skip = query.history.len().saturating_sub(MAX_HISTORY_TURNS);
    query
        .history
        .iter()
        .skip(skip)
        .filter_map(|turn| match turn.role {
            Role::User => Some(format!("User: {}", turn.text)),
            Role::Assistant => Some(format!("Assistant: {}", turn.text)),
            Role::System => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

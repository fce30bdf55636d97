use crate::tables::KnowledgeTables;

/// Normalize a free-text question into a search string.
///
/// Lowercases, turns punctuation into whitespace, drops stop words and single-character
/// tokens, then expands the first token that names a known entity. Later entity tokens
/// are left as they are. A query that filters down to nothing is returned unchanged.
pub fn extract_search_terms(query: &str, tables: &KnowledgeTables) -> String {
    let cleaned: String = query
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();

    let mut tokens: Vec<String> = cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() > 1 && !tables.is_stop_word(token))
        .map(str::to_string)
        .collect();

    if tokens.is_empty() {
        return query.to_string();
    }

    if let Some((idx, expansion)) = tokens
        .iter()
        .enumerate()
        .find_map(|(idx, token)| tables.expansion(token).map(|e| (idx, e.to_string())))
    {
        tokens[idx] = expansion;
    }

    tokens.join(" ")
}

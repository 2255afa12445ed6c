//! Context assembly: renders ranked passages into the bounded text block
//! sent to the completion service, and the source-metadata table shown to
//! callers and rated by the reliability evaluator.

use serde_json::Value;

use crate::retrieval::RetrievedPassage;

#[derive(Debug, Clone)]
pub struct ContextAssembler {
    passage_char_limit: usize,
    preview_char_limit: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self {
            passage_char_limit: 500,
            preview_char_limit: 300,
        }
    }
}

impl ContextAssembler {
    pub fn new(passage_char_limit: usize, preview_char_limit: usize) -> Self {
        Self {
            passage_char_limit,
            preview_char_limit,
        }
    }

    pub fn from_config(config: &Value) -> Self {
        let defaults = Self::default();
        let passage_char_limit = config
            .get("context")
            .and_then(|v| v.get("passage_char_limit"))
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(defaults.passage_char_limit);
        let preview_char_limit = config
            .get("context")
            .and_then(|v| v.get("preview_char_limit"))
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(defaults.preview_char_limit);
        Self::new(passage_char_limit, preview_char_limit)
    }

    /// One block per passage: a provenance line (`key: value` pairs joined
    /// with " | ", insertion order) above the passage text truncated to the
    /// per-passage cap. Blocks join with a blank line. Ordering is the
    /// caller's; nothing is reordered here.
    pub fn assemble(&self, passages: &[RetrievedPassage]) -> String {
        passages
            .iter()
            .map(|passage| {
                let provenance_line = passage
                    .provenance
                    .iter()
                    .map(|(key, value)| format!("{key}: {value}"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                format!(
                    "{provenance_line}\n{}",
                    truncate_chars(&passage.text, self.passage_char_limit)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Source table for display and reliability rating: one row per
    /// passage with the original UI's columns and placeholders.
    pub fn render_source_table(&self, passages: &[RetrievedPassage]) -> String {
        passages
            .iter()
            .map(|passage| {
                let title = passage.provenance.get("title").unwrap_or("Unknown");
                let source = passage.provenance.source().unwrap_or("Unknown");
                let page = passage.provenance.get("page").unwrap_or("N/A");
                let url = passage.provenance.get("url").unwrap_or("N/A");
                let preview = truncate_chars(&passage.text, self.preview_char_limit);
                format!(
                    "Title: {title} | Source: {source} | Page: {page} | Page Content: {preview}... | URL: {url}"
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Truncate to at most `limit` chars without splitting a UTF-8 scalar.
fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

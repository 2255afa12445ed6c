//! Source-category classification and filtering for local passages.
//!
//! Classification is case-insensitive substring matching on the passage's
//! `source` provenance field. Live passages never pass through here; the
//! category filter applies to the local index only.

use std::collections::BTreeSet;

use serde_json::Value;

use super::passage::{RetrievedPassage, SourceSelection};

const MISSING_SOURCE: &str = "(missing source)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCategory {
    Encyclopedia,
    Textbook,
    HeritageArticle,
    Unknown,
}

/// Outcome of a filter pass: the surviving passages plus the source values
/// that matched no enabled category, kept for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub passages: Vec<RetrievedPassage>,
    pub unmatched_sources: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct SourceFilter {
    encyclopedia_markers: Vec<String>,
    textbook_markers: Vec<String>,
    heritage_markers: Vec<String>,
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            encyclopedia_markers: vec!["infopedia".to_string()],
            textbook_markers: vec![
                "sec1".to_string(),
                "sec2".to_string(),
                "textbook".to_string(),
            ],
            heritage_markers: vec!["roots website".to_string()],
        }
    }
}

impl SourceFilter {
    pub fn from_config(config: &Value) -> Self {
        let defaults = Self::default();
        Self {
            encyclopedia_markers: marker_list(config, "encyclopedia_markers")
                .unwrap_or(defaults.encyclopedia_markers),
            textbook_markers: marker_list(config, "textbook_markers")
                .unwrap_or(defaults.textbook_markers),
            heritage_markers: marker_list(config, "heritage_markers")
                .unwrap_or(defaults.heritage_markers),
        }
    }

    pub fn classify(&self, passage: &RetrievedPassage) -> SourceCategory {
        let source = match passage.provenance.source() {
            Some(source) => source.to_lowercase().trim().to_string(),
            None => return SourceCategory::Unknown,
        };
        if source.is_empty() {
            return SourceCategory::Unknown;
        }

        if contains_any(&source, &self.encyclopedia_markers) {
            SourceCategory::Encyclopedia
        } else if contains_any(&source, &self.textbook_markers) {
            SourceCategory::Textbook
        } else if contains_any(&source, &self.heritage_markers) {
            SourceCategory::HeritageArticle
        } else {
            SourceCategory::Unknown
        }
    }

    /// Keeps a passage iff its category is enabled in `selection`. Unknown
    /// passages always drop. Sources that matched no enabled category are
    /// collected so stale category rules can be debugged upstream.
    pub fn filter(
        &self,
        passages: Vec<RetrievedPassage>,
        selection: &SourceSelection,
    ) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();

        for passage in passages {
            let source = passage
                .provenance
                .source()
                .map(|s| s.trim().to_lowercase())
                .unwrap_or_default();

            if source.is_empty() {
                outcome.unmatched_sources.insert(MISSING_SOURCE.to_string());
                continue;
            }

            let keep = match self.classify(&passage) {
                SourceCategory::Encyclopedia => selection.include_encyclopedia,
                SourceCategory::Textbook => selection.include_textbooks,
                SourceCategory::HeritageArticle => selection.include_heritage_articles,
                SourceCategory::Unknown => false,
            };

            if keep {
                outcome.passages.push(passage);
            } else {
                outcome.unmatched_sources.insert(source);
            }
        }

        if outcome.passages.is_empty() && !outcome.unmatched_sources.is_empty() {
            tracing::warn!(
                "No sources matched the selected filters. Unmatched sources: {}",
                outcome
                    .unmatched_sources
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        outcome
    }
}

fn contains_any(source: &str, markers: &[String]) -> bool {
    markers.iter().any(|marker| source.contains(marker))
}

fn marker_list(config: &Value, key: &str) -> Option<Vec<String>> {
    config
        .get("filter")
        .and_then(|v| v.get(key))
        .and_then(|v| v.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_lowercase())
                .collect()
        })
}

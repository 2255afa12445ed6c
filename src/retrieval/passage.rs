//! Passage types shared across the retrieval pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a passage came from: the static local index or live web search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Local,
    Live,
}

/// Descriptive fields attached to a passage (source, title, page, url).
///
/// Kept as an ordered list of pairs: the context assembler renders fields
/// in insertion order, which a plain JSON map would not preserve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance(Vec<(String, String)>);

impl Provenance {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn source(&self) -> Option<&str> {
        self.get("source")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Provenance {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A unit of retrieved text plus its provenance and relevance score.
///
/// Immutable once produced; lives for the duration of one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub text: String,
    pub provenance: Provenance,
    pub relevance_score: Option<f32>,
    pub origin: Origin,
}

impl RetrievedPassage {
    /// Score used for merge ordering. Unscored passages default to 1 and
    /// rank above any live result scored below 1.
    pub fn effective_score(&self) -> f32 {
        self.relevance_score.unwrap_or(1.0)
    }
}

/// Per-query choice of which local source categories to retrieve from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSelection {
    pub include_encyclopedia: bool,
    pub include_textbooks: bool,
    pub include_heritage_articles: bool,
}

impl Default for SourceSelection {
    fn default() -> Self {
        Self {
            include_encyclopedia: true,
            include_textbooks: true,
            include_heritage_articles: true,
        }
    }
}

impl SourceSelection {
    pub fn none() -> Self {
        Self {
            include_encyclopedia: false,
            include_textbooks: false,
            include_heritage_articles: false,
        }
    }
}

/// Terminal state of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Answered,
    NoSources,
    ValidationFailed,
    GenerationFailed,
}

/// The artifact returned to the caller, one per query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub query_id: Uuid,
    pub status: AnswerStatus,
    pub answer: String,
    pub passages: Vec<RetrievedPassage>,
    pub unmatched_sources: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl QueryResult {
    fn new(status: AnswerStatus, answer: String, passages: Vec<RetrievedPassage>) -> Self {
        Self {
            query_id: Uuid::new_v4(),
            status,
            answer,
            passages,
            unmatched_sources: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn answered(answer: String, passages: Vec<RetrievedPassage>) -> Self {
        Self::new(AnswerStatus::Answered, answer, passages)
    }

    pub fn no_sources(unmatched_sources: Vec<String>) -> Self {
        let mut result = Self::new(
            AnswerStatus::NoSources,
            "No relevant sources found based on your filters.".to_string(),
            Vec::new(),
        );
        result.unmatched_sources = unmatched_sources;
        result
    }

    pub fn validation_failed() -> Self {
        Self::new(
            AnswerStatus::ValidationFailed,
            "Validation failed. Please try again.".to_string(),
            Vec::new(),
        )
    }

    pub fn generation_failed() -> Self {
        Self::new(
            AnswerStatus::GenerationFailed,
            "The answer service is currently unavailable. Please try again later.".to_string(),
            Vec::new(),
        )
    }
}

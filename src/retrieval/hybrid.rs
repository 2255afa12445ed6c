//! Hybrid retrieval: static vector index plus live web search.
//!
//! The two lookups are independent, so they run concurrently and merge
//! only after both complete. Either leg failing degrades that leg to
//! empty; only both legs empty produces an empty outcome.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::filter::SourceFilter;
use super::passage::{Origin, Provenance, RetrievedPassage, SourceSelection};
use super::retriever::VectorRetriever;
use crate::search::{LiveSearch, SearchResult};

/// Ranked passages plus filter diagnostics for one query.
#[derive(Debug, Clone, Default)]
pub struct RetrievalOutcome {
    pub passages: Vec<RetrievedPassage>,
    pub unmatched_sources: BTreeSet<String>,
}

pub struct HybridRetriever {
    retriever: VectorRetriever,
    search: Arc<dyn LiveSearch>,
    filter: SourceFilter,
    local_top_k: usize,
    live_top_n: usize,
}

impl HybridRetriever {
    pub fn new(
        retriever: VectorRetriever,
        search: Arc<dyn LiveSearch>,
        filter: SourceFilter,
        local_top_k: usize,
        live_top_n: usize,
    ) -> Self {
        Self {
            retriever,
            search,
            filter,
            local_top_k,
            live_top_n,
        }
    }

    pub async fn retrieve(&self, query: &str, selection: &SourceSelection) -> RetrievalOutcome {
        let (local, live) = tokio::join!(
            self.retriever.retrieve(query, self.local_top_k),
            self.search.search(query, self.live_top_n),
        );

        let local_passages = match local {
            Ok(passages) => passages,
            Err(err) => {
                tracing::warn!("Vector lookup failed, continuing with live results: {}", err);
                Vec::new()
            }
        };

        let live_results = match live {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!("Live search failed, continuing with local results: {}", err);
                Vec::new()
            }
        };

        let filtered = self.filter.filter(local_passages, selection);
        let live_passages = live_results.into_iter().map(live_passage).collect();

        RetrievalOutcome {
            passages: merge_ranked(filtered.passages, live_passages),
            unmatched_sources: filtered.unmatched_sources,
        }
    }
}

/// Live results are not categorized; they bypass the source filter and
/// carry the search API's relevance score.
fn live_passage(result: SearchResult) -> RetrievedPassage {
    let mut provenance = Provenance::new();
    provenance.insert("source", result.url);
    provenance.insert("score", format!("{}", result.score));
    RetrievedPassage {
        text: result.content,
        provenance,
        relevance_score: Some(result.score),
        origin: Origin::Live,
    }
}

/// Concatenate filtered local passages and live passages, then stable-sort
/// by effective score descending. Unscored passages default to score 1;
/// on ties locals keep their place ahead of lives.
fn merge_ranked(
    local: Vec<RetrievedPassage>,
    live: Vec<RetrievedPassage>,
) -> Vec<RetrievedPassage> {
    let mut combined = local;
    combined.extend(live);
    combined.sort_by(|a, b| {
        b.effective_score()
            .partial_cmp(&a.effective_score())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(source: &str, score: Option<f32>) -> RetrievedPassage {
        let mut provenance = Provenance::new();
        provenance.insert("source", source);
        RetrievedPassage {
            text: format!("{source} text"),
            provenance,
            relevance_score: score,
            origin: Origin::Local,
        }
    }

    fn live(url: &str, score: f32) -> RetrievedPassage {
        live_passage(SearchResult {
            content: format!("{url} content"),
            url: url.to_string(),
            score,
        })
    }

    #[test]
    fn unscored_local_ranks_above_sub_one_live() {
        let merged = merge_ranked(vec![local("Sec1 Unit 2", None)], vec![live("https://x", 0.5)]);

        assert_eq!(merged[0].origin, Origin::Local);
        assert_eq!(merged[1].origin, Origin::Live);
    }

    #[test]
    fn live_scored_above_one_outranks_unscored_local() {
        let merged = merge_ranked(vec![local("Sec1 Unit 2", None)], vec![live("https://x", 1.3)]);

        assert_eq!(merged[0].origin, Origin::Live);
    }

    #[test]
    fn ties_preserve_local_before_live() {
        let merged = merge_ranked(
            vec![local("Infopedia A", None), local("Sec1 B", None)],
            vec![live("https://x", 1.0)],
        );

        assert_eq!(merged[0].provenance.source(), Some("Infopedia A"));
        assert_eq!(merged[1].provenance.source(), Some("Sec1 B"));
        assert_eq!(merged[2].origin, Origin::Live);
    }

    #[test]
    fn live_results_sort_among_themselves_by_score() {
        let merged = merge_ranked(
            Vec::new(),
            vec![live("https://low", 0.2), live("https://high", 0.9)],
        );

        assert_eq!(merged[0].provenance.source(), Some("https://high"));
        assert_eq!(merged[1].provenance.source(), Some("https://low"));
    }

    #[test]
    fn live_passage_carries_url_and_score_in_provenance() {
        let passage = live("https://example.sg/hdb", 0.8);

        assert_eq!(passage.provenance.source(), Some("https://example.sg/hdb"));
        assert_eq!(passage.provenance.get("score"), Some("0.8"));
        assert_eq!(passage.effective_score(), 0.8);
    }
}

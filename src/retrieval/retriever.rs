//! Vector retrieval: embed the query, search the static index.

use std::sync::Arc;

use serde_json::Value;

use super::index::VectorIndex;
use super::passage::{Origin, RetrievedPassage};
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

pub struct VectorRetriever {
    index: Arc<VectorIndex>,
    llm: Arc<dyn LlmProvider>,
    embedding_model: String,
}

impl VectorRetriever {
    pub fn new(index: Arc<VectorIndex>, llm: Arc<dyn LlmProvider>, embedding_model: String) -> Self {
        Self {
            index,
            llm,
            embedding_model,
        }
    }

    pub fn from_config(
        index: Arc<VectorIndex>,
        llm: Arc<dyn LlmProvider>,
        config: &Value,
    ) -> Self {
        let embedding_model = config
            .get("llm")
            .and_then(|v| v.get("embedding_model"))
            .and_then(|v| v.as_str())
            .unwrap_or("text-embedding-3-small")
            .to_string();
        Self::new(index, llm, embedding_model)
    }

    /// Top-K stored passages most similar to `query`.
    ///
    /// Index similarity selects the candidates and is logged for
    /// diagnostics, but the passage's relevance score comes from its
    /// stored provenance (usually absent for local passages, which then
    /// rank with the default score at merge time).
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, ApiError> {
        let embeddings = self
            .llm
            .embed(&[query.to_string()], &self.embedding_model)
            .await?;
        let query_embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Internal("embedding service returned no vector".to_string()))?;

        let hits = self.index.search(&query_embedding, top_k).await?;

        let passages = hits
            .into_iter()
            .map(|hit| {
                tracing::debug!(
                    passage_id = %hit.passage.passage_id,
                    similarity = hit.similarity,
                    "local index hit"
                );
                let relevance_score = hit
                    .passage
                    .provenance
                    .get("score")
                    .and_then(|s| s.parse::<f32>().ok());
                RetrievedPassage {
                    text: hit.passage.content,
                    provenance: hit.passage.provenance,
                    relevance_score,
                    origin: Origin::Local,
                }
            })
            .collect();

        Ok(passages)
    }
}

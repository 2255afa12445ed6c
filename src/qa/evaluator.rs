//! Source reliability rating: a second deterministic completion over the
//! rendered source table. Informational only; the primary answer never
//! depends on it.

use std::sync::Arc;

use serde_json::Value;

use super::prompts::build_evaluation_prompt;
use crate::core::errors::ApiError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

pub struct SourceReliabilityEvaluator {
    llm: Arc<dyn LlmProvider>,
    chat_model: String,
}

impl SourceReliabilityEvaluator {
    pub fn new(llm: Arc<dyn LlmProvider>, chat_model: String) -> Self {
        Self { llm, chat_model }
    }

    pub fn from_config(llm: Arc<dyn LlmProvider>, config: &Value) -> Self {
        let chat_model = config
            .get("llm")
            .and_then(|v| v.get("chat_model"))
            .and_then(|v| v.as_str())
            .unwrap_or("gpt-4o")
            .to_string();
        Self::new(llm, chat_model)
    }

    /// Rate each source in the rendered table. The free-text rating comes
    /// back verbatim.
    pub async fn evaluate(&self, source_table: &str) -> Result<String, ApiError> {
        let prompt = build_evaluation_prompt(source_table);
        let request = ChatRequest::deterministic(vec![ChatMessage::user(prompt)]);
        self.llm.chat(request, &self.chat_model).await
    }
}

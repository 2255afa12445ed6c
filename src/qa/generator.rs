//! Answer generation against the external completion service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::prompts::build_answer_prompt;
use crate::core::errors::ApiError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

pub struct AnswerGenerator {
    llm: Arc<dyn LlmProvider>,
    chat_model: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl AnswerGenerator {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        chat_model: String,
        max_retries: u32,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            llm,
            chat_model,
            max_retries,
            retry_backoff,
        }
    }

    pub fn from_config(llm: Arc<dyn LlmProvider>, config: &Value) -> Self {
        let chat_model = config
            .get("llm")
            .and_then(|v| v.get("chat_model"))
            .and_then(|v| v.as_str())
            .unwrap_or("gpt-4o")
            .to_string();
        let max_retries = config
            .get("llm")
            .and_then(|v| v.get("max_retries"))
            .and_then(|v| v.as_u64())
            .unwrap_or(2) as u32;
        let backoff_ms = config
            .get("llm")
            .and_then(|v| v.get("retry_backoff_ms"))
            .and_then(|v| v.as_u64())
            .unwrap_or(500);

        Self::new(
            llm,
            chat_model,
            max_retries,
            Duration::from_millis(backoff_ms),
        )
    }

    /// Fill the instruction template and request a deterministic
    /// completion. Transient failures retry with exponential backoff;
    /// exhaustion returns the last error. The raw completion text is
    /// returned verbatim; parsing is the validator's job.
    pub async fn generate(&self, context: &str, question: &str) -> Result<String, ApiError> {
        let prompt = build_answer_prompt(context, question);
        let request = ChatRequest::deterministic(vec![ChatMessage::user(prompt)]);

        let mut backoff = self.retry_backoff;
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match self.llm.chat(request.clone(), &self.chat_model).await {
                Ok(raw) => return Ok(raw),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        "Answer generation failed, retrying: {}",
                        err
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }
}

//! Live web-search client.
//!
//! Wraps the Tavily search API behind the `LiveSearch` trait so the
//! retrieval pipeline can be driven with a stub in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};

use crate::core::errors::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub content: String,
    pub url: String,
    pub score: f32,
}

#[async_trait]
pub trait LiveSearch: Send + Sync {
    /// Top-N live results for a free-text query, best first.
    async fn search(&self, query: &str, top_n: usize) -> Result<Vec<SearchResult>, ApiError>;
}

#[derive(Clone)]
pub struct TavilyClient {
    base_url: String,
    api_key: String,
    search_depth: String,
    client: Client,
}

impl TavilyClient {
    pub fn new(
        base_url: String,
        api_key: String,
        search_depth: String,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::internal)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            search_depth,
            client,
        })
    }

    pub fn from_config(config: &Value) -> Result<Self, ApiError> {
        let base_url = config
            .get("search")
            .and_then(|v| v.get("base_url"))
            .and_then(|v| v.as_str())
            .unwrap_or("https://api.tavily.com")
            .to_string();
        let api_key = config
            .get("search")
            .and_then(|v| v.get("api_key"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let search_depth = config
            .get("search")
            .and_then(|v| v.get("search_depth"))
            .and_then(|v| v.as_str())
            .unwrap_or("advanced")
            .to_string();
        let timeout_secs = config
            .get("search")
            .and_then(|v| v.get("request_timeout_secs"))
            .and_then(|v| v.as_u64())
            .unwrap_or(20);

        Self::new(
            base_url,
            api_key,
            search_depth,
            Duration::from_secs(timeout_secs),
        )
    }
}

#[async_trait]
impl LiveSearch for TavilyClient {
    async fn search(&self, query: &str, top_n: usize) -> Result<Vec<SearchResult>, ApiError> {
        let url = format!("{}/search", self.base_url);

        let body = json!({
            "api_key": self.api_key,
            "query": query,
            "search_depth": self.search_depth,
            "max_results": top_n,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ApiError::Timeout(err.to_string())
                } else {
                    ApiError::internal(err)
                }
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Internal(format!(
                "Tavily search failed: {}",
                response.status()
            )));
        }

        let payload: Value = response.json().await.map_err(ApiError::internal)?;
        Ok(parse_search_response(&payload, top_n))
    }
}

fn parse_search_response(payload: &Value, top_n: usize) -> Vec<SearchResult> {
    let items = payload
        .get("results")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let mut results = Vec::new();
    for item in items {
        let content = item
            .get("content")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let url = item
            .get("url")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let score = item
            .get("score")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as f32;
        if !content.is_empty() && !url.is_empty() {
            results.push(SearchResult {
                content,
                url,
                score,
            });
        }
        if results.len() >= top_n {
            break;
        }
    }

    results
}

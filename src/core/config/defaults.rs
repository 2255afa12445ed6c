use serde_json::{json, Value};

/// Baseline configuration merged underneath `config.yml` and `secrets.yaml`.
///
/// Every key the pipeline reads has a default here so a fresh checkout can
/// start without a config file (API keys excepted).
pub fn default_config() -> Value {
    json!({
        "retrieval": {
            "local_top_k": 10,
            "live_top_n": 3,
        },
        "context": {
            "passage_char_limit": 500,
            "preview_char_limit": 300,
        },
        "llm": {
            "base_url": "https://api.openai.com",
            "chat_model": "gpt-4o",
            "embedding_model": "text-embedding-3-small",
            "request_timeout_secs": 60,
            "max_retries": 2,
            "retry_backoff_ms": 500,
        },
        "search": {
            "provider": "tavily",
            "base_url": "https://api.tavily.com",
            "search_depth": "advanced",
            "request_timeout_secs": 20,
        },
        "filter": {
            "encyclopedia_markers": ["infopedia"],
            "textbook_markers": ["sec1", "sec2", "textbook"],
            "heritage_markers": ["roots website"],
        },
    })
}

use std::time::Duration;

use crate::llm::openai::OpenAiProvider;
use crate::llm::provider::LlmProvider;
use crate::llm::types::{ChatMessage, ChatRequest};

#[test]
fn deterministic_request_pins_temperature_to_zero() {
    let request = ChatRequest::deterministic(vec![ChatMessage::user("Hello")]);
    assert_eq!(request.temperature, Some(0.0));
}

// Requires a reachable OpenAI-compatible endpoint and OPENAI_API_KEY.
#[tokio::test]
#[ignore]
async fn test_live_openai_connection() {
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    let provider = OpenAiProvider::new(
        "https://api.openai.com".to_string(),
        api_key,
        Duration::from_secs(30),
    )
    .expect("provider should build");

    let healthy = provider.health_check().await;
    match healthy {
        Ok(ok) => println!("OpenAI reachable: {}", ok),
        Err(e) => panic!("Failed to reach OpenAI: {}", e),
    }

    let req = ChatRequest {
        messages: vec![ChatMessage::user("Hello")],
        temperature: Some(0.0),
        max_tokens: Some(10),
    };

    let res = provider.chat(req, "gpt-4o").await;
    match res {
        Ok(response) => println!("OpenAI chat response: {}", response),
        Err(e) => println!("OpenAI chat error: {}", e),
    }
}

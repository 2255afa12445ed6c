use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::retrieval::{RetrievedPassage, SourceSelection};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub sources: SourceSelection,
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    let result = state.qa.ask_question(question, &request.sources).await;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct EvaluateSourcesRequest {
    pub passages: Vec<RetrievedPassage>,
}

pub async fn evaluate_sources(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EvaluateSourcesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let evaluation = state.qa.rate_source_reliability(&request.passages).await;
    Ok(Json(json!({ "evaluation": evaluation })))
}

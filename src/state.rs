use std::sync::Arc;

use thiserror::Error;

use crate::core::config::{AppPaths, ConfigService};
use crate::core::errors::ApiError;
use crate::llm::{LlmProvider, OpenAiProvider};
use crate::qa::{AnswerGenerator, ContextAssembler, QaService, SourceReliabilityEvaluator};
use crate::retrieval::{HybridRetriever, SourceFilter, VectorIndex, VectorRetriever};
use crate::search::{LiveSearch, TavilyClient};

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("failed to load configuration: {0}")]
    Config(ApiError),
    #[error("failed to open vector index: {0}")]
    Index(ApiError),
    #[error("failed to build LLM provider: {0}")]
    Llm(ApiError),
    #[error("failed to build search client: {0}")]
    Search(ApiError),
}

/// Global application state shared across all routes.
///
/// The vector index is loaded once here and treated as read-only for the
/// lifetime of the process; queries share it without coordination.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub index: Arc<VectorIndex>,
    pub qa: Arc<QaService>,
}

impl AppState {
    pub async fn initialize() -> Result<Arc<Self>, InitializationError> {
        let paths = Arc::new(AppPaths::new());
        let config = ConfigService::new(paths.clone());
        let config_value = config.load_config().map_err(InitializationError::Config)?;

        let index = Arc::new(
            VectorIndex::new(paths.as_ref())
                .await
                .map_err(InitializationError::Index)?,
        );

        let llm: Arc<dyn LlmProvider> = Arc::new(
            OpenAiProvider::from_config(&config_value).map_err(InitializationError::Llm)?,
        );
        let search: Arc<dyn LiveSearch> = Arc::new(
            TavilyClient::from_config(&config_value).map_err(InitializationError::Search)?,
        );

        let local_top_k = config_value
            .get("retrieval")
            .and_then(|v| v.get("local_top_k"))
            .and_then(|v| v.as_u64())
            .unwrap_or(10) as usize;
        let live_top_n = config_value
            .get("retrieval")
            .and_then(|v| v.get("live_top_n"))
            .and_then(|v| v.as_u64())
            .unwrap_or(3) as usize;

        let retriever = VectorRetriever::from_config(index.clone(), llm.clone(), &config_value);
        let filter = SourceFilter::from_config(&config_value);
        let hybrid = HybridRetriever::new(retriever, search, filter, local_top_k, live_top_n);

        let assembler = ContextAssembler::from_config(&config_value);
        let generator = AnswerGenerator::from_config(llm.clone(), &config_value);
        let evaluator = SourceReliabilityEvaluator::from_config(llm.clone(), &config_value);

        let qa = Arc::new(QaService::new(hybrid, assembler, generator, evaluator));

        Ok(Arc::new(AppState {
            paths,
            config,
            index,
            qa,
        }))
    }
}

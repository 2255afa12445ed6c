//! End-to-end pipeline tests: a temporary vector index plus stub LLM and
//! search implementations drive `QaService` through its terminal states.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use heritage_backend::core::errors::ApiError;
use heritage_backend::llm::{ChatRequest, LlmProvider};
use heritage_backend::qa::{
    AnswerGenerator, ContextAssembler, QaService, SourceReliabilityEvaluator,
};
use heritage_backend::retrieval::{
    AnswerStatus, HybridRetriever, IndexedPassage, Origin, Provenance, SourceFilter,
    SourceSelection, VectorIndex, VectorRetriever,
};
use heritage_backend::search::{LiveSearch, SearchResult};

const VALID_ANSWER: &str = "Perspective 1: Public housing solved a shortage.\n\
Page: 12, Book Title: Sec1\n\
Perspective 2: It was nation building.\n\
Website Link: https://example.sg/hdb\n\
Perspective 3: It cleared kampongs after the Bukit Ho Swee fire.\n\
Page: 31, Book Title: Sec2\n\
\n\
Discussion Questions:\n\
1. What problems did early public housing address?\n\
2. How did housing policy shape national identity?\n";

struct StubLlm {
    query_embedding: Vec<f32>,
    chat_responses: Mutex<VecDeque<Result<String, ApiError>>>,
    chat_calls: Mutex<u32>,
}

impl StubLlm {
    fn new(query_embedding: Vec<f32>, responses: Vec<Result<String, ApiError>>) -> Arc<Self> {
        Arc::new(Self {
            query_embedding,
            chat_responses: Mutex::new(responses.into_iter().collect()),
            chat_calls: Mutex::new(0),
        })
    }

    fn chat_calls(&self) -> u32 {
        *self.chat_calls.lock().unwrap()
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn name(&self) -> &str {
        "stub"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
        *self.chat_calls.lock().unwrap() += 1;
        self.chat_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ApiError::ServiceUnavailable))
    }

    async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(inputs.iter().map(|_| self.query_embedding.clone()).collect())
    }
}

struct StubSearch {
    results: Vec<SearchResult>,
}

#[async_trait]
impl LiveSearch for StubSearch {
    async fn search(&self, _query: &str, top_n: usize) -> Result<Vec<SearchResult>, ApiError> {
        Ok(self.results.iter().take(top_n).cloned().collect())
    }
}

struct FailingSearch;

#[async_trait]
impl LiveSearch for FailingSearch {
    async fn search(&self, _query: &str, _top_n: usize) -> Result<Vec<SearchResult>, ApiError> {
        Err(ApiError::Timeout("search timed out".to_string()))
    }
}

fn indexed(id: &str, text: &str, source: &str) -> IndexedPassage {
    let mut provenance = Provenance::new();
    provenance.insert("source", source);
    provenance.insert("title", id);
    IndexedPassage {
        passage_id: id.to_string(),
        content: text.to_string(),
        provenance,
    }
}

async fn corpus_index(dir: &tempfile::TempDir) -> Arc<VectorIndex> {
    let index = VectorIndex::with_path(dir.path().join("index.db"))
        .await
        .expect("index should open");

    // Textbook passage most similar to the query embedding [1, 0].
    index
        .insert_batch(vec![
            (
                indexed("textbook", "HDB cleared the housing shortage.", "Sec1 Unit 4"),
                vec![1.0, 0.0],
            ),
            (
                indexed("encyclopedia", "Infopedia on public housing.", "Infopedia"),
                vec![0.9, 0.1],
            ),
        ])
        .await
        .expect("insert should work");

    Arc::new(index)
}

fn service(
    index: Arc<VectorIndex>,
    llm: Arc<StubLlm>,
    search: Arc<dyn LiveSearch>,
) -> QaService {
    let retriever = VectorRetriever::new(index, llm.clone(), "stub-embed".to_string());
    let hybrid = HybridRetriever::new(retriever, search, SourceFilter::default(), 10, 3);
    let generator = AnswerGenerator::new(
        llm.clone(),
        "stub-chat".to_string(),
        1,
        Duration::from_millis(1),
    );
    let evaluator = SourceReliabilityEvaluator::new(llm, "stub-chat".to_string());
    QaService::new(hybrid, ContextAssembler::default(), generator, evaluator)
}

#[tokio::test]
async fn hybrid_ranking_puts_unscored_locals_above_sub_one_live() {
    let dir = tempfile::tempdir().unwrap();
    let index = corpus_index(&dir).await;
    let llm = StubLlm::new(vec![1.0, 0.0], vec![Ok(VALID_ANSWER.to_string())]);
    let search = Arc::new(StubSearch {
        results: vec![SearchResult {
            content: "Live article on HDB.".to_string(),
            url: "https://news.example/hdb".to_string(),
            score: 0.8,
        }],
    });

    let qa = service(index, llm, search);
    let result = qa
        .ask_question(
            "Why did Singapore build public housing?",
            &SourceSelection::default(),
        )
        .await;

    assert_eq!(result.status, AnswerStatus::Answered);
    assert_eq!(result.answer, VALID_ANSWER);
    assert_eq!(result.passages.len(), 3);
    assert_eq!(result.passages[0].provenance.source(), Some("Sec1 Unit 4"));
    assert_eq!(result.passages[1].provenance.source(), Some("Infopedia"));
    assert_eq!(result.passages[2].origin, Origin::Live);
    assert_eq!(
        result.passages[2].provenance.source(),
        Some("https://news.example/hdb")
    );
}

#[tokio::test]
async fn all_categories_disabled_and_no_live_results_short_circuits() {
    let dir = tempfile::tempdir().unwrap();
    let index = corpus_index(&dir).await;
    let llm = StubLlm::new(vec![1.0, 0.0], vec![Ok(VALID_ANSWER.to_string())]);
    let search = Arc::new(StubSearch { results: vec![] });

    let qa = service(index, llm.clone(), search);
    let result = qa
        .ask_question(
            "Why did Singapore build public housing?",
            &SourceSelection::none(),
        )
        .await;

    assert_eq!(result.status, AnswerStatus::NoSources);
    assert_eq!(
        result.answer,
        "No relevant sources found based on your filters."
    );
    assert!(result.passages.is_empty());
    assert!(result
        .unmatched_sources
        .iter()
        .any(|source| source == "sec1 unit 4"));
    // Generation must be skipped entirely.
    assert_eq!(llm.chat_calls(), 0);
}

#[tokio::test]
async fn live_search_failure_degrades_to_local_results() {
    let dir = tempfile::tempdir().unwrap();
    let index = corpus_index(&dir).await;
    let llm = StubLlm::new(vec![1.0, 0.0], vec![Ok(VALID_ANSWER.to_string())]);

    let qa = service(index, llm, Arc::new(FailingSearch));
    let result = qa
        .ask_question(
            "Why did Singapore build public housing?",
            &SourceSelection::default(),
        )
        .await;

    assert_eq!(result.status, AnswerStatus::Answered);
    assert_eq!(result.passages.len(), 2);
    assert!(result.passages.iter().all(|p| p.origin == Origin::Local));
}

#[tokio::test]
async fn missing_questions_marker_is_still_a_valid_answer() {
    let dir = tempfile::tempdir().unwrap();
    let index = corpus_index(&dir).await;
    let marker_less = "Perspective 1: A.\nPerspective 2: B.\nPerspective 3: C.\n";
    let llm = StubLlm::new(vec![1.0, 0.0], vec![Ok(marker_less.to_string())]);
    let search = Arc::new(StubSearch { results: vec![] });

    let qa = service(index, llm, search);
    let result = qa
        .ask_question("What was kampong life like?", &SourceSelection::default())
        .await;

    assert_eq!(result.status, AnswerStatus::Answered);
}

#[tokio::test]
async fn malformed_answers_get_one_reprompt_then_fail_validation() {
    let dir = tempfile::tempdir().unwrap();
    let index = corpus_index(&dir).await;
    let llm = StubLlm::new(
        vec![1.0, 0.0],
        vec![
            Ok("no structure at all".to_string()),
            Ok("still unstructured".to_string()),
        ],
    );
    let search = Arc::new(StubSearch { results: vec![] });

    let qa = service(index, llm.clone(), search);
    let result = qa
        .ask_question(
            "Why did Singapore build public housing?",
            &SourceSelection::default(),
        )
        .await;

    assert_eq!(result.status, AnswerStatus::ValidationFailed);
    assert_eq!(result.answer, "Validation failed. Please try again.");
    assert!(result.passages.is_empty());
    assert_eq!(llm.chat_calls(), 2);
}

#[tokio::test]
async fn completion_outage_surfaces_as_generation_failure() {
    let dir = tempfile::tempdir().unwrap();
    let index = corpus_index(&dir).await;
    // Two attempts (initial + one retry) both fail.
    let llm = StubLlm::new(
        vec![1.0, 0.0],
        vec![
            Err(ApiError::Timeout("upstream timeout".to_string())),
            Err(ApiError::Timeout("upstream timeout".to_string())),
        ],
    );
    let search = Arc::new(StubSearch { results: vec![] });

    let qa = service(index, llm.clone(), search);
    let result = qa
        .ask_question(
            "Why did Singapore build public housing?",
            &SourceSelection::default(),
        )
        .await;

    assert_eq!(result.status, AnswerStatus::GenerationFailed);
    assert_eq!(llm.chat_calls(), 2);
}

#[tokio::test]
async fn source_evaluation_returns_rating_text() {
    let dir = tempfile::tempdir().unwrap();
    let index = corpus_index(&dir).await;
    let rating = "1. Sec1 Unit 4 - High: official textbook.\n";
    let llm = StubLlm::new(vec![1.0, 0.0], vec![Ok(rating.to_string())]);
    let search = Arc::new(StubSearch { results: vec![] });

    let qa = service(index.clone(), llm, search);
    let passages = {
        let mut provenance = Provenance::new();
        provenance.insert("source", "Sec1 Unit 4");
        vec![heritage_backend::retrieval::RetrievedPassage {
            text: "HDB cleared the housing shortage.".to_string(),
            provenance,
            relevance_score: None,
            origin: Origin::Local,
        }]
    };

    let evaluation = qa.rate_source_reliability(&passages).await;
    assert_eq!(evaluation.as_deref(), Some(rating));
}

#[tokio::test]
async fn source_evaluation_failure_degrades_to_none() {
    let dir = tempfile::tempdir().unwrap();
    let index = corpus_index(&dir).await;
    let llm = StubLlm::new(
        vec![1.0, 0.0],
        vec![Err(ApiError::Internal("model error".to_string()))],
    );
    let search = Arc::new(StubSearch { results: vec![] });

    let qa = service(index, llm, search);
    let mut provenance = Provenance::new();
    provenance.insert("source", "Infopedia");
    let passages = vec![heritage_backend::retrieval::RetrievedPassage {
        text: "Infopedia on public housing.".to_string(),
        provenance,
        relevance_score: None,
        origin: Origin::Local,
    }];

    assert_eq!(qa.rate_source_reliability(&passages).await, None);
}

#[tokio::test]
async fn empty_passage_list_skips_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let index = corpus_index(&dir).await;
    let llm = StubLlm::new(vec![1.0, 0.0], vec![]);
    let search = Arc::new(StubSearch { results: vec![] });

    let qa = service(index, llm.clone(), search);

    assert_eq!(qa.rate_source_reliability(&[]).await, None);
    assert_eq!(llm.chat_calls(), 0);
}

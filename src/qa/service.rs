//! The question-answering pipeline, end to end.
//!
//! Every stage failure is recovered here and converted into a terminal
//! `QueryResult`; nothing below this layer crashes a request.

use super::context::ContextAssembler;
use super::evaluator::SourceReliabilityEvaluator;
use super::generator::AnswerGenerator;
use super::validator::validate_answer;
use crate::retrieval::{HybridRetriever, QueryResult, RetrievedPassage, SourceSelection};

/// One bounded re-prompt when the first completion fails validation.
const VALIDATION_ATTEMPTS: u32 = 2;

pub struct QaService {
    hybrid: HybridRetriever,
    assembler: ContextAssembler,
    generator: AnswerGenerator,
    evaluator: SourceReliabilityEvaluator,
}

impl QaService {
    pub fn new(
        hybrid: HybridRetriever,
        assembler: ContextAssembler,
        generator: AnswerGenerator,
        evaluator: SourceReliabilityEvaluator,
    ) -> Self {
        Self {
            hybrid,
            assembler,
            generator,
            evaluator,
        }
    }

    pub async fn ask_question(&self, question: &str, selection: &SourceSelection) -> QueryResult {
        let outcome = self.hybrid.retrieve(question, selection).await;

        if outcome.passages.is_empty() {
            return QueryResult::no_sources(outcome.unmatched_sources.into_iter().collect());
        }

        let context = self.assembler.assemble(&outcome.passages);

        for attempt in 1..=VALIDATION_ATTEMPTS {
            let raw = match self.generator.generate(&context, question).await {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::error!("Answer generation failed: {}", err);
                    return QueryResult::generation_failed();
                }
            };

            if validate_answer(&raw) {
                return QueryResult::answered(raw, outcome.passages);
            }

            tracing::warn!(
                attempt,
                "Answer failed structural validation{}",
                if attempt < VALIDATION_ATTEMPTS {
                    ", re-prompting"
                } else {
                    ""
                }
            );
        }

        QueryResult::validation_failed()
    }

    /// Rate the reliability of the displayed sources. Failures degrade to
    /// `None`; the primary answer is never affected.
    pub async fn rate_source_reliability(
        &self,
        passages: &[RetrievedPassage],
    ) -> Option<String> {
        if passages.is_empty() {
            return None;
        }

        let table = self.assembler.render_source_table(passages);
        match self.evaluator.evaluate(&table).await {
            Ok(rating) => Some(rating),
            Err(err) => {
                tracing::warn!("Source reliability evaluation failed: {}", err);
                None
            }
        }
    }
}

//! Retrieval pipeline: passage types, source filtering, the static vector
//! index, and hybrid local+live retrieval.

pub mod filter;
pub mod hybrid;
pub mod index;
pub mod passage;
pub mod retriever;

pub use filter::{FilterOutcome, SourceCategory, SourceFilter};
pub use hybrid::{HybridRetriever, RetrievalOutcome};
pub use index::{IndexedPassage, VectorIndex};
pub use passage::{AnswerStatus, Origin, Provenance, QueryResult, RetrievedPassage, SourceSelection};
pub use retriever::VectorRetriever;

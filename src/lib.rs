//! Retrieval-augmented question answering for Singapore heritage
//! education: a static vector index plus live web search feed a
//! deterministic completion service, whose output is structurally
//! validated before it reaches the caller.

pub mod core;
pub mod llm;
pub mod qa;
pub mod retrieval;
pub mod search;
pub mod server;
pub mod state;

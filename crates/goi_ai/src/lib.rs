pub mod capability;
pub mod embeddings;
pub mod engine;
pub mod guardrails;
pub mod lexical;
pub mod llm;
pub mod ollama;
pub mod retrieve;
pub mod semantic;
pub mod synthesize;

pub use capability::GenerativeCapability;
pub use engine::{AnswerOptions, EngineStatus, InsightsEngine, ReloadOutcome, Snapshot};

use goi_core::error::AppError;

/// Produces free text from a prompt for a named model.
pub trait Llm: Send + Sync {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError>;
}

pub mod ollama_llm;

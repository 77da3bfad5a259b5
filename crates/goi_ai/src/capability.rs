use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use goi_core::config::BackendConfig;
use goi_core::error::AppError;

use crate::embeddings::ollama_embed::OllamaEmbedder;
use crate::embeddings::Embedder;
use crate::llm::ollama_llm::OllamaLlm;
use crate::llm::Llm;
use crate::ollama::OllamaClient;

/// Embedding plus text generation behind one optional handle.
///
/// The engine holds `Option<GenerativeCapability>`; `None` means every request takes the
/// lexical and extractive paths without touching the network.
#[derive(Clone)]
pub struct GenerativeCapability {
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn Llm>,
    embed_model: String,
    generate_model: String,
    client: Option<OllamaClient>,
}

impl GenerativeCapability {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn Llm>,
        embed_model: impl Into<String>,
        generate_model: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            llm,
            embed_model: embed_model.into(),
            generate_model: generate_model.into(),
            client: None,
        }
    }

    /// `Ok(None)` when no backend URL is configured.
    pub fn from_config(cfg: &BackendConfig) -> Result<Option<Self>, AppError> {
        let Some(base_url) = cfg.base_url.as_deref() else {
            return Ok(None);
        };
        let client =
            OllamaClient::new(base_url)?.with_timeout(Duration::from_millis(cfg.timeout_ms));
        Ok(Some(Self {
            embedder: Arc::new(OllamaEmbedder::new(client.clone())),
            llm: Arc::new(OllamaLlm::new(client.clone())),
            embed_model: cfg.embed_model.clone(),
            generate_model: cfg.generate_model.clone(),
            client: Some(client),
        }))
    }

    /// Probe the HTTP backend; capabilities built from custom trait impls have none to probe.
    pub fn health_check(&self) -> Result<(), AppError> {
        match self.client.as_ref() {
            Some(client) => client.health_check(),
            None => Ok(()),
        }
    }

    /// Identifier recorded on semantic indexes; a mismatch marks the index stale.
    pub fn embed_model(&self) -> &str {
        &self.embed_model
    }

    pub fn generate_model(&self) -> &str {
        &self.generate_model
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        self.embedder.embed(&self.embed_model, text)
    }

    pub fn generate(&self, prompt: &str) -> Result<String, AppError> {
        self.llm.generate(&self.generate_model, prompt)
    }
}

impl fmt::Debug for GenerativeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerativeCapability")
            .field("embed_model", &self.embed_model)
            .field("generate_model", &self.generate_model)
            .field("base_url", &self.client.as_ref().map(OllamaClient::base_url))
            .finish_non_exhaustive()
    }
}

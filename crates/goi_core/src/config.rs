//! Engine configuration.
//!
//! Uses Figment to merge built-in defaults, an optional TOML file and `GOI_*`
//! environment variables (`__` separates nested keys, e.g. `GOI_BM25__K1=1.2`).
use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, CONFIG_INVALID};

const MAX_BACKEND_TIMEOUT_MS: u64 = 60_000;
const MAX_CACHE_TTL_SECONDS: u64 = 7 * 24 * 3_600;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Upper bound on whitespace tokens per text passage.
    pub max_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_tokens: 250 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_k: usize,
    pub max_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_k: 5,
            max_k: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SynthesisConfig {
    pub max_prompt_chunks: usize,
    pub max_prompt_chars: usize,
    pub extractive_char_budget: usize,
    pub extractive_max_sentences: usize,
    pub max_answer_chars: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_prompt_chunks: 5,
            max_prompt_chars: 12_000,
            extractive_char_budget: 1_200,
            extractive_max_sentences: 8,
            max_answer_chars: 8_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 3_600,
            max_entries: 1_024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    /// No base URL means no generative capability; the engine runs fully local.
    pub base_url: Option<String>,
    pub embed_model: String,
    pub generate_model: String,
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3.1".to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub bm25: Bm25Params,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub synthesis: SynthesisConfig,
    pub cache: CacheConfig,
    pub backend: BackendConfig,
}

impl EngineConfig {
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));
        if let Some(p) = path {
            figment = figment.merge(Toml::file(p));
        }
        figment.merge(Env::prefixed("GOI_").split("__"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let cfg: EngineConfig = Self::figment(path).extract().map_err(|e| {
            AppError::new(CONFIG_INVALID, "Failed to load engine configuration")
                .with_details(e.to_string())
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |field: &str, value: String| {
            Err(AppError::new(CONFIG_INVALID, "Invalid engine configuration")
                .with_details(format!("{field}={value}")))
        };

        if !(self.bm25.k1.is_finite() && self.bm25.k1 > 0.0) {
            return invalid("bm25.k1", self.bm25.k1.to_string());
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            return invalid("bm25.b", self.bm25.b.to_string());
        }
        if self.chunking.max_tokens == 0 {
            return invalid("chunking.max_tokens", "0".to_string());
        }
        if self.retrieval.default_k == 0 || self.retrieval.max_k == 0 {
            return invalid(
                "retrieval.k",
                format!("default_k={}; max_k={}", self.retrieval.default_k, self.retrieval.max_k),
            );
        }
        if self.retrieval.default_k > self.retrieval.max_k {
            return invalid(
                "retrieval.default_k",
                format!("{} > max_k {}", self.retrieval.default_k, self.retrieval.max_k),
            );
        }
        if self.synthesis.max_prompt_chunks == 0
            || self.synthesis.max_prompt_chars == 0
            || self.synthesis.extractive_char_budget == 0
            || self.synthesis.extractive_max_sentences == 0
            || self.synthesis.max_answer_chars == 0
        {
            return invalid("synthesis", "limits must be non-zero".to_string());
        }
        if self.cache.ttl_seconds == 0
            || self.cache.ttl_seconds > MAX_CACHE_TTL_SECONDS
            || self.cache.max_entries == 0
        {
            return invalid(
                "cache",
                format!("ttl_seconds={}; max_entries={}", self.cache.ttl_seconds, self.cache.max_entries),
            );
        }
        if self.backend.timeout_ms == 0 || self.backend.timeout_ms > MAX_BACKEND_TIMEOUT_MS {
            return invalid("backend.timeout_ms", self.backend.timeout_ms.to_string());
        }
        Ok(())
    }
}

//! Engine entry points: `answer`, `reload_corpus`, `status`.
//!
//! Readers take an `Arc<Snapshot>` and never observe a partially rebuilt index; reloads build a
//! complete snapshot off to the side and swap it in under a write lock.

use std::sync::{Arc, Mutex, RwLock};

use goi_core::answer::{AnswerMethod, AnswerRecord};
use goi_core::cache::{CacheKey, Clock, ResponseCache, SystemClock};
use goi_core::config::EngineConfig;
use goi_core::corpus::{Corpus, CorpusBuilder};
use goi_core::domain::RawRecord;
use goi_core::error::AppError;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error, info, warn};

use crate::capability::GenerativeCapability;
use crate::lexical::LexicalIndex;
use crate::retrieve::{retrieve, Backend};
use crate::semantic::SemanticIndex;
use crate::synthesize::{synthesize, Synthesis, SynthesisInput};

pub const NO_CORPUS_TEXT: &str = "No corpus has been loaded yet.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnswerOptions {
    pub prefer_semantic: bool,
    /// `None` uses `retrieval.default_k`; values are clamped to `1..=retrieval.max_k`.
    pub k: Option<usize>,
}

impl Default for AnswerOptions {
    fn default() -> Self {
        Self {
            prefer_semantic: true,
            k: None,
        }
    }
}

/// Corpus plus the indexes derived from it, swapped as one unit.
#[derive(Debug)]
pub struct Snapshot {
    pub corpus: Arc<Corpus>,
    pub lexical: Arc<LexicalIndex>,
    pub semantic: Option<Arc<SemanticIndex>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineStatus {
    pub semantic_available: bool,
    pub lexical_chunk_count: usize,
    pub cache_size: usize,
    pub corpus_version: u64,
    pub generative_configured: bool,
    pub semantic_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReloadOutcome {
    pub corpus_version: u64,
    pub chunk_count: usize,
    pub semantic_available: bool,
    /// False when the data matched the current snapshot or the build failed.
    pub changed: bool,
    pub invalidated_cache_entries: usize,
    /// Set when the new data failed to build and the previous corpus stayed authoritative.
    pub build_error: Option<AppError>,
}

pub struct InsightsEngine {
    config: EngineConfig,
    capability: Option<GenerativeCapability>,
    builder: CorpusBuilder,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    reload_lock: Mutex<()>,
    cache: ResponseCache,
    clock: Arc<dyn Clock>,
}

impl InsightsEngine {
    pub fn new(
        config: EngineConfig,
        capability: Option<GenerativeCapability>,
    ) -> Result<Self, AppError> {
        Self::with_clock(config, capability, Arc::new(SystemClock))
    }

    /// Build the capability from `config.backend`.
    pub fn from_config(config: EngineConfig) -> Result<Self, AppError> {
        let capability = GenerativeCapability::from_config(&config.backend)?;
        Self::new(config, capability)
    }

    pub fn with_clock(
        config: EngineConfig,
        capability: Option<GenerativeCapability>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let builder = CorpusBuilder::new(&config.chunking);
        let cache = ResponseCache::new(&config.cache, clock.clone());
        Ok(Self {
            config,
            capability,
            builder,
            snapshot: RwLock::new(None),
            reload_lock: Mutex::new(()),
            cache,
            clock,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn swap(&self, next: Snapshot) {
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(next));
    }

    fn now_rfc3339(&self) -> String {
        let now = self.clock.now();
        now.format(&Rfc3339)
            .unwrap_or_else(|_| now.unix_timestamp().to_string())
    }

    fn build_semantic(&self, corpus: &Corpus) -> Option<Arc<SemanticIndex>> {
        let cap = self.capability.as_ref()?;
        if let Err(e) = cap.health_check() {
            warn!(
                code = %e.code,
                error = %e,
                version = corpus.version(),
                "backend unhealthy; skipping semantic index build"
            );
            return None;
        }
        match SemanticIndex::build(corpus, cap) {
            Ok(idx) => Some(Arc::new(idx)),
            Err(e) => {
                warn!(
                    code = %e.code,
                    error = %e,
                    version = corpus.version(),
                    "semantic index build failed; lexical only for this corpus version"
                );
                None
            }
        }
    }

    /// Rebuild every index from `records` and swap the result in.
    ///
    /// Only a build failure with no prior corpus is returned as an error; later failures keep
    /// the previous snapshot and report the error in the outcome.
    pub fn reload_corpus(&self, records: &[RawRecord]) -> Result<ReloadOutcome, AppError> {
        let _guard = self.reload_lock.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.snapshot();
        let next_version = current.as_ref().map_or(1, |s| s.corpus.version() + 1);

        let corpus = match self.builder.build(records, next_version) {
            Ok(c) => c,
            Err(e) => {
                let Some(current) = current else {
                    error!(code = %e.code, error = %e, "initial corpus build failed");
                    return Err(e);
                };
                warn!(
                    code = %e.code,
                    error = %e,
                    version = current.corpus.version(),
                    "corpus rebuild failed; keeping previous corpus"
                );
                return Ok(ReloadOutcome {
                    corpus_version: current.corpus.version(),
                    chunk_count: current.corpus.len(),
                    semantic_available: current.semantic.is_some(),
                    changed: false,
                    invalidated_cache_entries: 0,
                    build_error: Some(e),
                });
            }
        };

        if let Some(current) = current.as_ref() {
            if current.corpus.fingerprint() == corpus.fingerprint() {
                let mut semantic_available = current.semantic.is_some();
                let mut invalidated = 0;
                if !semantic_available {
                    if let Some(semantic) = self.build_semantic(&current.corpus) {
                        self.swap(Snapshot {
                            corpus: current.corpus.clone(),
                            lexical: current.lexical.clone(),
                            semantic: Some(semantic),
                        });
                        semantic_available = true;
                        // Cached answers were ranked without the semantic index.
                        invalidated = self.cache.invalidate_all();
                    }
                }
                debug!(version = current.corpus.version(), "corpus unchanged; reload skipped");
                return Ok(ReloadOutcome {
                    corpus_version: current.corpus.version(),
                    chunk_count: current.corpus.len(),
                    semantic_available,
                    changed: false,
                    invalidated_cache_entries: invalidated,
                    build_error: None,
                });
            }
        }

        let lexical = LexicalIndex::build(&corpus, self.config.bm25);
        let semantic = self.build_semantic(&corpus);
        let version = corpus.version();
        let chunk_count = corpus.len();
        let semantic_available = semantic.is_some();

        self.swap(Snapshot {
            corpus: Arc::new(corpus),
            lexical: Arc::new(lexical),
            semantic,
        });
        let invalidated = self.cache.retain_version(version);

        info!(
            version,
            chunks = chunk_count,
            semantic_available,
            invalidated,
            "corpus reloaded"
        );
        Ok(ReloadOutcome {
            corpus_version: version,
            chunk_count,
            semantic_available,
            changed: true,
            invalidated_cache_entries: invalidated,
            build_error: None,
        })
    }

    /// Retry the semantic build against the current corpus; the version does not change.
    pub fn rebuild_semantic_index(&self) -> bool {
        let _guard = self.reload_lock.lock().unwrap_or_else(|e| e.into_inner());
        let Some(current) = self.snapshot() else {
            return false;
        };
        let Some(semantic) = self.build_semantic(&current.corpus) else {
            return false;
        };
        self.swap(Snapshot {
            corpus: current.corpus.clone(),
            lexical: current.lexical.clone(),
            semantic: Some(semantic),
        });
        // Cached answers were ranked without the semantic index.
        let invalidated = self.cache.invalidate_all();
        info!(invalidated, version = current.corpus.version(), "semantic index rebuilt");
        true
    }

    pub fn invalidate_cache(&self) -> usize {
        self.cache.invalidate_all()
    }

    /// Answer `query` against the current snapshot. Never fails.
    pub fn answer(&self, query: &str, options: AnswerOptions) -> AnswerRecord {
        let created_at = self.now_rfc3339();
        let Some(snapshot) = self.snapshot() else {
            return AnswerRecord {
                query: query.to_string(),
                corpus_version: 0,
                method: AnswerMethod::LexicalExtractive,
                text: NO_CORPUS_TEXT.to_string(),
                supporting_chunks: Vec::new(),
                confidence: 0.0,
                created_at,
            };
        };

        let k = options
            .k
            .unwrap_or(self.config.retrieval.default_k)
            .clamp(1, self.config.retrieval.max_k);
        let version = snapshot.corpus.version();
        let key = CacheKey::new(query, version, options.prefer_semantic, k);

        if let Some(mut hit) = self.cache.get(&key) {
            debug!(version, method = %hit.method, "answer served from cache");
            hit.query = query.to_string();
            return hit;
        }

        let backend = Backend::resolve(self.capability.as_ref());
        let retrieval = retrieve(
            &snapshot.lexical,
            snapshot.semantic.as_deref(),
            backend,
            query,
            k,
            options.prefer_semantic,
        );
        let Synthesis {
            record,
            generation_error,
        } = synthesize(
            SynthesisInput {
                query,
                corpus: &snapshot.corpus,
                retrieval: &retrieval,
                created_at,
            },
            backend,
            &self.config.synthesis,
        );

        info!(
            version,
            method = %record.method,
            hits = record.supporting_chunks.len(),
            confidence = record.confidence,
            "answered"
        );
        // A backend error downgraded this answer; the next request should try the backend again.
        if retrieval.semantic_error.is_some() || generation_error.is_some() {
            debug!(version, method = %record.method, "degraded answer not cached");
        } else {
            self.cache.put_default(key, record.clone());
        }
        record
    }

    /// Probe the configured backend. Errors with `AI_BACKEND_NOT_CONFIGURED` when there is none.
    pub fn check_backend(&self) -> Result<(), AppError> {
        match self.capability.as_ref() {
            Some(cap) => cap.health_check(),
            None => Err(AppError::new(
                "AI_BACKEND_NOT_CONFIGURED",
                "No generative backend is configured",
            )),
        }
    }

    pub fn status(&self) -> EngineStatus {
        let snapshot = self.snapshot();
        let semantic = snapshot.as_ref().and_then(|s| s.semantic.as_ref());
        EngineStatus {
            semantic_available: semantic.is_some(),
            lexical_chunk_count: snapshot.as_ref().map_or(0, |s| s.lexical.chunk_count()),
            cache_size: self.cache.stats().entries,
            corpus_version: snapshot.as_ref().map_or(0, |s| s.corpus.version()),
            generative_configured: self.capability.is_some(),
            semantic_model: semantic.map(|s| s.model_id().to_string()),
        }
    }
}

use goi_core::answer::RankedResult;
use goi_core::corpus::Corpus;
use goi_core::error::{AppError, AI_INDEX_BUILD_FAILED, AI_INDEX_STALE};
use tracing::debug;

use crate::capability::GenerativeCapability;
use crate::embeddings::Embedder;

pub mod similarity;

/// One embedding per chunk, all produced by the same model.
///
/// Built all-or-nothing: a single failed embedding call fails the whole build and the engine
/// runs without a semantic index until the next rebuild.
#[derive(Debug, Clone)]
pub struct SemanticIndex {
    corpus_version: u64,
    model_id: String,
    dims: usize,
    chunk_ids: Vec<String>,
    vectors: Vec<Vec<f32>>,
    norms: Vec<f32>,
}

impl SemanticIndex {
    pub fn build(corpus: &Corpus, capability: &GenerativeCapability) -> Result<Self, AppError> {
        Self::build_with_embedder(corpus, capability.embedder(), capability.embed_model())
    }

    pub fn build_with_embedder(
        corpus: &Corpus,
        embedder: &dyn Embedder,
        model: &str,
    ) -> Result<Self, AppError> {
        if corpus.is_empty() {
            return Err(AppError::new(AI_INDEX_BUILD_FAILED, "Corpus has no chunks to embed"));
        }

        let mut dims: Option<usize> = None;
        let mut chunk_ids = Vec::with_capacity(corpus.len());
        let mut vectors = Vec::with_capacity(corpus.len());
        let mut norms = Vec::with_capacity(corpus.len());

        for chunk in corpus.chunks() {
            let v = embedder.embed(model, &chunk.text).map_err(|e| {
                AppError::new(AI_INDEX_BUILD_FAILED, "Failed to embed chunk")
                    .with_details(format!("chunk_id={}; cause={e}", chunk.id))
                    .with_retryable(e.retryable)
            })?;
            if v.is_empty() || v.iter().any(|x| !x.is_finite()) {
                return Err(AppError::new(AI_INDEX_BUILD_FAILED, "Embedding vector is invalid")
                    .with_details(format!("chunk_id={}; dims={}", chunk.id, v.len())));
            }
            match dims {
                None => dims = Some(v.len()),
                Some(d) if d != v.len() => {
                    return Err(AppError::new(
                        AI_INDEX_BUILD_FAILED,
                        "Embedding dims changed mid-build",
                    )
                    .with_details(format!("chunk_id={}; expected={d}; got={}", chunk.id, v.len())));
                }
                Some(_) => {}
            }
            norms.push(similarity::l2_norm(&v));
            vectors.push(v);
            chunk_ids.push(chunk.id.clone());
        }

        let dims = dims.unwrap_or(0);
        debug!(model, dims, chunks = chunk_ids.len(), "semantic index built");
        Ok(Self {
            corpus_version: corpus.version(),
            model_id: model.to_string(),
            dims,
            chunk_ids,
            vectors,
            norms,
        })
    }

    pub fn corpus_version(&self) -> u64 {
        self.corpus_version
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.chunk_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_ids.is_empty()
    }

    pub fn score(
        &self,
        query: &str,
        capability: &GenerativeCapability,
        k: usize,
    ) -> Result<RankedResult, AppError> {
        self.score_with_embedder(query, capability.embedder(), capability.embed_model(), k)
    }

    /// Cosine ranking of every chunk against the query embedding.
    ///
    /// Fails with `AI_INDEX_STALE` when `model` differs from the model that built the index.
    pub fn score_with_embedder(
        &self,
        query: &str,
        embedder: &dyn Embedder,
        model: &str,
        k: usize,
    ) -> Result<RankedResult, AppError> {
        if model != self.model_id {
            return Err(AppError::new(
                AI_INDEX_STALE,
                "Semantic index was built with a different embedding model",
            )
            .with_details(format!("index_model={}; current_model={model}", self.model_id)));
        }
        let q = query.trim();
        if q.is_empty() || k == 0 {
            return Ok(RankedResult::empty());
        }

        let qv = embedder.embed(model, q)?;
        if qv.len() != self.dims {
            return Err(AppError::new(
                AI_INDEX_STALE,
                "Query embedding dims do not match index dims",
            )
            .with_details(format!("index_dims={}; query_dims={}", self.dims, qv.len())));
        }
        let qnorm = similarity::l2_norm(&qv);
        if qnorm == 0.0 || !qnorm.is_finite() {
            return Err(AppError::new("AI_RETRIEVAL_FAILED", "Query embedding norm is zero"));
        }

        let candidates = self
            .vectors
            .iter()
            .zip(self.norms.iter())
            .enumerate()
            .filter(|(_, (_, norm))| **norm > 0.0)
            .map(|(pos, (v, norm))| {
                let score = similarity::cosine_similarity(&qv, v, qnorm, *norm);
                (pos, self.chunk_ids[pos].clone(), f64::from(score))
            })
            .collect();
        Ok(RankedResult::from_candidates(candidates, k))
    }
}

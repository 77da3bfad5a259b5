mod common;

use std::sync::Arc;

use goi_ai::semantic::SemanticIndex;
use goi_core::config::ChunkingConfig;
use goi_core::corpus::{Corpus, CorpusBuilder};
use goi_core::error::{AI_INDEX_BUILD_FAILED, AI_INDEX_STALE};

use common::{capability, two_chunk_records, KeywordEmbedder, ScriptedLlm, EMBED_MODEL};

fn corpus() -> Corpus {
    CorpusBuilder::new(&ChunkingConfig::default())
        .build(&two_chunk_records(), 1)
        .expect("build")
}

#[test]
fn build_embeds_every_chunk_once_and_ranks_by_cosine() {
    let corpus = corpus();
    let embedder = Arc::new(KeywordEmbedder::new());
    let cap = capability(embedder.clone(), Arc::new(ScriptedLlm::replying("ok")));

    let index = SemanticIndex::build(&corpus, &cap).expect("build");
    assert_eq!(embedder.calls(), corpus.len());
    assert_eq!(index.model_id(), EMBED_MODEL);
    assert_eq!(index.len(), 2);

    let ranked = index.score("arts", &cap, 5).expect("score");
    let top = corpus.get(&ranked.hits[0].chunk_id).expect("top");
    assert!(top.text.starts_with("Arts"));
    assert!(ranked.hits[0].score > ranked.hits[1].score);
    assert_eq!(embedder.calls(), corpus.len() + 1);
}

#[test]
fn one_failed_embedding_aborts_the_whole_build() {
    let corpus = corpus();
    let embedder = KeywordEmbedder::failing_on(&[2]);
    let err = SemanticIndex::build_with_embedder(&corpus, &embedder, EMBED_MODEL)
        .expect_err("partial build must fail");
    assert_eq!(err.code, AI_INDEX_BUILD_FAILED);
    assert!(err.retryable);
}

#[test]
fn scoring_with_a_different_model_is_stale() {
    let corpus = corpus();
    let embedder = KeywordEmbedder::new();
    let index = SemanticIndex::build_with_embedder(&corpus, &embedder, "model-v1").expect("build");

    let err = index
        .score_with_embedder("engineering", &embedder, "model-v2", 5)
        .expect_err("stale");
    assert_eq!(err.code, AI_INDEX_STALE);
    // Refused before any embedding call.
    assert_eq!(embedder.calls(), corpus.len());
}

mod common;

use std::sync::Arc;

use goi_ai::{AnswerOptions, InsightsEngine};
use goi_core::answer::{AnswerMethod, RetrievalPath};
use goi_core::cache::CacheKey;
use goi_core::config::{CacheConfig, EngineConfig};
use goi_core::demo::demo_records;
use goi_core::domain::{EmploymentRecord, RawRecord};
use pretty_assertions::assert_eq;
use time::Duration;

use common::{capability, manual_clock, KeywordEmbedder, ScriptedLlm};

const QUERY: &str = "What is the average salary for Engineering in 2024?";

fn opts() -> AnswerOptions {
    AnswerOptions {
        prefer_semantic: true,
        k: Some(5),
    }
}

#[test]
fn repeated_questions_are_served_from_cache_until_ttl() {
    let clock = manual_clock();
    let llm = Arc::new(ScriptedLlm::replying("Cached answer."));
    let cap = capability(Arc::new(KeywordEmbedder::new()), llm.clone());
    let engine = InsightsEngine::with_clock(EngineConfig::default(), Some(cap), clock.clone())
        .expect("engine");
    engine.reload_corpus(&demo_records()).expect("reload");

    let first = engine.answer(QUERY, opts());
    let second = engine.answer("  what is the AVERAGE salary for engineering in 2024? ", opts());
    assert_eq!(llm.calls(), 1);
    assert_eq!(second.text, first.text);
    assert_eq!(second.supporting_chunks, first.supporting_chunks);
    assert_eq!(engine.status().cache_size, 1);

    clock.advance(Duration::seconds(3600));
    engine.answer(QUERY, opts());
    assert_eq!(llm.calls(), 2);
}

#[test]
fn reload_with_new_data_invalidates_old_version_entries() {
    let engine = InsightsEngine::with_clock(EngineConfig::default(), None, manual_clock())
        .expect("engine");
    engine.reload_corpus(&demo_records()).expect("reload");
    engine.answer(QUERY, opts());
    let old_key = CacheKey::new(QUERY, 1, true, 5);
    assert!(engine.cache().get(&old_key).is_some());

    let mut records = demo_records();
    records.push(RawRecord::Employment(EmploymentRecord {
        institution: "New Institute".to_string(),
        degree: "Engineering".to_string(),
        year: 2024,
        employment_rate: 70.0,
        median_salary: Some(500_000.0),
        data_source: None,
    }));
    let outcome = engine.reload_corpus(&records).expect("reload");
    assert!(outcome.changed);
    assert_eq!(outcome.corpus_version, 2);
    assert_eq!(outcome.invalidated_cache_entries, 1);

    assert!(engine.cache().get(&old_key).is_none());
    assert_eq!(engine.status().cache_size, 0);
    assert_eq!(engine.answer(QUERY, opts()).corpus_version, 2);
}

#[test]
fn identical_reload_keeps_version_and_cache() {
    let engine = InsightsEngine::with_clock(EngineConfig::default(), None, manual_clock())
        .expect("engine");
    engine.reload_corpus(&demo_records()).expect("reload");
    engine.answer(QUERY, opts());

    let outcome = engine.reload_corpus(&demo_records()).expect("reload");
    assert!(!outcome.changed);
    assert_eq!(outcome.corpus_version, 1);
    assert_eq!(engine.status().cache_size, 1);
}

#[test]
fn disabling_the_cache_does_not_change_answers() {
    let cached = InsightsEngine::with_clock(EngineConfig::default(), None, manual_clock())
        .expect("engine");
    let uncached_cfg = EngineConfig {
        cache: CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        },
        ..EngineConfig::default()
    };
    let uncached = InsightsEngine::with_clock(uncached_cfg, None, manual_clock()).expect("engine");
    cached.reload_corpus(&demo_records()).expect("reload");
    uncached.reload_corpus(&demo_records()).expect("reload");

    for q in [QUERY, "career services internships", "zzyzx", QUERY] {
        for prefer_semantic in [true, false] {
            let o = AnswerOptions {
                prefer_semantic,
                k: None,
            };
            assert_eq!(cached.answer(q, o), uncached.answer(q, o));
        }
    }
    assert_eq!(uncached.status().cache_size, 0);
    assert!(cached.status().cache_size > 0);
}

#[test]
fn semantic_index_recovered_on_identical_reload_clears_lexical_answers() {
    let build = |cache_enabled: bool| {
        let cfg = EngineConfig {
            cache: CacheConfig {
                enabled: cache_enabled,
                ..CacheConfig::default()
            },
            ..EngineConfig::default()
        };
        let cap = capability(
            Arc::new(KeywordEmbedder::failing_on(&[1])),
            Arc::new(ScriptedLlm::replying("Answer.")),
        );
        InsightsEngine::with_clock(cfg, Some(cap), manual_clock()).expect("engine")
    };

    for cache_enabled in [true, false] {
        let engine = build(cache_enabled);
        assert!(!engine.reload_corpus(&demo_records()).expect("reload").semantic_available);
        let before = engine.answer(QUERY, opts());
        assert_eq!(before.method.retrieval(), RetrievalPath::Lexical);

        let outcome = engine.reload_corpus(&demo_records()).expect("reload");
        assert!(outcome.semantic_available);
        assert!(!outcome.changed);
        assert_eq!(outcome.invalidated_cache_entries, usize::from(cache_enabled));

        let after = engine.answer(QUERY, opts());
        assert_eq!(after.method, AnswerMethod::SemanticGenerative, "cache_enabled={cache_enabled}");
    }
}

#[test]
fn answers_degraded_by_backend_errors_are_not_cached() {
    let llm = Arc::new(ScriptedLlm::timing_out());
    let cap = capability(Arc::new(KeywordEmbedder::new()), llm.clone());
    let engine = InsightsEngine::with_clock(EngineConfig::default(), Some(cap), manual_clock())
        .expect("engine");
    engine.reload_corpus(&demo_records()).expect("reload");

    let first = engine.answer(QUERY, opts());
    let second = engine.answer(QUERY, opts());
    assert_eq!(first.method, AnswerMethod::SemanticExtractive);
    assert_eq!(second, first);
    assert_eq!(llm.calls(), 2, "each request retries the backend");
    assert_eq!(engine.status().cache_size, 0);
}

#[test]
fn failed_query_embedding_is_not_cached() {
    // Two reports embed on calls 1-2; the first query embedding (call 3) fails.
    let embedder = Arc::new(KeywordEmbedder::failing_on(&[3]));
    let cap = capability(embedder, Arc::new(ScriptedLlm::replying("Answer.")));
    let engine = InsightsEngine::with_clock(EngineConfig::default(), Some(cap), manual_clock())
        .expect("engine");
    engine.reload_corpus(&common::two_chunk_records()).expect("reload");

    let degraded = engine.answer("engineering employment rate", opts());
    assert_eq!(degraded.method, AnswerMethod::LexicalGenerative);
    assert_eq!(engine.status().cache_size, 0);

    let recovered = engine.answer("engineering employment rate", opts());
    assert_eq!(recovered.method, AnswerMethod::SemanticGenerative);
    assert_eq!(engine.status().cache_size, 1);
}

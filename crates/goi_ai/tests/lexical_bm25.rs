mod common;

use goi_ai::lexical::LexicalIndex;
use goi_core::config::{Bm25Params, ChunkingConfig};
use goi_core::corpus::{Corpus, CorpusBuilder};
use goi_core::demo::demo_records;
use pretty_assertions::assert_eq;

use common::two_chunk_records;

fn two_chunk_corpus() -> Corpus {
    CorpusBuilder::new(&ChunkingConfig::default())
        .build(&two_chunk_records(), 1)
        .expect("build")
}

#[test]
fn engineering_chunk_outranks_arts_chunk() {
    let corpus = two_chunk_corpus();
    let index = LexicalIndex::build(&corpus, Bm25Params::default());

    let ranked = index.score("Engineering employment rate", 5);
    assert_eq!(ranked.len(), 2);

    let top = corpus.get(&ranked.hits[0].chunk_id).expect("top chunk");
    assert_eq!(top.text, "Engineering 2024 employment rate 92%");
    assert!(
        ranked.hits[0].score > ranked.hits[1].score,
        "expected strictly higher score: {:?}",
        ranked.hits
    );
}

#[test]
fn shared_terms_still_carry_positive_weight() {
    let index = LexicalIndex::build(&two_chunk_corpus(), Bm25Params::default());
    assert_eq!(index.document_frequency("employment"), 2);
    assert!(index.idf("employment") > 0.0);
    assert!(index.idf("engineering") > index.idf("employment"));
}

#[test]
fn zero_matching_terms_is_an_empty_ranking() {
    let index = LexicalIndex::build(&two_chunk_corpus(), Bm25Params::default());
    assert!(index.score("quantum biotechnology", 5).is_empty());
    assert!(index.score("the of and", 5).is_empty());
    assert!(index.score("", 5).is_empty());
}

#[test]
fn rebuilding_an_unchanged_corpus_is_idempotent() {
    let corpus = CorpusBuilder::new(&ChunkingConfig::default())
        .build(&demo_records(), 3)
        .expect("build");
    let a = LexicalIndex::build(&corpus, Bm25Params::default());
    let b = LexicalIndex::build(&corpus, Bm25Params::default());
    assert_eq!(a, b);
    assert_eq!(a.corpus_version(), 3);
    assert_eq!(a.chunk_count(), corpus.len());
}

#[test]
fn equal_scores_keep_corpus_order_and_k_bounds_length() {
    let records = vec![
        common::report("a", "Mentorship programs help graduates."),
        common::report("b", "Mentorship programs help graduates."),
        common::report("c", "Mentorship programs help graduates."),
    ];
    let corpus = CorpusBuilder::new(&ChunkingConfig::default())
        .build(&records, 1)
        .expect("build");
    let index = LexicalIndex::build(&corpus, Bm25Params::default());

    let ranked = index.score("mentorship", 2);
    let expected: Vec<String> = corpus.chunks()[..2].iter().map(|c| c.id.clone()).collect();
    assert_eq!(ranked.chunk_ids(), expected);
}

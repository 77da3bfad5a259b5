//! Okapi BM25 over corpus chunks.
//!
//! Postings map a term to `(chunk position, term frequency)` pairs in corpus order.
//! IDF uses the non-negative form `ln((N - df + 0.5) / (df + 0.5) + 1)`, so a term present
//! in half the corpus or more still contributes a small positive weight.

use std::collections::{BTreeMap, HashMap};

use goi_core::answer::RankedResult;
use goi_core::config::Bm25Params;
use goi_core::corpus::Corpus;

pub mod tokenize;

pub use tokenize::{query_terms, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub position: usize,
    pub tf: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexicalIndex {
    corpus_version: u64,
    params: Bm25Params,
    chunk_ids: Vec<String>,
    doc_lens: Vec<u32>,
    avg_len: f64,
    postings: BTreeMap<String, Vec<Posting>>,
}

impl LexicalIndex {
    pub fn build(corpus: &Corpus, params: Bm25Params) -> Self {
        let mut postings: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
        let mut chunk_ids = Vec::with_capacity(corpus.len());
        let mut doc_lens = Vec::with_capacity(corpus.len());

        for (position, chunk) in corpus.chunks().iter().enumerate() {
            let tokens = tokenize(&chunk.text);
            let mut tf: HashMap<String, u32> = HashMap::new();
            for t in tokens.iter() {
                *tf.entry(t.clone()).or_insert(0) += 1;
            }
            for (term, count) in tf {
                postings
                    .entry(term)
                    .or_default()
                    .push(Posting { position, tf: count });
            }
            chunk_ids.push(chunk.id.clone());
            doc_lens.push(u32::try_from(tokens.len()).unwrap_or(u32::MAX));
        }

        // Chunks are visited in order, so each list is already sorted by position.
        let total: u64 = doc_lens.iter().map(|&l| u64::from(l)).sum();
        let avg_len = if doc_lens.is_empty() {
            0.0
        } else {
            total as f64 / doc_lens.len() as f64
        };

        Self {
            corpus_version: corpus.version(),
            params,
            chunk_ids,
            doc_lens,
            avg_len,
            postings,
        }
    }

    pub fn corpus_version(&self) -> u64 {
        self.corpus_version
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_ids.len()
    }

    pub fn avg_chunk_len(&self) -> f64 {
        self.avg_len
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn postings(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings(term).len()
    }

    pub fn idf(&self, term: &str) -> f64 {
        let n = self.chunk_count() as f64;
        let df = self.document_frequency(term) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Top `k` chunks by BM25; only chunks matching at least one query term are ranked.
    pub fn score(&self, query: &str, k: usize) -> RankedResult {
        let terms = query_terms(query);
        if terms.is_empty() || k == 0 || self.chunk_ids.is_empty() {
            return RankedResult::empty();
        }

        let Bm25Params { k1, b } = self.params;
        let avg_len = if self.avg_len > 0.0 { self.avg_len } else { 1.0 };
        let mut scores: HashMap<usize, f64> = HashMap::new();

        for term in terms.iter() {
            let list = self.postings(term);
            if list.is_empty() {
                continue;
            }
            let idf = self.idf(term);
            for p in list {
                let tf = f64::from(p.tf);
                let len = f64::from(self.doc_lens[p.position]);
                let norm = k1 * (1.0 - b + b * len / avg_len);
                *scores.entry(p.position).or_insert(0.0) += idf * (tf * (k1 + 1.0)) / (tf + norm);
            }
        }

        let candidates = scores
            .into_iter()
            .map(|(pos, score)| (pos, self.chunk_ids[pos].clone(), score))
            .collect();
        RankedResult::from_candidates(candidates, k)
    }
}

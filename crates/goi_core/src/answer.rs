use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalPath {
    Lexical,
    Semantic,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisPath {
    Extractive,
    Generative,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMethod {
    LexicalExtractive,
    LexicalGenerative,
    SemanticExtractive,
    SemanticGenerative,
}

impl AnswerMethod {
    pub fn from_paths(retrieval: RetrievalPath, synthesis: SynthesisPath) -> Self {
        match (retrieval, synthesis) {
            (RetrievalPath::Lexical, SynthesisPath::Extractive) => AnswerMethod::LexicalExtractive,
            (RetrievalPath::Lexical, SynthesisPath::Generative) => AnswerMethod::LexicalGenerative,
            (RetrievalPath::Semantic, SynthesisPath::Extractive) => AnswerMethod::SemanticExtractive,
            (RetrievalPath::Semantic, SynthesisPath::Generative) => AnswerMethod::SemanticGenerative,
        }
    }

    pub fn retrieval(self) -> RetrievalPath {
        match self {
            AnswerMethod::LexicalExtractive | AnswerMethod::LexicalGenerative => RetrievalPath::Lexical,
            AnswerMethod::SemanticExtractive | AnswerMethod::SemanticGenerative => RetrievalPath::Semantic,
        }
    }

    pub fn synthesis(self) -> SynthesisPath {
        match self {
            AnswerMethod::LexicalExtractive | AnswerMethod::SemanticExtractive => SynthesisPath::Extractive,
            AnswerMethod::LexicalGenerative | AnswerMethod::SemanticGenerative => SynthesisPath::Generative,
        }
    }

    /// Display tag, e.g. `semantic+generative`.
    pub fn tag(self) -> &'static str {
        match self {
            AnswerMethod::LexicalExtractive => "lexical+extractive",
            AnswerMethod::LexicalGenerative => "lexical+generative",
            AnswerMethod::SemanticExtractive => "semantic+extractive",
            AnswerMethod::SemanticGenerative => "semantic+generative",
        }
    }
}

impl fmt::Display for AnswerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedHit {
    pub chunk_id: String,
    pub score: f64,
}

/// Descending by score, ties by corpus position. Scores from different paths are never mixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RankedResult {
    pub hits: Vec<RankedHit>,
}

impl RankedResult {
    pub fn empty() -> Self {
        Self { hits: Vec::new() }
    }

    /// Rank `(corpus_position, chunk_id, score)` candidates and keep the top `k`.
    pub fn from_candidates(mut candidates: Vec<(usize, String, f64)>, k: usize) -> Self {
        candidates.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        candidates.truncate(k);
        Self {
            hits: candidates
                .into_iter()
                .map(|(_, chunk_id, score)| RankedHit { chunk_id, score })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn top(&self) -> Option<&RankedHit> {
        self.hits.first()
    }

    pub fn chunk_ids(&self) -> Vec<String> {
        self.hits.iter().map(|h| h.chunk_id.clone()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerRecord {
    pub query: String,
    pub corpus_version: u64,
    pub method: AnswerMethod,
    pub text: String,
    pub supporting_chunks: Vec<String>,
    /// In `[0, 1]`; derived from ranking scores, never from the generative backend.
    pub confidence: f64,
    pub created_at: String, // RFC3339
}

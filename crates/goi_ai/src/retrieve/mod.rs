//! Retrieval dispatch with lexical fallback.
//!
//! The backend is resolved once per request. A semantic attempt is made at most once; any
//! failure, a missing index or an absent backend routes the request to BM25.

use goi_core::answer::{RankedResult, RetrievalPath};
use goi_core::error::AppError;
use tracing::{debug, warn};

use crate::capability::GenerativeCapability;
use crate::lexical::LexicalIndex;
use crate::semantic::SemanticIndex;

/// Per-request view of the generative capability.
#[derive(Debug, Clone, Copy)]
pub enum Backend<'a> {
    Available(&'a GenerativeCapability),
    Absent,
}

impl<'a> Backend<'a> {
    pub fn resolve(capability: Option<&'a GenerativeCapability>) -> Self {
        match capability {
            Some(c) => Backend::Available(c),
            None => Backend::Absent,
        }
    }

    pub fn capability(&self) -> Option<&'a GenerativeCapability> {
        match self {
            Backend::Available(c) => Some(c),
            Backend::Absent => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval {
    pub ranked: RankedResult,
    pub path: RetrievalPath,
    /// Why a requested semantic attempt did not produce the ranking.
    pub fallback_reason: Option<String>,
    /// The semantic attempt itself errored, as opposed to being unavailable.
    pub semantic_error: Option<AppError>,
}

pub fn retrieve(
    lexical: &LexicalIndex,
    semantic: Option<&SemanticIndex>,
    backend: Backend<'_>,
    query: &str,
    k: usize,
    prefer_semantic: bool,
) -> Retrieval {
    let mut fallback_reason = None;
    let mut semantic_error = None;

    if prefer_semantic {
        let reason = match (semantic, backend) {
            (Some(index), Backend::Available(cap)) => match index.score(query, cap, k) {
                Ok(ranked) => {
                    debug!(hits = ranked.len(), "semantic retrieval");
                    return Retrieval {
                        ranked,
                        path: RetrievalPath::Semantic,
                        fallback_reason: None,
                        semantic_error: None,
                    };
                }
                Err(e) => {
                    let reason = e.to_string();
                    semantic_error = Some(e);
                    reason
                }
            },
            (None, Backend::Available(_)) => "semantic index unavailable".to_string(),
            (_, Backend::Absent) => "generative backend not configured".to_string(),
        };
        warn!(reason = %reason, "semantic retrieval unavailable; falling back to lexical");
        fallback_reason = Some(reason);
    }

    let ranked = lexical.score(query, k);
    debug!(hits = ranked.len(), "lexical retrieval");
    Retrieval {
        ranked,
        path: RetrievalPath::Lexical,
        fallback_reason,
        semantic_error,
    }
}

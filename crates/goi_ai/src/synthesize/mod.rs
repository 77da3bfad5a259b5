//! Answer synthesis over ranked chunks.
//!
//! With a backend available the top chunks go into a bounded prompt and the generated text
//! becomes the answer. Any generation failure is absorbed here and the deterministic
//! extractive path runs instead, so the caller always receives a record.

use goi_core::answer::{AnswerMethod, AnswerRecord, RetrievalPath, SynthesisPath};
use goi_core::config::SynthesisConfig;
use goi_core::corpus::{kind, split_sentences, Chunk, Corpus};
use goi_core::error::AppError;
use tracing::{debug, warn};

use crate::capability::GenerativeCapability;
use crate::guardrails::sanitize_generated;
use crate::lexical::{query_terms, tokenize};
use crate::retrieve::{Backend, Retrieval};

pub mod prompts;

pub const NO_RELEVANT_CONTENT: &str = "No relevant information was found for this question.";

pub struct SynthesisInput<'a> {
    pub query: &'a str,
    pub corpus: &'a Corpus,
    pub retrieval: &'a Retrieval,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct Synthesis {
    pub record: AnswerRecord,
    /// Set when the backend was asked and failed, so the extractive text stood in.
    pub generation_error: Option<AppError>,
}

pub fn synthesize(
    input: SynthesisInput<'_>,
    backend: Backend<'_>,
    cfg: &SynthesisConfig,
) -> Synthesis {
    let SynthesisInput {
        query,
        corpus,
        retrieval,
        created_at,
    } = input;

    let ranked: Vec<(&Chunk, f64)> = retrieval
        .ranked
        .hits
        .iter()
        .filter_map(|h| corpus.get(&h.chunk_id).map(|c| (c, h.score)))
        .collect();

    let record = |synthesis: SynthesisPath, text: String, supporting: Vec<String>, confidence: f64| {
        AnswerRecord {
            query: query.to_string(),
            corpus_version: corpus.version(),
            method: AnswerMethod::from_paths(retrieval.path, synthesis),
            text,
            supporting_chunks: supporting,
            confidence,
            created_at: created_at.clone(),
        }
    };

    let Some(&(top, top_score)) = ranked.first() else {
        return Synthesis {
            record: record(
                SynthesisPath::Extractive,
                NO_RELEVANT_CONTENT.to_string(),
                Vec::new(),
                0.0,
            ),
            generation_error: None,
        };
    };
    let confidence = ranking_confidence(query, retrieval.path, top, top_score);

    let mut generation_error = None;
    if let Backend::Available(cap) = backend {
        match generate_answer(query, &ranked, cap, cfg) {
            Ok((text, supporting)) => {
                debug!(chunks = supporting.len(), "generative synthesis");
                return Synthesis {
                    record: record(SynthesisPath::Generative, text, supporting, confidence),
                    generation_error: None,
                };
            }
            Err(e) => {
                warn!(code = %e.code, error = %e, "generation failed; falling back to extractive");
                generation_error = Some(e);
            }
        }
    }

    let (text, supporting) = extractive_answer(&ranked, cfg);
    Synthesis {
        record: record(SynthesisPath::Extractive, text, supporting, confidence),
        generation_error,
    }
}

/// Confidence comes from the ranking, never from the backend.
///
/// Lexical: share of distinct query terms present in the top chunk.
/// Semantic: top cosine clamped to `[0, 1]`.
pub fn ranking_confidence(query: &str, path: RetrievalPath, top: &Chunk, top_score: f64) -> f64 {
    match path {
        RetrievalPath::Semantic => {
            if top_score.is_finite() {
                top_score.clamp(0.0, 1.0)
            } else {
                0.0
            }
        }
        RetrievalPath::Lexical => {
            let terms = query_terms(query);
            if terms.is_empty() {
                return 0.0;
            }
            let chunk_terms = tokenize(&top.text);
            let hits = terms.iter().filter(|t| chunk_terms.contains(t)).count();
            hits as f64 / terms.len() as f64
        }
    }
}

/// Prompt with at most `max_prompt_chunks` evidence blocks and `max_prompt_chars` of evidence.
pub fn build_prompt(query: &str, ranked: &[(&Chunk, f64)], cfg: &SynthesisConfig) -> (String, Vec<String>) {
    let mut blocks = String::new();
    let mut used = 0usize;
    let mut ids = Vec::new();

    for (chunk, _) in ranked.iter().take(cfg.max_prompt_chunks) {
        let block = prompts::evidence_block(&chunk.id, &chunk.source, &chunk.text);
        let len = block.chars().count() + 1;
        if used + len > cfg.max_prompt_chars {
            if ids.is_empty() {
                blocks.push_str(&clip_chars(&block, cfg.max_prompt_chars));
                ids.push(chunk.id.clone());
            }
            break;
        }
        blocks.push_str(&block);
        blocks.push('\n');
        used += len;
        ids.push(chunk.id.clone());
    }

    (prompts::answer_prompt(query, blocks.trim_end()), ids)
}

fn generate_answer(
    query: &str,
    ranked: &[(&Chunk, f64)],
    cap: &GenerativeCapability,
    cfg: &SynthesisConfig,
) -> Result<(String, Vec<String>), AppError> {
    let (prompt, ids) = build_prompt(query, ranked, cfg);
    let raw = cap.generate(&prompt)?;
    let text = sanitize_generated(&raw, cfg.max_answer_chars)?;
    Ok((text, ids))
}

/// Summary stats over row-level tabular chunks, then top sentences within the char budget.
pub fn extractive_answer(ranked: &[(&Chunk, f64)], cfg: &SynthesisConfig) -> (String, Vec<String>) {
    let stats = tabular_summary_lines(ranked);

    let mut sentences: Vec<String> = Vec::new();
    let mut supporting: Vec<String> = Vec::new();
    let mut used = 0usize;

    'chunks: for (chunk, _) in ranked {
        for sentence in split_sentences(&chunk.text) {
            if sentences.len() >= cfg.extractive_max_sentences {
                break 'chunks;
            }
            let len = sentence.chars().count();
            let fits = used + len <= cfg.extractive_char_budget;
            if !fits && !sentences.is_empty() {
                break 'chunks;
            }
            let sentence = if fits {
                sentence
            } else {
                clip_chars(&sentence, cfg.extractive_char_budget)
            };
            used += len + 1;
            sentences.push(sentence);
            if supporting.last() != Some(&chunk.id) {
                supporting.push(chunk.id.clone());
            }
            if !fits {
                break 'chunks;
            }
        }
    }

    let body = sentences.join(" ");
    let text = if stats.is_empty() {
        body
    } else {
        format!("{}\n\n{body}", stats.join("\n"))
    };
    (text, supporting)
}

fn tabular_summary_lines(ranked: &[(&Chunk, f64)]) -> Vec<String> {
    let rows: Vec<&Chunk> = ranked
        .iter()
        .map(|(c, _)| *c)
        .filter(|c| matches!(c.kind(), Some(kind::EMPLOYMENT) | Some(kind::SALARY)))
        .collect();

    let rates: Vec<f64> = rows.iter().filter_map(|c| c.meta_f64("employment_rate")).collect();
    let salaries: Vec<f64> = rows.iter().filter_map(|c| c.meta_f64("median_salary")).collect();

    let mut out = Vec::new();
    if let Some(avg) = mean(&rates) {
        out.push(format!(
            "Across {} matching records, the average employment rate is {avg:.1}%.",
            rates.len()
        ));
    }
    if let Some(avg) = mean(&salaries) {
        out.push(format!(
            "Across {} matching records, the average median salary is {avg:.0}.",
            salaries.len()
        ));
    }
    out
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn clip_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

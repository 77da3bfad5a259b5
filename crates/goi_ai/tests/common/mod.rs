#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use goi_ai::embeddings::Embedder;
use goi_ai::lexical::tokenize;
use goi_ai::llm::Llm;
use goi_ai::GenerativeCapability;
use goi_core::cache::ManualClock;
use goi_core::domain::{RawRecord, ReportDocument};
use goi_core::error::{AppError, AI_EMBEDDING_UNAVAILABLE, AI_GENERATION_TIMEOUT};
use time::{Duration, OffsetDateTime};

pub const EMBED_MODEL: &str = "test-embed";
pub const GENERATE_MODEL: &str = "test-generate";

const VOCAB: &[&str] = &[
    "engineering", "arts", "salary", "employment", "rate", "average", "2024", "career",
    "internships", "technology",
];

/// Bag-of-words over a fixed vocabulary plus a bias dimension, so no vector is all zeros.
pub struct KeywordEmbedder {
    calls: AtomicUsize,
    fail_calls: Mutex<BTreeSet<usize>>,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_calls: Mutex::new(BTreeSet::new()),
        }
    }

    /// Fail the given 1-based call numbers.
    pub fn failing_on(calls: &[usize]) -> Self {
        let e = Self::new();
        e.fail_calls.lock().expect("lock").extend(calls.iter().copied());
        e
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for KeywordEmbedder {
    fn embed(&self, _model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_calls.lock().expect("lock").contains(&n) {
            return Err(AppError::new(AI_EMBEDDING_UNAVAILABLE, "embedding backend down")
                .with_details(format!("call={n}"))
                .with_retryable(true));
        }
        let tokens = tokenize(input);
        let mut v: Vec<f32> = VOCAB
            .iter()
            .map(|w| tokens.iter().filter(|t| t.as_str() == *w).count() as f32)
            .collect();
        v.push(0.1);
        Ok(v)
    }
}

pub enum LlmBehavior {
    Reply(String),
    Fail(&'static str),
}

pub struct ScriptedLlm {
    behavior: LlmBehavior,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            behavior: LlmBehavior::Reply(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(code: &'static str) -> Self {
        Self {
            behavior: LlmBehavior::Fail(code),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn timing_out() -> Self {
        Self::failing(AI_GENERATION_TIMEOUT)
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().expect("lock").len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().expect("lock").last().cloned()
    }
}

impl Llm for ScriptedLlm {
    fn generate(&self, _model: &str, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().expect("lock").push(prompt.to_string());
        match &self.behavior {
            LlmBehavior::Reply(text) => Ok(text.clone()),
            LlmBehavior::Fail(code) => Err(AppError::new(*code, "generation failed").with_retryable(true)),
        }
    }
}

pub fn capability(embedder: Arc<KeywordEmbedder>, llm: Arc<ScriptedLlm>) -> GenerativeCapability {
    GenerativeCapability::new(embedder, llm, EMBED_MODEL, GENERATE_MODEL)
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH + Duration::days(20_000)))
}

pub fn report(id: &str, text: &str) -> RawRecord {
    RawRecord::Report(ReportDocument {
        id: id.to_string(),
        text: text.to_string(),
        source: format!("{id} report"),
        kind: "web_content".to_string(),
        date: None,
    })
}

/// The two-chunk Engineering/Arts corpus.
pub fn two_chunk_records() -> Vec<RawRecord> {
    vec![
        report("engineering", "Engineering 2024 employment rate 92%"),
        report("arts", "Arts 2024 employment rate 81%"),
    ]
}

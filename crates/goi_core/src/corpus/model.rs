use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetaValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl MetaValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Int(v) => Some(*v as f64),
            MetaValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        MetaValue::Text(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        MetaValue::Text(v)
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        MetaValue::Int(v)
    }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        MetaValue::Float(v)
    }
}

/// Chunk kinds written into `metadata["kind"]`.
pub mod kind {
    pub const EMPLOYMENT: &str = "employment";
    pub const SALARY: &str = "salary";
    pub const EMPLOYMENT_SUMMARY: &str = "employment_summary";
    pub const SALARY_SUMMARY: &str = "salary_summary";
    pub const SUPPORT_SERVICES: &str = "support_services";
    pub const REPORT: &str = "report";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub source: String,
    pub metadata: BTreeMap<String, MetaValue>,
}

impl Chunk {
    pub fn kind(&self) -> Option<&str> {
        self.metadata.get("kind").and_then(MetaValue::as_str)
    }

    pub fn meta_f64(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(MetaValue::as_f64)
    }
}

/// Immutable, versioned snapshot of chunks.
///
/// Chunk order is insertion order and is the tie-breaker for every ranking.
#[derive(Debug, Clone)]
pub struct Corpus {
    version: u64,
    fingerprint: String,
    chunks: Vec<Chunk>,
    positions: HashMap<String, usize>,
}

impl Corpus {
    pub(crate) fn from_parts(version: u64, fingerprint: String, chunks: Vec<Chunk>) -> Self {
        let positions = chunks
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        Self {
            version,
            fingerprint,
            chunks,
            positions,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Content hash over chunk ids, sources and texts; independent of `version`.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, chunk_id: &str) -> Option<&Chunk> {
        self.position(chunk_id).map(|i| &self.chunks[i])
    }

    pub fn position(&self, chunk_id: &str) -> Option<usize> {
        self.positions.get(chunk_id).copied()
    }
}

use std::collections::{BTreeMap, BTreeSet};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::ChunkingConfig;
use crate::domain::{EmploymentRecord, RawRecord, ReportDocument, SalaryRecord};
use crate::error::{AppError, CORPUS_BUILD_FAILED};

use super::chunking::chunk_text;
use super::model::{kind, Chunk, Corpus, MetaValue};
use super::templates::{
    employment_sentence, employment_summaries, salary_sentence, salary_summaries, support_sentence,
    ChunkDraft,
};

const CHUNK_ID_HEX_LEN: usize = 16;

#[derive(Debug, Clone)]
pub struct CorpusBuilder {
    max_tokens: usize,
}

impl CorpusBuilder {
    pub fn new(cfg: &ChunkingConfig) -> Self {
        Self {
            max_tokens: cfg.max_tokens.max(1),
        }
    }

    /// Deterministically convert raw records into a Corpus tagged with `version`.
    ///
    /// All-or-nothing: any invalid record fails the whole build.
    pub fn build(&self, records: &[RawRecord], version: u64) -> Result<Corpus, AppError> {
        if records.is_empty() {
            return Err(AppError::new(
                CORPUS_BUILD_FAILED,
                "No records to build a corpus from",
            ));
        }

        let mut drafts: Vec<ChunkDraft> = Vec::new();
        let mut employment: Vec<&EmploymentRecord> = Vec::new();
        let mut salary: Vec<&SalaryRecord> = Vec::new();

        for (i, rec) in records.iter().enumerate() {
            match rec {
                RawRecord::Employment(r) => {
                    validate_row(
                        i,
                        &r.institution,
                        &r.degree,
                        &[
                            ("employment_rate", Some(r.employment_rate)),
                            ("median_salary", r.median_salary),
                        ],
                    )?;
                    drafts.push(employment_sentence(r));
                    employment.push(r);
                }
                RawRecord::Salary(r) => {
                    validate_row(
                        i,
                        &r.institution,
                        &r.degree,
                        &[
                            ("median_salary", Some(r.median_salary)),
                            ("employment_rate", r.employment_rate),
                            ("salary_percentile_25", r.salary_percentile_25),
                            ("salary_percentile_75", r.salary_percentile_75),
                        ],
                    )?;
                    drafts.push(salary_sentence(r));
                    salary.push(r);
                }
                RawRecord::SupportServices(r) => {
                    if r.institution.trim().is_empty() {
                        return Err(AppError::new(CORPUS_BUILD_FAILED, "Support services record is missing an institution")
                            .with_details(format!("record_index={i}")));
                    }
                    drafts.push(support_sentence(r));
                }
                RawRecord::Report(doc) => drafts.extend(self.report_passages(doc)),
            }
        }

        drafts.extend(employment_summaries(&employment));
        drafts.extend(salary_summaries(&salary));

        if drafts.is_empty() {
            return Err(AppError::new(
                CORPUS_BUILD_FAILED,
                "Records produced no indexable text",
            )
            .with_details(format!("records={}", records.len())));
        }

        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut chunks: Vec<Chunk> = Vec::with_capacity(drafts.len());
        for (ordinal, d) in drafts.into_iter().enumerate() {
            let id = chunk_id(&d.source, ordinal, &d.text);
            if !seen.insert(id.clone()) {
                return Err(AppError::new(CORPUS_BUILD_FAILED, "Duplicate chunk id")
                    .with_details(format!("chunk_id={id}; ordinal={ordinal}")));
            }
            chunks.push(Chunk {
                id,
                text: d.text,
                source: d.source,
                metadata: d.metadata,
            });
        }

        let fingerprint = fingerprint(&chunks);
        debug!(version, chunks = chunks.len(), "corpus built");
        Ok(Corpus::from_parts(version, fingerprint, chunks))
    }

    fn report_passages(&self, doc: &ReportDocument) -> Vec<ChunkDraft> {
        chunk_text(&doc.text, self.max_tokens)
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| {
                let mut metadata = BTreeMap::new();
                metadata.insert("kind".to_string(), MetaValue::from(kind::REPORT));
                metadata.insert("report_id".to_string(), MetaValue::from(doc.id.as_str()));
                metadata.insert("report_kind".to_string(), MetaValue::from(doc.kind.as_str()));
                metadata.insert("ordinal".to_string(), MetaValue::from(ordinal as i64));
                if let Some(d) = doc.date.as_ref() {
                    metadata.insert("date".to_string(), MetaValue::from(d.as_str()));
                }
                ChunkDraft {
                    source: doc.source.clone(),
                    text,
                    metadata,
                }
            })
            .collect()
    }
}

fn validate_row(
    index: usize,
    institution: &str,
    degree: &str,
    numbers: &[(&str, Option<f64>)],
) -> Result<(), AppError> {
    if institution.trim().is_empty() || degree.trim().is_empty() {
        return Err(AppError::new(
            CORPUS_BUILD_FAILED,
            "Tabular record is missing institution or degree",
        )
        .with_details(format!("record_index={index}")));
    }
    for (field, value) in numbers {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(AppError::new(CORPUS_BUILD_FAILED, "Tabular record has a non-finite value")
                    .with_details(format!("record_index={index}; field={field}; value={v}")));
            }
        }
    }
    Ok(())
}

fn chunk_id(source: &str, ordinal: usize, text: &str) -> String {
    let payload = format!("source={source}\nordinal={ordinal}\ntext={text}");
    let digest = Sha256::digest(payload.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(CHUNK_ID_HEX_LEN);
    id
}

fn fingerprint(chunks: &[Chunk]) -> String {
    let mut hasher = Sha256::new();
    for c in chunks {
        hasher.update(c.id.as_bytes());
        hasher.update(b"\n");
        hasher.update(c.source.as_bytes());
        hasher.update(b"\n");
        hasher.update(c.text.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

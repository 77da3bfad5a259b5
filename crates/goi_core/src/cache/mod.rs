//! Response cache for answered queries.
//!
//! Provides:
//! - Single process-wide TTL (default one hour) with an injectable clock
//! - Keys over normalized query, corpus version, method preference and k
//! - Explicit invalidation when the corpus version changes
//! - Oldest-first eviction past `max_entries`
//! - Lock failures degrade to "always miss"

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use tracing::warn;

use crate::answer::AnswerRecord;
use crate::config::CacheConfig;

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<OffsetDateTime>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(query: &str, corpus_version: u64, prefer_semantic: bool, k: usize) -> Self {
        let payload = format!(
            "q={}\nv={corpus_version}\nsemantic={prefer_semantic}\nk={k}",
            normalize_query(query)
        );
        Self(hex::encode(Sha256::digest(payload.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct CacheEntry {
    value: AnswerRecord,
    expires_at: OffsetDateTime,
    seq: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    next_seq: u64,
}

/// Cache statistics for status reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub ttl_seconds: u64,
    pub max_entries: usize,
    pub enabled: bool,
}

pub struct ResponseCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    max_entries: usize,
    enabled: bool,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(cfg: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            ttl: Duration::seconds(i64::try_from(cfg.ttl_seconds).unwrap_or(i64::MAX)),
            max_entries: cfg.max_entries.max(1),
            enabled: cfg.enabled,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> Option<MutexGuard<'_, CacheState>> {
        match self.state.lock() {
            Ok(g) => Some(g),
            Err(e) => {
                warn!(error = %e, "response cache lock poisoned; treating as miss");
                None
            }
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<AnswerRecord> {
        if !self.enabled {
            return None;
        }
        let now = self.clock.now();
        let mut state = self.lock()?;
        let expired = match state.entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            state.entries.remove(key);
        }
        None
    }

    pub fn put(&self, key: CacheKey, record: AnswerRecord, ttl: Duration) {
        if !self.enabled {
            return;
        }
        let Some(expires_at) = self.clock.now().checked_add(ttl) else {
            warn!(ttl_seconds = ttl.whole_seconds(), "cache ttl out of range; not storing");
            return;
        };
        let max_entries = self.max_entries;
        let Some(mut state) = self.lock() else {
            return;
        };
        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            key,
            CacheEntry {
                value: record,
                expires_at,
                seq,
            },
        );
        while state.entries.len() > max_entries {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, e)| e.seq)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    state.entries.remove(&k);
                }
                None => break,
            }
        }
    }

    /// Store with the process-wide TTL.
    pub fn put_default(&self, key: CacheKey, record: AnswerRecord) {
        self.put(key, record, self.ttl);
    }

    /// Drop every entry answered against a corpus version other than `version`.
    pub fn retain_version(&self, version: u64) -> usize {
        let Some(mut state) = self.lock() else {
            return 0;
        };
        let before = state.entries.len();
        state.entries.retain(|_, e| e.value.corpus_version == version);
        before - state.entries.len()
    }

    /// Drop every entry; returns how many were removed.
    pub fn invalidate_all(&self) -> usize {
        let Some(mut state) = self.lock() else {
            return 0;
        };
        let dropped = state.entries.len();
        state.entries.clear();
        dropped
    }

    /// Live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        let Some(mut state) = self.lock() else {
            return 0;
        };
        state.entries.retain(|_, e| now < e.expires_at);
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            ttl_seconds: u64::try_from(self.ttl.whole_seconds()).unwrap_or(0),
            max_entries: self.max_entries,
            enabled: self.enabled,
        }
    }
}

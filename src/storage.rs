//! Key-value capability consumed by session, CSRF and rate-limit middleware.

use crate::error::BoxError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Byte store shared across requests. Values are opaque to the core.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError>;

    /// Stores `value`; a `ttl` of `None` never expires.
    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), BoxError>;

    fn delete(&self, key: &str) -> Result<(), BoxError>;

    /// Removes every key.
    fn reset(&self) -> Result<(), BoxError>;
}

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// Writes between two sweeps of expired entries.
const SWEEP_INTERVAL: usize = 64;

#[derive(Default)]
struct Slots {
    entries: HashMap<String, Entry>,
    writes: usize,
}

impl Slots {
    fn sweep(&mut self, now: Instant) {
        self.entries.retain(|_, entry| !entry.is_expired(now));
        self.writes = 0;
    }
}

/// In-process [`Storage`] guarded by a single mutex. Expired keys are
/// dropped on access and swept periodically on writes, so keys
/// that are never read again do not pile up.
#[derive(Default)]
pub struct MemoryStorage {
    slots: Mutex<Slots>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        // A panicking writer cannot leave an entry half-written.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError> {
        let mut slots = self.lock();
        let now = Instant::now();
        match slots.entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                slots.entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), BoxError> {
        let now = Instant::now();
        let mut slots = self.lock();
        slots.writes += 1;
        if slots.writes >= SWEEP_INTERVAL {
            slots.sweep(now);
        }
        slots.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: ttl.map(|ttl| now + ttl),
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), BoxError> {
        self.lock().entries.remove(key);
        Ok(())
    }

    fn reset(&self) -> Result<(), BoxError> {
        let mut slots = self.lock();
        slots.entries.clear();
        slots.writes = 0;
        Ok(())
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

//! Key-value cache with per-key expiry.
//!
//! There is no process-wide instance. Whoever needs a cache receives one
//! (usually as `Arc<dyn Cache>`) from the code that builds the application.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Cache errors.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// String-keyed byte cache.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store `value`; `None` keeps it until deleted.
    fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>);

    /// Remove `key`, returning whether it was present.
    fn delete(&self, key: &str) -> bool;

    fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// JSON helpers over any [`Cache`].
pub trait CacheExt: Cache {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        match self.get(key) {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.set(key, bytes, ttl);
        Ok(())
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}

struct Slot {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Slot {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// In-process cache.
#[derive(Default)]
pub struct MemoryCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.slots().values().filter(|slot| slot.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired key.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.slots().retain(|_, slot| slot.is_live(now));
    }

    // A panic while holding the lock cannot leave a half-written map entry.
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut slots = self.slots();
        match slots.get(key) {
            Some(slot) if slot.is_live(Instant::now()) => Some(slot.value.clone()),
            Some(_) => {
                slots.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.slots()
            .insert(key.to_string(), Slot { value, expires_at });
    }

    fn delete(&self, key: &str) -> bool {
        self.slots().remove(key).is_some()
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Time-to-live result cache.
//!
//! Each key owns a slot guarded by an async mutex. The first caller for a
//! missing or expired key computes the value while holding the slot lock;
//! concurrent callers for the same key wait on that lock and then read the
//! fresh value, so at most one computation per key is in flight. A failed
//! computation is shared with the callers queued behind it and its slot is
//! dropped; it is never served to later requests. Expired and empty slots
//! are swept at most once per time to live.
//!
//! Keys are rendered as `operation|id1,id2|k1=v1&k2=v2` with identifiers
//! sorted and de-duplicated and parameters sorted by name, so logically
//! equal requests share an entry regardless of argument order.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

/// Default time to live of a cache entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Canonical cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: String,
    identifiers: BTreeSet<String>,
    params: BTreeMap<String, String>,
}

impl CacheKey {
    /// Starts a key for `operation`.
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            identifiers: BTreeSet::new(),
            params: BTreeMap::new(),
        }
    }

    /// Adds location identifiers. Order and duplicates are irrelevant.
    #[must_use]
    pub fn with_identifiers<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.identifiers
            .extend(identifiers.into_iter().map(|s| s.as_ref().trim().to_string()));
        self
    }

    /// Adds a parameter. Values are trimmed and lowercased.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.params.insert(
            name.trim().to_ascii_lowercase(),
            value.to_string().trim().to_ascii_lowercase(),
        );
        self
    }

    /// Adds a parameter only when present.
    #[must_use]
    pub fn with_optional_param<T: fmt::Display>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with_param(name, v),
            None => self,
        }
    }

    /// The operation this key belongs to.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = self
            .identifiers
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let params = self
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        write!(f, "{}|{ids}|{params}", self.operation)
    }
}

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

enum SlotState<V> {
    Empty,
    Ready(Entry<V>),
    /// The computation failed. The slot is already detached from the map;
    /// callers that were queued on it share this error.
    Failed(Arc<dyn Any + Send + Sync>),
}

impl<V> Default for SlotState<V> {
    fn default() -> Self {
        Self::Empty
    }
}

type Slot<V> = Arc<tokio::sync::Mutex<SlotState<V>>>;

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Entries holding a value that has not expired.
    pub live_entries: usize,
    /// Entries whose value has expired.
    pub expired_entries: usize,
    /// Keys with a computation currently in flight.
    pub in_flight: usize,
    /// Slots that hold nothing yet.
    pub empty_slots: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compute.
    pub misses: u64,
    /// Configured time to live in seconds.
    pub ttl_seconds: u64,
}

/// TTL cache with single-flight computation.
pub struct TtlCache<V> {
    ttl: Duration,
    slots: Mutex<HashMap<String, Slot<V>>>,
    last_sweep: Mutex<Instant>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("slots", &self.len())
            .finish_non_exhaustive()
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V> TtlCache<V> {
    /// Creates an empty cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
            last_sweep: Mutex::new(Instant::now()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Configured time to live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of key slots currently held, whatever their state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    /// Whether no key slots are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_slots().is_empty()
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &str) -> Slot<V> {
        self.lock_slots().entry(key.to_string()).or_default().clone()
    }

    /// Removes `slot` from the map if it is still the one stored for `key`.
    fn detach(&self, key: &str, slot: &Slot<V>) {
        let mut slots = self.lock_slots();
        if slots.get(key).is_some_and(|s| Arc::ptr_eq(s, slot)) {
            slots.remove(key);
        }
    }

    /// Runs [`Self::purge_expired`] at most once per time to live.
    fn sweep_if_due(&self) {
        let mut last = self
            .last_sweep
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if last.elapsed() < self.ttl {
            return;
        }
        *last = Instant::now();
        drop(last);

        let removed = self.purge_expired();
        if removed > 0 {
            log::debug!("Cache sweep removed {removed} stale slots");
        }
    }

    /// Removes every entry and returns how many there were.
    pub fn clear(&self) -> usize {
        let mut slots = self.lock_slots();
        let count = slots.len();
        slots.clear();
        drop(slots);
        log::info!("Cache cleared ({count} entries)");
        count
    }

    /// Drops slots that hold no value or an expired one. Slots that a
    /// caller is computing or waiting on are kept.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut slots = self.lock_slots();
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            slot.try_lock().is_ok_and(|state| {
                matches!(&*state, SlotState::Ready(e) if e.stored_at.elapsed() < ttl)
            })
        });
        before - slots.len()
    }

    /// Counts live, expired, in-flight and empty slots.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let ttl = self.ttl;
        let (mut live, mut expired, mut in_flight, mut empty) = (0, 0, 0, 0);
        for slot in self.lock_slots().values() {
            match slot.try_lock() {
                Ok(state) => match &*state {
                    SlotState::Ready(e) if e.stored_at.elapsed() < ttl => live += 1,
                    SlotState::Ready(_) => expired += 1,
                    SlotState::Empty | SlotState::Failed(_) => empty += 1,
                },
                Err(_) => in_flight += 1,
            }
        }
        CacheStats {
            live_entries: live,
            expired_entries: expired,
            in_flight,
            empty_slots: empty,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ttl_seconds: ttl.as_secs(),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    /// Returns the cached value for `key` if it has not expired.
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        let slot = self.lock_slots().get(&key.to_string()).cloned()?;
        let state = slot.lock().await;
        match &*state {
            SlotState::Ready(e) if e.stored_at.elapsed() < self.ttl => Some(e.value.clone()),
            _ => None,
        }
    }

    /// Returns the cached value for `key`, computing and storing it with
    /// `compute` when missing or expired.
    ///
    /// Concurrent callers for the same key wait for the single in-flight
    /// computation and receive its outcome. A failure is handed to every
    /// caller that was waiting on it and is then forgotten, so the next
    /// request for the key computes afresh.
    ///
    /// # Errors
    ///
    /// Returns the error `compute` produced, shared between all callers
    /// that waited on that computation.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: &CacheKey,
        compute: F,
    ) -> Result<V, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Send + Sync + 'static,
    {
        let rendered = key.to_string();
        let slot = self.slot(&rendered);
        let mut state = slot.lock().await;

        match &*state {
            SlotState::Ready(e) if e.stored_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                log::debug!("Cache hit: {rendered}");
                return Ok(e.value.clone());
            }
            SlotState::Failed(err) => {
                if let Ok(err) = Arc::clone(err).downcast::<E>() {
                    log::debug!("Cache shared failure: {rendered}");
                    return Err(err);
                }
            }
            SlotState::Ready(_) | SlotState::Empty => {}
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("Cache miss: {rendered}");
        self.sweep_if_due();

        match compute().await {
            Ok(value) => {
                *state = SlotState::Ready(Entry {
                    value: value.clone(),
                    stored_at: Instant::now(),
                });
                Ok(value)
            }
            Err(err) => {
                let err = Arc::new(err);
                *state = SlotState::Failed(Arc::clone(&err) as Arc<dyn Any + Send + Sync>);
                self.detach(&rendered, &slot);
                Err(err)
            }
        }
    }
}

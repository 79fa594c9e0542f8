//! Bounded, single-flight cache of resolved bundles.
//!
//! Every key owns a `tokio::sync::OnceCell`. The first request for a key runs
//! the computation; requests arriving while it is in flight await the same
//! cell instead of starting their own fan-out. If the computing request is
//! dropped, one of the waiters takes over.
//!
//! The cache holds at most `capacity` keys and evicts the least recently used
//! completed one when full. In-flight computations are never evicted; if every
//! slot is in flight the cache briefly grows past `capacity`. An optional TTL,
//! counted from when a computation finished, forces recomputation of stale
//! entries.

use crate::i18n::Bundle;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::debug;

/// How a lookup was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from a completed entry
    Hit,
    /// Computed by this request
    Miss,
    /// Served by another request's in-flight computation
    Coalesced,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Coalesced => "coalesced",
        }
    }
}

/// Cache key for one locale and namespace.
pub fn cache_key(locale: &str, namespace: &str) -> String {
    format!("{}:{}", locale, namespace)
}

struct Entry {
    bundle: Arc<Bundle>,
    completed_at: Instant,
}

type Cell = Arc<OnceCell<Entry>>;

struct Slot {
    cell: Cell,
    last_used: u64,
}

#[derive(Default)]
struct Slots {
    entries: HashMap<String, Slot>,
    clock: u64,
}

pub struct BundleCache {
    slots: Mutex<Slots>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl BundleCache {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            slots: Mutex::new(Slots::default()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock()
            .entries
            .get(key)
            .is_some_and(|slot| slot.cell.initialized() && !self.is_expired(slot))
    }

    /// Drop every entry. Computations already in flight finish for their
    /// own waiters but are not stored.
    pub fn clear(&self) -> usize {
        let mut slots = self.lock();
        let removed = slots.entries.len();
        slots.entries.clear();
        removed
    }

    /// Return the bundle for `key`, running `resolve` only if no completed or
    /// in-flight entry exists.
    pub async fn get_or_resolve<F, Fut>(&self, key: &str, resolve: F) -> (Arc<Bundle>, CacheStatus)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Bundle>,
    {
        let cell = self.cell_for(key);

        if let Some(entry) = cell.get() {
            return (entry.bundle.clone(), CacheStatus::Hit);
        }

        let mut computed = false;
        let bundle = cell
            .get_or_init(|| {
                computed = true;
                let fut = resolve();
                async move {
                    let bundle = Arc::new(fut.await);
                    Entry {
                        bundle,
                        completed_at: Instant::now(),
                    }
                }
            })
            .await
            .bundle
            .clone();

        let status = if computed {
            CacheStatus::Miss
        } else {
            CacheStatus::Coalesced
        };
        (bundle, status)
    }

    /// Find or create the cell for `key`, evicting stale and surplus entries.
    fn cell_for(&self, key: &str) -> Cell {
        let mut slots = self.lock();
        slots.clock += 1;
        let now = slots.clock;

        if let Some(slot) = slots.entries.get_mut(key) {
            if !self.is_expired(slot) {
                slot.last_used = now;
                return slot.cell.clone();
            }
            debug!(key, "Cache entry expired");
            slots.entries.remove(key);
        }

        while slots.entries.len() >= self.capacity {
            let Some(oldest) = slots
                .entries
                .iter()
                .filter(|(_, slot)| slot.cell.initialized())
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(k, _)| k.clone())
            else {
                debug!(key, "Every cache slot is in flight, growing past capacity");
                break;
            };
            debug!(key = %oldest, "Evicting least recently used cache entry");
            slots.entries.remove(&oldest);
        }

        let cell: Cell = Arc::new(OnceCell::new());
        slots.entries.insert(
            key.to_string(),
            Slot {
                cell: cell.clone(),
                last_used: now,
            },
        );
        cell
    }

    fn is_expired(&self, slot: &Slot) -> bool {
        match (self.ttl, slot.cell.get()) {
            (Some(ttl), Some(entry)) => entry.completed_at.elapsed() >= ttl,
            _ => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        // The map stays consistent across a panic in another holder.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

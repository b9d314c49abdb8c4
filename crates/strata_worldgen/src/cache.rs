//! # Striped Single-Flight Cache
//!
//! Shared by every generation worker. Keys map to one of a fixed array of
//! lock stripes via `|hash(key)| mod stripes`.
//!
//! ## Single Flight
//!
//! ```text
//!   lookup  ── shared stripe lock ──> published slot? ──> return Arc
//!   miss    ── exclusive stripe lock ──> insert empty slot ──> unlock
//!   build   ── slot.get_or_init(generate)   (no stripe lock held)
//! ```
//!
//! The empty slot is the in-flight placeholder. `OnceLock` runs the
//! generator exactly once; concurrent callers for the same key block on
//! the slot, not the stripe, and all of them receive the same `Arc`.
//! Unrelated keys sharing a stripe only contend for the short map insert.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

/// A slot that is either in flight (empty) or published.
type Slot<V> = Arc<OnceLock<Arc<V>>>;

/// Bounded keyed cache with striped locking and single-flight generation.
pub struct StripedCache<K, V> {
    stripes: Box<[RwLock<HashMap<K, Slot<V>>>]>,
    limit: usize,
    generations: AtomicU64,
    name: &'static str,
}

impl<K, V> StripedCache<K, V>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
{
    /// Creates a cache.
    ///
    /// `stripes` is clamped to at least 1. `limit` is the entry count a
    /// maintenance tick tolerates before clearing everything.
    #[must_use]
    pub fn new(name: &'static str, stripes: usize, limit: usize) -> Self {
        let stripes = (0..stripes.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            stripes,
            limit,
            generations: AtomicU64::new(0),
            name,
        }
    }

    /// Stripe index for a key.
    #[inline]
    fn stripe_of(&self, key: &K) -> usize {
        // DefaultHasher::new() uses fixed keys, so stripe choice is stable
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }

    /// Returns the cached value, generating it on a miss.
    ///
    /// At most one `generate` call runs per key while the entry lives;
    /// every concurrent caller receives the same `Arc`.
    pub fn get_or_generate<F>(&self, key: K, generate: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        let stripe = &self.stripes[self.stripe_of(&key)];

        // Fast path: published entries only need the shared lock
        let existing = stripe.read().get(&key).cloned();
        let slot = match existing {
            Some(slot) => slot,
            None => Arc::clone(stripe.write().entry(key).or_default()),
        };

        if let Some(value) = slot.get() {
            return Arc::clone(value);
        }

        let value = slot.get_or_init(|| {
            self.generations.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("{}: generating {:?}", self.name, key);
            Arc::new(generate())
        });
        Arc::clone(value)
    }

    /// Returns the entry if it is published.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let stripe = &self.stripes[self.stripe_of(key)];
        let slot = stripe.read().get(key).cloned()?;
        slot.get().cloned()
    }

    /// Number of entries (published or in flight).
    #[must_use]
    pub fn len(&self) -> usize {
        self.stripes.iter().map(|s| s.read().len()).sum()
    }

    /// Returns true if the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stripes.iter().all(|s| s.read().is_empty())
    }

    /// Total generator runs since creation.
    #[must_use]
    pub fn generations(&self) -> u64 {
        self.generations.load(Ordering::Relaxed)
    }

    /// Configured entry limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drops every entry. Callers holding an `Arc` keep their value.
    pub fn clear(&self) {
        for stripe in self.stripes.iter() {
            stripe.write().clear();
        }
    }

    /// Maintenance tick: clears the whole cache once it exceeds its limit.
    ///
    /// Returns true if the cache was cleared.
    pub fn maintain(&self) -> bool {
        let len = self.len();
        if len <= self.limit {
            return false;
        }
        self.clear();
        tracing::info!("{}: cleared {} entries (limit {})", self.name, len, self.limit);
        true
    }
}

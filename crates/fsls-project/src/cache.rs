//! Memoizing, single-flight cache of resolution results.
//!
//! Each [`ProjectId`] maps to a [`CacheEntry`] that moves through
//! `Uncomputed -> InProgress(thread) -> Done(value)`. The map itself is only
//! locked to look up, insert, or remove an entry; the supplier always runs
//! with no cache lock held. A second caller that finds an entry in progress
//! blocks on that entry until the first caller finishes.
//!
//! Waiting on an in-progress entry is where a cyclic reference graph would
//! deadlock, so every wait is recorded in a small waits-for graph. Before
//! blocking, a caller follows the chain `owner -> entry it waits on -> that
//! entry's owner -> ...`; if the chain comes back to the caller, the wait is
//! refused with [`Cycle`]. Re-entering an entry the current thread is already
//! computing is the one-step case of the same check.
//!
//! A supplier may read values that are invalidated before it returns. Every
//! in-progress entry records the identities invalidated while it runs, and
//! [`Cache::get_or_compute_checked`] refuses to publish a value derived from
//! one of them.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::thread;
use std::thread::ThreadId;

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::ProjectId;

/// Waiting on `id` would never finish: its computation (transitively)
/// waits on the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cyclic dependency on `{id}`")]
pub struct Cycle {
    pub id: ProjectId,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

enum EntryState<V> {
    Uncomputed,
    InProgress {
        owner: ThreadId,
        invalidated: Vec<ProjectId>,
    },
    Done(V),
}

/// One cached identity. Entries are never reused after invalidation; a fresh
/// entry replaces them.
pub struct CacheEntry<V> {
    id: ProjectId,
    serial: u64,
    state: Mutex<EntryState<V>>,
    ready: Condvar,
}

impl<V: Clone> CacheEntry<V> {
    fn new(id: ProjectId, serial: u64) -> Self {
        Self {
            id,
            serial,
            state: Mutex::new(EntryState::Uncomputed),
            ready: Condvar::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    /// The computed value, without forcing it.
    #[must_use]
    pub fn get(&self) -> Option<V> {
        match &*lock(&self.state) {
            EntryState::Done(value) => Some(value.clone()),
            EntryState::Uncomputed | EntryState::InProgress { .. } => None,
        }
    }

    #[must_use]
    pub fn is_computed(&self) -> bool {
        matches!(&*lock(&self.state), EntryState::Done(_))
    }
}

/// Who computes which entry, and which entry each blocked thread waits on.
#[derive(Default)]
struct WaitGraph {
    owners: FxHashMap<u64, ThreadId>,
    waiting: FxHashMap<ThreadId, u64>,
}

impl WaitGraph {
    /// Whether blocking `me` on an entry owned by `owner` closes a cycle.
    fn leads_back(&self, me: ThreadId, mut owner: ThreadId) -> bool {
        for _ in 0..=self.waiting.len() {
            if owner == me {
                return true;
            }
            let Some(serial) = self.waiting.get(&owner) else {
                return false;
            };
            let Some(next) = self.owners.get(serial) else {
                return false;
            };
            owner = *next;
        }
        false
    }
}

/// Resets an entry to `Uncomputed` if its supplier unwinds, so waiters are
/// not stranded.
struct InFlight<'a, V> {
    entry: &'a CacheEntry<V>,
    waits: &'a Mutex<WaitGraph>,
    completed: bool,
}

impl<V> InFlight<'_, V> {
    fn release(&self, next: EntryState<V>) {
        lock(self.waits).owners.remove(&self.entry.serial);
        *lock(&self.entry.state) = next;
        self.entry.ready.notify_all();
    }

    /// Publish `value` unless it derives from an identity invalidated while
    /// it was computed; then the entry goes back to `Uncomputed`. Returns
    /// whether the value was cached.
    fn complete(mut self, value: V, stale: impl Fn(&V, &ProjectId) -> bool) -> bool {
        self.completed = true;
        lock(self.waits).owners.remove(&self.entry.serial);
        let mut state = lock(&self.entry.state);
        let fresh = match &*state {
            EntryState::InProgress { invalidated, .. } => {
                !invalidated.iter().any(|changed| stale(&value, changed))
            }
            EntryState::Uncomputed | EntryState::Done(_) => true,
        };
        *state = if fresh {
            EntryState::Done(value)
        } else {
            EntryState::Uncomputed
        };
        drop(state);
        self.entry.ready.notify_all();
        fresh
    }
}

impl<V> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        if !self.completed {
            self.release(EntryState::Uncomputed);
        }
    }
}

pub struct Cache<V> {
    entries: DashMap<ProjectId, Arc<CacheEntry<V>>, FxBuildHasher>,
    waits: Mutex<WaitGraph>,
    next_serial: AtomicU64,
}

impl<V: Clone> Cache<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher::default()),
            waits: Mutex::new(WaitGraph::default()),
            next_serial: AtomicU64::new(0),
        }
    }

    /// The entry for `id`, created uncomputed if absent.
    pub fn get_or_create(&self, id: &ProjectId) -> Arc<CacheEntry<V>> {
        if let Some(entry) = self.entries.get(id) {
            return Arc::clone(entry.value());
        }
        let entry = self.entries.entry(id.clone()).or_insert_with(|| {
            let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
            Arc::new(CacheEntry::new(id.clone(), serial))
        });
        Arc::clone(entry.value())
    }

    /// The value for `id`, running `supplier` if nobody has computed it yet.
    ///
    /// Concurrent callers on the same uncomputed identity share one supplier
    /// run. Returns [`Cycle`] instead of blocking when the wait could never
    /// complete.
    pub fn get_or_compute(
        &self,
        id: &ProjectId,
        supplier: impl FnOnce(&ProjectId) -> V,
    ) -> Result<V, Cycle> {
        self.get_or_compute_checked(id, supplier, |_, _| false)
    }

    /// Like [`Cache::get_or_compute`], but a value for which
    /// `stale(value, changed)` holds for some identity `changed` invalidated
    /// while the supplier ran is returned to this caller without being
    /// cached. The next caller computes it again.
    pub fn get_or_compute_checked(
        &self,
        id: &ProjectId,
        supplier: impl FnOnce(&ProjectId) -> V,
        stale: impl Fn(&V, &ProjectId) -> bool,
    ) -> Result<V, Cycle> {
        let entry = self.get_or_create(id);
        self.force(&entry, supplier, stale)
    }

    fn force(
        &self,
        entry: &CacheEntry<V>,
        supplier: impl FnOnce(&ProjectId) -> V,
        stale: impl Fn(&V, &ProjectId) -> bool,
    ) -> Result<V, Cycle> {
        let me = thread::current().id();
        let mut state = lock(&entry.state);
        loop {
            match &*state {
                EntryState::Done(value) => {
                    tracing::trace!("Cache hit for {}", entry.id);
                    return Ok(value.clone());
                }
                EntryState::Uncomputed => {
                    *state = EntryState::InProgress {
                        owner: me,
                        invalidated: Vec::new(),
                    };
                    lock(&self.waits).owners.insert(entry.serial, me);
                    break;
                }
                EntryState::InProgress { owner, .. } => {
                    let owner = *owner;
                    {
                        let mut waits = lock(&self.waits);
                        if waits.leads_back(me, owner) {
                            tracing::debug!("Refusing to wait on {}: cycle", entry.id);
                            return Err(Cycle {
                                id: entry.id.clone(),
                            });
                        }
                        waits.waiting.insert(me, entry.serial);
                    }
                    tracing::debug!("Waiting on in-flight resolution of {}", entry.id);
                    state = entry
                        .ready
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                    lock(&self.waits).waiting.remove(&me);
                }
            }
        }
        drop(state);

        tracing::debug!("Cache miss for {}", entry.id);
        let in_flight = InFlight {
            entry,
            waits: &self.waits,
            completed: false,
        };
        let value = supplier(&entry.id);
        if !in_flight.complete(value.clone(), stale) {
            tracing::debug!("{} went stale while it was computed; not caching", entry.id);
        }
        Ok(value)
    }

    /// The computed value for `id`, if any. Never runs a supplier.
    #[must_use]
    pub fn peek(&self, id: &ProjectId) -> Option<V> {
        let entry = self.entries.get(id).map(|entry| Arc::clone(entry.value()))?;
        entry.get()
    }

    /// Drop the entry for `id` and note the change on every entry still in
    /// progress. Returns whether an entry was present.
    pub fn invalidate(&self, id: &ProjectId) -> bool {
        let removed = self.entries.remove(id).is_some();
        let entries: Vec<Arc<CacheEntry<V>>> = self
            .entries
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for entry in entries {
            if let EntryState::InProgress { invalidated, .. } = &mut *lock(&entry.state) {
                invalidated.push(id.clone());
            }
        }
        removed
    }

    /// Every entry that currently holds a value.
    #[must_use]
    pub fn computed(&self) -> Vec<(ProjectId, V)> {
        let entries: Vec<Arc<CacheEntry<V>>> = self
            .entries
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        entries
            .into_iter()
            .filter_map(|entry| entry.get().map(|value| (entry.id.clone(), value)))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for Cache<V> {
    fn default() -> Self {
        Self::new()
    }
}

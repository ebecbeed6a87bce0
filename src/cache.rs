//! A generic concurrent key/record store with size-bounded eviction
//! delegated to a swapper.
//!
//! Synchronization discipline: the table mutex guards lookups, insertions and
//! eviction decisions, but is released while a payload loads, so misses on
//! unrelated keys proceed fully concurrently. Concurrent misses on the same
//! key are serialized through a loading marker and a condvar, guaranteeing a
//! single load per key. Records carry an atomic owner count; eviction never
//! races with use because pinning requires the table lock while owner counts
//! only ever decrease outside it.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};

use errors::*;

/// Loads and releases payloads on behalf of a `SwapCache`, and decides when
/// the cache is over budget.
pub trait CacheSwapper: Send + Sync {
    type Key: Clone + Eq + Hash + Debug;
    type Payload: Send + Sync;

    /// Materialize the payload for `key`. A failure is surfaced to every
    /// caller currently waiting on this key.
    fn load(&self, key: &Self::Key) -> Result<Self::Payload>;

    /// Release a record's payload. Returns `false` to refuse: the record is
    /// still owned and must not be evicted.
    fn unload(&self, key: &Self::Key, record: &CacheRecord<Self::Payload>) -> bool;

    /// Unconditionally release a record's payload during cache teardown,
    /// after all consumers have stopped.
    fn teardown(&self, key: &Self::Key, record: &CacheRecord<Self::Payload>);

    /// Whether the resources held by resident payloads exceed the budget.
    fn is_full(&self) -> bool;
}

/// A resident cache entry: the payload plus its owner count and a recency
/// stamp for eviction ordering.
pub struct CacheRecord<P> {
    payload: P,
    owners: AtomicU32,
    last_use: AtomicU64,
}

impl<P> CacheRecord<P> {
    fn new(payload: P, tick: u64) -> CacheRecord<P> {
        CacheRecord {
            payload,
            owners: AtomicU32::new(1),
            last_use: AtomicU64::new(tick),
        }
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Number of pins currently held on this record.
    pub fn owners(&self) -> u32 {
        self.owners.load(Ordering::SeqCst)
    }
}

enum Slot<P> {
    /// Another thread is loading this key; wait on the cache condvar.
    Loading,
    Resident(Arc<CacheRecord<P>>),
}

/// Scoped owner handle for a cache entry. Holding a pin keeps the record
/// safe from eviction; dropping it releases the entry (eviction becomes
/// possible again, but nothing is evicted eagerly).
pub struct CachePin<'a, S>
where
    S: CacheSwapper + 'a,
{
    record: Arc<CacheRecord<S::Payload>>,
    _cache: &'a SwapCache<S>,
}

impl<'a, S: CacheSwapper> Deref for CachePin<'a, S> {
    type Target = S::Payload;

    fn deref(&self) -> &S::Payload {
        &self.record.payload
    }
}

impl<'a, S: CacheSwapper> Drop for CachePin<'a, S> {
    fn drop(&mut self) {
        self.record.owners.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct SwapCache<S: CacheSwapper> {
    swapper: S,
    table: Mutex<HashMap<S::Key, Slot<S::Payload>>>,
    load_done: Condvar,
    use_clock: AtomicU64,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl<S: CacheSwapper> SwapCache<S> {
    pub fn new(swapper: S) -> SwapCache<S> {
        SwapCache {
            swapper,
            table: Mutex::new(HashMap::new()),
            load_done: Condvar::new(),
            use_clock: AtomicU64::new(0),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }

    /// Look up `key`, loading it through the swapper on a miss. The returned
    /// pin keeps the record resident until it is dropped.
    pub fn get(&self, key: &S::Key) -> Result<CachePin<S>> {
        {
            let mut table = self.table.lock();
            loop {
                let resident = match table.get(key) {
                    Some(&Slot::Resident(ref record)) => {
                        record.owners.fetch_add(1, Ordering::SeqCst);
                        record.last_use.store(self.tick(), Ordering::Relaxed);
                        Some(Arc::clone(record))
                    }
                    Some(&Slot::Loading) => None,
                    None => break,
                };
                match resident {
                    Some(record) => {
                        self.hit_count.fetch_add(1, Ordering::Relaxed);
                        return Ok(CachePin {
                                      record,
                                      _cache: self,
                                  });
                    }
                    // Someone else is loading this key; wait for them, then
                    // look again.
                    None => self.load_done.wait(&mut table),
                }
            }
            self.miss_count.fetch_add(1, Ordering::Relaxed);
            table.insert(key.clone(), Slot::Loading);
        }

        // The table lock is released while the payload loads so that lookups
        // of unrelated keys stay fully concurrent.
        let loaded = self.swapper.load(key);

        let mut table = self.table.lock();
        match loaded {
            Ok(payload) => {
                // Pinned at one for the requesting caller.
                let record = Arc::new(CacheRecord::new(payload, self.tick()));
                table.insert(key.clone(), Slot::Resident(Arc::clone(&record)));
                self.load_done.notify_all();
                self.evict_to_capacity(&mut table);
                Ok(CachePin {
                       record,
                       _cache: self,
                   })
            }
            Err(e) => {
                // Waiters retry the load themselves and surface their own
                // error.
                table.remove(key);
                self.load_done.notify_all();
                Err(e)
            }
        }
    }

    pub fn hit_count(&self) -> u64 {
        self.hit_count.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.miss_count.load(Ordering::Relaxed)
    }

    /// Number of resident (or loading) entries.
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn swapper(&self) -> &S {
        &self.swapper
    }

    fn tick(&self) -> u64 {
        self.use_clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Evict least-recently-used unowned records until the swapper stops
    /// reporting the cache as full. A record observed with zero owners here
    /// cannot gain one before it is evicted: pinning requires the table
    /// lock, which we hold.
    fn evict_to_capacity(&self, table: &mut HashMap<S::Key, Slot<S::Payload>>) {
        let mut refused: Vec<S::Key> = Vec::new();
        while self.swapper.is_full() {
            let victim = table
                .iter()
                .filter_map(|(key, slot)| {
                    if refused.contains(key) {
                        return None;
                    }
                    match *slot {
                        Slot::Resident(ref record) => {
                            if record.owners() == 0 {
                                Some((key.clone(), record.last_use.load(Ordering::Relaxed)))
                            } else {
                                None
                            }
                        }
                        Slot::Loading => None,
                    }
                })
                .min_by_key(|&(_, last_use)| last_use)
                .map(|(key, _)| key);

            match victim {
                Some(key) => {
                    let unloaded = match table.get(&key) {
                        Some(&Slot::Resident(ref record)) => self.swapper.unload(&key, record),
                        _ => false,
                    };
                    if unloaded {
                        table.remove(&key);
                    } else {
                        // Refused: try another candidate.
                        refused.push(key);
                    }
                }
                None => {
                    // Every record is owned; run over budget rather than
                    // evict something in use.
                    debug!("cache is over budget but every record is in use");
                    break;
                }
            }
        }
    }
}

impl<S: CacheSwapper> Drop for SwapCache<S> {
    fn drop(&mut self) {
        // Teardown happens after all consumers have stopped: force-release
        // every record regardless of its owner count.
        let mut table = self.table.lock();
        for (key, slot) in table.drain() {
            if let Slot::Resident(record) = slot {
                self.swapper.teardown(&key, &record);
            }
        }
    }
}

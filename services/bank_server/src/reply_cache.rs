//! # Reply Cache - At-Most-Once Deduplication
//!
//! ## Purpose
//!
//! Maps correlation id to the exact reply bytes produced the first time
//! that call executed. A retransmission hitting the cache is answered with
//! those bytes and never reaches the account service.
//!
//! ## Eviction
//!
//! Bounded LRU: every hit and every insert marks the key most recently
//! used; inserting past capacity evicts the least recently used entry.
//! Entries are never removed any other way.
//!
//! ## In-Flight Marker
//!
//! With parallel workers a duplicate can arrive while its original is still
//! executing. [`ReplyCache::begin`] checks the cache and the in-flight set
//! under one lock, so exactly one of two racing datagrams gets
//! [`CacheLookup::Miss`] and executes.

use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use types::CorrelationId;

/// Result of checking a correlation id before execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Already answered; resend these bytes
    Hit(Bytes),
    /// Another worker is executing this id right now
    InFlight,
    /// Caller now owns the id and must [`ReplyCache::put`] its reply
    Miss,
}

struct CacheState {
    entries: LruCache<CorrelationId, Bytes>,
    in_flight: HashSet<CorrelationId>,
}

pub struct ReplyCache {
    state: Mutex<CacheState>,
}

impl ReplyCache {
    /// Cache holding at most `capacity` replies (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                in_flight: HashSet::new(),
            }),
        }
    }

    pub fn get(&self, id: &CorrelationId) -> Option<Bytes> {
        self.state.lock().entries.get(id).cloned()
    }

    /// Store the final reply for `id` and release its in-flight marker
    pub fn put(&self, id: CorrelationId, reply: Bytes) {
        let mut state = self.state.lock();
        state.in_flight.remove(&id);
        state.entries.put(id, reply);
    }

    pub fn begin(&self, id: CorrelationId) -> CacheLookup {
        let mut state = self.state.lock();
        if let Some(reply) = state.entries.get(&id) {
            return CacheLookup::Hit(reply.clone());
        }
        if !state.in_flight.insert(id) {
            return CacheLookup::InFlight;
        }
        CacheLookup::Miss
    }

    /// Membership check that does not affect recency
    pub fn contains(&self, id: &CorrelationId) -> bool {
        self.state.lock().entries.contains(id)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().entries.cap().get()
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight.len()
    }
}

impl std::fmt::Debug for ReplyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ReplyCache")
            .field("len", &state.entries.len())
            .field("capacity", &state.entries.cap())
            .field("in_flight", &state.in_flight.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn id(n: u8) -> CorrelationId {
        CorrelationId::from_bytes([n; 16])
    }

    fn reply(n: u8) -> Bytes {
        Bytes::from(vec![n; 8])
    }

    #[test]
    fn test_get_after_put_returns_stored_bytes() {
        let cache = ReplyCache::new(4);
        cache.put(id(1), reply(1));
        assert_eq!(cache.get(&id(1)), Some(reply(1)));
        assert_eq!(cache.get(&id(2)), None);
    }

    #[test]
    fn test_capacity_plus_one_evicts_lru() {
        let cache = ReplyCache::new(3);
        for n in 1..=4 {
            cache.put(id(n), reply(n));
        }
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&id(1)));
        assert!(cache.contains(&id(2)));
        assert!(cache.contains(&id(4)));
    }

    #[test]
    fn test_get_protects_from_next_eviction() {
        let cache = ReplyCache::new(3);
        for n in 1..=3 {
            cache.put(id(n), reply(n));
        }
        assert!(cache.get(&id(1)).is_some());
        cache.put(id(4), reply(4));

        assert!(cache.contains(&id(1)));
        assert!(!cache.contains(&id(2)));
    }

    #[test]
    fn test_begin_claims_once() {
        let cache = ReplyCache::new(4);
        assert_eq!(cache.begin(id(7)), CacheLookup::Miss);
        assert_eq!(cache.begin(id(7)), CacheLookup::InFlight);
        assert_eq!(cache.in_flight(), 1);

        cache.put(id(7), reply(7));
        assert_eq!(cache.in_flight(), 0);
        assert_eq!(cache.begin(id(7)), CacheLookup::Hit(reply(7)));
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let cache = ReplyCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }

    #[test]
    fn test_racing_claims_have_one_winner() {
        let cache = Arc::new(ReplyCache::new(16));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.begin(id(3)) == CacheLookup::Miss)
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}

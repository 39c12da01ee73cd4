//! Dispatcher counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of [`ServerStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerStatsSnapshot {
    pub datagrams_received: u64,
    pub framing_errors: u64,
    pub executions: u64,
    pub cache_hits: u64,
    pub duplicates_dropped: u64,
    pub replies_dropped: u64,
    pub pushes_sent: u64,
}

#[derive(Debug, Default)]
pub struct ServerStats {
    datagrams_received: AtomicU64,
    framing_errors: AtomicU64,
    executions: AtomicU64,
    cache_hits: AtomicU64,
    duplicates_dropped: AtomicU64,
    replies_dropped: AtomicU64,
    pushes_sent: AtomicU64,
}

impl ServerStats {
    pub fn record_received(&self) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_framing_error(&self) {
        self.framing_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_execution(&self) {
        self.executions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Duplicate dropped because its original was still executing
    pub fn record_duplicate_dropped(&self) {
        self.duplicates_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Reply discarded by loss injection
    pub fn record_reply_dropped(&self) {
        self.replies_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_push(&self) {
        self.pushes_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ServerStatsSnapshot {
        ServerStatsSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            framing_errors: self.framing_errors.load(Ordering::Relaxed),
            executions: self.executions.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            duplicates_dropped: self.duplicates_dropped.load(Ordering::Relaxed),
            replies_dropped: self.replies_dropped.load(Ordering::Relaxed),
            pushes_sent: self.pushes_sent.load(Ordering::Relaxed),
        }
    }
}

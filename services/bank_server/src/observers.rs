//! Monitoring observer registry
//!
//! Maps a client identity (its address and port) to the destination its
//! pushes go to. Registrations are created by start-monitoring and removed
//! by stop-monitoring; without a TTL, a client that disappears stays
//! registered until the server restarts.

use dashmap::DashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observer {
    pub destination: SocketAddr,
    pub registered_at: Instant,
}

/// Manages all registered monitoring clients
#[derive(Debug)]
pub struct ObserverRegistry {
    observers: DashMap<SocketAddr, Observer>,
    ttl: Option<Duration>,
}

impl ObserverRegistry {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            observers: DashMap::new(),
            ttl,
        }
    }

    /// Register or refresh an observer; returns `true` if it was new
    pub fn add(&self, identity: SocketAddr, destination: SocketAddr) -> bool {
        let observer = Observer {
            destination,
            registered_at: Instant::now(),
        };
        let is_new = self.observers.insert(identity, observer).is_none();
        if is_new {
            info!(
                "Added observer {}, total observers: {}",
                identity,
                self.observers.len()
            );
        } else {
            debug!("Refreshed observer {}", identity);
        }
        is_new
    }

    /// Remove an observer; absent identities are a no-op
    pub fn remove(&self, identity: &SocketAddr) -> bool {
        let removed = self.observers.remove(identity).is_some();
        if removed {
            info!(
                "Removed observer {}, total observers: {}",
                identity,
                self.observers.len()
            );
        }
        removed
    }

    /// Visit every registered destination
    pub fn for_each(&self, mut f: impl FnMut(SocketAddr)) {
        for entry in self.observers.iter() {
            f(entry.value().destination);
        }
    }

    /// Current destinations, collected so sends happen without holding shard locks
    pub fn destinations(&self) -> Vec<SocketAddr> {
        let mut destinations = Vec::with_capacity(self.observers.len());
        self.for_each(|destination| destinations.push(destination));
        destinations
    }

    /// Drop registrations older than the TTL; returns how many were removed
    pub fn prune_expired(&self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let before = self.observers.len();
        self.observers
            .retain(|_, observer| observer.registered_at.elapsed() < ttl);
        let pruned = before.saturating_sub(self.observers.len());
        if pruned > 0 {
            info!("Pruned {} expired observers", pruned);
        }
        pruned
    }

    pub fn contains(&self, identity: &SocketAddr) -> bool {
        self.observers.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

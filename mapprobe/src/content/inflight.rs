//! In-flight probe registry.
//!
//! Every probe is registered under its (slot, layer) key. Registering a new
//! probe for a key that is still in flight aborts the old one first, so at
//! most one probe per key can ever reach completion.
//!
//! # Implementation
//!
//! Uses `DashMap` with the entry API for atomic check-and-replace and
//! atomic counters for statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::token::LoadingToken;
use super::types::TabSlot;

/// Key of one probe: a slot and the layer being probed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub slot: TabSlot,
    pub layer_id: String,
}

impl RequestKey {
    pub fn new(slot: TabSlot, layer_id: impl Into<String>) -> Self {
        Self {
            slot,
            layer_id: layer_id.into(),
        }
    }
}

struct InFlight {
    generation: u64,
    abort: CancellationToken,
}

/// Abort handle of a registered probe.
#[derive(Debug, Clone)]
pub struct ProbeHandle {
    key: RequestKey,
    generation: u64,
    abort: CancellationToken,
}

impl ProbeHandle {
    pub fn key(&self) -> &RequestKey {
        &self.key
    }

    /// Cancelled on supersede, abort, or when the parent token is cancelled.
    pub fn abort_token(&self) -> &CancellationToken {
        &self.abort
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_cancelled()
    }
}

/// Registry statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProbeStats {
    pub registered: u64,
    /// Probes aborted because a newer one took their key.
    pub superseded: u64,
    /// Probes aborted by a slot or registry-wide abort.
    pub aborted: u64,
    pub completed: u64,
}

/// Tracks abort handles of in-flight probes.
#[derive(Default)]
pub struct ProbeRegistry {
    in_flight: DashMap<RequestKey, InFlight>,
    next_generation: AtomicU64,
    registered: AtomicU64,
    superseded: AtomicU64,
    aborted: AtomicU64,
    completed: AtomicU64,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a probe for `key` under the query's token.
    ///
    /// A probe already in flight for the key is aborted before the new one
    /// is stored.
    pub fn register(&self, key: RequestKey, token: &LoadingToken) -> ProbeHandle {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let abort = token.child_token();
        self.registered.fetch_add(1, Ordering::Relaxed);

        let entry = InFlight {
            generation,
            abort: abort.clone(),
        };
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.insert(entry);
                previous.abort.cancel();
                self.superseded.fetch_add(1, Ordering::Relaxed);
                debug!(
                    slot = %key.slot,
                    layer = %key.layer_id,
                    superseded_generation = previous.generation,
                    "superseded in-flight probe"
                );
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
        }

        ProbeHandle {
            key,
            generation,
            abort,
        }
    }

    /// Removes a finished probe.
    ///
    /// Does nothing if the key has since been taken by a newer probe.
    pub fn complete(&self, handle: &ProbeHandle) {
        let removed = self
            .in_flight
            .remove_if(&handle.key, |_, current| current.generation == handle.generation);
        if removed.is_some() {
            self.completed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Aborts every in-flight probe of one slot.
    pub fn abort_slot(&self, slot: TabSlot) -> usize {
        let mut count = 0;
        self.in_flight.retain(|key, probe| {
            if key.slot == slot {
                probe.abort.cancel();
                count += 1;
                false
            } else {
                true
            }
        });
        self.aborted.fetch_add(count as u64, Ordering::Relaxed);
        count
    }

    /// Aborts every in-flight probe.
    pub fn abort_all(&self) -> usize {
        let mut count = 0;
        self.in_flight.retain(|_, probe| {
            probe.abort.cancel();
            count += 1;
            false
        });
        self.aborted.fetch_add(count as u64, Ordering::Relaxed);
        if count > 0 {
            debug!(count, "aborted all in-flight probes");
        }
        count
    }

    pub fn is_in_flight(&self, key: &RequestKey) -> bool {
        self.in_flight.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn stats(&self) -> ProbeStats {
        ProbeStats {
            registered: self.registered.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::token::CancelReason;

    fn key(slot: u8, layer: &str) -> RequestKey {
        RequestKey::new(TabSlot::new(slot).unwrap(), layer)
    }

    #[test]
    fn test_register_supersedes_same_key() {
        let registry = ProbeRegistry::new();
        let token = LoadingToken::new(1);

        let first = registry.register(key(1, "a"), &token);
        let second = registry.register(key(1, "a"), &token);

        assert!(first.is_aborted(), "older probe must be aborted");
        assert!(!second.is_aborted());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.stats().superseded, 1);
    }

    #[test]
    fn test_different_keys_are_independent() {
        let registry = ProbeRegistry::new();
        let token = LoadingToken::new(1);

        let a = registry.register(key(1, "a"), &token);
        let b = registry.register(key(2, "a"), &token);
        let c = registry.register(key(1, "b"), &token);

        assert!(!a.is_aborted() && !b.is_aborted() && !c.is_aborted());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_stale_completion_keeps_newer_probe() {
        let registry = ProbeRegistry::new();
        let token = LoadingToken::new(1);

        let old = registry.register(key(1, "a"), &token);
        let new = registry.register(key(1, "a"), &token);

        registry.complete(&old);
        assert!(registry.is_in_flight(new.key()), "stale completion must not evict");

        registry.complete(&new);
        assert!(registry.is_empty());
        assert_eq!(registry.stats().completed, 1);
    }

    #[test]
    fn test_abort_slot() {
        let registry = ProbeRegistry::new();
        let token = LoadingToken::new(1);

        let a = registry.register(key(1, "a"), &token);
        let b = registry.register(key(1, "b"), &token);
        let c = registry.register(key(2, "a"), &token);

        assert_eq!(registry.abort_slot(TabSlot::FIRST), 2);
        assert!(a.is_aborted() && b.is_aborted());
        assert!(!c.is_aborted());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_abort_all() {
        let registry = ProbeRegistry::new();
        let token = LoadingToken::new(1);
        let handles: Vec<_> = TabSlot::ALL
            .iter()
            .map(|slot| registry.register(RequestKey::new(*slot, "a"), &token))
            .collect();

        assert_eq!(registry.abort_all(), 3);
        assert!(handles.iter().all(ProbeHandle::is_aborted));
        assert!(registry.is_empty());
        assert_eq!(registry.stats().aborted, 3);
    }

    #[test]
    fn test_token_cancellation_reaches_probes() {
        let registry = ProbeRegistry::new();
        let token = LoadingToken::new(1);
        let handle = registry.register(key(3, "a"), &token);

        token.cancel(CancelReason::Superseded);
        assert!(handle.is_aborted());
    }
}

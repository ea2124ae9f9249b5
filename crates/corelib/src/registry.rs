//! Endpoint registry and load accounting.
//!
//! Owns the authoritative `key -> EndpointInfo` index and the fleet-wide
//! `total_load` counter. The ring (`crate::ring`) owns the sorted point
//! sequence; this module owns everything keyed by endpoint identity.

use crate::endpoint::Endpoint;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Per-endpoint state shared by every virtual-node entry that endpoint owns.
///
/// `load` is an `AtomicU64` only so this type can be freely shared via `Arc`
/// across `R` ring entries; every mutation happens while the ring's single
/// lock is held, so `Ordering::Relaxed` is sufficient throughout.
#[derive(Debug)]
pub struct EndpointInfo {
    pub endpoint: Arc<dyn Endpoint>,
    load: AtomicU64,
}

impl EndpointInfo {
    fn new(endpoint: Arc<dyn Endpoint>) -> Self {
        Self {
            endpoint,
            load: AtomicU64::new(0),
        }
    }

    pub fn load(&self) -> u64 {
        self.load.load(Ordering::Relaxed)
    }

    fn acquire(&self) {
        self.load.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrements `load`, floored at 0. A same-endpoint `put` called once
    /// more than `get` (not excluded by the external contract, which only
    /// defines the *unregistered*-endpoint case as a no-op) must not wrap
    /// this counter around to `u64::MAX`; that would permanently break the
    /// `total_load == sum(info.load)` invariant and permanently exclude the
    /// endpoint from admission.
    fn release(&self) {
        let _ = self
            .load
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |load| {
                Some(load.saturating_sub(1))
            });
    }
}

/// The authoritative set of registered endpoints and their in-flight loads.
#[derive(Debug, Default)]
pub struct Registry {
    by_key: HashMap<String, Arc<EndpointInfo>>,
    total_load: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn total_load(&self) -> u64 {
        self.total_load
    }

    pub fn get(&self, key: &str) -> Option<&Arc<EndpointInfo>> {
        self.by_key.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Registers a new endpoint, returning its fresh `EndpointInfo` if this
    /// key was not already present. Idempotent no-op (returns `None`) if the
    /// key is already registered.
    pub fn register(&mut self, endpoint: Arc<dyn Endpoint>) -> Option<Arc<EndpointInfo>> {
        if self.by_key.contains_key(endpoint.key()) {
            return None;
        }
        let info = Arc::new(EndpointInfo::new(endpoint.clone()));
        self.by_key.insert(endpoint.key().to_string(), info.clone());
        Some(info)
    }

    /// Unregisters an endpoint, reclaiming its residual load from
    /// `total_load` immediately (outstanding `put`s for it become no-ops).
    /// Returns the removed `EndpointInfo` so the caller can drop its ring
    /// points too.
    pub fn unregister(&mut self, key: &str) -> Option<Arc<EndpointInfo>> {
        let info = self.by_key.remove(key)?;
        self.total_load = self.total_load.saturating_sub(info.load());
        Some(info)
    }

    pub fn acquire(&mut self, info: &Arc<EndpointInfo>) {
        info.acquire();
        self.total_load += 1;
    }

    pub fn release(&mut self, key: &str) {
        if let Some(info) = self.by_key.get(key) {
            info.release();
            self.total_load = self.total_load.saturating_sub(1);
        }
    }
}

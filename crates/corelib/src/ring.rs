//! The hash ring: sorted virtual-node points, successor lookup, and the
//! bounded-load `get`/`put` request path built on top of them.

use crate::admission::admit;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::hash::{replica_point, Crc32Hash, RingHash};
use crate::metrics::{MetricsSink, NullMetricsSink};
use crate::reconcile::{diff, Change};
use crate::registry::{EndpointInfo, Registry};
use parking_lot::RwLock;
use std::sync::Arc;

const DEFAULT_REPLICAS: u32 = 256;

/// A single virtual-node entry: the ring point and the endpoint that owns it.
#[derive(Clone)]
struct RingEntry {
    point: u32,
    info: Arc<EndpointInfo>,
}

#[derive(Default)]
struct Inner {
    registry: Registry,
    entries: Vec<RingEntry>,
    /// The endpoint snapshot last applied via `reconcile`, so the next call
    /// only needs to diff against it rather than requiring the caller to
    /// track history.
    last_snapshot: Vec<Arc<dyn Endpoint>>,
}

impl Inner {
    /// Registers `endpoint` and inserts its `replicas` ring points. No-op if
    /// already registered.
    fn add_one(&mut self, endpoint: Arc<dyn Endpoint>, hash_fn: &dyn RingHash, replicas: u32) {
        let Some(info) = self.registry.register(endpoint.clone()) else {
            return;
        };
        let new_entries: Vec<RingEntry> = (0..replicas)
            .map(|i| RingEntry {
                point: replica_point(hash_fn, endpoint.key(), i),
                info: info.clone(),
            })
            .collect();
        self.insert_points(new_entries);
    }

    /// Unregisters the endpoint with this key and drops its ring points.
    /// No-op if unknown.
    fn remove_one(&mut self, key: &str) {
        let Some(info) = self.registry.unregister(key) else {
            return;
        };
        self.entries.retain(|e| !Arc::ptr_eq(&e.info, &info));
    }

    /// Merges `new_entries` into the sorted sequence, resolving any point
    /// collision by keeping the most recently inserted entry (the later
    /// `add`, in either this batch or a previous one, wins). A single sort
    /// per batch keeps `add` at `O((N + R) log (N + R))` rather than
    /// resorting per point.
    fn insert_points(&mut self, new_entries: Vec<RingEntry>) {
        self.entries.extend(new_entries);
        self.entries.sort_by_key(|e| e.point);

        let mut deduped: Vec<RingEntry> = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            match deduped.last_mut() {
                Some(last) if last.point == entry.point => *last = entry,
                _ => deduped.push(entry),
            }
        }
        self.entries = deduped;
    }

    /// Index of the smallest point `>= h`, wrapping to 0. `None` if the ring
    /// is empty.
    fn successor(&self, h: u32) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = match self.entries.binary_search_by_key(&h, |e| e.point) {
            Ok(i) => i,
            Err(i) => i,
        };
        Some(if idx == self.entries.len() { 0 } else { idx })
    }
}

/// Configuration and state for a single consistent-hash ring.
pub struct Ring {
    hash_fn: Box<dyn RingHash>,
    replicas: u32,
    load_factor: f64,
    metrics: Arc<dyn MetricsSink>,
    inner: RwLock<Inner>,
}

impl Ring {
    pub fn builder() -> RingBuilder {
        RingBuilder::default()
    }

    /// Builds a ring with every default: CRC32 hashing, 256 replicas per
    /// endpoint, bounded loads disabled.
    pub fn new() -> Self {
        RingBuilder::default()
            .build()
            .expect("defaults are always valid")
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    pub fn replicas(&self) -> u32 {
        self.replicas
    }

    /// Number of currently registered endpoints.
    pub fn endpoint_count(&self) -> usize {
        self.inner.read().registry.len()
    }

    /// Number of ring points currently occupied (`<= endpoint_count * replicas`,
    /// strictly less only when an endpoint's own replica indices collided).
    pub fn point_count(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Fleet-wide in-flight load.
    pub fn total_load(&self) -> u64 {
        self.inner.read().registry.total_load()
    }

    /// Registers a single endpoint. Idempotent if already registered.
    pub fn add(&self, endpoint: Arc<dyn Endpoint>) {
        let mut inner = self.inner.write();
        let key = endpoint.key().to_string();
        inner.add_one(endpoint, &*self.hash_fn, self.replicas);
        self.metrics.endpoints_registered(inner.registry.len());
        tracing::debug!(endpoint = %key, "endpoint registered");
    }

    /// Registers every endpoint in `endpoints`.
    pub fn add_all(&self, endpoints: impl IntoIterator<Item = Arc<dyn Endpoint>>) {
        for e in endpoints {
            self.add(e);
        }
    }

    /// Unregisters a single endpoint by key. No-op if unknown.
    pub fn remove(&self, endpoint: &dyn Endpoint) {
        self.remove_key(endpoint.key());
    }

    /// Unregisters a single endpoint by key. No-op if unknown.
    pub fn remove_key(&self, key: &str) {
        let mut inner = self.inner.write();
        inner.remove_one(key);
        self.metrics.endpoints_registered(inner.registry.len());
        self.metrics.total_load(inner.registry.total_load());
        tracing::debug!(endpoint = %key, "endpoint unregistered");
    }

    /// Selects the endpoint responsible for `key`. `None` if the ring is
    /// empty.
    ///
    /// When the ring was built with `load_factor == 0`, this is a read-only
    /// lookup with no load accounting. Otherwise it probes forward from the
    /// primary successor until it finds an endpoint the bounded-loads
    /// predicate admits, incrementing that endpoint's load.
    pub fn get(&self, key: &str) -> Option<Arc<dyn Endpoint>> {
        let h = self.hash_fn.hash(key.as_bytes());

        if self.load_factor == 0.0 {
            let inner = self.inner.read();
            let idx = inner.successor(h)?;
            self.metrics.request_served();
            return Some(inner.entries[idx].info.endpoint.clone());
        }

        let mut inner = self.inner.write();
        let start = inner.successor(h)?;
        let n = inner.registry.len();
        let total = inner.registry.total_load();
        let len = inner.entries.len();

        let mut idx = start;
        loop {
            let info = inner.entries[idx].info.clone();
            if admit(total, n, info.load(), self.load_factor) {
                inner.registry.acquire(&info);
                self.metrics.total_load(inner.registry.total_load());
                self.metrics.request_served();
                if idx != start {
                    self.metrics.admission_advanced();
                }
                return Some(info.endpoint);
            }
            idx = (idx + 1) % len;
        }
    }

    /// Releases the load acquired by a prior `get` for this endpoint. No-op
    /// if the endpoint has since been removed, or if bounded loads are
    /// disabled.
    pub fn put(&self, endpoint: &dyn Endpoint) {
        if self.load_factor == 0.0 {
            return;
        }
        let mut inner = self.inner.write();
        inner.registry.release(endpoint.key());
        self.metrics.total_load(inner.registry.total_load());
    }

    /// Directly credits `amount` units of load to the registered endpoint
    /// `key`, bypassing the admission predicate entirely.
    ///
    /// This exists only so integration tests can reproduce a specific
    /// residual-load scenario (e.g. four endpoints already carrying
    /// uneven load before the admission probe under test runs) without
    /// hand-rolling a parallel bookkeeping path. No production caller
    /// should reach for this: real load is only ever acquired through
    /// `get`.
    #[doc(hidden)]
    pub fn seed_load_for_testing(&self, key: &str, amount: u64) {
        let mut inner = self.inner.write();
        let Some(info) = inner.registry.get(key).cloned() else {
            return;
        };
        for _ in 0..amount {
            inner.registry.acquire(&info);
        }
    }

    /// Diffs `next` against the snapshot last applied (empty on the first
    /// call) and applies the resulting add/remove delta.
    pub fn reconcile(&self, next: Vec<Arc<dyn Endpoint>>) {
        let mut inner = self.inner.write();
        let prev = std::mem::replace(&mut inner.last_snapshot, next.clone());
        let changes = diff(&prev, &next);
        for change in changes {
            match change {
                Change::Remove(e) => inner.remove_one(e.key()),
                Change::Add(e) => inner.add_one(e, &*self.hash_fn, self.replicas),
            }
        }
        self.metrics.endpoints_registered(inner.registry.len());
        self.metrics.total_load(inner.registry.total_load());
    }
}

impl Default for Ring {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ring")
            .field("replicas", &self.replicas)
            .field("load_factor", &self.load_factor)
            .field("endpoint_count", &self.endpoint_count())
            .finish()
    }
}

/// Builds a [`Ring`], validating the load factor at `build()` time.
pub struct RingBuilder {
    hash_fn: Box<dyn RingHash>,
    replicas: u32,
    load_factor: f64,
    metrics: Arc<dyn MetricsSink>,
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self {
            hash_fn: Box::new(Crc32Hash),
            replicas: DEFAULT_REPLICAS,
            load_factor: 0.0,
            metrics: Arc::new(NullMetricsSink),
        }
    }
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash_fn(mut self, hash_fn: Box<dyn RingHash>) -> Self {
        self.hash_fn = hash_fn;
        self
    }

    pub fn replicas(mut self, replicas: u32) -> Self {
        self.replicas = replicas;
        self
    }

    /// `0` disables bounded loads. Anything in `(0, 1.0]` is rejected by
    /// `build()`.
    pub fn load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn build(self) -> Result<Ring> {
        if self.load_factor > 0.0 && self.load_factor <= 1.0 {
            return Err(Error::InvalidLoadFactor(self.load_factor));
        }
        // 0 is a "use the default" sentinel, not a construction failure.
        let replicas = if self.replicas == 0 {
            DEFAULT_REPLICAS
        } else {
            self.replicas
        };
        Ok(Ring {
            hash_fn: self.hash_fn,
            replicas,
            load_factor: self.load_factor,
            metrics: self.metrics,
            inner: RwLock::new(Inner::default()),
        })
    }
}

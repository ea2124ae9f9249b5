//! Decorator composition over inheritance: a `Balancer` capability trait and
//! a `FallbackRing` that substitutes a synthetic endpoint when the wrapped
//! ring is empty, without any shared "middleware" base type.

use crate::endpoint::{BasicEndpoint, Endpoint};
use std::sync::Arc;

/// The capability a reverse proxy actually needs from a load balancer.
/// [`crate::ring::Ring`] implements this directly; decorators implement it
/// by delegating to whatever they wrap.
pub trait Balancer: Send + Sync {
    fn add(&self, endpoint: Arc<dyn Endpoint>);
    fn remove(&self, endpoint: &dyn Endpoint);
    fn get(&self, key: &str) -> Option<Arc<dyn Endpoint>>;
    fn put(&self, endpoint: &dyn Endpoint);
}

impl Balancer for crate::ring::Ring {
    fn add(&self, endpoint: Arc<dyn Endpoint>) {
        crate::ring::Ring::add(self, endpoint)
    }

    fn remove(&self, endpoint: &dyn Endpoint) {
        crate::ring::Ring::remove(self, endpoint)
    }

    fn get(&self, key: &str) -> Option<Arc<dyn Endpoint>> {
        crate::ring::Ring::get(self, key)
    }

    fn put(&self, endpoint: &dyn Endpoint) {
        crate::ring::Ring::put(self, endpoint)
    }
}

/// Wraps any [`Balancer`] so that `get` never returns `None`: when the inner
/// balancer has no endpoints registered, a synthetic fallback endpoint
/// (typically the service's own DNS name, in `name.namespace:port` form) is
/// returned instead. The fallback endpoint never participates in load
/// accounting; `put` on it is a no-op.
pub struct FallbackRing<B: Balancer> {
    inner: B,
    fallback: Arc<dyn Endpoint>,
}

impl<B: Balancer> FallbackRing<B> {
    pub fn new(inner: B, fallback_service: impl Into<String>) -> Self {
        Self {
            inner,
            fallback: Arc::new(BasicEndpoint::new(fallback_service)),
        }
    }

    fn is_fallback(&self, endpoint: &dyn Endpoint) -> bool {
        endpoint.key() == self.fallback.key()
    }
}

impl<B: Balancer> Balancer for FallbackRing<B> {
    fn add(&self, endpoint: Arc<dyn Endpoint>) {
        self.inner.add(endpoint);
    }

    fn remove(&self, endpoint: &dyn Endpoint) {
        self.inner.remove(endpoint);
    }

    fn get(&self, key: &str) -> Option<Arc<dyn Endpoint>> {
        self.inner.get(key).or_else(|| Some(self.fallback.clone()))
    }

    fn put(&self, endpoint: &dyn Endpoint) {
        if self.is_fallback(endpoint) {
            return;
        }
        self.inner.put(endpoint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::Ring;

    #[test]
    fn falls_back_when_ring_empty() {
        let wrapped = FallbackRing::new(Ring::new(), "svc.default:8080");
        let got = wrapped.get("any-key").unwrap();
        assert_eq!(got.key(), "svc.default:8080");
    }

    #[test]
    fn transparent_once_an_endpoint_is_registered() {
        let wrapped = FallbackRing::new(Ring::new(), "svc.default:8080");
        wrapped.add(Arc::new(BasicEndpoint::new("10.0.0.1:9000")));
        let got = wrapped.get("any-key").unwrap();
        assert_eq!(got.key(), "10.0.0.1:9000");
    }

    #[test]
    fn put_on_fallback_endpoint_is_a_no_op() {
        let inner = Ring::builder().load_factor(1.5).build().unwrap();
        let wrapped = FallbackRing::new(inner, "svc.default:8080");
        let got = wrapped.get("any-key").unwrap();
        assert_eq!(got.key(), "svc.default:8080");
        wrapped.put(got.as_ref()); // must not panic or touch inner load accounting
    }
}

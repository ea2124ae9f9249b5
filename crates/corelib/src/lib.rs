//! Affinity-aware consistent hashing with bounded loads.
//!
//! The core type is [`ring::Ring`]: a sorted virtual-node ring that maps an
//! affinity key to an [`endpoint::Endpoint`], keeping each endpoint's
//! in-flight load within a configurable bound of the fleet average. Endpoint
//! membership is kept coherent with an external source of truth through
//! [`reconcile::diff`] / [`ring::Ring::reconcile`]. [`fallback::FallbackRing`]
//! decorates any [`fallback::Balancer`] so that an empty ring still returns a
//! usable (synthetic) endpoint.

pub mod admission;
pub mod endpoint;
pub mod error;
pub mod fallback;
pub mod hash;
pub mod metrics;
pub mod reconcile;
pub mod registry;
pub mod ring;

pub use endpoint::{BasicEndpoint, Endpoint};
pub use error::{Error, Result};
pub use fallback::{Balancer, FallbackRing};
pub use hash::{Crc32Hash, RingHash, SipHash13, XxHash3};
pub use metrics::{MetricsSink, NullMetricsSink};
pub use reconcile::{diff, Change};
pub use ring::{Ring, RingBuilder};

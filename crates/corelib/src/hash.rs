//! Pluggable 32-bit hash functions for ring point placement.
//!
//! The ring is fixed to whichever [`RingHash`] it was built with; switching
//! functions mid-life would invalidate every stored point, so there is no
//! runtime swap path, only construction-time choice.

use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// A deterministic mapping from a byte string to a 32-bit ring point.
pub trait RingHash: Send + Sync {
    fn hash(&self, bytes: &[u8]) -> u32;
}

/// CRC32/IEEE, the default. Cheap, well distributed, and already present in
/// the dependency stack of other rings in this family of proxies.
#[derive(Debug, Default, Clone, Copy)]
pub struct Crc32Hash;

impl RingHash for Crc32Hash {
    fn hash(&self, bytes: &[u8]) -> u32 {
        crc32fast::hash(bytes)
    }
}

/// xxHash3, folded down to 32 bits. A faster alternative for large key
/// volumes when CRC32's hardware acceleration isn't available.
#[derive(Debug, Default, Clone, Copy)]
pub struct XxHash3;

impl RingHash for XxHash3 {
    fn hash(&self, bytes: &[u8]) -> u32 {
        let full = xxhash_rust::xxh3::xxh3_64(bytes);
        (full ^ (full >> 32)) as u32
    }
}

/// SipHash-1-3 with a fixed key, folded down to 32 bits. Useful when ring
/// points must not be predictable from observed keys (e.g. multi-tenant
/// deployments sharing a proxy).
#[derive(Debug, Clone, Copy)]
pub struct SipHash13 {
    k0: u64,
    k1: u64,
}

impl SipHash13 {
    pub fn new(k0: u64, k1: u64) -> Self {
        Self { k0, k1 }
    }
}

impl Default for SipHash13 {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl RingHash for SipHash13 {
    fn hash(&self, bytes: &[u8]) -> u32 {
        let mut hasher = SipHasher13::new_with_keys(self.k0, self.k1);
        hasher.write(bytes);
        let full = hasher.finish();
        (full ^ (full >> 32)) as u32
    }
}

/// The point owned by replica `index` of an endpoint with the given key:
/// `H(concat(decimal(index), key))`.
pub fn replica_point(hash_fn: &dyn RingHash, key: &str, index: u32) -> u32 {
    let mut buf = itoa_buf(index);
    buf.extend_from_slice(key.as_bytes());
    hash_fn.hash(&buf)
}

fn itoa_buf(n: u32) -> Vec<u8> {
    n.to_string().into_bytes()
}

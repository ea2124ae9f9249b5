//! Bounded-load admission predicate.
//!
//! Implements the admission rule from the bounded-loads paper (Mirrokni,
//! Thorup, Zadimoghaddam, arXiv:1608.01350): an endpoint may accept a
//! request only if doing so would not push its load above
//! `ceil(c * (total_load + 1) / n)`.

/// Returns `true` if an endpoint currently at `load` may accept one more
/// request, given `total_load` in flight across `endpoint_count` endpoints
/// and load factor `c`.
///
/// `c` must be `> 1.0`; callers are expected to have validated this at
/// construction time (see [`crate::error::Error::InvalidLoadFactor`]).
pub fn admit(total_load: u64, endpoint_count: usize, load: u64, c: f64) -> bool {
    debug_assert!(endpoint_count > 0);
    let ceiling = ((c * (total_load + 1) as f64) / endpoint_count as f64).ceil() as u64;
    load + 1 <= ceiling
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_below_ceiling() {
        // total_load=99, n=4, c=1.20 -> ceil(1.20*100/4) = ceil(30) = 30
        assert!(!admit(99, 4, 30, 1.20)); // 30+1 <= 30 is false
        assert!(admit(99, 4, 23, 1.20)); // 23+1 <= 30
    }

    #[test]
    fn single_endpoint_always_admits() {
        assert!(admit(0, 1, 0, 1.5));
        assert!(admit(1_000_000, 1, 1_000_000, 1.000_001));
    }

    #[test]
    fn admits_at_exact_average() {
        // Every endpoint at the average load must still be admissible for
        // any c > 1, otherwise the probe loop could cycle forever.
        let n = 7usize;
        let total = 700u64;
        let avg = total / n as u64;
        assert!(admit(total, n, avg, 1.01));
    }
}

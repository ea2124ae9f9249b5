//! End-to-end tests for the hash ring, using a fixed-point identity hash
//! function so that ring points and expected owners can be computed by hand.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: empty ring, add/lookup, remove
//! 2. **Membership churn**: add reshuffles ownership, remove restores it
//! 3. **Cross-instance consistency**: order of registration doesn't matter
//! 4. **Bounded loads**: admission advances past an over-loaded endpoint,
//!    removal reclaims residual load

use corelib::hash::RingHash;
use corelib::{BasicEndpoint, Endpoint, Ring};
use std::sync::Arc;

/// `H(s) = parse_int(s)`. Lets ring points for `replica_point(i, key)` be
/// computed by hand as `decimal(i) ++ key` parsed back as an integer.
struct IdentityHash;

impl RingHash for IdentityHash {
    fn hash(&self, bytes: &[u8]) -> u32 {
        std::str::from_utf8(bytes)
            .expect("test keys are ascii decimal")
            .parse()
            .expect("test keys are ascii decimal")
    }
}

fn ep(key: &str) -> Arc<dyn Endpoint> {
    Arc::new(BasicEndpoint::new(key))
}

fn identity_ring(replicas: u32, load_factor: f64) -> Ring {
    Ring::builder()
        .hash_fn(Box::new(IdentityHash))
        .replicas(replicas)
        .load_factor(load_factor)
        .build()
        .unwrap()
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_ring_lookup() {
    let ring = Ring::new();
    assert_eq!(ring.get("key1").map(|e| e.key().to_string()), None);
    assert_eq!(ring.endpoint_count(), 0);
    assert_eq!(ring.point_count(), 0);
}

#[test]
fn test_add_node_and_lookup() {
    let ring = identity_ring(3, 0.0);
    ring.add(ep("2"));

    assert_eq!(ring.endpoint_count(), 1);
    assert_eq!(ring.point_count(), 3); // R=3 virtual nodes

    // points are {2, 12, 22}; "2" hashes to itself and lands exactly on a point
    assert_eq!(ring.get("2").unwrap().key(), "2");
}

#[test]
fn test_remove_node() {
    let ring = identity_ring(4, 0.0);
    ring.add(ep("2"));
    ring.add(ep("4"));
    assert_eq!(ring.endpoint_count(), 2);
    assert_eq!(ring.point_count(), 8);

    ring.remove_key("2");
    assert_eq!(ring.endpoint_count(), 1);
    assert_eq!(ring.point_count(), 4);

    // only "4"'s points remain
    assert_eq!(ring.get("1").unwrap().key(), "4");

    // removing an unknown key is a no-op, not an error
    ring.remove_key("does-not-exist");
    assert_eq!(ring.endpoint_count(), 1);
}

// ============================================================================
// Membership Churn: scenarios 1-3
// ============================================================================

#[test]
fn scenario_basic_mapping_and_wraparound() {
    // keys "2","4","6", R=3 -> points {2,4,6,12,14,16,22,24,26}
    let ring = identity_ring(3, 0.0);
    ring.add(ep("2"));
    ring.add(ep("4"));
    ring.add(ep("6"));

    assert_eq!(ring.get("2").unwrap().key(), "2");
    assert_eq!(ring.get("11").unwrap().key(), "2"); // successor is 12, owned by "2"
    assert_eq!(ring.get("23").unwrap().key(), "4"); // successor is 24, owned by "4"
    assert_eq!(ring.get("27").unwrap().key(), "2"); // wraps to the minimum point, 2
}

#[test]
fn scenario_add_reshuffles_successor() {
    let ring = identity_ring(3, 0.0);
    ring.add(ep("2"));
    ring.add(ep("4"));
    ring.add(ep("6"));
    assert_eq!(ring.get("27").unwrap().key(), "2"); // wraps before "8" exists

    ring.add(ep("8")); // points {8,18,28} join; 28 is now the successor of 27
    assert_eq!(ring.get("27").unwrap().key(), "8");

    // earlier mappings, unaffected by the new endpoint's points, stay put
    assert_eq!(ring.get("11").unwrap().key(), "2");
}

#[test]
fn scenario_remove_restores_prior_mapping() {
    let ring = identity_ring(3, 0.0);
    ring.add(ep("2"));
    ring.add(ep("4"));
    ring.add(ep("6"));
    ring.add(ep("8"));
    assert_eq!(ring.get("27").unwrap().key(), "8");

    ring.remove_key("8");
    assert_eq!(ring.get("27").unwrap().key(), "2"); // back to wrapping
}

#[test]
fn scenario_registration_order_does_not_affect_mapping() {
    // uses the default CRC32 hash: this checks order-independence, not
    // hand-computed point values.
    let a = Ring::builder().replicas(1).build().unwrap();
    for k in ["Bill", "Bob", "Bonny"] {
        a.add(ep(k));
    }

    let b = Ring::builder().replicas(1).build().unwrap();
    for k in ["Bonny", "Bill", "Bob"] {
        b.add(ep(k));
    }

    for probe in ["Ben", "Bob", "Bonny", "Bill"] {
        assert_eq!(
            a.get(probe).unwrap().key(),
            b.get(probe).unwrap().key(),
            "probe {probe} should map identically regardless of add order"
        );
    }
}

// ============================================================================
// Bounded loads: scenario 6 and boundary behaviours
// ============================================================================

#[test]
fn scenario_bounded_loads_overflow_advances_to_next_successor() {
    // keys "6","4","2","7", R=3 -> points (owner): 2,4,6,7,12,14,16,17,22,24,26,27
    // get("15") successor is 16, owned by "6"; the next point, 17, is owned
    // by "7". Seed residual loads so "6" is over the bounded-loads ceiling
    // and "7" is not, and confirm `get` advances past "6" to admit "7".
    let ring = identity_ring(3, 1.20);
    ring.add(ep("6"));
    ring.add(ep("4"));
    ring.add(ep("2"));
    ring.add(ep("7"));

    ring.seed_load_for_testing("6", 30);
    ring.seed_load_for_testing("4", 22);
    ring.seed_load_for_testing("2", 24);
    ring.seed_load_for_testing("7", 23);
    assert_eq!(ring.total_load(), 99);

    // ceiling = ceil(1.20 * 100 / 4) = 30; "6" at 30 would become 31, rejected
    let got = ring.get("15").unwrap();
    assert_eq!(got.key(), "7");
    assert_eq!(ring.total_load(), 100);
}

#[test]
fn scenario_disappearing_endpoint_reclaims_load() {
    let ring = identity_ring(3, 1.25);
    ring.add(ep("2"));
    ring.add(ep("4"));
    ring.add(ep("6"));

    assert_eq!(ring.get("11").unwrap().key(), "2"); // successor 12
    assert_eq!(ring.get("13").unwrap().key(), "4"); // successor 14
    assert_eq!(ring.total_load(), 2);

    ring.remove_key("2");
    ring.remove_key("4");
    assert_eq!(ring.total_load(), 0);

    // late puts for endpoints already removed are silent no-ops
    ring.put(ep("2").as_ref());
    ring.put(ep("4").as_ref());
    assert_eq!(ring.total_load(), 0);
}

#[test]
fn single_endpoint_always_admits_in_bounded_mode() {
    let ring = identity_ring(2, 1.5);
    ring.add(ep("2"));
    for k in ["1", "2", "99"] {
        assert_eq!(ring.get(k).unwrap().key(), "2");
    }
    assert_eq!(ring.total_load(), 3);
}

#[test]
fn get_then_put_restores_prior_load() {
    let ring = identity_ring(4, 1.25);
    ring.add(ep("2"));
    ring.add(ep("4"));

    let before = ring.total_load();
    let got = ring.get("13").unwrap();
    assert_eq!(ring.total_load(), before + 1);
    ring.put(got.as_ref());
    assert_eq!(ring.total_load(), before);
}

//! Set reconciliation: turning a new authoritative endpoint snapshot into
//! the minimal ordered add/remove delta against a previous one.

use crate::endpoint::Endpoint;
use std::collections::HashSet;
use std::sync::Arc;

/// One step of a reconciliation delta.
#[derive(Debug, Clone)]
pub enum Change {
    Add(Arc<dyn Endpoint>),
    Remove(Arc<dyn Endpoint>),
}

/// Computes `prev \ next` (removals) followed by `next \ prev` (additions),
/// by key equality. Removals precede additions so that an endpoint whose key
/// is reused for a different identity (e.g. IP reassignment) ends up
/// correctly re-registered rather than left stale.
pub fn diff(prev: &[Arc<dyn Endpoint>], next: &[Arc<dyn Endpoint>]) -> Vec<Change> {
    let prev_keys: HashSet<&str> = prev.iter().map(|e| e.key()).collect();
    let next_keys: HashSet<&str> = next.iter().map(|e| e.key()).collect();

    let mut changes = Vec::new();
    for e in prev {
        if !next_keys.contains(e.key()) {
            changes.push(Change::Remove(e.clone()));
        }
    }
    for e in next {
        if !prev_keys.contains(e.key()) {
            changes.push(Change::Add(e.clone()));
        }
    }
    changes
}

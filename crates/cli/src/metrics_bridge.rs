//! Bridges ring events into the process-wide `metrics` crate recorder.
//!
//! This is the one place in the repository that talks to a global metrics
//! registry; the core itself never does (see `corelib::metrics`).

use corelib::MetricsSink;
use metrics::{counter, gauge};

pub struct MetricsBridge {
    ring_name: &'static str,
}

impl MetricsBridge {
    pub fn new(ring_name: &'static str) -> Self {
        Self { ring_name }
    }
}

impl MetricsSink for MetricsBridge {
    fn endpoints_registered(&self, count: usize) {
        gauge!("ring_endpoints_registered", "ring" => self.ring_name).set(count as f64);
    }

    fn total_load(&self, load: u64) {
        gauge!("ring_total_load", "ring" => self.ring_name).set(load as f64);
    }

    fn request_served(&self) {
        counter!("ring_requests_served_total", "ring" => self.ring_name).increment(1);
    }

    fn admission_advanced(&self) {
        counter!("ring_admission_advanced_total", "ring" => self.ring_name).increment(1);
    }
}

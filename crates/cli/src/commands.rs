//! Subcommand implementations. Each one builds a ring directly from the
//! core (`corelib::Ring`) and never talks to a network.

use clap::{Subcommand, ValueEnum};
use corelib::{BasicEndpoint, Crc32Hash, Endpoint, Ring, RingHash, SipHash13, XxHash3};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::metrics_bridge::MetricsBridge;

/// Selects the 32-bit hash function a ring is built with.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum HashKind {
    Crc32,
    Xxh3,
    Siphash13,
}

impl HashKind {
    fn build(self) -> Box<dyn RingHash> {
        match self {
            HashKind::Crc32 => Box::new(Crc32Hash),
            HashKind::Xxh3 => Box::new(XxHash3),
            HashKind::Siphash13 => Box::new(SipHash13::default()),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a ring from a fixed endpoint list and print its virtual-node
    /// distribution.
    Describe {
        /// Comma-separated endpoint keys, e.g. "10.0.0.1:8080,10.0.0.2:8080"
        #[arg(value_delimiter = ',')]
        endpoints: Vec<String>,
    },

    /// Build a ring and drive concurrent affinity traffic against it,
    /// printing the resulting per-endpoint load distribution.
    Simulate {
        #[arg(value_delimiter = ',')]
        endpoints: Vec<String>,

        /// Number of distinct affinity keys in the simulated workload.
        #[arg(long, default_value_t = 20)]
        affinity_keys: usize,

        /// Number of concurrent workers issuing get/put cycles.
        #[arg(long, default_value_t = 8)]
        workers: usize,

        /// Requests issued per worker.
        #[arg(long, default_value_t = 50)]
        requests_per_worker: usize,
    },

    /// Diff two comma-separated endpoint snapshots and print the ordered
    /// add/remove delta, without building a ring.
    Reconcile {
        #[arg(value_delimiter = ',')]
        prev: Vec<String>,

        #[arg(value_delimiter = ',')]
        next: Vec<String>,
    },
}

impl Command {
    pub fn run(&self, replicas: u32, load_factor: f64, hash: HashKind) -> anyhow::Result<()> {
        match self {
            Command::Describe { endpoints } => describe(endpoints, replicas, hash),
            Command::Simulate {
                endpoints,
                affinity_keys,
                workers,
                requests_per_worker,
            } => simulate(
                endpoints,
                replicas,
                load_factor,
                hash,
                *affinity_keys,
                *workers,
                *requests_per_worker,
            ),
            Command::Reconcile { prev, next } => reconcile(prev, next),
        }
    }
}

fn build_ring(endpoints: &[String], replicas: u32, load_factor: f64, hash: HashKind) -> anyhow::Result<Ring> {
    let ring = Ring::builder()
        .hash_fn(hash.build())
        .replicas(replicas)
        .load_factor(load_factor)
        .metrics(Arc::new(MetricsBridge::new("cli")))
        .build()?;
    for key in endpoints {
        ring.add(Arc::new(BasicEndpoint::new(key.clone())));
    }
    Ok(ring)
}

fn describe(endpoints: &[String], replicas: u32, hash: HashKind) -> anyhow::Result<()> {
    let ring = build_ring(endpoints, replicas, 0.0, hash)?;
    println!(
        "ring: {} endpoint(s), {} replica(s) each, {} point(s) total",
        ring.endpoint_count(),
        ring.replicas(),
        ring.point_count()
    );
    for key in endpoints {
        println!("  endpoint {key}");
    }
    Ok(())
}

fn simulate(
    endpoints: &[String],
    replicas: u32,
    load_factor: f64,
    hash: HashKind,
    affinity_keys: usize,
    workers: usize,
    requests_per_worker: usize,
) -> anyhow::Result<()> {
    let ring = Arc::new(build_ring(endpoints, replicas, load_factor, hash)?);
    let keys: Vec<String> = (0..affinity_keys).map(|i| format!("affinity-{i}")).collect();

    tracing::info!(
        endpoint_count = endpoints.len(),
        affinity_keys,
        workers,
        requests_per_worker,
        "starting simulated affinity traffic"
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let ring = ring.clone();
            let keys = keys.clone();
            handles.push(tokio::spawn(async move {
                let mut rng = rand::thread_rng();
                for _ in 0..requests_per_worker {
                    let key = &keys[rng.gen_range(0..keys.len())];
                    if let Some(endpoint) = ring.get(key) {
                        // model a small amount of downstream work before releasing
                        let think_time_ms = rng.gen_range(1..5);
                        tokio::time::sleep(Duration::from_millis(think_time_ms)).await;
                        ring.put(endpoint.as_ref());
                    }
                }
                worker_id
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    });

    println!(
        "{} endpoint(s), total in-flight load after simulation: {}",
        ring.endpoint_count(),
        ring.total_load()
    );
    Ok(())
}

fn reconcile(prev: &[String], next: &[String]) -> anyhow::Result<()> {
    let prev_endpoints: Vec<Arc<dyn Endpoint>> = prev
        .iter()
        .map(|k| Arc::new(BasicEndpoint::new(k.clone())) as Arc<dyn Endpoint>)
        .collect();
    let next_endpoints: Vec<Arc<dyn Endpoint>> = next
        .iter()
        .map(|k| Arc::new(BasicEndpoint::new(k.clone())) as Arc<dyn Endpoint>)
        .collect();

    for change in corelib::diff(&prev_endpoints, &next_endpoints) {
        match change {
            corelib::Change::Remove(e) => println!("- {}", e.key()),
            corelib::Change::Add(e) => println!("+ {}", e.key()),
        }
    }
    Ok(())
}

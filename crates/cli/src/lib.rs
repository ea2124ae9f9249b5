//! Administrative CLI over the consistent-hash ring core.
//!
//! Provides commands for:
//! - Describing the virtual-node distribution of a ring built from a fixed
//!   endpoint list
//! - Simulating concurrent affinity traffic against a ring
//! - Reconciling two endpoint snapshots and printing the resulting delta

pub mod commands;
pub mod config;
pub mod metrics_bridge;

pub use commands::Command;
pub use config::CliConfig;
pub use metrics_bridge::MetricsBridge;

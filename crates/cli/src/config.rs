//! Top-level CLI configuration, mirroring the replica count / load factor /
//! hash function knobs the core ring exposes at construction.

use clap::Parser;

use crate::commands::{Command, HashKind};

#[derive(Parser, Debug)]
#[command(
    name = "consistent-hash-rs",
    about = "Exercise the bounded-load consistent hash ring core from the command line"
)]
pub struct CliConfig {
    /// Virtual nodes (replicas) per endpoint.
    #[arg(long, global = true, default_value_t = 256)]
    pub replicas: u32,

    /// Bounded-loads factor; 0 disables bounded loads.
    #[arg(long, global = true, default_value_t = 0.0)]
    pub load_factor: f64,

    /// Hash function backing the ring.
    #[arg(long, global = true, value_enum, default_value = "crc32")]
    pub hash: HashKind,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn run(self) -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();

        self.command.run(self.replicas, self.load_factor, self.hash)
    }
}

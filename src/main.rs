//! CLI entry point: bootstrap a single-node replica set on one server.
//!
//! Meant to run as a one-shot init step next to a MongoDB container.
//! Idempotent, so container restarts are harmless. Exits nonzero when
//! initiation is rejected or the optional poll bound runs out.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use replset_init::admin::MongoAdmin;
use replset_init::bootstrap::{BootstrapOptions, BootstrapRunner};
use replset_init::config::ReplicaSetConfig;

/// Initiate a single-node replica set and wait for it to elect itself.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server to bootstrap, as host:port
    #[arg(long, default_value = "localhost:27017")]
    host: String,

    /// Host recorded in the member configuration (defaults to --host);
    /// containers usually want their service name here
    #[arg(long)]
    member_host: Option<String>,

    /// Replica set name
    #[arg(long, default_value = "rs0")]
    replica_set: String,

    /// Milliseconds to wait before the first status check
    #[arg(long, default_value_t = 5000)]
    initial_delay_ms: u64,

    /// Milliseconds between election status polls
    #[arg(long, default_value_t = 2000)]
    poll_interval_ms: u64,

    /// Maximum status polls before giving up (waits forever when omitted)
    #[arg(long)]
    max_polls: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let member_host = args
        .member_host
        .clone()
        .unwrap_or_else(|| args.host.clone());
    let config = ReplicaSetConfig::single_member(&args.replica_set, member_host);

    info!("starting replica set bootstrap for {}", args.host);
    let admin = MongoAdmin::connect(&args.host)
        .await
        .with_context(|| format!("failed to configure a client for {}", args.host))?;

    let runner = BootstrapRunner::new(BootstrapOptions {
        initial_delay: Duration::from_millis(args.initial_delay_ms),
        poll_interval: Duration::from_millis(args.poll_interval_ms),
        max_polls: args.max_polls,
    });
    runner
        .run(&admin, &config)
        .await
        .context("replica set bootstrap failed")?;

    info!("replica set bootstrap finished");
    Ok(())
}

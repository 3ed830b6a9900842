//! The idempotent bootstrap runner.
//!
//! One linear pass: wait out the startup delay, check whether a replica set
//! already exists, initiate it if not, then poll until the node reports
//! primary. Repeated invocations are safe: a configured replica set
//! short-circuits the run before any initiation is attempted.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};

use crate::admin::ReplSetAdmin;
use crate::config::ReplicaSetConfig;
use crate::error::BootstrapError;

/// Default wait before the first status check.
///
/// Gives the server time to finish starting. This is a fixed delay, not a
/// readiness probe: a server that takes longer is absorbed by the status
/// retry path instead.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(5000);

/// Default pause between election status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Timing and bounding knobs for a bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Fixed wait before the first status check.
    pub initial_delay: Duration,
    /// Pause between status polls while the election runs.
    pub poll_interval: Duration,
    /// Maximum number of status polls before giving up with
    /// [`BootstrapError::ElectionTimeout`]. `None` polls forever, which
    /// suits a one-shot init container but hangs on a node that can never
    /// win an election.
    pub max_polls: Option<u32>,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
        }
    }
}

/// Where the post-initiation wait currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElectionPhase {
    /// Election still running, keep polling.
    Electing,
    /// The node reported `myState == 1`.
    Primary,
}

/// Executes the bootstrap sequence against one admin connection.
pub struct BootstrapRunner {
    options: BootstrapOptions,
}

impl BootstrapRunner {
    pub fn new(options: BootstrapOptions) -> Self {
        Self { options }
    }

    /// Runs the full sequence: delay, existence check, initiation, election
    /// wait.
    ///
    /// Initiation happens at most once per call, and only after the
    /// existence check failed. A reachable, already-configured replica set
    /// returns early with no side effects, which is what makes repeated
    /// container starts harmless.
    ///
    /// # Errors
    ///
    /// - [`BootstrapError::InitiationFailed`] when the server rejects the
    ///   configuration (`ok != 1`); the poll loop is never entered.
    /// - [`BootstrapError::InitiateUnavailable`] when the initiate command
    ///   gets no verdict at all.
    /// - [`BootstrapError::ElectionTimeout`] when `max_polls` is set and
    ///   runs out before the node reports primary.
    pub async fn run<A: ReplSetAdmin>(
        &self,
        admin: &A,
        config: &ReplicaSetConfig,
    ) -> Result<(), BootstrapError> {
        info!(
            "waiting {}ms for the server to finish starting",
            self.options.initial_delay.as_millis()
        );
        sleep(self.options.initial_delay).await;

        match admin.repl_set_status().await {
            Ok(status) => {
                info!(
                    "replica set already initiated (ok: {}, state: {}); nothing to do",
                    status.ok,
                    status.state()
                );
                return Ok(());
            }
            Err(err) => {
                info!("no replica set configured yet ({err}); initiating");
            }
        }

        let reply = admin
            .initiate(config)
            .await
            .map_err(BootstrapError::InitiateUnavailable)?;
        if !reply.accepted() {
            error!("replica set initiation rejected: {}", reply.reply);
            return Err(BootstrapError::InitiationFailed { reply: reply.reply });
        }
        info!("replica set '{}' initiated: {}", config.id, reply.reply);

        info!("waiting for this node to become primary");
        self.await_primary(admin).await?;
        info!("replica set bootstrap complete");
        Ok(())
    }

    /// Polls status until the node reports primary.
    ///
    /// Failed status queries are expected while the election runs; they are
    /// logged and retried on the same cadence as ordinary non-primary
    /// observations. Success is only returned after a poll observed
    /// `myState == 1`.
    async fn await_primary<A: ReplSetAdmin>(&self, admin: &A) -> Result<(), BootstrapError> {
        let mut phase = ElectionPhase::Electing;
        let mut attempts: u32 = 0;

        while phase == ElectionPhase::Electing {
            match admin.repl_set_status().await {
                Ok(status) if status.is_primary() => {
                    info!("node is now primary");
                    phase = ElectionPhase::Primary;
                    continue;
                }
                Ok(status) => {
                    info!("current state: {}; waiting for election", status.state());
                }
                Err(err) => {
                    info!("status check failed during election ({err}); retrying");
                }
            }

            attempts += 1;
            if let Some(max) = self.options.max_polls {
                if attempts >= max {
                    return Err(BootstrapError::ElectionTimeout { attempts });
                }
            }
            sleep(self.options.poll_interval).await;
        }

        Ok(())
    }
}

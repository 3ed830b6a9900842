//! The administrative-connection seam.
//!
//! [`ReplSetAdmin`] is the narrow interface the bootstrap runner needs: one
//! status query and one initiate call. [`MongoAdmin`] implements it over the
//! MongoDB driver; tests substitute scripted fakes.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use crate::config::ReplicaSetConfig;
use crate::error::AdminError;
use crate::status::{numeric, ReplicaSetStatus};

/// How long the driver may spend selecting a server before a command fails.
///
/// The driver default (30s) assumes a healthy deployment. A bootstrap tool
/// talking to a server that may still be starting needs status failures back
/// quickly so the poll loop keeps its configured cadence.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Verdict of a `replSetInitiate` call that reached the server.
#[derive(Debug, Clone)]
pub struct InitiateReply {
    /// `1` when the server accepted the configuration.
    pub ok: i32,
    /// The full reply payload, kept for logging and error reporting.
    pub reply: Document,
}

impl InitiateReply {
    pub fn accepted(&self) -> bool {
        self.ok == 1
    }

    /// A reply without a readable `ok` field counts as a rejection.
    fn from_document(reply: Document) -> Self {
        let ok = reply
            .get("ok")
            .and_then(numeric)
            .map(|v| i32::from(v == 1.0))
            .unwrap_or(0);
        Self { ok, reply }
    }
}

/// Administrative interface of the node being bootstrapped.
///
/// The runner receives an implementation as an explicit parameter; there is
/// no ambient or global connection state anywhere in the crate.
#[async_trait]
pub trait ReplSetAdmin: Send + Sync {
    /// Queries `replSetGetStatus`. Fails while no replica set is configured
    /// and may fail transiently during an election.
    async fn repl_set_status(&self) -> Result<ReplicaSetStatus, AdminError>;

    /// Submits the configuration via `replSetInitiate` and reports the
    /// server's verdict. `Err` means no verdict was obtained at all.
    async fn initiate(&self, config: &ReplicaSetConfig) -> Result<InitiateReply, AdminError>;
}

/// [`ReplSetAdmin`] backed by a real MongoDB connection.
pub struct MongoAdmin {
    admin_db: Database,
}

impl MongoAdmin {
    /// Builds a client for `mongodb://{address}`.
    ///
    /// The connection is direct: an uninitialized replica set member is not
    /// discoverable through topology monitoring, and server selection would
    /// otherwise wait for a primary that cannot exist yet. Construction does
    /// not touch the network, so this succeeds even while the server is
    /// still starting; the first status query surfaces reachability.
    pub async fn connect(address: &str) -> Result<Self, AdminError> {
        let mut options = ClientOptions::parse(format!("mongodb://{address}")).await?;
        options.direct_connection = Some(true);
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
        let client = Client::with_options(options)?;
        Ok(Self::new(client))
    }

    /// Wraps an existing client; commands run against its `admin` database.
    pub fn new(client: Client) -> Self {
        Self {
            admin_db: client.database("admin"),
        }
    }
}

#[async_trait]
impl ReplSetAdmin for MongoAdmin {
    async fn repl_set_status(&self) -> Result<ReplicaSetStatus, AdminError> {
        let reply = self
            .admin_db
            .run_command(doc! { "replSetGetStatus": 1 })
            .await?;
        ReplicaSetStatus::from_document(&reply)
    }

    async fn initiate(&self, config: &ReplicaSetConfig) -> Result<InitiateReply, AdminError> {
        let command = doc! { "replSetInitiate": config.to_document()? };
        match self.admin_db.run_command(command).await {
            Ok(reply) => Ok(InitiateReply::from_document(reply)),
            // The driver surfaces an `ok: 0` reply as a command error; fold
            // it back into a reply so the caller sees the server's verdict
            // as a value. Transport failures stay errors.
            Err(err) => match err.kind.as_ref() {
                ErrorKind::Command(command_err) => Ok(InitiateReply {
                    ok: 0,
                    reply: doc! {
                        "ok": 0,
                        "code": command_err.code,
                        "codeName": command_err.code_name.clone(),
                        "errmsg": command_err.message.clone(),
                    },
                }),
                _ => Err(AdminError::from(err)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_ok_counts_as_accepted() {
        let reply = InitiateReply::from_document(doc! { "ok": 1.0 });
        assert!(reply.accepted());
        assert_eq!(reply.ok, 1);
    }

    #[test]
    fn int_zero_ok_is_a_rejection() {
        let reply = InitiateReply::from_document(doc! { "ok": 0, "errmsg": "invalid config" });
        assert!(!reply.accepted());
        assert_eq!(reply.reply.get_str("errmsg").expect("errmsg"), "invalid config");
    }

    #[test]
    fn missing_ok_is_a_rejection() {
        let reply = InitiateReply::from_document(doc! { "errmsg": "garbled" });
        assert!(!reply.accepted());
    }
}

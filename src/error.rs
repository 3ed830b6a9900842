//! Error types for the bootstrap pipeline.
//!
//! Two layers with different lifetimes: [`AdminError`] describes one failed
//! administrative call and is recoverable by contract (before initiation it
//! means "no replica set yet", during the election it means "poll again"),
//! while [`BootstrapError`] is the terminal verdict of a whole bootstrap run.

use mongodb::bson::Document;
use thiserror::Error;

/// A failed administrative command.
///
/// Carries only a human-readable message. The bootstrap runner never
/// branches on the failure's structure, so the message exists for logs
/// alone.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct AdminError(pub String);

impl AdminError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<mongodb::error::Error> for AdminError {
    fn from(err: mongodb::error::Error) -> Self {
        Self(err.to_string())
    }
}

/// Terminal failure of a bootstrap run.
///
/// Transient status-query failures never surface here; they are absorbed by
/// the runner's retry path.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The server received the initiate command and rejected it. The full
    /// reply payload is preserved so operators see the server's own verdict.
    /// Never retried.
    #[error("replica set initiation rejected: {reply}")]
    InitiationFailed { reply: Document },

    /// The initiate command never produced a verdict (the connection failed
    /// mid-command). Distinct from a rejection: the replica set may or may
    /// not exist afterwards.
    #[error("replica set initiation could not be delivered")]
    InitiateUnavailable(#[source] AdminError),

    /// The configured poll budget ran out before this node became primary.
    /// Only reachable when a maximum poll count is set; the default waits
    /// indefinitely.
    #[error("node did not become primary within {attempts} status polls")]
    ElectionTimeout { attempts: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn initiation_failure_display_includes_reply_payload() {
        let err = BootstrapError::InitiationFailed {
            reply: doc! { "ok": 0, "errmsg": "already initialized" },
        };
        let rendered = err.to_string();
        assert!(rendered.contains("already initialized"), "got: {rendered}");
    }

    #[test]
    fn admin_error_wraps_plain_messages() {
        let err = AdminError::new("no replset config has been received");
        assert_eq!(err.to_string(), "no replset config has been received");
    }
}

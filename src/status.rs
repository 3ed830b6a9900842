//! Replica set status parsing.
//!
//! A `replSetGetStatus` reply carries far more than this tool needs; only
//! the `ok` flag and the local member state (`myState`) are read. Every poll
//! produces a fresh [`ReplicaSetStatus`], nothing is cached between polls.

use std::fmt;

use mongodb::bson::{Bson, Document};

use crate::error::AdminError;

/// The states a replica set member reports through `myState`.
///
/// The bootstrap only ever branches on [`MemberState::Primary`]; the other
/// variants exist so poll logs can name the state instead of printing a bare
/// integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberState {
    Startup,
    Primary,
    Secondary,
    Recovering,
    Startup2,
    Unknown,
    Arbiter,
    Down,
    Rollback,
    Removed,
    /// A state code this tool does not recognize.
    Other(i32),
}

impl MemberState {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Startup,
            1 => Self::Primary,
            2 => Self::Secondary,
            3 => Self::Recovering,
            5 => Self::Startup2,
            6 => Self::Unknown,
            7 => Self::Arbiter,
            8 => Self::Down,
            9 => Self::Rollback,
            10 => Self::Removed,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Startup => 0,
            Self::Primary => 1,
            Self::Secondary => 2,
            Self::Recovering => 3,
            Self::Startup2 => 5,
            Self::Unknown => 6,
            Self::Arbiter => 7,
            Self::Down => 8,
            Self::Rollback => 9,
            Self::Removed => 10,
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for MemberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup => write!(f, "STARTUP"),
            Self::Primary => write!(f, "PRIMARY"),
            Self::Secondary => write!(f, "SECONDARY"),
            Self::Recovering => write!(f, "RECOVERING"),
            Self::Startup2 => write!(f, "STARTUP2"),
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::Arbiter => write!(f, "ARBITER"),
            Self::Down => write!(f, "DOWN"),
            Self::Rollback => write!(f, "ROLLBACK"),
            Self::Removed => write!(f, "REMOVED"),
            Self::Other(code) => write!(f, "STATE({code})"),
        }
    }
}

/// One observation of the local node's replica set state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicaSetStatus {
    /// Server verdict flag from the reply, `1` on success.
    pub ok: i32,
    /// Raw `myState` code for the local member.
    pub my_state: i32,
}

impl ReplicaSetStatus {
    pub fn new(ok: i32, my_state: i32) -> Self {
        Self { ok, my_state }
    }

    /// Extracts the two fields this tool reads from a full status reply.
    ///
    /// A reply missing either field is reported as an [`AdminError`], which
    /// the runner treats like any other failed status query.
    pub fn from_document(reply: &Document) -> Result<Self, AdminError> {
        let ok = reply
            .get("ok")
            .and_then(numeric)
            .ok_or_else(|| AdminError::new("status reply is missing a numeric ok field"))?;
        let my_state = reply
            .get("myState")
            .and_then(numeric)
            .ok_or_else(|| AdminError::new("status reply is missing a numeric myState field"))?;
        Ok(Self {
            ok: i32::from(ok == 1.0),
            my_state: my_state as i32,
        })
    }

    pub fn state(&self) -> MemberState {
        MemberState::from_code(self.my_state)
    }

    pub fn is_primary(&self) -> bool {
        self.my_state == MemberState::Primary.code()
    }
}

/// Servers encode numeric reply fields inconsistently: `ok` usually arrives
/// as a double and `myState` as an int32, and proxies sometimes widen either
/// to int64. Accept all three encodings.
pub(crate) fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn parses_a_typical_status_reply() {
        let reply = doc! {
            "set": "rs0",
            "myState": 2,
            "ok": 1.0,
        };
        let status = ReplicaSetStatus::from_document(&reply).expect("parse");
        assert_eq!(status, ReplicaSetStatus::new(1, 2));
        assert_eq!(status.state(), MemberState::Secondary);
        assert!(!status.is_primary());
    }

    #[test]
    fn primary_state_is_recognized() {
        let reply = doc! { "myState": 1, "ok": 1.0 };
        let status = ReplicaSetStatus::from_document(&reply).expect("parse");
        assert!(status.is_primary());
        assert_eq!(status.state(), MemberState::Primary);
    }

    #[test]
    fn accepts_int64_state_codes() {
        let reply = doc! { "myState": 5i64, "ok": 1i32 };
        let status = ReplicaSetStatus::from_document(&reply).expect("parse");
        assert_eq!(status.state(), MemberState::Startup2);
    }

    #[test]
    fn missing_my_state_is_an_error() {
        let reply = doc! { "ok": 1.0 };
        let err = ReplicaSetStatus::from_document(&reply).expect_err("must fail");
        assert!(err.to_string().contains("myState"), "got: {err}");
    }

    #[test]
    fn missing_ok_is_an_error() {
        let reply = doc! { "myState": 1 };
        assert!(ReplicaSetStatus::from_document(&reply).is_err());
    }

    #[test]
    fn non_numeric_fields_are_rejected() {
        let reply = doc! { "myState": "1", "ok": 1.0 };
        assert!(ReplicaSetStatus::from_document(&reply).is_err());
    }

    #[test]
    fn state_names_cover_the_documented_codes() {
        let cases = [
            (0, "STARTUP"),
            (1, "PRIMARY"),
            (2, "SECONDARY"),
            (3, "RECOVERING"),
            (5, "STARTUP2"),
            (6, "UNKNOWN"),
            (7, "ARBITER"),
            (8, "DOWN"),
            (9, "ROLLBACK"),
            (10, "REMOVED"),
            (42, "STATE(42)"),
        ];
        for (code, name) in cases {
            assert_eq!(MemberState::from_code(code).to_string(), name);
            assert_eq!(MemberState::from_code(code).code(), code);
        }
    }
}

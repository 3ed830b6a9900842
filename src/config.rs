//! Replica set configuration documents.

use mongodb::bson::{self, Document};
use serde::{Deserialize, Serialize};

use crate::error::AdminError;

/// The configuration submitted to `replSetInitiate`.
///
/// Built once, handed to the admin connection by reference, never mutated.
/// Serde renames keep the wire document in the shape the server expects
/// (`_id` keys on both levels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaSetConfig {
    #[serde(rename = "_id")]
    pub id: String,
    pub version: i32,
    pub members: Vec<MemberConfig>,
}

/// One member entry inside a [`ReplicaSetConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberConfig {
    #[serde(rename = "_id")]
    pub id: i32,
    pub host: String,
    pub priority: f64,
}

impl ReplicaSetConfig {
    /// A version-1 configuration with a single voting member, which will win
    /// the election for its own one-node set.
    pub fn single_member(id: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: 1,
            members: vec![MemberConfig {
                id: 0,
                host: host.into(),
                priority: 1.0,
            }],
        }
    }

    /// Renders the configuration as the BSON document `replSetInitiate`
    /// takes as its argument.
    pub fn to_document(&self) -> Result<Document, AdminError> {
        bson::to_document(self)
            .map_err(|err| AdminError::new(format!("replica set config does not serialize: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_member_matches_the_one_node_shape() {
        let config = ReplicaSetConfig::single_member("rs0", "db0.internal:27017");
        assert_eq!(config.id, "rs0");
        assert_eq!(config.version, 1);
        assert_eq!(
            config.members,
            vec![MemberConfig {
                id: 0,
                host: "db0.internal:27017".to_string(),
                priority: 1.0,
            }]
        );
    }

    #[test]
    fn document_uses_underscore_id_keys() {
        let config = ReplicaSetConfig::single_member("rs0", "db0.internal:27017");
        let doc = config.to_document().expect("serialize");

        assert_eq!(doc.get_str("_id").expect("set id"), "rs0");
        assert_eq!(doc.get_i32("version").expect("version"), 1);

        let members = doc.get_array("members").expect("members");
        assert_eq!(members.len(), 1);
        let member = members[0].as_document().expect("member document");
        assert_eq!(member.get_i32("_id").expect("member id"), 0);
        assert_eq!(member.get_str("host").expect("host"), "db0.internal:27017");
        assert_eq!(member.get_f64("priority").expect("priority"), 1.0);
    }
}

//! Common envelope for all documents
//!
//! Identity, owner partition, and creation/update timestamps.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::Timestamp;

/// Fields shared by every stored record
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Record identifier, unique within the owner's partition
    pub id: String,

    /// Owner and partition key
    pub user_id: String,

    pub created: Timestamp,

    pub updated: Timestamp,
}

impl Envelope {
    /// Fresh envelope with a generated id and `created == updated`
    pub fn new(user_id: &str) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), user_id)
    }

    /// Fresh envelope with a caller-chosen id
    pub fn with_id(id: impl Into<String>, user_id: &str) -> Self {
        let now = Timestamp::now();
        Self {
            id: id.into(),
            user_id: user_id.to_string(),
            created: now,
            updated: now,
        }
    }

    /// Envelope for a replacement: same identity and `created`, newer `updated`
    pub fn revise(&self) -> Self {
        Self {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            created: self.created,
            updated: Timestamp::later_than(self.updated),
        }
    }
}

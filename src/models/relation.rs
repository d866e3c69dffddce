//! Relation identifiers and the persisted relation model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An active relation with a peer application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationId {
    pub id: u32,
    pub app: String,
}

impl RelationId {
    pub fn new(id: u32, app: impl Into<String>) -> Self {
        Self {
            id,
            app: app.into(),
        }
    }

    /// Username issued to this relation, unique per relation even when the
    /// same application is related twice.
    pub fn username(&self) -> String {
        format!("{}-{}", self.app, self.id)
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", crate::constants::RELATION_NAME, self.id, self.app)
    }
}

/// One relation as stored on disk by the file-backed store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationRecord {
    pub id: u32,
    pub app: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl RelationRecord {
    pub fn relation_id(&self) -> RelationId {
        RelationId::new(self.id, self.app.clone())
    }
}

/// Persisted set of active relations, in join order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationFile {
    #[serde(default, rename = "relation")]
    pub relations: Vec<RelationRecord>,
}

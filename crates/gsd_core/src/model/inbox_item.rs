//! Inbox capture item record and patch shapes.
//!
//! # Invariants
//! - Deletion is a soft lifecycle transition (`state='deleted'`); the row
//!   is retained in storage.
//! - The lifecycle state never appears in the wire shape.

use crate::model::patch::{nullable_string, required_string, FieldPatch, PatchError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An inbox capture item as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxItem {
    /// Opaque stable id, server- or client-assigned.
    pub id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// RFC 3339 UTC creation timestamp, stamped by the store.
    pub created_at: String,
}

/// Create request for an inbox item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewInboxItem {
    #[serde(default)]
    pub id: Option<String>,
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Sparse patch for an inbox item. Patchable fields: `description`, `url`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboxItemPatch {
    pub description: FieldPatch<String>,
    pub url: FieldPatch<String>,
}

impl InboxItemPatch {
    /// Builds a patch from a raw JSON object, key by key.
    pub fn from_json(payload: &Map<String, Value>) -> Result<Self, PatchError> {
        let mut patch = Self::default();
        for (key, value) in payload {
            match key.as_str() {
                "description" => patch.description = required_string("description", value)?,
                "url" => patch.url = nullable_string("url", value)?,
                _ => {}
            }
        }
        Ok(patch)
    }

    /// Returns whether the patch names zero recognized fields.
    pub fn is_empty(&self) -> bool {
        self.description.is_absent() && self.url.is_absent()
    }
}

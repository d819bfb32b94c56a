//! Project record and patch shapes.
//!
//! # Invariants
//! - `position` is a unique real order key; ascending sort defines display
//!   order.
//! - `deadline` is omitted from serialized output when absent.

use crate::model::patch::{nullable_string, required_number, FieldPatch, PatchError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A project as stored and as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Opaque stable id, server- or client-assigned.
    pub id: String,
    pub name: String,
    /// Unique real order key within projects.
    pub position: f64,
    /// RFC 3339 UTC creation timestamp, stamped by the store.
    pub created_at: String,
    /// Optional deadline date string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

/// Create request for a project.
///
/// `id` may be client-assigned (import/sync paths); position and creation
/// timestamp are always store-assigned.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub deadline: Option<String>,
}

/// Sparse patch for a project. Patchable fields: `position`, `deadline`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub position: FieldPatch<f64>,
    pub deadline: FieldPatch<String>,
}

impl ProjectPatch {
    /// Builds a patch from a raw JSON object, key by key.
    ///
    /// Unrecognized keys are ignored. `position` rejects explicit null;
    /// `deadline` null clears the column.
    pub fn from_json(payload: &Map<String, Value>) -> Result<Self, PatchError> {
        let mut patch = Self::default();
        for (key, value) in payload {
            match key.as_str() {
                "position" => patch.position = required_number("position", value)?,
                "deadline" => patch.deadline = nullable_string("deadline", value)?,
                _ => {}
            }
        }
        Ok(patch)
    }

    /// Returns whether the patch names zero recognized fields.
    pub fn is_empty(&self) -> bool {
        self.position.is_absent() && self.deadline.is_absent()
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectPatch;
    use crate::model::patch::{FieldPatch, PatchError};
    use serde_json::json;

    fn object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().expect("test payload is an object").clone()
    }

    #[test]
    fn from_json_distinguishes_omitted_and_null_deadline() {
        let only_position = ProjectPatch::from_json(&object(json!({"position": 5.0}))).unwrap();
        assert_eq!(only_position.position, FieldPatch::Value(5.0));
        assert!(only_position.deadline.is_absent());

        let cleared = ProjectPatch::from_json(&object(json!({"deadline": null}))).unwrap();
        assert_eq!(cleared.deadline, FieldPatch::Null);
        assert!(cleared.position.is_absent());
    }

    #[test]
    fn from_json_rejects_null_position() {
        let err = ProjectPatch::from_json(&object(json!({"position": null}))).unwrap_err();
        assert_eq!(err, PatchError::NullNotAllowed("position"));
    }

    #[test]
    fn unrecognized_keys_leave_the_patch_empty() {
        let patch = ProjectPatch::from_json(&object(json!({"name": "renamed"}))).unwrap();
        assert!(patch.is_empty());
    }
}

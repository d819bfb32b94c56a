//! Next-action record, enumerated metadata, and patch shapes.
//!
//! # Invariants
//! - `completed_at` present means completed; clearing it is an explicit
//!   patch action, distinct from omitting the field.
//! - `project_id` is a weak reference; referential integrity lives in the
//!   storage schema, the core never cascades.

use crate::model::patch::{
    nullable_enum, nullable_string, required_number, required_string, FieldPatch, PatchError,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Effort bucket for a next action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSize {
    Small,
    Medium,
    Big,
}

/// Energy level a next action demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionEnergy {
    High,
    Low,
}

/// A next action as stored and as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextAction {
    /// Opaque stable id, server- or client-assigned.
    pub id: String,
    pub action: String,
    /// Weak reference to the owning project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ActionSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<ActionEnergy>,
    /// RFC 3339 UTC creation timestamp, stamped by the store.
    pub created_at: String,
    /// Completion timestamp; presence means the action is completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// Unique real order key within next actions.
    pub position: f64,
}

impl NextAction {
    /// Returns whether this action has been completed.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Create request for a next action.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewNextAction {
    #[serde(default)]
    pub id: Option<String>,
    pub action: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub size: Option<ActionSize>,
    #[serde(default)]
    pub energy: Option<ActionEnergy>,
}

/// Sparse patch for a next action.
///
/// Patchable fields: `action`, `project_id`, `url`, `size`, `energy`,
/// `completed_at`, `position`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NextActionPatch {
    pub action: FieldPatch<String>,
    pub project_id: FieldPatch<String>,
    pub url: FieldPatch<String>,
    pub size: FieldPatch<ActionSize>,
    pub energy: FieldPatch<ActionEnergy>,
    pub completed_at: FieldPatch<String>,
    pub position: FieldPatch<f64>,
}

impl NextActionPatch {
    /// Builds a patch from a raw JSON object, key by key.
    ///
    /// `action` and `position` reject explicit null; every other field
    /// treats null as "clear". Enumerated values outside their domain are
    /// rejected before anything reaches storage.
    pub fn from_json(payload: &Map<String, Value>) -> Result<Self, PatchError> {
        let mut patch = Self::default();
        for (key, value) in payload {
            match key.as_str() {
                "action" => patch.action = required_string("action", value)?,
                "project_id" => patch.project_id = nullable_string("project_id", value)?,
                "url" => patch.url = nullable_string("url", value)?,
                "size" => patch.size = nullable_enum("size", value)?,
                "energy" => patch.energy = nullable_enum("energy", value)?,
                "completed_at" => patch.completed_at = nullable_string("completed_at", value)?,
                "position" => patch.position = required_number("position", value)?,
                _ => {}
            }
        }
        Ok(patch)
    }

    /// Returns whether the patch names zero recognized fields.
    pub fn is_empty(&self) -> bool {
        self.action.is_absent()
            && self.project_id.is_absent()
            && self.url.is_absent()
            && self.size.is_absent()
            && self.energy.is_absent()
            && self.completed_at.is_absent()
            && self.position.is_absent()
    }
}

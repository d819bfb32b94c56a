//! Domain model for projects, next actions, and inbox capture items.
//!
//! # Responsibility
//! - Define the wire-shaped records returned to callers.
//! - Define sparse patch types that distinguish omitted from null fields.
//!
//! # Invariants
//! - Every record is identified by an opaque, immutable string id.
//! - Absent nullable fields are omitted from serialized records, never
//!   rendered as empty strings.

pub mod inbox_item;
pub mod next_action;
pub mod patch;
pub mod project;

use uuid::Uuid;

/// Resolves the id for a new record.
///
/// Client-assigned ids are accepted verbatim when non-empty; otherwise a
/// fresh UUID string is generated. Ids are opaque to the core and never
/// parsed back.
pub fn new_record_id(requested: Option<&str>) -> String {
    match requested {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::new_record_id;

    #[test]
    fn new_record_id_keeps_client_assigned_value() {
        assert_eq!(new_record_id(Some("client-7")), "client-7");
    }

    #[test]
    fn new_record_id_generates_uuid_for_missing_or_blank_input() {
        for requested in [None, Some(""), Some("   ")] {
            let id = new_record_id(requested);
            assert!(uuid::Uuid::parse_str(&id).is_ok(), "expected uuid, got {id}");
        }
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(new_record_id(None), new_record_id(None));
    }
}

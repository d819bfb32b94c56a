//! Sparse patch primitives.
//!
//! # Responsibility
//! - Model per-field presence so "omitted" and "explicitly null" stay
//!   distinguishable all the way to the UPDATE statement.
//! - Convert raw JSON patch payloads into typed, validated patches.
//!
//! # Invariants
//! - A fixed-shape struct with defaultable fields cannot express this
//!   contract for any field whose valid domain includes the zero value;
//!   patches are therefore built from the raw JSON map, key by key.
//! - Unrecognized keys are ignored; only recognized keys count toward a
//!   non-empty patch.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One field of a sparse patch.
///
/// `Absent` leaves the column untouched, `Null` clears it, `Value` sets it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPatch<T> {
    /// Field was not mentioned in the patch payload.
    Absent,
    /// Field was explicitly supplied as JSON null.
    Null,
    /// Field was supplied with a concrete value.
    Value(T),
}

impl<T> Default for FieldPatch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> FieldPatch<T> {
    /// Returns whether this field was mentioned in the patch at all.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Returns whether this field was omitted from the patch.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Validation error for raw patch payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Field value has the wrong JSON type.
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
    /// Field does not admit an explicit null.
    NullNotAllowed(&'static str),
    /// Enumerated field value is outside its domain.
    UnknownVariant { field: &'static str, value: String },
}

impl Display for PatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidType { field, expected } => {
                write!(f, "field `{field}` must be a JSON {expected}")
            }
            Self::NullNotAllowed(field) => {
                write!(f, "field `{field}` cannot be set to null")
            }
            Self::UnknownVariant { field, value } => {
                write!(f, "unknown value `{value}` for field `{field}`")
            }
        }
    }
}

impl Error for PatchError {}

/// Parses a required (non-nullable) string field.
pub(crate) fn required_string(
    field: &'static str,
    value: &Value,
) -> Result<FieldPatch<String>, PatchError> {
    match value {
        Value::Null => Err(PatchError::NullNotAllowed(field)),
        Value::String(text) => Ok(FieldPatch::Value(text.clone())),
        _ => Err(PatchError::InvalidType {
            field,
            expected: "string",
        }),
    }
}

/// Parses a nullable string field; explicit null clears the column.
pub(crate) fn nullable_string(
    field: &'static str,
    value: &Value,
) -> Result<FieldPatch<String>, PatchError> {
    match value {
        Value::Null => Ok(FieldPatch::Null),
        Value::String(text) => Ok(FieldPatch::Value(text.clone())),
        _ => Err(PatchError::InvalidType {
            field,
            expected: "string or null",
        }),
    }
}

/// Parses a required (non-nullable) number field.
pub(crate) fn required_number(
    field: &'static str,
    value: &Value,
) -> Result<FieldPatch<f64>, PatchError> {
    match value {
        Value::Null => Err(PatchError::NullNotAllowed(field)),
        Value::Number(number) => number
            .as_f64()
            .map(FieldPatch::Value)
            .ok_or(PatchError::InvalidType {
                field,
                expected: "number",
            }),
        _ => Err(PatchError::InvalidType {
            field,
            expected: "number",
        }),
    }
}

/// Parses a nullable enumerated field through its serde representation.
pub(crate) fn nullable_enum<T: DeserializeOwned>(
    field: &'static str,
    value: &Value,
) -> Result<FieldPatch<T>, PatchError> {
    match value {
        Value::Null => Ok(FieldPatch::Null),
        Value::String(text) => serde_json::from_value(value.clone())
            .map(FieldPatch::Value)
            .map_err(|_| PatchError::UnknownVariant {
                field,
                value: text.clone(),
            }),
        _ => Err(PatchError::InvalidType {
            field,
            expected: "string or null",
        }),
    }
}

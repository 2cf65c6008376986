//! Row validation against target-field schemas.
//!
//! Takes a mapped row and produces either a typed [`ValidatedRow`] or the
//! list of field-level problems. Coercion rules:
//!
//! - required field absent or empty → the whole row fails
//! - unknown choice value → replaced by the entity's default status
//! - unparsable date → field error
//! - unparsable number → field omitted (null), never an error
//!
//! Emails and phones are canonicalized here so every later stage (dedup,
//! diffing, storage) sees one spelling.

use serde::Serialize;

use crate::models::entity::EntityType;
use crate::models::field::{
    default_status_for, fields_for, names, FieldKind, FieldValue, ValidatedRow,
};
use crate::services::mapper::MappedRow;

/// One field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Render a list of field errors as one row-level message.
pub fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate a mapped row against the schema for the given entity type.
pub fn validate_row(entity: EntityType, mapped: &MappedRow) -> Result<ValidatedRow, Vec<FieldError>> {
    let mut validated = ValidatedRow::new();
    let mut errors = Vec::new();

    for field in fields_for(entity) {
        let value = mapped.get(field.name).map(String::as_str).unwrap_or("");

        if value.is_empty() {
            if field.required {
                errors.push(FieldError::new(field.name, "missing required field"));
            }
            continue;
        }

        match field.kind {
            FieldKind::Text => {
                validated.insert(field.name, FieldValue::Text(canonicalize(field.name, value)));
            }
            FieldKind::Choice => {
                let lowered = value.trim().to_lowercase();
                let chosen = if field.allowed.contains(&lowered.as_str()) {
                    lowered
                } else {
                    tracing::debug!(
                        field = field.name,
                        value = %value,
                        fallback = default_status_for(entity),
                        "Unrecognized choice value, using default"
                    );
                    default_status_for(entity).to_string()
                };
                validated.insert(field.name, FieldValue::Choice(chosen));
            }
            FieldKind::Date => match shared::parsing::parse_date(value) {
                Some(date) => validated.insert(field.name, FieldValue::Date(date)),
                None => errors.push(FieldError::new(
                    field.name,
                    format!("unparsable date: {}", value),
                )),
            },
            FieldKind::Number => {
                if let Some(number) = shared::parsing::parse_number(value) {
                    validated.insert(field.name, FieldValue::Number(number));
                }
                // Nothing numeric left after stripping: the field stays
                // null rather than failing the row.
            }
        }
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(errors)
    }
}

fn canonicalize(field_name: &str, value: &str) -> String {
    match field_name {
        names::EMAIL => shared::parsing::canonical_email(value),
        names::PHONE => shared::parsing::phone_digits(value),
        _ => value.trim().to_string(),
    }
}

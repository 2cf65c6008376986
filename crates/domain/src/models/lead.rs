//! Validated lead record built from a mapped row.

use super::field::{names, ValidatedRow};

/// Typed lead fields extracted from a validated row.
#[derive(Debug, Clone, Default)]
pub struct LeadRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
}

impl LeadRecord {
    /// Extract lead fields from a validated row.
    pub fn from_validated(row: &ValidatedRow) -> Self {
        Self {
            first_name: row.text(names::FIRST_NAME).map(String::from),
            last_name: row.text(names::LAST_NAME).map(String::from),
            email: row.text(names::EMAIL).map(String::from),
            phone: row.text(names::PHONE).map(String::from),
            source: row.text(names::SOURCE).map(String::from),
            status: row.text(names::STATUS).map(String::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field::FieldValue;

    #[test]
    fn test_from_validated() {
        let mut row = ValidatedRow::new();
        row.insert(names::EMAIL, FieldValue::Text("lead@x.com".to_string()));
        row.insert(names::SOURCE, FieldValue::Text("webinar".to_string()));

        let record = LeadRecord::from_validated(&row);
        assert_eq!(record.email.as_deref(), Some("lead@x.com"));
        assert_eq!(record.source.as_deref(), Some("webinar"));
        assert!(record.phone.is_none());
    }
}

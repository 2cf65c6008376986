//! Validated advisor record built from a mapped row.

use super::field::{names, ValidatedRow};

/// Typed advisor fields extracted from a validated row.
#[derive(Debug, Clone, Default)]
pub struct AdvisorRecord {
    pub advisor_code: Option<String>,
    pub national_producer_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

impl AdvisorRecord {
    /// Extract advisor fields from a validated row.
    pub fn from_validated(row: &ValidatedRow) -> Self {
        Self {
            advisor_code: row.text(names::ADVISOR_CODE).map(String::from),
            national_producer_number: row
                .text(names::NATIONAL_PRODUCER_NUMBER)
                .map(String::from),
            first_name: row.text(names::FIRST_NAME).map(String::from),
            last_name: row.text(names::LAST_NAME).map(String::from),
            email: row.text(names::EMAIL).map(String::from),
            phone: row.text(names::PHONE).map(String::from),
            status: row.text(names::STATUS).map(String::from),
        }
    }
}

//! Source-column → canonical-field mapping.
//!
//! Each entity type carries a built-in table of known source spellings
//! (post-normalization) for every canonical field. Callers may merge
//! explicit overrides on top when a vendor's naming drifts. Lookup is by
//! exact normalized key; unknown source columns are dropped silently since
//! vendor exports routinely carry extraneous columns.

use std::collections::BTreeMap;

use crate::models::entity::EntityType;
use crate::models::field::names;
use crate::models::import::RawRow;
use crate::models::vendor::VendorFileType;

/// Mapped row: canonical field name → raw (still unvalidated) value.
pub type MappedRow = BTreeMap<String, String>;

const SHARED_CONTACT_COLUMNS: &[(&str, &str)] = &[
    ("first_name", names::FIRST_NAME),
    ("fname", names::FIRST_NAME),
    ("first", names::FIRST_NAME),
    ("last_name", names::LAST_NAME),
    ("lname", names::LAST_NAME),
    ("last", names::LAST_NAME),
    ("surname", names::LAST_NAME),
    ("email", names::EMAIL),
    ("email_address", names::EMAIL),
    ("e_mail", names::EMAIL),
    ("phone", names::PHONE),
    ("phone_number", names::PHONE),
    ("cell_phone", names::PHONE),
    ("mobile", names::PHONE),
    ("mobile_phone", names::PHONE),
];

const MEMBER_COLUMNS: &[(&str, &str)] = &[
    ("member_number", names::MEMBER_NUMBER),
    ("member_no", names::MEMBER_NUMBER),
    ("member_id", names::MEMBER_NUMBER),
    ("subscriber_id", names::MEMBER_NUMBER),
    ("date_of_birth", names::DATE_OF_BIRTH),
    ("dob", names::DATE_OF_BIRTH),
    ("birth_date", names::DATE_OF_BIRTH),
    ("birthdate", names::DATE_OF_BIRTH),
    ("address1", names::ADDRESS1),
    ("address_1", names::ADDRESS1),
    ("address", names::ADDRESS1),
    ("street_address", names::ADDRESS1),
    ("address_line_1", names::ADDRESS1),
    ("address2", names::ADDRESS2),
    ("address_2", names::ADDRESS2),
    ("address_line_2", names::ADDRESS2),
    ("city", names::CITY),
    ("state", names::STATE),
    ("st", names::STATE),
    ("state_code", names::STATE),
    ("zip", names::ZIP),
    ("zip_code", names::ZIP),
    ("postal_code", names::ZIP),
    ("plan_id", names::PLAN_ID),
    ("plan_code", names::PLAN_ID),
    ("plan_name", names::PLAN_NAME),
    ("plan", names::PLAN_NAME),
    ("product_name", names::PLAN_NAME),
    ("monthly_premium", names::MONTHLY_PREMIUM),
    ("premium", names::MONTHLY_PREMIUM),
    ("rate", names::MONTHLY_PREMIUM),
    ("monthly_rate", names::MONTHLY_PREMIUM),
    ("status", names::STATUS),
    ("member_status", names::STATUS),
    ("enrollment_status", names::STATUS),
    ("enrollment_date", names::ENROLLMENT_DATE),
    ("effective_date", names::ENROLLMENT_DATE),
    ("start_date", names::ENROLLMENT_DATE),
    ("termination_date", names::TERMINATION_DATE),
    ("term_date", names::TERMINATION_DATE),
    ("end_date", names::TERMINATION_DATE),
    ("cancellation_date", names::TERMINATION_DATE),
    ("dependents", names::DEPENDENTS),
    ("dependent_names", names::DEPENDENTS),
];

const ADVISOR_COLUMNS: &[(&str, &str)] = &[
    ("advisor_code", names::ADVISOR_CODE),
    ("agent_code", names::ADVISOR_CODE),
    ("agent_id", names::ADVISOR_CODE),
    ("code", names::ADVISOR_CODE),
    ("national_producer_number", names::NATIONAL_PRODUCER_NUMBER),
    ("npn", names::NATIONAL_PRODUCER_NUMBER),
    ("producer_number", names::NATIONAL_PRODUCER_NUMBER),
    ("status", names::STATUS),
    ("advisor_status", names::STATUS),
    ("agent_status", names::STATUS),
];

const LEAD_COLUMNS: &[(&str, &str)] = &[
    ("source", names::SOURCE),
    ("lead_source", names::SOURCE),
    ("referral_source", names::SOURCE),
    ("status", names::STATUS),
    ("lead_status", names::STATUS),
];

/// Extra spellings seen in pricing feeds.
const PRICING_COLUMNS: &[(&str, &str)] = &[
    ("new_rate", names::MONTHLY_PREMIUM),
    ("new_premium", names::MONTHLY_PREMIUM),
];

/// A resolved column map for one mapping call.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    entries: BTreeMap<String, String>,
}

impl ColumnMap {
    fn from_tables(tables: &[&[(&str, &str)]]) -> Self {
        let mut entries = BTreeMap::new();
        for table in tables {
            for (source, target) in *table {
                entries.insert((*source).to_string(), (*target).to_string());
            }
        }
        Self { entries }
    }

    /// Built-in default map for a direct import of the given entity type.
    pub fn for_entity(entity: EntityType) -> Self {
        match entity {
            EntityType::Member => Self::from_tables(&[SHARED_CONTACT_COLUMNS, MEMBER_COLUMNS]),
            EntityType::Advisor => Self::from_tables(&[SHARED_CONTACT_COLUMNS, ADVISOR_COLUMNS]),
            EntityType::Lead => Self::from_tables(&[SHARED_CONTACT_COLUMNS, LEAD_COLUMNS]),
        }
    }

    /// Built-in map for a vendor feed. Vendor feeds describe members; some
    /// file types add their own column spellings.
    pub fn for_vendor_file(file_type: VendorFileType) -> Self {
        match file_type {
            VendorFileType::Pricing => {
                Self::from_tables(&[SHARED_CONTACT_COLUMNS, MEMBER_COLUMNS, PRICING_COLUMNS])
            }
            _ => Self::from_tables(&[SHARED_CONTACT_COLUMNS, MEMBER_COLUMNS]),
        }
    }

    /// Merge explicit overrides (normalized source key → canonical field)
    /// over the defaults. Overrides win on conflict.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (source, target) in overrides {
            self.entries.insert(source.clone(), target.clone());
        }
        self
    }

    /// Canonical field a normalized source column maps to, if any.
    pub fn target_for(&self, normalized_key: &str) -> Option<&str> {
        self.entries.get(normalized_key).map(String::as_str)
    }

    /// Map a normalized row onto canonical fields.
    ///
    /// Only keys present in both the row and the map survive, and only when
    /// the value is non-empty.
    pub fn map_row(&self, normalized: &RawRow) -> MappedRow {
        let mut mapped = MappedRow::new();
        for (key, value) in normalized {
            if value.is_empty() {
                continue;
            }
            if let Some(target) = self.target_for(key) {
                mapped.insert(target.to_string(), value.clone());
            }
        }
        mapped
    }
}

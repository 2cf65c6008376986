//! Entity definitions mapping database rows.

pub mod advisor;
pub mod import_job;
pub mod import_row;
pub mod lead;
pub mod member;
pub mod organization;
pub mod snapshot_entry;
pub mod vendor;
pub mod vendor_change;
pub mod vendor_file;

pub use advisor::AdvisorEntity;
pub use import_job::ImportJobEntity;
pub use import_row::ImportRowEntity;
pub use lead::LeadEntity;
pub use member::MemberEntity;
pub use organization::OrganizationEntity;
pub use snapshot_entry::SnapshotEntryEntity;
pub use vendor::VendorEntity;
pub use vendor_change::VendorChangeEntity;
pub use vendor_file::VendorFileEntity;

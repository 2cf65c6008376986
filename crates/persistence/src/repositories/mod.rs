//! Repository implementations for database operations.

pub mod advisor;
pub mod import_job;
pub mod import_row;
pub mod lead;
pub mod member;
pub mod organization;
pub mod snapshot;
pub mod vendor;
pub mod vendor_change;
pub mod vendor_file;

pub use advisor::AdvisorRepository;
pub use import_job::{ImportJobRepository, JobCounts};
pub use import_row::{ImportRowRepository, NewImportRow};
pub use lead::LeadRepository;
pub use member::MemberRepository;
pub use organization::OrganizationRepository;
pub use snapshot::SnapshotRepository;
pub use vendor::VendorRepository;
pub use vendor_change::{NewVendorChange, VendorChangeRepository};
pub use vendor_file::{VendorFileCounts, VendorFileRepository};

//! Background job scheduler and job implementations.

mod pool_metrics;
mod scheduler;
mod stale_jobs;

pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
pub use stale_jobs::StaleJobReaperJob;

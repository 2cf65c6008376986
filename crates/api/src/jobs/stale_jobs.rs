//! Stale import job reaper.
//!
//! An import job is processed by a single worker holding it for the whole
//! run; a job sitting in `processing` for a long time means that worker
//! died. The reaper marks such jobs `failed`. Rows they already processed
//! keep their recorded outcomes (there is no implicit rollback).

use persistence::repositories::ImportJobRepository;
use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobFrequency};

/// Background job that fails import jobs stuck in `processing`.
pub struct StaleJobReaperJob {
    jobs: ImportJobRepository,
    timeout_minutes: i64,
}

impl StaleJobReaperJob {
    /// Create a new reaper with the configured timeout.
    pub fn new(pool: PgPool, timeout_minutes: i64) -> Self {
        Self {
            jobs: ImportJobRepository::new(pool),
            timeout_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for StaleJobReaperJob {
    fn name(&self) -> &'static str {
        "stale_job_reaper"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(15)
    }

    async fn execute(&self) -> Result<(), String> {
        let reaped = self
            .jobs
            .reap_stale(self.timeout_minutes)
            .await
            .map_err(|e| format!("failed to reap stale jobs: {}", e))?;

        if reaped > 0 {
            info!(
                reaped = reaped,
                timeout_minutes = self.timeout_minutes,
                "Reaped stale import jobs"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency() {
        assert_eq!(
            JobFrequency::Minutes(15).duration(),
            std::time::Duration::from_secs(900)
        );
    }
}
